//! The fixed set of service bindings every snippet can see.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Binding through which snippets read the subscription id.
pub const SUBSCRIPTION_ID_BINDING: &str = "subscriptionId";

/// Binding a snippet assigns to hand back its output.
pub const RESULT_BINDING: &str = "result";

/// One cloud service category with a pre-authenticated client in the namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Resource,
    Subscription,
    Compute,
    Storage,
    Network,
    Authorization,
    Web,
    LogAnalytics,
    ContainerInstance,
    ContainerService,
    Monitor,
    KeyVault,
    CognitiveServices,
    EventGrid,
    ServiceBus,
    Logic,
    ApiManagement,
    Dns,
    ContainerRegistry,
    ManagedIdentity,
}

impl ServiceKind {
    /// Every service, in namespace order.
    pub const ALL: [ServiceKind; 20] = [
        Self::Resource,
        Self::Subscription,
        Self::Compute,
        Self::Storage,
        Self::Network,
        Self::Authorization,
        Self::Web,
        Self::LogAnalytics,
        Self::ContainerInstance,
        Self::ContainerService,
        Self::Monitor,
        Self::KeyVault,
        Self::CognitiveServices,
        Self::EventGrid,
        Self::ServiceBus,
        Self::Logic,
        Self::ApiManagement,
        Self::Dns,
        Self::ContainerRegistry,
        Self::ManagedIdentity,
    ];

    /// Name under which the client is bound in the execution namespace.
    #[must_use]
    pub const fn binding_name(self) -> &'static str {
        match self {
            Self::Resource => "resource_client",
            Self::Subscription => "subscription_client",
            Self::Compute => "compute_client",
            Self::Storage => "storage_client",
            Self::Network => "network_client",
            Self::Authorization => "authorization_client",
            Self::Web => "web_client",
            Self::LogAnalytics => "loganalytics_client",
            Self::ContainerInstance => "container_client",
            Self::ContainerService => "aks_client",
            Self::Monitor => "monitor_client",
            Self::KeyVault => "keyvault_client",
            Self::CognitiveServices => "cognitive_client",
            Self::EventGrid => "eventgrid_client",
            Self::ServiceBus => "servicebus_client",
            Self::Logic => "logic_client",
            Self::ApiManagement => "apimanagement_client",
            Self::Dns => "dns_client",
            Self::ContainerRegistry => "container_registry_client",
            Self::ManagedIdentity => "msi_client",
        }
    }

    /// Client type name, used in error messages.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Resource => "ResourceManagementClient",
            Self::Subscription => "SubscriptionClient",
            Self::Compute => "ComputeManagementClient",
            Self::Storage => "StorageManagementClient",
            Self::Network => "NetworkManagementClient",
            Self::Authorization => "AuthorizationManagementClient",
            Self::Web => "WebSiteManagementClient",
            Self::LogAnalytics => "LogAnalyticsManagementClient",
            Self::ContainerInstance => "ContainerInstanceManagementClient",
            Self::ContainerService => "ContainerServiceClient",
            Self::Monitor => "MonitorManagementClient",
            Self::KeyVault => "KeyVaultManagementClient",
            Self::CognitiveServices => "CognitiveServicesManagementClient",
            Self::EventGrid => "EventGridManagementClient",
            Self::ServiceBus => "ServiceBusManagementClient",
            Self::Logic => "LogicManagementClient",
            Self::ApiManagement => "ApiManagementClient",
            Self::Dns => "DnsManagementClient",
            Self::ContainerRegistry => "ContainerRegistryManagementClient",
            Self::ManagedIdentity => "ManagedServiceIdentityClient",
        }
    }

    /// Whether the client is bound to the subscription id.
    ///
    /// Only the subscription-listing client works from the credential alone.
    #[must_use]
    pub const fn is_subscription_scoped(self) -> bool {
        !matches!(self, Self::Subscription)
    }

    /// Looks a service up by its namespace binding.
    #[must_use]
    pub fn from_binding(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.binding_name() == name)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binding_name())
    }
}
