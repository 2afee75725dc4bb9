//! Static operation tables for every service client.
//!
//! Each entry maps a `group.method(...)` call onto a Resource Manager request:
//! verb, path template, parameters and the shape of what comes back. Path
//! templates use `{name}` placeholders; `{subscription_id}` falls back to the
//! client's subscription when the call does not supply it.

use stratus_core::ServiceKind;

use crate::http::HttpMethod;
use crate::http::HttpMethod::{Delete as DELETE, Get as GET, Head as HEAD, Post as POST, Put as PUT};

/// Where a bound argument goes in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    /// One percent-encoded path segment.
    Path,
    /// A resource id spliced into the path as raw segments.
    Scope,
    /// A query parameter with the given wire name.
    Query(&'static str),
    /// The JSON request body.
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub location: ParamLocation,
    pub required: bool,
}

impl Param {
    const fn path(name: &'static str) -> Self {
        Self { name, location: ParamLocation::Path, required: true }
    }

    const fn scope(name: &'static str) -> Self {
        Self { name, location: ParamLocation::Scope, required: true }
    }

    const fn query(name: &'static str, wire: &'static str) -> Self {
        Self { name, location: ParamLocation::Query(wire), required: false }
    }

    const fn required_query(name: &'static str, wire: &'static str) -> Self {
        Self { name, location: ParamLocation::Query(wire), required: true }
    }

    const fn body(name: &'static str) -> Self {
        Self { name, location: ParamLocation::Body, required: true }
    }
}

/// What an operation returns, named by its model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returns {
    Model(&'static str),
    Paged(&'static str),
    Poller(&'static str),
    /// HEAD existence check: `True` on 2xx, `False` on 404.
    Exists,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSpec {
    pub group: &'static str,
    pub method: &'static str,
    pub verb: HttpMethod,
    pub path: &'static str,
    pub params: &'static [Param],
    pub returns: Returns,
    /// Overrides the client's api-version for operations served by a
    /// different provider version.
    pub api_version: Option<&'static str>,
}

impl OperationSpec {
    const fn api(mut self, version: &'static str) -> Self {
        self.api_version = Some(version);
        self
    }
}

const fn op(
    group: &'static str,
    method: &'static str,
    verb: HttpMethod,
    path: &'static str,
    params: &'static [Param],
    returns: Returns,
) -> OperationSpec {
    OperationSpec { group, method, verb, path, params, returns, api_version: None }
}

#[derive(Debug)]
pub struct ServiceCatalog {
    pub kind: ServiceKind,
    pub api_version: &'static str,
    pub operations: &'static [OperationSpec],
}

impl ServiceCatalog {
    #[must_use]
    pub fn find(&self, group: &str, method: &str) -> Option<&'static OperationSpec> {
        self.operations
            .iter()
            .find(|spec| spec.group == group && spec.method == method)
    }

    #[must_use]
    pub fn has_group(&self, group: &str) -> bool {
        self.operations.iter().any(|spec| spec.group == group)
    }

    /// Operation group names in declaration order.
    pub fn groups(&self) -> impl Iterator<Item = &'static str> {
        let operations = self.operations;
        operations
            .iter()
            .enumerate()
            .filter(move |(i, spec)| !operations[..*i].iter().any(|prior| prior.group == spec.group))
            .map(|(_, spec)| spec.group)
    }

    /// Methods of one operation group.
    pub fn methods<'a>(&self, group: &'a str) -> impl Iterator<Item = &'static OperationSpec> + 'a {
        let operations = self.operations;
        operations.iter().filter(move |spec| spec.group == group)
    }
}

/// The catalog of one service.
#[must_use]
pub fn catalog(kind: ServiceKind) -> &'static ServiceCatalog {
    match kind {
        ServiceKind::Resource => &RESOURCE,
        ServiceKind::Subscription => &SUBSCRIPTION,
        ServiceKind::Compute => &COMPUTE,
        ServiceKind::Storage => &STORAGE,
        ServiceKind::Network => &NETWORK,
        ServiceKind::Authorization => &AUTHORIZATION,
        ServiceKind::Web => &WEB,
        ServiceKind::LogAnalytics => &LOG_ANALYTICS,
        ServiceKind::ContainerInstance => &CONTAINER_INSTANCE,
        ServiceKind::ContainerService => &CONTAINER_SERVICE,
        ServiceKind::Monitor => &MONITOR,
        ServiceKind::KeyVault => &KEY_VAULT,
        ServiceKind::CognitiveServices => &COGNITIVE_SERVICES,
        ServiceKind::EventGrid => &EVENT_GRID,
        ServiceKind::ServiceBus => &SERVICE_BUS,
        ServiceKind::Logic => &LOGIC,
        ServiceKind::ApiManagement => &API_MANAGEMENT,
        ServiceKind::Dns => &DNS,
        ServiceKind::ContainerRegistry => &CONTAINER_REGISTRY,
        ServiceKind::ManagedIdentity => &MANAGED_IDENTITY,
    }
}

const SUB: &str = "/subscriptions/{subscription_id}";
const RG: Param = Param::path("resource_group_name");
const FILTER: Param = Param::query("filter", "$filter");
const TOP: Param = Param::query("top", "$top");
const EXPAND: Param = Param::query("expand", "$expand");
const PARAMETERS: Param = Param::body("parameters");

// Resources

const RG_NAME_PATH: &str = "/subscriptions/{subscription_id}/resourcegroups/{resource_group_name}";

static RESOURCE: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::Resource,
    api_version: "2022-09-01",
    operations: &[
        op("resource_groups", "list", GET, "/subscriptions/{subscription_id}/resourcegroups", &[FILTER, TOP], Returns::Paged("ResourceGroup")),
        op("resource_groups", "get", GET, RG_NAME_PATH, &[RG], Returns::Model("ResourceGroup")),
        op("resource_groups", "check_existence", HEAD, RG_NAME_PATH, &[RG], Returns::Exists),
        op("resource_groups", "create_or_update", PUT, RG_NAME_PATH, &[RG, PARAMETERS], Returns::Model("ResourceGroup")),
        op("resource_groups", "begin_delete", DELETE, RG_NAME_PATH, &[RG], Returns::Poller("ResourceGroup")),
        op("resources", "list", GET, "/subscriptions/{subscription_id}/resources", &[FILTER, EXPAND, TOP], Returns::Paged("GenericResourceExpanded")),
        op(
            "resources",
            "list_by_resource_group",
            GET,
            "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/resources",
            &[RG, FILTER, EXPAND, TOP],
            Returns::Paged("GenericResourceExpanded"),
        ),
        op("providers", "list", GET, "/subscriptions/{subscription_id}/providers", &[EXPAND], Returns::Paged("Provider")),
        op("providers", "get", GET, "/subscriptions/{subscription_id}/providers/{resource_provider_namespace}", &[Param::path("resource_provider_namespace"), EXPAND], Returns::Model("Provider")),
    ],
};

// Subscriptions

const SUBSCRIPTION_ID: Param = Param::path("subscription_id");

static SUBSCRIPTION: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::Subscription,
    api_version: "2022-12-01",
    operations: &[
        op("subscriptions", "list", GET, "/subscriptions", &[], Returns::Paged("Subscription")),
        op("subscriptions", "get", GET, SUB, &[SUBSCRIPTION_ID], Returns::Model("Subscription")),
        op("subscriptions", "list_locations", GET, "/subscriptions/{subscription_id}/locations", &[SUBSCRIPTION_ID], Returns::Paged("Location")),
        op("tenants", "list", GET, "/tenants", &[], Returns::Paged("TenantIdDescription")),
    ],
};

// Compute

const VM_NAME: Param = Param::path("vm_name");
const VMS: &str = "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Compute/virtualMachines";
const VM: &str = "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Compute/virtualMachines/{vm_name}";
const DISKS_API: &str = "2023-04-02";

static COMPUTE: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::Compute,
    api_version: "2024-03-01",
    operations: &[
        op("virtual_machines", "list_all", GET, "/subscriptions/{subscription_id}/providers/Microsoft.Compute/virtualMachines", &[FILTER, EXPAND], Returns::Paged("VirtualMachine")),
        op("virtual_machines", "list", GET, VMS, &[RG, FILTER, EXPAND], Returns::Paged("VirtualMachine")),
        op("virtual_machines", "get", GET, VM, &[RG, VM_NAME, EXPAND], Returns::Model("VirtualMachine")),
        op("virtual_machines", "instance_view", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Compute/virtualMachines/{vm_name}/instanceView", &[RG, VM_NAME], Returns::Model("VirtualMachineInstanceView")),
        op("virtual_machines", "begin_start", POST, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Compute/virtualMachines/{vm_name}/start", &[RG, VM_NAME], Returns::Poller("VirtualMachine")),
        op("virtual_machines", "begin_power_off", POST, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Compute/virtualMachines/{vm_name}/powerOff", &[RG, VM_NAME, Param::query("skip_shutdown", "skipShutdown")], Returns::Poller("VirtualMachine")),
        op("virtual_machines", "begin_restart", POST, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Compute/virtualMachines/{vm_name}/restart", &[RG, VM_NAME], Returns::Poller("VirtualMachine")),
        op("virtual_machines", "begin_deallocate", POST, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Compute/virtualMachines/{vm_name}/deallocate", &[RG, VM_NAME], Returns::Poller("VirtualMachine")),
        op("virtual_machines", "begin_delete", DELETE, VM, &[RG, VM_NAME], Returns::Poller("VirtualMachine")),
        op("disks", "list", GET, "/subscriptions/{subscription_id}/providers/Microsoft.Compute/disks", &[], Returns::Paged("Disk")).api(DISKS_API),
        op("disks", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Compute/disks", &[RG], Returns::Paged("Disk")).api(DISKS_API),
        op("disks", "get", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Compute/disks/{disk_name}", &[RG, Param::path("disk_name")], Returns::Model("Disk")).api(DISKS_API),
    ],
};

// Storage

const ACCOUNT_NAME: Param = Param::path("account_name");
const STORAGE_ACCOUNT: &str = "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Storage/storageAccounts/{account_name}";

static STORAGE: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::Storage,
    api_version: "2023-05-01",
    operations: &[
        op("storage_accounts", "list", GET, "/subscriptions/{subscription_id}/providers/Microsoft.Storage/storageAccounts", &[], Returns::Paged("StorageAccount")),
        op("storage_accounts", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Storage/storageAccounts", &[RG], Returns::Paged("StorageAccount")),
        op("storage_accounts", "get_properties", GET, STORAGE_ACCOUNT, &[RG, ACCOUNT_NAME, EXPAND], Returns::Model("StorageAccount")),
        op("storage_accounts", "list_keys", POST, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Storage/storageAccounts/{account_name}/listKeys", &[RG, ACCOUNT_NAME, EXPAND], Returns::Model("StorageAccountListKeysResult")),
        op("storage_accounts", "begin_create", PUT, STORAGE_ACCOUNT, &[RG, ACCOUNT_NAME, PARAMETERS], Returns::Poller("StorageAccount")),
        op("storage_accounts", "delete", DELETE, STORAGE_ACCOUNT, &[RG, ACCOUNT_NAME], Returns::Nothing),
    ],
};

// Network

static NETWORK: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::Network,
    api_version: "2024-01-01",
    operations: &[
        op("virtual_networks", "list_all", GET, "/subscriptions/{subscription_id}/providers/Microsoft.Network/virtualNetworks", &[], Returns::Paged("VirtualNetwork")),
        op("virtual_networks", "list", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Network/virtualNetworks", &[RG], Returns::Paged("VirtualNetwork")),
        op("virtual_networks", "get", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Network/virtualNetworks/{virtual_network_name}", &[RG, Param::path("virtual_network_name"), EXPAND], Returns::Model("VirtualNetwork")),
        op("network_security_groups", "list_all", GET, "/subscriptions/{subscription_id}/providers/Microsoft.Network/networkSecurityGroups", &[], Returns::Paged("NetworkSecurityGroup")),
        op("network_security_groups", "list", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Network/networkSecurityGroups", &[RG], Returns::Paged("NetworkSecurityGroup")),
        op("public_ip_addresses", "list_all", GET, "/subscriptions/{subscription_id}/providers/Microsoft.Network/publicIPAddresses", &[], Returns::Paged("PublicIPAddress")),
        op("public_ip_addresses", "list", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Network/publicIPAddresses", &[RG], Returns::Paged("PublicIPAddress")),
        op("network_interfaces", "list_all", GET, "/subscriptions/{subscription_id}/providers/Microsoft.Network/networkInterfaces", &[], Returns::Paged("NetworkInterface")),
        op("network_interfaces", "list", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Network/networkInterfaces", &[RG], Returns::Paged("NetworkInterface")),
    ],
};

// Authorization

static AUTHORIZATION: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::Authorization,
    api_version: "2022-04-01",
    operations: &[
        op("role_assignments", "list_for_subscription", GET, "/subscriptions/{subscription_id}/providers/Microsoft.Authorization/roleAssignments", &[FILTER], Returns::Paged("RoleAssignment")),
        op("role_assignments", "list_for_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Authorization/roleAssignments", &[RG, FILTER], Returns::Paged("RoleAssignment")),
        op("role_assignments", "list_for_scope", GET, "/{scope}/providers/Microsoft.Authorization/roleAssignments", &[Param::scope("scope"), FILTER], Returns::Paged("RoleAssignment")),
        op("role_definitions", "list", GET, "/{scope}/providers/Microsoft.Authorization/roleDefinitions", &[Param::scope("scope"), FILTER], Returns::Paged("RoleDefinition")),
    ],
};

// App Service

const SITE_NAME: Param = Param::path("name");
const SITE: &str = "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Web/sites/{name}";

static WEB: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::Web,
    api_version: "2023-12-01",
    operations: &[
        op("web_apps", "list", GET, "/subscriptions/{subscription_id}/providers/Microsoft.Web/sites", &[], Returns::Paged("Site")),
        op("web_apps", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Web/sites", &[RG], Returns::Paged("Site")),
        op("web_apps", "get", GET, SITE, &[RG, SITE_NAME], Returns::Model("Site")),
        op("web_apps", "restart", POST, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Web/sites/{name}/restart", &[RG, SITE_NAME, Param::query("soft_restart", "softRestart"), Param::query("synchronous", "synchronous")], Returns::Nothing),
        op("web_apps", "start", POST, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Web/sites/{name}/start", &[RG, SITE_NAME], Returns::Nothing),
        op("web_apps", "stop", POST, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Web/sites/{name}/stop", &[RG, SITE_NAME], Returns::Nothing),
        op("app_service_plans", "list", GET, "/subscriptions/{subscription_id}/providers/Microsoft.Web/serverfarms", &[Param::query("detailed", "detailed")], Returns::Paged("AppServicePlan")),
        op("app_service_plans", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Web/serverfarms", &[RG], Returns::Paged("AppServicePlan")),
    ],
};

// Log Analytics

static LOG_ANALYTICS: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::LogAnalytics,
    api_version: "2022-10-01",
    operations: &[
        op("workspaces", "list", GET, "/subscriptions/{subscription_id}/providers/Microsoft.OperationalInsights/workspaces", &[], Returns::Paged("Workspace")),
        op("workspaces", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourcegroups/{resource_group_name}/providers/Microsoft.OperationalInsights/workspaces", &[RG], Returns::Paged("Workspace")),
        op("workspaces", "get", GET, "/subscriptions/{subscription_id}/resourcegroups/{resource_group_name}/providers/Microsoft.OperationalInsights/workspaces/{workspace_name}", &[RG, Param::path("workspace_name")], Returns::Model("Workspace")),
    ],
};

// Container Instances

const CONTAINER_GROUP_NAME: Param = Param::path("container_group_name");

static CONTAINER_INSTANCE: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::ContainerInstance,
    api_version: "2023-05-01",
    operations: &[
        op("container_groups", "list", GET, "/subscriptions/{subscription_id}/providers/Microsoft.ContainerInstance/containerGroups", &[], Returns::Paged("ContainerGroup")),
        op("container_groups", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ContainerInstance/containerGroups", &[RG], Returns::Paged("ContainerGroup")),
        op("container_groups", "get", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ContainerInstance/containerGroups/{container_group_name}", &[RG, CONTAINER_GROUP_NAME], Returns::Model("ContainerGroup")),
        op("container_groups", "begin_restart", POST, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ContainerInstance/containerGroups/{container_group_name}/restart", &[RG, CONTAINER_GROUP_NAME], Returns::Poller("ContainerGroup")),
        op("container_groups", "begin_start", POST, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ContainerInstance/containerGroups/{container_group_name}/start", &[RG, CONTAINER_GROUP_NAME], Returns::Poller("ContainerGroup")),
        op("container_groups", "stop", POST, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ContainerInstance/containerGroups/{container_group_name}/stop", &[RG, CONTAINER_GROUP_NAME], Returns::Nothing),
    ],
};

// Kubernetes Service

static CONTAINER_SERVICE: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::ContainerService,
    api_version: "2024-02-01",
    operations: &[
        op("managed_clusters", "list", GET, "/subscriptions/{subscription_id}/providers/Microsoft.ContainerService/managedClusters", &[], Returns::Paged("ManagedCluster")),
        op("managed_clusters", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ContainerService/managedClusters", &[RG], Returns::Paged("ManagedCluster")),
        op("managed_clusters", "get", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ContainerService/managedClusters/{resource_name}", &[RG, Param::path("resource_name")], Returns::Model("ManagedCluster")),
    ],
};

// Monitor

const RESOURCE_URI: Param = Param::scope("resource_uri");

static MONITOR: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::Monitor,
    api_version: "2018-01-01",
    operations: &[
        op(
            "activity_logs",
            "list",
            GET,
            "/subscriptions/{subscription_id}/providers/Microsoft.Insights/eventtypes/management/values",
            &[Param::required_query("filter", "$filter"), Param::query("select", "$select")],
            Returns::Paged("EventData"),
        )
        .api("2015-04-01"),
        op("metric_alerts", "list_by_subscription", GET, "/subscriptions/{subscription_id}/providers/Microsoft.Insights/metricAlerts", &[], Returns::Paged("MetricAlertResource")).api("2018-03-01"),
        op("metric_alerts", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Insights/metricAlerts", &[RG], Returns::Paged("MetricAlertResource")).api("2018-03-01"),
        op("action_groups", "list_by_subscription_id", GET, "/subscriptions/{subscription_id}/providers/Microsoft.Insights/actionGroups", &[], Returns::Paged("ActionGroupResource")).api("2023-01-01"),
        op(
            "metrics",
            "list",
            GET,
            "/{resource_uri}/providers/Microsoft.Insights/metrics",
            &[
                RESOURCE_URI,
                Param::query("timespan", "timespan"),
                Param::query("interval", "interval"),
                Param::query("metricnames", "metricnames"),
                Param::query("aggregation", "aggregation"),
                TOP,
                Param::query("orderby", "orderby"),
                FILTER,
                Param::query("result_type", "resultType"),
                Param::query("metricnamespace", "metricnamespace"),
            ],
            Returns::Model("Response"),
        ),
        op("diagnostic_settings", "list", GET, "/{resource_uri}/providers/Microsoft.Insights/diagnosticSettings", &[RESOURCE_URI], Returns::Paged("DiagnosticSettingsResource")).api("2021-05-01-preview"),
    ],
};

// Key Vault

static KEY_VAULT: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::KeyVault,
    api_version: "2023-07-01",
    operations: &[
        op("vaults", "list_by_subscription", GET, "/subscriptions/{subscription_id}/providers/Microsoft.KeyVault/vaults", &[TOP], Returns::Paged("Vault")),
        op("vaults", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.KeyVault/vaults", &[RG, TOP], Returns::Paged("Vault")),
        op("vaults", "get", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.KeyVault/vaults/{vault_name}", &[RG, Param::path("vault_name")], Returns::Model("Vault")),
        op("vaults", "list_deleted", GET, "/subscriptions/{subscription_id}/providers/Microsoft.KeyVault/deletedVaults", &[], Returns::Paged("DeletedVault")),
    ],
};

// Cognitive Services

static COGNITIVE_SERVICES: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::CognitiveServices,
    api_version: "2023-05-01",
    operations: &[
        op("accounts", "list", GET, "/subscriptions/{subscription_id}/providers/Microsoft.CognitiveServices/accounts", &[], Returns::Paged("Account")),
        op("accounts", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.CognitiveServices/accounts", &[RG], Returns::Paged("Account")),
        op("accounts", "get", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.CognitiveServices/accounts/{account_name}", &[RG, ACCOUNT_NAME], Returns::Model("Account")),
        op("accounts", "list_keys", POST, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.CognitiveServices/accounts/{account_name}/listKeys", &[RG, ACCOUNT_NAME], Returns::Model("ApiKeys")),
    ],
};

// Event Grid

static EVENT_GRID: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::EventGrid,
    api_version: "2022-06-15",
    operations: &[
        op("topics", "list_by_subscription", GET, "/subscriptions/{subscription_id}/providers/Microsoft.EventGrid/topics", &[FILTER, TOP], Returns::Paged("Topic")),
        op("topics", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.EventGrid/topics", &[RG, FILTER, TOP], Returns::Paged("Topic")),
        op("domains", "list_by_subscription", GET, "/subscriptions/{subscription_id}/providers/Microsoft.EventGrid/domains", &[FILTER, TOP], Returns::Paged("Domain")),
        op("system_topics", "list_by_subscription", GET, "/subscriptions/{subscription_id}/providers/Microsoft.EventGrid/systemTopics", &[FILTER, TOP], Returns::Paged("SystemTopic")),
    ],
};

// Service Bus

const NAMESPACE_NAME: Param = Param::path("namespace_name");
const SKIP: Param = Param::query("skip", "$skip");

static SERVICE_BUS: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::ServiceBus,
    api_version: "2021-11-01",
    operations: &[
        op("namespaces", "list", GET, "/subscriptions/{subscription_id}/providers/Microsoft.ServiceBus/namespaces", &[], Returns::Paged("SBNamespace")),
        op("namespaces", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ServiceBus/namespaces", &[RG], Returns::Paged("SBNamespace")),
        op("queues", "list_by_namespace", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ServiceBus/namespaces/{namespace_name}/queues", &[RG, NAMESPACE_NAME, SKIP, TOP], Returns::Paged("SBQueue")),
        op("topics", "list_by_namespace", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ServiceBus/namespaces/{namespace_name}/topics", &[RG, NAMESPACE_NAME, SKIP, TOP], Returns::Paged("SBTopic")),
    ],
};

// Logic Apps

const WORKFLOW_NAME: Param = Param::path("workflow_name");

static LOGIC: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::Logic,
    api_version: "2019-05-01",
    operations: &[
        op("workflows", "list_by_subscription", GET, "/subscriptions/{subscription_id}/providers/Microsoft.Logic/workflows", &[TOP, FILTER], Returns::Paged("Workflow")),
        op("workflows", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Logic/workflows", &[RG, TOP, FILTER], Returns::Paged("Workflow")),
        op("workflows", "get", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Logic/workflows/{workflow_name}", &[RG, WORKFLOW_NAME], Returns::Model("Workflow")),
        op("workflow_runs", "list", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Logic/workflows/{workflow_name}/runs", &[RG, WORKFLOW_NAME, TOP, FILTER], Returns::Paged("WorkflowRun")),
    ],
};

// API Management

const SERVICE_NAME: Param = Param::path("service_name");

static API_MANAGEMENT: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::ApiManagement,
    api_version: "2022-08-01",
    operations: &[
        op("api_management_service", "list", GET, "/subscriptions/{subscription_id}/providers/Microsoft.ApiManagement/service", &[], Returns::Paged("ApiManagementServiceResource")),
        op("api_management_service", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ApiManagement/service", &[RG], Returns::Paged("ApiManagementServiceResource")),
        op("api_management_service", "get", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ApiManagement/service/{service_name}", &[RG, SERVICE_NAME], Returns::Model("ApiManagementServiceResource")),
        op("api", "list_by_service", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ApiManagement/service/{service_name}/apis", &[RG, SERVICE_NAME, FILTER, TOP, SKIP], Returns::Paged("ApiContract")),
    ],
};

// DNS

const ZONE_NAME: Param = Param::path("zone_name");

static DNS: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::Dns,
    api_version: "2018-05-01",
    operations: &[
        op("zones", "list", GET, "/subscriptions/{subscription_id}/providers/Microsoft.Network/dnszones", &[TOP], Returns::Paged("Zone")),
        op("zones", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Network/dnsZones", &[RG, TOP], Returns::Paged("Zone")),
        op("zones", "get", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Network/dnsZones/{zone_name}", &[RG, ZONE_NAME], Returns::Model("Zone")),
        op("record_sets", "list_by_dns_zone", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.Network/dnsZones/{zone_name}/recordsets", &[RG, ZONE_NAME, TOP, Param::query("recordsetnamesuffix", "$recordsetnamesuffix")], Returns::Paged("RecordSet")),
    ],
};

// Container Registry

const REGISTRY_NAME: Param = Param::path("registry_name");

static CONTAINER_REGISTRY: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::ContainerRegistry,
    api_version: "2023-07-01",
    operations: &[
        op("registries", "list", GET, "/subscriptions/{subscription_id}/providers/Microsoft.ContainerRegistry/registries", &[], Returns::Paged("Registry")),
        op("registries", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ContainerRegistry/registries", &[RG], Returns::Paged("Registry")),
        op("registries", "get", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ContainerRegistry/registries/{registry_name}", &[RG, REGISTRY_NAME], Returns::Model("Registry")),
        op("registries", "list_credentials", POST, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ContainerRegistry/registries/{registry_name}/listCredentials", &[RG, REGISTRY_NAME], Returns::Model("RegistryListCredentialsResult")),
    ],
};

// Managed identities

const IDENTITY_NAME: Param = Param::path("resource_name");
const IDENTITY: &str = "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ManagedIdentity/userAssignedIdentities/{resource_name}";

static MANAGED_IDENTITY: ServiceCatalog = ServiceCatalog {
    kind: ServiceKind::ManagedIdentity,
    api_version: "2023-01-31",
    operations: &[
        op("user_assigned_identities", "list_by_subscription", GET, "/subscriptions/{subscription_id}/providers/Microsoft.ManagedIdentity/userAssignedIdentities", &[], Returns::Paged("Identity")),
        op("user_assigned_identities", "list_by_resource_group", GET, "/subscriptions/{subscription_id}/resourceGroups/{resource_group_name}/providers/Microsoft.ManagedIdentity/userAssignedIdentities", &[RG], Returns::Paged("Identity")),
        op("user_assigned_identities", "get", GET, IDENTITY, &[RG, IDENTITY_NAME], Returns::Model("Identity")),
        op("user_assigned_identities", "create_or_update", PUT, IDENTITY, &[RG, IDENTITY_NAME, PARAMETERS], Returns::Model("Identity")),
        op("user_assigned_identities", "delete", DELETE, IDENTITY, &[RG, IDENTITY_NAME], Returns::Nothing),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_service_has_operations() {
        for kind in ServiceKind::ALL {
            let catalog = catalog(kind);
            assert_eq!(catalog.kind, kind);
            assert!(!catalog.operations.is_empty(), "{kind} has no operations");
        }
    }

    #[test]
    fn operations_are_unique_per_service() {
        for kind in ServiceKind::ALL {
            let operations = catalog(kind).operations;
            for (i, spec) in operations.iter().enumerate() {
                let duplicate = operations[i + 1..]
                    .iter()
                    .any(|other| other.group == spec.group && other.method == spec.method);
                assert!(!duplicate, "{kind}: {}.{} declared twice", spec.group, spec.method);
            }
        }
    }

    #[test]
    fn every_placeholder_is_bound_by_a_parameter() {
        for kind in ServiceKind::ALL {
            for spec in catalog(kind).operations {
                for segment in spec.path.split('/') {
                    let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
                        continue;
                    };
                    let bound = name == "subscription_id" || spec.params.iter().any(|p| p.name == name);
                    assert!(bound, "{kind}: {}.{} leaves {{{name}}} unbound", spec.group, spec.method);
                }
            }
        }
    }

    #[test]
    fn begin_methods_return_pollers() {
        for kind in ServiceKind::ALL {
            for spec in catalog(kind).operations {
                assert_eq!(
                    spec.method.starts_with("begin_"),
                    matches!(spec.returns, Returns::Poller(_)),
                    "{kind}: {}.{}",
                    spec.group,
                    spec.method
                );
            }
        }
    }

    #[test]
    fn groups_are_listed_once_in_order() {
        let groups: Vec<_> = catalog(ServiceKind::Resource).groups().collect();
        assert_eq!(groups, ["resource_groups", "resources", "providers"]);
        assert!(catalog(ServiceKind::Compute).find("virtual_machines", "begin_start").is_some());
        assert!(catalog(ServiceKind::Compute).find("virtual_machines", "explode").is_none());
    }

    #[test]
    fn per_operation_api_version_overrides() {
        let spec = catalog(ServiceKind::Monitor).find("activity_logs", "list");
        assert_eq!(spec.and_then(|s| s.api_version), Some("2015-04-01"));
    }
}
