//! The fixed set of clients exposed to a snippet.

use std::collections::HashMap;
use std::sync::Arc;

use stratus_core::{ServiceKind, SUBSCRIPTION_ID_BINDING};

use crate::backend::Connector;
use crate::client::ServiceClient;
use crate::credential::TokenCredential;
use crate::value::Output;
use crate::ExecutorError;

/// One freshly constructed client per [`ServiceKind`], all sharing a
/// credential. Lives for a single snippet execution.
#[derive(Debug)]
pub struct ClientRegistry {
    subscription_id: String,
    clients: Vec<Arc<ServiceClient>>,
}

impl ClientRegistry {
    /// Construct every client eagerly, each with its own transport.
    ///
    /// # Errors
    /// Returns [`ExecutorError::ClientConstruction`] naming the first client
    /// whose transport could not be built.
    pub fn build(
        credential: &Arc<dyn TokenCredential>,
        subscription_id: &str,
        connector: &dyn Connector,
    ) -> Result<Self, ExecutorError> {
        let mut clients = Vec::with_capacity(ServiceKind::ALL.len());
        for kind in ServiceKind::ALL {
            let transport = connector.transport().map_err(|e| ExecutorError::ClientConstruction {
                client: kind.type_name(),
                reason: e.to_string(),
            })?;
            let subscription = kind.is_subscription_scoped().then(|| subscription_id.to_owned());
            clients.push(Arc::new(ServiceClient::new(
                kind,
                Arc::clone(credential),
                subscription,
                transport,
                connector.config(),
            )));
        }

        tracing::debug!(clients = clients.len(), "client registry built");
        Ok(Self {
            subscription_id: subscription_id.to_owned(),
            clients,
        })
    }

    #[must_use]
    pub fn client(&self, kind: ServiceKind) -> Option<&Arc<ServiceClient>> {
        self.clients.iter().find(|client| client.kind() == kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Bindings visible to a snippet: every client under its binding name
    /// plus `subscriptionId`.
    #[must_use]
    pub fn namespace(&self) -> HashMap<String, Output> {
        let mut namespace: HashMap<String, Output> = self
            .clients
            .iter()
            .map(|client| (client.kind().binding_name().to_owned(), Output::Client(Arc::clone(client))))
            .collect();
        namespace.insert(
            SUBSCRIPTION_ID_BINDING.to_owned(),
            Output::Str(self.subscription_id.clone()),
        );
        namespace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_credential, MockConnector, TEST_SUBSCRIPTION};

    #[test]
    fn builds_one_client_per_service() {
        let connector = MockConnector::new();
        let registry = match ClientRegistry::build(&test_credential(&connector), TEST_SUBSCRIPTION, &connector) {
            Ok(r) => r,
            Err(e) => panic!("registry failed: {e}"),
        };
        assert_eq!(registry.len(), 20);
        assert_eq!(connector.transports_built(), 20);

        let subscription = registry.client(ServiceKind::Subscription).map(|c| c.subscription_id());
        assert_eq!(subscription, Some(None));
        let compute = registry.client(ServiceKind::Compute).map(|c| c.subscription_id());
        assert_eq!(compute, Some(Some(TEST_SUBSCRIPTION)));
    }

    #[test]
    fn namespace_holds_clients_and_subscription_id() {
        let connector = MockConnector::new();
        let registry = match ClientRegistry::build(&test_credential(&connector), TEST_SUBSCRIPTION, &connector) {
            Ok(r) => r,
            Err(e) => panic!("registry failed: {e}"),
        };
        let namespace = registry.namespace();
        assert_eq!(namespace.len(), 21);
        assert!(matches!(namespace.get("msi_client"), Some(Output::Client(_))));
        assert!(matches!(namespace.get("subscriptionId"), Some(Output::Str(s)) if s == TEST_SUBSCRIPTION));
    }

    #[test]
    fn construction_failure_names_the_client() {
        let connector = MockConnector::new().failing_after(2);
        let err = ClientRegistry::build(&test_credential(&connector), TEST_SUBSCRIPTION, &connector).err();
        assert!(
            matches!(err, Some(ExecutorError::ClientConstruction { client: "ComputeManagementClient", .. })),
            "got {err:?}"
        );
    }
}
