//! Pre-authenticated service clients and their operation groups.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use stratus_core::ServiceKind;

use crate::backend::Transport;
use crate::catalog::{catalog, OperationSpec, Param, ParamLocation, Returns, ServiceCatalog};
use crate::credential::TokenCredential;
use crate::http::{HttpMethod, RequestBody};
use crate::normalize::{normalize_as, Naming};
use crate::paging::Pager;
use crate::pipeline::{response_error, ArmPipeline};
use crate::poller::Poller;
use crate::value::{to_pascal_case, Output};
use crate::{EngineConfig, ExecutorError};

/// A client for one Resource Manager service, bound to a credential and
/// (except for the subscription client) a subscription.
pub struct ServiceClient {
    kind: ServiceKind,
    subscription_id: Option<String>,
    pipeline: Arc<ArmPipeline>,
    catalog: &'static ServiceCatalog,
    lro_interval: Duration,
}

impl ServiceClient {
    #[must_use]
    pub fn new(
        kind: ServiceKind,
        credential: Arc<dyn TokenCredential>,
        subscription_id: Option<String>,
        transport: Arc<dyn Transport>,
        config: &EngineConfig,
    ) -> Self {
        let pipeline = ArmPipeline::new(credential, transport, &config.resource_manager, config.token_scope());
        Self {
            kind,
            subscription_id,
            pipeline: Arc::new(pipeline),
            catalog: catalog(kind),
            lro_interval: config.lro_polling_interval,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    #[must_use]
    pub fn subscription_id(&self) -> Option<&str> {
        self.subscription_id.as_deref()
    }

    /// The operation group bound under `name`, if the service has one.
    #[must_use]
    pub fn group(self: &Arc<Self>, name: &str) -> Option<OperationGroup> {
        self.catalog.groups().find(|group| *group == name).map(|group| OperationGroup {
            client: Arc::clone(self),
            name: group,
        })
    }

    pub fn group_names(&self) -> impl Iterator<Item = &'static str> {
        self.catalog.groups()
    }

    /// Bind the call's arguments to `spec`, issue the request and shape the
    /// response according to what the operation returns.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Type`] for arguments that do not match the
    /// operation, and any pipeline error the request produces.
    pub async fn invoke(
        &self,
        spec: &'static OperationSpec,
        args: Vec<Output>,
        kwargs: Vec<(String, Output)>,
    ) -> Result<Output, ExecutorError> {
        let qualified = format!("{}Operations.{}", to_pascal_case(spec.group), spec.method);
        let bound = bind_arguments(spec, &qualified, args, kwargs)?;

        let segments = self.render_path(spec, &bound)?;
        let mut query = vec![(
            "api-version",
            spec.api_version.unwrap_or(self.catalog.api_version).to_owned(),
        )];
        let mut body = RequestBody::Empty;
        for (param, value) in bound {
            match param.location {
                ParamLocation::Query(wire) if !matches!(value, Output::None) => {
                    query.push((wire, text_argument(param.name, &value)?));
                }
                ParamLocation::Body => {
                    body = RequestBody::Json(normalize_as(value, Naming::Wire).await?);
                }
                _ => {}
            }
        }
        let url = self.pipeline.url(&segments, &query)?;

        tracing::debug!(client = self.type_name(), operation = %qualified, "invoking operation");

        match spec.returns {
            Returns::Paged(item_type) => Ok(Output::Paged(Pager::new(Arc::clone(&self.pipeline), url, item_type))),
            Returns::Model(type_name) => {
                let response = self.pipeline.send(spec.verb, url, body).await?;
                Ok(response
                    .json()?
                    .map_or(Output::None, |b| Output::from_arm(type_name, b)))
            }
            Returns::Poller(type_name) => {
                let response = self.pipeline.send(spec.verb, url.clone(), body).await?;
                let poller = Poller::new(
                    Arc::clone(&self.pipeline),
                    spec.verb,
                    url,
                    &response,
                    type_name,
                    self.lro_interval,
                )?;
                Ok(Output::Poller(poller))
            }
            Returns::Exists => {
                let response = self.pipeline.send_raw(HttpMethod::Head, url, body).await?;
                match response.status {
                    404 => Ok(Output::Bool(false)),
                    _ if response.is_success() => Ok(Output::Bool(true)),
                    _ => Err(response_error(&response)),
                }
            }
            Returns::Nothing => {
                self.pipeline.send(spec.verb, url, body).await?;
                Ok(Output::None)
            }
        }
    }

    fn render_path(&self, spec: &OperationSpec, bound: &[(Param, Output)]) -> Result<Vec<String>, ExecutorError> {
        let mut segments = Vec::new();
        for segment in spec.path.split('/').filter(|s| !s.is_empty()) {
            let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
                segments.push(segment.to_owned());
                continue;
            };

            match bound.iter().find(|(param, _)| param.name == name) {
                Some((param, value)) if param.location == ParamLocation::Scope => {
                    let scope = text_argument(param.name, value)?;
                    segments.extend(scope.split('/').filter(|s| !s.is_empty()).map(str::to_owned));
                }
                Some((param, value)) => segments.push(text_argument(param.name, value)?),
                None if name == "subscription_id" => {
                    let subscription = self.subscription_id.clone().ok_or_else(|| {
                        ExecutorError::type_error(format!("{} has no subscription_id", self.type_name()))
                    })?;
                    segments.push(subscription);
                }
                None => {
                    return Err(ExecutorError::type_error(format!(
                        "{}.{}() requires '{name}'",
                        spec.group, spec.method
                    )))
                }
            }
        }
        Ok(segments)
    }
}

impl fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClient")
            .field("kind", &self.kind)
            .field("subscription_id", &self.subscription_id)
            .finish_non_exhaustive()
    }
}

/// A named group of operations on a client, e.g. `virtual_machines`.
#[derive(Debug, Clone)]
pub struct OperationGroup {
    client: Arc<ServiceClient>,
    name: &'static str,
}

impl OperationGroup {
    #[must_use]
    pub fn client(&self) -> &Arc<ServiceClient> {
        &self.client
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Class-style name, e.g. `VirtualMachinesOperations`.
    #[must_use]
    pub fn type_name(&self) -> String {
        format!("{}Operations", to_pascal_case(self.name))
    }

    #[must_use]
    pub fn method(&self, name: &str) -> Option<&'static OperationSpec> {
        self.client.catalog.find(self.name, name)
    }
}

/// Match positional and keyword arguments against the declared parameters.
fn bind_arguments(
    spec: &OperationSpec,
    qualified: &str,
    args: Vec<Output>,
    kwargs: Vec<(String, Output)>,
) -> Result<Vec<(Param, Output)>, ExecutorError> {
    if args.len() > spec.params.len() {
        return Err(ExecutorError::type_error(format!(
            "{qualified}() takes {} positional arguments but {} were given",
            spec.params.len(),
            args.len()
        )));
    }

    let mut slots: Vec<Option<Output>> = vec![None; spec.params.len()];
    for (slot, value) in slots.iter_mut().zip(args) {
        *slot = Some(value);
    }

    for (name, value) in kwargs {
        let Some(index) = spec.params.iter().position(|p| p.name == name) else {
            return Err(ExecutorError::type_error(format!(
                "{qualified}() got an unexpected keyword argument '{name}'"
            )));
        };
        if slots[index].is_some() {
            return Err(ExecutorError::type_error(format!(
                "{qualified}() got multiple values for argument '{name}'"
            )));
        }
        slots[index] = Some(value);
    }

    let missing: Vec<&str> = spec
        .params
        .iter()
        .zip(&slots)
        .filter(|(param, slot)| param.required && slot.is_none())
        .map(|(param, _)| param.name)
        .collect();
    if !missing.is_empty() {
        return Err(ExecutorError::type_error(missing_arguments(qualified, &missing)));
    }

    Ok(spec
        .params
        .iter()
        .zip(slots)
        .filter_map(|(param, slot)| slot.map(|value| (*param, value)))
        .collect())
}

fn missing_arguments(qualified: &str, missing: &[&str]) -> String {
    let quoted: Vec<String> = missing.iter().map(|name| format!("'{name}'")).collect();
    let list = match quoted.as_slice() {
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
        [] => String::new(),
    };
    let noun = if missing.len() == 1 { "argument" } else { "arguments" };
    format!("{qualified}() missing {} required positional {noun}: {list}", missing.len())
}

/// Render a path or query argument as text.
fn text_argument(name: &str, value: &Output) -> Result<String, ExecutorError> {
    match value {
        Output::Str(s) => Ok(s.clone()),
        Output::Number(n) => Ok(n.to_string()),
        Output::Bool(b) => Ok(b.to_string()),
        other => Err(ExecutorError::type_error(format!(
            "argument '{name}' must be str, not {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::{client_with, empty_response, json_response, MockTransport, TEST_SUBSCRIPTION};

    fn s(text: &str) -> Output {
        Output::Str(text.to_owned())
    }

    fn spec(kind: ServiceKind, group: &str, method: &str) -> &'static OperationSpec {
        match catalog(kind).find(group, method) {
            Some(spec) => spec,
            None => panic!("{group}.{method} missing from {kind}"),
        }
    }

    fn bind_error(kind: ServiceKind, group: &str, method: &str, args: Vec<Output>, kwargs: Vec<(String, Output)>) -> String {
        match bind_arguments(spec(kind, group, method), "Ops.m", args, kwargs) {
            Err(e) => e.to_string(),
            Ok(bound) => panic!("expected binding failure, got {} arguments", bound.len()),
        }
    }

    #[test]
    fn missing_arguments_are_listed_python_style() {
        assert_eq!(
            bind_error(ServiceKind::Compute, "virtual_machines", "get", vec![s("rg")], vec![]),
            "Ops.m() missing 1 required positional argument: 'vm_name'"
        );
        assert_eq!(
            bind_error(ServiceKind::Compute, "virtual_machines", "get", vec![], vec![]),
            "Ops.m() missing 2 required positional arguments: 'resource_group_name' and 'vm_name'"
        );
        assert_eq!(
            missing_arguments("f", &["a", "b", "c"]),
            "f() missing 3 required positional arguments: 'a', 'b', and 'c'"
        );
    }

    #[test]
    fn keyword_errors_are_type_errors() {
        assert_eq!(
            bind_error(
                ServiceKind::Resource,
                "resource_groups",
                "get",
                vec![s("rg")],
                vec![("resource_group_name".to_owned(), s("rg"))]
            ),
            "Ops.m() got multiple values for argument 'resource_group_name'"
        );
        assert_eq!(
            bind_error(ServiceKind::Resource, "resource_groups", "list", vec![], vec![("colour".to_owned(), s("red"))]),
            "Ops.m() got an unexpected keyword argument 'colour'"
        );
        assert_eq!(
            bind_error(ServiceKind::Resource, "resource_groups", "get", vec![s("a"), s("b")], vec![]),
            "Ops.m() takes 1 positional arguments but 2 were given"
        );
    }

    #[tokio::test]
    async fn get_renders_path_and_api_version() {
        let transport = Arc::new(MockTransport::new());
        let path = format!(
            "/subscriptions/{TEST_SUBSCRIPTION}/resourceGroups/rg%201/providers/Microsoft.Compute/virtualMachines/web-1"
        );
        transport.route(HttpMethod::Get, &path, json_response(200, &json!({"name": "web-1"})));
        let client = client_with(ServiceKind::Compute, &transport);

        let result = client
            .invoke(
                spec(ServiceKind::Compute, "virtual_machines", "get"),
                vec![s("rg 1")],
                vec![("vm_name".to_owned(), s("web-1"))],
            )
            .await;
        assert!(matches!(result, Ok(Output::Model(_))), "got {result:?}");

        let request = transport.last_request_to(&path).unwrap_or_else(|| panic!("no request to {path}"));
        assert_eq!(request.url.query(), Some("api-version=2024-03-01"));
    }

    #[tokio::test]
    async fn scope_parameters_splice_raw_segments() {
        let transport = Arc::new(MockTransport::new());
        let path = "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Authorization/roleDefinitions";
        transport.route(HttpMethod::Get, path, json_response(200, &json!({"value": [{"name": "Reader"}]})));
        let client = client_with(ServiceKind::Authorization, &transport);

        let result = client
            .invoke(
                spec(ServiceKind::Authorization, "role_definitions", "list"),
                vec![s("/subscriptions/s/resourceGroups/rg")],
                vec![("filter".to_owned(), s("roleName eq 'Reader'"))],
            )
            .await;
        let Ok(Output::Paged(pager)) = result else {
            panic!("expected pager, got {result:?}");
        };
        assert!(matches!(pager.collect_items().await, Ok(ref items) if items.len() == 1));

        let request = transport.last_request_to(path).unwrap_or_else(|| panic!("no request to {path}"));
        let query: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
        assert!(query.contains(&("$filter".to_owned(), "roleName eq 'Reader'".to_owned())));
    }

    #[tokio::test]
    async fn check_existence_maps_404_to_false() {
        let transport = Arc::new(MockTransport::new());
        let path = format!("/subscriptions/{TEST_SUBSCRIPTION}/resourcegroups/present");
        transport.route(HttpMethod::Head, &path, empty_response(204));
        let client = client_with(ServiceKind::Resource, &transport);
        let check = spec(ServiceKind::Resource, "resource_groups", "check_existence");

        assert!(matches!(client.invoke(check, vec![s("present")], vec![]).await, Ok(Output::Bool(true))));
        assert!(matches!(client.invoke(check, vec![s("absent")], vec![]).await, Ok(Output::Bool(false))));
    }

    #[tokio::test]
    async fn body_parameters_are_sent_with_wire_names() {
        let transport = Arc::new(MockTransport::new());
        let path = format!("/subscriptions/{TEST_SUBSCRIPTION}/resourcegroups/new-rg");
        transport.route(HttpMethod::Put, &path, json_response(201, &json!({"name": "new-rg", "location": "westeurope"})));
        let client = client_with(ServiceKind::Resource, &transport);

        let parameters = Output::from_plain(json!({"location": "westeurope", "tags": {"env": "dev"}}));
        let result = client
            .invoke(
                spec(ServiceKind::Resource, "resource_groups", "create_or_update"),
                vec![s("new-rg"), parameters],
                vec![],
            )
            .await;
        assert!(matches!(result, Ok(Output::Model(_))), "got {result:?}");

        let request = transport.last_request_to(&path).unwrap_or_else(|| panic!("no request to {path}"));
        assert_eq!(
            request.body,
            RequestBody::Json(json!({"location": "westeurope", "tags": {"env": "dev"}}))
        );
    }

    #[test]
    fn subscription_client_exposes_its_groups() {
        let transport = Arc::new(MockTransport::new());
        let client = client_with(ServiceKind::Subscription, &transport);
        assert!(client.group("subscriptions").is_some());
        assert!(client.group("virtual_machines").is_none());
        let groups: Vec<_> = client.group_names().collect();
        assert_eq!(groups, ["subscriptions", "tenants"]);
    }
}
