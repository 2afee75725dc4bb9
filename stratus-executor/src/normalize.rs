//! Recursive conversion of snippet values into plain JSON.

use std::future::Future;
use std::pin::Pin;

use serde_json::{Map, Value};

use crate::value::Output;
use crate::ExecutorError;

/// Boxed future used for recursion through nested values.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Which key a model attribute is written under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
    /// snake_case attribute names; used for results and `as_dict()`.
    Attribute,
    /// Wire names with flattened attributes regrouped under `properties`;
    /// used for request bodies.
    Wire,
}

/// Normalize a result value using attribute names.
///
/// # Errors
/// Fails if draining a page or waiting on a poller fails.
pub fn normalize(value: Output) -> BoxFuture<'static, Result<Value, ExecutorError>> {
    normalize_as(value, Naming::Attribute)
}

/// Normalize `value` into JSON:
///
/// - pages are drained and each element normalized;
/// - pollers are waited on and their final resource normalized;
/// - mappings keep their keys, lists keep their order;
/// - models become mappings of their non-private attributes;
/// - clients become a mapping of operation group names to `{}`, and
///   operation groups and methods become `{}`.
///
/// # Errors
/// Fails if draining a page or waiting on a poller fails.
pub fn normalize_as(value: Output, naming: Naming) -> BoxFuture<'static, Result<Value, ExecutorError>> {
    Box::pin(async move {
        Ok(match value {
            Output::None => Value::Null,
            Output::Bool(b) => Value::Bool(b),
            Output::Number(n) => Value::Number(n),
            Output::Str(s) => Value::String(s),
            Output::List(items) => Value::Array(normalize_all(items, naming).await?),
            Output::Map(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, item) in entries {
                    map.insert(key, normalize_as(item, naming).await?);
                }
                Value::Object(map)
            }
            Output::Model(model) => {
                let mut map = Map::new();
                let mut properties = Map::new();
                for (name, attribute) in model.attributes() {
                    if name.starts_with('_') {
                        continue;
                    }
                    let item = normalize_as(attribute.value.clone(), naming).await?;
                    match naming {
                        Naming::Attribute => {
                            map.insert(name.to_owned(), item);
                        }
                        Naming::Wire if attribute.flattened => {
                            properties.insert(attribute.wire_name.clone(), item);
                        }
                        Naming::Wire => {
                            map.insert(attribute.wire_name.clone(), item);
                        }
                    }
                }
                if !properties.is_empty() {
                    map.insert("properties".to_owned(), Value::Object(properties));
                }
                Value::Object(map)
            }
            Output::Paged(pager) => Value::Array(normalize_all(pager.collect_items().await?, naming).await?),
            Output::Poller(poller) => normalize_as(poller.result().await?, naming).await?,
            Output::Client(client) => Value::Object(
                client
                    .group_names()
                    .map(|group| (group.to_owned(), Value::Object(Map::new())))
                    .collect(),
            ),
            Output::Group(_) | Output::Method(_) | Output::Builtin(_) => Value::Object(Map::new()),
        })
    })
}

async fn normalize_all(items: Vec<Output>, naming: Naming) -> Result<Vec<Value>, ExecutorError> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(normalize_as(item, naming).await?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::value::Builtin;

    async fn normalized(value: Output, naming: Naming) -> Value {
        match normalize_as(value, naming).await {
            Ok(v) => v,
            Err(e) => panic!("normalization failed: {e}"),
        }
    }

    fn vm_model() -> Output {
        Output::from_arm(
            "VirtualMachine",
            json!({
                "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/vm",
                "name": "vm",
                "@odata.etag": "W/1",
                "properties": {"hardwareProfile": {"vmSize": "Standard_B2s"}, "vmId": "abc"},
                "tags": {"Owner": "ops"},
            }),
        )
    }

    #[tokio::test]
    async fn models_use_snake_case_attributes_and_drop_private_ones() {
        assert_eq!(
            normalized(vm_model(), Naming::Attribute).await,
            json!({
                "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/vm",
                "name": "vm",
                "hardware_profile": {"vm_size": "Standard_B2s"},
                "vm_id": "abc",
                "tags": {"Owner": "ops"},
            })
        );
    }

    #[tokio::test]
    async fn wire_naming_regroups_flattened_properties() {
        let value = normalized(vm_model(), Naming::Wire).await;
        assert_eq!(value["properties"]["hardwareProfile"]["vmSize"], "Standard_B2s");
        assert_eq!(value["properties"]["vmId"], "abc");
        assert_eq!(value["tags"]["Owner"], "ops");
        assert!(value.get("vm_id").is_none());
    }

    #[tokio::test]
    async fn nested_map_list_model_flattens_completely() {
        let value = Output::Map(
            [("vms".to_owned(), Output::List(vec![vm_model(), Output::Builtin(Builtin::Len)]))]
                .into_iter()
                .collect(),
        );
        let normalized = normalized(value, Naming::Attribute).await;
        assert_eq!(normalized["vms"][0]["name"], "vm");
        assert_eq!(normalized["vms"][1], json!({}));
    }

    fn json_leaf() -> impl proptest::strategy::Strategy<Value = Value> {
        use proptest::prelude::*;
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            (-1.0e9..1.0e9f64).prop_map(Value::from),
            "[a-zA-Z0-9 _@]{0,10}".prop_map(Value::String),
        ]
    }

    fn json_tree() -> impl proptest::strategy::Strategy<Value = Value> {
        use proptest::prelude::*;
        json_leaf().prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                proptest::collection::btree_map("[a-zA-Z_@]{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest::proptest! {
        #[test]
        fn proptest_normalization_is_identity_on_plain_json(value in json_tree()) {
            let runtime = match tokio::runtime::Builder::new_current_thread().build() {
                Ok(rt) => rt,
                Err(e) => panic!("runtime: {e}"),
            };
            let once = match runtime.block_on(normalize(Output::from_plain(value.clone()))) {
                Ok(v) => v,
                Err(e) => panic!("normalization failed: {e}"),
            };
            proptest::prop_assert_eq!(&once, &value);
            let twice = runtime.block_on(normalize(Output::from_plain(once)));
            proptest::prop_assert_eq!(twice.ok(), Some(value));
        }
    }
}
