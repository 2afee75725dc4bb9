//! Core types for the Stratus confirmed cloud-operation dispatcher.
//!
//! Defines the request model and confirmation handshake, the credential
//! bundle, the response envelopes, the fixed service namespace, and the
//! snippet language executed against it.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod credential;
pub mod envelope;
pub mod error;
pub mod request;
pub mod service;
pub mod snippet;

pub use credential::CredentialBundle;
pub use envelope::{
    Envelope, ExecutionStatus, GateResponse, NEXT_STEP_BATCH_COMPLETED, NEXT_STEP_COMPLETED,
    NEXT_STEP_FAILED, NO_RESULT_SENTINEL,
};
pub use error::{CoreError, INVALID_INPUT_MESSAGE};
pub use request::{
    decode_input, is_confirmed, CodePayload, OperationRequest, CONFIRMATION_DONE,
    CONFIRMED_STATUS, DEFAULT_OPERATION,
};
pub use service::{ServiceKind, RESULT_BINDING, SUBSCRIPTION_ID_BINDING};

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn confirmed(code: Value) -> Value {
        json!({
            "status": "confirmation_succeeded",
            "needs_confirmation": "done",
            "operation": "list RGs",
            "code": code,
        })
    }

    fn encode_n_times(value: &Value, depth: usize) -> Value {
        let mut encoded = value.clone();
        for _ in 0..depth {
            encoded = Value::String(encoded.to_string());
        }
        encoded
    }

    #[test]
    fn decode_input_unwraps_double_encoding() {
        let data = confirmed(json!("result = 1"));
        let decoded = decode_input(encode_n_times(&data, 2));
        assert_eq!(decoded, Ok(data));
    }

    #[test]
    fn decode_input_passes_structured_values_through() {
        let data = json!({"status": "pending"});
        assert_eq!(decode_input(data.clone()), Ok(data));
    }

    #[test]
    fn decode_input_rejects_non_json_text() {
        let err = decode_input(json!("not json"));
        assert!(matches!(err, Err(CoreError::InvalidInput { .. })), "got {err:?}");
    }

    #[test]
    fn decode_input_rejects_bare_string_payload() {
        // `"\"abc\""` decodes to the string `abc`, which is not JSON.
        let err = decode_input(json!("\"abc\""));
        assert!(matches!(err, Err(CoreError::InvalidInput { .. })), "got {err:?}");
    }

    #[test]
    fn invalid_input_display_is_the_caller_message() {
        let err = CoreError::InvalidInput { reason: "eof".to_owned() };
        assert_eq!(err.to_string(), INVALID_INPUT_MESSAGE);
    }

    #[test]
    fn handshake_requires_both_exact_values() {
        assert!(is_confirmed(&confirmed(json!(""))));
        assert!(!is_confirmed(&json!({"status": "confirmation_succeeded"})));
        assert!(!is_confirmed(&json!({"needs_confirmation": "done"})));
        assert!(!is_confirmed(&json!({
            "status": "confirmation_succeeded",
            "needs_confirmation": "Done",
        })));
        assert!(!is_confirmed(&json!({
            "status": "awaiting_confirmation",
            "needs_confirmation": "done",
        })));
        assert!(!is_confirmed(&json!([1, 2, 3])));
    }

    #[test]
    fn operation_request_extracts_single_and_batch_code() {
        let single = OperationRequest::confirmed(&confirmed(json!("result = 1")));
        assert_eq!(
            single.map(|r| r.code),
            Some(CodePayload::Single(json!("result = 1")))
        );

        let batch = OperationRequest::confirmed(&confirmed(json!(["a = 1", "b = 2"])));
        assert_eq!(
            batch.map(|r| r.code),
            Some(CodePayload::Batch(vec![json!("a = 1"), json!("b = 2")]))
        );
    }

    #[test]
    fn operation_request_defaults_missing_fields() {
        let data = json!({"status": "confirmation_succeeded", "needs_confirmation": "done"});
        let request = match OperationRequest::confirmed(&data) {
            Some(r) => r,
            None => panic!("handshake should pass"),
        };
        assert_eq!(request.operation, DEFAULT_OPERATION);
        assert_eq!(request.code, CodePayload::Single(json!("")));
    }

    #[test]
    fn operation_label_is_always_text() {
        let mut data = confirmed(json!("result = 1"));
        data["operation"] = Value::Null;
        assert_eq!(
            OperationRequest::confirmed(&data).map(|r| r.operation),
            Some(DEFAULT_OPERATION.to_owned())
        );

        data["operation"] = json!(42);
        assert_eq!(OperationRequest::confirmed(&data).map(|r| r.operation), Some("42".to_owned()));

        data["operation"] = json!({"name": "x"});
        assert_eq!(
            OperationRequest::confirmed(&data).map(|r| r.operation),
            Some(r#"{"name":"x"}"#.to_owned())
        );
    }

    #[test]
    fn operation_request_none_without_handshake() {
        assert!(OperationRequest::confirmed(&json!({"code": "result = 1"})).is_none());
    }

    #[test]
    fn completed_envelope_serializes_all_fields() {
        let envelope = Envelope::Completed {
            operation: "list RGs".to_owned(),
            result: json!([{"name": "rg1"}]),
        };
        assert_eq!(
            Value::from(envelope),
            json!({
                "status": "operation_completed",
                "operation": "list RGs",
                "result": [{"name": "rg1"}],
                "next_step": "Operation executed successfully",
            })
        );
    }

    #[test]
    fn failed_envelope_serializes_error_and_next_step() {
        let envelope = Envelope::Failed {
            operation: "op".to_owned(),
            error: "boom".to_owned(),
        };
        let value = match serde_json::to_value(&envelope) {
            Ok(v) => v,
            Err(e) => panic!("serialization failed: {e}"),
        };
        assert_eq!(value["status"], "execution_failed");
        assert_eq!(value["error"], "boom");
        assert_eq!(value["next_step"], NEXT_STEP_FAILED);
    }

    #[test]
    fn batch_item_is_result_or_whole_envelope() {
        let ok = Envelope::Completed { operation: "op".to_owned(), result: json!(3) };
        assert_eq!(ok.into_batch_item(), json!(3));

        let failed = Envelope::Failed { operation: "op".to_owned(), error: "boom".to_owned() };
        let item = failed.into_batch_item();
        assert_eq!(item["status"], "execution_failed");
        assert_eq!(item["error"], "boom");
    }

    #[test]
    fn gate_pass_through_serializes_as_the_data_itself() {
        let data = json!({"status": "pending", "extra": [1, 2]});
        let response = GateResponse::PassThrough(data.clone());
        assert_eq!(Value::from(response), data);
    }

    #[test]
    fn service_bindings_are_unique_and_round_trip() {
        let mut names: Vec<_> = ServiceKind::ALL.iter().map(|k| k.binding_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 20, "every service needs its own binding");
        for kind in ServiceKind::ALL {
            assert_eq!(ServiceKind::from_binding(kind.binding_name()), Some(kind));
        }
        assert!(!ServiceKind::Subscription.is_subscription_scoped());
        assert!(ServiceKind::Compute.is_subscription_scoped());
    }

    #[test]
    fn credential_debug_redacts_secret() {
        let bundle = CredentialBundle::new("tenant", "client", "s3cret", "sub");
        let rendered = format!("{bundle:?}");
        assert!(!rendered.contains("s3cret"), "secret leaked: {rendered}");
        assert!(rendered.contains("tenant"));
    }

    #[test]
    fn credential_accepts_camel_case_aliases() {
        let bundle: CredentialBundle = match serde_json::from_value(json!({
            "tenantId": "t",
            "clientId": "c",
            "clientSecret": "s",
            "subscriptionId": "sub",
        })) {
            Ok(b) => b,
            Err(e) => panic!("deserialization failed: {e}"),
        };
        assert_eq!(bundle, CredentialBundle::new("t", "c", "s", "sub"));
    }

    fn json_leaf() -> impl proptest::strategy::Strategy<Value = Value> {
        use proptest::prelude::*;
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z0-9 ]{0,12}".prop_map(Value::String),
        ]
    }

    proptest::proptest! {
        #[test]
        fn proptest_nested_encoding_decodes_to_same_value(
            fields in proptest::collection::btree_map("[a-z_]{1,8}", json_leaf(), 0..6usize),
            depth in 0..6usize,
        ) {
            let data = Value::Object(fields.into_iter().collect());
            let decoded = decode_input(encode_n_times(&data, depth));
            proptest::prop_assert_eq!(decoded, Ok(data));
        }
    }
}
