//! Dispatcher
//!
//! Executes a descriptor through the transport and shapes the result:
//! success becomes an [`Outcome`], a remote status is translated through the
//! diagnostic table for the operation that failed, and a missing response is
//! reported as a transport error.

use super::descriptor::RequestDescriptor;
use super::diagnostics;
use super::registry::{Operation, OperationDef, SuccessShape};
use crate::api::http::{Transport, TransportFailure};
use crate::error::Error;
use serde_json::Value;

/// Successful result of an operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Decoded response body, untouched
    Payload(Value),
    /// Fixed confirmation for operations that report nothing else
    Confirmation(&'static str),
}

impl Outcome {
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Payload(value) => Some(value),
            Self::Confirmation(_) => None,
        }
    }

    pub fn confirmation(&self) -> Option<&'static str> {
        match self {
            Self::Confirmation(msg) => Some(*msg),
            Self::Payload(_) => None,
        }
    }

    /// Payload as-is, or the confirmation as a JSON string
    pub fn into_value(self) -> Value {
        match self {
            Self::Payload(value) => value,
            Self::Confirmation(msg) => Value::String(msg.to_string()),
        }
    }
}

/// Send `request` for `op` and translate the result
pub async fn dispatch(
    transport: &dyn Transport,
    op: &Operation,
    request: &RequestDescriptor,
) -> Result<Outcome, Error> {
    tracing::debug!("dispatch: operation={}, method={}", op.qualified_name(), request.method);

    let def: &'static OperationDef = op.def;

    match transport.execute(request).await {
        Ok(body) => Ok(shape_success(def, body)),
        // Confirmation operations ignore the body, decodable or not
        Err(TransportFailure::Decode(_)) if matches!(def.success, SuccessShape::Confirm(_)) => {
            Ok(shape_success(def, Value::Null))
        },
        Err(TransportFailure::Decode(reason)) => Err(Error::Decode {
            url: request.url.to_string(),
            reason,
        }),
        Err(TransportFailure::Status { status, .. }) => {
            let diagnostic = diagnostics::lookup(op.resource, op.name, status);
            tracing::info!(
                "{} failed: status={}, diagnostic={}",
                op.qualified_name(),
                status,
                diagnostic
            );
            Err(Error::Remote {
                resource: op.resource.to_string(),
                operation: op.name.to_string(),
                status,
                diagnostic,
            })
        },
        Err(TransportFailure::Unreachable(reason)) => Err(Error::Transport {
            url: request.url.to_string(),
            reason,
        }),
    }
}

fn shape_success(def: &'static OperationDef, body: Value) -> Outcome {
    match &def.success {
        SuccessShape::Payload => Outcome::Payload(body),
        SuccessShape::Confirm(msg) => Outcome::Confirmation(msg.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::descriptor::{build, Invocation};
    use crate::resource::registry::get_operation;
    use crate::resource::Diagnostic;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use url::Url;

    /// Returns a canned result and counts calls
    struct StubTransport {
        result: Result<Value, TransportFailure>,
        calls: Mutex<usize>,
    }

    impl StubTransport {
        fn new(result: Result<Value, TransportFailure>) -> Self {
            Self {
                result,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn execute(&self, _request: &RequestDescriptor) -> Result<Value, TransportFailure> {
            *self.calls.lock().unwrap() += 1;
            self.result.clone()
        }
    }

    fn prepared(resource: &str, name: &str, inv: Invocation) -> (Operation, RequestDescriptor) {
        let op = get_operation(resource, name).unwrap();
        let base = Url::parse("http://localhost:9013").unwrap();
        let desc = build(&op, &base, &inv).unwrap();
        (op, desc)
    }

    fn view_config() -> (Operation, RequestDescriptor) {
        prepared(
            "configs",
            "view",
            Invocation::new().with_path("thing_id", "t1").with_credential("tok"),
        )
    }

    fn create_config() -> (Operation, RequestDescriptor) {
        prepared(
            "configs",
            "create",
            Invocation::new()
                .with_body(json!({"external_id": "345", "external_key": "012"}))
                .with_credential("tok"),
        )
    }

    #[tokio::test]
    async fn test_payload_passes_through_verbatim() {
        let payload = json!({"thing_id": "t1", "channels": [{"id": "c1"}], "state": 0});
        let stub = StubTransport::new(Ok(payload.clone()));
        let (op, desc) = view_config();

        let outcome = dispatch(&stub, &op, &desc).await.unwrap();
        assert_eq!(outcome, Outcome::Payload(payload));
        assert_eq!(*stub.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_confirmation_ignores_body() {
        let stub = StubTransport::new(Ok(json!({"id": "whatever"})));
        let (op, desc) = create_config();

        let outcome = dispatch(&stub, &op, &desc).await.unwrap();
        assert_eq!(outcome, Outcome::Confirmation("Configuration added"));
    }

    #[tokio::test]
    async fn test_confirmation_tolerates_undecodable_body() {
        let stub = StubTransport::new(Err(TransportFailure::Decode("expected value".into())));
        let (op, desc) = create_config();

        let outcome = dispatch(&stub, &op, &desc).await.unwrap();
        assert_eq!(outcome.confirmation(), Some("Configuration added"));
    }

    #[tokio::test]
    async fn test_decode_failure_on_payload_operation() {
        let stub = StubTransport::new(Err(TransportFailure::Decode("expected value".into())));
        let (op, desc) = view_config();

        let err = dispatch(&stub, &op, &desc).await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[tokio::test]
    async fn test_401_on_create_resolves_operation_message() {
        let stub = StubTransport::new(Err(TransportFailure::Status {
            status: 401,
            body: String::new(),
        }));
        let (op, desc) = create_config();

        let err = dispatch(&stub, &op, &desc).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing or invalid access token provided.");
        assert_eq!(err.status(), Some(401));
        assert!(matches!(err.diagnostic(), Some(Diagnostic::Operation(_))));
    }

    #[tokio::test]
    async fn test_401_on_bootstrap_differs_from_create() {
        let stub = StubTransport::new(Err(TransportFailure::Status {
            status: 401,
            body: String::new(),
        }));
        let (op, desc) = prepared(
            "configs",
            "bootstrap",
            Invocation::new()
                .with_path("external_id", "345")
                .with_credential("012"),
        );

        let err = dispatch(&stub, &op, &desc).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing or invalid external key provided.");
    }

    #[tokio::test]
    async fn test_unmapped_status_is_explicit() {
        let stub = StubTransport::new(Err(TransportFailure::Status {
            status: 502,
            body: "bad gateway".into(),
        }));
        let (op, desc) = view_config();

        let err = dispatch(&stub, &op, &desc).await.unwrap_err();
        assert_eq!(err.diagnostic(), Some(&Diagnostic::Unmapped(502)));
        assert_eq!(err.to_string(), "Unexpected response status 502.");
    }

    #[test]
    fn test_unreachable_is_transport_error() {
        let stub = StubTransport::new(Err(TransportFailure::Unreachable("connection refused".into())));
        let (op, desc) = view_config();

        let err = tokio_test::block_on(dispatch(&stub, &op, &desc)).unwrap_err();
        match err {
            Error::Transport { url, reason } => {
                assert_eq!(url, "http://localhost:9013/things/configs/t1");
                assert_eq!(reason, "connection refused");
            },
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[test]
    fn test_outcome_accessors() {
        let payload = Outcome::Payload(json!({"a": 1}));
        assert_eq!(payload.payload(), Some(&json!({"a": 1})));
        assert_eq!(payload.confirmation(), None);

        let confirm = Outcome::Confirmation("Configuration removed");
        assert_eq!(confirm.payload(), None);
        assert_eq!(confirm.into_value(), json!("Configuration removed"));
    }
}
