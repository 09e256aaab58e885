//! Property-based tests using proptest
//!
//! These tests check the precedence of the diagnostic lookup, its fallback
//! behaviour, and that malformed arguments are rejected before dispatch.

use mainflux_sdk::resource::{get_diagnostics, lookup, Diagnostic};
use mainflux_sdk::{Client, Error, Invocation, ValidationError};
use proptest::prelude::*;
use serde_json::{json, Value};
use url::Url;

/// Every (resource, operation, status) triple with an operation-specific entry
fn mapped_triples() -> Vec<(String, String, u16)> {
    let mut triples: Vec<(String, String, u16)> = get_diagnostics()
        .operations()
        .flat_map(|(resource, operation, entries)| {
            entries
                .keys()
                .map(move |status| (resource.to_string(), operation.to_string(), *status))
        })
        .collect();
    triples.sort();
    triples
}

/// Every (resource, operation) pair the table knows about
fn scoped_pairs() -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = get_diagnostics()
        .operations()
        .map(|(resource, operation, _)| (resource.to_string(), operation.to_string()))
        .collect();
    pairs.sort();
    pairs
}

/// JSON values that are not strings
fn arb_non_string() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        prop::collection::vec("[a-z]{0,5}", 0..3).prop_map(|v| json!(v)),
        "[a-z]{1,5}".prop_map(|k| {
            let mut map = serde_json::Map::new();
            map.insert(k, json!("v"));
            Value::Object(map)
        }),
    ]
}

fn client() -> Client {
    Client::new(Url::parse("http://localhost:9013").unwrap()).unwrap()
}

proptest! {
    /// Operation-specific entries always win
    #[test]
    fn operation_entry_never_falls_through(triple in prop::sample::select(mapped_triples())) {
        let (resource, operation, status) = triple;
        let expected = get_diagnostics()
            .operation_entries(&resource, &operation)
            .and_then(|entries| entries.get(&status))
            .cloned()
            .unwrap();

        let diagnostic = lookup(&resource, &operation, status);
        prop_assert_eq!(diagnostic, Diagnostic::Operation(expected.as_str()));
    }

    /// Statuses missing from the subtree resolve globally, or to the sentinel
    #[test]
    fn absent_status_falls_back(
        pair in prop::sample::select(scoped_pairs()),
        status in 100u16..600
    ) {
        let (resource, operation) = pair;
        let table = get_diagnostics();
        let scoped = table.operation_entries(&resource, &operation).unwrap();
        prop_assume!(!scoped.contains_key(&status));

        let diagnostic = lookup(&resource, &operation, status);
        match table.global_entries().get(&status) {
            Some(global) => prop_assert_eq!(diagnostic, Diagnostic::Global(global.as_str())),
            None => prop_assert_eq!(diagnostic, Diagnostic::Unmapped(status)),
        }
    }

    /// Lookups against unknown scopes behave like the global table alone
    #[test]
    fn unknown_scope_uses_global_only(
        resource in "[a-z]{3,10}",
        status in any::<u16>()
    ) {
        let operation = "no-such-operation";
        let diagnostic = lookup(&resource, operation, status);
        prop_assert!(!matches!(diagnostic, Diagnostic::Operation(_)));
        prop_assert!(!diagnostic.message().is_empty());
    }

    /// The table is read-only, so repeated lookups agree
    #[test]
    fn lookup_is_idempotent(
        pair in prop::sample::select(scoped_pairs()),
        status in any::<u16>()
    ) {
        let (resource, operation) = pair;
        let first = lookup(&resource, &operation, status);
        let second = lookup(&resource, &operation, status);
        prop_assert_eq!(first, second);
    }

    /// Non-string path parameters are rejected before dispatch
    #[test]
    fn non_string_path_param_rejected(value in arb_non_string()) {
        let inv = Invocation::new()
            .with_path("thing_id", value)
            .with_credential("tok");
        let err = client().prepare("configs", "view", &inv).unwrap_err();
        prop_assert!(
            matches!(
                err,
                Error::Validation(ValidationError::InvalidPathParam { ref name }) if name == "thing_id"
            ),
            "unexpected error: {:?}",
            err
        );
    }

    /// Non-string credentials are rejected before dispatch, for both schemes
    #[test]
    fn non_string_credential_rejected(value in arb_non_string()) {
        let inv = Invocation::new()
            .with_path("thing_id", "abc")
            .with_credential(value.clone());
        let err = client().prepare("configs", "view", &inv).unwrap_err();
        prop_assert!(
            matches!(err, Error::Validation(ValidationError::InvalidCredential { .. })),
            "unexpected error: {:?}",
            err
        );

        let inv = Invocation::new()
            .with_path("external_id", "345")
            .with_credential(value);
        let err = client().prepare("configs", "bootstrap", &inv).unwrap_err();
        prop_assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidCredential { name: "external_key" })
        ), "unexpected error: {:?}", err);
    }

    /// Any non-empty string id lands as exactly one path segment
    #[test]
    fn string_ids_stay_in_one_segment(id in "\\PC{1,24}") {
        prop_assume!(id != "." && id != "..");
        let inv = Invocation::new()
            .with_path("channel_id", id.as_str())
            .with_credential("tok");
        let (op, request) = client().prepare("channels", "get", &inv).unwrap();
        prop_assert_eq!(op.qualified_name(), "channels.get");

        let segments: Vec<&str> = request.url.path_segments().unwrap().collect();
        prop_assert_eq!(segments.len(), 2);
        prop_assert_eq!(segments[0], "channels");
    }
}

