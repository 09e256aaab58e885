//! Diagnostic Table - status code to message translation
//!
//! Failures are translated through a two-level table: the entry for the
//! failing `resource.operation` wins, then the global entry for the status,
//! then an explicit unmapped sentinel. Lookups never fail.

use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

const DIAGNOSTICS_FILE: &str = include_str!("../resources/diagnostics.json");

/// Resolved message for a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagnostic<'a> {
    /// Entry specific to the failing operation
    Operation(&'a str),
    /// Global entry for the status code
    Global(&'a str),
    /// Neither table knows the status code
    Unmapped(u16),
}

impl Diagnostic<'_> {
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Self::Operation(msg) | Self::Global(msg) => Cow::Borrowed(msg),
            Self::Unmapped(status) => Cow::Owned(format!("Unexpected response status {}.", status)),
        }
    }

    pub fn is_mapped(&self) -> bool {
        !matches!(self, Self::Unmapped(_))
    }
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

type StatusMessages = HashMap<u16, String>;

/// resource -> operation -> status -> message, plus the global fallback
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagnosticTable {
    #[serde(default)]
    global: StatusMessages,
    #[serde(default)]
    resources: HashMap<String, HashMap<String, StatusMessages>>,
}

impl DiagnosticTable {
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Most specific message for `status` on `resource.operation`
    pub fn lookup(&self, resource: &str, operation: &str, status: u16) -> Diagnostic<'_> {
        if let Some(msg) = self.operation_entries(resource, operation).and_then(|m| m.get(&status)) {
            return Diagnostic::Operation(msg);
        }

        match self.global.get(&status) {
            Some(msg) => Diagnostic::Global(msg),
            None => Diagnostic::Unmapped(status),
        }
    }

    /// Operation-specific subtree, if the table has one
    pub fn operation_entries(&self, resource: &str, operation: &str) -> Option<&StatusMessages> {
        self.resources.get(resource)?.get(operation)
    }

    pub fn global_entries(&self) -> &StatusMessages {
        &self.global
    }

    /// Every `(resource, operation, entries)` subtree, in no particular order
    pub fn operations(&self) -> impl Iterator<Item = (&str, &str, &StatusMessages)> {
        self.resources.iter().flat_map(|(resource, ops)| {
            ops.iter()
                .map(move |(operation, entries)| (resource.as_str(), operation.as_str(), entries))
        })
    }
}

static DIAGNOSTICS: OnceLock<DiagnosticTable> = OnceLock::new();

/// Get the diagnostic table (loads from embedded JSON on first access)
pub fn get_diagnostics() -> &'static DiagnosticTable {
    DIAGNOSTICS.get_or_init(|| {
        DiagnosticTable::from_json(DIAGNOSTICS_FILE)
            .unwrap_or_else(|e| panic!("Failed to parse embedded diagnostics JSON: {}", e))
    })
}

/// Resolve a status code against the embedded table
pub fn lookup(resource: &str, operation: &str, status: u16) -> Diagnostic<'static> {
    get_diagnostics().lookup(resource, operation, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::registry::all_operations;

    #[test]
    fn test_global_entries_present() {
        let global = get_diagnostics().global_entries();
        for status in [400, 401, 403, 404, 409, 415, 422, 500] {
            assert!(global.contains_key(&status), "global {} missing", status);
        }
    }

    #[test]
    fn test_every_catalog_operation_has_entry() {
        for op in all_operations() {
            assert!(
                get_diagnostics()
                    .operation_entries(op.resource, op.name)
                    .is_some(),
                "{} has no diagnostic entry",
                op.qualified_name()
            );
        }
    }

    #[test]
    fn test_operation_entry_wins() {
        assert_eq!(
            lookup("configs", "bootstrap", 401),
            Diagnostic::Operation("Missing or invalid external key provided.")
        );
        assert_eq!(
            lookup("configs", "create", 401),
            Diagnostic::Operation("Missing or invalid access token provided.")
        );
    }

    #[test]
    fn test_view_and_remove_404_differ() {
        let view = lookup("configs", "view", 404);
        let remove = lookup("configs", "remove", 404);
        assert_eq!(view, Diagnostic::Operation("Config does not exist."));
        assert_eq!(remove, Diagnostic::Global("A non-existent entity request."));
        assert_ne!(view.message(), remove.message());
    }

    #[test]
    fn test_falls_back_to_global() {
        assert_eq!(
            lookup("configs", "create", 415),
            Diagnostic::Global("Missing or invalid content type.")
        );
        assert_eq!(
            lookup("unknown", "thing", 409),
            Diagnostic::Global("Entity already exists.")
        );
    }

    #[test]
    fn test_unmapped_sentinel() {
        let diag = lookup("channels", "get", 418);
        assert_eq!(diag, Diagnostic::Unmapped(418));
        assert!(!diag.is_mapped());
        assert_eq!(diag.to_string(), "Unexpected response status 418.");
    }

    #[test]
    fn test_custom_table() {
        let table = DiagnosticTable::from_json(
            r#"{"global": {"500": "boom"}, "resources": {"r": {"op": {"500": "op boom"}}}}"#,
        )
        .unwrap();
        assert_eq!(table.lookup("r", "op", 500), Diagnostic::Operation("op boom"));
        assert_eq!(table.lookup("r", "other", 500), Diagnostic::Global("boom"));
        assert_eq!(table.lookup("r", "op", 404), Diagnostic::Unmapped(404));
    }
}
