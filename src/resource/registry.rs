//! Operation Registry - Load resource and operation definitions from JSON
//!
//! Every callable operation is described by data: method, path template,
//! body shape, query support, auth scheme and success shape. The catalog is
//! parsed once from embedded JSON and never mutated afterwards.

use crate::api::auth::AuthScheme;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/configs.json"),
    include_str!("../resources/channels.json"),
];

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// HTTP method of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the request body an operation accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    /// Bodiless (view, remove, disable, ...)
    #[default]
    None,
    /// A JSON object
    Object,
    /// A JSON array (bulk operations)
    Array,
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "no body",
            Self::Object => "an object",
            Self::Array => "an array",
        })
    }
}

/// What a successful call hands back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SuccessShape {
    /// The decoded response body, verbatim
    #[default]
    Payload,
    /// A fixed confirmation; the response body is ignored
    Confirm(String),
}

/// Operation definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct OperationDef {
    pub method: HttpMethod,
    /// Path relative to the service base URL, with `{name}` placeholders
    pub path: String,
    #[serde(default)]
    pub body: BodyKind,
    #[serde(default)]
    pub query: bool,
    /// Overrides the resource's default scheme
    #[serde(default)]
    pub auth: Option<AuthScheme>,
    #[serde(default)]
    pub success: SuccessShape,
    /// Fields an object body must carry as strings
    #[serde(default)]
    pub required_fields: Vec<String>,
}

impl OperationDef {
    /// Names of the path placeholders, in template order
    pub fn path_params(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = self.path.as_str();

        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            names.push(&rest[start + 1..start + len]);
            rest = &rest[start + len + 1..];
        }

        names
    }
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    /// Key of the base URL this resource is served from
    pub service: String,
    /// Checked as a header value when the catalog is parsed
    #[serde(default = "default_content_type", deserialize_with = "header_value")]
    pub content_type: HeaderValue,
    #[serde(default)]
    pub auth: AuthScheme,
    #[serde(default)]
    pub operations: BTreeMap<String, OperationDef>,
}

fn default_content_type() -> HeaderValue {
    HeaderValue::from_static(DEFAULT_CONTENT_TYPE)
}

fn header_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HeaderValue, D::Error> {
    let raw = String::deserialize(deserializer)?;
    HeaderValue::from_str(&raw)
        .map_err(|_| serde::de::Error::custom(format!("invalid content_type: {:?}", raw)))
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceDef>,
}

/// A resolved catalog entry
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    pub resource: &'static str,
    pub name: &'static str,
    pub resource_def: &'static ResourceDef,
    pub def: &'static OperationDef,
}

impl Operation {
    /// Effective auth scheme (operation override, else resource default)
    pub fn auth(&self) -> AuthScheme {
        self.def.auth.unwrap_or(self.resource_def.auth)
    }

    /// `resource.operation`, as used in logs and listings
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.resource, self.name)
    }
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the operation registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            resources: BTreeMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_config.resources.extend(partial.resources);
        }

        final_config
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

/// Get an operation by resource and operation name
pub fn get_operation(resource: &str, operation: &str) -> Option<Operation> {
    let (resource, resource_def) = get_registry().resources.get_key_value(resource)?;
    let (name, def) = resource_def.operations.get_key_value(operation)?;

    Some(Operation {
        resource: resource.as_str(),
        name: name.as_str(),
        resource_def,
        def,
    })
}

/// All operations, sorted by resource then operation name
pub fn all_operations() -> Vec<Operation> {
    get_registry()
        .resources
        .iter()
        .flat_map(|(resource, resource_def)| {
            resource_def
                .operations
                .iter()
                .map(move |(name, def)| Operation {
                    resource: resource.as_str(),
                    name: name.as_str(),
                    resource_def,
                    def,
                })
        })
        .collect()
}
