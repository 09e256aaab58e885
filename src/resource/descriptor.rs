//! Request Descriptor Builder
//!
//! Turns an [`Operation`] plus caller arguments into a ready-to-send
//! [`RequestDescriptor`]. Building is pure: no network, no shared state.
//! Every structural check happens here, before the transport is involved.

use super::registry::{BodyKind, HttpMethod, Operation};
use crate::api::auth::Credential;
use crate::error::{Error, ValidationError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

/// Untyped arguments for one call.
///
/// The typed facades build these from `&str` and serde models; the CLI and
/// [`crate::Client::invoke`] pass them through as given, so every field is
/// checked for shape when the descriptor is built.
#[derive(Clone, Default)]
pub struct Invocation {
    pub path: Map<String, Value>,
    pub query: Option<Value>,
    pub body: Option<Value>,
    pub credential: Option<Value>,
}

impl Invocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.path.insert(name.to_string(), value.into());
        self
    }

    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_credential(mut self, credential: impl Into<Value>) -> Self {
        self.credential = Some(credential.into());
        self
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("path", &self.path)
            .field("query", &self.query)
            .field("body", &self.body)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Fully assembled request for one call
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    /// JSON text; `None` for bodiless operations
    pub body: Option<String>,
}

impl RequestDescriptor {
    /// Header value as a string, if present and visible ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Validate arguments and assemble the descriptor for `op`
pub fn build(op: &Operation, base_url: &Url, invocation: &Invocation) -> Result<RequestDescriptor, Error> {
    let path = interpolate_path(op, &invocation.path)?;
    let credential = Credential::from_value(op.auth(), invocation.credential.as_ref())?;
    let body = encode_body(op, invocation.body.as_ref())?;
    let query = encode_query(op, invocation.query.as_ref())?;

    let relative = match query {
        Some(query) => format!("{}?{}", path, query),
        None => path,
    };
    let url = service_root(base_url).join(&relative)?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, op.resource_def.content_type.clone());

    let mut authorization =
        HeaderValue::from_str(&credential.header_value()).map_err(|_| ValidationError::InvalidCredential {
            name: op.auth().argument_name(),
        })?;
    authorization.set_sensitive(true);
    headers.insert(AUTHORIZATION, authorization);

    Ok(RequestDescriptor {
        method: op.def.method,
        url,
        headers,
        body,
    })
}

/// Base URL with a trailing slash, so joins append instead of replacing
/// the last segment
fn service_root(base_url: &Url) -> Url {
    let mut root = base_url.clone();
    if !root.path().ends_with('/') {
        let path = format!("{}/", root.path());
        root.set_path(&path);
    }
    root.set_query(None);
    root.set_fragment(None);
    root
}

fn interpolate_path(op: &Operation, params: &Map<String, Value>) -> Result<String, ValidationError> {
    let mut path = op.def.path.clone();

    for name in op.def.path_params() {
        let value = match params.get(name) {
            None => {
                return Err(ValidationError::MissingPathParam {
                    name: name.to_string(),
                })
            },
            Some(Value::String(s)) if s.is_empty() => {
                return Err(ValidationError::EmptyPathParam {
                    name: name.to_string(),
                })
            },
            // Dot segments would be resolved away by the URL parser
            Some(Value::String(s)) if s == "." || s == ".." => {
                return Err(ValidationError::InvalidPathParam {
                    name: name.to_string(),
                })
            },
            Some(Value::String(s)) => s,
            Some(_) => {
                return Err(ValidationError::InvalidPathParam {
                    name: name.to_string(),
                })
            },
        };

        path = path.replace(&format!("{{{}}}", name), &urlencoding::encode(value));
    }

    Ok(path)
}

fn encode_body(op: &Operation, body: Option<&Value>) -> Result<Option<String>, Error> {
    let expected = op.def.body;

    let value = match (expected, body) {
        (BodyKind::None, None) => return Ok(None),
        (BodyKind::None, Some(_)) => {
            return Err(ValidationError::UnexpectedBody {
                operation: op.qualified_name(),
            }
            .into())
        },
        (_, None) => return Err(ValidationError::MissingBody { expected }.into()),
        (BodyKind::Object, Some(value)) => {
            let Value::Object(map) = value else {
                return Err(ValidationError::InvalidBody { expected }.into());
            };
            for field in &op.def.required_fields {
                if !matches!(map.get(field), Some(Value::String(_))) {
                    return Err(ValidationError::InvalidField { name: field.clone() }.into());
                }
            }
            value
        },
        // Element shape is left to the remote service
        (BodyKind::Array, Some(value)) => {
            if !value.is_array() {
                return Err(ValidationError::InvalidBody { expected }.into());
            }
            value
        },
    };

    Ok(Some(serde_json::to_string(value)?))
}

fn encode_query(op: &Operation, query: Option<&Value>) -> Result<Option<String>, ValidationError> {
    let Some(query) = query else {
        return Ok(None);
    };

    if !op.def.query {
        return Err(ValidationError::UnexpectedQuery {
            operation: op.qualified_name(),
        });
    }

    let Value::Object(map) = query else {
        return Err(ValidationError::InvalidQuery);
    };

    let mut query_parts: Vec<String> = Vec::new();

    for (key, value) in map {
        let key_enc = urlencoding::encode(key);
        match value {
            Value::Null => {},
            Value::Array(items) => {
                for item in items {
                    let Some(text) = scalar_text(item) else {
                        return Err(ValidationError::InvalidQueryValue { name: key.clone() });
                    };
                    query_parts.push(format!("{}={}", key_enc, urlencoding::encode(&text)));
                }
            },
            other => {
                let Some(text) = scalar_text(other) else {
                    return Err(ValidationError::InvalidQueryValue { name: key.clone() });
                };
                query_parts.push(format!("{}={}", key_enc, urlencoding::encode(&text)));
            },
        }
    }

    if query_parts.is_empty() {
        Ok(None)
    } else {
        Ok(Some(query_parts.join("&")))
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
