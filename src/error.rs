//! Error types
//!
//! Validation failures are raised before any request leaves the process.
//! Remote failures carry the diagnostic resolved for the operation that
//! failed; their `Display` is that diagnostic message.

use crate::resource::{BodyKind, Diagnostic};

/// A caller-supplied argument failed a structural precondition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing {name} parameter. Expected a string.")]
    MissingPathParam { name: String },

    #[error("Invalid {name} parameter. Expected a string.")]
    InvalidPathParam { name: String },

    #[error("Invalid {name} parameter. Expected a non-empty string.")]
    EmptyPathParam { name: String },

    #[error("Invalid {name} parameter. Expected a string.")]
    InvalidCredential { name: &'static str },

    #[error("Missing request body. Expected {expected}.")]
    MissingBody { expected: BodyKind },

    #[error("Invalid request body. Expected {expected}.")]
    InvalidBody { expected: BodyKind },

    #[error("Operation {operation} does not take a request body.")]
    UnexpectedBody { operation: String },

    #[error("Invalid {name} field in request body. Expected a string.")]
    InvalidField { name: String },

    #[error("Invalid query parameters. Expected an object.")]
    InvalidQuery,

    #[error("Invalid query parameter {name}. Nested objects are not supported.")]
    InvalidQueryValue { name: String },

    #[error("Operation {operation} does not take query parameters.")]
    UnexpectedQuery { operation: String },
}

/// Errors produced by the client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Arguments were rejected before dispatch
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The remote answered with a non-2xx status
    #[error("{diagnostic}")]
    Remote {
        resource: String,
        operation: String,
        status: u16,
        diagnostic: Diagnostic<'static>,
    },

    /// The remote never answered (DNS, connect, TLS, timeout, ...)
    #[error("no response from {url}: {reason}")]
    Transport { url: String, reason: String },

    /// A 2xx response body was not valid JSON
    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("unknown operation: {resource}.{operation}")]
    UnknownOperation { resource: String, operation: String },

    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status of a remote failure
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The resolved diagnostic of a remote failure
    pub fn diagnostic(&self) -> Option<&Diagnostic<'static>> {
        match self {
            Self::Remote { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
