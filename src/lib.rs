//! Typed client for the Mainflux management APIs.
//!
//! Operations are declared in an embedded catalog, built into request
//! descriptors, sent through a [`Transport`], and on failure translated
//! into a message specific to the operation that failed.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod resource;

pub use api::auth::{AuthScheme, Credential};
pub use api::client::{Client, BOOTSTRAP_SERVICE, THINGS_SERVICE};
pub use api::http::{ReqwestTransport, Transport, TransportFailure};
pub use error::{Error, Result, ValidationError};
pub use resource::{Diagnostic, Invocation, Outcome, RequestDescriptor};
