//! Resource abstraction layer
//!
//! Operations are described by data rather than code. Definitions are
//! loaded from JSON files at compile time, so a new operation (or a new
//! auth scheme on an existing one) is a catalog change.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches resource and operation definitions
//! - [`diagnostics`] - Status code to message translation, per operation
//! - [`descriptor`] - Validates arguments and assembles request descriptors
//! - [`dispatch`] - Sends descriptors and shapes results
//!
//! # Resource Definitions
//!
//! Definitions live in JSON files under `src/resources/`:
//! - `configs.json` - Bootstrap configurations (bootstrap service)
//! - `channels.json` - Channels (things service)
//! - `diagnostics.json` - Global and per-operation status messages
//!
//! # Example
//!
//! ```ignore
//! use mainflux_sdk::resource::{build, dispatch, get_operation, Invocation};
//!
//! let op = get_operation("configs", "view").unwrap();
//! let inv = Invocation::new().with_path("thing_id", "abc123").with_credential(token);
//! let request = build(&op, &base_url, &inv)?;
//! let outcome = dispatch(&transport, &op, &request).await?;
//! ```

pub mod descriptor;
pub mod diagnostics;
pub mod dispatch;
mod registry;

pub use descriptor::{build, Invocation, RequestDescriptor};
pub use diagnostics::{get_diagnostics, lookup, Diagnostic, DiagnosticTable};
pub use dispatch::{dispatch, Outcome};
pub use registry::*;
