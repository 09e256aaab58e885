//! Mainflux API interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - Bearer and Thing authorization schemes
//! - [`client`] - Main client: catalog lookup, service URLs, dispatch
//! - [`http`] - Transport trait and its reqwest implementation
//! - [`configs`] / [`channels`] - Typed per-resource calls
//!
//! # Example
//!
//! ```ignore
//! use mainflux_sdk::Client;
//!
//! async fn example(token: &str) -> mainflux_sdk::Result<()> {
//!     let client = Client::new("http://localhost:9013".parse()?)?;
//!     let config = client.configs().view("thing-id", token).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod channels;
pub mod client;
pub mod configs;
pub mod http;
