//! Mainflux Client
//!
//! Main client for the management APIs, combining the operation catalog,
//! per-service base URLs and a transport. The client holds no per-call
//! state; credentials travel with each call.

use super::channels::Channels;
use super::configs::Configs;
use super::http::{ReqwestTransport, Transport};
use crate::error::{Error, Result};
use crate::resource::{self, get_operation, Invocation, Operation, Outcome, RequestDescriptor};
use futures::future::join_all;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Service key of the bootstrap configuration API
pub const BOOTSTRAP_SERVICE: &str = "bootstrap";

/// Service key of the things API (channels live here)
pub const THINGS_SERVICE: &str = "things";

/// Main Mainflux client
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    base_url: Url,
    service_urls: HashMap<String, Url>,
}

impl Client {
    /// Create a client that sends every service to `base_url`
    pub fn new(base_url: Url) -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(base_url, Arc::new(transport)))
    }

    /// Create a client on top of a custom transport
    pub fn with_transport(base_url: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url,
            service_urls: HashMap::new(),
        }
    }

    /// Serve one service from its own base URL
    pub fn with_service_url(mut self, service: &str, url: Url) -> Self {
        self.service_urls.insert(service.to_string(), url);
        self
    }

    /// Base URL a service is reached at
    pub fn service_url(&self, service: &str) -> &Url {
        self.service_urls.get(service).unwrap_or(&self.base_url)
    }

    /// Resolve an operation and build its descriptor without sending it
    pub fn prepare(
        &self,
        resource: &str,
        operation: &str,
        invocation: &Invocation,
    ) -> Result<(Operation, RequestDescriptor)> {
        let Some(op) = get_operation(resource, operation) else {
            return Err(Error::UnknownOperation {
                resource: resource.to_string(),
                operation: operation.to_string(),
            });
        };

        let base_url = self.service_url(&op.resource_def.service);
        let request = resource::build(&op, base_url, invocation)?;
        Ok((op, request))
    }

    /// Validate, send and translate one call
    pub async fn invoke(&self, resource: &str, operation: &str, invocation: &Invocation) -> Result<Outcome> {
        let (op, request) = self.prepare(resource, operation, invocation)?;
        resource::dispatch(self.transport.as_ref(), &op, &request).await
    }

    /// Run independent calls concurrently; results keep input order
    pub async fn invoke_all<'a, I>(&self, calls: I) -> Vec<Result<Outcome>>
    where
        I: IntoIterator<Item = (&'a str, &'a str, Invocation)>,
    {
        let futures = calls
            .into_iter()
            .map(|(resource, operation, invocation)| async move {
                self.invoke(resource, operation, &invocation).await
            });

        join_all(futures).await
    }

    /// Bootstrap configuration operations
    pub fn configs(&self) -> Configs<'_> {
        Configs::new(self)
    }

    /// Channel operations
    pub fn channels(&self) -> Channels<'_> {
        Channels::new(self)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("service_urls", &self.service_urls)
            .finish_non_exhaustive()
    }
}
