//! Bootstrap configurations
//!
//! Typed calls over the `configs` resource of the catalog.

use super::client::Client;
use crate::error::Result;
use crate::models::{BootstrapConfig, CertsUpdate};
use crate::resource::{Invocation, Outcome};
use serde_json::Value;

const RESOURCE: &str = "configs";

/// Bootstrap configuration operations, borrowed from a [`Client`]
#[derive(Debug, Clone, Copy)]
pub struct Configs<'a> {
    client: &'a Client,
}

impl<'a> Configs<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Add a configuration. Each configuration belongs to one thing, and
    /// carries the external id and key the device will bootstrap with.
    pub async fn create(&self, config: &BootstrapConfig, token: &str) -> Result<Outcome> {
        let inv = Invocation::new()
            .with_body(serde_json::to_value(config)?)
            .with_credential(token);
        self.client.invoke(RESOURCE, "create", &inv).await
    }

    /// Change the state of a configuration (connect or disconnect the thing)
    pub async fn whitelist(&self, thing_id: &str, config: &BootstrapConfig, token: &str) -> Result<Outcome> {
        let inv = Invocation::new()
            .with_path("thing_id", thing_id)
            .with_body(serde_json::to_value(config)?)
            .with_credential(token);
        self.client.invoke(RESOURCE, "whitelist", &inv).await
    }

    /// Update name, content and metadata of a configuration
    pub async fn update(&self, thing_id: &str, config: &BootstrapConfig, token: &str) -> Result<Outcome> {
        let inv = Invocation::new()
            .with_path("thing_id", thing_id)
            .with_body(serde_json::to_value(config)?)
            .with_credential(token);
        self.client.invoke(RESOURCE, "update", &inv).await
    }

    pub async fn view(&self, thing_id: &str, token: &str) -> Result<Value> {
        let inv = Invocation::new()
            .with_path("thing_id", thing_id)
            .with_credential(token);
        Ok(self.client.invoke(RESOURCE, "view", &inv).await?.into_value())
    }

    /// Replace the certificate material of a configuration
    pub async fn update_certs(&self, config_id: &str, certs: &CertsUpdate, token: &str) -> Result<Value> {
        let inv = Invocation::new()
            .with_path("config_id", config_id)
            .with_body(serde_json::to_value(certs)?)
            .with_credential(token);
        Ok(self.client.invoke(RESOURCE, "updateCerts", &inv).await?.into_value())
    }

    pub async fn remove(&self, config_id: &str, token: &str) -> Result<Outcome> {
        let inv = Invocation::new()
            .with_path("config_id", config_id)
            .with_credential(token);
        self.client.invoke(RESOURCE, "remove", &inv).await
    }

    /// Fetch the configuration a device boots with, authenticating as the
    /// device with its external key
    pub async fn bootstrap(&self, external_id: &str, external_key: &str) -> Result<Value> {
        let inv = Invocation::new()
            .with_path("external_id", external_id)
            .with_credential(external_key);
        Ok(self.client.invoke(RESOURCE, "bootstrap", &inv).await?.into_value())
    }
}
