//! Channels
//!
//! Typed calls over the `channels` resource. Every call returns the decoded
//! response body untouched.

use super::client::Client;
use crate::error::Result;
use crate::models::Channel;
use crate::resource::Invocation;
use serde::Serialize;
use serde_json::Value;

const RESOURCE: &str = "channels";

/// Channel operations, borrowed from a [`Client`]
#[derive(Debug, Clone, Copy)]
pub struct Channels<'a> {
    client: &'a Client,
}

impl<'a> Channels<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    async fn call(&self, operation: &str, inv: Invocation) -> Result<Value> {
        Ok(self.client.invoke(RESOURCE, operation, &inv).await?.into_value())
    }

    pub async fn create(&self, channel: &Channel, token: &str) -> Result<Value> {
        let inv = Invocation::new()
            .with_body(serde_json::to_value(channel)?)
            .with_credential(token);
        self.call("create", inv).await
    }

    /// Create several channels in one request
    pub async fn create_bulk(&self, channels: &[Channel], token: &str) -> Result<Value> {
        let inv = Invocation::new()
            .with_body(serde_json::to_value(channels)?)
            .with_credential(token);
        self.call("createBulk", inv).await
    }

    pub async fn get(&self, channel_id: &str, token: &str) -> Result<Value> {
        let inv = Invocation::new()
            .with_path("channel_id", channel_id)
            .with_credential(token);
        self.call("get", inv).await
    }

    /// List channels; `query` is serialized into the query string as given
    /// (see [`crate::models::PageQuery`])
    pub async fn get_all<Q: Serialize>(&self, query: &Q, token: &str) -> Result<Value> {
        let inv = Invocation::new()
            .with_query(serde_json::to_value(query)?)
            .with_credential(token);
        self.call("getAll", inv).await
    }

    /// List the things connected to a channel
    pub async fn get_by_thing<Q: Serialize>(&self, channel_id: &str, query: &Q, token: &str) -> Result<Value> {
        let inv = Invocation::new()
            .with_path("channel_id", channel_id)
            .with_query(serde_json::to_value(query)?)
            .with_credential(token);
        self.call("getByThing", inv).await
    }

    pub async fn update(&self, channel_id: &str, channel: &Channel, token: &str) -> Result<Value> {
        let inv = Invocation::new()
            .with_path("channel_id", channel_id)
            .with_body(serde_json::to_value(channel)?)
            .with_credential(token);
        self.call("update", inv).await
    }

    pub async fn disable(&self, channel_id: &str, token: &str) -> Result<Value> {
        let inv = Invocation::new()
            .with_path("channel_id", channel_id)
            .with_credential(token);
        self.call("disable", inv).await
    }
}
