//! REST implementation of [`ChannelNode`].
//!
//! Talks to the node's HTTP surface: a channel-listing endpoint and a
//! keysend endpoint. Requests carry a bearer token when the node is
//! access-protected, and every call has a bounded timeout so a hung node
//! cannot stall a reconciliation cycle indefinitely.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChannelNode, ChannelSnapshot, NodeError};

#[derive(Debug, Deserialize)]
struct ListChannelsReply {
    channels: Vec<ChannelSnapshot>,
}

#[derive(Debug, Serialize)]
struct KeysendRequest<'a> {
    destination: &'a str,
    amount_msat: u64,
}

/// HTTP client for the channel node.
pub struct RestChannelNode {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl RestChannelNode {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Result<Self, NodeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, NodeError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(NodeError::Rpc {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ChannelNode for RestChannelNode {
    async fn list_channels(&self) -> Result<Vec<ChannelSnapshot>, NodeError> {
        let url = format!("{}/v1/channels", self.base_url);
        let resp = self.request(self.client.get(&url)).send().await?;
        let reply: ListChannelsReply = Self::check(resp).await?.json().await?;
        debug!(count = reply.channels.len(), "channels listed");
        Ok(reply.channels)
    }

    async fn keysend(&self, destination: &str, amount_msat: u64) -> Result<(), NodeError> {
        let url = format!("{}/v1/keysend", self.base_url);
        let body = KeysendRequest {
            destination,
            amount_msat,
        };
        let resp = self.request(self.client.post(&url)).json(&body).send().await?;
        Self::check(resp).await?;
        debug!(destination, amount_msat, "keysend dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped_from_base_url() {
        let node = RestChannelNode::new("http://localhost:9737/", None).unwrap();
        assert_eq!(node.base_url, "http://localhost:9737");
    }
}
