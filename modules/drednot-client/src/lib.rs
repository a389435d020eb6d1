//! Typed HTTP client for the Drednot browser-bridge sidecar.
//!
//! The sidecar owns the headless browser: it renders the game page, watches
//! the chat DOM with a MutationObserver, and buffers every new `<p>` it sees.
//! This crate only speaks the sidecar's small HTTP API: `join` a ship,
//! atomically `poll` the buffered lines, `send` one chat line.

pub mod error;

pub use error::{DrednotError, Result};

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One chat line as observed in the DOM, plus the speaker name the bridge
/// extracted from the `<bdi>` element (absent for system notices).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatLine {
    pub text: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinRequest<'a> {
    pub invite_link: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_key: Option<&'a str>,
}

/// What the bridge learns while joining: the ship code if it was already
/// visible in scrollback (otherwise it arrives later as a join notice).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JoinInfo {
    #[serde(default)]
    pub ship_id: Option<String>,
}

#[derive(Deserialize)]
struct PollResponse {
    #[serde(default)]
    lines: Vec<ChatLine>,
}

/// The transport seam between the bot core and the browser layer.
///
/// `poll` must drain atomically: every physical line is returned by exactly
/// one call, which is what gives the pipeline its exactly-once guarantee.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn join(&self, req: &JoinRequest<'_>) -> Result<JoinInfo>;
    async fn poll(&self) -> Result<Vec<ChatLine>>;
    async fn send(&self, text: &str) -> Result<()>;
    async fn close(&self) -> Result<()>;
}

pub struct DrednotClient {
    client: reqwest::Client,
    base_url: String,
}

impl DrednotClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            warn!(%status, path, "Bridge request failed");
            return Err(DrednotError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl ChatTransport for DrednotClient {
    /// Navigate to the invite link and enter the game. The bridge signals a
    /// rejected login key with 401, which is surfaced as its own error kind
    /// so the supervisor can branch without string-matching.
    async fn join(&self, req: &JoinRequest<'_>) -> Result<JoinInfo> {
        match self.post_json("/session/join", req).await {
            Ok(resp) => Ok(resp.json().await?),
            Err(DrednotError::Api { status: 401, .. }) => Err(DrednotError::InvalidLoginKey),
            Err(e) => Err(e),
        }
    }

    /// Atomically drain the bridge's line buffer (the observer's splice).
    async fn poll(&self) -> Result<Vec<ChatLine>> {
        let resp = self
            .post_json("/session/poll", &serde_json::json!({}))
            .await?;
        let body: PollResponse = resp.json().await?;
        Ok(body.lines)
    }

    /// Type one pre-formatted line into the chat input and submit it.
    async fn send(&self, text: &str) -> Result<()> {
        self.post_json("/session/send", &serde_json::json!({ "text": text }))
            .await?;
        Ok(())
    }

    /// Tear down the browser session so the next join starts clean.
    async fn close(&self) -> Result<()> {
        self.post_json("/session/close", &serde_json::json!({}))
            .await?;
        Ok(())
    }
}
