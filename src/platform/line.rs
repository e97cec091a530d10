use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use crate::error::{RelayError, RelayResult};
use crate::platform::{Message, PushClient};

const PUSH_URL: &str = "https://api.line.me/v2/bot/message/push";

type HmacSha256 = Hmac<Sha256>;

/// LINE Messaging API client: push deliveries plus webhook signature
/// verification for the inbound side of the channel.
pub struct LineClient {
    client: Client,
    access_token: String,
}

impl LineClient {
    pub fn new(access_token: String) -> Self {
        Self {
            client: Client::new(),
            access_token,
        }
    }
}

#[derive(Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: &'a [Message],
}

#[async_trait::async_trait]
impl PushClient for LineClient {
    async fn push(&self, to: &str, messages: &[Message]) -> RelayResult<()> {
        debug!("Pushing {} message(s) to {}", messages.len(), to);

        let response = self
            .client
            .post(PUSH_URL)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .json(&PushRequest { to, messages })
            .send()
            .await
            .map_err(|e| RelayError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(RelayError::Delivery(format!(
                "push API error ({status}): {error_body}"
            )));
        }

        Ok(())
    }
}

/// Validate `x-line-signature`: base64 of HMAC-SHA256 over the raw request
/// body, keyed with the channel secret.
pub fn verify_signature(channel_secret: &str, signature: &str, body: &[u8]) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let expected = STANDARD.encode(mac.finalize().into_bytes());
    expected == signature
}

// Webhook payload subset — only the source routing this service needs.

#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub source: Option<EventSource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub group_id: Option<String>,
    pub room_id: Option<String>,
}
