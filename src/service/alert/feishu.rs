//! Feishu/Lark bot webhook sink.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::base::types::DeliveryAck;

use super::{DeliveryError, GenericAlertChannel};

const CHANNEL: &str = "feishu";

/// Feishu custom-bot adapter. Holds the webhook URL when configured.
pub struct FeishuChannel {
    client: reqwest::Client,
    webhook: Option<String>,
}

impl FeishuChannel {
    pub fn new(client: reqwest::Client, webhook: Option<String>) -> Self {
        Self { client, webhook }
    }
}

/// Alert text wrapped the way the Feishu text-message API expects it. Note
/// the field names differ from DingTalk's (`msg_type` vs `msgtype`).
fn payload(alert: &str) -> Value {
    json!({
        "msg_type": "text",
        "content": {
            "text": format!("[TG Monitor Alert]\n{alert}"),
        },
    })
}

/// Feishu answers HTTP 200 with a business `code` field; anything non-zero
/// is a rejection (invalid signature, disabled bot, ...).
fn accepted(status: StatusCode, body: &str) -> bool {
    if !status.is_success() {
        return false;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => value.get("code").and_then(Value::as_i64).unwrap_or(0) == 0,
        Err(_) => true,
    }
}

#[async_trait]
impl GenericAlertChannel for FeishuChannel {
    fn name(&self) -> &'static str {
        CHANNEL
    }

    async fn deliver(&self, alert: &str) -> Result<DeliveryAck, DeliveryError> {
        let Some(webhook) = &self.webhook else {
            return Ok(DeliveryAck::Skipped);
        };

        let response = self
            .client
            .post(webhook)
            .json(&payload(alert))
            .send()
            .await
            .map_err(|source| DeliveryError::Transport { channel: CHANNEL, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| DeliveryError::Transport { channel: CHANNEL, source })?;

        if accepted(status, &body) {
            Ok(DeliveryAck::Delivered)
        } else {
            Err(DeliveryError::Rejected { channel: CHANNEL, status: status.as_u16(), body })
        }
    }
}
