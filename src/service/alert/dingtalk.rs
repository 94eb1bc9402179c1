//! DingTalk robot webhook sink.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::base::types::DeliveryAck;

use super::{DeliveryError, GenericAlertChannel};

const CHANNEL: &str = "dingtalk";

/// DingTalk custom-robot adapter. Holds the webhook URL when configured.
pub struct DingTalkChannel {
    client: reqwest::Client,
    webhook: Option<String>,
}

impl DingTalkChannel {
    pub fn new(client: reqwest::Client, webhook: Option<String>) -> Self {
        Self { client, webhook }
    }
}

/// Alert text wrapped the way the DingTalk text-message API expects it.
fn payload(alert: &str) -> Value {
    json!({
        "msgtype": "text",
        "text": {
            "content": format!("[TG Monitor Alert]\n{alert}"),
        },
    })
}

/// DingTalk reports robot-side failures (bad keyword, invalid token) in an
/// `errcode` body field even when the HTTP status is 200.
fn accepted(status: StatusCode, body: &str) -> bool {
    if !status.is_success() {
        return false;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => value.get("errcode").and_then(Value::as_i64).unwrap_or(0) == 0,
        Err(_) => true,
    }
}

#[async_trait]
impl GenericAlertChannel for DingTalkChannel {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_wraps_alert_in_text_message() {
        let value = payload("New Private Message\nFrom: Alice\nContent: hi");

        assert_eq!(value["msgtype"], "text");
        assert_eq!(value["text"]["content"], "[TG Monitor Alert]\nNew Private Message\nFrom: Alice\nContent: hi");
    }

    #[test]
    fn accepted_requires_status_and_errcode() {
        assert!(accepted(StatusCode::OK, r#"{"errcode":0,"errmsg":"ok"}"#));
        assert!(!accepted(StatusCode::OK, r#"{"errcode":310000,"errmsg":"keywords not in content"}"#));
        assert!(!accepted(StatusCode::INTERNAL_SERVER_ERROR, r#"{"errcode":0}"#));
        // A non-JSON 200 body is still a success; only the robot's own error
        // code downgrades it.
        assert!(accepted(StatusCode::OK, "ok"));
    }

    #[tokio::test]
    async fn unconfigured_channel_skips() {
        let channel = DingTalkChannel::new(reqwest::Client::new(), None);

        assert_eq!(channel.deliver("alert").await.unwrap(), DeliveryAck::Skipped);
    }
}
