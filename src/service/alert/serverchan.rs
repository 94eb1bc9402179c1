//! ServerChan (Server酱) sink, delivering to WeChat via the SCT API.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::base::types::DeliveryAck;

use super::{DeliveryError, GenericAlertChannel};

const CHANNEL: &str = "serverchan";
const TITLE: &str = "TG Monitor Alert";

/// ServerChan Turbo adapter. Holds the SendKey when configured.
pub struct ServerChanChannel {
    client: reqwest::Client,
    key: Option<String>,
}

impl ServerChanChannel {
    pub fn new(client: reqwest::Client, key: Option<String>) -> Self {
        Self { client, key }
    }
}

/// The SCT endpoint embeds the SendKey in the path rather than a header.
fn endpoint(key: &str) -> String {
    format!("https://sctapi.ftqq.com/{key}.send")
}

#[async_trait]
impl GenericAlertChannel for ServerChanChannel {
    fn name(&self) -> &'static str {
        CHANNEL
    }

    async fn deliver(&self, alert: &str) -> Result<DeliveryAck, DeliveryError> {
        let Some(key) = &self.key else {
            return Ok(DeliveryAck::Skipped);
        };

        // ServerChan takes form fields, not JSON: a short title plus the
        // alert body as markdown-ish description.
        let response = self
            .client
            .post(endpoint(key))
            .form(&[("title", TITLE), ("desp", alert)])
            .send()
            .await
            .map_err(|source| DeliveryError::Transport { channel: CHANNEL, source })?;

        let status = response.status();

        if status == StatusCode::OK {
            Ok(DeliveryAck::Delivered)
        } else {
            let body = response
                .text()
                .await
                .map_err(|source| DeliveryError::Transport { channel: CHANNEL, source })?;

            Err(DeliveryError::Rejected { channel: CHANNEL, status: status.as_u16(), body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_embeds_the_send_key() {
        assert_eq!(endpoint("SCT42KEY"), "https://sctapi.ftqq.com/SCT42KEY.send");
    }

    #[tokio::test]
    async fn unconfigured_channel_skips() {
        let channel = ServerChanChannel::new(reqwest::Client::new(), None);

        assert_eq!(channel.deliver("alert").await.unwrap(), DeliveryAck::Skipped);
    }
}
