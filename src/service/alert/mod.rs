//! Alert sinks and the broadcaster that fans alerts out to them.
//!
//! Each sink implements [`GenericAlertChannel`] behind its own adapter:
//! encoding, endpoint, and success criterion are per-sink concerns. The
//! [`Broadcaster`] treats every sink identically and isolates failures so
//! one erroring channel never blocks the others.

pub mod dingtalk;
pub mod feishu;
pub mod serverchan;

use std::{ops::Deref, sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::{debug, error, info, instrument};

use crate::base::{
    config::Config,
    types::{DeliveryAck, Res},
};

use dingtalk::DingTalkChannel;
use feishu::FeishuChannel;
use serverchan::ServerChanChannel;

// Errors.

/// A single failed delivery attempt to a single sink.
///
/// Recorded per channel and logged; never fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The request never completed (connect failure, timeout, TLS, ...).
    #[error("{channel}: request failed: {source}")]
    Transport {
        channel: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The sink answered but did not accept the alert.
    #[error("{channel}: alert rejected: status {status}, body: {body}")]
    Rejected { channel: &'static str, status: u16, body: String },
}

// Traits.

/// Generic "alert sink" trait that channel adapters must implement.
///
/// An adapter wraps one webhook endpoint. It makes exactly one bounded
/// delivery attempt per alert, and reports a missing configuration as
/// [`DeliveryAck::Skipped`] rather than an error.
#[async_trait]
pub trait GenericAlertChannel: Send + Sync + 'static {
    /// Short channel name used in logs and delivery reports.
    fn name(&self) -> &'static str;

    /// Deliver one alert. Best effort: no retries, no queuing.
    async fn deliver(&self, alert: &str) -> Result<DeliveryAck, DeliveryError>;
}

// Structs.

/// Alert channel handle for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct AlertChannel {
    inner: Arc<dyn GenericAlertChannel>,
}

impl Deref for AlertChannel {
    type Target = dyn GenericAlertChannel;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl AlertChannel {
    pub fn new(inner: Arc<dyn GenericAlertChannel>) -> Self {
        Self { inner }
    }
}

/// Fans one alert out to every registered channel.
///
/// The channel list is fixed at startup and shared read-only; broadcasting
/// holds no state between alerts.
#[derive(Clone)]
pub struct Broadcaster {
    channels: Arc<Vec<AlertChannel>>,
}

impl Broadcaster {
    pub fn new(channels: Vec<AlertChannel>) -> Self {
        Self { channels: Arc::new(channels) }
    }

    /// Build the standard sink set from configuration. Every adapter is
    /// registered; the unconfigured ones report `Skipped` on delivery.
    pub fn from_config(config: &Config) -> Res<Self> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(config.alert_timeout_secs)).build()?;

        Ok(Self::new(vec![
            AlertChannel::new(Arc::new(DingTalkChannel::new(client.clone(), config.dingtalk_webhook.clone()))),
            AlertChannel::new(Arc::new(FeishuChannel::new(client.clone(), config.feishu_webhook.clone()))),
            AlertChannel::new(Arc::new(ServerChanChannel::new(client, config.serverchan_key.clone()))),
        ]))
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Deliver one alert to all channels concurrently and report the
    /// per-channel outcomes.
    ///
    /// Failure isolation: every channel gets its attempt regardless of the
    /// others, and no aggregate error is surfaced. The return value exists
    /// for observability and tests.
    #[instrument(skip_all)]
    pub async fn broadcast(&self, alert: &str) -> Vec<(&'static str, Result<DeliveryAck, DeliveryError>)> {
        let attempts = self.channels.iter().map(|channel| async move { (channel.name(), channel.deliver(alert).await) });

        let outcomes = futures::future::join_all(attempts).await;

        for (name, outcome) in &outcomes {
            match outcome {
                Ok(DeliveryAck::Delivered) => info!("Delivered alert via {name}."),
                Ok(DeliveryAck::Skipped) => debug!("Skipped {name}: not configured."),
                Err(err) => error!("Failed to deliver alert: {err}"),
            }
        }

        outcomes
    }
}

// Tests.
