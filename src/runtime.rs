//! Runtime services and shared state for the monitor-bot.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    service::{alert::Broadcaster, chat::ChatClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the alert broadcaster, and the chat
/// client. It is designed to be trivially cloneable, allowing it to be
/// passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The alert broadcaster, fanning alerts out to the configured sinks.
    pub alerts: Broadcaster,
    /// The chat client instance supplying the event stream.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the alert sinks.
        let alerts = Broadcaster::from_config(&config)?;

        // Initialize the telegram client, which owns the update listener.
        let chat = ChatClient::telegram(&config, alerts.clone()).await?;

        Ok(Self { config, alerts, chat })
    }

    /// Run the update listener until the connection is torn down.
    pub async fn start(&self) -> Void {
        self.chat.start().await
    }
}
