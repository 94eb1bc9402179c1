//! Library root for `monitor-bot`.
//!
//! Monitor-bot watches a Telegram account for noteworthy activity and relays
//! alerts to chat-ops webhooks:
//! - Incoming private messages
//! - Mentions of the account in groups
//! - The account joining, or being added to, a group
//!
//! Alerts fan out to DingTalk, Feishu/Lark, and ServerChan; each sink is
//! independent, so one failing webhook never blocks the others. The
//! architecture is built around extensible traits that allow for different
//! implementations of each service.

#[warn(missing_docs)]
pub mod base;
pub mod interaction;
pub mod prelude;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use tracing::{info, warn};

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the monitor-bot runtime:
/// - Builds the alert broadcaster from the configured sinks
/// - Connects the Telegram client and identifies the monitored account
/// - Starts the update listener that feeds the dispatch pipeline
pub async fn start(config: Config) -> Void {
    info!("Starting monitor-bot ...");

    if !config.has_sinks() {
        warn!("No notification sinks configured; alerts will be classified but go nowhere.");
    }

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    info!("Monitoring account: {}", runtime.chat.self_display());

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
