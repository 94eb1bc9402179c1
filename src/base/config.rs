//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default per-sink delivery timeout, in seconds.
fn default_alert_timeout_secs() -> u64 {
    10
}

/// Configuration for the monitor-bot application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Telegram bot token for the monitored account (`TELEGRAM_BOT_TOKEN`).
    pub telegram_bot_token: String,
    /// Optional proxy URL for the Telegram connection, e.g.
    /// `socks5://host:1080` or `http://host:8080` (`TELEGRAM_PROXY`).
    #[serde(default)]
    pub telegram_proxy: Option<String>,
    /// DingTalk robot webhook URL (`DINGTALK_WEBHOOK`). Absent disables the sink.
    #[serde(default)]
    pub dingtalk_webhook: Option<String>,
    /// Feishu/Lark bot webhook URL (`FEISHU_WEBHOOK`). Absent disables the sink.
    #[serde(default)]
    pub feishu_webhook: Option<String>,
    /// ServerChan SendKey (`SERVERCHAN_KEY`). Absent disables the sink.
    #[serde(default)]
    pub serverchan_key: Option<String>,
    /// Per-sink delivery timeout in seconds (`ALERT_TIMEOUT_SECS`).
    /// One bounded attempt per alert per sink; there are no retries.
    #[serde(default = "default_alert_timeout_secs")]
    pub alert_timeout_secs: u64,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("MONITOR_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new("config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name("config"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.telegram_bot_token.is_empty() {
            return Err(anyhow::anyhow!("Telegram bot token must not be empty."));
        }

        if result.alert_timeout_secs < 1 || result.alert_timeout_secs > 300 {
            return Err(anyhow::anyhow!("Alert timeout must be between 1 and 300 seconds."));
        }

        Ok(result)
    }

    /// Whether at least one notification sink is configured.
    pub fn has_sinks(&self) -> bool {
        self.dingtalk_webhook.is_some() || self.feishu_webhook.is_some() || self.serverchan_key.is_some()
    }
}
