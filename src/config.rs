use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::notify::PayloadStyle;

/// Bare environment variables honoured alongside the `DOCOMON_` prefix.
const PLAIN_ENV_KEYS: &[&str] = &["DISCORD_WEBHOOK_URL", "GOOGLE_CHAT_WEBHOOK_URL", "SERVER_NAME"];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord_webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_chat_webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    pub poll_interval_secs: u64,
    pub show_listing: bool,
    pub clear_screen: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord_webhook_url: None,
            google_chat_webhook_url: None,
            server_name: None,
            poll_interval_secs: 5,
            show_listing: true,
            clear_screen: true,
        }
    }
}

/// A webhook destination taken from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    pub url: String,
    pub style: PayloadStyle,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        // A missing .env is fine; the process environment may carry everything.
        dotenvy::dotenv().ok();
        Self::from_figment(Self::figment())
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("docomon.toml"))
            .merge(Json::file("docomon.json"))
            .merge(Env::raw().only(PLAIN_ENV_KEYS))
            .merge(Env::prefixed("DOCOMON_"))
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config: Config = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        if config.poll_interval_secs == 0 {
            return Err(anyhow::anyhow!("poll_interval_secs must be greater than zero"));
        }

        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Configured sinks.  An unset or blank URL disables its sink.
    pub fn sinks(&self) -> Vec<SinkConfig> {
        [
            (&self.discord_webhook_url, PayloadStyle::Discord),
            (&self.google_chat_webhook_url, PayloadStyle::GoogleChat),
        ]
        .into_iter()
        .filter_map(|(url, style)| {
            let url = url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
            Some(SinkConfig {
                url: url.to_string(),
                style,
            })
        })
        .collect()
    }

    /// Label identifying this host in notifications.
    ///
    /// `server_name` wins, then the system hostname; empty when neither is
    /// available.
    pub fn host_label(&self) -> String {
        if let Some(name) = self.server_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        match gethostname::gethostname().into_string() {
            Ok(host) if !host.is_empty() => host,
            _ => {
                warn!("SERVER_NAME is not set and the hostname is unavailable; notifications carry no server label");
                String::new()
            }
        }
    }
}
