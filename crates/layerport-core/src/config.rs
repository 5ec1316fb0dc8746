//! Configuration module
//!
//! Client configuration loaded from the environment (and a `.env` file when
//! present): backend origin, push channel endpoint, credentials and timeouts.

use std::env;
use std::time::Duration;

use anyhow::Context;

const DEFAULT_API_URL: &str = "http://localhost:3001";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 20;

/// Configuration for talking to the conversion service.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Backend origin, without trailing slash.
    pub api_url: String,
    /// Push channel endpoint (ws:// or wss://).
    pub push_url: String,
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Where users are sent when their plan allowance is exhausted.
    pub pricing_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_api_url(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    /// Defaults derived from a backend origin.
    pub fn for_api_url(api_url: &str) -> Self {
        let api_url = api_url.trim_end_matches('/').to_string();
        Self {
            push_url: derive_push_url(&api_url),
            pricing_url: format!("{}/#pricing", api_url),
            api_url,
            auth_token: None,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let api_url = env::var("LAYERPORT_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let mut config = Self::for_api_url(&api_url);

        if let Ok(push_url) = env::var("LAYERPORT_PUSH_URL") {
            config.push_url = push_url.trim_end_matches('/').to_string();
        }
        if let Ok(pricing_url) = env::var("LAYERPORT_PRICING_URL") {
            config.pricing_url = pricing_url;
        }

        config.auth_token = env::var("LAYERPORT_AUTH_TOKEN")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        config.request_timeout = timeout_from(
            "LAYERPORT_REQUEST_TIMEOUT_SECS",
            env::var("LAYERPORT_REQUEST_TIMEOUT_SECS").ok(),
            REQUEST_TIMEOUT_SECS,
        )?;
        config.connect_timeout = timeout_from(
            "LAYERPORT_CONNECT_TIMEOUT_SECS",
            env::var("LAYERPORT_CONNECT_TIMEOUT_SECS").ok(),
            CONNECT_TIMEOUT_SECS,
        )?;

        config.validate()?;

        tracing::debug!(
            api_url = %config.api_url,
            push_url = %config.push_url,
            authenticated = config.auth_token.is_some(),
            "Loaded client configuration"
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "LAYERPORT_API_URL must start with http:// or https://"
            ));
        }

        if !(self.push_url.starts_with("ws://") || self.push_url.starts_with("wss://")) {
            return Err(anyhow::anyhow!(
                "LAYERPORT_PUSH_URL must start with ws:// or wss://"
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(anyhow::anyhow!(
                "LAYERPORT_REQUEST_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(anyhow::anyhow!(
                "LAYERPORT_CONNECT_TIMEOUT_SECS must be greater than 0"
            ));
        }

        Ok(())
    }
}

/// Whole seconds from `raw`, or `default_secs` when unset. Malformed values are errors.
fn timeout_from(name: &str, raw: Option<String>, default_secs: u64) -> anyhow::Result<Duration> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(default_secs));
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{} must be a whole number of seconds, got {:?}", name, raw))?;
    Ok(Duration::from_secs(secs))
}

/// `http(s)://host` becomes `ws(s)://host/ws`.
fn derive_push_url(api_url: &str) -> String {
    let base = if let Some(rest) = api_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = api_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        api_url.to_string()
    };
    format!("{}/ws", base)
}
