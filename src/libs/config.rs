use alloy_primitives::{address, Address};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

// Android emulator alias for the host machine's localhost.
pub const DEVELOPMENT_API_BASE_URL: &str = "http://10.0.2.2:8080";
pub const PRODUCTION_API_BASE_URL: &str = "https://api.blocchat.xyz";

pub const BASE_CHAIN_ID: u64 = 8453;
pub const USDC_BASE_ADDRESS: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

const WALLET_CONNECT_PROJECT_ID: &str = "eb5557f89dc809302437294c1e269ec9";

pub const ENV_API_BASE_URL: &str = "BLOCCHAT_API_BASE_URL";
pub const ENV_XMTP_ENV: &str = "BLOCCHAT_XMTP_ENV";
pub const ENV_POLL_INTERVAL_MS: &str = "BLOCCHAT_POLL_INTERVAL_MS";

pub const SETTING_API_BASE_URL: &str = "api_base_url";
pub const SETTING_XMTP_ENV: &str = "xmtp_env";
pub const SETTING_POLL_INTERVAL_MS: &str = "poll_interval_ms";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XmtpEnv {
    Production,
    Dev,
    Local,
}

impl FromStr for XmtpEnv {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(XmtpEnv::Production),
            "dev" => Ok(XmtpEnv::Dev),
            "local" => Ok(XmtpEnv::Local),
            other => Err(format!("unknown messaging environment: {other}")),
        }
    }
}

impl fmt::Display for XmtpEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmtpEnv::Production => write!(f, "production"),
            XmtpEnv::Dev => write!(f, "dev"),
            XmtpEnv::Local => write!(f, "local"),
        }
    }
}

/// Metadata the wallet shows on its connection prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
    pub icon_url: String,
    pub native_redirect: String,
    pub universal_redirect: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "BlocChat".to_string(),
            description: "Web3 Messaging & Commerce Platform".to_string(),
            url: "https://app.blocchat.xyz".to_string(),
            icon_url: "https://app.blocchat.xyz/vite.svg".to_string(),
            native_redirect: "blocchat://".to_string(),
            universal_redirect: "https://app.blocchat.xyz".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub xmtp_env: XmtpEnv,
    pub chain_id: u64,
    pub poll_interval: Duration,
    pub wallet_connect_project_id: String,
    pub metadata: AppMetadata,
}

impl AppConfig {
    pub fn development() -> Self {
        Self {
            api_base_url: DEVELOPMENT_API_BASE_URL.to_string(),
            ..Self::production()
        }
    }

    pub fn production() -> Self {
        Self {
            api_base_url: PRODUCTION_API_BASE_URL.to_string(),
            xmtp_env: XmtpEnv::Production,
            chain_id: BASE_CHAIN_ID,
            poll_interval: DEFAULT_POLL_INTERVAL,
            wallet_connect_project_id: WALLET_CONNECT_PROJECT_ID.to_string(),
            metadata: AppMetadata::default(),
        }
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = non_empty_env(ENV_API_BASE_URL) {
            self.apply_setting(SETTING_API_BASE_URL, &url);
        }
        if let Some(value) = non_empty_env(ENV_XMTP_ENV) {
            self.apply_setting(SETTING_XMTP_ENV, &value);
        }
        if let Some(value) = non_empty_env(ENV_POLL_INTERVAL_MS) {
            self.apply_setting(SETTING_POLL_INTERVAL_MS, &value);
        }
        self
    }

    /// Apply persisted `app_settings` rows. Unknown keys and unparsable
    /// values are logged and skipped.
    pub fn apply_settings(&mut self, settings: &[(String, String)]) {
        for (key, value) in settings {
            self.apply_setting(key, value);
        }
    }

    fn apply_setting(&mut self, key: &str, value: &str) {
        match key {
            SETTING_API_BASE_URL => {
                self.api_base_url = value.trim().trim_end_matches('/').to_string();
            }
            SETTING_XMTP_ENV => match value.parse::<XmtpEnv>() {
                Ok(env) => self.xmtp_env = env,
                Err(err) => warn!("Ignoring {key} setting: {err}"),
            },
            SETTING_POLL_INTERVAL_MS => match value.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => self.poll_interval = Duration::from_millis(ms),
                _ => warn!("Ignoring {key} setting: invalid interval {value:?}"),
            },
            other => warn!("Ignoring unknown setting {other}"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::production()
    }
}

pub fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
