use std::time::Duration;

use log::*;
use market_common::{helpers::parse_number_or, Secret};

pub const SANDBOX_BASE_URL: &str = "https://app.sandbox.midtrans.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct SnapConfig {
    pub base_url: String,
    pub server_key: Secret<String>,
    pub timeout: Duration,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            base_url: SANDBOX_BASE_URL.to_string(),
            server_key: Secret::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SnapConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("MOS_SNAP_BASE_URL").unwrap_or_else(|_| {
            info!("🪛️ MOS_SNAP_BASE_URL not set, using the sandbox at {SANDBOX_BASE_URL}");
            SANDBOX_BASE_URL.to_string()
        });
        let server_key = Secret::new(std::env::var("MOS_SNAP_SERVER_KEY").unwrap_or_else(|_| {
            warn!("🪛️ MOS_SNAP_SERVER_KEY not set. Payment sessions cannot be created.");
            String::default()
        }));
        let (secs, err) = parse_number_or(std::env::var("MOS_SNAP_TIMEOUT_SECS").ok(), DEFAULT_TIMEOUT_SECS);
        if let Some(e) = err {
            warn!("🪛️ MOS_SNAP_TIMEOUT_SECS: {e}. Using {DEFAULT_TIMEOUT_SECS}s.");
        }
        Self { base_url: base_url.trim_end_matches('/').to_string(), server_key, timeout: Duration::from_secs(secs) }
    }
}
