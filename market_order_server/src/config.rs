use std::{env, fmt::Display, str::FromStr, time::Duration};

use log::*;
use market_common::helpers::{parse_boolean_flag, parse_number_or};
use snap_tools::SnapConfig;

const DEFAULT_MOS_HOST: &str = "127.0.0.1";
const DEFAULT_MOS_PORT: u16 = 8370;
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
pub const DEFAULT_USER_ID_HEADER: &str = "X-User-Id";
const DEFAULT_ORPHAN_CHECK_INTERVAL_SECS: u64 = 300;
const DEFAULT_ORPHAN_AGE_MINUTES: i64 = 30;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// The header the upstream authentication layer puts the caller's user id in.
    pub user_id_header: String,
    /// If false, payment notifications are processed without checking their signature. **DANGER**
    pub verify_webhook_signature: bool,
    pub orphan_check_interval: Duration,
    /// PENDING orders without a payment session are only reported once they are at least this old.
    pub orphan_age: chrono::Duration,
    pub snap: SnapConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MOS_HOST.to_string(),
            port: DEFAULT_MOS_PORT,
            database_url: String::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            user_id_header: DEFAULT_USER_ID_HEADER.to_string(),
            verify_webhook_signature: true,
            orphan_check_interval: Duration::from_secs(DEFAULT_ORPHAN_CHECK_INTERVAL_SECS),
            orphan_age: chrono::Duration::minutes(DEFAULT_ORPHAN_AGE_MINUTES),
            snap: SnapConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MOS_HOST").ok().unwrap_or_else(|| DEFAULT_MOS_HOST.into());
        let port = env_number("MOS_PORT", DEFAULT_MOS_PORT);
        let database_url = env::var("MOS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ MOS_DATABASE_URL is not set. Please set it to the URL for the marketplace database.");
            String::default()
        });
        let max_connections = env_number("MOS_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let user_id_header = env::var("MOS_USER_ID_HEADER")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_ID_HEADER.into());
        let verify_webhook_signature = parse_boolean_flag(env::var("MOS_VERIFY_WEBHOOK_SIGNATURE").ok(), true);
        if !verify_webhook_signature {
            warn!(
                "🚨️ Payment notification signatures will NOT be checked. Anyone who can reach /webhook/payment \
                 can mark orders as paid. Do not run production like this. 🚨️"
            );
        }
        let orphan_check_interval =
            Duration::from_secs(env_number("MOS_ORPHAN_CHECK_INTERVAL_SECS", DEFAULT_ORPHAN_CHECK_INTERVAL_SECS));
        let orphan_age = chrono::Duration::minutes(env_number("MOS_ORPHAN_AGE_MINUTES", DEFAULT_ORPHAN_AGE_MINUTES));
        let snap = SnapConfig::new_from_env_or_default();
        Self {
            host,
            port,
            database_url,
            max_connections,
            user_id_header,
            verify_webhook_signature,
            orphan_check_interval,
            orphan_age,
            snap,
        }
    }

    pub fn webhook_options(&self) -> WebhookOptions {
        WebhookOptions { verify_signature: self.verify_webhook_signature, server_key: self.snap.server_key.clone() }
    }
}

fn env_number<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy + Display,
    T::Err: Display,
{
    let (value, err) = parse_number_or(env::var(name).ok(), default);
    if let Some(e) = err {
        warn!("🪛️ Invalid configuration value for {name}. {e} Using the default, {default}, instead.");
    }
    value
}

/// The part of the configuration the webhook route needs.
#[derive(Clone, Debug)]
pub struct WebhookOptions {
    pub verify_signature: bool,
    pub server_key: market_common::Secret<String>,
}

/// The header the [`crate::helpers::UserId`] extractor reads.
#[derive(Clone, Debug)]
pub struct UserIdHeader(pub String);

impl Default for UserIdHeader {
    fn default() -> Self {
        Self(DEFAULT_USER_ID_HEADER.to_string())
    }
}
