//! Client configuration (code > env > `.env` file).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::Level;

use crate::auth::{Credentials, MemoryTokenStore, TokenStore};
use crate::error::CrmError;
use crate::util::retry::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "https://www.zohoapis.com/crm/v7";
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.zoho.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_CLIENT_ID: &str = "ZOHO_CRM_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "ZOHO_CRM_CLIENT_SECRET";
const ENV_REFRESH_TOKEN: &str = "ZOHO_CRM_REFRESH_TOKEN";
const ENV_BASE_URL: &str = "ZOHO_CRM_BASE_URL";
const ENV_ACCOUNTS_URL: &str = "ZOHO_CRM_ACCOUNTS_URL";
const ENV_LOG_LEVEL: &str = "ZOHO_CRM_LOG_LEVEL";
const ENV_LOG_HEADERS: &str = "ZOHO_CRM_LOG_HEADERS";
const ENV_LOG_BODIES: &str = "ZOHO_CRM_LOG_BODIES";

/// What the transport writes to `tracing` for each exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    pub level: Level,
    pub headers: bool,
    pub bodies: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            headers: false,
            bodies: false,
        }
    }
}

/// Everything the client needs, injected rather than hardcoded.
///
/// # Example
/// ```
/// use zoho_crm::auth::Credentials;
/// use zoho_crm::config::CrmConfig;
///
/// let config = CrmConfig::new(Credentials::new("id", "secret", "refresh"))
///     .with_base_url("https://www.zohoapis.eu/crm/v7")
///     .with_accounts_url("https://accounts.zoho.eu");
/// assert_eq!(config.base_url(), "https://www.zohoapis.eu/crm/v7");
/// ```
#[derive(Clone)]
pub struct CrmConfig {
    base_url: String,
    accounts_url: String,
    credentials: Credentials,
    token_store: Arc<dyn TokenStore>,
    log: LogOptions,
    timeout: Duration,
    retry: RetryPolicy,
}

impl fmt::Debug for CrmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrmConfig")
            .field("base_url", &self.base_url)
            .field("accounts_url", &self.accounts_url)
            .field("credentials", &self.credentials)
            .field("token_store", &"..")
            .field("log", &self.log)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl CrmConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            credentials,
            token_store: Arc::new(MemoryTokenStore::new()),
            log: LogOptions::default(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Load from the environment, reading a `.env` file first if present.
    pub fn from_env() -> Result<Self, CrmError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CrmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| CrmError::Configuration(format!("{key} is not set")))
        };
        let credentials = Credentials::new(
            required(ENV_CLIENT_ID)?,
            required(ENV_CLIENT_SECRET)?,
            required(ENV_REFRESH_TOKEN)?,
        );
        let mut config = Self::new(credentials);

        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Some(url) = lookup(ENV_ACCOUNTS_URL) {
            config.accounts_url = url;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log.level = level.trim().parse().map_err(|_| {
                CrmError::Configuration(format!("{ENV_LOG_LEVEL} has invalid level: {level}"))
            })?;
        }
        if let Some(flag) = lookup(ENV_LOG_HEADERS) {
            config.log.headers = parse_flag(ENV_LOG_HEADERS, &flag)?;
        }
        if let Some(flag) = lookup(ENV_LOG_BODIES) {
            config.log.bodies = parse_flag(ENV_LOG_BODIES, &flag)?;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_accounts_url(mut self, url: impl Into<String>) -> Self {
        self.accounts_url = url.into();
        self
    }

    /// Share a token cache between clients (or processes, for an external store).
    pub fn with_token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = store;
        self
    }

    pub fn with_log_options(mut self, log: LogOptions) -> Self {
        self.log = log;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn accounts_url(&self) -> &str {
        &self.accounts_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.token_store
    }

    pub fn log_options(&self) -> LogOptions {
        self.log
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, CrmError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(CrmError::Configuration(format!(
            "{key} must be a boolean, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        (ENV_CLIENT_ID, "cid"),
        (ENV_CLIENT_SECRET, "csecret"),
        (ENV_REFRESH_TOKEN, "rtoken"),
    ];

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let config = CrmConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.accounts_url(), DEFAULT_ACCOUNTS_URL);
        assert_eq!(config.credentials().client_id, "cid");
        assert_eq!(config.credentials().refresh_token, "rtoken");
        assert_eq!(config.log_options(), LogOptions::default());
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn missing_credential_is_a_configuration_error() {
        let err = CrmConfig::from_lookup(lookup_from(&REQUIRED[..2])).unwrap_err();
        match err {
            CrmError::Configuration(msg) => assert!(msg.contains(ENV_REFRESH_TOKEN)),
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[0] = (ENV_CLIENT_ID, "  ");
        assert!(CrmConfig::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn optional_overrides_are_read() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            (ENV_BASE_URL, "https://www.zohoapis.eu/crm/v7"),
            (ENV_ACCOUNTS_URL, "https://accounts.zoho.eu"),
            (ENV_LOG_LEVEL, "debug"),
            (ENV_LOG_HEADERS, "true"),
            (ENV_LOG_BODIES, "1"),
        ]);
        let config = CrmConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.base_url(), "https://www.zohoapis.eu/crm/v7");
        assert_eq!(config.accounts_url(), "https://accounts.zoho.eu");
        assert_eq!(
            config.log_options(),
            LogOptions {
                level: Level::DEBUG,
                headers: true,
                bodies: true,
            }
        );
    }

    #[test]
    fn invalid_flag_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push((ENV_LOG_BODIES, "maybe"));
        assert!(matches!(
            CrmConfig::from_lookup(lookup_from(&pairs)),
            Err(CrmError::Configuration(_))
        ));
    }

    #[test]
    fn debug_output_hides_credentials() {
        let config = CrmConfig::new(Credentials::new("cid", "csecret", "rtoken"));
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("csecret"));
        assert!(!rendered.contains("rtoken"));
    }
}
