use std::sync::Arc;
use std::time::Duration;

use super::error::AuthError;
use super::provider::TokenProvider;
use super::store::TokenStore;

/// Cache key under which the current access token lives.
pub const ACCESS_TOKEN_CACHE_KEY: &str = "zoho_crm/access_token";

/// Seconds shaved off `expires_in` so a cached token never outlives the
/// server-side one while a request is in flight.
pub const EXPIRY_MARGIN_SECS: u64 = 10;

/// Hands out a currently valid access token, refreshing only on a cache miss.
///
/// Concurrent callers that miss at the same time each refresh; the refresh is
/// idempotent and the last write wins.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use zoho_crm::auth::{Credentials, MemoryTokenStore, RefreshTokenProvider, TokenManager};
/// use zoho_crm::transport::ReqwestTransport;
///
/// # async fn example() -> zoho_crm::error::Result<()> {
/// let accounts = Arc::new(ReqwestTransport::new("https://accounts.zoho.com")?);
/// let provider = RefreshTokenProvider::new(accounts, Credentials::new("id", "secret", "refresh"));
/// let manager = TokenManager::new(Arc::new(MemoryTokenStore::new()), Arc::new(provider));
/// let token = manager.get_valid_token().await?;
/// # Ok(())
/// # }
/// ```
pub struct TokenManager {
    store: Arc<dyn TokenStore>,
    provider: Arc<dyn TokenProvider>,
    cache_key: String,
}

impl TokenManager {
    pub fn new(store: Arc<dyn TokenStore>, provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            store,
            provider,
            cache_key: ACCESS_TOKEN_CACHE_KEY.to_string(),
        }
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = key.into();
        self
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// Cached token if live, otherwise a freshly minted one.
    ///
    /// Nothing is cached when the exchange fails.
    pub async fn get_valid_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.store.read(&self.cache_key)? {
            if !token.is_empty() {
                tracing::debug!(key = %self.cache_key, "Access token cache hit");
                return Ok(token);
            }
        }

        let token = match self.provider.fetch().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Access token refresh failed");
                return Err(e);
            }
        };

        let ttl = cache_ttl(token.expires_in);
        tracing::info!(ttl_secs = ttl.as_secs(), "Access token refreshed");
        if let Err(e) = self.store.write(&self.cache_key, &token.access_token, ttl) {
            tracing::warn!(error = %e, "Failed to cache access token");
        }
        Ok(token.access_token)
    }

    /// Drop the cached token so the next call refreshes.
    pub fn invalidate(&self) -> Result<(), AuthError> {
        self.store.remove(&self.cache_key)
    }
}

/// `max(expires_in - margin, 0)` seconds.
pub fn cache_ttl(expires_in: u64) -> Duration {
    Duration::from_secs(expires_in.saturating_sub(EXPIRY_MARGIN_SECS))
}
