use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::error::AuthError;

/// Shared key-value cache with per-entry expiry.
///
/// Implementations must make `read`/`write` atomic per key; callers share one
/// instance across every request so that a single token serves them all.
pub trait TokenStore: Send + Sync {
    /// Live value for `key`. An expired entry reads as `None`.
    fn read(&self, key: &str) -> Result<Option<String>, AuthError>;
    fn write(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AuthError>;
    fn remove(&self, key: &str) -> Result<(), AuthError>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Process-local [`TokenStore`].
///
/// # Example
/// ```
/// use std::time::Duration;
/// use zoho_crm::auth::{MemoryTokenStore, TokenStore};
///
/// let store = MemoryTokenStore::new();
/// store.write("token", "abc", Duration::from_secs(60))?;
/// assert_eq!(store.read("token")?.as_deref(), Some("abc"));
/// # Ok::<(), zoho_crm::auth::AuthError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self, key: &str) -> Result<Option<String>, AuthError> {
        let now = Utc::now();
        {
            let entries = self.entries.read().map_err(poisoned)?;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // Expired: evict unless a concurrent writer already replaced it.
        let mut entries = self.entries.write().map_err(poisoned)?;
        if let Some(entry) = entries.get(key) {
            if entry.is_live(now) {
                return Ok(Some(entry.value.clone()));
            }
            entries.remove(key);
        }
        Ok(None)
    }

    fn write(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AuthError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AuthError::Store(format!("ttl out of range: {e}")))?;
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Store("ttl out of range".to_string()))?;
        let entry = CacheEntry {
            value: value.to_string(),
            expires_at,
        };
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), entry);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        self.entries.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> AuthError {
    AuthError::Store("token store lock poisoned".to_string())
}
