#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use wiremock::MockServer;

use zoho_crm::auth::{
    AccessToken, AuthError, Credentials, MemoryTokenStore, TokenProvider, TokenStore,
    ACCESS_TOKEN_CACHE_KEY,
};
use zoho_crm::config::CrmConfig;
use zoho_crm::util::retry::RetryPolicy;
use zoho_crm::CrmClient;

pub const API_PREFIX: &str = "/crm/v7";
pub const TOKEN: &str = "1000.cached-token";

/// Store wrapper that records every write.
#[derive(Default)]
pub struct RecordingTokenStore {
    inner: MemoryTokenStore,
    writes: Mutex<Vec<(String, String, Duration)>>,
    fail_writes: bool,
}

impl RecordingTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn seed(&self, key: &str, value: &str) {
        self.inner
            .write(key, value, Duration::from_secs(3600))
            .expect("seed store");
    }

    pub fn writes(&self) -> Vec<(String, String, Duration)> {
        self.writes.lock().expect("store lock poisoned").clone()
    }
}

impl TokenStore for RecordingTokenStore {
    fn read(&self, key: &str) -> Result<Option<String>, AuthError> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AuthError> {
        self.writes
            .lock()
            .expect("store lock poisoned")
            .push((key.to_string(), value.to_string(), ttl));
        if self.fail_writes {
            return Err(AuthError::Store("disk full".to_string()));
        }
        self.inner.write(key, value, ttl)
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        self.inner.remove(key)
    }
}

/// Provider returning a fixed outcome and counting calls.
pub struct CountingProvider {
    calls: AtomicUsize,
    outcome: Result<AccessToken, String>,
}

impl CountingProvider {
    pub fn issuing(access_token: &str, expires_in: u64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome: Ok(AccessToken {
                access_token: access_token.to_string(),
                expires_in,
            }),
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome: Err(reason.to_string()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for CountingProvider {
    async fn fetch(&self) -> Result<AccessToken, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().map_err(AuthError::Rejected)
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("client-id", "client-secret", "refresh-token")
}

pub fn seeded_store() -> Arc<MemoryTokenStore> {
    let store = MemoryTokenStore::new();
    store
        .write(ACCESS_TOKEN_CACHE_KEY, TOKEN, Duration::from_secs(3600))
        .expect("seed store");
    Arc::new(store)
}

/// Client with both hosts pointed at `server` and no retries.
pub fn client_with_store(server: &MockServer, store: Arc<dyn TokenStore>) -> CrmClient {
    let config = CrmConfig::new(credentials())
        .with_base_url(format!("{}{API_PREFIX}", server.uri()))
        .with_accounts_url(server.uri())
        .with_token_store(store)
        .with_retry(RetryPolicy::none());
    CrmClient::new(config).expect("build client")
}

/// Client whose token cache already holds [`TOKEN`].
pub fn client(server: &MockServer) -> CrmClient {
    client_with_store(server, seeded_store())
}

pub fn api_path(suffix: &str) -> String {
    format!("{API_PREFIX}/{suffix}")
}

pub fn contacts(ids: impl IntoIterator<Item = u32>) -> Vec<Value> {
    ids.into_iter()
        .map(|id| json!({"id": id.to_string(), "Email": format!("contact{id}@example.com")}))
        .collect()
}

pub fn page_body(items: Vec<Value>, page: u32, more_records: bool) -> Value {
    let count = items.len();
    json!({
        "data": items,
        "info": {
            "page": page,
            "per_page": 100,
            "count": count,
            "more_records": more_records
        }
    })
}
