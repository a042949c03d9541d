//! Client assembly and the authenticated request path.

pub mod executor;
pub mod response;

pub use executor::{query_pairs, RequestExecutor, AUTH_SCHEME};
pub use response::{ApiResponse, ServiceResponse};

use std::sync::Arc;

use crate::auth::{AccessToken, RefreshTokenProvider, TokenManager, TokenProvider};
use crate::config::CrmConfig;
use crate::error::CrmError;
use crate::organization::Organizations;
use crate::pagination::{PageRequest, RecordCursor};
use crate::records::Records;
use crate::transport::{ReqwestTransport, Transport};

/// Entry point: one token cache, two hosts, every service.
///
/// # Example
/// ```no_run
/// use zoho_crm::CrmClient;
///
/// # async fn example() -> zoho_crm::error::Result<()> {
/// let client = CrmClient::from_env()?;
/// let contact = client.records().get("Contacts", "4150868000000624001").await?;
/// if contact.is_success() {
///     println!("{:?}", contact.get("Email"));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CrmClient {
    executor: Arc<RequestExecutor>,
    provider: Arc<dyn TokenProvider>,
}

impl CrmClient {
    pub fn new(config: CrmConfig) -> Result<Self, CrmError> {
        let accounts = ReqwestTransport::with_timeout(config.accounts_url(), config.timeout())?
            .with_retry(config.retry().clone())
            .with_log_options(config.log_options());
        let api = ReqwestTransport::with_timeout(config.base_url(), config.timeout())?
            .with_retry(config.retry().clone())
            .with_log_options(config.log_options());
        Ok(Self::from_transports(
            &config,
            Arc::new(accounts),
            Arc::new(api),
        ))
    }

    /// Build on caller-supplied transports (accounts host, API host).
    pub fn from_transports(
        config: &CrmConfig,
        accounts: Arc<dyn Transport>,
        api: Arc<dyn Transport>,
    ) -> Self {
        let provider: Arc<dyn TokenProvider> = Arc::new(RefreshTokenProvider::new(
            accounts,
            config.credentials().clone(),
        ));
        let tokens = Arc::new(TokenManager::new(
            Arc::clone(config.token_store()),
            Arc::clone(&provider),
        ));
        Self {
            executor: Arc::new(RequestExecutor::new(api, tokens)),
            provider,
        }
    }

    pub fn from_env() -> Result<Self, CrmError> {
        Self::new(CrmConfig::from_env()?)
    }

    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        self.executor.tokens()
    }

    /// Exchange the refresh token directly, bypassing the cache.
    pub async fn fetch_access_token(&self) -> Result<AccessToken, CrmError> {
        Ok(self.provider.fetch().await?)
    }

    pub fn records(&self) -> Records {
        Records::new(Arc::clone(&self.executor))
    }

    pub fn organization(&self) -> Organizations {
        Organizations::new(Arc::clone(&self.executor))
    }

    /// Cursor over any list-shaped endpoint.
    pub fn paginate<T>(&self, request: PageRequest<T>) -> Result<RecordCursor<T>, CrmError> {
        RecordCursor::new(Arc::clone(&self.executor), request)
    }
}
