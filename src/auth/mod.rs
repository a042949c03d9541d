//! Access-token lifecycle: minting, caching and refresh.

pub mod error;
pub mod manager;
pub mod provider;
pub mod store;
pub mod token;

pub use error::AuthError;
pub use manager::{TokenManager, ACCESS_TOKEN_CACHE_KEY, EXPIRY_MARGIN_SECS};
pub use provider::{RefreshTokenProvider, TokenProvider};
pub use store::{MemoryTokenStore, TokenStore};
pub use token::{AccessToken, Credentials};
