use std::fmt;

use serde::{Deserialize, Serialize};

/// Access token as issued by the accounts server.
///
/// # Example
/// ```
/// use zoho_crm::auth::AccessToken;
///
/// let token = AccessToken {
///     access_token: "1000.xxxx.yyyy".to_string(),
///     expires_in: 3600,
/// };
/// assert_eq!(token.expires_in, 3600);
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Lifetime in seconds, as reported at issuance.
    pub expires_in: u64,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[FILTERED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// OAuth client credentials plus the long-lived refresh token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &"[FILTERED]")
            .field("client_secret", &"[FILTERED]")
            .field("refresh_token", &"[FILTERED]")
            .finish()
    }
}
