use azure_core::credentials::{AccessToken, TokenCredential, TokenRequestOptions};
use azure_core::time::{Duration, OffsetDateTime};
use azure_core::Result;
use std::sync::Arc;

/// Authenticates with a bearer token that was obtained up front.
///
/// The token is never refreshed; once it expires every request fails with
/// 401 and the run ends.
#[derive(Debug)]
pub struct AccessTokenCredential {
    token: AccessToken,
}

impl AccessTokenCredential {
    pub fn new(token: String, expires_on: OffsetDateTime) -> Arc<Self> {
        Arc::new(Self {
            token: AccessToken::new(token, expires_on),
        })
    }

    /// Wraps a token whose lifetime is unknown; assumes the usual hour.
    pub fn with_default_expiry(token: String) -> Arc<Self> {
        Self::new(token, OffsetDateTime::now_utc() + Duration::hours(1))
    }

    pub fn expires_on(&self) -> OffsetDateTime {
        self.token.expires_on
    }
}

#[async_trait::async_trait]
impl TokenCredential for AccessTokenCredential {
    async fn get_token(&self, _: &[&str], _: Option<TokenRequestOptions>) -> Result<AccessToken> {
        Ok(self.token.clone())
    }
}
