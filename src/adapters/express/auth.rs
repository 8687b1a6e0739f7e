//! Courier Authentication — OAuth2 Client-Credentials Token Cache
//!
//! Fetches a bearer token via the client-credentials exchange and caches it
//! with a locally computed expiry: the provider-declared TTL minus a 60 s
//! safety margin. The cached token is owned by this manager and only ever
//! touched from the single-threaded batch context, but lives behind a
//! `tokio::sync::Mutex` so the accessor encapsulates refresh-on-expiry.

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// Safety margin subtracted from the provider-declared token TTL.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Wire shape of the token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// TTL in seconds as declared by the provider.
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Client-credentials token manager for one courier account.
pub struct BearerTokenManager {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    provider: &'static str,
    cached: Mutex<Option<CachedToken>>,
}

impl BearerTokenManager {
    pub fn new(
        http: Client,
        token_url: String,
        client_id: String,
        client_secret: String,
        provider: &'static str,
    ) -> Self {
        Self {
            http,
            token_url,
            client_id,
            client_secret,
            provider,
            cached: Mutex::new(None),
        }
    }

    /// Current bearer token, re-authenticating only when the cache is
    /// empty or past its locally computed expiry.
    pub async fn bearer_token(&self) -> ProviderResult<String> {
        let mut guard = self.cached.lock().await;
        if let Some(token) = guard.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let access_token = fresh.access_token.clone();
        *guard = Some(fresh);
        Ok(access_token)
    }

    /// Drop the cached token so the next call re-authenticates.
    ///
    /// Called exactly once per request on a 401; the caller never loops.
    pub async fn invalidate(&self) {
        let mut guard = self.cached.lock().await;
        *guard = None;
    }

    async fn fetch_token(&self) -> ProviderResult<CachedToken> {
        let basic = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.client_id, self.client_secret));

        let response = self
            .http
            .post(&self.token_url)
            .header("Authorization", format!("Basic {basic}"))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: self.provider,
                source,
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ProviderError::upstream(self.provider, status.as_u16(), body));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::upstream(
                self.provider,
                status.as_u16(),
                format!("invalid token response: {e}"),
            )
        })?;

        let ttl = (token.expires_in - TOKEN_EXPIRY_MARGIN_SECS).max(0);
        let expires_at = Utc::now() + Duration::seconds(ttl);
        debug!(ttl_secs = ttl, "Bearer token refreshed");

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}
