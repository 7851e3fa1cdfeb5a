use reqwest::{Method, StatusCode};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::api::{classify, AccessToken, ApiError, RequestExecutor, TOKEN_PATH};

/// The cookie the API uses to remember the current token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Owns the access token for the current user.
///
/// A token is fetched on first use and reused by every later call until
/// [`TokenManager::invalidate`] succeeds. `expires_in` is never consulted:
/// expiry is left to the server, which answers with an error once the
/// token is no longer valid.
///
/// The lock is held across the token request, so concurrent callers
/// wait for the one in flight instead of each issuing their own.
pub struct TokenManager {
    executor: RequestExecutor,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(executor: RequestExecutor) -> Self {
        Self {
            executor,
            cached: Mutex::new(None),
        }
    }

    /// Starts with a previously stored token, skipping the initial fetch.
    pub fn with_token(executor: RequestExecutor, token: AccessToken) -> Self {
        Self {
            executor,
            cached: Mutex::new(Some(token)),
        }
    }

    /// Returns the cached token, or fetches a new one if there is none.
    pub async fn acquire(&self) -> Result<AccessToken, ApiError> {
        // We keep the lock across the fetch so concurrent callers share one request.
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            debug!("Reusing cached access token");
            return Ok(token.clone());
        }

        let response = self
            .executor
            .request(Method::GET, TOKEN_PATH)
            .execute()
            .await?;
        let token: AccessToken = classify::decode(response, StatusCode::OK)?;

        // We only cache a token once it has fully decoded.
        info!(expires_in = ?token.expires_in(), "Acquired new access token");
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Revokes the current token on the server and forgets it locally,
    /// so the next [`TokenManager::acquire`] fetches a fresh one.
    ///
    /// If the server refuses, the cached token is kept.
    pub async fn invalidate(&self) -> Result<(), ApiError> {
        let mut cached = self.cached.lock().await;

        let mut request = self.executor.request(Method::DELETE, TOKEN_PATH);
        if let Some(token) = cached.as_ref() {
            request = request.bearer(token);
        }
        let response = request.execute().await?;
        classify::expect_empty(response, StatusCode::NO_CONTENT)?;

        // The token cookie would otherwise hand the same token back to us.
        self.executor.remove_cookie(TOKEN_PATH, ACCESS_TOKEN_COOKIE);
        *cached = None;
        info!("Invalidated access token");
        Ok(())
    }

    /// The cached token, if any, without touching the network.
    pub async fn current(&self) -> Option<AccessToken> {
        self.cached.lock().await.clone()
    }
}
