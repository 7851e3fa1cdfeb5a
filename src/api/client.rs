use reqwest::{Method, StatusCode};
use std::sync::Arc;
use tracing::info;

use super::{
    classify, http_client::ReqwestTransport, AccessToken, ApiError, Person, RequestExecutor,
    Transport, ME_PATH,
};
use crate::{
    auth::TokenManager,
    config::{ClientConfig, ConfigError},
};

/// A client for a single referral domain.
///
/// The access token is acquired implicitly by the first call that needs it,
/// and reused until [`ApiClient::delete_token`] succeeds.
pub struct ApiClient {
    executor: RequestExecutor,
    tokens: TokenManager,
}

impl ApiClient {
    /// Creates a new client talking to the configured domain over HTTP.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a new client on top of the given transport.
    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let executor = RequestExecutor::new(config, transport);
        Self {
            tokens: TokenManager::new(executor.clone()),
            executor,
        }
    }

    /// Reuses a token the consumer stored earlier instead of fetching one.
    pub fn with_access_token(mut self, token: AccessToken) -> Self {
        self.tokens = TokenManager::with_token(self.executor.clone(), token);
        self
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Retrieves the access token identifying this user,
    /// creating one if none is held yet.
    pub async fn get_token(&self) -> Result<AccessToken, ApiError> {
        self.tokens.acquire().await
    }

    /// Revokes the current access token.
    pub async fn delete_token(&self) -> Result<(), ApiError> {
        self.tokens.invalidate().await
    }

    /// Retrieves the current person.
    pub async fn get_me(&self) -> Result<Person, ApiError> {
        let token = self.tokens.acquire().await?;
        let response = self
            .executor
            .request(Method::GET, ME_PATH)
            .bearer(&token)
            .execute()
            .await?;
        classify::decode(response, StatusCode::OK)
    }

    /// Updates the current person with every field set on `person`.
    ///
    /// The returned person is decoded from the update response itself;
    /// no follow-up fetch is made.
    pub async fn update_me(&self, person: &Person) -> Result<Person, ApiError> {
        let token = self.tokens.acquire().await?;
        let response = self
            .executor
            .request(Method::POST, ME_PATH)
            .bearer(&token)
            .json(&person.to_update())
            .execute()
            .await?;
        let updated: Person = classify::decode(response, StatusCode::OK)?;

        info!(person_id = ?updated.id(), "Updated person");
        Ok(updated)
    }
}
