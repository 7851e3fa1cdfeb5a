//! An in-memory transport answering from a script.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};
use url::Url;

use super::{HttpRequest, RawResponse, RequestExecutor, Transport, TransportError};
use crate::config::ClientConfig;

pub const DOMAIN: &str = "https://refer.example.com";

#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    removed_cookies: Mutex<Vec<(Url, String)>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: StatusCode, body: &str) -> &Self {
        self.push(Ok(RawResponse::new(status, body)))
    }

    pub fn fail(&self) -> &Self {
        self.push(Err(TransportError::Unavailable("offline".to_string())))
    }

    fn push(&self, response: Result<RawResponse, TransportError>) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn removed_cookies(&self) -> Vec<(Url, String)> {
        self.removed_cookies.lock().unwrap().clone()
    }

    pub fn executor(self: &Arc<Self>) -> RequestExecutor {
        let config = ClientConfig::new(DOMAIN).unwrap();
        RequestExecutor::new(&config, Arc::clone(self) as Arc<dyn Transport>)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Unavailable("script exhausted".to_string())))
    }

    fn remove_cookie(&self, url: &Url, name: &str) {
        self.removed_cookies
            .lock()
            .unwrap()
            .push((url.clone(), name.to_string()));
    }
}
