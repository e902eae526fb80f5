//! HttpStateSyncClient - REST implementation of the state-sync contract.
//!
//! Read operations become `GET {base}/{operation}` with parameters in the
//! query string (omitted when there are none). Write operations become
//! `POST {base}/{operation}` with the parameters as a JSON body.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use taxsync_core::config::ClientConfig;
use taxsync_core::error::{Result, TaxError};
use taxsync_core::remote::{Method, Outcome, Params, ResponseFields, StateSyncClient};

/// Stateless HTTP client for the tax calculation service.
#[derive(Clone)]
pub struct HttpStateSyncClient {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpStateSyncClient {
    /// Creates a client rooted at `base_url`; no timeout is applied.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let client = Self::new(config.server_url.as_str());
        match config.request_timeout() {
            Some(timeout) => client.with_timeout(timeout),
            None => client,
        }
    }

    /// Applies a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn endpoint(&self, operation: &str) -> String {
        format!("{}/{}", self.base_url, operation)
    }
}

#[async_trait]
impl StateSyncClient for HttpStateSyncClient {
    async fn invoke(
        &self,
        operation: &str,
        method: Method,
        params: Params,
    ) -> Result<ResponseFields> {
        let url = self.endpoint(operation);

        let mut request = match method {
            Method::Read if params.is_empty() => self.client.get(&url),
            Method::Read => self.client.get(&url).query(&params),
            Method::Write => self.client.post(&url).json(&params),
        };
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!(operation, ?method, ?params, "sending request");

        let response = request.send().await.map_err(|e| {
            tracing::warn!(operation, error = %e, "request did not complete");
            TaxError::transport(format!("{} request failed: {}", operation, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(operation, status = status.as_u16(), "server returned failure status");
            return Err(TaxError::protocol(status.as_u16(), body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TaxError::decode(format!("Failed to parse {} response: {}", operation, e)))?;

        let outcome = Outcome::from_body(method, body);
        if let Outcome::Failure(reason) = &outcome {
            tracing::debug!(operation, reason = %reason, "server rejected operation");
        }
        outcome.into_result(operation)
    }
}
