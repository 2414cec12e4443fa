//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("ace-client/", env!("CARGO_PKG_VERSION"));

/// Reqwest-based HTTP client implementation
///
/// Provides HTTP operations with:
/// - Connection pooling via reqwest
/// - Exponential backoff on 5xx and 429 for idempotent requests
/// - Per-request timeouts reported as [`BridgeError::Timeout`]
pub struct ReqwestHttpClient {
    client: Client,
    timeout: Duration,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with a 30 second default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new HTTP client with a custom default timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                BridgeError::NotAvailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client, timeout })
    }

    /// Wrap a preconfigured reqwest client
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn build_request(&self, request: &HttpRequest) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .request(Self::convert_method(request.method), &request.url);

        for (key, value) in &request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    fn map_error(&self, request: &HttpRequest, e: reqwest::Error) -> BridgeError {
        if e.is_timeout() {
            let limit = request.timeout.unwrap_or(self.timeout);
            BridgeError::Timeout(limit.as_millis() as u64)
        } else if e.is_connect() {
            BridgeError::OperationFailed(format!("Connection failed: {}", e))
        } else {
            BridgeError::OperationFailed(e.to_string())
        }
    }

    async fn send_once(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(|e| self.map_error(request, e))?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_error(request, e))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn is_retryable(status: u16) -> bool {
        status >= 500 || status == 429
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    /// GETs retry with the default policy; anything with side effects is
    /// sent exactly once.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let policy = match request.method {
            HttpMethod::Get => RetryPolicy::default(),
            _ => RetryPolicy::none(),
        };
        self.execute_with_retry(request, policy).await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!(
                attempt,
                max_attempts,
                method = request.method.as_str(),
                url = %request.url,
                "Executing HTTP request"
            );

            let result = self.send_once(&request).await;
            let retry = match &result {
                Ok(response) if Self::is_retryable(response.status) => {
                    warn!(status = response.status, attempt, "Retryable HTTP status");
                    true
                }
                Ok(_) => false,
                Err(BridgeError::Timeout(_)) => false,
                Err(e) => {
                    warn!(error = %e, attempt, "HTTP request failed");
                    true
                }
            };

            if !retry || attempt >= max_attempts {
                return result;
            }

            let delay = policy.delay_for(attempt);
            debug!(delay_ms = delay.as_millis() as u64, "Retrying after delay");
            sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(ReqwestHttpClient::with_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Get),
            reqwest::Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Delete),
            reqwest::Method::DELETE
        );
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(ReqwestHttpClient::is_retryable(503));
        assert!(ReqwestHttpClient::is_retryable(429));
        assert!(!ReqwestHttpClient::is_retryable(401));
        assert!(!ReqwestHttpClient::is_retryable(422));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_reported() {
        let client = ReqwestHttpClient::with_timeout(Duration::from_secs(2)).unwrap();
        let request = HttpRequest::post("http://127.0.0.1:9/api/auth/logout");

        let err = client.execute(request).await.unwrap_err();

        assert!(matches!(
            err,
            BridgeError::OperationFailed(_) | BridgeError::Timeout(_)
        ));
    }
}
