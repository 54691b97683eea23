//! HTTP client for the public provider endpoints

use crate::errors::{Result, StatusError};
use reqwest::Client;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Shared client for unauthenticated upstream GETs.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .build()
            .map_err(StatusError::Http)?;

        Ok(Self { client })
    }

    /// Fetch a body as raw bytes. The deadline covers both the request and
    /// reading the body.
    pub async fn get_bytes(&self, url: &str, deadline: Duration) -> Result<Vec<u8>> {
        debug!("GET {} (timeout {}s)", url, deadline.as_secs());

        timeout(deadline, self.fetch_body(url))
            .await
            .map_err(|_| StatusError::Timeout {
                url: url.to_string(),
                seconds: deadline.as_secs(),
            })?
    }

    async fn fetch_body(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(StatusError::Upstream {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }

    pub async fn get_text(&self, url: &str, deadline: Duration) -> Result<String> {
        let bytes = self.get_bytes(url, deadline).await?;
        String::from_utf8(bytes)
            .map_err(|e| StatusError::Decode(format!("{} is not valid UTF-8: {}", url, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(header("user-agent", "CloudStatusMonitor/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = UpstreamClient::new("CloudStatusMonitor/1.0").unwrap();
        let body = client
            .get_text(&format!("{}/feed", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_non_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = UpstreamClient::new("test-agent").unwrap();
        let err = client
            .get_bytes(&server.uri(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, StatusError::Upstream { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let client = UpstreamClient::new("test-agent").unwrap();
        let err = client
            .get_bytes(&server.uri(), Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, StatusError::Timeout { .. }));
    }
}
