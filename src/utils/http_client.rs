use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::HttpConfig;
use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::utils::url::UrlUtils;

/// Text fetches against upstream hosts.
///
/// Stream resolution and guide aggregation only ever need a page body as
/// text; keeping that behind a trait lets both be driven by in-process fakes.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// GET `url` and return the body, failing on transport errors and non-2xx status
    async fn fetch_text(&self, url: &str) -> SourceResult<String>;
}

/// reqwest-backed fetcher shared by all requests (connection-pooled)
#[derive(Clone)]
pub struct StandardHttpClient {
    client: Client,
}

impl StandardHttpClient {
    pub fn new(config: &HttpConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    fn map_transport_error(url: &str, error: reqwest::Error) -> SourceError {
        let url = UrlUtils::obfuscate_credentials(url);
        if error.is_timeout() {
            SourceError::Timeout { url }
        } else {
            SourceError::Request {
                url,
                message: UrlUtils::obfuscate_credentials(&error.to_string()),
            }
        }
    }
}

#[async_trait]
impl HttpFetcher for StandardHttpClient {
    async fn fetch_text(&self, url: &str) -> SourceResult<String> {
        debug!("Fetching text content from: {}", UrlUtils::obfuscate_credentials(url));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::map_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: UrlUtils::obfuscate_credentials(url),
            });
        }

        let content = response
            .text()
            .await
            .map_err(|e| Self::map_transport_error(url, e))?;

        debug!("Successfully fetched {} characters of text content", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(request_timeout: Duration) -> StandardHttpClient {
        StandardHttpClient::new(&HttpConfig {
            connect_timeout: Duration::from_secs(2),
            request_timeout,
            user_agent: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_text_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let body = client(Duration::from_secs(5))
            .fetch_text(&format!("{}/page", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn test_fetch_text_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(Duration::from_secs(5))
            .fetch_text(&format!("{}/down", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_text_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = client(Duration::from_millis(200))
            .fetch_text(&format!("{}/slow", server.uri()))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }
}
