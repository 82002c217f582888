use crate::config::ScraperConfig;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Worth another attempt: connection trouble, rate limiting, server errors.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request { .. } | FetchError::Body { .. } => true,
            FetchError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            FetchError::Decode { .. } => false,
        }
    }
}

pub struct HttpClient {
    inner: reqwest::Client,
    config: ScraperConfig,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            // Accept cookies so session-based pages work
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            inner,
            config: config.clone(),
        })
    }

    /// `retry_base_ms`, then doubling, each with jitter.
    fn retry_strategy(&self) -> impl Iterator<Item = Duration> + use<> {
        ExponentialBackoff::from_millis(2)
            .factor((self.config.retry_base_ms / 2).max(1))
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.config.max_retries)
    }

    /// Fetch a URL as text, retrying transient failures.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0u32;
        RetryIf::start(
            self.retry_strategy(),
            || {
                attempt += 1;
                self.get_text_once(url, attempt)
            },
            |e: &FetchError| {
                let retry = e.is_transient();
                if retry {
                    warn!("{} (will retry)", e);
                }
                retry
            },
        )
        .await
    }

    async fn get_text_once(&self, url: &str, attempt: u32) -> Result<String, FetchError> {
        debug!("GET {} (attempt {})", url, attempt);

        let resp = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        resp.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }

    /// Fetch and deserialize a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> FetchError {
        FetchError::Status {
            url: "https://x".into(),
            status: StatusCode::from_u16(code).unwrap(),
        }
    }

    #[test]
    fn test_transient_statuses() {
        assert!(status(429).is_transient());
        assert!(status(503).is_transient());
        assert!(!status(404).is_transient());
        assert!(!status(403).is_transient());
    }

    #[test]
    fn test_decode_is_permanent() {
        let err = FetchError::Decode {
            url: "https://x".into(),
            source: serde_json::from_str::<u8>("nope").unwrap_err(),
        };
        assert!(!err.is_transient());
        assert!(err.to_string().contains("https://x"));
    }

    #[test]
    fn test_retry_budget_follows_config() {
        let config = ScraperConfig {
            max_retries: 3,
            ..ScraperConfig::default()
        };
        let client = HttpClient::new(&config).unwrap();
        assert_eq!(client.retry_strategy().count(), 3);
    }

    #[tokio::test]
    async fn test_connection_failure_surfaces_after_retries() {
        let config = ScraperConfig {
            timeout_secs: 2,
            max_retries: 1,
            retry_base_ms: 2,
            ..ScraperConfig::default()
        };
        let client = HttpClient::new(&config).unwrap();
        let err = client.get_text("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
        assert!(err.is_transient());
    }
}
