use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url: {url}")]
    InvalidUrl { url: String },
    #[error("request for {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("http client init failed: {0}")]
    Client(#[from] reqwest::Error),
}

/// The document retriever contract: one attempt per URL, raw bytes or a
/// failure carrying the URL and a reason.
pub trait DocumentFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let target = Url::parse(url)
            .ok()
            .filter(|parsed| matches!(parsed.scheme(), "http" | "https"))
            .ok_or_else(|| FetchError::InvalidUrl {
                url: url.to_string(),
            })?;

        let wrap = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(target).send().await.map_err(wrap)?;
        let response = response.error_for_status().map_err(wrap)?;
        let bytes = response.bytes().await.map_err(wrap)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_non_http_schemes() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1), "test").unwrap();
        let err = fetcher.fetch("ftp://example.test/x").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));

        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
