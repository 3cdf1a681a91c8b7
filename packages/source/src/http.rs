//! HTTP document source.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::retry::{self, RetryPolicy};
use crate::{DocumentSource, SourceError};

/// Downloads documents over HTTP(S) with retry.
///
/// Some publishers reject requests without a browser-like `User-Agent`, so
/// extra headers can be attached with [`Self::with_header`].
#[derive(Debug)]
pub struct HttpDocumentSource {
    client: reqwest::Client,
    policy: RetryPolicy,
}

/// Builder for [`HttpDocumentSource`].
#[derive(Debug, Default)]
pub struct HttpDocumentSourceBuilder {
    headers: BTreeMap<String, String>,
    policy: RetryPolicy,
}

impl HttpDocumentSourceBuilder {
    /// Adds an HTTP header to include in every download request.
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_owned(), value.to_owned());
        self
    }

    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds the underlying [`reqwest::Client`].
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if a header name/value is invalid or the
    /// client cannot be constructed.
    pub fn build(self) -> Result<HttpDocumentSource, SourceError> {
        let mut header_map = reqwest::header::HeaderMap::new();
        for (key, value) in &self.headers {
            let invalid = |message: String| SourceError::InvalidHeader {
                header: key.clone(),
                message,
            };
            let name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| invalid(format!("invalid name: {e}")))?;
            let val = reqwest::header::HeaderValue::from_str(value)
                .map_err(|e| invalid(format!("invalid value: {e}")))?;
            header_map.insert(name, val);
        }

        let client = reqwest::Client::builder()
            .default_headers(header_map)
            .build()?;

        Ok(HttpDocumentSource {
            client,
            policy: self.policy,
        })
    }
}

impl HttpDocumentSource {
    #[must_use]
    pub fn builder() -> HttpDocumentSourceBuilder {
        HttpDocumentSourceBuilder::default()
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        let bytes = retry::send_bytes(|| self.client.get(url), &self.policy).await?;
        log::debug!("Downloaded {} bytes from {url}", bytes.len());
        Ok(bytes)
    }
}
