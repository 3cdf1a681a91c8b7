#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident summary document retrieval and page text decoding.
//!
//! The pipeline only needs two capabilities from the outside world before
//! extraction can start: fetching a document's bytes ([`DocumentSource`])
//! and turning those bytes into per-page text ([`DocumentReader`]). The
//! production implementations are [`http::HttpDocumentSource`] (with
//! automatic retry, see [`retry`]) and [`pdf::PdfDocumentReader`].

pub mod http;
pub mod pdf;
pub mod retry;

use async_trait::async_trait;

/// Errors that can occur while retrieving or decoding a document.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// Page text could not be extracted from the document.
    #[error("Text extraction error: {0}")]
    Extraction(String),

    /// A configured request header cannot be sent.
    #[error("Invalid request header '{header}': {message}")]
    InvalidHeader {
        /// Header name as configured.
        header: String,
        message: String,
    },
}

/// Fetches the raw bytes of a published incident summary.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Downloads the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on network or HTTP failure.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceError>;
}

/// Decodes a paginated document into one text string per page.
pub trait DocumentReader: Send + Sync {
    /// Returns the text of each page in document order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Extraction`] if the bytes are not a readable
    /// document.
    fn pages(&self, bytes: &[u8]) -> Result<Vec<String>, SourceError>;
}
