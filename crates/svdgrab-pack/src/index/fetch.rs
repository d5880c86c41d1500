//! Index retrieval over HTTP.

use std::sync::Arc;

use url::Url;

use crate::http::HttpClient;
use crate::{PackError, Result};

use super::model::Index;

/// Index published by Keil, listing every public CMSIS pack
pub const DEFAULT_INDEX_URL: &str = "https://www.keil.com/pack/index.pidx";

/// Fetches and parses pack index documents
pub struct IndexFetcher {
    http_client: Arc<HttpClient>,
}

impl IndexFetcher {
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self { http_client }
    }

    /// Download the index at `url` and parse it.
    ///
    /// A single attempt is made; the caller decides what a failure means.
    pub async fn fetch(&self, url: &str) -> Result<Index> {
        validate_index_url(url)?;

        let body = self.http_client.get_text(url).await?;
        let index = Index::from_xml(&body)?;

        log::debug!(
            "Index from {} lists {} packs ({} vendor indexes)",
            url,
            index.packages().count(),
            index.vendor_indexes().count()
        );
        Ok(index)
    }
}

/// Check that `url` is a non-empty absolute http(s) URL
pub fn validate_index_url(url: &str) -> Result<Url> {
    let invalid = |reason: &str| PackError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    if url.trim().is_empty() {
        return Err(invalid("URL is empty"));
    }

    let parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(invalid(&format!("unsupported scheme '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_url() {
        let url = validate_index_url(DEFAULT_INDEX_URL).unwrap();
        assert_eq!(url.host_str(), Some("www.keil.com"));
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(matches!(validate_index_url(""), Err(PackError::InvalidUrl { .. })));
        assert!(matches!(validate_index_url("   "), Err(PackError::InvalidUrl { .. })));
    }

    #[test]
    fn test_validate_rejects_relative_and_foreign_schemes() {
        assert!(matches!(validate_index_url("pack/index.pidx"), Err(PackError::InvalidUrl { .. })));
        assert!(matches!(
            validate_index_url("ftp://example.com/index.pidx"),
            Err(PackError::InvalidUrl { ref reason, .. }) if reason.contains("ftp")
        ));
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_url_without_network() {
        let fetcher = IndexFetcher::new(Arc::new(HttpClient::new().unwrap()));
        let err = fetcher.fetch("").await.unwrap_err();
        assert!(matches!(err, PackError::InvalidUrl { .. }));
    }
}
