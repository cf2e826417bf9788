//! Raw fetcher: local cache first, then a single bounded HTTP GET
//!
//! The published files are ISO-8859-1. Decoding maps every byte to the
//! Unicode code point with the same value, which is exactly Latin-1, so
//! accented entity names survive intact.

use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::table::{RawTable, SourceDescriptor};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fetches source files and parses them into [`RawTable`]s
pub struct RawFetcher {
    client: Client,
    config: IngestConfig,
}

impl RawFetcher {
    pub fn new(config: &IngestConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("vitibrasil-ingest/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetch and parse one source.
    ///
    /// Fails with [`IngestError::SourceUnavailable`] when neither the cache
    /// nor the network yields a parseable document.
    pub async fn fetch(&self, source: &SourceDescriptor) -> Result<RawTable> {
        let bytes = match self.read_cached(source).await {
            Some(bytes) => bytes,
            None => self
                .download(source)
                .await
                .map_err(|reason| IngestError::source_unavailable(source.path, reason))?,
        };

        let text = decode_latin1(&bytes);
        let table = RawTable::from_delimited(source.path, &text, source.separator)
            .map_err(|e| IngestError::source_unavailable(source.path, e))?;

        debug!(
            path = source.path,
            columns = table.headers.len(),
            rows = table.row_count(),
            "Parsed source table"
        );

        Ok(table)
    }

    async fn read_cached(&self, source: &SourceDescriptor) -> Option<Vec<u8>> {
        let cached = self.config.cache_dir.join(source.basename());

        match tokio::fs::read(&cached).await {
            Ok(bytes) => {
                info!(path = source.path, file = %cached.display(), "Loaded source from local cache");
                Some(bytes)
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(file = %cached.display(), error = %e, "Unreadable cache file, falling back to network");
                None
            },
        }
    }

    async fn download(&self, source: &SourceDescriptor) -> std::result::Result<Vec<u8>, String> {
        let url = self.config.source_url(source.path);
        info!(url = %url, "Downloading source");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("request to {} failed: {}", url, e))?;

        if !response.status().is_success() {
            return Err(format!("HTTP error: {}", response.status()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("reading body from {} failed: {}", url, e))?;

        info!(url = %url, bytes = bytes.len(), "Downloaded source");
        Ok(bytes.to_vec())
    }
}

/// ISO-8859-1 decode
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_latin1_preserves_accents() {
        // "Açúcar" in ISO-8859-1
        let bytes = [0x41, 0xE7, 0xFA, 0x63, 0x61, 0x72];
        assert_eq!(decode_latin1(&bytes), "Açúcar");
    }

    #[test]
    fn test_decode_latin1_is_not_utf8() {
        // UTF-8 for "é" decodes as two Latin-1 characters
        assert_eq!(decode_latin1("é".as_bytes()), "Ã©");
    }

    #[tokio::test]
    async fn test_missing_cache_and_unreachable_host_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let config = IngestConfig::default()
            .with_base_url("http://127.0.0.1:9")
            .with_cache_dir(dir.path())
            .with_timeout_secs(2);
        let fetcher = RawFetcher::new(&config).unwrap();

        let err = fetcher
            .fetch(&SourceDescriptor::new("download/Producao.csv", b';'))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::SourceUnavailable { .. }));
    }
}
