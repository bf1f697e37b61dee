use thiserror::Error;

use std::path::PathBuf;

use hickory_resolver::ResolveError;

#[derive(Debug, Error)]
pub enum RirmapError {
    #[error("failed to initialize DNS resolver: {source}")]
    DnsResolverInit {
        #[source]
        source: ResolveError,
    },

    #[error("failed to initialize registry HTTP client: {source}")]
    HttpClientInit {
        #[source]
        source: reqwest::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("spreadsheet {path}: {reason}")]
    Spreadsheet { path: PathBuf, reason: String },
}

/// Failure of a single registry lookup
///
/// Only [`LookupError::Timeout`] is considered transient; every other variant
/// ends the lookup for that address immediately.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("registry query for {address} timed out")]
    Timeout { address: String },

    #[error("HTTP lookup for {address} failed: {reason}")]
    Http { address: String, reason: String },

    #[error("registry response for {address} could not be parsed: {reason}")]
    Protocol { address: String, reason: String },

    #[error("ASN data for {address} could not be parsed: {reason}")]
    AsnParse { address: String, reason: String },

    #[error("network {cidr} is not cached")]
    CacheMiss { cidr: String },
}

impl LookupError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, LookupError::Timeout { .. })
    }
}
