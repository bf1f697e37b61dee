use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::RirmapError,
    lookup::{
        batch::{DEFAULT_PAUSE, DEFAULT_PAUSE_EVERY, DEFAULT_SAVE_EVERY},
        sheet::DEFAULT_SHEETS,
        workflow::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_COOLDOWN},
    },
    net::{
        cache::{DEFAULT_CACHE_FILE, DEFAULT_TTL_DAYS, DEFAULT_UNRESOLVED_FILE},
        rdap::{DEFAULT_RDAP_URL, DEFAULT_TIMEOUT_SECS},
    },
};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub spreadsheet: SpreadsheetConfig,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Network cache file
    pub path: PathBuf,
    /// File that unresolved addresses are appended to
    pub unresolved_path: PathBuf,
    /// Entries older than this are dropped on load
    pub ttl_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CACHE_FILE),
            unresolved_path: PathBuf::from(DEFAULT_UNRESOLVED_FILE),
            ttl_days: DEFAULT_TTL_DAYS,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LookupConfig {
    pub max_attempts: u32,
    pub timeout_cooldown_secs: u64,
    pub pause_every: u32,
    pub pause_secs: u64,
    pub save_every: u32,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout_cooldown_secs: DEFAULT_TIMEOUT_COOLDOWN.as_secs(),
            pause_every: DEFAULT_PAUSE_EVERY,
            pause_secs: DEFAULT_PAUSE.as_secs(),
            save_every: DEFAULT_SAVE_EVERY,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// RDAP bootstrap service
    pub rdap_url: String,
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            rdap_url: DEFAULT_RDAP_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SpreadsheetConfig {
    /// Worksheets searched for address lists
    pub sheets: Vec<String>,
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            sheets: DEFAULT_SHEETS.iter().map(|sheet| sheet.to_string()).collect(),
        }
    }
}

impl ConfigFile {
    /// Load configuration file
    pub fn load(path: &Path) -> Result<Self, RirmapError> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| RirmapError::ConfigParse {
            path: PathBuf::from(path),
            source,
        })
    }
}
