use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    net::IpAddr,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime, TimeDelta};
use indexmap::IndexMap;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

use super::record::ResolvedRecord;
use crate::error::{LookupError, RirmapError};

pub const DEFAULT_CACHE_FILE: &str = "ip_networks_cache.json";
pub const DEFAULT_UNRESOLVED_FILE: &str = "not_found_list.txt";
pub const DEFAULT_TTL_DAYS: u32 = 14;

const CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Registry metadata stored for one network block
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkInfo {
    pub name: String,
    pub description: String,
    pub country: String,
    pub registry: String,
    pub fqdn: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    pub network: NetworkInfo,
    pub created: NaiveDateTime,
}

/// On-disk shape of a cache entry
#[derive(Debug, Deserialize, Serialize)]
struct StoredEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    registry: String,
    #[serde(default)]
    fqdn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<String>,
}

impl StoredEntry {
    fn from_entry(entry: &CacheEntry) -> Self {
        let network = entry.network.clone();
        Self {
            name: network.name,
            description: network.description,
            country: network.country,
            registry: network.registry,
            fqdn: network.fqdn,
            created: Some(entry.created.format(CREATED_FORMAT).to_string()),
        }
    }

    /// Returns `None` when the creation time is missing or unreadable
    fn into_entry(self) -> Option<CacheEntry> {
        let created = self.created?.parse::<NaiveDateTime>().ok()?;
        Some(CacheEntry {
            network: NetworkInfo {
                name: self.name,
                description: self.description,
                country: self.country,
                registry: self.registry,
                fqdn: self.fqdn,
            },
            created,
        })
    }
}

/// File-backed cache of registry answers keyed by network block
///
/// Lookups are answered by network membership: once a block is cached, every
/// address inside it is served without asking the registry again. Entries
/// are only expired when the cache is loaded.
#[derive(Debug, Default)]
pub struct NetworkCache {
    /// CIDR as reported by the registry -> metadata. Source of truth.
    entries: IndexMap<String, CacheEntry>,
    /// Parsed networks derived from `entries`, in insertion order
    index: Vec<(IpNetwork, String)>,
    /// Addresses that could not be resolved during this session
    unresolved: Vec<String>,
}

impl NetworkCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the cache from `path`, dropping entries older than `ttl`
    ///
    /// A missing file yields an empty cache. A file that cannot be decoded is
    /// logged and also yields an empty cache; only other I/O errors are
    /// returned.
    pub fn load(path: &Path, ttl: TimeDelta) -> Result<Self, RirmapError> {
        Self::load_at(path, ttl, Local::now().naive_local())
    }

    /// Same as [`NetworkCache::load`] with an explicit current time
    pub fn load_at(path: &Path, ttl: TimeDelta, now: NaiveDateTime) -> Result<Self, RirmapError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("Cache file {} not found, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };

        let stored: IndexMap<String, StoredEntry> = match serde_json::from_str(&content) {
            Ok(stored) => stored,
            Err(err) => {
                log::error!(
                    "Error loading {} - ensure this file is not corrupted: {err}",
                    path.display()
                );
                return Ok(Self::default());
            }
        };

        let total = stored.len();
        let mut cache = Self::default();
        for (cidr, raw) in stored {
            let Some(entry) = raw.into_entry() else {
                continue;
            };
            // an expiry past the representable range never expires
            if entry
                .created
                .checked_add_signed(ttl)
                .is_some_and(|expiry| expiry <= now)
            {
                continue;
            }
            cache.entries.insert(cidr, entry);
        }
        cache.rebuild_index();

        log::info!(
            "Loaded {} cached networks from {} ({} expired or invalid)",
            cache.entries.len(),
            path.display(),
            total - cache.entries.len()
        );
        Ok(cache)
    }

    /// Rebuild the containment index from `entries`
    ///
    /// Keys that do not parse as a network are removed from the cache so that
    /// the index and the mapping describe the same set of blocks.
    fn rebuild_index(&mut self) {
        self.index.clear();
        let mut index = Vec::with_capacity(self.entries.len());
        self.entries.retain(|cidr, _| match cidr.parse::<IpNetwork>() {
            Ok(network) => {
                index.push((network, cidr.clone()));
                true
            }
            Err(err) => {
                log::debug!("Dropping cached network {cidr}: {err}");
                false
            }
        });
        self.index = index;
    }

    /// Insert or replace the entry for `cidr`, stamped with the current time
    pub fn set(&mut self, cidr: &str, network: NetworkInfo) {
        self.set_at(cidr, network, Local::now().naive_local());
    }

    /// Insert or replace the entry for `cidr` with an explicit creation time
    ///
    /// The entry is kept even when `cidr` cannot be parsed; it is then
    /// invisible to [`NetworkCache::contains`] until the next load.
    pub fn set_at(&mut self, cidr: &str, network: NetworkInfo, created: NaiveDateTime) {
        let parsed = cidr.parse::<IpNetwork>();
        if let Err(err) = &parsed {
            log::error!(
                "Cannot index network {cidr} (name={}): {err}",
                network.name
            );
        }

        self.entries
            .insert(cidr.to_string(), CacheEntry { network, created });

        if let Ok(parsed) = parsed {
            match self.index.iter_mut().find(|(_, key)| key == cidr) {
                Some(slot) => slot.0 = parsed,
                None => self.index.push((parsed, cidr.to_string())),
            }
        }
    }

    /// Find the first cached block that covers `address`
    ///
    /// Blocks are scanned in insertion order; with overlapping blocks the
    /// first one wins, not the most specific one.
    pub fn contains(&self, address: IpAddr) -> Option<&str> {
        self.index
            .iter()
            .find(|(network, _)| network.contains(address))
            .map(|(_, cidr)| cidr.as_str())
    }

    /// Build the record for `address` from the block cached under `cidr`
    pub fn get(&self, address: &str, cidr: &str) -> Result<ResolvedRecord, LookupError> {
        let entry = self.entries.get(cidr).ok_or_else(|| LookupError::CacheMiss {
            cidr: cidr.to_string(),
        })?;
        let network = &entry.network;

        Ok(ResolvedRecord {
            address: address.to_string(),
            cidr: cidr.to_string(),
            description: network.description.clone(),
            name: network.name.clone(),
            country: network.country.clone(),
            registry: network.registry.clone(),
            fqdn: network.fqdn.clone(),
        })
    }

    pub fn entry(&self, cidr: &str) -> Option<&CacheEntry> {
        self.entries.get(cidr)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every entry, fresh or not, to `path`
    ///
    /// The data is written to a sibling temporary file first and then renamed
    /// over `path`, so an interrupted save leaves the previous file intact.
    pub fn save(&self, path: &Path) -> Result<(), RirmapError> {
        let stored: IndexMap<&str, StoredEntry> = self
            .entries
            .iter()
            .map(|(cidr, entry)| (cidr.as_str(), StoredEntry::from_entry(entry)))
            .collect();

        let json = serde_json::to_string_pretty(&stored).map_err(|source| RirmapError::Encode {
            path: path.to_path_buf(),
            source,
        })?;

        let tmp = temporary_path(path);
        fs::write(&tmp, json).map_err(|source| RirmapError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| RirmapError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("Saved {} networks to {}", self.entries.len(), path.display());
        Ok(())
    }

    /// Remember an address that could not be resolved
    pub fn queue_unresolved(&mut self, address: &str) {
        self.unresolved.push(address.to_string());
    }

    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    /// Append queued unresolved addresses to `path`, one per line, and clear the queue
    pub fn flush_unresolved(&mut self, path: &Path) -> Result<(), RirmapError> {
        if self.unresolved.is_empty() {
            return Ok(());
        }

        let write_err = |source| RirmapError::Write {
            path: path.to_path_buf(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(write_err)?;

        let mut lines = self.unresolved.join("\n");
        lines.push('\n');
        file.write_all(lines.as_bytes()).map_err(write_err)?;

        log::info!(
            "{} unresolved addresses appended to {}",
            self.unresolved.len(),
            path.display()
        );
        self.unresolved.clear();
        Ok(())
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
