use std::{net::IpAddr, time::Duration};

use crate::net::{
    cache::{NetworkCache, NetworkInfo},
    classify::{Classification, classify},
    record::ResolvedRecord,
    registry::{PLACEHOLDER_CIDR, RegistryClient, RegistryResponse},
    reverse::ReverseResolver,
};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_TIMEOUT_COOLDOWN: Duration = Duration::from_secs(10);

/// Blocks that are too wide and delegated elsewhere; never cached
pub const EXCLUDED_NET_NAMES: &[&str] = &["IANA-BLK"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Registry queries per address, including the first one (0 acts as 1)
    pub max_attempts: u32,
    /// Pause after a timed out query before trying again
    pub timeout_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout_cooldown: DEFAULT_TIMEOUT_COOLDOWN,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    WellKnown,
    CacheHit,
    LookedUp,
    Failed,
}

/// Terminal state of resolving one token
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    WellKnown(ResolvedRecord),
    CacheHit(ResolvedRecord),
    LookedUp(ResolvedRecord),
    Failed,
}

impl Resolution {
    pub fn outcome(&self) -> Outcome {
        match self {
            Resolution::WellKnown(_) => Outcome::WellKnown,
            Resolution::CacheHit(_) => Outcome::CacheHit,
            Resolution::LookedUp(_) => Outcome::LookedUp,
            Resolution::Failed => Outcome::Failed,
        }
    }

    pub fn record(&self) -> Option<&ResolvedRecord> {
        match self {
            Resolution::WellKnown(record)
            | Resolution::CacheHit(record)
            | Resolution::LookedUp(record) => Some(record),
            Resolution::Failed => None,
        }
    }

    pub fn into_record(self) -> Option<ResolvedRecord> {
        match self {
            Resolution::WellKnown(record)
            | Resolution::CacheHit(record)
            | Resolution::LookedUp(record) => Some(record),
            Resolution::Failed => None,
        }
    }

    /// Whether the registry was queried to reach this state
    pub fn is_external(&self) -> bool {
        matches!(self, Resolution::LookedUp(_) | Resolution::Failed)
    }
}

/// Per-address resolution: classification, cache, then registry
pub struct AddressResolver<R, D> {
    registry: R,
    reverse: D,
    retry: RetryPolicy,
}

impl<R: RegistryClient, D: ReverseResolver> AddressResolver<R, D> {
    pub fn new(registry: R, reverse: D, retry: RetryPolicy) -> Self {
        Self {
            registry,
            reverse,
            retry,
        }
    }

    /// Resolve a single address or CIDR token
    ///
    /// # Behavior
    /// 1. Well-known ranges and invalid tokens are answered without any I/O
    /// 2. A cached block covering the host part is answered from the cache
    /// 3. Otherwise the registry is queried; timeouts are retried after a
    ///    cooldown, every other error gives up immediately
    /// 4. Failures are queued in the cache's unresolved log
    /// 5. Successful answers are cached per sub-block unless the block name
    ///    is in [`EXCLUDED_NET_NAMES`]
    ///
    /// Never returns an error: every failure becomes [`Resolution::Failed`].
    pub async fn resolve(&self, cache: &mut NetworkCache, token: &str) -> Resolution {
        let ip = match classify(token) {
            Classification::WellKnown(record) => return Resolution::WellKnown(record),
            Classification::Routable(ip) => ip,
        };

        if let Some(cidr) = cache.contains(ip) {
            match cache.get(token, cidr) {
                Ok(record) => return Resolution::CacheHit(record),
                Err(err) => log::warn!("Cache lookup for {token} failed: {err}"),
            }
        }

        let Some(response) = self.query(ip, token).await else {
            cache.queue_unresolved(token);
            return Resolution::Failed;
        };

        let record = self.build_record(token, ip, &response).await;

        // Too wide and delegated to another registry
        if EXCLUDED_NET_NAMES.contains(&record.name.as_str()) {
            log::info!("Not caching {} for {token}: delegated block", record.name);
            return Resolution::LookedUp(record);
        }

        for cidr in sub_blocks(&response) {
            cache.set(
                &cidr,
                NetworkInfo {
                    name: record.name.clone(),
                    description: record.description.clone(),
                    country: record.country.clone(),
                    registry: record.registry.clone(),
                    fqdn: record.fqdn.clone(),
                },
            );
        }

        Resolution::LookedUp(record)
    }

    async fn query(&self, ip: IpAddr, token: &str) -> Option<RegistryResponse> {
        // the first query is always made
        let max_attempts = self.retry.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.registry.lookup(ip).await {
                Ok(response) => return Some(response),
                Err(err) if err.is_retryable() => {
                    if attempt == max_attempts {
                        break;
                    }
                    log::info!(
                        "Pausing lookup for {}s because of likely timeout error ({attempt}/{max_attempts})",
                        self.retry.timeout_cooldown.as_secs()
                    );
                    tokio::time::sleep(self.retry.timeout_cooldown).await;
                }
                Err(err) => {
                    log::warn!("Lookup failed for {token}: {err}");
                    return None;
                }
            }
        }

        log::warn!("Lookup for {token} timed out {max_attempts} times, giving up");
        None
    }

    async fn build_record(
        &self,
        token: &str,
        ip: IpAddr,
        response: &RegistryResponse,
    ) -> ResolvedRecord {
        let (cidr, name, description, country) = match response.nets.first() {
            Some(net) => (
                clean(net.cidr.as_deref()),
                clean(net.name.as_deref()),
                clean(net.description.as_deref()),
                clean(net.country.as_deref()),
            ),
            None => (
                clean(response.asn_cidr.as_deref()),
                String::new(),
                clean(response.asn_description.as_deref()),
                clean(response.asn_country_code.as_deref()),
            ),
        };

        let fqdn = if is_single_host(token, ip) {
            self.reverse.reverse_lookup(ip).await.unwrap_or_default()
        } else {
            String::new()
        };

        ResolvedRecord {
            address: token.to_string(),
            cidr,
            description,
            name,
            country,
            registry: clean(response.asn_registry.as_deref()),
            fqdn,
        }
    }
}

fn clean(value: Option<&str>) -> String {
    value.unwrap_or_default().replace('\n', " ")
}

/// A bare address, or a prefix covering exactly one address
fn is_single_host(token: &str, ip: IpAddr) -> bool {
    let full_length = match ip {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };

    match token.split_once('/') {
        None => true,
        Some((_, prefix)) => prefix
            .trim()
            .parse::<u8>()
            .is_ok_and(|length| length == full_length),
    }
}

/// Blocks to cache for a registry answer
///
/// The ASN-level CIDR wins when the registry reported one; otherwise the
/// comma separated CIDR list of the first network entry is used.
fn sub_blocks(response: &RegistryResponse) -> Vec<String> {
    if let Some(cidr) = response.asn_cidr.as_deref().map(str::trim)
        && !cidr.is_empty()
        && cidr != PLACEHOLDER_CIDR
    {
        return vec![cidr.to_string()];
    }

    response
        .nets
        .first()
        .and_then(|net| net.cidr.as_deref())
        .map(|list| {
            list.split(',')
                .map(|cidr| cidr.chars().filter(|c| !c.is_whitespace()).collect::<String>())
                .filter(|cidr| !cidr.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
