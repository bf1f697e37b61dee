use std::{path::PathBuf, time::Duration};

use crate::{
    error::RirmapError,
    net::{
        cache::{DEFAULT_CACHE_FILE, DEFAULT_UNRESOLVED_FILE, NetworkCache},
        record::ResolvedRecord,
        registry::RegistryClient,
        reverse::ReverseResolver,
    },
};

use super::workflow::{AddressResolver, Resolution};

pub const DEFAULT_PAUSE_EVERY: u32 = 10;
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(2);
pub const DEFAULT_SAVE_EVERY: u32 = 100;

/// Rate limiting and checkpointing of registry lookups
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pacing {
    /// Sleep `pause` after this many registry lookups (0 disables)
    pub pause_every: u32,
    pub pause: Duration,
    /// Save the cache after this many registry lookups (0 disables)
    pub save_every: u32,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            pause_every: DEFAULT_PAUSE_EVERY,
            pause: DEFAULT_PAUSE,
            save_every: DEFAULT_SAVE_EVERY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachePaths {
    pub cache: PathBuf,
    pub unresolved: PathBuf,
}

impl Default for CachePaths {
    fn default() -> Self {
        Self {
            cache: PathBuf::from(DEFAULT_CACHE_FILE),
            unresolved: PathBuf::from(DEFAULT_UNRESOLVED_FILE),
        }
    }
}

/// Outcome counters of one batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub well_known: usize,
    pub cache_hits: usize,
    pub looked_up: usize,
    pub failed: usize,
}

impl BatchStats {
    fn count(&mut self, resolution: &Resolution) {
        match resolution {
            Resolution::WellKnown(_) => self.well_known += 1,
            Resolution::CacheHit(_) => self.cache_hits += 1,
            Resolution::LookedUp(_) => self.looked_up += 1,
            Resolution::Failed => self.failed += 1,
        }
    }

    /// Registry queries issued, successful or not
    pub fn lookups(&self) -> usize {
        self.looked_up + self.failed
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// One record per token that did not fail, in input order
    pub records: Vec<ResolvedRecord>,
    pub stats: BatchStats,
}

/// Drives the resolver over a collection of tokens
///
/// Tokens are resolved strictly one after another so that the pacing
/// counters match the order in which the registry sees the queries.
pub struct BatchDriver<R, D> {
    resolver: AddressResolver<R, D>,
    pacing: Pacing,
    paths: CachePaths,
}

impl<R: RegistryClient, D: ReverseResolver> BatchDriver<R, D> {
    pub fn new(resolver: AddressResolver<R, D>, pacing: Pacing, paths: CachePaths) -> Self {
        Self {
            resolver,
            pacing,
            paths,
        }
    }

    /// Resolve every token of a flat list
    ///
    /// Duplicates are resolved independently; failed tokens produce no record
    /// and end up in the unresolved log.
    pub async fn run_list(
        &self,
        cache: &mut NetworkCache,
        tokens: &[String],
    ) -> Result<BatchReport, RirmapError> {
        let initial_size = cache.len();
        let mut report = BatchReport::default();

        for token in tokens {
            let resolution = self.step(cache, token, &mut report.stats).await?;
            if let Some(record) = resolution.into_record() {
                report.records.push(record);
            }
        }

        self.finish(cache, initial_size, &report.stats)?;
        Ok(report)
    }

    /// Resolve one token and apply pacing
    pub(super) async fn step(
        &self,
        cache: &mut NetworkCache,
        token: &str,
        stats: &mut BatchStats,
    ) -> Result<Resolution, RirmapError> {
        let resolution = self.resolver.resolve(cache, token).await;
        stats.count(&resolution);

        if !resolution.is_external() {
            return Ok(resolution);
        }

        let lookups = stats.lookups();
        if is_multiple(lookups, self.pacing.pause_every) {
            log::info!(
                "Sleeping {}s after another {} lookups. Total lookups: {lookups}",
                self.pacing.pause.as_secs(),
                self.pacing.pause_every
            );
            tokio::time::sleep(self.pacing.pause).await;
        }
        if is_multiple(lookups, self.pacing.save_every) {
            cache.save(&self.paths.cache)?;
        }

        Ok(resolution)
    }

    /// Persist what the batch produced
    pub(super) fn finish(
        &self,
        cache: &mut NetworkCache,
        initial_size: usize,
        stats: &BatchStats,
    ) -> Result<(), RirmapError> {
        if cache.len() > initial_size {
            cache.save(&self.paths.cache)?;
        }
        cache.flush_unresolved(&self.paths.unresolved)?;

        log::info!(
            "{} Cache hits | {} Lookups ({} failed) | {} well-known",
            stats.cache_hits,
            stats.lookups(),
            stats.failed,
            stats.well_known
        );
        Ok(())
    }
}

fn is_multiple(count: usize, every: u32) -> bool {
    every != 0 && count % every as usize == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::LookupError,
        lookup::workflow::RetryPolicy,
        net::{
            registry::{MockRegistryClient, NetBlock, RegistryResponse},
            reverse::MockReverseResolver,
        },
    };
    use rstest::rstest;
    use std::{fs, net::IpAddr};

    fn response_for(cidr: &str, name: &str) -> RegistryResponse {
        RegistryResponse {
            nets: vec![NetBlock {
                cidr: Some(cidr.to_string()),
                name: Some(name.to_string()),
                description: Some("Example".to_string()),
                country: Some("US".to_string()),
            }],
            asn_registry: Some("ARIN".to_string()),
            ..Default::default()
        }
    }

    fn driver(
        registry: MockRegistryClient,
        pacing: Pacing,
        dir: &tempfile::TempDir,
    ) -> BatchDriver<MockRegistryClient, MockReverseResolver> {
        let mut reverse = MockReverseResolver::new();
        reverse.expect_reverse_lookup().returning(|_| None);
        let retry = RetryPolicy {
            max_attempts: 3,
            timeout_cooldown: Duration::ZERO,
        };
        BatchDriver::new(
            AddressResolver::new(registry, reverse, retry),
            pacing,
            CachePaths {
                cache: dir.path().join("cache.json"),
                unresolved: dir.path().join("not_found.txt"),
            },
        )
    }

    fn quick() -> Pacing {
        Pacing {
            pause: Duration::ZERO,
            ..Pacing::default()
        }
    }

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[rstest]
    #[case(10, 10, true)]
    #[case(9, 10, false)]
    #[case(200, 100, true)]
    #[case(0, 0, false)]
    #[case(5, 0, false)]
    fn test_is_multiple(#[case] count: usize, #[case] every: u32, #[case] expected: bool) {
        assert_eq!(is_multiple(count, every), expected);
    }

    #[tokio::test]
    async fn test_list_mixes_outcomes_and_queries_once_per_block() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = MockRegistryClient::new();
        registry
            .expect_lookup()
            .times(1)
            .returning(|_| Ok(response_for("203.0.113.0/24", "EXAMPLE-NET")));
        let driver = driver(registry, quick(), &dir);
        let mut cache = NetworkCache::new();

        let report = driver
            .run_list(
                &mut cache,
                &tokens(&["203.0.113.5", "203.0.113.9", "10.0.0.1", "garbage"]),
            )
            .await
            .unwrap();

        assert_eq!(
            report.stats,
            BatchStats {
                well_known: 2,
                cache_hits: 1,
                looked_up: 1,
                failed: 0,
            }
        );
        assert_eq!(report.records.len(), 4);
        assert_eq!(report.records[1].address, "203.0.113.9");
        assert_eq!(report.records[1].name, "EXAMPLE-NET");

        // cache grew, so it was saved
        let saved = fs::read_to_string(dir.path().join("cache.json")).unwrap();
        assert!(saved.contains("203.0.113.0/24"));
        assert!(!dir.path().join("not_found.txt").exists());
    }

    #[tokio::test]
    async fn test_failed_tokens_are_logged_not_returned() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = MockRegistryClient::new();
        registry.expect_lookup().returning(|address| {
            if address.to_string() == "198.51.100.1" {
                Err(LookupError::Http {
                    address: address.to_string(),
                    reason: "404".to_string(),
                })
            } else {
                Ok(response_for("203.0.113.0/24", "EXAMPLE-NET"))
            }
        });
        let driver = driver(registry, quick(), &dir);
        let mut cache = NetworkCache::new();

        let report = driver
            .run_list(&mut cache, &tokens(&["198.51.100.1", "203.0.113.5"]))
            .await
            .unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.stats.failed, 1);
        assert_eq!(report.stats.lookups(), 2);
        let logged = fs::read_to_string(dir.path().join("not_found.txt")).unwrap();
        assert_eq!(logged, "198.51.100.1\n");
        assert!(cache.unresolved().is_empty());
    }

    #[tokio::test]
    async fn test_periodic_save_even_without_growth() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = MockRegistryClient::new();
        registry
            .expect_lookup()
            .times(2)
            .returning(|_| Ok(response_for("0.0.0.0/0", "IANA-BLK")));
        let pacing = Pacing {
            save_every: 2,
            ..quick()
        };
        let driver = driver(registry, pacing, &dir);
        let mut cache = NetworkCache::new();

        driver
            .run_list(&mut cache, &tokens(&["203.0.113.5", "198.51.100.7"]))
            .await
            .unwrap();

        assert!(cache.is_empty());
        assert!(dir.path().join("cache.json").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_counts_only_registry_lookups() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = MockRegistryClient::new();
        registry.expect_lookup().times(15).returning(|address| {
            let IpAddr::V4(v4) = address else {
                unreachable!("only IPv4 tokens are used");
            };
            let [a, b, c, _] = v4.octets();
            Ok(response_for(&format!("{a}.{b}.{c}.0/24"), "EXAMPLE-NET"))
        });
        let pacing = Pacing {
            pause_every: 10,
            pause: Duration::from_secs(2),
            save_every: 0,
        };
        let driver = driver(registry, pacing, &dir);
        let mut cache = NetworkCache::new();

        // one lookup, one cache hit and one well-known token per block
        let tokens: Vec<String> = (0..15)
            .flat_map(|n| {
                [
                    format!("203.0.{n}.5"),
                    format!("203.0.{n}.9"),
                    "10.0.0.1".to_string(),
                ]
            })
            .collect();

        let started = tokio::time::Instant::now();
        let report = driver.run_list(&mut cache, &tokens).await.unwrap();

        assert_eq!(report.stats.lookups(), 15);
        assert_eq!(report.stats.cache_hits, 15);
        assert_eq!(report.stats.well_known, 15);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_lookups_advance_the_pause_counter() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = MockRegistryClient::new();
        registry.expect_lookup().times(4).returning(|address| {
            Err(LookupError::Http {
                address: address.to_string(),
                reason: "404".to_string(),
            })
        });
        let pacing = Pacing {
            pause_every: 2,
            pause: Duration::from_secs(5),
            save_every: 0,
        };
        let driver = driver(registry, pacing, &dir);
        let mut cache = NetworkCache::new();

        let started = tokio::time::Instant::now();
        let report = driver
            .run_list(
                &mut cache,
                &tokens(&["198.51.100.1", "198.51.100.2", "198.51.100.3", "198.51.100.4"]),
            )
            .await
            .unwrap();

        assert_eq!(report.stats.failed, 4);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_unchanged_cache_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = MockRegistryClient::new();
        registry.expect_lookup().times(0);
        let driver = driver(registry, quick(), &dir);
        let mut cache = NetworkCache::new();
        cache.set(
            "203.0.113.0/24",
            crate::net::cache::NetworkInfo {
                name: "EXAMPLE-NET".to_string(),
                ..Default::default()
            },
        );

        let report = driver
            .run_list(&mut cache, &tokens(&["203.0.113.5", "203.0.113.5"]))
            .await
            .unwrap();

        assert_eq!(report.stats.cache_hits, 2);
        assert_eq!(report.records.len(), 2);
        assert!(!dir.path().join("cache.json").exists());
    }
}
