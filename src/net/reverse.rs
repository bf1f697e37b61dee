use std::net::IpAddr;

use async_trait::async_trait;
use hickory_resolver::{Resolver, TokioResolver};

#[cfg(test)]
use mockall::automock;

use crate::error::RirmapError;

/// Reverse DNS abstraction for testing
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReverseResolver: Send + Sync + 'static {
    /// Resolve `address` to a host name, `None` when no PTR record exists
    async fn reverse_lookup(&self, address: IpAddr) -> Option<String>;
}

/// Production reverse resolver using the system DNS configuration
pub struct SystemReverseResolver {
    resolver: TokioResolver,
}

impl SystemReverseResolver {
    pub fn new() -> Result<Self, RirmapError> {
        let resolver = Resolver::builder_tokio()
            .map_err(|source| RirmapError::DnsResolverInit { source })?
            .build();
        Ok(Self { resolver })
    }
}

#[async_trait]
impl ReverseResolver for SystemReverseResolver {
    async fn reverse_lookup(&self, address: IpAddr) -> Option<String> {
        let response = match self.resolver.reverse_lookup(address).await {
            Ok(response) => response,
            Err(err) => {
                log::debug!("No reverse DNS name for {address}: {err}");
                return None;
            }
        };

        response
            .iter()
            .next()
            .map(|name| name.to_string().trim_end_matches('.').to_string())
            .filter(|name| !name.is_empty())
    }
}

