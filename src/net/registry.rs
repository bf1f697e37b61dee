use std::net::IpAddr;

use async_trait::async_trait;
use serde::Deserialize;

#[cfg(test)]
use mockall::automock;

use crate::error::LookupError;

/// Placeholder some registries report instead of an ASN-level CIDR
pub const PLACEHOLDER_CIDR: &str = "NA";

/// One network entry of a registry answer
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct NetBlock {
    /// A single CIDR or a comma separated list of CIDRs
    pub cidr: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub country: Option<String>,
}

/// Registry answer for a single host address
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RegistryResponse {
    #[serde(default)]
    pub nets: Vec<NetBlock>,
    pub asn_cidr: Option<String>,
    pub asn_description: Option<String>,
    pub asn_country_code: Option<String>,
    pub asn_registry: Option<String>,
}

/// Registry query abstraction for testing
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RegistryClient: Send + Sync + 'static {
    async fn lookup(&self, address: IpAddr) -> Result<RegistryResponse, LookupError>;
}
