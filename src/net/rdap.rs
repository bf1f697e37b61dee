use std::{net::IpAddr, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use serde::Deserialize;

use super::registry::{NetBlock, RegistryClient, RegistryResponse};
use crate::error::{LookupError, RirmapError};

pub const DEFAULT_RDAP_URL: &str = "https://rdap.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const RDAP_MEDIA_TYPE: &str = "application/rdap+json";

#[derive(Debug, Deserialize)]
struct Cidr0 {
    v4prefix: Option<String>,
    v6prefix: Option<String>,
    length: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct Remark {
    #[serde(default)]
    description: Vec<String>,
}

/// The subset of an RDAP IP network object that ends up in a record
#[derive(Debug, Deserialize)]
struct IpNetworkObject {
    name: Option<String>,
    country: Option<String>,
    port43: Option<String>,
    #[serde(default)]
    cidr0_cidrs: Vec<Cidr0>,
    #[serde(default)]
    remarks: Vec<Remark>,
}

impl IpNetworkObject {
    fn into_response(self, address: IpAddr) -> Result<RegistryResponse, LookupError> {
        let registry = self
            .port43
            .as_deref()
            .and_then(registry_from_whois_server)
            .ok_or_else(|| LookupError::AsnParse {
                address: address.to_string(),
                reason: "no registry could be derived from the port43 server".to_string(),
            })?;

        let cidrs: Vec<String> = self
            .cidr0_cidrs
            .iter()
            .filter_map(|cidr| {
                let prefix = cidr.v4prefix.as_ref().or(cidr.v6prefix.as_ref())?;
                Some(format!("{prefix}/{}", cidr.length?))
            })
            .collect();

        let description = self
            .remarks
            .first()
            .map(|remark| remark.description.join("\n"))
            .filter(|text| !text.is_empty());

        let net = NetBlock {
            cidr: (!cidrs.is_empty()).then(|| cidrs.join(", ")),
            name: self.name,
            description,
            country: self.country.clone(),
        };

        Ok(RegistryResponse {
            nets: vec![net],
            asn_cidr: None,
            asn_description: None,
            asn_country_code: self.country,
            asn_registry: Some(registry),
        })
    }
}

/// "whois.arin.net" -> "arin", "whois.ripe.net" -> "ripencc"
fn registry_from_whois_server(server: &str) -> Option<String> {
    let server = server.trim().to_ascii_lowercase();
    let label = server.trim_start_matches("whois.").split('.').next()?;
    match label {
        "" => None,
        "ripe" => Some("ripencc".to_string()),
        label => Some(label.to_string()),
    }
}

/// Registry client querying an RDAP bootstrap service over HTTPS
///
/// The bootstrap service redirects to the authoritative RIR; only the IP
/// network object is read, no entity or referral is followed.
pub struct RdapClient {
    client: Client,
    base_url: String,
}

impl RdapClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RirmapError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| RirmapError::HttpClientInit { source })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RegistryClient for RdapClient {
    async fn lookup(&self, address: IpAddr) -> Result<RegistryResponse, LookupError> {
        let url = format!("{}/ip/{address}", self.base_url);
        let classify = |err: reqwest::Error| {
            if err.is_timeout() {
                LookupError::Timeout {
                    address: address.to_string(),
                }
            } else if err.is_decode() {
                LookupError::Protocol {
                    address: address.to_string(),
                    reason: err.to_string(),
                }
            } else {
                LookupError::Http {
                    address: address.to_string(),
                    reason: err.to_string(),
                }
            }
        };

        let network: IpNetworkObject = self
            .client
            .get(&url)
            .header(ACCEPT, RDAP_MEDIA_TYPE)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(classify)?
            .json()
            .await
            .map_err(classify)?;

        network.into_response(address)
    }
}
