use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use super::record::ResolvedRecord;

pub const PRIVATE_DESCRIPTION: &str = "Private (RFC 1918 or APIPA) range";
pub const LOOPBACK_DESCRIPTION: &str = "Loopback range";
pub const MULTICAST_DESCRIPTION: &str = "Multicast range";
pub const RESERVED_DESCRIPTION: &str = "Reserved IP range";
pub const INVALID_DESCRIPTION: &str = "Invalid IP Address";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Publicly routable host part, needs cache or registry lookup
    Routable(IpAddr),
    /// Fixed record, no lookup required
    WellKnown(ResolvedRecord),
}

/// Classify an address or CIDR token against well-known ranges
///
/// Only the host part (everything before the first `/`) is inspected. The
/// categories are checked in a fixed order and the first match wins:
/// invalid, private, loopback, multicast, reserved.
///
/// # Examples
/// ```
/// use rirmap::net::classify::{Classification, classify};
///
/// assert!(matches!(classify("8.8.8.8"), Classification::Routable(_)));
/// assert!(matches!(classify("10.0.0.0/8"), Classification::WellKnown(_)));
/// ```
pub fn classify(token: &str) -> Classification {
    let host = token.split('/').next().unwrap_or_default();

    let Ok(ip) = host.parse::<IpAddr>() else {
        return well_known(token, INVALID_DESCRIPTION);
    };

    if is_private(ip) {
        return well_known(token, PRIVATE_DESCRIPTION);
    }
    if ip.is_loopback() {
        return well_known(token, LOOPBACK_DESCRIPTION);
    }
    if ip.is_multicast() {
        return well_known(token, MULTICAST_DESCRIPTION);
    }
    if ip.is_unspecified() || is_reserved(ip) {
        return well_known(token, RESERVED_DESCRIPTION);
    }

    Classification::Routable(ip)
}

fn well_known(token: &str, description: &str) -> Classification {
    Classification::WellKnown(ResolvedRecord::well_known(token, description))
}

fn is_private(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_link_local(),
        IpAddr::V6(v6) => v6.is_unique_local() || v6.is_unicast_link_local(),
    }
}

fn is_reserved(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_reserved_v4(v4),
        IpAddr::V6(v6) => is_reserved_v6(v6),
    }
}

// 0.0.0.0/8 and 240.0.0.0/4 (which covers the limited broadcast address)
fn is_reserved_v4(ip: Ipv4Addr) -> bool {
    let first = ip.octets()[0];
    first == 0 || first >= 240
}

// ::/8, loopback is matched earlier
fn is_reserved_v6(ip: Ipv6Addr) -> bool {
    ip.segments()[0] & 0xff00 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn description_of(token: &str) -> Option<String> {
        match classify(token) {
            Classification::WellKnown(record) => Some(record.description),
            Classification::Routable(_) => None,
        }
    }

    #[rstest]
    #[case("10.1.2.3", "RFC 1918 class A")]
    #[case("172.16.0.1", "RFC 1918 class B")]
    #[case("172.31.255.254", "RFC 1918 class B upper edge")]
    #[case("192.168.1.1/24", "RFC 1918 class C subnet")]
    #[case("169.254.10.10", "APIPA")]
    #[case("fd00::1", "IPv6 unique local")]
    #[case("fe80::1", "IPv6 link local")]
    fn test_private_ranges(#[case] token: &str, #[case] _description: &str) {
        assert_eq!(description_of(token).as_deref(), Some(PRIVATE_DESCRIPTION));
    }

    #[rstest]
    #[case("127.0.0.1", "IPv4 loopback")]
    #[case("127.255.0.1/16", "IPv4 loopback subnet")]
    #[case("::1", "IPv6 loopback")]
    fn test_loopback(#[case] token: &str, #[case] _description: &str) {
        assert_eq!(description_of(token).as_deref(), Some(LOOPBACK_DESCRIPTION));
    }

    #[rstest]
    #[case("224.0.0.1", "all hosts")]
    #[case("239.255.255.250", "SSDP")]
    #[case("ff02::1", "IPv6 multicast")]
    fn test_multicast(#[case] token: &str, #[case] _description: &str) {
        assert_eq!(description_of(token).as_deref(), Some(MULTICAST_DESCRIPTION));
    }

    #[rstest]
    #[case("0.0.0.0", "IPv4 unspecified")]
    #[case("0.1.2.3", "this network")]
    #[case("240.0.0.1", "class E")]
    #[case("255.255.255.255", "broadcast")]
    #[case("::", "IPv6 unspecified")]
    fn test_reserved(#[case] token: &str, #[case] _description: &str) {
        assert_eq!(description_of(token).as_deref(), Some(RESERVED_DESCRIPTION));
    }

    #[rstest]
    #[case("", "empty")]
    #[case("not-an-ip", "text")]
    #[case("999.1.1.1", "octet out of range")]
    #[case("1.2.3", "too few octets")]
    #[case("/24", "prefix only")]
    fn test_invalid(#[case] token: &str, #[case] _description: &str) {
        assert_eq!(description_of(token).as_deref(), Some(INVALID_DESCRIPTION));
    }

    #[rstest]
    #[case("8.8.8.8", "8.8.8.8")]
    #[case("203.0.113.5", "203.0.113.5")]
    #[case("198.51.100.0/24", "198.51.100.0")]
    #[case("2001:4860::8888", "2001:4860::8888")]
    fn test_routable_returns_host(#[case] token: &str, #[case] host: &str) {
        assert_eq!(
            classify(token),
            Classification::Routable(host.parse().unwrap())
        );
    }

    #[test]
    fn test_well_known_record_keeps_original_token() {
        match classify("192.168.0.0/16") {
            Classification::WellKnown(record) => {
                assert_eq!(record.address, "192.168.0.0/16");
                assert!(record.cidr.is_empty());
                assert!(record.registry.is_empty());
            }
            other => panic!("Expected WellKnown, got {other:?}"),
        }
    }
}
