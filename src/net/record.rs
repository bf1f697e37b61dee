use std::fmt;

use serde::{Deserialize, Serialize};

/// Column order used by every tabular export
pub const FIELDS: [&str; 7] = [
    "address",
    "cidr",
    "description",
    "name",
    "country",
    "registry",
    "fqdn",
];

/// Result of resolving one address or subnet
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    /// The token exactly as it was requested
    pub address: String,
    /// The registry block covering `address`
    pub cidr: String,
    pub description: String,
    pub name: String,
    pub country: String,
    pub registry: String,
    /// Reverse DNS name, only filled for single host lookups
    pub fqdn: String,
}

impl ResolvedRecord {
    /// Record for an address that never needs a registry lookup
    pub fn well_known(address: &str, description: &str) -> Self {
        Self {
            address: address.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    /// Field values in [`FIELDS`] order
    pub fn values(&self) -> [&str; 7] {
        [
            self.address.as_str(),
            self.cidr.as_str(),
            self.description.as_str(),
            self.name.as_str(),
            self.country.as_str(),
            self.registry.as_str(),
            self.fqdn.as_str(),
        ]
    }
}

impl fmt::Display for ResolvedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.address)?;
        writeln!(f, "{:>7} Name: {}", "-", self.name)?;
        writeln!(f, "{:>7} Description: {}", "-", self.description)?;
        writeln!(f, "{:>7} CIDR: {}", "-", self.cidr)?;
        writeln!(f, "{:>7} Country: {}", "-", self.country)?;
        writeln!(f, "{:>7} Registry: {}", "-", self.registry)?;
        writeln!(f, "{:>7} FQDN: {}", "-", self.fqdn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_only_sets_address_and_description() {
        let record = ResolvedRecord::well_known("10.1.1.1", "Private (RFC 1918 or APIPA) range");
        assert_eq!(record.address, "10.1.1.1");
        assert_eq!(record.description, "Private (RFC 1918 or APIPA) range");
        assert!(record.cidr.is_empty());
        assert!(record.name.is_empty());
        assert!(record.fqdn.is_empty());
    }

    #[test]
    fn display_renders_one_line_per_field() {
        let record = ResolvedRecord {
            address: "203.0.113.5".to_string(),
            cidr: "203.0.113.0/24".to_string(),
            description: "Example".to_string(),
            name: "EXAMPLE-NET".to_string(),
            country: "US".to_string(),
            registry: "ARIN".to_string(),
            fqdn: String::new(),
        };

        let text = record.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "203.0.113.5:");
        assert_eq!(lines[1], "      - Name: EXAMPLE-NET");
        assert_eq!(lines[3], "      - CIDR: 203.0.113.0/24");
        assert_eq!(lines[6], "      - FQDN: ");
    }

    #[test]
    fn values_follow_field_order() {
        let record = ResolvedRecord {
            address: "a".into(),
            cidr: "b".into(),
            description: "c".into(),
            name: "d".into(),
            country: "e".into(),
            registry: "f".into(),
            fqdn: "g".into(),
        };
        assert_eq!(record.values(), ["a", "b", "c", "d", "e", "f", "g"]);
    }
}
