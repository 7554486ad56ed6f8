use serde::{Serialize, Serializer};
use std::fmt;

/// Latitude or longitude, displayed with exactly four fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Coordinate(f64);

impl Coordinate {
    pub const FRACTIONAL_DIGITS: usize = 4;

    pub fn new(degrees: f64) -> Option<Self> {
        degrees.is_finite().then_some(Self(degrees))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", Self::FRACTIONAL_DIGITS, self.0)
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Merged lookup result, see [crate::resolver::resolve].
///
/// `None` means that no configured database reported the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_province_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asn: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asn_organization: Option<String>,
}

impl GeoEntry {
    /// Whether any field besides `ip_address` is set
    pub fn has_facts(&self) -> bool {
        self != &Self {
            ip_address: self.ip_address.clone(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_four_digits() {
        assert_eq!(Coordinate::new(53.5854).unwrap().to_string(), "53.5854");
        assert_eq!(Coordinate::new(10.0073).unwrap().to_string(), "10.0073");
        assert_eq!(Coordinate::new(-33.0).unwrap().to_string(), "-33.0000");
        assert_eq!(Coordinate::new(1.23456789).unwrap().to_string(), "1.2346");
    }

    #[test]
    fn coordinate_rejects_nan() {
        assert_eq!(Coordinate::new(f64::NAN), None);
        assert_eq!(Coordinate::new(f64::INFINITY), None);
    }

    #[test]
    fn serialize_skips_missing_fields() {
        let entry = GeoEntry {
            ip_address: Some("192.168.1.1".into()),
            country: Some("DE".into()),
            state_province_code: Some("HH".into()),
            latitude: Coordinate::new(53.5854),
            asn: Some(64512),
            asn_organization: Some("private use range".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ipAddress": "192.168.1.1",
                "country": "DE",
                "stateProvinceCode": "HH",
                "latitude": "53.5854",
                "asn": 64512,
                "asnOrganization": "private use range",
            })
        );
    }

    #[test]
    fn has_facts_ignores_ip_address() {
        let entry = GeoEntry {
            ip_address: Some("::1".into()),
            ..Default::default()
        };
        assert!(!entry.has_facts());
        let entry = GeoEntry {
            timezone: Some("Europe/Berlin".into()),
            ..entry
        };
        assert!(entry.has_facts());
    }
}
