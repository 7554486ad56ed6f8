use std::net::{AddrParseError, IpAddr};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{input:?} is not a valid IP address: {source}")]
pub struct InvalidAddressError {
    input: String,
    source: AddrParseError,
}

impl InvalidAddressError {
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Parses an IPv4 or IPv6 literal, no host names and no zone indices
pub fn parse_address(s: &str) -> Result<IpAddr, InvalidAddressError> {
    s.trim()
        .parse::<IpAddr>()
        .map_err(|source| InvalidAddressError {
            input: s.to_owned(),
            source,
        })
}

/// Percent-decodes a URI path segment first, so `%3A%3A1` is `::1`
pub fn parse_path_address(segment: &str) -> Result<IpAddr, InvalidAddressError> {
    match urlencoding::decode(segment) {
        Ok(decoded) => parse_address(&decoded),
        Err(_) => parse_address(segment),
    }
}

/// Same as unstable-at-our-MSRV `IpAddr::to_canonical`: IPv4-mapped IPv6 addresses become IPv4.
///
/// Unlike `Ipv6Addr::to_ipv4` we leave IPv4-compatible addresses alone, so `::1` stays `::1`.
pub trait CanonicalIpAddr {
    fn to_canonical_ip(&self) -> Self;
}

impl CanonicalIpAddr for IpAddr {
    fn to_canonical_ip(&self) -> Self {
        match self {
            IpAddr::V4(v4) => IpAddr::V4(*v4),
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => IpAddr::V4(v4),
                None => IpAddr::V6(*v6),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn parse_ipv4() {
        assert_eq!(
            parse_address("192.168.1.1"),
            Ok(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)))
        );
    }

    #[test]
    fn parse_ipv6_with_whitespace() {
        assert_eq!(
            parse_address(" 2001:db8::1 "),
            Ok(IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1)))
        );
    }

    #[test]
    fn parse_rejects_host_names() {
        for input in ["doesnotparse", "example.com", "", "1.2.3", "1.2.3.256"] {
            let error = parse_address(input).unwrap_err();
            assert_eq!(error.input(), input);
            assert!(error.to_string().contains("is not a valid IP address"));
        }
    }

    #[test]
    fn parse_percent_encoded_path() {
        assert_eq!(
            parse_path_address("%3A%3A1"),
            Ok(IpAddr::V6(Ipv6Addr::LOCALHOST))
        );
        assert_eq!(
            parse_path_address("192.168.1.1"),
            Ok(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)))
        );
        let error = parse_path_address("%3A%3Azz").unwrap_err();
        assert_eq!(error.input(), "::zz");
    }

    #[test]
    fn canonical_ipv4_mapped() {
        let mapped: IpAddr = "::ffff:80.94.184.70".parse().unwrap();
        assert_eq!(
            mapped.to_canonical_ip(),
            IpAddr::V4(Ipv4Addr::new(80, 94, 184, 70))
        );
    }

    #[test]
    fn canonical_keeps_loopback_v6() {
        let loopback = IpAddr::V6(Ipv6Addr::LOCALHOST);
        assert_eq!(loopback.to_canonical_ip(), loopback);
    }
}
