use crate::entry::GeoEntry;

use hyper::header::{HeaderMap, HeaderName, HeaderValue};

pub const X_GEOIP_ADDRESS: &str = "x-geoip-address";

pub const X_GEOIP_IP_ADDRESS: HeaderName = HeaderName::from_static("x-geoip-ip-address");
pub const X_GEOIP_CONTINENT: HeaderName = HeaderName::from_static("x-geoip-continent");
pub const X_GEOIP_COUNTRY: HeaderName = HeaderName::from_static("x-geoip-country");
pub const X_GEOIP_STATEPROV: HeaderName = HeaderName::from_static("x-geoip-stateprov");
pub const X_GEOIP_STATEPROV_CODE: HeaderName = HeaderName::from_static("x-geoip-stateprov-code");
pub const X_GEOIP_CITY: HeaderName = HeaderName::from_static("x-geoip-city");
pub const X_GEOIP_POSTAL_CODE: HeaderName = HeaderName::from_static("x-geoip-postal-code");
pub const X_GEOIP_LATITUDE: HeaderName = HeaderName::from_static("x-geoip-latitude");
pub const X_GEOIP_LONGITUDE: HeaderName = HeaderName::from_static("x-geoip-longitude");
pub const X_GEOIP_TIMEZONE: HeaderName = HeaderName::from_static("x-geoip-timezone");
pub const X_GEOIP_ISP: HeaderName = HeaderName::from_static("x-geoip-isp");
pub const X_GEOIP_ORGANIZATION: HeaderName = HeaderName::from_static("x-geoip-organization");
pub const X_GEOIP_ASN: HeaderName = HeaderName::from_static("x-geoip-asn");
pub const X_GEOIP_ASN_ORGANIZATION: HeaderName =
    HeaderName::from_static("x-geoip-asn-organization");

/// First value of the first header, `None` if missing, blank or not a string
pub fn address_header<'a>(headers: &'a HeaderMap, header_name: &HeaderName) -> Option<&'a str> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// One header per field which is set
pub fn entry_headers(entry: &GeoEntry) -> HeaderMap {
    let GeoEntry {
        ip_address,
        continent,
        country,
        state_province,
        state_province_code,
        city,
        postal_code,
        latitude,
        longitude,
        timezone,
        isp,
        organization,
        asn,
        asn_organization,
    } = entry;

    let fields = [
        (X_GEOIP_IP_ADDRESS, ip_address.clone()),
        (X_GEOIP_CONTINENT, continent.clone()),
        (X_GEOIP_COUNTRY, country.clone()),
        (X_GEOIP_STATEPROV, state_province.clone()),
        (X_GEOIP_STATEPROV_CODE, state_province_code.clone()),
        (X_GEOIP_CITY, city.clone()),
        (X_GEOIP_POSTAL_CODE, postal_code.clone()),
        (X_GEOIP_LATITUDE, latitude.map(|c| c.to_string())),
        (X_GEOIP_LONGITUDE, longitude.map(|c| c.to_string())),
        (X_GEOIP_TIMEZONE, timezone.clone()),
        (X_GEOIP_ISP, isp.clone()),
        (X_GEOIP_ORGANIZATION, organization.clone()),
        (X_GEOIP_ASN, asn.map(|asn| asn.to_string())),
        (X_GEOIP_ASN_ORGANIZATION, asn_organization.clone()),
    ];

    let mut headers = HeaderMap::with_capacity(fields.len());
    for (name, value) in fields {
        let value = match value {
            Some(value) => value,
            None => continue,
        };
        // Non-ASCII names like "München" are sent as raw UTF-8 bytes
        match HeaderValue::from_bytes(value.as_bytes()) {
            Ok(value) => {
                headers.insert(name, value);
            }
            Err(_) => log::debug!("cannot put {value:?} into {name} header"),
        }
    }
    headers
}

/// `Link: </{address}>; rel="canonical"`
pub fn link_header(address: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(r#"</{address}>; rel="canonical""#)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Coordinate;

    #[test]
    fn address_header_missing() {
        let name = HeaderName::from_static(X_GEOIP_ADDRESS);
        assert_eq!(address_header(&HeaderMap::new(), &name), None);
    }

    #[test]
    fn address_header_blank() {
        let name = HeaderName::from_static(X_GEOIP_ADDRESS);
        let mut headers = HeaderMap::new();
        headers.insert(name.clone(), HeaderValue::from_static("  "));
        assert_eq!(address_header(&headers, &name), None);
    }

    #[test]
    fn address_header_first_value() {
        let name = HeaderName::from_static(X_GEOIP_ADDRESS);
        let mut headers = HeaderMap::new();
        headers.append(name.clone(), HeaderValue::from_static(" 128.174.199.60"));
        headers.append(name.clone(), HeaderValue::from_static("80.94.184.70"));
        assert_eq!(address_header(&headers, &name), Some("128.174.199.60"));
    }

    #[test]
    fn entry_headers_only_set_fields() {
        let entry = GeoEntry {
            ip_address: Some("192.168.1.1".into()),
            country: Some("DE".into()),
            latitude: Coordinate::new(53.5854),
            asn: Some(64512),
            ..Default::default()
        };
        let headers = entry_headers(&entry);
        assert_eq!(headers.len(), 4);
        assert_eq!(headers[X_GEOIP_IP_ADDRESS], "192.168.1.1");
        assert_eq!(headers[X_GEOIP_COUNTRY], "DE");
        assert_eq!(headers[X_GEOIP_LATITUDE], "53.5854");
        assert_eq!(headers[X_GEOIP_ASN], "64512");
        assert!(!headers.contains_key(X_GEOIP_CITY));
    }

    #[test]
    fn entry_headers_utf8_value() {
        let entry = GeoEntry {
            city: Some("München".into()),
            ..Default::default()
        };
        let headers = entry_headers(&entry);
        assert_eq!(headers[X_GEOIP_CITY].as_bytes(), "München".as_bytes());
    }

    #[test]
    fn link_header_ipv6() {
        assert_eq!(
            link_header("2001:db8::1").unwrap(),
            r#"</2001:db8::1>; rel="canonical""#
        );
    }
}
