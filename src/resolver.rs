use crate::entry::{Coordinate, GeoEntry};
use crate::geo::{RawAsnFacts, RawCityFacts, RawIspFacts};

/// Merges per-database facts into a single entry.
///
/// `None` input means the database is not configured or has no record for the address, it
/// contributes nothing. A present but empty record still produces an entry, so the result is
/// `None` only if all three inputs are `None`.
///
/// Geographic fields come from the city database only, `isp` and `organization` from the ISP
/// database only. The autonomous system pair is taken as a whole from the ISP record whenever
/// there is one, even an empty one. The ASN database is only used without an ISP record.
pub fn resolve(
    ip_address: &str,
    city: Option<RawCityFacts>,
    isp: Option<RawIspFacts>,
    asn: Option<RawAsnFacts>,
) -> Option<GeoEntry> {
    if city.is_none() && isp.is_none() && asn.is_none() {
        return None;
    }

    let mut entry = GeoEntry {
        ip_address: Some(ip_address.to_owned()),
        ..Default::default()
    };

    if let Some(city) = city {
        entry.continent = city.continent_code;
        entry.country = city.country_iso_code;
        entry.state_province = city.subdivision_name;
        entry.state_province_code = city.subdivision_iso_code;
        entry.city = city.city_name;
        entry.postal_code = city.postal_code;
        entry.latitude = city.latitude.and_then(Coordinate::new);
        entry.longitude = city.longitude.and_then(Coordinate::new);
        entry.timezone = city.time_zone;
    }

    let asn = match isp {
        Some(isp) => {
            entry.isp = isp.isp;
            entry.organization = isp.organization;
            Some(RawAsnFacts {
                autonomous_system_number: isp.autonomous_system_number,
                autonomous_system_organization: isp.autonomous_system_organization,
            })
        }
        None => asn,
    };
    if let Some(asn) = asn {
        entry.asn = asn.autonomous_system_number;
        entry.asn_organization = asn.autonomous_system_organization;
    }

    Some(entry)
}
