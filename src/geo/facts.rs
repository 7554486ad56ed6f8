//! Unmerged per-database responses.
//!
//! Every field is optional on its own: databases are free to leave out any record part.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCityFacts {
    pub continent_code: Option<String>,
    pub country_iso_code: Option<String>,
    pub subdivision_name: Option<String>,
    pub subdivision_iso_code: Option<String>,
    pub city_name: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawIspFacts {
    pub autonomous_system_number: Option<u32>,
    pub autonomous_system_organization: Option<String>,
    pub isp: Option<String>,
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAsnFacts {
    pub autonomous_system_number: Option<u32>,
    pub autonomous_system_organization: Option<String>,
}
