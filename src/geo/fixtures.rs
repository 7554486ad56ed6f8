//! In-memory databases for tests.

use crate::geo::{
    AsnDatabase, CityDatabase, IspDatabase, LookupError, RawAsnFacts, RawCityFacts, RawIspFacts,
};

use std::net::IpAddr;

/// Answers every address with the same record, or not found if `None`
#[derive(Clone, Default)]
pub struct StaticDatabase<T>(pub Option<T>);

impl CityDatabase for StaticDatabase<RawCityFacts> {
    fn lookup_city(&self, _address: IpAddr) -> Result<Option<RawCityFacts>, LookupError> {
        Ok(self.0.clone())
    }
}

impl AsnDatabase for StaticDatabase<RawAsnFacts> {
    fn lookup_asn(&self, _address: IpAddr) -> Result<Option<RawAsnFacts>, LookupError> {
        Ok(self.0.clone())
    }
}

impl IspDatabase for StaticDatabase<RawIspFacts> {
    fn lookup_isp(&self, _address: IpAddr) -> Result<Option<RawIspFacts>, LookupError> {
        Ok(self.0.clone())
    }
}

/// Knows a single address only
pub struct SingleAddressDatabase {
    pub address: IpAddr,
    pub city: RawCityFacts,
}

impl CityDatabase for SingleAddressDatabase {
    fn lookup_city(&self, address: IpAddr) -> Result<Option<RawCityFacts>, LookupError> {
        Ok((address == self.address).then(|| self.city.clone()))
    }
}

pub struct CorruptedDatabase;

impl CityDatabase for CorruptedDatabase {
    fn lookup_city(&self, _address: IpAddr) -> Result<Option<RawCityFacts>, LookupError> {
        Err(LookupError::Database("corrupted search tree".into()))
    }
}

impl AsnDatabase for CorruptedDatabase {
    fn lookup_asn(&self, _address: IpAddr) -> Result<Option<RawAsnFacts>, LookupError> {
        Err(LookupError::Database("corrupted search tree".into()))
    }
}

pub fn hamburg() -> RawCityFacts {
    RawCityFacts {
        continent_code: Some("EU".into()),
        country_iso_code: Some("DE".into()),
        subdivision_name: Some("Hamburg".into()),
        subdivision_iso_code: Some("HH".into()),
        city_name: Some("Hamburg".into()),
        postal_code: Some("22301".into()),
        latitude: Some(53.5854),
        longitude: Some(10.0073),
        time_zone: Some("Europe/Berlin".into()),
    }
}

pub fn local_isp() -> RawIspFacts {
    RawIspFacts {
        autonomous_system_number: Some(64512),
        autonomous_system_organization: Some("private use range".into()),
        isp: Some("local network".into()),
        organization: Some("foobar".into()),
    }
}

pub fn private_asn() -> RawAsnFacts {
    RawAsnFacts {
        autonomous_system_number: Some(64513),
        autonomous_system_organization: Some("private use range".into()),
    }
}
