use crate::geo::{
    AsnDatabase, CityDatabase, IspDatabase, LookupError, RawAsnFacts, RawCityFacts, RawIspFacts,
};

use maxminddb::{geoip2, MaxMindDBError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

const PREFERRED_LOCALE: &str = "en";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DatabaseKind {
    City,
    Asn,
    Isp,
}

impl DatabaseKind {
    /// Whether `database_type` from the file metadata looks like this kind,
    /// e.g. "GeoLite2-City", "DBIP-ASN-Lite" or "GeoIP2-ISP"
    pub fn matches(self, database_type: &str) -> bool {
        let database_type = database_type.to_ascii_lowercase();
        let needle = match self {
            Self::City => "city",
            Self::Asn => "asn",
            Self::Isp => "isp",
        };
        database_type.contains(needle)
    }
}

impl From<DatabaseKind> for &'static str {
    fn from(kind: DatabaseKind) -> Self {
        match kind {
            DatabaseKind::City => "city",
            DatabaseKind::Asn => "asn",
            DatabaseKind::Isp => "isp",
        }
    }
}

pub struct MaxMindDb {
    maxminddb_reader: maxminddb::Reader<Vec<u8>>,
}

impl MaxMindDb {
    pub fn from_file<P: AsRef<Path>>(filepath: P) -> Result<Self, LookupError> {
        let path = filepath.as_ref();
        let maxminddb_reader =
            maxminddb::Reader::open_readfile(path).map_err(|error| LookupError::DatabaseOpen {
                path: path.to_owned(),
                error: Box::new(error.into()),
            })?;
        Ok(Self { maxminddb_reader })
    }

    /// Opens the file and warns if its metadata says it is not the expected kind of database
    pub fn open<P: AsRef<Path>>(filepath: P, kind: DatabaseKind) -> Result<Self, LookupError> {
        let path = filepath.as_ref();
        let db = Self::from_file(path)?;
        let database_type = db.database_type();
        let kind_str: &'static str = kind.into();
        if kind.matches(database_type) {
            log::info!(r#"Loaded {kind_str} database "{database_type}" from "{}""#, path.display());
        } else {
            log::warn!(
                r#"Database "{}" is configured as {kind_str} database but has type "{database_type}""#,
                path.display()
            );
        }
        Ok(db)
    }

    pub fn database_type(&self) -> &str {
        &self.maxminddb_reader.metadata.database_type
    }

    fn lookup<'de, T>(&'de self, address: IpAddr) -> Result<Option<T>, LookupError>
    where
        T: Deserialize<'de>,
    {
        match self.maxminddb_reader.lookup(address) {
            Ok(record) => Ok(Some(record)),
            Err(MaxMindDBError::AddressNotFoundError(_)) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }
}

fn localized_name(names: Option<&BTreeMap<&str, &str>>) -> Option<String> {
    let names = names?;
    names
        .get(PREFERRED_LOCALE)
        .or_else(|| names.values().next())
        .map(|name| (*name).to_owned())
}

impl CityDatabase for MaxMindDb {
    fn lookup_city(&self, address: IpAddr) -> Result<Option<RawCityFacts>, LookupError> {
        let city: geoip2::City = match self.lookup(address)? {
            Some(city) => city,
            None => return Ok(None),
        };
        // The first subdivision is the most general one, e.g. state rather than county
        let subdivision = city
            .subdivisions
            .as_ref()
            .and_then(|subdivisions| subdivisions.first());
        let location = city.location.as_ref();
        Ok(Some(RawCityFacts {
            continent_code: city
                .continent
                .as_ref()
                .and_then(|continent| continent.code)
                .map(str::to_owned),
            country_iso_code: city
                .country
                .as_ref()
                .and_then(|country| country.iso_code)
                .map(str::to_owned),
            subdivision_name: subdivision
                .and_then(|subdivision| localized_name(subdivision.names.as_ref())),
            subdivision_iso_code: subdivision
                .and_then(|subdivision| subdivision.iso_code)
                .map(str::to_owned),
            city_name: city
                .city
                .as_ref()
                .and_then(|city| localized_name(city.names.as_ref())),
            postal_code: city
                .postal
                .as_ref()
                .and_then(|postal| postal.code)
                .map(str::to_owned),
            latitude: location.and_then(|location| location.latitude),
            longitude: location.and_then(|location| location.longitude),
            time_zone: location
                .and_then(|location| location.time_zone)
                .map(str::to_owned),
        }))
    }
}

impl AsnDatabase for MaxMindDb {
    fn lookup_asn(&self, address: IpAddr) -> Result<Option<RawAsnFacts>, LookupError> {
        let asn: Option<geoip2::Asn> = self.lookup(address)?;
        Ok(asn.map(|asn| RawAsnFacts {
            autonomous_system_number: asn.autonomous_system_number,
            autonomous_system_organization: asn.autonomous_system_organization.map(str::to_owned),
        }))
    }
}

impl IspDatabase for MaxMindDb {
    fn lookup_isp(&self, address: IpAddr) -> Result<Option<RawIspFacts>, LookupError> {
        let isp: Option<geoip2::Isp> = self.lookup(address)?;
        Ok(isp.map(|isp| RawIspFacts {
            autonomous_system_number: isp.autonomous_system_number,
            autonomous_system_organization: isp.autonomous_system_organization.map(str::to_owned),
            isp: isp.isp.map(str::to_owned),
            organization: isp.organization.map(str::to_owned),
        }))
    }
}
