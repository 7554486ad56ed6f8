pub use error::LookupError;
pub use facts::{RawAsnFacts, RawCityFacts, RawIspFacts};

mod error;
mod facts;
#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(feature = "maxminddb")]
pub mod max_mind_db;

use serde::Deserialize;
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// `Ok(None)` means the address is not in the database, which is not an error
pub trait CityDatabase: Send + Sync {
    fn lookup_city(&self, address: IpAddr) -> Result<Option<RawCityFacts>, LookupError>;
}

pub trait AsnDatabase: Send + Sync {
    fn lookup_asn(&self, address: IpAddr) -> Result<Option<RawAsnFacts>, LookupError>;
}

pub trait IspDatabase: Send + Sync {
    fn lookup_isp(&self, address: IpAddr) -> Result<Option<RawIspFacts>, LookupError>;
}

/// Zero to three database handles, fixed at construction time.
#[derive(Clone, Default)]
pub struct GeoDatabases {
    pub city: Option<Arc<dyn CityDatabase>>,
    pub asn: Option<Arc<dyn AsnDatabase>>,
    pub isp: Option<Arc<dyn IspDatabase>>,
}

impl GeoDatabases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, database: impl CityDatabase + 'static) -> Self {
        self.city = Some(Arc::new(database));
        self
    }

    pub fn with_asn(mut self, database: impl AsnDatabase + 'static) -> Self {
        self.asn = Some(Arc::new(database));
        self
    }

    pub fn with_isp(mut self, database: impl IspDatabase + 'static) -> Self {
        self.isp = Some(Arc::new(database));
        self
    }
}

impl fmt::Debug for GeoDatabases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoDatabases")
            .field("city", &self.city.is_some())
            .field("asn", &self.asn.is_some())
            .field("isp", &self.isp.is_some())
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabasesConfig {
    #[serde(default)]
    pub city: Option<PathBuf>,
    #[serde(default)]
    pub asn: Option<PathBuf>,
    #[serde(default)]
    pub isp: Option<PathBuf>,
}

impl DatabasesConfig {
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.asn.is_none() && self.isp.is_none()
    }

    #[cfg(feature = "maxminddb")]
    pub fn load(&self) -> Result<GeoDatabases, LookupError> {
        use max_mind_db::{DatabaseKind, MaxMindDb};

        let mut databases = GeoDatabases::new();
        if let Some(path) = &self.city {
            databases = databases.with_city(MaxMindDb::open(path, DatabaseKind::City)?);
        }
        if let Some(path) = &self.asn {
            databases = databases.with_asn(MaxMindDb::open(path, DatabaseKind::Asn)?);
        }
        if let Some(path) = &self.isp {
            databases = databases.with_isp(MaxMindDb::open(path, DatabaseKind::Isp)?);
        }
        Ok(databases)
    }
}
