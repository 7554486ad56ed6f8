use crate::address::CanonicalIpAddr;
use crate::entry::GeoEntry;
use crate::geo::{GeoDatabases, LookupError};
use crate::resolver::resolve;

use std::net::IpAddr;

/// Queries every configured database and merges the answers.
///
/// Holds no mutable state, share it between requests with an `Arc`.
#[derive(Debug, Clone)]
pub struct GeoLookup {
    databases: GeoDatabases,
}

impl GeoLookup {
    pub fn new(databases: GeoDatabases) -> Self {
        Self { databases }
    }

    /// `Ok(None)` if no database knows the address.
    ///
    /// IPv4-mapped IPv6 addresses are looked up and reported as IPv4.
    pub fn lookup(&self, address: IpAddr) -> Result<Option<GeoEntry>, LookupError> {
        let canonical = address.to_canonical_ip();
        let city = match &self.databases.city {
            Some(db) => db.lookup_city(canonical)?,
            None => None,
        };
        let isp = match &self.databases.isp {
            Some(db) => db.lookup_isp(canonical)?,
            None => None,
        };
        let asn = match &self.databases.asn {
            Some(db) => db.lookup_asn(canonical)?,
            None => None,
        };
        let entry = resolve(&canonical.to_string(), city, isp, asn);
        log::debug!(
            "{address} resolved: {}",
            if entry.is_some() { "found" } else { "not found" }
        );
        Ok(entry)
    }
}
