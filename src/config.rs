use crate::geo::DatabasesConfig;
use crate::header_tools::X_GEOIP_ADDRESS;

use hyper::header::HeaderMap;
use serde::Deserialize;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::Path;
use thiserror::Error;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "Config::default_host")]
    pub host: SocketAddr,
    #[serde(default = "Config::default_log_level")]
    pub log_level: log::Level,
    #[serde(default)]
    pub threads: ConfigThreads,
    /// Request header to take the address from on `GET /`
    #[serde(default = "Config::default_address_header")]
    pub address_header: String,
    /// Added to every response
    #[serde(default, with = "http_serde::header_map")]
    pub response_headers: HeaderMap,
    pub databases: DatabasesConfig,
}

impl Config {
    fn default_host() -> SocketAddr {
        ([127, 0, 0, 1], 8080).into()
    }

    fn default_log_level() -> log::Level {
        log::Level::Info
    }

    fn default_address_header() -> String {
        X_GEOIP_ADDRESS.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ConfigThreadsDe")]
pub enum ConfigThreads {
    /// As many worker threads as CPU cores
    Cores,
    Custom(NonZeroUsize),
}

impl Default for ConfigThreads {
    fn default() -> Self {
        Self::Cores
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigThreadsDe {
    Number(NonZeroUsize),
    Keyword(String),
}

#[derive(Debug, Error)]
#[error(r#"threads must be a positive integer or "cores", not {0:?}"#)]
pub struct ConfigThreadsError(String);

impl TryFrom<ConfigThreadsDe> for ConfigThreads {
    type Error = ConfigThreadsError;

    fn try_from(value: ConfigThreadsDe) -> Result<Self, Self::Error> {
        match value {
            ConfigThreadsDe::Number(threads) => Ok(Self::Custom(threads)),
            ConfigThreadsDe::Keyword(s) if s.trim().eq_ignore_ascii_case("cores") => {
                Ok(Self::Cores)
            }
            ConfigThreadsDe::Keyword(s) => Err(ConfigThreadsError(s)),
        }
    }
}

pub fn parse_config<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let toml_string = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&toml_string)?;
    Ok(config)
}
