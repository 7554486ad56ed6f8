#[cfg(not(feature = "maxminddb"))]
compile_error!("maxminddb feature must be enabled, it is the only supported database format");

pub mod address;
pub mod config;
pub mod entry;
pub mod geo;
pub mod header_tools;
pub mod lookup;
pub mod resolver;
pub mod service;
