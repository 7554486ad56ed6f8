#[cfg(feature = "maxminddb")]
use maxminddb::MaxMindDBError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[cfg(feature = "maxminddb")]
    #[error(transparent)]
    MaxMindDBError(#[from] MaxMindDBError),
    #[error(r#"Error while attempting to open database "{path}": {error}"#)]
    DatabaseOpen { path: PathBuf, error: Box<LookupError> },
    #[error("{0}")]
    Database(String),
}
