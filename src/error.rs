//! Crate-level error wrapping the per-module error types.

use crate::config::ConfigError;
use crate::raw::RawError;
use crate::schema::SchemaError;
use crate::view::ViewError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid configuration (fatal at construction)
    Config(ConfigError),
    /// Malformed column schema
    Schema(SchemaError),
    /// Unresolvable column in a projection or filter
    View(ViewError),
    /// Export text could not be read
    Raw(RawError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(err) => write!(f, "{}", err),
            Error::Schema(err) => write!(f, "Schema error: {}", err),
            Error::View(err) => write!(f, "View error: {}", err),
            Error::Raw(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(err) => Some(err),
            Error::Schema(err) => Some(err),
            Error::View(err) => Some(err),
            Error::Raw(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::Schema(err)
    }
}

impl From<ViewError> for Error {
    fn from(err: ViewError) -> Self {
        Error::View(err)
    }
}

impl From<RawError> for Error {
    fn from(err: RawError) -> Self {
        Error::Raw(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
