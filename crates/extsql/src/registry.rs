//! Static plugin registry.
//!
//! Plugins are looked up by exact short name. Unknown or missing names fail
//! with the full list of valid names.

use crate::{
    Error,
    source::{DataSource, jdbc, mysql},
};
use extsql_core::config::{HOST_PLUGIN_NAME_KEY, PLUGIN_CLASS_KEY, PLUGIN_NAME_KEY, Properties};
use std::fmt;
use thiserror::Error as ThisError;
use tracing::debug;

/// Builds a data source from the host's table properties.
pub type Constructor = fn(&Properties) -> Result<DataSource, Error>;

const REGISTRY: &[(&str, Constructor)] = &[("jdbc", jdbc::create), ("mysql", mysql::create)];

// Property keys consulted for the plugin name, in priority order.
const LOOKUP_KEYS: [&str; 3] = [PLUGIN_CLASS_KEY, HOST_PLUGIN_NAME_KEY, PLUGIN_NAME_KEY];

///
/// RegistryError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RegistryError {
    #[error(
        "no plugin specified; set '{}' or a plugin name, one of: {}",
        PLUGIN_CLASS_KEY,
        .valid.join(", ")
    )]
    Unspecified { valid: Vec<&'static str> },

    #[error("unknown plugin '{name}', expected one of: {}", .valid.join(", "))]
    Unknown {
        name: String,
        valid: Vec<&'static str>,
    },
}

impl RegistryError {
    #[must_use]
    pub const fn kind(&self) -> RegistryErrorKind {
        match self {
            Self::Unspecified { .. } => RegistryErrorKind::Unspecified,
            Self::Unknown { .. } => RegistryErrorKind::Unknown,
        }
    }
}

///
/// RegistryErrorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegistryErrorKind {
    Unspecified,
    Unknown,
}

impl RegistryErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RegistryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered plugin names, in registry order.
#[must_use]
pub fn plugin_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|(name, _)| *name).collect()
}

/// Constructor registered under exactly `name`.
pub fn lookup(name: &str) -> Result<Constructor, RegistryError> {
    REGISTRY
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, constructor)| *constructor)
        .ok_or_else(|| RegistryError::Unknown {
            name: name.to_string(),
            valid: plugin_names(),
        })
}

/// Pick the plugin named by `properties` and build its data source.
pub fn create_data_source(properties: &Properties) -> Result<DataSource, Error> {
    let name = LOOKUP_KEYS
        .iter()
        .find_map(|key| properties.get(*key))
        .ok_or_else(|| RegistryError::Unspecified {
            valid: plugin_names(),
        })?;
    debug!(plugin = %name, "resolving data source plugin");

    let constructor = lookup(name)?;

    constructor(properties)
}
