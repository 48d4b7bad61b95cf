use crate::{
    Error,
    source::{DataSource, Plugin},
};
use extsql_core::{config::Properties, sql::Dialect};

/// Generic source: unquoted identifiers, no connection defaults.
pub const PLUGIN: Plugin = Plugin {
    name: "jdbc",
    dialect: Dialect::GENERIC,
    connect_defaults: &[],
};

pub fn create(properties: &Properties) -> Result<DataSource, Error> {
    DataSource::from_properties(PLUGIN, properties)
}
