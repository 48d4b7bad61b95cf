use crate::{
    Error,
    source::{DataSource, Plugin},
};
use extsql_core::{config::Properties, sql::Dialect};

/// Session settings every MySQL connection gets unless the URL overrides them.
///
/// Times travel in UTC, zero dates round instead of failing, and `TINYINT(1)`
/// stays an integer.
pub const CONNECT_DEFAULTS: &[(&str, &str)] = &[
    ("connectionTimeZone", "UTC"),
    ("forceConnectionTimeZoneToSession", "true"),
    ("zeroDateTimeBehavior", "round"),
    ("tinyInt1isBit", "false"),
    ("characterEncoding", "UTF-8"),
];

pub const PLUGIN: Plugin = Plugin {
    name: "mysql",
    dialect: Dialect::MYSQL,
    connect_defaults: CONNECT_DEFAULTS,
};

pub fn create(properties: &Properties) -> Result<DataSource, Error> {
    DataSource::from_properties(PLUGIN, properties)
}
