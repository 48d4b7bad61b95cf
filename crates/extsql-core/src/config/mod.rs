//! Module: config
//! Responsibility: the per-table source configuration supplied by the host as
//! a JSON property, and its masked display form.
//! Does not own: plugin selection or driver-specific connection defaults.


use crate::scan::ConnectOptions;
use serde::Deserialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Property holding the JSON source configuration.
pub const PARAMETERS_KEY: &str = "parameters";

/// Property naming the data source implementation directly.
pub const PLUGIN_CLASS_KEY: &str = "plugin_class";

/// Plugin name as forwarded by the host adaptor.
pub const HOST_PLUGIN_NAME_KEY: &str = "ob.plugin_name";

/// Plugin name as written by the user.
pub const PLUGIN_NAME_KEY: &str = "plugin_name";

/// Configuration keys whose values never appear in display output.
pub const SENSITIVE_KEYS: &[&str] = &["password"];

pub const MASK_TOKEN: &str = "****";

/// Host-supplied string properties for one external table.
pub type Properties = BTreeMap<String, String>;

///
/// ConfigError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("property '{key}' is missing")]
    MissingProperty { key: &'static str },

    #[error("failed to parse source parameters: {message}")]
    Parse { message: String },

    #[error("source parameter '{field}' is required")]
    MissingField { field: &'static str },
}

impl ConfigError {
    #[must_use]
    pub const fn kind(&self) -> ConfigErrorKind {
        match self {
            Self::MissingProperty { .. } => ConfigErrorKind::MissingProperty,
            Self::Parse { .. } => ConfigErrorKind::Parse,
            Self::MissingField { .. } => ConfigErrorKind::MissingField,
        }
    }
}

///
/// ConfigErrorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigErrorKind {
    MissingProperty,
    Parse,
    MissingField,
}

impl ConfigErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingProperty => "missing_property",
            Self::Parse => "parse",
            Self::MissingField => "missing_field",
        }
    }
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Wire form; unknown keys are ignored and required keys checked afterwards.
#[derive(Deserialize)]
struct RawSourceConfig {
    jdbc_url: Option<String>,
    user: Option<String>,
    password: Option<String>,
    table: Option<String>,
}

///
/// SourceConfig
///
/// Connection and table settings of one external table.
///

#[derive(Clone, Eq, PartialEq)]
pub struct SourceConfig {
    pub jdbc_url: String,
    pub user: String,
    pub password: Option<String>,
    pub table: String,
}

impl SourceConfig {
    /// Parse the JSON parameters document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw: RawSourceConfig =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse {
                message: err.to_string(),
            })?;

        Self::try_from(raw)
    }

    /// Read the configuration from the host's property map.
    pub fn from_properties(properties: &Properties) -> Result<Self, ConfigError> {
        let text = properties
            .get(PARAMETERS_KEY)
            .ok_or(ConfigError::MissingProperty {
                key: PARAMETERS_KEY,
            })?;

        Self::from_json(text)
    }

    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// JSON rendering with every sensitive value replaced by the mask token.
    ///
    /// Sensitive keys are masked even when unset.
    #[must_use]
    pub fn display_string(&self) -> String {
        let doc: JsonMap<String, JsonValue> = self
            .entries()
            .into_iter()
            .map(|(key, value)| {
                let shown = if is_sensitive(key) {
                    JsonValue::from(MASK_TOKEN)
                } else {
                    value.map_or(JsonValue::Null, JsonValue::from)
                };
                (key.to_string(), shown)
            })
            .collect();

        JsonValue::Object(doc).to_string()
    }

    // Every configured field, keyed by its JSON name.
    fn entries(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("jdbc_url", Some(self.jdbc_url.as_str())),
            ("user", Some(self.user.as_str())),
            ("password", self.password.as_deref()),
            ("table", Some(self.table.as_str())),
        ]
    }

    /// Driver options carrying the URL and credentials.
    #[must_use]
    pub fn connect_options(&self) -> ConnectOptions {
        let options = ConnectOptions::new(self.jdbc_url.clone()).with_property("user", &self.user);

        match &self.password {
            Some(password) => options.with_property("password", password),
            None => options,
        }
    }
}

/// Whether `key` names a value that must never be displayed.
#[must_use]
pub fn is_sensitive(key: &str) -> bool {
    SENSITIVE_KEYS.contains(&key)
}

impl TryFrom<RawSourceConfig> for SourceConfig {
    type Error = ConfigError;

    fn try_from(raw: RawSourceConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            jdbc_url: raw
                .jdbc_url
                .ok_or(ConfigError::MissingField { field: "jdbc_url" })?,
            user: raw.user.ok_or(ConfigError::MissingField { field: "user" })?,
            password: raw.password,
            table: raw.table.ok_or(ConfigError::MissingField { field: "table" })?,
        })
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("SourceConfig");
        for (key, value) in self.entries() {
            if is_sensitive(key) {
                out.field(key, &MASK_TOKEN);
            } else {
                out.field(key, &value.unwrap_or_default());
            }
        }

        out.finish()
    }
}

impl fmt::Display for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}
