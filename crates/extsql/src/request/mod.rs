//! Host scan parameters.
//!
//! The host describes each scan as a JSON object:
//! `{"table": .., "columns": [..], "filters": [..], "question_mark_values": [..]}`.
//! Every key is optional.


use extsql_core::{scan::ScanRequest, value::Value};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::fmt;
use thiserror::Error as ThisError;

///
/// RequestError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RequestError {
    #[error("failed to parse scan parameters: {message}")]
    Parse { message: String },

    #[error("question mark value {index} is not a scalar or list")]
    UnsupportedValue { index: usize },
}

impl RequestError {
    #[must_use]
    pub const fn kind(&self) -> RequestErrorKind {
        match self {
            Self::Parse { .. } => RequestErrorKind::Parse,
            Self::UnsupportedValue { .. } => RequestErrorKind::UnsupportedValue,
        }
    }
}

///
/// RequestErrorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RequestErrorKind {
    Parse,
    UnsupportedValue,
}

impl RequestErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::UnsupportedValue => "unsupported_value",
        }
    }
}

impl fmt::Display for RequestErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize)]
struct RawScanParameters {
    #[serde(default)]
    table: String,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    filters: Vec<String>,
    #[serde(default)]
    question_mark_values: Vec<JsonValue>,
}

/// Parse the host's scan parameter document.
pub fn scan_request_from_json(text: &str) -> Result<ScanRequest, RequestError> {
    let raw: RawScanParameters = serde_json::from_str(text).map_err(|err| RequestError::Parse {
        message: err.to_string(),
    })?;

    let params = raw
        .question_mark_values
        .into_iter()
        .enumerate()
        .map(|(index, json)| {
            value_from_json(json).ok_or(RequestError::UnsupportedValue { index })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ScanRequest::new(raw.table)
        .with_columns(raw.columns)
        .with_filters(raw.filters)
        .with_params(params))
}

fn value_from_json(json: JsonValue) -> Option<Value> {
    let value = match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(v) => Value::Bool(v),
        JsonValue::Number(n) => {
            if let Some(v) = n.as_i64() {
                Value::Int(v)
            } else if let Some(v) = n.as_u64() {
                Value::Uint(v)
            } else {
                Value::Float64(n.as_f64()?)
            }
        }
        JsonValue::String(v) => Value::Text(v),
        JsonValue::Array(items) => Value::List(
            items
                .into_iter()
                .map(value_from_json)
                .collect::<Option<Vec<_>>>()?,
        ),
        JsonValue::Object(_) => return None,
    };

    Some(value)
}
