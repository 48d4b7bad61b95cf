mod decimal;


use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

// re-exports
pub use decimal::Decimal;

///
/// Value
///
/// Dynamically typed scalar carried by constant and placeholder nodes and by
/// rows fetched from a remote cursor.
///
/// Null  → SQL NULL.
/// List  → only appears in driver rows for array columns; never a literal.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Binary(Vec<u8>),
    Bool(bool),
    Date(NaiveDate),
    Decimal(Decimal),
    Float32(f32),
    Float64(f64),
    Int(i64),
    List(Vec<Self>),
    Null,
    Text(String),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Uint(u64),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Stable human-readable value kind label for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Binary(_) => ValueKind::Binary,
            Self::Bool(_) => ValueKind::Bool,
            Self::Date(_) => ValueKind::Date,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::Float32(_) => ValueKind::Float32,
            Self::Float64(_) => ValueKind::Float64,
            Self::Int(_) => ValueKind::Int,
            Self::List(_) => ValueKind::List,
            Self::Null => ValueKind::Null,
            Self::Text(_) => ValueKind::Text,
            Self::Time(_) => ValueKind::Time,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::Uint(_) => ValueKind::Uint,
        }
    }

    /// Borrow the text payload, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Approximate in-memory body length used for scan byte accounting.
    #[must_use]
    pub fn byte_len(&self) -> u64 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Float32(_) | Self::Date(_) => 4,
            Self::Float64(_)
            | Self::Int(_)
            | Self::Uint(_)
            | Self::Time(_)
            | Self::Timestamp(_) => 8,
            Self::Decimal(_) => 16,
            Self::Text(text) => text.len() as u64,
            Self::Binary(bytes) => bytes.len() as u64,
            Self::List(items) => items.iter().map(Self::byte_len).sum(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float64(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

///
/// ValueKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    Binary,
    Bool,
    Date,
    Decimal,
    Float32,
    Float64,
    Int,
    List,
    Null,
    Text,
    Time,
    Timestamp,
    Uint,
}

impl ValueKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Binary => "Binary",
            Self::Bool => "Bool",
            Self::Date => "Date",
            Self::Decimal => "Decimal",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::Int => "Int",
            Self::List => "List",
            Self::Null => "Null",
            Self::Text => "Text",
            Self::Time => "Time",
            Self::Timestamp => "Timestamp",
            Self::Uint => "Uint",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
