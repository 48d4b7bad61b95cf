//! Remote execution seam.
//!
//! The scanner drives a remote SQL source only through these traits. A
//! connection hands out statements, a statement executes one query into a
//! forward-only cursor. Every level is closed explicitly and reports whether
//! it already is.

use crate::{types::ColumnMeta, value::Value};
use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;

///
/// DriverError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DriverError {
    #[error("connect failed: {message}")]
    Connect { message: String },

    #[error("query failed: {message}")]
    Query { message: String },

    #[error("fetch failed: {message}")]
    Fetch { message: String },

    #[error("close failed: {message}")]
    Close { message: String },
}

impl DriverError {
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    pub fn close(message: impl Into<String>) -> Self {
        Self::Close {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> DriverErrorKind {
        match self {
            Self::Connect { .. } => DriverErrorKind::Connect,
            Self::Query { .. } => DriverErrorKind::Query,
            Self::Fetch { .. } => DriverErrorKind::Fetch,
            Self::Close { .. } => DriverErrorKind::Close,
        }
    }
}

///
/// DriverErrorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DriverErrorKind {
    Connect,
    Query,
    Fetch,
    Close,
}

impl DriverErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Query => "query",
            Self::Fetch => "fetch",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for DriverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// ConnectOptions
///
/// Connection URL plus the driver properties sent alongside it.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConnectOptions {
    pub url: String,
    pub properties: BTreeMap<String, String>,
}

impl ConnectOptions {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Whether the URL itself already sets `key`.
    #[must_use]
    pub fn url_mentions(&self, key: &str) -> bool {
        self.url.contains(key)
    }
}

///
/// Driver
///

pub trait Driver {
    type Connection: Connection;

    fn connect(&self, options: &ConnectOptions) -> Result<Self::Connection, DriverError>;
}

///
/// Connection
///

pub trait Connection {
    type Statement: Statement;

    /// Create a forward-only, read-only statement.
    fn create_statement(&mut self) -> Result<Self::Statement, DriverError>;

    fn close(&mut self) -> Result<(), DriverError>;

    fn is_closed(&self) -> bool;
}

///
/// Statement
///

pub trait Statement {
    type Cursor: Cursor;

    /// Execute `sql` as-is. No parameters are bound at this level.
    fn execute_query(&mut self, sql: &str) -> Result<Self::Cursor, DriverError>;

    fn close(&mut self) -> Result<(), DriverError>;

    fn is_closed(&self) -> bool;
}

///
/// Cursor
///

pub trait Cursor {
    /// Result metadata, one entry per selected column in select-list order.
    fn columns(&self) -> &[ColumnMeta];

    /// Next row, or `None` once the result is exhausted.
    fn next_row(&mut self) -> Result<Option<Vec<Value>>, DriverError>;

    fn close(&mut self) -> Result<(), DriverError>;

    fn is_closed(&self) -> bool;
}
