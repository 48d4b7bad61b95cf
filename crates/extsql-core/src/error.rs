use crate::{
    config::ConfigError,
    scan::{DriverError, ScanError, ScanErrorKind},
    sql::{CompileError, QueryError},
    wire::DecodeError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Any failure surfaced by the engine, grouped by the stage that raised it.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl Error {
    #[must_use]
    pub const fn stage(&self) -> ErrorStage {
        match self {
            Self::Config(_) => ErrorStage::Config,
            Self::Decode(_) => ErrorStage::Decode,
            Self::Compile(_) => ErrorStage::Compile,
            Self::Query(_) => ErrorStage::Query,
            Self::Scan(err) => match err.kind() {
                ScanErrorKind::Query => ErrorStage::Query,
                ScanErrorKind::Execution | ScanErrorKind::Schema | ScanErrorKind::Close => {
                    ErrorStage::Execution
                }
            },
            Self::Driver(_) => ErrorStage::Execution,
        }
    }
}

///
/// ErrorStage
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorStage {
    Config,
    Decode,
    Compile,
    Query,
    Execution,
}

impl ErrorStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Decode => "decode",
            Self::Compile => "compile",
            Self::Query => "query",
            Self::Execution => "execution",
        }
    }
}

impl fmt::Display for ErrorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
