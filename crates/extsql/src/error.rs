use crate::{registry::RegistryError, request::RequestError};
use derive_more::Display;
use extsql_core::{
    Error as CoreError, ErrorStage, config::ConfigError, scan::ScanError, wire::DecodeError,
};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind taxonomy.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        let kind = match err.stage() {
            ErrorStage::Config => ErrorKind::Config,
            ErrorStage::Decode => ErrorKind::Decode,
            ErrorStage::Compile => ErrorKind::Compile,
            ErrorStage::Query => ErrorKind::Query,
            ErrorStage::Execution => ErrorKind::Execution,
        };

        Self::new(kind, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<ScanError> for Error {
    fn from(err: ScanError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        Self::new(ErrorKind::Registry, err.to_string())
    }
}

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        Self::new(ErrorKind::Request, err.to_string())
    }
}

///
/// ErrorKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorKind {
    Config,
    Registry,
    Request,
    Decode,
    Compile,
    Query,
    Execution,
}
