//! High-level error types

use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] wolkit_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] wolkit_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] wolkit_types::Error),

    #[error("Store error: {0}")]
    Store(#[from] wolkit_store::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Stable error category for callers that branch on the failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    InvalidMac,
    AddressResolution,
    Transmission,
    Persistence,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Core(e) if e.is_input_error() => ErrorKind::InvalidMac,
            Self::Core(_) => ErrorKind::Transmission,
            Self::Transport(e) if e.is_resolution() => ErrorKind::AddressResolution,
            Self::Transport(_) => ErrorKind::Transmission,
            Self::Types(_) => ErrorKind::Validation,
            Self::Store(wolkit_store::Error::Validation(_)) => ErrorKind::Validation,
            Self::Store(wolkit_store::Error::NotFound(_)) => ErrorKind::NotFound,
            Self::Store(_) => ErrorKind::Persistence,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Serializable `{ kind, message }` form for a front-end
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Error as handed across the command boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<Error> for ErrorReport {
    fn from(err: Error) -> Self {
        err.report()
    }
}
