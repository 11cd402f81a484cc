//! Gateway error taxonomy.
//!
//! The quoting core branches on [`ErrorKind`] only. Raw venue text is kept in
//! the message for logs and never inspected past the gateway boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable classification of a venue failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The referenced order does not exist (filled, cancelled, expired).
    NotFound,
    /// An edit was rejected because nothing would change.
    NoOpUnchanged,
    /// The venue does not offer this operation.
    Unsupported,
    /// Rate limit, outage, timeout, or network failure. Retry next cycle.
    Transient,
    /// Authentication or permission failure. Quoting must stop.
    Fatal,
    /// Anything the mapping table did not recognize.
    Unclassified,
}

impl ErrorKind {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::NoOpUnchanged => write!(f, "NO_OP_UNCHANGED"),
            Self::Unsupported => write!(f, "UNSUPPORTED"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Fatal => write!(f, "FATAL"),
            Self::Unclassified => write!(f, "UNCLASSIFIED"),
        }
    }
}

/// A classified venue failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct VenueError {
    pub kind: ErrorKind,
    pub message: String,
}

impl VenueError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn unchanged(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoOpUnchanged, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unsupported, message)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transient, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fatal, message)
    }

    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unclassified, message)
    }

    #[inline]
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

pub type GatewayResult<T> = Result<T, VenueError>;
