//! Error types for the MDP data model

use thiserror::Error;

/// Core error type for MDP operations
#[derive(Error, Debug)]
pub enum MdpError {
    /// A parameter is outside its valid domain (discount rate, empty name, ...)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unknown state, action or index in a removal or resolution path
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate registration of a name
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// An operation was called before its required setup
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    /// Malformed canonical text
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// One-based line number
        line: usize,
        /// What was wrong with the line
        message: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Category of an [`MdpError`], for matching without inspecting messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`MdpError::InvalidParameter`]
    InvalidParameter,
    /// See [`MdpError::NotFound`]
    NotFound,
    /// See [`MdpError::AlreadyExists`]
    AlreadyExists,
    /// See [`MdpError::PreconditionViolation`]
    PreconditionViolation,
    /// See [`MdpError::Parse`]
    Parse,
    /// See [`MdpError::Serialization`]
    Serialization,
    /// See [`MdpError::Io`]
    Io,
}

impl MdpError {
    /// Get the category of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::PreconditionViolation(_) => ErrorKind::PreconditionViolation,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for MDP operations
pub type Result<T> = std::result::Result<T, MdpError>;
