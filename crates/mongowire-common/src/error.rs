//! Error types for mongowire
//!
//! Protocol errors form a closed set. Each kind maps to one MongoDB wire
//! error code so a caller can always build a client-compatible error reply.

use std::fmt;

use thiserror::Error;

use crate::types::BsonType;

/// Result type alias for protocol operations
pub type MongoResult<T> = std::result::Result<T, MongoError>;

/// Result type alias for marshalling directions a command may not implement
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// MongoDB wire error codes produced by this layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    InternalError = 1,
    BadValue = 2,
    NoSuchKey = 4,
    FailedToParse = 9,
    TypeMismatch = 14,
    InvalidNamespace = 73,
    CommandNotSupported = 115,
}

impl ErrorCode {
    /// Numeric code sent as the `code` field of an error reply
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Symbolic name sent as the `codeName` field of an error reply
    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::InternalError => "InternalError",
            ErrorCode::BadValue => "BadValue",
            ErrorCode::NoSuchKey => "NoSuchKey",
            ErrorCode::FailedToParse => "FailedToParse",
            ErrorCode::TypeMismatch => "TypeMismatch",
            ErrorCode::InvalidNamespace => "InvalidNamespace",
            ErrorCode::CommandNotSupported => "CommandNotSupported",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Protocol-level error
///
/// None of these are retriable: they mean either the request is invalid or a
/// produced result cannot be serialized.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MongoError {
    #[error("missing expected field \"{field}\"")]
    NoSuchKey { field: String },

    #[error("{message}")]
    TypesMismatch {
        field: String,
        expected: BsonType,
        found: BsonType,
        message: String,
    },

    #[error("{0}")]
    BadValue(String),

    #[error("{0}")]
    FailedToParse(String),

    #[error("invalid namespace '{namespace}': {reason}")]
    InvalidNamespace { namespace: String, reason: String },

    #[error("command not supported: {command}")]
    CommandNotSupported { command: String },

    #[error("error while marshalling a result: {0}")]
    Marshal(#[source] Box<MongoError>),
}

impl MongoError {
    pub fn no_such_key(field: impl Into<String>) -> Self {
        MongoError::NoSuchKey { field: field.into() }
    }

    /// Type mismatch with the default `<field>: field must be of type <expected>, not <found>` message
    pub fn types_mismatch(field: impl Into<String>, expected: BsonType, found: BsonType) -> Self {
        let field = field.into();
        let message = format!("{field}: field must be of type {expected}, not {found}");
        MongoError::TypesMismatch {
            field,
            expected,
            found,
            message,
        }
    }

    pub fn bad_value(message: impl Into<String>) -> Self {
        MongoError::BadValue(message.into())
    }

    pub fn failed_to_parse(message: impl Into<String>) -> Self {
        MongoError::FailedToParse(message.into())
    }

    pub fn invalid_namespace(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        MongoError::InvalidNamespace {
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }

    pub fn command_not_supported(command: impl Into<String>) -> Self {
        MongoError::CommandNotSupported {
            command: command.into(),
        }
    }

    /// Wrap a serialization failure. An already wrapped error is returned as is.
    pub fn marshal(inner: MongoError) -> Self {
        match inner {
            MongoError::Marshal(_) => inner,
            other => MongoError::Marshal(Box::new(other)),
        }
    }

    /// Replace the message of a `TypesMismatch`, keeping its field and types.
    ///
    /// Other kinds are returned unchanged.
    #[must_use]
    pub fn with_message(self, message: impl Into<String>) -> Self {
        match self {
            MongoError::TypesMismatch {
                field,
                expected,
                found,
                ..
            } => MongoError::TypesMismatch {
                field,
                expected,
                found,
                message: message.into(),
            },
            other => other,
        }
    }

    /// Wire error code of this kind
    pub fn code(&self) -> ErrorCode {
        match self {
            MongoError::NoSuchKey { .. } => ErrorCode::NoSuchKey,
            MongoError::TypesMismatch { .. } => ErrorCode::TypeMismatch,
            MongoError::BadValue(_) => ErrorCode::BadValue,
            MongoError::FailedToParse(_) => ErrorCode::FailedToParse,
            MongoError::InvalidNamespace { .. } => ErrorCode::InvalidNamespace,
            MongoError::CommandNotSupported { .. } => ErrorCode::CommandNotSupported,
            MongoError::Marshal(_) => ErrorCode::InternalError,
        }
    }

    /// Type actually found on the wire, for `TypesMismatch`
    pub fn found_type(&self) -> Option<BsonType> {
        match self {
            MongoError::TypesMismatch { found, .. } => Some(*found),
            _ => None,
        }
    }
}

/// Direction of a command codec operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    MarshallArg,
    UnmarshallArg,
    MarshallResult,
    UnmarshallResult,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::MarshallArg => "argument marshalling",
            Direction::UnmarshallArg => "argument unmarshalling",
            Direction::MarshallResult => "result marshalling",
            Direction::UnmarshallResult => "result unmarshalling",
        };
        f.write_str(name)
    }
}

/// A command was asked for a codec direction it does not implement.
///
/// This is not a protocol error: the request itself may be fine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{command} does not implement {direction}")]
pub struct UnsupportedDirection {
    pub command: &'static str,
    pub direction: Direction,
}

/// Failure of a codec direction that is optional for a command
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error(transparent)]
    Protocol(#[from] MongoError),

    #[error(transparent)]
    Unsupported(#[from] UnsupportedDirection),
}

impl CodecError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, CodecError::Unsupported(_))
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}
