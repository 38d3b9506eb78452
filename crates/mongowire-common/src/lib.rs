//! mongowire Common - Shared utilities and types
//!
//! This crate provides functionality used across the mongowire crates:
//! - Protocol error taxonomy and wire error codes
//! - Configuration management
//! - Logging and metrics
//! - Wire type names

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod types;

pub use config::ProtocolConfig;
pub use error::{
    CodecError, CodecResult, ConfigError, Direction, ErrorCode, MongoError, MongoResult,
    UnsupportedDirection,
};
pub use types::BsonType;
