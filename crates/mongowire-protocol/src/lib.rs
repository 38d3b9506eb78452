//! mongowire Protocol - MongoDB wire protocol command layer
//!
//! This crate turns wire documents into typed command arguments and typed
//! results back into wire documents:
//! - **Fields**: typed accessors, numeric coercion and strict key checks
//! - **Commands**: `listIndexes`, `collStats`, `handshake`, `replSetFresh`,
//!   `ping` and `isMaster`, each a [`Command`] implementation
//! - **Library**: case-insensitive, build-once command registry
//! - **Replies**: OP_REPLY envelopes with scoped document ownership and
//!   `{id, ns, firstBatch}` cursor framing
//! - **Dispatch**: lookup, decode, execute and encode against a
//!   [`RequestProcessor`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mongowire_protocol::{CommandDispatcher, CommandsLibrary, Request};
//!
//! let dispatcher = CommandDispatcher::new(Arc::new(CommandsLibrary::standard()), processor);
//! let reply = dispatcher
//!     .handle_command(&Request::new(1, 7, "admin"), &doc! { "ping": 1 })
//!     .await;
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc, clippy::must_use_candidate)]

pub mod command;
pub mod commands;
pub mod cursor;
pub mod decoder;
pub mod dispatcher;
pub mod fields;
pub mod host_and_port;
pub mod library;
pub mod namespace;
pub mod optime;
pub mod pojos;
pub mod processor;
pub mod reply;
pub mod wire;

pub use command::{AnyArgument, AnyCommand, AnyResult, Command};
pub use cursor::MongoCursor;
pub use decoder::{decode_query, QueryMessage};
pub use dispatcher::{error_document, CommandDispatcher};
pub use host_and_port::HostAndPort;
pub use library::CommandsLibrary;
pub use namespace::{split_namespace, Namespace};
pub use optime::OpTime;
pub use processor::{Connection, Request, RequestProcessor};
pub use reply::{BsonContext, HeapContext, ReplyError, ReplyMessage};
pub use wire::{MsgHeader, OpCode};
