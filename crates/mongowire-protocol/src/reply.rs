//! OP_REPLY envelopes
//!
//! A reply's documents are read from memory owned by a [`BsonContext`].
//! The context is released exactly once: explicitly through
//! [`ReplyMessage::release`], or when the reply is dropped. After release the
//! document sequence can no longer be read.

use std::fmt;
use std::io::Cursor;

use bson::Document;
use bytes::{BufMut, Bytes, BytesMut};
use mongowire_common::{MongoError, MongoResult};
use thiserror::Error;
use tracing::trace;

use crate::wire::{serialize_header, MsgHeader, OpCode, HEADER_LENGTH};

pub const CURSOR_NOT_FOUND: i32 = 1;
pub const QUERY_FAILURE: i32 = 1 << 1;
pub const SHARD_CONFIG_STALE: i32 = 1 << 2;
pub const AWAIT_CAPABLE: i32 = 1 << 3;

/// Fixed part of an OP_REPLY body: flags, cursorId, startingFrom, numberReturned
const REPLY_PREFIX_LENGTH: usize = 20;

const DEFAULT_DIAGNOSTIC_LIMIT: usize = 10;

/// Owner of the memory a reply's documents live in
pub trait BsonContext: Send + Sync {
    fn is_valid(&self) -> bool;

    fn release(&mut self);
}

/// Context for documents living on the heap
#[derive(Debug, Default)]
pub struct HeapContext {
    released: bool,
}

impl HeapContext {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BsonContext for HeapContext {
    fn is_valid(&self) -> bool {
        !self.released
    }

    fn release(&mut self) {
        self.released = true;
    }
}

pub type DocumentIter<'a> = Box<dyn Iterator<Item = MongoResult<Document>> + 'a>;

/// Lazy, re-iterable sequence of reply documents
pub trait DocumentProvider: Send + Sync {
    fn documents(&self) -> DocumentIter<'_>;
}

impl DocumentProvider for Vec<Document> {
    fn documents(&self) -> DocumentIter<'_> {
        Box::new(self.iter().cloned().map(Ok))
    }
}

impl DocumentProvider for Document {
    fn documents(&self) -> DocumentIter<'_> {
        Box::new(std::iter::once(Ok(self.clone())))
    }
}

/// Concatenated encoded documents, decoded one at a time on iteration
#[derive(Debug, Clone)]
pub struct RawBatch {
    bytes: Bytes,
}

impl RawBatch {
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

impl DocumentProvider for RawBatch {
    fn documents(&self) -> DocumentIter<'_> {
        Box::new(RawBatchIter {
            data: &self.bytes,
            failed: false,
        })
    }
}

struct RawBatchIter<'a> {
    data: &'a [u8],
    failed: bool,
}

impl Iterator for RawBatchIter<'_> {
    type Item = MongoResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.data.is_empty() {
            return None;
        }

        let data = self.data;
        let length = if data.len() >= 4 {
            usize::try_from(i32::from_le_bytes([data[0], data[1], data[2], data[3]])).ok()
        } else {
            None
        };

        match length {
            Some(length) if length >= 5 && length <= data.len() => {
                let (doc_bytes, rest) = data.split_at(length);
                self.data = rest;
                Some(
                    Document::from_reader(&mut Cursor::new(doc_bytes))
                        .map_err(|e| MongoError::failed_to_parse(e.to_string())),
                )
            }
            _ => {
                self.failed = true;
                Some(Err(MongoError::failed_to_parse(format!(
                    "truncated document in reply batch ({} bytes left)",
                    data.len()
                ))))
            }
        }
    }
}

/// Errors reading or encoding a reply
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReplyError {
    #[error("reply documents are unavailable: data context released")]
    Released,

    #[error(transparent)]
    Protocol(#[from] MongoError),
}

/// Reply envelope: metadata plus a document sequence bound to a data context
pub struct ReplyMessage {
    response_to: i32,
    cursor_not_found: bool,
    query_failure: bool,
    shard_config_stale: bool,
    await_capable: bool,
    cursor_id: i64,
    starting_from: i32,
    documents: Box<dyn DocumentProvider>,
    context: Box<dyn BsonContext>,
    diagnostic_limit: usize,
}

impl ReplyMessage {
    /// Build a reply with every flag unset
    pub fn new(
        context: impl BsonContext + 'static,
        response_to: i32,
        cursor_id: i64,
        starting_from: i32,
        documents: impl DocumentProvider + 'static,
    ) -> Self {
        Self {
            response_to,
            cursor_not_found: false,
            query_failure: false,
            shard_config_stale: false,
            await_capable: false,
            cursor_id,
            starting_from,
            documents: Box::new(documents),
            context: Box::new(context),
            diagnostic_limit: DEFAULT_DIAGNOSTIC_LIMIT,
        }
    }

    #[must_use]
    pub fn with_cursor_not_found(mut self, value: bool) -> Self {
        self.cursor_not_found = value;
        self
    }

    #[must_use]
    pub fn with_query_failure(mut self, value: bool) -> Self {
        self.query_failure = value;
        self
    }

    #[must_use]
    pub fn with_shard_config_stale(mut self, value: bool) -> Self {
        self.shard_config_stale = value;
        self
    }

    #[must_use]
    pub fn with_await_capable(mut self, value: bool) -> Self {
        self.await_capable = value;
        self
    }

    /// Number of documents printed by `Display`
    #[must_use]
    pub fn with_diagnostic_limit(mut self, limit: usize) -> Self {
        self.diagnostic_limit = limit;
        self
    }

    pub fn response_to(&self) -> i32 {
        self.response_to
    }

    pub fn cursor_id(&self) -> i64 {
        self.cursor_id
    }

    pub fn starting_from(&self) -> i32 {
        self.starting_from
    }

    pub fn is_cursor_not_found(&self) -> bool {
        self.cursor_not_found
    }

    pub fn is_query_failure(&self) -> bool {
        self.query_failure
    }

    pub fn is_shard_config_stale(&self) -> bool {
        self.shard_config_stale
    }

    pub fn is_await_capable(&self) -> bool {
        self.await_capable
    }

    pub fn flags(&self) -> i32 {
        let mut flags = 0;
        if self.cursor_not_found {
            flags |= CURSOR_NOT_FOUND;
        }
        if self.query_failure {
            flags |= QUERY_FAILURE;
        }
        if self.shard_config_stale {
            flags |= SHARD_CONFIG_STALE;
        }
        if self.await_capable {
            flags |= AWAIT_CAPABLE;
        }
        flags
    }

    pub fn is_released(&self) -> bool {
        !self.context.is_valid()
    }

    /// The document sequence, while the data context is alive
    pub fn documents(&self) -> Result<DocumentIter<'_>, ReplyError> {
        if self.is_released() {
            return Err(ReplyError::Released);
        }
        Ok(self.documents.documents())
    }

    /// Release the data context. Later calls do nothing.
    pub fn release(&mut self) {
        if self.context.is_valid() {
            self.context.release();
            trace!(response_to = self.response_to, "reply data context released");
        }
    }

    /// Run `f` on the reply, then release it whatever `f` returns
    pub fn consume<R>(mut self, f: impl FnOnce(&ReplyMessage) -> R) -> R {
        let result = f(&self);
        self.release();
        result
    }

    /// Encode as a complete OP_REPLY message
    pub fn encode(&self, request_id: i32) -> Result<BytesMut, ReplyError> {
        let mut docs = Vec::new();
        let mut returned = 0usize;
        for doc in self.documents()? {
            doc?.to_writer(&mut docs).map_err(|e| {
                MongoError::marshal(MongoError::bad_value(format!(
                    "cannot serialize reply document: {e}"
                )))
            })?;
            returned += 1;
        }

        let number_returned = i32::try_from(returned)
            .map_err(|_| MongoError::bad_value("too many documents in reply"))?;
        let message_length = i32::try_from(HEADER_LENGTH + REPLY_PREFIX_LENGTH + docs.len())
            .map_err(|_| MongoError::bad_value("reply exceeds the maximum message size"))?;

        let mut buf = BytesMut::with_capacity(HEADER_LENGTH + REPLY_PREFIX_LENGTH + docs.len());
        serialize_header(
            &MsgHeader {
                message_length,
                request_id,
                response_to: self.response_to,
                op_code: OpCode::Reply,
            },
            &mut buf,
        );
        buf.put_i32_le(self.flags());
        buf.put_i64_le(self.cursor_id);
        buf.put_i32_le(self.starting_from);
        buf.put_i32_le(number_returned);
        buf.extend_from_slice(&docs);

        Ok(buf)
    }

    /// Decode an OP_REPLY body (the bytes after the header)
    pub fn decode(header: &MsgHeader, body: Bytes) -> MongoResult<ReplyMessage> {
        if header.op_code != OpCode::Reply {
            return Err(MongoError::failed_to_parse(format!(
                "expected an OP_REPLY message, found {:?}",
                header.op_code
            )));
        }
        if body.len() < REPLY_PREFIX_LENGTH {
            return Err(MongoError::failed_to_parse(format!(
                "OP_REPLY body too short: {} bytes",
                body.len()
            )));
        }

        let i32_at = |at: usize| i32::from_le_bytes([body[at], body[at + 1], body[at + 2], body[at + 3]]);
        let flags = i32_at(0);
        let cursor_id = i64::from_le_bytes([
            body[4], body[5], body[6], body[7], body[8], body[9], body[10], body[11],
        ]);
        let starting_from = i32_at(12);

        Ok(ReplyMessage::new(
            HeapContext::new(),
            header.response_to,
            cursor_id,
            starting_from,
            RawBatch::new(body.slice(REPLY_PREFIX_LENGTH..)),
        )
        .with_cursor_not_found(flags & CURSOR_NOT_FOUND != 0)
        .with_query_failure(flags & QUERY_FAILURE != 0)
        .with_shard_config_stale(flags & SHARD_CONFIG_STALE != 0)
        .with_await_capable(flags & AWAIT_CAPABLE != 0))
    }
}

impl Drop for ReplyMessage {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Display for ReplyMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReplyMessage{{responseTo={}, cursorNotFound={}, queryFailure={}, shardConfigStale={}, \
             awaitCapable={}, cursorId={}, startingFrom={}",
            self.response_to,
            self.cursor_not_found,
            self.query_failure,
            self.shard_config_stale,
            self.await_capable,
            self.cursor_id,
            self.starting_from
        )?;

        match self.documents() {
            Ok(documents) => {
                write!(f, ", documents (limited to {})=[", self.diagnostic_limit)?;
                for (i, doc) in documents.take(self.diagnostic_limit).enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match doc {
                        Ok(doc) => write!(f, "{doc}")?,
                        Err(e) => write!(f, "<{e}>")?,
                    }
                }
                f.write_str("]")?;
            }
            Err(_) => f.write_str(", documents=<unavailable>")?,
        }
        f.write_str("}")
    }
}

impl fmt::Debug for ReplyMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
