//! Boundary to the code that executes requests
//!
//! Write operations are handed back as futures. The protocol layer never
//! awaits them on its own and never retries them.

use std::fmt;
use std::net::SocketAddr;

use async_trait::async_trait;
use bson::{Bson, Document};
use futures::future::{BoxFuture, FutureExt, Shared};
use mongowire_common::MongoResult;

use crate::command::{AnyArgument, AnyCommand, AnyResult};
use crate::decoder::QueryMessage;
use crate::reply::ReplyMessage;

pub type WriteFuture<T> = BoxFuture<'static, MongoResult<T>>;

/// Write future that several waiters can poll, such as a later `getLastError`
pub type SharedWriteOp = Shared<WriteFuture<WriteOpResult>>;

/// State of one client connection
///
/// Owned by the task serving the connection, so it is mutated without
/// locking.
pub struct Connection {
    connection_id: i32,
    last_write_op: Option<SharedWriteOp>,
}

impl Connection {
    pub fn new(connection_id: i32) -> Self {
        Self {
            connection_id,
            last_write_op: None,
        }
    }

    pub fn connection_id(&self) -> i32 {
        self.connection_id
    }

    pub fn last_write_op(&self) -> Option<SharedWriteOp> {
        self.last_write_op.clone()
    }

    /// Remember `op` as the most recent write and return a handle to it
    pub fn set_last_write_op(&mut self, op: WriteFuture<WriteOpResult>) -> SharedWriteOp {
        let shared = op.shared();
        self.last_write_op = Some(shared.clone());
        shared
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("connection_id", &self.connection_id)
            .field("has_last_write_op", &self.last_write_op.is_some())
            .finish()
    }
}

/// Per-message request metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub connection_id: i32,
    pub request_id: i32,
    pub database: String,
    pub client_address: Option<SocketAddr>,
}

impl Request {
    pub fn new(connection_id: i32, request_id: i32, database: impl Into<String>) -> Self {
        Self {
            connection_id,
            request_id,
            database: database.into(),
            client_address: None,
        }
    }

    #[must_use]
    pub fn with_client_address(mut self, address: SocketAddr) -> Self {
        self.client_address = Some(address);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertMessage {
    pub database: String,
    pub collection: String,
    pub continue_on_error: bool,
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateMessage {
    pub database: String,
    pub collection: String,
    pub selector: Document,
    pub update: Document,
    pub upsert: bool,
    pub multi_update: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteMessage {
    pub database: String,
    pub collection: String,
    pub selector: Document,
    pub single_remove: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetMoreMessage {
    pub database: String,
    pub collection: String,
    pub number_to_return: i32,
    pub cursor_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillCursorsMessage {
    pub cursor_ids: Vec<i64>,
}

/// Outcome of an insert or delete
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WriteOpResult {
    /// Documents affected
    pub n: i64,
    pub err_msg: Option<String>,
}

impl WriteOpResult {
    pub fn ok(n: i64) -> Self {
        Self { n, err_msg: None }
    }

    pub fn is_ok(&self) -> bool {
        self.err_msg.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateOpResult {
    pub write: WriteOpResult,
    pub n_modified: i64,
    pub updated_existing: bool,
    pub upserted: Option<Bson>,
}

/// Executes decoded requests
#[async_trait]
pub trait RequestProcessor: Send + Sync {
    fn on_connection_active(&self, _connection: &Connection) {}

    fn on_connection_inactive(&self, _connection: &Connection) {}

    /// Answer a query that is not a command
    async fn query(&self, request: &Request, query: &QueryMessage) -> MongoResult<ReplyMessage>;

    async fn get_more(&self, request: &Request, message: &GetMoreMessage) -> MongoResult<ReplyMessage>;

    fn insert(&self, request: &Request, message: InsertMessage) -> WriteFuture<WriteOpResult>;

    fn update(&self, request: &Request, message: UpdateMessage) -> WriteFuture<UpdateOpResult>;

    fn delete(&self, request: &Request, message: DeleteMessage) -> WriteFuture<WriteOpResult>;

    fn kill_cursors(&self, request: &Request, message: KillCursorsMessage) -> WriteFuture<()>;

    /// Run a command on its decoded argument.
    ///
    /// The returned result must be the command's own result type.
    async fn execute(
        &self,
        request: &Request,
        command: &dyn AnyCommand,
        argument: AnyArgument,
    ) -> MongoResult<AnyResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_last_write_op_is_shared() {
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = polls.clone();
        let op: WriteFuture<WriteOpResult> = async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(WriteOpResult::ok(3))
        }
        .boxed();

        let mut connection = Connection::new(7);
        assert!(connection.last_write_op().is_none());
        let handle = connection.set_last_write_op(op);

        let first = handle.await.unwrap();
        let second = connection.last_write_op().unwrap().await.unwrap();
        assert_eq!(first, WriteOpResult::ok(3));
        assert_eq!(second, first);
        assert_eq!(polls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_request_builder() {
        let address: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        let request = Request::new(1, 2, "admin").with_client_address(address);
        assert_eq!(request.client_address, Some(address));
        assert_eq!(request.database, "admin");
        assert!(WriteOpResult::default().is_ok());
    }
}
