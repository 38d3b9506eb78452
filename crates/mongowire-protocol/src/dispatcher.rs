//! Command dispatch: registry lookup, decoding, execution and encoding

use std::sync::Arc;

use bson::{doc, Document};
use mongowire_common::config::ReplyConfig;
use mongowire_common::metrics::{record_command, record_error, CommandOutcome};
use mongowire_common::{MongoError, MongoResult};
use tracing::{debug, instrument, warn};

use crate::command::AnyCommand;
use crate::decoder::QueryMessage;
use crate::library::CommandsLibrary;
use crate::processor::{Request, RequestProcessor};
use crate::reply::{BsonContext, ReplyMessage};

/// `{ok: 0, errmsg, code, codeName}` for a failed command
pub fn error_document(error: &MongoError) -> Document {
    doc! {
        "ok": 0.0,
        "errmsg": error.to_string(),
        "code": error.code().code(),
        "codeName": error.code().name(),
    }
}

pub struct CommandDispatcher {
    library: Arc<CommandsLibrary>,
    processor: Arc<dyn RequestProcessor>,
    reply_config: ReplyConfig,
}

impl CommandDispatcher {
    pub fn new(library: Arc<CommandsLibrary>, processor: Arc<dyn RequestProcessor>) -> Self {
        Self {
            library,
            processor,
            reply_config: ReplyConfig::default(),
        }
    }

    #[must_use]
    pub fn with_reply_config(mut self, reply_config: ReplyConfig) -> Self {
        self.reply_config = reply_config;
        self
    }

    pub fn library(&self) -> &CommandsLibrary {
        &self.library
    }

    /// Run the command in `command_doc` and build its reply document.
    ///
    /// Never fails: protocol errors become an error reply.
    #[instrument(skip(self, request, command_doc), fields(request_id = request.request_id, db = %request.database))]
    pub async fn handle_command(&self, request: &Request, command_doc: &Document) -> Document {
        let command = match self.library.find_command(command_doc) {
            Ok(command) => command,
            Err(e) => {
                record_error(&e);
                return error_document(&e);
            }
        };
        let name = command.name();

        match self.run(request, command, command_doc).await {
            Ok(mut reply) => {
                record_command(name, CommandOutcome::Ok);
                reply.insert("ok", 1.0);
                reply
            }
            Err(e) => {
                warn!(command = name, error = %e, "command failed");
                record_command(name, CommandOutcome::Failed);
                record_error(&e);
                error_document(&e)
            }
        }
    }

    async fn run(
        &self,
        request: &Request,
        command: &dyn AnyCommand,
        command_doc: &Document,
    ) -> MongoResult<Document> {
        let argument = command.unmarshall_arg(command_doc)?;
        debug!(command = command.name(), "argument decoded");

        let result = self.processor.execute(request, command, argument).await?;
        command.marshall_result(&*result)
    }

    /// Answer an OP_QUERY.
    ///
    /// `$cmd` queries run as commands and the reply document is bound to
    /// `context`. Other queries go to the processor, which answers with its
    /// own context, so `context` is released before forwarding.
    pub async fn handle_query(
        &self,
        request: &Request,
        query: &QueryMessage,
        mut context: impl BsonContext + 'static,
    ) -> MongoResult<ReplyMessage> {
        if !query.is_command() {
            if context.is_valid() {
                context.release();
            }
            return self.processor.query(request, query).await;
        }

        let reply = self.handle_command(request, &query.query).await;
        Ok(ReplyMessage::new(context, request.request_id, 0, 0, reply)
            .with_diagnostic_limit(self.reply_config.diagnostic_documents_limit))
    }
}
