//! `ping`

use bson::Document;
use mongowire_common::{CodecResult, Direction, MongoResult};

use crate::command::{Command, ALL_DIRECTIONS};

#[derive(Debug, Clone, Copy, Default)]
pub struct PingCommand;

impl Command for PingCommand {
    type Argument = ();
    type Result = ();

    const DIRECTIONS: &'static [Direction] = ALL_DIRECTIONS;

    fn name(&self) -> &'static str {
        "ping"
    }

    fn is_readable_from_secondary(&self) -> bool {
        true
    }

    fn unmarshall_arg(&self, _doc: &Document) -> MongoResult<()> {
        Ok(())
    }

    fn marshall_arg(&self, _arg: &()) -> CodecResult<Document> {
        let mut doc = Document::new();
        doc.insert(self.name(), 1_i32);
        Ok(doc)
    }

    fn marshall_result(&self, _result: &()) -> MongoResult<Document> {
        Ok(Document::new())
    }

    fn unmarshall_result(&self, _doc: &Document) -> CodecResult<()> {
        Ok(())
    }
}
