//! `listIndexes`

use bson::Document;
use mongowire_common::{CodecResult, Direction, MongoError, MongoResult};

use crate::command::{Command, ALL_DIRECTIONS};
use crate::cursor::{marshall_cursor, unmarshall_cursor, MongoCursor};
use crate::fields::{reader, BsonField, DocumentBuilder};
use crate::pojos::IndexOptions;

const COLLECTION_FIELD: BsonField<String> = BsonField::new("listIndexes");
const CURSOR_FIELD: BsonField<Document> = BsonField::new("cursor");

#[derive(Debug, Clone, Copy, Default)]
pub struct ListIndexesCommand;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListIndexesArgument {
    collection: String,
}

impl ListIndexesArgument {
    pub fn new(collection: impl Into<String>) -> MongoResult<Self> {
        let collection = collection.into();
        if collection.is_empty() {
            return Err(MongoError::bad_value(
                "Argument to listIndexes must be a collection name, not the empty string",
            ));
        }
        Ok(Self { collection })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListIndexesResult {
    cursor: MongoCursor<IndexOptions>,
}

impl ListIndexesResult {
    pub fn new(cursor: MongoCursor<IndexOptions>) -> Self {
        Self { cursor }
    }

    pub fn cursor(&self) -> &MongoCursor<IndexOptions> {
        &self.cursor
    }

    pub fn into_cursor(self) -> MongoCursor<IndexOptions> {
        self.cursor
    }
}

impl Command for ListIndexesCommand {
    type Argument = ListIndexesArgument;
    type Result = ListIndexesResult;

    const DIRECTIONS: &'static [Direction] = ALL_DIRECTIONS;

    fn name(&self) -> &'static str {
        "listIndexes"
    }

    fn unmarshall_arg(&self, doc: &Document) -> MongoResult<ListIndexesArgument> {
        let collection = reader::get(doc, &COLLECTION_FIELD).map_err(|e| match e.found_type() {
            Some(found) => e.with_message(format!(
                "Argument to listIndexes must be of type String, not {found}"
            )),
            None => e,
        })?;
        ListIndexesArgument::new(collection)
    }

    fn marshall_arg(&self, arg: &ListIndexesArgument) -> CodecResult<Document> {
        Ok(DocumentBuilder::new()
            .append(&COLLECTION_FIELD, &arg.collection)
            .build())
    }

    fn marshall_result(&self, result: &ListIndexesResult) -> MongoResult<Document> {
        let cursor = marshall_cursor(&result.cursor, IndexOptions::marshall).map_err(MongoError::marshal)?;
        Ok(DocumentBuilder::new().append(&CURSOR_FIELD, &cursor).build())
    }

    fn unmarshall_result(&self, doc: &Document) -> CodecResult<ListIndexesResult> {
        let cursor = reader::get_document(doc, &CURSOR_FIELD)?;
        Ok(ListIndexesResult::new(unmarshall_cursor(cursor, IndexOptions::unmarshall)?))
    }
}
