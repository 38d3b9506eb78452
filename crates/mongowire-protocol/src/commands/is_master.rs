//! `isMaster`

use bson::Document;
use chrono::{DateTime, Utc};
use mongowire_common::{CodecResult, Direction, MongoResult};

use crate::command::{Command, ALL_DIRECTIONS};
use crate::fields::{reader, BsonField, DocumentBuilder};

pub const MAX_BSON_OBJECT_SIZE: i32 = 16 * 1024 * 1024;
pub const MAX_MESSAGE_SIZE_BYTES: i32 = 48_000_000;
pub const MAX_WRITE_BATCH_SIZE: i32 = 1000;
pub const MIN_WIRE_VERSION: i32 = 0;
/// MongoDB 3.0
pub const MAX_WIRE_VERSION: i32 = 3;

const IS_MASTER_FIELD: BsonField<bool> = BsonField::new("ismaster");
const SECONDARY_FIELD: BsonField<bool> = BsonField::new("secondary");
const SET_NAME_FIELD: BsonField<String> = BsonField::new("setName");
const MAX_BSON_OBJECT_SIZE_FIELD: BsonField<i32> = BsonField::new("maxBsonObjectSize");
const MAX_MESSAGE_SIZE_BYTES_FIELD: BsonField<i32> = BsonField::new("maxMessageSizeBytes");
const MAX_WRITE_BATCH_SIZE_FIELD: BsonField<i32> = BsonField::new("maxWriteBatchSize");
const LOCAL_TIME_FIELD: BsonField<DateTime<Utc>> = BsonField::new("localTime");
const MIN_WIRE_VERSION_FIELD: BsonField<i32> = BsonField::new("minWireVersion");
const MAX_WIRE_VERSION_FIELD: BsonField<i32> = BsonField::new("maxWireVersion");

#[derive(Debug, Clone, Copy, Default)]
pub struct IsMasterCommand;

/// Role and limits advertised to a connecting client
#[derive(Debug, Clone, PartialEq)]
pub struct IsMasterReply {
    is_master: bool,
    secondary: bool,
    set_name: Option<String>,
    max_bson_object_size: i32,
    max_message_size_bytes: i32,
    max_write_batch_size: i32,
    local_time: DateTime<Utc>,
    min_wire_version: i32,
    max_wire_version: i32,
}

impl IsMasterReply {
    /// A writable server outside any replica set
    pub fn standalone(local_time: DateTime<Utc>) -> Self {
        Self {
            is_master: true,
            secondary: false,
            set_name: None,
            max_bson_object_size: MAX_BSON_OBJECT_SIZE,
            max_message_size_bytes: MAX_MESSAGE_SIZE_BYTES,
            max_write_batch_size: MAX_WRITE_BATCH_SIZE,
            local_time,
            min_wire_version: MIN_WIRE_VERSION,
            max_wire_version: MAX_WIRE_VERSION,
        }
    }

    /// A replica set member in the given role
    pub fn replica_set_member(local_time: DateTime<Utc>, set_name: impl Into<String>, primary: bool) -> Self {
        Self {
            is_master: primary,
            secondary: !primary,
            set_name: Some(set_name.into()),
            ..Self::standalone(local_time)
        }
    }

    pub fn is_master(&self) -> bool {
        self.is_master
    }

    pub fn is_secondary(&self) -> bool {
        self.secondary
    }

    pub fn set_name(&self) -> Option<&str> {
        self.set_name.as_deref()
    }

    pub fn max_bson_object_size(&self) -> i32 {
        self.max_bson_object_size
    }

    pub fn max_message_size_bytes(&self) -> i32 {
        self.max_message_size_bytes
    }

    pub fn max_write_batch_size(&self) -> i32 {
        self.max_write_batch_size
    }

    pub fn local_time(&self) -> DateTime<Utc> {
        self.local_time
    }

    pub fn wire_versions(&self) -> (i32, i32) {
        (self.min_wire_version, self.max_wire_version)
    }
}

impl Command for IsMasterCommand {
    type Argument = ();
    type Result = IsMasterReply;

    const DIRECTIONS: &'static [Direction] = ALL_DIRECTIONS;

    fn name(&self) -> &'static str {
        "isMaster"
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

    fn marshall_result(&self, result: &IsMasterReply) -> MongoResult<Document> {
        Ok(DocumentBuilder::new()
            .append(&IS_MASTER_FIELD, &result.is_master)
            .append(&SECONDARY_FIELD, &result.secondary)
            .append_optional(&SET_NAME_FIELD, result.set_name.as_ref())
            .append(&MAX_BSON_OBJECT_SIZE_FIELD, &result.max_bson_object_size)
            .append(&MAX_MESSAGE_SIZE_BYTES_FIELD, &result.max_message_size_bytes)
            .append(&MAX_WRITE_BATCH_SIZE_FIELD, &result.max_write_batch_size)
            .append(&LOCAL_TIME_FIELD, &result.local_time)
            .append(&MIN_WIRE_VERSION_FIELD, &result.min_wire_version)
            .append(&MAX_WIRE_VERSION_FIELD, &result.max_wire_version)
            .build())
    }

    fn unmarshall_result(&self, doc: &Document) -> CodecResult<IsMasterReply> {
        Ok(IsMasterReply {
            is_master: reader::get(doc, &IS_MASTER_FIELD)?,
            secondary: reader::get_or(doc, &SECONDARY_FIELD, false)?,
            set_name: reader::get_optional(doc, &SET_NAME_FIELD)?,
            max_bson_object_size: reader::get_or(doc, &MAX_BSON_OBJECT_SIZE_FIELD, MAX_BSON_OBJECT_SIZE)?,
            max_message_size_bytes: reader::get_or(doc, &MAX_MESSAGE_SIZE_BYTES_FIELD, MAX_MESSAGE_SIZE_BYTES)?,
            max_write_batch_size: reader::get_or(doc, &MAX_WRITE_BATCH_SIZE_FIELD, MAX_WRITE_BATCH_SIZE)?,
            local_time: reader::get(doc, &LOCAL_TIME_FIELD)?,
            min_wire_version: reader::get_or(doc, &MIN_WIRE_VERSION_FIELD, MIN_WIRE_VERSION)?,
            max_wire_version: reader::get_or(doc, &MAX_WIRE_VERSION_FIELD, MIN_WIRE_VERSION)?,
        })
    }
}
