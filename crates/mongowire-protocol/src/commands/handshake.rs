//! `handshake`, sent by a secondary to identify itself to its sync source

use bson::oid::ObjectId;
use bson::Document;
use mongowire_common::{CodecResult, Direction, MongoResult};

use crate::command::Command;
use crate::fields::{reader, BsonField};
use crate::pojos::MemberConfig;

const RID_FIELD: BsonField<ObjectId> = BsonField::new("handshake");
const MEMBER_ID_FIELD: BsonField<i64> = BsonField::new("member");
const CONFIG_FIELD: BsonField<Document> = BsonField::new("config");

const ALLOWED_FIELDS: &[&str] = &["handshake", "config", "member"];

#[derive(Debug, Clone, Copy, Default)]
pub struct HandshakeCommand;

#[derive(Debug, Clone, PartialEq)]
pub struct HandshakeArgument {
    rid: ObjectId,
    member_id: Option<i64>,
    /// Only sent by members older than 3.0
    config: Option<MemberConfig>,
}

impl HandshakeArgument {
    pub fn new(rid: ObjectId, member_id: Option<i64>, config: Option<MemberConfig>) -> Self {
        Self {
            rid,
            member_id,
            config,
        }
    }

    pub fn rid(&self) -> ObjectId {
        self.rid
    }

    pub fn member_id(&self) -> Option<i64> {
        self.member_id
    }

    pub fn config(&self) -> Option<&MemberConfig> {
        self.config.as_ref()
    }
}

impl Command for HandshakeCommand {
    type Argument = HandshakeArgument;
    type Result = ();

    const DIRECTIONS: &'static [Direction] = &[
        Direction::UnmarshallArg,
        Direction::MarshallResult,
        Direction::UnmarshallResult,
    ];

    fn name(&self) -> &'static str {
        "handshake"
    }

    fn unmarshall_arg(&self, doc: &Document) -> MongoResult<HandshakeArgument> {
        reader::check_only_has_fields("HandshakeArgs", doc, ALLOWED_FIELDS)?;

        let rid = reader::get(doc, &RID_FIELD)?;
        let member_id = reader::get_optional(doc, &MEMBER_ID_FIELD)?;
        let config = reader::get_optional_document(doc, &CONFIG_FIELD)?
            .map(MemberConfig::from_document)
            .transpose()?;

        Ok(HandshakeArgument::new(rid, member_id, config))
    }

    fn marshall_result(&self, _result: &()) -> MongoResult<Document> {
        Ok(Document::new())
    }

    fn unmarshall_result(&self, _doc: &Document) -> CodecResult<()> {
        Ok(())
    }
}
