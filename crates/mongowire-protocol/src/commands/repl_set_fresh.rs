//! `replSetFresh`, sent by an election candidate to ask whether any member
//! is fresher than itself

use bson::Document;
use chrono::{DateTime, Utc};
use mongowire_common::MongoResult;

use crate::command::Command;
use crate::fields::{reader, BsonField, DocumentBuilder, Number};
use crate::host_and_port::HostAndPort;
use crate::optime::OpTime;

const SET_NAME_FIELD: BsonField<String> = BsonField::new("set");
const WHO_FIELD: BsonField<String> = BsonField::new("who");
const ID_FIELD: BsonField<i32> = BsonField::new("id");
const CFG_VER_FIELD: BsonField<Number> = BsonField::new("cfgver");
const OPTIME_FIELD: BsonField<DateTime<Utc>> = BsonField::new("optime");

const FRESHER_FIELD: BsonField<bool> = BsonField::new("fresher");
const INFO_FIELD: BsonField<String> = BsonField::new("info");
const VETO_FIELD: BsonField<bool> = BsonField::new("veto");

#[derive(Debug, Clone, Copy, Default)]
pub struct ReplSetFreshCommand;

#[derive(Debug, Clone, PartialEq)]
pub struct ReplSetFreshArgument {
    set_name: String,
    who: HostAndPort,
    client_id: i32,
    cfg_version: i64,
    op_time: DateTime<Utc>,
}

impl ReplSetFreshArgument {
    pub fn new(
        set_name: impl Into<String>,
        who: HostAndPort,
        client_id: i32,
        cfg_version: i64,
        op_time: DateTime<Utc>,
    ) -> Self {
        Self {
            set_name: set_name.into(),
            who,
            client_id,
            cfg_version,
            op_time,
        }
    }

    pub fn set_name(&self) -> &str {
        &self.set_name
    }

    /// Member asking the question
    pub fn who(&self) -> &HostAndPort {
        &self.who
    }

    /// Replica set member id of the requester
    pub fn client_id(&self) -> i32 {
        self.client_id
    }

    /// Config version the requester is running
    pub fn cfg_version(&self) -> i64 {
        self.cfg_version
    }

    /// Last operation the requester has applied
    pub fn op_time(&self) -> DateTime<Utc> {
        self.op_time
    }

    pub fn last_op_time(&self) -> MongoResult<OpTime> {
        OpTime::from_instant(self.op_time)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplSetFreshReply {
    info: Option<String>,
    op_time: DateTime<Utc>,
    we_are_fresher: bool,
    veto: bool,
}

impl ReplSetFreshReply {
    pub fn new(info: Option<String>, op_time: DateTime<Utc>, we_are_fresher: bool, veto: bool) -> Self {
        Self {
            info,
            op_time,
            we_are_fresher,
            veto,
        }
    }

    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    pub fn op_time(&self) -> DateTime<Utc> {
        self.op_time
    }

    pub fn we_are_fresher(&self) -> bool {
        self.we_are_fresher
    }

    pub fn veto(&self) -> bool {
        self.veto
    }
}

impl Command for ReplSetFreshCommand {
    type Argument = ReplSetFreshArgument;
    type Result = ReplSetFreshReply;

    fn name(&self) -> &'static str {
        "replSetFresh"
    }

    fn unmarshall_arg(&self, doc: &Document) -> MongoResult<ReplSetFreshArgument> {
        let client_id = reader::get(doc, &ID_FIELD)?;
        let set_name = reader::get(doc, &SET_NAME_FIELD)?;
        let who = reader::get_host_and_port(doc, &WHO_FIELD)?;
        let cfg_version = reader::get(doc, &CFG_VER_FIELD)?.as_i64();
        let op_time = reader::get(doc, &OPTIME_FIELD)?;
        OpTime::from_instant(op_time)?;

        Ok(ReplSetFreshArgument::new(set_name, who, client_id, cfg_version, op_time))
    }

    fn marshall_result(&self, result: &ReplSetFreshReply) -> MongoResult<Document> {
        Ok(DocumentBuilder::new()
            .append(&FRESHER_FIELD, &result.we_are_fresher)
            .append_optional(&INFO_FIELD, result.info.as_ref())
            .append(&OPTIME_FIELD, &result.op_time)
            .append(&VETO_FIELD, &result.veto)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, Timestamp};
    use chrono::TimeZone;
    use mongowire_common::{BsonType, Direction, MongoError};

    fn request() -> Document {
        doc! {
            "replSetFresh": 1_i32,
            "set": "rs0",
            "who": "db1:27017",
            "id": 1_i32,
            "cfgver": 3.0,
            "optime": bson::DateTime::from_millis(1_700_000_000_000),
        }
    }

    #[test]
    fn test_argument() {
        let arg = ReplSetFreshCommand.unmarshall_arg(&request()).unwrap();
        assert_eq!(arg.set_name(), "rs0");
        assert_eq!(arg.who(), &HostAndPort::new("db1", 27017));
        assert_eq!(arg.client_id(), 1);
        assert_eq!(arg.cfg_version(), 3);
        assert_eq!(arg.op_time().timestamp(), 1_700_000_000);
        assert_eq!(arg.last_op_time().unwrap(), OpTime::new(1_700_000_000, 0));
    }

    #[test]
    fn test_optime_accepts_timestamp() {
        let mut doc = request();
        doc.insert("optime", Timestamp { time: 50, increment: 2 });
        let arg = ReplSetFreshCommand.unmarshall_arg(&doc).unwrap();
        assert_eq!(arg.op_time().timestamp(), 50);
    }

    #[test]
    fn test_optime_before_epoch_rejected() {
        let mut doc = request();
        doc.insert("optime", bson::DateTime::from_millis(-1_000));
        assert!(matches!(
            ReplSetFreshCommand.unmarshall_arg(&doc).unwrap_err(),
            MongoError::BadValue(_)
        ));
    }

    #[test]
    fn test_argument_errors() {
        let mut doc = request();
        doc.remove("who");
        assert_eq!(
            ReplSetFreshCommand.unmarshall_arg(&doc).unwrap_err(),
            MongoError::no_such_key("who")
        );

        let mut doc = request();
        doc.insert("cfgver", "three");
        let err = ReplSetFreshCommand.unmarshall_arg(&doc).unwrap_err();
        assert_eq!(err.found_type(), Some(BsonType::String));
        assert_eq!(err.to_string(), "cfgver: field must be of type number, not string");

        let mut doc = request();
        doc.insert("who", "db1:notaport");
        assert!(matches!(
            ReplSetFreshCommand.unmarshall_arg(&doc).unwrap_err(),
            MongoError::BadValue(_)
        ));
    }

    #[test]
    fn test_reply_shape() {
        let op_time = Utc.timestamp_millis_opt(1_700_000_000_500).single().unwrap();
        let with_info = ReplSetFreshReply::new(Some("not electable".to_string()), op_time, true, false);
        assert_eq!(
            ReplSetFreshCommand.marshall_result(&with_info).unwrap(),
            doc! {
                "fresher": true,
                "info": "not electable",
                "optime": bson::DateTime::from_millis(1_700_000_000_500),
                "veto": false,
            }
        );

        let without_info = ReplSetFreshReply::new(None, op_time, false, true);
        let doc = ReplSetFreshCommand.marshall_result(&without_info).unwrap();
        assert!(!doc.contains_key("info"));
        assert!(doc.get_bool("veto").unwrap());
    }

    #[test]
    fn test_only_server_directions() {
        assert!(ReplSetFreshCommand.supports(Direction::UnmarshallArg));
        assert!(!ReplSetFreshCommand.supports(Direction::UnmarshallResult));
        assert!(ReplSetFreshCommand
            .unmarshall_result(&doc! { "fresher": false })
            .unwrap_err()
            .is_unsupported());
    }
}
