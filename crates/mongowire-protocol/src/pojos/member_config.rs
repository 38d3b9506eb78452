//! Replica set member configuration

use bson::{Bson, Document};
use mongowire_common::{BsonType, MongoError, MongoResult};

use crate::fields::{bson_type, reader, BsonField, DocumentBuilder, Number};
use crate::host_and_port::HostAndPort;

const ID_FIELD: BsonField<i32> = BsonField::new("_id");
const HOST_FIELD: BsonField<String> = BsonField::new("host");
const ARBITER_ONLY_FIELD: BsonField<bool> = BsonField::new("arbiterOnly");
const BUILD_INDEXES_FIELD: BsonField<bool> = BsonField::new("buildIndexes");
const HIDDEN_FIELD: BsonField<bool> = BsonField::new("hidden");
const PRIORITY_FIELD: BsonField<Number> = BsonField::new("priority");
const SLAVE_DELAY_FIELD: BsonField<Number> = BsonField::new("slaveDelay");
const VOTES_FIELD: BsonField<Number> = BsonField::new("votes");
const TAGS_FIELD: BsonField<Document> = BsonField::new("tags");

const ALLOWED_FIELDS: &[&str] = &[
    "_id",
    "host",
    "arbiterOnly",
    "buildIndexes",
    "hidden",
    "priority",
    "slaveDelay",
    "votes",
    "tags",
];

const MAX_PRIORITY: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MemberConfig {
    id: i32,
    host: HostAndPort,
    arbiter_only: bool,
    build_indexes: bool,
    hidden: bool,
    priority: f64,
    slave_delay_secs: i64,
    votes: i32,
    tags: Vec<(String, String)>,
}

impl MemberConfig {
    /// A voting, electable member with MongoDB's defaults
    pub fn new(id: i32, host: HostAndPort) -> Self {
        Self {
            id,
            host,
            arbiter_only: false,
            build_indexes: true,
            hidden: false,
            priority: 1.0,
            slave_delay_secs: 0,
            votes: 1,
            tags: Vec::new(),
        }
    }

    /// Check that the option combination is one MongoDB accepts
    pub fn validated(self) -> MongoResult<Self> {
        if !(0.0..=MAX_PRIORITY).contains(&self.priority) {
            return Err(MongoError::bad_value(format!(
                "priority field value of {} is out of range",
                self.priority
            )));
        }
        if !(0..=1).contains(&self.votes) {
            return Err(MongoError::bad_value(format!(
                "votes field value is {} but must be 0 or 1",
                self.votes
            )));
        }
        if self.slave_delay_secs < 0 {
            return Err(MongoError::bad_value(format!(
                "slaveDelay field value of {} seconds is out of range",
                self.slave_delay_secs
            )));
        }
        if self.priority != 0.0 && (self.hidden || self.slave_delay_secs > 0 || self.arbiter_only) {
            return Err(MongoError::bad_value(format!(
                "priority must be 0 when hidden, delayed or an arbiter (member {})",
                self.id
            )));
        }
        if self.arbiter_only && !self.tags.is_empty() {
            return Err(MongoError::bad_value("Cannot set tags on arbiters."));
        }
        Ok(self)
    }

    #[must_use]
    pub fn with_arbiter_only(mut self, arbiter_only: bool) -> Self {
        self.arbiter_only = arbiter_only;
        self
    }

    #[must_use]
    pub fn with_build_indexes(mut self, build_indexes: bool) -> Self {
        self.build_indexes = build_indexes;
        self
    }

    #[must_use]
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_slave_delay_secs(mut self, secs: i64) -> Self {
        self.slave_delay_secs = secs;
        self
    }

    #[must_use]
    pub fn with_votes(mut self, votes: i32) -> Self {
        self.votes = votes;
        self
    }

    #[must_use]
    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((name.into(), value.into()));
        self
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn host(&self) -> &HostAndPort {
        &self.host
    }

    pub fn is_arbiter_only(&self) -> bool {
        self.arbiter_only
    }

    pub fn builds_indexes(&self) -> bool {
        self.build_indexes
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub fn slave_delay_secs(&self) -> i64 {
        self.slave_delay_secs
    }

    pub fn votes(&self) -> i32 {
        self.votes
    }

    pub fn is_voter(&self) -> bool {
        self.votes > 0
    }

    pub fn is_electable(&self) -> bool {
        !self.arbiter_only && self.priority > 0.0
    }

    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    pub fn from_document(doc: &Document) -> MongoResult<Self> {
        reader::check_only_has_fields("MemberConfig", doc, ALLOWED_FIELDS)?;

        let host = HostAndPort::parse(&reader::get(doc, &HOST_FIELD)?)?;
        let mut config = Self::new(reader::get(doc, &ID_FIELD)?, host)
            .with_arbiter_only(reader::get_boolean_or_numeric(doc, &ARBITER_ONLY_FIELD, false)?)
            .with_build_indexes(reader::get_boolean_or_numeric(doc, &BUILD_INDEXES_FIELD, true)?)
            .with_hidden(reader::get_boolean_or_numeric(doc, &HIDDEN_FIELD, false)?)
            .with_priority(reader::get_or(doc, &PRIORITY_FIELD, Number::Double(1.0))?.as_f64())
            .with_slave_delay_secs(reader::get_or(doc, &SLAVE_DELAY_FIELD, Number::Int32(0))?.as_i64())
            .with_votes(reader::get_or(doc, &VOTES_FIELD, Number::Int32(1))?.as_i32());

        if let Some(tags) = reader::get_optional_document(doc, &TAGS_FIELD)? {
            for (name, value) in tags {
                let value = value.as_str().ok_or_else(|| {
                    MongoError::types_mismatch(format!("tags.{name}"), BsonType::String, bson_type(value))
                })?;
                config = config.with_tag(name.clone(), value);
            }
        }

        config.validated()
    }

    pub fn to_document(&self) -> Document {
        let tags: Document = self
            .tags
            .iter()
            .map(|(name, value)| (name.clone(), Bson::String(value.clone())))
            .collect();

        DocumentBuilder::new()
            .append(&ID_FIELD, &self.id)
            .append(&HOST_FIELD, &self.host.to_string())
            .append(&ARBITER_ONLY_FIELD, &self.arbiter_only)
            .append(&BUILD_INDEXES_FIELD, &self.build_indexes)
            .append(&HIDDEN_FIELD, &self.hidden)
            .append(&PRIORITY_FIELD, &Number::Double(self.priority))
            .append(&SLAVE_DELAY_FIELD, &Number::Int64(self.slave_delay_secs))
            .append(&VOTES_FIELD, &Number::Int32(self.votes))
            .append(&TAGS_FIELD, &tags)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_defaults() {
        let config = MemberConfig::from_document(&doc! { "_id": 0_i32, "host": "db1:27017" }).unwrap();
        assert_eq!(config.host(), &HostAndPort::new("db1", 27017));
        assert!(config.builds_indexes());
        assert!(config.is_voter());
        assert!(config.is_electable());
        assert_eq!(config.priority(), 1.0);
        assert!(config.tags().is_empty());
    }

    #[test]
    fn test_document_round_trip() {
        let config = MemberConfig::new(3, HostAndPort::new("db3", 27019))
            .with_hidden(true)
            .with_priority(0.0)
            .with_slave_delay_secs(60)
            .with_tag("dc", "east")
            .validated()
            .unwrap();

        let doc = config.to_document();
        assert_eq!(doc.get_document("tags").unwrap(), &doc! { "dc": "east" });
        assert_eq!(MemberConfig::from_document(&doc).unwrap(), config);
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = MemberConfig::from_document(&doc! { "_id": 0_i32, "host": "h", "priorty": 2_i32 })
            .unwrap_err();
        assert!(matches!(err, MongoError::FailedToParse(_)));
        assert!(err.to_string().contains("'priorty'"));
    }

    #[test]
    fn test_validation() {
        let hidden_with_priority = doc! { "_id": 1_i32, "host": "h", "hidden": true };
        assert!(matches!(
            MemberConfig::from_document(&hidden_with_priority).unwrap_err(),
            MongoError::BadValue(_)
        ));

        let too_many_votes = doc! { "_id": 1_i32, "host": "h", "votes": 2_i32 };
        assert_eq!(
            MemberConfig::from_document(&too_many_votes).unwrap_err().to_string(),
            "votes field value is 2 but must be 0 or 1"
        );

        let bad_tag = doc! { "_id": 1_i32, "host": "h", "tags": { "dc": 1_i32 } };
        assert_eq!(
            MemberConfig::from_document(&bad_tag).unwrap_err().to_string(),
            "tags.dc: field must be of type string, not int"
        );
    }
}
