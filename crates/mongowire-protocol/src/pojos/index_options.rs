//! Index descriptions as returned by `listIndexes`

use bson::{Bson, Document};
use mongowire_common::{BsonType, MongoError, MongoResult};
use tracing::warn;

use crate::fields::{bson_type, reader, BsonField, DocumentBuilder, Number};

const VERSION_FIELD: BsonField<Number> = BsonField::new("v");
const KEY_FIELD: BsonField<Document> = BsonField::new("key");
const NAME_FIELD: BsonField<String> = BsonField::new("name");
const NAMESPACE_FIELD: BsonField<String> = BsonField::new("ns");
const UNIQUE_FIELD: BsonField<bool> = BsonField::new("unique");
const SPARSE_FIELD: BsonField<bool> = BsonField::new("sparse");
const BACKGROUND_FIELD: BsonField<bool> = BsonField::new("background");
const EXPIRE_AFTER_SECONDS_FIELD: BsonField<Number> = BsonField::new("expireAfterSeconds");

const KNOWN_FIELDS: &[&str] = &[
    "v",
    "key",
    "name",
    "ns",
    "unique",
    "sparse",
    "background",
    "expireAfterSeconds",
];

/// Default index version written by MongoDB 3.0
pub const DEFAULT_INDEX_VERSION: i32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexOptions {
    version: i32,
    name: String,
    namespace: String,
    key: Document,
    unique: bool,
    sparse: bool,
    background: bool,
    expire_after_seconds: Option<i64>,
    other: Document,
}

impl IndexOptions {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, key: Document) -> Self {
        Self {
            version: DEFAULT_INDEX_VERSION,
            name: name.into(),
            namespace: namespace.into(),
            key,
            unique: false,
            sparse: false,
            background: false,
            expire_after_seconds: None,
            other: Document::new(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    #[must_use]
    pub fn with_sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    #[must_use]
    pub fn with_expire_after_seconds(mut self, seconds: i64) -> Self {
        self.expire_after_seconds = Some(seconds);
        self
    }

    /// Keep an option this type has no field for.
    ///
    /// Names that have a typed field (`unique`, `v`, ...) are ignored; use
    /// their own setters.
    #[must_use]
    pub fn with_other(mut self, name: impl Into<String>, value: impl Into<Bson>) -> Self {
        let name = name.into();
        if KNOWN_FIELDS.contains(&name.as_str()) {
            warn!(option = %name, index = %self.name, "ignoring typed index option passed as extra option");
            return self;
        }
        self.other.insert(name, value);
        self
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key(&self) -> &Document {
        &self.key
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_sparse(&self) -> bool {
        self.sparse
    }

    pub fn is_background(&self) -> bool {
        self.background
    }

    pub fn expire_after_seconds(&self) -> Option<i64> {
        self.expire_after_seconds
    }

    pub fn other(&self) -> &Document {
        &self.other
    }

    /// Encode as a `listIndexes` batch item
    pub fn marshall(&self) -> MongoResult<Bson> {
        if self.key.is_empty() {
            return Err(MongoError::bad_value(format!(
                "index '{}' has an empty key pattern",
                self.name
            )));
        }

        let mut builder = DocumentBuilder::new()
            .append(&VERSION_FIELD, &Number::Int32(self.version))
            .append(&KEY_FIELD, &self.key)
            .append(&NAME_FIELD, &self.name)
            .append(&NAMESPACE_FIELD, &self.namespace);
        for (field, value) in [
            (&UNIQUE_FIELD, self.unique),
            (&SPARSE_FIELD, self.sparse),
            (&BACKGROUND_FIELD, self.background),
        ] {
            if value {
                builder = builder.append(field, &true);
            }
        }
        builder = builder.append_optional(
            &EXPIRE_AFTER_SECONDS_FIELD,
            self.expire_after_seconds.map(Number::Int64).as_ref(),
        );
        for (name, value) in &self.other {
            builder = builder.append_raw(name.clone(), value.clone());
        }

        Ok(Bson::Document(builder.build()))
    }

    /// Decode a `listIndexes` batch item
    pub fn unmarshall(value: &Bson) -> MongoResult<Self> {
        let doc = value
            .as_document()
            .ok_or_else(|| MongoError::types_mismatch("firstBatch", BsonType::Document, bson_type(value)))?;

        let key = reader::get_document(doc, &KEY_FIELD)?.clone();
        if key.is_empty() {
            return Err(MongoError::bad_value("index key pattern must not be empty"));
        }

        let other = doc
            .iter()
            .filter(|(name, _)| !KNOWN_FIELDS.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Ok(Self {
            version: reader::get_or(doc, &VERSION_FIELD, Number::Int32(DEFAULT_INDEX_VERSION))?.as_i32(),
            name: reader::get(doc, &NAME_FIELD)?,
            namespace: reader::get(doc, &NAMESPACE_FIELD)?,
            key,
            unique: reader::get_boolean_or_numeric(doc, &UNIQUE_FIELD, false)?,
            sparse: reader::get_boolean_or_numeric(doc, &SPARSE_FIELD, false)?,
            background: reader::get_boolean_or_numeric(doc, &BACKGROUND_FIELD, false)?,
            expire_after_seconds: reader::get_optional(doc, &EXPIRE_AFTER_SECONDS_FIELD)?
                .map(Number::as_i64),
            other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_marshall_shape() {
        let options = IndexOptions::new("ttl_1", "db.events", doc! { "ttl": 1_i32 })
            .with_unique(true)
            .with_expire_after_seconds(3600)
            .with_other("partialFilterExpression", doc! { "a": { "$gt": 5_i32 } });

        let value = options.marshall().unwrap();
        assert_eq!(
            value,
            Bson::Document(doc! {
                "v": 1_i32,
                "key": { "ttl": 1_i32 },
                "name": "ttl_1",
                "ns": "db.events",
                "unique": true,
                "expireAfterSeconds": 3600_i64,
                "partialFilterExpression": { "a": { "$gt": 5_i32 } },
            })
        );
        assert_eq!(IndexOptions::unmarshall(&value).unwrap(), options);
    }

    #[test]
    fn test_extra_options_cannot_shadow_typed_fields() {
        let options = IndexOptions::new("email_1", "db.users", doc! { "email": 1_i32 })
            .with_other("unique", true)
            .with_other("v", 2_i32)
            .with_other("collation", doc! { "locale": "fr" });

        assert!(!options.is_unique());
        assert_eq!(options.version(), DEFAULT_INDEX_VERSION);
        assert_eq!(options.other(), &doc! { "collation": { "locale": "fr" } });

        let value = options.marshall().unwrap();
        assert_eq!(IndexOptions::unmarshall(&value).unwrap(), options);
    }

    #[test]
    fn test_unmarshall_defaults_and_coercion() {
        let value = Bson::Document(doc! {
            "key": { "_id": 1_i32 },
            "name": "_id_",
            "ns": "db.c",
            "sparse": 1_i32,
            "expireAfterSeconds": 10.0,
        });
        let options = IndexOptions::unmarshall(&value).unwrap();
        assert_eq!(options.version(), DEFAULT_INDEX_VERSION);
        assert!(options.is_sparse());
        assert!(!options.is_unique());
        assert_eq!(options.expire_after_seconds(), Some(10));
        assert!(options.other().is_empty());
    }

    #[test]
    fn test_empty_key_pattern_rejected() {
        let options = IndexOptions::new("bad", "db.c", Document::new());
        assert!(matches!(options.marshall().unwrap_err(), MongoError::BadValue(_)));

        let value = Bson::Document(doc! { "key": {}, "name": "bad", "ns": "db.c" });
        assert!(matches!(IndexOptions::unmarshall(&value).unwrap_err(), MongoError::BadValue(_)));
    }

    #[test]
    fn test_unmarshall_type_errors() {
        let err = IndexOptions::unmarshall(&Bson::Int32(1)).unwrap_err();
        assert_eq!(err.found_type(), Some(BsonType::Int32));

        let value = Bson::Document(doc! { "key": { "a": 1_i32 }, "ns": "db.c" });
        assert_eq!(IndexOptions::unmarshall(&value).unwrap_err(), MongoError::no_such_key("name"));
    }
}
