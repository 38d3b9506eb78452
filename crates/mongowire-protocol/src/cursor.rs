//! Cursor framing: `{id, ns, firstBatch}`
//!
//! The codec is generic over the item type; callers pass the per-item
//! marshall/unmarshall functions.

use bson::{Bson, Document};
use mongowire_common::{BsonType, MongoError, MongoResult};

use crate::fields::{bson_type, reader, BsonField, DocumentBuilder};

const ID_FIELD: BsonField<i64> = BsonField::new("id");
const NS_FIELD: BsonField<String> = BsonField::new("ns");
const FIRST_BATCH_FIELD: BsonField<Vec<Bson>> = BsonField::new("firstBatch");

/// First batch of a server-side cursor
#[derive(Debug, Clone, PartialEq)]
pub struct MongoCursor<T> {
    id: i64,
    namespace: String,
    first_batch: Vec<T>,
}

impl<T> MongoCursor<T> {
    pub fn new(id: i64, namespace: impl Into<String>, first_batch: Vec<T>) -> Self {
        Self {
            id,
            namespace: namespace.into(),
            first_batch,
        }
    }

    /// A cursor whose whole result fits in the first batch
    pub fn exhausted(namespace: impl Into<String>, first_batch: Vec<T>) -> Self {
        Self::new(0, namespace, first_batch)
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn first_batch(&self) -> &[T] {
        &self.first_batch
    }

    pub fn into_first_batch(self) -> Vec<T> {
        self.first_batch
    }

    /// No server-side cursor is left open
    pub fn is_exhausted(&self) -> bool {
        self.id == 0
    }
}

/// Encode a cursor, converting each item with `marshall_item`
pub fn marshall_cursor<T, F>(cursor: &MongoCursor<T>, marshall_item: F) -> MongoResult<Document>
where
    F: Fn(&T) -> MongoResult<Bson>,
{
    let batch = cursor
        .first_batch
        .iter()
        .map(marshall_item)
        .collect::<MongoResult<Vec<_>>>()?;

    Ok(DocumentBuilder::new()
        .append(&ID_FIELD, &cursor.id)
        .append(&NS_FIELD, &cursor.namespace)
        .append(&FIRST_BATCH_FIELD, &batch)
        .build())
}

/// Decode a cursor, converting each item with `unmarshall_item`
pub fn unmarshall_cursor<T, F>(doc: &Document, unmarshall_item: F) -> MongoResult<MongoCursor<T>>
where
    F: Fn(&Bson) -> MongoResult<T>,
{
    let id = reader::get(doc, &ID_FIELD)?;
    let namespace = reader::get(doc, &NS_FIELD)?;

    let batch_value = reader::get_value(doc, FIRST_BATCH_FIELD.name())?;
    let batch = batch_value.as_array().ok_or_else(|| {
        MongoError::types_mismatch(FIRST_BATCH_FIELD.name(), BsonType::Array, bson_type(batch_value))
    })?;
    let first_batch = batch
        .iter()
        .map(unmarshall_item)
        .collect::<MongoResult<Vec<_>>>()?;

    Ok(MongoCursor::new(id, namespace, first_batch))
}
