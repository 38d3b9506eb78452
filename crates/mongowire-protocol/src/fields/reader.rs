//! Typed field accessors over wire documents
//!
//! Every failure names the field and, for type errors, both the expected
//! and the found wire type.

use bson::{Bson, Document};
use mongowire_common::{BsonType, MongoError, MongoResult};

use super::descriptor::{bson_type, BsonField, FieldValue};
use super::number::Number;
use crate::host_and_port::HostAndPort;

/// Raw value of a required key
pub fn get_value<'a>(doc: &'a Document, name: &str) -> MongoResult<&'a Bson> {
    doc.get(name).ok_or_else(|| MongoError::no_such_key(name))
}

fn convert<T: FieldValue>(name: &str, value: &Bson) -> MongoResult<T> {
    T::from_bson(value)
        .ok_or_else(|| MongoError::types_mismatch(name, T::EXPECTED, bson_type(value)))
}

/// Read a required field
pub fn get<T: FieldValue>(doc: &Document, field: &BsonField<T>) -> MongoResult<T> {
    convert(field.name(), get_value(doc, field.name())?)
}

/// Read a field, falling back to `default` when the key is absent
pub fn get_or<T: FieldValue>(doc: &Document, field: &BsonField<T>, default: T) -> MongoResult<T> {
    Ok(get_optional(doc, field)?.unwrap_or(default))
}

/// Read a field that may be absent
pub fn get_optional<T: FieldValue>(doc: &Document, field: &BsonField<T>) -> MongoResult<Option<T>> {
    doc.get(field.name())
        .map(|value| convert(field.name(), value))
        .transpose()
}

/// Read a boolean, treating any non-zero number as `true`
pub fn get_boolean_or_numeric(
    doc: &Document,
    field: &BsonField<bool>,
    default: bool,
) -> MongoResult<bool> {
    match doc.get(field.name()) {
        None => Ok(default),
        Some(Bson::Boolean(b)) => Ok(*b),
        Some(value) => Number::from_bson(value)
            .map(|n| !n.is_zero())
            .ok_or_else(|| {
                MongoError::types_mismatch(field.name(), BsonType::Boolean, bson_type(value))
            }),
    }
}

/// Borrow a nested document without copying it
pub fn get_document<'a>(doc: &'a Document, field: &BsonField<Document>) -> MongoResult<&'a Document> {
    let value = get_value(doc, field.name())?;
    value.as_document().ok_or_else(|| {
        MongoError::types_mismatch(field.name(), BsonType::Document, bson_type(value))
    })
}

pub fn get_optional_document<'a>(
    doc: &'a Document,
    field: &BsonField<Document>,
) -> MongoResult<Option<&'a Document>> {
    if doc.contains_key(field.name()) {
        get_document(doc, field).map(Some)
    } else {
        Ok(None)
    }
}

/// Read a `host:port` string
pub fn get_host_and_port(doc: &Document, field: &BsonField<String>) -> MongoResult<HostAndPort> {
    let value = get(doc, field)?;
    HostAndPort::parse(&value)
}

/// Fail if `doc` has any key outside `allowed`
pub fn check_only_has_fields(context: &str, doc: &Document, allowed: &[&str]) -> MongoResult<()> {
    match doc.keys().find(|key| !allowed.contains(&key.as_str())) {
        None => Ok(()),
        Some(key) => Err(MongoError::failed_to_parse(format!(
            "{context}: unexpected field '{key}', only {{{}}} are allowed",
            allowed.join(", ")
        ))),
    }
}
