//! Typed field descriptors

use std::fmt;
use std::marker::PhantomData;

use bson::oid::ObjectId;
use bson::{Bson, Document, Timestamp};
use chrono::{DateTime, TimeZone, Utc};
use mongowire_common::BsonType;

use super::number::Number;

/// Wire type of a value
pub fn bson_type(value: &Bson) -> BsonType {
    match value {
        Bson::Double(_) => BsonType::Double,
        Bson::String(_) => BsonType::String,
        Bson::Array(_) => BsonType::Array,
        Bson::Document(_) => BsonType::Document,
        Bson::Boolean(_) => BsonType::Boolean,
        Bson::Null => BsonType::Null,
        Bson::RegularExpression(_) => BsonType::RegularExpression,
        Bson::JavaScriptCode(_) => BsonType::JavaScriptCode,
        Bson::JavaScriptCodeWithScope(_) => BsonType::JavaScriptCodeWithScope,
        Bson::Int32(_) => BsonType::Int32,
        Bson::Int64(_) => BsonType::Int64,
        Bson::Timestamp(_) => BsonType::Timestamp,
        Bson::Binary(_) => BsonType::Binary,
        Bson::ObjectId(_) => BsonType::ObjectId,
        Bson::DateTime(_) => BsonType::DateTime,
        Bson::Symbol(_) => BsonType::Symbol,
        Bson::Decimal128(_) => BsonType::Decimal128,
        Bson::Undefined => BsonType::Undefined,
        Bson::MaxKey => BsonType::MaxKey,
        Bson::MinKey => BsonType::MinKey,
        Bson::DbPointer(_) => BsonType::DbPointer,
    }
}

/// A Rust type that can be read from and written to a single wire value
pub trait FieldValue: Sized {
    /// Type reported when a wire value cannot be converted
    const EXPECTED: BsonType;

    fn from_bson(value: &Bson) -> Option<Self>;

    fn to_bson(&self) -> Bson;
}

impl FieldValue for String {
    const EXPECTED: BsonType = BsonType::String;

    fn from_bson(value: &Bson) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }

    fn to_bson(&self) -> Bson {
        Bson::String(self.clone())
    }
}

impl FieldValue for i32 {
    const EXPECTED: BsonType = BsonType::Int32;

    fn from_bson(value: &Bson) -> Option<Self> {
        value.as_i32()
    }

    fn to_bson(&self) -> Bson {
        Bson::Int32(*self)
    }
}

/// Accepts 32-bit integers as well
impl FieldValue for i64 {
    const EXPECTED: BsonType = BsonType::Int64;

    fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::Int64(v) => Some(*v),
            Bson::Int32(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    fn to_bson(&self) -> Bson {
        Bson::Int64(*self)
    }
}

impl FieldValue for f64 {
    const EXPECTED: BsonType = BsonType::Double;

    fn from_bson(value: &Bson) -> Option<Self> {
        value.as_f64()
    }

    fn to_bson(&self) -> Bson {
        Bson::Double(*self)
    }
}

impl FieldValue for bool {
    const EXPECTED: BsonType = BsonType::Boolean;

    fn from_bson(value: &Bson) -> Option<Self> {
        value.as_bool()
    }

    fn to_bson(&self) -> Bson {
        Bson::Boolean(*self)
    }
}

impl FieldValue for Number {
    const EXPECTED: BsonType = BsonType::Number;

    fn from_bson(value: &Bson) -> Option<Self> {
        Number::from_bson(value)
    }

    fn to_bson(&self) -> Bson {
        Number::to_bson(*self)
    }
}

impl FieldValue for Document {
    const EXPECTED: BsonType = BsonType::Document;

    fn from_bson(value: &Bson) -> Option<Self> {
        value.as_document().cloned()
    }

    fn to_bson(&self) -> Bson {
        Bson::Document(self.clone())
    }
}

impl FieldValue for ObjectId {
    const EXPECTED: BsonType = BsonType::ObjectId;

    fn from_bson(value: &Bson) -> Option<Self> {
        value.as_object_id()
    }

    fn to_bson(&self) -> Bson {
        Bson::ObjectId(*self)
    }
}

impl FieldValue for Timestamp {
    const EXPECTED: BsonType = BsonType::Timestamp;

    fn from_bson(value: &Bson) -> Option<Self> {
        value.as_timestamp()
    }

    fn to_bson(&self) -> Bson {
        Bson::Timestamp(*self)
    }
}

/// Absolute instant, read from either a datetime or a timestamp
impl FieldValue for DateTime<Utc> {
    const EXPECTED: BsonType = BsonType::DateTime;

    fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::DateTime(dt) => Utc.timestamp_millis_opt(dt.timestamp_millis()).single(),
            Bson::Timestamp(ts) => Utc.timestamp_opt(i64::from(ts.time), 0).single(),
            _ => None,
        }
    }

    fn to_bson(&self) -> Bson {
        Bson::DateTime(bson::DateTime::from_millis(self.timestamp_millis()))
    }
}

impl FieldValue for Vec<Bson> {
    const EXPECTED: BsonType = BsonType::Array;

    fn from_bson(value: &Bson) -> Option<Self> {
        value.as_array().cloned()
    }

    fn to_bson(&self) -> Bson {
        Bson::Array(self.clone())
    }
}

/// A (name, expected type) pair describing one key of a wire document
pub struct BsonField<T> {
    name: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> BsonField<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _type: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: FieldValue> BsonField<T> {
    pub fn expected_type(&self) -> BsonType {
        T::EXPECTED
    }
}

impl<T> Clone for BsonField<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BsonField<T> {}

impl<T> fmt::Debug for BsonField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BsonField").field(&self.name).finish()
    }
}
