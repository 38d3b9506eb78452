//! Common type definitions for mongowire

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire value types, named with MongoDB's `$type` aliases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BsonType {
    Double,
    String,
    Document,
    Array,
    Binary,
    Undefined,
    ObjectId,
    Boolean,
    DateTime,
    Null,
    RegularExpression,
    DbPointer,
    JavaScriptCode,
    Symbol,
    JavaScriptCodeWithScope,
    Int32,
    Timestamp,
    Int64,
    Decimal128,
    MinKey,
    MaxKey,
    /// Any of the numeric types (int, long, double, decimal)
    Number,
}

impl BsonType {
    pub fn alias(self) -> &'static str {
        match self {
            BsonType::Double => "double",
            BsonType::String => "string",
            BsonType::Document => "object",
            BsonType::Array => "array",
            BsonType::Binary => "binData",
            BsonType::Undefined => "undefined",
            BsonType::ObjectId => "objectId",
            BsonType::Boolean => "bool",
            BsonType::DateTime => "date",
            BsonType::Null => "null",
            BsonType::RegularExpression => "regex",
            BsonType::DbPointer => "dbPointer",
            BsonType::JavaScriptCode => "javascript",
            BsonType::Symbol => "symbol",
            BsonType::JavaScriptCodeWithScope => "javascriptWithScope",
            BsonType::Int32 => "int",
            BsonType::Timestamp => "timestamp",
            BsonType::Int64 => "long",
            BsonType::Decimal128 => "decimal",
            BsonType::MinKey => "minKey",
            BsonType::MaxKey => "maxKey",
            BsonType::Number => "number",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            BsonType::Double
                | BsonType::Int32
                | BsonType::Int64
                | BsonType::Decimal128
                | BsonType::Number
        )
    }
}

impl fmt::Display for BsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}
