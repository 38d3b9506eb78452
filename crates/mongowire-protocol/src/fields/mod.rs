//! Typed access to wire document fields

mod builder;
mod descriptor;
mod number;
pub mod reader;

pub use builder::DocumentBuilder;
pub use descriptor::{bson_type, BsonField, FieldValue};
pub use number::Number;
