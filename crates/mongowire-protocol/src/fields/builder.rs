//! Wire document builder

use bson::{Bson, Document};

use super::descriptor::{BsonField, FieldValue};

/// Appends typed fields in order and produces a wire document
#[derive(Debug, Default, Clone)]
pub struct DocumentBuilder {
    doc: Document,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append<T: FieldValue>(mut self, field: &BsonField<T>, value: &T) -> Self {
        self.doc.insert(field.name(), value.to_bson());
        self
    }

    /// Append only when a value is present
    pub fn append_optional<T: FieldValue>(self, field: &BsonField<T>, value: Option<&T>) -> Self {
        match value {
            Some(value) => self.append(field, value),
            None => self,
        }
    }

    /// Append a key not known until runtime
    pub fn append_raw(mut self, name: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.doc.insert(name, value);
        self
    }

    pub fn build(self) -> Document {
        self.doc
    }
}
