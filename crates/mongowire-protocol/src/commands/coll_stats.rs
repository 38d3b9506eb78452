//! `collStats`

use std::num::NonZeroU32;

use bson::Document;
use mongowire_common::{MongoError, MongoResult};

use crate::command::Command;
use crate::fields::{reader, BsonField, DocumentBuilder, Number};

const COLLECTION_FIELD: BsonField<String> = BsonField::new("collStats");
const SCALE_FIELD: BsonField<Number> = BsonField::new("scale");
const VERBOSE_FIELD: BsonField<bool> = BsonField::new("verbose");

const NS_FIELD: BsonField<String> = BsonField::new("ns");
const COUNT_FIELD: BsonField<Number> = BsonField::new("count");
const SIZE_FIELD: BsonField<Number> = BsonField::new("size");
const AVG_OBJ_SIZE_FIELD: BsonField<Number> = BsonField::new("avgObjSize");
const STORAGE_SIZE_FIELD: BsonField<Number> = BsonField::new("storageSize");
const N_INDEXES_FIELD: BsonField<Number> = BsonField::new("nindexes");
const INDEX_DETAILS_FIELD: BsonField<Document> = BsonField::new("indexDetails");
const TOTAL_INDEX_SIZE_FIELD: BsonField<Number> = BsonField::new("totalIndexSize");
const INDEX_SIZES_FIELD: BsonField<Document> = BsonField::new("indexSizes");
const CAPPED_FIELD: BsonField<bool> = BsonField::new("capped");
const MAX_FIELD: BsonField<Number> = BsonField::new("max");

#[derive(Debug, Clone, Copy, Default)]
pub struct CollStatsCommand;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollStatsArgument {
    collection: String,
    scale: NonZeroU32,
    verbose: bool,
}

impl CollStatsArgument {
    pub fn new(collection: impl Into<String>, scale: NonZeroU32, verbose: bool) -> Self {
        Self {
            collection: collection.into(),
            scale,
            verbose,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn scale(&self) -> NonZeroU32 {
        self.scale
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Document counts and byte sizes of a collection, already scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectionSizes {
    pub count: u64,
    pub size: u64,
    pub storage_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capping {
    #[default]
    Uncapped,
    Capped { max: Option<u64> },
}

/// Per-index statistics, in index order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexStats {
    pub details: Document,
    pub size_by_index: Vec<(String, u64)>,
}

impl IndexStats {
    pub fn total_size(&self) -> Option<u64> {
        self.size_by_index
            .iter()
            .try_fold(0u64, |total, (_, size)| total.checked_add(*size))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollStatsReply {
    scale: NonZeroU32,
    database: String,
    collection: String,
    sizes: CollectionSizes,
    capping: Capping,
    indexes: IndexStats,
}

impl CollStatsReply {
    pub fn new(
        scale: NonZeroU32,
        database: impl Into<String>,
        collection: impl Into<String>,
        sizes: CollectionSizes,
        capping: Capping,
        indexes: IndexStats,
    ) -> Self {
        Self {
            scale,
            database: database.into(),
            collection: collection.into(),
            sizes,
            capping,
            indexes,
        }
    }

    pub fn scale(&self) -> NonZeroU32 {
        self.scale
    }

    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.collection)
    }

    pub fn sizes(&self) -> &CollectionSizes {
        &self.sizes
    }

    pub fn capping(&self) -> Capping {
        self.capping
    }

    pub fn indexes(&self) -> &IndexStats {
        &self.indexes
    }

    /// `scale * size / count`, absent for an empty collection
    pub fn avg_obj_size(&self) -> MongoResult<Option<u64>> {
        if self.sizes.count == 0 {
            return Ok(None);
        }
        u64::from(self.scale.get())
            .checked_mul(self.sizes.size)
            .map(|scaled| Some(scaled / self.sizes.count))
            .ok_or_else(|| MongoError::bad_value("avgObjSize overflows a 64-bit integer"))
    }

    fn marshall(&self) -> MongoResult<Document> {
        let mut index_sizes = DocumentBuilder::new();
        for (name, size) in &self.indexes.size_by_index {
            index_sizes = index_sizes.append_raw(name.clone(), Number::from_u64(*size)?.to_bson());
        }
        let total_index_size = self
            .indexes
            .total_size()
            .ok_or_else(|| MongoError::bad_value("totalIndexSize overflows a 64-bit integer"))?;
        let index_count = Number::from_u64(self.indexes.size_by_index.len() as u64)?;

        let mut builder = DocumentBuilder::new()
            .append(&NS_FIELD, &self.namespace())
            .append(&COUNT_FIELD, &Number::from_u64(self.sizes.count)?)
            .append(&SIZE_FIELD, &Number::from_u64(self.sizes.size)?);
        if let Some(avg) = self.avg_obj_size()? {
            builder = builder.append(&AVG_OBJ_SIZE_FIELD, &Number::from_u64(avg)?);
        }
        builder = builder
            .append(&STORAGE_SIZE_FIELD, &Number::from_u64(self.sizes.storage_size)?)
            .append(&N_INDEXES_FIELD, &index_count)
            .append(&INDEX_DETAILS_FIELD, &self.indexes.details)
            .append(&TOTAL_INDEX_SIZE_FIELD, &Number::from_u64(total_index_size)?)
            .append(&INDEX_SIZES_FIELD, &index_sizes.build())
            .append(&CAPPED_FIELD, &matches!(self.capping, Capping::Capped { .. }));
        if let Capping::Capped { max: Some(max) } = self.capping {
            builder = builder.append(&MAX_FIELD, &Number::from_u64(max)?);
        }

        Ok(builder.build())
    }
}

impl Command for CollStatsCommand {
    type Argument = CollStatsArgument;
    type Result = CollStatsReply;

    fn name(&self) -> &'static str {
        "collStats"
    }

    fn is_readable_from_secondary(&self) -> bool {
        true
    }

    fn unmarshall_arg(&self, doc: &Document) -> MongoResult<CollStatsArgument> {
        let collection = reader::get(doc, &COLLECTION_FIELD)?;
        // Scales past u32::MAX are rejected rather than truncated.
        let scale = reader::get_or(doc, &SCALE_FIELD, Number::Int32(1))?.as_i64();
        let scale = u32::try_from(scale)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(|| MongoError::bad_value("Scale must be a value >= 1"))?;
        let verbose = reader::get_boolean_or_numeric(doc, &VERBOSE_FIELD, false)?;

        Ok(CollStatsArgument::new(collection, scale, verbose))
    }

    fn marshall_result(&self, result: &CollStatsReply) -> MongoResult<Document> {
        result.marshall().map_err(MongoError::marshal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use mongowire_common::Direction;

    fn scale(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn reply(count: u64, size: u64, scale_by: u32, capping: Capping) -> CollStatsReply {
        CollStatsReply::new(
            scale(scale_by),
            "db",
            "users",
            CollectionSizes {
                count,
                size,
                storage_size: 4096,
            },
            capping,
            IndexStats {
                details: Document::new(),
                size_by_index: vec![("_id_".to_string(), 100), ("email_1".to_string(), 50)],
            },
        )
    }

    #[test]
    fn test_argument_defaults() {
        let arg = CollStatsCommand.unmarshall_arg(&doc! { "collStats": "users" }).unwrap();
        assert_eq!(arg.collection(), "users");
        assert_eq!(arg.scale().get(), 1);
        assert!(!arg.is_verbose());
    }

    #[test]
    fn test_argument_coercion() {
        let arg = CollStatsCommand
            .unmarshall_arg(&doc! { "collStats": "users", "scale": 1024.0, "verbose": 1_i32 })
            .unwrap();
        assert_eq!(arg.scale().get(), 1024);
        assert!(arg.is_verbose());
    }

    #[test]
    fn test_scale_must_be_positive() {
        for bad in [0_i64, -1, i64::from(u32::MAX) + 1] {
            let err = CollStatsCommand
                .unmarshall_arg(&doc! { "collStats": "users", "scale": bad })
                .unwrap_err();
            assert_eq!(err, MongoError::bad_value("Scale must be a value >= 1"));
        }

        let arg = CollStatsCommand
            .unmarshall_arg(&doc! { "collStats": "users", "scale": i64::from(u32::MAX) })
            .unwrap();
        assert_eq!(arg.scale().get(), u32::MAX);
    }

    #[test]
    fn test_avg_obj_size_omitted_for_empty_collection() {
        let doc = CollStatsCommand.marshall_result(&reply(0, 0, 1, Capping::Uncapped)).unwrap();
        assert!(!doc.contains_key("avgObjSize"));
        assert!(!doc.contains_key("max"));
        assert!(!doc.get_bool("capped").unwrap());
    }

    #[test]
    fn test_avg_obj_size_is_scaled() {
        let doc = CollStatsCommand.marshall_result(&reply(10, 100, 2, Capping::Uncapped)).unwrap();
        assert_eq!(doc.get_i32("avgObjSize").unwrap(), 20);
    }

    #[test]
    fn test_full_reply_shape() {
        let doc = CollStatsCommand
            .marshall_result(&reply(4, 400, 1, Capping::Capped { max: Some(1000) }))
            .unwrap();
        assert_eq!(
            doc,
            doc! {
                "ns": "db.users",
                "count": 4_i32,
                "size": 400_i32,
                "avgObjSize": 100_i32,
                "storageSize": 4096_i32,
                "nindexes": 2_i32,
                "indexDetails": {},
                "totalIndexSize": 150_i32,
                "indexSizes": { "_id_": 100_i32, "email_1": 50_i32 },
                "capped": true,
                "max": 1000_i32,
            }
        );
    }

    #[test]
    fn test_capped_without_max() {
        let doc = CollStatsCommand
            .marshall_result(&reply(1, 1, 1, Capping::Capped { max: None }))
            .unwrap();
        assert!(doc.get_bool("capped").unwrap());
        assert!(!doc.contains_key("max"));
    }

    #[test]
    fn test_overflow_is_marshal_error() {
        let err = CollStatsCommand
            .marshall_result(&reply(1, u64::MAX, 2, Capping::Uncapped))
            .unwrap_err();
        match err {
            MongoError::Marshal(inner) => assert!(matches!(*inner, MongoError::BadValue(_))),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_client_directions_unsupported() {
        assert!(CollStatsCommand.is_readable_from_secondary());
        assert!(!CollStatsCommand.supports(Direction::MarshallArg));
        assert!(!CollStatsCommand.supports(Direction::UnmarshallResult));
        let arg = CollStatsArgument::new("users", scale(1), false);
        assert!(CollStatsCommand.marshall_arg(&arg).unwrap_err().is_unsupported());
        assert!(CollStatsCommand.unmarshall_result(&doc! {}).unwrap_err().is_unsupported());
    }
}
