//! OP_QUERY body decoding

use std::io::Cursor;

use bson::Document;
use bytes::Buf;
use mongowire_common::{MongoError, MongoResult};
use tracing::debug;

use crate::namespace::split_namespace;

/// Collection name that marks a query as a command
pub const COMMAND_COLLECTION: &str = "$cmd";

/// A decoded OP_QUERY request
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMessage {
    pub flags: i32,
    pub database: String,
    pub collection: Option<String>,
    pub number_to_skip: i32,
    pub number_to_return: i32,
    pub query: Document,
    pub return_fields_selector: Option<Document>,
}

impl QueryMessage {
    /// True for `<db>.$cmd` queries
    pub fn is_command(&self) -> bool {
        self.collection.as_deref() == Some(COMMAND_COLLECTION)
    }

    pub fn full_collection_name(&self) -> String {
        match &self.collection {
            Some(collection) => format!("{}.{}", self.database, collection),
            None => self.database.clone(),
        }
    }
}

fn truncated(what: &str) -> MongoError {
    MongoError::failed_to_parse(format!("OP_QUERY truncated while reading {what}"))
}

fn read_i32(buf: &mut &[u8], what: &str) -> MongoResult<i32> {
    if buf.remaining() < 4 {
        return Err(truncated(what));
    }
    Ok(buf.get_i32_le())
}

fn read_cstring(buf: &mut &[u8]) -> MongoResult<String> {
    let end = buf
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(|| truncated("fullCollectionName"))?;
    let name = std::str::from_utf8(&buf[..end])
        .map_err(|e| MongoError::failed_to_parse(format!("fullCollectionName is not UTF-8: {e}")))?
        .to_string();
    buf.advance(end + 1);
    Ok(name)
}

fn read_document(buf: &mut &[u8], what: &str) -> MongoResult<Document> {
    if buf.remaining() < 4 {
        return Err(truncated(what));
    }
    let length = usize::try_from(i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
        .map_err(|_| MongoError::failed_to_parse(format!("negative length for {what}")))?;
    if length < 5 || length > buf.remaining() {
        return Err(truncated(what));
    }

    let doc = Document::from_reader(&mut Cursor::new(&buf[..length]))
        .map_err(|e| MongoError::failed_to_parse(format!("invalid {what} document: {e}")))?;
    buf.advance(length);
    Ok(doc)
}

/// Decode an OP_QUERY body (the bytes after the header)
pub fn decode_query(body: &[u8]) -> MongoResult<QueryMessage> {
    let mut buf = body;

    let flags = read_i32(&mut buf, "flags")?;
    let full_collection_name = read_cstring(&mut buf)?;
    let (database, collection) = split_namespace(&full_collection_name)?;
    let number_to_skip = read_i32(&mut buf, "numberToSkip")?;
    let number_to_return = read_i32(&mut buf, "numberToReturn")?;
    let query = read_document(&mut buf, "query")?;
    let return_fields_selector = if buf.has_remaining() {
        Some(read_document(&mut buf, "returnFieldsSelector")?)
    } else {
        None
    };

    debug!(namespace = %full_collection_name, flags, "decoded OP_QUERY");

    Ok(QueryMessage {
        flags,
        database: database.to_string(),
        collection: collection.map(str::to_string),
        number_to_skip,
        number_to_return,
        query,
        return_fields_selector,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use bytes::{BufMut, BytesMut};

    fn query_body(namespace: &str, query: &Document, selector: Option<&Document>) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_i32_le(4);
        buf.extend_from_slice(namespace.as_bytes());
        buf.put_u8(0);
        buf.put_i32_le(0);
        buf.put_i32_le(-1);
        let mut bytes = Vec::new();
        query.to_writer(&mut bytes).unwrap();
        if let Some(selector) = selector {
            selector.to_writer(&mut bytes).unwrap();
        }
        buf.extend_from_slice(&bytes);
        buf
    }

    #[test]
    fn test_decode_command_query() {
        let body = query_body("admin.$cmd", &doc! { "isMaster": 1_i32 }, None);
        let msg = decode_query(&body).unwrap();

        assert_eq!(msg.flags, 4);
        assert_eq!(msg.database, "admin");
        assert!(msg.is_command());
        assert_eq!(msg.number_to_return, -1);
        assert_eq!(msg.query, doc! { "isMaster": 1_i32 });
        assert!(msg.return_fields_selector.is_none());
        assert_eq!(msg.full_collection_name(), "admin.$cmd");
    }

    #[test]
    fn test_decode_with_selector() {
        let body = query_body("db.users.archive", &doc! {}, Some(&doc! { "name": 1_i32 }));
        let msg = decode_query(&body).unwrap();

        assert_eq!(msg.collection.as_deref(), Some("users.archive"));
        assert!(!msg.is_command());
        assert_eq!(msg.return_fields_selector, Some(doc! { "name": 1_i32 }));
    }

    #[test]
    fn test_decode_errors() {
        let body = query_body(".bad", &doc! {}, None);
        assert!(matches!(
            decode_query(&body).unwrap_err(),
            MongoError::InvalidNamespace { .. }
        ));

        let body = query_body("db.c", &doc! { "a": 1_i32 }, None);
        let err = decode_query(&body[..body.len() - 3]).unwrap_err();
        assert_eq!(err, MongoError::failed_to_parse("OP_QUERY truncated while reading query"));

        assert!(matches!(decode_query(&[1, 0]).unwrap_err(), MongoError::FailedToParse(_)));
    }
}
