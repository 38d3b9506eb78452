//! `database.collection` namespaces

use std::fmt;

use mongowire_common::{MongoError, MongoResult};

/// Split a namespace at its first dot.
///
/// Without a dot the whole string is the database and there is no
/// collection. The collection part may itself contain dots.
pub fn split_namespace(namespace: &str) -> MongoResult<(&str, Option<&str>)> {
    match namespace.find('.') {
        None => Ok((namespace, None)),
        Some(0) => Err(MongoError::invalid_namespace(
            namespace,
            "must not start with a dot",
        )),
        Some(dot) if dot == namespace.len() - 1 => Err(MongoError::invalid_namespace(
            namespace,
            "must not end immediately after the first dot",
        )),
        Some(dot) => Ok((&namespace[..dot], Some(&namespace[dot + 1..]))),
    }
}

/// Owned view of a parsed namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    database: String,
    collection: Option<String>,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: Some(collection.into()),
        }
    }

    pub fn parse(namespace: &str) -> MongoResult<Self> {
        let (database, collection) = split_namespace(namespace)?;
        Ok(Self {
            database: database.to_string(),
            collection: collection.map(str::to_string),
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.collection {
            Some(collection) => write!(f, "{}.{}", self.database, collection),
            None => f.write_str(&self.database),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("foo", "foo", None)]
    #[case("foo.bar", "foo", Some("bar"))]
    #[case("foo.bar.baz", "foo", Some("bar.baz"))]
    #[case("admin.$cmd", "admin", Some("$cmd"))]
    fn test_split(#[case] input: &str, #[case] database: &str, #[case] collection: Option<&str>) {
        assert_eq!(split_namespace(input).unwrap(), (database, collection));
    }

    #[rstest]
    #[case(".foo", "must not start with a dot")]
    #[case("foo.", "must not end immediately after the first dot")]
    #[case(".", "must not start with a dot")]
    fn test_split_rejects(#[case] input: &str, #[case] expected_reason: &str) {
        match split_namespace(input).unwrap_err() {
            MongoError::InvalidNamespace { namespace, reason } => {
                assert_eq!(namespace, input);
                assert_eq!(reason, expected_reason);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_display_round_trip() {
        for input in ["foo", "foo.bar", "foo.bar.baz"] {
            assert_eq!(Namespace::parse(input).unwrap().to_string(), input);
        }
        assert_eq!(Namespace::new("db", "coll").collection(), Some("coll"));
    }
}
