//! Numeric wire values

use std::fmt;

use bson::Bson;
use mongowire_common::{MongoError, MongoResult};

/// A value of any wire numeric subtype
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int32(i32),
    Int64(i64),
    Double(f64),
}

impl Number {
    pub fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::Int32(v) => Some(Number::Int32(*v)),
            Bson::Int64(v) => Some(Number::Int64(*v)),
            Bson::Double(v) => Some(Number::Double(*v)),
            _ => None,
        }
    }

    /// Narrowest integer representation of an unsigned count
    pub fn from_u64(value: u64) -> MongoResult<Self> {
        if let Ok(v) = i32::try_from(value) {
            Ok(Number::Int32(v))
        } else if let Ok(v) = i64::try_from(value) {
            Ok(Number::Int64(v))
        } else {
            Err(MongoError::bad_value(format!(
                "{value} does not fit in a 64-bit signed integer"
            )))
        }
    }

    /// Truncating conversion, doubles saturate
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i32(self) -> i32 {
        match self {
            Number::Int32(v) => v,
            Number::Int64(v) => v as i32,
            Number::Double(v) => v as i32,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(self) -> i64 {
        match self {
            Number::Int32(v) => i64::from(v),
            Number::Int64(v) => v,
            Number::Double(v) => v as i64,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int32(v) => f64::from(v),
            Number::Int64(v) => v as f64,
            Number::Double(v) => v,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int32(v) => v == 0,
            Number::Int64(v) => v == 0,
            Number::Double(v) => v == 0.0,
        }
    }

    pub fn to_bson(self) -> Bson {
        match self {
            Number::Int32(v) => Bson::Int32(v),
            Number::Int64(v) => Bson::Int64(v),
            Number::Double(v) => Bson::Double(v),
        }
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Number::Int32(v)
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Int64(v)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Double(v)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int32(v) => write!(f, "{v}"),
            Number::Int64(v) => write!(f, "{v}"),
            Number::Double(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u64_picks_narrowest_width() {
        assert_eq!(Number::from_u64(7).unwrap(), Number::Int32(7));
        assert_eq!(
            Number::from_u64(u64::from(u32::MAX)).unwrap(),
            Number::Int64(i64::from(u32::MAX))
        );
        assert!(Number::from_u64(u64::MAX).is_err());
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(Number::Double(2.9).as_i32(), 2);
        assert_eq!(Number::Int64(1 << 32).as_i32(), 0);
        assert_eq!(Number::Double(1e30).as_i64(), i64::MAX);
        assert!(Number::Double(0.0).is_zero());
        assert!(!Number::Int64(-1).is_zero());
    }

    #[test]
    fn test_only_numeric_subtypes() {
        assert_eq!(Number::from_bson(&Bson::Int32(1)), Some(Number::Int32(1)));
        assert_eq!(Number::from_bson(&Bson::String("1".into())), None);
        assert_eq!(Number::from_bson(&Bson::Boolean(true)), None);
    }
}
