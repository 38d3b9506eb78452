//! Replication optimes

use std::fmt;

use bson::Timestamp;
use chrono::{DateTime, Utc};
use mongowire_common::{MongoError, MongoResult};
use serde::{Deserialize, Serialize};

/// A `(secs, term)` pair labelling a replicated operation.
///
/// Ordered by `secs` then `term`, both compared as unsigned integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OpTime {
    secs: u32,
    term: u32,
}

impl OpTime {
    pub const EPOCH: OpTime = OpTime { secs: 0, term: 0 };

    pub const fn new(secs: u32, term: u32) -> Self {
        Self { secs, term }
    }

    /// Seconds of `instant` with its sub-second nanos as the term
    ///
    /// Fails with `BadValue` when the seconds do not fit an unsigned 32-bit
    /// integer (before 1970 or after 2106).
    pub fn from_instant(instant: DateTime<Utc>) -> MongoResult<Self> {
        Self::from_instant_with_term(instant, instant.timestamp_subsec_nanos())
    }

    pub fn from_instant_with_term(instant: DateTime<Utc>, term: u32) -> MongoResult<Self> {
        let secs = u32::try_from(instant.timestamp()).map_err(|_| {
            MongoError::bad_value(format!(
                "optime {instant} is outside the unsigned 32-bit seconds range"
            ))
        })?;
        Ok(Self { secs, term })
    }

    pub const fn secs(&self) -> u32 {
        self.secs
    }

    pub const fn term(&self) -> u32 {
        self.term
    }

    pub fn is_after(&self, other: &OpTime) -> bool {
        self > other
    }

    pub fn is_equal_or_after(&self, other: &OpTime) -> bool {
        self >= other
    }

    pub fn is_before(&self, other: &OpTime) -> bool {
        self < other
    }

    pub fn is_equal_or_before(&self, other: &OpTime) -> bool {
        self <= other
    }

    /// `secs` in the high 32 bits, `term` in the low 32 bits
    #[allow(clippy::cast_possible_wrap)]
    pub const fn to_packed_i64(&self) -> i64 {
        (((self.secs as u64) << 32) | self.term as u64) as i64
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn from_packed_i64(packed: i64) -> Self {
        let packed = packed as u64;
        Self {
            secs: (packed >> 32) as u32,
            term: packed as u32,
        }
    }

    pub fn to_epoch_millis(&self) -> u64 {
        u64::from(self.secs) * 1000
    }

    pub fn as_timestamp(&self) -> Timestamp {
        Timestamp {
            time: self.secs,
            increment: self.term,
        }
    }
}

impl From<Timestamp> for OpTime {
    fn from(ts: Timestamp) -> Self {
        Self::new(ts.time, ts.increment)
    }
}

impl fmt::Display for OpTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{t: {}, i: {}}}", self.secs, self.term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use std::cmp::Ordering;

    #[test]
    fn test_unsigned_order_across_wraparound() {
        let high = OpTime::new(0xFFFF_FFFF, 0);
        let low = OpTime::new(0, 0xFFFF_FFFF);
        assert!(high > low);
        assert!(high.is_after(&low));
        assert!(low.is_before(&high));
        assert!(OpTime::new(5, 0xFFFF_FFFF).is_after(&OpTime::new(5, 1)));
    }

    #[test]
    fn test_epoch_is_minimum() {
        assert!(OpTime::EPOCH.is_equal_or_before(&OpTime::new(0, 0)));
        assert!(OpTime::EPOCH.is_equal_or_after(&OpTime::new(0, 0)));
        assert!(OpTime::EPOCH.is_before(&OpTime::new(0, 1)));
    }

    #[test]
    fn test_packing_layout() {
        let op = OpTime::new(0xFFFF_FFFF, 1);
        assert_eq!(op.to_packed_i64() as u64, 0xFFFF_FFFF_0000_0001);
        assert_eq!(OpTime::from_packed_i64(op.to_packed_i64()), op);
        assert_eq!(OpTime::EPOCH.to_packed_i64(), 0);
    }

    #[test]
    fn test_from_instant() {
        let instant = Utc.timestamp_opt(1_700_000_000, 250).single().unwrap();
        assert_eq!(OpTime::from_instant(instant).unwrap(), OpTime::new(1_700_000_000, 250));
        assert_eq!(
            OpTime::from_instant_with_term(instant, 3).unwrap(),
            OpTime::new(1_700_000_000, 3)
        );
        assert_eq!(OpTime::new(2, 9).to_epoch_millis(), 2000);
    }

    #[test]
    fn test_from_instant_rejects_out_of_range_seconds() {
        let last = Utc.timestamp_opt(i64::from(u32::MAX), 0).single().unwrap();
        assert_eq!(OpTime::from_instant(last).unwrap(), OpTime::new(u32::MAX, 0));

        let before_epoch = Utc.timestamp_opt(-1, 0).single().unwrap();
        let after_2106 = Utc.timestamp_opt(i64::from(u32::MAX) + 1, 0).single().unwrap();
        for instant in [before_epoch, after_2106] {
            let err = OpTime::from_instant(instant).unwrap_err();
            assert!(matches!(err, MongoError::BadValue(_)), "{err}");
        }
    }

    #[test]
    fn test_timestamp_and_display() {
        let ts = Timestamp {
            time: 12,
            increment: 3,
        };
        let op = OpTime::from(ts);
        assert_eq!(op.as_timestamp(), ts);
        assert_eq!(op.to_string(), "{t: 12, i: 3}");
    }

    fn op_time() -> impl Strategy<Value = OpTime> {
        (any::<u32>(), any::<u32>()).prop_map(|(s, t)| OpTime::new(s, t))
    }

    proptest! {
        #[test]
        fn prop_order_matches_unsigned_components(a in op_time(), b in op_time()) {
            let expected = (a.secs(), a.term()).cmp(&(b.secs(), b.term()));
            prop_assert_eq!(a.cmp(&b), expected);
            prop_assert_eq!(b.cmp(&a), expected.reverse());
        }

        #[test]
        fn prop_order_is_transitive(a in op_time(), b in op_time(), c in op_time()) {
            if a <= b && b <= c {
                prop_assert!(a <= c);
            }
        }

        #[test]
        fn prop_packing_is_injective(a in op_time(), b in op_time()) {
            prop_assert_eq!(a == b, a.to_packed_i64() == b.to_packed_i64());
            prop_assert_eq!(OpTime::from_packed_i64(a.to_packed_i64()), a);
        }

        #[test]
        fn prop_predicates_agree_with_order(a in op_time(), b in op_time()) {
            let ord = a.cmp(&b);
            prop_assert_eq!(a.is_after(&b), ord == Ordering::Greater);
            prop_assert_eq!(a.is_before(&b), ord == Ordering::Less);
            prop_assert_eq!(a.is_equal_or_after(&b), ord != Ordering::Less);
            prop_assert_eq!(a.is_equal_or_before(&b), ord != Ordering::Greater);
        }
    }
}
