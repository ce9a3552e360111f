use std::fmt;

use time::{macros::datetime, OffsetDateTime};
use uuid::Uuid;

/// Stand-in for a missing `created_at`. Rows without a timestamp sort last.
pub const MIN_CREATED_AT: OffsetDateTime = datetime!(0001-01-01 0:00 UTC);

/// Sort key of the last row served, under `(created_at DESC, id DESC)`.
///
/// The derived ordering compares `last_created_at` first and `last_id` second,
/// which is exactly the composite ordering the planner seeks on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeekCursor {
    pub last_created_at: OffsetDateTime,
    pub last_id: Uuid,
}

impl SeekCursor {
    pub fn new(last_created_at: OffsetDateTime, last_id: Uuid) -> Self {
        Self {
            last_created_at,
            last_id,
        }
    }

    /// Key of a row whose timestamp may be absent.
    pub fn of(created_at: Option<OffsetDateTime>, id: Uuid) -> Self {
        Self::new(created_at.unwrap_or(MIN_CREATED_AT), id)
    }

    /// `<unix nanoseconds>_<uuid>`
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parses a cursor produced by [`SeekCursor::encode`]. Anything else is `None`,
    /// which callers treat as "start from the first page".
    pub fn decode(raw: &str) -> Option<Self> {
        let mut parts = raw.split('_');
        let (ticks, id) = (parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        let ticks = ticks.parse::<i128>().ok()?;
        let last_created_at = OffsetDateTime::from_unix_timestamp_nanos(ticks).ok()?;
        let last_id = Uuid::parse_str(id).ok()?;
        Some(Self::new(last_created_at, last_id))
    }
}

impl fmt::Display for SeekCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}",
            self.last_created_at.unix_timestamp_nanos(),
            self.last_id.hyphenated()
        )
    }
}

/// Anything listed through the keyset planner.
pub trait Seekable {
    fn seek_key(&self) -> SeekCursor;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_keeps_nanoseconds_and_full_id() {
        let t = datetime!(2024-03-09 12:34:56.123456789 UTC);
        let id = Uuid::from_u128(u128::MAX - 7);
        let cursor = SeekCursor::new(t, id);
        assert_eq!(SeekCursor::decode(&cursor.encode()), Some(cursor));
    }

    #[test]
    fn round_trip_min_timestamp() {
        let cursor = SeekCursor::of(None, Uuid::new_v4());
        let decoded = SeekCursor::decode(&cursor.encode()).expect("decodes");
        assert_eq!(decoded.last_created_at, MIN_CREATED_AT);
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn wire_form_is_ticks_underscore_uuid() {
        let id = Uuid::nil();
        let cursor = SeekCursor::new(OffsetDateTime::UNIX_EPOCH, id);
        assert_eq!(
            cursor.encode(),
            "0_00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn decode_rejects_garbage() {
        let id = Uuid::new_v4();
        for raw in [
            String::new(),
            "123".to_string(),
            format!("abc_{id}"),
            "123_not-a-uuid".to_string(),
            format!("1_{id}_extra"),
            format!("_{id}"),
            format!("{}_{id}", i128::MAX),
        ] {
            assert_eq!(SeekCursor::decode(&raw), None, "input {raw:?}");
        }
    }

    #[test]
    fn ordering_is_timestamp_then_id() {
        let t = datetime!(2024-01-01 0:00 UTC);
        let a = SeekCursor::new(t, Uuid::from_u128(1));
        let b = SeekCursor::new(t, Uuid::from_u128(2));
        let c = SeekCursor::new(t + time::Duration::SECOND, Uuid::from_u128(0));
        assert!(a < b);
        assert!(b < c);
        assert!(SeekCursor::of(None, Uuid::from_u128(u128::MAX)) < a);
    }
}
