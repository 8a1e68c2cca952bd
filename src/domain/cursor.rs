//! Cursor derivation
//!
//! A cursor is the canonical "resume after this point" token sent back to the server.
//! It is produced from the last item of the most recently fetched page by picking the
//! first available timestamp-like field, shifting it by a fixed offset and formatting
//! it with second precision and no zone suffix.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use derive_deref::Deref;
use serde::{Deserialize, Serialize};

use super::item::PageItem;

/// Canonical output format of a cursor (`YYYY-MM-DDTHH:mm:ss`)
pub const CURSOR_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Offset applied to server timestamps when no other offset is configured
pub const DEFAULT_OFFSET_HOURS: i64 = 9;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Opaque pagination cursor
///
/// Cursors produced by [`CursorCodec`] share one fixed-width format, so their
/// lexicographic order matches their chronological order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The timestamp-like fields an item exposes for cursor derivation
///
/// Fields are consulted in declaration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampFields<'a> {
    pub timestamp: Option<&'a str>,
    pub last_modified_date: Option<&'a str>,
    pub updated_at: Option<&'a str>,
    pub created_at: Option<&'a str>,
}

impl<'a> TimestampFields<'a> {
    /// Returns the first field that is present and not blank
    pub fn first_present(&self) -> Option<&'a str> {
        [
            self.timestamp,
            self.last_modified_date,
            self.updated_at,
            self.created_at,
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
    }
}

/// Converts item timestamps into cursors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorCodec {
    offset: TimeDelta,
}

impl Default for CursorCodec {
    fn default() -> Self {
        Self {
            offset: TimeDelta::hours(DEFAULT_OFFSET_HOURS),
        }
    }
}

impl CursorCodec {
    /// Create a codec that shifts timestamps by `offset`
    pub fn with_offset(offset: TimeDelta) -> Self {
        Self { offset }
    }

    /// Create a codec from a whole number of hours
    ///
    /// Returns `None` when the offset does not fit in a `TimeDelta`.
    pub fn with_offset_hours(hours: i64) -> Option<Self> {
        TimeDelta::try_hours(hours).map(Self::with_offset)
    }

    pub fn offset(&self) -> TimeDelta {
        self.offset
    }

    /// Derive the cursor that requests items after `item`
    pub fn derive_cursor<T: PageItem>(&self, item: &T) -> Option<Cursor> {
        let raw = item.timestamp_fields().first_present()?;
        let cursor = self.encode(raw);
        if cursor.is_none() {
            log::warn!("Unparseable cursor source field: {raw:?}");
        }
        cursor
    }

    /// Derive the cursor from the last item of a page
    ///
    /// An empty page yields `None`.
    pub fn derive_from_page<T: PageItem>(&self, items: &[T]) -> Option<Cursor> {
        items.last().and_then(|item| self.derive_cursor(item))
    }

    /// Encode a raw timestamp string
    pub fn encode(&self, raw: &str) -> Option<Cursor> {
        let shifted = parse_utc(raw.trim())?.checked_add_signed(self.offset)?;
        Some(Cursor(shifted.format(CURSOR_FORMAT).to_string()))
    }
}

/// Parse a server timestamp into a naive UTC date-time
///
/// Zone-less values are read as UTC; a bare date is midnight.
fn parse_utc(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case("2025-01-01T10:00:00Z", Some("2025-01-01T19:00:00"))]
    #[case("2025-01-01T10:00:00.987Z", Some("2025-01-01T19:00:00"))]
    #[case("2025-01-01T10:00:00+09:00", Some("2025-01-01T10:00:00"))]
    #[case("2025-01-01T10:00:00", Some("2025-01-01T19:00:00"))]
    #[case("2025-01-01T10:00:00.123456", Some("2025-01-01T19:00:00"))]
    #[case("2025-01-01 10:00:00", Some("2025-01-01T19:00:00"))]
    #[case("2025-01-01", Some("2025-01-01T09:00:00"))]
    #[case("2025-12-31T20:30:15Z", Some("2026-01-01T05:30:15"))]
    #[case("  2025-01-01T10:00:00Z  ", Some("2025-01-01T19:00:00"))]
    #[case("yesterday", None)]
    #[case("2025-13-01T00:00:00Z", None)]
    fn test_encode(#[case] raw: &str, #[case] expected: Option<&str>) {
        let codec = CursorCodec::default();
        assert_eq!(codec.encode(raw), expected.map(Cursor::new));
    }

    #[test]
    fn test_field_priority() {
        let codec = CursorCodec::default();
        let item = json!({
            "id": 1,
            "createdAt": "2020-01-01T00:00:00Z",
            "updatedAt": "2021-01-01T00:00:00Z",
            "lastModifiedDate": "2022-01-01T00:00:00Z",
            "timestamp": "2023-01-01T00:00:00Z",
        });
        assert_eq!(
            codec.derive_cursor(&item),
            Some(Cursor::new("2023-01-01T09:00:00"))
        );

        let item = json!({
            "createdAt": "2020-01-01T00:00:00Z",
            "updatedAt": "2021-01-01T00:00:00Z",
        });
        assert_eq!(
            codec.derive_cursor(&item),
            Some(Cursor::new("2021-01-01T09:00:00"))
        );
    }

    #[test]
    fn test_blank_field_falls_through() {
        let codec = CursorCodec::default();
        let item = json!({ "timestamp": "  ", "createdAt": "2024-06-01T00:00:00Z" });
        assert_eq!(
            codec.derive_cursor(&item),
            Some(Cursor::new("2024-06-01T09:00:00"))
        );
    }

    #[test]
    fn test_no_field() {
        let codec = CursorCodec::default();
        assert_eq!(codec.derive_cursor(&json!({ "id": 7 })), None);
        assert_eq!(codec.derive_from_page::<serde_json::Value>(&[]), None);
    }

    #[test]
    fn test_unparseable_field_does_not_fall_through() {
        let codec = CursorCodec::default();
        let item = json!({ "timestamp": "n/a", "createdAt": "2024-06-01T00:00:00Z" });
        assert_eq!(codec.derive_cursor(&item), None);
    }

    #[test]
    fn test_derive_from_page_uses_last_item() {
        let codec = CursorCodec::default();
        let page = vec![
            json!({ "id": 1, "timestamp": "2025-01-01T09:00:00Z" }),
            json!({ "id": 2, "timestamp": "2025-01-01T10:00:00Z" }),
        ];
        assert_eq!(
            codec.derive_from_page(&page),
            Some(Cursor::new("2025-01-01T19:00:00"))
        );
    }

    #[test]
    fn test_custom_offset() {
        let codec = CursorCodec::with_offset_hours(0).expect("zero offset");
        assert_eq!(
            codec.encode("2025-01-01T10:00:00Z"),
            Some(Cursor::new("2025-01-01T10:00:00"))
        );
        assert!(CursorCodec::with_offset_hours(i64::MAX).is_none());
    }

    #[test]
    fn test_cursor_order_follows_time() {
        let codec = CursorCodec::default();
        let raws = [
            "2024-12-31T23:59:59Z",
            "2025-01-01T00:00:00Z",
            "2025-01-01T10:00:00.500Z",
            "2025-01-02T01:00:00Z",
            "2025-10-01T00:00:00Z",
        ];
        let cursors: Vec<Cursor> = raws.iter().filter_map(|raw| codec.encode(raw)).collect();
        assert_eq!(cursors.len(), raws.len());
        assert!(cursors.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
