use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Datetime layout the store uses for its text literals.
pub const STORE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// ISO variant some exports emit for the same columns.
const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Column names of the files-table export, declared field by field so the
/// header contract stays visible and testable on its own.
pub mod columns {
    pub const ID: &str = "id";
    pub const ID_PATH: &str = "idPath";
    pub const FILENAME: &str = "strFilename";
    pub const PLAY_COUNT: &str = "playCount";
    pub const LAST_PLAYED: &str = "lastPlayed";
    pub const DATE_ADDED: &str = "dateAdded";

    pub const ALL: [&str; 6] = [ID, ID_PATH, FILENAME, PLAY_COUNT, LAST_PLAYED, DATE_ADDED];
}

/// Parse a datetime literal in either the store's calendar form or the
/// ISO `T`-separated form.
pub fn parse_store_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, STORE_DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, ISO_DATETIME_FORMAT))
        .ok()
}

fn serialize_store_datetime<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&value.format(STORE_DATETIME_FORMAT))
}

/// One validated row of the files-table export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRow {
    pub id: i64,
    pub id_path: i64,
    pub filename: String,
    pub play_count: i64,
    #[serde(serialize_with = "serialize_store_datetime")]
    pub last_played: NaiveDateTime,
    #[serde(serialize_with = "serialize_store_datetime")]
    pub date_added: NaiveDateTime,
}

/// Why a raw record failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' is not an integer: '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("field '{field}' is not a timestamp: '{value}'")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("negative play count: {0}")]
    NegativePlayCount(i64),

    #[error("empty filename")]
    EmptyFilename,
}

/// A raw record that failed validation. Kept for diagnostics only and
/// never aggregated.
#[derive(Debug, Clone)]
pub struct RejectedRow {
    pub raw: BTreeMap<String, String>,
    pub reason: RowError,
}

/// All snapshot rows sharing one filename, in input order.
#[derive(Debug, Clone)]
pub struct FilenameGroup {
    pub filename: String,
    pub rows: Vec<SnapshotRow>,
}

impl FilenameGroup {
    pub fn is_duplicated(&self) -> bool {
        self.rows.len() > 1
    }
}

/// The canonical record for one filename after collapsing duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateUpdate {
    pub filename: String,
    pub play_count: i64,
    pub last_played: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_datetime_round_trip() {
        let parsed = parse_store_datetime("2024-02-01 09:05:03").unwrap();
        let rendered = parsed.format(STORE_DATETIME_FORMAT).to_string();
        assert_eq!(rendered, "2024-02-01 09:05:03");
        assert_eq!(parse_store_datetime(&rendered), Some(parsed));
    }

    #[test]
    fn test_iso_datetime_accepted() {
        let iso = parse_store_datetime("2024-02-01T09:05:03").unwrap();
        let calendar = parse_store_datetime("2024-02-01 09:05:03").unwrap();
        assert_eq!(iso, calendar);
    }

    #[test]
    fn test_garbage_datetime_rejected() {
        assert_eq!(parse_store_datetime("not a date"), None);
        assert_eq!(parse_store_datetime("2024-13-01 00:00:00"), None);
        assert_eq!(parse_store_datetime(""), None);
    }

    #[test]
    fn test_export_columns_cover_all_fields() {
        assert_eq!(columns::ALL.len(), 6);
        assert!(columns::ALL.contains(&columns::FILENAME));
        assert!(columns::ALL.contains(&columns::PLAY_COUNT));
    }

    #[test]
    fn test_row_dump_uses_store_datetime_format() {
        let row = SnapshotRow {
            id: 7,
            id_path: 2,
            filename: "a.mkv".to_string(),
            play_count: 3,
            last_played: parse_store_datetime("2024-01-01 10:00:00").unwrap(),
            date_added: parse_store_datetime("2023-06-15 08:30:00").unwrap(),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"last_played\":\"2024-01-01 10:00:00\""));
        assert!(json.contains("\"date_added\":\"2023-06-15 08:30:00\""));
    }
}
