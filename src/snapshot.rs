use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::ReaderBuilder;

use crate::error::Error;
use crate::model::{columns, parse_store_datetime, RejectedRow, RowError, SnapshotRow};
use crate::report::RunReporter;

/// Outcome of parsing one export: validated rows plus everything that
/// failed validation.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub rows: Vec<SnapshotRow>,
    pub rejected: Vec<RejectedRow>,
}

/// Read a files-table CSV export. Row-level validation failures are
/// reported and retained; only I/O and CSV-framing faults abort the run.
pub fn read_snapshot(path: &Path, reporter: &dyn RunReporter) -> Result<Snapshot, Error> {
    let reader = ReaderBuilder::new().flexible(true).from_path(path)?;
    read_snapshot_from(reader, reporter)
}

fn read_snapshot_from<R: Read>(
    mut reader: csv::Reader<R>,
    reporter: &dyn RunReporter,
) -> Result<Snapshot, Error> {
    let headers = reader.headers()?.clone();

    let mut snapshot = Snapshot::default();
    for record in reader.records() {
        let record = record?;
        // Ragged rows zip short: absent columns surface as MissingField.
        let raw: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();

        match parse_row(&raw) {
            Ok(row) => snapshot.rows.push(row),
            Err(reason) => {
                reporter.on_rejected_row(&raw, &reason);
                snapshot.rejected.push(RejectedRow { raw, reason });
            }
        }
    }

    Ok(snapshot)
}

/// Validate one raw header→value mapping into a typed row.
pub fn parse_row(raw: &BTreeMap<String, String>) -> Result<SnapshotRow, RowError> {
    let filename = require(raw, columns::FILENAME)?;
    if filename.is_empty() {
        return Err(RowError::EmptyFilename);
    }

    let play_count = parse_integer(raw, columns::PLAY_COUNT)?;
    if play_count < 0 {
        return Err(RowError::NegativePlayCount(play_count));
    }

    Ok(SnapshotRow {
        id: parse_integer(raw, columns::ID)?,
        id_path: parse_integer(raw, columns::ID_PATH)?,
        filename: filename.to_string(),
        play_count,
        last_played: parse_timestamp(raw, columns::LAST_PLAYED)?,
        date_added: parse_timestamp(raw, columns::DATE_ADDED)?,
    })
}

fn require<'a>(
    raw: &'a BTreeMap<String, String>,
    field: &'static str,
) -> Result<&'a str, RowError> {
    raw.get(field)
        .map(String::as_str)
        .ok_or(RowError::MissingField(field))
}

fn parse_integer(raw: &BTreeMap<String, String>, field: &'static str) -> Result<i64, RowError> {
    let value = require(raw, field)?;
    value.trim().parse::<i64>().map_err(|_| RowError::InvalidInteger {
        field,
        value: value.to_string(),
    })
}

fn parse_timestamp(
    raw: &BTreeMap<String, String>,
    field: &'static str,
) -> Result<NaiveDateTime, RowError> {
    let value = require(raw, field)?;
    parse_store_datetime(value.trim()).ok_or_else(|| RowError::InvalidTimestamp {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SilentReporter;

    const HEADER: &str = "id,idPath,strFilename,playCount,lastPlayed,dateAdded";

    fn parse_csv(body: &str) -> Snapshot {
        let data = format!("{}\n{}", HEADER, body);
        let reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_bytes());
        read_snapshot_from(reader, &SilentReporter).unwrap()
    }

    #[test]
    fn test_valid_row_parses() {
        let snapshot = parse_csv("1,2,a.mkv,3,2024-01-01 10:00:00,2023-06-15 08:30:00");
        assert_eq!(snapshot.rows.len(), 1);
        assert!(snapshot.rejected.is_empty());

        let row = &snapshot.rows[0];
        assert_eq!(row.id, 1);
        assert_eq!(row.id_path, 2);
        assert_eq!(row.filename, "a.mkv");
        assert_eq!(row.play_count, 3);
        assert_eq!(
            row.last_played,
            parse_store_datetime("2024-01-01 10:00:00").unwrap()
        );
    }

    #[test]
    fn test_short_row_rejected_as_missing_field() {
        // Five fields only: dateAdded never makes it into the raw mapping.
        let snapshot = parse_csv("1,2,a.mkv,3,2024-01-01 10:00:00");
        assert!(snapshot.rows.is_empty());
        assert_eq!(snapshot.rejected.len(), 1);
        assert_eq!(
            snapshot.rejected[0].reason,
            RowError::MissingField(columns::DATE_ADDED)
        );
    }

    #[test]
    fn test_non_integer_play_count_rejected() {
        let snapshot = parse_csv("1,2,a.mkv,often,2024-01-01 10:00:00,2023-06-15 08:30:00");
        assert_eq!(snapshot.rejected.len(), 1);
        assert!(matches!(
            snapshot.rejected[0].reason,
            RowError::InvalidInteger { field, .. } if field == columns::PLAY_COUNT
        ));
    }

    #[test]
    fn test_negative_play_count_rejected() {
        let snapshot = parse_csv("1,2,a.mkv,-1,2024-01-01 10:00:00,2023-06-15 08:30:00");
        assert_eq!(snapshot.rejected.len(), 1);
        assert_eq!(snapshot.rejected[0].reason, RowError::NegativePlayCount(-1));
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let snapshot = parse_csv("1,2,a.mkv,3,never,2023-06-15 08:30:00");
        assert_eq!(snapshot.rejected.len(), 1);
        assert!(matches!(
            snapshot.rejected[0].reason,
            RowError::InvalidTimestamp { field, .. } if field == columns::LAST_PLAYED
        ));
    }

    #[test]
    fn test_empty_filename_rejected() {
        let snapshot = parse_csv("1,2,,3,2024-01-01 10:00:00,2023-06-15 08:30:00");
        assert_eq!(snapshot.rejected.len(), 1);
        assert_eq!(snapshot.rejected[0].reason, RowError::EmptyFilename);
    }

    #[test]
    fn test_rejection_keeps_raw_mapping() {
        let snapshot = parse_csv("1,2,a.mkv,often,2024-01-01 10:00:00,2023-06-15 08:30:00");
        let raw = &snapshot.rejected[0].raw;
        assert_eq!(raw.get(columns::PLAY_COUNT).map(String::as_str), Some("often"));
        assert_eq!(raw.get(columns::FILENAME).map(String::as_str), Some("a.mkv"));
    }

    #[test]
    fn test_bad_rows_do_not_halt_parsing() {
        let snapshot = parse_csv(
            "1,2,a.mkv,often,2024-01-01 10:00:00,2023-06-15 08:30:00\n\
             2,2,b.avi,1,2024-01-02 11:00:00,2023-06-15 08:30:00",
        );
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.rejected.len(), 1);
        assert_eq!(snapshot.rows[0].filename, "b.avi");
    }

    #[test]
    fn test_column_order_is_irrelevant() {
        let data = "strFilename,playCount,id,idPath,lastPlayed,dateAdded\n\
                    a.mkv,3,1,2,2024-01-01 10:00:00,2023-06-15 08:30:00";
        let reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_bytes());
        let snapshot = read_snapshot_from(reader, &SilentReporter).unwrap();
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.rows[0].filename, "a.mkv");
        assert_eq!(snapshot.rows[0].play_count, 3);
    }
}
