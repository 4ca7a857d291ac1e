use std::collections::HashMap;

use crate::error::Error;
use crate::model::{AggregateUpdate, FilenameGroup, SnapshotRow};

/// Partition valid rows by filename, verbatim (case-sensitive, no path
/// normalization). Groups keep the order of first occurrence so reporting
/// is reproducible; no row is dropped.
pub fn group_by_filename(rows: Vec<SnapshotRow>) -> Vec<FilenameGroup> {
    let mut groups: Vec<FilenameGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        match index.get(&row.filename) {
            Some(&slot) => groups[slot].rows.push(row),
            None => {
                index.insert(row.filename.clone(), groups.len());
                groups.push(FilenameGroup {
                    filename: row.filename.clone(),
                    rows: vec![row],
                });
            }
        }
    }

    groups
}

/// Collapse one group to its canonical aggregate: play counts sum, the
/// most recent last-played timestamp wins. Both folds are commutative and
/// associative, so member order never affects the result.
///
/// A group holding a row for a different filename is a defect in the
/// grouping stage, not a data-quality problem, and fails the run.
pub fn aggregate_group(group: &FilenameGroup) -> Result<AggregateUpdate, Error> {
    if let Some(stray) = group.rows.iter().find(|r| r.filename != group.filename) {
        return Err(Error::Consistency(format!(
            "group '{}' contains a row for '{}'",
            group.filename, stray.filename
        )));
    }

    let last_played = group
        .rows
        .iter()
        .map(|r| r.last_played)
        .max()
        .ok_or_else(|| Error::Consistency(format!("empty group for '{}'", group.filename)))?;

    Ok(AggregateUpdate {
        filename: group.filename.clone(),
        play_count: group.rows.iter().map(|r| r.play_count).sum(),
        last_played,
    })
}
