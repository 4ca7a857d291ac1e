use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::Error;
use crate::model::{AggregateUpdate, STORE_DATETIME_FORMAT};

/// Render the corrective statement for one aggregate. Matching is by exact
/// filename equality; the timestamp uses the store's literal layout.
pub fn render_update(update: &AggregateUpdate) -> String {
    format!(
        "UPDATE files SET playCount = {}, lastPlayed = '{}' WHERE strFilename = '{}';",
        update.play_count,
        update.last_played.format(STORE_DATETIME_FORMAT),
        escape_single_quotes(&update.filename),
    )
}

/// Render the diagnostic statement counting store rows that match the
/// snapshot's filenames. Filenames are deduplicated and sorted so the
/// emitted line is reproducible across runs.
pub fn render_count_query<'a, I>(filenames: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let distinct: BTreeSet<&str> = filenames.into_iter().collect();
    let joined = distinct.into_iter().collect::<Vec<_>>().join("\", \"");
    format!(
        "SELECT COUNT(DISTINCT f.idFile) FROM files f WHERE f.strFilename IN (\"{}\");",
        joined
    )
}

/// Flatten a filename key into a deterministic artifact name: every
/// non-alphanumeric character becomes '_', then the fixed '.sql' suffix.
pub fn artifact_file_name(filename: &str) -> String {
    let stem: String = filename
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.sql", stem)
}

/// Persist one newline-terminated statement file per aggregate under
/// `out_dir`, creating the directory if absent. Each handle is closed
/// before the next artifact is opened. Returns the number written.
pub fn write_statements(updates: &[AggregateUpdate], out_dir: &Path) -> Result<usize, Error> {
    fs::create_dir_all(out_dir)?;

    for update in updates {
        let path = out_dir.join(artifact_file_name(&update.filename));
        let mut file = File::create(&path)?;
        writeln!(file, "{}", render_update(update))?;
        debug!("Wrote {}", path.display());
    }

    Ok(updates.len())
}

fn escape_single_quotes(value: &str) -> String {
    value.replace('\'', "''")
}
