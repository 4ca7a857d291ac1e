use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::error::Error;

/// Confirm the authoritative store exists and is a real SQLite database.
///
/// The connection is read-only and issues a single probe against
/// `sqlite_master` to force the header to be read (SQLite defers that to
/// the first query). Nothing in the files table is read or written; the
/// generated statements are applied by hand, not through this handle.
pub fn validate_store(path: &Path) -> Result<(), Error> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let objects: i64 = conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))?;
    debug!(
        "Store at {} validated ({} schema objects)",
        path.display(),
        objects
    );
    Ok(())
}
