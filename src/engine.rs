use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::config::AppConfig;
use crate::dedupe;
use crate::error::Error;
use crate::report::RunReporter;
use crate::snapshot;
use crate::sqlgen;
use crate::store;

pub struct ReconcileEngine {
    config: AppConfig,
    db_path: PathBuf,
    snapshot_path: PathBuf,
}

#[derive(Debug)]
pub struct RunSummary {
    pub parse_duration: Duration,
    pub write_duration: Duration,
    pub rows_parsed: usize,
    pub rows_rejected: usize,
    pub distinct_filenames: usize,
    pub duplicated_filenames: usize,
    pub statements_written: usize,
}

impl ReconcileEngine {
    pub fn new(config: AppConfig, db_path: PathBuf, snapshot_path: PathBuf) -> Self {
        Self {
            config,
            db_path,
            snapshot_path,
        }
    }

    /// Run the full reconciliation pipeline:
    /// 1. Validate the store handle (read-only existence check)
    /// 2. Parse the snapshot export (bad rows rejected, not fatal)
    /// 3. Group rows by filename and report duplicates
    /// 4. Collapse each group to one aggregate
    /// 5. Write one corrective statement file per distinct filename
    pub fn run(&self, reporter: &dyn RunReporter) -> Result<RunSummary, Error> {
        info!("Opening store at {}...", self.db_path.display());
        store::validate_store(&self.db_path)?;
        info!("Opening store at {}...DONE", self.db_path.display());

        info!("Parsing snapshot at {}...", self.snapshot_path.display());
        let parse_start = Instant::now();
        let parsed = snapshot::read_snapshot(&self.snapshot_path, reporter)?;
        let parse_duration = parse_start.elapsed();
        info!("Parsing snapshot at {}...DONE", self.snapshot_path.display());

        let rows_parsed = parsed.rows.len();
        let rows_rejected = parsed.rejected.len();
        info!("Successfully parsed {} rows", rows_parsed);
        if rows_rejected > 0 {
            error!("Failed to parse {} rows", rows_rejected);
        }

        reporter.on_count_query(&sqlgen::render_count_query(
            parsed.rows.iter().map(|r| r.filename.as_str()),
        ));

        info!("Checking for duplicates...");
        let groups = dedupe::group_by_filename(parsed.rows);
        let mut duplicated_filenames = 0usize;
        for group in groups.iter().filter(|g| g.is_duplicated()) {
            reporter.on_duplicate_group(group);
            duplicated_filenames += 1;
        }
        info!("Checking for duplicates...DONE");
        if duplicated_filenames > 0 {
            error!("Found {} duplicated filenames", duplicated_filenames);
        }

        let updates = groups
            .iter()
            .map(dedupe::aggregate_group)
            .collect::<Result<Vec<_>, _>>()?;

        let out_dir = PathBuf::from(&self.config.output_dir);
        info!("Writing update statements to {}...", out_dir.display());
        let write_start = Instant::now();
        let statements_written = sqlgen::write_statements(&updates, &out_dir)?;
        let write_duration = write_start.elapsed();
        info!("Writing update statements to {}...DONE", out_dir.display());

        Ok(RunSummary {
            parse_duration,
            write_duration,
            rows_parsed,
            rows_rejected,
            distinct_filenames: groups.len(),
            duplicated_filenames,
            statements_written,
        })
    }
}
