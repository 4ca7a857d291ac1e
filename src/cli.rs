use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "playfix")]
#[command(about = "Reconcile play statistics from a files-table export", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Collapse duplicate snapshot rows and write corrective statements
    Reconcile(ReconcileArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Path to the video database file
    #[arg(long = "database", value_name = "FILE")]
    pub database: PathBuf,

    /// Path to the files-table CSV export
    #[arg(long = "csv", value_name = "FILE")]
    pub csv: PathBuf,
}
