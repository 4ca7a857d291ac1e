mod cli;
mod logging;

use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, ReconcileArgs};
use colored::*;
use dotenv::dotenv;
use playfix::{ConsoleReporter, ReconcileEngine};
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    match args.command {
        Some(Commands::Reconcile(args)) => {
            if let Err(err) = run_reconcile(&args) {
                error!("Error: {:#}", err);
                process::exit(1);
            }
        }
        Some(Commands::PrintConfig) => match playfix::config::load_configuration() {
            Ok(config) => println!("Configuration: {:?}", config),
            Err(err) => {
                error!("Error loading configuration: {}", err);
                process::exit(1);
            }
        },
        None => {
            let _ = Cli::command().print_long_help();
        }
    }
}

fn run_reconcile(args: &ReconcileArgs) -> anyhow::Result<()> {
    let config = playfix::config::load_configuration().context("loading configuration")?;

    let engine = ReconcileEngine::new(config, args.database.clone(), args.csv.clone());
    let summary = engine.run(&ConsoleReporter)?;

    println!();
    info!(
        "Parse: {}, Write: {}",
        format!("{:.2}s", summary.parse_duration.as_secs_f64()).green(),
        format!("{:.2}s", summary.write_duration.as_secs_f64()).green(),
    );
    info!(
        "{} rows parsed, {} rejected",
        format!("{}", summary.rows_parsed).green(),
        format!("{}", summary.rows_rejected).red(),
    );
    info!(
        "{} distinct filenames, {} with duplicates, {} statements written",
        format!("{}", summary.distinct_filenames).cyan(),
        format!("{}", summary.duplicated_filenames).red(),
        format!("{}", summary.statements_written).green(),
    );

    Ok(())
}
