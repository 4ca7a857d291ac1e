pub mod config;
pub mod dedupe;
pub mod engine;
pub mod error;
pub mod model;
pub mod report;
pub mod snapshot;
pub mod sqlgen;
pub mod store;

pub use config::AppConfig;
pub use engine::{ReconcileEngine, RunSummary};
pub use error::Error;
pub use report::{ConsoleReporter, RunReporter, SilentReporter};
