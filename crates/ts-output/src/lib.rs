//! `ts-output` — run traces for the town-scenarios workspace.
//!
//! | File                   | Columns                                   |
//! |------------------------|-------------------------------------------|
//! | `scenario_status.csv`  | `tick, scenario, status`                  |
//! | `lifecycle_events.csv` | `tick, scenario, actor, from, to`         |
//!
//! [`CsvWriter`] implements [`OutputWriter`]; [`TraceObserver`] implements
//! `ts_scenario::RunnerObserver` and feeds it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ts_output::{CsvWriter, TraceObserver};
//!
//! let mut obs = TraceObserver::new(CsvWriter::new(Path::new("./output"))?).changes_only();
//! runner.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::TraceObserver;
pub use row::{LifecycleRow, ScenarioStatusRow};
pub use writer::OutputWriter;
