//! The `OutputWriter` trait implemented by trace backends.

use crate::{LifecycleRow, OutputResult, ScenarioStatusRow};

/// Sink for run traces.
///
/// Errors are surfaced to the observer, which keeps the first one for
/// [`TraceObserver::take_error`][crate::TraceObserver::take_error].
pub trait OutputWriter {
    fn write_status(&mut self, row: &ScenarioStatusRow) -> OutputResult<()>;

    fn write_lifecycle(&mut self, row: &LifecycleRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.  Safe to call more than
    /// once.
    fn finish(&mut self) -> OutputResult<()>;
}
