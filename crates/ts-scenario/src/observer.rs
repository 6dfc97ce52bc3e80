//! Runner observer trait for progress reporting and trace collection.

use ts_behavior::{LifecycleEvent, Status};
use ts_core::{ScenarioId, Tick};

use crate::Outcome;

/// Callbacks invoked by [`ScenarioRunner`][crate::ScenarioRunner] at key
/// points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: end-of-scenario printer
///
/// ```rust,ignore
/// struct Printer;
///
/// impl RunnerObserver for Printer {
///     fn on_scenario_end(&mut self, tick: Tick, _id: ScenarioId, name: &str, outcome: Outcome) {
///         println!("{tick}: {name} -> {outcome}");
///     }
/// }
/// ```
pub trait RunnerObserver {
    /// Called at the very start of each tick, before the ego agent runs.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per running scenario per tick with the root's status.
    fn on_scenario_status(&mut self, _tick: Tick, _scenario: ScenarioId, _name: &str, _status: Status) {}

    /// Called for every lifecycle transition, in the order they happened.
    fn on_lifecycle(&mut self, _event: &LifecycleEvent) {}

    /// Called when a scenario concludes, after its teardown.
    fn on_scenario_end(&mut self, _tick: Tick, _scenario: ScenarioId, _name: &str, _outcome: Outcome) {}

    /// Called at the end of each tick.  `running` is the number of scenarios
    /// still running.
    fn on_tick_end(&mut self, _tick: Tick, _running: usize) {}

    /// Called once after the run is finished and every scenario torn down.
    fn on_run_end(&mut self, _final_tick: Tick) {}
}

/// A [`RunnerObserver`] that does nothing.
pub struct NoopObserver;

impl RunnerObserver for NoopObserver {}
