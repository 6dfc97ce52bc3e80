//! Plain data row types written by output backends.

use ts_behavior::{LifecycleEvent, LifecycleState, Status};
use ts_core::{ScenarioId, Tick};

/// One scenario root's status at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioStatusRow {
    pub tick:     u64,
    pub scenario: u32,
    pub status:   Status,
}

impl ScenarioStatusRow {
    pub fn new(tick: Tick, scenario: ScenarioId, status: Status) -> Self {
        Self { tick: tick.0, scenario: scenario.0, status }
    }
}

/// One lifecycle transition.  `from` is `None` for the initial registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleRow {
    pub tick:     u64,
    pub scenario: u32,
    pub actor:    u32,
    pub from:     Option<LifecycleState>,
    pub to:       LifecycleState,
}

impl From<&LifecycleEvent> for LifecycleRow {
    fn from(e: &LifecycleEvent) -> Self {
        Self { tick: e.tick.0, scenario: e.scenario.0, actor: e.actor.0, from: e.from, to: e.to }
    }
}
