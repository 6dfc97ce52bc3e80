//! A running scenario: its tree, its actors, and its outcome.

use std::fmt;

use tracing::{debug, warn};
use ts_behavior::{ActorRegistry, Behavior, BoxedBehavior, LifecycleState, Status, TickContext};
use ts_core::{ScenarioId, Tick};
use ts_world::World;

use crate::SpawnedActor;

/// How a scenario ended.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    Success,
    Failure,
    /// Its timeout elapsed first.
    TimedOut,
    /// Still running when the run ended.
    Cancelled,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success   => "success",
            Outcome::Failure   => "failure",
            Outcome::TimedOut  => "timed_out",
            Outcome::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owns the assembled tree and the actors it spawned.
///
/// Once concluded the tree is no longer ticked.  [`teardown`] removes every
/// actor that is still around and is safe to call any number of times.
///
/// [`teardown`]: ScenarioInstance::teardown
pub struct ScenarioInstance {
    pub id:           ScenarioId,
    pub name:         String,
    root:             BoxedBehavior,
    actors:           Vec<SpawnedActor>,
    outcome:          Option<Outcome>,
    torn_down:        bool,
    /// Simulated second the scenario was created at.
    pub started_secs: f64,
    pub timeout_secs: Option<f64>,
}

impl ScenarioInstance {
    pub fn new(
        id:           ScenarioId,
        name:         impl Into<String>,
        root:         BoxedBehavior,
        actors:       Vec<SpawnedActor>,
        started_secs: f64,
        timeout_secs: Option<f64>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            root,
            actors,
            outcome: None,
            torn_down: false,
            started_secs,
            timeout_secs,
        }
    }

    pub fn root(&self) -> &dyn Behavior {
        &*self.root
    }

    pub fn actors(&self) -> &[SpawnedActor] {
        &self.actors
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.outcome.is_none()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Whether the timeout has elapsed at `now_secs`.
    pub fn timed_out(&self, now_secs: f64) -> bool {
        self.timeout_secs
            .is_some_and(|t| now_secs - self.started_secs >= t)
    }

    /// Tick the tree once.  A concluded scenario reports its final status
    /// without ticking.
    pub fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        match self.outcome {
            Some(Outcome::Success) => Status::Success,
            Some(_) => Status::Failure,
            None => self.root.tick(ctx),
        }
    }

    /// Record the outcome.  The first call wins.
    pub fn conclude(&mut self, outcome: Outcome) {
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
    }

    /// Destroy every actor the scenario spawned that is not already gone.
    ///
    /// Returns how many actors were destroyed by this call.
    pub fn teardown(&mut self, world: &mut dyn World, registry: &mut ActorRegistry, tick: Tick) -> usize {
        if self.torn_down {
            return 0;
        }
        self.torn_down = true;

        let mut destroyed = 0;
        for actor in &self.actors {
            if registry.state(actor.id) == Some(LifecycleState::Removed) {
                continue;
            }
            if let Some(controller) = actor.controller {
                world.destroy_actor(controller);
            }
            if world.destroy_actor(actor.id) {
                destroyed += 1;
            }
            if let Err(e) = registry.transition(actor.id, LifecycleState::Removed, tick) {
                warn!(scenario = %self.name, actor = %actor.id, error = %e, "teardown_transition_failed");
            }
        }
        debug!(scenario = %self.name, destroyed, "scenario_torn_down");
        destroyed
    }
}
