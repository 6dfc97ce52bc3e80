//! Per-actor lifecycle state and active-behavior bookkeeping.
//!
//! Every actor a scenario spawns is registered here with its owning
//! scenario.  Lifecycle transitions are forward-only:
//!
//! ```text
//! SpawnedHidden ──► VisibleIdle ──► Active ──► Removed
//!        │               │                       ▲
//!        └───────────────┴───────────────────────┘  (abort / timeout)
//! ```
//!
//! `Removed` is reachable from any state so an aborted scenario can still
//! tear its actors down; every other state only from its predecessor.
//! Transitions are queued as [`LifecycleEvent`]s which the runner drains and
//! forwards to its observer.

use std::fmt;

use tracing::debug;
use ts_core::{ActorId, ScenarioId, Tick};

use crate::map::Map;
use crate::{BehaviorError, BehaviorResult};

// ── LifecycleState ────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LifecycleState {
    /// Created out of view with physics off.
    SpawnedHidden,
    /// At its spawn pose, braked, waiting for the start condition.
    VisibleIdle,
    /// Driving/walking under its conditional behaviors.
    Active,
    /// Destroyed.
    Removed,
}

impl LifecycleState {
    /// The state that normally follows this one.
    pub fn successor(self) -> Option<LifecycleState> {
        match self {
            LifecycleState::SpawnedHidden => Some(LifecycleState::VisibleIdle),
            LifecycleState::VisibleIdle   => Some(LifecycleState::Active),
            LifecycleState::Active        => Some(LifecycleState::Removed),
            LifecycleState::Removed       => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::SpawnedHidden => "spawned_hidden",
            LifecycleState::VisibleIdle   => "visible_idle",
            LifecycleState::Active        => "active",
            LifecycleState::Removed       => "removed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct ActorEntry {
    pub scenario: ScenarioId,
    pub state:    LifecycleState,
    /// Name of the behavior currently steering this actor, if any.
    pub active:   Option<String>,
}

/// One state change, queued for the observer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LifecycleEvent {
    pub tick:     Tick,
    pub scenario: ScenarioId,
    pub actor:    ActorId,
    /// `None` for the initial registration.
    pub from:     Option<LifecycleState>,
    pub to:       LifecycleState,
}

// ── ActorRegistry ─────────────────────────────────────────────────────────────

#[derive(Default, Debug)]
pub struct ActorRegistry {
    entries: Map<ActorId, ActorEntry>,
    events:  Vec<LifecycleEvent>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a freshly spawned (hidden) actor.
    pub fn register(&mut self, actor: ActorId, scenario: ScenarioId, tick: Tick) -> BehaviorResult<()> {
        if self.entries.contains_key(&actor) {
            return Err(BehaviorError::AlreadyRegistered(actor));
        }
        self.entries.insert(actor, ActorEntry {
            scenario,
            state:  LifecycleState::SpawnedHidden,
            active: None,
        });
        self.events.push(LifecycleEvent {
            tick,
            scenario,
            actor,
            from: None,
            to:   LifecycleState::SpawnedHidden,
        });
        Ok(())
    }

    pub fn entry(&self, actor: ActorId) -> Option<&ActorEntry> {
        self.entries.get(&actor)
    }

    pub fn state(&self, actor: ActorId) -> Option<LifecycleState> {
        self.entries.get(&actor).map(|e| e.state)
    }

    /// Move `actor` to `to`.
    ///
    /// Re-entering the current state is a no-op.  Anything other than the
    /// successor state (or `Removed`) is rejected.
    pub fn transition(&mut self, actor: ActorId, to: LifecycleState, tick: Tick) -> BehaviorResult<()> {
        let entry = self
            .entries
            .get_mut(&actor)
            .ok_or(BehaviorError::UnknownActor(actor))?;
        let from = entry.state;
        if from == to {
            return Ok(());
        }
        if from.successor() != Some(to) && to != LifecycleState::Removed {
            return Err(BehaviorError::InvalidTransition { actor, from, to });
        }
        entry.state = to;
        if to == LifecycleState::Removed {
            entry.active = None;
        }
        debug!(actor = %actor, from = %from, to = %to, "lifecycle_transition");
        self.events.push(LifecycleEvent {
            tick,
            scenario: entry.scenario,
            actor,
            from: Some(from),
            to,
        });
        Ok(())
    }

    /// Record which behavior currently steers `actor`.  Unknown actors are
    /// ignored.
    pub fn set_active(&mut self, actor: ActorId, behavior: Option<&str>) {
        if let Some(entry) = self.entries.get_mut(&actor) {
            entry.active = behavior.map(str::to_owned);
        }
    }

    pub fn active_behavior(&self, actor: ActorId) -> Option<&str> {
        self.entries.get(&actor).and_then(|e| e.active.as_deref())
    }

    /// Actors owned by `scenario`, in ascending id order.
    pub fn actors_of(&self, scenario: ScenarioId) -> Vec<ActorId> {
        let mut ids: Vec<ActorId> = self
            .entries
            .iter()
            .filter(|(_, e)| e.scenario == scenario)
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.events)
    }
}
