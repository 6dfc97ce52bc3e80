//! Actor spawning: bounded retry, batch splitting, and hidden placement.
//!
//! Every actor a scenario creates goes through a [`Spawner`], which registers
//! it (`SpawnedHidden`), attaches a controller to walkers, and parks it
//! [`UNDERGROUND_Z`] metres below its spawn pose with physics off.  If
//! building the scenario fails part-way, [`Spawner::abort`] destroys
//! everything spawned so far so no actor outlives a failed scenario.

use tracing::{debug, warn};
use ts_behavior::{ActorRegistry, LifecycleState};
use ts_core::{ActorId, ActorKind, ModelFilter, ScenarioId, Tick, Transform};
use ts_world::{BatchOptions, World, WorldResult};

use crate::{ScenarioError, ScenarioResult};

/// How far below its spawn pose a hidden actor is parked, metres.
pub const UNDERGROUND_Z: f32 = 500.0;

// ── RetryPolicy ───────────────────────────────────────────────────────────────

/// Bounded spawn retry: attempt `k` (from 0) uses the pose moved
/// `k * offset_m` metres along its heading.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub offset_m:     f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 10, offset_m: 2.0 }
    }
}

impl RetryPolicy {
    /// Single attempt, no retry.
    pub fn none() -> Self {
        Self { max_attempts: 1, offset_m: 0.0 }
    }

    /// Pose used by attempt `attempt` (0-based).
    #[inline]
    pub fn pose_for(&self, base: Transform, attempt: u32) -> Transform {
        base.advanced(attempt as f32 * self.offset_m)
    }
}

/// Try to spawn `model` at `pose`, retrying per `policy`.
///
/// Returns the actor and the pose that worked.
pub fn spawn_with_retry(
    world:  &mut dyn World,
    model:  &ModelFilter,
    pose:   Transform,
    policy: &RetryPolicy,
) -> ScenarioResult<(ActorId, Transform)> {
    let attempts = policy.max_attempts.max(1);
    for attempt in 0..attempts {
        let at = policy.pose_for(pose, attempt);
        if let Some(id) = world.request_new_actor(model, at) {
            debug!(model = %model, actor = %id, attempt = attempt + 1, at = %at.location, "actor_spawned");
            return Ok((id, at));
        }
        debug!(model = %model, attempt = attempt + 1, at = %at.location, "spawn_attempt_failed");
    }
    Err(ScenarioError::SpawnFailed { model: model.to_string(), attempts })
}

/// Split `total` actors over `n` models: each gets `total / n`, the last one
/// also takes the remainder.
pub fn split_batch(total: usize, n: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let each = total / n;
    let mut out = vec![each; n];
    out[n - 1] += total - each * n;
    out
}

/// Parse model filters, logging and dropping malformed ones.
pub fn parse_filters<S: AsRef<str>>(models: &[S]) -> Vec<ModelFilter> {
    models
        .iter()
        .filter_map(|m| match ModelFilter::parse(m.as_ref()) {
            Ok(f) => Some(f),
            Err(e) => {
                warn!(model = m.as_ref(), error = %e, "model_filter_skipped");
                None
            }
        })
        .collect()
}

// ── SpawnedActor ──────────────────────────────────────────────────────────────

/// An actor created for a scenario, with the pose it is revealed at.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnedActor {
    pub id:         ActorId,
    pub kind:       ActorKind,
    pub model:      String,
    /// Visible pose; the actor is parked below it until revealed.
    pub pose:       Transform,
    /// AI controller, for walkers.
    pub controller: Option<ActorId>,
}

// ── Spawner ───────────────────────────────────────────────────────────────────

pub struct Spawner<'a> {
    world:    &'a mut dyn World,
    registry: &'a mut ActorRegistry,
    scenario: ScenarioId,
    tick:     Tick,
    spawned:  Vec<SpawnedActor>,
}

impl<'a> Spawner<'a> {
    pub fn new(
        world:    &'a mut dyn World,
        registry: &'a mut ActorRegistry,
        scenario: ScenarioId,
        tick:     Tick,
    ) -> Self {
        Self { world, registry, scenario, tick, spawned: Vec::new() }
    }

    pub fn world(&mut self) -> &mut dyn World {
        &mut *self.world
    }

    pub fn world_ref(&self) -> &dyn World {
        &*self.world
    }

    pub fn spawned(&self) -> &[SpawnedActor] {
        &self.spawned
    }

    /// Spawn one actor with bounded retry.
    pub fn spawn(&mut self, model: &ModelFilter, pose: Transform, policy: &RetryPolicy) -> ScenarioResult<SpawnedActor> {
        let (id, at) = spawn_with_retry(&mut *self.world, model, pose, policy)?;
        self.adopt(id, at)
    }

    /// Spawn up to `count` actors matching `model` in one batch.
    ///
    /// A partial batch is accepted (the world logs it); an empty one is a
    /// spawn failure.  If adopting one of the batch fails, the ids not yet
    /// adopted are destroyed here; adopted ones are left for [`abort`].
    ///
    /// [`abort`]: Spawner::abort
    pub fn spawn_batch(
        &mut self,
        model:   &ModelFilter,
        count:   usize,
        near:    Transform,
        options: &BatchOptions,
    ) -> ScenarioResult<Vec<SpawnedActor>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let ids = self
            .world
            .request_new_batch_actors(model, count, near, options)
            .ok_or_else(|| ScenarioError::SpawnFailed { model: model.to_string(), attempts: 1 })?;
        let mut out = Vec::with_capacity(ids.len());
        for (i, &id) in ids.iter().enumerate() {
            let adopted = self
                .world
                .transform(id)
                .map_err(ScenarioError::from)
                .and_then(|pose| self.adopt(id, pose));
            match adopted {
                Ok(actor) => out.push(actor),
                Err(e) => {
                    for &orphan in &ids[i..] {
                        if !self.spawned.iter().any(|a| a.id == orphan) {
                            self.world.destroy_actor(orphan);
                        }
                    }
                    return Err(e);
                }
            }
        }
        Ok(out)
    }

    /// Register, attach a walker controller, and hide.
    fn adopt(&mut self, id: ActorId, pose: Transform) -> ScenarioResult<SpawnedActor> {
        let kind = self.world.actor_kind(id)?;
        let model = self.world.model(id)?.to_owned();
        self.registry.register(id, self.scenario, self.tick)?;

        let mut actor = SpawnedActor { id, kind, model, pose, controller: None };
        // Track before anything else can fail so abort() cleans it up.
        self.spawned.push(actor.clone());
        let idx = self.spawned.len() - 1;

        if kind.is_walker() {
            let controller = self
                .world
                .spawn_walker_controller(id)
                .ok_or_else(|| ScenarioError::SpawnFailed { model: "controller.ai.walker".into(), attempts: 1 })?;
            actor.controller = Some(controller);
            self.spawned[idx].controller = Some(controller);
        }
        hide(&mut *self.world, id, pose, UNDERGROUND_Z)?;
        Ok(actor)
    }

    /// Keep everything spawned so far.
    pub fn finish(self) -> Vec<SpawnedActor> {
        self.spawned
    }

    /// Destroy everything spawned so far and mark it removed.
    pub fn abort(self) {
        for actor in &self.spawned {
            if let Some(controller) = actor.controller {
                self.world.destroy_actor(controller);
            }
            self.world.destroy_actor(actor.id);
            if let Err(e) = self.registry.transition(actor.id, LifecycleState::Removed, self.tick) {
                warn!(actor = %actor.id, error = %e, "abort_cleanup_failed");
            }
        }
        if !self.spawned.is_empty() {
            warn!(scenario = %self.scenario, actors = self.spawned.len(), "scenario_spawn_aborted");
        }
    }
}

/// Park `actor` below `pose` with physics off.
pub fn hide(world: &mut dyn World, actor: ActorId, pose: Transform, underground: f32) -> WorldResult<()> {
    world.set_transform(actor, pose.with_z_offset(-underground))?;
    world.set_simulate_physics(actor, false)
}
