//! The `World` trait: everything behaviors need from the simulator.
//!
//! Behaviors hold `ActorId`s, never actor objects.  Every read and write goes
//! through a `&dyn World` / `&mut dyn World`, so the same tree runs against
//! the in-memory [`SandboxWorld`](crate::SandboxWorld) in tests and against a
//! real simulator client in production.
//!
//! Queries on a destroyed or unknown actor return
//! [`WorldError::ActorNotFound`](crate::WorldError::ActorNotFound); creation
//! calls return `None` on failure and leave retry policy to the caller.

use ts_core::{ActorId, ActorKind, Location, ModelFilter, Transform};

use crate::{LaneSide, VehicleControl, Waypoint, WeatherParameters, WorldResult};

/// Options for [`World::request_new_batch_actors`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchOptions {
    /// Enable autopilot on every spawned vehicle immediately.
    pub autopilot:        bool,
    /// Pick free spawn points from the map instead of the given transform.
    pub random_location:  bool,
    /// Role name attached to the spawned actors.
    pub rolename:         String,
    /// Blueprints never chosen even when the filter matches them.
    pub model_exceptions: Vec<String>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            autopilot:        false,
            random_location:  true,
            rolename:         "scenario".into(),
            model_exceptions: vec!["vehicle.tram.tram".into()],
        }
    }
}

/// Simulator surface used by behaviors, triggers, and the scenario runner.
///
/// Object safe: the runtime passes `&mut dyn World` down the tree.
pub trait World {
    // ── Creation / destruction ────────────────────────────────────────────

    /// Spawn one actor of a blueprint matching `model` at `transform`.
    fn request_new_actor(&mut self, model: &ModelFilter, transform: Transform) -> Option<ActorId>;

    /// Spawn up to `count` actors.  Returns `None` when nothing could be
    /// spawned; a shorter list means a partial batch.
    fn request_new_batch_actors(
        &mut self,
        model:     &ModelFilter,
        count:     usize,
        transform: Transform,
        options:   &BatchOptions,
    ) -> Option<Vec<ActorId>>;

    /// Spawn an AI controller and attach it to `walker`.
    fn spawn_walker_controller(&mut self, walker: ActorId) -> Option<ActorId>;

    /// Destroy an actor.  Returns `false` if it was already gone.
    fn destroy_actor(&mut self, actor: ActorId) -> bool;

    fn is_alive(&self, actor: ActorId) -> bool;

    // ── Queries ───────────────────────────────────────────────────────────

    fn actor_kind(&self, actor: ActorId) -> WorldResult<ActorKind>;

    /// Blueprint id the actor was spawned from.
    fn model(&self, actor: ActorId) -> WorldResult<&str>;

    fn transform(&self, actor: ActorId) -> WorldResult<Transform>;

    /// Velocity vector in m/s.
    fn velocity(&self, actor: ActorId) -> WorldResult<Location>;

    fn control(&self, actor: ActorId) -> WorldResult<VehicleControl>;

    fn autopilot(&self, actor: ActorId) -> WorldResult<bool>;

    fn simulate_physics(&self, actor: ActorId) -> WorldResult<bool>;

    /// The AI controller attached to `walker`, if any.
    fn walker_controller(&self, walker: ActorId) -> Option<ActorId>;

    fn walker_controller_running(&self, controller: ActorId) -> WorldResult<bool>;

    /// Nearest lane-centre waypoint, `None` off the road.
    fn waypoint(&self, location: Location) -> Option<Waypoint>;

    fn adjacent_lane(&self, waypoint: &Waypoint, side: LaneSide) -> Option<Waypoint>;

    /// Planned route of the ego vehicle, when one is known.
    fn ego_route(&self) -> Option<&[Location]>;

    fn weather(&self) -> WeatherParameters;

    fn road_friction(&self) -> f32;

    fn location(&self, actor: ActorId) -> WorldResult<Location> {
        self.transform(actor).map(|t| t.location)
    }

    /// Speed in m/s.
    fn speed(&self, actor: ActorId) -> WorldResult<f32> {
        self.velocity(actor).map(Location::length)
    }

    fn distance(&self, a: ActorId, b: ActorId) -> WorldResult<f32> {
        Ok(self.location(a)?.distance(self.location(b)?))
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    fn set_transform(&mut self, actor: ActorId, transform: Transform) -> WorldResult<()>;

    fn set_simulate_physics(&mut self, actor: ActorId, enabled: bool) -> WorldResult<()>;

    /// Vehicles only.
    fn set_autopilot(&mut self, actor: ActorId, enabled: bool) -> WorldResult<()>;

    fn apply_control(&mut self, actor: ActorId, control: VehicleControl) -> WorldResult<()>;

    /// Hold a constant forward speed (`None` releases it).
    fn set_target_speed(&mut self, actor: ActorId, speed: Option<f32>) -> WorldResult<()>;

    /// Start or stop a walker AI controller.
    fn set_walker_controller(&mut self, controller: ActorId, running: bool) -> WorldResult<()>;

    fn set_weather(&mut self, weather: WeatherParameters);

    fn set_road_friction(&mut self, friction: f32);

    // ── Time ──────────────────────────────────────────────────────────────

    /// Let the simulator run for `dt` seconds.  Called by the runner once per
    /// tick, after every tree has been ticked.
    fn advance(&mut self, dt: f32);
}
