//! `SandboxWorld` — a deterministic in-memory kinematic world.
//!
//! Actor state is stored Structure-of-Arrays style: every `Vec` has one slot
//! per actor ever spawned and `ActorId` is the index.  Destroyed actors keep
//! their slot (with `alive = false`) so ids are never reused within a run.
//!
//! The dynamics are intentionally minimal: actors move along their yaw at a
//! scalar speed.  That is enough to exercise distance triggers, brake/
//! autopilot toggling, and drive-distance end conditions.
//!
//! ```rust
//! use ts_core::{ModelFilter, Transform};
//! use ts_world::{SandboxWorldBuilder, World};
//!
//! let mut world = SandboxWorldBuilder::new(7).build();
//! let car = world
//!     .request_new_actor(&ModelFilter::parse("vehicle.*").unwrap(), Transform::default())
//!     .unwrap();
//! world.set_autopilot(car, true).unwrap();
//! world.step(1.0);
//! assert!(world.speed(car).unwrap() > 0.0);
//! ```

use tracing::{debug, warn};
use ts_core::{ActorId, ActorKind, Location, ModelFilter, SimRng, Transform};

use crate::{
    BatchOptions, LaneSide, RoadLayout, VehicleControl, Waypoint, WeatherParameters, World,
    WorldError, WorldResult,
};

/// Friction value meaning "use the map default".
pub const DEFAULT_ROAD_FRICTION: f32 = 10.0;

/// Blueprints available when the builder is not given a library.
pub const DEFAULT_BLUEPRINTS: &[&str] = &[
    "vehicle.tesla.model3",
    "vehicle.ford.crown",
    "vehicle.audi.a2",
    "vehicle.carlamotors.firetruck",
    "vehicle.tram.tram",
    "walker.pedestrian.0001",
    "walker.pedestrian.0002",
    "walker.pedestrian.0003",
    "controller.ai.walker",
    "static.prop.streetbarrier",
];

// ── Dynamics ──────────────────────────────────────────────────────────────────

/// Kinematic constants for [`SandboxWorld::step`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dynamics {
    /// Speed an autopilot vehicle settles at, m/s.
    pub cruise_speed:    f32,
    /// Top speed under manual throttle, m/s.
    pub max_speed:       f32,
    /// Full-throttle acceleration, m/s².
    pub max_accel:       f32,
    /// Full-brake deceleration on a dry road, m/s².
    pub max_decel:       f32,
    /// Deceleration with neither throttle nor brake, m/s².
    pub rolling_decel:   f32,
    /// Speed of a walker whose controller is running, m/s.
    pub walker_speed:    f32,
    /// Minimum distance between a new actor and any existing one, metres.
    pub spawn_clearance: f32,
    /// Spacing between actors of a non-random batch, metres.
    pub batch_gap:       f32,
}

impl Default for Dynamics {
    fn default() -> Self {
        Self {
            cruise_speed:    8.0,
            max_speed:       30.0,
            max_accel:       3.0,
            max_decel:       8.0,
            rolling_decel:   0.3,
            walker_speed:    1.4,
            spawn_clearance: 2.0,
            batch_gap:       8.0,
        }
    }
}

// ── SandboxWorld ──────────────────────────────────────────────────────────────

pub struct SandboxWorld {
    // ── Per-actor SoA state ───────────────────────────────────────────────
    model:      Vec<String>,
    kind:       Vec<ActorKind>,
    rolename:   Vec<String>,
    alive:      Vec<bool>,
    transform:  Vec<Transform>,
    /// Signed speed along the forward vector.
    speed:      Vec<f32>,
    control:    Vec<VehicleControl>,
    autopilot:  Vec<bool>,
    physics:    Vec<bool>,
    target:     Vec<Option<f32>>,
    /// Walker → attached controller (`INVALID` if none).
    controller: Vec<ActorId>,
    /// Controller running flag; meaningless for other kinds.
    running:    Vec<bool>,

    // ── World state ───────────────────────────────────────────────────────
    road:          RoadLayout,
    blueprints:    Vec<String>,
    spawn_points:  Vec<Transform>,
    ego_route:     Option<Vec<Location>>,
    weather:       WeatherParameters,
    road_friction: f32,
    dynamics:      Dynamics,
    rng:           SimRng,

    // ── Test hooks ────────────────────────────────────────────────────────
    pending_failures: u32,
    spawn_attempts:   Vec<Transform>,
    destroy_calls:    u64,
}

impl SandboxWorld {
    /// Number of actor slots ever allocated (alive or destroyed).
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.alive.len()
    }

    /// Ids of every live actor in ascending order.
    pub fn alive_actors(&self) -> Vec<ActorId> {
        self.alive
            .iter()
            .enumerate()
            .filter(|&(_, &alive)| alive)
            .map(|(i, _)| ActorId(i as u32))
            .collect()
    }

    pub fn alive_count(&self) -> usize {
        self.alive.iter().filter(|&&a| a).count()
    }

    pub fn rolename(&self, actor: ActorId) -> WorldResult<&str> {
        self.check(actor)?;
        Ok(&self.rolename[actor.index()])
    }

    pub fn road(&self) -> &RoadLayout {
        &self.road
    }

    pub fn dynamics(&self) -> &Dynamics {
        &self.dynamics
    }

    /// Make the next `n` single-actor spawn requests fail.
    pub fn fail_next_spawns(&mut self, n: u32) {
        self.pending_failures = n;
    }

    /// Poses passed to every single-actor spawn request so far.
    pub fn spawn_attempts(&self) -> &[Transform] {
        &self.spawn_attempts
    }

    /// Number of successful `destroy_actor` calls.
    pub fn destroy_calls(&self) -> u64 {
        self.destroy_calls
    }

    pub fn set_ego_route(&mut self, route: Option<Vec<Location>>) {
        self.ego_route = route;
    }

    /// Advance every live actor by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let friction = (self.road_friction / 0.7).min(1.0);
        let d = &self.dynamics;
        for i in 0..self.alive.len() {
            if !self.alive[i] {
                continue;
            }
            if !self.physics[i] {
                self.speed[i] = 0.0;
                continue;
            }
            let control = self.control[i];
            let v = self.speed[i];
            let next = match self.kind[i] {
                ActorKind::Vehicle => {
                    if control.is_braking() {
                        let brake = if control.hand_brake { 1.0 } else { control.brake };
                        (v.abs() - d.max_decel * brake * friction * dt).max(0.0) * v.signum()
                    } else if let Some(target) = self.target[i] {
                        target
                    } else if self.autopilot[i] {
                        approach(v, d.cruise_speed, d.max_accel * dt)
                    } else if control.throttle > 0.0 {
                        let dir = if control.reverse { -1.0 } else { 1.0 };
                        (v + dir * control.throttle * d.max_accel * dt).clamp(-d.max_speed, d.max_speed)
                    } else {
                        approach(v, 0.0, d.rolling_decel * dt)
                    }
                }
                ActorKind::Walker => {
                    let ctrl = self.controller[i];
                    let walking = ctrl.is_valid()
                        && self.alive.get(ctrl.index()).copied().unwrap_or(false)
                        && self.running[ctrl.index()];
                    if control.is_braking() {
                        0.0
                    } else if let Some(target) = self.target[i] {
                        target
                    } else if walking {
                        d.walker_speed
                    } else {
                        0.0
                    }
                }
                _ => 0.0,
            };
            self.speed[i] = next;
            self.transform[i] = self.transform[i].advanced(next * dt);
        }

        // Controllers ride along with their walker.
        for i in 0..self.alive.len() {
            let ctrl = self.controller[i];
            if self.alive[i] && ctrl.is_valid() && self.alive[ctrl.index()] {
                self.transform[ctrl.index()] = self.transform[i];
            }
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn check(&self, actor: ActorId) -> WorldResult<()> {
        if self.alive.get(actor.index()).copied().unwrap_or(false) {
            Ok(())
        } else {
            Err(WorldError::ActorNotFound(actor))
        }
    }

    fn check_kind(&self, actor: ActorId, expected: ActorKind) -> WorldResult<()> {
        self.check(actor)?;
        let got = self.kind[actor.index()];
        if got == expected {
            Ok(())
        } else {
            Err(WorldError::WrongKind { actor, expected, got })
        }
    }

    /// The road is flat, so clearance is measured in the ground plane.  A
    /// hidden actor parked below its reveal pose still holds that pose.
    fn is_free(&self, location: Location) -> bool {
        let clearance = self.dynamics.spawn_clearance;
        !self.alive.iter().enumerate().any(|(i, &alive)| {
            alive
                && self.kind[i] != ActorKind::WalkerController
                && self.transform[i].location.distance_2d(location) < clearance
        })
    }

    fn pick_blueprint(&mut self, model: &ModelFilter, exceptions: &[String]) -> Option<String> {
        let candidates: Vec<&String> = self
            .blueprints
            .iter()
            .filter(|b| model.matches(b) && !exceptions.iter().any(|e| e == *b))
            .collect();
        self.rng.pick(&candidates).map(|b| (*b).clone())
    }

    fn push_actor(&mut self, model: String, kind: ActorKind, rolename: &str, transform: Transform) -> ActorId {
        let id = ActorId(self.alive.len() as u32);
        self.model.push(model);
        self.kind.push(kind);
        self.rolename.push(rolename.to_owned());
        self.alive.push(true);
        self.transform.push(transform);
        self.speed.push(0.0);
        self.control.push(VehicleControl::default());
        self.autopilot.push(false);
        self.physics.push(true);
        self.target.push(None);
        self.controller.push(ActorId::INVALID);
        self.running.push(false);
        id
    }

    fn spawn_at(&mut self, model: &ModelFilter, transform: Transform, options: &BatchOptions) -> Option<ActorId> {
        if !self.is_free(transform.location) {
            return None;
        }
        let blueprint = self.pick_blueprint(model, &options.model_exceptions)?;
        let kind = ActorKind::from_model(&blueprint)?;
        let id = self.push_actor(blueprint, kind, &options.rolename, transform);
        if options.autopilot && kind.is_vehicle() {
            self.autopilot[id.index()] = true;
        }
        Some(id)
    }
}

/// Move `v` towards `target` by at most `step`.
fn approach(v: f32, target: f32, step: f32) -> f32 {
    if v < target {
        (v + step).min(target)
    } else {
        (v - step).max(target)
    }
}

// ── World impl ────────────────────────────────────────────────────────────────

impl World for SandboxWorld {
    fn request_new_actor(&mut self, model: &ModelFilter, transform: Transform) -> Option<ActorId> {
        self.spawn_attempts.push(transform);
        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            debug!(model = %model, at = %transform.location, "sandbox_spawn_forced_failure");
            return None;
        }
        let options = BatchOptions { model_exceptions: Vec::new(), ..BatchOptions::default() };
        let id = self.spawn_at(model, transform, &options);
        if id.is_none() {
            debug!(model = %model, at = %transform.location, "sandbox_spawn_blocked");
        }
        id
    }

    fn request_new_batch_actors(
        &mut self,
        model:     &ModelFilter,
        count:     usize,
        transform: Transform,
        options:   &BatchOptions,
    ) -> Option<Vec<ActorId>> {
        let mut poses: Vec<Transform> = if options.random_location {
            let mut points = self.spawn_points.clone();
            self.rng.shuffle(&mut points);
            points
        } else {
            (0..count)
                .map(|i| transform.advanced(-(i as f32) * self.dynamics.batch_gap))
                .collect()
        };
        poses.retain(|p| self.is_free(p.location));

        let mut spawned = Vec::with_capacity(count);
        for pose in poses {
            if spawned.len() == count {
                break;
            }
            if let Some(id) = self.spawn_at(model, pose, options) {
                spawned.push(id);
            }
        }
        match spawned.len() {
            0 => None,
            n if n < count => {
                warn!(model = %model, requested = count, spawned = n, "batch_spawn_partial");
                Some(spawned)
            }
            _ => Some(spawned),
        }
    }

    fn spawn_walker_controller(&mut self, walker: ActorId) -> Option<ActorId> {
        self.check_kind(walker, ActorKind::Walker).ok()?;
        let at = self.transform[walker.index()];
        let rolename = self.rolename[walker.index()].clone();
        let id = self.push_actor("controller.ai.walker".into(), ActorKind::WalkerController, &rolename, at);
        self.physics[id.index()] = false;
        self.controller[walker.index()] = id;
        Some(id)
    }

    fn destroy_actor(&mut self, actor: ActorId) -> bool {
        if self.check(actor).is_err() {
            return false;
        }
        let i = actor.index();
        self.alive[i] = false;
        self.speed[i] = 0.0;
        self.destroy_calls += 1;
        debug!(actor = %actor, model = %self.model[i], "sandbox_actor_destroyed");
        true
    }

    fn is_alive(&self, actor: ActorId) -> bool {
        self.check(actor).is_ok()
    }

    fn actor_kind(&self, actor: ActorId) -> WorldResult<ActorKind> {
        self.check(actor)?;
        Ok(self.kind[actor.index()])
    }

    fn model(&self, actor: ActorId) -> WorldResult<&str> {
        self.check(actor)?;
        Ok(&self.model[actor.index()])
    }

    fn transform(&self, actor: ActorId) -> WorldResult<Transform> {
        self.check(actor)?;
        Ok(self.transform[actor.index()])
    }

    fn velocity(&self, actor: ActorId) -> WorldResult<Location> {
        self.check(actor)?;
        let i = actor.index();
        Ok(self.transform[i].rotation.forward_vector().scaled(self.speed[i]))
    }

    fn control(&self, actor: ActorId) -> WorldResult<VehicleControl> {
        self.check(actor)?;
        Ok(self.control[actor.index()])
    }

    fn autopilot(&self, actor: ActorId) -> WorldResult<bool> {
        self.check(actor)?;
        Ok(self.autopilot[actor.index()])
    }

    fn simulate_physics(&self, actor: ActorId) -> WorldResult<bool> {
        self.check(actor)?;
        Ok(self.physics[actor.index()])
    }

    fn walker_controller(&self, walker: ActorId) -> Option<ActorId> {
        self.check(walker).ok()?;
        let ctrl = self.controller[walker.index()];
        (ctrl.is_valid() && self.is_alive(ctrl)).then_some(ctrl)
    }

    fn walker_controller_running(&self, controller: ActorId) -> WorldResult<bool> {
        self.check_kind(controller, ActorKind::WalkerController)?;
        Ok(self.running[controller.index()])
    }

    fn waypoint(&self, location: Location) -> Option<Waypoint> {
        self.road.waypoint(location)
    }

    fn adjacent_lane(&self, waypoint: &Waypoint, side: LaneSide) -> Option<Waypoint> {
        self.road.adjacent(waypoint, side)
    }

    fn ego_route(&self) -> Option<&[Location]> {
        self.ego_route.as_deref()
    }

    fn weather(&self) -> WeatherParameters {
        self.weather
    }

    fn road_friction(&self) -> f32 {
        self.road_friction
    }

    fn set_transform(&mut self, actor: ActorId, transform: Transform) -> WorldResult<()> {
        self.check(actor)?;
        self.transform[actor.index()] = transform;
        Ok(())
    }

    fn set_simulate_physics(&mut self, actor: ActorId, enabled: bool) -> WorldResult<()> {
        self.check(actor)?;
        self.physics[actor.index()] = enabled;
        Ok(())
    }

    fn set_autopilot(&mut self, actor: ActorId, enabled: bool) -> WorldResult<()> {
        self.check_kind(actor, ActorKind::Vehicle)?;
        self.autopilot[actor.index()] = enabled;
        Ok(())
    }

    fn apply_control(&mut self, actor: ActorId, control: VehicleControl) -> WorldResult<()> {
        self.check(actor)?;
        self.control[actor.index()] = control;
        Ok(())
    }

    fn set_target_speed(&mut self, actor: ActorId, speed: Option<f32>) -> WorldResult<()> {
        self.check(actor)?;
        self.target[actor.index()] = speed;
        Ok(())
    }

    fn set_walker_controller(&mut self, controller: ActorId, running: bool) -> WorldResult<()> {
        self.check_kind(controller, ActorKind::WalkerController)?;
        self.running[controller.index()] = running;
        Ok(())
    }

    fn set_weather(&mut self, weather: WeatherParameters) {
        self.weather = weather;
    }

    fn set_road_friction(&mut self, friction: f32) {
        self.road_friction = friction;
    }

    fn advance(&mut self, dt: f32) {
        self.step(dt);
    }
}

// ── SandboxWorldBuilder ───────────────────────────────────────────────────────

/// Fluent builder for [`SandboxWorld`].
///
/// ```rust
/// use ts_world::{RoadLayout, SandboxWorldBuilder};
///
/// let world = SandboxWorldBuilder::new(42)
///     .road(RoadLayout { lane_count: 3, ..RoadLayout::default() })
///     .spawn_spacing(25.0)
///     .ego_route_lane(1)
///     .build();
/// assert!(world.alive_actors().is_empty());
/// ```
pub struct SandboxWorldBuilder {
    seed:          u64,
    road:          RoadLayout,
    blueprints:    Vec<String>,
    spawn_spacing: f32,
    route_lane:    Option<i32>,
    weather:       WeatherParameters,
    road_friction: f32,
    dynamics:      Dynamics,
}

impl SandboxWorldBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            road:          RoadLayout::default(),
            blueprints:    DEFAULT_BLUEPRINTS.iter().map(|s| s.to_string()).collect(),
            spawn_spacing: 20.0,
            route_lane:    None,
            weather:       WeatherParameters::default(),
            road_friction: DEFAULT_ROAD_FRICTION,
            dynamics:      Dynamics::default(),
        }
    }

    pub fn road(mut self, road: RoadLayout) -> Self {
        self.road = road;
        self
    }

    /// Replace the blueprint library.
    pub fn blueprints<I, S>(mut self, blueprints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blueprints = blueprints.into_iter().map(Into::into).collect();
        self
    }

    /// Distance between generated spawn points along each lane.
    pub fn spawn_spacing(mut self, metres: f32) -> Self {
        self.spawn_spacing = metres;
        self
    }

    /// Give the ego a route along `lane_id`.
    pub fn ego_route_lane(mut self, lane_id: i32) -> Self {
        self.route_lane = Some(lane_id);
        self
    }

    pub fn weather(mut self, weather: WeatherParameters) -> Self {
        self.weather = weather;
        self
    }

    pub fn road_friction(mut self, friction: f32) -> Self {
        self.road_friction = friction;
        self
    }

    pub fn dynamics(mut self, dynamics: Dynamics) -> Self {
        self.dynamics = dynamics;
        self
    }

    pub fn build(self) -> SandboxWorld {
        let spawn_points = self.road.spawn_points(self.spawn_spacing);
        let ego_route = self.route_lane.map(|lane| self.road.route(lane, 2.0));
        SandboxWorld {
            model:      Vec::new(),
            kind:       Vec::new(),
            rolename:   Vec::new(),
            alive:      Vec::new(),
            transform:  Vec::new(),
            speed:      Vec::new(),
            control:    Vec::new(),
            autopilot:  Vec::new(),
            physics:    Vec::new(),
            target:     Vec::new(),
            controller: Vec::new(),
            running:    Vec::new(),

            road:          self.road,
            blueprints:    self.blueprints,
            spawn_points,
            ego_route,
            weather:       self.weather,
            road_friction: self.road_friction,
            dynamics:      self.dynamics,
            rng:           SimRng::new(self.seed),

            pending_failures: 0,
            spawn_attempts:   Vec::new(),
            destroy_calls:    0,
        }
    }
}
