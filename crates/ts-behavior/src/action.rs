//! Leaf actions that read or write the world.
//!
//! A world call that fails (usually because the actor is gone) turns into
//! `Failure` plus a `warn!`; the enclosing composite decides what that means.

use tracing::warn;
use ts_core::{ActorId, ActorKind, Location, Transform};
use ts_world::{LaneSide, VehicleControl, WeatherPatch, WorldResult};

use crate::{Behavior, LifecycleState, Status, TickContext, Trigger};

fn finish(node: &str, result: WorldResult<()>) -> Status {
    match result {
        Ok(()) => Status::Success,
        Err(e) => {
            warn!(node, error = %e, "behavior_failed");
            Status::Failure
        }
    }
}

/// Distance travelled since the previous sample; keeps the running total.
#[derive(Default, Debug, Clone)]
struct Odometer {
    last:      Option<Location>,
    travelled: f32,
}

impl Odometer {
    fn sample(&mut self, at: Location) -> f32 {
        if let Some(last) = self.last {
            self.travelled += last.distance(at);
        }
        self.last = Some(at);
        self.travelled
    }

    fn reset(&mut self) {
        *self = Odometer::default();
    }
}

// ── Pose / physics ────────────────────────────────────────────────────────────

/// Teleport an actor and set its physics flag.
pub struct ActorTransformSetter {
    name:      String,
    actor:     ActorId,
    transform: Transform,
    physics:   bool,
}

impl ActorTransformSetter {
    pub fn new(actor: ActorId, transform: Transform, physics: bool) -> Self {
        Self { name: format!("TransformSetter {actor}"), actor, transform, physics }
    }
}

impl Behavior for ActorTransformSetter {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        let result = ctx
            .world
            .set_transform(self.actor, self.transform)
            .and_then(|_| ctx.world.set_simulate_physics(self.actor, self.physics));
        finish(&self.name, result)
    }
}

// ── Control ───────────────────────────────────────────────────────────────────

/// Apply `brake` (0 releases it).  Braking also zeroes the throttle.
pub struct StopVehicle {
    name:  String,
    actor: ActorId,
    brake: f32,
}

impl StopVehicle {
    pub fn new(actor: ActorId, brake: f32) -> Self {
        let brake = brake.clamp(0.0, 1.0);
        let verb = if brake > 0.0 { "BrakeOn" } else { "BrakeOff" };
        Self { name: format!("{verb} {actor}"), actor, brake }
    }
}

impl Behavior for StopVehicle {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        let result = ctx.world.control(self.actor).and_then(|mut control| {
            control.brake = self.brake;
            control.hand_brake = false;
            if self.brake > 0.0 {
                control.throttle = 0.0;
            }
            ctx.world.apply_control(self.actor, control)
        });
        finish(&self.name, result)
    }
}

/// Switch a vehicle's autopilot on or off.
pub struct ChangeAutoPilot {
    name:    String,
    actor:   ActorId,
    enabled: bool,
}

impl ChangeAutoPilot {
    pub fn new(actor: ActorId, enabled: bool) -> Self {
        let state = if enabled { "On" } else { "Off" };
        Self { name: format!("AutoPilot{state} {actor}"), actor, enabled }
    }
}

impl Behavior for ChangeAutoPilot {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        finish(&self.name, ctx.world.set_autopilot(self.actor, self.enabled))
    }
}

/// Start or stop the AI controller attached to a walker.
pub struct ToggleWalkerController {
    name:    String,
    walker:  ActorId,
    running: bool,
}

impl ToggleWalkerController {
    pub fn new(walker: ActorId, running: bool) -> Self {
        let state = if running { "Start" } else { "Stop" };
        Self { name: format!("WalkerController{state} {walker}"), walker, running }
    }
}

impl Behavior for ToggleWalkerController {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        let Some(controller) = ctx.world.walker_controller(self.walker) else {
            warn!(node = %self.name, walker = %self.walker, "walker_controller_missing");
            return Status::Failure;
        };
        finish(&self.name, ctx.world.set_walker_controller(controller, self.running))
    }
}

/// Hold a constant speed, optionally only until `distance` metres are
/// covered.
///
/// Without a distance it runs forever.  On success the speed hold is
/// released.
pub struct KeepVelocity {
    name:     String,
    actor:    ActorId,
    speed:    f32,
    distance: Option<f32>,
    odometer: Odometer,
}

impl KeepVelocity {
    pub fn new(actor: ActorId, speed: f32) -> Self {
        Self {
            name:     format!("KeepVelocity {actor} {speed} m/s"),
            actor,
            speed,
            distance: None,
            odometer: Odometer::default(),
        }
    }

    pub fn for_distance(mut self, metres: f32) -> Self {
        self.name = format!("KeepVelocity {} {} m/s for {metres} m", self.actor, self.speed);
        self.distance = Some(metres);
        self
    }
}

impl Behavior for KeepVelocity {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        let at = match ctx.world.location(self.actor) {
            Ok(at) => at,
            Err(e) => return finish(&self.name, Err(e)),
        };
        let travelled = self.odometer.sample(at);
        if self.distance.is_some_and(|d| travelled >= d) {
            return finish(&self.name, ctx.world.set_target_speed(self.actor, None));
        }
        match ctx.world.set_target_speed(self.actor, Some(self.speed)) {
            Ok(()) => Status::Running,
            Err(e) => finish(&self.name, Err(e)),
        }
    }

    fn reset(&mut self) {
        self.odometer.reset();
    }
}

/// Throttle until `actor` catches up with `other`.
///
/// While slower than `other`'s speed plus `delta_velocity` the full
/// `throttle` is applied, otherwise none.  Succeeds once within
/// `trigger_distance` of `other`; fails after driving `max_distance`
/// without getting there.
pub struct AccelerateToCatchUp {
    name:             String,
    actor:            ActorId,
    other:            ActorId,
    throttle:         f32,
    delta_velocity:   f32,
    trigger_distance: f32,
    max_distance:     f32,
    odometer:         Odometer,
    started:          bool,
}

impl AccelerateToCatchUp {
    pub fn new(actor: ActorId, other: ActorId) -> Self {
        Self {
            name:             format!("AccelerateToCatchUp {actor}"),
            actor,
            other,
            throttle:         1.0,
            delta_velocity:   10.0,
            trigger_distance: 5.0,
            max_distance:     500.0,
            odometer:         Odometer::default(),
            started:          false,
        }
    }

    pub fn throttle(mut self, value: f32) -> Self {
        self.throttle = value.clamp(0.0, 1.0);
        self
    }

    pub fn delta_velocity(mut self, value: f32) -> Self {
        self.delta_velocity = value;
        self
    }

    pub fn trigger_distance(mut self, metres: f32) -> Self {
        self.trigger_distance = metres;
        self
    }

    pub fn max_distance(mut self, metres: f32) -> Self {
        self.max_distance = metres;
        self
    }

    fn step(&mut self, ctx: &mut TickContext<'_>) -> WorldResult<Status> {
        let world = &mut *ctx.world;
        if !self.started {
            // Manual throttle only takes effect with no other speed source.
            world.set_target_speed(self.actor, None)?;
            if world.actor_kind(self.actor)? == ActorKind::Vehicle {
                world.set_autopilot(self.actor, false)?;
            }
            self.started = true;
        }

        let travelled = self.odometer.sample(world.location(self.actor)?);
        if world.distance(self.actor, self.other)? <= self.trigger_distance {
            world.apply_control(self.actor, VehicleControl::default())?;
            return Ok(Status::Success);
        }
        if travelled > self.max_distance {
            return Ok(Status::Failure);
        }

        let target = world.speed(self.other)? + self.delta_velocity;
        let control = if world.speed(self.actor)? < target {
            VehicleControl::throttle(self.throttle)
        } else {
            VehicleControl::default()
        };
        world.apply_control(self.actor, control)?;
        Ok(Status::Running)
    }
}

impl Behavior for AccelerateToCatchUp {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        match self.step(ctx) {
            Ok(status) => status,
            Err(e) => finish(&self.name, Err(e)),
        }
    }

    fn reset(&mut self) {
        self.odometer.reset();
        self.started = false;
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum LanePhase {
    SameLane,
    OtherLane,
}

/// Drive `distance_same_lane`, move into the neighbouring lane, drive
/// `distance_other_lane` there, then succeed.  Fails if there is no lane on
/// that side.
pub struct LaneChange {
    name:                String,
    actor:               ActorId,
    side:                LaneSide,
    speed:               Option<f32>,
    distance_same_lane:  f32,
    distance_other_lane: f32,
    phase:               LanePhase,
    odometer:            Odometer,
}

impl LaneChange {
    pub fn new(actor: ActorId, side: LaneSide) -> Self {
        Self {
            name:                format!("LaneChange {actor} {side:?}"),
            actor,
            side,
            speed:               None,
            distance_same_lane:  25.0,
            distance_other_lane: 300.0,
            phase:               LanePhase::SameLane,
            odometer:            Odometer::default(),
        }
    }

    /// Hold this speed during the manoeuvre; default keeps the current one.
    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn distances(mut self, same_lane: f32, other_lane: f32) -> Self {
        self.distance_same_lane = same_lane;
        self.distance_other_lane = other_lane;
        self
    }

    fn step(&mut self, ctx: &mut TickContext<'_>) -> WorldResult<Status> {
        let world = &mut *ctx.world;
        let at = world.transform(self.actor)?;
        if self.odometer.last.is_none() {
            let speed = match self.speed {
                Some(s) => s,
                None => world.speed(self.actor)?,
            };
            world.set_target_speed(self.actor, Some(speed))?;
        }
        let travelled = self.odometer.sample(at.location);

        match self.phase {
            LanePhase::SameLane if travelled >= self.distance_same_lane => {
                let target = world
                    .waypoint(at.location)
                    .and_then(|wp| world.adjacent_lane(&wp, self.side));
                let Some(target) = target else {
                    warn!(node = %self.name, at = %at.location, "lane_change_no_lane");
                    world.set_target_speed(self.actor, None)?;
                    return Ok(Status::Failure);
                };
                let pose = Transform::new(
                    target.location().with_z_offset(at.location.z - target.location().z),
                    at.rotation,
                );
                world.set_transform(self.actor, pose)?;
                self.phase = LanePhase::OtherLane;
                self.odometer = Odometer { last: Some(pose.location), travelled: 0.0 };
                Ok(Status::Running)
            }
            LanePhase::OtherLane if travelled >= self.distance_other_lane => {
                world.set_target_speed(self.actor, None)?;
                Ok(Status::Success)
            }
            _ => Ok(Status::Running),
        }
    }
}

impl Behavior for LaneChange {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        match self.step(ctx) {
            Ok(status) => status,
            Err(e) => finish(&self.name, Err(e)),
        }
    }

    fn reset(&mut self) {
        self.phase = LanePhase::SameLane;
        self.odometer.reset();
    }
}

// ── Waiting ───────────────────────────────────────────────────────────────────

/// Runs forever.
pub struct Idle {
    name: String,
}

impl Idle {
    pub fn new() -> Self {
        Self { name: "Idle".into() }
    }
}

impl Default for Idle {
    fn default() -> Self {
        Self::new()
    }
}

impl Behavior for Idle {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, _ctx: &mut TickContext<'_>) -> Status {
        Status::Running
    }
}

/// Succeeds once `timeout_secs` simulated seconds have passed since its
/// first tick.
pub struct TimeOut {
    name:         String,
    timeout_secs: f64,
    started_at:   Option<f64>,
}

impl TimeOut {
    pub fn new(timeout_secs: f64) -> Self {
        Self { name: format!("TimeOut {timeout_secs} s"), timeout_secs, started_at: None }
    }
}

impl Behavior for TimeOut {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        let started = *self.started_at.get_or_insert(ctx.elapsed_secs);
        if ctx.elapsed_secs - started >= self.timeout_secs {
            Status::Success
        } else {
            Status::Running
        }
    }

    fn reset(&mut self) {
        self.started_at = None;
    }
}

/// Succeeds once `actor` has covered `distance` metres from where it was on
/// the first tick.
pub struct DriveDistance {
    name:     String,
    actor:    ActorId,
    distance: f32,
    odometer: Odometer,
}

impl DriveDistance {
    pub fn new(actor: ActorId, distance: f32) -> Self {
        Self { name: format!("DriveDistance {actor} {distance} m"), actor, distance, odometer: Odometer::default() }
    }

    pub fn travelled(&self) -> f32 {
        self.odometer.travelled
    }
}

impl Behavior for DriveDistance {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        match ctx.world.location(self.actor) {
            Ok(at) if self.odometer.sample(at) >= self.distance => Status::Success,
            Ok(_) => Status::Running,
            Err(e) => finish(&self.name, Err(e)),
        }
    }

    fn reset(&mut self) {
        self.odometer.reset();
    }
}

/// `Running` until the trigger holds, then `Success`.
pub struct WaitFor {
    name:    String,
    trigger: Trigger,
}

impl WaitFor {
    pub fn new(trigger: Trigger) -> Self {
        Self { name: format!("WaitFor {}", trigger.describe()), trigger }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Behavior for WaitFor {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        if self.trigger.evaluate(ctx) {
            Status::Success
        } else {
            Status::Running
        }
    }

    fn reset(&mut self) {
        self.trigger.reset();
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

/// Destroy an actor (and its walker controller, if any).
///
/// Safe to tick repeatedly: an actor already marked `Removed`, or already
/// gone from the world, is not destroyed again.
pub struct ActorDestroy {
    name:  String,
    actor: ActorId,
}

impl ActorDestroy {
    pub fn new(actor: ActorId) -> Self {
        Self { name: format!("Destroy {actor}"), actor }
    }
}

impl Behavior for ActorDestroy {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        if ctx.registry.state(self.actor) == Some(LifecycleState::Removed) {
            return Status::Success;
        }
        if ctx.world.is_alive(self.actor) {
            if let Some(controller) = ctx.world.walker_controller(self.actor) {
                ctx.world.destroy_actor(controller);
            }
            ctx.world.destroy_actor(self.actor);
        }
        if ctx.registry.state(self.actor).is_some() {
            if let Err(e) = ctx.registry.transition(self.actor, LifecycleState::Removed, ctx.tick) {
                warn!(node = %self.name, error = %e, "behavior_failed");
                return Status::Failure;
            }
        }
        Status::Success
    }
}

/// Advance an actor's registry entry to `to`.
pub struct LifecycleTransition {
    name:  String,
    actor: ActorId,
    to:    LifecycleState,
}

impl LifecycleTransition {
    pub fn new(actor: ActorId, to: LifecycleState) -> Self {
        Self { name: format!("Mark {actor} {to}"), actor, to }
    }
}

impl Behavior for LifecycleTransition {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        match ctx.registry.transition(self.actor, self.to, ctx.tick) {
            Ok(()) => Status::Success,
            Err(e) => {
                warn!(node = %self.name, error = %e, "behavior_failed");
                Status::Failure
            }
        }
    }
}

// ── Environment ───────────────────────────────────────────────────────────────

/// Apply a partial weather update on top of the current weather.
pub struct ChangeWeather {
    name:  String,
    patch: WeatherPatch,
}

impl ChangeWeather {
    pub fn new(patch: WeatherPatch) -> Self {
        Self { name: format!("ChangeWeather ({} fields)", patch.fields.len()), patch }
    }
}

impl Behavior for ChangeWeather {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        let weather = self.patch.apply(ctx.world.weather());
        ctx.world.set_weather(weather);
        Status::Success
    }
}

pub struct ChangeRoadFriction {
    name:     String,
    friction: f32,
}

impl ChangeRoadFriction {
    pub fn new(friction: f32) -> Self {
        Self { name: format!("ChangeRoadFriction {friction}"), friction }
    }
}

impl Behavior for ChangeRoadFriction {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        ctx.world.set_road_friction(self.friction);
        Status::Success
    }
}
