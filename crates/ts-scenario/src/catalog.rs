//! The scenario catalog.
//!
//! Each [`ScenarioKind`] carries a plain configuration struct and turns it
//! into a [`ScenarioPlan`] against the current map.  Variants differ only in
//! configuration and strategy choice; there is one assembler for all of them.

use tracing::warn;
use ts_behavior::HornConfig;
use ts_core::{Location, Rotation, Transform, geo};
use ts_world::{LaneSide, WeatherPatch, World};

use crate::strategy::{
    ActorBehavior, CutInManeuver, EndCondition, PlacedActor, PushZone, ScenarioPlan, SpawnStrategy,
    StartTrigger,
};
use crate::{RetryPolicy, ScenarioError, ScenarioResult};

/// How close, along its route, the ego must come to a scenario's trigger
/// point before the scenario's actors are released, metres.
pub const DEFAULT_TRIGGER_DISTANCE: f32 = 5.0;

// ── Road friction ─────────────────────────────────────────────────────────────

/// Tyre-road friction coefficients.
pub struct RoadFriction;

impl RoadFriction {
    pub const DRY:     f32 = 0.7;
    pub const WET:     f32 = 0.4;
    /// Simulator default.
    pub const DEFAULT: f32 = 10.0;
}

// ── Background ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackgroundConfig {
    /// Model filters; `total` is split evenly, the last takes the remainder.
    pub models:              Vec<String>,
    pub total:               usize,
    /// Blueprints never spawned even when a filter matches.
    pub model_exceptions:    Vec<String>,
    pub horn:                HornConfig,
    /// Ego distance that ends the scenario.  `<= 0` runs until timeout.
    pub ego_distance_driven: f32,
    pub start:               StartTrigger,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            models:              vec!["vehicle.*".into()],
            total:               50,
            model_exceptions:    vec!["vehicle.tram.tram".into()],
            horn:                HornConfig::default(),
            ego_distance_driven: -1.0,
            start:               StartTrigger::Immediate,
        }
    }
}

impl BackgroundConfig {
    pub fn pedestrians(total: usize) -> Self {
        Self { models: vec!["walker.*".into()], total, model_exceptions: Vec::new(), ..Self::default() }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnOnTriggerConfig {
    pub background:       BackgroundConfig,
    pub trigger:          Location,
    /// Ego distance along its route that releases the actors; also the
    /// radius of the push zone around `trigger`.
    pub trigger_distance: f32,
    /// How far actors spawned in the trigger zone are pushed forward.
    pub push:             f32,
}

impl SpawnOnTriggerConfig {
    pub fn new(trigger: Location) -> Self {
        Self { background: BackgroundConfig::default(), trigger, trigger_distance: 20.0, push: 20.0 }
    }
}

// ── Obstructing ───────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObstructTrigger {
    /// The actor starts standing once the ego honks nearby.
    Horn,
    /// The actor starts standing once the ego reaches the trigger point.
    Timer,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstructingConfig {
    pub model:            String,
    pub trigger:          Location,
    pub start:            ObstructTrigger,
    /// Route distance to `trigger` that releases a `Timer` actor.
    pub trigger_distance: f32,
    /// Distance ahead of the trigger waypoint, metres.
    pub ahead:            f32,
    /// Sideways offset towards the curb as a fraction of the lane width.
    pub curb_offset:      f32,
    pub z_offset:         f32,
    pub horn:             HornConfig,
    /// Seconds the actor blocks the lane before moving.
    pub standing_secs:    f64,
    /// Seconds of horn-aware driving before it is removed.
    pub drive_secs:       f64,
    /// Ego distance after the actor is gone.
    pub ego_distance:     f32,
}

impl ObstructingConfig {
    pub fn new(model: impl Into<String>, trigger: Location, start: ObstructTrigger) -> Self {
        Self {
            model: model.into(),
            trigger,
            start,
            trigger_distance: DEFAULT_TRIGGER_DISTANCE,
            ahead:            20.0,
            curb_offset:      0.2,
            z_offset:         0.6,
            horn:             HornConfig { horn_distance: 15.0 },
            standing_secs:    15.0,
            drive_secs:       15.0,
            ego_distance:     40.0,
        }
    }

    pub fn firetruck(trigger: Location) -> Self {
        Self::new("vehicle.carlamotors.firetruck", trigger, ObstructTrigger::Horn)
    }

    pub fn vehicle_horn(trigger: Location) -> Self {
        Self::new("vehicle.tesla.model3", trigger, ObstructTrigger::Horn)
    }

    pub fn vehicle_timer(trigger: Location) -> Self {
        Self::new("vehicle.ford.crown", trigger, ObstructTrigger::Timer)
    }

    pub fn pedestrian_horn(trigger: Location) -> Self {
        Self::new("walker.*", trigger, ObstructTrigger::Horn)
    }

    pub fn pedestrian_timer(trigger: Location) -> Self {
        Self::new("walker.*", trigger, ObstructTrigger::Timer)
    }
}

// ── Cut-in ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CutInConfig {
    pub model:            String,
    pub trigger:          Location,
    /// Route distance to `trigger` that releases both vehicles.
    pub trigger_distance: f32,
    /// Cutter spawn distance behind the trigger waypoint.
    pub behind_ego:       f32,
    /// Straight vehicle spawn distance behind the cutter.
    pub behind_cutter:    f32,
    /// Speed the straight vehicle holds.
    pub straight_speed:   f32,
    pub maneuver:         CutInManeuver,
}

impl CutInConfig {
    pub fn new(trigger: Location) -> Self {
        Self {
            model:            "vehicle.tesla.model3".into(),
            trigger,
            trigger_distance: DEFAULT_TRIGGER_DISTANCE,
            behind_ego:       20.0,
            behind_cutter:    10.0,
            straight_speed:   11.0,
            maneuver:         CutInManeuver::default(),
        }
    }
}

// ── Still walkers ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StillWalkersConfig {
    pub model:            String,
    pub trigger:          Location,
    /// Route distance to `trigger` that starts the ego-distance countdown.
    pub trigger_distance: f32,
    /// Sideways offsets relative to the trigger heading.
    pub delta_xs:         Vec<f32>,
    /// Offsets ahead of the trigger, before `buffer` is added.
    pub delta_ys:         Vec<f32>,
    pub buffer:           f32,
    pub z_offset:         f32,
    pub reveal_interval:  f64,
    /// Ego distance, counted from the trigger, that ends the scenario.
    pub ego_distance:     f32,
}

impl StillWalkersConfig {
    pub fn new(trigger: Location) -> Self {
        Self {
            model:            "walker.*".into(),
            trigger,
            trigger_distance: DEFAULT_TRIGGER_DISTANCE,
            delta_xs:         vec![0.0],
            delta_ys:         vec![35.0],
            buffer:           5.0,
            z_offset:         0.8,
            reveal_interval:  2.0,
            ego_distance:     60.0,
        }
    }
}

// ── Weather ───────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeatherPreset {
    Clear,
    Overcast,
    HardRain,
}

impl WeatherPreset {
    pub fn name(self) -> &'static str {
        match self {
            WeatherPreset::Clear    => "WeatherClear",
            WeatherPreset::Overcast => "WeatherOvercast",
            WeatherPreset::HardRain => "WeatherHardRain",
        }
    }

    /// Fields this preset overrides; the rest keep their current value.
    pub fn patch(self) -> WeatherPatch {
        let values: [(&str, f32); 10] = match self {
            WeatherPreset::Clear => [
                ("cloudiness", 10.0), ("precipitation", 0.0), ("precipitation_deposits", 0.0),
                ("wind_intensity", 5.0), ("fog_density", 0.0), ("fog_distance", 0.0),
                ("fog_falloff", 0.2), ("wetness", 0.0), ("scattering_intensity", 0.0),
                ("mie_scattering_scale", 0.0331),
            ],
            WeatherPreset::Overcast => [
                ("cloudiness", 80.0), ("precipitation", 0.0), ("precipitation_deposits", 0.0),
                ("wind_intensity", 50.0), ("fog_density", 2.0), ("fog_distance", 0.75),
                ("fog_falloff", 0.1), ("wetness", 10.0), ("scattering_intensity", 0.0),
                ("mie_scattering_scale", 0.0331),
            ],
            WeatherPreset::HardRain => [
                ("cloudiness", 100.0), ("precipitation", 80.0), ("precipitation_deposits", 90.0),
                ("wind_intensity", 100.0), ("fog_density", 7.0), ("fog_distance", 0.75),
                ("fog_falloff", 0.1), ("wetness", 100.0), ("scattering_intensity", 0.0),
                ("mie_scattering_scale", 0.0331),
            ],
        };
        WeatherPatch::from_pairs(values)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeatherConfig {
    pub patch:         WeatherPatch,
    pub road_friction: Option<f32>,
    name:              String,
}

impl WeatherConfig {
    pub fn preset(preset: WeatherPreset) -> Self {
        Self { patch: preset.patch(), road_friction: None, name: preset.name().into() }
    }

    /// Arbitrary `(field, value)` pairs; unknown field names are skipped.
    pub fn custom<'a>(name: impl Into<String>, pairs: impl IntoIterator<Item = (&'a str, f32)>) -> Self {
        Self { patch: WeatherPatch::from_pairs(pairs), road_friction: None, name: name.into() }
    }

    pub fn with_road_friction(mut self, friction: f32) -> Self {
        self.road_friction = Some(friction);
        self
    }
}

// ── ScenarioKind ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScenarioKind {
    Background(BackgroundConfig),
    SpawnOnTrigger(SpawnOnTriggerConfig),
    Obstructing(ObstructingConfig),
    CutIn(CutInConfig),
    StillWalkers(StillWalkersConfig),
    Weather(WeatherConfig),
}

impl ScenarioKind {
    pub fn name(&self) -> String {
        match self {
            ScenarioKind::Background(_)     => "Background".into(),
            ScenarioKind::SpawnOnTrigger(_) => "SpawnOnTrigger".into(),
            ScenarioKind::Obstructing(c)    => match c.start {
                ObstructTrigger::Horn  => "ObstructingHorn".into(),
                ObstructTrigger::Timer => "ObstructingTimer".into(),
            },
            ScenarioKind::CutIn(_)          => "CutIn".into(),
            ScenarioKind::StillWalkers(_)   => "StillWalkers".into(),
            ScenarioKind::Weather(c)        => c.name.clone(),
        }
    }

    /// Resolve positions against the map and pick strategies.
    pub fn plan(&self, world: &dyn World) -> ScenarioResult<ScenarioPlan> {
        let mut plan = ScenarioPlan::new(self.name());
        match self {
            ScenarioKind::Background(c) => {
                plan.spawn = background_spawn(c, None);
                plan.start = c.start.clone();
                plan.end = EndCondition::EgoDriveDistance(c.ego_distance_driven);
            }
            ScenarioKind::SpawnOnTrigger(c) => {
                let zone = PushZone { location: c.trigger, radius: c.trigger_distance, push: c.push };
                plan.spawn = background_spawn(&c.background, Some(zone));
                plan.start = StartTrigger::AlongRoute { location: c.trigger, distance: c.trigger_distance };
                plan.end = EndCondition::EgoDriveDistance(c.background.ego_distance_driven);
            }
            ScenarioKind::Obstructing(c) => {
                let reference = trigger_waypoint(world, c.trigger)?;
                let wp = reference.next(c.ahead);
                // Curb side, facing across the lane.
                let at = wp.transform.shifted_right(c.curb_offset * wp.lane_width).with_z_offset(c.z_offset);
                let pose = Transform::new(at.location, Rotation::from_yaw(wp.transform.rotation.yaw + 270.0));
                plan.spawn = SpawnStrategy::Placed(vec![PlacedActor {
                    model:    c.model.clone(),
                    pose,
                    behavior: ActorBehavior::Obstruct { horn: c.horn.clone(), drive_secs: c.drive_secs },
                }]);
                plan.start = match c.start {
                    ObstructTrigger::Horn  => StartTrigger::Horn { distance: c.horn.horn_distance },
                    ObstructTrigger::Timer => {
                        StartTrigger::AlongRoute { location: c.trigger, distance: c.trigger_distance }
                    }
                };
                plan.standing_secs = Some(c.standing_secs);
                plan.epilogue = Some(c.ego_distance);
            }
            ScenarioKind::CutIn(c) => {
                let reference = trigger_waypoint(world, c.trigger)?;
                let (lane, side) = match world.adjacent_lane(&reference, LaneSide::Right) {
                    Some(wp) => (wp, Some(LaneSide::Left)),
                    None => match world.adjacent_lane(&reference, LaneSide::Left) {
                        Some(wp) => (wp, Some(LaneSide::Right)),
                        None => {
                            warn!(at = %c.trigger, "cut_in_single_lane");
                            (reference, None)
                        }
                    },
                };
                let cutter = lane.previous(c.behind_ego);
                let straight = cutter.previous(c.behind_cutter);
                let maneuver = CutInManeuver { side, ..c.maneuver.clone() };
                plan.spawn = SpawnStrategy::Placed(vec![
                    PlacedActor {
                        model:    c.model.clone(),
                        pose:     cutter.transform,
                        behavior: ActorBehavior::CutIn(maneuver),
                    },
                    PlacedActor {
                        model:    c.model.clone(),
                        pose:     straight.transform,
                        behavior: ActorBehavior::KeepVelocity { speed: c.straight_speed },
                    },
                ]);
                plan.autonomous = false;
                plan.start = StartTrigger::AlongRoute { location: c.trigger, distance: c.trigger_distance };
            }
            ScenarioKind::StillWalkers(c) => {
                let reference = trigger_waypoint(world, c.trigger)?;
                let compass = reference.transform.rotation.compass();
                let origin = reference.location();
                let mut placed = Vec::with_capacity(c.delta_xs.len() * c.delta_ys.len());
                for &dy in &c.delta_ys {
                    for &dx in &c.delta_xs {
                        let (x, y) = geo::relative_to_absolute(compass, dx, dy + c.buffer);
                        let at = origin + Location::new(x, y, c.z_offset);
                        placed.push(PlacedActor {
                            model:    c.model.clone(),
                            pose:     Transform::new(at, Rotation::default()),
                            behavior: ActorBehavior::Idle,
                        });
                    }
                }
                plan.spawn = SpawnStrategy::Placed(placed);
                plan.autonomous = false;
                plan.reveal_interval = Some(c.reveal_interval);
                plan.start = StartTrigger::AlongRoute { location: c.trigger, distance: c.trigger_distance };
                plan.end = EndCondition::EgoDriveDistance(c.ego_distance);
            }
            ScenarioKind::Weather(c) => {
                plan.weather = Some(c.patch.clone());
                plan.road_friction = c.road_friction;
                plan.retry = RetryPolicy::none();
            }
        }
        Ok(plan)
    }
}

fn background_spawn(c: &BackgroundConfig, push: Option<PushZone>) -> SpawnStrategy {
    SpawnStrategy::Batch {
        models:     c.models.clone(),
        total:      c.total,
        exceptions: c.model_exceptions.clone(),
        behavior:   ActorBehavior::Horn(c.horn.clone()),
        push,
    }
}

fn trigger_waypoint(world: &dyn World, at: Location) -> ScenarioResult<ts_world::Waypoint> {
    world
        .waypoint(at)
        .ok_or_else(|| ScenarioError::Config(format!("trigger point {at} is off the road")))
}
