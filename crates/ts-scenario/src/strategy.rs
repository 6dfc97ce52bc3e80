//! Tagged strategies a scenario plan is made of, and the one routine that
//! turns a plan into an assembled tree.
//!
//! | Strategy         | Decides                                           |
//! |------------------|---------------------------------------------------|
//! | [`SpawnStrategy`]| which actors exist and where they are revealed    |
//! | [`StartTrigger`] | when hidden-then-braked actors are released       |
//! | [`ActorBehavior`]| what governs each actor while `Active`            |
//! | [`EndCondition`] | what ends the main phase besides the actors       |

use tracing::{debug, info, warn};
use ts_behavior::{
    AccelerateToCatchUp, BoxedBehavior, ChangeRoadFriction, ChangeWeather, DriveDistance,
    HornBehaviorBuilder, HornConfig, Idle, KeepVelocity, LaneChange, OneShot, Parallel,
    ParallelPolicy, Sequence, TimeOut, Trigger, WaitFor, HORN,
};
use ts_core::{ActorId, Location, Transform, geo};
use ts_world::{BatchOptions, LaneSide, WeatherPatch, World};

use crate::spawn::{UNDERGROUND_Z, hide, parse_filters, split_batch};
use crate::{ActorLifecycle, RetryPolicy, ScenarioAssembler, ScenarioError, ScenarioResult, SpawnedActor, Spawner};

/// Start delay used in place of a route-based trigger when the ego has no
/// known route.
pub const NO_ROUTE_START_DELAY_SECS: f64 = 5.0;

// ── StartTrigger ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StartTrigger {
    /// Start on the first tick.
    Immediate,
    /// Ego within `distance` of `location` along its route.
    AlongRoute { location: Location, distance: f32 },
    /// Ego within `distance` of the first actor.
    Proximity { distance: f32 },
    /// Fixed delay after the actors are revealed.
    Delay { secs: f64 },
    /// Ego honks within `distance` of the first actor.
    Horn { distance: f32 },
}

impl StartTrigger {
    /// Concrete trigger for spawned actors; `None` means start immediately.
    pub fn resolve(
        &self,
        world: &dyn World,
        ego:   Option<ActorId>,
        first: Option<ActorId>,
    ) -> ScenarioResult<Option<Trigger>> {
        let trigger = match *self {
            StartTrigger::Immediate => None,
            StartTrigger::Delay { secs } => Some(Trigger::elapsed(secs)),
            StartTrigger::AlongRoute { location, distance } => {
                let ego = require_ego(ego, "route start trigger")?;
                if world.ego_route().is_some() {
                    Some(Trigger::AlongRoute { ego, location, distance })
                } else {
                    debug!(delay = NO_ROUTE_START_DELAY_SECS, "start_trigger_no_route");
                    Some(Trigger::elapsed(NO_ROUTE_START_DELAY_SECS))
                }
            }
            StartTrigger::Proximity { distance } => {
                let ego = require_ego(ego, "proximity start trigger")?;
                let actor = first.ok_or_else(|| ScenarioError::Config("proximity start trigger needs an actor".into()))?;
                Some(Trigger::within(ego, actor, distance))
            }
            StartTrigger::Horn { distance } => {
                let ego = require_ego(ego, "horn start trigger")?;
                let actor = first.ok_or_else(|| ScenarioError::Config("horn start trigger needs an actor".into()))?;
                Some(Trigger::All(vec![Trigger::flag(HORN, true), Trigger::within(ego, actor, distance)]))
            }
        };
        Ok(trigger)
    }
}

// ── ActorBehavior ─────────────────────────────────────────────────────────────

/// Cut-in maneuver parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CutInManeuver {
    /// Cruise speed before the ego catches up, m/s.
    pub cruise_speed:      f32,
    /// Ego distance that ends the cruise, metres.
    pub trigger_distance:  f32,
    /// Catch-up target is the ego speed plus this, m/s.
    pub delta_velocity:    f32,
    /// Catch-up succeeds within this distance of the ego, metres.
    pub catch_up_within:   f32,
    /// Catch-up fails beyond this distance, metres.
    pub give_up_beyond:    f32,
    /// Lane to move into; `None` on a single-lane road.
    pub side:              Option<LaneSide>,
    /// Speed held through the lane change and the drive after it, m/s.
    pub lane_change_speed: f32,
    /// Distance after the lane change before the maneuver ends, metres.
    pub drive_after:       f32,
}

impl Default for CutInManeuver {
    fn default() -> Self {
        Self {
            cruise_speed:      11.0,
            trigger_distance:  30.0,
            delta_velocity:    10.0,
            catch_up_within:   5.0,
            give_up_beyond:    500.0,
            side:              Some(LaneSide::Left),
            lane_change_speed: 10.0,
            drive_after:       200.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActorBehavior {
    /// Yield to the ego horn, otherwise carry on.  Never finishes.
    Horn(HornConfig),
    /// Stay where revealed.  Never finishes.
    Idle,
    /// Hold a constant speed.  Never finishes.
    KeepVelocity { speed: f32 },
    /// Horn behavior for at most `drive_secs`, then finish.
    Obstruct { horn: HornConfig, drive_secs: f64 },
    /// Cruise, catch up with the ego, change lane, drive on, then finish.
    CutIn(CutInManeuver),
}

impl ActorBehavior {
    pub fn build(&self, world: &dyn World, actor: &SpawnedActor, ego: Option<ActorId>) -> ScenarioResult<BoxedBehavior> {
        let id = actor.id;
        let behavior: BoxedBehavior = match self {
            ActorBehavior::Horn(config) => {
                let ego = require_ego(ego, "horn behavior")?;
                Box::new(HornBehaviorBuilder::new(id, ego).config(config.clone()).build(world)?)
            }
            ActorBehavior::Idle => Box::new(Idle::new()),
            ActorBehavior::KeepVelocity { speed } => Box::new(KeepVelocity::new(id, *speed)),
            ActorBehavior::Obstruct { horn, drive_secs } => {
                let ego = require_ego(ego, "obstructing behavior")?;
                let horn = HornBehaviorBuilder::new(id, ego).config(horn.clone()).build(world)?;
                Box::new(
                    Parallel::new(format!("Obstruct {id}"), ParallelPolicy::SuccessOnOne)
                        .push(horn)
                        .push(TimeOut::new(*drive_secs)),
                )
            }
            ActorBehavior::CutIn(m) => {
                let ego = require_ego(ego, "cut-in behavior")?;
                let cruise = Parallel::new(format!("Cruise {id}"), ParallelPolicy::SuccessOnOne)
                    .push(KeepVelocity::new(id, m.cruise_speed))
                    .push(WaitFor::new(Trigger::within(ego, id, m.trigger_distance)));
                let mut seq = Sequence::new(format!("CutIn {id}"))
                    .push(cruise)
                    .push(
                        AccelerateToCatchUp::new(id, ego)
                            .delta_velocity(m.delta_velocity)
                            .trigger_distance(m.catch_up_within)
                            .max_distance(m.give_up_beyond),
                    );
                if let Some(side) = m.side {
                    seq = seq.push(LaneChange::new(id, side).speed(m.lane_change_speed));
                }
                let drive_on = KeepVelocity::new(id, m.lane_change_speed).for_distance(m.drive_after);
                Box::new(seq.push(drive_on))
            }
        };
        Ok(behavior)
    }
}

// ── EndCondition ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndCondition {
    None,
    /// Ego has driven this far.  `<= 0` never ends.
    EgoDriveDistance(f32),
    /// Simulated seconds after the main phase starts.
    Timeout(f64),
}

impl EndCondition {
    pub fn build(&self, ego: Option<ActorId>) -> ScenarioResult<Option<BoxedBehavior>> {
        Ok(match *self {
            EndCondition::None => None,
            EndCondition::EgoDriveDistance(d) if d <= 0.0 => None,
            EndCondition::EgoDriveDistance(d) => {
                let ego = require_ego(ego, "drive-distance end condition")?;
                Some(Box::new(DriveDistance::new(ego, d)))
            }
            EndCondition::Timeout(secs) => Some(Box::new(TimeOut::new(secs))),
        })
    }
}

// ── SpawnStrategy ─────────────────────────────────────────────────────────────

/// Actors near `location` on its lane are moved `push` metres forward
/// before being hidden, so they appear ahead of an approaching ego.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PushZone {
    pub location: Location,
    pub radius:   f32,
    pub push:     f32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacedActor {
    pub model:    String,
    pub pose:     Transform,
    pub behavior: ActorBehavior,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpawnStrategy {
    /// No actors (environment-only scenarios).
    None,
    /// Random spawn points; `total` split over `models`.
    Batch {
        models:     Vec<String>,
        total:      usize,
        exceptions: Vec<String>,
        behavior:   ActorBehavior,
        push:       Option<PushZone>,
    },
    /// Explicit poses, spawned with bounded retry.
    Placed(Vec<PlacedActor>),
}

// ── ScenarioPlan ──────────────────────────────────────────────────────────────

/// Everything needed to spawn and assemble one scenario.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioPlan {
    pub name:            String,
    pub spawn:           SpawnStrategy,
    pub retry:           RetryPolicy,
    /// Hand actors to autopilot / walker controllers at start.
    pub autonomous:      bool,
    pub start:           StartTrigger,
    pub standing_secs:   Option<f64>,
    pub reveal_interval: Option<f64>,
    pub end:             EndCondition,
    /// Ego drive distance after teardown before the scenario succeeds.
    pub epilogue:        Option<f32>,
    pub weather:         Option<WeatherPatch>,
    pub road_friction:   Option<f32>,
}

impl ScenarioPlan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:            name.into(),
            spawn:           SpawnStrategy::None,
            retry:           RetryPolicy::default(),
            autonomous:      true,
            start:           StartTrigger::Immediate,
            standing_secs:   None,
            reveal_interval: None,
            end:             EndCondition::None,
            epilogue:        None,
            weather:         None,
            road_friction:   None,
        }
    }

    /// Spawn the plan's actors through `spawner` and assemble the tree.
    ///
    /// Actors spawned before an error stay tracked by `spawner`; the caller
    /// aborts it.
    pub fn assemble(self, spawner: &mut Spawner<'_>, ego: Option<ActorId>) -> ScenarioResult<ScenarioAssembler> {
        let mut lifecycles = Vec::new();
        match &self.spawn {
            SpawnStrategy::None => {}
            SpawnStrategy::Batch { models, total, exceptions, behavior, push } => {
                let filters = parse_filters(models);
                if filters.is_empty() {
                    return Err(ScenarioError::Config(format!("{}: no usable model filter in {models:?}", self.name)));
                }
                let options = BatchOptions {
                    model_exceptions: exceptions.clone(),
                    rolename:         "background".into(),
                    ..BatchOptions::default()
                };
                for (filter, count) in filters.iter().zip(split_batch(*total, filters.len())) {
                    let spawned = spawner.spawn_batch(filter, count, Transform::default(), &options)?;
                    info!(scenario = %self.name, model = %filter, requested = count, spawned = spawned.len(), "batch_spawned");
                    for mut actor in spawned {
                        if let Some(zone) = push {
                            if push_out_of_zone(spawner.world_ref(), &mut actor, zone) {
                                // Park under the new pose so later spawns keep clear of it.
                                hide(spawner.world(), actor.id, actor.pose, UNDERGROUND_Z)?;
                            }
                        }
                        let main = behavior.build(spawner.world_ref(), &actor, ego)?;
                        lifecycles.push(ActorLifecycle::new(actor, self.autonomous, main));
                    }
                }
            }
            SpawnStrategy::Placed(placed) => {
                for p in placed {
                    let Some(filter) = parse_filters(std::slice::from_ref(&p.model)).pop() else {
                        continue;
                    };
                    let actor = spawner.spawn(&filter, p.pose, &self.retry)?;
                    let main = p.behavior.build(spawner.world_ref(), &actor, ego)?;
                    lifecycles.push(ActorLifecycle::new(actor, self.autonomous, main));
                }
            }
        }

        let first = lifecycles.first().map(ActorLifecycle::id);
        let mut assembler = ScenarioAssembler::new(self.name.clone()).actors(lifecycles);

        if let Some(patch) = self.weather.clone() {
            assembler = assembler.environment(OneShot::new(ChangeWeather::new(patch)));
        }
        if let Some(friction) = self.road_friction {
            assembler = assembler.environment(OneShot::new(ChangeRoadFriction::new(friction)));
        }
        if let Some(trigger) = self.start.resolve(spawner.world_ref(), ego, first)? {
            assembler = assembler.start_when(trigger);
        }
        if let Some(secs) = self.standing_secs {
            assembler = assembler.standing(secs);
        }
        if let Some(secs) = self.reveal_interval {
            assembler = assembler.reveal_one_by_one(secs);
        }
        assembler = assembler.end_with(self.end.build(ego)?);
        if let Some(distance) = self.epilogue {
            let ego = require_ego(ego, "epilogue")?;
            assembler = assembler.epilogue(DriveDistance::new(ego, distance));
        }
        Ok(assembler)
    }
}

/// Move an actor spawned inside `zone` (and on the zone's lane) forward.
/// `true` when the actor's reveal pose was moved.
fn push_out_of_zone(world: &dyn World, actor: &mut SpawnedActor, zone: &PushZone) -> bool {
    let at = actor.pose.location;
    if at.distance_2d(zone.location) >= zone.radius {
        return false;
    }
    let same_lane = match (world.waypoint(at), world.waypoint(zone.location)) {
        (Some(a), Some(z)) => a.lane_id == z.lane_id,
        _ => false,
    };
    if !same_lane {
        return false;
    }
    let compass = actor.pose.rotation.compass();
    let (dx, dy) = geo::relative_to_absolute(compass, 0.0, zone.push);
    actor.pose.location += Location::new(dx, dy, 0.0);
    debug!(
        actor = %actor.id,
        heading = geo::heading(compass),
        to = %actor.pose.location,
        "actor_pushed_out_of_trigger_zone"
    );
    true
}

fn require_ego(ego: Option<ActorId>, what: &str) -> ScenarioResult<ActorId> {
    ego.ok_or_else(|| {
        warn!(what, "ego_required");
        ScenarioError::Config(format!("{what} needs an ego vehicle"))
    })
}
