//! Trigger predicates: boolean tests over live world state.
//!
//! Predicates are total: a query on a destroyed actor reads as `false`
//! instead of failing, so they can be evaluated every tick without error
//! plumbing.  Only [`Trigger::Latched`] and [`Trigger::Elapsed`] keep state
//! between evaluations; [`Trigger::reset`] clears it.

use ts_core::{ActorId, Location};
use ts_world::World;

use crate::{Blackboard, TickContext, blackboard};

#[derive(Clone, Debug, PartialEq)]
pub enum Trigger {
    /// Constant result.
    Always(bool),
    /// The two actors are at most `threshold` metres apart.
    Distance {
        reference: ActorId,
        subject:   ActorId,
        threshold: f32,
    },
    /// A blackboard flag equals `expected`.
    Flag { key: String, expected: bool },
    /// The ego is honking AND the actor is within `horn_distance` of it.
    InHornDistance {
        ego:           ActorId,
        actor:         ActorId,
        horn_distance: f32,
    },
    /// The ego has come within `distance` of `location`, measured along the
    /// ego route.  Without a route, straight-line distance is used.
    AlongRoute {
        ego:      ActorId,
        location: Location,
        distance: f32,
    },
    /// `after_secs` simulated seconds have passed since the first evaluation.
    Elapsed { after_secs: f64, started: Option<f64> },
    /// Stays `true` once the inner trigger has fired.
    Latched { inner: Box<Trigger>, fired: bool },
    Not(Box<Trigger>),
    All(Vec<Trigger>),
    Any(Vec<Trigger>),
}

impl Trigger {
    /// Actor-to-actor proximity: `distance(reference, subject) <= threshold`.
    pub fn within(reference: ActorId, subject: ActorId, threshold: f32) -> Trigger {
        Trigger::Distance { reference, subject, threshold }
    }

    pub fn flag(key: impl Into<String>, expected: bool) -> Trigger {
        Trigger::Flag { key: key.into(), expected }
    }

    pub fn in_horn_distance(ego: ActorId, actor: ActorId, horn_distance: f32) -> Trigger {
        Trigger::InHornDistance { ego, actor, horn_distance }
    }

    pub fn elapsed(after_secs: f64) -> Trigger {
        Trigger::Elapsed { after_secs, started: None }
    }

    pub fn latched(inner: Trigger) -> Trigger {
        Trigger::Latched { inner: Box::new(inner), fired: false }
    }

    pub fn negate(inner: Trigger) -> Trigger {
        Trigger::Not(Box::new(inner))
    }

    /// Evaluate against the current tick.
    pub fn evaluate(&mut self, ctx: &TickContext<'_>) -> bool {
        self.evaluate_at(&*ctx.world, ctx.blackboard, ctx.elapsed_secs)
    }

    /// Evaluate with explicit inputs; used by [`evaluate`](Self::evaluate)
    /// and by callers outside a tree.
    pub fn evaluate_at(&mut self, world: &dyn World, blackboard: &Blackboard, now_secs: f64) -> bool {
        match self {
            Trigger::Always(v) => *v,
            Trigger::Distance { reference, subject, threshold } => {
                within_distance(world, *reference, *subject, *threshold)
            }
            Trigger::Flag { key, expected } => blackboard.flag(key) == *expected,
            Trigger::InHornDistance { ego, actor, horn_distance } => {
                blackboard.flag(blackboard::HORN)
                    && within_distance(world, *ego, *actor, *horn_distance)
            }
            Trigger::AlongRoute { ego, location, distance } => {
                let Ok(ego_at) = world.location(*ego) else {
                    return false;
                };
                match world.ego_route() {
                    Some(route) if route.len() >= 2 => {
                        let ego_s = route_position(route, ego_at);
                        let target_s = route_position(route, *location);
                        ego_s >= target_s - *distance
                    }
                    _ => ego_at.distance(*location) <= *distance,
                }
            }
            Trigger::Elapsed { after_secs, started } => {
                let start = *started.get_or_insert(now_secs);
                now_secs - start >= *after_secs
            }
            Trigger::Latched { inner, fired } => {
                if !*fired {
                    *fired = inner.evaluate_at(world, blackboard, now_secs);
                }
                *fired
            }
            Trigger::Not(inner) => !inner.evaluate_at(world, blackboard, now_secs),
            // Every child is evaluated so stateful children stay in step.
            Trigger::All(ts) => ts
                .iter_mut()
                .fold(true, |acc, t| t.evaluate_at(world, blackboard, now_secs) && acc),
            Trigger::Any(ts) => ts
                .iter_mut()
                .fold(false, |acc, t| t.evaluate_at(world, blackboard, now_secs) || acc),
        }
    }

    /// Clear latches and elapsed-time start points.
    pub fn reset(&mut self) {
        match self {
            Trigger::Elapsed { started, .. } => *started = None,
            Trigger::Latched { inner, fired } => {
                *fired = false;
                inner.reset();
            }
            Trigger::Not(inner) => inner.reset(),
            Trigger::All(ts) | Trigger::Any(ts) => ts.iter_mut().for_each(Trigger::reset),
            _ => {}
        }
    }

    /// Short human-readable form, used in tree labels.
    pub fn describe(&self) -> String {
        match self {
            Trigger::Always(v) => format!("always {v}"),
            Trigger::Distance { reference, subject, threshold } => {
                format!("dist({reference}, {subject}) <= {threshold}")
            }
            Trigger::Flag { key, expected } => format!("{key} == {expected}"),
            Trigger::InHornDistance { ego, actor, horn_distance } => {
                format!("horn && dist({ego}, {actor}) <= {horn_distance}")
            }
            Trigger::AlongRoute { ego, location, distance } => {
                format!("route_dist({ego}, {location}) <= {distance}")
            }
            Trigger::Elapsed { after_secs, .. } => format!("after {after_secs} s"),
            Trigger::Latched { inner, .. } => format!("latched({})", inner.describe()),
            Trigger::Not(inner) => format!("not({})", inner.describe()),
            Trigger::All(ts) => join(ts, " && "),
            Trigger::Any(ts) => join(ts, " || "),
        }
    }
}

fn join(ts: &[Trigger], sep: &str) -> String {
    let parts: Vec<String> = ts.iter().map(Trigger::describe).collect();
    format!("({})", parts.join(sep))
}

/// `true` when both actors exist and are at most `threshold` metres apart.
pub fn within_distance(world: &dyn World, reference: ActorId, subject: ActorId, threshold: f32) -> bool {
    world
        .distance(reference, subject)
        .map(|d| d <= threshold)
        .unwrap_or(false)
}

/// Distance along `route` to the foot of `location` on the nearest route
/// segment.
pub fn route_position(route: &[Location], location: Location) -> f32 {
    let mut best = (f32::INFINITY, 0.0);
    let mut travelled = 0.0;
    for pair in route.windows(2) {
        let (start, segment) = (pair[0], pair[1] - pair[0]);
        let length = segment.length();
        let t = if length > 0.0 {
            ((location - start).dot(segment) / (length * length)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let gap = (start + segment.scaled(t)).distance(location);
        if gap < best.0 {
            best = (gap, travelled + t * length);
        }
        travelled += length;
    }
    best.1
}
