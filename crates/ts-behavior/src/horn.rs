//! Yield-to-horn behavior.
//!
//! While the ego honks within `horn_distance` the actor stops (vehicles also
//! lose autopilot, walkers have their controller stopped); otherwise it
//! releases the brake and resumes.  Both branches re-apply their controls
//! every tick, so an actor that was stopped for a horn resumes as soon as
//! the horn goes quiet or the ego moves away.

use ts_core::{ActorId, ActorKind};
use ts_world::World;

use crate::{
    Behavior, BehaviorError, BehaviorResult, BoxedBehavior, ChangeAutoPilot, Conditional, Sequence,
    StopVehicle, ToggleWalkerController, Trigger,
};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HornConfig {
    /// Metres.  Default: 20.
    pub horn_distance: f32,
}

impl Default for HornConfig {
    fn default() -> Self {
        Self { horn_distance: 20.0 }
    }
}

/// Builds the horn [`Conditional`] for one actor.
///
/// ```rust,ignore
/// let horn = HornBehaviorBuilder::new(actor, ego)
///     .config(HornConfig { horn_distance: 15.0 })
///     .build(world)?;
/// ```
pub struct HornBehaviorBuilder {
    actor:      ActorId,
    ego:        ActorId,
    config:     HornConfig,
    in_branch:  Option<BoxedBehavior>,
    out_branch: Option<BoxedBehavior>,
}

impl HornBehaviorBuilder {
    pub fn new(actor: ActorId, ego: ActorId) -> Self {
        Self { actor, ego, config: HornConfig::default(), in_branch: None, out_branch: None }
    }

    pub fn config(mut self, config: HornConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default stop branch.
    pub fn in_branch(mut self, branch: impl Behavior + 'static) -> Self {
        self.in_branch = Some(Box::new(branch));
        self
    }

    /// Replace the default resume branch.
    pub fn out_branch(mut self, branch: impl Behavior + 'static) -> Self {
        self.out_branch = Some(Box::new(branch));
        self
    }

    /// Fails if the actor does not exist or is neither a vehicle nor a walker.
    pub fn build(self, world: &dyn World) -> BehaviorResult<Conditional> {
        let kind = world.actor_kind(self.actor)?;
        if !matches!(kind, ActorKind::Vehicle | ActorKind::Walker) {
            return Err(BehaviorError::Config(format!(
                "horn behavior needs a vehicle or walker, {} is a {kind}",
                self.actor
            )));
        }
        let in_branch = match self.in_branch {
            Some(b) => b,
            None => Box::new(react(self.actor, kind, true)),
        };
        let out_branch = match self.out_branch {
            Some(b) => b,
            None => Box::new(react(self.actor, kind, false)),
        };
        let trigger = Trigger::in_horn_distance(self.ego, self.actor, self.config.horn_distance);
        Ok(Conditional::new(format!("Horn {}", self.actor), trigger, in_branch, out_branch)
            .owned_by(self.actor))
    }
}

/// Stop (`stop = true`) or resume sequence for one actor.
fn react(actor: ActorId, kind: ActorKind, stop: bool) -> Sequence {
    let name = if stop { format!("HornStop {actor}") } else { format!("HornResume {actor}") };
    let brake = if stop { 1.0 } else { 0.0 };
    let seq = Sequence::new(name).push(StopVehicle::new(actor, brake));
    if kind.is_walker() {
        seq.push(ToggleWalkerController::new(actor, !stop))
    } else {
        seq.push(ChangeAutoPilot::new(actor, !stop))
    }
}
