//! Ego agents: whatever drives the ego vehicle.
//!
//! The runner asks the agent for one [`EgoCommand`] per tick, before any
//! scenario is ticked, and publishes its horn decision on the blackboard.

use std::ops::Range;

use tracing::warn;
use ts_core::{ActorId, Tick};
use ts_world::{VehicleControl, World};

/// One tick's worth of ego decisions.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EgoCommand {
    /// `None` leaves the current control in place.
    pub control: Option<VehicleControl>,
    pub horn:    bool,
}

pub trait EgoAgent {
    fn run_step(&mut self, world: &dyn World, ego: ActorId, tick: Tick) -> EgoCommand;
}

// ── ScriptedEgo ───────────────────────────────────────────────────────────────

/// Proportional cruise control towards a target speed, honking during
/// scheduled tick ranges.
///
/// ```rust,ignore
/// let agent = ScriptedEgo::new(8.0).honk_between(Tick(50)..Tick(80));
/// ```
#[derive(Clone, Debug)]
pub struct ScriptedEgo {
    /// m/s.
    pub target_speed: f32,
    /// Throttle (or brake) per m/s of speed error.
    pub gain:         f32,
    honks:            Vec<Range<Tick>>,
}

impl ScriptedEgo {
    pub fn new(target_speed: f32) -> Self {
        Self { target_speed, gain: 0.5, honks: Vec::new() }
    }

    /// Hold the ego still with the brake on.
    pub fn parked() -> Self {
        Self::new(0.0)
    }

    pub fn honk_between(mut self, ticks: Range<Tick>) -> Self {
        self.honks.push(ticks);
        self
    }

    pub fn honking(&self, tick: Tick) -> bool {
        self.honks.iter().any(|r| r.contains(&tick))
    }
}

impl Default for ScriptedEgo {
    fn default() -> Self {
        Self::parked()
    }
}

impl EgoAgent for ScriptedEgo {
    fn run_step(&mut self, world: &dyn World, ego: ActorId, tick: Tick) -> EgoCommand {
        let speed = match world.speed(ego) {
            Ok(v) => v,
            Err(e) => {
                warn!(ego = %ego, error = %e, "ego_unavailable");
                return EgoCommand::default();
            }
        };
        let control = if self.target_speed <= 0.0 {
            VehicleControl::full_brake()
        } else {
            let error = self.target_speed - speed;
            if error >= 0.0 {
                VehicleControl::throttle((error * self.gain).min(1.0))
            } else {
                VehicleControl { brake: (-error * self.gain).min(1.0), ..VehicleControl::default() }
            }
        };
        EgoCommand { control: Some(control), horn: self.honking(tick) }
    }
}
