//! Per-tick state handed to every node.

use ts_core::{SimClock, Tick};
use ts_world::World;

use crate::{ActorRegistry, Blackboard};

/// Everything a node may read or write during one tick.
///
/// The runner builds one `TickContext` per scenario per tick.  The blackboard
/// is read-only here: its single writer is the runner, before any tree is
/// ticked.
pub struct TickContext<'a> {
    pub tick:         Tick,
    /// Simulated seconds per tick.
    pub delta_secs:   f32,
    /// Simulated seconds since tick 0.
    pub elapsed_secs: f64,
    pub world:        &'a mut dyn World,
    pub blackboard:   &'a Blackboard,
    pub registry:     &'a mut ActorRegistry,
}

impl<'a> TickContext<'a> {
    #[inline]
    pub fn new(
        clock:      &SimClock,
        world:      &'a mut dyn World,
        blackboard: &'a Blackboard,
        registry:   &'a mut ActorRegistry,
    ) -> Self {
        Self {
            tick:         clock.current_tick,
            delta_secs:   clock.fixed_delta_secs,
            elapsed_secs: clock.elapsed_secs(),
            world,
            blackboard,
            registry,
        }
    }
}
