//! Named boolean flags shared by every trigger in a run.
//!
//! The only flag the stock behaviors use is [`HORN`], set by the ego agent.
//! Writes are serialized by the runner: each key may be written at most once
//! per tick, and reads happen after all writes for that tick.

use ts_core::Tick;

use crate::map::Map;
use crate::{BehaviorError, BehaviorResult};

/// "The ego vehicle is sounding its horn this tick."
pub const HORN: &str = "is_ego_vehicle_horn";

#[derive(Default, Debug)]
pub struct Blackboard {
    flags:   Map<String, bool>,
    written: Map<String, Tick>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `key`, `None` if never written.
    pub fn get(&self, key: &str) -> Option<bool> {
        self.flags.get(key).copied()
    }

    /// Current value of `key`; unset flags read as `false`.
    #[inline]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).unwrap_or(false)
    }

    /// Write `key` for `tick`.  A second write of the same key in the same
    /// tick is rejected.
    pub fn set(&mut self, key: &str, value: bool, tick: Tick) -> BehaviorResult<()> {
        if self.written.get(key) == Some(&tick) {
            return Err(BehaviorError::DuplicateWrite { key: key.to_owned(), tick });
        }
        self.written.insert(key.to_owned(), tick);
        self.flags.insert(key.to_owned(), value);
        Ok(())
    }

    /// Tick of the most recent write to `key`.
    pub fn last_write(&self, key: &str) -> Option<Tick> {
        self.written.get(key).copied()
    }
}
