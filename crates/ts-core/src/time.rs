//! Ticks, the fixed-step clock, and run configuration.
//!
//! The simulator runs synchronously with a fixed step, so simulated time is
//! `tick * fixed_delta_secs`.  Every scenario tree is ticked once per step:
//! tests count ticks, scenario timeouts are written in seconds.

use std::fmt;

/// Index of one simulation step, starting at `T0`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    /// Steps from `earlier` to `self`; zero if `earlier` is later.
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ─────────────────────────────────────────────────────────────────

/// The runner's clock.  Shared read-only with every tree through the tick
/// context.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    pub fixed_delta_secs: f32,
    pub current_tick:     Tick,
}

impl SimClock {
    pub fn new(fixed_delta_secs: f32) -> Self {
        Self { fixed_delta_secs, current_tick: Tick::default() }
    }

    pub fn advance(&mut self) {
        self.current_tick = self.current_tick.next();
    }

    /// Simulated seconds at the start of the current tick.
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.0 as f64 * f64::from(self.fixed_delta_secs)
    }
}

impl Default for SimClock {
    /// 20 Hz.
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {:.2}s", self.current_tick, self.elapsed_secs())
    }
}

// ── SimConfig ────────────────────────────────────────────────────────────────

/// Settings for one run.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    pub fixed_delta_secs: f32,
    /// The runner cancels whatever is still running once this many ticks
    /// have been processed.
    pub max_ticks:        u64,
    /// Seed for the sandbox world's spawn-point and blueprint draws.
    pub seed:             u64,
}

impl SimConfig {
    /// First tick that is not run.
    pub fn end_tick(&self) -> Tick {
        Tick(self.max_ticks)
    }

    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.fixed_delta_secs)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_delta_secs: 0.05,
            max_ticks:        12_000, // ten simulated minutes
            seed:             42,
        }
    }
}
