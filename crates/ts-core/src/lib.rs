//! `ts-core` — foundational types for the `town-scenarios` workspace.
//!
//! This crate is a dependency of every other `ts-*` crate.  It intentionally
//! has no `ts-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `ActorId`, `ScenarioId`                                   |
//! | [`geo`]         | `Location`, `Rotation`, `Transform`, compass headings     |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                           |
//! | [`rng`]         | `SimRng` (seeded pick and shuffle)                        |
//! | [`actor`]       | `ActorKind`, `ModelFilter`                                |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod actor;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use actor::{ActorKind, ModelFilter};
pub use error::{CoreError, CoreResult};
pub use geo::{Location, Rotation, Transform};
pub use ids::{ActorId, ScenarioId};
pub use rng::SimRng;
pub use time::{SimClock, SimConfig, Tick};
