//! `ts-world` — the simulator surface behaviors are written against.
//!
//! Behavior trees never touch simulator objects directly.  They hold
//! `ActorId`s and go through the [`World`] trait for every query and
//! mutation, which keeps the decision logic testable without a simulator.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`world`]     | `World` trait, `BatchOptions`                                |
//! | [`control`]   | `VehicleControl`, `LaneSide`                                 |
//! | [`map`]       | `Waypoint`, `RoadLayout` (straight multi-lane road)          |
//! | [`weather`]   | `WeatherParameters`, presets, `WeatherPatch`                 |
//! | [`sandbox`]   | `SandboxWorld` + builder: deterministic in-memory world      |
//! | [`error`]     | `WorldError`, `WorldResult<T>`                               |

pub mod control;
pub mod error;
pub mod map;
pub mod sandbox;
pub mod weather;
pub mod world;


pub use control::{LaneSide, VehicleControl};
pub use error::{WorldError, WorldResult};
pub use map::{RoadLayout, Waypoint};
pub use sandbox::{DEFAULT_ROAD_FRICTION, Dynamics, SandboxWorld, SandboxWorldBuilder};
pub use weather::{WeatherField, WeatherParameters, WeatherPatch};
pub use world::{BatchOptions, World};
