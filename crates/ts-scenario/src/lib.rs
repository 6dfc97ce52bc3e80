//! `ts-scenario` — scenarios on top of the behavior-tree runtime.
//!
//! A scenario spawns its actors hidden, assembles one tree that walks every
//! actor through `SpawnedHidden → VisibleIdle → Active → Removed`, and is
//! ticked by the [`ScenarioRunner`] until it concludes.  Whatever happens,
//! a concluded scenario leaves no actor behind.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.max_ticks:
//!   ① Ego        — agent.run_step → apply control, write the horn flag
//!   ② Scenarios  — tick each running root; conclude + teardown when done
//!                  or timed out
//!   ③ Events     — lifecycle transitions → observer
//!   ④ World      — world.advance(dt)
//! ```
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`spawn`]     | `Spawner`, `RetryPolicy`, `spawn_with_retry`, `split_batch`     |
//! | [`lifecycle`] | `ActorLifecycle` — setup / onstart / teardown per actor         |
//! | [`assembler`] | `ScenarioAssembler` — phases composed into one tree             |
//! | [`strategy`]  | spawn / start / behavior / end strategies, `ScenarioPlan`       |
//! | [`catalog`]   | `ScenarioKind` and its configuration structs                    |
//! | [`instance`]  | `ScenarioInstance`, `Outcome`                                   |
//! | [`agent`]     | `EgoAgent`, `ScriptedEgo`                                       |
//! | [`runner`]    | `ScenarioRunner`, `RunSummary`                                  |
//! | [`builder`]   | `RunnerBuilder`                                                 |
//! | [`observer`]  | `RunnerObserver`, `NoopObserver`                                |
//! | [`error`]     | `ScenarioError`, `ScenarioResult<T>`                            |
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                      |
//! |-----------|-------------------------------------------------------------|
//! | `serde`   | `Serialize`/`Deserialize` on configuration and strategies.  |
//! | `fx-hash` | FxHash maps in the registry and blackboard.                 |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ts_core::{ModelFilter, SimConfig};
//! use ts_scenario::{BackgroundConfig, NoopObserver, RunnerBuilder, ScenarioKind, ScriptedEgo};
//! use ts_world::SandboxWorldBuilder;
//!
//! let world = SandboxWorldBuilder::new(7).ego_route_lane(1).build();
//! let mut runner = RunnerBuilder::new(SimConfig::default(), world)
//!     .spawn_ego(ModelFilter::parse("vehicle.tesla.model3")?, start)
//!     .agent(ScriptedEgo::new(8.0))
//!     .scenario(ScenarioKind::Background(BackgroundConfig::default()), Some(60.0))
//!     .build()?;
//! let summary = runner.run(&mut NoopObserver)?;
//! ```

pub mod agent;
pub mod assembler;
pub mod builder;
pub mod catalog;
pub mod error;
pub mod instance;
pub mod lifecycle;
pub mod observer;
pub mod runner;
pub mod spawn;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use agent::{EgoAgent, EgoCommand, ScriptedEgo};
pub use assembler::ScenarioAssembler;
pub use builder::RunnerBuilder;
pub use catalog::{
    BackgroundConfig, CutInConfig, DEFAULT_TRIGGER_DISTANCE, ObstructTrigger, ObstructingConfig,
    RoadFriction, ScenarioKind, SpawnOnTriggerConfig, StillWalkersConfig, WeatherConfig, WeatherPreset,
};
pub use error::{ScenarioError, ScenarioResult};
pub use instance::{Outcome, ScenarioInstance};
pub use lifecycle::ActorLifecycle;
pub use observer::{NoopObserver, RunnerObserver};
pub use runner::{RunSummary, ScenarioRunner};
pub use spawn::{RetryPolicy, SpawnedActor, Spawner, UNDERGROUND_Z, spawn_with_retry, split_batch};
pub use strategy::{
    ActorBehavior, CutInManeuver, EndCondition, PlacedActor, PushZone, ScenarioPlan, SpawnStrategy,
    StartTrigger,
};
