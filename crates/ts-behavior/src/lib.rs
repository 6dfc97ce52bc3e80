//! `ts-behavior` — a small, single-threaded behavior-tree runtime.
//!
//! Trees are ticked once per simulation step by the scenario runner.  Nodes
//! talk to the simulator only through the [`ts_world::World`] trait carried
//! in the [`TickContext`].
//!
//! # Crate layout
//!
//! | Module          | Contents                                                      |
//! |-----------------|---------------------------------------------------------------|
//! | [`behavior`]    | `Status`, `Behavior` trait, `NodeKind`                        |
//! | [`context`]     | `TickContext<'a>` — world, blackboard, registry for one tick  |
//! | [`composite`]   | `Sequence`, `Parallel` (`SuccessOnOne` / `SuccessOnAll`)      |
//! | [`decorator`]   | `SuccessIsRunning`, `OneShot`                                 |
//! | [`trigger`]     | `Trigger` predicates, `within_distance`                       |
//! | [`conditional`] | `Conditional` — trigger-selected in/out branches              |
//! | [`action`]      | Leaf actions (transform, brake, autopilot, destroy, …)        |
//! | [`horn`]        | `HornBehaviorBuilder`, `HornConfig`                           |
//! | [`registry`]    | `ActorRegistry`, `LifecycleState`, `LifecycleEvent`           |
//! | [`blackboard`]  | `Blackboard` flags, the `HORN` key                            |
//! | [`render`]      | DOT / text rendering                                          |
//! | [`error`]       | `BehaviorError`, `BehaviorResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                       |
//! |-----------|--------------------------------------------------------------|
//! | `serde`   | `Serialize`/`Deserialize` on status and lifecycle types.     |
//! | `fx-hash` | FxHash maps in the registry and blackboard.                  |

pub mod action;
pub mod behavior;
pub mod blackboard;
pub mod composite;
pub mod conditional;
pub mod context;
pub mod decorator;
pub mod error;
pub mod horn;
pub mod registry;
pub mod render;
pub mod trigger;

mod map;


pub use action::{
    AccelerateToCatchUp, ActorDestroy, ActorTransformSetter, ChangeAutoPilot, ChangeRoadFriction,
    ChangeWeather, DriveDistance, Idle, KeepVelocity, LaneChange, LifecycleTransition, StopVehicle,
    TimeOut, ToggleWalkerController, WaitFor,
};
pub use behavior::{Behavior, BoxedBehavior, NodeKind, Status};
pub use blackboard::{Blackboard, HORN};
pub use composite::{Parallel, ParallelPolicy, Sequence};
pub use conditional::{Branch, Conditional};
pub use context::TickContext;
pub use decorator::{OneShot, SuccessIsRunning};
pub use error::{BehaviorError, BehaviorResult};
pub use horn::{HornBehaviorBuilder, HornConfig};
pub use registry::{ActorEntry, ActorRegistry, LifecycleEvent, LifecycleState};
pub use trigger::{Trigger, route_position, within_distance};
