use thiserror::Error;
use ts_core::{ActorId, Tick};
use ts_world::WorldError;

use crate::LifecycleState;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("behavior configuration error: {0}")]
    Config(String),

    #[error("actor {0} is not registered")]
    UnknownActor(ActorId),

    #[error("actor {0} is already registered")]
    AlreadyRegistered(ActorId),

    #[error("actor {actor} cannot move from {from} to {to}")]
    InvalidTransition {
        actor: ActorId,
        from:  LifecycleState,
        to:    LifecycleState,
    },

    #[error("blackboard key {key:?} written twice in {tick}")]
    DuplicateWrite { key: String, tick: Tick },

    #[error(transparent)]
    World(#[from] WorldError),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
