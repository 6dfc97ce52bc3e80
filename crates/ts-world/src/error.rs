use thiserror::Error;
use ts_core::{ActorId, ActorKind};

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("actor {0} does not exist or was destroyed")]
    ActorNotFound(ActorId),

    #[error("actor {actor} is a {got}, expected a {expected}")]
    WrongKind {
        actor:    ActorId,
        expected: ActorKind,
        got:      ActorKind,
    },

    #[error("world configuration error: {0}")]
    Config(String),
}

pub type WorldResult<T> = Result<T, WorldError>;
