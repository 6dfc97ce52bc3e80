use thiserror::Error;
use ts_behavior::BehaviorError;
use ts_core::CoreError;
use ts_world::WorldError;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("could not spawn {model} after {attempts} attempt(s)")]
    SpawnFailed { model: String, attempts: u32 },

    #[error("scenario configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    #[error(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;
