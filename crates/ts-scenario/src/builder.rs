//! Fluent builder for constructing a [`ScenarioRunner`].

use tracing::info;
use ts_core::{ActorId, ModelFilter, SimConfig, Transform};
use ts_world::World;

use crate::spawn::spawn_with_retry;
use crate::{EgoAgent, NoopObserver, RetryPolicy, ScenarioKind, ScenarioResult, ScenarioRunner, ScriptedEgo};

enum EgoSource {
    None,
    Existing(ActorId),
    Spawn { model: ModelFilter, pose: Transform },
}

/// Fluent builder for [`ScenarioRunner<W, A>`].
///
/// # Optional inputs (have defaults)
///
/// | Method                   | Default                          |
/// |--------------------------|----------------------------------|
/// | `.ego(id)` / `.spawn_ego(model, pose)` | no ego, horn always off |
/// | `.agent(a)`              | [`ScriptedEgo::parked`]          |
/// | `.scenario(kind, t)`     | no scenarios                     |
///
/// # Example
///
/// ```rust,ignore
/// let mut runner = RunnerBuilder::new(config, world)
///     .spawn_ego(ModelFilter::parse("vehicle.tesla.model3")?, start)
///     .agent(ScriptedEgo::new(8.0))
///     .scenario(ScenarioKind::Background(BackgroundConfig::default()), Some(120.0))
///     .build()?;
/// let summary = runner.run(&mut NoopObserver)?;
/// ```
pub struct RunnerBuilder<W: World, A: EgoAgent> {
    config:    SimConfig,
    world:     W,
    agent:     A,
    ego:       EgoSource,
    scenarios: Vec<(ScenarioKind, Option<f64>)>,
}

impl<W: World> RunnerBuilder<W, ScriptedEgo> {
    pub fn new(config: SimConfig, world: W) -> Self {
        Self { config, world, agent: ScriptedEgo::parked(), ego: EgoSource::None, scenarios: Vec::new() }
    }
}

impl<W: World, A: EgoAgent> RunnerBuilder<W, A> {
    /// Use an actor that already exists in the world as the ego.
    pub fn ego(mut self, ego: ActorId) -> Self {
        self.ego = EgoSource::Existing(ego);
        self
    }

    /// Spawn the ego at build time, with the default retry policy.
    pub fn spawn_ego(mut self, model: ModelFilter, pose: Transform) -> Self {
        self.ego = EgoSource::Spawn { model, pose };
        self
    }

    pub fn agent<B: EgoAgent>(self, agent: B) -> RunnerBuilder<W, B> {
        RunnerBuilder {
            config:    self.config,
            world:     self.world,
            agent,
            ego:       self.ego,
            scenarios: self.scenarios,
        }
    }

    /// Queue a catalog scenario; scenarios are added in call order.
    pub fn scenario(mut self, kind: ScenarioKind, timeout_secs: Option<f64>) -> Self {
        self.scenarios.push((kind, timeout_secs));
        self
    }

    /// Spawn the ego, then plan and spawn every queued scenario.
    ///
    /// If any scenario fails to build, every actor spawned so far is
    /// destroyed and the error returned.
    pub fn build(mut self) -> ScenarioResult<ScenarioRunner<W, A>> {
        let ego = match self.ego {
            EgoSource::None => None,
            EgoSource::Existing(id) => {
                self.world.actor_kind(id)?;
                Some(id)
            }
            EgoSource::Spawn { model, pose } => {
                let (id, at) = spawn_with_retry(&mut self.world, &model, pose, &RetryPolicy::default())?;
                info!(ego = %id, at = %at, "ego_spawned");
                Some(id)
            }
        };

        let mut runner = ScenarioRunner::new(self.config, self.world, self.agent, ego);
        for (kind, timeout) in self.scenarios {
            if let Err(e) = runner.add_scenario(kind, timeout) {
                // Earlier scenarios already own actors.
                runner.finish(&mut NoopObserver);
                return Err(e);
            }
        }
        Ok(runner)
    }
}
