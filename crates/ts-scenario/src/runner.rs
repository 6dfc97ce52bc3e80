//! The `ScenarioRunner` struct and its tick loop.

use tracing::{info, warn};
use ts_behavior::{ActorRegistry, Blackboard, HORN, Status, TickContext};
use ts_core::{ActorId, ScenarioId, SimClock, SimConfig, Tick};
use ts_world::World;

use crate::{
    EgoAgent, Outcome, RunnerObserver, ScenarioAssembler, ScenarioInstance, ScenarioKind,
    ScenarioResult, Spawner,
};

/// What a finished run produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub final_tick: Tick,
    /// One entry per scenario, in registration order.
    pub outcomes:   Vec<(ScenarioId, String, Outcome)>,
    /// Actors destroyed by scenario teardown (not by the trees themselves).
    pub destroyed:  usize,
}

impl RunSummary {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.iter().filter(|(_, _, o)| *o == outcome).count()
    }
}

// ── ScenarioRunner ────────────────────────────────────────────────────────────

/// Drives every scenario tree against one world.
///
/// Each tick:
///
/// 1. **Ego**: the agent produces a control and a horn decision; the control
///    is applied and the horn flag written to the blackboard.  This is the
///    only blackboard write in a tick.
/// 2. **Scenarios**: every running scenario's root is ticked once, in
///    registration order.  A root that finishes, or whose timeout has
///    elapsed, concludes and is torn down immediately.
/// 3. **Events**: queued lifecycle transitions go to the observer.
/// 4. **World**: the simulator advances by one fixed step.
///
/// Create via [`RunnerBuilder`][crate::RunnerBuilder].
pub struct ScenarioRunner<W: World, A: EgoAgent> {
    pub config:     SimConfig,
    pub clock:      SimClock,
    pub world:      W,
    pub agent:      A,
    /// The vehicle the agent drives.  Without one the horn stays off.
    pub ego:        Option<ActorId>,
    pub blackboard: Blackboard,
    pub registry:   ActorRegistry,
    pub scenarios:  Vec<ScenarioInstance>,
    destroyed:      usize,
}

impl<W: World, A: EgoAgent> ScenarioRunner<W, A> {
    pub(crate) fn new(config: SimConfig, world: W, agent: A, ego: Option<ActorId>) -> Self {
        Self {
            clock: config.make_clock(),
            config,
            world,
            agent,
            ego,
            blackboard: Blackboard::new(),
            registry:   ActorRegistry::new(),
            scenarios:  Vec::new(),
            destroyed:  0,
        }
    }

    // ── Scenario registration ─────────────────────────────────────────────

    /// Plan, spawn, and assemble a catalog scenario.
    pub fn add_scenario(&mut self, kind: ScenarioKind, timeout_secs: Option<f64>) -> ScenarioResult<ScenarioId> {
        let name = kind.name();
        let plan = kind.plan(&self.world)?;
        let ego = self.ego;
        self.add_scenario_with(name, timeout_secs, move |spawner| plan.assemble(spawner, ego))
    }

    /// Spawn actors and assemble a tree with a custom routine.
    ///
    /// If `build` (or assembling its result) fails, every actor it spawned
    /// is destroyed before the error is returned.
    pub fn add_scenario_with<F>(
        &mut self,
        name:         impl Into<String>,
        timeout_secs: Option<f64>,
        build:        F,
    ) -> ScenarioResult<ScenarioId>
    where
        F: FnOnce(&mut Spawner<'_>) -> ScenarioResult<ScenarioAssembler>,
    {
        let name = name.into();
        let id = ScenarioId(self.scenarios.len() as u32);
        let mut spawner = Spawner::new(&mut self.world, &mut self.registry, id, self.clock.current_tick);
        let root = match build(&mut spawner).and_then(ScenarioAssembler::build) {
            Ok(root) => root,
            Err(e) => {
                warn!(scenario = %name, error = %e, "scenario_build_failed");
                spawner.abort();
                return Err(e);
            }
        };
        let actors = spawner.finish();
        info!(scenario = %name, id = %id, actors = actors.len(), nodes = ts_behavior::render::count_nodes(&root), "scenario_added");
        self.scenarios.push(ScenarioInstance::new(
            id,
            name,
            Box::new(root),
            actors,
            self.clock.elapsed_secs(),
            timeout_secs,
        ));
        Ok(id)
    }

    pub fn scenario(&self, id: ScenarioId) -> Option<&ScenarioInstance> {
        self.scenarios.get(id.index())
    }

    pub fn running(&self) -> usize {
        self.scenarios.iter().filter(|s| s.is_running()).count()
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run until every scenario has concluded or `config.end_tick()` is
    /// reached, then tear down whatever is left.
    pub fn run<O: RunnerObserver>(&mut self, observer: &mut O) -> ScenarioResult<RunSummary> {
        while self.clock.current_tick < self.config.end_tick() && self.running() > 0 {
            self.tick(observer)?;
        }
        Ok(self.finish(observer))
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`
    /// and does not tear down unfinished scenarios).
    pub fn run_ticks<O: RunnerObserver>(&mut self, n: u64, observer: &mut O) -> ScenarioResult<()> {
        for _ in 0..n {
            self.tick(observer)?;
        }
        Ok(())
    }

    /// Cancel and tear down every scenario still running.  Safe to call more
    /// than once.
    pub fn finish<O: RunnerObserver>(&mut self, observer: &mut O) -> RunSummary {
        let now = self.clock.current_tick;
        for scenario in &mut self.scenarios {
            let cancelled = scenario.is_running();
            scenario.conclude(Outcome::Cancelled);
            self.destroyed += scenario.teardown(&mut self.world, &mut self.registry, now);
            if cancelled {
                info!(scenario = %scenario.name, tick = %now, "scenario_cancelled");
                observer.on_scenario_end(now, scenario.id, &scenario.name, Outcome::Cancelled);
            }
        }
        for event in self.registry.drain_events() {
            observer.on_lifecycle(&event);
        }
        observer.on_run_end(now);
        RunSummary {
            final_tick: now,
            outcomes:   self
                .scenarios
                .iter()
                .filter_map(|s| s.outcome().map(|o| (s.id, s.name.clone(), o)))
                .collect(),
            destroyed:  self.destroyed,
        }
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn tick<O: RunnerObserver>(&mut self, observer: &mut O) -> ScenarioResult<()> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        // ── Phase 1: ego ──────────────────────────────────────────────────
        let horn = match self.ego {
            Some(ego) => {
                let command = self.agent.run_step(&self.world, ego, now);
                if let Some(control) = command.control {
                    if let Err(e) = self.world.apply_control(ego, control) {
                        warn!(ego = %ego, error = %e, "ego_control_failed");
                    }
                }
                command.horn
            }
            None => false,
        };
        self.blackboard.set(HORN, horn, now)?;

        // ── Phase 2: scenarios ────────────────────────────────────────────
        let now_secs = self.clock.elapsed_secs();
        for scenario in &mut self.scenarios {
            if !scenario.is_running() {
                continue;
            }
            let mut ctx = TickContext::new(&self.clock, &mut self.world, &self.blackboard, &mut self.registry);
            let status = scenario.tick(&mut ctx);
            observer.on_scenario_status(now, scenario.id, &scenario.name, status);

            let outcome = match status {
                Status::Success => Some(Outcome::Success),
                Status::Failure => Some(Outcome::Failure),
                Status::Running if scenario.timed_out(now_secs) => Some(Outcome::TimedOut),
                Status::Running => None,
            };
            if let Some(outcome) = outcome {
                scenario.conclude(outcome);
                self.destroyed += scenario.teardown(&mut self.world, &mut self.registry, now);
                info!(scenario = %scenario.name, outcome = %outcome, tick = %now, root = scenario.root().name(), "scenario_end");
                observer.on_scenario_end(now, scenario.id, &scenario.name, outcome);
            }
        }

        // ── Phase 3: lifecycle events ─────────────────────────────────────
        for event in self.registry.drain_events() {
            observer.on_lifecycle(&event);
        }

        // ── Phase 4: world ────────────────────────────────────────────────
        self.world.advance(self.clock.fixed_delta_secs);
        observer.on_tick_end(now, self.running());
        self.clock.advance();
        Ok(())
    }
}
