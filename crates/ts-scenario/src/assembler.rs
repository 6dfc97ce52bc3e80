//! Composes actor lifecycles into one scenario tree.
//!
//! ```text
//! [-] <scenario>
//!     /_/ Initialization   (all)  setup of every actor, environment changes
//!     --> Prestart                wait for the start trigger        (optional)
//!     --> Standing                fixed delay before moving         (optional)
//!     /_/ Onstart          (all)  autopilot / controller on, brake off
//!     /_/ Main             (one)  every actor's main behavior + end condition
//!     /_/ Teardown         (all)  destroy every actor
//!     --> <epilogue>                                                (optional)
//! ```
//!
//! `Main` succeeds as soon as any child succeeds, so a terminal actor
//! behavior and the global end condition both end it.  Empty phases are
//! left out.

use tracing::debug;
use ts_behavior::{
    Behavior, BoxedBehavior, Parallel, ParallelPolicy, Sequence, TimeOut, Trigger, WaitFor,
};

use crate::{ActorLifecycle, ScenarioError, ScenarioResult};

pub struct ScenarioAssembler {
    name:            String,
    actors:          Vec<ActorLifecycle>,
    environment:     Vec<BoxedBehavior>,
    start:           Option<Trigger>,
    standing_secs:   Option<f64>,
    reveal_interval: Option<f64>,
    end:             Option<BoxedBehavior>,
    epilogue:        Option<BoxedBehavior>,
}

impl ScenarioAssembler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:            name.into(),
            actors:          Vec::new(),
            environment:     Vec::new(),
            start:           None,
            standing_secs:   None,
            reveal_interval: None,
            end:             None,
            epilogue:        None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actor(mut self, lifecycle: ActorLifecycle) -> Self {
        self.actors.push(lifecycle);
        self
    }

    pub fn actors(mut self, lifecycles: impl IntoIterator<Item = ActorLifecycle>) -> Self {
        self.actors.extend(lifecycles);
        self
    }

    /// A one-off world change run during initialization (weather, friction).
    pub fn environment(mut self, behavior: impl Behavior + 'static) -> Self {
        self.environment.push(Box::new(behavior));
        self
    }

    /// Hold every actor braked until `trigger` holds.
    pub fn start_when(mut self, trigger: Trigger) -> Self {
        self.start = Some(trigger);
        self
    }

    /// Keep actors standing for `secs` after the start trigger.
    pub fn standing(mut self, secs: f64) -> Self {
        self.standing_secs = Some(secs);
        self
    }

    /// Reveal actors one after another, `secs` apart, instead of all at once.
    pub fn reveal_one_by_one(mut self, secs: f64) -> Self {
        self.reveal_interval = Some(secs);
        self
    }

    /// Global end condition for the main phase.
    pub fn end_when(mut self, behavior: impl Behavior + 'static) -> Self {
        self.end = Some(Box::new(behavior));
        self
    }

    pub fn end_with(mut self, behavior: Option<BoxedBehavior>) -> Self {
        self.end = behavior;
        self
    }

    /// Runs after teardown, before the scenario reports success.
    pub fn epilogue(mut self, behavior: impl Behavior + 'static) -> Self {
        self.epilogue = Some(Box::new(behavior));
        self
    }

    /// Build the tree.  Fails when there is nothing to run.
    pub fn build(mut self) -> ScenarioResult<Sequence> {
        if self.actors.is_empty() && self.environment.is_empty() {
            return Err(ScenarioError::Config(format!("scenario {} has no actors", self.name)));
        }
        let mut root = Sequence::new(self.name.clone());

        // ── Initialization ────────────────────────────────────────────────
        let mut init = Parallel::with_children("Initialization", ParallelPolicy::SuccessOnAll, std::mem::take(&mut self.environment));
        match self.reveal_interval {
            Some(secs) if self.actors.len() > 1 => {
                let mut reveal = Sequence::new("Reveal");
                for (i, lc) in self.actors.iter().enumerate() {
                    if i > 0 {
                        reveal.add_child(Box::new(TimeOut::new(secs)));
                    }
                    reveal.add_child(Box::new(lc.setup()));
                }
                init.add_child(Box::new(reveal));
            }
            _ => {
                for lc in &self.actors {
                    init.add_child(Box::new(lc.setup()));
                }
            }
        }
        root.add_child(Box::new(init));

        // ── Gate ──────────────────────────────────────────────────────────
        if let Some(trigger) = self.start.take() {
            root.add_child(Box::new(WaitFor::new(trigger).named("Prestart")));
        }
        if let Some(secs) = self.standing_secs {
            root.add_child(Box::new(TimeOut::new(secs)));
        }

        if !self.actors.is_empty() {
            // ── Onstart ───────────────────────────────────────────────────
            let mut onstart = Parallel::new("Onstart", ParallelPolicy::SuccessOnAll);
            for lc in &self.actors {
                onstart.add_child(Box::new(lc.onstart()));
            }
            root.add_child(Box::new(onstart));
        }

        // ── Main ──────────────────────────────────────────────────────────
        let mut main = Parallel::new("Main", ParallelPolicy::SuccessOnOne);
        for lc in &mut self.actors {
            if let Some(behavior) = lc.take_main() {
                main.add_child(behavior);
            }
        }
        if let Some(end) = self.end.take() {
            main.add_child(end);
        }
        if !main.is_empty() {
            root.add_child(Box::new(main));
        }

        // ── Teardown ──────────────────────────────────────────────────────
        if !self.actors.is_empty() {
            let mut teardown = Parallel::new("Teardown", ParallelPolicy::SuccessOnAll);
            for lc in &self.actors {
                teardown.add_child(Box::new(lc.teardown()));
            }
            root.add_child(Box::new(teardown));
        }

        if let Some(epilogue) = self.epilogue.take() {
            root.add_child(epilogue);
        }

        debug!(scenario = %self.name, actors = self.actors.len(), phases = root.len(), "scenario_assembled");
        Ok(root)
    }
}
