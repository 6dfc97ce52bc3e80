//! Single-child decorators.

use crate::{Behavior, BoxedBehavior, NodeKind, Status, TickContext};

// ── SuccessIsRunning ──────────────────────────────────────────────────────────

/// Reports `Running` whenever the child succeeds, restarting the child so it
/// is re-run on the next tick.  Failure passes through.
pub struct SuccessIsRunning {
    name:  String,
    child: BoxedBehavior,
}

impl SuccessIsRunning {
    pub fn new(child: impl Behavior + 'static) -> Self {
        let name = format!("SuccessIsRunning({})", child.name());
        Self { name, child: Box::new(child) }
    }
}

impl Behavior for SuccessIsRunning {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        match self.child.tick(ctx) {
            Status::Success => {
                self.child.reset();
                Status::Running
            }
            other => other,
        }
    }

    fn reset(&mut self) {
        self.child.reset();
    }

    fn children(&self) -> Vec<&dyn Behavior> {
        vec![&*self.child]
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Decorator
    }
}

// ── OneShot ───────────────────────────────────────────────────────────────────

/// Runs the child until it finishes once, then keeps returning that result
/// without ticking it again.  The latch survives [`reset`](Behavior::reset).
pub struct OneShot {
    name:     String,
    child:    BoxedBehavior,
    finished: Option<Status>,
}

impl OneShot {
    pub fn new(child: impl Behavior + 'static) -> Self {
        let name = format!("OneShot({})", child.name());
        Self { name, child: Box::new(child), finished: None }
    }

    /// The latched result, once the child has finished.
    pub fn finished(&self) -> Option<Status> {
        self.finished
    }
}

impl Behavior for OneShot {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        if let Some(status) = self.finished {
            return status;
        }
        let status = self.child.tick(ctx);
        if status.is_done() {
            self.finished = Some(status);
        }
        status
    }

    fn reset(&mut self) {
        if self.finished.is_none() {
            self.child.reset();
        }
    }

    fn children(&self) -> Vec<&dyn Behavior> {
        vec![&*self.child]
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Decorator
    }
}
