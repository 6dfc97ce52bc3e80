//! The conditional node: one trigger, two branches.
//!
//! Each tick the trigger is evaluated once and exactly one branch is ticked:
//! the in-branch while the trigger holds, the out-branch otherwise.  When the
//! selection changes, the branch being left is abandoned (reset, not paused)
//! and the branch being entered starts from its first step.
//!
//! A branch finishing successfully is restarted and the node keeps
//! reporting `Running`, unless that branch is marked terminal, in which case
//! the success is reported upward.  Failure always propagates.

use std::fmt;

use tracing::debug;
use ts_core::ActorId;

use crate::{Behavior, BoxedBehavior, NodeKind, Status, TickContext, Trigger};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Branch {
    In,
    Out,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Branch::In  => "in",
            Branch::Out => "out",
        })
    }
}

pub struct Conditional {
    name:         String,
    trigger:      Trigger,
    in_branch:    BoxedBehavior,
    out_branch:   BoxedBehavior,
    in_terminal:  bool,
    out_terminal: bool,
    /// Actor whose registry entry tracks the selected branch.
    owner:        Option<ActorId>,
    active:       Option<Branch>,
    switches:     u32,
}

impl Conditional {
    pub fn new(
        name:       impl Into<String>,
        trigger:    Trigger,
        in_branch:  impl Behavior + 'static,
        out_branch: impl Behavior + 'static,
    ) -> Self {
        Self {
            name:         name.into(),
            trigger,
            in_branch:    Box::new(in_branch),
            out_branch:   Box::new(out_branch),
            in_terminal:  false,
            out_terminal: false,
            owner:        None,
            active:       None,
            switches:     0,
        }
    }

    /// Report the in-branch's success upward instead of restarting it.
    pub fn terminal_in(mut self) -> Self {
        self.in_terminal = true;
        self
    }

    /// Report the out-branch's success upward instead of restarting it.
    pub fn terminal_out(mut self) -> Self {
        self.out_terminal = true;
        self
    }

    /// Keep `actor`'s active-behavior entry in the registry up to date.
    pub fn owned_by(mut self, actor: ActorId) -> Self {
        self.owner = Some(actor);
        self
    }

    /// Branch ticked most recently; `None` before the first tick.
    #[inline]
    pub fn active_branch(&self) -> Option<Branch> {
        self.active
    }

    /// How many times the selected branch has changed since the last reset.
    #[inline]
    pub fn switches(&self) -> u32 {
        self.switches
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    fn branch_mut(&mut self, branch: Branch) -> &mut BoxedBehavior {
        match branch {
            Branch::In  => &mut self.in_branch,
            Branch::Out => &mut self.out_branch,
        }
    }

    fn is_terminal(&self, branch: Branch) -> bool {
        match branch {
            Branch::In  => self.in_terminal,
            Branch::Out => self.out_terminal,
        }
    }
}

impl Behavior for Conditional {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        let branch = if self.trigger.evaluate(ctx) { Branch::In } else { Branch::Out };

        if self.active != Some(branch) {
            if let Some(previous) = self.active {
                self.branch_mut(previous).reset();
                self.switches += 1;
                debug!(node = %self.name, from = %previous, to = %branch, tick = %ctx.tick, "conditional_switch");
            }
            self.branch_mut(branch).reset();
            self.active = Some(branch);
            if let Some(owner) = self.owner {
                let label = match branch {
                    Branch::In  => self.in_branch.name(),
                    Branch::Out => self.out_branch.name(),
                };
                ctx.registry.set_active(owner, Some(label));
            }
        }

        match self.branch_mut(branch).tick(ctx) {
            Status::Running => Status::Running,
            Status::Failure => Status::Failure,
            Status::Success if self.is_terminal(branch) => Status::Success,
            Status::Success => {
                self.branch_mut(branch).reset();
                Status::Running
            }
        }
    }

    fn reset(&mut self) {
        self.in_branch.reset();
        self.out_branch.reset();
        self.trigger.reset();
        self.active = None;
        self.switches = 0;
    }

    fn children(&self) -> Vec<&dyn Behavior> {
        vec![&*self.in_branch, &*self.out_branch]
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Conditional
    }
}
