//! The `Behavior` trait, one node of a behavior tree.

use std::fmt;

use crate::TickContext;

/// Result of ticking a node once.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    Running,
    Success,
    Failure,
}

impl Status {
    #[inline]
    pub fn is_done(self) -> bool {
        !matches!(self, Status::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Running => "RUNNING",
            Status::Success => "SUCCESS",
            Status::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node category, used when rendering a tree.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum NodeKind {
    Sequence,
    Parallel,
    Conditional,
    Decorator,
    Action,
}

/// A behavior-tree node.
///
/// The runtime calls [`tick`](Self::tick) at most once per simulation step.
/// Nodes keep their own progress between ticks; [`reset`](Self::reset)
/// discards it so the next tick starts from scratch.  Composites reset
/// themselves after completing, and a conditional resets a branch it stops
/// selecting, so there is no separate cancellation hook.
///
/// # Example
///
/// ```rust
/// use ts_behavior::{Behavior, Status, TickContext};
///
/// /// Succeeds on its third tick.
/// struct CountToThree { n: u32 }
///
/// impl Behavior for CountToThree {
///     fn name(&self) -> &str { "CountToThree" }
///
///     fn tick(&mut self, _ctx: &mut TickContext<'_>) -> Status {
///         self.n += 1;
///         if self.n >= 3 { Status::Success } else { Status::Running }
///     }
///
///     fn reset(&mut self) { self.n = 0; }
/// }
/// ```
pub trait Behavior {
    fn name(&self) -> &str;

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status;

    /// Discard progress.  Default: stateless, nothing to do.
    fn reset(&mut self) {}

    /// Direct children, in tick order.
    fn children(&self) -> Vec<&dyn Behavior> {
        Vec::new()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Action
    }
}

pub type BoxedBehavior = Box<dyn Behavior>;

impl<B: Behavior + ?Sized> Behavior for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        (**self).tick(ctx)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn children(&self) -> Vec<&dyn Behavior> {
        (**self).children()
    }

    fn kind(&self) -> NodeKind {
        (**self).kind()
    }
}
