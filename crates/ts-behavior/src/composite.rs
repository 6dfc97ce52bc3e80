//! `Sequence` and `Parallel` composites.
//!
//! "Parallel" is logical concurrency: every child is ticked once per tick,
//! in insertion order, on the one simulation thread.  Later children see the
//! world writes of earlier ones.

use crate::{Behavior, BoxedBehavior, NodeKind, Status, TickContext};

// ── Sequence ──────────────────────────────────────────────────────────────────

/// Runs children one after another.
///
/// A child that succeeds hands over to the next one within the same tick;
/// the sequence only yields on `Running`.  On failure or completion the
/// sequence resets itself, so ticking it again starts from the first child.
pub struct Sequence {
    name:     String,
    children: Vec<BoxedBehavior>,
    current:  usize,
}

impl Sequence {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), children: Vec::new(), current: 0 }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<BoxedBehavior>) -> Self {
        Self { name: name.into(), children, current: 0 }
    }

    /// Append a child (builder style).
    pub fn push(mut self, child: impl Behavior + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }

    pub fn add_child(&mut self, child: BoxedBehavior) {
        self.children.push(child);
    }

    /// Index of the child that will be ticked next.
    #[inline]
    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Behavior for Sequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        while self.current < self.children.len() {
            match self.children[self.current].tick(ctx) {
                Status::Running => return Status::Running,
                Status::Failure => {
                    self.reset();
                    return Status::Failure;
                }
                Status::Success => self.current += 1,
            }
        }
        self.reset();
        Status::Success
    }

    fn reset(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
        self.current = 0;
    }

    fn children(&self) -> Vec<&dyn Behavior> {
        self.children.iter().map(|c| &**c as &dyn Behavior).collect()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Sequence
    }
}

// ── Parallel ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParallelPolicy {
    /// Succeed as soon as any child succeeds.
    SuccessOnOne,
    /// Succeed once every child has succeeded.  Finished children are not
    /// ticked again.
    SuccessOnAll,
}

/// Ticks every child each tick.  Any child failure fails the node.
pub struct Parallel {
    name:     String,
    policy:   ParallelPolicy,
    children: Vec<BoxedBehavior>,
    done:     Vec<bool>,
}

impl Parallel {
    pub fn new(name: impl Into<String>, policy: ParallelPolicy) -> Self {
        Self { name: name.into(), policy, children: Vec::new(), done: Vec::new() }
    }

    pub fn with_children(name: impl Into<String>, policy: ParallelPolicy, children: Vec<BoxedBehavior>) -> Self {
        let done = vec![false; children.len()];
        Self { name: name.into(), policy, children, done }
    }

    pub fn push(mut self, child: impl Behavior + 'static) -> Self {
        self.add_child(Box::new(child));
        self
    }

    pub fn add_child(&mut self, child: BoxedBehavior) {
        self.children.push(child);
        self.done.push(false);
    }

    #[inline]
    pub fn policy(&self) -> ParallelPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Behavior for Parallel {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        let mut failed = false;
        let mut any_success = false;

        for (child, done) in self.children.iter_mut().zip(self.done.iter_mut()) {
            if *done && self.policy == ParallelPolicy::SuccessOnAll {
                continue;
            }
            match child.tick(ctx) {
                Status::Running => {}
                Status::Success => {
                    *done = true;
                    any_success = true;
                }
                Status::Failure => failed = true,
            }
        }

        let status = if failed {
            Status::Failure
        } else {
            match self.policy {
                ParallelPolicy::SuccessOnOne if any_success => Status::Success,
                ParallelPolicy::SuccessOnAll if self.done.iter().all(|&d| d) => Status::Success,
                _ => Status::Running,
            }
        };
        if status.is_done() {
            self.reset();
        }
        status
    }

    fn reset(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
        self.done.iter_mut().for_each(|d| *d = false);
    }

    fn children(&self) -> Vec<&dyn Behavior> {
        self.children.iter().map(|c| &**c as &dyn Behavior).collect()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Parallel
    }
}
