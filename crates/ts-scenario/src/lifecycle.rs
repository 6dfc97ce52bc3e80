//! Per-actor lifecycle phases.
//!
//! ```text
//! SpawnedHidden ──setup──► VisibleIdle ──onstart──► Active ──teardown──► Removed
//! ```
//!
//! The spawner leaves an actor `SpawnedHidden`.  [`ActorLifecycle`] produces
//! the behavior for each later phase; the assembler slots them into the
//! scenario tree.  Every phase ends with the registry transition so the
//! registry never runs ahead of the world.

use ts_behavior::{
    ActorDestroy, ActorTransformSetter, BoxedBehavior, ChangeAutoPilot, LifecycleState,
    LifecycleTransition, Sequence, StopVehicle, ToggleWalkerController,
};
use ts_core::ActorId;

use crate::SpawnedActor;

pub struct ActorLifecycle {
    pub actor:      SpawnedActor,
    /// Hand the actor to autopilot / its walker controller at start.
    pub autonomous: bool,
    main:           Option<BoxedBehavior>,
}

impl ActorLifecycle {
    pub fn new(actor: SpawnedActor, autonomous: bool, main: BoxedBehavior) -> Self {
        Self { actor, autonomous, main: Some(main) }
    }

    #[inline]
    pub fn id(&self) -> ActorId {
        self.actor.id
    }

    /// Reveal at the spawn pose with physics on, braked.
    pub fn setup(&self) -> Sequence {
        let id = self.actor.id;
        Sequence::new(format!("Setup {id}"))
            .push(ActorTransformSetter::new(id, self.actor.pose, true))
            .push(StopVehicle::new(id, 1.0))
            .push(LifecycleTransition::new(id, LifecycleState::VisibleIdle))
    }

    /// Release the brake and, for autonomous actors, hand over control.
    pub fn onstart(&self) -> Sequence {
        let id = self.actor.id;
        let mut seq = Sequence::new(format!("Start {id}"));
        if self.autonomous {
            if self.actor.kind.is_walker() {
                seq = seq.push(ToggleWalkerController::new(id, true));
            } else if self.actor.kind.is_vehicle() {
                seq = seq.push(ChangeAutoPilot::new(id, true));
            }
        }
        seq.push(StopVehicle::new(id, 0.0))
            .push(LifecycleTransition::new(id, LifecycleState::Active))
    }

    /// The behavior that governs the actor while `Active`.  Can be taken once.
    pub fn take_main(&mut self) -> Option<BoxedBehavior> {
        self.main.take()
    }

    pub fn teardown(&self) -> ActorDestroy {
        ActorDestroy::new(self.actor.id)
    }
}
