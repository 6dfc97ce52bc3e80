//! Identifier newtypes.
//!
//! An `ActorId` is a non-owning handle: the simulator owns the actor and this
//! workspace only refers to it.  A `ScenarioId` is the position of a scenario
//! in its runner, assigned in registration order.

use std::fmt;

macro_rules! handle {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            /// Placeholder for "not assigned yet", e.g. a walker with no controller.
            pub const INVALID: $name = $name(u32::MAX);

            /// Slot in the sandbox's per-actor columns, or in the runner's
            /// scenario list.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

handle! {
    /// Handle to a simulator-managed actor (vehicle, walker, controller, prop).
    ActorId
}

handle! {
    /// A scenario's slot in its runner.
    ScenarioId
}
