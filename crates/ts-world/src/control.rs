//! Control inputs written by behaviors and ego agents.

/// Longitudinal/lateral control for a vehicle.  Walkers honour `brake` only:
/// any positive brake holds them in place.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleControl {
    /// `[0, 1]`
    pub throttle:   f32,
    /// `[-1, 1]`
    pub steer:      f32,
    /// `[0, 1]`
    pub brake:      f32,
    pub hand_brake: bool,
    pub reverse:    bool,
}

impl VehicleControl {
    /// Full brake, no throttle.
    pub fn full_brake() -> Self {
        Self { brake: 1.0, ..Self::default() }
    }

    /// Throttle only.
    pub fn throttle(value: f32) -> Self {
        Self { throttle: value.clamp(0.0, 1.0), ..Self::default() }
    }

    #[inline]
    pub fn is_braking(&self) -> bool {
        self.brake > 0.0 || self.hand_brake
    }
}

/// Which neighbouring lane a lane change or lookup targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LaneSide {
    Left,
    Right,
}

impl LaneSide {
    pub fn opposite(self) -> LaneSide {
        match self {
            LaneSide::Left  => LaneSide::Right,
            LaneSide::Right => LaneSide::Left,
        }
    }

    /// Sign of the lateral offset along the right vector.
    pub fn sign(self) -> f32 {
        match self {
            LaneSide::Left  => -1.0,
            LaneSide::Right => 1.0,
        }
    }
}
