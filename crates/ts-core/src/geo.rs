//! Cartesian world geometry.
//!
//! The simulator uses a right-handed metric frame: `x`/`y` on the ground
//! plane, `z` up, yaw in degrees measured from the `+x` axis.  `f32` gives
//! millimetre precision over a few kilometres, plenty for a town map.

use std::fmt;

// ── Location ──────────────────────────────────────────────────────────────────

/// A point (or displacement) in world space, in metres.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Location {
    pub const ORIGIN: Location = Location { x: 0.0, y: 0.0, z: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance(self, other: Location) -> f32 {
        (self - other).length()
    }

    /// Distance ignoring the vertical component.
    #[inline]
    pub fn distance_2d(self, other: Location) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn dot(self, other: Location) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Copy of `self` shifted vertically by `dz`.
    #[inline]
    pub fn with_z_offset(self, dz: f32) -> Self {
        Self { z: self.z + dz, ..self }
    }

    /// Scale every component by `k`.
    #[inline]
    pub fn scaled(self, k: f32) -> Self {
        Self { x: self.x * k, y: self.y * k, z: self.z * k }
    }
}

impl std::ops::Add for Location {
    type Output = Location;
    #[inline]
    fn add(self, rhs: Location) -> Location {
        Location::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Location {
    type Output = Location;
    #[inline]
    fn sub(self, rhs: Location) -> Location {
        Location::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::AddAssign for Location {
    #[inline]
    fn add_assign(&mut self, rhs: Location) {
        *self = *self + rhs;
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ── Rotation ──────────────────────────────────────────────────────────────────

/// Orientation in degrees.  Only yaw matters for ground actors.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rotation {
    pub pitch: f32,
    pub yaw:   f32,
    pub roll:  f32,
}

impl Rotation {
    #[inline]
    pub fn from_yaw(yaw: f32) -> Self {
        Self { yaw, ..Self::default() }
    }

    /// Unit vector pointing along the yaw on the ground plane.
    pub fn forward_vector(self) -> Location {
        let rad = self.yaw.to_radians();
        Location::new(rad.cos(), rad.sin(), 0.0)
    }

    /// Unit vector pointing 90° clockwise from the forward vector
    /// (towards the right-hand lane in a right-hand-traffic map).
    pub fn right_vector(self) -> Location {
        let rad = (self.yaw + 90.0).to_radians();
        Location::new(rad.cos(), rad.sin(), 0.0)
    }

    /// Yaw normalised to `[0, 360)`.
    #[inline]
    pub fn compass(self) -> f32 {
        self.yaw.rem_euclid(360.0)
    }
}

// ── Transform ─────────────────────────────────────────────────────────────────

/// Location plus orientation: the pose of an actor.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub location: Location,
    pub rotation: Rotation,
}

impl Transform {
    #[inline]
    pub fn new(location: Location, rotation: Rotation) -> Self {
        Self { location, rotation }
    }

    /// Same pose moved `distance` metres along its forward vector.
    pub fn advanced(self, distance: f32) -> Self {
        Self {
            location: self.location + self.rotation.forward_vector().scaled(distance),
            ..self
        }
    }

    /// Same pose moved `distance` metres sideways (positive = right).
    pub fn shifted_right(self, distance: f32) -> Self {
        Self {
            location: self.location + self.rotation.right_vector().scaled(distance),
            ..self
        }
    }

    /// Same pose translated vertically; used to hide actors underground.
    #[inline]
    pub fn with_z_offset(self, dz: f32) -> Self {
        Self { location: self.location.with_z_offset(dz), ..self }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} yaw {:.1}", self.location, self.rotation.yaw)
    }
}

// ── Compass helpers ───────────────────────────────────────────────────────────

/// Coarse compass heading for a yaw in degrees: one of `N`, `NE`, `E`, `SE`,
/// `S`, `SW`, `W`, `NW`.
///
/// Half-degree dead bands around the cardinal axes keep an actor pointing
/// almost exactly north from being classified as `NE`/`NW`.
pub fn heading(compass: f32) -> &'static str {
    let c = compass.rem_euclid(360.0);
    let n = c > 270.5 || c < 89.5;
    let s = 90.5 < c && c < 269.5;
    let e = 0.5 < c && c < 179.5;
    let w = 180.5 < c && c < 359.5;
    match (n, s, e, w) {
        (true, _, true, _)  => "NE",
        (true, _, _, true)  => "NW",
        (true, _, _, _)     => "N",
        (_, true, true, _)  => "SE",
        (_, true, _, true)  => "SW",
        (_, true, _, _)     => "S",
        (_, _, true, _)     => "E",
        (_, _, _, true)     => "W",
        _                   => "N",
    }
}

/// Rotate an offset expressed relative to an actor's heading (`dx` sideways,
/// `dy` ahead) into absolute world axes.
pub fn relative_to_absolute(compass: f32, dx: f32, dy: f32) -> (f32, f32) {
    let (ahead, side) = (dy, dx);
    let rad = compass.to_radians();
    let x = ahead * rad.cos() - side * rad.sin();
    let y = ahead * rad.sin() + side * rad.cos();
    (x, y)
}
