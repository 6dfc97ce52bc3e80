//! Road geometry: waypoints and the sandbox's straight multi-lane road.
//!
//! Lane ids start at 1 for the lane through the layout origin and increase
//! to the right.  `s` is the distance along the road from the origin.

use ts_core::{Location, Transform};

use crate::LaneSide;

// ── Waypoint ──────────────────────────────────────────────────────────────────

/// A lane-centre pose on the road network.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    pub transform:  Transform,
    pub lane_id:    i32,
    pub lane_width: f32,
    /// Distance along the road from its origin, metres.
    pub s:          f32,
}

impl Waypoint {
    /// The waypoint `distance` metres further along the same lane.
    pub fn next(&self, distance: f32) -> Waypoint {
        Waypoint {
            transform: self.transform.advanced(distance),
            s:         self.s + distance,
            ..*self
        }
    }

    /// The waypoint `distance` metres back along the same lane.
    pub fn previous(&self, distance: f32) -> Waypoint {
        self.next(-distance)
    }

    #[inline]
    pub fn location(&self) -> Location {
        self.transform.location
    }
}

// ── RoadLayout ────────────────────────────────────────────────────────────────

/// A straight road of `lane_count` parallel lanes, all driving along the
/// origin's yaw.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadLayout {
    /// Pose of the centre of lane 1 at `s = 0`.
    pub origin:     Transform,
    pub lane_count: u8,
    pub lane_width: f32,
    /// Road length in metres.
    pub length:     f32,
}

impl Default for RoadLayout {
    fn default() -> Self {
        Self {
            origin:     Transform::default(),
            lane_count: 2,
            lane_width: 3.5,
            length:     1_000.0,
        }
    }
}

impl RoadLayout {
    /// Project `location` onto the nearest lane centre.
    ///
    /// Returns `None` when the point is off the road (beyond the outer lanes
    /// or outside `[0, length]`).
    pub fn waypoint(&self, location: Location) -> Option<Waypoint> {
        let rel   = location - self.origin.location;
        let fwd   = self.origin.rotation.forward_vector();
        let right = self.origin.rotation.right_vector();
        let s     = rel.x * fwd.x + rel.y * fwd.y;
        let lat   = rel.x * right.x + rel.y * right.y;

        if !(0.0..=self.length).contains(&s) {
            return None;
        }
        let idx = (lat / self.lane_width + 0.5).floor();
        if idx < 0.0 || idx >= self.lane_count as f32 {
            return None;
        }
        self.lane_waypoint(idx as i32 + 1, s)
    }

    /// The centre of `lane_id` at distance `s`.
    pub fn lane_waypoint(&self, lane_id: i32, s: f32) -> Option<Waypoint> {
        if lane_id < 1 || lane_id > self.lane_count as i32 {
            return None;
        }
        let transform = self
            .origin
            .advanced(s)
            .shifted_right((lane_id - 1) as f32 * self.lane_width);
        Some(Waypoint { transform, lane_id, lane_width: self.lane_width, s })
    }

    /// The parallel waypoint in the neighbouring lane, if that lane exists.
    pub fn adjacent(&self, wp: &Waypoint, side: LaneSide) -> Option<Waypoint> {
        let lane_id = match side {
            LaneSide::Left  => wp.lane_id - 1,
            LaneSide::Right => wp.lane_id + 1,
        };
        self.lane_waypoint(lane_id, wp.s)
    }

    /// Lane-centre points of `lane_id` every `spacing` metres.
    pub fn route(&self, lane_id: i32, spacing: f32) -> Vec<Location> {
        self.lane_points(lane_id, spacing)
            .into_iter()
            .map(|t| t.location)
            .collect()
    }

    /// Candidate spawn poses on every lane every `spacing` metres.
    pub fn spawn_points(&self, spacing: f32) -> Vec<Transform> {
        (1..=self.lane_count as i32)
            .flat_map(|lane| self.lane_points(lane, spacing))
            .collect()
    }

    fn lane_points(&self, lane_id: i32, spacing: f32) -> Vec<Transform> {
        if spacing <= 0.0 {
            return Vec::new();
        }
        let n = (self.length / spacing).floor() as usize;
        (0..=n)
            .filter_map(|i| self.lane_waypoint(lane_id, i as f32 * spacing))
            .map(|wp| wp.transform)
            .collect()
    }
}
