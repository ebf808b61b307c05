//! Anchor point selection
//!
//! Five anchors shape the curve of a cycle: two history anchors that pin
//! the start of the new segment to what the vehicle is already doing, and
//! three forward anchors on the target lane center further down the road.
//!
//! Which history anchors are used depends on whether a previous path is
//! available:
//!
//! - `Bootstrapping`: fewer than two previous points. A point one meter
//!   behind the vehicle along its yaw is synthesized, the vehicle itself is
//!   the second anchor and the reference heading is the vehicle yaw.
//! - `Tracking`: the last previous point and the nearest earlier point
//!   distinct from it are the anchors and the reference heading is the
//!   bearing between them. Continuing the planned path, not the measured
//!   yaw, keeps heading and curvature continuous.
//!
//! A previous path whose points all coincide (planned while stopped) has no
//! bearing; it is bootstrapped around its last point with the vehicle yaw.

use log::debug;
use std::fmt;

use super::frame::LocalFrame;
use crate::common::{Path2D, Point2D, Pose2D, VehiclePose};
use crate::mapping::{to_cartesian, WaypointMap};

/// Number of anchors used for every fit
pub const ANCHOR_COUNT: usize = 5;

/// Previous-path points closer than this to the last one are treated as
/// the same point [m]
const MIN_ANCHOR_GAP: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorMode {
    Bootstrapping,
    Tracking,
}

impl AnchorMode {
    /// Mode for a previous path of `len` points
    pub fn from_history_len(len: usize) -> Self {
        if len < 2 {
            AnchorMode::Bootstrapping
        } else {
            AnchorMode::Tracking
        }
    }
}

impl fmt::Display for AnchorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorMode::Bootstrapping => write!(f, "bootstrapping"),
            AnchorMode::Tracking => write!(f, "tracking"),
        }
    }
}

/// Global anchors of one cycle and the reference frame they are fitted in
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorSet {
    /// History anchors first, then forward anchors by increasing distance
    pub points: [Point2D; ANCHOR_COUNT],
    /// Origin and heading of the local frame
    pub reference: Pose2D,
    pub mode: AnchorMode,
}

impl AnchorSet {
    pub fn history(&self) -> &[Point2D] {
        &self.points[..2]
    }

    pub fn forward(&self) -> &[Point2D] {
        &self.points[2..]
    }

    pub fn frame(&self) -> LocalFrame {
        LocalFrame::from_pose(&self.reference)
    }

    /// Anchors expressed in the local frame
    pub fn to_local(&self) -> Vec<Point2D> {
        self.frame().to_local(&self.points)
    }
}

/// Chooses the anchors of a cycle
#[derive(Debug, Clone)]
pub struct AnchorSelector {
    forward_offsets: [f64; 3],
}

impl AnchorSelector {
    pub fn new(forward_offsets: [f64; 3]) -> Self {
        Self { forward_offsets }
    }

    /// Select anchors for a vehicle at `pose` still holding `previous`,
    /// with forward anchors at lateral offset `target_d`.
    pub fn select(
        &self,
        pose: &VehiclePose,
        previous: &Path2D,
        target_d: f64,
        map: &WaypointMap,
    ) -> AnchorSet {
        let has_history = AnchorMode::from_history_len(previous.len()) == AnchorMode::Tracking;
        let tracked = if has_history {
            previous.last_distinct_pair(MIN_ANCHOR_GAP)
        } else {
            None
        };

        let (history, reference, mode) = match tracked {
            Some((prev, last)) => {
                let heading = prev.bearing_to(&last);
                ([prev, last], Pose2D::new(last.x, last.y, heading), AnchorMode::Tracking)
            }
            None => {
                // a tail planned at standstill has no bearing: restart from its end
                let origin = match previous.last() {
                    Some(last) if has_history => *last,
                    _ => pose.position(),
                };
                let behind = Point2D::new(origin.x - pose.yaw.cos(), origin.y - pose.yaw.sin());
                (
                    [behind, origin],
                    Pose2D::new(origin.x, origin.y, pose.yaw),
                    AnchorMode::Bootstrapping,
                )
            }
        };

        let forward: Vec<Point2D> = self
            .forward_offsets
            .iter()
            .map(|offset| to_cartesian(pose.s + offset, target_d, map))
            .collect();

        debug!(
            "anchors ({}): reference ({:.3}, {:.3}, {:.4} rad), forward d = {:.2}",
            mode, reference.x, reference.y, reference.yaw, target_d
        );

        AnchorSet {
            points: [history[0], history[1], forward[0], forward[1], forward[2]],
            reference,
            mode,
        }
    }
}
