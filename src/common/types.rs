//! Common types shared by the map, the planner and the session layer

use nalgebra::Point2;

use crate::common::error::{PlannerError, PlannerResult};

/// 2D point in either the global map frame or the vehicle-local frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Bearing of the vector from `self` to `other` [rad]
    pub fn bearing_to(&self, other: &Point2D) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn to_point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Point2<f64>> for Point2D {
    fn from(p: Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Position + heading. Used as the reference frame of a planning cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Road-relative coordinate: `s` along the centerline, `d` lateral offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrenetPoint {
    pub s: f64,
    pub d: f64,
}

impl FrenetPoint {
    pub fn new(s: f64, d: f64) -> Self {
        Self { s, d }
    }
}

/// Localization of the ego vehicle for one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehiclePose {
    pub x: f64,
    pub y: f64,
    pub s: f64,
    pub d: f64,
    /// Heading [rad]
    pub yaw: f64,
    /// Speed [m/s]
    pub speed: f64,
}

impl VehiclePose {
    pub fn new(x: f64, y: f64, s: f64, d: f64, yaw: f64, speed: f64) -> Self {
        Self { x, y, s, d, yaw, speed }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn pose(&self) -> Pose2D {
        Pose2D::new(self.x, self.y, self.yaw)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        let fields = [
            ("x", self.x),
            ("y", self.y),
            ("s", self.s),
            ("d", self.d),
            ("yaw", self.yaw),
            ("speed", self.speed),
        ];
        for (name, value) in fields.iter() {
            if !value.is_finite() {
                return Err(PlannerError::MalformedInput(format!(
                    "vehicle pose field `{}` is not finite ({})",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Ordered sequence of global points. Used both for the unconsumed
/// previous path and for the trajectory handed back to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Path2D {
    pub points: Vec<Point2D>,
}

impl Path2D {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { points: Vec::with_capacity(capacity) }
    }

    pub fn from_points(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    /// Build a path from parallel coordinate slices.
    pub fn from_xy(x: &[f64], y: &[f64]) -> PlannerResult<Self> {
        if x.len() != y.len() {
            return Err(PlannerError::MalformedInput(format!(
                "path has {} x values but {} y values",
                x.len(),
                y.len()
            )));
        }
        let points = x.iter().zip(y.iter())
            .map(|(&x, &y)| Point2D::new(x, y))
            .collect();
        Ok(Self { points })
    }

    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&Point2D> {
        self.points.last()
    }

    /// The last point together with the nearest earlier point lying more
    /// than `min_gap` away from it, in path order. `None` if no such point
    /// exists, e.g. when the whole tail was planned for a stopped vehicle.
    pub fn last_distinct_pair(&self, min_gap: f64) -> Option<(Point2D, Point2D)> {
        let (last, rest) = self.points.split_last()?;
        rest.iter()
            .rev()
            .find(|p| p.distance(last) > min_gap)
            .map(|p| (*p, *last))
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    pub fn total_length(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.points.windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }

    pub fn validate(&self) -> PlannerResult<()> {
        match self.points.iter().position(|p| !p.is_finite()) {
            Some(i) => Err(PlannerError::MalformedInput(format!(
                "path point {} is not finite ({:?})",
                i, self.points[i]
            ))),
            None => Ok(()),
        }
    }
}

impl Default for Path2D {
    fn default() -> Self {
        Self::new()
    }
}
