//! Global <-> vehicle-local frame transform
//!
//! The local frame has its origin at the reference point of the cycle and
//! its x axis along the reference heading. Going to local translates by
//! `-origin` and then rotates by `-heading`; going back rotates by
//! `+heading` and translates by `+origin`.

use nalgebra::{Isometry2, Vector2};

use crate::common::{Point2D, Pose2D};

/// Rigid transform between the map frame and a vehicle-local frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    iso: Isometry2<f64>,
}

impl LocalFrame {
    pub fn new(origin: Point2D, heading: f64) -> Self {
        Self {
            iso: Isometry2::new(Vector2::new(origin.x, origin.y), heading),
        }
    }

    pub fn from_pose(pose: &Pose2D) -> Self {
        Self::new(pose.position(), pose.yaw)
    }

    pub fn origin(&self) -> Point2D {
        Point2D::new(self.iso.translation.vector.x, self.iso.translation.vector.y)
    }

    pub fn heading(&self) -> f64 {
        self.iso.rotation.angle()
    }

    pub fn to_local_point(&self, p: &Point2D) -> Point2D {
        self.iso.inverse_transform_point(&p.to_point()).into()
    }

    pub fn to_global_point(&self, p: &Point2D) -> Point2D {
        self.iso.transform_point(&p.to_point()).into()
    }

    pub fn to_local(&self, points: &[Point2D]) -> Vec<Point2D> {
        points.iter().map(|p| self.to_local_point(p)).collect()
    }

    pub fn to_global(&self, points: &[Point2D]) -> Vec<Point2D> {
        points.iter().map(|p| self.to_global_point(p)).collect()
    }
}

/// Express global `points` in the frame at `origin` with `heading`
pub fn to_local(points: &[Point2D], origin: Point2D, heading: f64) -> Vec<Point2D> {
    LocalFrame::new(origin, heading).to_local(points)
}

/// Inverse of [`to_local`]
pub fn to_global(points: &[Point2D], origin: Point2D, heading: f64) -> Vec<Point2D> {
    LocalFrame::new(origin, heading).to_global(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_translate_then_rotate() {
        // Point one meter "north" of an origin heading north is straight ahead
        let frame = LocalFrame::new(Point2D::new(10.0, 5.0), FRAC_PI_2);
        let local = frame.to_local_point(&Point2D::new(10.0, 6.0));
        assert_approx_eq!(local.x, 1.0, 1e-12);
        assert_approx_eq!(local.y, 0.0, 1e-12);

        // ...and a point to the west is on the left
        let local = frame.to_local_point(&Point2D::new(8.0, 5.0));
        assert_approx_eq!(local.x, 0.0, 1e-12);
        assert_approx_eq!(local.y, 2.0, 1e-12);
    }

    #[test]
    fn test_origin_maps_to_zero() {
        let frame = LocalFrame::new(Point2D::new(909.48, 1128.67), 0.3);
        let local = frame.to_local_point(&frame.origin());
        assert_approx_eq!(local.x, 0.0, 1e-12);
        assert_approx_eq!(local.y, 0.0, 1e-12);
        assert_approx_eq!(frame.heading(), 0.3, 1e-12);
    }

    #[test]
    fn test_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let origin = Point2D::new(rng.gen_range(-3000.0..3000.0), rng.gen_range(-3000.0..3000.0));
            let heading = rng.gen_range(-PI..PI);
            let points: Vec<Point2D> = (0..5)
                .map(|_| Point2D::new(rng.gen_range(-3000.0..3000.0), rng.gen_range(-3000.0..3000.0)))
                .collect();

            let back = to_global(&to_local(&points, origin, heading), origin, heading);
            for (p, q) in points.iter().zip(back.iter()) {
                assert!((p.x - q.x).abs() < 1e-9, "{:?} != {:?}", p, q);
                assert!((p.y - q.y).abs() < 1e-9, "{:?} != {:?}", p, q);
            }
        }
    }
}
