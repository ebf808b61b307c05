//! Frenet <-> Cartesian conversion against a waypoint map
//!
//! `s` is the distance along the centerline, `d` the lateral offset along
//! the map normal. Both directions are linear interpolations between
//! neighbouring waypoints; the segment from the last waypoint back to the
//! first closes the track loop.

use ordered_float::OrderedFloat;
use std::f64::consts::{FRAC_PI_4, PI};

use super::waypoint_map::WaypointMap;
use crate::common::{FrenetPoint, Point2D};

/// Segment of the map containing a given `s`
struct Segment {
    from: usize,
    to: usize,
    /// Fraction along the segment in `[0, 1)`
    t: f64,
}

fn find_segment(s: f64, map: &WaypointMap) -> Segment {
    let wps = map.waypoints();
    let n = wps.len();
    let s = map.wrap_s(s);
    let first = &wps[0];
    let last = &wps[n - 1];
    let closing_len = map.max_s() - last.s + first.s;

    let idx = wps.partition_point(|wp| wp.s <= s);
    if idx == 0 {
        // Before the first waypoint: still on the closing segment
        return Segment {
            from: n - 1,
            to: 0,
            t: (s + map.max_s() - last.s) / closing_len,
        };
    }

    let from = idx - 1;
    let to = (from + 1) % n;
    let seg_len = if to == 0 { closing_len } else { wps[to].s - wps[from].s };
    Segment {
        from,
        to,
        t: (s - wps[from].s) / seg_len,
    }
}

/// Convert a Frenet coordinate to a global Cartesian point.
///
/// `s` outside `[0, max_s)` wraps around the track.
pub fn to_cartesian(s: f64, d: f64, map: &WaypointMap) -> Point2D {
    let seg = find_segment(s, map);
    let a = &map.waypoints()[seg.from];
    let b = &map.waypoints()[seg.to];
    let t = seg.t;

    let cx = a.x + t * (b.x - a.x);
    let cy = a.y + t * (b.y - a.y);

    let mut nx = a.dx + t * (b.dx - a.dx);
    let mut ny = a.dy + t * (b.dy - a.dy);
    let norm = nx.hypot(ny);
    if norm < 1e-9 {
        // opposite normals at both ends
        nx = a.dx;
        ny = a.dy;
    } else {
        nx /= norm;
        ny /= norm;
    }

    Point2D::new(cx + d * nx, cy + d * ny)
}

/// Index of the waypoint nearest to `(x, y)`
pub fn closest_waypoint(x: f64, y: f64, map: &WaypointMap) -> usize {
    let p = Point2D::new(x, y);
    map.waypoints()
        .iter()
        .enumerate()
        .min_by_key(|(_, wp)| OrderedFloat(wp.position().distance(&p)))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Index of the first waypoint ahead of `(x, y)` when driving with `heading`
pub fn next_waypoint(x: f64, y: f64, heading: f64, map: &WaypointMap) -> usize {
    let closest = closest_waypoint(x, y, map);
    let wp = &map.waypoints()[closest];
    let bearing = (wp.y - y).atan2(wp.x - x);
    let mut angle = (heading - bearing).abs().rem_euclid(2.0 * PI);
    angle = angle.min(2.0 * PI - angle);

    if angle > FRAC_PI_4 {
        (closest + 1) % map.len()
    } else {
        closest
    }
}

/// Convert a global Cartesian point to Frenet coordinates.
///
/// The point is projected onto the segment between the previous and the
/// next waypoint; `d` is positive on the side the map normal points to.
pub fn to_frenet(x: f64, y: f64, heading: f64, map: &WaypointMap) -> FrenetPoint {
    let wps = map.waypoints();
    let n = wps.len();
    let next = next_waypoint(x, y, heading, map);
    let prev = if next == 0 { n - 1 } else { next - 1 };

    let a = &wps[prev];
    let b = &wps[next];
    let seg_x = b.x - a.x;
    let seg_y = b.y - a.y;
    let seg_len = seg_x.hypot(seg_y);
    let rel_x = x - a.x;
    let rel_y = y - a.y;

    let along = if seg_len > 1e-9 {
        (rel_x * seg_x + rel_y * seg_y) / seg_len
    } else {
        0.0
    };
    let (foot_x, foot_y) = if seg_len > 1e-9 {
        (a.x + along * seg_x / seg_len, a.y + along * seg_y / seg_len)
    } else {
        (a.x, a.y)
    };
    let off_x = x - foot_x;
    let off_y = y - foot_y;
    let d_abs = off_x.hypot(off_y);
    let side = off_x * a.dx + off_y * a.dy;
    let d = if side < 0.0 { -d_abs } else { d_abs };

    FrenetPoint::new(map.wrap_s(a.s + along), d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::waypoint_map::MapRow;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Straight road along +x, normal pointing to +y, 10 m spacing
    fn straight_map() -> WaypointMap {
        let rows: Vec<MapRow> = (0..10)
            .map(|i| MapRow::new(10.0 * i as f64, 0.0, 10.0 * i as f64, 0.0, 1.0))
            .collect();
        WaypointMap::from_rows(&rows, 100.0).unwrap()
    }

    /// Circular track of radius 100 m, counter-clockwise, normals outward
    fn circle_map() -> (WaypointMap, f64) {
        let radius = 100.0;
        let n = 72;
        let circumference = 2.0 * PI * radius;
        let rows: Vec<MapRow> = (0..n)
            .map(|i| {
                let theta = 2.0 * PI * i as f64 / n as f64;
                MapRow::new(
                    radius * theta.cos(),
                    radius * theta.sin(),
                    circumference * i as f64 / n as f64,
                    theta.cos(),
                    theta.sin(),
                )
            })
            .collect();
        (WaypointMap::from_rows(&rows, circumference).unwrap(), circumference)
    }

    #[test]
    fn test_straight_road_interpolation() {
        let map = straight_map();
        let p = to_cartesian(25.0, 6.0, &map);
        assert_approx_eq!(p.x, 25.0);
        assert_approx_eq!(p.y, 6.0);

        let p = to_cartesian(0.0, 0.0, &map);
        assert_approx_eq!(p.x, 0.0);
        assert_approx_eq!(p.y, 0.0);
    }

    #[test]
    fn test_closing_segment() {
        let map = straight_map();
        // s = 95 lies between the last waypoint (s = 90, x = 90) and the
        // first (s = 0 at 100, x = 0)
        let p = to_cartesian(95.0, 0.0, &map);
        assert_approx_eq!(p.x, 45.0);
    }

    #[test]
    fn test_wrap_around() {
        let (map, max_s) = circle_map();
        for &eps in &[1e-3, 0.5, 3.0] {
            for &d in &[2.0, 6.0, 10.0] {
                let wrapped = to_cartesian(max_s + eps, d, &map);
                let direct = to_cartesian(eps, d, &map);
                assert!(wrapped.distance(&direct) < 1e-6, "eps {} d {}", eps, d);
            }
        }
    }

    #[test]
    fn test_negative_s_wraps() {
        let (map, max_s) = circle_map();
        let a = to_cartesian(-10.0, 2.0, &map);
        let b = to_cartesian(max_s - 10.0, 2.0, &map);
        assert!(a.distance(&b) < 1e-6);
    }

    #[test]
    fn test_lateral_offset_follows_normal() {
        let (map, _) = circle_map();
        let center = to_cartesian(200.0, 0.0, &map);
        let outer = to_cartesian(200.0, 6.0, &map);
        assert_approx_eq!(center.distance(&outer), 6.0, 1e-9);
        // outward normal: offset point is farther from the circle center
        assert!(outer.distance(&Point2D::origin()) > center.distance(&Point2D::origin()));
    }

    #[test]
    fn test_closest_and_next_waypoint() {
        let map = straight_map();
        assert_eq!(closest_waypoint(21.0, 0.5, &map), 2);
        // heading +x, waypoint 2 (x = 20) is behind x = 21
        assert_eq!(next_waypoint(21.0, 0.5, 0.0, &map), 3);
        // heading -x, waypoint 2 is ahead
        assert_eq!(next_waypoint(21.0, 0.5, PI, &map), 2);
    }

    #[test]
    fn test_frenet_round_trip_straight() {
        let map = straight_map();
        let p = to_cartesian(34.0, 6.0, &map);
        let f = to_frenet(p.x, p.y, 0.0, &map);
        assert_approx_eq!(f.s, 34.0, 1e-9);
        assert_approx_eq!(f.d, 6.0, 1e-9);

        let f = to_frenet(34.0, -2.0, 0.0, &map);
        assert_approx_eq!(f.d, -2.0, 1e-9);
    }

    #[test]
    fn test_frenet_round_trip_circle() {
        let (map, max_s) = circle_map();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let s = rng.gen_range(0.0..max_s);
            let d = rng.gen_range(0.0..6.0);
            let p = to_cartesian(s, d, &map);
            // tangent heading of a counter-clockwise circle
            let heading = p.y.atan2(p.x) + PI / 2.0;
            let f = to_frenet(p.x, p.y, heading, &map);
            let back = to_cartesian(f.s, f.d, &map);
            // chords vs. interpolated normals differ slightly off-center
            assert!(back.distance(&p) < 1.0, "s {} d {} -> {:?}", s, d, f);
        }
    }
}
