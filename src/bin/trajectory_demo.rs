//! Closed-loop planner demo on a synthetic oval track
//!
//! A simple vehicle model consumes a random number of trajectory points
//! every cycle, the way the simulator does under varying latency, and the
//! planner keeps extending whatever is left. The driven path and the last
//! planned trajectory are saved to ./img/trajectory_demo.svg.

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fs;
use std::sync::Arc;

use highway_planner::common::{Path2D, VehiclePose};
use highway_planner::config::PlannerConfig;
use highway_planner::mapping::{to_frenet, MapRow, WaypointMap};
use highway_planner::path_planning::{CycleInput, TrajectoryPlanner};
use highway_planner::utils::{colors, PathStyle, TrajectoryPlot};

const STRAIGHT: f64 = 300.0;
const RADIUS: f64 = 100.0;
const WAYPOINT_SPACING: f64 = 10.0;
const CYCLES: usize = 1500;
const MAX_CONSUMED: usize = 4;

/// Position and heading at arc length `u` along the oval centerline.
/// Counterclockwise, starting at the bottom-left end of the lower straight.
fn oval_point(u: f64) -> (f64, f64, f64) {
    let arc = PI * RADIUS;
    if u < STRAIGHT {
        (u, -RADIUS, 0.0)
    } else if u < STRAIGHT + arc {
        let phi = -FRAC_PI_2 + (u - STRAIGHT) / RADIUS;
        (STRAIGHT + RADIUS * phi.cos(), RADIUS * phi.sin(), phi + FRAC_PI_2)
    } else if u < 2.0 * STRAIGHT + arc {
        (STRAIGHT - (u - STRAIGHT - arc), RADIUS, PI)
    } else {
        let phi = FRAC_PI_2 + (u - 2.0 * STRAIGHT - arc) / RADIUS;
        (RADIUS * phi.cos(), RADIUS * phi.sin(), phi + FRAC_PI_2)
    }
}

fn oval_track() -> (Vec<MapRow>, f64) {
    let length = 2.0 * STRAIGHT + 2.0 * PI * RADIUS;
    let count = (length / WAYPOINT_SPACING) as usize;
    let rows = (0..count)
        .map(|i| {
            let s = i as f64 * WAYPOINT_SPACING;
            let (x, y, heading) = oval_point(s);
            // d grows to the right of the driving direction
            MapRow::new(x, y, s, heading.sin(), -heading.cos())
        })
        .collect();
    (rows, length)
}

fn main() {
    env_logger::init();
    println!("Trajectory demo start!!");

    let (rows, max_s) = oval_track();
    let map = match WaypointMap::from_rows(&rows, max_s) {
        Ok(map) => Arc::new(map),
        Err(e) => {
            eprintln!("Failed to build the track: {}", e);
            return;
        }
    };
    let mut config = PlannerConfig::default();
    config.map.max_s = max_s;
    let planner = match TrajectoryPlanner::new(map.clone(), config) {
        Ok(planner) => planner,
        Err(e) => {
            eprintln!("Failed to create planner: {}", e);
            return;
        }
    };

    let mut rng = StdRng::seed_from_u64(42);
    let mut state = planner.initial_state();
    let policy = planner.default_policy();
    let tick = planner.config().sampler.tick;

    let start_d = planner.config().lanes.lane_center(policy.target_lane);
    let mut pose = VehiclePose::new(0.0, -RADIUS - start_d, 0.0, start_d, 0.0, 0.0);
    let mut previous = Path2D::new();
    let mut driven = Path2D::from_points(vec![pose.position()]);
    let mut last_output = None;

    for cycle in 0..CYCLES {
        let input = CycleInput {
            pose,
            previous_path: previous.clone(),
            policy,
        };
        let out = match planner.plan(&state, &input) {
            Ok(out) => out,
            Err(e) => {
                eprintln!("cycle {} skipped: {}", cycle, e);
                continue;
            }
        };
        state = out.state;

        // the vehicle drives a few points before the next cycle
        let consumed = rng.gen_range(1..=MAX_CONSUMED).min(out.trajectory.len());
        let driven_now = &out.trajectory.points[..consumed];
        let prev_position = pose.position();
        for p in driven_now {
            driven.push(*p);
        }
        previous = Path2D::from_points(out.trajectory.points[consumed..].to_vec());

        let position = driven_now[consumed - 1];
        let reference = if consumed >= 2 { driven_now[consumed - 2] } else { prev_position };
        let step = reference.distance(&position);
        let yaw = if step > 1e-9 { reference.bearing_to(&position) } else { pose.yaw };
        let frenet = to_frenet(position.x, position.y, yaw, &map);
        pose = VehiclePose::new(position.x, position.y, frenet.s, frenet.d, yaw, step / tick);

        if cycle % 100 == 0 {
            info!(
                "cycle {}: s {:.1} m, d {:.2} m, commanded {:.1} m/s",
                cycle,
                pose.s,
                pose.d,
                state.speed()
            );
        }
        last_output = Some(out);
    }

    println!(
        "Drove {:.1} m in {} cycles, final speed {:.2} m/s",
        driven.total_length(),
        CYCLES,
        state.speed()
    );

    let mut plot = TrajectoryPlot::new("Highway trajectory demo");
    plot.plot_map(&map)
        .plot_path(&driven, &PathStyle::new(colors::DRIVEN, "Driven").with_line_width(1.0));
    if let Some(out) = &last_output {
        plot.plot_path(&out.trajectory, &PathStyle::default())
            .plot_anchors(&out.anchors);
    }
    plot.plot_vehicle(&pose.pose(), 5.0);

    if let Err(e) = fs::create_dir_all("./img") {
        eprintln!("Cannot create ./img: {}", e);
        return;
    }
    match plot.save_svg("./img/trajectory_demo.svg", 800, 600) {
        Ok(()) => println!("Saved ./img/trajectory_demo.svg"),
        Err(e) => eprintln!("Plot not saved: {}", e),
    }
}
