//! Highway planner session over stdin/stdout
//!
//! Reads one simulator text frame per line from stdin and writes every
//! reply on its own line to stdout. This binary does not open a websocket:
//! the simulator connects to a websocket server on port 4567, so driving it
//! needs an external relay that forwards each websocket text message to
//! stdin and each stdout line back to the socket. Without one it can only
//! replay recorded sessions.
//!
//! Usage:
//!   highway_planner --map data/highway_map.csv < session.log
//!   highway_planner --map data/highway_map.csv --config planner.toml --lane 2

use clap::Parser;
use log::{error, info};
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;

use highway_planner::config::PlannerConfig;
use highway_planner::mapping::WaypointMap;
use highway_planner::path_planning::{PolicyInput, TrajectoryPlanner};
use highway_planner::session::VehicleSession;
use highway_planner::PlannerResult;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Waypoint map: whitespace separated `x y s dx dy` rows
    #[arg(short, long, default_value = "data/highway_map.csv")]
    map: String,

    /// Planner parameter file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Track length override [m]
    #[arg(long)]
    max_s: Option<f64>,

    /// Target lane, 0 is next to the centerline
    #[arg(short, long)]
    lane: Option<usize>,

    /// Speed ceiling override [m/s]
    #[arg(short, long)]
    speed_ceiling: Option<f64>,
}

fn build_session(args: &Args) -> PlannerResult<VehicleSession> {
    let mut config = match &args.config {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    };
    if let Some(max_s) = args.max_s {
        config.map.max_s = max_s;
    }

    let map = WaypointMap::from_path(&args.map, config.map.max_s)?;
    let planner = Arc::new(TrajectoryPlanner::new(Arc::new(map), config)?);

    let default_policy = planner.default_policy();
    let policy = PolicyInput::new(
        args.lane.unwrap_or(default_policy.target_lane),
        args.speed_ceiling.unwrap_or(default_policy.speed_ceiling),
    );
    info!("target lane {}, speed ceiling {:.1} m/s", policy.target_lane, policy.speed_ceiling);
    Ok(VehicleSession::with_policy(planner, policy))
}

fn run(session: &mut VehicleSession) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Some(reply) = session.handle_frame(&line) {
            writeln!(out, "{}", reply)?;
            out.flush()?;
        }
    }
    info!("input closed after {} cycles", session.state().cycles);
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut session = match build_session(&args) {
        Ok(session) => session,
        Err(e) => {
            error!("{}", e);
            eprintln!("Failed to start planner: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&mut session) {
        eprintln!("I/O error: {}", e);
        process::exit(1);
    }
}
