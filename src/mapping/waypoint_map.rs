//! Highway waypoint map
//!
//! Centerline waypoints of one side of the highway, each carrying its
//! position along the track `s` and the unit normal `(dx, dy)` pointing
//! toward increasing `d`. The table is loaded once and never mutated, so a
//! single `Arc<WaypointMap>` can serve any number of sessions.

use itertools::Itertools;
use log::info;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::common::{PlannerError, PlannerResult, Point2D};

/// One row of the map source, in file column order
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MapRow {
    pub x: f64,
    pub y: f64,
    pub s: f64,
    pub dx: f64,
    pub dy: f64,
}

impl MapRow {
    pub fn new(x: f64, y: f64, s: f64, dx: f64, dy: f64) -> Self {
        Self { x, y, s, dx, dy }
    }
}

/// Centerline reference point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    /// Distance along the track [m]
    pub s: f64,
    pub x: f64,
    pub y: f64,
    /// Lateral unit normal
    pub dx: f64,
    pub dy: f64,
}

impl Waypoint {
    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn normal(&self) -> Point2D {
        Point2D::new(self.dx, self.dy)
    }
}

/// Immutable waypoint table ordered by `s`
#[derive(Debug, Clone)]
pub struct WaypointMap {
    waypoints: Vec<Waypoint>,
    max_s: f64,
}

impl WaypointMap {
    /// Build the map from rows ordered by `s`.
    ///
    /// Fails if there are fewer than two rows, a value is not finite, `s`
    /// is not strictly increasing inside `[0, max_s)`, or a normal is zero.
    pub fn from_rows(rows: &[MapRow], max_s: f64) -> PlannerResult<Self> {
        if !max_s.is_finite() || max_s <= 0.0 {
            return Err(PlannerError::MapLoad(format!("max_s must be positive, got {}", max_s)));
        }
        if rows.len() < 2 {
            return Err(PlannerError::MapLoad(format!(
                "at least 2 waypoints are required, got {}",
                rows.len()
            )));
        }

        let mut waypoints = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let values = [row.x, row.y, row.s, row.dx, row.dy];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(PlannerError::MapLoad(format!("row {} has a non-finite value: {:?}", i, row)));
            }
            if row.s < 0.0 || row.s >= max_s {
                return Err(PlannerError::MapLoad(format!(
                    "row {} has s = {} outside [0, {})",
                    i, row.s, max_s
                )));
            }
            let norm = row.dx.hypot(row.dy);
            if norm < 1e-9 {
                return Err(PlannerError::MapLoad(format!("row {} has a zero-length normal", i)));
            }
            waypoints.push(Waypoint {
                s: row.s,
                x: row.x,
                y: row.y,
                dx: row.dx / norm,
                dy: row.dy / norm,
            });
        }

        if let Some((i, (a, b))) = waypoints
            .iter()
            .tuple_windows()
            .enumerate()
            .find(|(_, (a, b))| b.s <= a.s)
        {
            return Err(PlannerError::MapLoad(format!(
                "s must be strictly increasing: row {} has s = {}, row {} has s = {}",
                i,
                a.s,
                i + 1,
                b.s
            )));
        }

        Ok(Self { waypoints, max_s })
    }

    /// Parse the map text format: one waypoint per line, five columns
    /// `x y s dx dy` separated by whitespace or commas, no header.
    pub fn from_reader<R: Read>(mut reader: R, max_s: f64) -> PlannerResult<Self> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| PlannerError::MapLoad(format!("cannot read map source: {}", e)))?;

        // Whitespace separated rows are rewritten as comma separated ones so
        // that runs of blanks never produce empty fields.
        let normalized = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|field| !field.is_empty())
                .join(","))
            .join("\n");

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_reader(normalized.as_bytes());

        let rows = csv_reader
            .deserialize::<MapRow>()
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_rows(&rows, max_s)
    }

    pub fn from_path<P: AsRef<Path>>(path: P, max_s: f64) -> PlannerResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| PlannerError::MapLoad(format!("cannot open {}: {}", path.display(), e)))?;
        let map = Self::from_reader(file, max_s)?;
        info!("Loaded {} waypoints from {} (max_s = {})", map.len(), path.display(), max_s);
        Ok(map)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn max_s(&self) -> f64 {
        self.max_s
    }

    /// Wrap `s` into `[0, max_s)`
    pub fn wrap_s(&self, s: f64) -> f64 {
        let wrapped = s.rem_euclid(self.max_s);
        if wrapped >= self.max_s {
            0.0
        } else {
            wrapped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP_TEXT: &str = "\
784.6001 1135.571 0 -0.02359831 -0.9997216
815.2679 1134.93 30.6744785308838 -0.01099479 -0.9999396
844.6398 1134.911 60.0463714599609 -0.002048373 -0.9999979
";

    #[test]
    fn test_load_whitespace_separated() {
        let map = WaypointMap::from_reader(MAP_TEXT.as_bytes(), 6945.554).unwrap();
        assert_eq!(map.len(), 3);
        let wp = map.get(1).unwrap();
        assert_eq!(wp.x, 815.2679);
        assert_eq!(wp.s, 30.6744785308838);
        assert!((wp.dx.hypot(wp.dy) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_comma_separated() {
        let text = "0,0,0,0,1\n10, 0, 10, 0, 1\n";
        let map = WaypointMap::from_reader(text.as_bytes(), 100.0).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(1).unwrap().position(), Point2D::new(10.0, 0.0));
    }

    #[test]
    fn test_empty_map_rejected() {
        let err = WaypointMap::from_reader("".as_bytes(), 100.0).unwrap_err();
        assert!(matches!(err, PlannerError::MapLoad(_)));
    }

    #[test]
    fn test_malformed_row_rejected() {
        let text = "0 0 0 0 1\n10 0 ten 0 1\n";
        let err = WaypointMap::from_reader(text.as_bytes(), 100.0).unwrap_err();
        assert!(matches!(err, PlannerError::MapLoad(_)));

        let text = "0 0 0 0 1\n10 0 10 0\n";
        let err = WaypointMap::from_reader(text.as_bytes(), 100.0).unwrap_err();
        assert!(matches!(err, PlannerError::MapLoad(_)));
    }

    #[test]
    fn test_unordered_s_rejected() {
        let rows = [
            MapRow::new(0.0, 0.0, 0.0, 0.0, 1.0),
            MapRow::new(10.0, 0.0, 10.0, 0.0, 1.0),
            MapRow::new(5.0, 0.0, 5.0, 0.0, 1.0),
        ];
        let err = WaypointMap::from_rows(&rows, 100.0).unwrap_err();
        assert!(matches!(err, PlannerError::MapLoad(_)));
    }

    #[test]
    fn test_s_beyond_track_rejected() {
        let rows = [
            MapRow::new(0.0, 0.0, 0.0, 0.0, 1.0),
            MapRow::new(10.0, 0.0, 100.0, 0.0, 1.0),
        ];
        assert!(WaypointMap::from_rows(&rows, 100.0).is_err());
    }

    #[test]
    fn test_zero_normal_rejected() {
        let rows = [
            MapRow::new(0.0, 0.0, 0.0, 0.0, 0.0),
            MapRow::new(10.0, 0.0, 10.0, 0.0, 1.0),
        ];
        assert!(WaypointMap::from_rows(&rows, 100.0).is_err());
    }

    #[test]
    fn test_wrap_s() {
        let rows = [
            MapRow::new(0.0, 0.0, 0.0, 0.0, 1.0),
            MapRow::new(10.0, 0.0, 10.0, 0.0, 1.0),
        ];
        let map = WaypointMap::from_rows(&rows, 100.0).unwrap();
        assert!((map.wrap_s(105.0) - 5.0).abs() < 1e-12);
        assert!((map.wrap_s(-5.0) - 95.0).abs() < 1e-12);
        assert_eq!(map.wrap_s(0.0), 0.0);
    }
}
