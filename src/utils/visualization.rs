//! Trajectory plots with gnuplot
//!
//! Series are buffered and drawn into a single set of axes when the plot is
//! saved.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};
use std::io;

use crate::common::{Path2D, PlannerError, PlannerResult, Point2D, Pose2D};
use crate::mapping::WaypointMap;
use crate::path_planning::AnchorSet;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const ORANGE: &str = "#FFA500";
    pub const GRAY: &str = "#808080";

    pub const MAP: &str = GRAY;
    pub const TRAJECTORY: &str = RED;
    pub const HISTORY_ANCHOR: &str = GREEN;
    pub const FORWARD_ANCHOR: &str = BLUE;
    pub const VEHICLE: &str = ORANGE;
    pub const DRIVEN: &str = BLACK;
}

#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::TRAJECTORY, "Trajectory")
    }
}

#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

#[derive(Debug, Clone)]
enum Series {
    Lines { x: Vec<f64>, y: Vec<f64>, style: PathStyle },
    Points { x: Vec<f64>, y: Vec<f64>, style: PointStyle },
}

/// Plot of a map, anchors and trajectories
#[derive(Debug, Clone)]
pub struct TrajectoryPlot {
    title: String,
    series: Vec<Series>,
}

impl TrajectoryPlot {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            series: Vec::new(),
        }
    }

    /// Number of buffered series
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn plot_path(&mut self, path: &Path2D, style: &PathStyle) -> &mut Self {
        self.series.push(Series::Lines {
            x: path.x_coords(),
            y: path.y_coords(),
            style: style.clone(),
        });
        self
    }

    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        self.series.push(Series::Points {
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
            style: style.clone(),
        });
        self
    }

    /// Centerline of the map, closed back to the first waypoint
    pub fn plot_map(&mut self, map: &WaypointMap) -> &mut Self {
        let mut line: Vec<Point2D> = map.waypoints().iter().map(|w| w.position()).collect();
        if let Some(first) = line.first().copied() {
            line.push(first);
        }
        let style = PathStyle::new(colors::MAP, "Waypoints").with_line_width(1.0);
        self.plot_path(&Path2D::from_points(line), &style)
    }

    pub fn plot_anchors(&mut self, anchors: &AnchorSet) -> &mut Self {
        self.plot_points(
            anchors.history(),
            &PointStyle::new(colors::HISTORY_ANCHOR, "History anchors").with_size(1.5),
        );
        self.plot_points(
            anchors.forward(),
            &PointStyle::new(colors::FORWARD_ANCHOR, "Forward anchors")
                .with_size(1.5)
                .with_symbol('S'),
        )
    }

    /// Vehicle position with a short heading line
    pub fn plot_vehicle(&mut self, pose: &Pose2D, size: f64) -> &mut Self {
        self.plot_points(
            &[pose.position()],
            &PointStyle::new(colors::VEHICLE, "Vehicle").with_size(size),
        );
        let tip = Point2D::new(pose.x + size * pose.yaw.cos(), pose.y + size * pose.yaw.sin());
        self.series.push(Series::Lines {
            x: vec![pose.x, tip.x],
            y: vec![pose.y, tip.y],
            style: PathStyle::new(colors::VEHICLE, ""),
        });
        self
    }

    fn render(&self) -> Figure {
        let mut fg = Figure::new();
        {
            let axes = fg.axes2d();
            for series in &self.series {
                match series {
                    Series::Lines { x, y, style } => {
                        axes.lines(x, y, &[Caption(&style.caption), Color(&style.color), LineWidth(style.line_width)]);
                    }
                    Series::Points { x, y, style } => {
                        axes.points(
                            x,
                            y,
                            &[
                                Caption(&style.caption),
                                Color(&style.color),
                                PointSymbol(style.symbol),
                                PointSize(style.size),
                            ],
                        );
                    }
                }
            }

            if !self.title.is_empty() {
                axes.set_title(&self.title, &[]);
            }
            axes.set_x_label("X [m]", &[]);
            axes.set_y_label("Y [m]", &[]);
            axes.set_aspect_ratio(AutoOption::Fix(1.0));
        }
        fg
    }

    pub fn save_svg(&self, path: &str, width: u32, height: u32) -> PlannerResult<()> {
        self.render().save_to_svg(path, width, height).map_err(plot_error)
    }
}

fn plot_error<E: std::fmt::Display>(e: E) -> PlannerError {
    PlannerError::Io(io::Error::new(io::ErrorKind::Other, format!("gnuplot: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MapRow;

    #[test]
    fn test_path_style() {
        let style = PathStyle::new(colors::RED, "Test Path").with_line_width(3.0);
        assert_eq!(style.line_width, 3.0);
        assert_eq!(style.color, colors::RED);
    }

    #[test]
    fn test_series_are_buffered() {
        let rows: Vec<MapRow> = (0..4)
            .map(|i| MapRow::new(10.0 * i as f64, 0.0, 10.0 * i as f64, 0.0, 1.0))
            .collect();
        let map = WaypointMap::from_rows(&rows, 40.0).unwrap();

        let mut plot = TrajectoryPlot::new("cycle");
        plot.plot_map(&map)
            .plot_vehicle(&Pose2D::new(0.0, 6.0, 0.0), 2.0)
            .plot_path(&Path2D::from_xy(&[0.0, 1.0], &[6.0, 6.0]).unwrap(), &PathStyle::default());
        // vehicle adds a marker and a heading line
        assert_eq!(plot.series_count(), 4);
        match &plot.series[0] {
            Series::Lines { x, .. } => assert_eq!(x.len(), 5),
            _ => panic!("map should be drawn as lines"),
        }
    }
}
