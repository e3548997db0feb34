//! Circle parameters and the evenly spaced point generator

use std::f64::consts::TAU;

/// A point in data coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A circle together with how many points to sample on it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleSpec {
    pub center: Point,
    /// Radius in data units, expected to be >= 0
    pub radius: f64,
    /// Number of sampled points, expected to be >= 1
    pub point_count: usize,
}

impl CircleSpec {
    pub fn new(center: Point, radius: f64, point_count: usize) -> Self {
        Self {
            center,
            radius,
            point_count,
        }
    }
}

/// Ordered points sampled on a circle's circumference
pub type PointSet = Vec<Point>;

/// Sample `point_count` equally spaced points on the circle.
///
/// The first point sits at angle 0 (`(cx + r, cy)`), the rest follow
/// counterclockwise at `2π / n` steps. The full-turn duplicate is excluded.
pub fn generate_circle_points(spec: &CircleSpec) -> PointSet {
    let n = spec.point_count;
    let Point { x: cx, y: cy } = spec.center;
    let r = spec.radius;

    (0..n)
        .map(|i| {
            let theta = TAU * i as f64 / n as f64;
            Point::new(cx + r * theta.cos(), cy + r * theta.sin())
        })
        .collect()
}
