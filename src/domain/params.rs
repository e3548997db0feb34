//! Raw circle parameters as entered by the user, and their validation
//!
//! The presentation layer collects these values; `validate` is the single
//! gate before they reach the point generator and figure renderer.

use serde::{Deserialize, Serialize};

use super::circle::{CircleSpec, Point};
use super::color::PointColor;
use crate::error::{Error, Result};

/// Smallest allowed number of points
pub const MIN_POINT_COUNT: u32 = 1;
/// Largest allowed number of points
pub const MAX_POINT_COUNT: u32 = 100;

/// How the points and axes of a figure are labelled and colored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureStyle {
    /// Fill color of the sampled points
    pub color: PointColor,
    /// Unit shown in the axis labels and the summary, e.g. "m"
    pub unit: String,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            color: PointColor::default(),
            unit: default_unit(),
        }
    }
}

/// User-supplied circle parameters before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleParams {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub point_count: u32,
    /// Hex color code such as "#ff0000"
    pub color: String,
    pub unit: String,
}

fn default_unit() -> String {
    "m".to_string()
}

impl Default for CircleParams {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            radius: 1.0,
            point_count: 10,
            color: PointColor::default().to_hex(),
            unit: default_unit(),
        }
    }
}

impl CircleParams {
    /// Check ranges and parse the color, producing the inputs of the core
    pub fn validate(&self) -> Result<(CircleSpec, FigureStyle)> {
        if !self.center_x.is_finite() || !self.center_y.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "center must be finite, got ({}, {})",
                self.center_x, self.center_y
            )));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "radius must be a finite number >= 0, got {}",
                self.radius
            )));
        }
        if !(MIN_POINT_COUNT..=MAX_POINT_COUNT).contains(&self.point_count) {
            return Err(Error::InvalidParameter(format!(
                "point count must be in [{MIN_POINT_COUNT}, {MAX_POINT_COUNT}], got {}",
                self.point_count
            )));
        }
        let color = PointColor::from_hex(&self.color)?;
        if let Some(c) = self.unit.chars().find(|c| c.is_control()) {
            return Err(Error::InvalidParameter(format!(
                "unit must be a single line of text, got {c:?} in {:?}",
                self.unit
            )));
        }

        let spec = CircleSpec::new(
            Point::new(self.center_x, self.center_y),
            self.radius,
            self.point_count as usize,
        );
        let style = FigureStyle {
            color,
            unit: self.unit.clone(),
        };
        Ok((spec, style))
    }
}
