//! Shared geometry calculations for the circle figure
//!
//! This module contains constants and math shared between
//! PDF vector output and preview rasterization (tiny-skia).
//! All figure lengths are in PDF points (1/72 inch).

use crate::domain::Point;

/// Points per inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// Canvas and axes layout constants
pub mod layout {
    /// Square canvas edge before cropping (6 inches)
    pub const CANVAS_SIZE: f32 = 432.0;
    /// Axes edge: 77% of the canvas
    pub const AXES_SIZE: f32 = 332.64;
    /// Top edge of the axes box
    pub const AXES_TOP: f32 = 51.84;
    /// Padding kept around the tight bounding box (0.1 inch)
    pub const TIGHT_PAD: f32 = 7.2;
    /// Fraction of the data span added on each side of the limits
    pub const DATA_MARGIN: f64 = 0.05;
    /// Preferred number of tick intervals per axis
    pub const TARGET_TICK_INTERVALS: f64 = 5.0;
}

/// Stroke and marker constants
pub mod style {
    /// Circle outline width
    pub const CIRCLE_WIDTH: f32 = 1.0;
    /// Number of samples along the circle outline (closed)
    pub const CIRCLE_SAMPLES: usize = 400;
    /// Point marker area in square points
    pub const POINT_MARKER_AREA: f32 = 50.0;
    /// Center marker area in square points
    pub const CENTER_MARKER_AREA: f32 = 30.0;
    /// Axes frame and tick width
    pub const FRAME_WIDTH: f32 = 0.8;
    /// Grid line width
    pub const GRID_WIDTH: f32 = 0.8;
    /// Grid gray level (#b0b0b0)
    pub const GRID_GRAY: u8 = 0xb0;
    /// Dotted grid pattern, in multiples of the line width
    pub const GRID_DASH: [f32; 2] = [1.0, 1.65];
    /// Outward tick length
    pub const TICK_LENGTH: f32 = 3.5;
    /// Gap between tick and tick label
    pub const TICK_PAD: f32 = 3.5;
    /// Gap between tick labels and axis label
    pub const LABEL_PAD: f32 = 4.0;
    /// Tick and axis label font size
    pub const FONT_SIZE: f32 = 10.0;

    /// Marker radius for a marker of the given area (side² = area)
    pub fn marker_radius(area: f32) -> f32 {
        area.sqrt() * 0.5
    }
}

/// Vertical metrics of the figure font (DejaVu Sans: 1901 and 483 of 2048 units)
pub mod text {
    /// Ascent as a fraction of the font size
    pub const ASCENT: f32 = 0.928;
    /// Descent as a fraction of the font size
    pub const DESCENT: f32 = 0.236;
}

/// Circle bezier approximation constant: 4/3 * (sqrt(2) - 1)
pub const BEZIER_K: f32 = 0.552_284_8;

/// Four cubic segments approximating a circle, starting at the rightmost point.
/// Returns the start point and `[c1x, c1y, c2x, c2y, x, y]` per segment.
pub fn circle_bezier(cx: f32, cy: f32, r: f32) -> ((f32, f32), [[f32; 6]; 4]) {
    let k = r * BEZIER_K;
    let start = (cx + r, cy);
    let segments = [
        [cx + r, cy + k, cx + k, cy + r, cx, cy + r],
        [cx - k, cy + r, cx - r, cy + k, cx - r, cy],
        [cx - r, cy - k, cx - k, cy - r, cx, cy - r],
        [cx + k, cy - r, cx + r, cy - k, cx + r, cy],
    ];
    (start, segments)
}

/// Square data window around the circle, including margins
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DataLimits {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DataLimits {
    /// Limits for a circle: its extent plus `DATA_MARGIN` of the span per side.
    /// A zero radius falls back to a small window around the center.
    pub fn around_circle(center: Point, radius: f64) -> Self {
        let half = if radius > 0.0 {
            radius * (1.0 + 2.0 * layout::DATA_MARGIN)
        } else {
            let scale = center.x.abs().max(center.y.abs()).max(1.0);
            scale * layout::DATA_MARGIN
        };
        Self {
            x_min: center.x - half,
            x_max: center.x + half,
            y_min: center.y - half,
            y_max: center.y + half,
        }
    }

    pub fn span(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Both axes have a finite, non-zero extent
    ///
    /// Fails when the radius overflows `f64` or vanishes next to a large
    /// center coordinate.
    pub fn is_resolvable(&self) -> bool {
        [self.span(), self.y_max - self.y_min]
            .into_iter()
            .all(|span| span.is_finite() && span > 0.0)
    }
}

/// Maps data coordinates into the square axes box (y grows downward)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub size: f32,
    pub limits: DataLimits,
}

impl Viewport {
    pub fn new(left: f32, top: f32, size: f32, limits: DataLimits) -> Self {
        Self {
            left,
            top,
            size,
            limits,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.size
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.size
    }

    pub fn x_to_figure(&self, x: f64) -> f32 {
        let t = (x - self.limits.x_min) / self.limits.span();
        self.left + (t * f64::from(self.size)) as f32
    }

    pub fn y_to_figure(&self, y: f64) -> f32 {
        let t = (self.limits.y_max - y) / (self.limits.y_max - self.limits.y_min);
        self.top + (t * f64::from(self.size)) as f32
    }

    pub fn to_figure(&self, p: Point) -> (f32, f32) {
        (self.x_to_figure(p.x), self.y_to_figure(p.y))
    }
}

/// Round a raw step up to 1, 2, 2.5 or 5 times a power of ten
fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .find(|&n| fraction <= n + 1e-9)
        .unwrap_or(10.0);
    nice * magnitude
}

/// Evenly spaced "nice" tick values inside `[min, max]` and their step
pub fn nice_ticks(min: f64, max: f64) -> (Vec<f64>, f64) {
    let span = max - min;
    if span <= 0.0 || !span.is_finite() {
        return (vec![min], 0.0);
    }

    let step = nice_step(span / layout::TARGET_TICK_INTERVALS);
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    let ticks = (first..=last)
        .map(|i| {
            let v = i as f64 * step;
            // Avoid -0 and 1e-17 style residue at zero
            if v.abs() < step * 1e-9 { 0.0 } else { v }
        })
        .collect();
    (ticks, step)
}

/// Number of decimals needed to print multiples of `step` exactly
pub fn tick_decimals(step: f64) -> usize {
    if step <= 0.0 || !step.is_finite() {
        return 0;
    }
    (0..=12)
        .find(|&d| {
            let scaled = step * 10f64.powi(d as i32);
            (scaled - scaled.round()).abs() < 1e-6 * scaled.abs().max(1.0)
        })
        .unwrap_or(12)
}

/// Format a tick value with a fixed number of decimals
pub fn format_tick(value: f64, decimals: usize) -> String {
    let s = format!("{value:.decimals$}");
    // "-0.0" and friends
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_ticks_unit_circle() {
        let limits = DataLimits::around_circle(Point::default(), 1.0);
        let (ticks, step) = nice_ticks(limits.x_min, limits.x_max);
        assert_eq!(step, 0.5);
        assert_eq!(ticks, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(tick_decimals(step), 1);
    }

    #[test]
    fn test_nice_ticks_offset_range() {
        let (ticks, step) = nice_ticks(97.0, 123.0);
        assert_eq!(step, 10.0);
        assert_eq!(ticks, vec![100.0, 110.0, 120.0]);
        assert_eq!(tick_decimals(step), 0);
    }

    #[test]
    fn test_nice_ticks_quarter_steps() {
        let (ticks, step) = nice_ticks(0.0, 1.2);
        assert!((step - 0.25).abs() < 1e-12);
        assert_eq!(ticks.len(), 5);
        assert_eq!(tick_decimals(step), 2);
    }

    #[test]
    fn test_nice_ticks_degenerate() {
        let (ticks, step) = nice_ticks(2.0, 2.0);
        assert_eq!(ticks, vec![2.0]);
        assert_eq!(step, 0.0);
    }

    #[test]
    fn test_format_tick_strips_negative_zero() {
        assert_eq!(format_tick(-0.0, 1), "0.0");
        assert_eq!(format_tick(-1e-12, 2), "0.00");
        assert_eq!(format_tick(-0.5, 1), "-0.5");
        assert_eq!(format_tick(3.0, 0), "3");
    }

    #[test]
    fn test_zero_radius_limits_not_degenerate() {
        let limits = DataLimits::around_circle(Point::new(2.0, 3.0), 0.0);
        assert!(limits.span() > 0.0);
        assert!(limits.x_min < 2.0 && limits.x_max > 2.0);
        assert!(limits.y_min < 3.0 && limits.y_max > 3.0);
    }

    #[test]
    fn test_viewport_maps_corners() {
        let limits = DataLimits {
            x_min: -1.0,
            x_max: 1.0,
            y_min: -1.0,
            y_max: 1.0,
        };
        let vp = Viewport::new(10.0, 20.0, 100.0, limits);
        assert_eq!(vp.to_figure(Point::new(-1.0, 1.0)), (10.0, 20.0));
        assert_eq!(vp.to_figure(Point::new(1.0, -1.0)), (110.0, 120.0));
        assert_eq!(vp.to_figure(Point::new(0.0, 0.0)), (60.0, 70.0));
    }

    #[test]
    fn test_circle_bezier_closes() {
        let (start, segments) = circle_bezier(5.0, 5.0, 2.0);
        assert_eq!(start, (7.0, 5.0));
        let last = segments[3];
        assert_eq!((last[4], last[5]), start);
    }

    #[test]
    fn test_unresolvable_limits() {
        assert!(DataLimits::around_circle(Point::new(0.0, 0.0), 1.0).is_resolvable());
        assert!(DataLimits::around_circle(Point::new(1e6, 0.0), 1e-3).is_resolvable());
        // Extent overflows to infinity
        assert!(!DataLimits::around_circle(Point::new(0.0, 0.0), 1e308).is_resolvable());
        // Extent is absorbed by the center
        assert!(!DataLimits::around_circle(Point::new(1e17, 0.0), 1e-3).is_resolvable());
        assert!(!DataLimits::around_circle(Point::new(0.0, 1e17), 1e-3).is_resolvable());
    }

    #[test]
    fn test_marker_radius() {
        assert!((style::marker_radius(50.0) - 3.535_534).abs() < 1e-5);
    }
}
