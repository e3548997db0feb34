//! The circle figure as a resolved vector scene
//!
//! A `Figure` is built once from the circle, its sampled points and the
//! style. Every element is already positioned in PDF points (origin at the
//! top-left, y downward) and the scene is cropped to its tight bounding box,
//! so both backends (PDF content and tiny-skia preview) only have to replay it.

use std::f64::consts::TAU;

use super::geometry::{
    self, DataLimits, Viewport, layout, style,
    text::{ASCENT, DESCENT},
};
use crate::domain::{CircleSpec, FigureStyle, Point, PointColor};
use crate::error::{Error, Result};
use crate::font::{FontFace, TrueTypeFont};

/// Stroked open or closed path
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    pub points: Vec<(f32, f32)>,
    pub closed: bool,
    pub width: f32,
    pub color: PointColor,
    /// Dash pattern in points, `None` for a solid line
    pub dash: Option<Vec<f32>>,
}

/// Filled round marker
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub center: (f32, f32),
    pub radius: f32,
    pub color: PointColor,
}

/// A single line of sans-serif text
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    /// Start of the baseline
    pub origin: (f32, f32),
    pub text: String,
    pub size: f32,
    /// Advance width in points, measured with [`FontFace::Sans`]
    pub width: f32,
    /// Rotated 90° counterclockwise (reads bottom to top)
    pub rotated: bool,
}

impl TextRun {
    fn new(origin: (f32, f32), text: String, size: f32, width: f32, rotated: bool) -> Self {
        Self {
            origin,
            text,
            size,
            width,
            rotated,
        }
    }

    fn bounds(&self) -> Bounds {
        let w = self.width;
        let (x, y) = self.origin;
        if self.rotated {
            Bounds::new(x - ASCENT * self.size, y - w, x + DESCENT * self.size, y)
        } else {
            Bounds::new(x, y - ASCENT * self.size, x + w, y + DESCENT * self.size)
        }
    }
}

/// One drawing element of a figure, in paint order
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Line(Polyline),
    Marker(Marker),
    Text(TextRun),
}

impl Element {
    fn bounds(&self) -> Bounds {
        match self {
            Element::Line(line) => {
                let half = line.width * 0.5;
                line.points
                    .iter()
                    .fold(Bounds::EMPTY, |b, &(x, y)| {
                        b.union(Bounds::new(x - half, y - half, x + half, y + half))
                    })
            }
            Element::Marker(m) => {
                let (x, y) = m.center;
                Bounds::new(x - m.radius, y - m.radius, x + m.radius, y + m.radius)
            }
            Element::Text(t) => t.bounds(),
        }
    }

    fn is_finite(&self) -> bool {
        let finite = |&(x, y): &(f32, f32)| x.is_finite() && y.is_finite();
        match self {
            Element::Line(line) => line.points.iter().all(finite),
            Element::Marker(m) => finite(&m.center),
            Element::Text(t) => finite(&t.origin),
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        match self {
            Element::Line(line) => {
                for p in &mut line.points {
                    p.0 += dx;
                    p.1 += dy;
                }
            }
            Element::Marker(m) => {
                m.center.0 += dx;
                m.center.1 += dy;
            }
            Element::Text(t) => {
                t.origin.0 += dx;
                t.origin.1 += dy;
            }
        }
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    const EMPTY: Bounds = Bounds {
        min_x: f32::INFINITY,
        min_y: f32::INFINITY,
        max_x: f32::NEG_INFINITY,
        max_y: f32::NEG_INFINITY,
    };

    fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// A rendered circle figure, cropped to its content
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    /// Width in points
    pub width: f32,
    /// Height in points
    pub height: f32,
    pub elements: Vec<Element>,
}

fn check_renderable(spec: &CircleSpec, points: &[Point]) -> Result<()> {
    if spec.point_count == 0 {
        return Err(Error::Render("point count is zero".to_string()));
    }
    if !spec.center.is_finite() {
        return Err(Error::Render(format!(
            "center ({}, {}) is not finite",
            spec.center.x, spec.center.y
        )));
    }
    if !spec.radius.is_finite() || spec.radius < 0.0 {
        return Err(Error::Render(format!("radius {} is not usable", spec.radius)));
    }
    if points.len() != spec.point_count {
        return Err(Error::Render(format!(
            "expected {} points, got {}",
            spec.point_count,
            points.len()
        )));
    }
    if let Some(p) = points.iter().find(|p| !p.is_finite()) {
        return Err(Error::Render(format!("point ({}, {}) is not finite", p.x, p.y)));
    }
    Ok(())
}

fn check_unit(font: &TrueTypeFont<'_>, unit: &str) -> Result<()> {
    match font.missing_glyph(unit) {
        Some(c) => Err(Error::Render(format!("unit {unit:?} has no glyph for {c:?}"))),
        None => Ok(()),
    }
}

fn segment(from: (f32, f32), to: (f32, f32), width: f32, color: PointColor) -> Element {
    Element::Line(Polyline {
        points: vec![from, to],
        closed: false,
        width,
        color,
        dash: None,
    })
}

impl Figure {
    /// Lay out the circle, its points, grid, ticks and axis labels
    pub fn build(spec: &CircleSpec, points: &[Point], figure_style: &FigureStyle) -> Result<Self> {
        check_renderable(spec, points)?;
        let font = FontFace::Sans.font()?;
        check_unit(font, &figure_style.unit)?;

        let limits = DataLimits::around_circle(spec.center, spec.radius);
        if !limits.is_resolvable() {
            return Err(Error::Render(format!(
                "radius {} around ({}, {}) cannot be resolved in the data window",
                spec.radius, spec.center.x, spec.center.y
            )));
        }
        let vp = Viewport::new(
            (layout::CANVAS_SIZE - layout::AXES_SIZE) * 0.5,
            layout::AXES_TOP,
            layout::AXES_SIZE,
            limits,
        );
        let (x_ticks, x_step) = geometry::nice_ticks(limits.x_min, limits.x_max);
        let (y_ticks, y_step) = geometry::nice_ticks(limits.y_min, limits.y_max);

        let mut elements = Vec::new();

        // Grid below everything else
        let grid_color = PointColor::new(style::GRID_GRAY, style::GRID_GRAY, style::GRID_GRAY);
        let grid_dash: Vec<f32> = style::GRID_DASH
            .iter()
            .map(|d| d * style::GRID_WIDTH)
            .collect();
        let grid_lines = x_ticks
            .iter()
            .map(|&x| {
                let fx = vp.x_to_figure(x);
                ((fx, vp.top), (fx, vp.bottom()))
            })
            .chain(y_ticks.iter().map(|&y| {
                let fy = vp.y_to_figure(y);
                ((vp.left, fy), (vp.right(), fy))
            }));
        for (from, to) in grid_lines {
            elements.push(Element::Line(Polyline {
                points: vec![from, to],
                closed: false,
                width: style::GRID_WIDTH,
                color: grid_color,
                dash: Some(grid_dash.clone()),
            }));
        }

        // Outline sampled with the endpoint included, so it closes on itself
        let outline = (0..style::CIRCLE_SAMPLES)
            .map(|i| {
                let theta = TAU * i as f64 / (style::CIRCLE_SAMPLES - 1) as f64;
                vp.to_figure(Point::new(
                    spec.center.x + spec.radius * theta.cos(),
                    spec.center.y + spec.radius * theta.sin(),
                ))
            })
            .collect();
        elements.push(Element::Line(Polyline {
            points: outline,
            closed: false,
            width: style::CIRCLE_WIDTH,
            color: PointColor::BLACK,
            dash: None,
        }));

        let point_radius = style::marker_radius(style::POINT_MARKER_AREA);
        elements.extend(points.iter().map(|&p| {
            Element::Marker(Marker {
                center: vp.to_figure(p),
                radius: point_radius,
                color: figure_style.color,
            })
        }));
        elements.push(Element::Marker(Marker {
            center: vp.to_figure(spec.center),
            radius: style::marker_radius(style::CENTER_MARKER_AREA),
            color: PointColor::BLACK,
        }));

        // Axes frame
        elements.push(Element::Line(Polyline {
            points: vec![
                (vp.left, vp.top),
                (vp.right(), vp.top),
                (vp.right(), vp.bottom()),
                (vp.left, vp.bottom()),
            ],
            closed: true,
            width: style::FRAME_WIDTH,
            color: PointColor::BLACK,
            dash: None,
        }));

        let size = style::FONT_SIZE;
        let label_gap = style::TICK_LENGTH + style::TICK_PAD;

        // X ticks and labels below the axes
        let x_decimals = geometry::tick_decimals(x_step);
        for &x in &x_ticks {
            let fx = vp.x_to_figure(x);
            elements.push(segment(
                (fx, vp.bottom()),
                (fx, vp.bottom() + style::TICK_LENGTH),
                style::FRAME_WIDTH,
                PointColor::BLACK,
            ));
            let label = geometry::format_tick(x, x_decimals);
            let w = font.text_width(&label, size);
            let origin = (fx - w * 0.5, vp.bottom() + label_gap + ASCENT * size);
            elements.push(Element::Text(TextRun::new(origin, label, size, w, false)));
        }

        // Y ticks and labels left of the axes
        let y_decimals = geometry::tick_decimals(y_step);
        let mut widest_y_label: f32 = 0.0;
        for &y in &y_ticks {
            let fy = vp.y_to_figure(y);
            elements.push(segment(
                (vp.left, fy),
                (vp.left - style::TICK_LENGTH, fy),
                style::FRAME_WIDTH,
                PointColor::BLACK,
            ));
            let label = geometry::format_tick(y, y_decimals);
            let w = font.text_width(&label, size);
            widest_y_label = widest_y_label.max(w);
            let origin = (vp.left - label_gap - w, fy + 0.35 * size);
            elements.push(Element::Text(TextRun::new(origin, label, size, w, false)));
        }

        let x_label = format!("x [{}]", figure_style.unit);
        let x_label_width = font.text_width(&x_label, size);
        let origin = (
            vp.left + (vp.size - x_label_width) * 0.5,
            vp.bottom() + label_gap + size + style::LABEL_PAD + ASCENT * size,
        );
        elements.push(Element::Text(TextRun::new(origin, x_label, size, x_label_width, false)));

        let y_label = format!("y [{}]", figure_style.unit);
        let y_label_width = font.text_width(&y_label, size);
        let origin = (
            vp.left - label_gap - widest_y_label - style::LABEL_PAD - DESCENT * size,
            vp.top + (vp.size + y_label_width) * 0.5,
        );
        elements.push(Element::Text(TextRun::new(origin, y_label, size, y_label_width, true)));

        if let Some(index) = elements.iter().position(|e| !e.is_finite()) {
            return Err(Error::Render(format!(
                "element {index} has non-finite coordinates"
            )));
        }
        let figure = Self::cropped(elements);
        log::debug!(
            "Built figure {:.1}x{:.1} pt with {} elements ({} points)",
            figure.width,
            figure.height,
            figure.elements.len(),
            points.len()
        );
        Ok(figure)
    }

    /// Shift the scene so its tight bounding box plus padding starts at the origin
    fn cropped(mut elements: Vec<Element>) -> Self {
        let bounds = elements
            .iter()
            .fold(Bounds::EMPTY, |b, e| b.union(e.bounds()));
        let pad = layout::TIGHT_PAD;
        let (dx, dy) = (pad - bounds.min_x, pad - bounds.min_y);
        for element in &mut elements {
            element.translate(dx, dy);
        }
        Self {
            width: bounds.max_x - bounds.min_x + 2.0 * pad,
            height: bounds.max_y - bounds.min_y + 2.0 * pad,
            elements,
        }
    }

    /// Markers drawn in the given color
    pub fn markers_with_color(&self, color: PointColor) -> impl Iterator<Item = &Marker> {
        self.elements.iter().filter_map(move |e| match e {
            Element::Marker(m) if m.color == color => Some(m),
            _ => None,
        })
    }

    /// All text runs, in paint order
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(t) => Some(t),
            _ => None,
        })
    }
}
