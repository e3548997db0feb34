//! Preview rendering for figures using tiny-skia
//!
//! These functions rasterize a `Figure` onto an RgbaImage for on-screen
//! display and encode it as PNG. Text runs are not rasterized; the preview
//! shows the geometry only.

use std::io;

use image::RgbaImage;
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform,
};

use super::figure::{Element, Figure, Marker, Polyline};
use super::geometry::circle_bezier;
use crate::error::{Error, Result};

fn paint_for(color: crate::domain::PointColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

/// Build a polyline path, `None` when it has fewer than two points
fn build_polyline_path(line: &Polyline) -> Option<tiny_skia::Path> {
    let (&(x0, y0), rest) = line.points.split_first()?;
    if rest.is_empty() {
        return None;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(x0, y0);
    for &(x, y) in rest {
        pb.line_to(x, y);
    }
    if line.closed {
        pb.close();
    }
    pb.finish()
}

/// Build a marker path using cubic bezier curves
fn build_marker_path(marker: &Marker) -> Option<tiny_skia::Path> {
    let (cx, cy) = marker.center;
    let ((sx, sy), segments) = circle_bezier(cx, cy, marker.radius);

    let mut pb = PathBuilder::new();
    pb.move_to(sx, sy);
    for [x1, y1, x2, y2, x, y] in segments {
        pb.cubic_to(x1, y1, x2, y2, x, y);
    }
    pb.close();
    pb.finish()
}

fn stroke_polyline(pixmap: &mut Pixmap, line: &Polyline, transform: Transform) {
    // Degenerate outlines (zero radius) have nothing to stroke
    let Some(path) = build_polyline_path(line) else {
        return;
    };

    let stroke = Stroke {
        width: line.width,
        line_cap: LineCap::Butt,
        line_join: LineJoin::Round,
        dash: line
            .dash
            .as_ref()
            .and_then(|pattern| StrokeDash::new(pattern.clone(), 0.0)),
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint_for(line.color), &stroke, transform, None);
}

fn fill_marker(pixmap: &mut Pixmap, marker: &Marker, transform: Transform) {
    let Some(path) = build_marker_path(marker) else {
        return;
    };
    pixmap.fill_path(
        &path,
        &paint_for(marker.color),
        FillRule::Winding,
        transform,
        None,
    );
}

/// Rasterize a figure at `scale` pixels per point on a white background
pub fn rasterize_figure(figure: &Figure, scale: f32) -> Result<RgbaImage> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(Error::Render(format!("invalid preview scale {scale}")));
    }

    let w = (figure.width * scale).ceil() as u32;
    let h = (figure.height * scale).ceil() as u32;
    let mut pixmap = Pixmap::new(w, h)
        .ok_or_else(|| Error::Render(format!("cannot allocate a {w}x{h} pixmap")))?;
    pixmap.fill(Color::WHITE);

    let transform = Transform::from_scale(scale, scale);
    for element in &figure.elements {
        match element {
            Element::Line(line) => stroke_polyline(&mut pixmap, line, transform),
            Element::Marker(marker) => fill_marker(&mut pixmap, marker, transform),
            Element::Text(_) => {}
        }
    }

    log::debug!("Rasterized figure preview: {}x{} pixels", w, h);

    // The background is opaque, so premultiplied and straight alpha agree
    RgbaImage::from_raw(w, h, pixmap.take())
        .ok_or_else(|| Error::Render("pixmap size does not match image size".to_string()))
}

/// Encode an image as PNG into a byte buffer
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_png(&mut buffer, img)?;
    Ok(buffer)
}

fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> std::result::Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

impl Figure {
    /// Preview raster of this figure, see [`rasterize_figure`]
    pub fn rasterize(&self, scale: f32) -> Result<RgbaImage> {
        rasterize_figure(self, scale)
    }

    /// PNG-encoded preview of this figure
    pub fn to_png(&self, scale: f32) -> Result<Vec<u8>> {
        encode_png(&self.rasterize(scale)?)
    }
}
