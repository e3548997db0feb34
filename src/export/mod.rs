//! Two-page PDF export
//!
//! Page 1 is the figure at its tight size, page 2 the parameter summary in
//! DejaVu Sans Mono on an A4 page. Both pages are drawn into an in-memory document;
//! bytes are produced only when both have been committed.

pub mod pdf;
pub mod summary;

use crate::config::{AuthorInfo, ExportSettings};
use crate::domain::{CircleSpec, FigureStyle, generate_circle_points};
use crate::error::{Error, Result};
use crate::font::FontFace;
use crate::render::geometry::circle_bezier;
use crate::render::{Element, Figure, Marker, Polyline, TextRun};
use pdf::{DocumentBuilder, DocumentInfo, PageCanvas};

pub use summary::ParamSummary;

/// Suggested file name for downloads
pub const FILE_NAME: &str = "kruznice.pdf";
/// MIME type of the exported bytes
pub const MIME_TYPE: &str = "application/pdf";

/// A4 width of the text page in points (8.27 in)
pub const TEXT_PAGE_WIDTH: f32 = 595.44;
/// A4 height of the text page in points (11.69 in)
pub const TEXT_PAGE_HEIGHT: f32 = 841.68;
/// Left edge of the text block as a fraction of the page width
const TEXT_LEFT: f32 = 0.05;
/// Top of the text block as a fraction of the page height, from the bottom
const TEXT_TOP: f32 = 0.95;
/// Line spacing as a multiple of the font size
const LINE_SPACING: f32 = 1.2;

/// A finished PDF document held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    bytes: Vec<u8>,
    page_count: usize,
}

impl ExportedDocument {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn file_name(&self) -> &'static str {
        FILE_NAME
    }

    pub fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }
}

fn stroke_polyline(canvas: &mut PageCanvas<'_>, line: &Polyline) {
    if line.points.len() < 2 {
        return;
    }
    let flipped: Vec<(f32, f32)> = line
        .points
        .iter()
        .map(|&(x, y)| (x, canvas.flip_y(y)))
        .collect();

    let content = canvas.content();
    content
        .save_state()
        .stroke_rgb(line.color.to_unit_rgb())
        .line_width(line.width)
        .line_join(1);
    if let Some(pattern) = &line.dash {
        content.dash(pattern, 0.0);
    }
    let (x0, y0) = flipped[0];
    content.move_to(x0, y0);
    for &(x, y) in &flipped[1..] {
        content.line_to(x, y);
    }
    if line.closed {
        content.close_path();
    }
    content.stroke().restore_state();
}

fn fill_marker(canvas: &mut PageCanvas<'_>, marker: &Marker) {
    let (cx, cy) = marker.center;
    let ((sx, sy), segments) = circle_bezier(cx, canvas.flip_y(cy), marker.radius);

    let content = canvas.content();
    content.fill_rgb(marker.color.to_unit_rgb()).move_to(sx, sy);
    for [x1, y1, x2, y2, x, y] in segments {
        content.curve_to(x1, y1, x2, y2, x, y);
    }
    content.close_path().fill();
}

fn show_text(canvas: &mut PageCanvas<'_>, run: &TextRun) -> Result<()> {
    let (x, y) = run.origin;
    let y = canvas.flip_y(y);
    // Rotation by 90° counterclockwise keeps the baseline start in place
    let (a, b, c, d) = if run.rotated {
        (0.0, 1.0, -1.0, 0.0)
    } else {
        (1.0, 0.0, 0.0, 1.0)
    };

    canvas.content().fill_rgb([0.0, 0.0, 0.0]).begin_text();
    canvas
        .set_font(FontFace::Sans, run.size)
        .text_matrix(a, b, c, d, x, y);
    canvas.show_text(&run.text)?.end_text();
    Ok(())
}

/// Replay a figure's elements as vector content
fn draw_figure(canvas: &mut PageCanvas<'_>, figure: &Figure) -> Result<()> {
    for element in &figure.elements {
        match element {
            Element::Line(line) => stroke_polyline(canvas, line),
            Element::Marker(marker) => fill_marker(canvas, marker),
            Element::Text(run) => show_text(canvas, run)?,
        }
    }
    Ok(())
}

/// Left-aligned, top-anchored monospaced text block
fn draw_text_block(canvas: &mut PageCanvas<'_>, text: &str, font_size: f32) -> Result<()> {
    let x = canvas.width() * TEXT_LEFT;
    let first_baseline = canvas.height() * TEXT_TOP - font_size;

    canvas.content().fill_rgb([0.0, 0.0, 0.0]).begin_text();
    canvas
        .set_font(FontFace::Mono, font_size)
        .leading(font_size * LINE_SPACING)
        .next_line_at(x, first_baseline);
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            canvas.content().next_line();
        }
        canvas.show_text(line)?;
    }
    canvas.content().end_text();
    Ok(())
}

fn check_figure(figure: &Figure) -> Result<()> {
    let usable = |v: f32| v.is_finite() && v > 0.0;
    if !usable(figure.width) || !usable(figure.height) {
        return Err(Error::Render(format!(
            "figure size {}x{} cannot be placed on a page",
            figure.width, figure.height
        )));
    }
    Ok(())
}

/// Export a figure and a text block as a two-page PDF.
///
/// Either both pages are written and the complete document is returned, or
/// an error is returned and nothing is produced.
pub fn export_pdf(
    figure: &Figure,
    text: &str,
    info: &DocumentInfo,
    settings: &ExportSettings,
) -> Result<ExportedDocument> {
    let font_size = settings.text_font_size;
    if !(font_size.is_finite() && font_size > 0.0) {
        return Err(Error::Pdf(format!("invalid text font size {font_size}")));
    }

    let mut doc = DocumentBuilder::new();
    doc.with_page(figure.width, figure.height, |canvas| {
        check_figure(figure)?;
        draw_figure(canvas, figure)
    })?;
    doc.with_page(TEXT_PAGE_WIDTH, TEXT_PAGE_HEIGHT, |canvas| {
        draw_text_block(canvas, text, font_size)
    })?;

    let page_count = doc.page_count();
    if page_count != 2 {
        return Err(Error::Pdf(format!("expected 2 pages, built {page_count}")));
    }
    let bytes = doc.finish(info)?;
    log::debug!("Exported {} pages, {} bytes", page_count, bytes.len());
    Ok(ExportedDocument { bytes, page_count })
}

/// Generate the points, build the figure and export it with its summary
pub fn export_circle_pdf(
    spec: &CircleSpec,
    style: &FigureStyle,
    author: &AuthorInfo,
    settings: &ExportSettings,
    info: &DocumentInfo,
) -> Result<ExportedDocument> {
    let points = generate_circle_points(spec);
    let figure = Figure::build(spec, &points, style)?;
    let summary = ParamSummary::new(spec, style, author);
    summary.check()?;
    export_pdf(&figure, &summary.to_text(), info, settings)
}
