//! One circle plot: validated parameters, its points and the figure built
//! from them, shared by the on-screen preview and the PDF export.

use crate::config::{AuthorInfo, ExportSettings};
use crate::domain::{
    CircleParams, CircleSpec, FigureStyle, Point, PointSet, generate_circle_points,
};
use crate::error::{Error, Result};
use crate::export::pdf::DocumentInfo;
use crate::export::{ExportedDocument, ParamSummary, export_pdf, summary};
use crate::font;
use crate::render::Figure;

#[derive(Debug, Clone)]
pub struct CirclePlot {
    spec: CircleSpec,
    style: FigureStyle,
    points: PointSet,
    figure: Figure,
}

impl CirclePlot {
    /// Validate presentation input and build the plot
    ///
    /// The unit must be drawable in both the figure and the text page font.
    pub fn prepare(params: &CircleParams) -> Result<Self> {
        let (spec, style) = params.validate()?;
        if let Some(c) = font::missing_glyph_in_any(&style.unit)? {
            return Err(Error::InvalidParameter(format!(
                "unit {:?} contains {c:?}, which cannot be typeset",
                style.unit
            )));
        }
        Self::from_spec(spec, style)
    }

    pub fn from_spec(spec: CircleSpec, style: FigureStyle) -> Result<Self> {
        let points = generate_circle_points(&spec);
        let figure = Figure::build(&spec, &points, &style)?;
        Ok(Self {
            spec,
            style,
            points,
            figure,
        })
    }

    pub fn spec(&self) -> &CircleSpec {
        &self.spec
    }

    pub fn style(&self) -> &FigureStyle {
        &self.style
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn figure(&self) -> &Figure {
        &self.figure
    }

    /// PNG preview at the configured resolution
    pub fn preview_png(&self, settings: &ExportSettings) -> Result<Vec<u8>> {
        self.figure.to_png(settings.preview_scale())
    }

    pub fn summary(&self, author: &AuthorInfo) -> ParamSummary {
        ParamSummary::new(&self.spec, &self.style, author)
    }

    /// Export the same figure the preview shows, plus the parameter page
    pub fn export_pdf(
        &self,
        author: &AuthorInfo,
        settings: &ExportSettings,
        info: &DocumentInfo,
    ) -> Result<ExportedDocument> {
        let summary = self.summary(author);
        summary.check()?;
        export_pdf(&self.figure, &summary.to_text(), info, settings)
    }

    /// Document metadata with the summary title and the author's name
    pub fn document_info(author: &AuthorInfo) -> DocumentInfo {
        DocumentInfo::new(summary::TITLE).with_author(author.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_prepare_defaults() {
        let plot = CirclePlot::prepare(&CircleParams::default()).unwrap();
        assert_eq!(plot.points().len(), 10);
        assert_eq!(plot.spec().radius, 1.0);
        assert_eq!(plot.style().unit, "m");
        assert_eq!(plot.points()[0], Point::new(1.0, 0.0));
    }

    #[test]
    fn test_prepare_rejects_invalid_input() {
        let params = CircleParams {
            point_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            CirclePlot::prepare(&params),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_unit_without_glyphs() {
        let params = CircleParams {
            unit: "\u{1F4CF}".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            CirclePlot::prepare(&params),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_unresolvable_extent() {
        for (center_x, radius) in [(0.0, 1e308), (1e17, 1e-3)] {
            let params = CircleParams {
                center_x,
                radius,
                ..Default::default()
            };
            assert!(matches!(
                CirclePlot::prepare(&params),
                Err(Error::Render(_))
            ));
        }
    }

    #[test]
    fn test_preview_and_export_share_figure() {
        let plot = CirclePlot::prepare(&CircleParams::default()).unwrap();
        let settings = ExportSettings::default();
        let png = plot.preview_png(&settings).unwrap();
        assert!(png.starts_with(b"\x89PNG"));

        let author = AuthorInfo::default();
        let doc = plot
            .export_pdf(&author, &settings, &CirclePlot::document_info(&author))
            .unwrap();
        assert_eq!(doc.page_count(), 2);

        // Page 1 carries the labels of the previewed figure
        let labels = crate::export::pdf::inspect::page_text_lines(doc.bytes(), 0).unwrap();
        let figure_labels: Vec<String> = plot.figure().texts().map(|t| t.text.clone()).collect();
        assert_eq!(labels, figure_labels);
    }
}
