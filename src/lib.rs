//! Evenly spaced points on a circle, drawn as a figure and exported together
//! with a parameter summary as a two-page PDF.
//!
//! # Module Organization
//!
//! - `domain`: circle parameters, the point generator and colors
//! - `render`: the figure scene and its raster preview
//! - `export`: the PDF writer and the parameter summary page
//! - `font`: embedded font faces used for measuring and embedding text
//! - `plot`: one prepared plot shared by preview and export
//! - `config`: author record and export settings

pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod font;
pub mod plot;
pub mod render;

pub use config::{AuthorInfo, ExportSettings, KruzniceConfig};
pub use domain::{CircleParams, CircleSpec, FigureStyle, Point, PointColor, PointSet, generate_circle_points};
pub use error::{Error, Result};
pub use export::pdf::DocumentInfo;
pub use export::{ExportedDocument, ParamSummary, export_circle_pdf, export_pdf};
pub use plot::CirclePlot;
pub use render::Figure;
