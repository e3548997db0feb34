//! Figure rendering module
//!
//! This module contains:
//! - Geometry, layout constants and tick math shared by both backends
//! - The resolved figure scene (built once per circle)
//! - Preview rasterization using tiny-skia

pub mod figure;
pub mod geometry;
pub mod image;

pub use figure::{Element, Figure, Marker, Polyline, TextRun};
