//! Minimal PDF writer
//!
//! # Architecture
//!
//! - `objects`: PDF object model (Dictionary, Array, Stream, Reference)
//! - `content`: Content stream generation (text, graphics operators)
//! - `fonts`: Embedded Type0 fonts, subsetting and ToUnicode maps
//! - `writer`: Indirect objects, xref table and trailer
//! - `document`: Catalog, page tree, resources and scoped page canvases
//! - `inspect`: Reading back documents written here

pub mod content;
pub mod document;
pub mod fonts;
pub mod inspect;
pub mod objects;
pub mod writer;

pub use document::{DocumentBuilder, DocumentInfo, PageCanvas};
pub use fonts::FontSet;
