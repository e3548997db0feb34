//! Pure domain types with minimal dependencies
//!
//! This module contains the circle parameters, the point generator and the
//! point color. Nothing here knows about rendering or PDF output.

pub mod circle;
pub mod color;
pub mod params;

pub use circle::*;
pub use color::*;
pub use params::*;
