//! Error type shared by the point, figure and export pipeline

/// Errors produced while validating input, rendering or exporting
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Presentation-layer input outside its allowed range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The figure could not be built or rasterized
    #[error("figure cannot be rendered: {0}")]
    Render(String),
    /// The PDF document could not be assembled
    #[error("PDF export failed: {0}")]
    Pdf(String),
    /// Embedded font data could not be read
    #[error("font data unusable: {0}")]
    Font(String),
    /// A parameter summary block could not be read back
    #[error("malformed parameter summary: {0}")]
    Summary(String),
    #[error("PNG encoding failed")]
    Png(#[from] png::EncodingError),
}

pub type Result<T> = std::result::Result<T, Error>;
