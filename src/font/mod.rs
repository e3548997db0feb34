//! Embedded font faces
//!
//! DejaVu Sans labels the figure and DejaVu Sans Mono sets the parameter
//! page. Both are compiled into the crate (see `assets/fonts/LICENSE`) so
//! text measurement and PDF embedding never depend on system fonts.

pub mod truetype;

use std::sync::LazyLock;

pub use truetype::TrueTypeFont;

use crate::error::{Error, Result};

static SANS_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static MONO_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono.ttf");

type Loaded = LazyLock<std::result::Result<TrueTypeFont<'static>, String>>;

static SANS: Loaded = LazyLock::new(|| TrueTypeFont::parse(SANS_DATA).map_err(|e| e.to_string()));
static MONO: Loaded = LazyLock::new(|| TrueTypeFont::parse(MONO_DATA).map_err(|e| e.to_string()));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FontFace {
    /// Proportional, for figure labels
    Sans,
    /// Monospaced, for the parameter page
    Mono,
}

impl FontFace {
    pub const ALL: [FontFace; 2] = [FontFace::Sans, FontFace::Mono];

    /// PostScript name of the face
    pub fn postscript_name(self) -> &'static str {
        match self {
            FontFace::Sans => "DejaVuSans",
            FontFace::Mono => "DejaVuSansMono",
        }
    }

    /// The parsed font, loaded on first use
    pub fn font(self) -> Result<&'static TrueTypeFont<'static>> {
        let loaded = match self {
            FontFace::Sans => &*SANS,
            FontFace::Mono => &*MONO,
        };
        loaded.as_ref().map_err(|e| Error::Font(e.clone()))
    }

    /// First character of `text` this face cannot draw
    pub fn missing_glyph(self, text: &str) -> Result<Option<char>> {
        Ok(self.font()?.missing_glyph(text))
    }
}

/// First character of `text` that some face cannot draw
pub fn missing_glyph_in_any(text: &str) -> Result<Option<char>> {
    for face in FontFace::ALL {
        if let Some(c) = face.missing_glyph(text)? {
            return Ok(Some(c));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::geometry::text;

    #[test]
    fn test_faces_load() {
        for face in FontFace::ALL {
            let font = face.font().unwrap();
            assert!(font.num_glyphs() > 1000, "{face:?}");
        }
    }

    #[test]
    fn test_figure_metrics_match_sans() {
        let font = FontFace::Sans.font().unwrap();
        let em = f32::from(font.units_per_em());
        assert!((f32::from(font.ascent()) / em - text::ASCENT).abs() < 1e-3);
        assert!((f32::from(-font.descent()) / em - text::DESCENT).abs() < 1e-3);
    }

    #[test]
    fn test_missing_glyph_in_any() {
        assert_eq!(missing_glyph_in_any("Poloměr μm Ω ł").unwrap(), None);
        assert_eq!(missing_glyph_in_any("m\u{1F600}").unwrap(), Some('\u{1F600}'));
    }
}
