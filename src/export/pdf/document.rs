//! PDF document structure (catalog, page tree, resources) and page canvases

use chrono::{DateTime, FixedOffset};

use super::content::Content;
use super::fonts::{self, FontSet};
use super::objects::{Dictionary, ObjRef, Object};
use super::writer::PdfWriter;
use crate::error::{Error, Result};
use crate::font::FontFace;

/// Document metadata written to the `/Info` dictionary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
    pub author: Option<String>,
    /// Creation time; left out when `None` so output stays reproducible
    pub created: Option<DateTime<FixedOffset>>,
}

impl DocumentInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: None,
            created: None,
        }
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    #[must_use]
    pub fn with_created(mut self, created: DateTime<FixedOffset>) -> Self {
        self.created = Some(created);
        self
    }

    /// Stamp with the current local time
    #[must_use]
    pub fn created_now(self) -> Self {
        self.with_created(chrono::Local::now().fixed_offset())
    }

    fn to_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new()
            .with("Title", Object::text_string(&self.title))
            .with(
                "Producer",
                Object::String(
                    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")).into_bytes(),
                ),
            );
        if let Some(author) = &self.author {
            dict.insert("Author", Object::text_string(author));
        }
        if let Some(created) = &self.created {
            dict.insert("CreationDate", Object::String(pdf_date(created).into_bytes()));
        }
        dict
    }
}

/// `D:YYYYMMDDHHmmSS+HH'mm'`
pub fn pdf_date(time: &DateTime<FixedOffset>) -> String {
    let offset = time.offset().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let offset = offset.unsigned_abs();
    format!(
        "D:{}{}{:02}'{:02}'",
        time.format("%Y%m%d%H%M%S"),
        sign,
        offset / 3600,
        offset / 60 % 60
    )
}

/// Drawing surface for a single page.
///
/// Coordinates are in points with the origin at the top-left and y growing
/// downward; the canvas flips them into PDF space.
#[derive(Debug)]
pub struct PageCanvas<'a> {
    index: usize,
    width: f32,
    height: f32,
    content: Content,
    fonts: &'a mut FontSet,
    face: Option<FontFace>,
}

impl PageCanvas<'_> {
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Flip a top-left based y coordinate into PDF space
    pub fn flip_y(&self, y: f32) -> f32 {
        self.height - y
    }

    pub fn content(&mut self) -> &mut Content {
        &mut self.content
    }

    /// Select `face` at `size` for the following [`show_text`](Self::show_text)
    pub fn set_font(&mut self, face: FontFace, size: f32) -> &mut Content {
        self.fonts.select(face);
        self.face = Some(face);
        self.content.font(fonts::resource_name(face), size)
    }

    /// Show `text` in the selected face; fails if a character has no glyph
    pub fn show_text(&mut self, text: &str) -> Result<&mut Content> {
        let face = self
            .face
            .ok_or_else(|| Error::Pdf("text shown before a font was set".to_string()))?;
        let encoded = self.fonts.encode(face, text)?;
        Ok(self.content.show(&encoded))
    }
}

impl Drop for PageCanvas<'_> {
    fn drop(&mut self) {
        log::trace!("Released canvas for page {}", self.index + 1);
    }
}

/// In-memory document under construction.
///
/// Pages only become bytes in [`finish`](Self::finish); dropping the builder
/// discards everything written so far. Fonts are embedded at `finish`,
/// subset to the characters the committed pages show.
#[derive(Debug)]
pub struct DocumentBuilder {
    writer: PdfWriter,
    catalog: ObjRef,
    pages: ObjRef,
    resources: ObjRef,
    fonts: FontSet,
    page_refs: Vec<ObjRef>,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    pub fn new() -> Self {
        let mut writer = PdfWriter::new();
        let catalog = writer.reserve();
        let pages = writer.reserve();
        let resources = writer.reserve();

        Self {
            writer,
            catalog,
            pages,
            resources,
            fonts: FontSet::new(),
            page_refs: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Draw one page of `width` x `height` points.
    ///
    /// The canvas exists only for the duration of `draw` and is released on
    /// every exit path. The page is committed only if `draw` succeeds.
    pub fn with_page<F>(&mut self, width: f32, height: f32, draw: F) -> Result<()>
    where
        F: FnOnce(&mut PageCanvas<'_>) -> Result<()>,
    {
        let index = self.page_refs.len();
        let committed_fonts = self.fonts.clone();
        let mut canvas = PageCanvas {
            index,
            width,
            height,
            content: Content::new(),
            fonts: &mut self.fonts,
            face: None,
        };
        if let Err(err) = draw(&mut canvas) {
            drop(canvas);
            self.fonts = committed_fonts;
            return Err(err);
        }

        let data = std::mem::take(&mut canvas.content).finish();
        drop(canvas);
        let contents = self.writer.add(Object::Stream(Dictionary::new(), data));
        let page = Dictionary::typed("Page")
            .with("Parent", self.pages)
            .with("MediaBox", Object::reals(&[0.0, 0.0, width, height]))
            .with("Resources", self.resources)
            .with("Contents", contents);
        let page_ref = self.writer.add(page.into());
        self.page_refs.push(page_ref);

        log::debug!(
            "Committed page {} ({:.1}x{:.1} pt)",
            index + 1,
            width,
            height
        );
        Ok(())
    }

    /// Write the page tree, catalog and info, and serialize the document
    pub fn finish(mut self, info: &DocumentInfo) -> Result<Vec<u8>> {
        let font_resources = self.fonts.write(&mut self.writer)?;
        self.writer.set(
            self.resources,
            Dictionary::new().with("Font", font_resources).into(),
        );

        let kids = self
            .page_refs
            .iter()
            .map(|&r| Object::Reference(r))
            .collect::<Vec<_>>();
        let count = kids.len() as i64;
        self.writer.set(
            self.pages,
            Dictionary::typed("Pages")
                .with("Kids", kids)
                .with("Count", count)
                .into(),
        );
        self.writer.set(
            self.catalog,
            Dictionary::typed("Catalog").with("Pages", self.pages).into(),
        );
        let info_ref = self.writer.add(info.to_dictionary().into());
        self.writer.finish(self.catalog, Some(info_ref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::TimeZone;

    #[test]
    fn test_failed_page_is_not_committed() {
        let mut doc = DocumentBuilder::new();
        doc.with_page(100.0, 100.0, |_| Ok(())).unwrap();
        let result = doc.with_page(100.0, 100.0, |canvas| {
            canvas.content().move_to(0.0, 0.0);
            Err(Error::Render("boom".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_failed_page_leaves_no_font_usage() {
        let mut doc = DocumentBuilder::new();
        let result = doc.with_page(100.0, 100.0, |canvas| {
            canvas.set_font(FontFace::Mono, 10.0);
            canvas.show_text("abc")?;
            Err(Error::Render("boom".to_string()))
        });
        assert!(result.is_err());
        let bytes = doc.finish(&DocumentInfo::new("t")).unwrap();
        assert!(!String::from_utf8_lossy(&bytes).contains("DejaVuSansMono"));
    }

    #[test]
    fn test_show_text_requires_font() {
        let mut doc = DocumentBuilder::new();
        let result = doc.with_page(100.0, 100.0, |canvas| canvas.show_text("x").map(|_| ()));
        assert!(matches!(result, Err(Error::Pdf(_))));
    }

    #[test]
    fn test_missing_glyph_fails_page() {
        let mut doc = DocumentBuilder::new();
        let result = doc.with_page(100.0, 100.0, |canvas| {
            canvas.set_font(FontFace::Sans, 10.0);
            canvas.show_text("\u{1F600}").map(|_| ())
        });
        assert!(matches!(result, Err(Error::Pdf(_))));
        assert_eq!(doc.page_count(), 0);
    }

    #[test]
    fn test_embeds_type0_fonts() {
        let mut doc = DocumentBuilder::new();
        doc.with_page(100.0, 100.0, |canvas| {
            canvas.content().begin_text();
            canvas.set_font(FontFace::Sans, 10.0);
            canvas.show_text("Ω")?;
            canvas.content().end_text();
            Ok(())
        })
        .unwrap();
        let bytes = doc.finish(&DocumentInfo::new("t")).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Subtype /Type0"));
        assert!(text.contains("/Encoding /Identity-H"));
        assert!(text.contains("/Subtype /CIDFontType2"));
        assert!(text.contains("+DejaVuSans /Encoding /Identity-H"));
        assert!(text.contains("/FontFile2"));
        assert!(text.contains("<0001> <03A9>"));
        assert!(!text.contains("DejaVuSansMono"));
    }

    #[test]
    fn test_creation_date_written() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let created = offset.with_ymd_and_hms(2026, 10, 19, 14, 30, 0).unwrap();
        let doc = DocumentBuilder::new();
        let bytes = doc
            .finish(&DocumentInfo::new("t").with_created(created))
            .unwrap();
        assert!(
            String::from_utf8_lossy(&bytes).contains("/CreationDate (D:20261019143000+02'00')")
        );
    }

    #[test]
    fn test_page_tree() {
        let mut doc = DocumentBuilder::new();
        for _ in 0..3 {
            doc.with_page(50.0, 80.0, |canvas| {
                assert_eq!(canvas.flip_y(10.0), 70.0);
                Ok(())
            })
            .unwrap();
        }
        let bytes = doc.finish(&DocumentInfo::new("t")).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Type /Pages"));
        assert!(text.contains("/Count 3"));
        assert_eq!(text.matches("/Type /Page ").count(), 3);
        assert!(text.contains("/MediaBox [0 0 50 80]"));
    }

    #[test]
    fn test_pdf_date() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let time = offset.with_ymd_and_hms(2026, 10, 19, 8, 5, 9).unwrap();
        assert_eq!(pdf_date(&time), "D:20261019080509+01'00'");

        let offset = FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap();
        let time = offset.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(pdf_date(&time), "D:20240102030405-05'30'");
    }

    #[test]
    fn test_info_dictionary() {
        let info = DocumentInfo::new("Body na kružnici").with_author("A");
        let dict = info.to_dictionary();
        assert!(dict.get("Author").is_some());
        assert!(dict.get("CreationDate").is_none());
        assert_eq!(dict.get("Title"), Some(&Object::text_string("Body na kružnici")));
    }
}
