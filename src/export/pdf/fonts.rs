//! Embedded Unicode fonts for page text
//!
//! Every face a document uses is written as a Type0 font with the
//! `Identity-H` encoding over a CIDFontType2 descendant carrying a subset of
//! the TrueType data. Each distinct character gets its own two-byte CID in
//! order of first use; `/CIDToGIDMap` maps CIDs to glyphs and the
//! `/ToUnicode` CMap maps them back, so shown text extracts exactly.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::objects::{Dictionary, ObjRef, Object};
use super::writer::PdfWriter;
use crate::error::{Error, Result};
use crate::font::FontFace;

/// Name of a face in page resource dictionaries
pub fn resource_name(face: FontFace) -> &'static str {
    match face {
        FontFace::Sans => "F1",
        FontFace::Mono => "F2",
    }
}

/// Flag bits of the font descriptor
const FLAG_FIXED_PITCH: i64 = 1;
const FLAG_SYMBOLIC: i64 = 4;

/// Entries per `beginbfchar` block
const BFCHAR_BLOCK: usize = 100;

/// Characters shown with one face
#[derive(Debug, Clone, Default)]
struct FaceUsage {
    /// CID `i + 1` is `chars[i]`: the character and its glyph
    chars: Vec<(char, u16)>,
    cids: HashMap<char, u16>,
}

/// Faces and characters used by a document
#[derive(Debug, Clone, Default)]
pub struct FontSet {
    used: BTreeMap<FontFace, FaceUsage>,
}

impl FontSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `face` as referenced by a page, even if it shows no text
    pub fn select(&mut self, face: FontFace) {
        self.used.entry(face).or_default();
    }

    /// Encode `text` as big-endian two-byte CIDs of `face`
    ///
    /// Fails on the first character the face has no glyph for.
    pub fn encode(&mut self, face: FontFace, text: &str) -> Result<Vec<u8>> {
        let font = face.font()?;
        let usage = self.used.entry(face).or_default();
        let mut encoded = Vec::with_capacity(2 * text.len());
        for c in text.chars() {
            let cid = match usage.cids.get(&c) {
                Some(&cid) => cid,
                None => {
                    let gid = font.glyph_id(c).ok_or_else(|| {
                        Error::Pdf(format!("{} has no glyph for {c:?}", face.postscript_name()))
                    })?;
                    let cid = u16::try_from(usage.chars.len() + 1)
                        .map_err(|_| Error::Pdf("too many distinct characters".to_string()))?;
                    usage.chars.push((c, gid));
                    usage.cids.insert(c, cid);
                    cid
                }
            };
            encoded.extend_from_slice(&cid.to_be_bytes());
        }
        Ok(encoded)
    }

    /// Write every used face and return the `/Font` resource dictionary
    pub fn write(&self, writer: &mut PdfWriter) -> Result<Dictionary> {
        let mut resources = Dictionary::new();
        for (&face, usage) in &self.used {
            let font = write_face(face, usage, writer)?;
            resources.insert(resource_name(face), font);
        }
        Ok(resources)
    }
}

/// Six capital letters naming a subset, stable for the same characters
fn subset_tag(usage: &FaceUsage) -> String {
    let mut hash: u32 = 0x811c_9dc5;
    for &(c, _) in &usage.chars {
        for byte in u32::from(c).to_be_bytes() {
            hash = (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193);
        }
    }
    (0..6)
        .map(|i| char::from(b'A' + ((hash >> (5 * i)) % 26) as u8))
        .collect()
}

fn write_face(face: FontFace, usage: &FaceUsage, writer: &mut PdfWriter) -> Result<ObjRef> {
    let font = face.font()?;
    let glyphs: BTreeSet<u16> = usage.chars.iter().map(|&(_, gid)| gid).collect();
    let subset = font.subset(&glyphs)?;
    let base_font = format!("{}+{}", subset_tag(usage), face.postscript_name());

    let em = f32::from(font.units_per_em());
    let scaled = |units: f32| Object::Integer((units * 1000.0 / em).round() as i64);

    let font_file = writer.add(Object::Stream(
        Dictionary::new().with("Length1", subset.len() as i64),
        subset,
    ));

    let mut flags = FLAG_SYMBOLIC;
    if font.is_fixed_pitch() {
        flags |= FLAG_FIXED_PITCH;
    }
    let bbox = font.bbox().map(|v| scaled(f32::from(v)));
    let descriptor = writer.add(
        Dictionary::typed("FontDescriptor")
            .with("FontName", Object::name(&base_font))
            .with("Flags", flags)
            .with("FontBBox", bbox.to_vec())
            .with("ItalicAngle", font.italic_angle())
            .with("Ascent", scaled(f32::from(font.ascent())))
            .with("Descent", scaled(f32::from(font.descent())))
            .with("CapHeight", scaled(f32::from(font.ascent())))
            .with("StemV", 80_i64)
            .with("FontFile2", font_file)
            .into(),
    );

    // CID 0 stays .notdef
    let mut cid_to_gid = vec![0, 0];
    let mut widths = vec![scaled(f32::from(font.advance(0)))];
    for &(_, gid) in &usage.chars {
        cid_to_gid.extend_from_slice(&gid.to_be_bytes());
        widths.push(scaled(f32::from(font.advance(gid))));
    }
    let cid_to_gid = writer.add(Object::Stream(Dictionary::new(), cid_to_gid));

    let descendant = writer.add(
        Dictionary::typed("Font")
            .with("Subtype", Object::name("CIDFontType2"))
            .with("BaseFont", Object::name(&base_font))
            .with(
                "CIDSystemInfo",
                Dictionary::new()
                    .with("Registry", Object::String(b"Adobe".to_vec()))
                    .with("Ordering", Object::String(b"Identity".to_vec()))
                    .with("Supplement", 0_i64),
            )
            .with("FontDescriptor", descriptor)
            .with("W", vec![Object::Integer(0), Object::Array(widths)])
            .with("CIDToGIDMap", cid_to_gid)
            .into(),
    );

    let to_unicode = writer.add(Object::Stream(Dictionary::new(), to_unicode_cmap(usage)));

    log::debug!(
        "Embedding {base_font} with {} characters",
        usage.chars.len()
    );
    Ok(writer.add(
        Dictionary::typed("Font")
            .with("Subtype", Object::name("Type0"))
            .with("BaseFont", Object::name(&base_font))
            .with("Encoding", Object::name("Identity-H"))
            .with("DescendantFonts", vec![Object::Reference(descendant)])
            .with("ToUnicode", to_unicode)
            .into(),
    ))
}

fn utf16_hex(c: char) -> String {
    let mut units = [0u16; 2];
    c.encode_utf16(&mut units)
        .iter()
        .map(|unit| format!("{unit:04X}"))
        .collect()
}

fn to_unicode_cmap(usage: &FaceUsage) -> Vec<u8> {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );
    for (block, chars) in usage.chars.chunks(BFCHAR_BLOCK).enumerate() {
        cmap.push_str(&format!("{} beginbfchar\n", chars.len()));
        for (i, &(c, _)) in chars.iter().enumerate() {
            let cid = block * BFCHAR_BLOCK + i + 1;
            cmap.push_str(&format!("<{cid:04X}> <{}>\n", utf16_hex(c)));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    cmap.into_bytes()
}

/// CID to text mapping read from a `/ToUnicode` CMap written by this module
pub type CidMap = HashMap<u16, String>;

fn parse_hex(token: &str) -> Option<Vec<u8>> {
    let hex = token.strip_prefix('<')?.strip_suffix('>')?;
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect()
}

/// Read the `bfchar` entries of a ToUnicode CMap
pub fn parse_to_unicode(cmap: &[u8]) -> CidMap {
    let text = String::from_utf8_lossy(cmap);
    let mut map = CidMap::new();
    let mut in_block = false;
    for line in text.lines() {
        let line = line.trim();
        if line.ends_with("beginbfchar") {
            in_block = true;
            continue;
        }
        if line == "endbfchar" {
            in_block = false;
            continue;
        }
        if !in_block {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let (Some(src), Some(dst)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        let (Some(src), Some(dst)) = (parse_hex(src), parse_hex(dst)) else {
            continue;
        };
        let [hi, lo] = src.as_slice() else {
            continue;
        };
        let units: Vec<u16> = dst
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        map.insert(u16::from_be_bytes([*hi, *lo]), String::from_utf16_lossy(&units));
    }
    map
}

/// Decode two-byte CIDs with a map from [`parse_to_unicode`]
pub fn decode(encoded: &[u8], map: &CidMap) -> String {
    encoded
        .chunks(2)
        .map(|pair| {
            let cid = match pair {
                [hi, lo] => u16::from_be_bytes([*hi, *lo]),
                _ => 0,
            };
            map.get(&cid).map_or("\u{FFFD}", String::as_str)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_assigns_cids_in_order() {
        let mut fonts = FontSet::new();
        let encoded = fonts.encode(FontFace::Mono, "aba").unwrap();
        assert_eq!(encoded, vec![0, 1, 0, 2, 0, 1]);
        // Faces number their characters independently
        assert_eq!(fonts.encode(FontFace::Sans, "b").unwrap(), vec![0, 1]);
        assert_eq!(fonts.encode(FontFace::Mono, "c").unwrap(), vec![0, 3]);
    }

    #[test]
    fn test_encode_rejects_missing_glyph() {
        let mut fonts = FontSet::new();
        let result = fonts.encode(FontFace::Mono, "x\u{1F600}");
        assert!(matches!(result, Err(Error::Pdf(_))));
    }

    #[test]
    fn test_to_unicode_round_trip() {
        let mut fonts = FontSet::new();
        let text = "Poloměr: 2.5 μm, Ω, Michał";
        let encoded = fonts.encode(FontFace::Mono, text).unwrap();
        let usage = &fonts.used[&FontFace::Mono];
        let map = parse_to_unicode(&to_unicode_cmap(usage));
        assert_eq!(map.len(), usage.chars.len());
        assert_eq!(decode(&encoded, &map), text);
    }

    #[test]
    fn test_cmap_blocks_and_surrogates() {
        let usage = FaceUsage {
            chars: (0..150)
                .map(|i| (char::from_u32(0x100 + i).unwrap(), 1))
                .chain([('\u{1D465}', 1)])
                .collect(),
            cids: HashMap::new(),
        };
        let cmap = String::from_utf8(to_unicode_cmap(&usage)).unwrap();
        assert!(cmap.contains("100 beginbfchar\n"));
        assert!(cmap.contains("51 beginbfchar\n"));
        assert!(cmap.contains("<0097> <D835DC65>\n"));
        let map = parse_to_unicode(cmap.as_bytes());
        assert_eq!(map[&0x97], "\u{1D465}");
        assert_eq!(map[&1], "\u{100}");
    }

    #[test]
    fn test_write_embeds_used_faces() {
        let mut fonts = FontSet::new();
        fonts.encode(FontFace::Sans, "x [μm]").unwrap();
        fonts.select(FontFace::Mono);
        let mut writer = PdfWriter::new();
        let resources = fonts.write(&mut writer).unwrap();
        assert!(matches!(resources.get("F1"), Some(Object::Reference(_))));
        assert!(matches!(resources.get("F2"), Some(Object::Reference(_))));
    }

    #[test]
    fn test_subset_tag_is_stable() {
        let mut a = FontSet::new();
        let mut b = FontSet::new();
        a.encode(FontFace::Sans, "abc").unwrap();
        b.encode(FontFace::Sans, "abc").unwrap();
        let tag = subset_tag(&a.used[&FontFace::Sans]);
        assert_eq!(tag, subset_tag(&b.used[&FontFace::Sans]));
        assert_eq!(tag.len(), 6);
        assert!(tag.chars().all(|c| c.is_ascii_uppercase()));
    }
}
