//! TrueType (`glyf`) font reading and glyph subsetting
//!
//! Only the tables needed to map characters to glyphs, measure advances and
//! write a subset for PDF embedding are read: `head`, `hhea`, `maxp`, `hmtx`,
//! `loca`, `glyf`, `cmap` and `post`.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use crate::error::{Error, Result};

type Tag = [u8; 4];

/// Target of the `head.checkSumAdjustment` computation
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

/// Tables copied unchanged into a subset
const COPIED_TABLES: [&Tag; 7] = [b"head", b"hhea", b"maxp", b"hmtx", b"cvt ", b"fpgm", b"prep"];

// Composite glyph component flags
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;

fn malformed(what: impl std::fmt::Display) -> Error {
    Error::Font(what.to_string())
}

fn tag_name(tag: &Tag) -> String {
    String::from_utf8_lossy(tag).trim_end().to_string()
}

fn read_u16(data: &[u8], at: usize) -> Result<u16> {
    data.get(at..at + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| malformed(format!("read past end at {at}")))
}

fn read_i16(data: &[u8], at: usize) -> Result<i16> {
    read_u16(data, at).map(|v| v as i16)
}

fn read_u32(data: &[u8], at: usize) -> Result<u32> {
    data.get(at..at + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| malformed(format!("read past end at {at}")))
}

/// Sum of big-endian words, zero-padded to a word boundary
fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

/// Character map subtable used for lookups
#[derive(Debug, Clone, Copy)]
enum Cmap {
    /// Format 4, Basic Multilingual Plane only
    Segmented(usize),
    /// Format 12, full Unicode range
    Groups(usize),
}

/// A parsed TrueType font over borrowed file data
#[derive(Debug, Clone)]
pub struct TrueTypeFont<'a> {
    data: &'a [u8],
    tables: BTreeMap<Tag, Range<usize>>,
    units_per_em: u16,
    bbox: [i16; 4],
    ascent: i16,
    descent: i16,
    italic_angle: f32,
    fixed_pitch: bool,
    num_glyphs: u16,
    num_h_metrics: u16,
    long_loca: bool,
    cmap: Cmap,
}

impl<'a> TrueTypeFont<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let version = read_u32(data, 0)?;
        if version != 0x0001_0000 && version != u32::from_be_bytes(*b"true") {
            return Err(malformed(format!("not a TrueType font (version {version:#010x})")));
        }

        let num_tables = read_u16(data, 4)?;
        let mut tables = BTreeMap::new();
        for i in 0..usize::from(num_tables) {
            let record = 12 + 16 * i;
            let tag: Tag = data
                .get(record..record + 4)
                .and_then(|t| t.try_into().ok())
                .ok_or_else(|| malformed("truncated table directory"))?;
            let offset = read_u32(data, record + 8)? as usize;
            let length = read_u32(data, record + 12)? as usize;
            let end = offset
                .checked_add(length)
                .filter(|&end| end <= data.len())
                .ok_or_else(|| malformed(format!("table {} out of range", tag_name(&tag))))?;
            tables.insert(tag, offset..end);
        }

        let table = |tag: &Tag| {
            tables
                .get(tag)
                .map(|range| range.start)
                .ok_or_else(|| malformed(format!("missing {} table", tag_name(tag))))
        };
        let head = table(b"head")?;
        let hhea = table(b"hhea")?;
        let maxp = table(b"maxp")?;
        let post = table(b"post")?;
        let hmtx = table(b"hmtx")?;
        table(b"loca")?;
        table(b"glyf")?;

        let num_h_metrics = read_u16(data, hhea + 34)?;
        let num_glyphs = read_u16(data, maxp + 4)?;
        if num_h_metrics == 0 || num_glyphs == 0 {
            return Err(malformed("font has no glyph metrics"));
        }
        if tables[b"hmtx"].len() < 4 * usize::from(num_h_metrics) {
            return Err(malformed("hmtx table too short"));
        }
        read_u16(data, hmtx + 4 * usize::from(num_h_metrics) - 4)?;

        let cmap = Self::select_cmap(data, table(b"cmap")?)?;

        Ok(Self {
            data,
            units_per_em: read_u16(data, head + 18)?,
            bbox: [
                read_i16(data, head + 36)?,
                read_i16(data, head + 38)?,
                read_i16(data, head + 40)?,
                read_i16(data, head + 42)?,
            ],
            long_loca: read_i16(data, head + 50)? == 1,
            ascent: read_i16(data, hhea + 4)?,
            descent: read_i16(data, hhea + 6)?,
            italic_angle: read_u32(data, post + 4)? as i32 as f32 / 65536.0,
            fixed_pitch: read_u32(data, post + 12)? != 0,
            num_glyphs,
            num_h_metrics,
            cmap,
            tables,
        })
    }

    /// Prefer a full-range Unicode subtable, fall back to the BMP one
    fn select_cmap(data: &[u8], cmap: usize) -> Result<Cmap> {
        let count = read_u16(data, cmap + 2)?;
        let mut segmented = None;
        let mut groups = None;
        for i in 0..usize::from(count) {
            let record = cmap + 4 + 8 * i;
            let platform = read_u16(data, record)?;
            let encoding = read_u16(data, record + 2)?;
            let offset = cmap + read_u32(data, record + 4)? as usize;
            let unicode = matches!((platform, encoding), (0, _) | (3, 1) | (3, 10));
            if !unicode {
                continue;
            }
            match read_u16(data, offset)? {
                4 => segmented = segmented.or(Some(Cmap::Segmented(offset))),
                12 => groups = groups.or(Some(Cmap::Groups(offset))),
                _ => {}
            }
        }
        groups
            .or(segmented)
            .ok_or_else(|| malformed("no Unicode character map"))
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Font bounding box `[x_min, y_min, x_max, y_max]` in font units
    pub fn bbox(&self) -> [i16; 4] {
        self.bbox
    }

    pub fn ascent(&self) -> i16 {
        self.ascent
    }

    /// Negative below the baseline
    pub fn descent(&self) -> i16 {
        self.descent
    }

    pub fn italic_angle(&self) -> f32 {
        self.italic_angle
    }

    pub fn is_fixed_pitch(&self) -> bool {
        self.fixed_pitch
    }

    pub fn num_glyphs(&self) -> u16 {
        self.num_glyphs
    }

    /// Glyph for `c`, `None` when the font maps it to `.notdef`
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        let found = match self.cmap {
            Cmap::Segmented(offset) => self.lookup_segmented(offset, u32::from(c)),
            Cmap::Groups(offset) => self.lookup_groups(offset, u32::from(c)),
        };
        found.ok().flatten().filter(|&gid| gid != 0 && gid < self.num_glyphs)
    }

    fn lookup_segmented(&self, offset: usize, c: u32) -> Result<Option<u16>> {
        let Ok(c) = u16::try_from(c) else {
            return Ok(None);
        };
        let data = self.data;
        let seg_count_x2 = usize::from(read_u16(data, offset + 6)?);
        let end_codes = offset + 14;
        let start_codes = end_codes + seg_count_x2 + 2;
        let deltas = start_codes + seg_count_x2;
        let range_offsets = deltas + seg_count_x2;

        for seg in (0..seg_count_x2).step_by(2) {
            if read_u16(data, end_codes + seg)? < c {
                continue;
            }
            let start = read_u16(data, start_codes + seg)?;
            if start > c {
                return Ok(None);
            }
            let delta = read_u16(data, deltas + seg)?;
            let range_offset = usize::from(read_u16(data, range_offsets + seg)?);
            if range_offset == 0 {
                return Ok(Some(c.wrapping_add(delta)));
            }
            let at = range_offsets + seg + range_offset + 2 * usize::from(c - start);
            let gid = read_u16(data, at)?;
            return Ok((gid != 0).then(|| gid.wrapping_add(delta)));
        }
        Ok(None)
    }

    fn lookup_groups(&self, offset: usize, c: u32) -> Result<Option<u16>> {
        let data = self.data;
        let count = read_u32(data, offset + 12)? as usize;
        let (mut lo, mut hi) = (0, count);
        while lo < hi {
            let mid = (lo + hi) / 2;
            let group = offset + 16 + 12 * mid;
            let start = read_u32(data, group)?;
            let end = read_u32(data, group + 4)?;
            if c < start {
                hi = mid;
            } else if c > end {
                lo = mid + 1;
            } else {
                let gid = read_u32(data, group + 8)? + (c - start);
                return Ok(u16::try_from(gid).ok());
            }
        }
        Ok(None)
    }

    /// Advance width of a glyph in font units
    pub fn advance(&self, gid: u16) -> u16 {
        let index = usize::from(gid.min(self.num_h_metrics - 1));
        let hmtx = self.tables[b"hmtx"].start;
        read_u16(self.data, hmtx + 4 * index).unwrap_or(0)
    }

    /// Width of `text` at `size`, in the units of `size`
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| u32::from(self.advance(self.glyph_id(c).unwrap_or(0))))
            .sum();
        units as f32 * size / f32::from(self.units_per_em)
    }

    /// First character of `text` without a glyph in this font
    pub fn missing_glyph(&self, text: &str) -> Option<char> {
        text.chars().find(|&c| self.glyph_id(c).is_none())
    }

    fn table_data(&self, tag: &Tag) -> Option<&'a [u8]> {
        let data: &'a [u8] = self.data;
        self.tables.get(tag).map(|range| &data[range.clone()])
    }

    /// Byte range of a glyph's outline inside the `glyf` table
    fn glyph_range(&self, gid: u16) -> Result<Range<usize>> {
        if gid >= self.num_glyphs {
            return Err(malformed(format!("glyph {gid} out of range")));
        }
        let loca = self.tables[b"loca"].start;
        let index = usize::from(gid);
        let (start, end) = if self.long_loca {
            (
                read_u32(self.data, loca + 4 * index)? as usize,
                read_u32(self.data, loca + 4 * index + 4)? as usize,
            )
        } else {
            (
                2 * usize::from(read_u16(self.data, loca + 2 * index)?),
                2 * usize::from(read_u16(self.data, loca + 2 * index + 2)?),
            )
        };
        if start > end || end > self.tables[b"glyf"].len() {
            return Err(malformed(format!("glyph {gid} has a bad location")));
        }
        Ok(start..end)
    }

    /// Glyphs referenced by a composite glyph
    fn components(&self, gid: u16) -> Result<Vec<u16>> {
        let glyf = &self.data[self.tables[b"glyf"].clone()];
        let outline = &glyf[self.glyph_range(gid)?];
        if outline.is_empty() || read_i16(outline, 0)? >= 0 {
            return Ok(Vec::new());
        }

        let mut components = Vec::new();
        let mut at = 10;
        loop {
            let flags = read_u16(outline, at)?;
            components.push(read_u16(outline, at + 2)?);
            at += 4;
            at += if flags & ARG_1_AND_2_ARE_WORDS != 0 { 4 } else { 2 };
            if flags & WE_HAVE_A_SCALE != 0 {
                at += 2;
            } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
                at += 4;
            } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
                at += 8;
            }
            if flags & MORE_COMPONENTS == 0 {
                return Ok(components);
            }
        }
    }

    /// A standalone font file keeping only the outlines of `glyphs`
    ///
    /// Glyph ids stay unchanged; dropped glyphs keep their metrics but get an
    /// empty outline. `.notdef` and the components of composite glyphs are
    /// always kept.
    pub fn subset(&self, glyphs: &BTreeSet<u16>) -> Result<Vec<u8>> {
        let mut keep: BTreeSet<u16> = glyphs
            .iter()
            .copied()
            .filter(|&gid| gid < self.num_glyphs)
            .collect();
        keep.insert(0);
        let mut pending: Vec<u16> = keep.iter().copied().collect();
        while let Some(gid) = pending.pop() {
            for component in self.components(gid)? {
                if component < self.num_glyphs && keep.insert(component) {
                    pending.push(component);
                }
            }
        }

        let glyf = &self.data[self.tables[b"glyf"].clone()];
        let mut new_glyf = Vec::new();
        let mut new_loca = Vec::with_capacity(4 * (usize::from(self.num_glyphs) + 1));
        for gid in 0..self.num_glyphs {
            new_loca.extend_from_slice(&(new_glyf.len() as u32).to_be_bytes());
            if keep.contains(&gid) {
                new_glyf.extend_from_slice(&glyf[self.glyph_range(gid)?]);
                new_glyf.resize(new_glyf.len().next_multiple_of(4), 0);
            }
        }
        new_loca.extend_from_slice(&(new_glyf.len() as u32).to_be_bytes());

        let mut tables: BTreeMap<Tag, Vec<u8>> = COPIED_TABLES
            .iter()
            .filter_map(|&tag| self.table_data(tag).map(|data| (*tag, data.to_vec())))
            .collect();
        let head = tables
            .get_mut(b"head")
            .filter(|head| head.len() >= 54)
            .ok_or_else(|| malformed("head table too short"))?;
        head[8..12].fill(0);
        head[50..52].copy_from_slice(&1i16.to_be_bytes());
        tables.insert(*b"loca", new_loca);
        tables.insert(*b"glyf", new_glyf);

        Ok(assemble(&tables))
    }
}

/// Serialize tables into a font file with a fresh directory and checksums
fn assemble(tables: &BTreeMap<Tag, Vec<u8>>) -> Vec<u8> {
    let num_tables = tables.len() as u16;
    let entry_selector = num_tables.checked_ilog2().unwrap_or(0) as u16;
    let search_range = (1u16 << entry_selector) * 16;
    let range_shift = num_tables * 16 - search_range;

    let mut out = Vec::new();
    out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    for field in [num_tables, search_range, entry_selector, range_shift] {
        out.extend_from_slice(&field.to_be_bytes());
    }

    let mut offset = 12 + 16 * tables.len();
    let mut head_offset = None;
    for (tag, data) in tables {
        if tag == b"head" {
            head_offset = Some(offset);
        }
        out.extend_from_slice(tag);
        out.extend_from_slice(&checksum(data).to_be_bytes());
        out.extend_from_slice(&(offset as u32).to_be_bytes());
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        offset += data.len().next_multiple_of(4);
    }
    for data in tables.values() {
        out.extend_from_slice(data);
        out.resize(out.len().next_multiple_of(4), 0);
    }

    if let Some(head) = head_offset {
        let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum(&out));
        out[head + 8..head + 12].copy_from_slice(&adjustment.to_be_bytes());
    }
    out
}
