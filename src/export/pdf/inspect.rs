//! Reading back documents produced by this crate
//!
//! Only the subset written by [`PdfWriter`](super::writer::PdfWriter) is
//! understood: a classic xref table, uncompressed content streams and text
//! shown with `Tj` in fonts that carry a `/ToUnicode` map.

use std::collections::HashMap;

use super::fonts::{self, CidMap};
use crate::error::{Error, Result};

fn malformed(what: &str) -> Error {
    Error::Pdf(format!("cannot read document: {what}"))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

fn parse_number(bytes: &[u8]) -> Option<usize> {
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    std::str::from_utf8(&bytes[..digits]).ok()?.parse().ok()
}

fn skip_whitespace(bytes: &[u8]) -> &[u8] {
    let n = bytes.iter().take_while(|b| b.is_ascii_whitespace()).count();
    &bytes[n..]
}

/// Object number in `... /Key N 0 R ...`
fn reference_after(body: &[u8], key: &[u8]) -> Option<usize> {
    let at = find(body, key)? + key.len();
    parse_number(skip_whitespace(&body[at..]))
}

struct Document<'a> {
    bytes: &'a [u8],
    offsets: Vec<usize>,
    trailer: &'a [u8],
}

impl<'a> Document<'a> {
    fn parse(bytes: &'a [u8]) -> Result<Self> {
        if !bytes.starts_with(b"%PDF-") {
            return Err(malformed("missing %PDF header"));
        }
        let startxref = rfind(bytes, b"startxref").ok_or_else(|| malformed("no startxref"))?;
        let xref_at = parse_number(skip_whitespace(&bytes[startxref + 9..]))
            .ok_or_else(|| malformed("bad startxref offset"))?;
        let xref = bytes
            .get(xref_at..)
            .filter(|x| x.starts_with(b"xref"))
            .ok_or_else(|| malformed("startxref does not point at xref"))?;

        // "xref\n0 N\n" followed by N fixed-width entries
        let header = skip_whitespace(&xref[4..]);
        let header = skip_whitespace(&header[1..]);
        let size = parse_number(header).ok_or_else(|| malformed("bad xref header"))?;
        let entries_at = find(header, b"\n").ok_or_else(|| malformed("bad xref header"))? + 1;
        let entries = &header[entries_at..];

        let offsets = (1..size)
            .map(|i| {
                entries
                    .get(i * 20..i * 20 + 10)
                    .and_then(parse_number)
                    .ok_or_else(|| malformed("truncated xref table"))
            })
            .collect::<Result<Vec<_>>>()?;

        let trailer_at = find(xref, b"trailer").ok_or_else(|| malformed("no trailer"))?;
        Ok(Self {
            bytes,
            offsets,
            trailer: &xref[trailer_at..],
        })
    }

    /// Body of object `id`, between `obj` and `endobj`
    fn object(&self, id: usize) -> Result<&'a [u8]> {
        let offset = *id
            .checked_sub(1)
            .and_then(|i| self.offsets.get(i))
            .ok_or_else(|| malformed(&format!("object {id} not in xref")))?;
        let rest = self
            .bytes
            .get(offset..)
            .ok_or_else(|| malformed("xref offset out of range"))?;
        let header = format!("{id} 0 obj");
        if !rest.starts_with(header.as_bytes()) {
            return Err(malformed(&format!("xref entry {id} is misplaced")));
        }
        let end = find(rest, b"endobj").ok_or_else(|| malformed("unterminated object"))?;
        Ok(&rest[header.len()..end])
    }

    fn page_refs(&self) -> Result<Vec<usize>> {
        let root = reference_after(self.trailer, b"/Root").ok_or_else(|| malformed("no /Root"))?;
        let catalog = self.object(root)?;
        let pages_id =
            reference_after(catalog, b"/Pages").ok_or_else(|| malformed("no /Pages"))?;
        let pages = self.object(pages_id)?;

        let kids_at = find(pages, b"/Kids").ok_or_else(|| malformed("no /Kids"))?;
        let kids = &pages[kids_at..];
        let open = find(kids, b"[").ok_or_else(|| malformed("bad /Kids"))?;
        let close = find(kids, b"]").ok_or_else(|| malformed("bad /Kids"))?;
        let list = std::str::from_utf8(&kids[open + 1..close]).map_err(|_| malformed("bad /Kids"))?;

        // "a 0 R b 0 R ..."
        let tokens: Vec<&str> = list.split_whitespace().collect();
        let refs = tokens
            .chunks(3)
            .map(|t| match t {
                [id, "0", "R"] => id.parse().map_err(|_| malformed("bad page reference")),
                _ => Err(malformed("bad page reference")),
            })
            .collect::<Result<Vec<usize>>>()?;

        let count = reference_after(pages, b"/Count").ok_or_else(|| malformed("no /Count"))?;
        if count != refs.len() {
            return Err(malformed("/Count disagrees with /Kids"));
        }
        Ok(refs)
    }

    /// Data of the stream object `id`
    fn stream(&self, id: usize) -> Result<&'a [u8]> {
        let stream = self.object(id)?;
        let start = find(stream, b"stream\n").ok_or_else(|| malformed("no stream data"))? + 7;
        let end = rfind(stream, b"\nendstream").ok_or_else(|| malformed("unterminated stream"))?;
        Ok(&stream[start..end])
    }

    fn page_content(&self, page_id: usize) -> Result<&'a [u8]> {
        let page = self.object(page_id)?;
        let contents =
            reference_after(page, b"/Contents").ok_or_else(|| malformed("page without /Contents"))?;
        self.stream(contents)
    }

    /// ToUnicode maps of the page's fonts, by resource name
    fn page_fonts(&self, page_id: usize) -> Result<HashMap<String, CidMap>> {
        let page = self.object(page_id)?;
        let resources_id = reference_after(page, b"/Resources")
            .ok_or_else(|| malformed("page without /Resources"))?;
        let resources = self.object(resources_id)?;

        let mut maps = HashMap::new();
        let Some(at) = find(resources, b"/Font") else {
            return Ok(maps);
        };
        let dict = &resources[at..];
        let open = find(dict, b"<<").ok_or_else(|| malformed("bad /Font"))?;
        let close = find(dict, b">>").ok_or_else(|| malformed("bad /Font"))?;
        let entries =
            std::str::from_utf8(&dict[open + 2..close]).map_err(|_| malformed("bad /Font"))?;

        // "/F1 a 0 R /F2 b 0 R"
        let tokens: Vec<&str> = entries.split_whitespace().collect();
        for entry in tokens.chunks(4) {
            let [name, id, "0", "R"] = entry else {
                return Err(malformed("bad /Font entry"));
            };
            let name = name.strip_prefix('/').ok_or_else(|| malformed("bad /Font entry"))?;
            let font_id = id.parse().map_err(|_| malformed("bad /Font entry"))?;
            let to_unicode = reference_after(self.object(font_id)?, b"/ToUnicode")
                .ok_or_else(|| malformed(&format!("font /{name} has no /ToUnicode")))?;
            maps.insert(name.to_string(), fonts::parse_to_unicode(self.stream(to_unicode)?));
        }
        Ok(maps)
    }
}

/// Parse a hex string starting at `<`; returns the bytes and the rest
fn hex_string(bytes: &[u8]) -> Option<(Vec<u8>, &[u8])> {
    let close = find(bytes, b">")?;
    let digits = bytes[1..close]
        .iter()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|&b| char::from(b).to_digit(16))
        .collect::<Option<Vec<u32>>>()?;
    // An odd final digit is followed by an implicit 0
    let decoded = digits
        .chunks(2)
        .map(|pair| (pair[0] * 16 + pair.get(1).copied().unwrap_or(0)) as u8)
        .collect();
    Some((decoded, &bytes[close + 1..]))
}

/// Length of a regular token (up to whitespace or a delimiter)
fn token_len(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .take_while(|b| !b.is_ascii_whitespace() && !b"()<>[]{}/%".contains(b))
        .count()
}

enum Operand<'a> {
    Name(&'a [u8]),
    Hex(Vec<u8>),
    Other,
}

/// Strings shown with `Tj`, decoded with the font selected by the last `Tf`
fn shown_strings(content: &[u8], font_maps: &HashMap<String, CidMap>) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut operands = Vec::new();
    let mut current: Option<&CidMap> = None;
    let mut rest = skip_whitespace(content);
    while let Some(&first) = rest.first() {
        match first {
            b'<' => {
                let (raw, after) = hex_string(rest).ok_or_else(|| malformed("bad hex string"))?;
                operands.push(Operand::Hex(raw));
                rest = after;
            }
            b'[' | b']' => rest = &rest[1..],
            b'/' => {
                let len = token_len(&rest[1..]);
                operands.push(Operand::Name(&rest[1..1 + len]));
                rest = &rest[1 + len..];
            }
            b'0'..=b'9' | b'-' | b'+' | b'.' => {
                operands.push(Operand::Other);
                rest = &rest[token_len(rest).max(1)..];
            }
            _ => {
                let (operator, after) = rest.split_at(token_len(rest).max(1));
                rest = after;
                match operator {
                    b"Tf" => {
                        let name = operands
                            .iter()
                            .find_map(|op| match op {
                                Operand::Name(name) => Some(String::from_utf8_lossy(name)),
                                _ => None,
                            })
                            .ok_or_else(|| malformed("Tf without a font"))?;
                        let map = font_maps
                            .get(name.as_ref())
                            .ok_or_else(|| malformed(&format!("unknown font /{name}")))?;
                        current = Some(map);
                    }
                    b"Tj" => {
                        let Some(Operand::Hex(raw)) = operands.last() else {
                            return Err(malformed("Tj without a hex string"));
                        };
                        let map = current.ok_or_else(|| malformed("Tj before Tf"))?;
                        lines.push(fonts::decode(raw, map));
                    }
                    _ => {}
                }
                operands.clear();
            }
        }
        rest = skip_whitespace(rest);
    }
    Ok(lines)
}

/// Number of pages in the document
pub fn page_count(bytes: &[u8]) -> Result<usize> {
    Ok(Document::parse(bytes)?.page_refs()?.len())
}

/// Text shown on page `index` (0-based), one entry per `Tj`
pub fn page_text_lines(bytes: &[u8], index: usize) -> Result<Vec<String>> {
    let doc = Document::parse(bytes)?;
    let refs = doc.page_refs()?;
    let page = *refs
        .get(index)
        .ok_or_else(|| malformed(&format!("no page {index}")))?;
    shown_strings(doc.page_content(page)?, &doc.page_fonts(page)?)
}
