//! Content stream generation (graphics and text operators)

use super::objects::{Object, format_real};

/// Builder for a page content stream
#[derive(Debug, Default)]
pub struct Content {
    buf: Vec<u8>,
}

impl Content {
    pub fn new() -> Self {
        Self::default()
    }

    fn op(&mut self, operands: &[f32], operator: &str) -> &mut Self {
        for &v in operands {
            self.buf.extend_from_slice(format_real(v).as_bytes());
            self.buf.push(b' ');
        }
        self.buf.extend_from_slice(operator.as_bytes());
        self.buf.push(b'\n');
        self
    }

    /// `q`
    pub fn save_state(&mut self) -> &mut Self {
        self.op(&[], "q")
    }

    /// `Q`
    pub fn restore_state(&mut self) -> &mut Self {
        self.op(&[], "Q")
    }

    pub fn line_width(&mut self, width: f32) -> &mut Self {
        self.op(&[width], "w")
    }

    /// `0` miter, `1` round, `2` bevel
    pub fn line_join(&mut self, join: u8) -> &mut Self {
        self.op(&[f32::from(join)], "j")
    }

    /// Dash pattern; an empty pattern restores solid lines
    pub fn dash(&mut self, pattern: &[f32], phase: f32) -> &mut Self {
        Object::reals(pattern).write(&mut self.buf);
        self.buf.push(b' ');
        self.op(&[phase], "d")
    }

    pub fn stroke_rgb(&mut self, [r, g, b]: [f32; 3]) -> &mut Self {
        self.op(&[r, g, b], "RG")
    }

    pub fn fill_rgb(&mut self, [r, g, b]: [f32; 3]) -> &mut Self {
        self.op(&[r, g, b], "rg")
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.op(&[x, y], "m")
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.op(&[x, y], "l")
    }

    pub fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) -> &mut Self {
        self.op(&[x1, y1, x2, y2, x, y], "c")
    }

    pub fn close_path(&mut self) -> &mut Self {
        self.op(&[], "h")
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.op(&[], "S")
    }

    /// Fill with the nonzero winding rule
    pub fn fill(&mut self) -> &mut Self {
        self.op(&[], "f")
    }

    pub fn begin_text(&mut self) -> &mut Self {
        self.op(&[], "BT")
    }

    pub fn end_text(&mut self) -> &mut Self {
        self.op(&[], "ET")
    }

    /// Select font resource `/<resource>` at `size`
    pub fn font(&mut self, resource: &str, size: f32) -> &mut Self {
        self.buf.push(b'/');
        self.buf.extend_from_slice(resource.as_bytes());
        self.buf.push(b' ');
        self.op(&[size], "Tf")
    }

    pub fn text_matrix(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> &mut Self {
        self.op(&[a, b, c, d, e, f], "Tm")
    }

    /// Line spacing used by `next_line`
    pub fn leading(&mut self, leading: f32) -> &mut Self {
        self.op(&[leading], "TL")
    }

    pub fn next_line_at(&mut self, tx: f32, ty: f32) -> &mut Self {
        self.op(&[tx, ty], "Td")
    }

    /// `T*`
    pub fn next_line(&mut self) -> &mut Self {
        self.op(&[], "T*")
    }

    /// Show already-encoded character codes, written as a hex string
    pub fn show(&mut self, encoded: &[u8]) -> &mut Self {
        Object::HexString(encoded.to_vec()).write(&mut self.buf);
        self.buf.push(b' ');
        self.op(&[], "Tj")
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
