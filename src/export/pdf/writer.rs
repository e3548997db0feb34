//! Serialization of indirect objects into a complete PDF file

use super::objects::{Dictionary, ObjRef, Object};
use crate::error::{Error, Result};

const HEADER: &[u8] = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n";

/// Collects indirect objects and writes them with an xref table
#[derive(Debug, Default)]
pub struct PdfWriter {
    /// Slot `i` holds object number `i + 1`; `None` until assigned
    objects: Vec<Option<Object>>,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an object number to be filled in later with [`set`](Self::set)
    pub fn reserve(&mut self) -> ObjRef {
        self.objects.push(None);
        ObjRef(self.objects.len() as u32)
    }

    pub fn set(&mut self, r: ObjRef, object: Object) {
        let slot = r.0 as usize - 1;
        self.objects[slot] = Some(object);
    }

    /// Add an object and return its reference
    pub fn add(&mut self, object: Object) -> ObjRef {
        let r = self.reserve();
        self.set(r, object);
        r
    }

    /// Write header, objects, xref table and trailer.
    ///
    /// Fails if a reserved object was never filled in.
    pub fn finish(self, root: ObjRef, info: Option<ObjRef>) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(4096);
        out.extend_from_slice(HEADER);

        let mut offsets = Vec::with_capacity(self.objects.len());
        for (i, object) in self.objects.into_iter().enumerate() {
            let id = i + 1;
            let object = object
                .ok_or_else(|| Error::Pdf(format!("object {id} was reserved but never written")))?;
            offsets.push(out.len());
            out.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
            object.write(&mut out);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", offsets.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }

        let mut trailer = Dictionary::new()
            .with("Size", (offsets.len() + 1) as i64)
            .with("Root", root);
        if let Some(info) = info {
            trailer.insert("Info", info);
        }
        out.extend_from_slice(b"trailer\n");
        Object::Dictionary(trailer).write(&mut out);
        out.extend_from_slice(format!("\nstartxref\n{xref_offset}\n%%EOF\n").as_bytes());

        Ok(out)
    }
}
