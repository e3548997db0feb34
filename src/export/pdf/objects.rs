//! PDF object model and its serialization

/// Reference to an indirect object (generation is always 0)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjRef(pub u32);

/// Insertion-ordered PDF dictionary
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dictionary {
    entries: Vec<(String, Object)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary with `/Type /<name>` as its first entry
    pub fn typed(name: &str) -> Self {
        Self::new().with("Type", Object::name(name))
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Object>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, key: &str, value: impl Into<Object>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"<<");
        for (key, value) in &self.entries {
            out.push(b' ');
            write_name(key, out);
            out.push(b' ');
            value.write(out);
        }
        out.extend_from_slice(b" >>");
    }
}

/// A PDF object
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    Null,
    Integer(i64),
    Real(f32),
    Name(String),
    /// Literal string `( ... )` of raw bytes
    String(Vec<u8>),
    /// Hex string `< ... >` of raw bytes
    HexString(Vec<u8>),
    Array(Vec<Object>),
    Dictionary(Dictionary),
    /// Stream with its dictionary; `/Length` is written automatically
    Stream(Dictionary, Vec<u8>),
    Reference(ObjRef),
}

impl Object {
    pub fn name(name: &str) -> Self {
        Object::Name(name.to_string())
    }

    /// Text string for document metadata: UTF-16BE with byte order mark
    pub fn text_string(text: &str) -> Self {
        let mut bytes = vec![0xfe, 0xff];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::HexString(bytes)
    }

    /// Array of reals, e.g. a MediaBox or a dash pattern
    pub fn reals(values: &[f32]) -> Self {
        Object::Array(values.iter().map(|&v| Object::Real(v)).collect())
    }

    /// Serialize this object into `out`
    pub fn write(&self, out: &mut Vec<u8>) {
        match self {
            Object::Null => out.extend_from_slice(b"null"),
            Object::Integer(i) => out.extend_from_slice(i.to_string().as_bytes()),
            Object::Real(r) => out.extend_from_slice(format_real(*r).as_bytes()),
            Object::Name(name) => write_name(name, out),
            Object::String(bytes) => write_literal_string(bytes, out),
            Object::HexString(bytes) => {
                out.push(b'<');
                for b in bytes {
                    out.extend_from_slice(format!("{b:02X}").as_bytes());
                }
                out.push(b'>');
            }
            Object::Array(items) => {
                out.push(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(b' ');
                    }
                    item.write(out);
                }
                out.push(b']');
            }
            Object::Dictionary(dict) => dict.write(out),
            Object::Stream(dict, data) => {
                let dict = dict.clone().with("Length", data.len() as i64);
                dict.write(out);
                out.extend_from_slice(b"\nstream\n");
                out.extend_from_slice(data);
                out.extend_from_slice(b"\nendstream");
            }
            Object::Reference(ObjRef(id)) => {
                out.extend_from_slice(format!("{id} 0 R").as_bytes());
            }
        }
    }
}

impl From<i64> for Object {
    fn from(v: i64) -> Self {
        Object::Integer(v)
    }
}

impl From<f32> for Object {
    fn from(v: f32) -> Self {
        Object::Real(v)
    }
}

impl From<ObjRef> for Object {
    fn from(r: ObjRef) -> Self {
        Object::Reference(r)
    }
}

impl From<Dictionary> for Object {
    fn from(d: Dictionary) -> Self {
        Object::Dictionary(d)
    }
}

impl From<Vec<Object>> for Object {
    fn from(items: Vec<Object>) -> Self {
        Object::Array(items)
    }
}

/// Format a real number without exponent, at most 4 decimals
pub fn format_real(v: f32) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let s = format!("{v:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        _ => s.to_string(),
    }
}

fn write_name(name: &str, out: &mut Vec<u8>) {
    out.push(b'/');
    for &b in name.as_bytes() {
        let regular = b.is_ascii_graphic()
            && !matches!(
                b,
                b'#' | b'/' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'%'
            );
        if regular {
            out.push(b);
        } else {
            out.extend_from_slice(format!("#{b:02X}").as_bytes());
        }
    }
}

/// Literal string; delimiters are escaped and non-printable bytes written as octal
fn write_literal_string(bytes: &[u8], out: &mut Vec<u8>) {
    out.push(b'(');
    for &b in bytes {
        match b {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(b);
            }
            0x20..=0x7e => out.push(b),
            _ => out.extend_from_slice(format!("\\{b:03o}").as_bytes()),
        }
    }
    out.push(b')');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string(obj: &Object) -> String {
        let mut out = Vec::new();
        obj.write(&mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(1.0), "1");
        assert_eq!(format_real(0.5), "0.5");
        assert_eq!(format_real(-0.00001), "0");
        assert_eq!(format_real(595.44), "595.44");
        assert_eq!(format_real(1e7), "10000000");
        assert_eq!(format_real(f32::NAN), "0");
    }

    #[test]
    fn test_literal_string_escapes() {
        let obj = Object::String(b"a(b)c\\d\n\x8a".to_vec());
        assert_eq!(to_string(&obj), r"(a\(b\)c\\d\012\212)");
    }

    #[test]
    fn test_dictionary_with_replaces() {
        let dict = Dictionary::typed("Page")
            .with("Count", 1_i64)
            .with("Count", 2_i64);
        assert_eq!(dict.get("Count"), Some(&Object::Integer(2)));
        assert_eq!(to_string(&dict.into()), "<< /Type /Page /Count 2 >>");
    }

    #[test]
    fn test_stream_length() {
        let obj = Object::Stream(Dictionary::new(), b"0 0 m".to_vec());
        assert_eq!(to_string(&obj), "<< /Length 5 >>\nstream\n0 0 m\nendstream");
    }

    #[test]
    fn test_text_string_utf16() {
        let obj = Object::text_string("Až");
        assert_eq!(to_string(&obj), "<FEFF0041017E>");
    }

    #[test]
    fn test_name_escaping() {
        assert_eq!(to_string(&Object::name("A B")), "/A#20B");
        assert_eq!(
            to_string(&Object::Array(vec![ObjRef(3).into(), Object::Null])),
            "[3 0 R null]"
        );
    }
}
