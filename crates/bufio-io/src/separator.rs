//! Line-splitting policies for `BufferedStream::read_line_with`.

/// How a line read decides where a record ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Separator {
    /// No separator: the rest of the stream is one record.
    None,
    /// Records end at a blank line (two consecutive record separators).
    Paragraph,
    /// Records end right after this (non-empty) byte sequence.
    Bytes(Vec<u8>),
}

impl Separator {
    /// Build from raw bytes; an empty sequence selects paragraph mode.
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            Separator::Paragraph
        } else {
            Separator::Bytes(bytes.to_vec())
        }
    }
}

impl From<&str> for Separator {
    fn from(s: &str) -> Self {
        Separator::new(s)
    }
}

impl From<&[u8]> for Separator {
    fn from(b: &[u8]) -> Self {
        Separator::new(b)
    }
}

impl From<Option<&str>> for Separator {
    fn from(s: Option<&str>) -> Self {
        s.map_or(Separator::None, |s| Separator::new(s))
    }
}
