//! File codecs
//!
//! Four formats share one logical schema: a key-kind tag plus the nodes of
//! a [`TreeSnapshot`]. Text and binary store a pre-order stream with `NIL`
//! markers; JSON and XML store an explicit node array with child indices.

mod binary;
mod json;
mod stream;
mod text;
mod xml;

use std::fmt;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Color, Key, KeyKind, TreeSnapshot};

pub use binary::BinaryCodec;
pub use json::JsonCodec;
pub use text::TextCodec;
pub use xml::XmlCodec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Text,
    Binary,
    Json,
    Xml,
}

impl Format {
    /// Pick the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> ApplicationResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("txt") => Ok(Format::Text),
            Some("bin") | Some("dat") => Ok(Format::Binary),
            Some("json") => Ok(Format::Json),
            Some("xml") => Ok(Format::Xml),
            _ => Err(ApplicationError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn codec(self) -> Box<dyn TreeCodec> {
        match self {
            Format::Text => Box::new(TextCodec),
            Format::Binary => Box::new(BinaryCodec),
            Format::Json => Box::new(JsonCodec),
            Format::Xml => Box::new(XmlCodec),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Text => "text",
            Format::Binary => "binary",
            Format::Json => "JSON",
            Format::Xml => "XML",
        };
        f.write_str(name)
    }
}

/// Encoder/decoder for one file format.
pub trait TreeCodec {
    fn format(&self) -> Format;

    /// Serialize a non-empty snapshot.
    fn encode(&self, snapshot: &TreeSnapshot) -> ApplicationResult<Vec<u8>>;

    /// Parse raw file content. Keys are bounds-checked; the index graph and
    /// the red-black rules are checked later, when the snapshot is linked.
    fn decode(&self, bytes: &[u8]) -> ApplicationResult<TreeSnapshot>;
}

// ============================================================
// Field helpers shared by every codec
// ============================================================

fn parse_kind(format: Format, raw: &str) -> ApplicationResult<KeyKind> {
    let raw = raw.trim();
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(tag), None) => KeyKind::from_tag(tag).ok_or_else(|| {
            ApplicationError::parse(
                format,
                format!("invalid tree data type '{}', expected N, T or C", raw),
            )
        }),
        _ => Err(ApplicationError::parse(
            format,
            format!("invalid tree data type '{}', expected N, T or C", raw),
        )),
    }
}

fn parse_color(format: Format, raw: &str) -> ApplicationResult<Color> {
    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Color::from_char(c),
        _ => None,
    }
    .ok_or_else(|| {
        ApplicationError::parse(format, format!("invalid color '{}', expected R or B", raw))
    })
}

fn parse_key(kind: KeyKind, raw: &str) -> ApplicationResult<Key> {
    Ok(Key::parse(kind, raw)?)
}
