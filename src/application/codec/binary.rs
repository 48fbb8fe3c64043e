use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Color, TreeSnapshot, NIL_TOKEN};

use super::stream::{read_pre_order, walk_pre_order, Field, FieldSource};
use super::{parse_color, parse_kind, Format, TreeCodec};

/// `.bin`/`.dat`: one kind-tag byte, then the pre-order stream as
/// length-prefixed fields (`u32` big-endian byte count + UTF-8). Each value
/// is followed by a single color byte.
#[derive(Debug, Default, Clone, Copy)]
pub struct BinaryCodec;

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn take(&mut self, n: usize) -> Option<&[u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.buf.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }
}

impl FieldSource for Cursor<'_> {
    fn next_value(&mut self) -> ApplicationResult<Option<String>> {
        let Some(len) = self.take(4) else {
            return Ok(None);
        };
        let len = u32::from_be_bytes([len[0], len[1], len[2], len[3]]) as usize;
        // a field cut short counts as end of input
        let Some(bytes) = self.take(len) else {
            return Ok(None);
        };
        String::from_utf8(bytes.to_vec())
            .map(Some)
            .map_err(|e| ApplicationError::parse(Format::Binary, e.to_string()))
    }

    fn next_color(&mut self) -> ApplicationResult<Color> {
        let byte = self
            .take(1)
            .ok_or_else(|| ApplicationError::parse(Format::Binary, "missing color after value"))?;
        parse_color(Format::Binary, &String::from_utf8_lossy(byte))
    }
}

fn push_field(out: &mut Vec<u8>, value: &str) {
    out.extend_from_slice(&(value.len() as u32).to_be_bytes());
    out.extend_from_slice(value.as_bytes());
}

impl TreeCodec for BinaryCodec {
    fn format(&self) -> Format {
        Format::Binary
    }

    fn encode(&self, snapshot: &TreeSnapshot) -> ApplicationResult<Vec<u8>> {
        let mut out = vec![snapshot.kind.tag() as u8];
        walk_pre_order(snapshot, |field| match field {
            Field::Node(node) => {
                push_field(&mut out, &node.key.to_string());
                out.push(node.color.as_char() as u8);
            }
            Field::Nil => push_field(&mut out, NIL_TOKEN),
        });
        Ok(out)
    }

    fn decode(&self, bytes: &[u8]) -> ApplicationResult<TreeSnapshot> {
        let (&tag, rest) = bytes
            .split_first()
            .ok_or_else(|| ApplicationError::parse(Format::Binary, "missing tree data type"))?;
        let kind = parse_kind(Format::Binary, &char::from(tag).to_string())?;
        read_pre_order(kind, &mut Cursor { buf: rest, pos: 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Key, KeyKind};

    fn stream(kind: u8, fields: &[(&str, Option<u8>)]) -> Vec<u8> {
        let mut out = vec![kind];
        for (value, color) in fields {
            push_field(&mut out, value);
            if let Some(c) = color {
                out.push(*c);
            }
        }
        out
    }

    #[test]
    fn given_length_prefixed_stream_when_decoding_then_builds_snapshot() {
        let bytes = stream(
            b'C',
            &[
                ("m", Some(b'B')),
                ("a", Some(b'R')),
                ("NIL", None),
                ("NIL", None),
                ("z", Some(b'R')),
            ],
        );
        let snap = BinaryCodec.decode(&bytes).unwrap();
        assert_eq!(snap.kind, KeyKind::Char);
        assert_eq!(snap.nodes.len(), 3);
        assert_eq!(snap.nodes[2].key, Key::Char('z'));
        assert_eq!(snap.nodes[0].right, Some(2));
    }

    #[test]
    fn given_snapshot_when_encoding_then_layout_is_tag_then_fields() {
        let snap = BinaryCodec
            .decode(&stream(b'N', &[("7", Some(b'B')), ("NIL", None), ("NIL", None)]))
            .unwrap();
        let out = BinaryCodec.encode(&snap).unwrap();
        assert_eq!(out[0], b'N');
        assert_eq!(&out[1..5], &1u32.to_be_bytes());
        assert_eq!(out[5], b'7');
        assert_eq!(out[6], b'B');
        assert_eq!(&out[7..11], &3u32.to_be_bytes());
        assert_eq!(&out[11..14], b"NIL");
        assert_eq!(out.len(), 21);
    }

    #[test]
    fn given_field_cut_short_when_decoding_then_treated_as_sentinel() {
        let mut bytes = stream(b'N', &[("7", Some(b'B'))]);
        bytes.extend_from_slice(&10u32.to_be_bytes());
        bytes.extend_from_slice(b"12");
        let snap = BinaryCodec.decode(&bytes).unwrap();
        assert_eq!(snap.nodes.len(), 1);
    }

    #[test]
    fn given_missing_color_when_decoding_then_parse_error() {
        let bytes = stream(b'N', &[("7", None)]);
        assert!(matches!(
            BinaryCodec.decode(&bytes),
            Err(ApplicationError::Parse { format: Format::Binary, .. })
        ));
    }

    #[test]
    fn given_empty_input_when_decoding_then_parse_error() {
        assert!(BinaryCodec.decode(&[]).is_err());
    }
}
