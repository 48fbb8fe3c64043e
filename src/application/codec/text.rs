use std::str::SplitWhitespace;

use tracing::warn;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Color, TreeSnapshot, NIL_TOKEN};

use super::stream::{read_pre_order, walk_pre_order, Field, FieldSource};
use super::{parse_color, parse_kind, Format, TreeCodec};

/// `.txt`: kind tag on the first line, then a whitespace-separated
/// pre-order stream, e.g. `N\n5 B 3 R NIL NIL 8 R NIL NIL`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextCodec;

struct Tokens<'a>(SplitWhitespace<'a>);

impl FieldSource for Tokens<'_> {
    fn next_value(&mut self) -> ApplicationResult<Option<String>> {
        Ok(self.0.next().map(str::to_string))
    }

    fn next_color(&mut self) -> ApplicationResult<Color> {
        let token = self
            .0
            .next()
            .ok_or_else(|| ApplicationError::parse(Format::Text, "missing color after value"))?;
        parse_color(Format::Text, token)
    }
}

impl TreeCodec for TextCodec {
    fn format(&self) -> Format {
        Format::Text
    }

    fn encode(&self, snapshot: &TreeSnapshot) -> ApplicationResult<Vec<u8>> {
        let mut fields = Vec::with_capacity(snapshot.len() * 3 + 1);
        walk_pre_order(snapshot, |field| match field {
            Field::Node(node) => {
                fields.push(node.key.to_string());
                fields.push(node.color.as_char().to_string());
            }
            Field::Nil => fields.push(NIL_TOKEN.to_string()),
        });
        let out = format!("{}\n{}", snapshot.kind.tag(), fields.join(" "));
        Ok(out.into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> ApplicationResult<TreeSnapshot> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ApplicationError::parse(Format::Text, e.to_string()))?;
        let mut tokens = text.split_whitespace();
        let tag = tokens
            .next()
            .ok_or_else(|| ApplicationError::parse(Format::Text, "missing tree data type"))?;
        let kind = parse_kind(Format::Text, tag)?;

        let mut source = Tokens(tokens);
        let snapshot = read_pre_order(kind, &mut source)?;
        if source.0.next().is_some() {
            warn!("ignoring trailing data after the tree");
        }
        Ok(snapshot)
    }
}
