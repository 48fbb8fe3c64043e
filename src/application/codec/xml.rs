use quick_xml::de::from_str;
use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DomainError, SnapshotNode, TreeSnapshot, NIL_TOKEN};

use super::{parse_color, parse_key, parse_kind, Format, TreeCodec};

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// `.xml`: `<treeData><dataType/><nodes><node>...</node></nodes></treeData>`.
/// Every `<node>` carries all four child elements; `left`/`right` hold a
/// node index, or `NIL` (any case) or nothing for a sentinel child.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlCodec;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "treeData")]
struct XmlTree {
    #[serde(rename = "dataType")]
    data_type: String,
    nodes: XmlNodes,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlNodes {
    #[serde(rename = "node", default)]
    node: Vec<XmlNode>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlNode {
    value: String,
    color: String,
    left: String,
    right: String,
}

fn link_text(index: Option<usize>) -> String {
    index.map_or_else(|| NIL_TOKEN.to_string(), |i| i.to_string())
}

fn parse_link(raw: &str, side: &str) -> ApplicationResult<Option<usize>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case(NIL_TOKEN) {
        return Ok(None);
    }
    match raw.parse::<i64>() {
        Ok(i) => usize::try_from(i).map(Some).map_err(|_| {
            DomainError::InvalidIndex {
                index: i,
                reason: "negative index".into(),
            }
            .into()
        }),
        Err(_) => Err(ApplicationError::parse(
            Format::Xml,
            format!("invalid {} node index '{}'", side, raw),
        )),
    }
}

impl TreeCodec for XmlCodec {
    fn format(&self) -> Format {
        Format::Xml
    }

    /// Nodes are expected in level order (see `Traversal::LevelOrder`).
    fn encode(&self, snapshot: &TreeSnapshot) -> ApplicationResult<Vec<u8>> {
        let doc = XmlTree {
            data_type: snapshot.kind.tag().to_string(),
            nodes: XmlNodes {
                node: snapshot
                    .nodes
                    .iter()
                    .map(|n| XmlNode {
                        value: n.key.to_string(),
                        color: n.color.as_char().to_string(),
                        left: link_text(n.left),
                        right: link_text(n.right),
                    })
                    .collect(),
            },
        };

        let mut body = String::new();
        let mut ser = Serializer::new(&mut body);
        ser.indent(' ', 4);
        doc.serialize(ser)
            .map_err(|e| ApplicationError::parse(Format::Xml, e.to_string()))?;
        Ok(format!("{}\n{}\n", DECLARATION, body).into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> ApplicationResult<TreeSnapshot> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ApplicationError::parse(Format::Xml, e.to_string()))?;
        let doc: XmlTree =
            from_str(text).map_err(|e| ApplicationError::parse(Format::Xml, e.to_string()))?;
        let kind = parse_kind(Format::Xml, &doc.data_type)?;

        let nodes = doc
            .nodes
            .node
            .iter()
            .map(|n| {
                Ok(SnapshotNode {
                    key: parse_key(kind, n.value.trim())?,
                    color: parse_color(Format::Xml, &n.color)?,
                    left: parse_link(&n.left, "left")?,
                    right: parse_link(&n.right, "right")?,
                })
            })
            .collect::<ApplicationResult<Vec<_>>>()?;

        Ok(TreeSnapshot { kind, nodes })
    }
}
