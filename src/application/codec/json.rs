use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DomainError, Key, KeyKind, SnapshotNode, TreeSnapshot};

use super::{parse_color, parse_key, parse_kind, Format, TreeCodec};

/// `.json`: `{"dataType": "N", "tree": [{"value", "color", "left", "right"}, ...]}`
/// with `null` for a sentinel child and index 0 as the root.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonTree {
    data_type: String,
    tree: Vec<JsonNode>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonNode {
    value: JsonValue,
    color: String,
    #[serde(deserialize_with = "Option::deserialize")]
    left: Option<i64>,
    #[serde(deserialize_with = "Option::deserialize")]
    right: Option<i64>,
}

/// Numbers are written as JSON numbers, text and chars as strings.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum JsonValue {
    Number(i64),
    Text(String),
}

impl JsonValue {
    fn from_key(key: &Key) -> Self {
        match key {
            Key::Integer(v) => JsonValue::Number(i64::from(*v)),
            other => JsonValue::Text(other.to_string()),
        }
    }

    fn to_key(&self, kind: KeyKind) -> ApplicationResult<Key> {
        match self {
            JsonValue::Number(v) => parse_key(kind, &v.to_string()),
            JsonValue::Text(v) => parse_key(kind, v),
        }
    }
}

fn index(raw: Option<i64>) -> ApplicationResult<Option<usize>> {
    raw.map(|i| {
        usize::try_from(i).map_err(|_| {
            ApplicationError::from(DomainError::InvalidIndex {
                index: i,
                reason: "negative index".into(),
            })
        })
    })
    .transpose()
}

impl TreeCodec for JsonCodec {
    fn format(&self) -> Format {
        Format::Json
    }

    fn encode(&self, snapshot: &TreeSnapshot) -> ApplicationResult<Vec<u8>> {
        let doc = JsonTree {
            data_type: snapshot.kind.tag().to_string(),
            tree: snapshot
                .nodes
                .iter()
                .map(|n| JsonNode {
                    value: JsonValue::from_key(&n.key),
                    color: n.color.as_char().to_string(),
                    left: n.left.map(|i| i as i64),
                    right: n.right.map(|i| i as i64),
                })
                .collect(),
        };
        serde_json::to_vec_pretty(&doc).map_err(|e| ApplicationError::parse(Format::Json, e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> ApplicationResult<TreeSnapshot> {
        let doc: JsonTree = serde_json::from_slice(bytes)
            .map_err(|e| ApplicationError::parse(Format::Json, e.to_string()))?;
        let kind = parse_kind(Format::Json, &doc.data_type)?;

        let nodes = doc
            .tree
            .iter()
            .map(|n| {
                Ok(SnapshotNode {
                    key: n.value.to_key(kind)?,
                    color: parse_color(Format::Json, &n.color)?,
                    left: index(n.left)?,
                    right: index(n.right)?,
                })
            })
            .collect::<ApplicationResult<Vec<_>>>()?;

        Ok(TreeSnapshot { kind, nodes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Color;

    const SAMPLE: &str = r#"{
        "dataType": "N",
        "tree": [
            {"value": 5, "color": "B", "left": 1, "right": 2},
            {"value": 3, "color": "R", "left": null, "right": null},
            {"value": "8", "color": "R", "left": null, "right": null}
        ]
    }"#;

    #[test]
    fn given_node_array_when_decoding_then_keeps_indices() {
        let snap = JsonCodec.decode(SAMPLE.as_bytes()).unwrap();
        assert_eq!(snap.kind, KeyKind::Number);
        assert_eq!(snap.nodes[0].left, Some(1));
        assert_eq!(snap.nodes[2].key, Key::Integer(8));
        assert_eq!(snap.nodes[1].color, Color::Red);
    }

    #[test]
    fn given_snapshot_when_encoding_then_numbers_stay_numbers_and_nil_is_null() {
        let snap = JsonCodec.decode(SAMPLE.as_bytes()).unwrap();
        let out = JsonCodec.encode(&snap).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["dataType"], "N");
        assert_eq!(value["tree"][0]["value"], 5);
        assert!(value["tree"][1]["left"].is_null());
    }

    #[test]
    fn given_missing_child_field_when_decoding_then_parse_error() {
        let raw = r#"{"dataType":"N","tree":[{"value":1,"color":"B","left":null}]}"#;
        assert!(matches!(
            JsonCodec.decode(raw.as_bytes()),
            Err(ApplicationError::Parse { format: Format::Json, .. })
        ));
    }

    #[test]
    fn given_negative_index_when_decoding_then_invalid_index() {
        let raw = r#"{"dataType":"N","tree":[{"value":1,"color":"B","left":-1,"right":null}]}"#;
        assert!(matches!(
            JsonCodec.decode(raw.as_bytes()),
            Err(ApplicationError::Domain(DomainError::InvalidIndex { index: -1, .. }))
        ));
    }

    #[test]
    fn given_text_kind_when_round_tripping_then_values_are_strings() {
        let raw = r#"{"dataType":"t","tree":[{"value":"abc","color":"B","left":null,"right":null}]}"#;
        let snap = JsonCodec.decode(raw.as_bytes()).unwrap();
        assert_eq!(snap.nodes[0].key, Key::Text("abc".into()));
        let value: serde_json::Value =
            serde_json::from_slice(&JsonCodec.encode(&snap).unwrap()).unwrap();
        assert_eq!(value["dataType"], "T");
        assert_eq!(value["tree"][0]["value"], "abc");
    }
}
