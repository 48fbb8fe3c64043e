//! Pre-order stream shared by the text and binary formats.
//!
//! A node is written as `value color`, followed by its left and right
//! subtrees; a sentinel is the single field `NIL`. Reading stops filling
//! slots at end of input: every slot left open becomes a sentinel.

use crate::application::ApplicationResult;
use crate::domain::{Color, KeyKind, SnapshotNode, TreeSnapshot, NIL_TOKEN};

use super::parse_key;

/// One field of the stream as seen by a writer.
pub(crate) enum Field<'a> {
    Node(&'a SnapshotNode),
    Nil,
}

/// Source of raw stream fields.
pub(crate) trait FieldSource {
    /// Next value field, `None` at end of input.
    fn next_value(&mut self) -> ApplicationResult<Option<String>>;

    /// Color field that follows a value.
    fn next_color(&mut self) -> ApplicationResult<Color>;
}

#[derive(Clone, Copy)]
enum Slot {
    Root,
    Left(usize),
    Right(usize),
}

pub(crate) fn read_pre_order(
    kind: KeyKind,
    source: &mut dyn FieldSource,
) -> ApplicationResult<TreeSnapshot> {
    let mut snapshot = TreeSnapshot::new(kind);
    let mut pending = vec![Slot::Root];

    while let Some(slot) = pending.pop() {
        let value = match source.next_value()? {
            Some(v) if v != NIL_TOKEN => v,
            _ => continue,
        };
        let key = parse_key(kind, &value)?;
        let color = source.next_color()?;

        let index = snapshot.nodes.len();
        snapshot.nodes.push(SnapshotNode::leaf(key, color));
        match slot {
            Slot::Root => {}
            Slot::Left(parent) => snapshot.nodes[parent].left = Some(index),
            Slot::Right(parent) => snapshot.nodes[parent].right = Some(index),
        }
        pending.push(Slot::Right(index));
        pending.push(Slot::Left(index));
    }

    Ok(snapshot)
}

/// Visit the snapshot in pre-order, reporting sentinels where a child is
/// missing.
pub(crate) fn walk_pre_order(snapshot: &TreeSnapshot, mut visit: impl FnMut(Field<'_>)) {
    let mut stack = vec![(!snapshot.is_empty()).then_some(0)];
    while let Some(entry) = stack.pop() {
        match entry.and_then(|i| snapshot.nodes.get(i)) {
            Some(node) => {
                visit(Field::Node(node));
                stack.push(node.right);
                stack.push(node.left);
            }
            None => visit(Field::Nil),
        }
    }
}
