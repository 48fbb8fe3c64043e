//! Format-neutral tree snapshot.
//!
//! Every codec reads into and writes from a [`TreeSnapshot`]: a flat list of
//! nodes addressed by index, with the root at index 0. Building a tree from a
//! snapshot checks the index graph (range, sharing, reachability) but not the
//! red-black rules; that is the validator's job.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::key::{Key, KeyKind};
use crate::domain::node::{Color, NodeId};
use crate::domain::tree::RedBlackTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotNode {
    pub key: Key,
    pub color: Color,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl SnapshotNode {
    pub fn leaf(key: Key, color: Color) -> Self {
        Self {
            key,
            color,
            left: None,
            right: None,
        }
    }
}

/// Node numbering used when capturing a live tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    PreOrder,
    LevelOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSnapshot {
    pub kind: KeyKind,
    pub nodes: Vec<SnapshotNode>,
}

impl TreeSnapshot {
    pub fn new(kind: KeyKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number the live nodes of `tree` in the given order.
    pub fn capture(tree: &RedBlackTree, order: Traversal) -> Self {
        let ids = match order {
            Traversal::PreOrder => tree.pre_order(),
            Traversal::LevelOrder => tree.level_order(),
        };
        let index: HashMap<NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let nodes = ids
            .iter()
            .filter_map(|id| {
                let node = tree.node(*id)?;
                Some(SnapshotNode {
                    key: node.key()?.clone(),
                    color: node.color(),
                    left: tree.left(*id).and_then(|l| index.get(&l).copied()),
                    right: tree.right(*id).and_then(|r| index.get(&r).copied()),
                })
            })
            .collect();

        Self {
            kind: tree.kind(),
            nodes,
        }
    }

    /// Check the index graph: every child index in `[1, n)`, no node
    /// referenced twice, every node reachable from index 0.
    pub fn check_links(&self) -> DomainResult<()> {
        let n = self.nodes.len();
        if n == 0 {
            return Ok(());
        }

        for node in &self.nodes {
            if node.key.kind() != self.kind {
                return Err(DomainError::KeyKindMismatch {
                    expected: self.kind,
                    found: node.key.kind(),
                });
            }
            for child in [node.left, node.right].into_iter().flatten() {
                if child == 0 {
                    return Err(DomainError::InvalidIndex {
                        index: 0,
                        reason: "the root cannot be a child".into(),
                    });
                }
                if child >= n {
                    return Err(DomainError::InvalidIndex {
                        index: child as i64,
                        reason: format!("out of range for {} nodes", n),
                    });
                }
            }
        }

        let mut seen = vec![false; n];
        seen[0] = true;
        let mut stack = vec![0usize];
        while let Some(i) = stack.pop() {
            let node = &self.nodes[i];
            for child in [node.left, node.right].into_iter().flatten() {
                if seen[child] {
                    return Err(DomainError::CycleDetected(child));
                }
                seen[child] = true;
                stack.push(child);
            }
        }

        match seen.iter().position(|s| !s) {
            Some(orphan) => Err(DomainError::UnreachableNode(orphan)),
            None => Ok(()),
        }
    }

    /// Link the snapshot into a fresh tree. Red-black rules are not checked.
    #[instrument(level = "debug", skip(self), fields(nodes = self.nodes.len()))]
    pub fn into_tree(self) -> DomainResult<RedBlackTree> {
        self.check_links()?;
        let links: Vec<_> = self.nodes.iter().map(|n| (n.left, n.right)).collect();
        let nodes = self.nodes.into_iter().map(|n| (n.key, n.color)).collect();
        let tree = RedBlackTree::from_linked(self.kind, nodes, &links);
        debug!(height = tree.height(), "snapshot linked");
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::NullSink;

    fn node(v: i16, color: Color, left: Option<usize>, right: Option<usize>) -> SnapshotNode {
        SnapshotNode {
            key: Key::Integer(v),
            color,
            left,
            right,
        }
    }

    fn snapshot(nodes: Vec<SnapshotNode>) -> TreeSnapshot {
        TreeSnapshot {
            kind: KeyKind::Number,
            nodes,
        }
    }

    #[test]
    fn given_pre_order_indices_when_linking_then_builds_tree() {
        let snap = snapshot(vec![
            node(5, Color::Black, Some(1), Some(2)),
            node(3, Color::Red, None, None),
            node(8, Color::Red, None, None),
        ]);
        let tree = snap.into_tree().unwrap();
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.height(), 2);
        assert_eq!(
            tree.keys(),
            vec![Key::Integer(3), Key::Integer(5), Key::Integer(8)]
        );
    }

    #[test]
    fn given_backward_index_when_checking_then_root_reference_rejected() {
        let snap = snapshot(vec![
            node(5, Color::Black, Some(1), None),
            node(3, Color::Red, Some(0), None),
        ]);
        assert!(matches!(
            snap.check_links(),
            Err(DomainError::InvalidIndex { index: 0, .. })
        ));
    }

    #[test]
    fn given_shared_child_when_checking_then_cycle_detected() {
        let snap = snapshot(vec![
            node(5, Color::Black, Some(1), Some(1)),
            node(3, Color::Red, None, None),
        ]);
        assert_eq!(snap.check_links(), Err(DomainError::CycleDetected(1)));
    }

    #[test]
    fn given_out_of_range_index_when_checking_then_rejected() {
        let snap = snapshot(vec![node(5, Color::Black, None, Some(4))]);
        assert!(matches!(
            snap.check_links(),
            Err(DomainError::InvalidIndex { index: 4, .. })
        ));
    }

    #[test]
    fn given_orphan_node_when_checking_then_unreachable() {
        let snap = snapshot(vec![
            node(5, Color::Black, None, None),
            node(3, Color::Red, None, None),
        ]);
        assert_eq!(snap.check_links(), Err(DomainError::UnreachableNode(1)));
    }

    #[test]
    fn given_live_tree_when_capturing_level_order_then_root_first_then_levels() {
        let mut tree = RedBlackTree::new(KeyKind::Number);
        for v in [1, 2, 3, 4] {
            tree.insert(Key::Integer(v), &mut NullSink).unwrap();
        }
        let snap = TreeSnapshot::capture(&tree, Traversal::LevelOrder);
        let keys: Vec<_> = snap.nodes.iter().map(|n| n.key.clone()).collect();
        assert_eq!(
            keys,
            vec![Key::Integer(2), Key::Integer(1), Key::Integer(3), Key::Integer(4)]
        );
        assert_eq!(snap.nodes[0].left, Some(1));
        assert_eq!(snap.nodes[2].right, Some(3));
        let rebuilt = snap.into_tree().unwrap();
        assert_eq!(rebuilt.keys(), tree.keys());
    }
}
