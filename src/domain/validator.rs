//! Red-black invariant checks.
//!
//! The four checks are independent; [`validate`] runs all of them and
//! collects every violation so the caller sees the full picture at once.

use std::fmt;

use crate::domain::node::{Color, NodeId};
use crate::domain::tree::RedBlackTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    RootNotBlack,
    NotBinarySearchTree,
    RedNodeWithRedChild,
    NotBlackBalanced,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Violation::RootNotBlack => "The root of the tree must be black!",
            Violation::NotBinarySearchTree => "The tree is not a valid binary search tree!",
            Violation::RedNodeWithRedChild => {
                "The colors of the tree nodes do not follow Red-black tree rules!"
            }
            Violation::NotBlackBalanced => "The tree is not black-balanced!",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// All violation messages, one per line.
    pub fn message(&self) -> String {
        self.violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Result of a black-height computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlackHeight {
    Balanced(usize),
    Unbalanced,
}

impl BlackHeight {
    pub fn height(self) -> Option<usize> {
        match self {
            BlackHeight::Balanced(h) => Some(h),
            BlackHeight::Unbalanced => None,
        }
    }
}

pub fn validate(tree: &RedBlackTree) -> ValidationReport {
    let mut violations = Vec::new();
    if !root_is_black(tree) {
        violations.push(Violation::RootNotBlack);
    }
    if !is_search_tree(tree) {
        violations.push(Violation::NotBinarySearchTree);
    }
    if !colors_valid(tree) {
        violations.push(Violation::RedNodeWithRedChild);
    }
    if !is_black_balanced(tree) {
        violations.push(Violation::NotBlackBalanced);
    }
    ValidationReport { violations }
}

/// An empty tree passes.
pub fn root_is_black(tree: &RedBlackTree) -> bool {
    tree.color_of(tree.root_raw()) == Color::Black
}

/// In-order keys must be strictly increasing.
pub fn is_search_tree(tree: &RedBlackTree) -> bool {
    let mut prev = None;
    for (_, node) in tree.iter() {
        let key = node.key();
        if prev.is_some() && key <= prev {
            return false;
        }
        prev = key;
    }
    true
}

/// No red node has a red child.
pub fn colors_valid(tree: &RedBlackTree) -> bool {
    tree.iter().all(|(id, node)| {
        node.color() == Color::Black
            || (tree.color_of(tree.left_of(id)) == Color::Black
                && tree.color_of(tree.right_of(id)) == Color::Black)
    })
}

pub fn is_black_balanced(tree: &RedBlackTree) -> bool {
    black_height(tree, tree.root_raw()) != BlackHeight::Unbalanced
}

/// Black nodes from `id` down to any sentinel, counting the sentinel and
/// excluding `id`. Stops at the first mismatch.
///
/// Walks an explicit post-order stack so imported degenerate chains cannot
/// exhaust the call stack.
pub fn black_height(tree: &RedBlackTree, id: NodeId) -> BlackHeight {
    enum Visit {
        Enter(NodeId),
        Exit(NodeId),
    }

    if tree.is_sentinel(id) {
        return BlackHeight::Balanced(0);
    }

    // Black height of each finished subtree as seen from its parent.
    let mut heights: Vec<usize> = Vec::new();
    let mut stack = vec![Visit::Enter(id)];

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(node) if tree.is_sentinel(node) => heights.push(1),
            Visit::Enter(node) => {
                stack.push(Visit::Exit(node));
                stack.push(Visit::Enter(tree.right_of(node)));
                stack.push(Visit::Enter(tree.left_of(node)));
            }
            Visit::Exit(node) => {
                let (Some(right), Some(left)) = (heights.pop(), heights.pop()) else {
                    return BlackHeight::Unbalanced;
                };
                if left != right {
                    return BlackHeight::Unbalanced;
                }
                if node == id {
                    return BlackHeight::Balanced(left);
                }
                heights.push(left + usize::from(tree.color_of(node) == Color::Black));
            }
        }
    }
    BlackHeight::Unbalanced
}
