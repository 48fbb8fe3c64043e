//! Node and sentinel model for the arena-backed tree.

use std::fmt;

use generational_arena::Index;

use crate::domain::key::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// Single-character form used by every file format.
    pub fn as_char(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Black => 'B',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'R' => Some(Color::Red),
            'B' => Some(Color::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Handle to a node slot in the tree arena.
///
/// Handles are generational: a handle to a deleted node never aliases a
/// node created later in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}.{}", slot, generation)
    }
}

/// Tree node in the arena.
///
/// `left`/`right` own their subtree; `parent` is a plain back-reference used
/// for traversal only. The sentinel is stored in the same arena with no key.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) key: Option<Key>,
    pub(crate) color: Color,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
    pub(crate) parent: NodeId,
}

impl Node {
    pub(crate) fn new(key: Key, color: Color, nil: NodeId) -> Self {
        Self {
            key: Some(key),
            color,
            left: nil,
            right: nil,
            parent: nil,
        }
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn color(&self) -> Color {
        self.color
    }
}
