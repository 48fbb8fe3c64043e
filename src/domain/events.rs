//! Event sink contract: the ordered log of mutations a renderer replays.
//!
//! Every structural or color change made by the engine is reported here,
//! synchronously and in the exact order the links are rewritten. Consumers
//! must treat the stream as a log; reordering breaks the replay.
//!
//! Node references are `Option<NodeId>`: `None` stands for the sentinel
//! (a leaf, or the logical parent of the root).

use std::fmt;

use tracing::trace;

use crate::domain::key::Key;
use crate::domain::node::{Color, NodeId};

/// Why a node is highlighted during a descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// Visited on the search path.
    Path,
    /// Visited while searching the in-order successor.
    Successor,
    /// The node about to be deleted.
    Target,
    /// A successful lookup.
    Found,
}

/// The branch taken after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn is_left(self) -> bool {
        matches!(self, Direction::Left)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    NodeCreated {
        node: NodeId,
        key: Key,
        color: Color,
    },
    ColorChanged {
        node: NodeId,
        color: Color,
    },
    Highlighted {
        node: NodeId,
        highlight: Highlight,
        direction: Direction,
        context: Option<String>,
    },
    RotationStarted {
        x: NodeId,
        y: NodeId,
        x_is_left_child_of_y: bool,
        y_was_left_child_of_x: bool,
    },
    /// `child` now hangs in the `left_slot` side of `new_parent`, or became
    /// the root when `is_root` is set.
    LinkReplaced {
        child: NodeId,
        new_parent: Option<NodeId>,
        left_slot: bool,
        is_root: bool,
    },
    ParentChanged {
        node: Option<NodeId>,
        new_parent: Option<NodeId>,
    },
    LeftRotated {
        pivot: NodeId,
    },
    RightRotated {
        pivot: NodeId,
    },
    Transplanted {
        node: Option<NodeId>,
        new_parent: Option<NodeId>,
        left_slot: bool,
        is_root: bool,
    },
    SiblingChanged {
        node: NodeId,
        new_sibling: Option<NodeId>,
        left_slot: bool,
    },
    NodeDeleted {
        node: NodeId,
    },
    HeightChanged {
        height: usize,
    },
    NodeCountChanged {
        count: usize,
    },
    ValidationError {
        message: String,
    },
    /// The whole tree was swapped (import) or emptied (clear).
    TreeReplaced {
        node_count: usize,
    },
}

impl fmt::Display for TreeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn link(id: &Option<NodeId>) -> String {
            id.map_or_else(|| "NIL".to_string(), |id| id.to_string())
        }

        match self {
            TreeEvent::NodeCreated { node, key, color } => {
                write!(f, "create {node} key={key} color={color}")
            }
            TreeEvent::ColorChanged { node, color } => write!(f, "color {node} -> {color}"),
            TreeEvent::Highlighted {
                node,
                highlight,
                direction,
                context,
            } => write!(
                f,
                "highlight {node} {highlight:?} {direction:?} {}",
                context.as_deref().unwrap_or("-")
            ),
            TreeEvent::RotationStarted {
                x,
                y,
                x_is_left_child_of_y,
                y_was_left_child_of_x,
            } => write!(
                f,
                "rotation-start x={x} y={y} x_left_of_y={x_is_left_child_of_y} y_was_left={y_was_left_child_of_x}"
            ),
            TreeEvent::LinkReplaced {
                child,
                new_parent,
                left_slot,
                is_root,
            } => write!(
                f,
                "link {child} under {} left={left_slot} root={is_root}",
                link(new_parent)
            ),
            TreeEvent::ParentChanged { node, new_parent } => {
                write!(f, "parent {} -> {}", link(node), link(new_parent))
            }
            TreeEvent::LeftRotated { pivot } => write!(f, "left-rotated {pivot}"),
            TreeEvent::RightRotated { pivot } => write!(f, "right-rotated {pivot}"),
            TreeEvent::Transplanted {
                node,
                new_parent,
                left_slot,
                is_root,
            } => write!(
                f,
                "transplant {} under {} left={left_slot} root={is_root}",
                link(node),
                link(new_parent)
            ),
            TreeEvent::SiblingChanged {
                node,
                new_sibling,
                left_slot,
            } => write!(f, "sibling {node} <- {} left={left_slot}", link(new_sibling)),
            TreeEvent::NodeDeleted { node } => write!(f, "delete {node}"),
            TreeEvent::HeightChanged { height } => write!(f, "height {height}"),
            TreeEvent::NodeCountChanged { count } => write!(f, "count {count}"),
            TreeEvent::ValidationError { message } => {
                write!(f, "validation-error {}", message.replace('\n', " | "))
            }
            TreeEvent::TreeReplaced { node_count } => write!(f, "tree-replaced nodes={node_count}"),
        }
    }
}

/// Receiver of the ordered mutation log.
pub trait EventSink {
    fn emit(&mut self, event: TreeEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: TreeEvent) {}
}

impl EventSink for Vec<TreeEvent> {
    fn emit(&mut self, event: TreeEvent) {
        self.push(event);
    }
}

/// Keeps the log in memory; the caller drains it between operations.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<TreeEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TreeEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: TreeEvent) {
        self.events.push(event);
    }
}

/// Writes every event to the `rbtrace::events` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: TreeEvent) {
        trace!(target: "rbtrace::events", "{}", event);
    }
}
