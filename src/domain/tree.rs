//! Red-black tree engine.
//!
//! Nodes live in a generational arena. A single sentinel node, allocated
//! first and never removed, stands in for every leaf and for the parent of
//! the root, so every link is a plain [`NodeId`]. Rotations, transplant and
//! the two fixup loops are the only code that rewrites links, and each link
//! rewrite is reported to the [`EventSink`] immediately before it happens.

use generational_arena::Arena;
use tracing::{debug, instrument, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::events::{Direction, EventSink, Highlight, TreeEvent};
use crate::domain::key::{Key, KeyKind};
use crate::domain::node::{Color, Node, NodeId};
use crate::domain::validator;

#[derive(Debug, Clone)]
pub struct RedBlackTree {
    arena: Arena<Node>,
    nil: NodeId,
    root: NodeId,
    kind: KeyKind,
    height: usize,
    node_count: usize,
}

impl Default for RedBlackTree {
    fn default() -> Self {
        Self::new(KeyKind::default())
    }
}

impl RedBlackTree {
    pub fn new(kind: KeyKind) -> Self {
        let mut arena = Arena::new();
        let nil = NodeId(arena.insert_with(|idx| {
            let me = NodeId(idx);
            Node {
                key: None,
                color: Color::Black,
                left: me,
                right: me,
                parent: me,
            }
        }));
        Self {
            arena,
            nil,
            root: nil,
            kind,
            height: 0,
            node_count: 0,
        }
    }

    // ============================================================
    // Read-only accessors
    // ============================================================

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Change the key kind. Only allowed while the tree is empty.
    pub fn set_kind(&mut self, kind: KeyKind) -> DomainResult<()> {
        if !self.is_empty() && kind != self.kind {
            return Err(DomainError::KeyKindLocked);
        }
        self.kind = kind;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.root == self.nil
    }

    /// Cached height (nodes on the longest root-to-leaf path).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cached number of non-sentinel nodes.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn root(&self) -> Option<NodeId> {
        self.link(self.root)
    }

    pub fn is_sentinel(&self, id: NodeId) -> bool {
        id == self.nil
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        if id == self.nil {
            return None;
        }
        self.arena.get(id.0)
    }

    pub fn key(&self, id: NodeId) -> Option<&Key> {
        self.node(id).and_then(Node::key)
    }

    pub fn color(&self, id: NodeId) -> Option<Color> {
        self.node(id).map(Node::color)
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| self.link(n.left))
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| self.link(n.right))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| self.link(n.parent))
    }

    /// Black nodes on any path from `id` down to a sentinel, excluding `id`
    /// itself. `None` when the subtree is not black-balanced.
    pub fn black_height(&self, id: NodeId) -> Option<usize> {
        validator::black_height(self, id).height()
    }

    /// In-order (sorted) traversal of the live nodes.
    pub fn iter(&self) -> InOrderIter<'_> {
        InOrderIter::new(self)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<Key> {
        self.iter().filter_map(|(_, node)| node.key.clone()).collect()
    }

    /// Node ids in pre-order (node, left subtree, right subtree).
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.node_count);
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if id == self.nil {
                continue;
            }
            order.push(id);
            stack.push(self.right_of(id));
            stack.push(self.left_of(id));
        }
        order
    }

    /// Node ids in level order (breadth first, left to right).
    pub fn level_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.node_count);
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(self.root);
        while let Some(id) = queue.pop_front() {
            if id == self.nil {
                continue;
            }
            order.push(id);
            queue.push_back(self.left_of(id));
            queue.push_back(self.right_of(id));
        }
        order
    }

    /// Silent lookup: no events.
    pub fn contains(&self, key: &Key) -> bool {
        let mut x = self.root;
        while let Some(current) = self.key_at(x) {
            if current == key {
                return true;
            }
            x = if key < current {
                self.left_of(x)
            } else {
                self.right_of(x)
            };
        }
        false
    }

    /// Depth a key would occupy if inserted now (the root is depth 1).
    pub fn insertion_depth(&self, key: &Key) -> usize {
        let mut depth = 0;
        let mut x = self.root;
        while let Some(current) = self.key_at(x) {
            x = if key < current {
                self.left_of(x)
            } else {
                self.right_of(x)
            };
            depth += 1;
        }
        depth + 1
    }

    // ============================================================
    // Public operations
    // ============================================================

    /// Insert a key as a red leaf and rebalance.
    #[instrument(level = "debug", skip_all, fields(key = %key))]
    pub fn insert(&mut self, key: Key, sink: &mut dyn EventSink) -> DomainResult<NodeId> {
        self.check_kind(&key)?;
        if self.contains(&key) {
            return Err(DomainError::DuplicateKey(key.to_string()));
        }

        let context = key.to_string();
        let z = NodeId(
            self.arena
                .insert(Node::new(key.clone(), Color::Red, self.nil)),
        );
        sink.emit(TreeEvent::NodeCreated {
            node: z,
            key: key.clone(),
            color: Color::Red,
        });

        let mut y = self.nil;
        let mut x = self.root;
        let mut go_left = true;
        while let Some(current) = self.key_at(x) {
            y = x;
            go_left = key < *current;
            let direction = if go_left {
                Direction::Left
            } else {
                Direction::Right
            };
            sink.emit(TreeEvent::Highlighted {
                node: x,
                highlight: Highlight::Path,
                direction,
                context: Some(context.clone()),
            });
            x = if go_left {
                self.left_of(x)
            } else {
                self.right_of(x)
            };
        }

        self.node_mut(z).parent = y;
        if y == self.nil {
            sink.emit(TreeEvent::LinkReplaced {
                child: z,
                new_parent: None,
                left_slot: true,
                is_root: true,
            });
            self.root = z;
        } else {
            sink.emit(TreeEvent::LinkReplaced {
                child: z,
                new_parent: Some(y),
                left_slot: go_left,
                is_root: false,
            });
            if go_left {
                self.node_mut(y).left = z;
            } else {
                self.node_mut(y).right = z;
            }
        }

        self.insert_fixup(z, sink);
        self.refresh_metrics(sink);
        debug!(height = self.height, count = self.node_count, "inserted");
        Ok(z)
    }

    /// Delete the node holding `key`. Returns `false`, with the tree
    /// unchanged, when the key is absent.
    #[instrument(level = "debug", skip_all, fields(key = %key))]
    pub fn delete(&mut self, key: &Key, sink: &mut dyn EventSink) -> bool {
        if key.kind() != self.kind {
            return false;
        }

        let context = key.to_string();
        let mut z = self.nil;
        let mut node = self.root;
        while let Some(current) = self.key_at(node) {
            if current == key {
                z = node;
            }
            let go_right = current <= key;
            sink.emit(TreeEvent::Highlighted {
                node,
                highlight: Highlight::Path,
                direction: if go_right {
                    Direction::Right
                } else {
                    Direction::Left
                },
                context: Some(context.clone()),
            });
            node = if go_right {
                self.right_of(node)
            } else {
                self.left_of(node)
            };
        }

        if z == self.nil {
            debug!("key not found");
            return false;
        }
        sink.emit(TreeEvent::Highlighted {
            node: z,
            highlight: Highlight::Target,
            direction: Direction::Left,
            context: None,
        });

        let mut y = z;
        let mut y_original_color = self.color_of(y);
        let x;

        if self.left_of(z) == self.nil {
            x = self.right_of(z);
            self.transplant(z, x, sink);
        } else if self.right_of(z) == self.nil {
            x = self.left_of(z);
            self.transplant(z, x, sink);
        } else {
            let z_right = self.right_of(z);
            y = self.minimum(z_right, sink);
            y_original_color = self.color_of(y);
            x = self.right_of(y);

            if y != z_right {
                self.transplant(y, x, sink);
                sink.emit(TreeEvent::SiblingChanged {
                    node: y,
                    new_sibling: self.link(z_right),
                    left_slot: false,
                });
                sink.emit(TreeEvent::ParentChanged {
                    node: self.link(z_right),
                    new_parent: Some(y),
                });
                self.node_mut(y).right = z_right;
                self.node_mut(z_right).parent = y;
            } else {
                // x may be the sentinel: its parent marks where the fixup starts
                sink.emit(TreeEvent::ParentChanged {
                    node: self.link(x),
                    new_parent: Some(y),
                });
                self.node_mut(x).parent = y;
            }

            self.transplant(z, y, sink);

            let z_left = self.left_of(z);
            let z_color = self.color_of(z);
            sink.emit(TreeEvent::SiblingChanged {
                node: y,
                new_sibling: self.link(z_left),
                left_slot: true,
            });
            sink.emit(TreeEvent::ParentChanged {
                node: self.link(z_left),
                new_parent: Some(y),
            });
            sink.emit(TreeEvent::ColorChanged {
                node: y,
                color: z_color,
            });
            self.node_mut(y).left = z_left;
            self.node_mut(z_left).parent = y;
            self.node_mut(y).color = z_color;
        }

        sink.emit(TreeEvent::NodeDeleted { node: z });
        self.arena.remove(z.0);

        if y_original_color == Color::Black {
            self.delete_fixup(x, sink);
        }

        let nil = self.nil;
        self.node_mut(nil).parent = nil;
        self.refresh_metrics(sink);
        debug!(height = self.height, count = self.node_count, "deleted");
        true
    }

    /// Pure lookup with a highlight per visited node.
    #[instrument(level = "debug", skip_all, fields(key = %key))]
    pub fn find(&self, key: &Key, sink: &mut dyn EventSink) -> bool {
        let context = key.to_string();
        let mut node = self.root;
        while let Some(current) = self.key_at(node) {
            if current == key {
                sink.emit(TreeEvent::Highlighted {
                    node,
                    highlight: Highlight::Found,
                    direction: Direction::Left,
                    context: None,
                });
                return true;
            }
            let go_right = current < key;
            sink.emit(TreeEvent::Highlighted {
                node,
                highlight: Highlight::Path,
                direction: if go_right {
                    Direction::Right
                } else {
                    Direction::Left
                },
                context: Some(context.clone()),
            });
            node = if go_right {
                self.right_of(node)
            } else {
                self.left_of(node)
            };
        }
        false
    }

    /// Drop every node and unlock the key kind.
    pub fn clear(&mut self, sink: &mut dyn EventSink) {
        let kind = self.kind;
        *self = Self::new(kind);
        sink.emit(TreeEvent::TreeReplaced { node_count: 0 });
        sink.emit(TreeEvent::HeightChanged { height: 0 });
        sink.emit(TreeEvent::NodeCountChanged { count: 0 });
    }

    /// Recompute the cached height and node count and report both.
    pub fn refresh_metrics(&mut self, sink: &mut dyn EventSink) {
        self.recompute_metrics();
        sink.emit(TreeEvent::HeightChanged {
            height: self.height,
        });
        sink.emit(TreeEvent::NodeCountChanged {
            count: self.node_count,
        });
    }

    // ============================================================
    // Rotation primitives
    // ============================================================

    fn left_rotate(&mut self, x: NodeId, sink: &mut dyn EventSink) {
        let y = self.right_of(x);
        debug_assert!(y != self.nil, "left rotation needs a right child");
        trace!(%x, %y, "left rotate");

        sink.emit(TreeEvent::RotationStarted {
            x,
            y,
            x_is_left_child_of_y: true,
            y_was_left_child_of_x: false,
        });

        let y_left = self.left_of(y);
        self.node_mut(x).right = y_left;
        if y_left != self.nil {
            sink.emit(TreeEvent::ParentChanged {
                node: Some(y_left),
                new_parent: Some(x),
            });
            self.node_mut(y_left).parent = x;
        }

        let xp = self.parent_of(x);
        sink.emit(TreeEvent::ParentChanged {
            node: Some(y),
            new_parent: self.link(xp),
        });
        self.node_mut(y).parent = xp;

        if xp == self.nil {
            sink.emit(TreeEvent::LinkReplaced {
                child: y,
                new_parent: None,
                left_slot: true,
                is_root: true,
            });
            self.root = y;
        } else if x == self.left_of(xp) {
            sink.emit(TreeEvent::LinkReplaced {
                child: y,
                new_parent: Some(xp),
                left_slot: true,
                is_root: false,
            });
            self.node_mut(xp).left = y;
        } else {
            sink.emit(TreeEvent::LinkReplaced {
                child: y,
                new_parent: Some(xp),
                left_slot: false,
                is_root: false,
            });
            self.node_mut(xp).right = y;
        }

        sink.emit(TreeEvent::LinkReplaced {
            child: x,
            new_parent: Some(y),
            left_slot: true,
            is_root: false,
        });
        sink.emit(TreeEvent::ParentChanged {
            node: Some(x),
            new_parent: Some(y),
        });
        self.node_mut(y).left = x;
        self.node_mut(x).parent = y;

        sink.emit(TreeEvent::LeftRotated { pivot: x });
    }

    fn right_rotate(&mut self, x: NodeId, sink: &mut dyn EventSink) {
        let y = self.left_of(x);
        debug_assert!(y != self.nil, "right rotation needs a left child");
        trace!(%x, %y, "right rotate");

        sink.emit(TreeEvent::RotationStarted {
            x,
            y,
            x_is_left_child_of_y: false,
            y_was_left_child_of_x: true,
        });

        let y_right = self.right_of(y);
        self.node_mut(x).left = y_right;
        if y_right != self.nil {
            sink.emit(TreeEvent::ParentChanged {
                node: Some(y_right),
                new_parent: Some(x),
            });
            self.node_mut(y_right).parent = x;
        }

        let xp = self.parent_of(x);
        sink.emit(TreeEvent::ParentChanged {
            node: Some(y),
            new_parent: self.link(xp),
        });
        self.node_mut(y).parent = xp;

        if xp == self.nil {
            sink.emit(TreeEvent::LinkReplaced {
                child: y,
                new_parent: None,
                left_slot: true,
                is_root: true,
            });
            self.root = y;
        } else if x == self.left_of(xp) {
            sink.emit(TreeEvent::LinkReplaced {
                child: y,
                new_parent: Some(xp),
                left_slot: true,
                is_root: false,
            });
            self.node_mut(xp).left = y;
        } else {
            sink.emit(TreeEvent::LinkReplaced {
                child: y,
                new_parent: Some(xp),
                left_slot: false,
                is_root: false,
            });
            self.node_mut(xp).right = y;
        }

        sink.emit(TreeEvent::LinkReplaced {
            child: x,
            new_parent: Some(y),
            left_slot: false,
            is_root: false,
        });
        sink.emit(TreeEvent::ParentChanged {
            node: Some(x),
            new_parent: Some(y),
        });
        self.node_mut(y).right = x;
        self.node_mut(x).parent = y;

        sink.emit(TreeEvent::RightRotated { pivot: x });
    }

    // ============================================================
    // Fixups
    // ============================================================

    fn insert_fixup(&mut self, mut z: NodeId, sink: &mut dyn EventSink) {
        while self.color_of(self.parent_of(z)) == Color::Red {
            let zp = self.parent_of(z);
            let zpp = self.parent_of(zp);

            if zp == self.left_of(zpp) {
                let uncle = self.right_of(zpp);
                if self.color_of(uncle) == Color::Red {
                    self.recolor(zp, Color::Black, sink);
                    self.recolor(uncle, Color::Black, sink);
                    self.recolor(zpp, Color::Red, sink);
                    z = zpp;
                } else {
                    if z == self.right_of(zp) {
                        z = zp;
                        self.left_rotate(z, sink);
                    }
                    let zp = self.parent_of(z);
                    let zpp = self.parent_of(zp);
                    self.recolor(zp, Color::Black, sink);
                    self.recolor(zpp, Color::Red, sink);
                    self.right_rotate(zpp, sink);
                }
            } else {
                let uncle = self.left_of(zpp);
                if self.color_of(uncle) == Color::Red {
                    self.recolor(zp, Color::Black, sink);
                    self.recolor(uncle, Color::Black, sink);
                    self.recolor(zpp, Color::Red, sink);
                    z = zpp;
                } else {
                    if z == self.left_of(zp) {
                        z = zp;
                        self.right_rotate(z, sink);
                    }
                    let zp = self.parent_of(z);
                    let zpp = self.parent_of(zp);
                    self.recolor(zp, Color::Black, sink);
                    self.recolor(zpp, Color::Red, sink);
                    self.left_rotate(zpp, sink);
                }
            }
        }

        let root = self.root;
        self.recolor(root, Color::Black, sink);
    }

    fn transplant(&mut self, u: NodeId, v: NodeId, sink: &mut dyn EventSink) {
        let up = self.parent_of(u);
        if up == self.nil {
            sink.emit(TreeEvent::Transplanted {
                node: self.link(v),
                new_parent: None,
                left_slot: true,
                is_root: true,
            });
            self.root = v;
        } else if u == self.left_of(up) {
            sink.emit(TreeEvent::Transplanted {
                node: self.link(v),
                new_parent: Some(up),
                left_slot: true,
                is_root: false,
            });
            self.node_mut(up).left = v;
        } else {
            sink.emit(TreeEvent::Transplanted {
                node: self.link(v),
                new_parent: Some(up),
                left_slot: false,
                is_root: false,
            });
            self.node_mut(up).right = v;
        }

        sink.emit(TreeEvent::ParentChanged {
            node: self.link(v),
            new_parent: self.link(up),
        });
        self.node_mut(v).parent = up;
    }

    fn minimum(&self, mut node: NodeId, sink: &mut dyn EventSink) -> NodeId {
        while self.left_of(node) != self.nil {
            sink.emit(TreeEvent::Highlighted {
                node,
                highlight: Highlight::Successor,
                direction: Direction::Left,
                context: Some("min".to_string()),
            });
            node = self.left_of(node);
        }
        sink.emit(TreeEvent::Highlighted {
            node,
            highlight: Highlight::Successor,
            direction: Direction::Right,
            context: None,
        });
        node
    }

    fn delete_fixup(&mut self, mut x: NodeId, sink: &mut dyn EventSink) {
        while x != self.root && self.color_of(x) == Color::Black {
            let xp = self.parent_of(x);

            if x == self.left_of(xp) {
                let mut w = self.right_of(xp);
                if self.color_of(w) == Color::Red {
                    self.recolor(w, Color::Black, sink);
                    self.recolor(xp, Color::Red, sink);
                    self.left_rotate(xp, sink);
                    w = self.right_of(xp);
                }
                if self.color_of(self.left_of(w)) == Color::Black
                    && self.color_of(self.right_of(w)) == Color::Black
                {
                    self.recolor(w, Color::Red, sink);
                    x = xp;
                } else {
                    if self.color_of(self.right_of(w)) == Color::Black {
                        let near = self.left_of(w);
                        self.recolor(near, Color::Black, sink);
                        self.recolor(w, Color::Red, sink);
                        self.right_rotate(w, sink);
                        w = self.right_of(xp);
                    }
                    let parent_color = self.color_of(xp);
                    let far = self.right_of(w);
                    self.recolor(w, parent_color, sink);
                    self.recolor(xp, Color::Black, sink);
                    self.recolor(far, Color::Black, sink);
                    self.left_rotate(xp, sink);
                    x = self.root;
                }
            } else {
                let mut w = self.left_of(xp);
                if self.color_of(w) == Color::Red {
                    self.recolor(w, Color::Black, sink);
                    self.recolor(xp, Color::Red, sink);
                    self.right_rotate(xp, sink);
                    w = self.left_of(xp);
                }
                if self.color_of(self.right_of(w)) == Color::Black
                    && self.color_of(self.left_of(w)) == Color::Black
                {
                    self.recolor(w, Color::Red, sink);
                    x = xp;
                } else {
                    if self.color_of(self.left_of(w)) == Color::Black {
                        let near = self.right_of(w);
                        self.recolor(near, Color::Black, sink);
                        self.recolor(w, Color::Red, sink);
                        self.left_rotate(w, sink);
                        w = self.left_of(xp);
                    }
                    let parent_color = self.color_of(xp);
                    let far = self.left_of(w);
                    self.recolor(w, parent_color, sink);
                    self.recolor(xp, Color::Black, sink);
                    self.recolor(far, Color::Black, sink);
                    self.right_rotate(xp, sink);
                    x = self.root;
                }
            }
        }

        self.recolor(x, Color::Black, sink);
    }

    // ============================================================
    // Raw link access (sentinel-aware)
    // ============================================================

    /// The sentinel is never recolored.
    fn recolor(&mut self, id: NodeId, color: Color, sink: &mut dyn EventSink) {
        if id == self.nil {
            return;
        }
        sink.emit(TreeEvent::ColorChanged { node: id, color });
        self.node_mut(id).color = color;
    }

    fn check_kind(&self, key: &Key) -> DomainResult<()> {
        if key.kind() != self.kind {
            return Err(DomainError::KeyKindMismatch {
                expected: self.kind,
                found: key.kind(),
            });
        }
        Ok(())
    }

    fn recompute_metrics(&mut self) {
        self.node_count = self.arena.len() - 1;
        let mut height = 0;
        let mut stack = vec![(self.root, 1usize)];
        while let Some((id, depth)) = stack.pop() {
            if id == self.nil {
                continue;
            }
            height = height.max(depth);
            stack.push((self.left_of(id), depth + 1));
            stack.push((self.right_of(id), depth + 1));
        }
        self.height = height;
    }

    pub(crate) fn link(&self, id: NodeId) -> Option<NodeId> {
        (id != self.nil).then_some(id)
    }

    pub(crate) fn sentinel(&self) -> NodeId {
        self.nil
    }

    pub(crate) fn root_raw(&self) -> NodeId {
        self.root
    }

    pub(crate) fn key_at(&self, id: NodeId) -> Option<&Key> {
        self.arena[id.0].key.as_ref()
    }

    pub(crate) fn color_of(&self, id: NodeId) -> Color {
        self.arena[id.0].color
    }

    pub(crate) fn left_of(&self, id: NodeId) -> NodeId {
        self.arena[id.0].left
    }

    pub(crate) fn right_of(&self, id: NodeId) -> NodeId {
        self.arena[id.0].right
    }

    pub(crate) fn parent_of(&self, id: NodeId) -> NodeId {
        self.arena[id.0].parent
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.arena[id.0]
    }

    /// Build a tree from already-linked nodes. Used by the snapshot loader.
    pub(crate) fn from_linked(
        kind: KeyKind,
        nodes: Vec<(Key, Color)>,
        links: &[(Option<usize>, Option<usize>)],
    ) -> Self {
        let mut tree = Self::new(kind);
        let ids: Vec<NodeId> = nodes
            .into_iter()
            .map(|(key, color)| NodeId(tree.arena.insert(Node::new(key, color, tree.nil))))
            .collect();

        for (i, (left, right)) in links.iter().enumerate() {
            let id = ids[i];
            if let Some(l) = left {
                tree.node_mut(id).left = ids[*l];
                tree.node_mut(ids[*l]).parent = id;
            }
            if let Some(r) = right {
                tree.node_mut(id).right = ids[*r];
                tree.node_mut(ids[*r]).parent = id;
            }
        }

        if let Some(&root) = ids.first() {
            tree.root = root;
        }
        tree.recompute_metrics();
        tree
    }
}

/// Stack-based in-order iterator over live nodes.
pub struct InOrderIter<'a> {
    tree: &'a RedBlackTree,
    stack: Vec<NodeId>,
    current: NodeId,
}

impl<'a> InOrderIter<'a> {
    fn new(tree: &'a RedBlackTree) -> Self {
        Self {
            tree,
            stack: Vec::new(),
            current: tree.root,
        }
    }
}

impl<'a> Iterator for InOrderIter<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while self.current != self.tree.nil {
            self.stack.push(self.current);
            self.current = self.tree.left_of(self.current);
        }
        let id = self.stack.pop()?;
        self.current = self.tree.right_of(id);
        Some((id, &self.tree.arena[id.0]))
    }
}
