use std::collections::HashMap;

use termtree::Tree;
use tracing::instrument;

use crate::domain::node::NodeId;
use crate::domain::tree::RedBlackTree;

/// Conversion into a printable `termtree` view.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for RedBlackTree {
    /// Children are listed left then right; a missing child on a node that
    /// has one child is shown as `NIL` so the side stays readable.
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn label(tree: &RedBlackTree, id: NodeId) -> String {
            match (tree.key(id), tree.color(id)) {
                (Some(key), Some(color)) => format!("{} ({})", key, color),
                _ => "NIL".to_string(),
            }
        }

        // Reverse pre-order finishes every child before its parent, so each
        // subtree is assembled without recursion.
        fn build(tree: &RedBlackTree) -> Option<Tree<String>> {
            let mut done: HashMap<NodeId, Tree<String>> = HashMap::new();
            for id in tree.pre_order().into_iter().rev() {
                let mut node = Tree::new(label(tree, id));
                let (left, right) = (tree.left(id), tree.right(id));
                if left.is_some() || right.is_some() {
                    for child in [left, right] {
                        let leaf = child
                            .and_then(|c| done.remove(&c))
                            .unwrap_or_else(|| Tree::new("NIL".to_string()));
                        node.push(leaf);
                    }
                }
                done.insert(id, node);
            }
            tree.root().and_then(|root| done.remove(&root))
        }

        build(self).unwrap_or_else(|| Tree::new("Empty tree".to_string()))
    }
}
