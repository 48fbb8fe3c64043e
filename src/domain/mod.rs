//! Domain layer: the red-black tree engine and its event contract
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod events;
pub mod key;
pub mod node;
pub mod render;
pub mod snapshot;
pub mod tree;
pub mod validator;

pub use error::{DomainError, DomainResult};
pub use events::{Direction, EventSink, Highlight, NullSink, RecordingSink, TracingSink, TreeEvent};
pub use key::{Key, KeyKind, NIL_TOKEN};
pub use node::{Color, Node, NodeId};
pub use render::TreeNodeConvert;
pub use snapshot::{SnapshotNode, Traversal, TreeSnapshot};
pub use tree::RedBlackTree;
pub use validator::{validate, BlackHeight, ValidationReport, Violation};
