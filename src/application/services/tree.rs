//! Tree service
//!
//! Owns the live tree and exposes the public operation surface: raw text
//! input is converted to typed keys here, and file import/export goes through
//! the codecs and the filesystem boundary.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::codec::Format;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    validate, EventSink, Key, KeyKind, NodeId, RedBlackTree, Traversal, TreeEvent, TreeSnapshot,
};
use crate::infrastructure::traits::FileSystem;

/// Service wrapping one live red-black tree.
pub struct TreeService {
    fs: Arc<dyn FileSystem>,
    tree: RedBlackTree,
    validation: bool,
    verified: bool,
}

impl TreeService {
    /// Create a service holding an empty tree.
    pub fn new(fs: Arc<dyn FileSystem>, kind: KeyKind, validation: bool) -> Self {
        Self {
            fs,
            tree: RedBlackTree::new(kind),
            validation,
            verified: true,
        }
    }

    pub fn tree(&self) -> &RedBlackTree {
        &self.tree
    }

    pub fn key_kind(&self) -> KeyKind {
        self.tree.kind()
    }

    /// Select the key kind for a fresh tree.
    pub fn set_key_kind(&mut self, kind: KeyKind) -> ApplicationResult<()> {
        Ok(self.tree.set_kind(kind)?)
    }

    pub fn height(&self) -> usize {
        self.tree.height()
    }

    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    pub fn enable_validation(&mut self, enabled: bool) {
        debug!("enable_validation: {}", enabled);
        self.validation = enabled;
    }

    pub fn validation_enabled(&self) -> bool {
        self.validation
    }

    /// `false` after an import with validation disabled, until the tree is
    /// cleared or a validated import replaces it.
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    fn parse(&self, raw: &str) -> ApplicationResult<Key> {
        Ok(Key::parse(self.tree.kind(), raw)?)
    }

    fn ensure_editable(&self) -> ApplicationResult<()> {
        if !self.verified {
            return Err(ApplicationError::UnverifiedTree);
        }
        Ok(())
    }

    #[instrument(level = "debug", skip(self, sink))]
    pub fn insert(&mut self, raw: &str, sink: &mut dyn EventSink) -> ApplicationResult<NodeId> {
        self.ensure_editable()?;
        let key = self.parse(raw)?;
        Ok(self.tree.insert(key, sink)?)
    }

    #[instrument(level = "debug", skip(self, sink))]
    pub fn delete(&mut self, raw: &str, sink: &mut dyn EventSink) -> ApplicationResult<bool> {
        self.ensure_editable()?;
        let key = self.parse(raw)?;
        Ok(self.tree.delete(&key, sink))
    }

    #[instrument(level = "debug", skip(self, sink))]
    pub fn find(&self, raw: &str, sink: &mut dyn EventSink) -> ApplicationResult<bool> {
        let key = self.parse(raw)?;
        Ok(self.tree.find(&key, sink))
    }

    /// Depth the key would occupy if inserted now.
    pub fn insertion_depth(&self, raw: &str) -> ApplicationResult<usize> {
        let key = self.parse(raw)?;
        Ok(self.tree.insertion_depth(&key))
    }

    pub fn clear(&mut self, sink: &mut dyn EventSink) {
        self.tree.clear(sink);
        self.verified = true;
    }

    /// Read a tree file into a candidate tree and swap it in.
    ///
    /// With validation enabled the candidate must pass every red-black check;
    /// on failure a `ValidationError` event is emitted and the live tree is
    /// left untouched.
    #[instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn import_tree(&mut self, path: &Path, sink: &mut dyn EventSink) -> ApplicationResult<()> {
        let format = Format::from_path(path)?;
        let bytes = self.fs.read(path).with_path_context("read tree file", path)?;
        let candidate = format.codec().decode(&bytes)?.into_tree()?;

        if self.validation {
            let report = validate(&candidate);
            if !report.is_valid() {
                let message = report.message();
                warn!("import rejected: {}", message.replace('\n', " "));
                sink.emit(TreeEvent::ValidationError {
                    message: message.clone(),
                });
                return Err(ApplicationError::Validation { message });
            }
        }

        self.tree = candidate;
        self.verified = self.validation;
        info!(
            nodes = self.tree.node_count(),
            verified = self.verified,
            "imported {}",
            path.display()
        );
        sink.emit(TreeEvent::TreeReplaced {
            node_count: self.tree.node_count(),
        });
        sink.emit(TreeEvent::HeightChanged {
            height: self.tree.height(),
        });
        sink.emit(TreeEvent::NodeCountChanged {
            count: self.tree.node_count(),
        });
        Ok(())
    }

    /// Write the live tree in the format chosen by the file extension.
    #[instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn export_tree(&self, path: &Path) -> ApplicationResult<()> {
        let format = Format::from_path(path)?;
        if self.tree.is_empty() {
            return Err(ApplicationError::EmptyTree);
        }

        let order = match format {
            Format::Xml => Traversal::LevelOrder,
            _ => Traversal::PreOrder,
        };
        let snapshot = TreeSnapshot::capture(&self.tree, order);
        let bytes = format.codec().encode(&snapshot)?;

        self.fs
            .ensure_parent(path)
            .with_path_context("create directory for", path)?;
        self.fs
            .write(path, &bytes)
            .with_path_context("write tree file", path)?;
        info!(nodes = snapshot.len(), "exported {}", path.display());
        Ok(())
    }
}
