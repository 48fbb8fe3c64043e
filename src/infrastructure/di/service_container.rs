//! Service container for dependency injection
//!
//! Wires settings and the filesystem boundary into services.

use std::sync::Arc;

use crate::application::services::TreeService;
use crate::config::Settings;
use crate::domain::{EventSink, NullSink, TracingSink};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding shared dependencies.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs }
    }

    /// A fresh tree service configured from the settings.
    pub fn tree_service(&self) -> TreeService {
        TreeService::new(
            Arc::clone(&self.fs),
            self.settings.key_kind,
            self.settings.validation,
        )
    }

    /// Background sink for commands that do not print events themselves.
    pub fn default_sink(&self) -> Box<dyn EventSink> {
        if self.settings.trace_events {
            Box::new(TracingSink)
        } else {
            Box::new(NullSink)
        }
    }
}
