//! Centralized application state for the guide viewer.
//!
//! The guide itself (window, fetched data, filters, scroll, selection) is
//! owned by the library's `GuideController`. The viewer adds the backend it
//! fetches from and a few focused state components around it.

use guidegrid::{Clock, GuideConfig, GuideController, GuideError, MemoryBackend};
use std::path::PathBuf;
use std::sync::Arc;

use crate::state::{LayoutState, MappingState, ThemeState};

/// Where the current guide came from.
#[derive(Debug, Clone, PartialEq)]
pub enum GuideSourceLabel {
    File(PathBuf),
    Synthetic,
}

impl std::fmt::Display for GuideSourceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuideSourceLabel::File(path) => write!(f, "{}", path.display()),
            GuideSourceLabel::Synthetic => write!(f, "Synthetic guide"),
        }
    }
}

/// Main application state composed of focused state components.
pub struct AppState {
    // ===== Focused State Components =====
    /// Guide window, data, filters, scrolling and selection
    pub guide: GuideController,

    pub theme: ThemeState,

    pub layout: LayoutState,

    /// EPG mapping dialog
    pub mapping: MappingState,

    // ===== Top-Level State =====
    /// Backend serving the loaded guide
    backend: Option<Arc<MemoryBackend>>,

    source: Option<GuideSourceLabel>,

    /// Current error message to display (if any)
    pub error_message: Option<String>,
}

impl AppState {
    pub fn new(
        config: GuideConfig,
        clock: Arc<dyn Clock>,
        theme_name: String,
    ) -> Result<Self, GuideError> {
        let layout = LayoutState::new(config.sidebar_width_px);
        Ok(Self {
            guide: GuideController::new(config, clock)?,
            theme: ThemeState::with_theme(theme_name),
            layout,
            mapping: MappingState::new(),
            backend: None,
            source: None,
            error_message: None,
        })
    }

    // ===== Queries =====

    pub fn backend(&self) -> Option<&Arc<MemoryBackend>> {
        self.backend.as_ref()
    }

    pub fn source(&self) -> Option<&GuideSourceLabel> {
        self.source.as_ref()
    }

    // ===== High-Level Coordination Methods =====

    /// Drops the current backend ahead of loading a new one.
    pub fn reset_source(&mut self) {
        self.backend = None;
        self.source = None;
        self.mapping.close();
        self.error_message = None;
    }

    /// Installs a backend and refetches everything from it.
    pub fn install_backend(&mut self, backend: MemoryBackend, source: GuideSourceLabel) {
        tracing::info!(
            source = %source,
            channels = backend.channel_count(),
            programs = backend.program_count(),
            "guide source installed"
        );
        self.backend = Some(Arc::new(backend));
        self.source = Some(source);
        self.mapping.close();
        self.error_message = None;
        self.guide.reload();
    }
}
