//! Application state (Model in TEA pattern)
//!
//! `AppState` is the single context object: the engine owns it and the update
//! function borrows it mutably. Front-ends read through the accessors.

use beectl_core::prelude::*;
use beectl_core::{AppEntry, ConnectionState, DeviceConfig};

use crate::config::Settings;
use crate::edit_session::EditSession;
use crate::media_library::MediaLibrary;
use crate::reconciler::Reconciler;

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPhase {
    #[default]
    Running,
    Quitting,
}

/// A message the user has to dismiss before it goes away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn upload_failed(file_name: &str, error: &str) -> Self {
        Self {
            message: format!("Upload of '{file_name}' failed: {error}"),
        }
    }
}

/// Complete application state
#[derive(Debug)]
pub struct AppState {
    pub phase: AppPhase,

    /// Mirror of the command channel state, fed by `ConnectionChanged`
    pub connection: ConnectionState,

    /// Authoritative device config and the edit session
    pub reconciler: Reconciler,

    pub media: MediaLibrary,

    /// Blocking notice awaiting acknowledgement
    pub notice: Option<Notice>,

    pub settings: Settings,

    /// Errors from user intents, drained by the engine after each message
    pending_errors: Vec<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(Settings::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            phase: AppPhase::Running,
            connection: ConnectionState::Connecting,
            reconciler: Reconciler::new(),
            media: MediaLibrary::new(settings.media_refresh_delay()),
            notice: None,
            settings,
            pending_errors: Vec::new(),
        }
    }

    pub fn config(&self) -> Option<&DeviceConfig> {
        self.reconciler.config()
    }

    pub fn active_app(&self) -> Option<&AppEntry> {
        self.reconciler.active_app()
    }

    pub fn editor(&self) -> &EditSession {
        self.reconciler.editor()
    }

    pub fn draft(&self) -> Option<&AppEntry> {
        self.reconciler.editor().draft()
    }

    pub fn should_quit(&self) -> bool {
        self.phase == AppPhase::Quitting
    }

    pub fn request_quit(&mut self) {
        self.phase = AppPhase::Quitting;
    }

    /// Record an error for the front-end. Nothing here is fatal.
    pub fn report_error(&mut self, error: &Error) {
        debug!("Reporting error to front-end: {}", error);
        self.pending_errors.push(error.to_string());
    }

    pub fn take_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_errors)
    }
}
