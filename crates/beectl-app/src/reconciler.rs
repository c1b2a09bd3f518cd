//! State reconciler: the one authoritative `DeviceConfig` plus the edit session.
//!
//! Every snapshot or `stateChanged` push replaces the stored config outright.
//! Commands never touch it; only the device's next push does.

use beectl_core::prelude::*;
use beectl_core::{AppEntry, DeviceConfig};

use crate::edit_session::{DraftOutcome, EditSession};

/// Result of applying one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub draft: DraftOutcome,
}

/// Owner of the local view of device state.
#[derive(Debug, Default)]
pub struct Reconciler {
    config: Option<DeviceConfig>,
    editor: EditSession,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the config and rebase any open draft onto it.
    pub fn apply_snapshot(&mut self, config: DeviceConfig) -> ReconcileOutcome {
        if !config.active_app_is_valid() {
            warn!(
                "Device reports active app '{}' which is not installed",
                config.active_app_id
            );
        }

        let draft = self.editor.rebase(&config);
        self.config = Some(config);
        ReconcileOutcome { draft }
    }

    /// `None` until the first snapshot arrives.
    pub fn config(&self) -> Option<&DeviceConfig> {
        self.config.as_ref()
    }

    pub fn active_app(&self) -> Option<&AppEntry> {
        self.config.as_ref().and_then(DeviceConfig::active_app)
    }

    pub fn editor(&self) -> &EditSession {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditSession {
        &mut self.editor
    }

    /// Open the editor on `app_id` against the current config.
    pub fn open_editor(&mut self, app_id: &str) -> bool {
        self.editor.open(self.config.as_ref(), app_id)
    }
}
