//! Device channel and direct command handlers

use beectl_core::prelude::*;
use beectl_core::{ConnectionState, DeviceConfig};
use beectl_device::{DeviceCommand, NewApp};

use crate::edit_session::DraftOutcome;
use crate::message::Message;
use crate::state::AppState;

use super::UpdateResult;

pub(crate) fn handle_connection_changed(
    state: &mut AppState,
    connection: ConnectionState,
) -> UpdateResult {
    if state.connection == connection {
        return UpdateResult::none();
    }
    info!("Device connection: {} -> {}", state.connection, connection);
    state.connection = connection;

    // Assets may have changed while we were away.
    if connection.is_open() {
        return UpdateResult::message(Message::RefreshMedia);
    }
    UpdateResult::none()
}

/// Snapshots and `stateChanged` pushes are handled identically.
pub(crate) fn handle_config(state: &mut AppState, config: DeviceConfig) -> UpdateResult {
    let outcome = state.reconciler.apply_snapshot(config);
    if outcome.draft == DraftOutcome::Closed {
        debug!("Open draft closed by device update");
    }
    UpdateResult::none()
}

pub(crate) fn handle_set_active_app(state: &mut AppState, app_id: String) -> UpdateResult {
    if let Some(config) = state.config() {
        if !config.contains_app(&app_id) {
            debug!("Activating '{}', which is not in the last snapshot", app_id);
        }
    }
    UpdateResult::command(DeviceCommand::SetActiveApp { app_id })
}

pub(crate) fn handle_add_app() -> UpdateResult {
    let now_millis = chrono::Utc::now().timestamp_millis();
    UpdateResult::command(DeviceCommand::AddApp(NewApp::with_timestamp(now_millis)))
}

pub(crate) fn handle_remove_app(state: &mut AppState, id: String) -> UpdateResult {
    if state.reconciler.editor().draft_id() == Some(id.as_str()) {
        debug!("Removing '{}' while it is being edited", id);
    }
    UpdateResult::command(DeviceCommand::RemoveApp { id })
}
