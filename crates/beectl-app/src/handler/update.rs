//! Main update function - handles state transitions (TEA pattern)

use crate::message::Message;
use crate::state::AppState;

use super::{device, editor, media, UpdateResult};

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::Quit => {
            state.request_quit();
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Device Channel
        // ─────────────────────────────────────────────────────────
        Message::ConnectionChanged(connection) => {
            device::handle_connection_changed(state, connection)
        }
        Message::DeviceSnapshot(config) | Message::DeviceStateChanged(config) => {
            device::handle_config(state, config)
        }

        // ─────────────────────────────────────────────────────────
        // Direct Commands
        // ─────────────────────────────────────────────────────────
        Message::SetActiveApp { app_id } => device::handle_set_active_app(state, app_id),
        Message::AddApp => device::handle_add_app(),
        Message::RemoveApp { id } => device::handle_remove_app(state, id),

        // ─────────────────────────────────────────────────────────
        // Edit Session
        // ─────────────────────────────────────────────────────────
        Message::OpenEditor { app_id } => editor::handle_open(state, &app_id),
        Message::EditDraft(edit) => editor::handle_edit(state, edit),
        Message::SaveDraft => editor::handle_save(state),
        Message::DiscardDraft => editor::handle_discard(state),

        // ─────────────────────────────────────────────────────────
        // Asset Library
        // ─────────────────────────────────────────────────────────
        Message::RefreshMedia => media::handle_refresh(),
        Message::UploadAsset { path } => media::handle_upload(state, path),
        Message::MediaListed { assets } => media::handle_listed(state, assets),
        Message::MediaListFailed { error } => media::handle_list_failed(state, &error),
        Message::UploadCompleted { file_name } => media::handle_upload_completed(state, &file_name),
        Message::UploadFailed { file_name, error } => {
            media::handle_upload_failed(state, &file_name, &error)
        }
        Message::AcknowledgeNotice => {
            state.notice = None;
            UpdateResult::none()
        }
    }
}
