//! Edit session handlers

use beectl_core::prelude::*;

use crate::edit_session::DraftEdit;
use crate::state::AppState;

use super::UpdateResult;

pub(crate) fn handle_open(state: &mut AppState, app_id: &str) -> UpdateResult {
    if !state.reconciler.open_editor(app_id) {
        let error = if state.config().is_none() {
            Error::invalid_edit("no configuration received from the device yet")
        } else {
            Error::invalid_edit(format!("unknown app '{app_id}'"))
        };
        state.report_error(&error);
    }
    UpdateResult::none()
}

pub(crate) fn handle_edit(state: &mut AppState, edit: DraftEdit) -> UpdateResult {
    let field = edit.field();
    if let Err(error) = state.reconciler.editor_mut().apply(edit) {
        warn!("Rejected edit to '{}': {}", field, error);
        state.report_error(&error);
    }
    UpdateResult::none()
}

pub(crate) fn handle_save(state: &mut AppState) -> UpdateResult {
    match state.reconciler.editor_mut().commit() {
        Some(command) => UpdateResult::command(command),
        None => {
            state.report_error(&Error::NoDraft);
            UpdateResult::none()
        }
    }
}

pub(crate) fn handle_discard(state: &mut AppState) -> UpdateResult {
    if !state.reconciler.editor_mut().discard() {
        state.report_error(&Error::NoDraft);
    }
    UpdateResult::none()
}
