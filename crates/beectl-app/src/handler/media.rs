//! Asset library handlers

use std::path::PathBuf;
use std::time::Duration;

use beectl_core::prelude::*;

use crate::state::{AppState, Notice};

use super::{UpdateAction, UpdateResult};

pub(crate) fn handle_refresh() -> UpdateResult {
    UpdateResult::action(UpdateAction::ListMedia {
        delay: Duration::ZERO,
    })
}

pub(crate) fn handle_upload(state: &mut AppState, path: PathBuf) -> UpdateResult {
    state.media.begin_upload();
    UpdateResult::action(UpdateAction::UploadAsset { path })
}

pub(crate) fn handle_listed(state: &mut AppState, assets: Vec<String>) -> UpdateResult {
    state.media.replace(assets);
    UpdateResult::none()
}

pub(crate) fn handle_list_failed(state: &mut AppState, error: &str) -> UpdateResult {
    state.media.list_failed(error);
    UpdateResult::none()
}

pub(crate) fn handle_upload_completed(state: &mut AppState, file_name: &str) -> UpdateResult {
    info!("Uploaded '{}'", file_name);
    let delay = state.media.upload_succeeded();
    UpdateResult::action(UpdateAction::ListMedia { delay })
}

/// No retry; the user has to acknowledge the notice.
pub(crate) fn handle_upload_failed(
    state: &mut AppState,
    file_name: &str,
    error: &str,
) -> UpdateResult {
    warn!("Upload of '{}' failed: {}", file_name, error);
    state.media.upload_failed();
    state.notice = Some(Notice::upload_failed(file_name, error));
    UpdateResult::none()
}
