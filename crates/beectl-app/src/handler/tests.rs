//! Tests for handler module

use std::path::PathBuf;
use std::time::Duration;

use super::*;
use crate::edit_session::DraftEdit;
use crate::message::Message;
use crate::state::{AppPhase, AppState};
use beectl_core::{AppEntry, AppType, ConnectionState, DeviceConfig};

/// A snapshot with one entry per `(id, name)`, the first one active.
fn snapshot(apps: &[(&str, &str)]) -> DeviceConfig {
    DeviceConfig {
        version: Some(serde_json::json!(1)),
        active_app_id: apps.first().map(|(id, _)| id.to_string()).unwrap_or_default(),
        applications: apps
            .iter()
            .map(|(id, name)| AppEntry::new(*id, *name))
            .collect(),
        ..Default::default()
    }
}

fn connected_state(apps: &[(&str, &str)]) -> AppState {
    let mut state = AppState::new();
    update(&mut state, Message::ConnectionChanged(ConnectionState::Open));
    update(&mut state, Message::DeviceSnapshot(snapshot(apps)));
    state
}

fn sent_command(result: UpdateResult) -> DeviceCommand {
    match result.action {
        Some(UpdateAction::SendCommand(command)) => command,
        other => panic!("expected a command, got {other:?}"),
    }
}

#[test]
fn test_quit_message_sets_quitting_phase() {
    let mut state = AppState::new();
    assert_ne!(state.phase, AppPhase::Quitting);

    update(&mut state, Message::Quit);

    assert_eq!(state.phase, AppPhase::Quitting);
    assert!(state.should_quit());
}

// ─────────────────────────────────────────────────────────
// Device Channel
// ─────────────────────────────────────────────────────────

#[test]
fn test_open_connection_lists_media() {
    let mut state = AppState::new();
    let result = update(&mut state, Message::ConnectionChanged(ConnectionState::Open));
    assert_eq!(state.connection, ConnectionState::Open);
    assert!(result.action.is_none());
    assert!(matches!(result.message, Some(Message::RefreshMedia)));

    let result = update(&mut state, Message::RefreshMedia);
    assert_eq!(
        result.action,
        Some(UpdateAction::ListMedia {
            delay: Duration::ZERO
        })
    );
}

#[test]
fn test_closed_connection_has_no_action() {
    let mut state = AppState::new();
    let result = update(
        &mut state,
        Message::ConnectionChanged(ConnectionState::Closed),
    );
    assert_eq!(state.connection, ConnectionState::Closed);
    assert!(result.action.is_none());
    assert!(result.message.is_none());
}

#[test]
fn test_snapshot_and_push_replace_config() {
    let mut state = connected_state(&[("a1", "Clock")]);
    update(
        &mut state,
        Message::DeviceStateChanged(snapshot(&[("a2", "Timer")])),
    );
    assert_eq!(state.active_app().unwrap().id, "a2");
    assert!(!state.config().unwrap().contains_app("a1"));
}

#[test]
fn test_snapshots_in_order_leave_the_last() {
    let mut state = AppState::new();
    let a = snapshot(&[("a1", "A")]);
    let b = snapshot(&[("b1", "B"), ("b2", "B2")]);
    update(&mut state, Message::DeviceSnapshot(a));
    update(&mut state, Message::DeviceStateChanged(b.clone()));
    assert_eq!(state.config(), Some(&b));
}

// ─────────────────────────────────────────────────────────
// Direct Commands
// ─────────────────────────────────────────────────────────

#[test]
fn test_commands_never_change_local_state() {
    let mut state = connected_state(&[("a1", "Clock"), ("a2", "Timer")]);
    let before = state.config().cloned();

    let result = update(
        &mut state,
        Message::SetActiveApp {
            app_id: "a2".into(),
        },
    );
    assert_eq!(
        sent_command(result),
        DeviceCommand::SetActiveApp {
            app_id: "a2".into()
        }
    );

    let result = update(&mut state, Message::RemoveApp { id: "a1".into() });
    assert_eq!(
        sent_command(result),
        DeviceCommand::RemoveApp { id: "a1".into() }
    );

    assert_eq!(state.config().cloned(), before);
}

#[test]
fn test_add_app_builds_default_clock() {
    let mut state = connected_state(&[("a1", "Clock")]);
    match sent_command(update(&mut state, Message::AddApp)) {
        DeviceCommand::AddApp(new_app) => {
            assert!(new_app.id.starts_with("app-"));
            assert!(new_app.id["app-".len()..].parse::<i64>().is_ok());
            assert_eq!(new_app.name, "New Entry");
            assert_eq!(new_app.app_type, AppType::Clock);
            assert!(new_app.enabled);
        }
        other => panic!("expected addApp, got {other:?}"),
    }
    assert_eq!(state.config().unwrap().applications.len(), 1);
}

#[test]
fn test_commands_are_issued_even_while_disconnected() {
    // Dropping is the channel's job; the handler stays oblivious.
    let mut state = connected_state(&[("a1", "Clock")]);
    update(
        &mut state,
        Message::ConnectionChanged(ConnectionState::Closed),
    );
    let result = update(
        &mut state,
        Message::SetActiveApp {
            app_id: "a1".into(),
        },
    );
    assert!(matches!(
        result.action,
        Some(UpdateAction::SendCommand(DeviceCommand::SetActiveApp { .. }))
    ));
    assert!(state.take_errors().is_empty());
}

// ─────────────────────────────────────────────────────────
// Edit Session
// ─────────────────────────────────────────────────────────

#[test]
fn test_open_editor_unknown_app_reports_error() {
    let mut state = connected_state(&[("a1", "Clock")]);
    update(
        &mut state,
        Message::OpenEditor {
            app_id: "zz".into(),
        },
    );
    assert!(state.draft().is_none());
    let errors = state.take_errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("zz"));
}

#[test]
fn test_open_editor_before_snapshot_reports_error() {
    let mut state = AppState::new();
    update(
        &mut state,
        Message::OpenEditor {
            app_id: "a1".into(),
        },
    );
    assert!(state.draft().is_none());
    assert_eq!(state.take_errors().len(), 1);
}

#[test]
fn test_invalid_edit_reports_error_and_keeps_draft() {
    let mut state = connected_state(&[("a1", "Clock")]);
    update(
        &mut state,
        Message::OpenEditor {
            app_id: "a1".into(),
        },
    );
    update(
        &mut state,
        Message::EditDraft(DraftEdit::BaseColor("blue".into())),
    );
    assert!(state.draft().unwrap().base_color.is_none());
    assert_eq!(state.take_errors().len(), 1);
}

#[test]
fn test_save_sends_full_draft_and_closes() {
    let mut state = connected_state(&[("a1", "Clock")]);
    update(
        &mut state,
        Message::OpenEditor {
            app_id: "a1".into(),
        },
    );
    update(
        &mut state,
        Message::EditDraft(DraftEdit::Name("Desk Clock".into())),
    );

    match sent_command(update(&mut state, Message::SaveDraft)) {
        DeviceCommand::UpdateApp(entry) => {
            assert_eq!(entry.id, "a1");
            assert_eq!(entry.name, "Desk Clock");
        }
        other => panic!("expected updateApp, got {other:?}"),
    }
    assert!(state.draft().is_none());
    // No optimistic update.
    assert_eq!(state.config().unwrap().applications[0].name, "Clock");
}

#[test]
fn test_save_without_draft_is_error() {
    let mut state = connected_state(&[("a1", "Clock")]);
    let result = update(&mut state, Message::SaveDraft);
    assert!(result.action.is_none());
    assert_eq!(state.take_errors(), vec!["No app is open for editing"]);
}

#[test]
fn test_discard_closes_without_command() {
    let mut state = connected_state(&[("a1", "Clock")]);
    update(
        &mut state,
        Message::OpenEditor {
            app_id: "a1".into(),
        },
    );
    let result = update(&mut state, Message::DiscardDraft);
    assert!(result.action.is_none());
    assert!(state.draft().is_none());
    assert!(state.take_errors().is_empty());
}

#[test]
fn test_push_overwrites_uncommitted_edit() {
    let mut state = connected_state(&[("a1", "Clock")]);
    update(
        &mut state,
        Message::OpenEditor {
            app_id: "a1".into(),
        },
    );
    update(
        &mut state,
        Message::EditDraft(DraftEdit::Name("Desk Clock".into())),
    );
    assert_eq!(state.draft().unwrap().name, "Desk Clock");

    update(
        &mut state,
        Message::DeviceStateChanged(snapshot(&[("a1", "Clock v2")])),
    );
    assert_eq!(state.draft().unwrap().name, "Clock v2");
}

#[test]
fn test_push_without_entry_closes_draft() {
    let mut state = connected_state(&[("a1", "Clock"), ("a2", "Timer")]);
    update(
        &mut state,
        Message::OpenEditor {
            app_id: "a2".into(),
        },
    );
    update(
        &mut state,
        Message::DeviceStateChanged(snapshot(&[("a1", "Clock")])),
    );
    assert!(state.draft().is_none());
}

// ─────────────────────────────────────────────────────────
// Asset Library
// ─────────────────────────────────────────────────────────

#[test]
fn test_upload_flow_success_relists_after_delay() {
    let mut state = AppState::new();
    let result = update(
        &mut state,
        Message::UploadAsset {
            path: PathBuf::from("/tmp/sky.png"),
        },
    );
    assert!(state.media.is_uploading());
    assert_eq!(
        result.action,
        Some(UpdateAction::UploadAsset {
            path: PathBuf::from("/tmp/sky.png")
        })
    );

    let result = update(
        &mut state,
        Message::UploadCompleted {
            file_name: "sky.png".into(),
        },
    );
    assert!(!state.media.is_uploading());
    assert_eq!(
        result.action,
        Some(UpdateAction::ListMedia {
            delay: Duration::from_millis(500)
        })
    );
}

#[test]
fn test_upload_failure_raises_blocking_notice() {
    let mut state = AppState::new();
    update(
        &mut state,
        Message::UploadAsset {
            path: PathBuf::from("sky.png"),
        },
    );
    let result = update(
        &mut state,
        Message::UploadFailed {
            file_name: "sky.png".into(),
            error: "Upload error: 500".into(),
        },
    );
    assert!(result.action.is_none());
    assert!(!state.media.is_uploading());
    let notice = state.notice.clone().unwrap();
    assert!(notice.message.contains("sky.png"));

    update(&mut state, Message::AcknowledgeNotice);
    assert!(state.notice.is_none());
}

#[test]
fn test_list_failure_keeps_last_known_assets() {
    let mut state = AppState::new();
    update(
        &mut state,
        Message::MediaListed {
            assets: vec!["a.png".into(), "b.png".into()],
        },
    );
    update(
        &mut state,
        Message::MediaListFailed {
            error: "timeout".into(),
        },
    );
    assert_eq!(state.media.assets(), ["a.png", "b.png"]);
    assert!(state.notice.is_none());
}

#[test]
fn test_refresh_lists_immediately() {
    let mut state = AppState::new();
    let result = update(&mut state, Message::RefreshMedia);
    assert_eq!(
        result.action,
        Some(UpdateAction::ListMedia {
            delay: Duration::ZERO
        })
    );
}
