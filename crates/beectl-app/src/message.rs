//! Message types for the application (TEA pattern)

use std::path::PathBuf;

use beectl_core::{ConnectionState, DeviceConfig};
use beectl_device::{ChannelEvent, DeviceMessage};

use crate::edit_session::DraftEdit;

/// All possible messages/actions in the application
#[derive(Debug, Clone)]
pub enum Message {
    // ─────────────────────────────────────────────────────────
    // Device Channel
    // ─────────────────────────────────────────────────────────
    /// Command channel changed state
    ConnectionChanged(ConnectionState),

    /// Reply to `getConfig`
    DeviceSnapshot(DeviceConfig),

    /// Unsolicited `stateChanged` push
    DeviceStateChanged(DeviceConfig),

    // ─────────────────────────────────────────────────────────
    // User Intents
    // ─────────────────────────────────────────────────────────
    /// Make an app the one the device shows
    SetActiveApp { app_id: String },

    /// Install a new default clock entry
    AddApp,

    /// Uninstall an app
    RemoveApp { id: String },

    /// Start editing an app (replaces any open draft)
    OpenEditor { app_id: String },

    /// Change one field of the open draft
    EditDraft(DraftEdit),

    /// Send the draft as `updateApp` and close it
    SaveDraft,

    /// Close the draft without sending
    DiscardDraft,

    /// Re-list the asset library now
    RefreshMedia,

    /// Upload a local file to the asset library
    UploadAsset { path: PathBuf },

    /// Dismiss the blocking notice
    AcknowledgeNotice,

    /// Stop the engine
    Quit,

    // ─────────────────────────────────────────────────────────
    // Asset Library Results
    // ─────────────────────────────────────────────────────────
    /// Listing succeeded
    MediaListed { assets: Vec<String> },

    /// Listing failed
    MediaListFailed { error: String },

    /// Upload accepted by the device
    UploadCompleted { file_name: String },

    /// Upload rejected or never sent
    UploadFailed { file_name: String, error: String },
}

impl Message {
    /// Translate a command channel event. Unknown frames have no message.
    pub fn from_channel_event(event: ChannelEvent) -> Option<Self> {
        match event {
            ChannelEvent::ConnectionChanged(state) => Some(Message::ConnectionChanged(state)),
            ChannelEvent::Message(DeviceMessage::Snapshot(config)) => {
                Some(Message::DeviceSnapshot(config))
            }
            ChannelEvent::Message(DeviceMessage::StateChanged(config)) => {
                Some(Message::DeviceStateChanged(config))
            }
            ChannelEvent::Message(DeviceMessage::Unknown(_)) => None,
        }
    }
}
