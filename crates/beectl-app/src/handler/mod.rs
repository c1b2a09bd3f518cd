//! Handler module - TEA update function and message handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `device`: Connection changes, snapshots and direct device commands
//! - `editor`: Edit session handlers
//! - `media`: Asset library handlers

pub(crate) mod device;
pub(crate) mod editor;
pub(crate) mod media;
pub(crate) mod update;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::time::Duration;

use beectl_device::DeviceCommand;

use crate::message::Message;

// Re-export main entry point
pub use update::update;

/// Actions that the event loop should perform after update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// Hand a command to the device channel (dropped there if not open)
    SendCommand(DeviceCommand),

    /// List the asset library after `delay`
    ListMedia { delay: Duration },

    /// Read a local file and upload it
    UploadAsset { path: PathBuf },
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the event loop to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }

    pub fn command(command: DeviceCommand) -> Self {
        Self::action(UpdateAction::SendCommand(command))
    }
}
