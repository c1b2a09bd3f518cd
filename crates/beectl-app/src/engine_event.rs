//! Domain events emitted by the Engine for external consumers
//!
//! Front-ends subscribe via `Engine::subscribe()`. Events are computed by
//! comparing state before and after each message, so a message that changes
//! nothing observable produces nothing.

use beectl_core::{AppEntry, ConnectionState, DeviceConfig};

/// Domain events emitted by the Engine for external consumers.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The command channel changed state
    ConnectionChanged { state: ConnectionState },

    /// A snapshot or push produced a different configuration
    ConfigUpdated { config: DeviceConfig },

    /// The draft was opened, edited, or rebased onto a device push
    DraftChanged { draft: AppEntry },

    /// The draft went away (saved, discarded, or removed on the device)
    DraftClosed { app_id: String },

    /// Asset list or upload status changed
    MediaUpdated { assets: Vec<String>, uploading: bool },

    /// A blocking notice was raised
    Notice { message: String },

    /// A user intent was rejected
    Error { message: String },

    /// Engine is shutting down
    Shutdown,
}

impl EngineEvent {
    /// Returns a short string label for this event type (for logging/debugging).
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ConnectionChanged { .. } => "connection_changed",
            Self::ConfigUpdated { .. } => "config_updated",
            Self::DraftChanged { .. } => "draft_changed",
            Self::DraftClosed { .. } => "draft_closed",
            Self::MediaUpdated { .. } => "media_updated",
            Self::Notice { .. } => "notice",
            Self::Error { .. } => "error",
            Self::Shutdown => "shutdown",
        }
    }
}

/// The observable parts of `AppState`, captured around each message.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StateView {
    pub connection: ConnectionState,
    pub config: Option<DeviceConfig>,
    pub draft: Option<AppEntry>,
    pub assets: Vec<String>,
    pub uploading: bool,
    pub notice: Option<String>,
}

impl StateView {
    pub fn capture(state: &crate::state::AppState) -> Self {
        Self {
            connection: state.connection,
            config: state.config().cloned(),
            draft: state.draft().cloned(),
            assets: state.media.assets().to_vec(),
            uploading: state.media.is_uploading(),
            notice: state.notice.as_ref().map(|n| n.message.clone()),
        }
    }

    /// Events describing the change from `self` to `after`, in a fixed order.
    pub fn diff(&self, after: &StateView) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        if self.connection != after.connection {
            events.push(EngineEvent::ConnectionChanged {
                state: after.connection,
            });
        }

        if self.config != after.config {
            if let Some(config) = &after.config {
                events.push(EngineEvent::ConfigUpdated {
                    config: config.clone(),
                });
            }
        }

        if self.draft != after.draft {
            match (&self.draft, &after.draft) {
                (_, Some(draft)) => events.push(EngineEvent::DraftChanged {
                    draft: draft.clone(),
                }),
                (Some(before), None) => events.push(EngineEvent::DraftClosed {
                    app_id: before.id.clone(),
                }),
                (None, None) => {}
            }
        }

        if self.assets != after.assets || self.uploading != after.uploading {
            events.push(EngineEvent::MediaUpdated {
                assets: after.assets.clone(),
                uploading: after.uploading,
            });
        }

        if self.notice != after.notice {
            if let Some(message) = &after.notice {
                events.push(EngineEvent::Notice {
                    message: message.clone(),
                });
            }
        }

        events
    }
}
