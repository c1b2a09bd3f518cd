//! Headless console - NDJSON events on stdout, line commands on stdin
//!
//! Everything the engine reports is printed as newline-delimited JSON, one
//! event per line, each with an `"event"` tag and a millisecond `timestamp`.
//! Logs never go to stdout.
//!
//! # Example Output
//!
//! ```json
//! {"event":"connection","state":"open","timestamp":1704700001000}
//! {"event":"config","active_app_id":"a1","config":{...},"timestamp":1704700001050}
//! {"event":"draft","draft":{...},"target_time":"","timestamp":1704700002000}
//! ```

pub mod commands;
pub mod runner;

use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use tracing::error;

use beectl_app::EngineEvent;
use beectl_core::{epoch_to_local_display, AppEntry, ConnectionState, DeviceConfig};

/// Events emitted by the headless console
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// Command channel state changed
    Connection {
        state: ConnectionState,
        timestamp: i64,
    },

    /// Current device configuration
    Config {
        active_app_id: String,
        active_app_name: Option<String>,
        config: DeviceConfig,
        timestamp: i64,
    },

    /// The draft under edit
    Draft {
        draft: AppEntry,
        /// Local wall-clock rendering of the draft timestamp
        target_time: String,
        timestamp: i64,
    },

    /// The draft is gone
    DraftClosed { app_id: String, timestamp: i64 },

    /// Asset library
    Media {
        assets: Vec<String>,
        uploading: bool,
        timestamp: i64,
    },

    /// Address of one asset
    Url {
        file: String,
        url: String,
        timestamp: i64,
    },

    /// Summary for the `status` command
    Status {
        connection: ConnectionState,
        active_app_id: Option<String>,
        apps: usize,
        editing: Option<String>,
        uploading: bool,
        notice: Option<String>,
        timestamp: i64,
    },

    /// Blocking notice; stays until `ack`
    Notice { message: String, timestamp: i64 },

    /// Error occurred
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },

    /// Console is exiting
    Shutdown { timestamp: i64 },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn connection(state: ConnectionState) -> Self {
        Self::Connection {
            state,
            timestamp: Self::now(),
        }
    }

    pub fn config(config: &DeviceConfig) -> Self {
        Self::Config {
            active_app_id: config.active_app_id.clone(),
            active_app_name: config.active_app().map(|app| app.name.clone()),
            config: config.clone(),
            timestamp: Self::now(),
        }
    }

    pub fn draft(draft: &AppEntry) -> Self {
        Self::Draft {
            target_time: epoch_to_local_display(draft.timestamp),
            draft: draft.clone(),
            timestamp: Self::now(),
        }
    }

    pub fn draft_closed(app_id: &str) -> Self {
        Self::DraftClosed {
            app_id: app_id.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn media(assets: &[String], uploading: bool) -> Self {
        Self::Media {
            assets: assets.to_vec(),
            uploading,
            timestamp: Self::now(),
        }
    }

    pub fn url(file: &str, url: String) -> Self {
        Self::Url {
            file: file.to_string(),
            url,
            timestamp: Self::now(),
        }
    }

    pub fn notice(message: String) -> Self {
        Self::Notice {
            message,
            timestamp: Self::now(),
        }
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }

    pub fn shutdown() -> Self {
        Self::Shutdown {
            timestamp: Self::now(),
        }
    }
}

impl From<EngineEvent> for HeadlessEvent {
    fn from(event: EngineEvent) -> Self {
        match event {
            EngineEvent::ConnectionChanged { state } => Self::connection(state),
            EngineEvent::ConfigUpdated { config } => Self::config(&config),
            EngineEvent::DraftChanged { draft } => Self::draft(&draft),
            EngineEvent::DraftClosed { app_id } => Self::draft_closed(&app_id),
            EngineEvent::MediaUpdated { assets, uploading } => Self::media(&assets, uploading),
            EngineEvent::Notice { message } => Self::notice(message),
            EngineEvent::Error { message } => Self::error(message, false),
            EngineEvent::Shutdown => Self::shutdown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_value(event: &HeadlessEvent) -> serde_json::Value {
        serde_json::to_value(event).unwrap()
    }

    #[test]
    fn test_connection_serialization() {
        let json = to_value(&HeadlessEvent::connection(ConnectionState::Open));
        assert_eq!(json["event"], "connection");
        assert_eq!(json["state"], "open");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_config_serialization_uses_wire_names() {
        let mut app = AppEntry::new("a1", "Clock");
        app.background = Some("sky.png".into());
        let config = DeviceConfig {
            active_app_id: "a1".into(),
            applications: vec![app],
            ..Default::default()
        };

        let json = to_value(&HeadlessEvent::config(&config));
        assert_eq!(json["event"], "config");
        assert_eq!(json["active_app_name"], "Clock");
        assert_eq!(json["config"]["applications"][0]["type"], "clock");
        assert_eq!(json["config"]["applications"][0]["background"], "sky.png");
    }

    #[test]
    fn test_draft_without_timestamp_has_empty_target_time() {
        let json = to_value(&HeadlessEvent::draft(&AppEntry::new("a1", "Clock")));
        assert_eq!(json["event"], "draft");
        assert_eq!(json["target_time"], "");
        assert_eq!(json["draft"]["id"], "a1");
    }

    #[test]
    fn test_draft_closed_serialization() {
        let json = to_value(&HeadlessEvent::draft_closed("a2"));
        assert_eq!(json["event"], "draft_closed");
        assert_eq!(json["app_id"], "a2");
    }

    #[test]
    fn test_engine_error_is_not_fatal() {
        let event: HeadlessEvent = EngineEvent::Error {
            message: "No app is open for editing".into(),
        }
        .into();
        let json = to_value(&event);
        assert_eq!(json["event"], "error");
        assert_eq!(json["fatal"], false);
    }

    #[test]
    fn test_media_serialization() {
        let event: HeadlessEvent = EngineEvent::MediaUpdated {
            assets: vec!["a.png".into()],
            uploading: true,
        }
        .into();
        let json = to_value(&event);
        assert_eq!(json["event"], "media");
        assert_eq!(json["assets"][0], "a.png");
        assert_eq!(json["uploading"], true);
    }
}
