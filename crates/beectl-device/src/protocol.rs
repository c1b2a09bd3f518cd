//! JSON-RPC 2.0 wire types for the device control service.
//!
//! Outbound traffic is fire-and-forget: every command is wrapped in a request
//! envelope with an `id`, but the device never answers a command with anything
//! other than its general state push, so ids are not correlated.
//!
//! Inbound frames are classified once, here, into [`DeviceMessage`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::{json, Value};

use beectl_core::prelude::*;
use beectl_core::{AppEntry, AppType, DeviceConfig};

// ---------------------------------------------------------------------------
// Method names
// ---------------------------------------------------------------------------

pub mod method {
    pub const GET_CONFIG: &str = "getConfig";
    pub const SET_ACTIVE_APP: &str = "setActiveApp";
    pub const ADD_APP: &str = "addApp";
    pub const REMOVE_APP: &str = "removeApp";
    pub const UPDATE_APP: &str = "updateApp";
    pub const STATE_CHANGED: &str = "stateChanged";
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Parameters of an `addApp` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewApp {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub app_type: AppType,
    pub enabled: bool,
}

impl NewApp {
    /// Name given to apps created from the dashboard.
    pub const DEFAULT_NAME: &'static str = "New Entry";

    /// A fresh clock app with an id derived from `now_millis`.
    pub fn with_timestamp(now_millis: i64) -> Self {
        Self {
            id: format!("app-{now_millis}"),
            name: Self::DEFAULT_NAME.to_string(),
            app_type: AppType::Clock,
            enabled: true,
        }
    }
}

/// A mutation or query sent to the device.
///
/// Sending a command never changes local state. The effect becomes visible
/// only when the device pushes its resulting configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// Ask for a full snapshot.
    GetConfig,
    SetActiveApp { app_id: String },
    AddApp(NewApp),
    RemoveApp { id: String },
    /// Replace an app with the full entry.
    UpdateApp(AppEntry),
}

impl DeviceCommand {
    pub fn method(&self) -> &'static str {
        match self {
            DeviceCommand::GetConfig => method::GET_CONFIG,
            DeviceCommand::SetActiveApp { .. } => method::SET_ACTIVE_APP,
            DeviceCommand::AddApp(_) => method::ADD_APP,
            DeviceCommand::RemoveApp { .. } => method::REMOVE_APP,
            DeviceCommand::UpdateApp(_) => method::UPDATE_APP,
        }
    }

    pub fn params(&self) -> Result<Value> {
        let params = match self {
            DeviceCommand::GetConfig => json!({}),
            DeviceCommand::SetActiveApp { app_id } => json!({ "app_id": app_id }),
            DeviceCommand::AddApp(app) => serde_json::to_value(app)?,
            DeviceCommand::RemoveApp { id } => json!({ "id": id }),
            DeviceCommand::UpdateApp(entry) => serde_json::to_value(entry)?,
        };
        Ok(params)
    }

    /// Wrap this command in a request envelope with a fresh id.
    pub fn into_request(self) -> Result<DeviceRequest> {
        Ok(DeviceRequest {
            jsonrpc: "2.0",
            method: self.method(),
            params: self.params()?,
            id: next_request_id(),
        })
    }
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
pub struct DeviceRequest {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: Value,
    /// Wall-clock milliseconds, bumped so ids never repeat within a process.
    pub id: u64,
}

impl DeviceRequest {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

static LAST_REQUEST_ID: AtomicU64 = AtomicU64::new(0);

/// Generate a request id from the wall clock, strictly increasing.
pub fn next_request_id() -> u64 {
    let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
    let mut last = LAST_REQUEST_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_REQUEST_ID.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed)
        {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

// ---------------------------------------------------------------------------
// Inbound messages
// ---------------------------------------------------------------------------

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceMessage {
    /// A response carrying a full configuration.
    Snapshot(DeviceConfig),
    /// An unsolicited `stateChanged` push.
    StateChanged(DeviceConfig),
    /// Anything else. Carries the raw text for logging.
    Unknown(String),
}

impl DeviceMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            DeviceMessage::Snapshot(_) => "snapshot",
            DeviceMessage::StateChanged(_) => "stateChanged",
            DeviceMessage::Unknown(_) => "unknown",
        }
    }
}

/// Parse a raw WebSocket text frame into a [`DeviceMessage`].
///
/// Dispatch logic:
/// - `result` object with a set `version` → [`DeviceMessage::Snapshot`]
/// - `method == "stateChanged"` with `params` → [`DeviceMessage::StateChanged`]
/// - anything else, or a payload that is not a valid configuration →
///   [`DeviceMessage::Unknown`]
pub fn parse_device_message(text: &str) -> DeviceMessage {
    let mut value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => return DeviceMessage::Unknown(text.to_string()),
    };

    if let Some(result) = value.get_mut("result").filter(|r| is_snapshot_result(r)) {
        return match serde_json::from_value::<DeviceConfig>(result.take()) {
            Ok(config) => DeviceMessage::Snapshot(config),
            Err(_) => DeviceMessage::Unknown(text.to_string()),
        };
    }

    if value.get("method").and_then(Value::as_str) == Some(method::STATE_CHANGED) {
        if let Some(params) = value.get_mut("params").filter(|p| p.is_object()) {
            return match serde_json::from_value::<DeviceConfig>(params.take()) {
                Ok(config) => DeviceMessage::StateChanged(config),
                Err(_) => DeviceMessage::Unknown(text.to_string()),
            };
        }
    }

    DeviceMessage::Unknown(text.to_string())
}

/// A config reply carries a `version` that is set: not null, `false`, zero or
/// an empty string.
fn is_snapshot_result(result: &Value) -> bool {
    match result.get("version") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(set)) => *set,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_JSON: &str = r#"{"version":"1.2","active_app_id":"a1","applications":[{"id":"a1","name":"Clock","type":"clock"}]}"#;

    #[test]
    fn test_parse_snapshot_response() {
        let text = format!(r#"{{"jsonrpc":"2.0","id":5,"result":{CONFIG_JSON}}}"#);
        match parse_device_message(&text) {
            DeviceMessage::Snapshot(config) => {
                assert_eq!(config.active_app_id, "a1");
                assert_eq!(config.applications[0].name, "Clock");
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_state_changed_notification() {
        let text = format!(r#"{{"jsonrpc":"2.0","method":"stateChanged","params":{CONFIG_JSON}}}"#);
        assert!(matches!(
            parse_device_message(&text),
            DeviceMessage::StateChanged(_)
        ));
    }

    #[test]
    fn test_state_changed_does_not_need_version() {
        let text = r#"{"method":"stateChanged","params":{"active_app_id":"a1","applications":[]}}"#;
        assert!(matches!(
            parse_device_message(text),
            DeviceMessage::StateChanged(_)
        ));
    }

    #[test]
    fn test_result_without_version_is_unknown() {
        let text = r#"{"jsonrpc":"2.0","id":1,"result":{"active_app_id":"a1","applications":[]}}"#;
        assert!(matches!(parse_device_message(text), DeviceMessage::Unknown(_)));

        let text = r#"{"jsonrpc":"2.0","id":1,"result":{"version":null,"applications":[]}}"#;
        assert!(matches!(parse_device_message(text), DeviceMessage::Unknown(_)));
    }

    #[test]
    fn test_unset_version_values_are_not_snapshots() {
        for version in ["0", "0.0", "false", r#""""#] {
            let text = format!(
                r#"{{"result":{{"version":{version},"active_app_id":"a1","applications":[]}}}}"#
            );
            assert!(
                matches!(parse_device_message(&text), DeviceMessage::Unknown(_)),
                "version {version} was accepted"
            );
        }

        for version in ["1", "-3", "true", r#""0""#, "{}"] {
            let text = format!(
                r#"{{"result":{{"version":{version},"active_app_id":"a1","applications":[]}}}}"#
            );
            assert!(
                matches!(parse_device_message(&text), DeviceMessage::Snapshot(_)),
                "version {version} was rejected"
            );
        }
    }

    #[test]
    fn test_plain_ack_result_is_unknown() {
        let text = r#"{"jsonrpc":"2.0","id":1,"result":"ok"}"#;
        assert!(matches!(parse_device_message(text), DeviceMessage::Unknown(_)));
    }

    #[test]
    fn test_error_response_is_unknown() {
        let text = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"no"}}"#;
        assert!(matches!(parse_device_message(text), DeviceMessage::Unknown(_)));
    }

    #[test]
    fn test_other_notification_is_unknown() {
        let text = format!(r#"{{"method":"somethingElse","params":{CONFIG_JSON}}}"#);
        assert!(matches!(parse_device_message(&text), DeviceMessage::Unknown(_)));
    }

    #[test]
    fn test_malformed_payloads_are_unknown() {
        assert!(matches!(parse_device_message("not json"), DeviceMessage::Unknown(_)));
        assert!(matches!(parse_device_message("[1,2,3]"), DeviceMessage::Unknown(_)));
        // applications is not a list
        let text = r#"{"method":"stateChanged","params":{"applications":"nope"}}"#;
        assert!(matches!(parse_device_message(text), DeviceMessage::Unknown(_)));
    }

    #[test]
    fn test_get_config_request_format() {
        let request = DeviceCommand::GetConfig.into_request().unwrap();
        let val: Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();

        assert_eq!(val["jsonrpc"], "2.0");
        assert_eq!(val["method"], "getConfig");
        assert_eq!(val["params"], json!({}));
        assert!(val["id"].is_u64());
    }

    #[test]
    fn test_set_active_app_params() {
        let cmd = DeviceCommand::SetActiveApp {
            app_id: "a1".to_string(),
        };
        assert_eq!(cmd.method(), "setActiveApp");
        assert_eq!(cmd.params().unwrap(), json!({ "app_id": "a1" }));
    }

    #[test]
    fn test_add_app_params() {
        let cmd = DeviceCommand::AddApp(NewApp::with_timestamp(1700000000123));
        assert_eq!(cmd.method(), "addApp");
        assert_eq!(
            cmd.params().unwrap(),
            json!({ "id": "app-1700000000123", "name": "New Entry", "type": "clock", "enabled": true })
        );
    }

    #[test]
    fn test_remove_app_params() {
        let cmd = DeviceCommand::RemoveApp {
            id: "a9".to_string(),
        };
        assert_eq!(cmd.method(), "removeApp");
        assert_eq!(cmd.params().unwrap(), json!({ "id": "a9" }));
    }

    #[test]
    fn test_update_app_sends_full_entry() {
        let mut entry = AppEntry::new("a1", "Desk Clock");
        entry.timestamp = Some(1700000000);
        entry.extra.insert("brightness".to_string(), json!(40));

        let params = DeviceCommand::UpdateApp(entry).params().unwrap();
        assert_eq!(params["id"], "a1");
        assert_eq!(params["name"], "Desk Clock");
        assert_eq!(params["type"], "clock");
        assert_eq!(params["timestamp"], 1700000000);
        assert_eq!(params["enabled"], true);
        assert_eq!(params["brightness"], 40);
    }

    #[test]
    fn test_request_ids_strictly_increase() {
        let ids: Vec<u64> = (0..100).map(|_| next_request_id()).collect();
        assert!(ids.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_request_ids_track_wall_clock() {
        let now = chrono::Utc::now().timestamp_millis() as u64;
        assert!(next_request_id() >= now);
    }
}
