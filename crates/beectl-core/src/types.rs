//! Device configuration domain types
//!
//! These mirror the JSON the device pushes. Field names follow the wire format
//! (`active_app_id`, `base-color`, ...). Unknown fields are kept in `extra` so
//! that an `updateApp` built from a draft echoes them back untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Enums
// ─────────────────────────────────────────────────────────────────────────────

/// What an app displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppType {
    /// Wall clock. The app timestamp is ignored.
    #[default]
    Clock,
    /// Time elapsed since the app timestamp.
    TimeElapsed,
    /// Time remaining until the app timestamp.
    Countdown,
}

impl AppType {
    pub const ALL: [AppType; 3] = [AppType::Clock, AppType::TimeElapsed, AppType::Countdown];

    /// Wire name, as used in `type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppType::Clock => "clock",
            AppType::TimeElapsed => "time-elapsed",
            AppType::Countdown => "countdown",
        }
    }

    /// Short label used by front-ends.
    pub fn label(&self) -> &'static str {
        match self {
            AppType::Clock => "Clock",
            AppType::TimeElapsed => "Elapsed",
            AppType::Countdown => "Countdown",
        }
    }

    /// Whether the app timestamp means anything for this type.
    pub fn uses_timestamp(&self) -> bool {
        !matches!(self, AppType::Clock)
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        AppType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s) || t.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_edit(format!("unknown app type '{s}'")))
    }
}

/// How an app is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Watchface {
    #[default]
    Clock,
    SevenSegment,
    RoundProgressBar,
}

impl Watchface {
    pub const ALL: [Watchface; 3] = [
        Watchface::Clock,
        Watchface::SevenSegment,
        Watchface::RoundProgressBar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Watchface::Clock => "clock",
            Watchface::SevenSegment => "seven-segment",
            Watchface::RoundProgressBar => "round-progress-bar",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Watchface::Clock => "Analog",
            Watchface::SevenSegment => "Digital",
            Watchface::RoundProgressBar => "Progress",
        }
    }
}

impl fmt::Display for Watchface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Watchface {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Watchface::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(s) || w.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_edit(format!("unknown watchface '{s}'")))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HexColor
// ─────────────────────────────────────────────────────────────────────────────

/// A `#rrggbb` color string.
///
/// Values received from the device are taken as-is; only [`HexColor::parse`]
/// validates, which is what the editor uses for user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexColor(String);

impl HexColor {
    /// Editor default for an absent base color.
    pub const DEFAULT_BASE: &'static str = "#000000";
    /// Editor default for an absent accent color.
    pub const DEFAULT_ACCENT: &'static str = "#ffffff";

    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or_else(|| Error::invalid_edit(format!("color '{input}' must start with '#'")))?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::invalid_edit(format!(
                "color '{input}' must be #rrggbb"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AppEntry
// ─────────────────────────────────────────────────────────────────────────────

/// One installed app on the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppEntry {
    /// Opaque identifier, unique within `applications` and never changed.
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default)]
    pub app_type: AppType,

    #[serde(default)]
    pub watchface: Watchface,

    /// Epoch seconds. Only meaningful when `app_type` is not `Clock`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    /// Asset filename used as the background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    #[serde(rename = "base-color", default, skip_serializing_if = "Option::is_none")]
    pub base_color: Option<HexColor>,

    #[serde(rename = "accent-color", default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<HexColor>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Fields this client does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_enabled() -> bool {
    true
}

impl AppEntry {
    /// A minimal entry, as sent by `addApp`.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            app_type: AppType::Clock,
            watchface: Watchface::Clock,
            timestamp: None,
            background: None,
            base_color: None,
            accent_color: None,
            enabled: true,
            extra: Map::new(),
        }
    }

    /// Background filename, treating an empty string as none.
    pub fn background(&self) -> Option<&str> {
        self.background.as_deref().filter(|b| !b.is_empty())
    }

    pub fn base_color_or_default(&self) -> &str {
        self.base_color
            .as_ref()
            .map(HexColor::as_str)
            .unwrap_or(HexColor::DEFAULT_BASE)
    }

    pub fn accent_color_or_default(&self) -> &str {
        self.accent_color
            .as_ref()
            .map(HexColor::as_str)
            .unwrap_or(HexColor::DEFAULT_ACCENT)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DeviceConfig
// ─────────────────────────────────────────────────────────────────────────────

/// The device's complete running configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Config version marker. A `result` only counts as a snapshot when this
    /// is set (not null, `false`, `0` or `""`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,

    #[serde(default)]
    pub active_app_id: String,

    /// Apps in display order.
    #[serde(default)]
    pub applications: Vec<AppEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceConfig {
    pub fn find_app(&self, id: &str) -> Option<&AppEntry> {
        self.applications.iter().find(|app| app.id == id)
    }

    pub fn contains_app(&self, id: &str) -> bool {
        self.find_app(id).is_some()
    }

    pub fn active_app(&self) -> Option<&AppEntry> {
        self.find_app(&self.active_app_id)
    }

    /// Whether `active_app_id` references one of `applications`.
    pub fn active_app_is_valid(&self) -> bool {
        self.active_app().is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ConnectionState
// ─────────────────────────────────────────────────────────────────────────────

/// State of the device command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// A connection attempt is in progress.
    #[default]
    Connecting,
    /// Connected; commands are delivered.
    Open,
    /// Disconnected; commands are dropped until the next successful attempt.
    Closed,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Closed => write!(f, "closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_config() -> DeviceConfig {
        serde_json::from_value(json!({
            "version": 3,
            "active_app_id": "a2",
            "applications": [
                {"id": "a1", "name": "Clock", "type": "clock", "watchface": "clock", "enabled": true},
                {
                    "id": "a2",
                    "name": "Launch",
                    "type": "countdown",
                    "watchface": "round-progress-bar",
                    "timestamp": 1700000000,
                    "background": "rocket.png",
                    "base-color": "#112233",
                    "accent-color": "#ffcc00",
                    "enabled": false,
                    "brightness": 80
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_device_config() {
        let config = sample_config();
        assert_eq!(config.active_app_id, "a2");
        assert_eq!(config.applications.len(), 2);

        let launch = config.find_app("a2").unwrap();
        assert_eq!(launch.app_type, AppType::Countdown);
        assert_eq!(launch.watchface, Watchface::RoundProgressBar);
        assert_eq!(launch.timestamp, Some(1700000000));
        assert_eq!(launch.base_color.as_ref().unwrap().as_str(), "#112233");
        assert!(!launch.enabled);
        assert_eq!(launch.extra.get("brightness"), Some(&json!(80)));
    }

    #[test]
    fn test_application_order_is_preserved() {
        let config = sample_config();
        let ids: Vec<&str> = config.applications.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
    }

    #[test]
    fn test_app_entry_defaults_for_missing_fields() {
        let app: AppEntry = serde_json::from_value(json!({"id": "x"})).unwrap();
        assert_eq!(app.app_type, AppType::Clock);
        assert_eq!(app.watchface, Watchface::Clock);
        assert!(app.enabled);
        assert!(app.timestamp.is_none());
    }

    #[test]
    fn test_app_entry_serializes_wire_names_and_extra_fields() {
        let config = sample_config();
        let value = serde_json::to_value(config.find_app("a2").unwrap()).unwrap();
        assert_eq!(value["type"], "countdown");
        assert_eq!(value["base-color"], "#112233");
        assert_eq!(value["accent-color"], "#ffcc00");
        assert_eq!(value["brightness"], 80);
        assert!(value.get("app_type").is_none());
    }

    #[test]
    fn test_absent_optionals_are_not_serialized() {
        let value = serde_json::to_value(AppEntry::new("a1", "Clock")).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("timestamp"));
        assert!(!obj.contains_key("background"));
        assert!(!obj.contains_key("base-color"));
    }

    #[test]
    fn test_active_app_lookup() {
        let mut config = sample_config();
        assert_eq!(config.active_app().unwrap().name, "Launch");
        assert!(config.active_app_is_valid());

        config.active_app_id = "gone".to_string();
        assert!(!config.active_app_is_valid());
    }

    #[test]
    fn test_empty_background_is_none() {
        let mut app = AppEntry::new("a1", "Clock");
        app.background = Some(String::new());
        assert_eq!(app.background(), None);
        app.background = Some("sky.png".to_string());
        assert_eq!(app.background(), Some("sky.png"));
    }

    #[test]
    fn test_color_defaults() {
        let app = AppEntry::new("a1", "Clock");
        assert_eq!(app.base_color_or_default(), "#000000");
        assert_eq!(app.accent_color_or_default(), "#ffffff");
    }

    #[test]
    fn test_hex_color_parse() {
        assert_eq!(HexColor::parse("#A1b2C3").unwrap().as_str(), "#A1b2C3");
        assert!(HexColor::parse("a1b2c3").is_err());
        assert!(HexColor::parse("#fff").is_err());
        assert!(HexColor::parse("#gggggg").is_err());
    }

    #[test]
    fn test_enum_from_str_accepts_wire_names_and_labels() {
        assert_eq!("time-elapsed".parse::<AppType>().unwrap(), AppType::TimeElapsed);
        assert_eq!("Elapsed".parse::<AppType>().unwrap(), AppType::TimeElapsed);
        assert_eq!("digital".parse::<Watchface>().unwrap(), Watchface::SevenSegment);
        assert!("hologram".parse::<Watchface>().is_err());
    }

    #[test]
    fn test_uses_timestamp() {
        assert!(!AppType::Clock.uses_timestamp());
        assert!(AppType::Countdown.uses_timestamp());
        assert!(AppType::TimeElapsed.uses_timestamp());
    }

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Open.to_string(), "open");
        assert_eq!(ConnectionState::default(), ConnectionState::Connecting);
        assert!(!ConnectionState::Closed.is_open());
    }
}
