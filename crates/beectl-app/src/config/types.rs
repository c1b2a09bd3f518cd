//! Configuration types for beectl

use std::time::Duration;

use serde::{Deserialize, Serialize};

use beectl_device::{DeviceEndpoints, DEFAULT_HOST, DEFAULT_PORT};

/// Application settings (`.beectl/config.toml`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub device: DeviceSettings,

    #[serde(default)]
    pub connection: ConnectionSettings,

    #[serde(default)]
    pub media: MediaSettings,
}

impl Settings {
    pub fn endpoints(&self) -> DeviceEndpoints {
        DeviceEndpoints::new(&self.device.host, self.device.port)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.connection.reconnect_delay_ms)
    }

    pub fn media_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.media.refresh_delay_ms)
    }
}

/// Where the device lives
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeviceSettings {
    /// Hostname or address. `localhost` is treated as `127.0.0.1`.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Command channel settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Fixed delay between reconnect attempts
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

/// Asset library settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MediaSettings {
    /// Wait after a successful upload before listing again
    #[serde(default = "default_refresh_delay_ms")]
    pub refresh_delay_ms: u64,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            refresh_delay_ms: default_refresh_delay_ms(),
        }
    }
}

fn default_refresh_delay_ms() -> u64 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.device.host, "127.0.0.1");
        assert_eq!(settings.device.port, 5000);
        assert_eq!(settings.reconnect_delay(), Duration::from_secs(3));
        assert_eq!(settings.media_refresh_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [device]
            host = "bee.local"
            "#,
        )
        .unwrap();
        assert_eq!(settings.device.host, "bee.local");
        assert_eq!(settings.device.port, 5000);
        assert_eq!(settings.connection.reconnect_delay_ms, 3000);
    }

    #[test]
    fn test_endpoints_from_settings() {
        let mut settings = Settings::default();
        settings.device.host = "localhost".to_string();
        settings.device.port = 8080;
        assert_eq!(settings.endpoints().ws_url(), "ws://127.0.0.1:8080/ws");
    }
}
