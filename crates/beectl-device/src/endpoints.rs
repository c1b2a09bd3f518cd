//! Addresses of the device's WebSocket and asset endpoints.

use url::Url;

use beectl_core::prelude::*;

/// Port the device control service listens on.
pub const DEFAULT_PORT: u16 = 5000;

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Base addresses derived from the device host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEndpoints {
    host: String,
    port: u16,
}

impl DeviceEndpoints {
    /// Build endpoints for `host`. `localhost` is pinned to the IPv4 loopback
    /// address so the WebSocket and HTTP clients resolve it the same way.
    pub fn new(host: &str, port: u16) -> Self {
        let host = host.trim();
        let host = if host.is_empty() || host.eq_ignore_ascii_case("localhost") {
            DEFAULT_HOST.to_string()
        } else {
            host.to_string()
        };
        Self { host, port }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn authority(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// `http://{host}:{port}`
    pub fn api_base(&self) -> Result<Url> {
        Url::parse(&format!("http://{}", self.authority()))
            .map_err(|e| Error::config(format!("invalid device host '{}': {e}", self.host)))
    }

    /// `ws://{host}:{port}/ws`
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.authority())
    }

    /// `{api}/api/media`
    pub fn media_index_url(&self) -> Result<Url> {
        let mut url = self.api_base()?;
        url.set_path("/api/media");
        Ok(url)
    }

    /// `{api}/media/{file_name}` with the file name percent-encoded.
    pub fn media_file_url(&self, file_name: &str) -> Result<Url> {
        let mut url = self.api_base()?;
        url.path_segments_mut()
            .map_err(|_| Error::config("device URL cannot carry a path"))?
            .clear()
            .push("media")
            .push(file_name);
        Ok(url)
    }
}

impl Default for DeviceEndpoints {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}
