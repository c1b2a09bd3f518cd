//! # beectl-device - Device Communication
//!
//! Talks to the device control service: a self-healing WebSocket JSON-RPC
//! command channel, plus an HTTP client for the asset library.
//!
//! Depends on [`beectl_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Command Channel
//! - [`DeviceChannel`] - Background connection task with fixed-delay reconnect
//! - [`ChannelHandle`] - Clonable fire-and-forget command sender
//! - [`ChannelEvent`] - Connection changes and classified inbound messages
//!
//! ### Protocol
//! - [`DeviceCommand`] - `getConfig`, `setActiveApp`, `addApp`, `removeApp`, `updateApp`
//! - [`DeviceMessage`] - Snapshot / stateChanged / unknown
//! - [`parse_device_message()`] - Classify a raw inbound frame
//!
//! ### Asset Library
//! - [`MediaStore`] - List, upload, fetch and resolve assets
//! - [`HttpMediaStore`] - reqwest-backed implementation
//! - [`DeviceEndpoints`] - Host/port to WebSocket and HTTP addresses

pub mod channel;
pub mod endpoints;
pub mod media;
pub mod protocol;

pub use channel::{
    ChannelEvent, ChannelHandle, ChannelOptions, DeviceChannel, DEFAULT_RECONNECT_DELAY,
};
#[cfg(any(test, feature = "test-helpers"))]
pub use channel::TestCommandSink;
pub use bytes::Bytes;
pub use endpoints::{DeviceEndpoints, DEFAULT_HOST, DEFAULT_PORT};
pub use media::{HttpMediaStore, LocalMediaStore, MediaStore, UPLOAD_FIELD};
pub use protocol::{
    next_request_id, parse_device_message, DeviceCommand, DeviceMessage, DeviceRequest, NewApp,
};
