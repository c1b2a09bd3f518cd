//! # beectl-core - Core Domain Types
//!
//! Foundation crate for beectl. Provides the device configuration model, the
//! error taxonomy, logging setup and the editor's date/time conversion.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`DeviceConfig`] - The device's complete running configuration
//! - [`AppEntry`] - One installed app
//! - [`AppType`], [`Watchface`] - App rendering modes
//! - [`HexColor`] - `#rrggbb` color value
//! - [`ConnectionState`] - Command channel state (connecting, open, closed)
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum; only startup failures are fatal
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//!
//! ### Time (`time`)
//! - [`epoch_to_local_display()`], [`local_display_to_epoch()`] - Editor
//!   date/time conversion
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use beectl_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod time;
pub mod types;

/// Prelude for common imports used throughout all beectl crates
pub mod prelude {
    pub use super::error::{Error, Result};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result};
pub use time::{
    display_to_epoch_in, epoch_to_display_in, epoch_to_local_display, local_display_to_epoch,
};
pub use types::{AppEntry, AppType, ConnectionState, DeviceConfig, HexColor, Watchface};
