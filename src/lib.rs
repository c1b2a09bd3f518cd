//! beectl - remote control client for multi-app display devices
//!
//! The library half of the `beectl` binary: a headless console that drives
//! the engine from stdin and reports state as NDJSON on stdout.

pub mod headless;

pub use headless::runner::run_headless;
pub use headless::HeadlessEvent;
