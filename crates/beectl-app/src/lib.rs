//! # beectl-app - Application State and Orchestration
//!
//! Implements the TEA (The Elm Architecture) pattern for beectl: the device
//! state reconciler, the edit session, the asset library cache, and the engine
//! that feeds them from the device channel.
//!
//! ## Public API
//!
//! ### Engine
//! - [`Engine`] - Owns state, the message channel, the device channel and the
//!   asset store
//! - [`EngineEvent`] - State changes broadcast to front-ends
//!
//! ### TEA
//! - [`state::AppState`] - Complete application state (the Model)
//! - [`message::Message`] - All possible state transitions
//! - [`handler::update()`] - Pure state transition function
//! - [`UpdateAction`] - Side effects for the engine to run
//!
//! ### Device State
//! - [`reconciler::Reconciler`] - The one authoritative `DeviceConfig`
//! - [`edit_session::EditSession`] - The optional draft under edit
//! - [`media_library::MediaLibrary`] - Last-known asset list
//!
//! ### Configuration
//! - [`config::Settings`] - `.beectl/config.toml`
//! - [`config::load_settings()`] - Lookup and parse

pub mod actions;
pub mod config;
pub mod edit_session;
pub mod engine;
pub mod engine_event;
pub mod handler;
pub mod media_library;
pub mod message;
pub mod process;
pub mod reconciler;
pub mod state;

pub use edit_session::{DraftEdit, DraftOutcome, EditSession};
pub use engine::Engine;
pub use engine_event::EngineEvent;
pub use handler::{UpdateAction, UpdateResult};
pub use message::Message;
pub use reconciler::{ReconcileOutcome, Reconciler};
pub use state::{AppPhase, AppState, Notice};
