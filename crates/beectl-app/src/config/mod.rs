//! Configuration file parsing for beectl
//!
//! Lookup order: `--config <path>`, then `./.beectl/config.toml`, then the
//! per-user `beectl/config.toml` under the platform config directory.

pub mod settings;
pub mod types;

pub use settings::{find_config_file, init_config_dir, load_settings, user_config_path};
pub use types::*;
