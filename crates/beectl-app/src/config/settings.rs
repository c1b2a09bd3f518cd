//! Settings loader for `.beectl/config.toml`

use std::path::{Path, PathBuf};

use beectl_core::prelude::*;

use super::types::Settings;

const CONFIG_FILENAME: &str = "config.toml";
const BEECTL_DIR: &str = ".beectl";
const APP_NAME: &str = "beectl";

/// Per-user config file, e.g. `~/.config/beectl/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILENAME))
}

/// First existing config file: `{project}/.beectl/config.toml`, then the
/// per-user file.
pub fn find_config_file(project_path: &Path) -> Option<PathBuf> {
    let local = project_path.join(BEECTL_DIR).join(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }
    user_config_path().filter(|path| path.exists())
}

/// Load settings.
///
/// An explicit path must exist. Otherwise the lookup falls through to
/// [`find_config_file`], and anything missing or unreadable yields defaults.
pub fn load_settings(explicit: Option<&Path>, project_path: &Path) -> Result<Settings> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        return Ok(read_settings(path));
    }

    match find_config_file(project_path) {
        Some(path) => Ok(read_settings(&path)),
        None => {
            debug!("No config file found, using defaults");
            Ok(Settings::default())
        }
    }
}

fn read_settings(config_path: &Path) -> Settings {
    match std::fs::read_to_string(config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Create `.beectl/config.toml` with commented defaults, if it is missing.
pub fn init_config_dir(project_path: &Path) -> Result<PathBuf> {
    let beectl_dir = project_path.join(BEECTL_DIR);

    if !beectl_dir.exists() {
        std::fs::create_dir_all(&beectl_dir)
            .map_err(|e| Error::config(format!("Failed to create .beectl dir: {}", e)))?;
    }

    let config_path = beectl_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        let default_content = r#"# beectl configuration

[device]
host = "127.0.0.1"      # "localhost" is treated as 127.0.0.1
port = 5000

[connection]
reconnect_delay_ms = 3000   # Fixed delay between reconnect attempts

[media]
refresh_delay_ms = 500      # Re-list assets this long after an upload
"#;
        std::fs::write(&config_path, default_content)
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
    }

    Ok(config_path)
}
