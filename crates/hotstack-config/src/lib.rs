pub mod error;
pub mod settings;

pub use error::*;
pub use settings::{BmhSettings, ConnectivitySettings, Settings, SmokeTestSettings};

use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "HOTSTACK_CONFIG_PATH";

/// Locate the HotStack settings file
///
/// Search order:
/// 1. `HOTSTACK_CONFIG_PATH` (must exist when set)
/// 2. current directory: `hotstack.yaml`, `.hotstack.yaml`
/// 3. `~/.config/hotstack/config.yaml`
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::ConfigPathMissing(path));
    }

    let current_dir = std::env::current_dir()?;
    for filename in ["hotstack.yaml", ".hotstack.yaml"] {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("hotstack").join("config.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// Read and validate a settings file
pub fn load_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    let settings = Settings::from_yaml(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from the discovered file, falling back to defaults when there is none
pub fn load() -> Result<Settings> {
    match find_config_file() {
        Ok(path) => {
            tracing::debug!("Loading settings from {}", path.display());
            load_from(&path)
        }
        Err(ConfigError::ConfigFileNotFound) => {
            tracing::debug!("No settings file found, using defaults");
            Ok(Settings::default())
        }
        Err(e) => Err(e),
    }
}
