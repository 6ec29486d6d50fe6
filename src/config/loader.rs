// Configuration loader
// Loads ~/.wizcare/config.toml when present, then applies environment overrides

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::Config;

/// Default config location: ~/.wizcare/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".wizcare").join("config.toml"))
}

/// Load configuration from the default location, falling back to defaults
pub fn load_config() -> Result<Config> {
    let path = config_path()?;

    let mut config = if path.exists() {
        load_config_from(&path)?
    } else {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        Config::default()
    };

    config.apply_overrides(
        std::env::var("WIZCARE_API_URL").ok(),
        std::env::var("WIZCARE_DEBUG").ok(),
    );
    config.validate()?;

    Ok(config)
}

/// Load and validate a config file. Missing keys take their defaults.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    Ok(config)
}
