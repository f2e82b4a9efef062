use std::env;
use std::path::Path;
use log::info;
use crate::config::{load_config, Config};
use crate::errors::InitError;
use crate::logging::setup_logger;

/// Environment variable holding the configuration file path
const CONFIG_PATH_VAR: &str = "CONFIG_PATH";

/// Default configuration file path
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Loads the configuration and starts logging
///
pub fn init() -> Result<Config, InitError> {
    let config_path = env::var(CONFIG_PATH_VAR).unwrap_or(DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&config_path)?;

    setup_logger(&config.general)?;

    info!("solar_forecast version: {}", env!("CARGO_PKG_VERSION"));
    if Path::new(&config_path).exists() {
        info!("configuration loaded from {}", config_path);
    } else {
        info!("no configuration file at {}, using defaults", config_path);
    }

    Ok(config)
}
