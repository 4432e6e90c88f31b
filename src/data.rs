// src/data.rs

use crate::config::{ConfigError, Settings};

/// Carga los ajustes por defecto desde el YAML embebido
pub fn read_default_settings() -> Result<Settings, ConfigError> {
    let file_content = include_str!("data/default_settings.yaml");
    Ok(serde_yaml::from_str(file_content)?)
}
