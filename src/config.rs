// src/config.rs

use crate::data::read_default_settings;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const API_URL_ENV: &str = "DRILL_STUDIO_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ajustes por defecto inválidos: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("la URL del API está vacía")]
    EmptyBaseUrl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    /// Generar imagen o short puede tardar minutos en el servidor.
    pub generation_timeout_secs: u64,
    /// Techo de grabación de audio; 0 desactiva el auto-stop.
    pub max_audio_seconds: u32,
    pub camera_settle_ms: u64,
    pub frame_poll_interval_ms: u64,
    pub frame_poll_max_attempts: u32,
    pub image_quality: f32,
    pub video_width: u32,
    pub video_height: u32,
}

impl Settings {
    /// Ajustes efectivos. La URL base se resuelve una sola vez, al arrancar.
    pub fn load(user_override: Option<&str>) -> Result<Self, ConfigError> {
        let mut settings = read_default_settings()?;
        let env_value = std::env::var(API_URL_ENV).ok();
        settings.api_base_url = resolve_api_base_url(
            user_override,
            env_value.as_deref(),
            &settings.api_base_url,
        )
        .ok_or(ConfigError::EmptyBaseUrl)?;
        Ok(settings)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn camera_settle(&self) -> f64 {
        self.camera_settle_ms as f64 / 1000.0
    }

    pub fn frame_poll_interval(&self) -> f64 {
        self.frame_poll_interval_ms as f64 / 1000.0
    }
}

fn normalize_base_url(value: &str) -> Option<String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn base_url_from_build_env() -> Option<String> {
    option_env!("DRILL_STUDIO_API_URL").and_then(normalize_base_url)
}

/// Primer valor no vacío de: ajuste del usuario, variable de entorno,
/// variable de compilación, valor por defecto.
pub fn resolve_api_base_url(
    user_override: Option<&str>,
    env_value: Option<&str>,
    default: &str,
) -> Option<String> {
    user_override
        .and_then(normalize_base_url)
        .or_else(|| env_value.and_then(normalize_base_url))
        .or_else(base_url_from_build_env)
        .or_else(|| normalize_base_url(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_and_trailing_slash_trimmed() {
        let url = resolve_api_base_url(
            Some("https://api.example.org/"),
            Some("http://env:9000"),
            "http://127.0.0.1:8000",
        );
        assert_eq!(url.as_deref(), Some("https://api.example.org"));
    }

    #[test]
    fn test_blank_values_are_skipped() {
        let url = resolve_api_base_url(Some("   "), Some("http://env:9000//"), "http://d");
        assert_eq!(url.as_deref(), Some("http://env:9000"));
    }

    #[test]
    fn test_generation_outlasts_plain_requests() {
        let settings = read_default_settings().unwrap();
        assert_eq!(settings.generation_timeout(), Duration::from_secs(180));
        assert!(settings.generation_timeout() > settings.request_timeout());
        assert!(settings.generation_timeout() > settings.upload_timeout());
    }

    #[test]
    fn test_default_used_last() {
        if option_env!("DRILL_STUDIO_API_URL").is_some() {
            return;
        }
        let url = resolve_api_base_url(None, None, "http://127.0.0.1:8000/");
        assert_eq!(url.as_deref(), Some("http://127.0.0.1:8000"));
        assert_eq!(resolve_api_base_url(None, Some(""), " "), None);
    }
}
