use crate::model::{
    Drill, DrillId, DrillUpdate, GeneratedImage, GeneratedShort, HealthStatus, MediaBlob,
    MediaKind, NewTestAttempt, Short, Test, TestAttempt, TestId, TestInput, TestStats,
    UploadedMedia,
};
use thiserror::Error;

pub mod http;

#[cfg(test)]
pub mod fake;

pub use http::HttpClient;

/// Fallos de red/servidor, separados para que la UI pueda decir algo útil.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("la petición superó el tiempo límite")]
    Timeout,
    #[error("el archivo es demasiado grande para el servidor")]
    PayloadTooLarge,
    #[error("el servidor no acepta este formato de archivo")]
    UnsupportedMediaType,
    #[error("no encontrado: {0}")]
    NotFound(String),
    #[error("el servidor respondió {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("error de red: {0}")]
    Network(String),
    #[error("respuesta inválida del servidor: {0}")]
    Decode(String),
    #[error("no hay nada que subir: la grabación está vacía")]
    EmptyPayload,
}

impl ApiError {
    /// Construye el error a partir de un código HTTP no exitoso y su cuerpo.
    /// FastAPI devuelve `{"detail": ...}`; si no, se usa el cuerpo en crudo.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| match v.get("detail") {
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
                None => None,
            })
            .unwrap_or_else(|| body.trim().to_string());

        match status {
            408 | 504 => ApiError::Timeout,
            413 => ApiError::PayloadTooLarge,
            415 => ApiError::UnsupportedMediaType,
            404 => ApiError::NotFound(detail),
            _ => ApiError::Status { status, detail },
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ApiError::Timeout => {
                "⏱ El servidor tardó demasiado. Vuelve a intentarlo.".to_string()
            }
            ApiError::PayloadTooLarge => {
                "📦 El archivo es demasiado grande. Graba algo más corto.".to_string()
            }
            ApiError::UnsupportedMediaType => {
                "🚫 El servidor no acepta este formato. Prueba otro navegador o archivo.".to_string()
            }
            ApiError::EmptyPayload => {
                "⚠ La grabación salió vacía; no se ha subido. Graba de nuevo.".to_string()
            }
            other => format!("❌ {other}"),
        }
    }
}

/// Operaciones del API REST remoto que usa la aplicación.
///
/// Es síncrono: la UI lo ejecuta siempre fuera del hilo de pintado.
pub trait DrillsApi: Send + Sync {
    fn list_drills(&self) -> Result<Vec<Drill>, ApiError>;
    /// Crea un drill vacío; el servidor asigna id y fecha.
    fn create_drill(&self) -> Result<Drill, ApiError>;
    fn update_drill(&self, id: DrillId, update: &DrillUpdate) -> Result<Drill, ApiError>;
    fn delete_drill(&self, id: DrillId) -> Result<(), ApiError>;

    fn upload_media(
        &self,
        drill_id: DrillId,
        kind: MediaKind,
        blob: &MediaBlob,
    ) -> Result<UploadedMedia, ApiError>;
    fn generate_image(
        &self,
        drill_id: DrillId,
        search_phrase: &str,
    ) -> Result<GeneratedImage, ApiError>;

    fn list_tests(&self) -> Result<Vec<Test>, ApiError>;
    fn create_test(&self, input: &TestInput) -> Result<Test, ApiError>;
    fn update_test(&self, id: TestId, input: &TestInput) -> Result<Test, ApiError>;
    fn delete_test(&self, id: TestId) -> Result<(), ApiError>;
    fn test_stats(&self, id: TestId) -> Result<TestStats, ApiError>;

    fn create_test_attempt(&self, attempt: &NewTestAttempt) -> Result<TestAttempt, ApiError>;
    fn list_test_attempts(&self, test_id: Option<TestId>) -> Result<Vec<TestAttempt>, ApiError>;

    fn list_shorts(&self) -> Result<Vec<Short>, ApiError>;
    fn generate_short(&self, drill_id: DrillId) -> Result<GeneratedShort, ApiError>;
    fn delete_short(&self, id: i64) -> Result<(), ApiError>;

    fn health(&self) -> Result<HealthStatus, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::ApiError;

    #[test]
    fn status_codes_map_to_distinct_errors() {
        assert_eq!(ApiError::from_status(413, ""), ApiError::PayloadTooLarge);
        assert_eq!(ApiError::from_status(415, ""), ApiError::UnsupportedMediaType);
        assert_eq!(ApiError::from_status(504, ""), ApiError::Timeout);
        assert_eq!(
            ApiError::from_status(404, r#"{"detail":"Drill not found"}"#),
            ApiError::NotFound("Drill not found".into())
        );
        assert_eq!(
            ApiError::from_status(400, r#"{"detail":"Uploaded file is empty"}"#),
            ApiError::Status {
                status: 400,
                detail: "Uploaded file is empty".into()
            }
        );
        assert_eq!(
            ApiError::from_status(502, "Bad gateway\n"),
            ApiError::Status {
                status: 502,
                detail: "Bad gateway".into()
            }
        );
    }

    #[test]
    fn user_messages_are_specific() {
        assert!(ApiError::Timeout.user_message().contains("tardó"));
        assert!(ApiError::PayloadTooLarge.user_message().contains("grande"));
        assert!(
            ApiError::Network("connection refused".into())
                .user_message()
                .contains("connection refused")
        );
    }
}
