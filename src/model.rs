use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub type DrillId = i64;
pub type TestId = i64;

/// Un ítem de vocabulario: texto en tres idiomas y medios opcionales.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Drill {
    pub id: DrillId,
    #[serde(default)]
    pub date_created: Option<NaiveDateTime>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub text_catalan: Option<String>,
    #[serde(default)]
    pub text_tachelhit: Option<String>,
    #[serde(default)]
    pub text_arabic: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    // TTS generado en el servidor, solo lectura
    #[serde(default)]
    pub audio_tts_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Drill {
    pub fn media_url(&self, kind: MediaKind) -> Option<&str> {
        match kind {
            MediaKind::Audio => self.audio_url.as_deref(),
            MediaKind::Video => self.video_url.as_deref(),
            MediaKind::Image => self.image_url.as_deref(),
        }
    }

    pub fn set_media_url(&mut self, kind: MediaKind, url: String) {
        let slot = match kind {
            MediaKind::Audio => &mut self.audio_url,
            MediaKind::Video => &mut self.video_url,
            MediaKind::Image => &mut self.image_url,
        };
        *slot = Some(url);
    }

    pub fn has_media(&self, kind: MediaKind) -> bool {
        self.media_url(kind).is_some_and(|u| !u.trim().is_empty())
    }

    /// Texto para listados: catalán si existe, si no tachelhit, si no el id.
    pub fn display_label(&self) -> String {
        [&self.text_catalan, &self.text_tachelhit, &self.text_arabic]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| format!("Drill #{}", self.id))
    }
}

/// Cuerpo del PUT /drills/{id}.
///
/// El servidor aplica todo campo presente, así que los textos viajan siempre
/// (`null` borra) y los medios solo si se quieren cambiar.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DrillUpdate {
    pub tag: Option<String>,
    pub text_catalan: Option<String>,
    pub text_tachelhit: Option<String>,
    pub text_arabic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Binario capturado o leído de disco, etiquetado con su tipo MIME.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaBlob {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl MediaBlob {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// Alternativa de escritorio a la captura: subir un archivo existente.
    pub fn from_file(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Ok(Self::new(bytes, mime_for_extension(&ext)))
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Tipo sin parámetros: "audio/webm;codecs=opus" -> "audio/webm".
    pub fn essence(&self) -> &str {
        self.mime.split(';').next().unwrap_or_default().trim()
    }

    /// Extensión que acepta el endpoint de subida para este tipo.
    pub fn extension(&self, kind: MediaKind) -> &'static str {
        match self.essence() {
            "audio/webm" | "video/webm" => "webm",
            "audio/ogg" => "ogg",
            "audio/mp4" | "audio/x-m4a" => "m4a",
            "audio/aac" => "aac",
            "audio/mpeg" => "mp3",
            "audio/wav" | "audio/x-wav" => "wav",
            "video/mp4" => "mp4",
            "video/quicktime" => "mov",
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => match kind {
                MediaKind::Audio => "webm",
                MediaKind::Video => "mp4",
                MediaKind::Image => "jpg",
            },
        }
    }

    pub fn file_name(&self, kind: MediaKind) -> String {
        format!("{}.{}", kind.as_str(), self.extension(kind))
    }
}

pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "webm" => "video/webm",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Video,
    Image,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }

    /// Tipo de medio según el prefijo del MIME (`audio/`, `video/`, `image/`).
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.split('/').next()? {
            "audio" => Some(MediaKind::Audio),
            "video" => Some(MediaKind::Video),
            "image" => Some(MediaKind::Image),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    TextInput,
    Audio,
    Video,
    Combined,
}

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [
        QuestionType::TextInput,
        QuestionType::Audio,
        QuestionType::Video,
        QuestionType::Combined,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QuestionType::TextInput => "Texto",
            QuestionType::Audio => "Audio",
            QuestionType::Video => "Vídeo",
            QuestionType::Combined => "Combinado",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HintLevel {
    #[default]
    None,
    Partial,
    FullAfterTries,
}

impl HintLevel {
    pub const ALL: [HintLevel; 3] = [HintLevel::None, HintLevel::Partial, HintLevel::FullAfterTries];

    pub fn label(self) -> &'static str {
        match self {
            HintLevel::None => "Sin pistas",
            HintLevel::Partial => "Parcial",
            HintLevel::FullAfterTries => "Completa tras N intentos",
        }
    }
}

fn default_passing_score() -> f64 {
    70.0
}

/// Definición de un test sobre un conjunto fijo de drills.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Test {
    pub id: TestId,
    #[serde(default)]
    pub date_created: Option<NaiveDateTime>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub hint_level: HintLevel,
    #[serde(default)]
    pub hint_percentage: Option<u32>,
    #[serde(default)]
    pub hint_tries_before_reveal: Option<u32>,
    #[serde(default)]
    pub time_limit_seconds: Option<u32>,
    #[serde(default = "default_passing_score")]
    pub passing_score: f64,
    #[serde(with = "comma_ids")]
    pub drill_ids: Vec<DrillId>,
}

impl Test {
    /// 0 o ausente significa sin límite.
    pub fn time_limit(&self) -> Option<u32> {
        self.time_limit_seconds.filter(|s| *s > 0)
    }

    pub fn to_input(&self) -> TestInput {
        TestInput {
            title: self.title.clone(),
            description: self.description.clone(),
            question_type: self.question_type,
            hint_level: self.hint_level,
            hint_percentage: self.hint_percentage,
            hint_tries_before_reveal: self.hint_tries_before_reveal,
            time_limit_seconds: self.time_limit_seconds,
            passing_score: self.passing_score,
            drill_ids: self.drill_ids.clone(),
        }
    }
}

/// Cuerpo de POST /tests/ y PUT /tests/{id}.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TestInput {
    pub title: String,
    pub description: Option<String>,
    pub question_type: QuestionType,
    pub hint_level: HintLevel,
    pub hint_percentage: Option<u32>,
    pub hint_tries_before_reveal: Option<u32>,
    pub time_limit_seconds: Option<u32>,
    pub passing_score: f64,
    #[serde(with = "comma_ids")]
    pub drill_ids: Vec<DrillId>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuestionResult {
    pub drill_id: DrillId,
    pub correct: bool,
    pub attempts: u32,
    pub time_spent: u32,
    pub user_answer: String,
}

/// Lo que se envía al terminar una sesión.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewTestAttempt {
    pub test_id: TestId,
    pub user_name: Option<String>,
    pub score: f64,
    pub time_taken_seconds: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    /// Lista de `QuestionResult` serializada como JSON.
    pub question_results: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TestAttempt {
    pub id: i64,
    pub test_id: TestId,
    #[serde(default)]
    pub date_taken: Option<NaiveDateTime>,
    #[serde(default)]
    pub user_name: Option<String>,
    pub score: f64,
    pub time_taken_seconds: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    #[serde(default)]
    pub question_results: Option<String>,
}

impl TestAttempt {
    pub fn parsed_results(&self) -> Result<Vec<QuestionResult>, serde_json::Error> {
        match self.question_results.as_deref() {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw),
            _ => Ok(Vec::new()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TestStats {
    pub total_attempts: u32,
    pub average_score: f64,
    pub completion_rate: f64,
    pub average_time: f64,
    #[serde(default)]
    pub passed_attempts: u32,
}

/// Vídeo corto generado a partir de un drill.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Short {
    pub id: i64,
    #[serde(default)]
    pub date_created: Option<NaiveDateTime>,
    pub drill_id: DrillId,
    pub video_path: String,
    #[serde(default)]
    pub text_catalan: Option<String>,
    #[serde(default)]
    pub text_tachelhit: Option<String>,
    #[serde(default)]
    pub text_arabic: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GeneratedShort {
    pub id: i64,
    pub video_path: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UploadedMedia {
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    #[serde(alias = "image_url")]
    pub url: String,
    #[serde(default)]
    pub photographer: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    Dashboard,
    DrillEditor,
    TestForm,
    Quiz,
    Summary,
    Shorts,
    Settings,
}

pub fn parse_drill_ids(raw: &str) -> Result<Vec<DrillId>, std::num::ParseIntError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

// En el servidor los ids viajan como "1,2,3"
mod comma_ids {
    use super::*;

    pub fn serialize<S: Serializer>(ids: &[DrillId], serializer: S) -> Result<S::Ok, S::Error> {
        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        serializer.serialize_str(&joined)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<DrillId>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_drill_ids(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drill_ids_travel_as_comma_string() {
        let raw = r#"{
            "id": 4, "date_created": "2024-05-01T10:00:00.123456",
            "title": "Animals", "question_type": "combined",
            "hint_level": "full_after_tries", "hint_tries_before_reveal": 2,
            "passing_score": 60.0, "drill_ids": "3, 7,9"
        }"#;
        let test: Test = serde_json::from_str(raw).unwrap();
        assert_eq!(test.drill_ids, vec![3, 7, 9]);
        assert_eq!(test.question_type, QuestionType::Combined);
        assert_eq!(test.hint_level, HintLevel::FullAfterTries);
        assert!(test.date_created.is_some());

        let body = serde_json::to_value(test.to_input()).unwrap();
        assert_eq!(body["drill_ids"], "3,7,9");
        assert_eq!(body["hint_level"], "full_after_tries");
    }

    #[test]
    fn test_zero_time_limit_means_unlimited() {
        let mut test: Test =
            serde_json::from_str(r#"{"id":1,"title":"t","drill_ids":"1"}"#).unwrap();
        assert_eq!(test.passing_score, 70.0);
        assert_eq!(test.time_limit(), None);
        test.time_limit_seconds = Some(0);
        assert_eq!(test.time_limit(), None);
        test.time_limit_seconds = Some(20);
        assert_eq!(test.time_limit(), Some(20));
    }

    #[test]
    fn test_drill_label_falls_back_to_id() {
        let mut drill = Drill {
            id: 12,
            ..Default::default()
        };
        assert_eq!(drill.display_label(), "Drill #12");
        drill.text_tachelhit = Some("tanmirt".into());
        assert_eq!(drill.display_label(), "tanmirt");
        drill.set_media_url(MediaKind::Video, "/media/video/v.mp4".into());
        assert!(drill.has_media(MediaKind::Video));
        assert!(!drill.has_media(MediaKind::Audio));
    }

    #[test]
    fn test_update_body_omits_untouched_media() {
        let update = DrillUpdate {
            text_catalan: Some("poma".into()),
            ..Default::default()
        };
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body["text_catalan"], "poma");
        assert!(body["text_arabic"].is_null());
        assert!(body.as_object().unwrap().contains_key("text_arabic"));
        assert!(!body.as_object().unwrap().contains_key("audio_url"));
    }

    #[test]
    fn test_media_kind_from_mime_prefix() {
        assert_eq!(MediaKind::from_mime("audio/ogg"), Some(MediaKind::Audio));
        assert_eq!(MediaKind::from_mime(mime_for_extension("png")), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_mime("application/octet-stream"), None);
    }

    #[test]
    fn test_blob_file_names_follow_mime() {
        let blob = MediaBlob::new(vec![1], "audio/webm;codecs=opus");
        assert_eq!(blob.essence(), "audio/webm");
        assert_eq!(blob.file_name(MediaKind::Audio), "audio.webm");
        let blob = MediaBlob::new(vec![1], "audio/mp4");
        assert_eq!(blob.file_name(MediaKind::Audio), "audio.m4a");
        let blob = MediaBlob::new(vec![1], "");
        assert_eq!(blob.file_name(MediaKind::Image), "image.jpg");
    }

    #[test]
    fn test_generated_image_accepts_image_url_key() {
        let img: GeneratedImage = serde_json::from_str(r#"{"image_url":"https://x/y.jpg"}"#).unwrap();
        assert_eq!(img.url, "https://x/y.jpg");
    }
}
