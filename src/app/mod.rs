use crate::api::{ApiError, DrillsApi, HttpClient};
use crate::capture::{
    CaptureController, CaptureSettings, CapturedMedia, Facing, MediaDevices, NativeDevices,
};
use crate::config::Settings;
use crate::editor::DrillEditor;
use crate::media_url::resolve_media_url;
use crate::model::{
    AppState, Drill, DrillId, DrillUpdate, GeneratedImage, GeneratedShort, HealthStatus, MediaBlob,
    MediaKind, NewTestAttempt, Short, Test, TestAttempt, TestId, TestInput, TestStats,
    UploadedMedia,
};
use crate::quiz::QuizSession;
use crate::selection::{DrillSelection, TestForm};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

// Submódulos
pub mod actions;
pub mod capture;
pub mod completion;
pub mod navigation;
pub mod quiz;
pub mod tasks;
pub mod view_models;

pub use tasks::{TaskKind, TaskOutput, TaskRunner};

/// Lo único que sobrevive entre ejecuciones.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Preferences {
    /// Se aplica al arrancar; la URL base no cambia en caliente.
    pub api_url_override: Option<String>,
    pub user_name: String,
    pub dark_mode: bool,
    pub facing: Facing,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            api_url_override: None,
            user_name: String::new(),
            dark_mode: true,
            facing: Facing::User,
        }
    }
}

/// Borrado pendiente de confirmar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteTarget {
    Drill(DrillId),
    Test(TestId),
    Short(i64),
}

pub struct DrillApp {
    pub prefs: Preferences,
    pub settings: Settings,
    pub state: AppState,
    pub message: String,
    pub tasks: TaskRunner,

    pub drills: Vec<Drill>,
    pub tests: Vec<Test>,
    pub stats: HashMap<TestId, TestStats>,
    pub attempts: HashMap<TestId, Vec<TestAttempt>>,
    pub shorts: Vec<Short>,
    pub selection: DrillSelection,
    pub filter: String,
    pub confirm_delete: Option<DeleteTarget>,

    // Editor de drill y panel de captura
    pub editor: Option<DrillEditor>,
    pub pending_leave: Option<AppState>,
    pub capture: CaptureController<Box<dyn MediaDevices>>,
    pub capture_message: String,
    /// Capturas a la espera de que termine la subida en curso.
    pub pending_uploads: VecDeque<CapturedMedia>,
    pub upload_path: String,
    pub search_phrase: String,
    pub photographer: Option<String>,

    pub test_form: Option<TestForm>,
    pub form_error: Option<String>,

    pub quiz: Option<QuizSession>,
    pub quiz_feedback: String,
    pub last_attempt: Option<TestAttempt>,

    pub settings_url_input: String,
    pub health_message: String,
}

impl DrillApp {
    pub fn new(settings: Settings, prefs: Preferences) -> Self {
        let api: Arc<dyn DrillsApi> = match HttpClient::new(&settings) {
            Ok(client) => Arc::new(client),
            Err(err) => {
                log::error!("no se pudo crear el cliente HTTP: {err}");
                Arc::new(OfflineApi(err))
            }
        };
        Self::with_api(settings, prefs, api, Box::new(NativeDevices::new()))
    }

    pub fn with_api(
        settings: Settings,
        prefs: Preferences,
        api: Arc<dyn DrillsApi>,
        devices: Box<dyn MediaDevices>,
    ) -> Self {
        let capture = CaptureController::new(devices, CaptureSettings::from(&settings));
        Self {
            settings_url_input: prefs.api_url_override.clone().unwrap_or_default(),
            prefs,
            settings,
            state: AppState::Dashboard,
            message: String::new(),
            tasks: TaskRunner::new(api),
            drills: Vec::new(),
            tests: Vec::new(),
            stats: HashMap::new(),
            attempts: HashMap::new(),
            shorts: Vec::new(),
            selection: DrillSelection::default(),
            filter: String::new(),
            confirm_delete: None,
            editor: None,
            pending_leave: None,
            capture,
            capture_message: String::new(),
            pending_uploads: VecDeque::new(),
            upload_path: String::new(),
            search_phrase: String::new(),
            photographer: None,
            test_form: None,
            form_error: None,
            quiz: None,
            quiz_feedback: String::new(),
            last_attempt: None,
            health_message: String::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.settings.api_base_url
    }

    pub fn media_link(&self, url: Option<&str>) -> String {
        resolve_media_url(self.base_url(), url)
    }

    pub fn drill(&self, id: DrillId) -> Option<&Drill> {
        self.drills.iter().find(|d| d.id == id)
    }

    pub fn test(&self, id: TestId) -> Option<&Test> {
        self.tests.iter().find(|t| t.id == id)
    }

    pub fn is_busy(&self, kind: TaskKind) -> bool {
        self.tasks.is_pending(kind)
    }

    /// Sustituye el drill en la lista local y en el editor si es el abierto.
    pub(crate) fn upsert_drill(&mut self, drill: Drill) {
        match self.drills.iter_mut().find(|d| d.id == drill.id) {
            Some(slot) => *slot = drill,
            None => self.drills.push(drill),
        }
    }

    pub(crate) fn set_drill_media(&mut self, drill_id: DrillId, kind: MediaKind, url: String) {
        if let Some(drill) = self.drills.iter_mut().find(|d| d.id == drill_id) {
            drill.set_media_url(kind, url.clone());
        }
        if let Some(editor) = self.editor.as_mut().filter(|e| e.drill_id() == drill_id) {
            editor.apply_media_url(kind, url);
        }
    }
}

/// Sustituto cuando el cliente HTTP no pudo construirse: todo falla con el
/// mismo error, visible en la UI.
struct OfflineApi(ApiError);

impl OfflineApi {
    fn fail<T>(&self) -> Result<T, ApiError> {
        Err(self.0.clone())
    }
}

impl DrillsApi for OfflineApi {
    fn list_drills(&self) -> Result<Vec<Drill>, ApiError> {
        self.fail()
    }
    fn create_drill(&self) -> Result<Drill, ApiError> {
        self.fail()
    }
    fn update_drill(
        &self,
        _id: DrillId,
        _update: &DrillUpdate,
    ) -> Result<Drill, ApiError> {
        self.fail()
    }
    fn delete_drill(&self, _id: DrillId) -> Result<(), ApiError> {
        self.fail()
    }
    fn upload_media(
        &self,
        _drill_id: DrillId,
        _kind: MediaKind,
        _blob: &MediaBlob,
    ) -> Result<UploadedMedia, ApiError> {
        self.fail()
    }
    fn generate_image(
        &self,
        _drill_id: DrillId,
        _search_phrase: &str,
    ) -> Result<GeneratedImage, ApiError> {
        self.fail()
    }
    fn list_tests(&self) -> Result<Vec<Test>, ApiError> {
        self.fail()
    }
    fn create_test(&self, _input: &TestInput) -> Result<Test, ApiError> {
        self.fail()
    }
    fn update_test(
        &self,
        _id: TestId,
        _input: &TestInput,
    ) -> Result<Test, ApiError> {
        self.fail()
    }
    fn delete_test(&self, _id: TestId) -> Result<(), ApiError> {
        self.fail()
    }
    fn test_stats(&self, _id: TestId) -> Result<TestStats, ApiError> {
        self.fail()
    }
    fn create_test_attempt(
        &self,
        _attempt: &NewTestAttempt,
    ) -> Result<TestAttempt, ApiError> {
        self.fail()
    }
    fn list_test_attempts(
        &self,
        _test_id: Option<TestId>,
    ) -> Result<Vec<TestAttempt>, ApiError> {
        self.fail()
    }
    fn list_shorts(&self) -> Result<Vec<Short>, ApiError> {
        self.fail()
    }
    fn generate_short(
        &self,
        _drill_id: DrillId,
    ) -> Result<GeneratedShort, ApiError> {
        self.fail()
    }
    fn delete_short(&self, _id: i64) -> Result<(), ApiError> {
        self.fail()
    }
    fn health(&self) -> Result<HealthStatus, ApiError> {
        self.fail()
    }
}
