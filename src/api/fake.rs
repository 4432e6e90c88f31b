//! API en memoria para los tests.

use super::{ApiError, DrillsApi};
use crate::model::{
    Drill, DrillId, DrillUpdate, GeneratedImage, GeneratedShort, HealthStatus, MediaBlob,
    MediaKind, NewTestAttempt, Short, Test, TestAttempt, TestId, TestInput, TestStats,
    UploadedMedia,
};
use std::sync::Mutex;
use std::sync::mpsc::{Receiver, Sender, channel};

#[derive(Default)]
pub struct FakeApi {
    pub drills: Mutex<Vec<Drill>>,
    pub updates: Mutex<Vec<(DrillId, DrillUpdate)>>,
    pub uploads: Mutex<Vec<(DrillId, MediaKind, MediaBlob)>>,
    pub attempts: Mutex<Vec<NewTestAttempt>>,
    pub tests: Mutex<Vec<Test>>,
    /// Error que devolverá la próxima llamada que escriba.
    pub fail_next: Mutex<Option<ApiError>>,
    /// Con barrera, cada subida espera un mensaje (o a que se suelte el emisor).
    upload_gate: Mutex<Option<Receiver<()>>>,
}

impl FakeApi {
    pub fn with_drills(drills: Vec<Drill>) -> Self {
        Self {
            drills: Mutex::new(drills),
            ..Default::default()
        }
    }

    pub fn hold_uploads(&self) -> Sender<()> {
        let (tx, rx) = channel();
        *self.upload_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn fail_next_with(&self, err: ApiError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    fn take_failure(&self) -> Result<(), ApiError> {
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn drill(&self, id: DrillId) -> Result<Drill, ApiError> {
        self.drills
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Drill not found".into()))
    }

    fn test_from_input(id: TestId, input: &TestInput) -> Test {
        Test {
            id,
            date_created: None,
            title: input.title.clone(),
            description: input.description.clone(),
            question_type: input.question_type,
            hint_level: input.hint_level,
            hint_percentage: input.hint_percentage,
            hint_tries_before_reveal: input.hint_tries_before_reveal,
            time_limit_seconds: input.time_limit_seconds,
            passing_score: input.passing_score,
            drill_ids: input.drill_ids.clone(),
        }
    }
}

impl DrillsApi for FakeApi {
    fn list_drills(&self) -> Result<Vec<Drill>, ApiError> {
        Ok(self.drills.lock().unwrap().clone())
    }

    fn create_drill(&self) -> Result<Drill, ApiError> {
        self.take_failure()?;
        let mut drills = self.drills.lock().unwrap();
        let id = drills.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        let drill = Drill {
            id,
            ..Default::default()
        };
        drills.push(drill.clone());
        Ok(drill)
    }

    fn update_drill(&self, id: DrillId, update: &DrillUpdate) -> Result<Drill, ApiError> {
        self.take_failure()?;
        let mut drill = self.drill(id)?;
        drill.tag = update.tag.clone();
        drill.text_catalan = update.text_catalan.clone();
        drill.text_tachelhit = update.text_tachelhit.clone();
        drill.text_arabic = update.text_arabic.clone();
        self.updates.lock().unwrap().push((id, update.clone()));
        let mut drills = self.drills.lock().unwrap();
        if let Some(slot) = drills.iter_mut().find(|d| d.id == id) {
            *slot = drill.clone();
        }
        Ok(drill)
    }

    fn delete_drill(&self, id: DrillId) -> Result<(), ApiError> {
        self.take_failure()?;
        self.drills.lock().unwrap().retain(|d| d.id != id);
        Ok(())
    }

    fn upload_media(
        &self,
        drill_id: DrillId,
        kind: MediaKind,
        blob: &MediaBlob,
    ) -> Result<UploadedMedia, ApiError> {
        if let Some(gate) = self.upload_gate.lock().unwrap().as_ref() {
            let _ = gate.recv();
        }
        self.take_failure()?;
        self.uploads
            .lock()
            .unwrap()
            .push((drill_id, kind, blob.clone()));
        Ok(UploadedMedia {
            url: format!("/media/{kind}/{}", blob.file_name(kind)),
        })
    }

    fn generate_image(
        &self,
        drill_id: DrillId,
        _search_phrase: &str,
    ) -> Result<GeneratedImage, ApiError> {
        self.take_failure()?;
        Ok(GeneratedImage {
            url: format!("/media/images/img_{drill_id}.jpg"),
            photographer: None,
        })
    }

    fn list_tests(&self) -> Result<Vec<Test>, ApiError> {
        Ok(self.tests.lock().unwrap().clone())
    }

    fn create_test(&self, input: &TestInput) -> Result<Test, ApiError> {
        self.take_failure()?;
        let mut tests = self.tests.lock().unwrap();
        let test = Self::test_from_input(tests.len() as TestId + 1, input);
        tests.push(test.clone());
        Ok(test)
    }

    fn update_test(&self, id: TestId, input: &TestInput) -> Result<Test, ApiError> {
        self.take_failure()?;
        Ok(Self::test_from_input(id, input))
    }

    fn delete_test(&self, id: TestId) -> Result<(), ApiError> {
        self.take_failure()?;
        self.tests.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }

    fn test_stats(&self, _id: TestId) -> Result<TestStats, ApiError> {
        Ok(TestStats::default())
    }

    fn create_test_attempt(&self, attempt: &NewTestAttempt) -> Result<TestAttempt, ApiError> {
        self.take_failure()?;
        let mut attempts = self.attempts.lock().unwrap();
        attempts.push(attempt.clone());
        Ok(TestAttempt {
            id: attempts.len() as i64,
            test_id: attempt.test_id,
            date_taken: None,
            user_name: attempt.user_name.clone(),
            score: attempt.score,
            time_taken_seconds: attempt.time_taken_seconds,
            total_questions: attempt.total_questions,
            correct_answers: attempt.correct_answers,
            question_results: attempt.question_results.clone(),
        })
    }

    fn list_test_attempts(&self, _test_id: Option<TestId>) -> Result<Vec<TestAttempt>, ApiError> {
        Ok(Vec::new())
    }

    fn list_shorts(&self) -> Result<Vec<Short>, ApiError> {
        Ok(Vec::new())
    }

    fn generate_short(&self, drill_id: DrillId) -> Result<GeneratedShort, ApiError> {
        self.take_failure()?;
        Ok(GeneratedShort {
            id: 1,
            video_path: format!("/media/shorts/short_{drill_id}.mp4"),
        })
    }

    fn delete_short(&self, _id: i64) -> Result<(), ApiError> {
        self.take_failure()
    }

    fn health(&self) -> Result<HealthStatus, ApiError> {
        Ok(HealthStatus {
            status: "healthy".into(),
            service: None,
        })
    }
}
