use super::*;
use crate::quiz::{QuizError, SubmitOutcome};

impl DrillApp {
    pub fn start_quiz(&mut self, test_id: TestId, now: f64) {
        let Some(test) = self.test(test_id).cloned() else {
            return;
        };
        match QuizSession::start(&test, &self.drills, &mut rand::thread_rng(), now) {
            Ok(session) => {
                self.quiz = Some(session);
                self.quiz_feedback.clear();
                self.last_attempt = None;
                self.state = AppState::Quiz;
            }
            Err(QuizError::NoDrills) => {
                self.message = format!("⚠ El test «{}» no tiene drills disponibles.", test.title);
            }
            Err(err) => self.message = format!("❌ {err}"),
        }
    }

    pub fn submit_answer(&mut self, now: f64) {
        let outcome = self.quiz.as_mut().map(|q| q.submit(now));
        self.handle_outcome(outcome);
    }

    pub fn skip_question(&mut self, now: f64) {
        let outcome = self.quiz.as_mut().map(|q| q.skip(now));
        self.handle_outcome(outcome);
    }

    pub fn request_hint(&mut self) {
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.request_hint(&mut rand::thread_rng());
        }
    }

    /// Cuenta atrás de la pregunta; se llama en cada frame.
    pub fn tick_quiz(&mut self, now: f64) {
        let outcome = self.quiz.as_mut().and_then(|q| q.tick(now));
        if let Some(outcome) = outcome {
            let finished = matches!(outcome, SubmitOutcome::Finished(_));
            self.handle_outcome(Some(Ok(outcome)));
            if !finished {
                self.quiz_feedback = "⏰ ¡Tiempo! Siguiente pregunta.".into();
            }
        }
    }

    fn handle_outcome(&mut self, outcome: Option<Result<SubmitOutcome, QuizError>>) {
        match outcome {
            Some(Ok(SubmitOutcome::Retry { attempts })) => {
                self.quiz_feedback = format!("❌ Incorrecto ({attempts} intentos). Prueba otra vez.");
            }
            Some(Ok(SubmitOutcome::Advanced(result))) => {
                self.quiz_feedback = if result.correct {
                    "✅ ¡Correcto!".into()
                } else {
                    "⏩ Pregunta saltada.".into()
                };
            }
            Some(Ok(SubmitOutcome::Finished(_))) => self.finish_quiz(),
            Some(Err(err)) => self.quiz_feedback = format!("❌ {err}"),
            None => {}
        }
    }

    /// Cierra la sesión y envía el intento al servidor.
    fn finish_quiz(&mut self) {
        let name = Some(self.prefs.user_name.clone());
        let Some(attempt) = self.quiz.as_ref().and_then(|q| q.to_attempt(name)) else {
            return;
        };
        self.quiz_feedback = "⏳ Guardando resultado...".into();
        self.tasks.spawn(TaskKind::SubmitAttempt, move |api| {
            TaskOutput::AttemptSubmitted(api.create_test_attempt(&attempt))
        });
        self.state = AppState::Summary;
    }

    /// Reenvío manual si falló el guardado del intento.
    pub fn retry_submit_attempt(&mut self) {
        if self.last_attempt.is_none() {
            self.finish_quiz();
        }
    }
}
