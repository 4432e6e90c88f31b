use super::answer::is_correct;
use super::hint::{HintPolicy, full_hint, partial_hint};
use super::QuizError;
use crate::model::{Drill, DrillId, NewTestAttempt, QuestionResult, QuestionType, Test, TestId};
use rand::Rng;
use rand::seq::SliceRandom;

/// Qué mostrar para la pregunta actual según el tipo de test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizPrompt {
    pub drill_id: DrillId,
    pub position: usize,
    pub total: usize,
    /// Texto catalán; `None` cuando el medio sustituye al texto.
    pub text: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Respuesta incorrecta: se queda en la misma pregunta.
    Retry { attempts: u32 },
    Advanced(QuestionResult),
    Finished(QuestionResult),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuizSummary {
    pub score: f64,
    pub correct: u32,
    pub total: u32,
    pub elapsed_secs: u32,
    pub passed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Finalize {
    Submit,
    Skip,
    TimeUp,
}

pub struct QuizSession {
    test_id: TestId,
    question_type: QuestionType,
    hint_policy: HintPolicy,
    time_limit: Option<u32>,
    passing_score: f64,
    drills: Vec<Drill>,
    current: usize,
    results: Vec<QuestionResult>,
    started_at: f64,
    finished_at: Option<f64>,

    // Estado de la pregunta actual
    pub answer: String,
    attempts: u32,
    hints_used: u32,
    partial_hint: Option<String>,
    question_started_at: f64,
    time_left: Option<u32>,
    last_tick: f64,
}

impl QuizSession {
    /// Filtra los drills del test y los baraja. Cada intento tiene su orden.
    pub fn start<R: Rng + ?Sized>(
        test: &Test,
        drills: &[Drill],
        rng: &mut R,
        now: f64,
    ) -> Result<Self, QuizError> {
        let mut selected: Vec<Drill> = drills
            .iter()
            .filter(|d| test.drill_ids.contains(&d.id))
            .cloned()
            .collect();
        if selected.is_empty() {
            return Err(QuizError::NoDrills);
        }
        selected.shuffle(rng);
        log::info!("test {}: sesión con {} preguntas", test.id, selected.len());

        Ok(Self {
            test_id: test.id,
            question_type: test.question_type,
            hint_policy: HintPolicy::from_test(test),
            time_limit: test.time_limit(),
            passing_score: test.passing_score,
            drills: selected,
            current: 0,
            results: Vec::new(),
            started_at: now,
            finished_at: None,
            answer: String::new(),
            attempts: 0,
            hints_used: 0,
            partial_hint: None,
            question_started_at: now,
            time_left: test.time_limit(),
            last_tick: now,
        })
    }

    pub fn test_id(&self) -> TestId {
        self.test_id
    }

    pub fn total(&self) -> usize {
        self.drills.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn hint_policy(&self) -> HintPolicy {
        self.hint_policy
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    pub fn drills(&self) -> &[Drill] {
        &self.drills
    }

    pub fn time_left(&self) -> Option<u32> {
        self.time_left
    }

    pub fn set_answer(&mut self, text: impl Into<String>) {
        self.answer = text.into();
    }

    fn current_drill(&self) -> Option<&Drill> {
        if self.is_finished() {
            return None;
        }
        self.drills.get(self.current)
    }

    fn expected(&self) -> &str {
        self.current_drill()
            .and_then(|d| d.text_tachelhit.as_deref())
            .unwrap_or("")
    }

    pub fn current_prompt(&self) -> Option<QuizPrompt> {
        let drill = self.current_drill()?;
        let non_empty = |url: &Option<String>| url.clone().filter(|u| !u.trim().is_empty());
        let audio = non_empty(&drill.audio_url).or_else(|| non_empty(&drill.audio_tts_url));
        let video = non_empty(&drill.video_url);

        let (audio_url, video_url) = match self.question_type {
            QuestionType::TextInput => (None, None),
            QuestionType::Audio => (audio, None),
            QuestionType::Video => (None, video),
            QuestionType::Combined => (audio, video),
        };
        // Sin medio para este tipo de pregunta se cae al texto
        let text = match self.question_type {
            QuestionType::TextInput => drill.text_catalan.clone(),
            _ if audio_url.is_none() && video_url.is_none() => drill.text_catalan.clone(),
            _ => None,
        };

        Some(QuizPrompt {
            drill_id: drill.id,
            position: self.current + 1,
            total: self.drills.len(),
            text,
            audio_url,
            video_url,
            image_url: non_empty(&drill.image_url),
        })
    }

    /// Pista visible ahora mismo, si la hay.
    pub fn hint_text(&self) -> Option<String> {
        self.current_drill()?;
        match self.hint_policy {
            HintPolicy::None => None,
            HintPolicy::Partial { .. } => self.partial_hint.clone(),
            HintPolicy::FullAfterTries { tries } => full_hint(self.expected(), self.attempts, tries),
        }
    }

    /// Solo en modo parcial; cada petición destapa más letras.
    pub fn request_hint<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        let HintPolicy::Partial { percentage } = self.hint_policy else {
            return None;
        };
        self.current_drill()?;
        let hint = partial_hint(self.expected(), percentage, self.hints_used, rng);
        self.hints_used += 1;
        self.partial_hint = Some(hint.clone());
        Some(hint)
    }

    pub fn submit(&mut self, now: f64) -> Result<SubmitOutcome, QuizError> {
        self.finalize_or_retry(Finalize::Submit, now)
    }

    pub fn skip(&mut self, now: f64) -> Result<SubmitOutcome, QuizError> {
        self.finalize_or_retry(Finalize::Skip, now)
    }

    /// Cuenta atrás, un segundo cada vez. Al llegar a cero se envía lo que
    /// haya escrito, aunque esté vacío.
    pub fn tick(&mut self, now: f64) -> Option<SubmitOutcome> {
        if self.is_finished() {
            return None;
        }
        let mut left = self.time_left?;
        while left > 0 && now - self.last_tick >= 1.0 {
            left -= 1;
            self.last_tick += 1.0;
        }
        self.time_left = Some(left);
        if left > 0 {
            return None;
        }
        log::info!("tiempo agotado en la pregunta {}", self.current + 1);
        self.finalize_or_retry(Finalize::TimeUp, now).ok()
    }

    fn finalize_or_retry(&mut self, how: Finalize, now: f64) -> Result<SubmitOutcome, QuizError> {
        let drill_id = self.current_drill().ok_or(QuizError::AlreadyFinished)?.id;
        let correct = is_correct(&self.answer, self.expected());

        if !correct && how == Finalize::Submit {
            self.attempts += 1;
            return Ok(SubmitOutcome::Retry {
                attempts: self.attempts,
            });
        }

        let result = QuestionResult {
            drill_id,
            correct,
            attempts: self.attempts + 1,
            time_spent: (now - self.question_started_at).max(0.0).round() as u32,
            user_answer: std::mem::take(&mut self.answer),
        };
        self.results.push(result.clone());

        self.current += 1;
        if self.current >= self.drills.len() {
            self.finished_at = Some(now);
            log::info!(
                "test {} terminado: {}/{} correctas",
                self.test_id,
                self.correct_count(),
                self.drills.len()
            );
            return Ok(SubmitOutcome::Finished(result));
        }
        self.reset_question(now);
        Ok(SubmitOutcome::Advanced(result))
    }

    fn reset_question(&mut self, now: f64) {
        self.answer.clear();
        self.attempts = 0;
        self.hints_used = 0;
        self.partial_hint = None;
        self.question_started_at = now;
        self.time_left = self.time_limit;
        self.last_tick = now;
    }

    fn correct_count(&self) -> u32 {
        self.results.iter().filter(|r| r.correct).count() as u32
    }

    pub fn summary(&self) -> Option<QuizSummary> {
        let finished_at = self.finished_at?;
        let total = self.drills.len() as u32;
        let correct = self.correct_count();
        let score = 100.0 * f64::from(correct) / f64::from(total);
        Some(QuizSummary {
            score,
            correct,
            total,
            elapsed_secs: (finished_at - self.started_at).max(0.0).round() as u32,
            passed: score >= self.passing_score,
        })
    }

    pub fn to_attempt(&self, user_name: Option<String>) -> Option<NewTestAttempt> {
        let summary = self.summary()?;
        Some(NewTestAttempt {
            test_id: self.test_id,
            user_name: user_name.filter(|n| !n.trim().is_empty()),
            score: summary.score,
            time_taken_seconds: summary.elapsed_secs,
            total_questions: summary.total,
            correct_answers: summary.correct,
            question_results: serde_json::to_string(&self.results).ok(),
        })
    }
}
