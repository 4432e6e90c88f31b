use crate::model::{Drill, DrillId, QuestionResult};

#[derive(Clone, Debug, PartialEq)]
pub struct ReviewRow {
    pub number: usize,
    pub drill_id: DrillId,
    pub prompt: String,
    pub user_answer: String,
    pub correct: bool,
    pub attempts: u32,
    pub time_spent: u32,
    /// Solo en las falladas.
    pub expected: Option<String>,
}

/// Une cada resultado con su drill para la pantalla de repaso. Un drill
/// borrado entretanto se muestra por su id.
pub fn review(results: &[QuestionResult], drills: &[Drill]) -> Vec<ReviewRow> {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let drill = drills.iter().find(|d| d.id == result.drill_id);
            let prompt = drill
                .map(Drill::display_label)
                .unwrap_or_else(|| format!("Drill #{}", result.drill_id));
            let expected = if result.correct {
                None
            } else {
                Some(
                    drill
                        .and_then(|d| d.text_tachelhit.clone())
                        .unwrap_or_default(),
                )
            };
            ReviewRow {
                number: i + 1,
                drill_id: result.drill_id,
                prompt,
                user_answer: result.user_answer.clone(),
                correct: result.correct,
                attempts: result.attempts,
                time_spent: result.time_spent,
                expected,
            }
        })
        .collect()
}
