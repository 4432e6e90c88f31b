//! Selección de drills en el panel y formulario de tests.

use crate::model::{Drill, DrillId, HintLevel, QuestionType, Test, TestInput};
use crate::quiz::hint::{DEFAULT_HINT_PERCENTAGE, DEFAULT_TRIES_BEFORE_REVEAL};
use crate::quiz::normalize;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("el título es obligatorio")]
    EmptyTitle,
    #[error("selecciona al menos un drill")]
    NoDrills,
    #[error("el porcentaje de pista debe estar entre 1 y 100")]
    HintPercentageOutOfRange,
    #[error("la nota de aprobado debe estar entre 0 y 100")]
    PassingScoreOutOfRange,
    #[error("escribe una frase de búsqueda")]
    EmptySearchPhrase,
}

/// Conjunto ordenado de ids marcados en la cuadrícula.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrillSelection {
    ids: Vec<DrillId>,
}

impl DrillSelection {
    pub fn from_ids(ids: &[DrillId]) -> Self {
        let mut selection = Self::default();
        for &id in ids {
            if !selection.contains(id) {
                selection.ids.push(id);
            }
        }
        selection
    }

    pub fn toggle(&mut self, id: DrillId) {
        if let Some(pos) = self.ids.iter().position(|x| *x == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    pub fn select_all<'a>(&mut self, drills: impl IntoIterator<Item = &'a Drill>) {
        for drill in drills {
            if !self.contains(drill.id) {
                self.ids.push(drill.id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: DrillId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[DrillId] {
        &self.ids
    }

    /// Quita ids de drills que ya no existen.
    pub fn retain_existing(&mut self, drills: &[Drill]) {
        self.ids.retain(|id| drills.iter().any(|d| d.id == *id));
    }
}

/// Estado editable del formulario de test. Los números van como texto
/// mientras se escriben y se validan al enviar.
#[derive(Clone, Debug, PartialEq)]
pub struct TestForm {
    /// `Some` al editar: el conjunto de drills no cambia.
    pub editing: Option<Test>,
    pub title: String,
    pub description: String,
    pub question_type: QuestionType,
    pub hint_level: HintLevel,
    pub hint_percentage: u32,
    pub hint_tries_before_reveal: u32,
    pub time_limit_seconds: u32,
    pub passing_score: f64,
}

impl Default for TestForm {
    fn default() -> Self {
        Self {
            editing: None,
            title: String::new(),
            description: String::new(),
            question_type: QuestionType::TextInput,
            hint_level: HintLevel::None,
            hint_percentage: DEFAULT_HINT_PERCENTAGE,
            hint_tries_before_reveal: DEFAULT_TRIES_BEFORE_REVEAL,
            time_limit_seconds: 0,
            passing_score: 70.0,
        }
    }
}

impl TestForm {
    pub fn edit(test: &Test) -> Self {
        Self {
            editing: Some(test.clone()),
            title: test.title.clone(),
            description: test.description.clone().unwrap_or_default(),
            question_type: test.question_type,
            hint_level: test.hint_level,
            hint_percentage: test.hint_percentage.unwrap_or(DEFAULT_HINT_PERCENTAGE),
            hint_tries_before_reveal: test
                .hint_tries_before_reveal
                .unwrap_or(DEFAULT_TRIES_BEFORE_REVEAL),
            time_limit_seconds: test.time_limit_seconds.unwrap_or(0),
            passing_score: test.passing_score,
        }
    }

    /// Valida antes de tocar la red. Para un test nuevo los drills salen de
    /// la selección; al editar se conservan los del test.
    pub fn to_input(&self, selection: &DrillSelection) -> Result<TestInput, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let drill_ids = match &self.editing {
            Some(test) => test.drill_ids.clone(),
            None => selection.ids().to_vec(),
        };
        if drill_ids.is_empty() {
            return Err(ValidationError::NoDrills);
        }
        if !(0.0..=100.0).contains(&self.passing_score) {
            return Err(ValidationError::PassingScoreOutOfRange);
        }
        let (hint_percentage, hint_tries_before_reveal) = match self.hint_level {
            HintLevel::None => (None, None),
            HintLevel::Partial => {
                if !(1..=100).contains(&self.hint_percentage) {
                    return Err(ValidationError::HintPercentageOutOfRange);
                }
                (Some(self.hint_percentage), None)
            }
            // 0 intentos: la respuesta se ve desde el principio
            HintLevel::FullAfterTries => (None, Some(self.hint_tries_before_reveal)),
        };

        Ok(TestInput {
            title: title.to_string(),
            description: Some(self.description.trim().to_string()).filter(|d| !d.is_empty()),
            question_type: self.question_type,
            hint_level: self.hint_level,
            hint_percentage,
            hint_tries_before_reveal,
            time_limit_seconds: (self.time_limit_seconds > 0).then_some(self.time_limit_seconds),
            passing_score: self.passing_score,
            drill_ids,
        })
    }
}

pub fn validate_search_phrase(phrase: &str) -> Result<String, ValidationError> {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return Err(ValidationError::EmptySearchPhrase);
    }
    Ok(phrase.to_string())
}

/// Filtro del panel: busca en etiqueta y en los tres textos.
pub fn filter_drills<'a>(drills: &'a [Drill], query: &str) -> Vec<&'a Drill> {
    let query = normalize(query);
    if query.is_empty() {
        return drills.iter().collect();
    }
    drills
        .iter()
        .filter(|d| {
            [&d.tag, &d.text_catalan, &d.text_tachelhit, &d.text_arabic]
                .into_iter()
                .flatten()
                .any(|text| normalize(text).contains(&query))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drills() -> Vec<Drill> {
        vec![
            Drill {
                id: 1,
                tag: Some("Salutacions".into()),
                text_catalan: Some("Hola".into()),
                ..Default::default()
            },
            Drill {
                id: 2,
                tag: Some("menjar".into()),
                text_catalan: Some("Pa".into()),
                text_tachelhit: Some("aghrum".into()),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn selection_toggles_and_keeps_order() {
        let mut selection = DrillSelection::default();
        selection.toggle(2);
        selection.toggle(1);
        assert_eq!(selection.ids(), &[2, 1]);
        selection.toggle(2);
        assert_eq!(selection.ids(), &[1]);
        selection.select_all(&drills());
        assert_eq!(selection.ids(), &[1, 2]);
        selection.retain_existing(&drills()[..1]);
        assert_eq!(selection.len(), 1);
        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn empty_title_or_selection_is_blocked() {
        let mut form = TestForm::default();
        let selection = DrillSelection::from_ids(&[1, 2]);
        assert_eq!(form.to_input(&selection), Err(ValidationError::EmptyTitle));

        form.title = " Salutacions ".into();
        assert_eq!(
            form.to_input(&DrillSelection::default()),
            Err(ValidationError::NoDrills)
        );
        let input = form.to_input(&selection).unwrap();
        assert_eq!(input.title, "Salutacions");
        assert_eq!(input.drill_ids, vec![1, 2]);
        assert_eq!(input.time_limit_seconds, None);
        assert_eq!(input.description, None);
    }

    #[test]
    fn hint_settings_are_checked_per_level() {
        let selection = DrillSelection::from_ids(&[1]);
        let mut form = TestForm {
            title: "t".into(),
            hint_level: HintLevel::Partial,
            hint_percentage: 0,
            ..Default::default()
        };
        assert_eq!(
            form.to_input(&selection),
            Err(ValidationError::HintPercentageOutOfRange)
        );
        form.hint_percentage = 40;
        assert_eq!(form.to_input(&selection).unwrap().hint_percentage, Some(40));

        form.hint_level = HintLevel::FullAfterTries;
        form.hint_tries_before_reveal = 0;
        let input = form.to_input(&selection).unwrap();
        assert_eq!(input.hint_tries_before_reveal, Some(0));
        assert_eq!(input.hint_percentage, None);

        form.hint_tries_before_reveal = 2;
        form.passing_score = 120.0;
        assert_eq!(
            form.to_input(&selection),
            Err(ValidationError::PassingScoreOutOfRange)
        );
    }

    #[test]
    fn editing_keeps_the_tests_drills() {
        let test = Test {
            id: 3,
            date_created: None,
            title: "Menjar".into(),
            description: Some("Vocabulari".into()),
            question_type: QuestionType::Audio,
            hint_level: HintLevel::None,
            hint_percentage: None,
            hint_tries_before_reveal: None,
            time_limit_seconds: Some(20),
            passing_score: 60.0,
            drill_ids: vec![5, 6],
        };
        let form = TestForm::edit(&test);
        let input = form.to_input(&DrillSelection::from_ids(&[1])).unwrap();
        assert_eq!(input.drill_ids, vec![5, 6]);
        assert_eq!(input.time_limit_seconds, Some(20));
        assert_eq!(input.question_type, QuestionType::Audio);
    }

    #[test]
    fn search_phrase_must_not_be_blank() {
        assert_eq!(
            validate_search_phrase("  "),
            Err(ValidationError::EmptySearchPhrase)
        );
        assert_eq!(validate_search_phrase(" bread ").as_deref(), Ok("bread"));
    }

    #[test]
    fn filter_matches_any_text() {
        let drills = drills();
        assert_eq!(filter_drills(&drills, "").len(), 2);
        let hits = filter_drills(&drills, "AGHR");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
        assert_eq!(filter_drills(&drills, "salut")[0].id, 1);
    }
}
