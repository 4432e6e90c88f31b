// src/view_models.rs

use crate::model::{DrillId, TestAttempt, TestId, TestStats};

#[derive(Clone, Debug, PartialEq)]
pub struct DrillRow {
    pub id: DrillId,
    pub label: String,
    pub tachelhit: String,
    pub tag: Option<String>,
    pub has_audio: bool,
    pub has_video: bool,
    pub has_image: bool,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TestRow {
    pub id: TestId,
    pub title: String,
    pub kind: &'static str,
    pub hints: &'static str,
    pub drill_count: usize,
    pub time_limit: Option<u32>,
    pub passing_score: f64,
    pub stats: Option<TestStats>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShortRow {
    pub id: i64,
    pub drill_id: DrillId,
    pub label: String,
    pub link: String,
}

impl DrillRow {
    /// Iconos de los medios que ya tiene el drill.
    pub fn media_badges(&self) -> String {
        let mut badges = Vec::new();
        if self.has_audio {
            badges.push("🔊");
        }
        if self.has_video {
            badges.push("🎬");
        }
        if self.has_image {
            badges.push("🖼");
        }
        if badges.is_empty() {
            "—".to_string()
        } else {
            badges.join(" ")
        }
    }
}

impl TestRow {
    pub fn settings_label(&self) -> String {
        let time = match self.time_limit {
            Some(secs) => format!("{secs} s/pregunta"),
            None => "sin tiempo".to_string(),
        };
        format!(
            "{} · {} · {} drills · {} · aprueba con {}",
            self.kind, self.hints, self.drill_count, time, self.passing_score
        )
    }

    pub fn stats_label(&self) -> String {
        match &self.stats {
            None => "…".to_string(),
            Some(s) if s.total_attempts == 0 => "Sin intentos".to_string(),
            Some(s) => format!(
                "{} intentos · media {:.1} · aprobados {} · {:.0}% completado · {:.0} s",
                s.total_attempts, s.average_score, s.passed_attempts, s.completion_rate, s.average_time
            ),
        }
    }
}

/// Drills fallados en un intento, a partir de los resultados guardados.
pub fn missed_drills_label(attempt: &TestAttempt) -> String {
    let results = match attempt.parsed_results() {
        Ok(results) => results,
        Err(err) => {
            log::warn!("intento #{} con resultados ilegibles: {err}", attempt.id);
            return "?".to_string();
        }
    };
    if results.is_empty() {
        return "—".to_string();
    }
    let missed: Vec<String> = results
        .iter()
        .filter(|r| !r.correct)
        .map(|r| format!("#{}", r.drill_id))
        .collect();
    if missed.is_empty() {
        "ninguno".to_string()
    } else {
        missed.join(", ")
    }
}
