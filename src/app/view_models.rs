use super::*;
use crate::quiz::{ReviewRow, review};
use crate::selection::filter_drills;
use crate::view_models::{DrillRow, ShortRow, TestRow};

impl DrillApp {
    pub fn drill_rows(&self) -> Vec<DrillRow> {
        filter_drills(&self.drills, &self.filter)
            .into_iter()
            .map(|d| DrillRow {
                id: d.id,
                label: d.display_label(),
                tachelhit: d.text_tachelhit.clone().unwrap_or_default(),
                tag: d.tag.clone(),
                has_audio: d.has_media(MediaKind::Audio),
                has_video: d.has_media(MediaKind::Video),
                has_image: d.has_media(MediaKind::Image),
                selected: self.selection.contains(d.id),
            })
            .collect()
    }

    pub fn test_rows(&self) -> Vec<TestRow> {
        self.tests
            .iter()
            .map(|t| TestRow {
                id: t.id,
                title: t.title.clone(),
                kind: t.question_type.label(),
                hints: t.hint_level.label(),
                drill_count: t.drill_ids.len(),
                time_limit: t.time_limit(),
                passing_score: t.passing_score,
                stats: self.stats.get(&t.id).cloned(),
            })
            .collect()
    }

    pub fn short_rows(&self) -> Vec<ShortRow> {
        self.shorts
            .iter()
            .map(|s| ShortRow {
                id: s.id,
                drill_id: s.drill_id,
                label: s
                    .text_catalan
                    .clone()
                    .or_else(|| self.drill(s.drill_id).map(Drill::display_label))
                    .unwrap_or_else(|| format!("Drill #{}", s.drill_id)),
                link: self.media_link(Some(&s.video_path)),
            })
            .collect()
    }

    /// Repaso de la última sesión terminada.
    pub fn review_rows(&self) -> Vec<ReviewRow> {
        match &self.quiz {
            Some(quiz) if quiz.is_finished() => review(quiz.results(), quiz.drills()),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::app::test_support::app_with;

    #[test]
    fn rows_follow_filter_and_selection() {
        let mut app = app_with(Arc::new(FakeApi::default()));
        app.drills = vec![
            Drill {
                id: 1,
                text_catalan: Some("hola".into()),
                audio_url: Some("/media/audio/1.webm".into()),
                ..Default::default()
            },
            Drill {
                id: 2,
                text_catalan: Some("pa".into()),
                ..Default::default()
            },
        ];
        app.selection.toggle(2);
        app.filter = "PA".into();
        let rows = app.drill_rows();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].selected);
        assert!(!rows[0].has_audio);

        app.filter.clear();
        assert!(app.drill_rows()[0].has_audio);
    }

    #[test]
    fn short_links_are_resolved_against_the_api() {
        let mut app = app_with(Arc::new(FakeApi::default()));
        app.shorts = vec![Short {
            id: 3,
            date_created: None,
            drill_id: 9,
            video_path: "/media/shorts/9.mp4".into(),
            text_catalan: None,
            text_tachelhit: None,
            text_arabic: None,
        }];
        let rows = app.short_rows();
        assert_eq!(rows[0].label, "Drill #9");
        assert_eq!(
            rows[0].link,
            format!("{}/media/shorts/9.mp4", app.base_url())
        );
    }
}
