use super::*;
use crate::editor::DiscardOutcome;

impl DrillApp {
    pub fn open_editor(&mut self, drill: Drill) {
        self.capture.cancel();
        self.capture_message.clear();
        self.search_phrase.clear();
        self.upload_path.clear();
        self.photographer = None;
        self.editor = Some(DrillEditor::begin_edit(drill));
        self.pending_leave = None;
        self.state = AppState::DrillEditor;
    }

    /// Cambia de vista. Desde el editor con cambios sin guardar se pide
    /// confirmación antes de salir.
    pub fn navigate(&mut self, target: AppState) {
        if self.state == target {
            return;
        }
        if self.state == AppState::DrillEditor {
            if let Some(editor) = self.editor.as_mut() {
                if editor.request_discard() == DiscardOutcome::NeedsConfirmation {
                    self.pending_leave = Some(target);
                    return;
                }
            }
        }
        self.leave_to(target);
    }

    fn leave_to(&mut self, target: AppState) {
        match self.state {
            AppState::DrillEditor => {
                // Cerrar el panel siempre suelta cámara y micro
                self.capture.cancel();
                self.editor = None;
            }
            AppState::Quiz if target != AppState::Summary => {
                if self.quiz.as_ref().is_some_and(|q| !q.is_finished()) {
                    log::info!("sesión de test abandonada");
                }
                self.quiz = None;
            }
            _ => {}
        }
        self.pending_leave = None;
        self.state = target;
        if target == AppState::Dashboard {
            self.refresh_all();
        }
    }

    /// Botón "Descartar" dentro del editor: revierte sin salir.
    pub fn discard_changes(&mut self) {
        if let Some(editor) = self.editor.as_mut() {
            if editor.request_discard() == DiscardOutcome::Discarded {
                editor.confirm_discard();
            }
        }
    }

    pub fn confirm_discard(&mut self) {
        if let Some(editor) = self.editor.as_mut() {
            editor.confirm_discard();
        }
        if let Some(target) = self.pending_leave.take() {
            self.leave_to(target);
        }
    }

    pub fn cancel_discard(&mut self) {
        if let Some(editor) = self.editor.as_mut() {
            editor.cancel_discard();
        }
        self.pending_leave = None;
    }

    pub fn is_confirming_discard(&self) -> bool {
        self.editor
            .as_ref()
            .is_some_and(|e| e.is_confirming_discard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::app::test_support::app_with;
    use crate::editor::DrillField;

    fn app_editing() -> DrillApp {
        let drill = Drill {
            id: 5,
            text_catalan: Some("pa".into()),
            ..Default::default()
        };
        let mut app = app_with(Arc::new(FakeApi::with_drills(vec![drill.clone()])));
        app.open_editor(drill);
        app
    }

    #[test]
    fn clean_editor_leaves_directly() {
        let mut app = app_editing();
        app.navigate(AppState::Settings);
        assert_eq!(app.state, AppState::Settings);
        assert!(app.editor.is_none());
    }

    #[test]
    fn dirty_editor_prompts_before_leaving() {
        let mut app = app_editing();
        if let Some(editor) = app.editor.as_mut() {
            editor.set_field(DrillField::Catalan, "pa amb tomàquet");
        }
        app.navigate(AppState::Settings);
        assert_eq!(app.state, AppState::DrillEditor);
        assert!(app.is_confirming_discard());

        app.cancel_discard();
        assert_eq!(app.state, AppState::DrillEditor);
        assert_eq!(
            app.editor.as_ref().map(|e| e.field(DrillField::Catalan).to_string()),
            Some("pa amb tomàquet".to_string())
        );

        app.navigate(AppState::Settings);
        app.confirm_discard();
        assert_eq!(app.state, AppState::Settings);
        assert!(app.editor.is_none());
    }

    #[test]
    fn discard_button_reverts_in_place() {
        let mut app = app_editing();
        if let Some(editor) = app.editor.as_mut() {
            editor.set_field(DrillField::Catalan, "llet");
        }
        app.discard_changes();
        assert!(app.is_confirming_discard());
        app.confirm_discard();
        assert_eq!(app.state, AppState::DrillEditor);
        let editor = app.editor.as_ref().unwrap();
        assert_eq!(editor.field(DrillField::Catalan), "pa");
        assert!(!editor.is_dirty());
    }
}
