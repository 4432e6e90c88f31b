mod helpers;
pub mod layout;
pub mod views;

use crate::app::{DeleteTarget, DrillApp};
use crate::model::AppState;
use eframe::{APP_KEY, App, Frame, set_value};
use egui::Context;
use helpers::confirm_window;
use layout::{bottom_panel, top_panel};
use std::time::Duration;

impl App for DrillApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        let now = ctx.input(|i| i.time);
        self.poll_tasks();
        self.poll_capture(now);
        self.tick_quiz(now);

        // Cronómetro de grabación y cuenta atrás necesitan frames aunque no haya input
        if self.needs_frame_ticks() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        top_panel(self, ctx);
        bottom_panel(self, ctx);

        // Dispatch por estado a las funciones en views/
        match self.state {
            AppState::Dashboard => views::dashboard::ui_dashboard(self, ctx),
            AppState::DrillEditor => views::drill_editor::ui_drill_editor(self, ctx),
            AppState::TestForm => views::test_form::ui_test_form(self, ctx),
            AppState::Quiz => views::quiz::ui_quiz(self, ctx),
            AppState::Summary => views::summary::ui_summary(self, ctx),
            AppState::Shorts => views::shorts::ui_shorts(self, ctx),
            AppState::Settings => views::settings::ui_settings(self, ctx),
        }

        if let Some(target) = self.confirm_delete {
            let text = match target {
                DeleteTarget::Drill(id) => format!("¿Borrar el drill #{id} y sus medios?"),
                DeleteTarget::Test(id) => format!("¿Borrar el test #{id}?"),
                DeleteTarget::Short(id) => format!("¿Borrar el short #{id}?"),
            };
            match confirm_window(ctx, "Confirmar borrado", &text, "Sí, borrar") {
                Some(true) => self.confirm_delete(),
                Some(false) => self.confirm_delete = None,
                None => {}
            }
        }

        if self.is_confirming_discard() {
            match confirm_window(
                ctx,
                "Cambios sin guardar",
                "¿Descartar los cambios del drill? ¡Esta acción no se puede deshacer!",
                "Sí, descartar",
            ) {
                Some(true) => self.confirm_discard(),
                Some(false) => self.cancel_discard(),
                None => {}
            }
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        set_value(storage, APP_KEY, &self.prefs);
    }
}
