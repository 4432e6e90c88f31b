use crate::DrillApp;
use crate::app::TaskKind;
use crate::model::{AppState, HintLevel, QuestionType};
use crate::ui::helpers::status_label;
use crate::ui::layout::{centered_panel, two_button_row};
use egui::{ComboBox, Context, DragValue, Grid, Slider};

pub fn ui_test_form(app: &mut DrillApp, ctx: &Context) {
    let saving = app.is_busy(TaskKind::SaveTest);
    centered_panel(ctx, 520.0, 560.0, |ui| {
        let Some(form) = app.test_form.as_mut() else {
            ui.label("No hay ningún formulario abierto.");
            return;
        };
        let heading = match &form.editing {
            Some(test) => format!("✏ Editar «{}»", test.title),
            None => "🧪 Nuevo test".to_string(),
        };
        ui.heading(heading);
        ui.add_space(10.0);

        Grid::new("test_form_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Título");
                ui.text_edit_singleline(&mut form.title);
                ui.end_row();

                ui.label("Descripción");
                ui.text_edit_multiline(&mut form.description);
                ui.end_row();

                ui.label("Tipo de pregunta");
                ComboBox::from_id_salt("question_type")
                    .selected_text(form.question_type.label())
                    .show_ui(ui, |ui| {
                        for kind in QuestionType::ALL {
                            ui.selectable_value(&mut form.question_type, kind, kind.label());
                        }
                    });
                ui.end_row();

                ui.label("Pistas");
                ComboBox::from_id_salt("hint_level")
                    .selected_text(form.hint_level.label())
                    .show_ui(ui, |ui| {
                        for level in HintLevel::ALL {
                            ui.selectable_value(&mut form.hint_level, level, level.label());
                        }
                    });
                ui.end_row();

                match form.hint_level {
                    HintLevel::Partial => {
                        ui.label("Letras visibles (%)");
                        ui.add(Slider::new(&mut form.hint_percentage, 10..=90));
                        ui.end_row();
                    }
                    HintLevel::FullAfterTries => {
                        ui.label("Intentos antes de revelar");
                        ui.add(DragValue::new(&mut form.hint_tries_before_reveal).range(0..=10));
                        ui.end_row();
                    }
                    HintLevel::None => {}
                }

                ui.label("Tiempo por pregunta (s, 0 = sin límite)");
                ui.add(DragValue::new(&mut form.time_limit_seconds).range(0..=600));
                ui.end_row();

                ui.label("Nota para aprobar");
                ui.add(Slider::new(&mut form.passing_score, 0.0..=100.0));
                ui.end_row();
            });

        ui.add_space(8.0);
        match &form.editing {
            Some(test) => ui.label(format!("Drills: {} (fijos al editar)", test.drill_ids.len())),
            None => ui.label(format!("Drills seleccionados: {}", app.selection.len())),
        };
        if let Some(err) = &app.form_error {
            status_label(ui, err);
        }
        ui.add_space(10.0);

        let width = ui.available_width();
        let save_label = if saving { "⏳ Guardando..." } else { "💾 Guardar test" };
        let (save, cancel) = two_button_row(ui, width, save_label, "Cancelar");
        if save && !saving {
            app.submit_test_form();
        }
        if cancel {
            app.test_form = None;
            app.form_error = None;
            app.navigate(AppState::Dashboard);
        }
    });
}
