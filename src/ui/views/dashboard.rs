use crate::DrillApp;
use crate::app::DeleteTarget;
use crate::app::TaskKind;
use crate::model::{TestAttempt, TestId};
use crate::ui::helpers::{big_list_button, format_secs};
use crate::ui::layout::scroll_panel;
use crate::view_models::missed_drills_label;
use egui::{Context, Grid, RichText, Ui};

pub fn ui_dashboard(app: &mut DrillApp, ctx: &Context) {
    let now = ctx.input(|i| i.time);
    scroll_panel(ctx, 1000.0, |ui| {
        drills_section(app, ui);
        ui.add_space(16.0);
        ui.separator();
        tests_section(app, ui, now);
    });
}

fn drills_section(app: &mut DrillApp, ui: &mut Ui) {
    ui.horizontal(|ui| {
        ui.heading("📚 Drills");
        ui.add_space(12.0);
        if ui
            .add_enabled(
                !app.is_busy(TaskKind::CreateDrill),
                egui::Button::new("➕ Nuevo drill"),
            )
            .clicked()
        {
            app.create_drill();
        }
    });
    ui.add_space(6.0);

    ui.horizontal(|ui| {
        ui.label("🔎");
        ui.text_edit_singleline(&mut app.filter);
        if ui.button("Seleccionar todos").clicked() {
            let visible: Vec<_> = app.drill_rows().iter().map(|r| r.id).collect();
            for id in visible {
                if !app.selection.contains(id) {
                    app.selection.toggle(id);
                }
            }
        }
        if ui.button("Quitar selección").clicked() {
            app.selection.clear();
        }
        ui.label(format!("{} seleccionados", app.selection.len()));
    });
    ui.add_space(6.0);

    let rows = app.drill_rows();
    if rows.is_empty() {
        ui.label("No hay drills. Crea uno con «Nuevo drill».");
        return;
    }

    Grid::new("drills_grid")
        .striped(true)
        .spacing([10.0, 4.0])
        .show(ui, |ui| {
            ui.label("");
            ui.label("#");
            ui.label("Català");
            ui.label("Tachelhit");
            ui.label("Etiqueta");
            ui.label("Medios");
            ui.label("");
            ui.end_row();

            for row in &rows {
                let mut checked = row.selected;
                if ui.checkbox(&mut checked, "").changed() {
                    app.selection.toggle(row.id);
                }
                ui.label(row.id.to_string());
                ui.label(&row.label);
                ui.label(&row.tachelhit);
                ui.label(row.tag.as_deref().unwrap_or(""));
                ui.label(row.media_badges());
                ui.horizontal(|ui| {
                    if ui.small_button("✏").on_hover_text("Editar").clicked() {
                        if let Some(drill) = app.drill(row.id).cloned() {
                            app.open_editor(drill);
                        }
                    }
                    if ui.small_button("🗑").on_hover_text("Borrar").clicked() {
                        app.request_delete(DeleteTarget::Drill(row.id));
                    }
                });
                ui.end_row();
            }
        });
}

fn tests_section(app: &mut DrillApp, ui: &mut Ui, now: f64) {
    ui.horizontal(|ui| {
        ui.heading("🧪 Tests");
        ui.add_space(12.0);
        let label = format!("➕ Nuevo test con {} drills", app.selection.len());
        if ui
            .add_enabled(!app.selection.is_empty(), egui::Button::new(label))
            .on_disabled_hover_text("Selecciona drills en la tabla de arriba")
            .clicked()
        {
            app.open_test_form(None);
        }
    });
    ui.add_space(6.0);

    let rows = app.test_rows();
    if rows.is_empty() {
        ui.label("Todavía no hay tests.");
        return;
    }

    let width = ui.available_width();
    for row in rows {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(width - 16.0);
            ui.label(RichText::new(&row.title).strong());
            ui.label(RichText::new(row.settings_label()).small());
            ui.label(row.stats_label());
            ui.horizontal(|ui| {
                if big_list_button(ui, "▶ Hacer test", 120.0, 28.0, row.drill_count > 0) {
                    app.start_quiz(row.id, now);
                }
                if ui.button("✏ Editar").clicked() {
                    if let Some(test) = app.test(row.id).cloned() {
                        app.open_test_form(Some(&test));
                    }
                }
                if ui.button("📊 Estadísticas").clicked() {
                    app.load_stats(row.id);
                }
                if ui.button("🗂 Intentos").clicked() {
                    app.load_attempts(row.id);
                }
                if ui.button("🗑").on_hover_text("Borrar").clicked() {
                    app.request_delete(DeleteTarget::Test(row.id));
                }
            });
            if let Some(attempts) = app.attempts.get(&row.id) {
                attempts_list(ui, row.id, attempts);
            }
        });
        ui.add_space(4.0);
    }
}

fn attempts_list(ui: &mut Ui, test_id: TestId, attempts: &[TestAttempt]) {
    egui::CollapsingHeader::new(format!("Intentos ({})", attempts.len()))
        .id_salt(("attempts", test_id))
        .show(ui, |ui| {
            if attempts.is_empty() {
                ui.label("Sin intentos.");
                return;
            }
            Grid::new(("attempts_grid", test_id))
                .striped(true)
                .show(ui, |ui| {
                    ui.label("Fecha");
                    ui.label("Nombre");
                    ui.label("Nota");
                    ui.label("Aciertos");
                    ui.label("Tiempo");
                    ui.label("Fallados");
                    ui.end_row();
                    for a in attempts {
                        let date = a
                            .date_taken
                            .map(|d| d.format("%d/%m/%Y %H:%M").to_string())
                            .unwrap_or_default();
                        ui.label(date);
                        ui.label(a.user_name.as_deref().unwrap_or("anónimo"));
                        ui.label(format!("{:.1}", a.score));
                        ui.label(format!("{}/{}", a.correct_answers, a.total_questions));
                        ui.label(format_secs(a.time_taken_seconds));
                        ui.label(missed_drills_label(a));
                        ui.end_row();
                    }
                });
        });
}
