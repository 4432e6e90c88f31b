use crate::DrillApp;
use crate::app::TaskKind;
use crate::model::AppState;
use crate::quiz::ReviewRow;
use crate::ui::helpers::{format_secs, status_label};
use crate::ui::layout::two_button_row;
use egui::{Button, CentralPanel, Context, Grid, RichText, ScrollArea};

pub fn ui_summary(app: &mut DrillApp, ctx: &Context) {
    let now = ctx.input(|i| i.time);
    let Some(quiz) = app.quiz.as_ref() else {
        app.state = AppState::Dashboard;
        return;
    };
    let test_id = quiz.test_id();
    let summary = quiz.summary();
    let rows: Vec<ReviewRow> = app.review_rows();
    let title = app
        .test(test_id)
        .map(|t| t.title.clone())
        .unwrap_or_default();

    CentralPanel::default().show(ctx, |ui| {
        let max_width = 700.0;
        let panel_width = (ui.available_width() * 0.97).min(max_width);

        ui.vertical_centered(|ui| {
            egui::Frame::default()
                .fill(ui.visuals().window_fill())
                .inner_margin(egui::Margin::symmetric(16, 24))
                .show(ui, |ui| {
                    ui.set_width(panel_width);
                    ui.heading(format!("Resultado: {title}"));
                    ui.add_space(10.0);

                    if let Some(s) = &summary {
                        let verdict = if s.passed { "✅ Aprobado" } else { "❌ Suspendido" };
                        ui.label(RichText::new(format!("{:.1} / 100  {verdict}", s.score)).size(22.0));
                        ui.label(format!(
                            "{} de {} correctas · {}",
                            s.correct,
                            s.total,
                            format_secs(s.elapsed_secs)
                        ));
                    }
                    ui.add_space(10.0);

                    ScrollArea::vertical()
                        .max_height(420.0)
                        .max_width(panel_width)
                        .show(ui, |ui| {
                            if rows.is_empty() {
                                ui.label("No hay respuestas que revisar.");
                                return;
                            }
                            Grid::new("review_grid")
                                .striped(true)
                                .spacing([10.0, 4.0])
                                .show(ui, |ui| {
                                    ui.label("#");
                                    ui.label("Pregunta");
                                    ui.label("Tu respuesta");
                                    ui.label("Intentos");
                                    ui.label("Tiempo");
                                    ui.label("Estado");
                                    ui.end_row();

                                    for r in &rows {
                                        ui.label(r.number.to_string());
                                        ui.label(&r.prompt);
                                        ui.label(&r.user_answer);
                                        ui.label(r.attempts.to_string());
                                        ui.label(format!("{} s", r.time_spent));
                                        match &r.expected {
                                            None => ui.label("✅ Correcta"),
                                            Some(expected) => ui.label(format!("❌ Era: {expected}")),
                                        };
                                        ui.end_row();
                                    }
                                });
                        });

                    ui.add_space(10.0);
                    status_label(ui, &app.quiz_feedback);

                    let submitting = app.is_busy(TaskKind::SubmitAttempt);
                    if app.last_attempt.is_none() && !submitting {
                        if ui.add(Button::new("⬆ Reintentar guardado")).clicked() {
                            app.retry_submit_attempt();
                        }
                    }
                    ui.add_space(10.0);

                    let (again, back) = two_button_row(ui, panel_width, "🔁 Repetir test", "🏠 Volver");
                    if again {
                        app.start_quiz(test_id, now);
                    } else if back {
                        app.navigate(AppState::Dashboard);
                    }
                });
        });
    });
}
