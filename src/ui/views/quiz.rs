use crate::DrillApp;
use crate::model::AppState;
use crate::ui::helpers::{format_secs, media_link, status_label};
use crate::ui::layout::{centered_panel, two_button_row};
use egui::{Button, Context, Key, RichText, TextEdit};

pub fn ui_quiz(app: &mut DrillApp, ctx: &Context) {
    let now = ctx.input(|i| i.time);
    let Some(quiz) = app.quiz.as_ref() else {
        app.state = AppState::Dashboard;
        return;
    };
    let Some(prompt) = quiz.current_prompt() else {
        return;
    };
    let time_left = quiz.time_left();
    let attempts = quiz.attempts();
    let hints_allowed = quiz.hint_policy().allows_requests();
    let hint = quiz.hint_text();

    centered_panel(ctx, 420.0, 650.0, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading(format!("Pregunta {} de {}", prompt.position, prompt.total));
            if let Some(secs) = time_left {
                let text = RichText::new(format!("⏱ {}", format_secs(secs)));
                ui.label(if secs <= 5 { text.strong() } else { text });
            }
        });
        ui.add_space(12.0);

        // Enunciado: texto catalán o medios
        if let Some(text) = &prompt.text {
            ui.label(RichText::new(text).size(24.0));
        }
        ui.horizontal_wrapped(|ui| {
            if prompt.audio_url.is_some() {
                media_link(ui, "🔊 Escuchar", &app.media_link(prompt.audio_url.as_deref()));
            }
            if prompt.video_url.is_some() {
                media_link(ui, "🎬 Ver vídeo", &app.media_link(prompt.video_url.as_deref()));
            }
            if prompt.image_url.is_some() {
                media_link(ui, "🖼 Imagen", &app.media_link(prompt.image_url.as_deref()));
            }
        });
        ui.add_space(12.0);

        ui.label("Respuesta en tachelhit:");
        let mut submit = false;
        if let Some(quiz) = app.quiz.as_mut() {
            let response = ui.add(
                TextEdit::singleline(&mut quiz.answer)
                    .desired_width(f32::INFINITY)
                    .hint_text("Escribe aquí..."),
            );
            submit = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
        }
        if let Some(hint) = &hint {
            ui.label(format!("💡 Pista: {hint}"));
        }
        ui.add_space(8.0);

        if hints_allowed && ui.add(Button::new("💡 Pedir pista")).clicked() {
            app.request_hint();
        }
        if attempts > 0 {
            ui.label(RichText::new(format!("Intentos: {attempts}")).weak());
        }
        ui.add_space(8.0);

        let width = ui.available_width();
        let (send, skip) = two_button_row(ui, width, "Enviar", "Saltar pregunta");
        if send || submit {
            app.submit_answer(now);
        } else if skip {
            app.skip_question(now);
        }
        ui.add_space(6.0);
        status_label(ui, &app.quiz_feedback);
    });
}
