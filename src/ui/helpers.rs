// src/ui/helpers.rs
use egui::{Button, Color32, Context, RichText, Ui, Vec2};

pub fn big_list_button(ui: &mut Ui, label: impl Into<String>, width: f32, height: f32, enabled: bool) -> bool {
    ui.add_enabled(enabled, Button::new(label.into()).min_size(Vec2::new(width, height)))
        .clicked()
}

/// Mensaje de estado: rojo si empieza por ❌ o ⚠.
pub fn status_label(ui: &mut Ui, text: &str) {
    if text.is_empty() {
        return;
    }
    if text.starts_with('❌') || text.starts_with('⚠') {
        ui.colored_label(Color32::LIGHT_RED, text);
    } else {
        ui.label(text);
    }
}

/// Enlace a un medio del servidor, o un texto apagado si no hay.
pub fn media_link(ui: &mut Ui, label: &str, url: &str) {
    if url.is_empty() {
        ui.label(RichText::new(format!("{label}: —")).weak());
    } else {
        ui.hyperlink_to(format!("{label} ↗"), url);
    }
}

/// Ventana modal Sí/No. Devuelve `Some(true)` al confirmar, `Some(false)`
/// al cancelar y `None` mientras no se pulse nada.
pub fn confirm_window(ctx: &Context, title: &str, text: &str, yes: &str) -> Option<bool> {
    let mut answer = None;
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(text);
            ui.horizontal(|ui| {
                if ui.button(yes).clicked() {
                    answer = Some(true);
                }
                if ui.button("No").clicked() {
                    answer = Some(false);
                }
            });
        });
    answer
}

pub fn format_secs(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
