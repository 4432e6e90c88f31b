use crate::DrillApp;
use crate::model::AppState;
use egui::{Button, CentralPanel, Context, Frame, ScrollArea, Ui, Visuals};

/// Barra de navegación entre vistas. Durante el test se oculta para no
/// abandonar la sesión sin querer.
pub fn top_panel(app: &mut DrillApp, ctx: &Context) {
    egui::TopBottomPanel::top("menu_panel").show(ctx, |ui| {
        ui.horizontal_centered(|ui| {
            if app.state == AppState::Quiz {
                if ui.button("✖ Abandonar test").clicked() {
                    app.navigate(AppState::Dashboard);
                }
                return;
            }
            let tabs = [
                (AppState::Dashboard, "🏠 Drills y tests"),
                (AppState::Shorts, "🎞 Shorts"),
                (AppState::Settings, "⚙ Ajustes"),
            ];
            for (target, label) in tabs {
                if ui.selectable_label(app.state == target, label).clicked() {
                    app.navigate(target);
                }
            }
            ui.separator();
            if ui
                .add_enabled(app.state != AppState::DrillEditor, Button::new("🔄 Recargar"))
                .clicked()
            {
                app.refresh_all();
            }
        });
    });
}

pub fn bottom_panel(app: &mut DrillApp, ctx: &Context) {
    egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if app.tasks.any_pending() {
                ui.spinner();
            }
            if !app.message.is_empty() {
                ui.label(&app.message);
            }
            // ----------- BOTONES DE TEMA -----------
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🌙 Modo oscuro").clicked() {
                    app.prefs.dark_mode = true;
                    ctx.set_visuals(Visuals::dark());
                }
                if ui.button("☀Modo claro").clicked() {
                    app.prefs.dark_mode = false;
                    ctx.set_visuals(Visuals::light());
                }
                ui.label(egui::RichText::new(app.base_url()).weak());
            });
        });
    });
}

/// Panel centrado tanto vertical como horizontalmente,
/// con un tamaño de contenido máximo y un bloque interior `inner`.
pub fn centered_panel(ctx: &Context, est_height: f32, max_width: f32, inner: impl FnOnce(&mut Ui)) {
    CentralPanel::default().show(ctx, |ui| {
        let extra = ((ui.available_height() - est_height) / 2.0).max(0.0);
        ui.add_space(extra);
        Frame::default()
            .fill(ui.visuals().window_fill())
            .inner_margin(egui::Margin::symmetric(16, 16))
            .show(ui, |ui| {
                let w = ui.available_width().min(max_width);
                ui.set_width(w);
                inner(ui);
            });
        ui.add_space(extra);
    });
}

/// Panel con scroll vertical para las listas largas.
pub fn scroll_panel(ctx: &Context, max_width: f32, inner: impl FnOnce(&mut Ui)) {
    CentralPanel::default().show(ctx, |ui| {
        let w = ui.available_width().min(max_width);
        ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                Frame::default()
                    .fill(ui.visuals().window_fill())
                    .inner_margin(egui::Margin::symmetric(16, 12))
                    .show(ui, |ui| {
                        ui.set_width(w);
                        inner(ui);
                    });
            });
    });
}

/// Dibuja dos botones del mismo tamaño en una fila, centrados en el ancho dado.
/// Devuelve (clic izquierdo, clic derecho).
pub fn two_button_row(
    ui: &mut Ui,
    panel_width: f32,
    left_label: &str,
    right_label: &str,
) -> (bool, bool) {
    let btn_w = (panel_width - 8.0) / 2.0;
    let mut clicked_left = false;
    let mut clicked_right = false;
    ui.horizontal(|ui| {
        ui.add_space(((ui.available_width() - panel_width) / 2.0).max(0.0));
        clicked_left = ui
            .add_sized([btn_w, 36.0], Button::new(left_label))
            .clicked();
        clicked_right = ui
            .add_sized([btn_w, 36.0], Button::new(right_label))
            .clicked();
    });
    (clicked_left, clicked_right)
}
