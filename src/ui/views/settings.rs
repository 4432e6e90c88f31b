use crate::DrillApp;
use crate::ui::helpers::status_label;
use crate::ui::layout::centered_panel;
use egui::{Button, Context, Grid, RichText};

pub fn ui_settings(app: &mut DrillApp, ctx: &Context) {
    centered_panel(ctx, 320.0, 560.0, |ui| {
        ui.heading("⚙ Ajustes");
        ui.add_space(10.0);

        Grid::new("settings_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Tu nombre");
                ui.text_edit_singleline(&mut app.prefs.user_name);
                ui.end_row();

                ui.label("URL del API");
                ui.text_edit_singleline(&mut app.settings_url_input);
                ui.end_row();

                ui.label("URL en uso");
                ui.label(RichText::new(app.base_url()).monospace());
                ui.end_row();
            });
        ui.label(RichText::new("La URL nueva se aplica al reiniciar la aplicación.").weak());
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            if ui.button("💾 Guardar URL").clicked() {
                app.save_api_url_override();
            }
            if ui.add(Button::new("🩺 Comprobar conexión")).clicked() {
                app.check_health();
            }
        });
        status_label(ui, &app.health_message);
    });
}
