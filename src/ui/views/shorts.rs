use crate::DrillApp;
use crate::app::DeleteTarget;
use crate::ui::layout::scroll_panel;
use egui::{Context, Grid};

pub fn ui_shorts(app: &mut DrillApp, ctx: &Context) {
    scroll_panel(ctx, 800.0, |ui| {
        ui.heading("🎞 Shorts");
        ui.add_space(8.0);
        let rows = app.short_rows();
        if rows.is_empty() {
            ui.label("Aún no hay shorts. Genera uno desde el editor de un drill.");
            return;
        }
        Grid::new("shorts_grid")
            .striped(true)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                for row in &rows {
                    ui.label(format!("#{}", row.id));
                    ui.label(&row.label);
                    ui.hyperlink_to("▶ Ver", &row.link);
                    if ui.small_button("🗑").on_hover_text("Borrar").clicked() {
                        app.request_delete(DeleteTarget::Short(row.id));
                    }
                    ui.end_row();
                }
            });
    });
}
