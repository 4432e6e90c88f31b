use drill_studio::app::Preferences;
use drill_studio::config::Settings;
use drill_studio::DrillApp;
use eframe::{APP_KEY, get_value};
use egui::Visuals;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "Drill Studio - Català · Tachelhit",
        options,
        Box::new(|cc| {
            let prefs: Preferences = cc
                .storage
                .and_then(|storage| get_value(storage, APP_KEY))
                .unwrap_or_default();
            let settings = Settings::load(prefs.api_url_override.as_deref())?;
            log::info!("API en {}", settings.api_base_url);

            cc.egui_ctx.set_visuals(if prefs.dark_mode {
                Visuals::dark()
            } else {
                Visuals::light()
            });

            let mut app = DrillApp::new(settings, prefs);
            app.tasks.set_repaint_context(cc.egui_ctx.clone());
            app.refresh_all();
            Ok(Box::new(app))
        }),
    )
}
