use crate::DrillApp;
use crate::app::TaskKind;
use crate::editor::DrillField;
use crate::model::{AppState, DrillId, MediaKind};
use crate::ui::helpers::{format_secs, media_link, status_label};
use crate::ui::layout::scroll_panel;
use egui::{Button, Context, Grid, RichText, Ui};
use std::path::PathBuf;

pub fn ui_drill_editor(app: &mut DrillApp, ctx: &Context) {
    let now = ctx.input(|i| i.time);
    let dropped: Vec<PathBuf> = ctx.input(|i| {
        i.raw
            .dropped_files
            .iter()
            .filter_map(|f| f.path.clone())
            .collect()
    });

    let Some(drill_id) = app.editor.as_ref().map(|e| e.drill_id()) else {
        app.state = AppState::Dashboard;
        return;
    };
    for path in dropped {
        app.upload_dropped_file(drill_id, &path);
    }

    scroll_panel(ctx, 800.0, |ui| {
        text_section(app, ui);
        ui.add_space(12.0);
        ui.separator();
        media_section(app, ui);
        ui.add_space(12.0);
        ui.separator();
        capture_section(app, ui, drill_id, now);
        ui.add_space(12.0);
        ui.separator();
        generation_section(app, ui, drill_id);
    });
}

fn text_section(app: &mut DrillApp, ui: &mut Ui) {
    let saving = app.is_busy(TaskKind::SaveDrill);
    let Some(editor) = app.editor.as_mut() else {
        return;
    };
    let dirty = editor.is_dirty();
    ui.horizontal(|ui| {
        ui.heading(format!("✏ Drill #{}", editor.drill_id()));
        if dirty {
            ui.label(RichText::new("● sin guardar").italics());
        }
    });
    ui.add_space(8.0);

    Grid::new("drill_fields")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            for field in DrillField::ALL {
                ui.label(field.label());
                let mut value = editor.field(field).to_string();
                let edit = egui::TextEdit::singleline(&mut value).desired_width(420.0);
                if ui.add(edit).changed() {
                    editor.set_field(field, value);
                }
                ui.end_row();
            }
        });
    ui.add_space(8.0);

    let mut save = false;
    let mut discard = false;
    let mut back = false;
    ui.horizontal(|ui| {
        save = ui
            .add_enabled(dirty && !saving, Button::new("💾 Guardar"))
            .clicked();
        discard = ui
            .add_enabled(dirty, Button::new("↩ Descartar cambios"))
            .clicked();
        back = ui.button("⬅ Volver").clicked();
    });
    if save {
        app.save_drill();
    }
    if discard {
        app.discard_changes();
    }
    if back {
        app.navigate(AppState::Dashboard);
    }
}

fn media_section(app: &DrillApp, ui: &mut Ui) {
    let Some(drill) = app.editor.as_ref().map(|e| e.persisted().clone()) else {
        return;
    };
    ui.label(RichText::new("Medios").strong());
    ui.horizontal_wrapped(|ui| {
        media_link(ui, "🔊 Audio", &app.media_link(drill.audio_url.as_deref()));
        media_link(ui, "🗣 TTS", &app.media_link(drill.audio_tts_url.as_deref()));
        media_link(ui, "🎬 Vídeo", &app.media_link(drill.video_url.as_deref()));
        media_link(ui, "🖼 Imagen", &app.media_link(drill.image_url.as_deref()));
    });
    if let Some(author) = &app.photographer {
        ui.label(RichText::new(format!("Foto: {author}")).small());
    }
}

fn capture_section(app: &mut DrillApp, ui: &mut Ui, drill_id: DrillId, now: f64) {
    ui.label(RichText::new("Grabar o subir").strong());
    let recording = app.capture.is_recording();
    let streaming = app.capture.has_stream();
    if !app.pending_uploads.is_empty() {
        ui.label(RichText::new(format!("⏳ {} subidas en cola", app.pending_uploads.len())).weak());
    }

    ui.horizontal_wrapped(|ui| {
        if ui
            .add_enabled(!streaming, Button::new("🎙 Grabar audio"))
            .clicked()
        {
            app.start_audio_recording(now);
        }
        if ui
            .add_enabled(!streaming, Button::new("🎬 Grabar vídeo"))
            .clicked()
        {
            app.start_video_recording(now);
        }
        if ui
            .add_enabled(!streaming, Button::new("📷 Abrir cámara"))
            .clicked()
        {
            app.open_camera();
        }
        if ui
            .add_enabled(streaming && !recording, Button::new("📸 Hacer foto"))
            .clicked()
        {
            app.take_photo(now);
        }
        let camera_open = streaming && app.capture.active_kind() != Some(MediaKind::Audio);
        if ui
            .add_enabled(camera_open, Button::new("🔄 Cambiar cámara"))
            .clicked()
        {
            app.switch_camera(now);
        }
        if ui.add_enabled(recording, Button::new("⏹ Parar")).clicked() {
            app.stop_recording();
        }
        if ui.add_enabled(streaming, Button::new("✖ Cancelar")).clicked() {
            app.cancel_capture();
        }
    });

    if let Some(elapsed) = app.capture.recording_elapsed(now) {
        let shown = format_secs(elapsed as u32);
        let max = app.settings.max_audio_seconds;
        if app.capture.active_kind() == Some(MediaKind::Audio) && max > 0 {
            ui.label(format!("🔴 {shown} / {}", format_secs(max)));
        } else {
            ui.label(format!("🔴 {shown}"));
        }
    }
    status_label(ui, &app.capture_message);
    ui.add_space(6.0);

    ui.horizontal(|ui| {
        ui.label("📁 Archivo:");
        ui.add(egui::TextEdit::singleline(&mut app.upload_path).desired_width(300.0));
    });
    let path = PathBuf::from(app.upload_path.trim());
    let has_path = !app.upload_path.trim().is_empty();
    ui.horizontal(|ui| {
        for kind in [MediaKind::Audio, MediaKind::Video, MediaKind::Image] {
            if ui
                .add_enabled(has_path, Button::new(format!("⬆ Subir como {kind}")))
                .clicked()
            {
                app.upload_file(drill_id, kind, &path);
            }
        }
    });
    ui.label(RichText::new("También puedes soltar el archivo sobre la ventana.").weak());
}

fn generation_section(app: &mut DrillApp, ui: &mut Ui, drill_id: DrillId) {
    ui.label(RichText::new("Generar").strong());
    ui.horizontal(|ui| {
        ui.label("Frase de búsqueda:");
        ui.text_edit_singleline(&mut app.search_phrase);
        if ui
            .add_enabled(
                !app.is_busy(TaskKind::GenerateImage),
                Button::new("🖼 Generar imagen"),
            )
            .clicked()
        {
            app.generate_image(drill_id);
        }
    });
    if ui
        .add_enabled(
            !app.is_busy(TaskKind::GenerateShort),
            Button::new("🎞 Generar short"),
        )
        .clicked()
    {
        app.generate_short(drill_id);
    }
}
