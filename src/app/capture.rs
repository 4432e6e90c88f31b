use super::*;
use crate::capture::{CaptureError, CaptureEvent, CapturedMedia};

impl DrillApp {
    fn editing_drill_id(&self) -> Option<DrillId> {
        self.editor.as_ref().map(|e| e.drill_id())
    }

    fn report_capture_error(&mut self, err: CaptureError) {
        log::warn!("captura: {err}");
        self.capture_message = err.user_message();
    }

    pub fn start_audio_recording(&mut self, now: f64) {
        let Some(drill_id) = self.editing_drill_id() else {
            return;
        };
        match self.capture.start_audio_capture(drill_id, now) {
            Ok(()) => self.capture_message = "🔴 Grabando audio...".into(),
            Err(err) => self.report_capture_error(err),
        }
    }

    pub fn start_video_recording(&mut self, now: f64) {
        let Some(drill_id) = self.editing_drill_id() else {
            return;
        };
        match self
            .capture
            .start_video_capture(drill_id, self.prefs.facing, now)
        {
            Ok(()) => self.capture_message = "🔴 Grabando vídeo...".into(),
            Err(err) => self.report_capture_error(err),
        }
    }

    pub fn open_camera(&mut self) {
        let Some(drill_id) = self.editing_drill_id() else {
            return;
        };
        match self.capture.start_preview(drill_id, self.prefs.facing) {
            Ok(()) => self.capture_message = "📷 Cámara lista".into(),
            Err(err) => self.report_capture_error(err),
        }
    }

    pub fn take_photo(&mut self, now: f64) {
        match self.capture.capture_still_image(now) {
            Ok(Some(media)) => self.upload_captured(media),
            Ok(None) => self.capture_message = "⏳ Esperando imagen de la cámara...".into(),
            Err(err) => self.report_capture_error(err),
        }
    }

    pub fn stop_recording(&mut self) {
        match self.capture.stop_capture() {
            Ok(Some(media)) => self.upload_captured(media),
            Ok(None) => {}
            Err(err) => self.report_capture_error(err),
        }
    }

    pub fn switch_camera(&mut self, now: f64) {
        match self.capture.switch_camera(now) {
            Ok(()) => self.capture_message = "🔄 Cambiando de cámara...".into(),
            Err(err) => self.report_capture_error(err),
        }
    }

    pub fn cancel_capture(&mut self) {
        self.capture.cancel();
        self.capture_message.clear();
    }

    /// Cada frame: auto-stop, reinicio de cámara y reintentos de foto.
    pub fn poll_capture(&mut self, now: f64) {
        match self.capture.poll(now) {
            Some(CaptureEvent::Finished(media)) => self.upload_captured(media),
            Some(CaptureEvent::Restarted(facing)) => {
                self.prefs.facing = facing;
                self.capture_message = format!("📷 Cámara {}", facing.label().to_lowercase());
            }
            Some(CaptureEvent::Failed(err)) => self.report_capture_error(err),
            None => {}
        }
    }

    /// Grabación, cámara en espera o test con tiempo: `poll_capture` y
    /// `tick_quiz` deben correr aunque el usuario no toque nada.
    pub fn needs_frame_ticks(&self) -> bool {
        let quiz_timed = self
            .quiz
            .as_ref()
            .is_some_and(|q| !q.is_finished() && q.time_left().is_some());
        self.capture.is_recording() || self.capture.is_busy() || quiz_timed
    }

    fn upload_captured(&mut self, media: CapturedMedia) {
        let CapturedMedia {
            drill_id,
            kind,
            blob,
        } = media;
        self.upload_blob(drill_id, kind, blob);
    }
}
