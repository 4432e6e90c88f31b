use super::frame::is_capture_glitch;
use super::mime::{MimeChoice, negotiate_audio_mime, negotiate_video_mime};
use super::{
    Access, AudioConstraints, CaptureError, CaptureEvent, CapturedMedia, DeviceError, Facing,
    FacingConstraint, MediaDevices, StreamConstraints, StreamHandle, VideoConstraints,
};
use crate::config::Settings;
use crate::model::{DrillId, MediaBlob, MediaKind};

#[derive(Clone, Debug, PartialEq)]
pub struct CaptureSettings {
    /// 0 = sin techo.
    pub max_audio_seconds: u32,
    pub settle_secs: f64,
    pub frame_poll_interval: f64,
    pub frame_poll_max_attempts: u32,
    pub image_quality: f32,
    pub video_width: u32,
    pub video_height: u32,
}

impl From<&Settings> for CaptureSettings {
    fn from(s: &Settings) -> Self {
        Self {
            max_audio_seconds: s.max_audio_seconds,
            settle_secs: s.camera_settle(),
            frame_poll_interval: s.frame_poll_interval(),
            frame_poll_max_attempts: s.frame_poll_max_attempts.max(1),
            image_quality: s.image_quality,
            video_width: s.video_width,
            video_height: s.video_height,
        }
    }
}

struct ActiveCapture {
    drill_id: DrillId,
    kind: MediaKind,
    stream: StreamHandle,
    mime: MimeChoice,
    recording: bool,
    started_at: f64,
    chunks: Vec<Vec<u8>>,
}

struct PendingRestart {
    drill_id: DrillId,
    record: bool,
    at: f64,
}

struct PendingStill {
    drill_id: DrillId,
    next_try_at: f64,
    attempts: u32,
    glitch_retried: bool,
}

/// Dueño exclusivo del stream del dispositivo. Como mucho hay un stream
/// abierto a la vez, y se libera en cualquier salida (stop, error,
/// cancelación o drop).
pub struct CaptureController<D: MediaDevices> {
    devices: D,
    settings: CaptureSettings,
    active: Option<ActiveCapture>,
    facing: Facing,
    microphone_denied: bool,
    camera_denied: bool,
    pending_restart: Option<PendingRestart>,
    pending_still: Option<PendingStill>,
}

impl<D: MediaDevices> CaptureController<D> {
    pub fn new(devices: D, settings: CaptureSettings) -> Self {
        Self {
            devices,
            settings,
            active: None,
            facing: Facing::default(),
            microphone_denied: false,
            camera_denied: false,
            pending_restart: None,
            pending_still: None,
        }
    }

    pub fn devices(&self) -> &D {
        &self.devices
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_recording(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.recording)
    }

    pub fn has_stream(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_kind(&self) -> Option<MediaKind> {
        self.active.as_ref().map(|a| a.kind)
    }

    /// Hay algo en vuelo: reinicio de cámara o foto esperando al vídeo.
    pub fn is_busy(&self) -> bool {
        self.pending_restart.is_some() || self.pending_still.is_some()
    }

    pub fn recording_elapsed(&self, now: f64) -> Option<f64> {
        self.active
            .as_ref()
            .filter(|a| a.recording)
            .map(|a| (now - a.started_at).max(0.0))
    }

    /// Olvida denegaciones previas (equivale a recargar la página).
    pub fn reset_permission_memory(&mut self) {
        self.microphone_denied = false;
        self.camera_denied = false;
    }

    fn check_available(&self, access: Access) -> Result<(), CaptureError> {
        if !self.devices.has_media_api() {
            return Err(CaptureError::Unsupported);
        }
        if access == Access::Camera && !self.devices.has_camera() {
            return Err(CaptureError::CameraUnsupported);
        }
        let denied = match access {
            Access::Microphone => self.microphone_denied,
            Access::Camera => self.camera_denied,
        };
        if denied {
            return Err(CaptureError::PermissionPreviouslyDenied(access));
        }
        Ok(())
    }

    fn map_device_error(&mut self, err: DeviceError, access: Access) -> CaptureError {
        log::warn!("error de {access:?}: {err}");
        match err {
            DeviceError::NotAllowed => {
                match access {
                    Access::Microphone => self.microphone_denied = true,
                    Access::Camera => self.camera_denied = true,
                }
                CaptureError::PermissionDenied(access)
            }
            DeviceError::NotFound => CaptureError::DeviceNotFound(access),
            DeviceError::NotReadable => CaptureError::DeviceBusy(access),
            other => CaptureError::Device(other.to_string()),
        }
    }

    fn release_stream(&mut self, stream: &StreamHandle) {
        for track in 0..stream.track_count {
            self.devices.stop_track(stream, track);
        }
        log::info!("stream {} liberado ({} pistas)", stream.id, stream.track_count);
    }

    /// Corta el grabador (descartando lo grabado) y suelta el stream.
    fn release_active(&mut self) {
        if let Some(active) = self.active.take() {
            if active.recording {
                let _ = self.devices.stop_recording();
            }
            if active.stream.width > 0 {
                self.devices.detach_preview();
            }
            self.release_stream(&active.stream);
        }
    }

    pub fn start_audio_capture(&mut self, drill_id: DrillId, now: f64) -> Result<(), CaptureError> {
        self.check_available(Access::Microphone)?;
        self.cancel();

        let mime = negotiate_audio_mime(&self.devices);
        log::info!("audio: grabando como {}", mime.blob);
        let constraints = StreamConstraints {
            audio: Some(AudioConstraints {
                echo_cancellation: true,
                noise_suppression: true,
            }),
            video: None,
        };
        let stream = match self.devices.acquire_stream(&constraints) {
            Ok(stream) => stream,
            Err(err) => return Err(self.map_device_error(err, Access::Microphone)),
        };
        self.begin_recording(drill_id, MediaKind::Audio, stream, mime, now, Access::Microphone)
    }

    pub fn start_video_capture(
        &mut self,
        drill_id: DrillId,
        facing: Facing,
        now: f64,
    ) -> Result<(), CaptureError> {
        self.check_available(Access::Camera)?;
        self.cancel();
        self.facing = facing;

        let stream = self.acquire_camera(true)?;
        self.devices.attach_preview(&stream);
        let mime = negotiate_video_mime(&self.devices);
        log::info!("vídeo: grabando como {} ({})", mime.blob, facing.label());
        self.begin_recording(drill_id, MediaKind::Video, stream, mime, now, Access::Camera)
    }

    /// Abre la cámara solo para vista previa, sin grabar (fotos fijas).
    pub fn start_preview(&mut self, drill_id: DrillId, facing: Facing) -> Result<(), CaptureError> {
        self.check_available(Access::Camera)?;
        self.cancel();
        self.facing = facing;

        let stream = self.acquire_camera(false)?;
        self.devices.attach_preview(&stream);
        self.active = Some(ActiveCapture {
            drill_id,
            kind: MediaKind::Image,
            stream,
            mime: MimeChoice {
                recorder: None,
                blob: "image/jpeg",
            },
            recording: false,
            started_at: 0.0,
            chunks: Vec::new(),
        });
        Ok(())
    }

    /// Pide la cámara con `exact`; si la plataforma no lo admite, repite
    /// con la orientación como simple preferencia.
    fn acquire_camera(&mut self, with_audio: bool) -> Result<StreamHandle, CaptureError> {
        let audio = with_audio.then_some(AudioConstraints {
            echo_cancellation: true,
            noise_suppression: true,
        });
        let video = |facing| VideoConstraints {
            ideal_width: self.settings.video_width,
            ideal_height: self.settings.video_height,
            facing,
        };
        let exact = StreamConstraints {
            audio,
            video: Some(video(FacingConstraint::Exact(self.facing))),
        };
        match self.devices.acquire_stream(&exact) {
            Ok(stream) => Ok(stream),
            Err(DeviceError::Overconstrained(detail)) => {
                log::warn!("facing exacto no soportado ({detail}); reintentando como preferencia");
                let advisory = StreamConstraints {
                    audio,
                    video: Some(video(FacingConstraint::Ideal(self.facing))),
                };
                self.devices
                    .acquire_stream(&advisory)
                    .map_err(|err| self.map_device_error(err, Access::Camera))
            }
            Err(err) => Err(self.map_device_error(err, Access::Camera)),
        }
    }

    fn begin_recording(
        &mut self,
        drill_id: DrillId,
        kind: MediaKind,
        stream: StreamHandle,
        mime: MimeChoice,
        now: f64,
        access: Access,
    ) -> Result<(), CaptureError> {
        if let Err(err) = self.devices.start_recording(&stream, mime.recorder) {
            if stream.width > 0 {
                self.devices.detach_preview();
            }
            self.release_stream(&stream);
            return Err(self.map_device_error(err, access));
        }
        self.active = Some(ActiveCapture {
            drill_id,
            kind,
            stream,
            mime,
            recording: true,
            started_at: now,
            chunks: Vec::new(),
        });
        Ok(())
    }

    /// Cierra la grabación en curso y devuelve el blob. Sin grabación activa
    /// no hace nada.
    pub fn stop_capture(&mut self) -> Result<Option<CapturedMedia>, CaptureError> {
        self.pending_restart = None;
        self.pending_still = None;
        let Some(mut active) = self.active.take() else {
            return Ok(None);
        };
        if !active.recording {
            self.active = Some(active);
            self.release_active();
            return Ok(None);
        }

        active.chunks.extend(self.devices.take_chunks());
        active.chunks.extend(self.devices.stop_recording());
        if active.stream.width > 0 {
            self.devices.detach_preview();
        }
        self.release_stream(&active.stream);

        let bytes: Vec<u8> = active.chunks.concat();
        if bytes.is_empty() {
            log::warn!("grabación de {} vacía, descartada", active.kind);
            return Err(CaptureError::EmptyRecording);
        }
        log::info!("{} capturado: {} bytes", active.kind, bytes.len());
        Ok(Some(CapturedMedia {
            drill_id: active.drill_id,
            kind: active.kind,
            blob: MediaBlob::new(bytes, active.mime.blob),
        }))
    }

    /// Cambia de cámara: corta lo actual y reabre con la otra orientación
    /// pasado el tiempo de asentamiento (lo hace `poll`).
    pub fn switch_camera(&mut self, now: f64) -> Result<(), CaptureError> {
        let (drill_id, record) = match &self.active {
            Some(a) if a.kind != MediaKind::Audio => (a.drill_id, a.recording),
            _ => return Err(CaptureError::NoActiveStream),
        };
        self.pending_still = None;
        self.release_active();
        self.facing = self.facing.flipped();
        self.pending_restart = Some(PendingRestart {
            drill_id,
            record,
            at: now + self.settings.settle_secs,
        });
        Ok(())
    }

    /// Foto fija del stream de vídeo abierto. `Ok(None)` significa que el
    /// vídeo aún no tiene datos y `poll` lo volverá a intentar.
    pub fn capture_still_image(&mut self, now: f64) -> Result<Option<CapturedMedia>, CaptureError> {
        let drill_id = match &self.active {
            Some(a) if a.stream.width > 0 => a.drill_id,
            _ => return Err(CaptureError::NoActiveStream),
        };
        self.pending_still = Some(PendingStill {
            drill_id,
            next_try_at: now,
            attempts: 0,
            glitch_retried: false,
        });
        self.try_still(now)
    }

    fn try_still(&mut self, now: f64) -> Result<Option<CapturedMedia>, CaptureError> {
        let Some(mut pending) = self.pending_still.take() else {
            return Ok(None);
        };
        let Some(active) = &self.active else {
            return Err(CaptureError::NoActiveStream);
        };
        let stream = active.stream.clone();
        let keep_stream = active.recording;

        if !self.devices.has_enough_video_data(&stream) {
            pending.attempts += 1;
            if pending.attempts >= self.settings.frame_poll_max_attempts {
                log::warn!("vídeo sin datos tras {} intentos", pending.attempts);
                return Err(CaptureError::FrameNotReady {
                    attempts: pending.attempts,
                });
            }
            pending.next_try_at = now + self.settings.frame_poll_interval;
            self.pending_still = Some(pending);
            return Ok(None);
        }

        let frame = self
            .devices
            .grab_frame(&stream, stream.width, stream.height)
            .map_err(|err| self.map_device_error(err, Access::Camera))?;
        if is_capture_glitch(&frame) {
            if pending.glitch_retried {
                return Err(CaptureError::BlankFrame);
            }
            log::warn!("fotograma negro o incompleto, reintentando una vez");
            pending.glitch_retried = true;
            pending.next_try_at = now + self.settings.frame_poll_interval;
            self.pending_still = Some(pending);
            return Ok(None);
        }

        let bytes = self
            .devices
            .encode_jpeg(&frame, self.settings.image_quality)
            .map_err(|err| self.map_device_error(err, Access::Camera))?;
        if bytes.is_empty() {
            return Err(CaptureError::BlankFrame);
        }
        if !keep_stream {
            self.release_active();
        }
        Ok(Some(CapturedMedia {
            drill_id: pending.drill_id,
            kind: MediaKind::Image,
            blob: MediaBlob::new(bytes, "image/jpeg"),
        }))
    }

    /// Se llama en cada frame de la UI: vacía fragmentos, aplica el techo de
    /// audio, hace el reinicio de cámara diferido y los reintentos de foto.
    pub fn poll(&mut self, now: f64) -> Option<CaptureEvent> {
        if let Some(restart) = self.pending_restart.take_if(|r| now >= r.at) {
            let result = if restart.record {
                self.start_video_capture(restart.drill_id, self.facing, now)
            } else {
                self.start_preview(restart.drill_id, self.facing)
            };
            return Some(match result {
                Ok(()) => CaptureEvent::Restarted(self.facing),
                Err(err) => CaptureEvent::Failed(err),
            });
        }

        let mut ceiling_hit = false;
        if let Some(active) = self.active.as_mut().filter(|a| a.recording) {
            active.chunks.extend(self.devices.take_chunks());
            let max = self.settings.max_audio_seconds;
            ceiling_hit = active.kind == MediaKind::Audio
                && max > 0
                && now - active.started_at >= f64::from(max);
        }
        if ceiling_hit {
            log::info!("techo de {} s alcanzado, parando", self.settings.max_audio_seconds);
            return match self.stop_capture() {
                Ok(Some(media)) => Some(CaptureEvent::Finished(media)),
                Ok(None) => None,
                Err(err) => Some(CaptureEvent::Failed(err)),
            };
        }

        if self
            .pending_still
            .as_ref()
            .is_some_and(|p| now >= p.next_try_at)
        {
            return match self.try_still(now) {
                Ok(Some(media)) => Some(CaptureEvent::Finished(media)),
                Ok(None) => None,
                Err(err) => Some(CaptureEvent::Failed(err)),
            };
        }
        None
    }

    /// Limpieza incondicional: al cerrar el panel o salir de la vista.
    pub fn cancel(&mut self) {
        self.pending_restart = None;
        self.pending_still = None;
        self.release_active();
    }
}

impl<D: MediaDevices> Drop for CaptureController<D> {
    fn drop(&mut self) {
        self.cancel();
    }
}
