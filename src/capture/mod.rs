//! Captura de audio, vídeo e imagen fija.
//!
//! La lógica (elección de MIME, reintento de cámara, auto-stop, fotogramas
//! negros) vive en [`CaptureController`]; el acceso real al hardware va
//! detrás del trait [`MediaDevices`].

use crate::api::{ApiError, DrillsApi};
use crate::model::{DrillId, MediaBlob, MediaKind, UploadedMedia};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod controller;
pub mod frame;
pub mod mime;
pub mod native;

#[cfg(test)]
pub mod fake;
#[cfg(test)]
pub mod unavailable;

pub use controller::{CaptureController, CaptureSettings};
pub use native::NativeDevices;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Facing {
    #[default]
    User,
    Environment,
}

impl Facing {
    pub fn flipped(self) -> Self {
        match self {
            Facing::User => Facing::Environment,
            Facing::Environment => Facing::User,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Facing::User => "Frontal",
            Facing::Environment => "Trasera",
        }
    }
}

/// `Exact` exige la cámara; `Ideal` solo la sugiere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacingConstraint {
    Exact(Facing),
    Ideal(Facing),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing: FacingConstraint,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct StreamConstraints {
    pub audio: Option<AudioConstraints>,
    pub video: Option<VideoConstraints>,
}

/// Stream abierto por el dispositivo; lo posee un único controlador.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamHandle {
    pub id: u64,
    pub track_count: usize,
    /// Resolución negociada (0 si no hay vídeo).
    pub width: u32,
    pub height: u32,
}

/// Fotograma RGBA tal como sale de la superficie de dibujo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Platform {
    /// Safari en iOS/iPadOS: solo graba AAC dentro de MP4.
    AppleMobile,
    #[default]
    Generic,
}

/// Errores tal como los reporta la capa de dispositivo.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("permiso denegado")]
    NotAllowed,
    #[error("dispositivo no encontrado")]
    NotFound,
    #[error("dispositivo ocupado")]
    NotReadable,
    #[error("restricción no satisfecha: {0}")]
    Overconstrained(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Microphone,
    Camera,
}

impl Access {
    fn noun(self) -> &'static str {
        match self {
            Access::Microphone => "micrófono",
            Access::Camera => "cámara",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("este entorno no ofrece captura de medios")]
    Unsupported,
    #[error("no hay cámara disponible")]
    CameraUnsupported,
    #[error("permiso de {} denegado", .0.noun())]
    PermissionDenied(Access),
    #[error("permiso de {} denegado anteriormente", .0.noun())]
    PermissionPreviouslyDenied(Access),
    #[error("no se encontró {}", .0.noun())]
    DeviceNotFound(Access),
    #[error("{} en uso por otra aplicación", .0.noun())]
    DeviceBusy(Access),
    #[error("error del dispositivo: {0}")]
    Device(String),
    #[error("no hay ninguna captura activa")]
    NoActiveStream,
    #[error("el vídeo no estuvo listo tras {attempts} intentos")]
    FrameNotReady { attempts: u32 },
    #[error("el fotograma salió negro o vacío")]
    BlankFrame,
    #[error("la grabación está vacía")]
    EmptyRecording,
}

impl CaptureError {
    pub fn user_message(&self) -> String {
        match self {
            CaptureError::Unsupported => "🚫 No hay micrófono ni cámara accesibles; sube un archivo \
                 ya grabado."
                .to_string(),
            CaptureError::CameraUnsupported => "📷 Desde aquí solo se graba audio. Para vídeo o \
                 imagen, sube un archivo o genera la imagen."
                .to_string(),
            CaptureError::PermissionDenied(access) => format!(
                "🔒 Permiso de {} denegado. Actívalo en los ajustes del navegador.",
                access.noun()
            ),
            CaptureError::PermissionPreviouslyDenied(access) => format!(
                "🔒 El {} sigue bloqueado. Recarga la página tras dar permiso.",
                access.noun()
            ),
            CaptureError::DeviceNotFound(access) => {
                format!("🔌 No se encontró ningún {}.", access.noun())
            }
            CaptureError::DeviceBusy(access) => format!(
                "⏳ El {} está en uso por otra aplicación. Ciérrala y reintenta.",
                access.noun()
            ),
            CaptureError::EmptyRecording => {
                "⚠ La grabación salió vacía; no se ha subido. Graba de nuevo.".to_string()
            }
            CaptureError::BlankFrame => {
                "⚠ La foto salió negra. Vuelve a intentarlo.".to_string()
            }
            other => format!("❌ {other}"),
        }
    }
}

/// Capa de hardware: en el navegador serían getUserMedia/MediaRecorder/canvas.
pub trait MediaDevices {
    fn has_media_api(&self) -> bool;
    fn has_camera(&self) -> bool {
        true
    }
    fn platform(&self) -> Platform;
    fn supports_mime(&self, mime: &str) -> bool;

    fn acquire_stream(&mut self, constraints: &StreamConstraints)
    -> Result<StreamHandle, DeviceError>;
    fn stop_track(&mut self, stream: &StreamHandle, track: usize);
    fn attach_preview(&mut self, stream: &StreamHandle);
    fn detach_preview(&mut self);

    /// `None` deja que la plataforma elija el formato.
    fn start_recording(&mut self, stream: &StreamHandle, mime: Option<&str>)
    -> Result<(), DeviceError>;
    /// Fragmentos producidos desde la última llamada.
    fn take_chunks(&mut self) -> Vec<Vec<u8>>;
    /// Detiene el grabador y entrega lo que quedaba pendiente.
    fn stop_recording(&mut self) -> Vec<Vec<u8>>;

    fn has_enough_video_data(&mut self, stream: &StreamHandle) -> bool;
    fn grab_frame(
        &mut self,
        stream: &StreamHandle,
        width: u32,
        height: u32,
    ) -> Result<RawFrame, DeviceError>;
    fn encode_jpeg(&mut self, frame: &RawFrame, quality: f32) -> Result<Vec<u8>, DeviceError>;
}

impl<T: MediaDevices + ?Sized> MediaDevices for Box<T> {
    fn has_media_api(&self) -> bool {
        (**self).has_media_api()
    }
    fn has_camera(&self) -> bool {
        (**self).has_camera()
    }
    fn platform(&self) -> Platform {
        (**self).platform()
    }
    fn supports_mime(&self, mime: &str) -> bool {
        (**self).supports_mime(mime)
    }
    fn acquire_stream(
        &mut self,
        constraints: &StreamConstraints,
    ) -> Result<StreamHandle, DeviceError> {
        (**self).acquire_stream(constraints)
    }
    fn stop_track(&mut self, stream: &StreamHandle, track: usize) {
        (**self).stop_track(stream, track)
    }
    fn attach_preview(&mut self, stream: &StreamHandle) {
        (**self).attach_preview(stream)
    }
    fn detach_preview(&mut self) {
        (**self).detach_preview()
    }
    fn start_recording(
        &mut self,
        stream: &StreamHandle,
        mime: Option<&str>,
    ) -> Result<(), DeviceError> {
        (**self).start_recording(stream, mime)
    }
    fn take_chunks(&mut self) -> Vec<Vec<u8>> {
        (**self).take_chunks()
    }
    fn stop_recording(&mut self) -> Vec<Vec<u8>> {
        (**self).stop_recording()
    }
    fn has_enough_video_data(&mut self, stream: &StreamHandle) -> bool {
        (**self).has_enough_video_data(stream)
    }
    fn grab_frame(
        &mut self,
        stream: &StreamHandle,
        width: u32,
        height: u32,
    ) -> Result<RawFrame, DeviceError> {
        (**self).grab_frame(stream, width, height)
    }
    fn encode_jpeg(&mut self, frame: &RawFrame, quality: f32) -> Result<Vec<u8>, DeviceError> {
        (**self).encode_jpeg(frame, quality)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CapturedMedia {
    pub drill_id: DrillId,
    pub kind: MediaKind,
    pub blob: MediaBlob,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CaptureEvent {
    /// Grabación cerrada por el techo de duración, o foto lista.
    Finished(CapturedMedia),
    Restarted(Facing),
    Failed(CaptureError),
}

/// Sube el resultado de una captura. Si falla no se guarda nada en local.
pub fn upload_captured_media(
    api: &dyn DrillsApi,
    media: &CapturedMedia,
) -> Result<UploadedMedia, ApiError> {
    if media.blob.is_empty() {
        log::warn!(
            "descartada subida vacía de {} para drill {}",
            media.kind,
            media.drill_id
        );
        return Err(ApiError::EmptyPayload);
    }
    let uploaded = api.upload_media(media.drill_id, media.kind, &media.blob);
    match &uploaded {
        Ok(u) => log::info!("{} del drill {} subido: {}", media.kind, media.drill_id, u.url),
        Err(e) => log::error!("fallo subiendo {} del drill {}: {e}", media.kind, media.drill_id),
    }
    uploaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;

    #[test]
    fn empty_capture_is_not_uploaded() {
        let api = FakeApi::default();
        let media = CapturedMedia {
            drill_id: 3,
            kind: MediaKind::Audio,
            blob: MediaBlob::new(Vec::new(), "audio/webm"),
        };
        assert_eq!(
            upload_captured_media(&api, &media),
            Err(ApiError::EmptyPayload)
        );
        assert!(api.uploads.lock().unwrap().is_empty());
    }

    #[test]
    fn upload_failure_is_surfaced() {
        let api = FakeApi::default();
        api.fail_next_with(ApiError::PayloadTooLarge);
        let media = CapturedMedia {
            drill_id: 3,
            kind: MediaKind::Video,
            blob: MediaBlob::new(vec![0; 16], "video/webm"),
        };
        assert_eq!(
            upload_captured_media(&api, &media),
            Err(ApiError::PayloadTooLarge)
        );
        let ok = upload_captured_media(&api, &media).unwrap();
        assert_eq!(ok.url, "/media/video/video.webm");
    }

    #[test]
    fn messages_differ_per_permission_case() {
        let denied = CaptureError::PermissionDenied(Access::Microphone).user_message();
        let busy = CaptureError::DeviceBusy(Access::Microphone).user_message();
        let missing = CaptureError::DeviceNotFound(Access::Camera).user_message();
        assert_ne!(denied, busy);
        assert_ne!(busy, missing);
        assert!(missing.contains("cámara"));
    }
}
