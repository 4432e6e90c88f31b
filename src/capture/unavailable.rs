use super::{DeviceError, MediaDevices, Platform, RawFrame, StreamConstraints, StreamHandle};

/// Equipo sin ningún dispositivo de captura. El controlador responde con
/// `CaptureError::Unsupported` y la UI ofrece subir un archivo.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableDevices;

impl MediaDevices for UnavailableDevices {
    fn has_media_api(&self) -> bool {
        false
    }

    fn platform(&self) -> Platform {
        Platform::Generic
    }

    fn supports_mime(&self, _mime: &str) -> bool {
        false
    }

    fn acquire_stream(
        &mut self,
        _constraints: &StreamConstraints,
    ) -> Result<StreamHandle, DeviceError> {
        Err(DeviceError::NotFound)
    }

    fn stop_track(&mut self, _stream: &StreamHandle, _track: usize) {}

    fn attach_preview(&mut self, _stream: &StreamHandle) {}

    fn detach_preview(&mut self) {}

    fn start_recording(
        &mut self,
        _stream: &StreamHandle,
        _mime: Option<&str>,
    ) -> Result<(), DeviceError> {
        Err(DeviceError::NotFound)
    }

    fn take_chunks(&mut self) -> Vec<Vec<u8>> {
        Vec::new()
    }

    fn stop_recording(&mut self) -> Vec<Vec<u8>> {
        Vec::new()
    }

    fn has_enough_video_data(&mut self, _stream: &StreamHandle) -> bool {
        false
    }

    fn grab_frame(
        &mut self,
        _stream: &StreamHandle,
        _width: u32,
        _height: u32,
    ) -> Result<RawFrame, DeviceError> {
        Err(DeviceError::NotFound)
    }

    fn encode_jpeg(&mut self, _frame: &RawFrame, _quality: f32) -> Result<Vec<u8>, DeviceError> {
        Err(DeviceError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureController, CaptureError, CaptureSettings, Facing};
    use crate::config::Settings;

    #[test]
    fn every_capture_reports_unsupported() {
        let settings = Settings::load(None).unwrap();
        let mut ctl = CaptureController::new(UnavailableDevices, CaptureSettings::from(&settings));
        assert_eq!(ctl.start_audio_capture(1, 0.0), Err(CaptureError::Unsupported));
        assert_eq!(
            ctl.start_video_capture(1, Facing::User, 0.0),
            Err(CaptureError::Unsupported)
        );
        assert_eq!(ctl.start_preview(1, Facing::User), Err(CaptureError::Unsupported));
    }
}
