//! Micrófono real vía cpal. Las muestras se acumulan en memoria y al parar
//! se entregan como un único WAV PCM de 16 bits. Sin cámara: vídeo e imagen
//! se suben como archivo.

use super::{DeviceError, MediaDevices, Platform, RawFrame, StreamConstraints, StreamHandle};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, StreamConfig, SupportedStreamConfig};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

pub const WAV_MIME: &str = "audio/wav";

struct OpenInput {
    stream_id: u64,
    device: cpal::Device,
    config: SupportedStreamConfig,
}

struct Recording {
    stream: cpal::Stream,
    samples: Arc<Mutex<Vec<i16>>>,
    channels: u16,
    sample_rate: u32,
}

pub struct NativeDevices {
    host: cpal::Host,
    next_id: u64,
    input: Option<OpenInput>,
    recording: Option<Recording>,
}

impl NativeDevices {
    pub fn new() -> Self {
        let host = cpal::default_host();
        log::info!("audio: backend {:?}", host.id());
        Self {
            host,
            next_id: 0,
            input: None,
            recording: None,
        }
    }
}

impl Default for NativeDevices {
    fn default() -> Self {
        Self::new()
    }
}

/// cpal solo da texto para los errores del backend (ALSA, CoreAudio, WASAPI).
pub fn classify_backend_error(message: &str) -> DeviceError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not allowed") {
        DeviceError::NotAllowed
    } else if lower.contains("busy") || lower.contains("in use") {
        DeviceError::NotReadable
    } else if lower.contains("no longer available")
        || lower.contains("not found")
        || lower.contains("no such device")
    {
        DeviceError::NotFound
    } else {
        DeviceError::Other(message.to_string())
    }
}

/// PCM entero de 16 bits dentro de un contenedor RIFF/WAVE.
pub fn encode_wav(samples: &[i16], channels: u16, sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}

fn is_wav(mime: &str) -> bool {
    mime.split(';').next().map(str::trim) == Some(WAV_MIME)
}

fn build_capture<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    samples: Arc<Mutex<Vec<i16>>>,
) -> Result<cpal::Stream, DeviceError>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buffer) = samples.lock() {
                    buffer.extend(data.iter().map(|&s| i16::from_sample(s)));
                }
            },
            |err| log::error!("micrófono: {err}"),
            None,
        )
        .map_err(|err| classify_backend_error(&err.to_string()))
}

impl MediaDevices for NativeDevices {
    fn has_media_api(&self) -> bool {
        true
    }

    fn has_camera(&self) -> bool {
        false
    }

    fn platform(&self) -> Platform {
        Platform::Generic
    }

    fn supports_mime(&self, mime: &str) -> bool {
        is_wav(mime)
    }

    fn acquire_stream(
        &mut self,
        constraints: &StreamConstraints,
    ) -> Result<StreamHandle, DeviceError> {
        if constraints.video.is_some() {
            return Err(DeviceError::NotFound);
        }
        let device = self
            .host
            .default_input_device()
            .ok_or(DeviceError::NotFound)?;
        let config = device
            .default_input_config()
            .map_err(|err| classify_backend_error(&err.to_string()))?;
        self.next_id += 1;
        log::info!(
            "micrófono «{}»: {} Hz, {} canales, {:?}",
            device.name().unwrap_or_default(),
            config.sample_rate().0,
            config.channels(),
            config.sample_format()
        );
        self.recording = None;
        self.input = Some(OpenInput {
            stream_id: self.next_id,
            device,
            config,
        });
        Ok(StreamHandle {
            id: self.next_id,
            track_count: 1,
            width: 0,
            height: 0,
        })
    }

    fn stop_track(&mut self, stream: &StreamHandle, _track: usize) {
        if self.input.as_ref().is_some_and(|i| i.stream_id == stream.id) {
            self.recording = None;
            self.input = None;
        }
    }

    fn attach_preview(&mut self, _stream: &StreamHandle) {}

    fn detach_preview(&mut self) {}

    fn start_recording(&mut self, stream: &StreamHandle, mime: Option<&str>) -> Result<(), DeviceError> {
        if let Some(mime) = mime.filter(|m| !is_wav(m)) {
            return Err(DeviceError::Other(format!("formato {mime} no disponible")));
        }
        let input = self
            .input
            .as_ref()
            .filter(|i| i.stream_id == stream.id)
            .ok_or(DeviceError::NotFound)?;
        let config = input.config.config();
        let samples = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&samples);
        let capture = match input.config.sample_format() {
            SampleFormat::F32 => build_capture::<f32>(&input.device, &config, sink),
            SampleFormat::I16 => build_capture::<i16>(&input.device, &config, sink),
            SampleFormat::I32 => build_capture::<i32>(&input.device, &config, sink),
            SampleFormat::U16 => build_capture::<u16>(&input.device, &config, sink),
            other => Err(DeviceError::Other(format!(
                "formato de muestra {other:?} no soportado"
            ))),
        }?;
        capture
            .play()
            .map_err(|err| classify_backend_error(&err.to_string()))?;
        self.recording = Some(Recording {
            stream: capture,
            samples,
            channels: config.channels,
            sample_rate: config.sample_rate.0,
        });
        Ok(())
    }

    // El WAV necesita la longitud total en la cabecera: todo sale al parar.
    fn take_chunks(&mut self) -> Vec<Vec<u8>> {
        Vec::new()
    }

    fn stop_recording(&mut self) -> Vec<Vec<u8>> {
        let Some(recording) = self.recording.take() else {
            return Vec::new();
        };
        let Recording {
            stream,
            samples,
            channels,
            sample_rate,
        } = recording;
        drop(stream);
        let samples = samples
            .lock()
            .map(|mut buffer| std::mem::take(&mut *buffer))
            .unwrap_or_default();
        if samples.is_empty() {
            return Vec::new();
        }
        match encode_wav(&samples, channels, sample_rate) {
            Ok(bytes) => {
                log::info!("audio: {} muestras, {} bytes WAV", samples.len(), bytes.len());
                vec![bytes]
            }
            Err(err) => {
                log::error!("no se pudo escribir el WAV: {err}");
                Vec::new()
            }
        }
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
    use crate::capture::mime::negotiate_audio_mime;
    use crate::capture::{CaptureController, CaptureError, CaptureSettings, Facing};
    use crate::config::Settings;

    #[test]
    fn wav_blob_reads_back() {
        let samples = [0i16, 1200, -1200, i16::MAX, i16::MIN, 7];
        let bytes = encode_wav(&samples, 1, 48_000).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().sample_rate, 48_000);
        assert_eq!(reader.spec().bits_per_sample, 16);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn backend_messages_map_to_device_errors() {
        assert_eq!(
            classify_backend_error("A backend-specific error has occurred: Permission denied (os error 13)"),
            DeviceError::NotAllowed
        );
        assert_eq!(
            classify_backend_error("ALSA function 'snd_pcm_open' failed with error 'EBUSY: Device or resource busy'"),
            DeviceError::NotReadable
        );
        assert_eq!(
            classify_backend_error("The requested device is no longer available. For example, it has been unplugged."),
            DeviceError::NotFound
        );
        assert!(matches!(
            classify_backend_error("The requested stream configuration is not supported by the device."),
            DeviceError::Other(_)
        ));
    }

    #[test]
    fn records_wav_and_refuses_the_camera() {
        let devices = NativeDevices::new();
        assert!(devices.supports_mime("audio/wav"));
        assert!(!devices.supports_mime("audio/webm;codecs=opus"));
        assert_eq!(negotiate_audio_mime(&devices).blob, WAV_MIME);

        let settings = Settings::load(None).unwrap();
        let mut ctl = CaptureController::new(devices, CaptureSettings::from(&settings));
        let err = ctl.start_video_capture(1, Facing::User, 0.0).unwrap_err();
        assert_eq!(err, CaptureError::CameraUnsupported);
        assert!(err.user_message().contains("sube"));
        assert_eq!(ctl.start_preview(1, Facing::User), Err(CaptureError::CameraUnsupported));
        assert!(!ctl.has_stream());
    }
}
