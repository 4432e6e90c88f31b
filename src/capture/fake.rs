//! Dispositivos simulados para los tests del controlador.

use super::{
    DeviceError, MediaDevices, Platform, RawFrame, StreamConstraints, StreamHandle,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct FakeDevices {
    pub media_api: bool,
    pub platform: Platform,
    pub supported: Vec<String>,
    /// Respuestas para las próximas `acquire_stream`; vacío = éxito.
    pub acquire_script: VecDeque<Result<(), DeviceError>>,
    pub requests: Vec<StreamConstraints>,
    pub fail_recorder: Option<DeviceError>,
    pub recorder_mime: Option<Option<String>>,
    pub chunks_per_poll: Vec<Vec<u8>>,
    pub final_chunk: Vec<u8>,
    /// Consultas de `has_enough_video_data` que devuelven `false` antes de estar listo.
    pub ready_after: u32,
    pub frames: VecDeque<RawFrame>,
    pub grab_sizes: Vec<(u32, u32)>,
    pub encoded_quality: Option<f32>,
    pub preview: Option<u64>,
    next_id: u64,
    readiness_checks: u32,
    tracks: HashMap<u64, usize>,
    stops: Arc<Mutex<Vec<(u64, usize)>>>,
}

impl FakeDevices {
    pub fn supporting(mimes: &[&str]) -> Self {
        Self {
            media_api: true,
            supported: mimes.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn stop_log(&self) -> Arc<Mutex<Vec<(u64, usize)>>> {
        Arc::clone(&self.stops)
    }

    pub fn live_tracks(&self) -> usize {
        let stops = self.stops.lock().unwrap();
        self.tracks
            .iter()
            .map(|(id, count)| {
                let stopped = (0..*count)
                    .filter(|t| stops.contains(&(*id, *t)))
                    .count();
                count - stopped
            })
            .sum()
    }

    pub fn open_streams(&self) -> usize {
        let stops = self.stops.lock().unwrap();
        self.tracks
            .iter()
            .filter(|(id, count)| (0..**count).any(|t| !stops.contains(&(**id, t))))
            .count()
    }

    pub fn every_track_stopped_once(&self) -> bool {
        let stops = self.stops.lock().unwrap();
        self.tracks.iter().all(|(id, count)| {
            (0..*count).all(|t| stops.iter().filter(|s| **s == (*id, t)).count() == 1)
        })
    }
}

impl MediaDevices for FakeDevices {
    fn has_media_api(&self) -> bool {
        self.media_api
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn supports_mime(&self, mime: &str) -> bool {
        self.supported.iter().any(|m| m == mime)
    }

    fn acquire_stream(
        &mut self,
        constraints: &StreamConstraints,
    ) -> Result<StreamHandle, DeviceError> {
        self.requests.push(constraints.clone());
        if let Some(Err(err)) = self.acquire_script.pop_front() {
            return Err(err);
        }
        self.next_id += 1;
        let track_count =
            usize::from(constraints.audio.is_some()) + usize::from(constraints.video.is_some());
        self.tracks.insert(self.next_id, track_count);
        let (width, height) = constraints
            .video
            .map(|v| (v.ideal_width, v.ideal_height))
            .unwrap_or((0, 0));
        Ok(StreamHandle {
            id: self.next_id,
            track_count,
            width,
            height,
        })
    }

    fn stop_track(&mut self, stream: &StreamHandle, track: usize) {
        self.stops.lock().unwrap().push((stream.id, track));
    }

    fn attach_preview(&mut self, stream: &StreamHandle) {
        self.preview = Some(stream.id);
    }

    fn detach_preview(&mut self) {
        self.preview = None;
    }

    fn start_recording(
        &mut self,
        _stream: &StreamHandle,
        mime: Option<&str>,
    ) -> Result<(), DeviceError> {
        if let Some(err) = self.fail_recorder.take() {
            return Err(err);
        }
        self.recorder_mime = Some(mime.map(str::to_string));
        Ok(())
    }

    fn take_chunks(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.chunks_per_poll)
    }

    fn stop_recording(&mut self) -> Vec<Vec<u8>> {
        let last = std::mem::take(&mut self.final_chunk);
        if last.is_empty() { Vec::new() } else { vec![last] }
    }

    fn has_enough_video_data(&mut self, _stream: &StreamHandle) -> bool {
        self.readiness_checks += 1;
        self.readiness_checks > self.ready_after
    }

    fn grab_frame(
        &mut self,
        _stream: &StreamHandle,
        width: u32,
        height: u32,
    ) -> Result<RawFrame, DeviceError> {
        self.grab_sizes.push((width, height));
        self.frames
            .pop_front()
            .ok_or_else(|| DeviceError::Other("sin fotogramas".into()))
    }

    fn encode_jpeg(&mut self, frame: &RawFrame, quality: f32) -> Result<Vec<u8>, DeviceError> {
        self.encoded_quality = Some(quality);
        Ok(frame.rgba.iter().take(64).copied().collect())
    }
}
