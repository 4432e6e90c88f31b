use super::{MediaDevices, Platform};

/// Por orden de preferencia. WAV es lo que graba el micrófono nativo.
pub const AUDIO_MIME_CANDIDATES: [&str; 4] = [
    "audio/webm;codecs=opus",
    "audio/webm",
    "audio/ogg;codecs=opus",
    "audio/wav",
];
pub const VIDEO_MIME_CANDIDATES: [&str; 3] =
    ["video/webm;codecs=vp8,opus", "video/webm", "video/mp4"];

const APPLE_AUDIO_MIME: &str = "audio/mp4";
const APPLE_VIDEO_MIME: &str = "video/mp4";
const FALLBACK_AUDIO_MIME: &str = "audio/webm";
const FALLBACK_VIDEO_MIME: &str = "video/webm";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MimeChoice {
    /// Lo que se pide al grabador; `None` = formato por defecto de la plataforma.
    pub recorder: Option<&'static str>,
    /// Con qué tipo se etiqueta el blob resultante.
    pub blob: &'static str,
}

fn negotiate(
    devices: &dyn MediaDevices,
    candidates: &[&'static str],
    apple: &'static str,
    fallback: &'static str,
) -> MimeChoice {
    if devices.platform() == Platform::AppleMobile {
        return MimeChoice {
            recorder: Some(apple),
            blob: apple,
        };
    }
    match candidates.iter().copied().find(|m| devices.supports_mime(m)) {
        Some(mime) => MimeChoice {
            recorder: Some(mime),
            blob: mime,
        },
        None => MimeChoice {
            recorder: None,
            blob: fallback,
        },
    }
}

pub fn negotiate_audio_mime(devices: &dyn MediaDevices) -> MimeChoice {
    negotiate(
        devices,
        &AUDIO_MIME_CANDIDATES,
        APPLE_AUDIO_MIME,
        FALLBACK_AUDIO_MIME,
    )
}

pub fn negotiate_video_mime(devices: &dyn MediaDevices) -> MimeChoice {
    negotiate(
        devices,
        &VIDEO_MIME_CANDIDATES,
        APPLE_VIDEO_MIME,
        FALLBACK_VIDEO_MIME,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::fake::FakeDevices;

    #[test]
    fn opus_webm_preferred_when_available() {
        let devices = FakeDevices::supporting(&["audio/webm;codecs=opus", "audio/webm"]);
        let choice = negotiate_audio_mime(&devices);
        assert_eq!(choice.recorder, Some("audio/webm;codecs=opus"));
        assert_eq!(choice.blob, "audio/webm;codecs=opus");
    }

    #[test]
    fn falls_through_to_ogg() {
        let devices = FakeDevices::supporting(&["audio/ogg;codecs=opus"]);
        assert_eq!(
            negotiate_audio_mime(&devices).recorder,
            Some("audio/ogg;codecs=opus")
        );
    }

    #[test]
    fn apple_mobile_always_records_mp4() {
        let mut devices = FakeDevices::supporting(&["audio/webm;codecs=opus"]);
        devices.platform = Platform::AppleMobile;
        let choice = negotiate_audio_mime(&devices);
        assert_eq!(choice.recorder, Some("audio/mp4"));
        assert_eq!(negotiate_video_mime(&devices).blob, "video/mp4");
    }

    #[test]
    fn nothing_supported_uses_platform_default() {
        let devices = FakeDevices::supporting(&[]);
        let choice = negotiate_audio_mime(&devices);
        assert_eq!(choice.recorder, None);
        assert_eq!(choice.blob, "audio/webm");
    }
}
