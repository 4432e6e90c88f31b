use super::RawFrame;

const MIN_SIDE: u32 = 16;
// Por debajo de este valor en los tres canales el píxel cuenta como negro
const BLACK_THRESHOLD: u8 = 10;

/// Un fotograma demasiado pequeño, truncado o totalmente negro suele
/// indicar que la cámara aún no estaba entregando imagen.
pub fn is_capture_glitch(frame: &RawFrame) -> bool {
    if frame.width < MIN_SIDE || frame.height < MIN_SIDE {
        return true;
    }
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.rgba.len() < expected {
        return true;
    }
    frame.rgba[..expected]
        .chunks_exact(4)
        .all(|px| px[0] < BLACK_THRESHOLD && px[1] < BLACK_THRESHOLD && px[2] < BLACK_THRESHOLD)
}
