//! Screenshot encoding: raw viewport frame → PNG → base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use nimbus_common::{ControlError, Frame};

/// Encode a captured frame as a base64 PNG string, the text-safe form the
/// control protocol returns to clients.
pub fn encode_base64_png(frame: &Frame) -> Result<String, ControlError> {
    if !frame.is_well_formed() {
        return Err(ControlError::Capture(
            "frame is empty or does not match its dimensions".into(),
        ));
    }

    let mut png_bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_bytes, frame.width, frame.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| ControlError::Capture(format!("png header: {e}")))?;
        writer
            .write_image_data(&frame.rgba)
            .map_err(|e| ControlError::Capture(format!("png encode: {e}")))?;
    }

    Ok(STANDARD.encode(&png_bytes))
}
