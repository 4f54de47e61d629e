//! Client-side image utilities, independent of any network call: scale to
//! fit within bounds before uploading, and build an inline preview.

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::upload::SelectedFile;

/// Decode, scale to fit within `max_width` x `max_height` preserving the
/// aspect ratio, and re-encode as JPEG at the given quality (1-100).
/// Images already inside the bounds are re-encoded without scaling; nothing
/// is ever upscaled.
pub fn resize_to_fit(bytes: &[u8], max_width: u32, max_height: u32, quality: u8) -> Result<Vec<u8>> {
    if max_width == 0 || max_height == 0 {
        return Err(ClientError::validation(
            "Resize bounds must be at least 1x1.",
        ));
    }
    let img = image::load_from_memory(bytes)
        .map_err(|e| ClientError::validation(format!("Could not decode image: {e}")))?;
    let (width, height) = (img.width(), img.height());
    let scaled = if width <= max_width && height <= max_height {
        debug!(width, height, "Image already within bounds, re-encoding only");
        img
    } else {
        // DynamicImage::resize fits within the bounds while keeping the
        // aspect ratio.
        let scaled = img.resize(max_width, max_height, FilterType::Lanczos3);
        info!(
            from_width = width,
            from_height = height,
            to_width = scaled.width(),
            to_height = scaled.height(),
            "Scaled image to fit bounds"
        );
        scaled
    };

    let rgb = scaled.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| ClientError::validation(format!("Could not re-encode image: {e}")))?;
    Ok(out)
}

/// Inline data URL for displaying a picked file before (or while) it
/// uploads.
pub fn preview_data_url(file: &SelectedFile) -> String {
    format!(
        "data:{};base64,{}",
        file.mime,
        base64::engine::general_purpose::STANDARD.encode(&file.bytes)
    )
}
