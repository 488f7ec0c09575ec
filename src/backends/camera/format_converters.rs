// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion for frames that arrive uncompressed

use crate::constants::JPEG_QUALITY;
use crate::errors::CaptureError;

/// Convert a YUYV (YUV 4:2:2) frame to packed RGB
///
/// YUYV format: Y0 U0 Y1 V0 - each 4-byte group encodes 2 pixels.
/// Rows are `stride` bytes apart; padding past `width * 2` is skipped.
/// Uses BT.601 coefficients.
pub fn yuyv_to_rgb(
    data: &[u8],
    width: u32,
    height: u32,
    stride: u32,
) -> Result<Vec<u8>, CaptureError> {
    if width == 0 || height == 0 || width % 2 != 0 {
        return Err(CaptureError::Hardware(format!(
            "unsupported YUYV frame size {}x{}",
            width, height
        )));
    }
    let row_bytes = width as usize * 2;
    let stride = (stride as usize).max(row_bytes);
    // The last row may come without padding
    let needed = stride * (height as usize - 1) + row_bytes;
    if data.len() < needed {
        return Err(CaptureError::Hardware(format!(
            "short frame: {} of {} bytes",
            data.len(),
            needed
        )));
    }

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for row in data.chunks(stride).take(height as usize) {
        for chunk in row[..row_bytes].chunks_exact(4) {
            let y0 = chunk[0] as f32;
            let u = chunk[1] as f32 - 128.0;
            let y1 = chunk[2] as f32;
            let v = chunk[3] as f32 - 128.0;

            for y in [y0, y1] {
                rgb.push((y + 1.402 * v).clamp(0.0, 255.0) as u8);
                rgb.push((y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8);
                rgb.push((y + 1.772 * u).clamp(0.0, 255.0) as u8);
            }
        }
    }

    Ok(rgb)
}

/// Encode packed RGB as JPEG
pub fn rgb_to_jpeg(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>, CaptureError> {
    let expected = width as usize * height as usize * 3;
    if rgb.len() != expected {
        return Err(CaptureError::Hardware(format!(
            "RGB buffer is {} bytes, expected {} for {}x{}",
            rgb.len(),
            expected,
            width,
            height
        )));
    }

    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);

    encoder
        .encode(rgb, width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| CaptureError::Hardware(format!("JPEG encoding failed: {}", e)))?;

    Ok(buffer)
}

/// Whether `data` starts with a JPEG start-of-image marker
pub fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8])
}
