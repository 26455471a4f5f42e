//! Image encoding: rasterised page → JPEG → base64 `ImagePayload`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

use super::{ConversionError, ImagePayload};

/// Same default quality PIL applies when saving JPEG.
pub const JPEG_QUALITY: u8 = 75;

/// Encode a rendered page as a base64 JPEG.
///
/// JPEG has no alpha channel, so the page is flattened to RGB first.
pub fn encode_jpeg(img: &DynamicImage) -> Result<ImagePayload, ConversionError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| ConversionError::Encode(e.to_string()))?;

    let data = STANDARD.encode(&buf);
    debug!("Encoded first page → {} bytes JPEG, {} bytes base64", buf.len(), data.len());

    Ok(ImagePayload::jpeg(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_rgba_page_as_jpeg() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(12, 16, Rgba([20, 40, 200, 128])));
        let payload = encode_jpeg(&img).expect("encode should succeed");
        assert_eq!(payload.media_type, "image/jpeg");

        let decoded = STANDARD.decode(&payload.data).expect("valid base64");
        // SOI marker
        assert_eq!(&decoded[..2], &[0xFF, 0xD8]);

        let reloaded = image::load_from_memory_with_format(&decoded, image::ImageFormat::Jpeg)
            .expect("decodes as JPEG");
        assert_eq!((reloaded.width(), reloaded.height()), (12, 16));
    }
}
