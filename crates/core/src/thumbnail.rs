use crate::error::TransformError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::io::Cursor;

pub const MAX_WIDTH: u32 = 160;
pub const MAX_HEIGHT: u32 = 120;

const JPEG_QUALITY: u8 = 75;

/// Decodes the full image and produces JPEG bytes for a thumbnail bounded by
/// 160x120, preserving aspect ratio. Dimensions are floor(original * scale),
/// clamped to at least one pixel for degenerate aspect ratios.
pub fn render_thumbnail(bytes: &[u8]) -> Result<Vec<u8>, TransformError> {
    let image = image::load_from_memory(bytes).map_err(TransformError::Decode)?;

    let (width, height) = (image.width(), image.height());
    let scale = f64::min(
        MAX_WIDTH as f64 / width as f64,
        MAX_HEIGHT as f64 / height as f64,
    );
    let thumb_width = ((width as f64 * scale) as u32).max(1);
    let thumb_height = ((height as f64 * scale) as u32).max(1);

    // Triangle averages over the source footprint, which is what we want
    // when shrinking this hard.
    let thumb = image.resize_exact(thumb_width, thumb_height, FilterType::Triangle);

    let mut buf = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    thumb
        .to_rgb8()
        .write_with_encoder(encoder)
        .map_err(TransformError::Encode)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::{render_thumbnail, MAX_HEIGHT, MAX_WIDTH};
    use crate::error::TransformError;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 64])
        });
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Jpeg)
            .expect("encode fixture");
        buf.into_inner()
    }

    fn thumb_dimensions(source_width: u32, source_height: u32) -> (u32, u32) {
        let thumb = render_thumbnail(&sample_jpeg(source_width, source_height))
            .expect("thumbnail must render");
        let decoded = image::load_from_memory(&thumb).expect("thumbnail must decode");
        (decoded.width(), decoded.height())
    }

    #[test]
    fn landscape_4_3_fills_the_full_bound() {
        assert_eq!(thumb_dimensions(640, 480), (160, 120));
    }

    #[test]
    fn wide_image_is_limited_by_width() {
        // scale = min(160/1000, 120/200) = 0.16
        assert_eq!(thumb_dimensions(1000, 200), (160, 32));
    }

    #[test]
    fn tall_image_is_limited_by_height() {
        // scale = min(160/200, 120/1000) = 0.12
        assert_eq!(thumb_dimensions(200, 1000), (24, 120));
    }

    #[test]
    fn dimensions_never_exceed_the_bound() {
        for (w, h) in [(3000, 2000), (161, 121), (159, 119), (10, 10)] {
            let (tw, th) = thumb_dimensions(w, h);
            assert!(tw <= MAX_WIDTH && th <= MAX_HEIGHT, "{w}x{h} -> {tw}x{th}");
            assert!(tw >= 1 && th >= 1);
        }
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = render_thumbnail(b"not an image at all").expect_err("must fail");
        assert!(matches!(err, TransformError::Decode(_)));
    }
}
