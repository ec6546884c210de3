//! Image decoding, encoding and the fit/resize engine

use crate::geometry::SizeF;
use crate::mask::clip_to_inscribed_circle;
use crate::{RasterError, Result};
use image::imageops::{self, FilterType};
use image::{ImageReader, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

impl From<image::ImageError> for RasterError {
    fn from(err: image::ImageError) -> Self {
        RasterError::DecodeError(err.to_string())
    }
}

/// Detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Where a raster was loaded from
///
/// Drawing a cross-origin raster that was not approved through CORS taints
/// the canvas, after which it can no longer be exported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ImageOrigin {
    /// Bytes supplied by the user (file picker, drag and drop)
    #[default]
    Local,
    /// Fetched from the page's own origin
    SameOrigin,
    /// Fetched from another origin
    CrossOrigin {
        #[serde(rename = "corsApproved")]
        cors_approved: bool,
    },
}

impl ImageOrigin {
    pub fn taints_canvas(&self) -> bool {
        matches!(
            self,
            ImageOrigin::CrossOrigin {
                cors_approved: false
            }
        )
    }
}

/// Detect image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 8 {
        return Err(RasterError::DecodeError("Image data too short".to_string()));
    }

    // JPEG starts with FF D8 FF
    if data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Ok(ImageFormat::Jpeg);
    }

    if data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Ok(ImageFormat::Png);
    }

    Err(RasterError::UnknownFormat)
}

/// Decode JPEG or PNG bytes into an RGBA raster
pub fn decode(data: &[u8]) -> Result<RgbaImage> {
    detect_format(data)?;

    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    let image = reader.decode()?.to_rgba8();

    if image.width() == 0 || image.height() == 0 {
        return Err(RasterError::InvalidDimensions(image.width(), image.height()));
    }
    Ok(image)
}

/// Encode a raster as PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes: Vec<u8> = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| RasterError::EncodeError(e.to_string()))?;
    Ok(bytes)
}

/// Fit a source size within a box, preserving aspect ratio
///
/// With `allow_upscale == false` a source smaller than the box keeps its
/// natural size.
pub fn fit_within(
    source_width: u32,
    source_height: u32,
    max_width: f64,
    max_height: f64,
    allow_upscale: bool,
) -> SizeF {
    let width_ratio = max_width / source_width as f64;
    let height_ratio = max_height / source_height as f64;
    let mut scale = width_ratio.min(height_ratio);
    if !allow_upscale {
        scale = scale.min(1.0);
    }
    SizeF::new(source_width as f64 * scale, source_height as f64 * scale)
}

/// Placement of a fitted raster inside its target box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitLayout {
    /// Uniform scale applied to the source
    pub scale: f64,
    /// Drawn width in pixels
    pub drawn_width: u32,
    /// Drawn height in pixels
    pub drawn_height: u32,
    /// Left padding
    pub offset_x: u32,
    /// Top padding
    pub offset_y: u32,
}

/// Compute the uniform scale and centering offsets for `fit`
pub fn fit_layout(
    source_width: u32,
    source_height: u32,
    target_width: u32,
    target_height: u32,
) -> FitLayout {
    let scale = (target_width as f64 / source_width as f64)
        .min(target_height as f64 / source_height as f64);

    let drawn_width = ((source_width as f64 * scale).round() as u32).clamp(1, target_width.max(1));
    let drawn_height = ((source_height as f64 * scale).round() as u32).clamp(1, target_height.max(1));

    FitLayout {
        scale,
        drawn_width,
        drawn_height,
        offset_x: target_width.saturating_sub(drawn_width) / 2,
        offset_y: target_height.saturating_sub(drawn_height) / 2,
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(RasterError::InvalidDimensions(width, height));
    }
    Ok(())
}

/// Scale a raster uniformly to fit a target box, centered on transparency
///
/// The output is always exactly `target_width x target_height`; the source is
/// never cropped.
pub fn fit(source: &RgbaImage, target_width: u32, target_height: u32) -> Result<RgbaImage> {
    check_dimensions(source.width(), source.height())?;
    check_dimensions(target_width, target_height)?;

    let layout = fit_layout(source.width(), source.height(), target_width, target_height);
    let scaled = imageops::resize(
        source,
        layout.drawn_width,
        layout.drawn_height,
        FilterType::Triangle,
    );

    let mut output = RgbaImage::new(target_width, target_height);
    imageops::replace(
        &mut output,
        &scaled,
        layout.offset_x as i64,
        layout.offset_y as i64,
    );
    Ok(output)
}

/// Like [`fit`], additionally clipped to the circle inscribed in the target box
pub fn fit_circular(
    source: &RgbaImage,
    target_width: u32,
    target_height: u32,
) -> Result<RgbaImage> {
    let mut output = fit(source, target_width, target_height)?;
    clip_to_inscribed_circle(&mut output);
    Ok(output)
}

/// Alpha-blend a raster onto the canvas with its top-left at (x, y)
pub fn draw_image(canvas: &mut RgbaImage, image: &RgbaImage, x: f64, y: f64) {
    imageops::overlay(canvas, image, x.round() as i64, y.round() as i64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]))
    }

    #[test]
    fn test_detect_jpeg() {
        let jpeg_header = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(detect_format(&jpeg_header).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_detect_png() {
        let png_header = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_format(&png_header).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_detect_unknown() {
        let unknown = vec![0x00; 8];
        assert!(matches!(
            detect_format(&unknown),
            Err(RasterError::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_format_too_short() {
        assert!(detect_format(&[0xFF, 0xD8, 0xFF]).is_err());
    }

    #[test]
    fn test_decode_truncated_png() {
        let png_header = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        assert!(decode(&png_header).is_err());
    }

    #[test]
    fn test_encode_then_decode_png() {
        let image = solid(12, 7);
        let bytes = encode_png(&image).unwrap();
        assert_eq!(detect_format(&bytes).unwrap(), ImageFormat::Png);

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (12, 7));
        assert_eq!(decoded.get_pixel(3, 3), &Rgba([200, 40, 40, 255]));
    }

    #[test]
    fn test_origin_taint() {
        assert!(!ImageOrigin::Local.taints_canvas());
        assert!(!ImageOrigin::SameOrigin.taints_canvas());
        assert!(!ImageOrigin::CrossOrigin {
            cors_approved: true
        }
        .taints_canvas());
        assert!(ImageOrigin::CrossOrigin {
            cors_approved: false
        }
        .taints_canvas());
    }

    #[test]
    fn test_fit_within_no_upscale() {
        let size = fit_within(100, 50, 800.0, 600.0, false);
        assert_eq!(size, SizeF::new(100.0, 50.0));
    }

    #[test]
    fn test_fit_within_tall_source() {
        // 600x1200 into 800x480: height limited, scale 0.4
        let size = fit_within(600, 1200, 800.0, 480.0, false);
        assert_eq!(size, SizeF::new(240.0, 480.0));
    }

    #[test]
    fn test_fit_layout_landscape_into_square() {
        let layout = fit_layout(400, 300, 200, 200);
        assert_eq!(layout.scale, 0.5);
        assert_eq!((layout.drawn_width, layout.drawn_height), (200, 150));
        assert_eq!((layout.offset_x, layout.offset_y), (0, 25));
    }

    #[test]
    fn test_fit_pads_with_transparency() {
        let fitted = fit(&solid(400, 300), 200, 200).unwrap();
        assert_eq!(fitted.dimensions(), (200, 200));

        for x in 0..200 {
            assert_eq!(fitted.get_pixel(x, 0)[3], 0);
            assert_eq!(fitted.get_pixel(x, 24)[3], 0);
            assert_eq!(fitted.get_pixel(x, 100)[3], 255);
            assert_eq!(fitted.get_pixel(x, 175)[3], 0);
            assert_eq!(fitted.get_pixel(x, 199)[3], 0);
        }
        assert_eq!(fitted.get_pixel(100, 25)[3], 255);
        assert_eq!(fitted.get_pixel(100, 174)[3], 255);
    }

    #[test]
    fn test_fit_preserves_aspect_ratio() {
        let cases = [(400, 300, 200, 200), (90, 160, 300, 120), (1000, 10, 64, 64), (7, 3, 500, 900)];
        for (sw, sh, tw, th) in cases {
            let fitted = fit(&solid(sw, sh), tw, th).unwrap();
            assert_eq!(fitted.dimensions(), (tw, th));

            let layout = fit_layout(sw, sh, tw, th);
            let source_aspect = sw as f64 / sh as f64;
            let drawn_aspect = layout.drawn_width as f64 / layout.drawn_height as f64;
            // Rounding to whole pixels moves each side by at most half a pixel
            let tolerance = source_aspect
                * (0.5 / layout.drawn_width as f64 + 0.5 / layout.drawn_height as f64)
                * 1.01;
            assert!(
                (source_aspect - drawn_aspect).abs() <= tolerance,
                "{sw}x{sh} -> {tw}x{th}: {source_aspect} vs {drawn_aspect}"
            );
        }
    }

    #[test]
    fn test_fit_rejects_zero_target() {
        assert!(matches!(
            fit(&solid(10, 10), 0, 10),
            Err(RasterError::InvalidDimensions(0, 10))
        ));
    }

    #[test]
    fn test_fit_circular_clears_corners() {
        let fitted = fit_circular(&solid(300, 300), 100, 100).unwrap();
        assert_eq!(fitted.dimensions(), (100, 100));
        assert_eq!(fitted.get_pixel(0, 0)[3], 0);
        assert_eq!(fitted.get_pixel(99, 99)[3], 0);
        assert_eq!(fitted.get_pixel(50, 50)[3], 255);
        // Inside the circle near the left edge
        assert_eq!(fitted.get_pixel(3, 50)[3], 255);
    }

    #[test]
    fn test_draw_image_blends_at_position() {
        let mut canvas = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        draw_image(&mut canvas, &solid(5, 5), 10.0, 10.0);
        let is_red = |p: &Rgba<u8>| p[0] >= 199 && p[1] <= 41 && p[3] == 255;
        assert_eq!(canvas.get_pixel(9, 9), &Rgba([255, 255, 255, 255]));
        assert!(is_red(canvas.get_pixel(10, 10)));
        assert!(is_red(canvas.get_pixel(14, 14)));
        assert_eq!(canvas.get_pixel(15, 15), &Rgba([255, 255, 255, 255]));
    }
}
