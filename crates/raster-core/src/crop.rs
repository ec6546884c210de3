//! Crop geometry: preview mapping, source-space clamping and extraction

use crate::geometry::{Point, RectF};
use crate::image::fit_within;
use crate::mask::clip_to_inscribed_circle;
use crate::{RasterError, Result};
use image::{imageops, RgbaImage};

/// A circular crop region in source pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleRegion {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

/// Where the full source image is drawn while selecting a crop
///
/// Selections are made in preview space and mapped back to source pixels
/// with independent X/Y factors (`source / preview`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewMapping {
    /// Drawn rectangle in canvas (preview) space
    pub rect: RectF,
    source_width: u32,
    source_height: u32,
}

impl PreviewMapping {
    /// Fit the source within `fraction` of the canvas on each axis, centered
    ///
    /// Small sources are shown at their natural size rather than upscaled.
    pub fn new(
        source_width: u32,
        source_height: u32,
        canvas_width: u32,
        canvas_height: u32,
        fraction: f64,
    ) -> Self {
        let size = fit_within(
            source_width,
            source_height,
            canvas_width as f64 * fraction,
            canvas_height as f64 * fraction,
            false,
        );
        let rect = RectF::new(
            (canvas_width as f64 - size.width) / 2.0,
            (canvas_height as f64 - size.height) / 2.0,
            size.width,
            size.height,
        );
        Self {
            rect,
            source_width,
            source_height,
        }
    }

    /// Source pixels per preview pixel, per axis
    pub fn scale(&self) -> (f64, f64) {
        (
            self.source_width as f64 / self.rect.width,
            self.source_height as f64 / self.rect.height,
        )
    }

    pub fn to_source(&self, p: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new((p.x - self.rect.x) * sx, (p.y - self.rect.y) * sy)
    }

    /// Map a circular selection to source pixels and clamp it inside the image
    ///
    /// The radius is scaled by the X factor, then limited to the distance from
    /// the center to the nearest source edge. Returns `None` when nothing is
    /// left (zero radius, or a center outside the image).
    pub fn circle_to_source(&self, center: Point, radius: f64) -> Option<CircleRegion> {
        let (sx, _) = self.scale();
        let c = self.to_source(center);
        let source_radius = radius * sx;

        let max_radius = c
            .x
            .min(c.y)
            .min(self.source_width as f64 - c.x)
            .min(self.source_height as f64 - c.y);
        let radius = source_radius.min(max_radius);

        if radius.is_nan() || radius <= 0.0 {
            return None;
        }
        Some(CircleRegion {
            cx: c.x,
            cy: c.y,
            radius,
        })
    }

    /// Map a rectangular selection to source pixels and clamp it to the image
    ///
    /// A negative origin is moved to 0 and the extent shrinks by the same
    /// amount (x before width, y before height); the extent is then limited
    /// to what remains of the image. Returns `None` instead of a non-positive
    /// extent.
    pub fn rect_to_source(&self, rect: RectF) -> Option<RectF> {
        let (sx, sy) = self.scale();
        let origin = self.to_source(Point::new(rect.x, rect.y));
        let mapped = RectF::new(origin.x, origin.y, rect.width * sx, rect.height * sy);
        clamp_rect(mapped, self.source_width, self.source_height)
    }
}

fn clamp_axis(start: f64, extent: f64, limit: f64) -> Option<(f64, f64)> {
    let (mut start, mut extent) = (start, extent);
    if start < 0.0 {
        extent += start;
        start = 0.0;
    }
    extent = extent.min(limit - start);
    if extent > 0.0 {
        Some((start, extent))
    } else {
        None
    }
}

fn clamp_rect(rect: RectF, width: u32, height: u32) -> Option<RectF> {
    let (x, w) = clamp_axis(rect.x, rect.width, width as f64)?;
    let (y, h) = clamp_axis(rect.y, rect.height, height as f64)?;
    Some(RectF::new(x, y, w, h))
}

/// Cut the `2r x 2r` square around a circle region and mask it to the circle
pub fn crop_circle(source: &RgbaImage, region: &CircleRegion) -> Result<RgbaImage> {
    let (width, height) = source.dimensions();
    if region.radius.is_nan() || region.radius <= 0.0 {
        return Err(RasterError::InvalidDimensions(0, 0));
    }

    let size = ((region.radius * 2.0).round() as u32).clamp(1, width.min(height));
    let x = ((region.cx - region.radius).round().max(0.0) as u32).min(width - size);
    let y = ((region.cy - region.radius).round().max(0.0) as u32).min(height - size);

    let mut cropped = imageops::crop_imm(source, x, y, size, size).to_image();
    clip_to_inscribed_circle(&mut cropped);
    Ok(cropped)
}

/// Copy a rectangular region (already clamped to the source) into a new raster
pub fn crop_rect(source: &RgbaImage, region: &RectF) -> Result<RgbaImage> {
    let (width, height) = source.dimensions();
    let clamped = clamp_rect(*region, width, height)
        .ok_or(RasterError::InvalidDimensions(0, 0))?;

    let x0 = clamped.x.floor() as u32;
    let y0 = clamped.y.floor() as u32;
    let x1 = (clamped.right().ceil() as u32).min(width).max(x0 + 1);
    let y1 = (clamped.bottom().ceil() as u32).min(height).max(y0 + 1);

    Ok(imageops::crop_imm(source, x0, y0, x1 - x0, y1 - y0).to_image())
}
