//! Shape masks, selection overlays and dashed outlines
//!
//! Shapes are rasterized with tiny-skia into an anti-aliased coverage map,
//! which is then applied to `image` rasters pixel by pixel.

use crate::geometry::RectF;
use image::{Pixel, Rgba, RgbaImage};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

/// A selection or clip shape in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { cx: f64, cy: f64, radius: f64 },
    Rect(RectF),
}

impl Shape {
    fn to_path(self) -> Option<tiny_skia::Path> {
        match self {
            Shape::Circle { cx, cy, radius } => {
                PathBuilder::from_circle(cx as f32, cy as f32, radius as f32)
            }
            Shape::Rect(r) => tiny_skia::Rect::from_xywh(
                r.x as f32,
                r.y as f32,
                r.width as f32,
                r.height as f32,
            )
            .map(PathBuilder::from_rect),
        }
    }
}

/// Per-pixel coverage (0-255) of `shape` over a `width x height` grid
fn coverage(width: u32, height: u32, shape: Shape) -> Option<Vec<u8>> {
    let mut pixmap = Pixmap::new(width, height)?;
    let path = shape.to_path()?;

    let mut paint = Paint::default();
    paint.set_color_rgba8(255, 255, 255, 255);
    paint.anti_alias = true;
    pixmap.fill_path(
        &path,
        &paint,
        FillRule::Winding,
        Transform::identity(),
        None,
    );

    Some(pixmap.data().chunks_exact(4).map(|px| px[3]).collect())
}

fn scale_u8(value: u8, factor: u8) -> u8 {
    ((value as u16 * factor as u16 + 127) / 255) as u8
}

fn mix(outside: Rgba<u8>, inside: Rgba<u8>, coverage: u8) -> Rgba<u8> {
    match coverage {
        0 => outside,
        255 => inside,
        c => {
            let c = c as u16;
            let inv = 255 - c;
            let mut out = [0u8; 4];
            for (i, slot) in out.iter_mut().enumerate() {
                *slot = ((outside[i] as u16 * inv + inside[i] as u16 * c + 127) / 255) as u8;
            }
            Rgba(out)
        }
    }
}

/// Multiply the raster's alpha by the shape's coverage; outside becomes transparent
pub fn apply_shape_mask(image: &mut RgbaImage, shape: Shape) {
    let Some(mask) = coverage(image.width(), image.height(), shape) else {
        // Degenerate shape: nothing is inside it
        for pixel in image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
        return;
    };

    for (pixel, &alpha) in image.pixels_mut().zip(mask.iter()) {
        if alpha == 0 {
            *pixel = Rgba([0, 0, 0, 0]);
        } else {
            pixel[3] = scale_u8(pixel[3], alpha);
        }
    }
}

/// Clip a raster to the circle inscribed in its bounds
pub fn clip_to_inscribed_circle(image: &mut RgbaImage) {
    let (width, height) = image.dimensions();
    let shape = Shape::Circle {
        cx: width as f64 / 2.0,
        cy: height as f64 / 2.0,
        radius: width.min(height) as f64 / 2.0,
    };
    apply_shape_mask(image, shape);
}

/// Dim the canvas outside `shape` and reveal `revealed` inside it
///
/// Outside the shape the canvas is shaded with `overlay`. Inside, the canvas
/// is erased and replaced by the matching pixels of `revealed` (a layer of
/// the same size), so whatever was drawn only on `revealed` shows at full
/// opacity.
pub fn punch_selection(
    canvas: &mut RgbaImage,
    revealed: &RgbaImage,
    shape: Shape,
    overlay: Rgba<u8>,
) {
    let mask = coverage(canvas.width(), canvas.height(), shape);

    for (i, (pixel, inside)) in canvas.pixels_mut().zip(revealed.pixels()).enumerate() {
        let mut shaded = *pixel;
        shaded.blend(&overlay);
        let c = mask.as_ref().map(|m| m[i]).unwrap_or(0);
        *pixel = mix(shaded, *inside, c);
    }
}

/// Stroke the outline of `shape` with a solid line
pub fn stroke_outline(canvas: &mut RgbaImage, shape: Shape, color: Rgba<u8>, width: f32) {
    stroke(canvas, shape, color, width, None);
}

/// Stroke the outline of `shape` with a dash pattern
pub fn stroke_dashed(
    canvas: &mut RgbaImage,
    shape: Shape,
    color: Rgba<u8>,
    width: f32,
    dash: [f32; 2],
) {
    stroke(canvas, shape, color, width, StrokeDash::new(dash.to_vec(), 0.0));
}

fn stroke(
    canvas: &mut RgbaImage,
    shape: Shape,
    color: Rgba<u8>,
    width: f32,
    dash: Option<StrokeDash>,
) {
    let Some(mut pixmap) = Pixmap::new(canvas.width(), canvas.height()) else {
        return;
    };
    let Some(path) = shape.to_path() else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
    paint.anti_alias = true;

    let stroke = Stroke {
        width,
        dash,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);

    for (dst, src) in canvas.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        if c.alpha() > 0 {
            dst.blend(&Rgba([c.red(), c.green(), c.blue(), c.alpha()]));
        }
    }
}
