//! Caption fonts: measuring and drawing text with TrueType faces

use crate::{RasterError, Result};
use ab_glyph::{point, Font, FontArc, Glyph, PxScale, ScaleFont};
use image::{Pixel, Rgba, RgbaImage};

/// Advance used per character when no face is available, as a fraction of the size
const APPROXIMATE_ADVANCE: f32 = 0.5;

/// Primary caption face with an optional fallback
///
/// The primary face is the decorative typeface of the certificate; the
/// fallback is a generic serif or sans-serif face used when the primary one is
/// missing or fails to parse.
#[derive(Clone, Default)]
pub struct FontStack {
    primary: Option<FontArc>,
    fallback: Option<FontArc>,
}

impl std::fmt::Debug for FontStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontStack")
            .field("primary", &self.primary.is_some())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

fn parse_face(data: Vec<u8>) -> Result<FontArc> {
    FontArc::try_from_vec(data).map_err(|e| RasterError::FontParseError(e.to_string()))
}

impl FontStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the primary face
    ///
    /// On error the stack is left unchanged, so text keeps rendering with
    /// whatever face was active before.
    pub fn load_primary(&mut self, data: Vec<u8>) -> Result<()> {
        self.primary = Some(parse_face(data)?);
        Ok(())
    }

    /// Load the fallback face
    pub fn load_fallback(&mut self, data: Vec<u8>) -> Result<()> {
        self.fallback = Some(parse_face(data)?);
        Ok(())
    }

    /// The face text is currently measured and drawn with
    pub fn active(&self) -> Option<&FontArc> {
        self.primary.as_ref().or(self.fallback.as_ref())
    }

    pub fn has_face(&self) -> bool {
        self.active().is_some()
    }

    pub fn uses_fallback(&self) -> bool {
        self.primary.is_none() && self.fallback.is_some()
    }

    /// Width of `text` in pixels at `size`
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        match self.active() {
            Some(font) => layout_glyphs(font, text, size, 0.0, 0.0).1,
            None => text.chars().count() as f32 * size * APPROXIMATE_ADVANCE,
        }
    }

    /// Draw `text` with its left edge at `x` and its baseline at `baseline`
    ///
    /// Returns `false` when no face is loaded and nothing was drawn.
    pub fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        size: f32,
        x: f32,
        baseline: f32,
        color: Rgba<u8>,
    ) -> bool {
        let Some(font) = self.active() else {
            tracing::debug!(text, "no caption face loaded, skipping text");
            return false;
        };

        let (glyphs, _) = layout_glyphs(font, text, size, x, baseline);
        let (width, height) = canvas.dimensions();

        for glyph in glyphs {
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i32 + gx as i32;
                let py = bounds.min.y as i32 + gy as i32;
                if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                    return;
                }
                let alpha = (coverage.clamp(0.0, 1.0) * color[3] as f32).round() as u8;
                if alpha > 0 {
                    canvas
                        .get_pixel_mut(px as u32, py as u32)
                        .blend(&Rgba([color[0], color[1], color[2], alpha]));
                }
            });
        }
        true
    }
}

/// Position glyphs along a baseline, returning them with the total advance
fn layout_glyphs(font: &FontArc, text: &str, size: f32, x: f32, baseline: f32) -> (Vec<Glyph>, f32) {
    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);

    let mut glyphs = Vec::with_capacity(text.len());
    let mut caret = x;
    let mut previous = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        glyphs.push(id.with_scale_and_position(scale, point(caret, baseline)));
        caret += scaled.h_advance(id);
        previous = Some(id);
    }

    (glyphs, caret - x)
}
