//! Certificate rendering
//!
//! Every state change redraws the canvas from scratch; nothing is patched
//! incrementally.

use crate::crop::CropSession;
use crate::Profile;
use caption_text::wrap_words;
use image::{Rgba, RgbaImage};
use raster_core::{
    baseline_positions, calculate_x_offset, draw_image, punch_selection, stroke_dashed,
    stroke_outline, Align, FontStack, Point, RectF, Shape,
};

/// Inset of the fallback border from the canvas edge
const FALLBACK_INSET: f64 = 10.0;
/// Width of the fallback border
const FALLBACK_BORDER: f32 = 2.0;

/// Everything drawn in the normal (non-crop) view
#[derive(Debug, Clone, Copy, Default)]
pub struct Scene<'a> {
    /// Background template; the fallback is drawn when absent
    pub background: Option<&'a RgbaImage>,
    /// Fitted subject and its top-left placement
    pub subject: Option<(&'a RgbaImage, Point)>,
    /// Raw caption as typed
    pub caption: &'a str,
}

/// Draws certificates for one profile
pub struct Compositor<'a> {
    profile: &'a Profile,
    fonts: &'a FontStack,
}

impl<'a> Compositor<'a> {
    pub fn new(profile: &'a Profile, fonts: &'a FontStack) -> Self {
        Self { profile, fonts }
    }

    /// Render the normal view: background, subject, caption
    pub fn render_scene(&self, canvas: &mut RgbaImage, scene: &Scene) {
        clear(canvas);
        self.draw_background(canvas, scene.background);

        if let Some((subject, placement)) = scene.subject {
            draw_image(canvas, subject, placement.x, placement.y);
        }

        self.draw_caption(canvas, scene.caption);
    }

    /// Render the crop view: background, preview image and the selection
    pub fn render_crop(&self, canvas: &mut RgbaImage, background: Option<&RgbaImage>, crop: &CropSession) {
        clear(canvas);
        self.draw_background(canvas, background);

        let rect = crop.mapping().rect;
        draw_image(canvas, crop.preview(), rect.x, rect.y);

        let Some(selection) = crop.selection().filter(|s| !s.is_empty()) else {
            return;
        };

        // Inside the selection only the preview shows, at full opacity
        let mut revealed = RgbaImage::new(canvas.width(), canvas.height());
        draw_image(&mut revealed, crop.preview(), rect.x, rect.y);

        let style = &self.profile.crop;
        let shape = selection.shape();
        punch_selection(canvas, &revealed, shape, style.overlay.to_rgba());
        stroke_dashed(
            canvas,
            shape,
            style.outline_color.to_rgba(),
            style.outline_width,
            style.dash,
        );
    }

    /// Wrap the display text for `caption` to the profile's maximum width
    pub fn caption_lines(&self, caption: &str, canvas_width: u32) -> Vec<String> {
        let style = &self.profile.caption;
        let text = style.template.compose(caption);
        let max_width = (style.max_width_fraction * canvas_width as f64) as f32;
        wrap_words(&text, max_width, |line| {
            self.fonts.measure(line, style.font_size)
        })
    }

    fn draw_background(&self, canvas: &mut RgbaImage, background: Option<&RgbaImage>) {
        match background {
            Some(background) => draw_image(canvas, background, 0.0, 0.0),
            None => draw_fallback_background(canvas),
        }
    }

    fn draw_caption(&self, canvas: &mut RgbaImage, caption: &str) {
        let lines = self.caption_lines(caption, canvas.width());
        if lines.is_empty() {
            return;
        }

        let style = &self.profile.caption;
        let center_y = style.baseline_fraction * canvas.height() as f64;
        let baselines = baseline_positions(lines.len(), center_y, style.line_height);
        let color = style.color.to_rgba();

        for (line, baseline) in lines.iter().zip(baselines) {
            let width = self.fonts.measure(line, style.font_size) as f64;
            let x = calculate_x_offset(width, canvas.width() as f64, Align::Center);
            if !self
                .fonts
                .draw_text(canvas, line, style.font_size, x as f32, baseline as f32, color)
            {
                break;
            }
        }
    }
}

fn clear(canvas: &mut RgbaImage) {
    for pixel in canvas.pixels_mut() {
        *pixel = Rgba([0, 0, 0, 0]);
    }
}

/// White card with a thin black border, used when no background is loaded
fn draw_fallback_background(canvas: &mut RgbaImage) {
    for pixel in canvas.pixels_mut() {
        *pixel = Rgba([255, 255, 255, 255]);
    }
    let border = RectF::new(
        FALLBACK_INSET,
        FALLBACK_INSET,
        canvas.width() as f64 - 2.0 * FALLBACK_INSET,
        canvas.height() as f64 - 2.0 * FALLBACK_INSET,
    );
    if !border.is_empty() {
        stroke_outline(canvas, Shape::Rect(border), Rgba([0, 0, 0, 255]), FALLBACK_BORDER);
    }
}
