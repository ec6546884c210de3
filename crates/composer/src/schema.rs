//! Profile JSON schema types

use caption_text::{CaptionTemplate, CharBudget};
use image::Rgba;
use raster_core::RectF;
use serde::{Deserialize, Serialize};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Alpha, opaque when omitted
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    /// Create an opaque color
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Embedded JSON Schema for profile validation
/// This schema can be used by IDEs and validators for profile authoring
pub const PROFILE_SCHEMA: &str = include_str!("../data/profile-schema.json");

/// Shape of the crop selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CropShape {
    #[default]
    Circle,
    Rectangle,
}

/// How the subject's target box is derived from the canvas size
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SizingPolicy {
    /// Square box with side `round(width_fraction * canvas_width)`
    Square { width_fraction: f64 },
    /// Arbitrary-aspect box, each side a fraction of the canvas
    Box {
        width_fraction: f64,
        height_fraction: f64,
    },
}

impl SizingPolicy {
    /// Target box size for a canvas, at least 1x1
    pub fn target_size(&self, canvas_width: u32, canvas_height: u32) -> (u32, u32) {
        let side = |fraction: f64, extent: u32| ((fraction * extent as f64).round() as u32).max(1);
        match *self {
            SizingPolicy::Square { width_fraction } => {
                let s = side(width_fraction, canvas_width);
                (s, s)
            }
            SizingPolicy::Box {
                width_fraction,
                height_fraction,
            } => (
                side(width_fraction, canvas_width),
                side(height_fraction, canvas_height),
            ),
        }
    }

    fn fractions(&self) -> [f64; 2] {
        match *self {
            SizingPolicy::Square { width_fraction } => [width_fraction, width_fraction],
            SizingPolicy::Box {
                width_fraction,
                height_fraction,
            } => [width_fraction, height_fraction],
        }
    }
}

/// Region of the background artwork the subject must stay inside
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlacementSlot {
    /// The whole canvas
    #[default]
    Canvas,
    /// A rectangle given in fractions of the canvas size
    Region {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl PlacementSlot {
    /// Slot rectangle in canvas pixels
    pub fn resolve(&self, canvas_width: u32, canvas_height: u32) -> RectF {
        let (w, h) = (canvas_width as f64, canvas_height as f64);
        match *self {
            PlacementSlot::Canvas => RectF::new(0.0, 0.0, w, h),
            PlacementSlot::Region {
                x,
                y,
                width,
                height,
            } => RectF::new(x * w, y * h, width * w, height * h),
        }
    }
}

/// Caption font, layout and budget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaptionStyle {
    /// Font size in pixels
    pub font_size: f32,
    /// Distance between baselines
    pub line_height: f64,
    /// Vertical center of the caption block, as a fraction of canvas height
    pub baseline_fraction: f64,
    /// Maximum line width, as a fraction of canvas width
    #[serde(default = "default_max_width_fraction")]
    pub max_width_fraction: f64,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub template: CaptionTemplate,
    pub budget: CharBudget,
}

fn default_max_width_fraction() -> f64 {
    0.7
}

/// Look of the crop-selection view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CropStyle {
    /// Share of the canvas (per axis) the preview may occupy
    pub preview_fraction: f64,
    /// Shade drawn over everything outside the selection
    pub overlay: Color,
    pub outline_color: Color,
    pub outline_width: f32,
    /// Dash pattern: on length, off length
    pub dash: [f32; 2],
}

impl Default for CropStyle {
    fn default() -> Self {
        Self {
            preview_fraction: 0.8,
            overlay: Color::rgba(0, 0, 0, 128),
            outline_color: Color::white(),
            outline_width: 3.0,
            dash: [8.0, 8.0],
        }
    }
}

/// Canvas size used until a background is loaded
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 700,
            height: 600,
        }
    }
}

fn default_handle_half_size() -> f64 {
    10.0
}

/// A certificate variant
///
/// The circular and rectangular certificates are one engine configured by
/// two profiles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub crop_shape: CropShape,
    pub sizing: SizingPolicy,
    #[serde(default)]
    pub slot: PlacementSlot,
    pub caption: CaptionStyle,
    #[serde(default)]
    pub crop: CropStyle,
    #[serde(default)]
    pub canvas: CanvasSize,
    /// Half the size of the drag handle element, in display pixels
    #[serde(default = "default_handle_half_size")]
    pub handle_half_size: f64,
}

impl Profile {
    /// Round photo, plain caption up to 80 characters
    pub fn circular() -> Self {
        Self {
            name: "circular".to_string(),
            crop_shape: CropShape::Circle,
            sizing: SizingPolicy::Square {
                width_fraction: 0.57,
            },
            slot: PlacementSlot::Canvas,
            caption: CaptionStyle {
                font_size: 32.0,
                line_height: 40.0,
                baseline_fraction: 0.8,
                max_width_fraction: 0.7,
                color: Color::rgb(0x2c, 0x3e, 0x50),
                template: CaptionTemplate::Plain,
                budget: budget(80),
            },
            crop: CropStyle::default(),
            canvas: CanvasSize::default(),
            handle_half_size: default_handle_half_size(),
        }
    }

    /// Rectangular photo, "Awarded to" caption up to 40 characters
    pub fn rectangular() -> Self {
        Self {
            name: "rectangular".to_string(),
            crop_shape: CropShape::Rectangle,
            sizing: SizingPolicy::Box {
                width_fraction: 0.45,
                height_fraction: 0.40,
            },
            slot: PlacementSlot::Canvas,
            caption: CaptionStyle {
                font_size: 28.0,
                line_height: 36.0,
                baseline_fraction: 0.82,
                max_width_fraction: 0.7,
                color: Color::rgb(0x2c, 0x3e, 0x50),
                template: CaptionTemplate::Prefixed {
                    prefix: "Awarded to ".to_string(),
                },
                budget: budget(40),
            },
            crop: CropStyle::default(),
            canvas: CanvasSize::default(),
            handle_half_size: default_handle_half_size(),
        }
    }

    /// Check the numeric fields a JSON profile could get wrong
    pub fn validate(&self) -> std::result::Result<(), String> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(format!("{name} must be a positive number, got {value}"))
            }
        };

        let [w, h] = self.sizing.fractions();
        positive("sizing width fraction", w)?;
        positive("sizing height fraction", h)?;
        positive("caption fontSize", self.caption.font_size as f64)?;
        positive("caption lineHeight", self.caption.line_height)?;
        positive("caption maxWidthFraction", self.caption.max_width_fraction)?;
        positive("crop previewFraction", self.crop.preview_fraction)?;
        if self.crop.preview_fraction > 1.0 {
            return Err(format!(
                "crop previewFraction must not exceed 1, got {}",
                self.crop.preview_fraction
            ));
        }
        if !self.caption.baseline_fraction.is_finite() {
            return Err("caption baselineFraction must be finite".to_string());
        }
        if self.caption.budget.limit() == 0 {
            return Err("caption budget limit must be positive".to_string());
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(format!(
                "canvas must not be empty, got {}x{}",
                self.canvas.width, self.canvas.height
            ));
        }
        if let PlacementSlot::Region { width, height, .. } = self.slot {
            positive("slot width", width)?;
            positive("slot height", height)?;
        }
        Ok(())
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::circular()
    }
}

fn budget(limit: usize) -> CharBudget {
    CharBudget::new(limit, 5).unwrap_or_default()
}
