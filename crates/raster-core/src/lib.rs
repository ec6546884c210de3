//! Raster Core - Low-level raster operations for certificate composition
//!
//! This crate provides functionality for:
//! - Mapping pointer coordinates between display and canvas space
//! - Decoding uploads (JPEG, PNG) and encoding PNG output
//! - Fitting a raster into a target box (plain or circular)
//! - Mapping crop selections to source pixels with bounds clamping
//! - Shape masks, selection overlays and dashed outlines
//! - Measuring and drawing caption text with TrueType fonts
//!
//! # Example
//!
//! ```ignore
//! use raster_core::{decode, fit_circular, encode_png};
//!
//! let photo = decode(&std::fs::read("photo.jpg")?)?;
//! let subject = fit_circular(&photo, 570, 570)?;
//! std::fs::write("subject.png", encode_png(&subject)?)?;
//! ```

mod crop;
mod font;
mod geometry;
mod image;
mod mask;
mod text;

pub use crop::{crop_circle, crop_rect, CircleRegion, PreviewMapping};
pub use font::FontStack;
pub use geometry::{CoordinateMapper, DisplayRect, Point, RectF, SizeF};
pub use image::{
    decode, detect_format, draw_image, encode_png, fit, fit_circular,
    fit_layout, fit_within, FitLayout, ImageFormat, ImageOrigin,
};
pub use mask::{
    apply_shape_mask, clip_to_inscribed_circle, punch_selection, stroke_dashed, stroke_outline,
    Shape,
};
pub use text::{baseline_positions, calculate_x_offset};

use thiserror::Error;

/// Errors that can occur during raster operations
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Unknown image format")]
    UnknownFormat,

    #[error("Invalid raster dimensions: {0}x{1}")]
    InvalidDimensions(u32, u32),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for raster operations
pub type Result<T> = std::result::Result<T, RasterError>;

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}
