//! Crop selector state machine
//!
//! `Idle -> Active(selecting = false) -> Active(selecting = true) <->
//! Active(selecting = false) -> Idle`. Confirming or cancelling always
//! returns to `Idle`; a rejected confirm leaves the session active.

use crate::{ComposerError, CropShape, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use raster_core::{
    crop_circle, crop_rect, fit, fit_circular, Point, PreviewMapping, RectF, Shape,
};

/// The shape being selected, in preview (canvas) space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    Circle { center: Point, radius: f64 },
    Rect(RectF),
}

impl Selection {
    fn empty_at(shape: CropShape, anchor: Point) -> Self {
        match shape {
            CropShape::Circle => Selection::Circle {
                center: anchor,
                radius: 0.0,
            },
            CropShape::Rectangle => Selection::Rect(RectF::new(anchor.x, anchor.y, 0.0, 0.0)),
        }
    }

    /// Whether the selection covers no area
    pub fn is_empty(&self) -> bool {
        match self {
            Selection::Circle { radius, .. } => radius.is_nan() || *radius <= 0.0,
            Selection::Rect(rect) => rect.is_empty(),
        }
    }

    /// The selection as a drawable shape
    pub fn shape(&self) -> Shape {
        match *self {
            Selection::Circle { center, radius } => Shape::Circle {
                cx: center.x,
                cy: center.y,
                radius,
            },
            Selection::Rect(rect) => Shape::Rect(rect),
        }
    }
}

/// An active crop session
#[derive(Debug, Clone)]
pub struct CropSession {
    shape: CropShape,
    mapping: PreviewMapping,
    preview: RgbaImage,
    anchor: Point,
    selection: Option<Selection>,
    selecting: bool,
}

impl CropSession {
    /// Enter crop mode for `source` on a `canvas_width x canvas_height` canvas
    pub fn new(
        shape: CropShape,
        source: &RgbaImage,
        canvas_width: u32,
        canvas_height: u32,
        preview_fraction: f64,
    ) -> Self {
        let mapping = PreviewMapping::new(
            source.width(),
            source.height(),
            canvas_width,
            canvas_height,
            preview_fraction,
        );
        let width = (mapping.rect.width.round() as u32).max(1);
        let height = (mapping.rect.height.round() as u32).max(1);
        let preview = if (width, height) == source.dimensions() {
            source.clone()
        } else {
            imageops::resize(source, width, height, FilterType::Triangle)
        };

        Self {
            shape,
            mapping,
            preview,
            anchor: Point::default(),
            selection: None,
            selecting: false,
        }
    }

    pub fn shape(&self) -> CropShape {
        self.shape
    }

    pub fn mapping(&self) -> &PreviewMapping {
        &self.mapping
    }

    /// The source scaled to the preview rectangle
    pub fn preview(&self) -> &RgbaImage {
        &self.preview
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    /// Start a new selection anchored at `p`, discarding the previous one
    pub fn pointer_down(&mut self, p: Point) {
        self.selecting = true;
        self.anchor = p;
        self.selection = Some(Selection::empty_at(self.shape, p));
    }

    /// Grow the selection towards `p`
    ///
    /// Returns `true` when the selection changed and the view must be redrawn.
    pub fn pointer_move(&mut self, p: Point) -> bool {
        if !self.selecting {
            return false;
        }
        self.selection = Some(match self.shape {
            CropShape::Circle => Selection::Circle {
                center: self.anchor,
                radius: self.anchor.distance_to(p),
            },
            CropShape::Rectangle => Selection::Rect(RectF::from_corners(self.anchor, p)),
        });
        true
    }

    /// Stop growing the selection; it stays visible
    pub fn pointer_up(&mut self) {
        self.selecting = false;
    }

    /// Cut the current selection out of the source, before any fitting
    ///
    /// Fails with [`ComposerError::EmptySelection`] when nothing is selected,
    /// or when nothing of the selection lies on the source image.
    pub fn extract(&self, source: &RgbaImage) -> Result<RgbaImage> {
        let selection = self
            .selection
            .filter(|s| !s.is_empty())
            .ok_or(ComposerError::EmptySelection)?;

        let cropped = match selection {
            Selection::Circle { center, radius } => {
                let region = self
                    .mapping
                    .circle_to_source(center, radius)
                    .ok_or(ComposerError::EmptySelection)?;
                crop_circle(source, &region)?
            }
            Selection::Rect(rect) => {
                let region = self
                    .mapping
                    .rect_to_source(rect)
                    .ok_or(ComposerError::EmptySelection)?;
                crop_rect(source, &region)?
            }
        };
        Ok(cropped)
    }

    /// Produce the fitted subject for the current selection
    pub fn confirm(&self, source: &RgbaImage, target: (u32, u32)) -> Result<RgbaImage> {
        let cropped = self.extract(source)?;
        fit_cropped(&cropped, self.shape, target)
    }
}

/// Fit a cropped raster into the target box, clipped to a circle for circular crops
pub fn fit_cropped(cropped: &RgbaImage, shape: CropShape, target: (u32, u32)) -> Result<RgbaImage> {
    let (target_width, target_height) = target;
    let fitted = match shape {
        CropShape::Circle => fit_circular(cropped, target_width, target_height)?,
        CropShape::Rectangle => fit(cropped, target_width, target_height)?,
    };
    Ok(fitted)
}

/// Crop mode of a session
#[derive(Debug, Clone, Default)]
pub enum CropState {
    #[default]
    Idle,
    Active(Box<CropSession>),
}

impl CropState {
    pub fn is_active(&self) -> bool {
        matches!(self, CropState::Active(_))
    }

    pub fn session(&self) -> Option<&CropSession> {
        match self {
            CropState::Active(session) => Some(&**session),
            CropState::Idle => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut CropSession> {
        match self {
            CropState::Active(session) => Some(&mut **session),
            CropState::Idle => None,
        }
    }
}
