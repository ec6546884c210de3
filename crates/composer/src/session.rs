//! The composition session: one owner for all certificate state

use crate::compositor::{Compositor, Scene};
use crate::crop::{fit_cropped, CropSession, CropState};
use crate::drag::{centered_placement, DragController};
use crate::{ComposerError, Profile, Result};
use caption_text::CaptionCounter;
use image::RgbaImage;
use raster_core::{
    decode, encode_png, fit, CoordinateMapper, DisplayRect, FontStack, ImageOrigin, Point,
    RasterError, RectF,
};
use serde::Serialize;
use tracing::{debug, warn};

/// Handle for an upload whose decode is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UploadTicket(u64);

impl UploadTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Outcome of a background load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BackgroundStatus {
    Loaded,
    Fallback,
}

/// Which host controls are usable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionState {
    pub download_enabled: bool,
    pub crop_enabled: bool,
}

/// Position of the drag-handle overlay, in viewport pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DragHandle {
    pub visible: bool,
    pub left: f64,
    pub top: f64,
}

/// A certificate being composed
///
/// Hosts forward their events to the methods below; every state change
/// redraws the canvas, which is then read with [`Session::canvas`] or
/// exported with [`Session::export_png`].
#[derive(Debug)]
pub struct Session {
    profile: Profile,
    canvas: RgbaImage,
    background: Option<RgbaImage>,
    background_ready: bool,
    background_tainted: bool,
    source: Option<RgbaImage>,
    /// Last confirmed crop, in source pixels
    cropped: Option<RgbaImage>,
    subject: Option<RgbaImage>,
    subject_tainted: bool,
    placement: Point,
    caption: String,
    fonts: FontStack,
    drag: DragController,
    crop: CropState,
    issued_uploads: u64,
    applied_upload: Option<u64>,
}

impl Session {
    /// Start a session on the profile's initial canvas
    pub fn new(profile: Profile) -> Self {
        let canvas = RgbaImage::new(profile.canvas.width.max(1), profile.canvas.height.max(1));
        let mut session = Self {
            profile,
            canvas,
            background: None,
            background_ready: false,
            background_tainted: false,
            source: None,
            cropped: None,
            subject: None,
            subject_tainted: false,
            placement: Point::default(),
            caption: String::new(),
            fonts: FontStack::new(),
            drag: DragController::new(),
            crop: CropState::Idle,
            issued_uploads: 0,
            applied_upload: None,
        };
        session.placement = centered_placement(session.target_size(), session.slot());
        session.redraw();
        session
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    /// Size of the subject's target box on the current canvas
    pub fn target_size(&self) -> (u32, u32) {
        self.profile
            .sizing
            .target_size(self.canvas.width(), self.canvas.height())
    }

    /// Placement slot in canvas pixels
    pub fn slot(&self) -> RectF {
        self.profile
            .slot
            .resolve(self.canvas.width(), self.canvas.height())
    }

    pub fn placement(&self) -> Point {
        self.placement
    }

    pub fn subject(&self) -> Option<&RgbaImage> {
        self.subject.as_ref()
    }

    pub fn source(&self) -> Option<&RgbaImage> {
        self.source.as_ref()
    }

    pub fn crop_state(&self) -> &CropState {
        &self.crop
    }

    pub fn is_cropping(&self) -> bool {
        self.crop.is_active()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Whether the background or the subject came from a disallowed origin
    pub fn is_tainted(&self) -> bool {
        self.background_tainted || self.subject_tainted
    }

    // === Fonts ===

    /// Load the caption typeface
    ///
    /// A face that fails to parse leaves the previous (or fallback) face in
    /// use; the error is returned for logging only.
    pub fn load_caption_font(&mut self, data: Vec<u8>) -> Result<()> {
        if let Err(err) = self.fonts.load_primary(data) {
            warn!(error = %err, "caption font unavailable, using fallback face");
            return Err(ComposerError::FontUnavailable(err.to_string()));
        }
        self.redraw();
        Ok(())
    }

    /// Load the generic face used when the caption typeface is missing
    pub fn load_fallback_font(&mut self, data: Vec<u8>) -> Result<()> {
        if let Err(err) = self.fonts.load_fallback(data) {
            warn!(error = %err, "fallback font unavailable");
            return Err(ComposerError::FontUnavailable(err.to_string()));
        }
        self.redraw();
        Ok(())
    }

    pub fn fonts(&self) -> &FontStack {
        &self.fonts
    }

    // === Background ===

    /// Decode and install the background template
    ///
    /// A background that cannot be decoded is replaced by the fallback card;
    /// composition continues either way.
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    pub fn load_background(&mut self, data: &[u8], origin: ImageOrigin) -> BackgroundStatus {
        match decode(data) {
            Ok(image) => self.load_background_image(image, origin),
            Err(err) => {
                warn!(error = %err, "failed to load background, using fallback");
                self.use_fallback_background();
                BackgroundStatus::Fallback
            }
        }
    }

    /// Install an already decoded background template
    ///
    /// The canvas is re-created at the background's size; the subject is
    /// re-centered and re-fitted to the new target box, keeping any crop.
    pub fn load_background_image(&mut self, image: RgbaImage, origin: ImageOrigin) -> BackgroundStatus {
        if image.width() == 0 || image.height() == 0 {
            warn!(
                width = image.width(),
                height = image.height(),
                "empty background, using fallback"
            );
            self.use_fallback_background();
            return BackgroundStatus::Fallback;
        }

        self.canvas = RgbaImage::new(image.width(), image.height());
        self.background_tainted = origin.taints_canvas();
        self.background = Some(image);
        self.background_ready = true;

        if self.crop.is_active() {
            debug!("canvas resized, leaving crop mode");
            self.crop = CropState::Idle;
        }
        self.drag.pointer_up();
        self.placement = centered_placement(self.target_size(), self.slot());
        self.refit_subject();

        debug!(
            width = self.canvas.width(),
            height = self.canvas.height(),
            "background loaded"
        );
        self.redraw();
        BackgroundStatus::Loaded
    }

    /// Draw the fallback card instead of a background template
    pub fn use_fallback_background(&mut self) {
        self.background = None;
        self.background_tainted = false;
        self.background_ready = true;
        self.redraw();
    }

    fn refit_subject(&mut self) {
        let target = self.target_size();
        let refitted = match (&self.cropped, &self.source) {
            (Some(cropped), _) => fit_cropped(cropped, self.profile.crop_shape, target),
            (None, Some(source)) => fit(source, target.0, target.1).map_err(Into::into),
            (None, None) => return,
        };
        match refitted {
            Ok(fitted) => self.subject = Some(fitted),
            Err(err) => warn!(error = %err, "failed to re-fit subject"),
        }
    }

    // === Uploads ===

    /// Register an upload before its decode starts
    pub fn begin_upload(&mut self) -> UploadTicket {
        self.issued_uploads += 1;
        UploadTicket(self.issued_uploads)
    }

    /// Decode and apply an upload
    pub fn complete_upload(
        &mut self,
        ticket: UploadTicket,
        data: &[u8],
        origin: ImageOrigin,
    ) -> Result<()> {
        let image = decode(data)?;
        self.complete_upload_image(ticket, image, origin)
    }

    /// Apply a decoded upload
    ///
    /// The last completion wins, even when its ticket is older than one
    /// already applied. Any crop session in progress is cancelled.
    pub fn complete_upload_image(
        &mut self,
        ticket: UploadTicket,
        image: RgbaImage,
        origin: ImageOrigin,
    ) -> Result<()> {
        if image.width() == 0 || image.height() == 0 {
            return Err(RasterError::InvalidDimensions(image.width(), image.height()).into());
        }
        if self.applied_upload.is_some_and(|applied| ticket.0 < applied) {
            debug!(ticket = ticket.0, "applying stale upload");
        }
        self.applied_upload = Some(self.applied_upload.map_or(ticket.0, |a| a.max(ticket.0)));

        let (width, height) = self.target_size();
        let fitted = fit(&image, width, height)?;

        self.subject_tainted = origin.taints_canvas();
        if self.crop.is_active() {
            debug!("new upload, leaving crop mode");
            self.crop = CropState::Idle;
        }
        self.drag.pointer_up();
        self.source = Some(image);
        self.cropped = None;
        self.subject = Some(fitted);
        self.redraw();
        Ok(())
    }

    // === Caption ===

    /// Replace the caption, truncated to the profile's budget
    pub fn set_caption(&mut self, text: &str) -> &str {
        self.caption = self.profile.caption.budget.clamp(text).to_string();
        self.redraw();
        &self.caption
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn caption_counter(&self) -> CaptionCounter {
        self.profile.caption.budget.counter(&self.caption)
    }

    /// The caption as it is laid out on the canvas
    pub fn caption_lines(&self) -> Vec<String> {
        Compositor::new(&self.profile, &self.fonts).caption_lines(&self.caption, self.canvas.width())
    }

    // === Pointer ===

    fn to_canvas(&self, client: Point, display: DisplayRect) -> Option<Point> {
        CoordinateMapper::new(display, self.canvas.width(), self.canvas.height()).to_canvas(client)
    }

    /// Press: start a crop selection, or start dragging the subject
    pub fn pointer_down(&mut self, client: Point, display: DisplayRect) {
        let Some(p) = self.to_canvas(client, display) else {
            return;
        };

        if let Some(crop) = self.crop.session_mut() {
            crop.pointer_down(p);
            self.redraw();
            return;
        }

        if self.subject.is_some() {
            let target = self.target_size();
            self.drag.pointer_down(p, self.placement, target);
        }
    }

    /// Move: grow the crop selection, or move the dragged subject
    pub fn pointer_move(&mut self, client: Point, display: DisplayRect) {
        let Some(p) = self.to_canvas(client, display) else {
            return;
        };

        if let Some(crop) = self.crop.session_mut() {
            if crop.pointer_move(p) {
                self.redraw();
            }
            return;
        }

        if self.subject.is_none() {
            return;
        }
        let (target, slot) = (self.target_size(), self.slot());
        if let Some(placement) = self.drag.pointer_move(p, target, slot) {
            self.placement = placement;
            self.redraw();
        }
    }

    /// Release: finish the crop selection or the drag
    pub fn pointer_up(&mut self) {
        if let Some(crop) = self.crop.session_mut() {
            if crop.is_selecting() {
                crop.pointer_up();
                return;
            }
        }
        self.drag.pointer_up();
    }

    // === Crop ===

    /// Enter crop mode; does nothing without an uploaded image
    pub fn start_crop(&mut self) -> bool {
        let Some(source) = &self.source else {
            return false;
        };
        let session = CropSession::new(
            self.profile.crop_shape,
            source,
            self.canvas.width(),
            self.canvas.height(),
            self.profile.crop.preview_fraction,
        );
        debug!(preview = ?session.mapping().rect, "entering crop mode");

        self.drag.pointer_up();
        self.crop = CropState::Active(Box::new(session));
        self.redraw();
        true
    }

    /// Replace the subject with the selected region
    ///
    /// An empty selection is rejected with [`ComposerError::EmptySelection`]
    /// and crop mode stays active. Outside crop mode this does nothing.
    #[tracing::instrument(skip(self))]
    pub fn confirm_crop(&mut self) -> Result<()> {
        let (Some(crop), Some(source)) = (self.crop.session(), self.source.as_ref()) else {
            return Ok(());
        };

        let cropped = crop.extract(source)?;
        let fitted = fit_cropped(&cropped, crop.shape(), self.target_size())?;
        self.cropped = Some(cropped);
        self.subject = Some(fitted);
        self.crop = CropState::Idle;
        debug!("crop confirmed");
        self.redraw();
        Ok(())
    }

    /// Leave crop mode without changing the subject
    pub fn cancel_crop(&mut self) {
        if self.crop.is_active() {
            debug!("crop cancelled");
        }
        self.crop = CropState::Idle;
        self.redraw();
    }

    // === Host state ===

    pub fn actions(&self) -> ActionState {
        ActionState {
            download_enabled: self.background_ready || self.subject.is_some(),
            crop_enabled: self.source.is_some(),
        }
    }

    /// Where to show the drag handle: centered on the subject
    pub fn drag_handle(&self, display: DisplayRect) -> DragHandle {
        if self.subject.is_none() {
            return DragHandle::default();
        }
        let (width, height) = self.target_size();
        let center = Point::new(
            self.placement.x + width as f64 / 2.0,
            self.placement.y + height as f64 / 2.0,
        );
        let mapper = CoordinateMapper::new(display, self.canvas.width(), self.canvas.height());
        match mapper.to_display(center) {
            Some(p) => DragHandle {
                visible: true,
                left: p.x - self.profile.handle_half_size,
                top: p.y - self.profile.handle_half_size,
            },
            None => DragHandle::default(),
        }
    }

    /// Encode the canvas as PNG for download
    pub fn export_png(&self) -> Result<Vec<u8>> {
        if self.is_tainted() {
            return Err(ComposerError::ExportSecurity);
        }
        encode_png(&self.canvas).map_err(|err| {
            warn!(error = %err, "export failed");
            ComposerError::Export(err.to_string())
        })
    }

    fn redraw(&mut self) {
        let compositor = Compositor::new(&self.profile, &self.fonts);
        match self.crop.session() {
            Some(crop) => compositor.render_crop(&mut self.canvas, self.background.as_ref(), crop),
            None => {
                let scene = Scene {
                    background: self.background.as_ref(),
                    subject: self.subject.as_ref().map(|s| (s, self.placement)),
                    caption: &self.caption,
                };
                compositor.render_scene(&mut self.canvas, &scene);
            }
        }
    }
}
