//! WASM bindings for the certificate composer
//!
//! This crate provides JavaScript-friendly API for:
//! - Loading the background template and caption fonts
//! - Uploading, cropping and dragging the photo
//! - Reading canvas pixels and exporting the certificate as PNG
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { CertificateComposer } from 'certificate-wasm';
//!
//! await init();
//!
//! const composer = CertificateComposer.circular();
//! composer.loadCaptionFont(new Uint8Array(await fontResponse.arrayBuffer()));
//! composer.loadBackground(backgroundBytes, { kind: 'sameOrigin' });
//!
//! const ticket = composer.beginUpload();
//! composer.completeUpload(ticket, photoBytes);
//! composer.setCaption('Ana Souza');
//!
//! canvas.addEventListener('mousedown', (e) =>
//!   composer.pointerDown(e.clientX, e.clientY, canvas.getBoundingClientRect()));
//!
//! ctx.putImageData(composer.imageData(), 0, 0);
//!
//! try {
//!   const png = composer.exportPng();
//! } catch (err) {
//!   alert(err.message); // err.kind is 'security' or 'failed'
//! }
//! ```

use composer::{ComposerError, DisplayRect, ImageOrigin, Point, Profile, Session, UploadTicket};
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::{DomRect, ImageData};

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn to_js_error(err: ComposerError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Export failures become `Error` objects tagged with a `kind`
fn export_error(err: ComposerError) -> JsValue {
    let kind = match err {
        ComposerError::ExportSecurity => "security",
        _ => "failed",
    };
    let error = js_sys::Error::new(&err.to_string());
    let _ = js_sys::Reflect::set(&error, &JsValue::from_str("kind"), &JsValue::from_str(kind));
    error.into()
}

fn display_rect(rect: &DomRect) -> DisplayRect {
    DisplayRect::new(rect.left(), rect.top(), rect.width(), rect.height())
}

/// `undefined` means a local file
fn parse_origin(origin: JsValue) -> Result<ImageOrigin, JsValue> {
    if origin.is_undefined() || origin.is_null() {
        return Ok(ImageOrigin::Local);
    }
    Ok(serde_wasm_bindgen::from_value(origin)?)
}

/// Handle for a photo whose decode is in flight
#[wasm_bindgen]
pub struct UploadHandle {
    ticket: UploadTicket,
}

#[wasm_bindgen]
impl UploadHandle {
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> f64 {
        self.ticket.id() as f64
    }
}

/// Certificate composer bound to one canvas
#[wasm_bindgen]
pub struct CertificateComposer {
    session: Session,
}

#[wasm_bindgen]
impl CertificateComposer {
    /// Create a composer for the circular certificate
    #[wasm_bindgen(constructor)]
    pub fn new() -> CertificateComposer {
        Self::circular()
    }

    /// Round photo, plain caption up to 80 characters
    pub fn circular() -> CertificateComposer {
        CertificateComposer {
            session: Session::new(Profile::circular()),
        }
    }

    /// Rectangular photo, prefixed caption up to 40 characters
    pub fn rectangular() -> CertificateComposer {
        CertificateComposer {
            session: Session::new(Profile::rectangular()),
        }
    }

    /// Create a composer from a profile
    ///
    /// @param json - Profile JSON string
    /// @returns CertificateComposer instance
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<CertificateComposer, JsValue> {
        let profile = composer::parse_profile(json).map_err(to_js_error)?;
        Ok(CertificateComposer {
            session: Session::new(profile),
        })
    }

    /// Load the background template
    ///
    /// @param data - PNG or JPEG bytes (Uint8Array)
    /// @param origin - `{ kind: 'local' | 'sameOrigin' | 'crossOrigin', corsApproved? }`
    /// @returns true when loaded, false when the fallback card is shown instead
    #[wasm_bindgen(js_name = loadBackground)]
    pub fn load_background(&mut self, data: &[u8], origin: JsValue) -> Result<bool, JsValue> {
        let origin = parse_origin(origin)?;
        let status = self.session.load_background(data, origin);
        Ok(status == composer::BackgroundStatus::Loaded)
    }

    /// Show the fallback card, e.g. after the background request failed
    #[wasm_bindgen(js_name = useFallbackBackground)]
    pub fn use_fallback_background(&mut self) {
        self.session.use_fallback_background();
    }

    /// Load the caption typeface
    ///
    /// @param data - TTF/OTF file bytes (Uint8Array)
    /// @returns false when the face could not be parsed; the fallback stays in use
    #[wasm_bindgen(js_name = loadCaptionFont)]
    pub fn load_caption_font(&mut self, data: &[u8]) -> bool {
        self.session.load_caption_font(data.to_vec()).is_ok()
    }

    /// Load the generic fallback face
    ///
    /// @param data - TTF/OTF file bytes (Uint8Array)
    #[wasm_bindgen(js_name = loadFallbackFont)]
    pub fn load_fallback_font(&mut self, data: &[u8]) -> bool {
        self.session.load_fallback_font(data.to_vec()).is_ok()
    }

    /// Register a photo upload before reading the file
    #[wasm_bindgen(js_name = beginUpload)]
    pub fn begin_upload(&mut self) -> UploadHandle {
        UploadHandle {
            ticket: self.session.begin_upload(),
        }
    }

    /// Apply an uploaded photo
    ///
    /// @param ticket - Handle from beginUpload()
    /// @param data - PNG or JPEG bytes (Uint8Array)
    /// @param origin - Optional origin, local when omitted
    #[wasm_bindgen(js_name = completeUpload)]
    pub fn complete_upload(
        &mut self,
        ticket: &UploadHandle,
        data: &[u8],
        origin: JsValue,
    ) -> Result<(), JsValue> {
        let origin = parse_origin(origin)?;
        self.session
            .complete_upload(ticket.ticket, data, origin)
            .map_err(to_js_error)
    }

    /// Set the caption; returns the text actually kept
    #[wasm_bindgen(js_name = setCaption)]
    pub fn set_caption(&mut self, text: &str) -> String {
        self.session.set_caption(text).to_string()
    }

    /// @returns `{ length, limit, nearLimit }`
    #[wasm_bindgen(js_name = captionCounter)]
    pub fn caption_counter(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.session.caption_counter())?)
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, client_x: f64, client_y: f64, rect: &DomRect) {
        self.session
            .pointer_down(Point::new(client_x, client_y), display_rect(rect));
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, client_x: f64, client_y: f64, rect: &DomRect) {
        self.session
            .pointer_move(Point::new(client_x, client_y), display_rect(rect));
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) {
        self.session.pointer_up();
    }

    /// Enter crop mode
    ///
    /// @returns false when no photo has been uploaded
    #[wasm_bindgen(js_name = startCrop)]
    pub fn start_crop(&mut self) -> bool {
        self.session.start_crop()
    }

    /// Apply the crop selection
    ///
    /// Throws "Please select an area to crop." when nothing is selected;
    /// crop mode stays active in that case.
    #[wasm_bindgen(js_name = confirmCrop)]
    pub fn confirm_crop(&mut self) -> Result<(), JsValue> {
        self.session.confirm_crop().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = cancelCrop)]
    pub fn cancel_crop(&mut self) {
        self.session.cancel_crop();
    }

    #[wasm_bindgen(getter, js_name = isCropping)]
    pub fn is_cropping(&self) -> bool {
        self.session.is_cropping()
    }

    /// @returns `{ downloadEnabled, cropEnabled }`
    pub fn actions(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.session.actions())?)
    }

    /// @returns `{ visible, left, top }` in viewport pixels
    #[wasm_bindgen(js_name = dragHandle)]
    pub fn drag_handle(&self, rect: &DomRect) -> Result<JsValue, JsValue> {
        let handle = self.session.drag_handle(display_rect(rect));
        Ok(serde_wasm_bindgen::to_value(&handle)?)
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.session.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.session.height()
    }

    /// Raw RGBA canvas pixels, row by row
    pub fn pixels(&self) -> Vec<u8> {
        self.session.canvas().as_raw().clone()
    }

    /// Canvas pixels ready for `putImageData`
    #[wasm_bindgen(js_name = imageData)]
    pub fn image_data(&self) -> Result<ImageData, JsValue> {
        let canvas = self.session.canvas();
        ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(canvas.as_raw().as_slice()),
            canvas.width(),
            canvas.height(),
        )
    }

    /// Encode the certificate as PNG
    ///
    /// Throws an Error with `kind` set to "security" when the canvas holds a
    /// cross-origin image, or "failed" for any other encoding failure.
    #[wasm_bindgen(js_name = exportPng)]
    pub fn export_png(&self) -> Result<Vec<u8>, JsValue> {
        self.session.export_png().map_err(export_error)
    }
}

impl Default for CertificateComposer {
    fn default() -> Self {
        Self::new()
    }
}
