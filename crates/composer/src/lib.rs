//! Composer - certificate composition engine
//!
//! This crate provides:
//! - Configuration profiles (circular and rectangular certificates) in JSON
//! - The compositor that redraws the certificate from scratch
//! - The crop selector state machine and the drag controller
//! - [`Session`], the single owner of all composition state
//!
//! # Example
//!
//! ```no_run
//! use composer::{ImageOrigin, Profile, Session};
//!
//! let mut session = Session::new(Profile::circular());
//! session.load_background(&std::fs::read("diploma.png")?, ImageOrigin::SameOrigin);
//!
//! let ticket = session.begin_upload();
//! session.complete_upload(ticket, &std::fs::read("photo.jpg")?, ImageOrigin::Local)?;
//! session.set_caption("Ana Souza, for outstanding volunteer work");
//!
//! std::fs::write("certificate.png", session.export_png()?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod compositor;
pub mod crop;
pub mod drag;
pub mod parser;
mod schema;
mod session;

pub use compositor::{Compositor, Scene};
pub use crop::{CropSession, CropState, Selection};
pub use drag::DragController;
pub use parser::parse_profile;
pub use schema::*;
pub use session::{ActionState, BackgroundStatus, DragHandle, Session, UploadTicket};

pub use caption_text::{CaptionCounter, CaptionTemplate, CharBudget};
pub use raster_core::{DisplayRect, ImageOrigin, Point};

use thiserror::Error;

/// Errors that can occur while composing a certificate
#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("Caption font unavailable: {0}")]
    FontUnavailable(String),

    #[error("Please select an area to crop.")]
    EmptySelection,

    #[error("Download failed due to security restrictions. Please serve this page through a web server (not file://).")]
    ExportSecurity,

    #[error("Download failed: {0}")]
    Export(String),

    #[error("Failed to parse profile: {0}")]
    ParseError(String),

    #[error("Raster error: {0}")]
    Raster(#[from] raster_core::RasterError),
}

/// Result type for composer operations
pub type Result<T> = std::result::Result<T, ComposerError>;
