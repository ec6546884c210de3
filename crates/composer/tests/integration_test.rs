//! Integration tests for the composition session

use composer::{
    parse_profile, ActionState, BackgroundStatus, ComposerError, DisplayRect, ImageOrigin,
    PlacementSlot, Point, Profile, Session,
};
use image::{Rgba, RgbaImage};
use pretty_assertions::assert_eq;

const RED: Rgba<u8> = Rgba([220, 20, 20, 255]);
const BLUE: Rgba<u8> = Rgba([20, 20, 220, 255]);
const GREEN: Rgba<u8> = Rgba([20, 200, 20, 255]);

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn solid(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color)
}

/// Resampling may shift channels by a unit or two
fn assert_close(actual: &Rgba<u8>, expected: Rgba<u8>) {
    let close = actual
        .0
        .iter()
        .zip(expected.0.iter())
        .all(|(a, e)| a.abs_diff(*e) <= 2);
    assert!(close, "{actual:?} != {expected:?}");
}

fn display(session: &Session) -> DisplayRect {
    DisplayRect::new(0.0, 0.0, session.width() as f64, session.height() as f64)
}

/// Session on a 1000x1000 background with one photo uploaded
fn session_with_photo(profile: Profile, photo: RgbaImage) -> Session {
    init_logging();
    let mut session = Session::new(profile);
    session.load_background_image(solid(1000, 1000, Rgba([250, 250, 240, 255])), ImageOrigin::SameOrigin);
    let ticket = session.begin_upload();
    session
        .complete_upload_image(ticket, photo, ImageOrigin::Local)
        .unwrap();
    session
}

fn drag_select(session: &mut Session, from: Point, to: Point) {
    let display = display(session);
    session.pointer_down(from, display);
    session.pointer_move(to, display);
    session.pointer_up();
}

#[test]
fn test_drag_to_negative_clamps_to_slot_minimum() {
    let mut session = session_with_photo(Profile::circular(), solid(300, 300, RED));
    assert_eq!(session.placement(), Point::new(215.0, 215.0));

    drag_select(&mut session, Point::new(300.0, 300.0), Point::new(-50.0, -50.0));
    assert_eq!(session.placement(), Point::new(0.0, 0.0));
    assert!(!session.is_dragging());
}

#[test]
fn test_drag_stays_in_region_slot() {
    let mut profile = Profile::circular();
    profile.slot = PlacementSlot::Region {
        x: 0.1,
        y: 0.1,
        width: 0.8,
        height: 0.8,
    };
    let mut session = session_with_photo(profile, solid(300, 300, RED));
    let display = display(&session);

    session.pointer_down(Point::new(300.0, 300.0), display);
    session.pointer_move(Point::new(-50.0, -50.0), display);
    assert_eq!(session.placement(), Point::new(100.0, 100.0));

    session.pointer_move(Point::new(5000.0, 5000.0), display);
    assert_eq!(session.placement(), Point::new(330.0, 330.0));
}

#[test]
fn test_press_outside_subject_does_not_move_it() {
    let mut session = session_with_photo(Profile::circular(), solid(300, 300, RED));
    drag_select(&mut session, Point::new(10.0, 10.0), Point::new(600.0, 600.0));
    assert_eq!(session.placement(), Point::new(215.0, 215.0));
}

#[test]
fn test_zero_extent_confirm_keeps_crop_active() {
    let mut session = session_with_photo(Profile::circular(), solid(800, 600, RED));
    let before = session.subject().cloned();

    assert!(session.start_crop());
    let display = display(&session);
    session.pointer_down(Point::new(500.0, 500.0), display);
    session.pointer_up();

    let err = session.confirm_crop().unwrap_err();
    assert!(matches!(err, ComposerError::EmptySelection));
    assert_eq!(err.to_string(), "Please select an area to crop.");
    assert!(session.is_cropping());
    assert!(session.subject().cloned() == before);
}

#[test]
fn test_circular_confirm_replaces_subject() {
    // Left half green, right half blue
    let photo = RgbaImage::from_fn(800, 600, |x, _| if x < 400 { GREEN } else { BLUE });
    let mut session = session_with_photo(Profile::circular(), photo);

    assert!(session.start_crop());
    let rect = session.crop_state().session().unwrap().mapping().rect;
    assert_eq!((rect.x, rect.y, rect.width, rect.height), (100.0, 200.0, 800.0, 600.0));

    // Source circle centered at (300, 300), radius 100: entirely green
    drag_select(&mut session, Point::new(400.0, 500.0), Point::new(500.0, 500.0));
    session.confirm_crop().unwrap();

    assert!(!session.is_cropping());
    let subject = session.subject().unwrap();
    assert_eq!(subject.dimensions(), (570, 570));
    assert_eq!(subject.get_pixel(0, 0)[3], 0);
    assert_close(subject.get_pixel(285, 285), GREEN);
}

#[test]
fn test_circular_confirm_near_edge() {
    let mut session = session_with_photo(Profile::circular(), solid(800, 600, RED));
    session.start_crop();
    // Source center (30, 300); the radius clamps to 30
    drag_select(&mut session, Point::new(130.0, 500.0), Point::new(130.0, 700.0));
    session.confirm_crop().unwrap();

    let subject = session.subject().unwrap();
    assert_eq!(subject.dimensions(), (570, 570));
    assert_close(subject.get_pixel(285, 285), RED);
}

#[test]
fn test_rectangular_confirm_dragged_outside_preview() {
    // Top-left quadrant red, rest blue
    let photo = RgbaImage::from_fn(400, 400, |x, y| if x < 200 && y < 200 { RED } else { BLUE });
    let mut session = session_with_photo(Profile::rectangular(), photo);
    assert_eq!(session.target_size(), (450, 400));

    session.start_crop();
    // Preview at (300, 300, 400, 400); the drag ends up and left of it
    drag_select(&mut session, Point::new(350.0, 380.0), Point::new(250.0, 280.0));
    session.confirm_crop().unwrap();

    // 50x80 crop fitted into 450x400: drawn 250x400, 100px side bands
    let subject = session.subject().unwrap();
    assert_eq!(subject.dimensions(), (450, 400));
    assert_eq!(subject.get_pixel(50, 200)[3], 0);
    assert_eq!(subject.get_pixel(400, 200)[3], 0);
    assert_close(subject.get_pixel(225, 200), RED);
}

#[test]
fn test_rectangular_selection_off_image_is_rejected() {
    let mut session = session_with_photo(Profile::rectangular(), solid(400, 400, RED));
    session.start_crop();
    drag_select(&mut session, Point::new(10.0, 10.0), Point::new(250.0, 250.0));

    assert!(matches!(
        session.confirm_crop(),
        Err(ComposerError::EmptySelection)
    ));
    assert!(session.is_cropping());
}

#[test]
fn test_cancel_crop_restores_normal_view() {
    let mut session = session_with_photo(Profile::circular(), solid(800, 600, RED));
    let normal = session.canvas().clone();

    session.start_crop();
    drag_select(&mut session, Point::new(400.0, 500.0), Point::new(500.0, 500.0));
    assert!(session.canvas() != &normal);

    session.cancel_crop();
    assert!(!session.is_cropping());
    assert!(session.canvas() == &normal);
}

#[test]
fn test_tainted_background_blocks_export_until_replaced() {
    init_logging();
    let mut session = Session::new(Profile::circular());
    session.load_background_image(
        solid(200, 100, BLUE),
        ImageOrigin::CrossOrigin {
            cors_approved: false,
        },
    );

    let err = session.export_png().unwrap_err();
    assert!(matches!(err, ComposerError::ExportSecurity));
    assert_eq!(
        err.to_string(),
        "Download failed due to security restrictions. Please serve this page through a web server (not file://)."
    );

    session.load_background_image(solid(200, 100, BLUE), ImageOrigin::SameOrigin);
    assert!(session.export_png().is_ok());

    session.load_background_image(
        solid(200, 100, BLUE),
        ImageOrigin::CrossOrigin {
            cors_approved: false,
        },
    );
    session.use_fallback_background();
    assert!(!session.is_tainted());
    assert!(session.export_png().is_ok());
}

#[test]
fn test_tainted_upload_survives_background_reload() {
    init_logging();
    let mut session = Session::new(Profile::circular());
    let ticket = session.begin_upload();
    session
        .complete_upload_image(
            ticket,
            solid(50, 50, RED),
            ImageOrigin::CrossOrigin {
                cors_approved: false,
            },
        )
        .unwrap();

    session.load_background_image(solid(200, 100, BLUE), ImageOrigin::SameOrigin);
    let placement = session.placement();
    assert_close(
        session
            .canvas()
            .get_pixel(placement.x as u32 + 28, placement.y as u32 + 28),
        RED,
    );
    assert!(session.is_tainted());
    assert!(matches!(
        session.export_png(),
        Err(ComposerError::ExportSecurity)
    ));

    session.use_fallback_background();
    assert!(matches!(
        session.export_png(),
        Err(ComposerError::ExportSecurity)
    ));

    // Replacing the subject clears its taint
    let ticket = session.begin_upload();
    session
        .complete_upload_image(ticket, solid(50, 50, GREEN), ImageOrigin::Local)
        .unwrap();
    assert!(!session.is_tainted());
    assert!(session.export_png().is_ok());
}

#[test]
fn test_cors_approved_background_exports() {
    let mut session = Session::new(Profile::circular());
    session.load_background_image(
        solid(200, 100, BLUE),
        ImageOrigin::CrossOrigin {
            cors_approved: true,
        },
    );
    assert!(!session.is_tainted());
    assert!(session.export_png().is_ok());
}

#[test]
fn test_export_png_round_trip() {
    let session = session_with_photo(Profile::rectangular(), solid(300, 200, RED));
    let bytes = session.export_png().unwrap();
    let decoded = raster_core::decode(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (1000, 1000));
    assert!(&decoded == session.canvas());
}

#[test]
fn test_broken_background_uses_fallback() {
    init_logging();
    let mut session = Session::new(Profile::circular());
    let status = session.load_background(b"<html>404 not found</html>", ImageOrigin::SameOrigin);

    assert_eq!(status, BackgroundStatus::Fallback);
    assert_eq!((session.width(), session.height()), (700, 600));
    assert_eq!(session.canvas().get_pixel(3, 3), &Rgba([255, 255, 255, 255]));
    assert!(session.canvas().get_pixel(350, 10)[0] < 30);
    assert_eq!(
        session.actions(),
        ActionState {
            download_enabled: true,
            crop_enabled: false
        }
    );
    assert!(session.export_png().is_ok());
}

#[test]
fn test_background_from_png_bytes() {
    let mut session = Session::new(Profile::circular());
    let bytes = raster_core::encode_png(&solid(640, 480, BLUE)).unwrap();
    assert_eq!(
        session.load_background(&bytes, ImageOrigin::SameOrigin),
        BackgroundStatus::Loaded
    );
    assert_eq!(session.canvas().get_pixel(5, 5), &BLUE);
}

#[test]
fn test_background_reload_refits_subject() {
    let mut session = session_with_photo(Profile::circular(), solid(300, 300, RED));
    assert_eq!(session.subject().map(|s| s.dimensions()), Some((570, 570)));

    session.load_background_image(solid(500, 400, BLUE), ImageOrigin::SameOrigin);
    assert_eq!(session.subject().map(|s| s.dimensions()), Some((285, 285)));
    assert_eq!(session.placement(), Point::new(107.5, 57.5));
}

#[test]
fn test_background_reload_keeps_circular_crop() {
    let mut session = session_with_photo(Profile::circular(), solid(300, 300, RED));
    assert!(session.start_crop());
    // Preview at natural size, (350, 350) to (650, 650)
    drag_select(&mut session, Point::new(500.0, 500.0), Point::new(550.0, 500.0));
    session.confirm_crop().unwrap();

    session.load_background_image(solid(500, 400, BLUE), ImageOrigin::SameOrigin);

    let subject = session.subject().unwrap();
    assert_eq!(subject.dimensions(), (285, 285));
    assert_eq!(subject.get_pixel(2, 2)[3], 0);
    assert_close(subject.get_pixel(142, 142), RED);
}

#[test]
fn test_new_upload_discards_previous_crop() {
    let mut session = session_with_photo(Profile::circular(), solid(300, 300, RED));
    assert!(session.start_crop());
    drag_select(&mut session, Point::new(500.0, 500.0), Point::new(550.0, 500.0));
    session.confirm_crop().unwrap();

    let ticket = session.begin_upload();
    session
        .complete_upload_image(ticket, solid(300, 300, GREEN), ImageOrigin::Local)
        .unwrap();
    session.load_background_image(solid(500, 400, BLUE), ImageOrigin::SameOrigin);

    // Plain fit of the new photo: opaque to the corners
    let subject = session.subject().unwrap();
    assert_eq!(subject.dimensions(), (285, 285));
    assert_close(subject.get_pixel(2, 2), GREEN);
}

#[test]
fn test_stale_upload_is_applied() {
    init_logging();
    let mut session = Session::new(Profile::circular());
    let first = session.begin_upload();
    let second = session.begin_upload();
    assert!(first < second);

    session
        .complete_upload_image(second, solid(100, 100, RED), ImageOrigin::Local)
        .unwrap();
    session
        .complete_upload_image(first, solid(200, 100, BLUE), ImageOrigin::Local)
        .unwrap();

    assert_eq!(session.source().map(|s| s.dimensions()), Some((200, 100)));
}

#[test]
fn test_failed_upload_keeps_previous_subject() {
    let mut session = session_with_photo(Profile::circular(), solid(300, 300, RED));
    let ticket = session.begin_upload();
    let result = session.complete_upload(ticket, b"garbage bytes", ImageOrigin::Local);

    assert!(matches!(result, Err(ComposerError::Raster(_))));
    assert_eq!(session.source().map(|s| s.dimensions()), Some((300, 300)));
}

#[test]
fn test_caption_without_font_draws_nothing() {
    let mut with_caption = Session::new(Profile::circular());
    with_caption.set_caption("Ana Souza");
    let without_caption = Session::new(Profile::circular());

    assert!(with_caption.canvas() == without_caption.canvas());
    assert_eq!(with_caption.caption_lines(), vec!["Ana Souza"]);
}

#[test]
fn test_long_caption_wraps() {
    let mut session = Session::new(Profile::circular());
    // No face: 16px per char against 0.7 * 700 = 490px
    session.set_caption("A very long sentence that definitely exceeds the maximum width allotted");

    let lines = session.caption_lines();
    assert!(lines.len() >= 3, "{lines:?}");
    for line in &lines {
        assert!(line.chars().count() * 16 <= 490, "{line}");
    }
}

#[test]
fn test_json_profile_drives_session() {
    let json = r#"{
        "name": "badge",
        "cropShape": "rectangle",
        "sizing": { "kind": "box", "widthFraction": 0.5, "heightFraction": 0.25 },
        "caption": {
            "fontSize": 20,
            "lineHeight": 24,
            "baselineFraction": 0.9,
            "budget": { "limit": 10 }
        },
        "canvas": { "width": 400, "height": 400 }
    }"#;
    let mut session = Session::new(parse_profile(json).unwrap());

    assert_eq!(session.target_size(), (200, 100));
    assert_eq!(session.set_caption("abcdefghijklmnop"), "abcdefghij");
}
