//! Compose a certificate from files on disk
//! Run with: cargo run -p composer --example compose_certificate -- \
//!     <background> <photo> <font.ttf> [caption] [--rectangular]
//!
//! Steps:
//! 1. Load background, font and photo
//! 2. Crop the middle of the photo
//! 3. Drag the subject a little to the right
//! 4. Write output/certificate.png

use anyhow::{bail, Context};
use composer::{DisplayRect, ImageOrigin, Point, Profile, Session};
use std::fs;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let rectangular = args.iter().any(|arg| arg == "--rectangular");
    args.retain(|arg| arg != "--rectangular");

    if args.len() < 3 {
        bail!("usage: compose_certificate <background> <photo> <font.ttf> [caption] [--rectangular]");
    }
    let caption = args.get(3).map(String::as_str).unwrap_or("Ana Souza");

    println!("=== Certificate Composer ===\n");

    let profile = if rectangular {
        Profile::rectangular()
    } else {
        Profile::circular()
    };
    let mut session = Session::new(profile);

    // Step 1: Load assets
    let background = fs::read(&args[0]).with_context(|| format!("reading {}", args[0]))?;
    let status = session.load_background(&background, ImageOrigin::Local);
    println!("1. Background: {:?} ({}x{})", status, session.width(), session.height());

    let font = fs::read(&args[2]).with_context(|| format!("reading {}", args[2]))?;
    session.load_caption_font(font)?;

    let photo = fs::read(&args[1]).with_context(|| format!("reading {}", args[1]))?;
    let ticket = session.begin_upload();
    session.complete_upload(ticket, &photo, ImageOrigin::Local)?;
    println!("   Photo fitted to {:?}", session.target_size());

    session.set_caption(caption);
    println!("   Caption: {} ({})", caption, session.caption_counter());

    // Step 2: Crop, using a display rect that matches the canvas 1:1
    let display = DisplayRect::new(0.0, 0.0, session.width() as f64, session.height() as f64);
    if session.start_crop() {
        let center = Point::new(session.width() as f64 / 2.0, session.height() as f64 / 2.0);
        let reach = session.width().min(session.height()) as f64 / 5.0;
        session.pointer_down(center, display);
        session.pointer_move(Point::new(center.x + reach, center.y + reach), display);
        session.pointer_up();
        session.confirm_crop()?;
        println!("2. Cropped around the center");
    }

    // Step 3: Drag
    let start = session.placement();
    let grab = Point::new(start.x + 5.0, start.y + 5.0);
    session.pointer_down(grab, display);
    session.pointer_move(Point::new(grab.x + 40.0, grab.y), display);
    session.pointer_up();
    println!("3. Subject moved from {:?} to {:?}", start, session.placement());

    // Step 4: Export
    fs::create_dir_all("output")?;
    let png = session.export_png()?;
    fs::write("output/certificate.png", &png)?;
    println!("4. Saved {} bytes -> output/certificate.png", png.len());

    Ok(())
}
