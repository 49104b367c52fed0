//! # Glint Overlay
//!
//! Headless demo entry point: drives the full engine with a synthetic
//! press-drag-release gesture fed from a second thread, exactly the way a
//! platform mouse hook would, and reports draw-command counts instead of
//! painting. A real deployment swaps the stats painter for a platform
//! painter on the click-through overlay window.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::f32::consts::TAU;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use glam::Vec2;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use glint_core::{Painter, PointerSample, Rect, TrailSegment};
use glint_overlay::{pointer_channel, Overlay, OverlayConfig, PointerSender};

/// Painter that counts draw commands instead of rasterizing them.
#[derive(Debug, Default)]
struct StatsPainter {
    frames: usize,
    sprites: usize,
    segments: usize,
}

impl Painter for StatsPainter {
    fn begin_frame(&mut self) {
        self.frames += 1;
    }

    fn sprite(&mut self, _image: &image::RgbaImage, _dest: Rect) {
        self.sprites += 1;
    }

    fn segment(&mut self, _segment: &TrailSegment) {
        self.segments += 1;
    }
}

/// Feeds a scripted press-drag-release circle gesture into the queue.
fn synthetic_gesture(sender: &PointerSender) {
    let started = Instant::now();
    let stamp = move || started.elapsed().as_secs_f64();
    let center = Vec2::new(480.0, 270.0);
    let radius = 120.0;

    let at = |angle: f32| center + radius * Vec2::new(angle.cos(), angle.sin());

    sender.send(PointerSample::new(at(0.0), true, stamp()));
    for i in 1..=90 {
        thread::sleep(Duration::from_millis(8));
        let angle = TAU * i as f32 / 120.0;
        sender.send(PointerSample::new(at(angle), true, stamp()));
    }
    sender.send(PointerSample::new(at(TAU * 0.75), false, stamp()));
    // Dropping the sender afterwards tells the engine input is gone.
}

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("glint=info".parse()?))
        .init();

    info!("Glint overlay starting (headless demo)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = OverlayConfig::load();
    config.validate();

    let (sender, adapter) = pointer_channel(config.input_queue_capacity);
    let gesture = thread::spawn(move || synthetic_gesture(&sender));

    let mut overlay = Overlay::new(&config, adapter)?;
    let mut painter = StatsPainter::default();
    overlay.run(&mut painter, Some(Duration::from_secs(3)));

    if gesture.join().is_err() {
        info!("gesture thread panicked");
    }

    info!(
        frames = painter.frames,
        sprites = painter.sprites,
        segments = painter.segments,
        "demo complete"
    );
    Ok(())
}
