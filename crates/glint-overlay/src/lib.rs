//! # Glint Overlay
//!
//! Host glue for the glint effect engine:
//! - TOML configuration with load-or-default semantics
//! - Pattern asset loading (PNG files or procedural fallback)
//! - Pointer input marshaling from the platform hook thread
//! - Fixed-rate tick clock and the assembled tick loop
//!
//! The pieces the OS provides (the click-through window, the global mouse
//! hook, the actual painting backend) plug in at the edges: raw samples go
//! into a [`input::PointerSender`], and draw commands come out through the
//! engine's `Painter` trait.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod app;
pub mod assets;
pub mod config;
pub mod input;
pub mod timing;

pub use app::Overlay;
pub use config::OverlayConfig;
pub use input::{pointer_channel, PointerInputAdapter, PointerSender};
pub use timing::TickClock;
