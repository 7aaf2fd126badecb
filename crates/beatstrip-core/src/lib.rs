//! BeatStrip Core - Shared Domain Model
//!
//! This crate contains the types shared by the two halves of BeatStrip:
//! - Music-analysis input frames
//! - Command-channel payloads (analysis → lighting) and output messages
//!   (lighting → hardware sink)
//! - Color math for the LED compositor
//! - Palettes, including the process-wide runtime palette cache
//! - System-wide configuration defaults

#![warn(missing_docs)]

pub mod color;
pub mod command;
pub mod config;
pub mod frame;
pub mod palette;

pub use color::{apply_brightness, blend_colors, interpolate_colors, Rgb};
pub use command::{Command, OutputMessage, PayloadValue};
pub use frame::MusicFrame;
pub use palette::{default_palettes, get_palette, update_palette_cache, Palette, PaletteMap};

use thiserror::Error;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// A payload did not have the expected shape
    #[error("payload mismatch: expected {expected}, got {got}")]
    PayloadMismatch {
        /// The shape the caller asked for
        expected: &'static str,
        /// The shape actually carried by the payload
        got: &'static str,
    },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
