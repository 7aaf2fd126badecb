//! BeatStrip Analysis - Musical Event Detection and Lighting Switching
//!
//! Consumes per-frame music-analysis features and emits discrete
//! lighting-control commands:
//! - **Feature detectors**: songhook, performer switch, highlight, song
//!   alternation, each scored over its own sliding frame history
//! - **Idle tracking**: beat counting modulo {4, 8, 16, 32}, reset on any
//!   detected musical change
//! - **Tempo adaptors**: tempo class labelling and dimmer-period scaling
//! - **Lighting switcher**: turns the aggregated flags into address-tagged
//!   commands for the lighting block

#![allow(missing_docs)]

pub mod detectors;
pub mod engine;
pub mod flags;
pub mod history;
pub mod idle;
pub mod interpreter;
pub mod switcher;
pub mod tempo;

pub use detectors::{
    HighlightDetector, PerformerSwitchDetector, SectionProgression, SongAlternationDetector,
    SonghookDetector,
};
pub use engine::AnalysisEngine;
pub use flags::{make_lighting_flags, LightingFlags, MusicalFlags};
pub use history::{FrameHistory, Sample};
pub use idle::IdleBeatTracker;
pub use interpreter::MusicInterpreter;
pub use switcher::LightingSwitcher;
pub use tempo::{DimmerTimeAdaptor, TempoClass, TempoClassifier};
