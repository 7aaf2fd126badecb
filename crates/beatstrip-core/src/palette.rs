//! Color palettes and the process-wide runtime palette cache.
//!
//! The cache is initialized from the built-in defaults and mutated only by
//! scene loads; the rendering path reads it when a scene-local palette is
//! not available.

use crate::color::Rgb;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// An ordered list of RGB entries addressed by palette index.
pub type Palette = Vec<Rgb>;

/// Palette id → palette.
pub type PaletteMap = BTreeMap<String, Palette>;

/// Built-in palettes `A`..`E`.
pub fn default_palettes() -> PaletteMap {
    let mut palettes = PaletteMap::new();
    palettes.insert(
        "A".to_string(),
        vec![
            [255, 0, 0],   // Red
            [0, 255, 0],   // Green
            [0, 0, 255],   // Blue
            [255, 255, 0], // Yellow
            [0, 255, 255], // Cyan
            [255, 0, 255], // Magenta
        ],
    );
    palettes.insert(
        "B".to_string(),
        vec![
            [255, 128, 0],   // Orange
            [128, 0, 255],   // Purple
            [0, 128, 255],   // Sky Blue
            [255, 0, 128],   // Pink
            [128, 255, 0],   // Lime
            [255, 255, 255], // White
        ],
    );
    palettes.insert(
        "C".to_string(),
        vec![
            [128, 0, 0],   // Dark Red
            [0, 128, 0],   // Dark Green
            [0, 0, 128],   // Dark Blue
            [128, 128, 0], // Olive
            [0, 128, 128], // Teal
            [128, 0, 128], // Purple
        ],
    );
    palettes.insert(
        "D".to_string(),
        vec![
            [255, 200, 200], // Light Pink
            [200, 255, 200], // Light Green
            [200, 200, 255], // Light Blue
            [255, 255, 200], // Light Yellow
            [200, 255, 255], // Light Cyan
            [255, 200, 255], // Light Magenta
        ],
    );
    palettes.insert(
        "E".to_string(),
        vec![
            [100, 100, 100], // Dark Gray
            [150, 150, 150], // Medium Gray
            [200, 200, 200], // Light Gray
            [255, 100, 50],  // Coral
            [50, 100, 255],  // Royal Blue
            [150, 255, 150], // Light Green
        ],
    );
    palettes
}

static RUNTIME_PALETTE_CACHE: Lazy<RwLock<PaletteMap>> =
    Lazy::new(|| RwLock::new(default_palettes()));

/// Replace one palette in the runtime cache. Called on scene loads only.
pub fn update_palette_cache(palette_id: &str, colors: Palette) {
    if let Ok(mut cache) = RUNTIME_PALETTE_CACHE.write() {
        cache.insert(palette_id.to_string(), colors);
    }
}

/// Look up a palette by id: the runtime cache first, then the built-in
/// defaults, then palette `A`.
pub fn get_palette(palette_id: &str) -> Palette {
    if let Ok(cache) = RUNTIME_PALETTE_CACHE.read() {
        if let Some(palette) = cache.get(palette_id) {
            return palette.clone();
        }
    }
    let defaults = default_palettes();
    if let Some(palette) = defaults.get(palette_id) {
        return palette.clone();
    }
    defaults.get("A").cloned().unwrap_or_default()
}
