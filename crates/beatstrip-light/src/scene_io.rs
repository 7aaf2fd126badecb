//! On-disk scene document format.
//!
//! Scenes are persisted as JSON documents mirroring the live object tree:
//! a scene holds palettes and string-keyed effects, an effect holds
//! string-keyed segments. The document structs are decoupled from the
//! live types so that loading can reset runtime-only state (a loaded
//! segment starts back at its initial position with fresh derived
//! fields).

use crate::effect::LightEffect;
use crate::scene::LightScene;
use crate::segment::LightSegment;
use beatstrip_core::config::{DEFAULT_LED_COUNT, DEFAULT_MOVE_RANGE};
use beatstrip_core::PaletteMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(feature = "scene-files")]
use crate::error::Result;
#[cfg(feature = "scene-files")]
use std::path::Path;

fn default_dimmer_time_ratio() -> f32 {
    1.0
}

fn default_gradient_colors() -> Vec<i32> {
    vec![0, -1, -1]
}

fn default_palette_id() -> String {
    "A".to_string()
}

/// Serialized form of one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDoc {
    #[serde(rename = "segment_ID")]
    pub segment_id: i32,
    pub color: Vec<i32>,
    pub transparency: Vec<f32>,
    pub length: Vec<i32>,
    pub move_speed: f32,
    pub move_range: Vec<i32>,
    pub initial_position: i32,
    #[serde(default)]
    pub current_position: f32,
    pub is_edge_reflect: bool,
    pub dimmer_time: Vec<i32>,
    #[serde(default = "default_dimmer_time_ratio")]
    pub dimmer_time_ratio: f32,
    #[serde(default)]
    pub gradient: bool,
    #[serde(default)]
    pub fade: bool,
    #[serde(default = "default_gradient_colors")]
    pub gradient_colors: Vec<i32>,
}

impl SegmentDoc {
    pub fn from_segment(segment: &LightSegment) -> Self {
        Self {
            segment_id: segment.segment_id(),
            color: segment.color().to_vec(),
            transparency: segment.transparency().to_vec(),
            length: segment.length().to_vec(),
            move_speed: segment.move_speed(),
            move_range: segment.move_range().to_vec(),
            initial_position: segment.initial_position(),
            current_position: segment.current_position(),
            is_edge_reflect: segment.is_edge_reflect(),
            dimmer_time: segment.dimmer_time().to_vec(),
            dimmer_time_ratio: segment.dimmer_time_ratio(),
            gradient: segment.gradient(),
            fade: segment.fade(),
            gradient_colors: segment.gradient_colors().to_vec(),
        }
    }

    /// Build the live segment. The stored `current_position` is
    /// discarded: a loaded segment starts at its initial position.
    pub fn into_segment(self) -> LightSegment {
        let move_range = match self.move_range.as_slice() {
            [lo, hi, ..] => [*lo, *hi],
            _ => DEFAULT_MOVE_RANGE,
        };
        let mut segment = LightSegment::new(
            self.segment_id,
            self.color,
            self.transparency,
            self.length,
            self.move_speed,
            move_range,
            self.initial_position,
            self.is_edge_reflect,
            self.dimmer_time,
            self.dimmer_time_ratio,
        );
        segment.set_gradient(self.gradient);
        segment.set_fade(self.fade);
        segment.set_gradient_colors(self.gradient_colors);
        segment.set_current_position(self.initial_position as f32);
        segment
    }
}

/// Serialized form of one effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDoc {
    #[serde(rename = "effect_ID")]
    pub effect_id: i32,
    #[serde(default = "default_led_count")]
    pub led_count: usize,
    pub fps: u32,
    #[serde(default)]
    pub time: f32,
    #[serde(default = "default_palette_id")]
    pub current_palette: String,
    #[serde(default)]
    pub segments: BTreeMap<String, SegmentDoc>,
}

fn default_led_count() -> usize {
    DEFAULT_LED_COUNT
}

impl EffectDoc {
    pub fn from_effect(effect: &LightEffect) -> Self {
        let segments = effect
            .segments()
            .iter()
            .map(|(id, segment)| (id.to_string(), SegmentDoc::from_segment(segment)))
            .collect();
        Self {
            effect_id: effect.effect_id(),
            led_count: effect.led_count(),
            fps: effect.fps(),
            time: 0.0,
            current_palette: effect.current_palette().to_string(),
            segments,
        }
    }

    pub fn into_effect(self) -> LightEffect {
        let mut effect = LightEffect::new(self.effect_id, self.led_count, self.fps.max(1));
        effect.set_current_palette(&self.current_palette);
        for (key, segment_doc) in self.segments {
            let segment_id = key.parse().unwrap_or(segment_doc.segment_id);
            effect.add_segment(segment_id, segment_doc.into_segment());
        }
        effect
    }
}

/// Serialized form of one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDoc {
    #[serde(rename = "scene_ID")]
    pub scene_id: i32,
    #[serde(rename = "current_effect_ID", default)]
    pub current_effect_id: Option<i32>,
    #[serde(default = "default_palette_id")]
    pub current_palette: String,
    #[serde(default)]
    pub palettes: PaletteMap,
    #[serde(default)]
    pub effects: BTreeMap<String, EffectDoc>,
}

impl SceneDoc {
    pub fn from_scene(scene: &LightScene) -> Self {
        let effects = scene
            .effects()
            .iter()
            .map(|(id, effect)| (id.to_string(), EffectDoc::from_effect(effect)))
            .collect();
        Self {
            scene_id: scene.scene_id(),
            current_effect_id: scene.current_effect_id(),
            current_palette: scene.current_palette().to_string(),
            palettes: scene.palettes().clone(),
            effects,
        }
    }

    /// Build the live effect map in document order.
    pub fn build_effects(effects: BTreeMap<String, EffectDoc>) -> BTreeMap<i32, LightEffect> {
        let mut built = BTreeMap::new();
        for (key, effect_doc) in effects {
            let effect_id = key.parse().unwrap_or(effect_doc.effect_id);
            built.insert(effect_id, effect_doc.into_effect());
        }
        built
    }

    /// Build a standalone scene from the document.
    pub fn into_scene(self) -> LightScene {
        let mut scene = LightScene::new(self.scene_id);
        let palettes = if self.palettes.is_empty() {
            None
        } else {
            Some((self.palettes, self.current_palette))
        };
        let effects = Self::build_effects(self.effects);
        scene.replace_effects(effects, self.current_effect_id, palettes);
        scene
    }

    /// Read a scene document from a JSON file.
    #[cfg(feature = "scene-files")]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the scene document as pretty-printed JSON.
    #[cfg(feature = "scene-files")]
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
