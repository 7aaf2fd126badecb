//! Applies routed commands to scenes and emits packed LED frames.

use crate::effect::LightEffect;
use crate::router::{CommandRouter, Route};
use crate::scene::LightScene;
#[cfg(feature = "scene-files")]
use crate::scene_io::SceneDoc;
use crate::segment::LightSegment;
use beatstrip_core::config::{
    DEFAULT_DIMMER_TIME, DEFAULT_FPS, DEFAULT_INITIAL_POSITION, DEFAULT_IS_EDGE_REFLECT,
    DEFAULT_LED_COUNT, DEFAULT_LED_SEP_COUNT, DEFAULT_LENGTH, DEFAULT_MOVE_RANGE,
    DEFAULT_MOVE_SPEED, DEFAULT_TRANSPARENCY, LED_BINARY_ADDRESS,
};
use beatstrip_core::{Command, OutputMessage, PayloadValue, Rgb};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
#[cfg(feature = "scene-files")]
use tracing::error;
use tracing::{debug, info, warn};

#[cfg(feature = "scene-files")]
use beatstrip_core::update_palette_cache;
#[cfg(feature = "scene-files")]
use std::path::Path;

/// Callback receiving packed frames and diagnostics.
pub type OutputCallback = Box<dyn FnMut(&OutputMessage)>;

const DEFAULT_EFFECT_COUNT: i32 = 8;
const DEFAULT_SEGMENT_COUNT: i32 = 10;

/// Owns the scene map, routes incoming commands to scene mutations, and
/// packs the composited LED output into per-group binary buffers at a
/// bounded rate.
pub struct LightController {
    scenes: BTreeMap<i32, LightScene>,
    router: CommandRouter,
    output_callbacks: Vec<OutputCallback>,
    send_binary_enabled: bool,
    binary_send_interval: Duration,
    last_binary_send: Option<Instant>,
}

impl Default for LightController {
    fn default() -> Self {
        Self::new()
    }
}

impl LightController {
    /// A controller with the default scene: id 1, effects 0..=8, ten
    /// default segments per effect. Effect 0 is the stop target of the
    /// `change_effect 0` command.
    pub fn new() -> Self {
        Self::with_scenes(BTreeMap::new())
    }

    /// A controller over the given scenes; an empty map seeds the default
    /// scene.
    pub fn with_scenes(mut scenes: BTreeMap<i32, LightScene>) -> Self {
        if scenes.is_empty() {
            let mut scene = LightScene::new(1);
            Self::create_default_effects(&mut scene);
            scenes.insert(1, scene);
        }
        Self {
            scenes,
            router: CommandRouter::new(),
            output_callbacks: Vec::new(),
            send_binary_enabled: true,
            binary_send_interval: Duration::from_millis(1000 / DEFAULT_FPS as u64),
            last_binary_send: None,
        }
    }

    fn create_default_effects(scene: &mut LightScene) {
        for effect_id in 0..=DEFAULT_EFFECT_COUNT {
            let mut effect = LightEffect::new(effect_id, DEFAULT_LED_COUNT, DEFAULT_FPS);
            Self::create_default_segments(&mut effect);
            scene.add_effect(effect_id, effect);
        }
    }

    fn create_default_segments(effect: &mut LightEffect) {
        for i in 1..=DEFAULT_SEGMENT_COUNT {
            let color_index = i % 6;
            let segment = LightSegment::new(
                i,
                vec![color_index; 4],
                DEFAULT_TRANSPARENCY.to_vec(),
                DEFAULT_LENGTH.to_vec(),
                DEFAULT_MOVE_SPEED,
                DEFAULT_MOVE_RANGE,
                DEFAULT_INITIAL_POSITION,
                DEFAULT_IS_EDGE_REFLECT,
                DEFAULT_DIMMER_TIME.to_vec(),
                1.0,
            );
            effect.add_segment(i, segment);
        }
    }

    /// Register a sink for packed frames and diagnostics.
    pub fn register_output_callback(&mut self, callback: impl FnMut(&OutputMessage) + 'static) {
        self.output_callbacks.push(Box::new(callback));
    }

    fn notify_output(&mut self, messages: &[OutputMessage]) {
        for callback in &mut self.output_callbacks {
            for message in messages {
                callback(message);
            }
        }
    }

    /// Route one command to its handler. Unroutable addresses are logged
    /// and dropped; handler errors never escape.
    pub fn handle_input_data(&mut self, command: &Command) {
        match self.router.route(&command.address) {
            Some(Route::SceneLoadEffects { scene_id }) => {
                self.scene_load_effects(scene_id, command)
            }
            Some(Route::SceneChangeEffect { scene_id }) => {
                self.scene_change_effect(scene_id, command)
            }
            Some(Route::SceneChangePalette { scene_id }) => {
                self.scene_change_palette(scene_id, command)
            }
            Some(Route::SceneEffectSegment {
                scene_id,
                effect_id,
                segment_id,
                param,
            }) => self.scene_effect_segment(scene_id, effect_id, segment_id, &param, command),
            None => warn!(address = %command.address, "no pattern matched for address"),
        }
    }

    fn scene_load_effects(&mut self, scene_id: i32, command: &Command) {
        let file_name = match command.payload.as_str() {
            Ok(name) => name.to_string(),
            Err(e) => {
                warn!(scene = scene_id, "bad load_effects payload: {}", e);
                return;
            }
        };

        #[cfg(feature = "scene-files")]
        {
            if !self.scenes.contains_key(&scene_id) {
                warn!(scene = scene_id, "scene not found");
                return;
            }
            match SceneDoc::load(Path::new(&file_name)) {
                Ok(doc) => {
                    self.apply_scene_doc(scene_id, doc);
                    info!(scene = scene_id, file = %file_name, "scene effects loaded");
                }
                Err(e) => {
                    error!(scene = scene_id, file = %file_name, "failed to load scene: {}", e);
                }
            }
        }

        #[cfg(not(feature = "scene-files"))]
        {
            info!(scene = scene_id, file = %file_name, "scene load requested on a target without file support");
            let message = OutputMessage::new(
                format!("/scene/{}/load_error", scene_id),
                PayloadValue::String("File operations not supported".to_string()),
            );
            self.notify_output(&[message]);
        }
    }

    #[cfg(feature = "scene-files")]
    fn apply_scene_doc(&mut self, scene_id: i32, doc: SceneDoc) {
        for (palette_id, colors) in &doc.palettes {
            update_palette_cache(palette_id, colors.clone());
            debug!(palette = %palette_id, entries = colors.len(), "palette cached");
        }

        let palettes = if doc.palettes.is_empty() {
            None
        } else {
            Some((doc.palettes, doc.current_palette))
        };
        let effects = SceneDoc::build_effects(doc.effects);

        if let Some(scene) = self.scenes.get_mut(&scene_id) {
            scene.replace_effects(effects, doc.current_effect_id, palettes);
        }
    }

    fn scene_change_effect(&mut self, scene_id: i32, command: &Command) {
        let effect_id = match command.payload.as_int() {
            Ok(id) => id,
            Err(e) => {
                warn!(scene = scene_id, "bad change_effect payload: {}", e);
                return;
            }
        };
        let scene = match self.scenes.get_mut(&scene_id) {
            Some(scene) => scene,
            None => {
                warn!(scene = scene_id, "scene not found");
                return;
            }
        };
        if scene.effect(effect_id).is_none() {
            warn!(scene = scene_id, effect = effect_id, "effect not found");
            return;
        }
        if scene.current_effect_id() == Some(effect_id) {
            debug!(scene = scene_id, effect = effect_id, "effect already active");
            return;
        }
        scene.set_transition_params(Some(effect_id), None, 0.0, 0.0);
        info!(scene = scene_id, effect = effect_id, "effect transition started");
    }

    fn scene_change_palette(&mut self, scene_id: i32, command: &Command) {
        let palette_id = match command.payload.as_str() {
            Ok(id) => id.to_string(),
            Err(e) => {
                warn!(scene = scene_id, "bad change_palette payload: {}", e);
                return;
            }
        };
        let scene = match self.scenes.get_mut(&scene_id) {
            Some(scene) => scene,
            None => {
                warn!(scene = scene_id, "scene not found");
                return;
            }
        };
        let known = scene.palettes().contains_key(&palette_id);
        if !known {
            warn!(scene = scene_id, palette = %palette_id, "palette not found");
            return;
        }
        scene.set_transition_params(None, Some(palette_id.clone()), 0.0, 0.0);
        info!(scene = scene_id, palette = %palette_id, "palette transition started");
    }

    fn scene_effect_segment(
        &mut self,
        scene_id: i32,
        effect_id: i32,
        segment_id: i32,
        param: &str,
        command: &Command,
    ) {
        let scene = match self.scenes.get_mut(&scene_id) {
            Some(scene) => scene,
            None => {
                warn!(scene = scene_id, "scene not found");
                return;
            }
        };
        let effect = match scene.effect_mut(effect_id) {
            Some(effect) => effect,
            None => {
                warn!(scene = scene_id, effect = effect_id, "effect not found");
                return;
            }
        };
        if !effect.segments().contains_key(&segment_id) {
            warn!(
                effect = effect_id,
                segment = segment_id,
                "segment not found"
            );
            return;
        }

        match param {
            "color" => match command.payload.as_vec_int() {
                Ok(indices) => {
                    effect.update_segment_param(segment_id, "color", &command.payload);
                    debug!(segment = segment_id, ?indices, "segment colors updated");
                }
                Err(e) => warn!(segment = segment_id, "bad color payload: {}", e),
            },
            "dimmer_time_ratio" => match command.payload.as_double() {
                Ok(value) => {
                    let ratio = value.max(0.1);
                    effect.update_segment_param(
                        segment_id,
                        "dimmer_time_ratio",
                        &PayloadValue::Double(ratio),
                    );
                }
                Err(e) => warn!(segment = segment_id, "bad dimmer_time_ratio payload: {}", e),
            },
            other => {
                info!(param = other, "unknown segment parameter, ignoring");
            }
        }
    }

    /// Advance every owned scene by one tick.
    pub fn scene_update(&mut self) {
        for scene in self.scenes.values_mut() {
            scene.update();
        }
    }

    /// Pack and emit the smallest-id scene's LED output, rate limited to
    /// one frame per send interval.
    pub fn send_led_binary_data(&mut self) {
        if !self.send_binary_enabled {
            return;
        }
        let now = Instant::now();
        if let Some(last) = self.last_binary_send {
            if now.duration_since(last) < self.binary_send_interval {
                return;
            }
        }
        self.last_binary_send = Some(now);

        let led_colors = match self.scenes.values().next() {
            Some(scene) => scene.get_led_output(),
            None => return,
        };
        if led_colors.is_empty() {
            return;
        }

        let binary_groups = make_color_binary(&led_colors);
        let mut messages = Vec::new();
        for (group, sep_count) in DEFAULT_LED_SEP_COUNT.iter().enumerate() {
            let buffer = if *sep_count == 0 {
                binary_groups.first()
            } else {
                binary_groups.get(group)
            };
            if let Some(buffer) = buffer {
                if !buffer.is_empty() {
                    messages.push(OutputMessage::new(
                        format!("{}/{}", LED_BINARY_ADDRESS, group),
                        PayloadValue::Bytes(buffer.clone()),
                    ));
                }
            }
        }
        self.notify_output(&messages);
    }

    /// Enable or disable binary frame emission.
    pub fn set_send_binary_enabled(&mut self, enabled: bool) {
        self.send_binary_enabled = enabled;
    }

    /// Override the minimum interval between binary frames.
    pub fn set_binary_send_interval(&mut self, interval: Duration) {
        self.binary_send_interval = interval;
    }

    pub fn scenes(&self) -> &BTreeMap<i32, LightScene> {
        &self.scenes
    }

    pub fn scene(&self, scene_id: i32) -> Option<&LightScene> {
        self.scenes.get(&scene_id)
    }

    pub fn scene_mut(&mut self, scene_id: i32) -> Option<&mut LightScene> {
        self.scenes.get_mut(&scene_id)
    }
}

/// Pack LED colors into per-group byte buffers: 4 bytes `R,G,B,0` per
/// LED, channels clamped to `0..=255`. An empty group packs a single
/// 4-byte zero sentinel.
pub fn make_color_binary(colors: &[Rgb]) -> Vec<Vec<u8>> {
    let mut groups = Vec::with_capacity(DEFAULT_LED_SEP_COUNT.len());
    let mut offset = 0usize;
    for sep_count in DEFAULT_LED_SEP_COUNT {
        let start = offset.min(colors.len());
        let end = (offset + sep_count).min(colors.len());
        let slice = &colors[start..end];

        let mut buffer = Vec::with_capacity(4 * slice.len().max(1));
        if slice.is_empty() {
            buffer.extend_from_slice(&[0, 0, 0, 0]);
        } else {
            for color in slice {
                buffer.push(color[0].clamp(0, 255) as u8);
                buffer.push(color[1].clamp(0, 255) as u8);
                buffer.push(color[2].clamp(0, 255) as u8);
                buffer.push(0);
            }
        }
        groups.push(buffer);
        offset += sep_count;
    }
    groups
}
