//! A collection of effects with palette ownership and transition state.

use crate::effect::LightEffect;
use beatstrip_core::{default_palettes, PaletteMap, Rgb};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, info};

/// Owns its effects and the scene-local palette table. Effects and
/// segments reach the table through weak handles, so replacing or
/// dropping the scene can never be kept alive from below.
///
/// At most one effect transition and one palette transition can be
/// pending; both share the transition timer, which advances only inside
/// [`update`](LightScene::update).
#[derive(Debug)]
pub struct LightScene {
    scene_id: i32,
    effects: BTreeMap<i32, LightEffect>,
    current_effect_id: Option<i32>,
    palettes: Rc<RefCell<PaletteMap>>,
    current_palette: String,
    next_effect_idx: Option<i32>,
    next_palette_idx: Option<String>,
    fade_in_time: f32,
    fade_out_time: f32,
    transition_start_time: f32,
    effect_transition_active: bool,
    palette_transition_active: bool,
}

impl LightScene {
    pub fn new(scene_id: i32) -> Self {
        Self {
            scene_id,
            effects: BTreeMap::new(),
            current_effect_id: None,
            palettes: Rc::new(RefCell::new(default_palettes())),
            current_palette: "A".to_string(),
            next_effect_idx: None,
            next_palette_idx: None,
            fade_in_time: 0.0,
            fade_out_time: 0.0,
            transition_start_time: 0.0,
            effect_transition_active: false,
            palette_transition_active: false,
        }
    }

    /// Add an effect; the first one added becomes current.
    pub fn add_effect(&mut self, effect_id: i32, mut effect: LightEffect) {
        effect.attach_palettes(Rc::downgrade(&self.palettes));
        effect.set_current_palette(&self.current_palette);
        self.effects.insert(effect_id, effect);
        if self.current_effect_id.is_none() {
            self.current_effect_id = Some(effect_id);
        }
    }

    /// Remove an effect; if it was current, the lowest remaining id takes
    /// over.
    pub fn remove_effect(&mut self, effect_id: i32) {
        if self.effects.remove(&effect_id).is_some()
            && self.current_effect_id == Some(effect_id)
        {
            self.current_effect_id = self.effects.keys().next().copied();
        }
    }

    /// Make `effect_id` current if it exists.
    pub fn switch_effect(&mut self, effect_id: i32) {
        if self.effects.contains_key(&effect_id) {
            self.current_effect_id = Some(effect_id);
        }
    }

    /// Change the current palette for every effect, refreshing segment
    /// colors. Unknown palette ids are ignored.
    pub fn set_palette(&mut self, palette_id: &str) {
        let known = self.palettes.borrow().contains_key(palette_id);
        if !known {
            return;
        }
        info!(scene = self.scene_id, palette = palette_id, "set palette");
        self.current_palette = palette_id.to_string();
        for effect in self.effects.values_mut() {
            effect.set_palette(palette_id);
        }
    }

    /// Replace the colors of one palette; a live palette re-propagates.
    pub fn update_palette(&mut self, palette_id: &str, colors: Vec<Rgb>) {
        let known = self.palettes.borrow().contains_key(palette_id);
        if !known {
            return;
        }
        self.palettes
            .borrow_mut()
            .insert(palette_id.to_string(), colors);
        if palette_id == self.current_palette {
            let current = self.current_palette.clone();
            self.set_palette(&current);
        }
    }

    /// Replace the whole palette table at once.
    pub fn update_all_palettes(&mut self, new_palettes: PaletteMap) {
        *self.palettes.borrow_mut() = new_palettes;
        let current_known = self.palettes.borrow().contains_key(&self.current_palette);
        if current_known {
            let current = self.current_palette.clone();
            self.set_palette(&current);
        } else {
            let first = self.palettes.borrow().keys().next().cloned();
            if let Some(palette_id) = first {
                self.current_palette = palette_id.clone();
                self.set_palette(&palette_id);
            }
        }
    }

    /// Arm a transition. Passing `Some` for either target activates the
    /// corresponding transition and resets the shared timer.
    pub fn set_transition_params(
        &mut self,
        next_effect_idx: Option<i32>,
        next_palette_idx: Option<String>,
        fade_in_time: f32,
        fade_out_time: f32,
    ) {
        self.effect_transition_active = next_effect_idx.is_some();
        self.palette_transition_active = next_palette_idx.is_some();
        self.next_effect_idx = next_effect_idx;
        self.next_palette_idx = next_palette_idx;
        self.fade_in_time = fade_in_time;
        self.fade_out_time = fade_out_time;
        self.transition_start_time = 0.0;
    }

    /// One tick: advance pending transitions, then the current effect.
    pub fn update(&mut self) {
        let tick = self.current_effect_tick();

        if self.effect_transition_active {
            self.transition_start_time += tick;
            if self.transition_start_time >= self.fade_out_time + self.fade_in_time {
                if let Some(next) = self.next_effect_idx {
                    if self.effects.contains_key(&next) {
                        debug!(scene = self.scene_id, effect = next, "effect transition");
                        self.switch_effect(next);
                    }
                }
                self.effect_transition_active = false;
                self.next_effect_idx = None;
                self.transition_start_time = 0.0;
            }
        }

        if self.palette_transition_active {
            self.transition_start_time += self.current_effect_tick();
            if self.transition_start_time >= self.fade_out_time + self.fade_in_time {
                if let Some(next) = self.next_palette_idx.take() {
                    debug!(scene = self.scene_id, palette = %next, "palette transition");
                    self.set_palette(&next);
                }
                self.palette_transition_active = false;
                self.transition_start_time = 0.0;
            }
        }

        if let Some(current) = self.current_effect_id {
            if let Some(effect) = self.effects.get_mut(&current) {
                effect.update_all();
            }
        }
    }

    fn current_effect_tick(&self) -> f32 {
        self.current_effect_id
            .and_then(|id| self.effects.get(&id))
            .map(|effect| 1.0 / effect.fps() as f32)
            .unwrap_or(0.0)
    }

    /// Composite output of the current effect; empty without one.
    pub fn get_led_output(&self) -> Vec<Rgb> {
        self.current_effect_id
            .and_then(|id| self.effects.get(&id))
            .map(LightEffect::get_led_output)
            .unwrap_or_default()
    }

    /// Swap in a freshly loaded effect set, then re-resolve palettes.
    ///
    /// `palettes` carries the loaded table and its current palette id when
    /// the document provided one; otherwise the existing table is kept.
    pub fn replace_effects(
        &mut self,
        effects: BTreeMap<i32, LightEffect>,
        current_effect_id: Option<i32>,
        palettes: Option<(PaletteMap, String)>,
    ) {
        self.effects.clear();
        for (effect_id, mut effect) in effects {
            effect.attach_palettes(Rc::downgrade(&self.palettes));
            self.effects.insert(effect_id, effect);
        }
        self.current_effect_id = current_effect_id.or_else(|| self.effects.keys().next().copied());

        if let Some((new_palettes, new_current)) = palettes {
            *self.palettes.borrow_mut() = new_palettes;
            self.current_palette = new_current;
        }
        let current = self.current_palette.clone();
        self.set_palette(&current);
    }

    pub fn scene_id(&self) -> i32 {
        self.scene_id
    }

    pub fn set_scene_id(&mut self, scene_id: i32) {
        self.scene_id = scene_id;
    }

    pub fn current_effect_id(&self) -> Option<i32> {
        self.current_effect_id
    }

    pub fn set_current_effect_id(&mut self, effect_id: Option<i32>) {
        self.current_effect_id = effect_id;
    }

    pub fn effects(&self) -> &BTreeMap<i32, LightEffect> {
        &self.effects
    }

    pub fn effect(&self, effect_id: i32) -> Option<&LightEffect> {
        self.effects.get(&effect_id)
    }

    pub fn effect_mut(&mut self, effect_id: i32) -> Option<&mut LightEffect> {
        self.effects.get_mut(&effect_id)
    }

    pub fn palettes(&self) -> std::cell::Ref<'_, PaletteMap> {
        self.palettes.borrow()
    }

    pub fn current_palette(&self) -> &str {
        &self.current_palette
    }

    pub fn effect_transition_active(&self) -> bool {
        self.effect_transition_active
    }

    pub fn palette_transition_active(&self) -> bool {
        self.palette_transition_active
    }
}
