//! A collection of segments composited onto one LED strip.

use crate::segment::LightSegment;
use beatstrip_core::{get_palette, PaletteMap, PayloadValue, Rgb};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Weak;
use tracing::debug;

/// Per-frame compositor over an id-ordered set of segments.
///
/// Overlap follows a transparency-weighted "over" rule: a segment with
/// opacity `a` layered on accumulated opacity `b` yields
/// `a + b * (1 - a)`, and the colors are averaged with the same weights.
#[derive(Debug)]
pub struct LightEffect {
    effect_id: i32,
    led_count: usize,
    fps: u32,
    time_step: f32,
    time: f32,
    current_palette: String,
    segments: BTreeMap<i32, LightSegment>,
    scene_palettes: Weak<RefCell<PaletteMap>>,
}

impl LightEffect {
    pub fn new(effect_id: i32, led_count: usize, fps: u32) -> Self {
        Self {
            effect_id,
            led_count,
            fps,
            time_step: 1.0 / fps as f32,
            time: 0.0,
            current_palette: "A".to_string(),
            segments: BTreeMap::new(),
            scene_palettes: Weak::new(),
        }
    }

    /// Add a segment, resolving its colors against the current palette.
    pub fn add_segment(&mut self, segment_id: i32, mut segment: LightSegment) {
        segment.attach_palettes(self.scene_palettes.clone());
        segment.refresh_rgb(&self.current_palette);
        self.segments.insert(segment_id, segment);
    }

    pub fn remove_segment(&mut self, segment_id: i32) {
        self.segments.remove(&segment_id);
    }

    /// Forward a parameter update to one segment. A missing segment id is
    /// reported by the caller; this is a silent no-op here.
    pub fn update_segment_param(&mut self, segment_id: i32, param_name: &str, value: &PayloadValue) {
        if let Some(segment) = self.segments.get_mut(&segment_id) {
            segment.update_param(param_name, value);
        }
    }

    /// Switch this effect's palette and refresh every segment's colors.
    pub fn set_palette(&mut self, palette_id: &str) {
        debug!(effect = self.effect_id, palette = palette_id, "set palette");
        self.current_palette = palette_id.to_string();
        for segment in self.segments.values_mut() {
            segment.refresh_rgb(palette_id);
        }
    }

    /// Advance time and every segment's position by one frame.
    pub fn update_all(&mut self) {
        self.time += self.time_step;
        for segment in self.segments.values_mut() {
            segment.set_time(self.time);
            segment.update_position(self.fps);
        }
    }

    /// Composite all segments into one color per LED.
    pub fn get_led_output(&self) -> Vec<Rgb> {
        let mut led_colors = vec![[0i32; 3]; self.led_count];
        let mut led_transparency = vec![0.0f32; self.led_count];

        let palette = self.resolve_palette();

        for segment in self.segments.values() {
            for (led_index, (segment_color, segment_transparency)) in
                segment.get_light_data(&palette)
            {
                if led_index < 0 || led_index as usize >= self.led_count {
                    continue;
                }
                let i = led_index as usize;
                let current_color = led_colors[i];
                let current_transparency = led_transparency[i];

                let final_transparency = (segment_transparency
                    + current_transparency * (1.0 - segment_transparency))
                    .clamp(0.0, 1.0);

                let final_color = if final_transparency > 1e-6 {
                    let mut color = [0i32; 3];
                    for (k, channel) in color.iter_mut().enumerate() {
                        *channel = ((segment_color[k] as f32 * segment_transparency
                            + current_color[k] as f32
                                * current_transparency
                                * (1.0 - segment_transparency))
                            / final_transparency) as i32;
                        *channel = (*channel).clamp(0, 255);
                    }
                    color
                } else {
                    [0, 0, 0]
                };

                led_colors[i] = final_color;
                led_transparency[i] = final_transparency;
            }
        }

        for color in &mut led_colors {
            for channel in color.iter_mut() {
                *channel = (*channel).clamp(0, 255);
            }
        }
        led_colors
    }

    fn resolve_palette(&self) -> Vec<Rgb> {
        if let Some(palettes) = self.scene_palettes.upgrade() {
            if let Some(palette) = palettes.borrow().get(&self.current_palette) {
                return palette.clone();
            }
        }
        get_palette(&self.current_palette)
    }

    /// Attach the owning scene's palette table, propagating it to every
    /// segment.
    pub fn attach_palettes(&mut self, palettes: Weak<RefCell<PaletteMap>>) {
        for segment in self.segments.values_mut() {
            segment.attach_palettes(palettes.clone());
        }
        self.scene_palettes = palettes;
    }

    pub fn effect_id(&self) -> i32 {
        self.effect_id
    }

    pub fn led_count(&self) -> usize {
        self.led_count
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn current_palette(&self) -> &str {
        &self.current_palette
    }

    /// Set the palette id without refreshing segments (used while wiring a
    /// scene together; `set_palette` refreshes).
    pub fn set_current_palette(&mut self, palette_id: &str) {
        self.current_palette = palette_id.to_string();
    }

    pub fn segments(&self) -> &BTreeMap<i32, LightSegment> {
        &self.segments
    }

    pub fn segments_mut(&mut self) -> &mut BTreeMap<i32, LightSegment> {
        &mut self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatstrip_core::config::{DEFAULT_DIMMER_TIME, DEFAULT_TRANSPARENCY};

    fn still_segment(id: i32, color_index: i32, transparency: f32, position: i32) -> LightSegment {
        LightSegment::new(
            id,
            vec![color_index; 4],
            vec![transparency; 4],
            vec![1, 0, 0],
            0.0,
            [0, 9],
            position,
            true,
            DEFAULT_DIMMER_TIME.to_vec(),
            1.0,
        )
    }

    #[test]
    fn test_overlap_compositing() {
        // Reproduce the two-segment overlap: A = (100,0,0) at 0.5 over
        // nothing, then B = (0,100,0) at 0.5 over A
        let mut effect = LightEffect::new(1, 1, 20);
        let mut scene_palettes = PaletteMap::new();
        scene_palettes.insert("A".to_string(), vec![[100, 0, 0], [0, 100, 0]]);
        let palettes = std::rc::Rc::new(RefCell::new(scene_palettes));
        effect.attach_palettes(std::rc::Rc::downgrade(&palettes));

        effect.add_segment(1, still_segment(1, 0, 0.5, 0));
        effect.add_segment(2, still_segment(2, 1, 0.5, 0));

        let output = effect.get_led_output();
        assert_eq!(output.len(), 1);
        assert_eq!(output[0], [33, 66, 0]);
    }

    #[test]
    fn test_output_channels_stay_in_range() {
        let mut effect = LightEffect::new(1, 10, 20);
        for id in 1..=5 {
            effect.add_segment(id, still_segment(id, id % 6, 1.0, id));
        }
        for _ in 0..40 {
            effect.update_all();
            for color in effect.get_led_output() {
                for channel in color {
                    assert!((0..=255).contains(&channel));
                }
            }
        }
    }

    #[test]
    fn test_empty_effect_is_black() {
        let effect = LightEffect::new(1, 4, 20);
        assert_eq!(effect.get_led_output(), vec![[0, 0, 0]; 4]);
    }

    #[test]
    fn test_opaque_higher_id_wins() {
        let mut effect = LightEffect::new(1, 1, 20);
        let mut scene_palettes = PaletteMap::new();
        scene_palettes.insert("A".to_string(), vec![[200, 0, 0], [0, 200, 0]]);
        let palettes = std::rc::Rc::new(RefCell::new(scene_palettes));
        effect.attach_palettes(std::rc::Rc::downgrade(&palettes));

        effect.add_segment(1, still_segment(1, 0, 1.0, 0));
        effect.add_segment(2, still_segment(2, 1, 1.0, 0));
        assert_eq!(effect.get_led_output()[0], [0, 200, 0]);
    }

    #[test]
    fn test_out_of_strip_leds_are_dropped() {
        let mut effect = LightEffect::new(1, 2, 20);
        // Segment parked past the strip end
        let mut segment = still_segment(1, 0, 1.0, 0);
        segment.set_current_position(8.0);
        effect.add_segment(1, segment);
        assert_eq!(effect.get_led_output(), vec![[0, 0, 0]; 2]);
    }

    #[test]
    fn test_update_all_advances_time_and_positions() {
        let mut effect = LightEffect::new(1, 10, 20);
        let moving = LightSegment::new(
            1,
            vec![0, 0, 0, 0],
            DEFAULT_TRANSPARENCY.to_vec(),
            vec![1, 0, 0],
            20.0,
            [0, 9],
            0,
            true,
            DEFAULT_DIMMER_TIME.to_vec(),
            1.0,
        );
        effect.add_segment(1, moving);
        effect.update_all();
        assert!((effect.time() - 0.05).abs() < 1e-6);
        let segment = &effect.segments()[&1];
        assert!((segment.current_position() - 1.0).abs() < 1e-6);
    }
}
