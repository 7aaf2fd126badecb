//! One movable, dimmable, gradient segment over the LED strip.

use beatstrip_core::{
    apply_brightness, get_palette, interpolate_colors, PaletteMap, PayloadValue, Rgb,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Weak;
use tracing::warn;

/// A contiguous region of LEDs with up to four palette color anchors,
/// three section widths, movement over a bounded range, and an optional
/// fade cycle.
///
/// Segments hold a weak handle to their scene's palette table; RGB
/// resolution falls back to the process-wide palette cache when the scene
/// is gone or never attached.
#[derive(Debug)]
pub struct LightSegment {
    segment_id: i32,
    color: Vec<i32>,
    transparency: Vec<f32>,
    length: Vec<i32>,
    move_speed: f32,
    move_range: [i32; 2],
    initial_position: i32,
    current_position: f32,
    is_edge_reflect: bool,
    dimmer_time: Vec<i32>,
    dimmer_time_ratio: f32,
    time: f32,
    direction: i32,
    gradient: bool,
    fade: bool,
    gradient_colors: Vec<i32>,
    rgb_color: Vec<Rgb>,
    total_length: i32,
    scene_palettes: Weak<RefCell<PaletteMap>>,
}

impl LightSegment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        segment_id: i32,
        color: Vec<i32>,
        transparency: Vec<f32>,
        length: Vec<i32>,
        move_speed: f32,
        move_range: [i32; 2],
        initial_position: i32,
        is_edge_reflect: bool,
        dimmer_time: Vec<i32>,
        dimmer_time_ratio: f32,
    ) -> Self {
        let move_range = [
            move_range[0].min(move_range[1]),
            move_range[0].max(move_range[1]),
        ];
        let total_length = length.iter().sum();
        let mut segment = Self {
            segment_id,
            color,
            transparency,
            length,
            move_speed,
            move_range,
            initial_position,
            current_position: initial_position as f32,
            is_edge_reflect,
            dimmer_time,
            dimmer_time_ratio,
            time: 0.0,
            direction: if move_speed >= 0.0 { 1 } else { -1 },
            gradient: false,
            fade: false,
            gradient_colors: vec![0, -1, -1],
            rgb_color: Vec::new(),
            total_length,
            scene_palettes: Weak::new(),
        };
        segment.rgb_color = segment.calculate_rgb("A");
        segment
    }

    /// Update one keyed parameter from a command payload. A payload whose
    /// shape does not match the parameter is logged and leaves the segment
    /// untouched; unknown parameter names are ignored.
    pub fn update_param(&mut self, param_name: &str, value: &PayloadValue) {
        match param_name {
            "color" => match value.as_vec_int() {
                Ok(indices) => {
                    self.color = indices.to_vec();
                    self.rgb_color = self.calculate_rgb("A");
                }
                Err(e) => warn!(segment = self.segment_id, "bad color payload: {}", e),
            },
            "gradient_colors" => match value.as_vec_int() {
                Ok(indices) => {
                    self.gradient_colors = indices.to_vec();
                    if self.gradient_colors.first() == Some(&1) {
                        self.gradient = true;
                    }
                }
                Err(e) => warn!(
                    segment = self.segment_id,
                    "bad gradient_colors payload: {}", e
                ),
            },
            "gradient" => match value.as_bool() {
                Ok(enabled) => {
                    self.gradient = enabled;
                    if enabled && self.gradient_colors.first() == Some(&0) {
                        self.gradient_colors[0] = 1;
                    }
                }
                Err(e) => warn!(segment = self.segment_id, "bad gradient payload: {}", e),
            },
            "move_range" => match value.as_vec_int() {
                Ok(range) if range.len() >= 2 => {
                    self.move_range = [range[0].min(range[1]), range[0].max(range[1])];
                    self.current_position = self
                        .current_position
                        .clamp(self.move_range[0] as f32, self.move_range[1] as f32);
                }
                Ok(_) => warn!(segment = self.segment_id, "move_range needs two entries"),
                Err(e) => warn!(segment = self.segment_id, "bad move_range payload: {}", e),
            },
            "move_speed" => match value.as_double() {
                Ok(speed) => {
                    self.move_speed = speed as f32;
                    self.direction = if self.move_speed >= 0.0 { 1 } else { -1 };
                }
                Err(e) => warn!(segment = self.segment_id, "bad move_speed payload: {}", e),
            },
            "time" => match value.as_double() {
                Ok(time) => self.time = time as f32,
                Err(e) => warn!(segment = self.segment_id, "bad time payload: {}", e),
            },
            "transparency" => match value.as_vec_double() {
                Ok(values) => {
                    self.transparency = values.iter().map(|v| *v as f32).collect();
                }
                Err(e) => warn!(segment = self.segment_id, "bad transparency payload: {}", e),
            },
            "length" => match value.as_vec_int() {
                Ok(lengths) => {
                    self.length = lengths.to_vec();
                    self.total_length = self.length.iter().sum();
                }
                Err(e) => warn!(segment = self.segment_id, "bad length payload: {}", e),
            },
            "initial_position" => match value.as_int() {
                Ok(position) => self.initial_position = position,
                Err(e) => warn!(
                    segment = self.segment_id,
                    "bad initial_position payload: {}", e
                ),
            },
            "is_edge_reflect" => match value.as_bool() {
                Ok(reflect) => self.is_edge_reflect = reflect,
                Err(e) => warn!(
                    segment = self.segment_id,
                    "bad is_edge_reflect payload: {}", e
                ),
            },
            "dimmer_time" => match value.as_vec_int() {
                Ok(times) => self.dimmer_time = times.to_vec(),
                Err(e) => warn!(segment = self.segment_id, "bad dimmer_time payload: {}", e),
            },
            "dimmer_time_ratio" => match value.as_double() {
                Ok(ratio) => self.dimmer_time_ratio = ratio as f32,
                Err(e) => warn!(
                    segment = self.segment_id,
                    "bad dimmer_time_ratio payload: {}", e
                ),
            },
            "fade" => match value.as_bool() {
                Ok(fade) => self.fade = fade,
                Err(e) => warn!(segment = self.segment_id, "bad fade payload: {}", e),
            },
            _ => {}
        }
    }

    /// Advance the segment by one frame at the given frame rate.
    pub fn update_position(&mut self, fps: u32) {
        let dt = 1.0 / fps as f32;
        self.time += dt;

        let mut new_position = self.current_position + self.move_speed * dt;
        let total_length = self.length.iter().sum::<i32>() as f32;
        let left = self.move_range[0] as f32;
        let right = self.move_range[1] as f32;

        if self.is_edge_reflect {
            if new_position < left {
                let excess = left - new_position;
                new_position = left + excess;
                self.direction = 1;
                self.move_speed = self.move_speed.abs();
            } else if new_position + total_length - 1.0 >= right {
                let excess = new_position + total_length - 1.0 - right;
                new_position = right - total_length + 1.0 - excess;
                self.direction = -1;
                self.move_speed = -self.move_speed.abs();
            }
        } else if new_position < left {
            let overshoot = left - new_position;
            new_position = right - overshoot + 1.0;
        } else if new_position + total_length - 1.0 > right {
            let overshoot = new_position + total_length - 1.0 - right;
            new_position = left + overshoot - 1.0;
        }

        self.current_position = new_position.min(right - total_length + 1.0).max(left);
    }

    /// Resolve the four color indices against a palette: the scene-local
    /// table when available, the runtime cache otherwise. Out-of-range
    /// indices fall back to red, and the result is padded to four entries
    /// by repeating the last one.
    pub fn calculate_rgb(&self, palette_name: &str) -> Vec<Rgb> {
        let palette = self.resolve_palette(palette_name);

        let mut rgb_values: Vec<Rgb> = Vec::with_capacity(4);
        for &index in &self.color {
            let entry = usize::try_from(index)
                .ok()
                .and_then(|i| palette.get(i).copied());
            rgb_values.push(entry.unwrap_or([255, 0, 0]));
        }
        while rgb_values.len() < 4 {
            let last = rgb_values.last().copied().unwrap_or([255, 0, 0]);
            rgb_values.push(last);
        }
        rgb_values
    }

    fn resolve_palette(&self, palette_name: &str) -> Vec<Rgb> {
        if let Some(palettes) = self.scene_palettes.upgrade() {
            if let Some(palette) = palettes.borrow().get(palette_name) {
                return palette.clone();
            }
        }
        get_palette(palette_name)
    }

    /// Recompute and store the cached RGB anchors for `palette_name`.
    pub fn refresh_rgb(&mut self, palette_name: &str) {
        self.rgb_color = self.calculate_rgb(palette_name);
    }

    /// Brightness for the current time within the fade cycle, in `0..=1`.
    ///
    /// With `fade` off or a non-positive cycle length the segment is fully
    /// bright. The cycle boundaries are scaled by `dimmer_time_ratio` and
    /// evaluated in integer milliseconds.
    pub fn apply_dimming(&self) -> f32 {
        if !self.fade || self.dimmer_time.len() < 5 || self.dimmer_time[4] <= 0 {
            return 1.0;
        }

        let ratio = self.dimmer_time_ratio;
        let cycle_time = (self.dimmer_time[4] as f32 * ratio) as i32;
        if cycle_time <= 0 {
            return 1.0;
        }

        let current_ms = ((self.time * 1000.0) as i32) % cycle_time;
        let fade_in_start = (self.dimmer_time[0] as f32 * ratio) as i32;
        let fade_in_end = (self.dimmer_time[1] as f32 * ratio) as i32;
        let fade_out_start = (self.dimmer_time[2] as f32 * ratio) as i32;
        let fade_out_end = (self.dimmer_time[3] as f32 * ratio) as i32;

        if current_ms < fade_in_start {
            0.0
        } else if current_ms < fade_in_end {
            let duration = (fade_in_end - fade_in_start) as f32;
            (current_ms - fade_in_start) as f32 / duration.max(1.0)
        } else if current_ms < fade_out_start {
            1.0
        } else if current_ms < fade_out_end {
            let duration = (fade_out_end - fade_out_start) as f32;
            1.0 - (current_ms - fade_out_start) as f32 / duration.max(1.0)
        } else {
            0.0
        }
    }

    /// Per-LED color and transparency for the LEDs this segment covers,
    /// resolved against `palette`.
    pub fn get_light_data(&self, palette: &[Rgb]) -> BTreeMap<i32, (Rgb, f32)> {
        let mut light_data = BTreeMap::new();
        let brightness = self.apply_dimming();

        let mut colors: Vec<i32> = self.color.iter().take(4).copied().collect();
        while colors.len() < 4 {
            let last = colors.last().copied().unwrap_or(0);
            colors.push(last);
        }

        let mut transparencies: Vec<f32> = self.transparency.iter().take(4).copied().collect();
        while transparencies.len() < 4 {
            let last = transparencies.last().copied().unwrap_or(1.0);
            transparencies.push(last);
        }

        let mut lengths: Vec<i32> = self.length.iter().take(3).copied().collect();
        while lengths.len() < 3 {
            let last = lengths.last().copied().unwrap_or(0);
            lengths.push(last);
        }

        let total_length: i32 = lengths.iter().sum();
        if total_length <= 0 {
            return light_data;
        }

        let base_rgb: Vec<Rgb> = colors
            .iter()
            .map(|&index| {
                usize::try_from(index)
                    .ok()
                    .and_then(|i| palette.get(i).copied())
                    .unwrap_or([255, 0, 0])
            })
            .collect();

        let start_led = self.current_position.floor() as i32;
        let end_led = (self.current_position as f64 + total_length as f64 - 1e-9).floor() as i32;

        for led_index in start_led..=end_led {
            let relative = (led_index as f32 - self.current_position)
                .max(0.0)
                .min(total_length as f32 - 1e-9);

            let (c1, c2, tr1, tr2, t) = if relative < lengths[0] as f32 {
                let t = if lengths[0] > 0 {
                    relative / lengths[0] as f32
                } else {
                    0.0
                };
                (base_rgb[0], base_rgb[1], transparencies[0], transparencies[1], t)
            } else if relative < (lengths[0] + lengths[1]) as f32 {
                let t = if lengths[1] > 0 {
                    (relative - lengths[0] as f32) / lengths[1] as f32
                } else {
                    0.0
                };
                (base_rgb[1], base_rgb[2], transparencies[1], transparencies[2], t)
            } else {
                let t = if lengths[2] > 0 {
                    (relative - (lengths[0] + lengths[1]) as f32) / lengths[2] as f32
                } else {
                    0.0
                };
                (base_rgb[2], base_rgb[3], transparencies[2], transparencies[3], t)
            };

            let t = t.clamp(0.0, 1.0);
            let color = apply_brightness(interpolate_colors(c1, c2, t), brightness);
            let transparency = tr1 + (tr2 - tr1) * t;
            light_data.insert(led_index, (color, transparency));
        }

        light_data
    }

    /// Attach the owning scene's palette table.
    pub fn attach_palettes(&mut self, palettes: Weak<RefCell<PaletteMap>>) {
        self.scene_palettes = palettes;
    }

    pub fn segment_id(&self) -> i32 {
        self.segment_id
    }

    pub fn color(&self) -> &[i32] {
        &self.color
    }

    pub fn transparency(&self) -> &[f32] {
        &self.transparency
    }

    pub fn length(&self) -> &[i32] {
        &self.length
    }

    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    pub fn move_range(&self) -> [i32; 2] {
        self.move_range
    }

    pub fn initial_position(&self) -> i32 {
        self.initial_position
    }

    pub fn current_position(&self) -> f32 {
        self.current_position
    }

    pub fn set_current_position(&mut self, position: f32) {
        self.current_position = position;
    }

    pub fn is_edge_reflect(&self) -> bool {
        self.is_edge_reflect
    }

    pub fn dimmer_time(&self) -> &[i32] {
        &self.dimmer_time
    }

    pub fn dimmer_time_ratio(&self) -> f32 {
        self.dimmer_time_ratio
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }

    pub fn gradient(&self) -> bool {
        self.gradient
    }

    pub fn set_gradient(&mut self, gradient: bool) {
        self.gradient = gradient;
    }

    pub fn fade(&self) -> bool {
        self.fade
    }

    pub fn set_fade(&mut self, fade: bool) {
        self.fade = fade;
    }

    pub fn gradient_colors(&self) -> &[i32] {
        &self.gradient_colors
    }

    pub fn set_gradient_colors(&mut self, gradient_colors: Vec<i32>) {
        self.gradient_colors = gradient_colors;
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    pub fn rgb_color(&self) -> &[Rgb] {
        &self.rgb_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatstrip_core::config::{DEFAULT_DIMMER_TIME, DEFAULT_TRANSPARENCY};

    fn segment(move_speed: f32, move_range: [i32; 2], position: i32) -> LightSegment {
        LightSegment::new(
            1,
            vec![0, 1, 2, 3],
            DEFAULT_TRANSPARENCY.to_vec(),
            vec![1, 0, 0],
            move_speed,
            move_range,
            position,
            true,
            DEFAULT_DIMMER_TIME.to_vec(),
            1.0,
        )
    }

    #[test]
    fn test_reflect_at_right_edge() {
        let mut seg = segment(10.0, [0, 9], 8);
        seg.update_position(10);
        assert_eq!(seg.current_position(), 9.0);
        assert_eq!(seg.direction(), -1);
        assert_eq!(seg.move_speed(), -10.0);
    }

    #[test]
    fn test_reflect_at_left_edge() {
        let mut seg = segment(-20.0, [0, 9], 1);
        seg.update_position(10);
        // new = 1 - 2 = -1, reflected to +1
        assert_eq!(seg.current_position(), 1.0);
        assert_eq!(seg.direction(), 1);
        assert_eq!(seg.move_speed(), 20.0);
    }

    #[test]
    fn test_wrap_around_right_to_left() {
        let mut seg = LightSegment::new(
            1,
            vec![0, 1, 2, 3],
            DEFAULT_TRANSPARENCY.to_vec(),
            vec![1, 0, 0],
            20.0,
            [0, 9],
            8,
            false,
            DEFAULT_DIMMER_TIME.to_vec(),
            1.0,
        );
        seg.update_position(10);
        // new = 10, overshoot 1, wraps to 0
        assert_eq!(seg.current_position(), 0.0);
    }

    #[test]
    fn test_move_range_is_sorted_on_construction() {
        let seg = segment(0.0, [9, 0], 0);
        assert_eq!(seg.move_range(), [0, 9]);
    }

    #[test]
    fn test_calculate_rgb_pads_and_falls_back() {
        let seg = segment(0.0, [0, 9], 0);
        // Default palette A: indices 0..=3
        assert_eq!(
            seg.calculate_rgb("A"),
            vec![[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 0]]
        );

        let mut short = segment(0.0, [0, 9], 0);
        short.update_param("color", &PayloadValue::VecInt(vec![1, 99]));
        let rgb = short.calculate_rgb("A");
        assert_eq!(rgb.len(), 4);
        assert_eq!(rgb[0], [0, 255, 0]);
        // Out-of-range index falls back to red, then pads
        assert_eq!(rgb[1], [255, 0, 0]);
        assert_eq!(rgb[3], [255, 0, 0]);
    }

    #[test]
    fn test_dimming_disabled_without_fade() {
        let seg = segment(0.0, [0, 9], 0);
        assert_eq!(seg.apply_dimming(), 1.0);
    }

    #[test]
    fn test_dimming_envelope() {
        let mut seg = LightSegment::new(
            1,
            vec![0, 0, 0, 0],
            DEFAULT_TRANSPARENCY.to_vec(),
            vec![1, 0, 0],
            0.0,
            [0, 9],
            0,
            true,
            vec![100, 200, 300, 400, 1000],
            1.0,
        );
        seg.set_fade(true);

        seg.set_time(0.05); // 50 ms: before fade-in
        assert_eq!(seg.apply_dimming(), 0.0);

        seg.set_time(0.15); // ~150 ms: around halfway through fade-in
        let rising = seg.apply_dimming();
        assert!(rising > 0.4 && rising < 0.6);

        seg.set_time(0.25); // 250 ms: fully bright
        assert_eq!(seg.apply_dimming(), 1.0);

        seg.set_time(0.35); // ~350 ms: around halfway through fade-out
        let falling = seg.apply_dimming();
        assert!(falling > 0.4 && falling < 0.6);

        seg.set_time(0.5); // 500 ms: dark tail
        assert_eq!(seg.apply_dimming(), 0.0);

        seg.set_time(1.15); // next cycle, fade-in again
        let next_cycle = seg.apply_dimming();
        assert!(next_cycle > 0.4 && next_cycle < 0.6);
    }

    #[test]
    fn test_dimming_stays_in_unit_range() {
        let mut seg = segment(0.0, [0, 9], 0);
        seg.set_fade(true);
        seg.update_param("dimmer_time", &PayloadValue::VecInt(vec![0, 1, 2, 3, 7]));
        for step in 0..200 {
            seg.set_time(step as f32 * 0.013);
            let brightness = seg.apply_dimming();
            assert!((0.0..=1.0).contains(&brightness));
        }
    }

    #[test]
    fn test_light_data_gradient_across_sections() {
        let mut seg = LightSegment::new(
            7,
            vec![0, 1, 1, 1],
            vec![1.0, 0.5, 0.5, 0.5],
            vec![4, 0, 0],
            0.0,
            [0, 9],
            0,
            true,
            DEFAULT_DIMMER_TIME.to_vec(),
            1.0,
        );
        seg.set_fade(false);
        let palette = vec![[200, 0, 0], [0, 200, 0]];
        let data = seg.get_light_data(&palette);
        assert_eq!(data.len(), 4);
        assert_eq!(data[&0].0, [200, 0, 0]);
        assert_eq!(data[&0].1, 1.0);
        // led 2 sits halfway through the first section: t = 0.5
        assert_eq!(data[&2].0, [100, 100, 0]);
        assert!((data[&2].1 - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_light_data_empty_for_zero_length() {
        let mut seg = segment(0.0, [0, 9], 0);
        seg.update_param("length", &PayloadValue::VecInt(vec![0, 0, 0]));
        assert!(seg.get_light_data(&get_palette("A")).is_empty());
    }

    #[test]
    fn test_update_param_rejects_wrong_shape() {
        let mut seg = segment(0.0, [0, 9], 0);
        let before = seg.color().to_vec();
        seg.update_param("color", &PayloadValue::Double(3.0));
        assert_eq!(seg.color(), before.as_slice());
    }

    #[test]
    fn test_update_param_unknown_key_ignored() {
        let mut seg = segment(0.0, [0, 9], 0);
        seg.update_param("no_such_param", &PayloadValue::Int(1));
        assert_eq!(seg.current_position(), 0.0);
    }

    #[test]
    fn test_move_range_update_clamps_position() {
        let mut seg = segment(0.0, [0, 99], 50);
        seg.set_current_position(50.0);
        seg.update_param("move_range", &PayloadValue::VecInt(vec![0, 20]));
        assert_eq!(seg.current_position(), 20.0);
    }

    #[test]
    fn test_move_speed_update_flips_direction() {
        let mut seg = segment(5.0, [0, 9], 0);
        assert_eq!(seg.direction(), 1);
        seg.update_param("move_speed", &PayloadValue::Double(-3.0));
        assert_eq!(seg.direction(), -1);
        assert_eq!(seg.move_speed(), -3.0);
    }

    #[test]
    fn test_gradient_flag_couples_to_gradient_colors() {
        let mut seg = segment(0.0, [0, 9], 0);
        seg.update_param("gradient", &PayloadValue::Bool(true));
        assert!(seg.gradient());
        assert_eq!(seg.gradient_colors()[0], 1);

        let mut seg = segment(0.0, [0, 9], 0);
        seg.update_param("gradient_colors", &PayloadValue::VecInt(vec![1, 0, 2]));
        assert!(seg.gradient());
    }
}
