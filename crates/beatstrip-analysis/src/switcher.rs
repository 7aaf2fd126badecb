//! Lighting switcher: turns lighting intents into address-tagged commands.

use crate::flags::{make_lighting_flags, LightingFlags, MusicalFlags};
use beatstrip_core::{Command, PayloadValue};
use tracing::{info, warn};

/// Segments addressed by the switcher per effect.
const SEGMENT_NUM: usize = 10;

/// Color indices cycle within the first five palette entries.
const PALETTE_CYCLE: i32 = 5;

/// Holds the rotation state (palette, effect, per-segment colors) and
/// emits at most one command branch per frame, in precedence order:
/// start > end > scene change > palette change > effect change > color
/// shift.
#[derive(Debug)]
pub struct LightingSwitcher {
    genre_id: i32,
    tempo: i32,
    current_effect_id: i32,
    current_palette_index: usize,
    current_effect_index: usize,
    segment_color_ids: Vec<[i32; 4]>,
    effect_ids: Vec<i32>,
    palette_ids: Vec<&'static str>,
    scene_file_names: Vec<&'static str>,
    tempo_anchor: [f64; 5],
    dimmer_time_ratio_anchor: [f64; 5],
    light_switch_flgs: LightingFlags,
}

impl Default for LightingSwitcher {
    fn default() -> Self {
        Self::new()
    }
}

impl LightingSwitcher {
    pub fn new() -> Self {
        Self {
            genre_id: 1,
            tempo: 0,
            current_effect_id: 1,
            current_palette_index: 0,
            current_effect_index: 0,
            segment_color_ids: vec![[-1; 4]; SEGMENT_NUM],
            effect_ids: (1..=8).collect(),
            palette_ids: vec!["A", "B", "C", "D", "E"],
            scene_file_names: vec![
                "test_effects.json",
                "classic.json",
                "dance.json",
                "jazz.json",
                "pop&rock.json",
            ],
            tempo_anchor: [60.0, 80.0, 100.0, 120.0, 140.0],
            dimmer_time_ratio_anchor: [3.0, 1.0, 0.7, 0.5, 0.3],
            light_switch_flgs: LightingFlags::default(),
        }
    }

    pub fn update_genre(&mut self, genre_id: i32) {
        self.genre_id = genre_id;
    }

    pub fn update_tempo(&mut self, tempo: i32) {
        self.tempo = tempo;
    }

    /// Project this frame's musical flags onto lighting intents.
    pub fn update_light_switch_flgs(&mut self, musical: &MusicalFlags) {
        self.light_switch_flgs = make_lighting_flags(musical);
    }

    /// Emit the commands for the highest-precedence active intent.
    /// Exactly one branch fires per call, or none.
    pub fn light_switch_flag(&mut self) -> Vec<Command> {
        let flgs = self.light_switch_flgs;
        let mut commands = Vec::new();

        if flgs.lighting_start_flg {
            info!("lighting start");
            commands.push(Command::new(
                "/scene/1/load_effects",
                PayloadValue::String(self.scene_file_for_genre()),
            ));
        } else if flgs.lighting_end_flg {
            info!("lighting end");
            commands.push(Command::new("/scene/1/change_effect", PayloadValue::Int(0)));
        } else if flgs.lighting_scene_change_flg {
            info!("scene change");
            commands.push(Command::new(
                "/scene/1/load_effects",
                PayloadValue::String(self.scene_file_for_genre()),
            ));
        } else if flgs.palette_change_flg {
            let next_palette_id = self.next_palette_id();
            info!(palette = next_palette_id, "palette change");
            commands.push(Command::new(
                "/scene/1/change_palette",
                PayloadValue::String(next_palette_id.to_string()),
            ));
        } else if flgs.effect_change_flg {
            let next_effect_id = self.next_effect_id();
            info!(effect = next_effect_id, "effect change");
            commands.push(Command::new(
                "/scene/1/change_effect",
                PayloadValue::Int(next_effect_id),
            ));
            self.current_effect_id = next_effect_id;
        } else if flgs.color_shift_flg {
            info!("color shift");
            for (seg_id, colors) in self.segment_color_ids.iter_mut().enumerate() {
                for color in colors.iter_mut() {
                    *color = (*color + 1) % PALETTE_CYCLE;
                }
                commands.push(Command::new(
                    format!(
                        "/scene/1/effect/{}/segment/{}/color",
                        self.current_effect_id, seg_id
                    ),
                    PayloadValue::VecInt(colors.to_vec()),
                ));
            }
        }

        commands
    }

    /// Per-segment dimmer ratio commands; scheduled by the caller every 50
    /// frames. Segments are addressed 1-based here.
    pub fn adopt_dimmer_time_to_tempo(&self) -> Vec<Command> {
        let ratio = self.calc_dimmer_time_ratio();
        (0..SEGMENT_NUM)
            .map(|i| {
                Command::new(
                    format!(
                        "/scene/1/effect/{}/segment/{}/dimmer_time_ratio",
                        self.current_effect_id,
                        i + 1
                    ),
                    PayloadValue::Double(ratio),
                )
            })
            .collect()
    }

    /// Piecewise-linear interpolation of the dimmer ratio over the tempo
    /// anchors, clamped to the endpoints outside the anchor range.
    pub fn calc_dimmer_time_ratio(&self) -> f64 {
        let tempo = self.tempo as f64;
        let anchors = &self.tempo_anchor;
        let ratios = &self.dimmer_time_ratio_anchor;

        if tempo < anchors[0] {
            return ratios[0];
        }
        if tempo > anchors[anchors.len() - 1] {
            return ratios[ratios.len() - 1];
        }
        for i in 0..anchors.len() - 1 {
            if tempo <= anchors[i + 1] {
                let a = anchors[i];
                let b = anchors[i + 1];
                return ((b - tempo) * ratios[i] + (tempo - a) * ratios[i + 1]) / (b - a);
            }
        }
        1.0
    }

    fn scene_file_for_genre(&self) -> String {
        let name = usize::try_from(self.genre_id)
            .ok()
            .and_then(|i| self.scene_file_names.get(i));
        match name {
            Some(name) => name.to_string(),
            None => {
                warn!(
                    genre = self.genre_id,
                    "genre id outside the scene file table, using the first entry"
                );
                self.scene_file_names[0].to_string()
            }
        }
    }

    fn next_palette_id(&mut self) -> &'static str {
        self.current_palette_index = (self.current_palette_index + 1) % self.palette_ids.len();
        self.palette_ids[self.current_palette_index]
    }

    fn next_effect_id(&mut self) -> i32 {
        self.current_effect_index = (self.current_effect_index + 1) % self.effect_ids.len();
        self.effect_ids[self.current_effect_index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(set: impl Fn(&mut MusicalFlags)) -> MusicalFlags {
        let mut musical = MusicalFlags::default();
        set(&mut musical);
        musical
    }

    #[test]
    fn test_scene_change_takes_precedence_over_palette() {
        let mut switcher = LightingSwitcher::new();
        switcher.update_genre(2);
        switcher.update_light_switch_flgs(&flags(|m| {
            m.song_alternation_flg = true;
            m.no_change_16beats_flg = true;
        }));
        let commands = switcher.light_switch_flag();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].address, "/scene/1/load_effects");
        assert_eq!(
            commands[0].payload,
            PayloadValue::String("dance.json".to_string())
        );
    }

    #[test]
    fn test_no_flags_emits_nothing() {
        let mut switcher = LightingSwitcher::new();
        switcher.update_light_switch_flgs(&MusicalFlags::default());
        assert!(switcher.light_switch_flag().is_empty());
    }

    #[test]
    fn test_lighting_end_targets_effect_zero() {
        let mut switcher = LightingSwitcher::new();
        switcher.update_light_switch_flgs(&flags(|m| m.silence_start_flg = true));
        let commands = switcher.light_switch_flag();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].address, "/scene/1/change_effect");
        assert_eq!(commands[0].payload, PayloadValue::Int(0));
    }

    #[test]
    fn test_palette_rotation_wraps() {
        let mut switcher = LightingSwitcher::new();
        let mut seen = Vec::new();
        for _ in 0..6 {
            switcher.update_light_switch_flgs(&flags(|m| m.no_change_16beats_flg = true));
            let commands = switcher.light_switch_flag();
            if let PayloadValue::String(id) = &commands[0].payload {
                seen.push(id.clone());
            }
        }
        assert_eq!(seen, ["B", "C", "D", "E", "A", "B"]);
    }

    #[test]
    fn test_effect_rotation_updates_current_effect() {
        let mut switcher = LightingSwitcher::new();
        switcher.update_light_switch_flgs(&flags(|m| m.no_change_8beats_flg = true));
        let commands = switcher.light_switch_flag();
        assert_eq!(commands[0].payload, PayloadValue::Int(2));

        // The following color shift addresses the new effect
        switcher.update_light_switch_flgs(&flags(|m| m.no_change_4beats_flg = true));
        let commands = switcher.light_switch_flag();
        assert_eq!(commands.len(), 10);
        assert_eq!(commands[0].address, "/scene/1/effect/2/segment/0/color");
    }

    #[test]
    fn test_color_shift_steps_indices_from_minus_one() {
        let mut switcher = LightingSwitcher::new();
        switcher.update_light_switch_flgs(&flags(|m| m.no_change_4beats_flg = true));
        let commands = switcher.light_switch_flag();
        assert_eq!(commands.len(), 10);
        for command in &commands {
            assert_eq!(command.payload, PayloadValue::VecInt(vec![0, 0, 0, 0]));
        }

        // A second shift advances every index again
        switcher.update_light_switch_flgs(&flags(|m| m.no_change_4beats_flg = true));
        let commands = switcher.light_switch_flag();
        assert_eq!(commands[0].payload, PayloadValue::VecInt(vec![1, 1, 1, 1]));
    }

    #[test]
    fn test_dimmer_ratio_interpolation_and_clamping() {
        let mut switcher = LightingSwitcher::new();
        switcher.update_tempo(50);
        assert_eq!(switcher.calc_dimmer_time_ratio(), 3.0);
        switcher.update_tempo(200);
        assert_eq!(switcher.calc_dimmer_time_ratio(), 0.3);
        switcher.update_tempo(90);
        // Halfway between the (80, 1.0) and (100, 0.7) anchors
        assert!((switcher.calc_dimmer_time_ratio() - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_dimmer_commands_address_segments_one_based() {
        let mut switcher = LightingSwitcher::new();
        switcher.update_tempo(120);
        let commands = switcher.adopt_dimmer_time_to_tempo();
        assert_eq!(commands.len(), 10);
        assert_eq!(
            commands[0].address,
            "/scene/1/effect/1/segment/1/dimmer_time_ratio"
        );
        assert_eq!(
            commands[9].address,
            "/scene/1/effect/1/segment/10/dimmer_time_ratio"
        );
        assert_eq!(commands[0].payload, PayloadValue::Double(0.5));
    }

    #[test]
    fn test_out_of_range_genre_falls_back() {
        let mut switcher = LightingSwitcher::new();
        switcher.update_genre(9);
        switcher.update_light_switch_flgs(&flags(|m| m.song_alternation_flg = true));
        let commands = switcher.light_switch_flag();
        assert_eq!(
            commands[0].payload,
            PayloadValue::String("test_effects.json".to_string())
        );
    }
}
