//! Aggregate musical flags and their lighting-intent projection.

use crate::tempo::TempoClass;

/// Per-frame musical change flags emitted by the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub struct MusicalFlags {
    pub highlight_flg: bool,
    pub songhook_flg: bool,
    pub performer_switch_flg: bool,
    pub song_alternation_flg: bool,
    pub no_change_4beats_flg: bool,
    pub no_change_8beats_flg: bool,
    pub no_change_16beats_flg: bool,
    pub no_change_32beats_flg: bool,
    /// Reserved: the silence detector is not wired up yet, always false
    pub silence_break_flg: bool,
    /// Reserved: the silence detector is not wired up yet, always false
    pub silence_start_flg: bool,
    pub dimmer_period_percentage: i32,
    pub tempo_class: TempoClass,
    pub frame: u64,
}

impl Default for MusicalFlags {
    fn default() -> Self {
        Self {
            highlight_flg: false,
            songhook_flg: false,
            performer_switch_flg: false,
            song_alternation_flg: false,
            no_change_4beats_flg: false,
            no_change_8beats_flg: false,
            no_change_16beats_flg: false,
            no_change_32beats_flg: false,
            silence_break_flg: false,
            silence_start_flg: false,
            dimmer_period_percentage: 100,
            tempo_class: TempoClass::Mid,
            frame: 0,
        }
    }
}

/// Discrete lighting intents derived from the musical flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightingFlags {
    pub lighting_start_flg: bool,
    pub lighting_end_flg: bool,
    pub lighting_scene_change_flg: bool,
    pub palette_change_flg: bool,
    pub effect_change_flg: bool,
    pub color_shift_flg: bool,
}

/// Stateless projection of musical change flags onto lighting intents.
pub fn make_lighting_flags(musical: &MusicalFlags) -> LightingFlags {
    LightingFlags {
        lighting_start_flg: musical.silence_break_flg,
        lighting_end_flg: musical.silence_start_flg,
        lighting_scene_change_flg: musical.song_alternation_flg,
        palette_change_flg: musical.no_change_16beats_flg,
        effect_change_flg: musical.no_change_8beats_flg,
        color_shift_flg: musical.no_change_4beats_flg,
    }
}
