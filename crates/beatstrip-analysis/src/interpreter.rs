//! Fans one music frame into every detector and aggregates the results.

use crate::detectors::{SectionProgression, SongAlternationDetector};
use crate::flags::MusicalFlags;
use crate::idle::IdleBeatTracker;
use crate::tempo::{DimmerTimeAdaptor, TempoClassifier};
use beatstrip_core::MusicFrame;

/// Owns one instance of each detector and adaptor and runs them in a
/// fixed order per frame.
#[derive(Debug, Default)]
pub struct MusicInterpreter {
    section: SectionProgression,
    song_alternation: SongAlternationDetector,
    idle: IdleBeatTracker,
    dimmer_adaptor: DimmerTimeAdaptor,
    tempo_classifier: TempoClassifier,
    frame_count: u64,
    latest_genre: i32,
    latest_tempo: i32,
}

impl MusicInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one frame: section detectors first, then song alternation,
    /// then the idle tracker (which consumes this frame's detector
    /// results), then the tempo adaptors.
    pub fn update(&mut self, frame: &MusicFrame) {
        self.frame_count += 1;

        let eq_levels = frame.eq_levels();
        self.section
            .update_state(&eq_levels, frame.tempo, frame.tempo_confidence);
        self.song_alternation.update_history(
            &frame.genre_id.to_string(),
            frame.tempo,
            frame.surround_score as f64,
        );

        let any_change = self.section.songhook_flg()
            || self.section.performer_switch_flg()
            || self.section.highlight_flg()
            || self.song_alternation.change_flg();
        self.idle.update(frame.beat, any_change);

        self.dimmer_adaptor.update(frame.tempo);
        self.tempo_classifier.update(frame.tempo);

        self.latest_genre = frame.genre_id;
        self.latest_tempo = frame.tempo as i32;
    }

    /// Aggregate flags for the frame processed by the last `update` call.
    pub fn detect_musical_change_flgs(&self) -> MusicalFlags {
        MusicalFlags {
            highlight_flg: self.section.highlight_flg(),
            songhook_flg: self.section.songhook_flg(),
            performer_switch_flg: self.section.performer_switch_flg(),
            song_alternation_flg: self.song_alternation.change_flg(),
            no_change_4beats_flg: self.idle.no_change_4beats_flg(),
            no_change_8beats_flg: self.idle.no_change_8beats_flg(),
            no_change_16beats_flg: self.idle.no_change_16beats_flg(),
            no_change_32beats_flg: self.idle.no_change_32beats_flg(),
            silence_break_flg: false,
            silence_start_flg: false,
            dimmer_period_percentage: self.dimmer_adaptor.period_percentage(),
            tempo_class: self.tempo_classifier.class(),
            frame: self.frame_count,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn latest_genre(&self) -> i32 {
        self.latest_genre
    }

    pub fn latest_tempo(&self) -> i32 {
        self.latest_tempo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tempo::TempoClass;

    fn steady_frame() -> MusicFrame {
        MusicFrame {
            genre_id: 1,
            tempo: 128.0,
            tempo_confidence: 0.5,
            ..Default::default()
        }
    }

    #[test]
    fn test_bookkeeping() {
        let mut interpreter = MusicInterpreter::new();
        for _ in 0..5 {
            interpreter.update(&steady_frame());
        }
        assert_eq!(interpreter.frame_count(), 5);
        assert_eq!(interpreter.latest_genre(), 1);
        assert_eq!(interpreter.latest_tempo(), 128);
    }

    #[test]
    fn test_steady_input_raises_no_flags() {
        let mut interpreter = MusicInterpreter::new();
        for _ in 0..60 {
            interpreter.update(&steady_frame());
        }
        let flags = interpreter.detect_musical_change_flgs();
        assert!(!flags.songhook_flg);
        assert!(!flags.performer_switch_flg);
        assert!(!flags.highlight_flg);
        assert!(!flags.song_alternation_flg);
        assert!(!flags.silence_break_flg);
        assert!(!flags.silence_start_flg);
        assert_eq!(flags.tempo_class, TempoClass::MidFast);
        assert_eq!(flags.dimmer_period_percentage, 60);
        assert_eq!(flags.frame, 60);
    }

    #[test]
    fn test_song_alternation_flag_propagates() {
        let mut interpreter = MusicInterpreter::new();
        for _ in 0..30 {
            interpreter.update(&steady_frame());
        }
        let mut changed = steady_frame();
        changed.genre_id = 3;
        changed.tempo = 170.0;
        interpreter.update(&changed);
        let flags = interpreter.detect_musical_change_flgs();
        assert!(flags.song_alternation_flg);
    }
}
