//! Song-alternation detection: adjacent-frame genre/tempo/surround jumps.

use super::CooldownGate;
use crate::history::FrameHistory;

const HISTORY_LEN: usize = 30;
const COOLDOWN_FRAMES: i64 = 50;

/// Detects a track change by comparing the two latest samples.
///
/// The change score sums three sub-features:
/// - the genre id differs from the previous frame
/// - the tempo jumped by more than 20 BPM
/// - the surround score jumped by 2 or more
///
/// Genre ids are stored as strings so the comparison is uniform across
/// frontends.
#[derive(Debug)]
pub struct SongAlternationDetector {
    history: FrameHistory,
    gate: CooldownGate,
    genre_change: bool,
    tempo_change: bool,
    surround_change: bool,
    change_score: i32,
    detected: bool,
}

impl Default for SongAlternationDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SongAlternationDetector {
    pub fn new() -> Self {
        Self {
            history: FrameHistory::new(HISTORY_LEN),
            gate: CooldownGate::new(COOLDOWN_FRAMES),
            genre_change: false,
            tempo_change: false,
            surround_change: false,
            change_score: 0,
            detected: false,
        }
    }

    /// Append one frame of features, recompute the change score and latch
    /// the detection result.
    pub fn update_history(&mut self, genre: &str, tempo: f64, surround_score: f64) {
        self.history.append("genre_id", genre);
        self.history.append("tempo", tempo);
        self.history.append("surround_index", surround_score);

        self.calc_feature();

        let current_frame = self.history.size() as i64 - 1;
        self.detected = self.gate.fire(current_frame, self.change_score >= 2);
    }

    fn calc_feature(&mut self) {
        if self.history.size() < HISTORY_LEN {
            self.genre_change = false;
            self.tempo_change = false;
            self.surround_change = false;
            self.change_score = 0;
            return;
        }

        let genre = self.history.texts("genre_id");
        let tempo = self.history.floats("tempo");
        let surround = self.history.floats("surround_index");

        let latest = genre.len() - 1;
        let past = genre.len() - 2;

        self.genre_change = genre[latest] != genre[past];
        self.tempo_change = (tempo[latest] - tempo[past]).abs() > 20.0;
        self.surround_change = (surround[latest] - surround[past]).abs() >= 2.0;

        self.change_score =
            self.genre_change as i32 + self.tempo_change as i32 + self.surround_change as i32;
    }

    /// Latched detection result for the most recently appended frame.
    pub fn change_flg(&self) -> bool {
        self.detected
    }

    pub fn change_score(&self) -> i32 {
        self.change_score
    }
}
