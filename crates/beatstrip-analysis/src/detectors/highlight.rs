//! Highlight detection: a volume surge on top of a sustained rise.

use super::CooldownGate;
use crate::history::FrameHistory;

const HISTORY_LEN: usize = 30;
const COOLDOWN_FRAMES: i64 = 100;

/// Detects a musical highlight over a 30-frame window.
///
/// The highlight score sums three sub-features:
/// - `surge`: the high band rose by more than 20 over the last 5 frames
/// - `long_rise`: the summed bands rose by more than 30 over the last 20
///   frames
/// - the latest tempo confidence exceeds 0.6
#[derive(Debug)]
pub struct HighlightDetector {
    history: FrameHistory,
    gate: CooldownGate,
    surge_score: i32,
    long_rise_score: i32,
    tempo_conf_score: i32,
    highlight_score: i32,
    detected: bool,
}

impl Default for HighlightDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl HighlightDetector {
    pub fn new() -> Self {
        Self {
            history: FrameHistory::new(HISTORY_LEN),
            gate: CooldownGate::new(COOLDOWN_FRAMES),
            surge_score: 0,
            long_rise_score: 0,
            tempo_conf_score: 0,
            highlight_score: 0,
            detected: false,
        }
    }

    /// Append one frame of features, recompute the highlight score and
    /// latch the detection result.
    pub fn update_state(&mut self, eq_levels: &[f64; 6], tempo_confidence: f64) {
        self.history.append("volume_high", eq_levels[1]);
        self.history.append("volume_mid", eq_levels[2]);
        self.history.append("volume_low", eq_levels[3]);
        self.history.append("tempo_confidence", tempo_confidence);

        self.calc_feature();

        let current_frame = self.history.size() as i64 - 1;
        self.detected = self.gate.fire(current_frame, self.highlight_score >= 2);
    }

    fn calc_feature(&mut self) {
        if self.history.size() < HISTORY_LEN {
            self.surge_score = 0;
            self.long_rise_score = 0;
            self.tempo_conf_score = 0;
            self.highlight_score = 0;
            return;
        }

        let high = self.history.floats("volume_high");
        let mid = self.history.floats("volume_mid");
        let low = self.history.floats("volume_low");
        let confidence = self.history.floats("tempo_confidence");

        let latest = high.len() - 1;
        let short_past = high.len() - 6;
        let long_past = high.len() - 21;

        let surge = high[latest] - high[short_past];
        self.surge_score = (surge > 20.0) as i32;

        let now_total = high[latest] + mid[latest] + low[latest];
        let past_total = high[long_past] + mid[long_past] + low[long_past];
        self.long_rise_score = (now_total - past_total > 30.0) as i32;

        self.tempo_conf_score = (confidence[latest] > 0.6) as i32;

        self.highlight_score = self.surge_score + self.long_rise_score + self.tempo_conf_score;
    }

    /// Latched detection result for the most recently appended frame.
    pub fn highlight_flg(&self) -> bool {
        self.detected
    }

    pub fn highlight_score(&self) -> i32 {
        self.highlight_score
    }
}
