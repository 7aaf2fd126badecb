//! Performer-switch detection: a shift in the balance between bands.

use super::CooldownGate;
use crate::history::FrameHistory;

const HISTORY_LEN: usize = 15;
const COOLDOWN_FRAMES: i64 = 80;
const EPSILON: f64 = 1e-5;

/// Detects a performer switch over a 15-frame window by comparing the
/// high/mid/low band ratio vector now against 10 frames ago.
///
/// The switch score sums two sub-features:
/// - `band_balance_shift`: cosine similarity of the ratio vectors below 0.90
/// - the absolute ratio difference sum exceeding 0.3
#[derive(Debug)]
pub struct PerformerSwitchDetector {
    history: FrameHistory,
    gate: CooldownGate,
    band_balance_shift: bool,
    volume_band_ratio_diff: f64,
    switch_score: i32,
    detected: bool,
}

impl Default for PerformerSwitchDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformerSwitchDetector {
    pub fn new() -> Self {
        Self {
            history: FrameHistory::new(HISTORY_LEN),
            gate: CooldownGate::new(COOLDOWN_FRAMES),
            band_balance_shift: false,
            volume_band_ratio_diff: 0.0,
            switch_score: 0,
            detected: false,
        }
    }

    /// Append one frame of band volumes, recompute the switch score and
    /// latch the detection result.
    pub fn update_state(&mut self, eq_levels: &[f64; 6]) {
        self.history.append("volume_high", eq_levels[1]);
        self.history.append("volume_mid", eq_levels[2]);
        self.history.append("volume_low", eq_levels[3]);

        self.calc_feature();

        let current_frame = self.history.size() as i64 - 1;
        self.detected = self.gate.fire(current_frame, self.switch_score >= 2);
    }

    fn calc_feature(&mut self) {
        if self.history.size() < HISTORY_LEN {
            self.band_balance_shift = false;
            self.volume_band_ratio_diff = 0.0;
            self.switch_score = 0;
            return;
        }

        let high = self.history.floats("volume_high");
        let mid = self.history.floats("volume_mid");
        let low = self.history.floats("volume_low");
        let n = high.len();

        let ratio_now = band_ratios(high[n - 1], mid[n - 1], low[n - 1]);
        let ratio_past = band_ratios(high[n - 11], mid[n - 11], low[n - 11]);

        let cos_sim = cosine_similarity(&ratio_now, &ratio_past);
        self.band_balance_shift = cos_sim < 0.90;

        self.volume_band_ratio_diff = ratio_now
            .iter()
            .zip(&ratio_past)
            .map(|(a, b)| (a - b).abs())
            .sum();

        self.switch_score =
            self.band_balance_shift as i32 + (self.volume_band_ratio_diff > 0.3) as i32;
    }

    /// Latched detection result for the most recently appended frame.
    pub fn performer_switch_flg(&self) -> bool {
        self.detected
    }

    pub fn switch_score(&self) -> i32 {
        self.switch_score
    }
}

/// Band share of the total, epsilon-guarded against silence.
fn band_ratios(high: f64, mid: f64, low: f64) -> [f64; 3] {
    let total = high + mid + low + EPSILON;
    [
        high / total + EPSILON,
        mid / total + EPSILON,
        low / total + EPSILON,
    ]
}

fn cosine_similarity(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    dot / (norm_a * norm_b)
}
