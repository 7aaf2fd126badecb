//! Songhook detection: rising excitement and volume under a steady tempo.

use super::CooldownGate;
use crate::history::FrameHistory;

const HISTORY_LEN: usize = 20;
const COOLDOWN_FRAMES: i64 = 100;

/// Detects the arrival of a song hook over a 20-frame window.
///
/// The hook score sums three sub-features:
/// - `excitement_rise`: the surround proxy rose by at least 1 over the
///   last 10 frames
/// - `volume_increase`: mean band volume grew by more than 10% over the
///   last 10 frames
/// - `tempo_stable`: every one of the last 10 tempo samples sits within
///   5 BPM of their mean
#[derive(Debug)]
pub struct SonghookDetector {
    history: FrameHistory,
    gate: CooldownGate,
    excitement_rise: bool,
    volume_increase: bool,
    tempo_stable: bool,
    hook_score: i32,
    detected: bool,
}

impl Default for SonghookDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SonghookDetector {
    pub fn new() -> Self {
        Self {
            history: FrameHistory::new(HISTORY_LEN),
            gate: CooldownGate::new(COOLDOWN_FRAMES),
            excitement_rise: false,
            volume_increase: false,
            tempo_stable: false,
            hook_score: 0,
            detected: false,
        }
    }

    /// Append one frame of features, recompute the hook score and latch
    /// the detection result.
    pub fn update_state(&mut self, eq_levels: &[f64; 6], tempo: f64) {
        self.history.append("tempo", tempo);
        self.history.append("surround_index", eq_levels[0]);
        self.history.append("volume_high", eq_levels[1]);
        self.history.append("volume_mid", eq_levels[2]);
        self.history.append("volume_low", eq_levels[3]);

        self.calc_feature();

        let current_frame = self.history.size() as i64 - 1;
        self.detected = self.gate.fire(current_frame, self.hook_score >= 2);
    }

    fn calc_feature(&mut self) {
        if self.history.size() < HISTORY_LEN {
            self.excitement_rise = false;
            self.volume_increase = false;
            self.tempo_stable = false;
            self.hook_score = 0;
            return;
        }

        let surround = self.history.floats("surround_index");
        let high = self.history.floats("volume_high");
        let mid = self.history.floats("volume_mid");
        let low = self.history.floats("volume_low");
        let tempo = self.history.floats("tempo");
        let n = surround.len();

        self.excitement_rise = surround[n - 1] - surround[n - 11] >= 1.0;

        let vol_now = (high[n - 1] + mid[n - 1] + low[n - 1]) / 3.0;
        let vol_before = (high[n - 11] + mid[n - 11] + low[n - 11]) / 3.0;
        self.volume_increase = vol_now > vol_before * 1.1;

        let recent = &tempo[n - 10..];
        let avg_tempo = recent.iter().sum::<f64>() / recent.len() as f64;
        self.tempo_stable = recent.iter().all(|t| (t - avg_tempo).abs() < 5.0);

        self.hook_score =
            self.excitement_rise as i32 + self.volume_increase as i32 + self.tempo_stable as i32;
    }

    /// Latched detection result for the most recently appended frame.
    pub fn songhook_flg(&self) -> bool {
        self.detected
    }

    pub fn hook_score(&self) -> i32 {
        self.hook_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hook_frame(i: usize) -> ([f64; 6], f64) {
        // Surround rises steadily, band volumes grow, tempo holds at 120
        let surround = i as f64;
        let volume = (i as f64 + 1.0) * 10.0;
        ([surround, volume, volume, volume, 0.0, 0.0], 120.0)
    }

    #[test]
    fn test_silent_until_history_full() {
        let mut detector = SonghookDetector::new();
        for i in 0..HISTORY_LEN - 1 {
            let (eq, tempo) = hook_frame(i);
            detector.update_state(&eq, tempo);
            assert!(!detector.songhook_flg());
            assert_eq!(detector.hook_score(), 0);
        }
    }

    #[test]
    fn test_detects_hook_once_window_filled() {
        let mut detector = SonghookDetector::new();
        for i in 0..HISTORY_LEN {
            let (eq, tempo) = hook_frame(i);
            detector.update_state(&eq, tempo);
        }
        // frame 19: surround 19 vs 9, mean volume 200 vs 100, tempo stable
        assert_eq!(detector.hook_score(), 3);
        assert!(detector.songhook_flg());
    }

    #[test]
    fn test_cooldown_blocks_refire() {
        let mut detector = SonghookDetector::new();
        for i in 0..HISTORY_LEN {
            let (eq, tempo) = hook_frame(i);
            detector.update_state(&eq, tempo);
        }
        assert!(detector.songhook_flg());
        // Keep the same rising pattern; the cooldown holds the gate shut
        for i in HISTORY_LEN..HISTORY_LEN + 50 {
            let (eq, tempo) = hook_frame(i);
            detector.update_state(&eq, tempo);
            assert!(!detector.songhook_flg());
        }
    }

    #[test]
    fn test_unstable_tempo_lowers_score() {
        let mut detector = SonghookDetector::new();
        for i in 0..HISTORY_LEN {
            let surround = 0.0;
            let volume = 10.0;
            let tempo = if i % 2 == 0 { 100.0 } else { 140.0 };
            detector.update_state(&[surround, volume, volume, volume, 0.0, 0.0], tempo);
        }
        assert_eq!(detector.hook_score(), 0);
        assert!(!detector.songhook_flg());
    }
}
