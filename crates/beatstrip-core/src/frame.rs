//! Music-analysis input frame.

use serde::{Deserialize, Serialize};

/// One frame of music-analysis features, produced by the analysis frontend
/// once per main-loop tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MusicFrame {
    /// Full-band level in dB
    pub allpass_db: f64,
    /// Low-pass 200 Hz level in dB
    pub lpf200_db: f64,
    /// Band-pass 500 Hz level in dB
    pub bpf500_db: f64,
    /// Band-pass 2 kHz level in dB
    pub bpf2000_db: f64,
    /// Band-pass 4 kHz level in dB
    pub bpf4000_db: f64,
    /// High-pass 6 kHz level in dB
    pub hpf6000_db: f64,
    /// Genre classifier output
    pub genre_id: i32,
    /// Surround/excitement score
    pub surround_score: i32,
    /// Beat detected this frame
    pub beat: bool,
    /// Estimated tempo in BPM
    pub tempo: f64,
    /// Tempo estimate confidence (0.0 - 1.0)
    pub tempo_confidence: f64,
}

impl MusicFrame {
    /// Project the six named bands into the ordered `eq_levels` sequence
    /// `[allpass, LPF200, BPF500, BPF2000, BPF4000, HPF6000]`.
    ///
    /// Detectors read index 0 as the surround proxy and indices 1..=3 as
    /// the high/mid/low volume bands; which physical band carries which
    /// meaning is the frontend's contract.
    pub fn eq_levels(&self) -> [f64; 6] {
        [
            self.allpass_db,
            self.lpf200_db,
            self.bpf500_db,
            self.bpf2000_db,
            self.bpf4000_db,
            self.hpf6000_db,
        ]
    }
}
