//! Music-frame sources for the main loop.

use beatstrip_core::MusicFrame;
use rand::rngs::ThreadRng;
use rand::Rng;

/// Produces one music frame per main-loop tick. A real analysis frontend
/// implements this over its feature stream; the synthetic feed below
/// stands in for bench runs.
pub trait FrameSource {
    fn next_frame(&mut self) -> MusicFrame;
}

/// Beat-patterned random feature generator.
///
/// EQ levels wander between -40 and 0 dB; roughly one frame in twenty
/// gets a low-end boost with a forced beat to exercise the detectors.
pub struct SyntheticFeed {
    rng: ThreadRng,
    beat_probability: f64,
}

impl SyntheticFeed {
    pub fn new(beat_probability: f64) -> Self {
        Self {
            rng: rand::rng(),
            beat_probability,
        }
    }

    fn band(&mut self) -> f64 {
        self.rng.random_range(-40.0..=0.0)
    }
}

impl FrameSource for SyntheticFeed {
    fn next_frame(&mut self) -> MusicFrame {
        let mut frame = MusicFrame {
            allpass_db: self.band(),
            lpf200_db: self.band(),
            bpf500_db: self.band(),
            bpf2000_db: self.band(),
            bpf4000_db: self.band(),
            hpf6000_db: self.band(),
            genre_id: self.rng.random_range(0..=4),
            surround_score: self.rng.random_range(0..=1),
            beat: self.rng.random_bool(self.beat_probability),
            tempo: self.rng.random_range(60.0..=180.0),
            tempo_confidence: self.rng.random_range(0.0..=1.0),
        };

        // Occasional drop moment: boost the low end and force a beat
        if self.rng.random_bool(0.05) {
            frame.allpass_db = self.rng.random_range(-10.0..=0.0);
            frame.lpf200_db = self.rng.random_range(-10.0..=0.0);
            frame.beat = true;
        }

        frame
    }
}
