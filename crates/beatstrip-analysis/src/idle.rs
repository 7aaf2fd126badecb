//! Idle/beat tracking: counts clean beats and reports no-change intervals.

use crate::history::FrameHistory;
use tracing::debug;

const HISTORY_LEN: usize = 32;

/// Beat thresholds checked against the running counter, in flag order.
const BEAT_THRESHOLDS: [u32; 4] = [4, 8, 16, 32];

/// Counts beats modulo {4, 8, 16, 32} to measure how long the music has
/// gone without a structural change.
///
/// Two consecutive beat frames count as one beat. The counter resets when
/// it reaches 32 and whenever any detector reported a musical change this
/// frame (the flags computed for the current tick are kept).
#[derive(Debug)]
pub struct IdleBeatTracker {
    history: FrameHistory,
    beat_counter: u32,
    no_change_flags: [bool; 4],
}

impl Default for IdleBeatTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl IdleBeatTracker {
    pub fn new() -> Self {
        Self {
            history: FrameHistory::new(HISTORY_LEN),
            beat_counter: 0,
            no_change_flags: [false; 4],
        }
    }

    /// Process one frame: `beat_flg` is this frame's beat,
    /// `any_musical_change` is the OR of the four detector flags for this
    /// frame.
    pub fn update(&mut self, beat_flg: bool, any_musical_change: bool) {
        self.history.append("beat_flg", beat_flg);

        if self.history.size() < HISTORY_LEN {
            self.no_change_flags = [false; 4];
            return;
        }

        let beats = self.history.flags("beat_flg");
        let previous_beat = beats.len() >= 2 && beats[beats.len() - 2];

        if previous_beat {
            // Consecutive beats collapse into one; the counter holds
            self.no_change_flags = [false; 4];
        } else if beat_flg {
            self.beat_counter += 1;
            debug!(beat_counter = self.beat_counter, "beat");
            for (flag, threshold) in self.no_change_flags.iter_mut().zip(BEAT_THRESHOLDS) {
                *flag = self.beat_counter % threshold == 0;
            }
            if self.beat_counter >= 32 {
                self.beat_counter = 0;
            }
        }

        if any_musical_change {
            debug!("musical change detected, resetting beat counter");
            self.beat_counter = 0;
        }
    }

    pub fn no_change_4beats_flg(&self) -> bool {
        self.no_change_flags[0]
    }

    pub fn no_change_8beats_flg(&self) -> bool {
        self.no_change_flags[1]
    }

    pub fn no_change_16beats_flg(&self) -> bool {
        self.no_change_flags[2]
    }

    pub fn no_change_32beats_flg(&self) -> bool {
        self.no_change_flags[3]
    }

    #[cfg(test)]
    pub(crate) fn beat_counter(&self) -> u32 {
        self.beat_counter
    }
}
