//! Frame-to-commands pipeline for the analysis half.

use crate::interpreter::MusicInterpreter;
use crate::switcher::LightingSwitcher;
use beatstrip_core::{Command, MusicFrame};

/// How often (in frames) the dimmer period is re-adapted to tempo.
const DIMMER_ADAPT_INTERVAL: u64 = 50;

/// Owns the interpreter and switcher; one call per main-loop tick.
#[derive(Debug, Default)]
pub struct AnalysisEngine {
    interpreter: MusicInterpreter,
    switcher: LightingSwitcher,
}

impl AnalysisEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one frame and return the lighting commands it produced, in
    /// emission order.
    pub fn process(&mut self, frame: &MusicFrame) -> Vec<Command> {
        self.interpreter.update(frame);
        let musical_flags = self.interpreter.detect_musical_change_flgs();

        self.switcher.update_genre(self.interpreter.latest_genre());
        self.switcher.update_tempo(self.interpreter.latest_tempo());
        self.switcher.update_light_switch_flgs(&musical_flags);

        let mut commands = self.switcher.light_switch_flag();
        if self.interpreter.frame_count() % DIMMER_ADAPT_INTERVAL == 0 {
            commands.extend(self.switcher.adopt_dimmer_time_to_tempo());
        }
        commands
    }

    pub fn interpreter(&self) -> &MusicInterpreter {
        &self.interpreter
    }
}
