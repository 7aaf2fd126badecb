//! Tempo classification and dimmer-period adaptation.

/// Coarse tempo buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TempoClass {
    VerySlow,
    Slow,
    MidSlow,
    #[default]
    Mid,
    MidFast,
    Fast,
}

impl TempoClass {
    /// Bucket a tempo value in BPM.
    pub fn from_tempo(tempo: f64) -> Self {
        if tempo < 60.0 {
            TempoClass::VerySlow
        } else if tempo < 80.0 {
            TempoClass::Slow
        } else if tempo < 100.0 {
            TempoClass::MidSlow
        } else if tempo < 120.0 {
            TempoClass::Mid
        } else if tempo < 140.0 {
            TempoClass::MidFast
        } else {
            TempoClass::Fast
        }
    }

    /// Wire/logging label.
    pub fn label(&self) -> &'static str {
        match self {
            TempoClass::VerySlow => "very_slow",
            TempoClass::Slow => "slow",
            TempoClass::MidSlow => "mid_slow",
            TempoClass::Mid => "mid",
            TempoClass::MidFast => "mid_fast",
            TempoClass::Fast => "fast",
        }
    }
}

/// Tracks the tempo bucket of the latest frame. Starts at `mid`.
#[derive(Debug, Default)]
pub struct TempoClassifier {
    class: TempoClass,
}

impl TempoClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, tempo: f64) {
        self.class = TempoClass::from_tempo(tempo);
    }

    pub fn class(&self) -> TempoClass {
        self.class
    }
}

/// Maps tempo to a dimmer period percentage: slow songs stretch the fade
/// cycle, fast songs compress it.
#[derive(Debug)]
pub struct DimmerTimeAdaptor {
    period_percentage: f64,
}

impl Default for DimmerTimeAdaptor {
    fn default() -> Self {
        Self::new()
    }
}

impl DimmerTimeAdaptor {
    pub fn new() -> Self {
        Self {
            period_percentage: 100.0,
        }
    }

    fn calc_feature(tempo: f64) -> f64 {
        if tempo <= 0.0 {
            100.0
        } else if tempo < 60.0 {
            500.0
        } else if tempo < 80.0 {
            300.0
        } else if tempo < 100.0 {
            200.0
        } else if tempo < 120.0 {
            100.0
        } else if tempo < 140.0 {
            60.0
        } else {
            30.0
        }
    }

    pub fn update(&mut self, tempo: f64) {
        self.period_percentage = Self::calc_feature(tempo);
    }

    /// Current period percentage, rounded to an integer.
    pub fn period_percentage(&self) -> i32 {
        self.period_percentage.round() as i32
    }
}
