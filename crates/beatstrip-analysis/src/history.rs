//! Bounded per-key frame history used by the detectors.

use std::collections::{BTreeMap, VecDeque};

/// One stored history value.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    /// Numeric feature (levels, tempo, scores)
    Float(f64),
    /// Boolean feature (beat flags)
    Flag(bool),
    /// String feature (stringified genre ids)
    Text(String),
    /// Numeric sequence feature
    Series(Vec<f64>),
}

impl Sample {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Sample::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Sample::Flag(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Sample::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for Sample {
    fn from(v: f64) -> Self {
        Sample::Float(v)
    }
}

impl From<bool> for Sample {
    fn from(v: bool) -> Self {
        Sample::Flag(v)
    }
}

impl From<&str> for Sample {
    fn from(v: &str) -> Self {
        Sample::Text(v.to_string())
    }
}

impl From<String> for Sample {
    fn from(v: String) -> Self {
        Sample::Text(v)
    }
}

impl From<Vec<f64>> for Sample {
    fn from(v: Vec<f64>) -> Self {
        Sample::Series(v)
    }
}

/// String-keyed store of bounded, insertion-ordered sample sequences.
///
/// A detector appends all of its keys in lockstep, so after warm-up every
/// key holds the same number of samples and `size()` can report the length
/// of any one of them.
#[derive(Debug)]
pub struct FrameHistory {
    maxlen: usize,
    data: BTreeMap<String, VecDeque<Sample>>,
}

impl FrameHistory {
    pub fn new(maxlen: usize) -> Self {
        Self {
            maxlen,
            data: BTreeMap::new(),
        }
    }

    /// Append a value under `key`, evicting the oldest entry once the key
    /// holds more than `maxlen` samples.
    pub fn append(&mut self, key: &str, value: impl Into<Sample>) {
        let entry = self.data.entry(key.to_string()).or_default();
        entry.push_back(value.into());
        if entry.len() > self.maxlen {
            entry.pop_front();
        }
    }

    /// A copy of the current sequence for `key`; empty if the key was
    /// never written.
    pub fn get(&self, key: &str) -> Vec<Sample> {
        self.data
            .get(key)
            .map(|seq| seq.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Numeric samples for `key`, in append order.
    pub fn floats(&self, key: &str) -> Vec<f64> {
        self.data
            .get(key)
            .map(|seq| seq.iter().filter_map(Sample::as_f64).collect())
            .unwrap_or_default()
    }

    /// Boolean samples for `key`, in append order.
    pub fn flags(&self, key: &str) -> Vec<bool> {
        self.data
            .get(key)
            .map(|seq| seq.iter().filter_map(Sample::as_bool).collect())
            .unwrap_or_default()
    }

    /// String samples for `key`, in append order.
    pub fn texts(&self, key: &str) -> Vec<String> {
        self.data
            .get(key)
            .map(|seq| {
                seq.iter()
                    .filter_map(|s| s.as_text().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Length of the first present key's sequence. Keys appended in
    /// lockstep all share this length.
    pub fn size(&self) -> usize {
        self.data
            .values()
            .next()
            .map(VecDeque::len)
            .unwrap_or_default()
    }

    /// The currently present keys.
    pub fn keys(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }
}
