//! The data model: encoded state values, per-seed snapshots, and the bounded
//! history of snapshots the diversity evaluator compares against.

use serde::{Deserialize, Serialize};

use crate::config::VAR_MAP_SIZE;

/// Upper byte marker written by the char recorder.
const CHAR_TAG: u8 = 0x01;

/// Classification of a single encoded 32-bit slot, used by the similarity function.
/// Mirrors the tagged-encoding scheme exactly, ambiguities included: a char-tagged
/// word is indistinguishable from a numeric value that happens to share the same
/// upper byte, and this is intentionally not widened into a proper tagged union
/// since doing so would break the fixed `u32` wire format the recorder ABI uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Unwritten,
    Char { byte: u8 },
    String { hash24: u32, len: u8 },
    Other,
}

/// Classify a raw 32-bit slot value the way the similarity function needs to.
pub fn classify(word: u32) -> SlotKind {
    if word == 0 {
        return SlotKind::Unwritten;
    }
    let top = (word >> 24) as u8;
    if top == CHAR_TAG {
        return SlotKind::Char {
            byte: (word & 0xFF) as u8,
        };
    }
    if (1..=254).contains(&top) {
        return SlotKind::String {
            hash24: word & 0x00FF_FFFF,
            len: top,
        };
    }
    SlotKind::Other
}

/// A frozen copy of the live state map for one seed.
///
/// Immutable once constructed: the cached scores are filled in exactly once, by
/// the diversity evaluator, before the snapshot is ever exposed to history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    states: Vec<u32>,
    valid_count: u32,
    similarity: f64,
    coverage: f64,
    diversity: f64,
}

impl StateSnapshot {
    /// Build a snapshot from a raw copy of the live state map.
    ///
    /// `states` is truncated/zero-padded to `VAR_MAP_SIZE` so callers can hand in
    /// whatever slice width the shared-memory attach produced.
    pub fn from_raw(states: &[u32]) -> Self {
        let mut buf = vec![0u32; VAR_MAP_SIZE];
        let n = states.len().min(VAR_MAP_SIZE);
        buf[..n].copy_from_slice(&states[..n]);
        let valid_count = buf.iter().filter(|&&w| w != 0).count() as u32;
        Self {
            states: buf,
            valid_count,
            similarity: 0.0,
            coverage: 0.0,
            diversity: 0.0,
        }
    }

    /// An all-zero snapshot, e.g. for a killed or never-recorded execution.
    pub fn empty() -> Self {
        Self::from_raw(&[])
    }

    pub fn states(&self) -> &[u32] {
        &self.states
    }

    pub fn valid_count(&self) -> u32 {
        self.valid_count
    }

    pub fn diversity(&self) -> f64 {
        self.diversity
    }

    pub fn similarity(&self) -> f64 {
        self.similarity
    }

    pub fn coverage(&self) -> f64 {
        self.coverage
    }

    /// Caches the scores computed by the diversity evaluator. Called exactly once,
    /// immediately before (or as part of) admission into history.
    pub(crate) fn set_scores(&mut self, similarity: f64, coverage: f64, diversity: f64) {
        self.similarity = similarity;
        self.coverage = coverage;
        self.diversity = diversity;
    }

    #[cfg(test)]
    pub fn from_slots(slots: &[(usize, u32)]) -> Self {
        let mut raw = vec![0u32; VAR_MAP_SIZE];
        for &(idx, v) in slots {
            raw[idx] = v;
        }
        Self::from_raw(&raw)
    }
}

/// Bounded ring buffer of prior snapshots plus the running coverage-ratio bounds
/// the diversity evaluator normalizes against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateHistory {
    snapshots: Vec<StateSnapshot>,
    head: usize,
    capacity: usize,
    total_vars: usize,
    coverage_min: f64,
    coverage_max: f64,
}

impl StateHistory {
    pub fn new(capacity: usize, total_vars: usize) -> Self {
        Self {
            snapshots: Vec::with_capacity(capacity),
            head: 0,
            capacity,
            total_vars,
            coverage_min: f64::INFINITY,
            coverage_max: f64::NEG_INFINITY,
        }
    }

    pub fn count(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn total_vars(&self) -> usize {
        self.total_vars
    }

    pub fn snapshots(&self) -> &[StateSnapshot] {
        &self.snapshots
    }

    pub fn coverage_bounds(&self) -> (f64, f64) {
        (self.coverage_min, self.coverage_max)
    }

    fn coverage_ratio(&self, snapshot: &StateSnapshot) -> f64 {
        if self.total_vars == 0 {
            0.0
        } else {
            snapshot.valid_count() as f64 / self.total_vars as f64
        }
    }

    /// Insert `snapshot` into the ring buffer, evicting the oldest entry once at
    /// capacity, and widen the running coverage-ratio bounds.
    pub fn admit(&mut self, snapshot: StateSnapshot) {
        let ratio = self.coverage_ratio(&snapshot);
        self.coverage_min = self.coverage_min.min(ratio);
        self.coverage_max = self.coverage_max.max(ratio);

        if self.snapshots.len() < self.capacity {
            self.snapshots.push(snapshot);
        } else {
            self.snapshots[self.head] = snapshot;
            self.head = (self.head + 1) % self.capacity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_unwritten() {
        assert_eq!(classify(0), SlotKind::Unwritten);
    }

    #[test]
    fn classify_char_marker() {
        match classify(0x0100_0042) {
            SlotKind::Char { byte } => assert_eq!(byte, 0x42),
            other => panic!("expected Char, got {other:?}"),
        }
    }

    #[test]
    fn classify_string_hash_and_len() {
        // "ab" worked example from the scenario table.
        let word = 0x02_597728;
        match classify(word) {
            SlotKind::String { hash24, len } => {
                assert_eq!(len, 2);
                assert_eq!(hash24, 0x00_597728);
            }
            other => panic!("expected String, got {other:?}"),
        }
    }

    #[test]
    fn classify_zero_length_string_is_other() {
        // length byte 0 -> falls outside the [1, 254] string bucket.
        let word = 0x0000_1505;
        assert_eq!(classify(word), SlotKind::Other);
    }

    #[test]
    fn valid_count_matches_nonzero_slots() {
        let snap = StateSnapshot::from_slots(&[(0, 5), (10, 7), (20, 0)]);
        assert_eq!(snap.valid_count(), 2);
    }

    #[test]
    fn history_overflow_replaces_oldest_and_keeps_capacity() {
        let mut history = StateHistory::new(2, 10);
        history.admit(StateSnapshot::from_slots(&[(0, 1)]));
        history.admit(StateSnapshot::from_slots(&[(0, 2)]));
        assert_eq!(history.count(), 2);
        history.admit(StateSnapshot::from_slots(&[(0, 3)]));
        assert_eq!(history.count(), 2);
    }
}
