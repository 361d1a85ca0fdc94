//! Online diversity evaluation (C5): per-variable similarity against history plus
//! a coverage-breadth term, combined into a single `[0, 1]` score.

use crate::config::{
    COVERAGE_EPSILON, DIVERSITY_W_COV, DIVERSITY_W_SIM, HISTORY_ADMIT_THRESHOLD, STRING_ALPHA,
    STRING_BETA, WEIGHT_CHAR, WEIGHT_NUMERIC, WEIGHT_STRING,
};
use crate::state::{classify, SlotKind, StateHistory, StateSnapshot};

/// Per-variable similarity contribution between two encoded slot values, per the
/// classification rules in `state::classify`. Not a metric (it isn't symmetric in
/// the string case's length term sign, though the magnitude is): a heuristic
/// scalar in `[0, 1]`-ish range per variable, summed across comparisons.
fn slot_similarity(a: u32, b: u32) -> f64 {
    if a == 0 || b == 0 {
        return 0.0;
    }
    match (classify(a), classify(b)) {
        (SlotKind::Char { byte: ba }, SlotKind::Char { byte: bb }) => {
            let diff = (ba as i32 - bb as i32).unsigned_abs() as f64;
            (diff / 127.0) * WEIGHT_CHAR
        }
        (
            SlotKind::String {
                hash24: ha,
                len: la,
            },
            SlotKind::String {
                hash24: hb,
                len: lb,
            },
        ) => {
            let min_len = la.min(lb) as f64;
            let hash_term = if min_len == 0.0 {
                0.0
            } else {
                (ha ^ hb).count_ones() as f64 / min_len
            };
            let len_diff = (la as i32 - lb as i32).unsigned_abs() as f64;
            (hash_term * STRING_ALPHA + (len_diff / 255.0) * STRING_BETA) * WEIGHT_STRING
        }
        _ => {
            if a == b {
                0.0
            } else {
                WEIGHT_NUMERIC
            }
        }
    }
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Result of evaluating a candidate snapshot against the current history.
#[derive(Debug, Clone, Copy)]
pub struct DiversityScore {
    pub similarity: f64,
    pub coverage: f64,
    pub diversity: f64,
}

/// Evaluate `current` against `history`, returning the cached components.
///
/// Does not mutate `history`; callers decide separately whether to admit
/// `current` via [`admit_if_diverse`].
pub fn evaluate(current: &StateSnapshot, history: &StateHistory) -> DiversityScore {
    if history.is_empty() {
        return DiversityScore {
            similarity: 0.0,
            coverage: 0.0,
            diversity: 1.0,
        };
    }

    let mut sum = 0.0;
    let mut comparisons: u64 = 0;
    for (idx, &word) in current.states().iter().enumerate() {
        if word == 0 {
            continue;
        }
        for past in history.snapshots() {
            let other = past.states()[idx];
            sum += slot_similarity(word, other);
            comparisons += 1;
        }
    }
    let similarity = if comparisons == 0 {
        0.0
    } else {
        sum / comparisons as f64
    };

    let total_vars = history.total_vars();
    let ratio = if total_vars == 0 {
        0.0
    } else {
        current.valid_count() as f64 / total_vars as f64
    };
    let (min, max) = history.coverage_bounds();
    let coverage = clamp01((ratio - min) / (max - min + COVERAGE_EPSILON));

    let diversity = DIVERSITY_W_SIM * similarity + DIVERSITY_W_COV * coverage;
    DiversityScore {
        similarity,
        coverage,
        diversity,
    }
}

/// Evaluate `snapshot` against `history`, cache the scores on it, and admit it
/// into history if its diversity clears [`HISTORY_ADMIT_THRESHOLD`]. Returns the
/// diversity score regardless of whether admission happened.
pub fn evaluate_and_maybe_admit(mut snapshot: StateSnapshot, history: &mut StateHistory) -> f64 {
    let score = evaluate(&snapshot, history);
    snapshot.set_scores(score.similarity, score.coverage, score.diversity);
    let diversity = score.diversity;
    if diversity > HISTORY_ADMIT_THRESHOLD {
        history.admit(snapshot);
    }
    diversity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_is_maximally_diverse() {
        let history = StateHistory::new(10, 100);
        let current = StateSnapshot::from_slots(&[(0, 42)]);
        let score = evaluate(&current, &history);
        assert_eq!(score.diversity, 1.0);
    }

    #[test]
    fn identical_numeric_snapshots_yield_zero_diversity() {
        // Scenario 2 from the worked examples: total_vars=100, valid_count=50 in
        // both current and the sole history entry, identical states.
        let mut history = StateHistory::new(10, 100);
        let slots: Vec<(usize, u32)> = (0..50).map(|i| (i, (i as u32) + 1)).collect();
        history.admit(StateSnapshot::from_slots(&slots));
        let current = StateSnapshot::from_slots(&slots);
        let score = evaluate(&current, &history);
        assert_eq!(score.similarity, 0.0);
        assert!((score.coverage - 0.0).abs() < 1e-9);
        assert!((score.diversity - 0.0).abs() < 1e-9);
    }

    #[test]
    fn char_slots_contribute_scaled_absolute_difference() {
        let mut history = StateHistory::new(10, 1);
        history.admit(StateSnapshot::from_slots(&[(0, 0x0100_0041)]));
        let current = StateSnapshot::from_slots(&[(0, 0x0100_0042)]);
        let score = evaluate(&current, &history);
        let expected_sim = (1.0 / 127.0) * WEIGHT_CHAR;
        assert!((score.similarity - expected_sim).abs() < 1e-9);
    }

    #[test]
    fn admission_threshold_gates_history_growth() {
        let mut history = StateHistory::new(10, 1);
        // First snapshot is always admitted (diversity == 1.0 on empty history).
        let first = StateSnapshot::from_slots(&[(0, 1)]);
        evaluate_and_maybe_admit(first, &mut history);
        assert_eq!(history.count(), 1);

        // An identical-looking low-diversity snapshot should not be admitted.
        let second = StateSnapshot::from_slots(&[(0, 1)]);
        let d = evaluate_and_maybe_admit(second, &mut history);
        assert!(d <= 0.3);
        assert_eq!(history.count(), 1);
    }
}
