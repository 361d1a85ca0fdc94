//! Fixed tunables shared by every other component.
//!
//! These mirror the constants the original instrumentation headers hard-coded as
//! preprocessor defines; they are kept as `pub const` items rather than a runtime
//! config file since nothing in the design calls for them to vary per-run.

/// Call-graph hop-distance threshold `h` beyond which a function is not instrumented.
pub const DISTANCE_THRESHOLD: u32 = 3;

/// Upper bound on the number of key variables tracked across the whole program.
pub const MAX_KEY_VARS: usize = 1024;

/// Number of 32-bit slots in the live state map. Must be a power of two.
pub const VAR_MAP_SIZE: usize = 16_384;

/// Capacity of the bounded state-history ring buffer.
pub const HISTORY_SIZE: usize = 100;

/// Maximum number of bytes read from a C string by the string recorder.
pub const MAX_STRING_LEN: usize = 256;

/// Per-type weights used by the diversity evaluator's similarity function.
pub const WEIGHT_NUMERIC: f64 = 1.0;
pub const WEIGHT_CHAR: f64 = 0.8;
pub const WEIGHT_STRING: f64 = 1.2;

/// Mixing coefficients for the Hamming/length-difference string similarity proxy.
pub const STRING_ALPHA: f64 = 0.6;
pub const STRING_BETA: f64 = 0.4;

/// Mixing coefficients for the overall diversity score.
pub const DIVERSITY_W_SIM: f64 = 0.6;
pub const DIVERSITY_W_COV: f64 = 0.4;

/// Diversity threshold above which a snapshot is admitted into history.
pub const HISTORY_ADMIT_THRESHOLD: f64 = 0.3;

/// Learning rate for the adaptive weight update.
pub const LEARNING_RATE: f64 = 0.1;

/// Energy multiplier coefficient `gamma`.
pub const ENERGY_GAMMA: f64 = 0.5;

/// Initial split between traditional and state weights.
pub const INITIAL_WEIGHT_TRADITIONAL: f64 = 0.5;
pub const INITIAL_WEIGHT_STATE: f64 = 0.5;

/// Clamp bounds for either adaptive weight.
pub const WEIGHT_MIN: f64 = 0.1;
pub const WEIGHT_MAX: f64 = 0.9;

/// Epsilon preventing division by zero when the history's coverage-ratio bounds
/// collapse to a single point.
pub const COVERAGE_EPSILON: f64 = 1e-4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_map_size_is_power_of_two() {
        assert!(VAR_MAP_SIZE.is_power_of_two());
    }

    #[test]
    fn initial_weights_sum_to_one() {
        assert!((INITIAL_WEIGHT_TRADITIONAL + INITIAL_WEIGHT_STATE - 1.0).abs() < 1e-9);
    }
}
