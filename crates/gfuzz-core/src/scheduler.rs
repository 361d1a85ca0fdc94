//! Adaptive scheduling controller (C6): the two-weight convex combination of
//! traditional and state-diversity scores, plus the energy multiplier.

use serde::{Deserialize, Serialize};

use crate::config::{
    ENERGY_GAMMA, INITIAL_WEIGHT_STATE, INITIAL_WEIGHT_TRADITIONAL, LEARNING_RATE, WEIGHT_MAX,
    WEIGHT_MIN,
};

/// Holds the adaptive weights and the gradient-like update rule that adjusts them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdaptiveWeights {
    w_traditional: f64,
    w_state: f64,
    learning_rate: f64,
}

impl Default for AdaptiveWeights {
    fn default() -> Self {
        Self {
            w_traditional: INITIAL_WEIGHT_TRADITIONAL,
            w_state: INITIAL_WEIGHT_STATE,
            learning_rate: LEARNING_RATE,
        }
    }
}

impl AdaptiveWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn traditional(&self) -> f64 {
        self.w_traditional
    }

    pub fn state(&self) -> f64 {
        self.w_state
    }

    /// Combined score `s = w_t * traditional + w_s * state_diversity`.
    pub fn combined_score(&self, traditional: f64, state_diversity: f64) -> f64 {
        self.w_traditional * traditional + self.w_state * state_diversity
    }

    /// Energy multiplier `m = 1 + gamma * state_diversity`, or `1.0` when the seed
    /// has no captured snapshot (pass `None`).
    pub fn energy(&self, state_diversity: Option<f64>) -> f64 {
        match state_diversity {
            Some(d) => 1.0 + ENERGY_GAMMA * d,
            None => 1.0,
        }
    }

    /// Apply the gradient-like weight update from relative coverage/state gains
    /// observed over the last reporting interval.
    pub fn report_gains(&mut self, delta_cov: f64, delta_state: f64) {
        let delta = delta_cov - delta_state;
        let mut w_t = self.w_traditional + self.learning_rate * delta;
        let mut w_s = self.w_state + self.learning_rate * (delta_state - delta_cov);

        let sum = w_t + w_s;
        if sum > 0.0 {
            w_t /= sum;
            w_s /= sum;
        }

        w_t = w_t.clamp(WEIGHT_MIN, WEIGHT_MAX);
        self.w_traditional = w_t;
        self.w_state = 1.0 - w_t;
        debug_assert!((self.w_traditional + self.w_state - 1.0).abs() < 1e-9);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_3_weight_update() {
        let mut weights = AdaptiveWeights::new();
        weights.report_gains(0.2, 0.0);
        assert!((weights.traditional() - 0.52).abs() < 1e-9);
        assert!((weights.state() - 0.48).abs() < 1e-9);
    }

    #[test]
    fn scenario_4_energy_multiplier() {
        let weights = AdaptiveWeights::new();
        let m = weights.energy(Some(0.4));
        assert!((m - 1.2).abs() < 1e-9);
    }

    #[test]
    fn energy_without_snapshot_is_neutral() {
        let weights = AdaptiveWeights::new();
        assert_eq!(weights.energy(None), 1.0);
    }

    #[test]
    fn weights_stay_normalized_and_clamped_under_repeated_updates() {
        let mut weights = AdaptiveWeights::new();
        for _ in 0..1000 {
            weights.report_gains(1.0, -1.0);
            assert!((weights.traditional() + weights.state() - 1.0).abs() < 1e-9);
            assert!(weights.traditional() >= WEIGHT_MIN - 1e-9);
            assert!(weights.traditional() <= WEIGHT_MAX + 1e-9);
        }
    }

    #[test]
    fn monotone_energy_in_diversity() {
        let weights = AdaptiveWeights::new();
        let m1 = weights.energy(Some(0.1));
        let m2 = weights.energy(Some(0.9));
        assert!(m1 <= m2);
    }
}
