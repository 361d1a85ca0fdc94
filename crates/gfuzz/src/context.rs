//! The shared state backing the fuzzer integration surface (C7): the adaptive
//! weights, the state history, and the attached shared-memory state map.
//!
//! Per the concurrency model (single-threaded cooperative on the fuzzer side),
//! this is a plain `RefCell`-shared value rather than anything lock-based: the
//! observer and feedback are always driven from the same thread, between target
//! executions, never concurrently.

use gfuzz_core::config::{HISTORY_SIZE, VAR_MAP_SIZE};
use gfuzz_core::{AdaptiveWeights, StateHistory, StateSnapshot};
use libafl_bolts::shmem::{ShMem, ShMemId, ShMemProvider, UnixShMem, UnixShMemProvider};
use tracing::warn;

use crate::env;
use crate::error::GfuzzError;

/// Everything C7's operations need, attached once at fuzzer startup.
pub struct GfuzzContext {
    enabled: bool,
    weights: AdaptiveWeights,
    history: StateHistory,
    num_key_vars: usize,
    shmem: Option<UnixShMem>,
    /// The most recently captured snapshot, staged by the observer and consumed
    /// by the feedback on the same execution.
    pending_snapshot: Option<StateSnapshot>,
    last_edge_ratio: Option<f64>,
    last_history_fill: Option<f64>,
}

impl GfuzzContext {
    /// Construct the context and attempt to attach to the target's state-map
    /// shared memory. A missing `GFUZZ_ENABLED`/`GFUZZ_SHM_ID`, or a failed attach,
    /// degrades to a no-op context rather than aborting the fuzzer. Only a
    /// `num_key_vars` that cannot fit the fixed state map is fatal: continuing
    /// would silently track a truncated subset of the key variables the
    /// build-time pass identified.
    pub fn init(num_key_vars: usize) -> Result<Self, GfuzzError> {
        if num_key_vars > VAR_MAP_SIZE {
            return Err(GfuzzError::KeyVarCountExceeds {
                requested: num_key_vars,
                max: VAR_MAP_SIZE,
            });
        }

        let enabled = env::is_enabled();
        if !enabled {
            warn!("GFUZZ_ENABLED not set to \"1\", gfuzz running in degraded (no-op) mode");
        }

        let shmem = enabled.then(|| Self::attach_shmem(num_key_vars)).flatten();

        Ok(Self {
            enabled: enabled && shmem.is_some(),
            weights: AdaptiveWeights::new(),
            history: StateHistory::new(HISTORY_SIZE, num_key_vars),
            num_key_vars,
            shmem,
            pending_snapshot: None,
            last_edge_ratio: None,
            last_history_fill: None,
        })
    }

    fn attach_shmem(num_key_vars: usize) -> Option<UnixShMem> {
        let Some(id) = env::shmem_id() else {
            warn!("GFUZZ_SHM_ID not set, gfuzz running in degraded (no-op) mode");
            return None;
        };
        let mut provider = match UnixShMemProvider::new() {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "creating shared memory provider failed, gfuzz degraded");
                return None;
            }
        };
        let size = num_key_vars.max(1) * std::mem::size_of::<u32>();
        match provider.shmem_from_id_and_size(ShMemId::from_string(&id), size) {
            Ok(shmem) => Some(shmem),
            Err(e) => {
                warn!(error = %e, shmem_id = %id, "attaching state-map shared memory failed, gfuzz degraded");
                None
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn weights(&self) -> &AdaptiveWeights {
        &self.weights
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn num_key_vars(&self) -> usize {
        self.num_key_vars
    }

    /// Copy the live state map out of shared memory into a fresh snapshot, if
    /// attached. Stages the result for the feedback to pick up.
    pub fn capture_snapshot(&mut self) {
        let Some(shmem) = self.shmem.as_ref() else {
            self.pending_snapshot = None;
            return;
        };
        let words: &[u32] = bytemuck_words(shmem.as_slice());
        self.pending_snapshot = Some(StateSnapshot::from_raw(words));
    }

    pub fn take_pending_snapshot(&mut self) -> Option<StateSnapshot> {
        self.pending_snapshot.take()
    }

    /// Evaluate `snapshot` against history, cache its scores, admit it if it
    /// clears the diversity threshold, and return the diversity score.
    pub fn evaluate_and_admit(&mut self, snapshot: StateSnapshot) -> f64 {
        gfuzz_core::evaluate_and_maybe_admit(snapshot, &mut self.history)
    }

    pub fn combined_score(&self, traditional: f64, state_diversity: f64) -> f64 {
        self.weights.combined_score(traditional, state_diversity)
    }

    pub fn energy(&self, state_diversity: Option<f64>) -> f64 {
        self.weights.energy(state_diversity)
    }

    /// Compute `Δcov`/`Δstate` from the current raw readings against the last
    /// reported ones, apply the weight update, and store the new readings.
    /// Reports `0.0` for either gain on the first call (no prior reading yet).
    pub fn report_gains(&mut self, edge_ratio: f64, history_fill: f64) {
        let delta_cov = self
            .last_edge_ratio
            .map(|prev| (edge_ratio - prev).clamp(-1.0, 1.0))
            .unwrap_or(0.0);
        let delta_state = self
            .last_history_fill
            .map(|prev| (history_fill - prev).clamp(-1.0, 1.0))
            .unwrap_or(0.0);

        self.weights.report_gains(delta_cov, delta_state);
        self.last_edge_ratio = Some(edge_ratio);
        self.last_history_fill = Some(history_fill);
    }
}

/// Reinterpret a shared-memory byte slice as `u32` words, truncating any
/// trailing partial word. The buffer is laid out by the runtime recorder as a
/// flat array of native-endian `u32`s, so no byte-swapping is needed.
fn bytemuck_words(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_ne_bytes(chunk.try_into().expect("chunks_exact(4) yields len 4")))
        .collect()
}
