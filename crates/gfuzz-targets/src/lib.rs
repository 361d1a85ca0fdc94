//! Runtime recorder library linked into the instrumented target process.
//!
//! Exposes the `extern "C"` ABI that the instrumentation inserter's call sites
//! resolve against: `record_numeric`, `record_char`, `record_string`,
//! `record_pointer`, `reset_states`, `get_state_snapshot`.

pub mod runtime;

#[cfg(feature = "stats")]
mod stats;

pub use runtime::{init_from_env, snapshot_vec};
