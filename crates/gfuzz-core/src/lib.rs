//! Framework-agnostic core of the variable-state-diversity feedback signal: the
//! data model, the diversity evaluator, and the adaptive scheduling controller.
//!
//! Nothing in this crate depends on a specific host fuzzer or on any particular
//! build-time analysis framework; [`gfuzz`](../gfuzz) and
//! [`gfuzz-cc`](../gfuzz-cc) build on top of it.

pub mod config;
pub mod diversity;
pub mod scheduler;
pub mod state;

pub use diversity::{evaluate, evaluate_and_maybe_admit, DiversityScore};
pub use scheduler::AdaptiveWeights;
pub use state::{classify, SlotKind, StateHistory, StateSnapshot};
