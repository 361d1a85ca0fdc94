//! Fuzzer integration surface (C7): the context, observer, feedback, power
//! schedule wrapper, and gain-reporting stage a host fuzzer built on `libafl`
//! wires in alongside its own coverage feedback and power schedule.

pub mod context;
pub mod env;
pub mod error;
pub mod feedback;
pub mod observer;
pub mod sidecar;
pub mod stage;
pub mod testcase_score;

pub use context::GfuzzContext;
pub use error::GfuzzError;
pub use feedback::StateDiversityFeedback;
pub use observer::StateMapObserver;
pub use sidecar::SeedSidecar;
pub use stage::GainReportStage;
pub use testcase_score::GfuzzTestcaseScore;
