use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use libafl::corpus::Testcase;
use libafl::executors::ExitKind;
use libafl::feedbacks::{Feedback, StateInitializer};
use libafl::Error;
use libafl_bolts::Named;

use crate::context::GfuzzContext;
use crate::sidecar::SeedSidecar;

/// The feedback half of C7: on `append_metadata`, consumes the snapshot the
/// paired [`crate::observer::StateMapObserver`] staged, evaluates its diversity
/// against history, and attaches a [`SeedSidecar`] to the testcase. This is also
/// where a new queue entry gets its per-seed sidecar allocated: a snapshot
/// captured during this execution takes priority, falling back to a sidecar
/// already persisted on disk for this seed (e.g. a corpus entry reloaded after a
/// restart, or a testcase added without running through the observer), and only
/// then to an uncaptured sidecar.
///
/// Never itself decides corpus admission (`is_interesting` always returns
/// `false`): it rides along with the host's own coverage feedback via
/// `feedback_or!`, the same composition used elsewhere for non-admission-deciding
/// feedbacks.
pub struct StateDiversityFeedback {
    context: Rc<RefCell<GfuzzContext>>,
}

impl StateDiversityFeedback {
    pub fn new(context: Rc<RefCell<GfuzzContext>>) -> Self {
        Self { context }
    }
}

impl Named for StateDiversityFeedback {
    fn name(&self) -> &Cow<'static, str> {
        static NAME: Cow<'static, str> = Cow::Borrowed("StateDiversityFeedback");
        &NAME
    }
}

impl<State> StateInitializer<State> for StateDiversityFeedback {}

impl<State, EM, I, Observers> Feedback<EM, I, Observers, State> for StateDiversityFeedback {
    fn is_interesting(
        &mut self,
        _state: &mut State,
        _manager: &mut EM,
        _input: &I,
        _observers: &Observers,
        _exit_kind: &ExitKind,
    ) -> Result<bool, Error> {
        Ok(false)
    }

    fn append_metadata(
        &mut self,
        _state: &mut State,
        _manager: &mut EM,
        _observers: &Observers,
        testcase: &mut Testcase<I>,
    ) -> Result<(), Error> {
        let mut ctx = self.context.borrow_mut();

        if !ctx.is_enabled() {
            let sidecar = restore_sidecar(testcase).unwrap_or_else(SeedSidecar::not_captured);
            testcase.metadata_map_mut().insert(sidecar);
            return Ok(());
        }

        let sidecar = match ctx.take_pending_snapshot() {
            Some(snapshot) => {
                let diversity = ctx.evaluate_and_admit(snapshot.clone());
                SeedSidecar::captured(snapshot, diversity)
            }
            None => restore_sidecar(testcase).unwrap_or_else(SeedSidecar::not_captured),
        };

        if let Some(path) = testcase.file_path() {
            if let Err(e) = crate::sidecar::save(path, &sidecar) {
                tracing::warn!(error = %e, "failed to persist gfuzz state sidecar");
            }
        }
        testcase.metadata_map_mut().insert(sidecar);
        Ok(())
    }
}

/// Load a previously persisted sidecar for `testcase`'s seed file, if any. This
/// is what allocates a new queue entry's sidecar from an on-disk corpus reload
/// instead of discarding whatever an earlier run already captured for it.
fn restore_sidecar<I>(testcase: &Testcase<I>) -> Option<SeedSidecar> {
    let Some(path) = testcase.file_path() else {
        return None;
    };
    match crate::sidecar::load(path) {
        Ok(sidecar) => sidecar,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read gfuzz state sidecar");
            None
        }
    }
}
