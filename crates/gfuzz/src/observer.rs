use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use libafl::executors::ExitKind;
use libafl::observers::Observer;
use libafl::Error;
use libafl_bolts::Named;
use serde::{Deserialize, Serialize};

use crate::context::GfuzzContext;

/// Captures the instrumented target's live state map into a fresh snapshot after
/// every execution. Paired with [`crate::feedback::StateDiversityFeedback`]
/// through the shared [`GfuzzContext`]; this is the only component that touches
/// the shared-memory attach directly.
#[derive(Serialize, Deserialize)]
pub struct StateMapObserver {
    #[serde(skip, default = "default_context")]
    context: Rc<RefCell<GfuzzContext>>,
}

/// Placeholder used only if an observer is ever deserialized without its shared
/// context being re-wired by the caller; a degraded, unattached context.
fn default_context() -> Rc<RefCell<GfuzzContext>> {
    // `init(0)` never exceeds the fixed state-map size, so this cannot fail.
    Rc::new(RefCell::new(
        GfuzzContext::init(0).expect("zero key variables always fits the state map"),
    ))
}

impl StateMapObserver {
    pub fn new(context: Rc<RefCell<GfuzzContext>>) -> Self {
        Self { context }
    }
}

impl Named for StateMapObserver {
    fn name(&self) -> &Cow<'static, str> {
        static NAME: Cow<'static, str> = Cow::Borrowed("StateMapObserver");
        &NAME
    }
}

impl std::fmt::Debug for StateMapObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMapObserver").finish_non_exhaustive()
    }
}

impl<I, S> Observer<I, S> for StateMapObserver {
    fn post_exec(&mut self, _state: &mut S, _input: &I, _exit_kind: &ExitKind) -> Result<(), Error> {
        self.context.borrow_mut().capture_snapshot();
        Ok(())
    }
}
