use std::cell::RefCell;
use std::rc::Rc;

use gfuzz_core::config::HISTORY_SIZE;
use libafl::executors::HasObservers;
use libafl::observers::MapObserver;
use libafl::stages::Stage;
use libafl::Error;
use libafl_bolts::tuples::{Handle, Handled, MatchNameRef};
use libafl_bolts::Named;

use crate::context::GfuzzContext;

/// Periodically measures `Δcov`/`Δstate` and feeds them into the adaptive
/// weight update (C6): `Δcov` is the fractional change in the edge observer's
/// `count_bytes() / usable_count()` ratio since the last call, and `Δstate` is
/// the fractional change in `history.count() / HISTORY_SIZE`.
pub struct GainReportStage<O, M> {
    context: Rc<RefCell<GfuzzContext>>,
    edge_observer_handle: Handle<O>,
    _map_observer: std::marker::PhantomData<M>,
}

impl<O, M> GainReportStage<O, M> {
    pub fn new(context: Rc<RefCell<GfuzzContext>>, edge_observer: &O) -> Self
    where
        M: MapObserver,
        O: AsRef<M> + Named,
    {
        Self {
            context,
            edge_observer_handle: edge_observer.handle(),
            _map_observer: std::marker::PhantomData,
        }
    }
}

impl<E, EM, S, Z, O, M> Stage<E, EM, S, Z> for GainReportStage<O, M>
where
    E: HasObservers,
    <E as HasObservers>::Observers: MatchNameRef,
    M: MapObserver,
    O: AsRef<M> + Named,
{
    fn should_restart(&mut self, _state: &mut S) -> Result<bool, Error> {
        Ok(true)
    }

    fn clear_progress(&mut self, _state: &mut S) -> Result<(), Error> {
        Ok(())
    }

    fn perform(
        &mut self,
        _fuzzer: &mut Z,
        executor: &mut E,
        state: &mut S,
        _manager: &mut EM,
    ) -> Result<(), Error> {
        let observers = executor.observers();
        let edge_observer = observers
            .get(&self.edge_observer_handle)
            .ok_or_else(|| Error::key_not_found("Cannot find edge observer"))?
            .as_ref();
        let covered = edge_observer.count_bytes();
        let total = edge_observer.usable_count().max(1);
        let edge_ratio = covered as f64 / total as f64;

        let mut ctx = self.context.borrow_mut();
        let history_fill = ctx.history().count() as f64 / HISTORY_SIZE as f64;
        ctx.report_gains(edge_ratio, history_fill);
        let _ = state;
        Ok(())
    }
}
