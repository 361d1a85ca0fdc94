//! The energy half of C6: a [`TestcaseScore`] wrapper that multiplies any base
//! power schedule's score by the energy multiplier `1 + gamma * diversity`.

use std::marker::PhantomData;

use gfuzz_core::config::ENERGY_GAMMA;
use libafl::corpus::Testcase;
use libafl::schedulers::powersched::TestcaseScore;
use libafl::{Error, HasMetadata};

use crate::sidecar::SeedSidecar;

/// Wraps a base power schedule (e.g. `libafl::schedulers::powersched::CoeTestcaseScore`)
/// and scales its result by this seed's cached state-diversity energy
/// multiplier. A seed without a captured snapshot gets multiplier `1.0`, leaving
/// the base schedule's score unchanged.
pub struct GfuzzTestcaseScore<Base> {
    _base: PhantomData<Base>,
}

impl<Base, I, S> TestcaseScore<I, S> for GfuzzTestcaseScore<Base>
where
    Base: TestcaseScore<I, S>,
{
    fn compute(state: &mut S, entry: &mut Testcase<I>) -> Result<f64, Error> {
        let base_score = Base::compute(state, entry)?;
        let diversity = entry
            .metadata_map()
            .get::<SeedSidecar>()
            .filter(|s| s.captured)
            .map(|s| s.diversity);
        let energy = match diversity {
            Some(d) => 1.0 + ENERGY_GAMMA * d,
            None => 1.0,
        };
        Ok(base_score * energy)
    }
}
