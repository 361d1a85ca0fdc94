//! Restores the small stats/debug facility the original instrumentation shipped
//! behind `GFUZZ_STATS` (`__gfuzz_print_stats`, a destructor printing total
//! recorder invocations and the active-variable count at process exit), logged
//! through `tracing` rather than a bare `fprintf` to stderr.

use std::sync::atomic::Ordering;

use crate::runtime::{self, INVOCATIONS};

#[ctor::dtor]
fn print_stats_on_exit() {
    let total = INVOCATIONS.load(Ordering::Relaxed);
    let active_vars = runtime::active_var_count();
    tracing::info!(
        total_invocations = total,
        active_vars,
        "gfuzz runtime recorder stats"
    );
}
