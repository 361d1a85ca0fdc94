//! The runtime recorder (C4): the small library linked into the instrumented
//! target. Holds the live state map as process-wide storage and exposes the
//! `extern "C"` ABI that instrumentation calls resolve against.
//!
//! Recorders are not synchronized: the target is assumed single-threaded for the
//! purposes of state recording, and a racing write to the same slot is accepted
//! as lossy behavior rather than guarded against.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use gfuzz_core::config::{MAX_STRING_LEN, VAR_MAP_SIZE};

const CHAR_TAG: u32 = 0x0100_0000;

static ENABLED: AtomicBool = AtomicBool::new(false);
static STATE: [AtomicU32; VAR_MAP_SIZE] = [const { AtomicU32::new(0) }; VAR_MAP_SIZE];

#[cfg(feature = "stats")]
pub(crate) static INVOCATIONS: AtomicU32 = AtomicU32::new(0);

/// Read `GFUZZ_ENABLED` and flip the global recorder switch accordingly. Called
/// once at process start; every recorder call is a near-free no-op when this has
/// not been called or the variable was not exactly `"1"`.
pub fn init_from_env() {
    let on = std::env::var("GFUZZ_ENABLED").is_ok_and(|v| v == "1");
    ENABLED.store(on, Ordering::Relaxed);
    if on {
        tracing::debug!("gfuzz runtime recorder enabled");
    }
}

#[inline]
fn enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

#[inline]
fn store(var_id: u32, value: u32) {
    if let Some(slot) = STATE.get(var_id as usize) {
        slot.store(value, Ordering::Relaxed);
        #[cfg(feature = "stats")]
        INVOCATIONS.fetch_add(1, Ordering::Relaxed);
    }
}

/// Record the terminal value of a numeric or pointer-typed variable unchanged.
#[unsafe(no_mangle)]
pub extern "C" fn record_numeric(var_id: u32, value: u32) {
    if !enabled() {
        return;
    }
    store(var_id, value);
}

/// Record a single byte value, tagged with the char marker in the upper byte.
#[unsafe(no_mangle)]
pub extern "C" fn record_char(var_id: u32, value: u8) {
    if !enabled() {
        return;
    }
    store(var_id, CHAR_TAG | value as u32);
}

/// Record a C string: DJB2 hash of up to `MAX_STRING_LEN` bytes in the low 24
/// bits, clamped length in the upper byte. A null pointer is silently dropped.
///
/// # Safety
/// `value` must be null or point to a NUL-terminated byte sequence valid to read
/// for at least `min(strlen(value), MAX_STRING_LEN)` bytes, the contract the
/// instrumented call site is responsible for upholding.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn record_string(var_id: u32, value: *const u8) {
    if !enabled() || value.is_null() {
        return;
    }
    let mut hash: u32 = 5381;
    let mut len: usize = 0;
    while len < MAX_STRING_LEN {
        let byte = unsafe { *value.add(len) };
        if byte == 0 {
            break;
        }
        hash = hash.wrapping_mul(33).wrapping_add(byte as u32);
        len += 1;
    }
    let clamped_len = len.min(255) as u32;
    store(var_id, (hash & 0x00FF_FFFF) | (clamped_len << 24));
}

/// Record a pointer's address, truncated to the low 32 bits.
#[unsafe(no_mangle)]
pub extern "C" fn record_pointer(var_id: u32, value: *const core::ffi::c_void) {
    if !enabled() {
        return;
    }
    store(var_id, value as usize as u32);
}

/// Zero the entire live state map. Invoked by the fuzzer between executions of a
/// persistent target; a non-persistent target gets the same effect implicitly via
/// process restart.
#[unsafe(no_mangle)]
pub extern "C" fn reset_states() {
    for slot in STATE.iter() {
        slot.store(0, Ordering::Relaxed);
    }
}

/// Copy up to `size` slots of the live state map into `buffer`.
///
/// # Safety
/// `buffer` must be valid to write `size` `u32`s.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn get_state_snapshot(buffer: *mut u32, size: usize) {
    let n = size.min(VAR_MAP_SIZE);
    for i in 0..n {
        let value = STATE[i].load(Ordering::Relaxed);
        unsafe { buffer.add(i).write(value) };
    }
}

/// Safe, in-process accessor used by the fuzzer-side ABI wrapper when it shares
/// an address space with the target (e.g. persistent-mode in-process execution)
/// instead of attaching to a separate shared-memory segment.
pub fn snapshot_vec() -> Vec<u32> {
    STATE.iter().map(|s| s.load(Ordering::Relaxed)).collect()
}

/// Count of state map slots holding a non-zero value, i.e. variables that have
/// recorded at least one update since the last reset.
pub fn active_var_count() -> usize {
    STATE
        .iter()
        .filter(|s| s.load(Ordering::Relaxed) != 0)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_enabled<T>(f: impl FnOnce() -> T) -> T {
        ENABLED.store(true, Ordering::Relaxed);
        let result = f();
        reset_states();
        ENABLED.store(false, Ordering::Relaxed);
        result
    }

    #[test]
    fn scenario_5_djb2_hash_of_ab() {
        with_enabled(|| {
            let s = std::ffi::CString::new("ab").unwrap();
            unsafe { record_string(3, s.as_ptr() as *const u8) };
            assert_eq!(STATE[3].load(Ordering::Relaxed), 0x02_597728);
        });
    }

    #[test]
    fn scenario_6_char_overwrite() {
        with_enabled(|| {
            record_char(7, b'A');
            record_char(7, b'B');
            assert_eq!(STATE[7].load(Ordering::Relaxed), 0x0100_0042);
        });
    }

    #[test]
    fn disabled_recorder_is_a_no_op() {
        ENABLED.store(false, Ordering::Relaxed);
        record_numeric(0, 123);
        assert_eq!(STATE[0].load(Ordering::Relaxed), 0);
    }

    #[test]
    fn out_of_range_var_id_is_dropped() {
        with_enabled(|| {
            // Must not panic.
            record_numeric(VAR_MAP_SIZE as u32 + 10, 1);
        });
    }

    #[test]
    fn null_string_pointer_is_dropped() {
        with_enabled(|| {
            unsafe { record_string(9, std::ptr::null()) };
            assert_eq!(STATE[9].load(Ordering::Relaxed), 0);
        });
    }
}
