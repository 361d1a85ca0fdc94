//! The two environment variables of the external interface, read once at
//! [`crate::context::GfuzzContext::init`] time.

/// `GFUZZ_ENABLED=1` is the only value that turns the subsystem on; unset or any
/// other value disables it entirely, on both the target and the fuzzer side.
pub fn is_enabled() -> bool {
    std::env::var("GFUZZ_ENABLED").is_ok_and(|v| v == "1")
}

/// The POSIX shared-memory id for the state map, if present.
pub fn shmem_id() -> Option<String> {
    std::env::var("GFUZZ_SHM_ID").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_when_unset_or_not_exactly_one() {
        // SAFETY: test-only env mutation, no other thread touches this var.
        unsafe { std::env::remove_var("GFUZZ_ENABLED") };
        assert!(!is_enabled());
        unsafe { std::env::set_var("GFUZZ_ENABLED", "true") };
        assert!(!is_enabled());
        unsafe { std::env::set_var("GFUZZ_ENABLED", "1") };
        assert!(is_enabled());
        unsafe { std::env::remove_var("GFUZZ_ENABLED") };
    }
}
