//! Cold start detection.
//!
//! The first invocation handled by this process is a cold start. Provisioned
//! concurrency environments are initialised ahead of traffic, so they never
//! report one.

use std::sync::atomic::{AtomicBool, Ordering};

static FIRST_INVOCATION: AtomicBool = AtomicBool::new(true);

/// Returns `true` exactly once per process, on the first invocation.
pub fn take_cold_start() -> bool {
    let first = FIRST_INVOCATION.swap(false, Ordering::SeqCst);

    let provisioned = std::env::var("AWS_LAMBDA_INITIALIZATION_TYPE")
        .is_ok_and(|v| v == "provisioned-concurrency");

    first && !provisioned
}

#[cfg(test)]
pub(crate) fn reset() {
    FIRST_INVOCATION.store(true, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_only_first_invocation_is_cold() {
        reset();

        assert!(take_cold_start());
        assert!(!take_cold_start());
        assert!(!take_cold_start());
    }

    #[test]
    #[serial]
    fn test_provisioned_concurrency_is_never_cold() {
        reset();

        temp_env::with_var(
            "AWS_LAMBDA_INITIALIZATION_TYPE",
            Some("provisioned-concurrency"),
            || {
                assert!(!take_cold_start());
                assert!(!take_cold_start());
            },
        );
    }

    #[test]
    #[serial]
    fn test_on_demand_is_cold() {
        reset();

        temp_env::with_var("AWS_LAMBDA_INITIALIZATION_TYPE", Some("on-demand"), || {
            assert!(take_cold_start());
        });
    }
}
