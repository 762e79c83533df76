//! Structural self-checks for queue and traversal state.
//!
//! Checks are cheap enough for tests but too slow for the hot path, so the
//! engine only runs them through [`debug_invariants!`](crate::debug_invariants)
//! in debug builds or with the `strict-invariants` / `check-invariants`
//! features.

use crate::region_error::RegionError;

/// Types whose internal consistency can be verified on demand.
pub trait DebugInvariants {
    /// Panic on the first violation when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Return the first violation found, if any.
    fn validate_invariants(&self) -> Result<(), RegionError>;
}

/// Turn a failed condition into [`RegionError::InvariantViolation`].
#[inline]
pub(crate) fn ensure(cond: bool, what: impl FnOnce() -> String) -> Result<(), RegionError> {
    if cond {
        Ok(())
    } else {
        Err(RegionError::InvariantViolation(what()))
    }
}

/// Evaluate a `Result`-returning check and panic with context on `Err`.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
