use crate::grid_error::GridError;

/// Trait for validating data structure invariants.
///
/// `validate_invariants` is always available and performs the full (possibly
/// linear-time) check. `debug_assert_invariants` panics on the first violation
/// and is what constructors call when invariant checking is enabled.
pub trait DebugInvariants {
    /// Assert invariants in debug builds or when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), GridError>;
}

/// Helper macro to run a fallible check and panic on error when invariant
/// checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}

/// `inv_assert*` fire in debug builds and whenever the `strict-invariants`
/// feature is enabled; they compile to no-ops otherwise.
#[cfg(any(debug_assertions, feature = "strict-invariants"))]
macro_rules! inv_assert {
    ($($tt:tt)*) => { assert!($($tt)*); };
}
#[cfg(not(any(debug_assertions, feature = "strict-invariants")))]
macro_rules! inv_assert {
    ($($tt:tt)*) => {
        ()
    };
}
pub(crate) use inv_assert;

/// Whether the expensive construction-time checks run in this build.
#[inline]
pub const fn checks_enabled() -> bool {
    cfg!(any(debug_assertions, feature = "strict-invariants"))
}
