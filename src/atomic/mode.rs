//! CAS strength and the fixed orderings used by the named cell operations.

use core::sync::atomic::Ordering;

/// Ordering of `get`, `set`, `get_and_set`, strong CAS and fetch-add.
pub const FULL: Ordering = Ordering::SeqCst;
/// Ordering of `lazy_set`.
pub const LAZY: Ordering = Ordering::Release;
/// Ordering of `weak_compare_and_set`.
pub const WEAK: Ordering = Ordering::Relaxed;

/// Selects between the two compare-and-set contracts.
///
/// Both go through one entry point (`compare_exchange_with`); only the
/// permission to fail spuriously differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CasStrength {
    /// Fails only if the current value differs from the expected one.
    #[default]
    Strong,
    /// May fail even when the current value equals the expected one.
    ///
    /// Backends without a genuinely weak instruction run a strong CAS here;
    /// callers must still loop as if spurious failure were possible.
    Weak,
}

/// Returns the strongest failure ordering permitted alongside `success`.
///
/// A CAS failure is a load, so it cannot carry `Release` semantics.
#[inline]
pub const fn failure_ordering(success: Ordering) -> Ordering {
    match success {
        Ordering::Relaxed | Ordering::Release => Ordering::Relaxed,
        Ordering::Acquire | Ordering::AcqRel => Ordering::Acquire,
        _ => Ordering::SeqCst,
    }
}
