//! Software read-compute-CAS loop shared by every cell.
//!
//! Any operation that is not a single native instruction (functional updates,
//! and fetch-add on targets lacking a 64-bit adder) is expressed here as a
//! retry loop over the cell's own CAS. The loop never yields to the scheduler:
//! contention is absorbed with `Backoff::spin`, and it terminates only by
//! committing.

use crossbeam_utils::Backoff;
use num_traits::WrappingAdd;

use super::mode::CasStrength;

/// A cell exposing a native compare-and-set of its full width.
pub(crate) trait NativeCas {
    /// The value stored in the cell.
    type Value: Clone;

    /// Loads the current value with full ordering.
    fn snapshot(&self) -> Self::Value;

    /// Replaces `current` with `new` using full ordering.
    ///
    /// Returns the value actually observed on failure.
    fn try_commit(
        &self,
        current: &Self::Value,
        new: Self::Value,
        strength: CasStrength,
    ) -> Result<(), Self::Value>;
}

/// Applies `f` until a commit succeeds, returning `(previous, committed)`.
///
/// `f` may run several times under contention and must be free of side
/// effects that cannot be repeated.
pub(crate) fn update<C, F>(cell: &C, mut f: F) -> (C::Value, C::Value)
where
    C: NativeCas + ?Sized,
    F: FnMut(&C::Value) -> C::Value,
{
    let backoff = Backoff::new();
    let mut current = cell.snapshot();
    loop {
        let next = f(&current);
        // Weak is enough: a spurious failure just costs another iteration.
        match cell.try_commit(&current, next.clone(), CasStrength::Weak) {
            Ok(()) => return (current, next),
            Err(observed) => {
                current = observed;
                backoff.spin();
            }
        }
    }
}

/// Wrapping fetch-add built from the cell's CAS.
#[cfg_attr(all(target_has_atomic = "64", not(test)), allow(dead_code))]
pub(crate) fn fetch_add<C>(cell: &C, delta: C::Value) -> C::Value
where
    C: NativeCas + ?Sized,
    C::Value: WrappingAdd,
{
    update(cell, |v| v.wrapping_add(&delta)).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    /// Single-threaded cell that fails the first `spurious` commits.
    struct Flaky {
        value: Cell<i32>,
        spurious: Cell<u32>,
    }

    impl NativeCas for Flaky {
        type Value = i32;

        fn snapshot(&self) -> i32 {
            self.value.get()
        }

        fn try_commit(&self, current: &i32, new: i32, _: CasStrength) -> Result<(), i32> {
            if self.spurious.get() > 0 {
                self.spurious.set(self.spurious.get() - 1);
                return Err(self.value.get());
            }
            if self.value.get() == *current {
                self.value.set(new);
                Ok(())
            } else {
                Err(self.value.get())
            }
        }
    }

    #[test]
    fn update_retries_through_spurious_failures() {
        let cell = Flaky {
            value: Cell::new(10),
            spurious: Cell::new(3),
        };
        let mut calls = 0;
        let (prev, next) = update(&cell, |v| {
            calls += 1;
            v * 2
        });
        assert_eq!((prev, next), (10, 20));
        assert_eq!(calls, 4);
        assert_eq!(cell.value.get(), 20);
    }

    #[test]
    fn fetch_add_wraps() {
        let cell = Flaky {
            value: Cell::new(i32::MAX),
            spurious: Cell::new(0),
        };
        assert_eq!(fetch_add(&cell, 1), i32::MAX);
        assert_eq!(cell.value.get(), i32::MIN);
    }
}
