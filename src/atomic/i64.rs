use core::{fmt, sync::atomic::Ordering};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{
    mode::{CasStrength, FULL, LAZY, WEAK},
    software::{self, NativeCas},
};

// Targets with native 64-bit atomics use them directly. Narrow-word targets
// keep the value in a crossbeam `AtomicCell`, whose only primitive we rely on
// is its full-width compare-exchange; every read-modify-write then runs the
// shared software loop.
#[cfg(target_has_atomic = "64")]
type Slot = core::sync::atomic::AtomicI64;
#[cfg(not(target_has_atomic = "64"))]
type Slot = crossbeam_utils::atomic::AtomicCell<i64>;

/// A 64-bit signed integer updated atomically.
///
/// On targets with native 64-bit atomics each operation is one instruction.
/// Elsewhere, loads, stores and CAS use the widest CAS available and
/// arithmetic becomes a read-compute-CAS loop. Reads are never torn on either
/// path, and arithmetic wraps on overflow.
///
/// # Examples
///
/// ```
/// use tessellate::AtomicInt64;
///
/// let sequence = AtomicInt64::new(i64::MAX);
/// assert_eq!(sequence.increment_and_get(), i64::MIN);
/// ```
#[repr(transparent)]
pub struct AtomicInt64 {
    inner: Slot,
}

impl AtomicInt64 {
    /// Creates a new cell holding `value`.
    #[inline(always)]
    pub const fn new(value: i64) -> Self {
        Self {
            inner: Slot::new(value),
        }
    }

    /// Reports whether this target runs every operation natively.
    #[inline]
    pub const fn is_native() -> bool {
        cfg!(target_has_atomic = "64")
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn get(&self) -> i64 {
        self.load(FULL)
    }

    /// Stores `value`.
    #[inline(always)]
    pub fn set(&self, value: i64) {
        self.store(value, FULL);
    }

    /// Stores `value` with release ordering only.
    ///
    /// See [`AtomicInt32::lazy_set`](crate::AtomicInt32::lazy_set).
    #[inline(always)]
    pub fn lazy_set(&self, value: i64) {
        self.store(value, LAZY);
    }

    /// Stores `value`, returning the previous value.
    #[inline(always)]
    pub fn get_and_set(&self, value: i64) -> i64 {
        #[cfg(target_has_atomic = "64")]
        {
            self.inner.swap(value, FULL)
        }
        #[cfg(not(target_has_atomic = "64"))]
        {
            self.inner.swap(value)
        }
    }

    /// Stores `update` if the current value equals `expect`.
    #[inline(always)]
    pub fn compare_and_set(&self, expect: i64, update: i64) -> bool {
        self.compare_exchange_with(expect, update, CasStrength::Strong, FULL)
            .is_ok()
    }

    /// Like [`compare_and_set`](Self::compare_and_set) but may fail spuriously
    /// and imposes no ordering on surrounding accesses.
    #[inline(always)]
    pub fn weak_compare_and_set(&self, expect: i64, update: i64) -> bool {
        self.compare_exchange_with(expect, update, CasStrength::Weak, WEAK)
            .is_ok()
    }

    /// The single CAS entry point.
    ///
    /// Returns `Ok(previous)` on success and `Err(observed)` on failure. On the
    /// fallback backend both strengths run the same strong CAS and `order` is
    /// strengthened to sequential consistency.
    #[inline(always)]
    pub fn compare_exchange_with(
        &self,
        current: i64,
        new: i64,
        strength: CasStrength,
        order: Ordering,
    ) -> Result<i64, i64> {
        #[cfg(target_has_atomic = "64")]
        {
            let failure = super::mode::failure_ordering(order);
            match strength {
                CasStrength::Strong => self.inner.compare_exchange(current, new, order, failure),
                CasStrength::Weak => self
                    .inner
                    .compare_exchange_weak(current, new, order, failure),
            }
        }
        #[cfg(not(target_has_atomic = "64"))]
        {
            let _ = (strength, order);
            self.inner.compare_exchange(current, new)
        }
    }

    /// Adds `delta`, returning the previous value.
    #[inline(always)]
    pub fn get_and_add(&self, delta: i64) -> i64 {
        #[cfg(target_has_atomic = "64")]
        {
            self.inner.fetch_add(delta, FULL)
        }
        #[cfg(not(target_has_atomic = "64"))]
        {
            software::fetch_add(self, delta)
        }
    }

    /// Adds `delta`, returning the new value.
    #[inline(always)]
    pub fn add_and_get(&self, delta: i64) -> i64 {
        self.get_and_add(delta).wrapping_add(delta)
    }

    /// Increments by one, returning the previous value.
    #[inline(always)]
    pub fn get_and_increment(&self) -> i64 {
        self.get_and_add(1)
    }

    /// Increments by one, returning the new value.
    #[inline(always)]
    pub fn increment_and_get(&self) -> i64 {
        self.add_and_get(1)
    }

    /// Decrements by one, returning the previous value.
    #[inline(always)]
    pub fn get_and_decrement(&self) -> i64 {
        self.get_and_add(-1)
    }

    /// Decrements by one, returning the new value.
    #[inline(always)]
    pub fn decrement_and_get(&self) -> i64 {
        self.add_and_get(-1)
    }

    /// Replaces the value with `f(current)`, returning the previous value.
    ///
    /// `f` may be called more than once when other threads interfere.
    #[inline]
    pub fn get_and_update<F>(&self, mut f: F) -> i64
    where
        F: FnMut(i64) -> i64,
    {
        software::update(self, |v| f(*v)).0
    }

    /// Replaces the value with `f(current)`, returning the new value.
    #[inline]
    pub fn update_and_get<F>(&self, mut f: F) -> i64
    where
        F: FnMut(i64) -> i64,
    {
        software::update(self, |v| f(*v)).1
    }

    /// Replaces the value with `f(current, x)`, returning the previous value.
    #[inline]
    pub fn get_and_accumulate<F>(&self, x: i64, mut f: F) -> i64
    where
        F: FnMut(i64, i64) -> i64,
    {
        software::update(self, |v| f(*v, x)).0
    }

    /// Replaces the value with `f(current, x)`, returning the new value.
    #[inline]
    pub fn accumulate_and_get<F>(&self, x: i64, mut f: F) -> i64
    where
        F: FnMut(i64, i64) -> i64,
    {
        software::update(self, |v| f(*v, x)).1
    }

    /// Loads with an explicit ordering.
    ///
    /// # Panics
    /// Panics if `order` is `Release` or `AcqRel`.
    #[inline(always)]
    pub fn load(&self, order: Ordering) -> i64 {
        #[cfg(target_has_atomic = "64")]
        {
            self.inner.load(order)
        }
        #[cfg(not(target_has_atomic = "64"))]
        {
            let _ = order;
            self.inner.load()
        }
    }

    /// Stores with an explicit ordering.
    ///
    /// # Panics
    /// Panics if `order` is `Acquire` or `AcqRel`.
    #[inline(always)]
    pub fn store(&self, value: i64, order: Ordering) {
        #[cfg(target_has_atomic = "64")]
        {
            self.inner.store(value, order);
        }
        #[cfg(not(target_has_atomic = "64"))]
        {
            let _ = order;
            self.inner.store(value);
        }
    }

    /// Returns a mutable reference to the value; no other thread can observe it.
    #[inline(always)]
    pub fn get_mut(&mut self) -> &mut i64 {
        #[cfg(target_has_atomic = "64")]
        {
            self.inner.get_mut()
        }
        #[cfg(not(target_has_atomic = "64"))]
        {
            // SAFETY: `&mut self` rules out any concurrent access to the cell.
            unsafe { &mut *self.inner.as_ptr() }
        }
    }

    /// Consumes the cell, returning the value.
    #[inline(always)]
    pub fn into_inner(self) -> i64 {
        self.inner.into_inner()
    }
}

impl NativeCas for AtomicInt64 {
    type Value = i64;

    #[inline(always)]
    fn snapshot(&self) -> i64 {
        self.get()
    }

    #[inline(always)]
    fn try_commit(&self, current: &i64, new: i64, strength: CasStrength) -> Result<(), i64> {
        self.compare_exchange_with(*current, new, strength, FULL)
            .map(drop)
    }
}

impl Default for AtomicInt64 {
    fn default() -> Self {
        Self::new(0)
    }
}

impl From<i64> for AtomicInt64 {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for AtomicInt64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicInt64").field(&self.get()).finish()
    }
}

impl fmt::Display for AtomicInt64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.get(), f)
    }
}

impl Serialize for AtomicInt64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.get())
    }
}

impl<'de> Deserialize<'de> for AtomicInt64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_values_wider_than_32_bits() {
        let a = AtomicInt64::new(1 << 40);
        assert_eq!(a.add_and_get(1 << 40), 1 << 41);
        assert_eq!(a.get_and_set(-(1 << 50)), 1 << 41);
        assert_eq!(a.get(), -(1 << 50));
    }

    #[test]
    fn compare_and_set_is_exact() {
        let a = AtomicInt64::new(0);
        assert!(!a.compare_and_set(1, 2));
        assert_eq!(a.get(), 0);
        assert!(a.compare_and_set(0, 2));
        assert_eq!(a.get(), 2);
    }

    #[test]
    fn arithmetic_wraps() {
        let a = AtomicInt64::new(i64::MIN);
        assert_eq!(a.decrement_and_get(), i64::MAX);
        assert_eq!(a.get_and_increment(), i64::MAX);
        assert_eq!(a.get(), i64::MIN);
    }

    #[test]
    fn software_loop_matches_native_fetch_add() {
        let a = AtomicInt64::new(5);
        assert_eq!(software::fetch_add(&a, -7), 5);
        assert_eq!(a.get(), -2);
        assert_eq!(a.get_and_add(2), -2);
        assert_eq!(a.get(), 0);
    }

    #[test]
    fn functional_updates() {
        let a = AtomicInt64::default();
        assert_eq!(a.update_and_get(|v| v - 3), -3);
        assert_eq!(a.get_and_accumulate(10, |v, x| v * x), -3);
        assert_eq!(a.accumulate_and_get(1, i64::min), -30);
        assert_eq!(a.get_and_update(i64::abs), -30);
        assert_eq!(a.get(), 30);
    }

    #[test]
    fn lazy_set_then_get_observes_value() {
        let a = AtomicInt64::new(1);
        a.lazy_set(i64::MAX);
        assert_eq!(a.get(), i64::MAX);
    }

    #[test]
    fn exclusive_access() {
        let mut a = AtomicInt64::new(8);
        *a.get_mut() *= 2;
        assert_eq!(a.into_inner(), 16);
    }
}
