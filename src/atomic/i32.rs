use core::{
    fmt,
    sync::atomic::{AtomicI32, Ordering},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{
    mode::{failure_ordering, CasStrength, FULL, LAZY, WEAK},
    software::{self, NativeCas},
};

/// A 32-bit signed integer updated atomically.
///
/// Every operation compiles to a single native atomic instruction, except the
/// functional updates (`get_and_update` and friends), which run the shared
/// CAS retry loop. Arithmetic wraps on overflow.
///
/// # Examples
///
/// ```
/// use tessellate::AtomicInt32;
///
/// let hits = AtomicInt32::new(0);
/// hits.increment_and_get();
/// assert_eq!(hits.add_and_get(4), 5);
/// assert!(hits.compare_and_set(5, 0));
/// assert_eq!(hits.get(), 0);
/// ```
#[repr(transparent)]
pub struct AtomicInt32 {
    inner: AtomicI32,
}

impl AtomicInt32 {
    /// Creates a new cell holding `value`.
    #[inline(always)]
    pub const fn new(value: i32) -> Self {
        Self {
            inner: AtomicI32::new(value),
        }
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn get(&self) -> i32 {
        self.inner.load(FULL)
    }

    /// Stores `value`.
    #[inline(always)]
    pub fn set(&self, value: i32) {
        self.inner.store(value, FULL);
    }

    /// Stores `value` with release ordering only.
    ///
    /// Writes made by this thread before the call are visible to any thread
    /// that observes `value`, but the store itself is not ordered against this
    /// thread's later accesses. Other threads may keep reading the old value
    /// for a while; the calling thread always sees `value` on its next `get`.
    #[inline(always)]
    pub fn lazy_set(&self, value: i32) {
        self.inner.store(value, LAZY);
    }

    /// Stores `value`, returning the previous value.
    #[inline(always)]
    pub fn get_and_set(&self, value: i32) -> i32 {
        self.inner.swap(value, FULL)
    }

    /// Stores `update` if the current value equals `expect`.
    ///
    /// Returns `true` on success; on failure the value is unchanged.
    #[inline(always)]
    pub fn compare_and_set(&self, expect: i32, update: i32) -> bool {
        self.compare_exchange_with(expect, update, CasStrength::Strong, FULL)
            .is_ok()
    }

    /// Like [`compare_and_set`](Self::compare_and_set) but may fail spuriously
    /// and imposes no ordering on surrounding accesses.
    #[inline(always)]
    pub fn weak_compare_and_set(&self, expect: i32, update: i32) -> bool {
        self.compare_exchange_with(expect, update, CasStrength::Weak, WEAK)
            .is_ok()
    }

    /// The single CAS entry point.
    ///
    /// Returns `Ok(previous)` on success and `Err(observed)` on failure. The
    /// failure ordering is derived from `order`.
    #[inline(always)]
    pub fn compare_exchange_with(
        &self,
        current: i32,
        new: i32,
        strength: CasStrength,
        order: Ordering,
    ) -> Result<i32, i32> {
        let failure = failure_ordering(order);
        match strength {
            CasStrength::Strong => self.inner.compare_exchange(current, new, order, failure),
            CasStrength::Weak => self
                .inner
                .compare_exchange_weak(current, new, order, failure),
        }
    }

    /// Adds `delta`, returning the previous value.
    #[inline(always)]
    pub fn get_and_add(&self, delta: i32) -> i32 {
        self.inner.fetch_add(delta, FULL)
    }

    /// Adds `delta`, returning the new value.
    #[inline(always)]
    pub fn add_and_get(&self, delta: i32) -> i32 {
        self.get_and_add(delta).wrapping_add(delta)
    }

    /// Increments by one, returning the previous value.
    #[inline(always)]
    pub fn get_and_increment(&self) -> i32 {
        self.get_and_add(1)
    }

    /// Increments by one, returning the new value.
    #[inline(always)]
    pub fn increment_and_get(&self) -> i32 {
        self.add_and_get(1)
    }

    /// Decrements by one, returning the previous value.
    #[inline(always)]
    pub fn get_and_decrement(&self) -> i32 {
        self.get_and_add(-1)
    }

    /// Decrements by one, returning the new value.
    #[inline(always)]
    pub fn decrement_and_get(&self) -> i32 {
        self.add_and_get(-1)
    }

    /// Replaces the value with `f(current)`, returning the previous value.
    ///
    /// `f` may be called more than once when other threads interfere.
    #[inline]
    pub fn get_and_update<F>(&self, f: F) -> i32
    where
        F: FnMut(i32) -> i32,
    {
        self.run_update(f).0
    }

    /// Replaces the value with `f(current)`, returning the new value.
    #[inline]
    pub fn update_and_get<F>(&self, f: F) -> i32
    where
        F: FnMut(i32) -> i32,
    {
        self.run_update(f).1
    }

    /// Replaces the value with `f(current, x)`, returning the previous value.
    #[inline]
    pub fn get_and_accumulate<F>(&self, x: i32, mut f: F) -> i32
    where
        F: FnMut(i32, i32) -> i32,
    {
        self.run_update(|v| f(v, x)).0
    }

    /// Replaces the value with `f(current, x)`, returning the new value.
    #[inline]
    pub fn accumulate_and_get<F>(&self, x: i32, mut f: F) -> i32
    where
        F: FnMut(i32, i32) -> i32,
    {
        self.run_update(|v| f(v, x)).1
    }

    /// Loads with an explicit ordering.
    ///
    /// # Panics
    /// Panics if `order` is `Release` or `AcqRel`.
    #[inline(always)]
    pub fn load(&self, order: Ordering) -> i32 {
        self.inner.load(order)
    }

    /// Stores with an explicit ordering.
    ///
    /// # Panics
    /// Panics if `order` is `Acquire` or `AcqRel`.
    #[inline(always)]
    pub fn store(&self, value: i32, order: Ordering) {
        self.inner.store(value, order);
    }

    /// Returns a mutable reference to the value; no other thread can observe it.
    #[inline(always)]
    pub fn get_mut(&mut self) -> &mut i32 {
        self.inner.get_mut()
    }

    /// Consumes the cell, returning the value.
    #[inline(always)]
    pub fn into_inner(self) -> i32 {
        self.inner.into_inner()
    }

    #[inline]
    fn run_update<F>(&self, mut f: F) -> (i32, i32)
    where
        F: FnMut(i32) -> i32,
    {
        software::update(self, |v| f(*v))
    }
}

impl NativeCas for AtomicInt32 {
    type Value = i32;

    #[inline(always)]
    fn snapshot(&self) -> i32 {
        self.get()
    }

    #[inline(always)]
    fn try_commit(&self, current: &i32, new: i32, strength: CasStrength) -> Result<(), i32> {
        self.compare_exchange_with(*current, new, strength, FULL)
            .map(drop)
    }
}

impl Default for AtomicInt32 {
    fn default() -> Self {
        Self::new(0)
    }
}

impl From<i32> for AtomicInt32 {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for AtomicInt32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicInt32").field(&self.get()).finish()
    }
}

impl fmt::Display for AtomicInt32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.get(), f)
    }
}

impl Serialize for AtomicInt32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.get())
    }
}

impl<'de> Deserialize<'de> for AtomicInt32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i32::deserialize(deserializer).map(Self::new)
    }
}
