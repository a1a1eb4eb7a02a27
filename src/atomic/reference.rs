//! Atomic cell over a shared, reference-counted handle.
//!
//! The payload type is `Option<Arc<T>>`: the cell only ever stores handles whose
//! lifetime is managed by reference counting, so reclamation safety is part of
//! the type rather than a property borrowed from a collector. The slot is an
//! `arc_swap::ArcSwapOption`, whose debt list protects a reader between loading
//! the pointer and taking its reference; a concurrent replace therefore never
//! frees a referent that a `get` is still acquiring.

use core::{fmt, ptr};
use std::sync::Arc;

use arc_swap::{ArcSwapOption, Guard};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};

use super::{
    mode::CasStrength,
    software::{self, NativeCas},
};

/// A nullable shared handle updated atomically.
///
/// Compare-and-set matches by identity ([`Arc::ptr_eq`], with null matching
/// null), never by value equality. Every referent is a fully constructed
/// `Arc<T>` before it can be stored, and every store publishes with at least
/// release ordering, so a `get` never observes a partially built value.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tessellate::AtomicReference;
///
/// let config = AtomicReference::from_value(String::from("v1"));
/// let current = config.get().unwrap();
/// assert!(config.compare_and_set(Some(&current), Some(Arc::new("v2".into()))));
/// assert_eq!(config.get().as_deref().map(String::as_str), Some("v2"));
/// ```
pub struct AtomicReference<T> {
    slot: ArcSwapOption<T>,
}

impl<T> AtomicReference<T> {
    /// Creates a new cell holding `value`.
    pub fn new(value: Option<Arc<T>>) -> Self {
        Self {
            slot: ArcSwapOption::new(value),
        }
    }

    /// Creates a cell holding null.
    pub fn null() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
        }
    }

    /// Creates a cell holding a freshly allocated handle to `value`.
    pub fn from_value(value: T) -> Self {
        Self::new(Some(Arc::new(value)))
    }

    /// Loads the current handle.
    #[inline]
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.load_full()
    }

    /// Runs `f` against the current referent without cloning the handle.
    ///
    /// The referent stays alive until `f` returns even if another thread
    /// replaces it meanwhile.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(Option<&T>) -> R,
    {
        let guard = self.slot.load();
        f(guard.as_deref())
    }

    /// Returns `true` if the cell currently holds null.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.slot.load().is_none()
    }

    /// Stores `value`, dropping this cell's reference to the previous handle.
    #[inline]
    pub fn set(&self, value: Option<Arc<T>>) {
        self.slot.store(value);
    }

    /// Stores `value` with at least release ordering.
    ///
    /// The slot's publication protocol has no cheaper store, so this is the
    /// same operation as [`set`](Self::set); callers may rely only on the
    /// weaker contract.
    #[inline]
    pub fn lazy_set(&self, value: Option<Arc<T>>) {
        self.slot.store(value);
    }

    /// Stores `value`, returning the previous handle.
    #[inline]
    pub fn get_and_set(&self, value: Option<Arc<T>>) -> Option<Arc<T>> {
        self.slot.swap(value)
    }

    /// Stores `update` if the current handle is `expect` (by identity).
    #[inline]
    pub fn compare_and_set(&self, expect: Option<&Arc<T>>, update: Option<Arc<T>>) -> bool {
        self.compare_exchange_with(expect, update, CasStrength::Strong)
            .is_ok()
    }

    /// Like [`compare_and_set`](Self::compare_and_set) but permitted to fail
    /// spuriously.
    ///
    /// The current backend never fails spuriously; callers must loop anyway.
    #[inline]
    pub fn weak_compare_and_set(&self, expect: Option<&Arc<T>>, update: Option<Arc<T>>) -> bool {
        self.compare_exchange_with(expect, update, CasStrength::Weak)
            .is_ok()
    }

    /// The single CAS entry point.
    ///
    /// Returns `Ok(previous)` on success and `Err(observed)` on failure; on
    /// failure `new` is dropped.
    pub fn compare_exchange_with(
        &self,
        current: Option<&Arc<T>>,
        new: Option<Arc<T>>,
        strength: CasStrength,
    ) -> Result<Option<Arc<T>>, Option<Arc<T>>> {
        // Both strengths map onto arc-swap's strong CAS.
        let _ = strength;
        // `current` is borrowed for the whole call, so its address cannot be
        // recycled into an unrelated handle while the CAS compares it.
        let expected: *const T = current.map_or(ptr::null(), Arc::as_ptr);
        let previous = self.slot.compare_and_swap(expected.cast_mut(), new);
        let observed: *const T = (*previous).as_ref().map_or(ptr::null(), Arc::as_ptr);
        if ptr::eq(observed, expected) {
            Ok(Guard::into_inner(previous))
        } else {
            Err(Guard::into_inner(previous))
        }
    }

    /// Replaces the handle with `f(current)`, returning the previous handle.
    ///
    /// `f` may be called more than once when other threads interfere.
    pub fn get_and_update<F>(&self, f: F) -> Option<Arc<T>>
    where
        F: FnMut(&Option<Arc<T>>) -> Option<Arc<T>>,
    {
        software::update(self, f).0
    }

    /// Replaces the handle with `f(current)`, returning the new handle.
    pub fn update_and_get<F>(&self, f: F) -> Option<Arc<T>>
    where
        F: FnMut(&Option<Arc<T>>) -> Option<Arc<T>>,
    {
        software::update(self, f).1
    }

    /// Replaces the handle with `f(current, x)`, returning the previous handle.
    pub fn get_and_accumulate<F>(&self, x: Option<Arc<T>>, mut f: F) -> Option<Arc<T>>
    where
        F: FnMut(&Option<Arc<T>>, &Option<Arc<T>>) -> Option<Arc<T>>,
    {
        software::update(self, |v| f(v, &x)).0
    }

    /// Replaces the handle with `f(current, x)`, returning the new handle.
    pub fn accumulate_and_get<F>(&self, x: Option<Arc<T>>, mut f: F) -> Option<Arc<T>>
    where
        F: FnMut(&Option<Arc<T>>, &Option<Arc<T>>) -> Option<Arc<T>>,
    {
        software::update(self, |v| f(v, &x)).1
    }

    /// Consumes the cell, returning the handle.
    pub fn into_inner(self) -> Option<Arc<T>> {
        self.slot.into_inner()
    }
}

impl<T> NativeCas for AtomicReference<T> {
    type Value = Option<Arc<T>>;

    #[inline]
    fn snapshot(&self) -> Option<Arc<T>> {
        self.get()
    }

    #[inline]
    fn try_commit(
        &self,
        current: &Option<Arc<T>>,
        new: Option<Arc<T>>,
        strength: CasStrength,
    ) -> Result<(), Option<Arc<T>>> {
        self.compare_exchange_with(current.as_ref(), new, strength)
            .map(drop)
    }
}

impl<T> Default for AtomicReference<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> From<Arc<T>> for AtomicReference<T> {
    fn from(value: Arc<T>) -> Self {
        Self::new(Some(value))
    }
}

impl<T> From<Option<Arc<T>>> for AtomicReference<T> {
    fn from(value: Option<Arc<T>>) -> Self {
        Self::new(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for AtomicReference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|v| f.debug_tuple("AtomicReference").field(&v).finish())
    }
}

impl<T: fmt::Display> fmt::Display for AtomicReference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|v| match v {
            Some(v) => fmt::Display::fmt(v, f),
            None => f.write_str("null"),
        })
    }
}

impl<T: Serialize> Serialize for AtomicReference<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.with(|v| v.serialize(serializer))
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for AtomicReference<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|v| Self::new(v.map(Arc::new)))
    }
}
