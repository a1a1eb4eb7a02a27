use core::fmt;
use std::sync::Arc;

use serde::{de::DeserializeOwned, ser::SerializeSeq, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::{check_index, decode_payload, render_slots};
use crate::{atomic::CasStrength, AtomicError, AtomicReference};

/// A fixed-length array of nullable shared handles, each slot updated atomically.
///
/// Slots behave like [`AtomicReference`] cells: compare-and-set matches by
/// identity and every payload is reference counted.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tessellate::AtomicReferenceArray;
///
/// let slots: AtomicReferenceArray<&str> = AtomicReferenceArray::new(3);
/// slots.set(1, Some(Arc::new("b")))?;
/// assert_eq!(slots.to_string(), "[null, b, null]");
/// # Ok::<(), tessellate::AtomicError>(())
/// ```
pub struct AtomicReferenceArray<T> {
    slots: Box<[AtomicReference<T>]>,
}

impl<T> AtomicReferenceArray<T> {
    /// Creates an array of `len` null slots.
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| AtomicReference::null()).collect(),
        }
    }

    /// Creates an array holding a copy of `values`.
    ///
    /// The spine is copied; referents are shared with `values`, not cloned.
    pub fn from_slice(values: &[Option<Arc<T>>]) -> Self {
        values.iter().cloned().collect()
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the array has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    fn slot(&self, index: usize) -> Result<&AtomicReference<T>, AtomicError> {
        check_index(index, self.slots.len())?;
        // SAFETY: index checked above.
        Ok(unsafe { self.slots.get_unchecked(index) })
    }

    /// Borrows slot `index` without a bounds check.
    ///
    /// # Safety
    /// Caller must ensure `index < self.len()`.
    #[inline(always)]
    pub(crate) unsafe fn get_unchecked(&self, index: usize) -> &AtomicReference<T> {
        self.slots.get_unchecked(index)
    }

    /// Loads the handle in slot `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Result<Option<Arc<T>>, AtomicError> {
        self.slot(index).map(AtomicReference::get)
    }

    /// Runs `f` against the referent in slot `index` without cloning its handle.
    pub fn with<R, F>(&self, index: usize, f: F) -> Result<R, AtomicError>
    where
        F: FnOnce(Option<&T>) -> R,
    {
        self.slot(index).map(|s| s.with(f))
    }

    /// Stores `value` in slot `index`.
    #[inline]
    pub fn set(&self, index: usize, value: Option<Arc<T>>) -> Result<(), AtomicError> {
        self.slot(index).map(|s| s.set(value))
    }

    /// Stores `value` in slot `index` with at least release ordering.
    #[inline]
    pub fn lazy_set(&self, index: usize, value: Option<Arc<T>>) -> Result<(), AtomicError> {
        self.slot(index).map(|s| s.lazy_set(value))
    }

    /// Stores `value` in slot `index`, returning the previous handle.
    #[inline]
    pub fn get_and_set(&self, index: usize, value: Option<Arc<T>>) -> Result<Option<Arc<T>>, AtomicError> {
        self.slot(index).map(|s| s.get_and_set(value))
    }

    /// Stores `update` in slot `index` if it currently holds `expect` (by identity).
    #[inline]
    pub fn compare_and_set(
        &self,
        index: usize,
        expect: Option<&Arc<T>>,
        update: Option<Arc<T>>,
    ) -> Result<bool, AtomicError> {
        self.slot(index).map(|s| s.compare_and_set(expect, update))
    }

    /// Weak compare-and-set on slot `index`; may fail spuriously.
    #[inline]
    pub fn weak_compare_and_set(
        &self,
        index: usize,
        expect: Option<&Arc<T>>,
        update: Option<Arc<T>>,
    ) -> Result<bool, AtomicError> {
        self.slot(index).map(|s| s.weak_compare_and_set(expect, update))
    }

    /// The single CAS entry point for slot `index`.
    pub fn compare_exchange_with(
        &self,
        index: usize,
        current: Option<&Arc<T>>,
        new: Option<Arc<T>>,
        strength: CasStrength,
    ) -> Result<Result<Option<Arc<T>>, Option<Arc<T>>>, AtomicError> {
        self.slot(index)
            .map(|s| s.compare_exchange_with(current, new, strength))
    }

    /// Replaces slot `index` with `f(current)`, returning the previous handle.
    pub fn get_and_update<F>(&self, index: usize, f: F) -> Result<Option<Arc<T>>, AtomicError>
    where
        F: FnMut(&Option<Arc<T>>) -> Option<Arc<T>>,
    {
        self.slot(index).map(|s| s.get_and_update(f))
    }

    /// Replaces slot `index` with `f(current)`, returning the new handle.
    pub fn update_and_get<F>(&self, index: usize, f: F) -> Result<Option<Arc<T>>, AtomicError>
    where
        F: FnMut(&Option<Arc<T>>) -> Option<Arc<T>>,
    {
        self.slot(index).map(|s| s.update_and_get(f))
    }

    /// Replaces slot `index` with `f(current, x)`, returning the previous handle.
    pub fn get_and_accumulate<F>(
        &self,
        index: usize,
        x: Option<Arc<T>>,
        f: F,
    ) -> Result<Option<Arc<T>>, AtomicError>
    where
        F: FnMut(&Option<Arc<T>>, &Option<Arc<T>>) -> Option<Arc<T>>,
    {
        self.slot(index).map(|s| s.get_and_accumulate(x, f))
    }

    /// Replaces slot `index` with `f(current, x)`, returning the new handle.
    pub fn accumulate_and_get<F>(
        &self,
        index: usize,
        x: Option<Arc<T>>,
        f: F,
    ) -> Result<Option<Arc<T>>, AtomicError>
    where
        F: FnMut(&Option<Arc<T>>, &Option<Arc<T>>) -> Option<Arc<T>>,
    {
        self.slot(index).map(|s| s.accumulate_and_get(x, f))
    }

    /// Iterates over per-slot snapshots.
    pub fn iter(&self) -> impl Iterator<Item = Option<Arc<T>>> + '_ {
        // SAFETY: `i` ranges over `0..len`.
        (0..self.len()).map(move |i| unsafe { self.get_unchecked(i) }.get())
    }

    /// Copies every handle into a `Vec`; each read is atomic, the copy as a whole is not.
    pub fn to_vec(&self) -> Vec<Option<Arc<T>>> {
        self.iter().collect()
    }

    /// Consumes the array, returning its handles.
    pub fn into_vec(self) -> Vec<Option<Arc<T>>> {
        self.slots
            .into_vec()
            .into_iter()
            .map(AtomicReference::into_inner)
            .collect()
    }
}

impl<T: DeserializeOwned> AtomicReferenceArray<T> {
    /// Restores an array from a persisted JSON payload; `null` elements become null slots.
    ///
    /// # Errors
    /// Returns [`AtomicError::InvalidRestoredState`] if `payload` is not an
    /// array or any element fails to decode as `T`; no slot is created in that
    /// case.
    pub fn restore(payload: Value) -> Result<Self, AtomicError> {
        decode_payload::<Option<T>>(payload)
            .map(|values| values.into_iter().map(|v| v.map(Arc::new)).collect())
    }
}

impl<T> From<Vec<Option<Arc<T>>>> for AtomicReferenceArray<T> {
    fn from(values: Vec<Option<Arc<T>>>) -> Self {
        values.into_iter().collect()
    }
}

impl<T> FromIterator<Option<Arc<T>>> for AtomicReferenceArray<T> {
    fn from_iter<I: IntoIterator<Item = Option<Arc<T>>>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().map(AtomicReference::new).collect(),
        }
    }
}

impl<T: fmt::Display> fmt::Display for AtomicReferenceArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // SAFETY: `render_slots` only passes indices below `len`.
        render_slots(f, self.len(), |f, i| fmt::Display::fmt(unsafe { self.get_unchecked(i) }, f))
    }
}

impl<T: fmt::Debug> fmt::Debug for AtomicReferenceArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Serialize> Serialize for AtomicReferenceArray<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for i in 0..self.len() {
            // SAFETY: `i < len`.
            unsafe { self.get_unchecked(i) }.with(|v| seq.serialize_element(&v))?;
        }
        seq.end()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for AtomicReferenceArray<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Option<T>>::deserialize(deserializer)
            .map(|values| values.into_iter().map(|v| v.map(Arc::new)).collect())
    }
}
