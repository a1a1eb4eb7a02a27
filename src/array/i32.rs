use core::{fmt, sync::atomic::Ordering};

use serde::{ser::SerializeSeq, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::{check_index, decode_payload, render_slots};
use crate::{atomic::CasStrength, AtomicError, AtomicInt32};

/// A fixed-length array of 32-bit integers, each slot updated atomically.
///
/// Slots behave exactly like [`AtomicInt32`] cells; every accessor takes an
/// index and fails with [`AtomicError::IndexOutOfRange`] before touching
/// storage when `index >= len()`.
///
/// # Examples
///
/// ```
/// use tessellate::{AtomicError, AtomicInt32Array};
///
/// let histogram = AtomicInt32Array::new(4);
/// histogram.increment_and_get(2)?;
/// histogram.add_and_get(3, 5)?;
/// assert_eq!(histogram.to_string(), "[0, 0, 1, 5]");
/// assert!(matches!(
///     histogram.get(4),
///     Err(AtomicError::IndexOutOfRange { index: 4, len: 4 })
/// ));
/// # Ok::<(), AtomicError>(())
/// ```
pub struct AtomicInt32Array {
    slots: Box<[AtomicInt32]>,
}

impl AtomicInt32Array {
    /// Creates an array of `len` zeroed slots.
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| AtomicInt32::new(0)).collect(),
        }
    }

    /// Creates an array holding a copy of `values`.
    ///
    /// Later changes to `values` do not affect the array.
    pub fn from_slice(values: &[i32]) -> Self {
        values.iter().copied().collect()
    }

    /// Restores an array from a persisted JSON payload.
    ///
    /// # Errors
    /// Returns [`AtomicError::InvalidRestoredState`] if `payload` is not an
    /// array of 32-bit integers; no slot is created in that case.
    pub fn restore(payload: Value) -> Result<Self, AtomicError> {
        decode_payload::<i32>(payload).map(Self::from)
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
    fn slot(&self, index: usize) -> Result<&AtomicInt32, AtomicError> {
        check_index(index, self.slots.len())?;
        // SAFETY: index checked above.
        Ok(unsafe { self.slots.get_unchecked(index) })
    }

    /// Loads slot `index` without a bounds check.
    ///
    /// # Safety
    /// Caller must ensure `index < self.len()`.
    #[inline(always)]
    pub(crate) unsafe fn get_unchecked(&self, index: usize) -> i32 {
        self.slots.get_unchecked(index).get()
    }

    /// Loads slot `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Result<i32, AtomicError> {
        self.slot(index).map(AtomicInt32::get)
    }

    /// Stores `value` in slot `index`.
    #[inline]
    pub fn set(&self, index: usize, value: i32) -> Result<(), AtomicError> {
        self.slot(index).map(|s| s.set(value))
    }

    /// Stores `value` in slot `index` with release ordering only.
    #[inline]
    pub fn lazy_set(&self, index: usize, value: i32) -> Result<(), AtomicError> {
        self.slot(index).map(|s| s.lazy_set(value))
    }

    /// Stores `value` in slot `index`, returning the previous value.
    #[inline]
    pub fn get_and_set(&self, index: usize, value: i32) -> Result<i32, AtomicError> {
        self.slot(index).map(|s| s.get_and_set(value))
    }

    /// Stores `update` in slot `index` if it currently holds `expect`.
    #[inline]
    pub fn compare_and_set(&self, index: usize, expect: i32, update: i32) -> Result<bool, AtomicError> {
        self.slot(index).map(|s| s.compare_and_set(expect, update))
    }

    /// Weak, relaxed compare-and-set on slot `index`; may fail spuriously.
    #[inline]
    pub fn weak_compare_and_set(
        &self,
        index: usize,
        expect: i32,
        update: i32,
    ) -> Result<bool, AtomicError> {
        self.slot(index).map(|s| s.weak_compare_and_set(expect, update))
    }

    /// The single CAS entry point for slot `index`.
    ///
    /// The outer `Result` reports the bounds check; the inner one is
    /// `Ok(previous)` or `Err(observed)`.
    #[inline]
    pub fn compare_exchange_with(
        &self,
        index: usize,
        current: i32,
        new: i32,
        strength: CasStrength,
        order: Ordering,
    ) -> Result<Result<i32, i32>, AtomicError> {
        self.slot(index)
            .map(|s| s.compare_exchange_with(current, new, strength, order))
    }

    /// Adds `delta` to slot `index`, returning the previous value.
    #[inline]
    pub fn get_and_add(&self, index: usize, delta: i32) -> Result<i32, AtomicError> {
        self.slot(index).map(|s| s.get_and_add(delta))
    }

    /// Adds `delta` to slot `index`, returning the new value.
    #[inline]
    pub fn add_and_get(&self, index: usize, delta: i32) -> Result<i32, AtomicError> {
        self.slot(index).map(|s| s.add_and_get(delta))
    }

    /// Increments slot `index`, returning the previous value.
    #[inline]
    pub fn get_and_increment(&self, index: usize) -> Result<i32, AtomicError> {
        self.get_and_add(index, 1)
    }

    /// Increments slot `index`, returning the new value.
    #[inline]
    pub fn increment_and_get(&self, index: usize) -> Result<i32, AtomicError> {
        self.add_and_get(index, 1)
    }

    /// Decrements slot `index`, returning the previous value.
    #[inline]
    pub fn get_and_decrement(&self, index: usize) -> Result<i32, AtomicError> {
        self.get_and_add(index, -1)
    }

    /// Decrements slot `index`, returning the new value.
    #[inline]
    pub fn decrement_and_get(&self, index: usize) -> Result<i32, AtomicError> {
        self.add_and_get(index, -1)
    }

    /// Replaces slot `index` with `f(current)`, returning the previous value.
    pub fn get_and_update<F>(&self, index: usize, f: F) -> Result<i32, AtomicError>
    where
        F: FnMut(i32) -> i32,
    {
        self.slot(index).map(|s| s.get_and_update(f))
    }

    /// Replaces slot `index` with `f(current)`, returning the new value.
    pub fn update_and_get<F>(&self, index: usize, f: F) -> Result<i32, AtomicError>
    where
        F: FnMut(i32) -> i32,
    {
        self.slot(index).map(|s| s.update_and_get(f))
    }

    /// Replaces slot `index` with `f(current, x)`, returning the previous value.
    pub fn get_and_accumulate<F>(&self, index: usize, x: i32, f: F) -> Result<i32, AtomicError>
    where
        F: FnMut(i32, i32) -> i32,
    {
        self.slot(index).map(|s| s.get_and_accumulate(x, f))
    }

    /// Replaces slot `index` with `f(current, x)`, returning the new value.
    pub fn accumulate_and_get<F>(&self, index: usize, x: i32, f: F) -> Result<i32, AtomicError>
    where
        F: FnMut(i32, i32) -> i32,
    {
        self.slot(index).map(|s| s.accumulate_and_get(x, f))
    }

    /// Iterates over per-slot snapshots.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        // SAFETY: `i` ranges over `0..len`.
        (0..self.len()).map(move |i| unsafe { self.get_unchecked(i) })
    }

    /// Copies every slot into a `Vec`; each read is atomic, the copy as a whole is not.
    pub fn to_vec(&self) -> Vec<i32> {
        self.iter().collect()
    }

    /// Consumes the array, returning its values.
    pub fn into_vec(self) -> Vec<i32> {
        self.slots
            .into_vec()
            .into_iter()
            .map(AtomicInt32::into_inner)
            .collect()
    }
}

impl From<Vec<i32>> for AtomicInt32Array {
    fn from(values: Vec<i32>) -> Self {
        values.into_iter().collect()
    }
}

impl FromIterator<i32> for AtomicInt32Array {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().map(AtomicInt32::new).collect(),
        }
    }
}

impl fmt::Display for AtomicInt32Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // SAFETY: `render_slots` only passes indices below `len`.
        render_slots(f, self.len(), |f, i| write!(f, "{}", unsafe { self.get_unchecked(i) }))
    }
}

impl fmt::Debug for AtomicInt32Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Serialize for AtomicInt32Array {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for v in self.iter() {
            seq.serialize_element(&v)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for AtomicInt32Array {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<i32>::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_array_is_zeroed() {
        let a = AtomicInt32Array::new(3);
        assert_eq!(a.len(), 3);
        assert_eq!(a.to_vec(), vec![0, 0, 0]);
    }

    #[test]
    fn renders_comma_space_separated() {
        assert_eq!(AtomicInt32Array::new(0).to_string(), "[]");
        assert_eq!(AtomicInt32Array::from_slice(&[1, 2, 3]).to_string(), "[1, 2, 3]");
        assert_eq!(format!("{:?}", AtomicInt32Array::from_slice(&[-1])), "[-1]");
    }

    #[test]
    fn out_of_range_has_no_effect() {
        let a = AtomicInt32Array::from_slice(&[5, 6]);
        assert_eq!(
            a.set(2, 9),
            Err(AtomicError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert!(a.compare_and_set(usize::MAX, 5, 0).is_err());
        assert_eq!(a.to_vec(), vec![5, 6]);
    }

    #[test]
    fn per_slot_operations() {
        let a = AtomicInt32Array::new(2);
        assert_eq!(a.get_and_set(0, 4), Ok(0));
        assert_eq!(a.compare_and_set(0, 4, 8), Ok(true));
        assert_eq!(a.compare_and_set(0, 4, 9), Ok(false));
        assert_eq!(
            a.compare_exchange_with(1, 1, 2, CasStrength::Strong, Ordering::SeqCst),
            Ok(Err(0))
        );
        assert_eq!(a.get_and_increment(1), Ok(0));
        assert_eq!(a.decrement_and_get(1), Ok(0));
        assert_eq!(a.update_and_get(0, |v| v / 2), Ok(4));
        assert_eq!(a.accumulate_and_get(1, 7, |v, x| v + x), Ok(7));
        a.lazy_set(1, 3).unwrap();
        assert_eq!(a.get(1), Ok(3));
        assert_eq!(a.into_vec(), vec![4, 3]);
    }

    #[test]
    fn restore_round_trip() {
        let a = AtomicInt32Array::from_slice(&[7, -7]);
        let payload = serde_json::to_value(&a).unwrap();
        assert_eq!(payload, json!([7, -7]));
        let back = AtomicInt32Array::restore(payload).unwrap();
        assert_eq!(back.to_vec(), vec![7, -7]);
    }

    #[test]
    fn restore_rejects_wrong_shapes() {
        for payload in [json!("str"), json!({"a": 1}), json!([1, "x"]), json!([1.5]), json!([4_294_967_296_i64])] {
            assert!(matches!(
                AtomicInt32Array::restore(payload),
                Err(AtomicError::InvalidRestoredState { .. })
            ));
        }
    }
}
