//! Fixed-length arrays of independently atomic slots.
//!
//! An array owns `len` cells laid out contiguously; the length never changes.
//! Every public accessor checks `index < len` before touching a slot and
//! reports [`AtomicError::IndexOutOfRange`] otherwise. Only the array's own
//! rendering, iteration and serialization helpers skip the check, through a
//! crate-private unchecked accessor.
//!
//! Per-slot reads are atomic; whole-array snapshots (`to_vec`, `Display`,
//! serialization) are not.

use core::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::AtomicError;

/// 32-bit integer array.
pub mod i32;
/// Shared-handle array.
pub mod reference;

pub use self::i32::AtomicInt32Array;
pub use reference::AtomicReferenceArray;

#[inline]
pub(crate) fn check_index(index: usize, len: usize) -> Result<(), AtomicError> {
    if index < len {
        Ok(())
    } else {
        #[cfg(feature = "tracing")]
        tracing::debug!(index, len, "atomic array index rejected");
        Err(AtomicError::IndexOutOfRange { index, len })
    }
}

/// Writes `[s0, s1, ..., sN-1]`, delegating each slot to `slot`.
pub(crate) fn render_slots<F>(f: &mut fmt::Formatter<'_>, len: usize, mut slot: F) -> fmt::Result
where
    F: FnMut(&mut fmt::Formatter<'_>, usize) -> fmt::Result,
{
    f.write_str("[")?;
    for i in 0..len {
        if i > 0 {
            f.write_str(", ")?;
        }
        slot(f, i)?;
    }
    f.write_str("]")
}

/// Decodes a persisted array payload in full before any slot exists.
pub(crate) fn decode_payload<E: DeserializeOwned>(payload: Value) -> Result<Vec<E>, AtomicError> {
    if !payload.is_array() {
        return Err(AtomicError::invalid_state(format!(
            "expected an array, found {}",
            kind(&payload)
        )));
    }
    serde_json::from_value(payload).map_err(|e| AtomicError::invalid_state(e.to_string()))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
