//! # `tessellate` - Lock-Free Shared-State Primitives
//!
//! Atomic scalar cells, fixed-length atomic arrays and explicit memory fences:
//! the synchronization substrate for counters, publication protocols and
//! lock-free containers built on top.
//!
//! ## Guarantees
//!
//! ### Atomicity
//! - **No torn reads**: every load, store and compare-and-set on a cell or an
//!   array slot is atomic at the cell's full width, including 64-bit cells on
//!   targets without native 64-bit atomics.
//! - **Wrapping arithmetic**: fetch-add and its shorthands wrap on overflow and
//!   never panic.
//! - **CAS failure is a value**: a failed compare-and-set returns `false`; it is
//!   never an error.
//!
//! ### Ordering
//! - `get`, `set`, `get_and_set`, strong CAS and fetch-add are sequentially
//!   consistent.
//! - `lazy_set` is a release store.
//! - `weak_compare_and_set` is relaxed and may fail spuriously.
//! - The [`fence`] module provides explicit acquire, release and full fences for
//!   hand-written protocols.
//!
//! ### Progress
//! - Nothing blocks. Each operation is either one native instruction or a
//!   read-compute-CAS loop that spins until it commits; there are no locks,
//!   condition variables or scheduler yields on any native path.
//!
//! ### Reclamation
//! - Reference cells store `Option<Arc<T>>`. Replacing a handle never frees a
//!   referent while a concurrent reader is still acquiring it.
//!
//! ## Architecture
//!
//! 1. **Fences** ([`fence`]): stateless ordering barriers.
//! 2. **Cells** ([`atomic`]): [`AtomicInt32`], [`AtomicInt64`],
//!    [`AtomicReference`], sharing one CAS entry point parameterized by
//!    [`CasStrength`] and one software retry loop.
//! 3. **Arrays** ([`array`]): [`AtomicInt32Array`], [`AtomicReferenceArray`],
//!    bounds-checked aggregates of cells.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tessellate::{AtomicInt64, AtomicReference};
//!
//! let generation = AtomicInt64::new(0);
//! let snapshot = AtomicReference::from_value(vec![1, 2, 3]);
//!
//! std::thread::scope(|s| {
//!     s.spawn(|| {
//!         snapshot.set(Some(Arc::new(vec![4, 5])));
//!         generation.increment_and_get();
//!     });
//! });
//!
//! assert_eq!(generation.get(), 1);
//! assert_eq!(snapshot.with(|v| v.map(Vec::len)), Some(2));
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod array;
pub mod atomic;
pub mod error;
pub mod fence;

pub use array::{AtomicInt32Array, AtomicReferenceArray};
pub use atomic::{AtomicInt32, AtomicInt64, AtomicReference, CasStrength};
pub use error::AtomicError;

// Compile-time layout checks.
const _: () = {
    use core::mem;

    // Integer cells are transparent over their storage.
    assert!(mem::size_of::<AtomicInt32>() == mem::size_of::<i32>());
    assert!(mem::align_of::<AtomicInt32>() == mem::align_of::<core::sync::atomic::AtomicI32>());
    assert!(mem::size_of::<AtomicInt64>() == mem::size_of::<i64>());

    // Arrays are a single boxed slice of cells.
    assert!(mem::size_of::<AtomicInt32Array>() == mem::size_of::<Box<[AtomicInt32]>>());
    assert!(
        mem::size_of::<AtomicReferenceArray<u8>>() == mem::size_of::<Box<[AtomicReference<u8>]>>()
    );
};
