//! Atomic scalar cells.
//!
//! Each cell wraps exactly one value and exposes the same operation set:
//! `get`, `set`, `lazy_set`, `get_and_set`, strong and weak compare-and-set
//! through a single `compare_exchange_with` entry point, and (for the integer
//! cells) wrapping fetch-add with its increment/decrement shorthands.
//!
//! Orderings are fixed per operation (see [`mode`]): sequentially consistent
//! for everything except `lazy_set` (release) and `weak_compare_and_set`
//! (relaxed).

/// CAS strength and per-operation orderings.
pub mod mode;
/// 32-bit integer cell.
pub mod i32;
/// 64-bit integer cell.
pub mod i64;
/// Shared-handle cell.
pub mod reference;

pub(crate) mod software;

pub use self::i32::AtomicInt32;
pub use self::i64::AtomicInt64;
pub use mode::CasStrength;
pub use reference::AtomicReference;
