//! Explicit memory-ordering fences.
//!
//! These are escape hatches for hand-written publish/consume protocols over
//! plain or relaxed accesses. They are stateless and callable from any thread.
//! A fence only orders anything when paired with a fence (or an acquire/release
//! access) on the other side of the protocol; an unpaired fence compiles fine
//! and silently leaves the data race in place. Nothing here checks pairing.
//!
//! The `order_*` functions take any value and hand it straight back, so they
//! can be threaded through an expression:
//!
//! ```
//! use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
//! use tessellate::fence;
//!
//! let payload = AtomicU32::new(0);
//! let ready = AtomicBool::new(false);
//!
//! // Producer.
//! payload.store(7, Ordering::Relaxed);
//! fence::order_writes(&ready).store(true, Ordering::Relaxed);
//!
//! // Consumer.
//! if ready.load(Ordering::Relaxed) {
//!     assert_eq!(fence::order_reads(&payload).load(Ordering::Relaxed), 7);
//! }
//! ```

use core::{
    hint,
    sync::atomic::{compiler_fence, fence, Ordering},
};

/// Acquire fence: later reads cannot move above it.
#[inline(always)]
pub fn acquire_fence() {
    fence(Ordering::Acquire);
}

/// Release fence: earlier writes cannot move below it.
#[inline(always)]
pub fn release_fence() {
    fence(Ordering::Release);
}

/// Sequentially consistent fence.
#[inline(always)]
pub fn full_fence() {
    fence(Ordering::SeqCst);
}

/// Restricts compiler reordering only, for protocols between a thread and a
/// signal handler running on that same thread.
///
/// # Panics
/// Panics if `order` is `Relaxed`.
#[inline(always)]
pub fn compiler_fence_only(order: Ordering) {
    compiler_fence(order);
}

/// Read-side fence.
///
/// Accesses after this call happen-after the matching [`order_writes`] whose
/// effect was observed before the call. Returns `value` unchanged.
#[inline(always)]
pub fn order_reads<R>(value: R) -> R {
    acquire_fence();
    value
}

/// Write-side fence.
///
/// Accesses before this call happen-before any later [`order_reads`] that
/// observes a write made after it. Returns `value` unchanged.
#[inline(always)]
pub fn order_writes<R>(value: R) -> R {
    release_fence();
    value
}

/// Two-sided fence.
///
/// Combines [`order_reads`] and [`order_writes`], and additionally places all
/// `order_accesses` calls into a single total order that every thread agrees
/// on. Use it when both sides must agree on relative order, as in Dekker-style
/// flag protocols. Returns `value` unchanged.
#[inline(always)]
pub fn order_accesses<R>(value: R) -> R {
    full_fence();
    value
}

/// Keeps `value`'s referent alive up to this point.
///
/// There is no tracing collector here: the shared borrow already guarantees the
/// referent outlives this call, and ownership never destroys a value that is
/// still borrowed on the call stack. The only remaining effect is an
/// optimization barrier, so the call imposes no memory ordering.
#[inline(always)]
pub fn reachability_fence<T: ?Sized>(value: &T) {
    let _ = hint::black_box(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicBool, AtomicU64};
    use std::sync::Arc;

    #[test]
    fn fences_return_their_argument() {
        let value = Arc::new(3);
        let same = order_accesses(order_writes(order_reads(value.clone())));
        assert!(Arc::ptr_eq(&value, &same));
        assert_eq!(order_reads(None::<&u8>), None);
    }

    #[test]
    fn reachability_fence_accepts_unsized() {
        let text: &str = "alive";
        reachability_fence(text);
        reachability_fence(&[1, 2, 3][..]);
        compiler_fence_only(Ordering::SeqCst);
    }

    #[test]
    fn message_passing_through_fences() {
        let data = AtomicU64::new(0);
        let ready = AtomicBool::new(false);

        std::thread::scope(|s| {
            s.spawn(|| {
                data.store(0xfeed, Ordering::Relaxed);
                order_writes(&ready).store(true, Ordering::Relaxed);
            });
            s.spawn(|| {
                while !ready.load(Ordering::Relaxed) {
                    core::hint::spin_loop();
                }
                assert_eq!(order_reads(&data).load(Ordering::Relaxed), 0xfeed);
            });
        });
    }
}
