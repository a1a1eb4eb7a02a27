use tessellate::{
    AtomicError, AtomicInt32, AtomicInt32Array, AtomicInt64, AtomicReference, AtomicReferenceArray,
};

fn assert_send<T: Send>() {}
fn assert_sync<T: Sync>() {}

#[test]
fn integer_cells_and_arrays_are_send_and_sync() {
    assert_send::<AtomicInt32>();
    assert_sync::<AtomicInt32>();
    assert_send::<AtomicInt64>();
    assert_sync::<AtomicInt64>();
    assert_send::<AtomicInt32Array>();
    assert_sync::<AtomicInt32Array>();
}

#[test]
fn reference_cells_follow_payload_bounds() {
    // `String` is Send + Sync, so shared handles to it may cross threads.
    assert_send::<AtomicReference<String>>();
    assert_sync::<AtomicReference<String>>();
    assert_send::<AtomicReferenceArray<Vec<u8>>>();
    assert_sync::<AtomicReferenceArray<Vec<u8>>>();
}

#[test]
fn error_is_a_std_error() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
    assert_error::<AtomicError>();

    let boxed: anyhow::Error = AtomicError::IndexOutOfRange { index: 3, len: 1 }.into();
    assert_eq!(boxed.to_string(), "index 3 out of range for atomic array of length 1");
}
