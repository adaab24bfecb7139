//! Action Primitives (§4.5): the two raw operations a batch can contain,
//! each following the same resolve → issue → classify shape. Both return
//! an [`ActionOutcome`]; any scratch-buffer bookkeeping for `get` lives in
//! [`crate::batch`], which is the only place that knows about the RW
//! scratch allocator.

use mdbx_batch_sys as ffi;

use crate::dbi::DbiDescriptor;
use crate::error::Error;
use crate::safety::{self, SafetyOutcome};
use crate::txn::Txn;

/// The engine-owned result of a successful `get`, valid for the lifetime
/// of the issuing transaction.
#[derive(Clone, Copy)]
pub(crate) struct GetResult {
    pub(crate) ptr: *const u8,
    pub(crate) size: usize,
}

/// Outcome of issuing one action against the engine.
pub(crate) enum ActionOutcome<T> {
    Ok(T),
    Retry,
    Fail(Error),
}

fn dispatch<T>(rc: i32, txn: &Txn, value: T) -> ActionOutcome<T> {
    let (outcome, err) = safety::classify(rc, Some(txn));
    match outcome {
        SafetyOutcome::Ok => ActionOutcome::Ok(value),
        SafetyOutcome::Retry => ActionOutcome::Retry,
        SafetyOutcome::Fail => ActionOutcome::Fail(err),
    }
}

/// Issues a `put` for the already-resolved key and value.
pub(crate) fn put(
    txn: &Txn,
    dbi: &DbiDescriptor,
    key: (*const u8, usize),
    val: (*const u8, usize),
) -> ActionOutcome<()> {
    let mut key_val = ffi::MDBX_val { iov_base: key.0 as *mut _, iov_len: key.1 };
    let mut data_val = ffi::MDBX_val { iov_base: val.0 as *mut _, iov_len: val.1 };
    let rc = unsafe {
        ffi::mdbx_put(txn.as_ptr(), dbi.handle, &mut key_val, &mut data_val, dbi.default_put_flags.bits())
    };
    dispatch(rc, txn, ())
}

/// Issues a `get` for the already-resolved key, returning the engine-owned
/// pointer and size on success.
pub(crate) fn get(txn: &Txn, dbi: &DbiDescriptor, key: (*const u8, usize)) -> ActionOutcome<GetResult> {
    let key_val = ffi::MDBX_val { iov_base: key.0 as *mut _, iov_len: key.1 };
    let mut data_val = ffi::MDBX_val::empty();
    let rc = unsafe { ffi::mdbx_get(txn.as_ptr(), dbi.handle, &key_val, &mut data_val) };
    dispatch(rc, txn, GetResult { ptr: data_val.iov_base as *const u8, size: data_val.iov_len })
}
