//! A minimal transaction handle, grounded in the Drop-based abort guard
//! from the teacher's `tx/access.rs`: a transaction that is dropped (or
//! explicitly aborted) without having been committed is rolled back
//! exactly once.

use std::cell::Cell;
use std::ptr;

use mdbx_batch_sys as ffi;

use crate::error::{Error, Result};

/// Whether a transaction was opened read-only or read-write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TxnKind {
    Ro,
    Rw,
}

impl TxnKind {
    fn open_flags(self) -> u32 {
        match self {
            Self::Ro => ffi::MDBX_TXN_RDONLY,
            Self::Rw => ffi::MDBX_TXN_READWRITE,
        }
    }
}

/// An open engine transaction. Aborts on drop unless already committed or
/// aborted, so a `?` out of the middle of a batch can never leak a live
/// transaction handle.
pub(crate) struct Txn {
    ptr: *mut ffi::MDBX_txn,
    kind: TxnKind,
    finished: Cell<bool>,
}

impl Txn {
    pub(crate) fn begin(env: *mut ffi::MDBX_env, kind: TxnKind) -> Result<Self> {
        let mut ptr: *mut ffi::MDBX_txn = ptr::null_mut();
        let rc = unsafe {
            ffi::mdbx_txn_begin_ex(env, ptr::null_mut(), kind.open_flags(), &mut ptr, ptr::null_mut())
        };
        if rc != ffi::MDBX_SUCCESS {
            tracing::warn!(rc, ?kind, "failed to begin transaction");
            return Err(Error::Io);
        }
        tracing::debug!(?kind, "transaction begun");
        Ok(Self { ptr, kind, finished: Cell::new(false) })
    }

    pub(crate) fn kind(&self) -> TxnKind {
        self.kind
    }

    pub(crate) fn as_ptr(&self) -> *mut ffi::MDBX_txn {
        self.ptr
    }

    /// Aborts the transaction if it hasn't already finished. Idempotent:
    /// calling this more than once is a no-op, since the safety policy may
    /// abort a transaction that the batch engine then also drops.
    pub(crate) fn abort(&self) {
        if self.finished.replace(true) {
            return;
        }
        let rc = unsafe { ffi::mdbx_txn_abort(self.ptr) };
        if rc != ffi::MDBX_SUCCESS {
            tracing::warn!(rc, "transaction abort reported a nonzero code");
        } else {
            tracing::debug!("transaction aborted");
        }
    }

    pub(crate) fn commit(self) -> Result<()> {
        self.finished.set(true);
        let rc = unsafe { ffi::mdbx_txn_commit_ex(self.ptr, ptr::null_mut()) };
        if rc != ffi::MDBX_SUCCESS {
            tracing::warn!(rc, "transaction commit failed");
            return Err(Error::Io);
        }
        tracing::debug!("transaction committed");
        Ok(())
    }
}

impl Drop for Txn {
    fn drop(&mut self) {
        self.abort();
    }
}
