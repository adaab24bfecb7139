//! A batched-operation engine and safety policy over a memory-mapped,
//! B-tree based embedded key/value store.
//!
//! See `SPEC_FULL.md` for the full design.

mod action;
mod batch;
mod config;
mod descriptor;
mod dbi;
mod env;
mod error;
mod flags;
mod safety;
mod txn;

pub use batch::OpType;
pub use env::DbKind;
pub use error::{Error, Result};

use descriptor::{Descriptor, RefSide};
use error::to_return_code;

/// Initializes the process-wide environment at `path`, creating it (and
/// the named sub-databases) if it doesn't already exist.
///
/// Returns `0` on success, or the negation of an [`Error`] code on
/// failure. Fails with `-ALREADY_INITIALIZED` if an environment is
/// already open.
pub fn init(path: &std::path::Path, dbi_names: &[&str], dbi_kinds: &[DbKind]) -> i32 {
    to_return_code(env::init(path, dbi_names, dbi_kinds))
}

/// Queues one operation against the batch singleton.
///
/// Builds a `PRESENT` key descriptor from `key_ptr`/`key_size` (which must
/// be non-null with a positive size) and a value descriptor from
/// `val_ptr`/`val_size` per the following convention:
/// - `val_ptr` non-null, `val_size > 0`: a `PRESENT` value (inline bytes
///   for a `PUT`, or a caller-owned output buffer for a `GET`).
/// - `val_ptr` null, for a `GET`: `NONE` — the engine's own returned
///   bytes are stabilized internally and can be referenced by a later
///   operation in the same batch.
/// - `val_ptr` null, for a `PUT`: a `LOOKUP` back-reference, with
///   `val_size` interpreted as `ref_index` (must be positive).
///
/// # Safety
///
/// `key_ptr` must be valid for reads of `key_size` bytes for the duration
/// of the next `execute()` call (until the operation is resolved). The
/// same holds for `val_ptr`/`val_size` when `val_ptr` is non-null and this
/// is a `PUT`; when it names a `GET` output buffer, it must additionally
/// be valid for writes of up to `val_size` bytes.
pub unsafe fn enqueue(
    dbi_index: usize,
    op_type: OpType,
    key_ptr: *const u8,
    key_size: usize,
    val_ptr: *mut u8,
    val_size: usize,
) -> i32 {
    to_return_code(enqueue_inner(dbi_index, op_type, key_ptr, key_size, val_ptr, val_size))
}

fn enqueue_inner(
    dbi_index: usize,
    op_type: OpType,
    key_ptr: *const u8,
    key_size: usize,
    val_ptr: *mut u8,
    val_size: usize,
) -> error::Result<()> {
    if key_ptr.is_null() || key_size == 0 {
        return Err(Error::Invalid);
    }
    let key = Descriptor::Present { ptr: key_ptr, size: key_size };

    let val = if !val_ptr.is_null() && val_size > 0 {
        Descriptor::Present { ptr: val_ptr as *const u8, size: val_size }
    } else {
        match op_type {
            OpType::Get => Descriptor::None,
            OpType::Put => {
                if val_size == 0 {
                    return Err(Error::Invalid);
                }
                Descriptor::Lookup { ref_index: val_size, side: RefSide::Val }
            }
        }
    };

    batch::enqueue(dbi_index, op_type, key, val)
}

/// Runs every queued operation inside one transaction, retrying the whole
/// batch on transient engine conditions up to the configured budget.
///
/// Returns `0` on success, or the negation of an [`Error`] code on
/// failure. The batch singleton is cleared before this returns, either
/// way.
pub fn execute() -> i32 {
    to_return_code(batch::execute())
}

/// Shuts the environment down, idempotently. Returns the last known
/// mapping size in bytes, or `0` if there was no environment open or its
/// size couldn't be queried.
pub fn shutdown() -> u64 {
    env::shutdown()
}

/// Current mmap mapping size, in bytes. Supplemental accessor, not part of
/// the distilled consumer-visible surface, returned as an ordinary
/// [`Result`] rather than the public `i32` convention since it isn't one
/// of the §6.1 operations.
pub fn current_map_size() -> error::Result<u64> {
    env::current_map_size()
}

/// Number of sub-databases opened for the current environment.
/// Supplemental diagnostic accessor.
pub fn dbi_count() -> error::Result<usize> {
    env::dbi_count()
}
