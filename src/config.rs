//! Compile-time configuration constants (§6.4). Centralized here so the
//! rest of the crate never spells out a magic number for these limits.

/// Maximum number of sub-databases (DBIs) the environment can hold.
pub(crate) const MAX_DBS: usize = 16;

/// Initial mmap mapping size, in bytes.
pub(crate) const INITIAL_MAP_SIZE: usize = 256 * 1024 * 1024;

/// Maximum mmap mapping size the expander will ever grow to, in bytes.
pub(crate) const MAX_MAP_SIZE: usize = 1024 * 1024 * 1024;

/// Per-batch operation capacity (`N_MAX`).
pub(crate) const BATCH_OP_CAPACITY: usize = 8;

/// RW scratch capacity in bytes (`B_MAX`), used to stabilize GET results.
pub(crate) const RW_SCRATCH_CAPACITY: usize = 2 * 1024;

/// Bounded retry budget for `execute()` and for the map-size query retry
/// inside the expander.
pub(crate) const BATCH_RETRY_BUDGET: u8 = 3;

/// Permission bits for the environment directory (owner-only).
pub(crate) const ENV_DIR_MODE: u32 = 0o700;

/// Permission bits the engine is asked to use for its own files.
pub(crate) const ENV_FILE_MODE: u16 = 0o600;
