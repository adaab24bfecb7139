//! Raw, hand-maintained bindings for the subset of libmdbx this crate
//! drives. Unlike a full `bindgen`-generated surface, this only declares
//! the environment/transaction/database/get/put capabilities enumerated
//! in the backing-engine interface (see `SPEC_FULL.md` §6.2); everything
//! else libmdbx exposes (cursors, nested transactions, table drop, ...)
//! is intentionally absent because the layer above never calls it.

#![allow(non_camel_case_types, non_upper_case_globals)]

use std::os::raw::{c_char, c_int, c_void};

/// Opaque environment handle.
#[repr(C)]
pub struct MDBX_env {
    _private: [u8; 0],
}

/// Opaque transaction handle.
#[repr(C)]
pub struct MDBX_txn {
    _private: [u8; 0],
}

/// Sub-database identifier, as returned by `mdbx_dbi_open`.
pub type MDBX_dbi = u32;

/// Borrowed key or value, mirroring POSIX `struct iovec`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct MDBX_val {
    pub iov_base: *mut c_void,
    pub iov_len: usize,
}

impl MDBX_val {
    pub const fn empty() -> Self {
        Self { iov_base: std::ptr::null_mut(), iov_len: 0 }
    }
}

/// Reduced view of `MDBX_envinfo`, trimmed to the fields §6.2 item 3 reads
/// (current mapping size and page size).
#[repr(C)]
pub struct MDBX_envinfo_geo {
    pub lower: u64,
    pub upper: u64,
    pub current: u64,
    pub shrink: u64,
    pub grow: u64,
}

#[repr(C)]
pub struct MDBX_envinfo {
    pub mi_geo: MDBX_envinfo_geo,
    pub mi_mapsize: u64,
    pub mi_last_pgno: u64,
    pub mi_recent_txnid: u64,
    pub mi_maxreaders: u32,
    pub mi_numreaders: u32,
    pub mi_dxb_pagesize: u32,
    pub mi_sys_pagesize: u32,
}

// Environment open flags (subset).
pub const MDBX_NOSUBDIR: u32 = 0x4000;
pub const MDBX_RDONLY: u32 = 0x2000_0000;
pub const MDBX_WRITEMAP: u32 = 0x8_0000;

// Transaction flags.
pub const MDBX_TXN_READWRITE: u32 = 0;
pub const MDBX_TXN_RDONLY: u32 = 0x2000_0000;

// Database flags (subset; values match the libmdbx/lmdb-compatible layout).
pub const MDBX_DB_DEFAULTS: u32 = 0;
pub const MDBX_DUPSORT: u32 = 0x04;
pub const MDBX_DUPFIXED: u32 = 0x10;
pub const MDBX_CREATE: u32 = 0x4_0000;

// Write flags (subset).
pub const MDBX_UPSERT: u32 = 0;
pub const MDBX_NOOVERWRITE: u32 = 0x10;
pub const MDBX_NODUPDATA: u32 = 0x20;

// Return codes. Negative values mirror libmdbx's error-code space
// (starting at -30799); positive/zero mirror POSIX errno passthrough.
pub const MDBX_SUCCESS: c_int = 0;
pub const MDBX_KEYEXIST: c_int = -30799;
pub const MDBX_NOTFOUND: c_int = -30798;
pub const MDBX_PAGE_NOTFOUND: c_int = -30797;
pub const MDBX_CORRUPTED: c_int = -30796;
pub const MDBX_PANIC: c_int = -30795;
pub const MDBX_VERSION_MISMATCH: c_int = -30794;
pub const MDBX_INVALID: c_int = -30793;
pub const MDBX_MAP_FULL: c_int = -30792;
pub const MDBX_DBS_FULL: c_int = -30791;
pub const MDBX_READERS_FULL: c_int = -30790;
pub const MDBX_TXN_FULL: c_int = -30788;
pub const MDBX_CURSOR_FULL: c_int = -30787;
pub const MDBX_PAGE_FULL: c_int = -30786;
pub const MDBX_MAP_RESIZED: c_int = -30785;
pub const MDBX_INCOMPATIBLE: c_int = -30784;
pub const MDBX_BAD_RSLOT: c_int = -30783;
pub const MDBX_BAD_TXN: c_int = -30782;
pub const MDBX_BAD_VALSIZE: c_int = -30781;
pub const MDBX_BAD_DBI: c_int = -30780;
pub const MDBX_PROBLEM: c_int = -30779;
pub const MDBX_BUSY: c_int = -30778;
pub const MDBX_THREAD_MISMATCH: c_int = -30416;
pub const MDBX_TXN_OVERLAPPING: c_int = -30415;

unsafe extern "C" {
    pub fn mdbx_env_create(penv: *mut *mut MDBX_env) -> c_int;
    pub fn mdbx_env_set_maxdbs(env: *mut MDBX_env, dbs: MDBX_dbi) -> c_int;
    pub fn mdbx_env_set_geometry(
        env: *mut MDBX_env,
        size_lower: isize,
        size_now: isize,
        size_upper: isize,
        growth_step: isize,
        shrink_threshold: isize,
        pagesize: isize,
    ) -> c_int;
    pub fn mdbx_env_open(
        env: *mut MDBX_env,
        path: *const c_char,
        flags: u32,
        mode: u16,
    ) -> c_int;
    pub fn mdbx_env_close_ex(env: *mut MDBX_env, dont_sync: c_int) -> c_int;
    pub fn mdbx_env_info_ex(
        env: *const MDBX_env,
        txn: *const MDBX_txn,
        info: *mut MDBX_envinfo,
        bytes: usize,
    ) -> c_int;

    pub fn mdbx_txn_begin_ex(
        env: *mut MDBX_env,
        parent: *mut MDBX_txn,
        flags: u32,
        txn: *mut *mut MDBX_txn,
        context: *mut c_void,
    ) -> c_int;
    pub fn mdbx_txn_commit_ex(txn: *mut MDBX_txn, latency: *mut c_void) -> c_int;
    pub fn mdbx_txn_abort(txn: *mut MDBX_txn) -> c_int;

    pub fn mdbx_dbi_open(
        txn: *mut MDBX_txn,
        name: *const c_char,
        flags: u32,
        dbi: *mut MDBX_dbi,
    ) -> c_int;
    pub fn mdbx_dbi_flags_ex(
        txn: *mut MDBX_txn,
        dbi: MDBX_dbi,
        flags: *mut u32,
        state: *mut u32,
    ) -> c_int;

    pub fn mdbx_get(
        txn: *mut MDBX_txn,
        dbi: MDBX_dbi,
        key: *const MDBX_val,
        data: *mut MDBX_val,
    ) -> c_int;
    pub fn mdbx_put(
        txn: *mut MDBX_txn,
        dbi: MDBX_dbi,
        key: *const MDBX_val,
        data: *mut MDBX_val,
        flags: u32,
    ) -> c_int;
}
