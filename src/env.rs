//! Environment lifecycle (§4.7) and the Map-Size Expander (§4.2).
//!
//! The environment is a process-wide singleton: a single embedded store is
//! opened at a time, guarded by a `parking_lot::Mutex` purely for safe
//! interior mutability (the crate's concurrency model is explicitly
//! single-threaded and cooperative; nothing here relies on the mutex for
//! correctness under contention).

use std::ffi::CString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::ptr;
use std::sync::OnceLock;

use mdbx_batch_sys as ffi;
use parking_lot::Mutex;

use crate::config::{ENV_DIR_MODE, ENV_FILE_MODE, INITIAL_MAP_SIZE, MAX_DBS, MAX_MAP_SIZE};
use crate::dbi::{DbiDescriptor, DbiTable};
use crate::error::{Error, Result};
use crate::flags::DatabaseFlags;
use crate::txn::{Txn, TxnKind};

/// The shape a named sub-database should be opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Plain,
    DupSort,
    DupFixed,
}

impl DbKind {
    fn open_flags(self) -> DatabaseFlags {
        let base = DatabaseFlags::CREATE;
        match self {
            Self::Plain => base,
            Self::DupSort => base | DatabaseFlags::DUP_SORT,
            Self::DupFixed => base | DatabaseFlags::DUP_SORT | DatabaseFlags::DUP_FIXED,
        }
    }
}

struct Environment {
    ptr: *mut ffi::MDBX_env,
    dbis: DbiTable,
}

// The environment handle is only ever touched while holding `ENVIRONMENT`'s
// mutex, from a single cooperative caller; see the module-level note.
unsafe impl Send for Environment {}

static ENVIRONMENT: OnceLock<Mutex<Option<Environment>>> = OnceLock::new();

fn slot() -> &'static Mutex<Option<Environment>> {
    ENVIRONMENT.get_or_init(|| Mutex::new(None))
}

/// Opens the environment at `path`, creating it (and the named
/// sub-databases) if it does not already exist.
///
/// Fails with [`Error::AlreadyInitialized`] if an environment is already
/// open. On any failure after the engine environment itself has been
/// allocated, performs a best-effort shutdown before returning so a failed
/// `init` never leaks a half-open environment.
pub fn init(path: &Path, dbi_names: &[&str], dbi_kinds: &[DbKind]) -> Result<()> {
    if dbi_names.len() != dbi_kinds.len() {
        return Err(Error::Invalid);
    }
    if dbi_names.is_empty() || dbi_names.len() > MAX_DBS {
        return Err(Error::Invalid);
    }

    let mut guard = slot().lock();
    if guard.is_some() {
        return Err(Error::AlreadyInitialized);
    }

    ensure_directory(path)?;

    let mut raw_env: *mut ffi::MDBX_env = ptr::null_mut();
    let rc = unsafe { ffi::mdbx_env_create(&mut raw_env) };
    if rc != ffi::MDBX_SUCCESS {
        tracing::warn!(rc, "mdbx_env_create failed");
        return Err(Error::Io);
    }

    let mut env = Environment { ptr: raw_env, dbis: DbiTable::new() };
    match open_and_populate(&mut env, path, dbi_names, dbi_kinds) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), dbs = dbi_names.len(), "environment initialized");
            *guard = Some(env);
            Ok(())
        }
        Err(e) => {
            close_environment(&mut env);
            Err(e)
        }
    }
}

fn open_and_populate(
    env: &mut Environment,
    path: &Path,
    dbi_names: &[&str],
    dbi_kinds: &[DbKind],
) -> Result<()> {
    let rc = unsafe { ffi::mdbx_env_set_maxdbs(env.ptr, dbi_names.len() as u32) };
    if rc != ffi::MDBX_SUCCESS {
        tracing::warn!(rc, "mdbx_env_set_maxdbs failed");
        return Err(Error::Io);
    }

    let rc = unsafe {
        ffi::mdbx_env_set_geometry(
            env.ptr,
            -1,
            INITIAL_MAP_SIZE as isize,
            MAX_MAP_SIZE as isize,
            -1,
            -1,
            -1,
        )
    };
    if rc != ffi::MDBX_SUCCESS {
        tracing::warn!(rc, "mdbx_env_set_geometry failed");
        return Err(Error::Io);
    }

    let c_path = CString::new(path.as_os_str().to_string_lossy().into_owned()).map_err(|_| Error::Invalid)?;
    let rc = unsafe {
        ffi::mdbx_env_open(env.ptr, c_path.as_ptr(), ffi::MDBX_NOSUBDIR, ENV_FILE_MODE)
    };
    if rc != ffi::MDBX_SUCCESS {
        tracing::warn!(rc, "mdbx_env_open failed");
        return Err(Error::Io);
    }

    let txn = Txn::begin(env.ptr, TxnKind::Rw)?;
    for (name, kind) in dbi_names.iter().zip(dbi_kinds.iter()) {
        let descriptor = open_one_dbi(&txn, name, *kind)?;
        env.dbis.push(descriptor);
    }
    txn.commit()?;
    Ok(())
}

fn open_one_dbi(txn: &Txn, name: &str, kind: DbKind) -> Result<DbiDescriptor> {
    let c_name = CString::new(name).map_err(|_| Error::Invalid)?;
    let requested = kind.open_flags();
    let mut handle: u32 = 0;
    let rc = unsafe { ffi::mdbx_dbi_open(txn.as_ptr(), c_name.as_ptr(), requested.bits(), &mut handle) };
    if rc != ffi::MDBX_SUCCESS {
        tracing::warn!(rc, name, "mdbx_dbi_open failed");
        txn.abort();
        return Err(Error::Io);
    }

    let mut flags_bits: u32 = 0;
    let mut state: u32 = 0;
    let rc = unsafe { ffi::mdbx_dbi_flags_ex(txn.as_ptr(), handle, &mut flags_bits, &mut state) };
    if rc != ffi::MDBX_SUCCESS {
        tracing::warn!(rc, name, "mdbx_dbi_flags_ex failed");
        txn.abort();
        return Err(Error::Io);
    }

    Ok(DbiDescriptor::new(handle, DatabaseFlags::from_bits_truncate(flags_bits)))
}

fn ensure_directory(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) => {
            if !meta.is_dir() {
                return Err(Error::Invalid);
            }
            if meta.permissions().mode() & 0o077 != 0 {
                return Err(Error::Invalid);
            }
            Ok(())
        }
        Err(_) => {
            fs::create_dir_all(path).map_err(|_| Error::Io)?;
            fs::set_permissions(path, fs::Permissions::from_mode(ENV_DIR_MODE)).map_err(|_| Error::Io)?;
            Ok(())
        }
    }
}

/// Closes the environment, freeing the engine handle and the descriptor
/// table. Idempotent: calling this with no environment open is a safe
/// no-op that returns `0`.
pub fn shutdown() -> u64 {
    let mut guard = slot().lock();
    let Some(mut env) = guard.take() else {
        return 0;
    };
    let mapsize = query_mapsize(env.ptr).unwrap_or(0);
    close_environment(&mut env);
    tracing::debug!(mapsize, "environment shut down");
    mapsize
}

fn close_environment(env: &mut Environment) {
    let rc = unsafe { ffi::mdbx_env_close_ex(env.ptr, 0) };
    if rc != ffi::MDBX_SUCCESS {
        tracing::warn!(rc, "mdbx_env_close_ex failed during shutdown");
    }
    env.ptr = ptr::null_mut();
    env.dbis.clear();
}

fn query_mapsize(env: *mut ffi::MDBX_env) -> Result<u64> {
    let mut info: ffi::MDBX_envinfo = unsafe { std::mem::zeroed() };
    let rc = unsafe {
        ffi::mdbx_env_info_ex(env, ptr::null(), &mut info, std::mem::size_of::<ffi::MDBX_envinfo>())
    };
    if rc != ffi::MDBX_SUCCESS {
        return Err(Error::Io);
    }
    Ok(info.mi_mapsize)
}

/// Doubles the current mapping size, refusing if that would exceed
/// [`MAX_MAP_SIZE`]. Retries the size query itself up to the crate's
/// bounded retry budget before giving up with a generic I/O error.
pub(crate) fn expand_map() -> Result<()> {
    let guard = slot().lock();
    let Some(env) = guard.as_ref() else {
        return Err(Error::Invalid);
    };

    let mut current = None;
    for attempt in 0..crate::config::BATCH_RETRY_BUDGET {
        match query_mapsize(env.ptr) {
            Ok(size) => {
                current = Some(size);
                break;
            }
            Err(e) => {
                tracing::debug!(attempt, "map-size query failed while expanding, retrying");
                if attempt + 1 == crate::config::BATCH_RETRY_BUDGET {
                    return Err(e);
                }
            }
        }
    }
    let current = current.ok_or(Error::Io)?;

    let doubled = current.checked_mul(2).ok_or(Error::NoSpace)?;
    if doubled as usize > MAX_MAP_SIZE {
        tracing::warn!(current, doubled, "map expansion would exceed configured maximum");
        return Err(Error::NoSpace);
    }

    let rc = unsafe {
        ffi::mdbx_env_set_geometry(env.ptr, -1, doubled as isize, MAX_MAP_SIZE as isize, -1, -1, -1)
    };
    if rc != ffi::MDBX_SUCCESS {
        tracing::warn!(rc, doubled, "mdbx_env_set_geometry failed while expanding");
        return Err(Error::Io);
    }

    tracing::debug!(from = current, to = doubled, "map size expanded");
    Ok(())
}

/// Current mmap mapping size, in bytes. Supplemental accessor (not in the
/// distilled spec) so map growth can be observed from tests.
pub fn current_map_size() -> Result<u64> {
    let guard = slot().lock();
    let env = guard.as_ref().ok_or(Error::Invalid)?;
    query_mapsize(env.ptr)
}

/// Number of sub-databases opened for the current environment.
pub fn dbi_count() -> Result<usize> {
    let guard = slot().lock();
    let env = guard.as_ref().ok_or(Error::Invalid)?;
    Ok(env.dbis.len())
}

pub(crate) fn with_env<T>(f: impl FnOnce(*mut ffi::MDBX_env, &DbiTable) -> Result<T>) -> Result<T> {
    let guard = slot().lock();
    let env = guard.as_ref().ok_or(Error::Invalid)?;
    f(env.ptr, &env.dbis)
}

/// Flags cached for the sub-database at `index`, for diagnostics and
/// tests. Supplemental accessor, not in the distilled spec.
pub fn dbi_flags(index: usize) -> Result<DatabaseFlags> {
    with_env(|_, dbis| dbis.get(index).map(|d| d.flags).ok_or(Error::Invalid))
}
