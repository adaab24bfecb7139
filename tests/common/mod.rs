//! Shared test infrastructure.
//!
//! The environment and batch singletons are process-wide, so integration
//! tests that call `init`/`shutdown` must not run concurrently within the
//! same process. [`serialized`] takes a process-wide lock for the
//! duration of one test body.

use std::sync::{Mutex, MutexGuard, OnceLock};

static GUARD: OnceLock<Mutex<()>> = OnceLock::new();

pub fn serialized() -> MutexGuard<'static, ()> {
    GUARD.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn open_env(dir: &std::path::Path, dbi_names: &[&str]) {
    let kinds = vec![mdbx_batch::DbKind::Plain; dbi_names.len()];
    let rc = mdbx_batch::init(dir, dbi_names, &kinds);
    assert_eq!(rc, 0, "init failed with {rc}");
}
