//! Thin `bitflags` wrappers around the engine's raw database and write
//! flag bits, grounded in the same pattern the reference MDBX wrapper uses
//! for its own `DatabaseFlags`/`WriteFlags`.

use mdbx_batch_sys as ffi;

bitflags::bitflags! {
    /// Flags a sub-database was (or should be) opened with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DatabaseFlags: u32 {
        const CREATE = ffi::MDBX_CREATE;
        const DUP_SORT = ffi::MDBX_DUPSORT;
        const DUP_FIXED = ffi::MDBX_DUPFIXED;
    }
}

bitflags::bitflags! {
    /// Flags controlling a single `put`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WriteFlags: u32 {
        const NO_OVERWRITE = ffi::MDBX_NOOVERWRITE;
        const NO_DUP_DATA = ffi::MDBX_NODUPDATA;
    }
}

impl DatabaseFlags {
    pub(crate) fn is_dupsort(self) -> bool {
        self.contains(Self::DUP_SORT)
    }

    pub(crate) fn is_dupfixed(self) -> bool {
        self.contains(Self::DUP_FIXED)
    }

    /// Default put flags derived from a DBI's cached flags (§4.3): a
    /// dup-sorted database defaults to "no duplicate data", anything else
    /// defaults to "no overwrite".
    pub(crate) fn default_put_flags(self) -> WriteFlags {
        if self.is_dupsort() {
            WriteFlags::NO_DUP_DATA
        } else {
            WriteFlags::NO_OVERWRITE
        }
    }
}
