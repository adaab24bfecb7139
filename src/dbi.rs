//! The DBI Descriptor Cache (§4.3): a fixed-size table of sub-database
//! descriptors populated once during [`crate::env::init`] and read-only
//! for the rest of the environment's lifetime.
//!
//! Grounded in the teacher's `tx/cache.rs` `DbCache`, simplified from a
//! name-hash lookup to a plain index lookup since every descriptor this
//! crate ever needs is known up front, at init time.

use smallvec::SmallVec;

use crate::config::MAX_DBS;
use crate::flags::{DatabaseFlags, WriteFlags};

/// A single open sub-database's cached identity and flags.
///
/// `is_dupsort`/`is_dupfixed` are cached as plain booleans, rather than
/// re-derived from `flags` on every hot-path check, per §4.3.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DbiDescriptor {
    pub(crate) handle: u32,
    pub(crate) flags: DatabaseFlags,
    pub(crate) default_put_flags: WriteFlags,
    pub(crate) is_dupsort: bool,
    pub(crate) is_dupfixed: bool,
}

impl DbiDescriptor {
    pub(crate) fn new(handle: u32, flags: DatabaseFlags) -> Self {
        Self {
            handle,
            flags,
            default_put_flags: flags.default_put_flags(),
            is_dupsort: flags.is_dupsort(),
            is_dupfixed: flags.is_dupfixed(),
        }
    }
}

/// The fixed-capacity table of descriptors opened for one environment.
pub(crate) type DbiTable = SmallVec<[DbiDescriptor; MAX_DBS]>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_db_defaults_to_no_overwrite() {
        let d = DbiDescriptor::new(1, DatabaseFlags::CREATE);
        assert!(!d.is_dupsort);
        assert!(!d.is_dupfixed);
        assert_eq!(d.default_put_flags, WriteFlags::NO_OVERWRITE);
    }

    #[test]
    fn dupsort_db_defaults_to_no_dup_data() {
        let d = DbiDescriptor::new(2, DatabaseFlags::CREATE | DatabaseFlags::DUP_SORT);
        assert!(d.is_dupsort);
        assert!(!d.is_dupfixed);
        assert_eq!(d.default_put_flags, WriteFlags::NO_DUP_DATA);
    }

    #[test]
    fn dupfixed_implies_dupsort_flags_are_both_cached() {
        let d = DbiDescriptor::new(
            3,
            DatabaseFlags::CREATE | DatabaseFlags::DUP_SORT | DatabaseFlags::DUP_FIXED,
        );
        assert!(d.is_dupsort);
        assert!(d.is_dupfixed);
    }
}
