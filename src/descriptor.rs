//! Key/Value Descriptors and the Descriptor Resolver (§4.4).
//!
//! A descriptor is either an inline borrowed buffer, a back-reference into
//! an earlier operation's own key or value within the same batch, or
//! absent. The resolver walks back-references until it lands on a
//! concrete buffer, rejecting anything that isn't a strictly-earlier,
//! in-bounds operation.

use crate::error::{Error, Result};

/// Which side of a referenced operation a [`Descriptor::Lookup`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefSide {
    Key,
    Val,
}

/// A key or value as supplied to [`crate::enqueue`].
#[derive(Debug, Clone, Copy)]
pub(crate) enum Descriptor {
    /// No buffer was supplied.
    None,
    /// A concrete, caller-owned buffer.
    Present { ptr: *const u8, size: usize },
    /// A back-reference: `ref_index` operations before the current one,
    /// read from that operation's key or value.
    Lookup { ref_index: usize, side: RefSide },
}

/// An operation's resolved key or value, as needed by [`resolve`]'s caller.
pub(crate) trait ResolvedOps {
    fn key_descriptor(&self, index: usize) -> Descriptor;
    fn val_descriptor(&self, index: usize) -> Descriptor;
}

/// Resolves the descriptor at `op_index`'s `side` to a concrete buffer,
/// following back-references within `ops`.
///
/// Back-references must point strictly backward (`ref_index >= 1`) and
/// in-bounds; this is also checked at enqueue time, but the resolver
/// re-checks so it never reads out of bounds even if that invariant were
/// ever violated upstream.
pub(crate) fn resolve(ops: &impl ResolvedOps, op_index: usize, side: RefSide) -> Result<(*const u8, usize)> {
    let descriptor = match side {
        RefSide::Key => ops.key_descriptor(op_index),
        RefSide::Val => ops.val_descriptor(op_index),
    };
    resolve_descriptor(ops, op_index, descriptor)
}

fn resolve_descriptor(ops: &impl ResolvedOps, op_index: usize, descriptor: Descriptor) -> Result<(*const u8, usize)> {
    match descriptor {
        Descriptor::None => Err(Error::Invalid),
        Descriptor::Present { ptr, size } => {
            if ptr.is_null() || size == 0 {
                return Err(Error::Invalid);
            }
            Ok((ptr, size))
        }
        Descriptor::Lookup { ref_index, side } => {
            if ref_index == 0 || ref_index > op_index {
                return Err(Error::Invalid);
            }
            let source = op_index - ref_index;
            resolve(ops, source, side)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeOps(Vec<(Descriptor, Descriptor)>);

    impl ResolvedOps for FakeOps {
        fn key_descriptor(&self, index: usize) -> Descriptor {
            self.0[index].0
        }
        fn val_descriptor(&self, index: usize) -> Descriptor {
            self.0[index].1
        }
    }

    #[test]
    fn present_descriptor_resolves_directly() {
        let buf = [1u8, 2, 3];
        let ops = FakeOps(vec![(Descriptor::Present { ptr: buf.as_ptr(), size: 3 }, Descriptor::None)]);
        let (ptr, size) = resolve(&ops, 0, RefSide::Key).unwrap();
        assert_eq!(size, 3);
        assert_eq!(ptr, buf.as_ptr());
    }

    #[test]
    fn zero_ref_index_is_rejected() {
        let ops = FakeOps(vec![(Descriptor::Lookup { ref_index: 0, side: RefSide::Key }, Descriptor::None)]);
        assert_eq!(resolve(&ops, 0, RefSide::Key).unwrap_err(), Error::Invalid);
    }

    #[test]
    fn out_of_bounds_back_reference_is_rejected() {
        let ops = FakeOps(vec![(Descriptor::Lookup { ref_index: 5, side: RefSide::Key }, Descriptor::None)]);
        assert_eq!(resolve(&ops, 0, RefSide::Key).unwrap_err(), Error::Invalid);
    }

    #[test]
    fn back_reference_follows_to_an_earlier_present_value() {
        let buf = [9u8, 9];
        let ops = FakeOps(vec![
            (Descriptor::Present { ptr: buf.as_ptr(), size: 2 }, Descriptor::None),
            (Descriptor::Lookup { ref_index: 1, side: RefSide::Key }, Descriptor::None),
        ]);
        let (ptr, size) = resolve(&ops, 1, RefSide::Key).unwrap();
        assert_eq!(size, 2);
        assert_eq!(ptr, buf.as_ptr());
    }
}
