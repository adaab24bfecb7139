//! The Batch Engine (§4.6): accumulate operations against the process-wide
//! batch singleton, then run them all inside one transaction with bounded
//! whole-batch retry.

use std::sync::OnceLock;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::action::{self, ActionOutcome};
use crate::config::{BATCH_OP_CAPACITY, BATCH_RETRY_BUDGET, RW_SCRATCH_CAPACITY};
use crate::descriptor::{self, Descriptor, RefSide, ResolvedOps};
use crate::error::{Error, Result};
use crate::txn::{Txn, TxnKind};

/// The kind of operation an [`Operation`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    Get,
    Put,
}

impl OpType {
    fn requires_rw(self) -> bool {
        matches!(self, Self::Put)
    }
}

/// One queued operation.
#[derive(Clone, Copy)]
struct Operation {
    dbi_index: usize,
    op_type: OpType,
    key: Descriptor,
    val: Descriptor,
}

struct Batch {
    kind: Option<TxnKind>,
    ops: SmallVec<[Operation; BATCH_OP_CAPACITY]>,
}

impl Batch {
    fn new() -> Self {
        Self { kind: None, ops: SmallVec::new() }
    }

    fn reset(&mut self) {
        self.kind = None;
        self.ops.clear();
    }
}

static BATCH: OnceLock<Mutex<Batch>> = OnceLock::new();

fn slot() -> &'static Mutex<Batch> {
    BATCH.get_or_init(|| Mutex::new(Batch::new()))
}

/// Queues one operation. Validates `dbi_index` against the open
/// environment and bounds-checks any back-reference before accepting the
/// operation, so a malformed descriptor fails with [`Error::Invalid`]
/// before any engine call is ever made.
pub(crate) fn enqueue(dbi_index: usize, op_type: OpType, key: Descriptor, val: Descriptor) -> Result<()> {
    if dbi_index >= crate::env::dbi_count()? {
        return Err(Error::Invalid);
    }

    let mut batch = slot().lock();
    let op_index = batch.ops.len();
    if op_index >= BATCH_OP_CAPACITY {
        return Err(Error::Invalid);
    }
    check_back_reference(key, op_index)?;
    check_back_reference(val, op_index)?;
    if matches!(key, Descriptor::None) {
        return Err(Error::Invalid);
    }
    match op_type {
        // A put's value must resolve to real bytes, inline or via
        // back-reference; a get's value slot is either empty (stash the
        // result for later back-reference) or a caller-owned out buffer,
        // never itself a back-reference.
        OpType::Put if matches!(val, Descriptor::None) => return Err(Error::Invalid),
        OpType::Get if matches!(val, Descriptor::Lookup { .. }) => return Err(Error::Invalid),
        _ => {}
    }

    let wants_rw = op_type.requires_rw();
    batch.kind = Some(match (batch.kind, wants_rw) {
        (Some(TxnKind::Rw), _) => TxnKind::Rw,
        (_, true) => TxnKind::Rw,
        (Some(TxnKind::Ro), false) => TxnKind::Ro,
        (None, false) => TxnKind::Ro,
    });
    batch.ops.push(Operation { dbi_index, op_type, key, val });
    Ok(())
}

fn check_back_reference(descriptor: Descriptor, op_index: usize) -> Result<()> {
    if let Descriptor::Lookup { ref_index, .. } = descriptor {
        if ref_index == 0 || ref_index > op_index {
            return Err(Error::Invalid);
        }
    }
    Ok(())
}

struct ExecCtx<'a> {
    ops: &'a [Operation],
    resolved_val: &'a [Option<(*const u8, usize)>],
}

impl ResolvedOps for ExecCtx<'_> {
    fn key_descriptor(&self, index: usize) -> Descriptor {
        self.ops[index].key
    }

    fn val_descriptor(&self, index: usize) -> Descriptor {
        match self.resolved_val[index] {
            Some((ptr, size)) => Descriptor::Present { ptr, size },
            None => self.ops[index].val,
        }
    }
}

enum AttemptOutcome {
    Committed,
    Retry,
}

/// Runs every queued operation inside one transaction, retrying the whole
/// batch up to [`BATCH_RETRY_BUDGET`] times on a transient engine
/// condition. The batch singleton is cleared before this returns,
/// regardless of outcome.
pub(crate) fn execute() -> Result<()> {
    let result = execute_inner();
    slot().lock().reset();
    result
}

fn execute_inner() -> Result<()> {
    let (kind, op_count) = {
        let batch = slot().lock();
        (batch.kind, batch.ops.len())
    };
    let Some(kind) = kind else {
        return Ok(());
    };
    if op_count == 0 {
        return Ok(());
    }

    for attempt in 0..BATCH_RETRY_BUDGET {
        match attempt_once(kind) {
            Ok(AttemptOutcome::Committed) => return Ok(()),
            Ok(AttemptOutcome::Retry) => {
                tracing::debug!(attempt, "batch attempt requested retry");
            }
            Err(e) => return Err(e),
        }
    }
    tracing::warn!("batch exhausted its retry budget");
    Err(Error::Io)
}

fn attempt_once(kind: TxnKind) -> Result<AttemptOutcome> {
    crate::env::with_env(|env_ptr, dbis| {
        let txn = Txn::begin(env_ptr, kind)?;
        let ops: SmallVec<[Operation; BATCH_OP_CAPACITY]> = slot().lock().ops.clone();

        // Reserved once and never allowed to grow past this capacity (see
        // `stabilize`), so a pointer handed out for one `get` stays valid
        // even after a later `get` in the same attempt appends to it.
        let mut scratch: Vec<u8> = Vec::with_capacity(RW_SCRATCH_CAPACITY);
        let mut resolved_val: Vec<Option<(*const u8, usize)>> = vec![None; ops.len()];

        for (index, op) in ops.iter().enumerate() {
            let dbi = dbis.get(op.dbi_index).ok_or(Error::Invalid)?;
            let ctx = ExecCtx { ops: &ops, resolved_val: &resolved_val };
            let key = descriptor::resolve(&ctx, index, RefSide::Key)?;

            match op.op_type {
                OpType::Put => {
                    let val = descriptor::resolve(&ctx, index, RefSide::Val)?;
                    match action::put(&txn, dbi, key, val) {
                        ActionOutcome::Ok(()) => {}
                        ActionOutcome::Retry => return Ok(AttemptOutcome::Retry),
                        ActionOutcome::Fail(e) => return Err(e),
                    }
                }
                OpType::Get => match action::get(&txn, dbi, key) {
                    ActionOutcome::Ok(result) => {
                        let stabilized = stabilize(kind, &mut scratch, op.val, result.ptr, result.size)?;
                        resolved_val[index] = Some(stabilized);
                    }
                    ActionOutcome::Retry => return Ok(AttemptOutcome::Retry),
                    ActionOutcome::Fail(e) => return Err(e),
                },
            }
        }

        match kind {
            TxnKind::Rw => txn.commit()?,
            TxnKind::Ro => txn.abort(),
        }
        Ok(AttemptOutcome::Committed)
    })
}

/// Stabilizes a `get` result so later back-references can read it safely.
///
/// The scratch buffer only matters for RW batches: a write later in the
/// same attempt can move pages underneath an engine-owned pointer, so an
/// engine-owned (`val=None`) result is copied into the batch's RW scratch
/// buffer. A RO batch never writes, so the engine's own pointer stays
/// valid for the rest of the attempt and is returned as-is. Either way, a
/// caller-supplied output buffer (`val=Present`) is copied into directly,
/// independent of `kind`.
fn stabilize(
    kind: TxnKind,
    scratch: &mut Vec<u8>,
    original_val: Descriptor,
    ptr: *const u8,
    size: usize,
) -> Result<(*const u8, usize)> {
    match original_val {
        Descriptor::None => match kind {
            TxnKind::Ro => Ok((ptr, size)),
            TxnKind::Rw => {
                if scratch.len() + size > RW_SCRATCH_CAPACITY {
                    return Err(Error::NoMemory);
                }
                let start = scratch.len();
                scratch.extend_from_slice(unsafe { std::slice::from_raw_parts(ptr, size) });
                Ok((scratch[start..].as_ptr(), size))
            }
        },
        Descriptor::Present { ptr: out_ptr, size: capacity } => {
            if size > capacity {
                return Err(Error::Protocol);
            }
            if out_ptr.is_null() {
                return Err(Error::Invalid);
            }
            unsafe {
                std::ptr::copy_nonoverlapping(ptr, out_ptr as *mut u8, size);
            }
            Ok((out_ptr, size))
        }
        Descriptor::Lookup { .. } => Err(Error::Invalid),
    }
}
