//! The Safety Policy (§4.1): the single place in the crate that interprets
//! a raw engine return code and decides whether the caller should retry
//! the whole batch, fail outright, or carry on.

use mdbx_batch_sys as ffi;

use crate::env;
use crate::error::Error;
use crate::txn::Txn;

/// What the batch engine should do after a classified engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SafetyOutcome {
    /// The call succeeded; nothing to retry.
    Ok,
    /// The whole batch should be retried from scratch.
    Retry,
    /// The batch has failed and should surface the paired [`Error`].
    Fail,
}

/// Classifies a raw engine return code, aborting `txn` (if given) whenever
/// the decision table calls for it: every [`SafetyOutcome::Retry`], and
/// every [`SafetyOutcome::Fail`] except [`Error::NotFound`]/[`Error::Exists`],
/// whose side effect is "none" — these are logic-level outcomes, not engine
/// faults, and must leave the transaction intact for the rest of the batch.
///
/// `txn` is `None` only when classifying a condition that happened before
/// any transaction was open (there is no such path for engine calls today,
/// but the signature stays defensive rather than panicking on a future
/// caller that has none to pass).
pub(crate) fn classify(engine_rc: i32, txn: Option<&Txn>) -> (SafetyOutcome, Error) {
    if engine_rc == ffi::MDBX_SUCCESS {
        return (SafetyOutcome::Ok, Error::Invalid);
    }

    let (outcome, err) = match engine_rc {
        ffi::MDBX_NOTFOUND => (SafetyOutcome::Fail, Error::NotFound),
        ffi::MDBX_KEYEXIST => (SafetyOutcome::Fail, Error::Exists),
        ffi::MDBX_MAP_FULL => {
            if env::expand_map().is_ok() {
                (SafetyOutcome::Retry, Error::TryAgain)
            } else {
                (SafetyOutcome::Fail, Error::NoSpace)
            }
        }
        ffi::MDBX_MAP_RESIZED => (SafetyOutcome::Retry, Error::TryAgain),
        ffi::MDBX_PAGE_FULL | ffi::MDBX_CURSOR_FULL | ffi::MDBX_TXN_FULL => {
            (SafetyOutcome::Retry, Error::Overflow)
        }
        ffi::MDBX_BAD_RSLOT => (SafetyOutcome::Retry, Error::Busy),
        ffi::MDBX_READERS_FULL => (SafetyOutcome::Retry, Error::TryAgain),
        ffi::MDBX_CORRUPTED | ffi::MDBX_PAGE_NOTFOUND | ffi::MDBX_PANIC => {
            (SafetyOutcome::Fail, Error::Io)
        }
        ffi::MDBX_INCOMPATIBLE => (SafetyOutcome::Fail, Error::Protocol),
        ffi::MDBX_VERSION_MISMATCH | ffi::MDBX_BAD_TXN | ffi::MDBX_BAD_VALSIZE | ffi::MDBX_INVALID => {
            (SafetyOutcome::Fail, Error::Invalid)
        }
        ffi::MDBX_BAD_DBI => (SafetyOutcome::Fail, Error::Stale),
        other => {
            tracing::warn!(rc = other, "unclassified engine return code, treating as I/O failure");
            (SafetyOutcome::Fail, Error::Io)
        }
    };

    let should_abort = match outcome {
        SafetyOutcome::Ok => false,
        SafetyOutcome::Retry => true,
        SafetyOutcome::Fail => !matches!(err, Error::NotFound | Error::Exists),
    };
    if should_abort {
        if let Some(txn) = txn {
            txn.abort();
        }
    }

    (outcome, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_ok_with_no_txn() {
        let (outcome, _) = classify(ffi::MDBX_SUCCESS, None);
        assert_eq!(outcome, SafetyOutcome::Ok);
    }

    #[test]
    fn not_found_fails_without_retry() {
        let (outcome, err) = classify(ffi::MDBX_NOTFOUND, None);
        assert_eq!(outcome, SafetyOutcome::Fail);
        assert_eq!(err, Error::NotFound);
    }

    #[test]
    fn key_exist_fails_with_exists() {
        let (outcome, err) = classify(ffi::MDBX_KEYEXIST, None);
        assert_eq!(outcome, SafetyOutcome::Fail);
        assert_eq!(err, Error::Exists);
    }

    #[test]
    fn unclassified_code_is_io_failure() {
        let (outcome, err) = classify(-1, None);
        assert_eq!(outcome, SafetyOutcome::Fail);
        assert_eq!(err, Error::Io);
    }
}
