//! The closed error-kind set this crate surfaces to callers (§7).
//!
//! The [`safety`](crate::safety) module is the only place that interprets raw
//! engine return codes; everywhere else in the crate deals exclusively with
//! [`Error`].

/// A closed set of error kinds a caller can observe.
///
/// Every public operation that can fail returns one of these, either as a
/// [`Result`] or, at the FFI-shaped surface in [`crate::enqueue`] and
/// friends, as the negation of [`Error::code`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A precondition was violated (bad index, batch full, malformed
    /// back-reference, directory exists with the wrong mode, ...).
    #[error("invalid operation or argument")]
    Invalid,
    /// The engine reported the key was not present.
    #[error("key not found")]
    NotFound,
    /// A unique-insert violated an existing key.
    #[error("key already exists")]
    Exists,
    /// The mapping is exhausted and cannot be grown further.
    #[error("map is full and cannot grow past the configured maximum")]
    NoSpace,
    /// A page, cursor, or transaction-local structure overflowed.
    #[error("page, cursor, or transaction overflow")]
    Overflow,
    /// The engine is busy (e.g. reader-slot contention).
    #[error("engine is busy")]
    Busy,
    /// A transient condition the caller should retry independently of the
    /// batch engine's own bounded retry (reserved for propagation past
    /// exhausted retry budgets that are themselves transient).
    #[error("transient condition, try again")]
    TryAgain,
    /// Incompatible flags were requested against an existing DBI.
    #[error("incompatible database flags")]
    Protocol,
    /// A DBI handle was stale (closed or dropped underneath the caller).
    #[error("stale database handle")]
    Stale,
    /// Corruption, a missing page, an engine panic, or any other
    /// unclassified nonzero engine condition.
    #[error("storage engine I/O error")]
    Io,
    /// The RW scratch buffer (or another fixed-capacity allocator) is
    /// exhausted.
    #[error("out of scratch memory")]
    NoMemory,
    /// `init` was called while an environment already exists.
    #[error("environment already initialized")]
    AlreadyInitialized,
}

impl Error {
    /// The stable, 1-based code used to build the public `-code` return
    /// values described in §6.1. Kept as a method (rather than
    /// `#[repr(i32)]` on the enum) so the mapping stays explicit and
    /// reviewable in one place.
    pub const fn code(self) -> i32 {
        match self {
            Self::Invalid => 1,
            Self::NotFound => 2,
            Self::Exists => 3,
            Self::NoSpace => 4,
            Self::Overflow => 5,
            Self::Busy => 6,
            Self::TryAgain => 7,
            Self::Protocol => 8,
            Self::Stale => 9,
            Self::Io => 10,
            Self::NoMemory => 11,
            Self::AlreadyInitialized => 12,
        }
    }

    /// The value a public, FFI-shaped operation returns on failure: the
    /// negation of [`Error::code`]. Success is always `0`.
    pub const fn as_return_code(self) -> i32 {
        -self.code()
    }
}

/// Alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Collapses a `Result<(), Error>` into the public signed-integer surface
/// described in §6.1: `0` on success, `-code` on failure.
pub(crate) fn to_return_code(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => e.as_return_code(),
    }
}
