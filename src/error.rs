use std::fmt;

/// Result type used throughout the library to surface deterministic errors.
pub type MerkleResult<T> = Result<T, MerkleError>;

/// Errors emitted by the Merkle layer.
///
/// The two variants deliberately mirror the recovery contract: an
/// [`InvalidArgument`](MerkleError::InvalidArgument) is reported at the API
/// boundary and the caller can correct its input, while an
/// [`Invariant`](MerkleError::Invariant) means the library's own state checks
/// failed (tampered data or a bug) and is not expected to be recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// The caller supplied something malformed.
    InvalidArgument(String),
    /// A consistency check over library-owned state failed.
    Invariant(String),
}

impl MerkleError {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        MerkleError::InvalidArgument(reason.into())
    }

    pub(crate) fn invariant(reason: impl Into<String>) -> Self {
        MerkleError::Invariant(reason.into())
    }
}

impl fmt::Display for MerkleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MerkleError::InvalidArgument(reason) => write!(f, "invalid argument: {}", reason),
            MerkleError::Invariant(reason) => write!(f, "invariant violation: {}", reason),
        }
    }
}

impl std::error::Error for MerkleError {}
