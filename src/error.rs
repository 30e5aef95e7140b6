//! Unseal error taxonomy
//!
//! Only two outcomes are errors. A duplicate share and a submission after
//! unsealing are successful no-ops, reported through
//! [`Disposition`](crate::coordinator::Disposition).

use thiserror::Error;

/// Errors returned by the unseal coordinator
///
/// Messages never contain share values, tokens or key material.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsealError {
    /// The submitted token is malformed or does not belong to this seal
    /// configuration. No state was changed; retry with a corrected share.
    #[error("Invalid unseal share: {reason}")]
    InvalidShare { reason: String },

    /// The threshold was reached but the shares did not reconstruct the
    /// master key. Progress has been discarded.
    #[error(
        "Unseal failed: the submitted shares did not reconstruct the master key. \
         Progress has been reset; enter a fresh set of shares"
    )]
    ReconstructionFailed,
}

impl UnsealError {
    pub(crate) fn invalid_share(reason: impl Into<String>) -> Self {
        Self::InvalidShare {
            reason: reason.into(),
        }
    }
}

/// Result type for coordinator operations
pub type UnsealResult<T> = Result<T, UnsealError>;
