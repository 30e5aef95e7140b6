//! Share validator
//!
//! Turns a raw submission into a [`ShareCandidate`] or rejects it as
//! malformed. Checks shape only: a well-formed share can still be wrong, which
//! only shows at reconstruction time.

use zeroize::Zeroizing;

use crate::codec;
use crate::domain::{SealConfig, ShareIndex};
use crate::error::{UnsealError, UnsealResult};
use crate::interpolate::SharePoint;

/// A single submitted share that passed validation
pub struct ShareCandidate {
    pub index: ShareIndex,
    pub value: Zeroizing<Vec<u8>>,
    /// Opaque submitter id, for audit only
    pub session: Option<String>,
}

impl ShareCandidate {
    #[must_use]
    pub fn with_session(mut self, session: Option<&str>) -> Self {
        self.session = session.map(str::to_owned);
        self
    }

    #[must_use]
    pub fn into_point(self) -> SharePoint {
        SharePoint::new(self.index, self.value)
    }
}

impl std::fmt::Debug for ShareCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareCandidate")
            .field("index", &self.index)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Validates a raw share token against the seal configuration
///
/// Accepts a share when:
/// - the token decodes (word token with intact checksum, or base64 token)
/// - a threshold embedded in the token equals the configured threshold
/// - the index is one of the issued indices `1..=N`
/// - the value holds exactly one field element per master key byte
///
/// # Errors
/// Returns [`UnsealError::InvalidShare`] describing the first failed check
pub fn validate(raw: &str, config: &SealConfig) -> UnsealResult<ShareCandidate> {
    let decoded =
        codec::decode_share(raw).map_err(|e| UnsealError::invalid_share(format!("{e:#}")))?;

    if let Some(threshold) = decoded.threshold.filter(|&t| t != config.threshold()) {
        return Err(UnsealError::invalid_share(format!(
            "share was issued for threshold {}, this server requires {}",
            *threshold,
            *config.threshold()
        )));
    }

    if !config.issued(decoded.index) {
        return Err(UnsealError::invalid_share(format!(
            "share index {} is outside 1..={}",
            decoded.index,
            *config.share_count()
        )));
    }

    let expected = config.key_length().bytes();
    if decoded.value.len() != expected {
        return Err(UnsealError::invalid_share(format!(
            "share value is {} bytes, expected {expected}",
            decoded.value.len()
        )));
    }

    Ok(ShareCandidate {
        index: decoded.index,
        value: decoded.value,
        session: None,
    })
}
