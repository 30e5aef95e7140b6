//! Session/transport adapter
//!
//! Translates one unseal request into coordinator calls. The transport owns
//! authentication; by the time a request gets here the caller has submission
//! rights. Tokens are trimmed before validation and never logged.

use tracing::debug;
use zeroize::Zeroizing;

use crate::coordinator::{Coordinator, Disposition, SealStatus};
use crate::error::UnsealResult;

/// One unseal request as delivered by the transport
#[derive(Default)]
pub struct UnsealRequest {
    /// Share token, if the caller supplied one
    pub key: Option<Zeroizing<String>>,
    /// Discard progress; any accompanying key is ignored
    pub reset: bool,
    /// Opaque caller session id, for audit only
    pub session: Option<String>,
}

impl UnsealRequest {
    #[must_use]
    pub fn submit(key: impl Into<String>) -> Self {
        Self {
            key: Some(Zeroizing::new(key.into())),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn reset() -> Self {
        Self {
            reset: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }
}

impl std::fmt::Debug for UnsealRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnsealRequest")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("reset", &self.reset)
            .field("session", &self.session)
            .finish()
    }
}

/// Response relayed back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct UnsealResponse {
    #[serde(flatten)]
    pub status: SealStatus,
    /// `None` for reset and status-only requests
    pub disposition: Option<Disposition>,
}

/// Handles one request against the server's coordinator
///
/// # Errors
/// Propagates [`UnsealError`](crate::error::UnsealError) from the submission
pub fn handle(coordinator: &Coordinator, request: &UnsealRequest) -> UnsealResult<UnsealResponse> {
    if request.reset {
        debug!(key_ignored = request.key.is_some(), "reset requested");
        return Ok(UnsealResponse {
            status: coordinator.reset(),
            disposition: None,
        });
    }

    let Some(key) = request.key.as_ref() else {
        return Ok(UnsealResponse {
            status: coordinator.status(),
            disposition: None,
        });
    };

    let submission = coordinator.submit_from(request.session.as_deref(), key.trim())?;
    Ok(UnsealResponse {
        status: submission.status,
        disposition: Some(submission.disposition),
    })
}
