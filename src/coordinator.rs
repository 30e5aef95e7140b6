//! Unseal coordinator
//!
//! Drives the seal state machine:
//!
//! ```text
//! Sealed/Unsealing --submit (progress < T)--------------> Unsealing
//! Sealed/Unsealing --submit (progress == T, verified)---> Unsealed
//! Sealed/Unsealing --submit (progress == T, mismatch)---> Sealed, progress cleared
//! Sealed/Unsealing --reset------------------------------> Sealed, progress cleared
//! Unsealed is terminal here; resealing belongs to the runtime.
//! ```
//!
//! One [`Coordinator`] is owned per server and shared by reference (usually an
//! `Arc`) with every request handler. Every mutation runs inside one mutex,
//! so the threshold check, the reconstruction and the state transition form a
//! single step: concurrent submissions that would each complete the threshold
//! still cause exactly one reconstruction.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::domain::SealConfig;
use crate::error::{UnsealError, UnsealResult};
use crate::interpolate;
use crate::key::MasterKey;
use crate::progress::{Admission, UnsealProgress};
use crate::validator;

/// Runtime component that takes ownership of the master key on unseal
///
/// Called exactly once per successful reconstruction, while the coordinator
/// holds its lock. Implementations must not log or persist the key.
pub trait Barrier: Send + Sync {
    fn install(&self, key: MasterKey);
}

impl<T: Barrier + ?Sized> Barrier for Arc<T> {
    fn install(&self, key: MasterKey) {
        (**self).install(key);
    }
}

/// Barrier that keeps the key in memory until it is dropped
#[derive(Default)]
pub struct KeySlot(Mutex<Option<MasterKey>>);

impl KeySlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Runs `f` against the held key, if any
    pub fn with_key<R>(&self, f: impl FnOnce(&MasterKey) -> R) -> Option<R> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(f)
    }
}

impl Barrier for KeySlot {
    fn install(&self, key: MasterKey) {
        // A previous key, if any, is zeroized as it drops here
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(key);
    }
}

/// Seal state of the protected runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SealState {
    Sealed,
    /// Sealed, with at least one share accepted toward the threshold
    Unsealing,
    Unsealed,
}

impl SealState {
    #[must_use]
    pub fn is_sealed(self) -> bool {
        !matches!(self, Self::Unsealed)
    }
}

/// Externally visible seal status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SealStatus {
    pub sealed: bool,
    pub share_count: u8,
    pub threshold: u8,
    pub progress: u8,
}

impl std::fmt::Display for SealStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Sealed: {}", self.sealed)?;
        writeln!(f, "Key Shares: {}", self.share_count)?;
        writeln!(f, "Key Threshold: {}", self.threshold)?;
        write!(f, "Unseal Progress: {}", self.progress)
    }
}

/// What happened to an accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// New share added; threshold not yet reached
    Accepted,
    /// Share index already held in this attempt; nothing changed
    Duplicate,
    /// This share completed the threshold and the runtime is now unsealed
    Unsealed,
    /// The runtime was already unsealed; the share was ignored
    AlreadyUnsealed,
}

/// Successful result of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub status: SealStatus,
    pub disposition: Disposition,
}

struct Inner {
    state: SealState,
    progress: UnsealProgress,
}

/// Server-wide unseal context
pub struct Coordinator {
    config: SealConfig,
    barrier: Box<dyn Barrier>,
    inner: Mutex<Inner>,
}

impl Coordinator {
    /// Creates a sealed coordinator for `config`
    pub fn new(config: SealConfig, barrier: impl Barrier + 'static) -> Self {
        if *config.threshold() == 1 {
            warn!("seal threshold is 1; any single share unseals");
        }
        Self {
            config,
            barrier: Box::new(barrier),
            inner: Mutex::new(Inner {
                state: SealState::Sealed,
                progress: UnsealProgress::new(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SealConfig {
        &self.config
    }

    /// Submits one share token
    ///
    /// # Errors
    /// Returns [`UnsealError::InvalidShare`] for a malformed token (nothing
    /// changes) and [`UnsealError::ReconstructionFailed`] when the threshold
    /// was reached but the shares did not verify (progress is discarded)
    pub fn submit(&self, raw: &str) -> UnsealResult<Submission> {
        self.submit_from(None, raw)
    }

    /// Submits one share token on behalf of an operator session
    ///
    /// The session id is only recorded for audit logging.
    ///
    /// # Errors
    /// See [`Coordinator::submit`]
    #[instrument(skip_all, fields(session = session.unwrap_or("-")))]
    pub fn submit_from(&self, session: Option<&str>, raw: &str) -> UnsealResult<Submission> {
        let mut inner = self.lock();

        if inner.state == SealState::Unsealed {
            debug!("share ignored, already unsealed");
            return Ok(Submission {
                status: self.status_of(&inner),
                disposition: Disposition::AlreadyUnsealed,
            });
        }

        let candidate = match validator::validate(raw, &self.config) {
            Ok(candidate) => candidate.with_session(session),
            Err(err) => {
                info!("share rejected as malformed");
                return Err(err);
            }
        };
        let index = candidate.index;

        if inner.progress.admit(candidate) == Admission::Duplicate {
            debug!(index = *index, "duplicate share index ignored");
            return Ok(Submission {
                status: self.status_of(&inner),
                disposition: Disposition::Duplicate,
            });
        }

        let threshold = usize::from(*self.config.threshold());
        if inner.progress.len() < threshold {
            inner.state = SealState::Unsealing;
            info!(
                index = *index,
                progress = inner.progress.len(),
                threshold,
                "share accepted"
            );
            return Ok(Submission {
                status: self.status_of(&inner),
                disposition: Disposition::Accepted,
            });
        }

        let points = inner.progress.take_points();
        // Progress is empty from here on; stay sealed until install returns
        inner.state = SealState::Sealed;
        match interpolate::reconstruct(&points, self.config.threshold(), self.config.key_check()) {
            Ok(key) => {
                drop(points);
                self.barrier.install(key);
                inner.state = SealState::Unsealed;
                info!("threshold reached, unsealed");
                Ok(Submission {
                    status: self.status_of(&inner),
                    disposition: Disposition::Unsealed,
                })
            }
            Err(_) => {
                warn!("threshold reached but reconstruction failed verification, progress reset");
                Err(UnsealError::ReconstructionFailed)
            }
        }
    }

    /// Discards all accepted shares
    ///
    /// A no-op once unsealed.
    #[instrument(skip_all)]
    pub fn reset(&self) -> SealStatus {
        let mut inner = self.lock();
        if inner.state != SealState::Unsealed {
            let discarded = inner.progress.len();
            inner.progress.clear();
            inner.state = SealState::Sealed;
            info!(discarded, "unseal progress reset");
        }
        self.status_of(&inner)
    }

    /// Read-only snapshot of the seal status
    #[must_use]
    pub fn status(&self) -> SealStatus {
        self.status_of(&self.lock())
    }

    #[must_use]
    pub fn state(&self) -> SealState {
        self.lock().state
    }

    fn status_of(&self, inner: &Inner) -> SealStatus {
        // progress never exceeds the threshold, which is a u8
        let progress = u8::try_from(inner.progress.len()).unwrap_or(u8::MAX);
        SealStatus {
            sealed: inner.state.is_sealed(),
            share_count: *self.config.share_count(),
            threshold: *self.config.threshold(),
            progress,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Inner is consistent at every point a panic could unwind through
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
