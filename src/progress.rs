//! Unseal progress store
//!
//! Accepted shares for the current unseal attempt, keyed by share index so
//! submission order does not matter and duplicates are structurally excluded.
//! Dropping or clearing the store zeroizes every held value.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::domain::ShareIndex;
use crate::interpolate::SharePoint;
use crate::validator::ShareCandidate;

/// Result of offering a candidate to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Added,
    /// Index already held; the first value is kept
    Duplicate,
}

/// Shares accumulated toward the threshold
#[derive(Default)]
pub struct UnsealProgress {
    accepted: BTreeMap<ShareIndex, ShareCandidate>,
}

impl UnsealProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&mut self, candidate: ShareCandidate) -> Admission {
        match self.accepted.entry(candidate.index) {
            Entry::Occupied(_) => Admission::Duplicate,
            Entry::Vacant(slot) => {
                slot.insert(candidate);
                Admission::Added
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Discards all accepted shares
    pub fn clear(&mut self) {
        self.accepted.clear();
    }

    /// Moves every accepted share out as an interpolation point, leaving the
    /// store empty
    pub fn take_points(&mut self) -> Vec<SharePoint> {
        std::mem::take(&mut self.accepted)
            .into_values()
            .map(ShareCandidate::into_point)
            .collect()
    }
}

impl std::fmt::Debug for UnsealProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnsealProgress")
            .field("indices", &self.accepted.keys().collect::<Vec<_>>())
            .finish()
    }
}
