//! `ShareCount` newtype for threshold unsealing

use anyhow::{Result, bail};

/// Number of shares issued when the master key was split (1..=255)
///
/// Every share needs a distinct non-zero x-coordinate in GF(256),
/// so at most 255 shares can exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ShareCount(u8);

impl ShareCount {
    /// Minimum valid share count
    pub const MIN: u8 = 1;

    /// Creates a new share count
    ///
    /// # Errors
    /// Returns an error if count is 0
    ///
    /// # Examples
    ///
    /// ```rust
    /// use unsealer::domain::ShareCount;
    ///
    /// let count = ShareCount::new(5).unwrap();
    /// assert_eq!(*count, 5);
    ///
    /// assert!(ShareCount::new(255).is_ok());
    /// assert!(ShareCount::new(0).is_err());
    /// ```
    pub fn new(value: u8) -> Result<Self> {
        if value < Self::MIN {
            bail!("Share count must be at least 1");
        }
        Ok(Self(value))
    }

    /// Returns true if `index` names one of the issued shares
    #[must_use]
    pub fn contains(&self, index: super::ShareIndex) -> bool {
        *index <= self.0
    }
}

impl std::ops::Deref for ShareCount {
    type Target = u8;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
