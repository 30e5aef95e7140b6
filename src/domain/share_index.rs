//! `ShareIndex` newtype for threshold unsealing

use anyhow::{Result, bail};

/// Share index (1..=255)
///
/// The index is the x-coordinate the share was evaluated at. Zero is where the
/// secret itself lives, so it is never a valid share index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShareIndex(u8);

impl ShareIndex {
    /// Smallest valid share index
    pub const MIN: u8 = 1;

    /// Creates a new share index
    ///
    /// # Errors
    /// Returns an error if index is 0
    ///
    /// # Examples
    ///
    /// ```rust
    /// use unsealer::domain::ShareIndex;
    ///
    /// let index = ShareIndex::new(1).unwrap();
    /// assert_eq!(*index, 1);
    ///
    /// assert!(ShareIndex::new(255).is_ok());
    /// // Invalid: 0 is the secret's coordinate
    /// assert!(ShareIndex::new(0).is_err());
    /// ```
    pub fn new(value: u8) -> Result<Self> {
        if value == 0 {
            bail!("Share index 0 is reserved for the secret");
        }
        Ok(Self(value))
    }
}

impl std::ops::Deref for ShareIndex {
    type Target = u8;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ShareIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
