//! Threshold newtype for threshold unsealing

use anyhow::Result;

/// Threshold for unsealing (1..=255)
///
/// Invariant: threshold >= 1 (enforced at construction).
/// A threshold of 1 is legal but means any single share unseals on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Threshold(u8);

impl Threshold {
    /// Creates a new threshold, returning an error if value is 0
    ///
    /// # Errors
    /// Returns an error if the threshold is 0
    ///
    /// # Examples
    ///
    /// ```rust
    /// use unsealer::domain::Threshold;
    ///
    /// let threshold = Threshold::new(3).unwrap();
    /// assert_eq!(*threshold, 3);
    ///
    /// // Invalid: at least one share is always required
    /// assert!(Threshold::new(0).is_err());
    /// ```
    pub fn new(value: u8) -> Result<Self> {
        if value == 0 {
            anyhow::bail!("Threshold must be at least 1 (got {value})");
        }
        Ok(Self(value))
    }
}

impl std::ops::Deref for Threshold {
    type Target = u8;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
