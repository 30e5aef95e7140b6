//! `KeyLength` newtype for the master key size

use anyhow::{Result, bail};

/// Length of the master key in bytes (1..=1024)
///
/// Each byte is shared independently, so this is also the number of field
/// elements carried by every share value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyLength(u16);

impl KeyLength {
    /// Largest supported master key
    pub const MAX: u16 = 1024;

    /// Creates a new key length
    ///
    /// # Errors
    /// Returns an error if length is 0 or larger than [`KeyLength::MAX`]
    pub fn new(value: u16) -> Result<Self> {
        if value == 0 {
            bail!("Key length must be at least 1 byte");
        }
        if value > Self::MAX {
            bail!("Key length {value} exceeds maximum of {} bytes", Self::MAX);
        }
        Ok(Self(value))
    }

    /// Key length as a buffer size
    #[must_use]
    pub fn bytes(&self) -> usize {
        usize::from(self.0)
    }
}

impl std::ops::Deref for KeyLength {
    type Target = u16;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
