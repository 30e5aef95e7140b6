//! Seal configuration
//!
//! Created once when the master key is split, then only ever read.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use super::{KeyLength, ShareCount, ShareIndex, Threshold};
use crate::key::KeyCheck;

/// Validated, immutable seal configuration
///
/// Enforces threshold <= `share_count` at construction. The field is fixed to
/// GF(256) applied bytewise, so the only field parameter is the key length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SealConfigFile", into = "SealConfigFile")]
pub struct SealConfig {
    threshold: Threshold,
    share_count: ShareCount,
    key_length: KeyLength,
    key_check: KeyCheck,
}

/// On-disk form of [`SealConfig`]
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SealConfigFile {
    shares: u8,
    threshold: u8,
    key_length: u16,
    key_check: KeyCheck,
}

impl SealConfig {
    /// Creates a new seal configuration
    ///
    /// # Errors
    /// Returns an error if threshold exceeds share count
    ///
    /// # Examples
    ///
    /// ```rust
    /// use unsealer::domain::{KeyLength, SealConfig, ShareCount, Threshold};
    /// use unsealer::key::KeyCheck;
    ///
    /// let check = KeyCheck::compute(&[7u8; 32]);
    /// let config = SealConfig::new(
    ///     Threshold::new(3).unwrap(),
    ///     ShareCount::new(5).unwrap(),
    ///     KeyLength::new(32).unwrap(),
    ///     check,
    /// ).unwrap();
    /// assert_eq!(*config.threshold(), 3);
    ///
    /// let result = SealConfig::new(
    ///     Threshold::new(5).unwrap(),
    ///     ShareCount::new(3).unwrap(),
    ///     KeyLength::new(32).unwrap(),
    ///     check,
    /// );
    /// assert!(result.is_err());
    /// ```
    pub fn new(
        threshold: Threshold,
        share_count: ShareCount,
        key_length: KeyLength,
        key_check: KeyCheck,
    ) -> Result<Self> {
        if *threshold > *share_count {
            bail!(
                "Threshold {} cannot exceed share count {}",
                *threshold,
                *share_count
            );
        }
        Ok(Self {
            threshold,
            share_count,
            key_length,
            key_check,
        })
    }

    /// Builds the configuration that goes with a freshly split `key`
    ///
    /// # Errors
    /// Returns an error if the key length or threshold/share count pair is invalid
    pub fn for_key(threshold: Threshold, share_count: ShareCount, key: &[u8]) -> Result<Self> {
        let length = u16::try_from(key.len()).context("Key is too long")?;
        Self::new(
            threshold,
            share_count,
            KeyLength::new(length)?,
            KeyCheck::compute(key),
        )
    }

    /// Parses a configuration from its JSON form
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or describes an invalid configuration
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid seal configuration")
    }

    /// Loads a configuration file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid configuration
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seal configuration {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("In {}", path.display()))
    }

    /// Serializes the configuration to pretty JSON
    ///
    /// # Errors
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize seal configuration")
    }

    #[must_use]
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    #[must_use]
    pub fn share_count(&self) -> ShareCount {
        self.share_count
    }

    #[must_use]
    pub fn key_length(&self) -> KeyLength {
        self.key_length
    }

    #[must_use]
    pub fn key_check(&self) -> &KeyCheck {
        &self.key_check
    }

    /// Returns true if `index` is one of the issued share indices
    #[must_use]
    pub fn issued(&self, index: ShareIndex) -> bool {
        self.share_count.contains(index)
    }
}

impl TryFrom<SealConfigFile> for SealConfig {
    type Error = anyhow::Error;

    fn try_from(file: SealConfigFile) -> Result<Self> {
        Self::new(
            Threshold::new(file.threshold)?,
            ShareCount::new(file.shares)?,
            KeyLength::new(file.key_length)?,
            file.key_check,
        )
    }
}

impl From<SealConfig> for SealConfigFile {
    fn from(config: SealConfig) -> Self {
        Self {
            shares: *config.share_count,
            threshold: *config.threshold,
            key_length: *config.key_length,
            key_check: config.key_check,
        }
    }
}
