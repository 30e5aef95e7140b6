//! Master key and its verification tag
//!
//! The reconstructed master key only ever exists inside a [`MasterKey`], which
//! zeroizes its buffer on drop and never prints its contents. The [`KeyCheck`]
//! is computed once at split time and lets the unsealer tell a correct
//! reconstruction from garbage produced by wrong or forged shares.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Domain separation label for the key check digest
const KEY_CHECK_LABEL: &[u8] = b"unsealer/key-check/v1";

/// Size of the key check digest in bytes
pub const KEY_CHECK_LEN: usize = 32;

/// Reconstructed master key
///
/// Not `Clone`, not serializable; moved into the runtime that consumes it.
pub struct MasterKey(Zeroizing<Vec<u8>>);

impl MasterKey {
    pub(crate) fn new(bytes: Zeroizing<Vec<u8>>) -> Self {
        Self(bytes)
    }

    /// Raw key bytes, for the component that takes ownership of the key
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(<redacted>)")
    }
}

/// Verification tag for a master key
///
/// SHA-256 over a fixed label followed by the key bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeyCheck([u8; KEY_CHECK_LEN]);

impl KeyCheck {
    /// Computes the key check for `key`
    #[must_use]
    pub fn compute(key: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(KEY_CHECK_LABEL);
        hasher.update(key);
        Self(hasher.finalize().into())
    }

    /// Constant-time check that `key` matches this tag
    #[must_use]
    pub fn matches(&self, key: &[u8]) -> bool {
        let candidate = Self::compute(key);
        bool::from(self.0.ct_eq(&candidate.0))
    }

    /// Standard base64 form, as stored in the seal config file
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Parses the base64 form
    ///
    /// # Errors
    /// Returns an error if the input is not base64 or not 32 bytes long
    pub fn from_base64(encoded: &str) -> anyhow::Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| anyhow::anyhow!("Key check is not valid base64"))?;
        let digest: [u8; KEY_CHECK_LEN] = bytes.as_slice().try_into().map_err(|_| {
            anyhow::anyhow!(
                "Key check must be {KEY_CHECK_LEN} bytes, got {}",
                bytes.len()
            )
        })?;
        Ok(Self(digest))
    }
}

impl std::fmt::Debug for KeyCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyCheck({})", self.to_base64())
    }
}

impl Serialize for KeyCheck {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for KeyCheck {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::from_base64(&encoded).map_err(serde::de::Error::custom)
    }
}
