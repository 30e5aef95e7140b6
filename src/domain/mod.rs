//! Domain types for threshold unsealing
//!
//! This module contains validated newtypes and the immutable seal configuration:
//! - [`Threshold`] - Minimum shares required for reconstruction (1..=255)
//! - [`ShareIndex`] - Share x-coordinate (1..=255)
//! - [`ShareCount`] - Total number of shares issued at split time (1..=255)
//! - [`KeyLength`] - Master key length in bytes
//! - [`SealConfig`] - Validated threshold, share count, key length and key check

mod config;
mod key_length;
mod share_count;
mod share_index;
mod threshold;

pub use config::SealConfig;
pub use key_length::KeyLength;
pub use share_count::ShareCount;
pub use share_index::ShareIndex;
pub use threshold::Threshold;
