//! Threshold unsealing of a master key
//!
//! A master key is split into N shares of which any T reconstruct it. The
//! [`coordinator::Coordinator`] accepts shares one at a time, from any number
//! of operators and in any order, and unseals once T distinct shares verify.

pub mod adapter;
pub mod codec;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod field;
pub mod interpolate;
pub mod key;
pub mod progress;
pub mod session;
pub mod validator;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod commands;
#[cfg(feature = "cli")]
pub mod prompt;

pub use coordinator::{Barrier, Coordinator, Disposition, KeySlot, SealState, SealStatus, Submission};
pub use domain::SealConfig;
pub use error::UnsealError;
