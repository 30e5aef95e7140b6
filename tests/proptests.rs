//! Property-based tests for unsealer
//!
//! This test suite uses quickcheck to verify correctness across random inputs,
//! including random keys, seal configurations, and share submission orders.
//!
//! Run with: cargo test --test proptests

mod common;

#[path = "proptests/codec.rs"]
mod codec;

#[path = "proptests/unseal.rs"]
mod unseal;
