//! # Memory Utilities
//!
//! Allocation-free helpers used by structural operations on the store.

mod permute;

pub use permute::apply_permutation;
