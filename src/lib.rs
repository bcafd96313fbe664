//! Immutable permutations of finite sets.
//!
//! This crate provides a permutation type for the sets {1, ..., n} together with composition,
//! exponentiation and cycle decomposition, plus a randomized self-test that checks the group laws.
//!
pub mod action;
pub mod error;
pub mod perm;
pub mod selftest;

pub use error::{InvalidPermutation, PermError};
pub use perm::Perm;

/// Set element.
///
/// Points of a permutation's domain are represented by positive integers (`u32`), starting at 1.
pub type El = u32;
