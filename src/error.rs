//! Errors reported by permutation constructors and operations.
use thiserror::Error;

use crate::El;

/// Reason a mapping failed to describe a bijection on {1, ..., n}.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidPermutation {
    /// A point (a key, or an entry of a cycle) lies outside 1..=n.
    #[error("point {point} is outside 1..={degree}")]
    PointOutOfRange { point: El, degree: usize },
    /// An image lies outside 1..=n.
    #[error("point {point} maps to {image}, outside 1..={degree}")]
    ImageOutOfRange { point: El, image: El, degree: usize },
    /// A point appears more than once as a key or within a cycle.
    #[error("point {0} is given more than once")]
    DuplicatePoint(El),
    /// Two points map to the same image.
    #[error("image {0} is hit more than once")]
    DuplicateImage(El),
}

/// Errors of the permutation API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermError {
    /// A constructor was given something other than a bijection on {1, ..., n}.
    #[error("invalid permutation: {0}")]
    InvalidPermutation(#[from] InvalidPermutation),
    /// Operands act on domains of different size.
    #[error("domain mismatch: degree {left} vs degree {right}")]
    DomainMismatch { left: usize, right: usize },
    /// An attempt to overwrite an image of an existing permutation.
    #[error("permutations are immutable, cannot reassign the image of {point}")]
    ImmutabilityViolation { point: El },
    /// A lookup of a point the permutation is not defined on.
    #[error("point {point} is outside the domain 1..={degree}")]
    PointOutOfDomain { point: El, degree: usize },
}
