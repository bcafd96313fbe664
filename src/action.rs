//! Group actions.
//!
//! Permutations never change in place, so an action consumes or borrows its argument and returns
//! the result. The output type lets fallible actions, e.g. those requiring matching degrees,
//! report errors.

/// Left action on `T`.
///
/// Elements of implementing types act on `T` values on the left.
pub trait LeftAction<T> {
    /// Result of acting on a value.
    type Output;

    /// Act on a value on the left.
    fn left_apply(&self, value: T) -> Self::Output;
}

/// Right action on `T`.
///
/// Elements of implementing types act on `T` values on the right.
pub trait RightAction<T> {
    /// Result of acting on a value.
    type Output;

    /// Act on a value on the right.
    fn right_apply(&self, value: T) -> Self::Output;
}
