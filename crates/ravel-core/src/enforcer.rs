use std::ops::RangeInclusive;

use crate::Shape;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantError {
    #[error("Shape mismatch: {a:?} is not compatible with {b:?}.")]
    ShapeMismatch { a: Shape, b: Shape },
    #[error("Element count mismatch: expected {expected}, got {actual}.")]
    NumelMismatch { expected: usize, actual: usize },
    #[error("Rank mismatch. {accepted:?} != {actual}.")]
    RankMismatch {
        accepted: RangeInclusive<usize>,
        actual: usize,
    },
    #[error("Index {index} out of bounds for axis {axis} of size {size}.")]
    IndexOutOfBounds {
        axis: usize,
        index: usize,
        size: usize,
    },
    #[error("Invalid argument: {0}.")]
    InvalidArgument(String),
    #[error("Duplicate dims in permutation.")]
    DuplicateDims,
}

/// # Enforcer
///
/// Enforcer enforces common invariants on shapes and indices.
/// Every failure here is deterministic and input-driven; nothing is retried.
pub struct Enforcer;

impl Enforcer {
    pub fn assert_rank(shape: &Shape, rank: usize) -> Result<(), InvariantError> {
        if shape.rank() != rank {
            return Err(InvariantError::RankMismatch {
                accepted: rank..=rank,
                actual: shape.rank(),
            });
        }
        Ok(())
    }

    pub fn assert_equal_ranks(shapes: &[&Shape]) -> Result<usize, InvariantError> {
        let rank = shapes[0].rank();
        for shape in shapes.iter().skip(1) {
            if shape.rank() != rank {
                return Err(InvariantError::RankMismatch {
                    accepted: rank..=rank,
                    actual: shape.rank(),
                });
            }
        }
        Ok(rank)
    }

    pub fn check_index_arity(shape: &Shape, indices: &[usize]) -> Result<(), InvariantError> {
        if indices.len() != shape.rank() {
            return Err(InvariantError::RankMismatch {
                accepted: shape.rank()..=shape.rank(),
                actual: indices.len(),
            });
        }
        Ok(())
    }

    pub fn check_bounds(shape: &Shape, axis: usize, index: usize) -> Result<(), InvariantError> {
        if index >= shape[axis] {
            return Err(InvariantError::IndexOutOfBounds {
                axis,
                index,
                size: shape[axis],
            });
        }
        Ok(())
    }

    pub fn check_numel_match(a: &Shape, b: &Shape) -> Result<(), InvariantError> {
        if a.numel() != b.numel() {
            return Err(InvariantError::NumelMismatch {
                expected: a.numel(),
                actual: b.numel(),
            });
        }
        Ok(())
    }

    pub fn check_positive(name: &'static str, value: usize) -> Result<(), InvariantError> {
        if value == 0 {
            return Err(InvariantError::InvalidArgument(format!(
                "{name} must be positive"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;

    #[test]
    fn rank_checks() {
        assert!(Enforcer::assert_rank(&shape![2, 2], 2).is_ok());
        assert!(matches!(
            Enforcer::assert_rank(&shape![2, 2], 4),
            Err(InvariantError::RankMismatch { .. })
        ));
        let (a, b, c) = (shape![2, 3], shape![4, 5], shape![1]);
        assert_eq!(Enforcer::assert_equal_ranks(&[&a, &b]), Ok(2));
        assert!(Enforcer::assert_equal_ranks(&[&a, &c]).is_err());
    }

    #[test]
    fn bounds_checks() {
        let s = shape![2, 3];
        assert!(Enforcer::check_bounds(&s, 1, 2).is_ok());
        assert_eq!(
            Enforcer::check_bounds(&s, 1, 3),
            Err(InvariantError::IndexOutOfBounds {
                axis: 1,
                index: 3,
                size: 3
            })
        );
    }
}
