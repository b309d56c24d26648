//! Linear-index ↔ multi-index conversion and flat-offset computation.
//!
//! The original numerics library always weighted axis 0 as fastest-varying
//! here, whatever the array's declared ordering. We take `Ordering`
//! explicitly instead: column-major weights axis 0 fastest, row-major the
//! last axis, and `to_linear_index`/`to_multi_index` are mutual inverses
//! for either choice.

use crate::{rvec, Enforcer, InvariantError, Ordering, RVec, Shape, Strides};

/// Weighted sum of `indices` with a running multiplier growing through the
/// shape in the direction `ordering` dictates.
pub fn to_linear_index(
    shape: &Shape,
    indices: &[usize],
    ordering: Ordering,
) -> Result<usize, InvariantError> {
    Enforcer::check_index_arity(shape, indices)?;
    for (axis, &index) in indices.iter().enumerate() {
        Enforcer::check_bounds(shape, axis, index)?;
    }

    let mut linear = 0;
    let mut shift = 1;
    match ordering {
        Ordering::ColumnMajor => {
            for (axis, &index) in indices.iter().enumerate() {
                linear += shift * index;
                shift *= shape[axis];
            }
        }
        Ordering::RowMajor => {
            for (axis, &index) in indices.iter().enumerate().rev() {
                linear += shift * index;
                shift *= shape[axis];
            }
        }
    }
    Ok(linear)
}

/// Inverse of [`to_linear_index`], with `total` defaulting to the shape's
/// element count.
pub fn to_multi_index(
    shape: &Shape,
    linear: usize,
    ordering: Ordering,
) -> Result<RVec<usize>, InvariantError> {
    to_multi_index_with(shape, linear, shape.numel(), ordering)
}

pub fn to_multi_index_with(
    shape: &Shape,
    linear: usize,
    total: usize,
    ordering: Ordering,
) -> Result<RVec<usize>, InvariantError> {
    if linear >= total {
        return Err(InvariantError::IndexOutOfBounds {
            axis: 0,
            index: linear,
            size: total,
        });
    }

    let mut remainder = linear;
    let mut denom = total;
    let mut indices = rvec![0usize; shape.rank()];
    match ordering {
        Ordering::ColumnMajor => {
            for axis in (0..shape.rank()).rev() {
                denom /= shape[axis];
                indices[axis] = remainder / denom;
                remainder %= denom;
            }
        }
        Ordering::RowMajor => {
            for axis in 0..shape.rank() {
                denom /= shape[axis];
                indices[axis] = remainder / denom;
                remainder %= denom;
            }
        }
    }
    Ok(indices)
}

/// Flat buffer offset of a multi-index under `strides`, relative to `offset`.
pub fn linear_offset(offset: usize, strides: &Strides, indices: &[usize]) -> usize {
    let acc: isize = indices
        .iter()
        .enumerate()
        .map(|(axis, &index)| strides[axis] * index as isize)
        .sum();
    (offset as isize + acc) as usize
}
