//! Stride planning: zero-copy reshape and concatenation axis ordering.
//!
//! Both algorithms are ports of numpy's shape machinery. `plan_reshape`
//! answers "can this buffer be reinterpreted under the new shape without
//! moving data" and returns the strides to do it, or `None` when the
//! caller must fall back to a copy. `None` is a normal negative result,
//! not an error.

use crate::{rvec, Enforcer, InvariantError, Ordering, RVec, Shape, Strides};

/// Computes strides for viewing `shape`/`strides` as `new_shape` without
/// copying, or `None` when the layout is not representable.
///
/// Unit-length axes carry no layout information and are dropped before
/// matching. Source and destination axes are then walked in lock-step,
/// growing a super-axis window on each side until the cumulative products
/// agree; the source axes inside a window must be mutually contiguous
/// under `ordering`. Trailing unit axes of the new shape get broadcast-safe
/// filler strides.
pub fn plan_reshape(
    shape: &Shape,
    strides: &Strides,
    ordering: Ordering,
    new_shape: &Shape,
) -> Option<Strides> {
    let mut old_dims: RVec<usize> = rvec![];
    let mut old_strides: RVec<isize> = rvec![];
    for axis in 0..shape.rank() {
        if shape[axis] != 1 {
            old_dims.push(shape[axis]);
            old_strides.push(strides[axis]);
        }
    }

    let new_numel = new_shape.numel();
    let old_numel: usize = old_dims.iter().product();
    if new_numel != old_numel {
        return None;
    }
    if new_numel == 0 {
        // zero-sized arrays are never reinterpreted in place
        return None;
    }

    let old_rank = old_dims.len();
    let new_rank = new_shape.rank();
    let f_order = ordering.is_column_major();
    let mut new_strides: RVec<isize> = rvec![0isize; new_rank];

    // oi..oj and ni..nj delimit the axis windows currently being matched
    let (mut oi, mut oj, mut ni, mut nj) = (0usize, 1usize, 0usize, 1usize);
    while ni < new_rank && oi < old_rank {
        let mut np = new_shape[ni];
        let mut op = old_dims[oi];

        while np != op {
            if np < op {
                np *= new_shape[nj];
                nj += 1;
            } else {
                op *= old_dims[oj];
                oj += 1;
            }
        }

        // the source axes of this window must be combinable
        for ok in oi..oj - 1 {
            if f_order {
                if old_strides[ok + 1] != old_dims[ok] as isize * old_strides[ok] {
                    return None;
                }
            } else if old_strides[ok] != old_dims[ok + 1] as isize * old_strides[ok + 1] {
                return None;
            }
        }

        if f_order {
            new_strides[ni] = old_strides[oi];
            for nk in ni + 1..nj {
                new_strides[nk] = new_strides[nk - 1] * new_shape[nk - 1] as isize;
            }
        } else {
            new_strides[nj - 1] = old_strides[oj - 1];
            for nk in (ni + 1..nj).rev() {
                new_strides[nk - 1] = new_strides[nk] * new_shape[nk] as isize;
            }
        }

        ni = nj;
        nj += 1;
        oi = oj;
        oj += 1;
    }

    // trailing unit axes of the new shape
    let mut last_stride = if ni >= 1 { new_strides[ni - 1] } else { 1 };
    if f_order && ni >= 1 {
        last_stride *= new_shape[ni - 1] as isize;
    }
    for nk in ni..new_rank {
        new_strides[nk] = last_stride;
    }

    Some(Strides::new(new_strides))
}

/// Axis visiting order for concatenating same-rank operands: biggest
/// stride first, i.e. canonical storage order.
///
/// numpy's ambiguity-resolving stable insertion sort: an operand only
/// contributes a comparison between two axes when neither is a singleton
/// for it, and conflicting orderings between operands resolve in favour
/// of row-major order.
pub fn concat_stride_permutation(
    views: &[(&Shape, &Strides)],
) -> Result<RVec<usize>, InvariantError> {
    if views.is_empty() {
        return Err(InvariantError::InvalidArgument(
            "concat requires at least one operand".to_string(),
        ));
    }
    let shapes: Vec<&Shape> = views.iter().map(|(s, _)| *s).collect();
    let rank = Enforcer::assert_equal_ranks(&shapes)?;

    let mut perm: RVec<usize> = (0..rank).collect();
    for i0 in 1..rank {
        let mut ipos = i0;
        let ax_j0 = perm[i0];

        for i1 in (0..i0).rev() {
            let mut ambig = true;
            let mut should_swap = false;
            let ax_j1 = perm[i1];

            for (shape, strides) in views {
                if shape[ax_j0] != 1 && shape[ax_j1] != 1 {
                    if strides[ax_j0].abs() <= strides[ax_j1].abs() {
                        // even if decided already: on conflict, C order wins
                        should_swap = false;
                    } else if ambig {
                        should_swap = true;
                    }
                    ambig = false;
                }
            }

            if !ambig {
                if should_swap {
                    ipos = i1;
                } else {
                    break;
                }
            }
        }

        if ipos != i0 {
            for i1 in (ipos + 1..=i0).rev() {
                perm[i1] = perm[i1 - 1];
            }
            perm[ipos] = ax_j0;
        }
    }

    Ok(perm)
}
