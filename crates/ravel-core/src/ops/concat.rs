use crate::{
    concat_stride_permutation, copy_into, DimSpec, Enforcer, InvariantError, OperationError,
    Ordering, RVec, Shape, Tensor, TensorDType, TensorOptions,
};

/// Concatenates same-rank operands along `axis` into a freshly allocated
/// canonical tensor.
///
/// The stride-resolution permutation decides the output's storage order:
/// when the operands' biggest-stride-first ordering is exactly reversed
/// (all-Fortran inputs) the output is column-major, otherwise row-major
/// wins, matching how numpy resolves ambiguous operand layouts.
pub fn concat<T: TensorDType>(
    srcs: &[&Tensor<T>],
    axis: usize,
) -> Result<Tensor<T>, OperationError> {
    let shapes: Vec<&Shape> = srcs.iter().map(|t| t.shape()).collect();
    let views: Vec<_> = srcs.iter().map(|t| (t.shape(), t.strides())).collect();
    let perm = concat_stride_permutation(&views)?;
    let rank = Enforcer::assert_equal_ranks(&shapes)?;

    if axis >= rank {
        return Err(InvariantError::IndexOutOfBounds {
            axis,
            index: axis,
            size: rank,
        }
        .into());
    }
    for shape in shapes.iter().skip(1) {
        for d in 0..rank {
            if d != axis && shape[d] != shapes[0][d] {
                return Err(InvariantError::ShapeMismatch {
                    a: shapes[0].clone(),
                    b: (*shape).clone(),
                }
                .into());
            }
        }
    }

    let mut out_shape = shapes[0].clone();
    out_shape[axis] = shapes.iter().map(|s| s[axis]).sum();

    let f_reversed = perm.iter().rev().copied().eq(0..rank);
    let ordering = if f_reversed && rank > 1 {
        Ordering::ColumnMajor
    } else {
        Ordering::RowMajor
    };
    let out = Tensor::zeros(out_shape, TensorOptions::with_ordering(ordering));

    let mut cursor = 0;
    for src in srcs {
        let dim = src.shape()[axis];
        let specs: RVec<DimSpec> = (0..rank)
            .map(|d| {
                if d == axis {
                    DimSpec::interval(cursor, 1, cursor + dim)
                } else {
                    DimSpec::Full
                }
            })
            .collect();
        let window = out.slice(&specs)?;
        copy_into(&window, src)?;
        cursor += dim;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;

    fn rm(data: Vec<f32>, shape: Shape) -> Tensor<f32> {
        Tensor::from_vec(data, shape, TensorOptions::row_major()).unwrap()
    }

    #[test]
    fn concat_rows() {
        let a = rm(vec![1., 2., 3., 4.], shape![2, 2]);
        let b = rm(vec![5., 6.], shape![1, 2]);
        let c = concat(&[&a, &b], 0).unwrap();
        assert_eq!(c.shape(), &shape![3, 2]);
        assert_eq!(c.to_vec(), vec![1., 2., 3., 4., 5., 6.]);
    }

    #[test]
    fn concat_columns() {
        let a = rm(vec![1., 2., 3., 4.], shape![2, 2]);
        let b = rm(vec![5., 6.], shape![2, 1]);
        let c = concat(&[&a, &b], 1).unwrap();
        assert_eq!(c.shape(), &shape![2, 3]);
        assert_eq!(c.to_vec(), vec![1., 2., 5., 3., 4., 6.]);
    }

    #[test]
    fn all_fortran_inputs_produce_a_fortran_output() {
        let a: Tensor<f32> = Tensor::arange_like(shape![2, 2], TensorOptions::column_major());
        let b: Tensor<f32> = Tensor::arange_like(shape![2, 2], TensorOptions::column_major());
        let c = concat(&[&a, &b], 0).unwrap();
        assert_eq!(c.ordering(), Ordering::ColumnMajor);
        assert_eq!(c.shape(), &shape![4, 2]);
        // logical values are layout independent
        assert_eq!(c.get(&[2, 1]), Ok(b.get(&[0, 1]).unwrap()));
    }

    #[test]
    fn mixed_ordering_concat_preserves_logical_values() {
        let a = rm(vec![0., 1., 2., 3.], shape![2, 2]);
        // same logical matrix [[0, 1], [2, 3]], stored column-major
        let b = Tensor::from_vec(
            vec![0.0f32, 2.0, 1.0, 3.0],
            shape![2, 2],
            TensorOptions::column_major(),
        )
        .unwrap();
        let out = concat(&[&a, &b], 0).unwrap();
        assert_eq!(out.ordering(), Ordering::RowMajor);
        assert_eq!(out.get(&[2, 1]), Ok(1.0));
        assert_eq!(out.to_vec(), vec![0., 1., 2., 3., 0., 1., 2., 3.]);
    }

    #[test]
    fn dimension_disagreement_fails() {
        let a = rm(vec![1., 2., 3., 4.], shape![2, 2]);
        let b = rm(vec![5., 6., 7., 8., 9., 10.], shape![2, 3]);
        assert!(concat(&[&a, &b], 0).is_err());
        assert!(concat(&[&a, &b], 2).is_err());
    }
}
