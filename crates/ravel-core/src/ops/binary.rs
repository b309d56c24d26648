use crate::{to_multi_index, InvariantError, OperationError, Tensor, TensorDType};

fn check_assignable<T: TensorDType>(
    dst: &Tensor<T>,
    src: &Tensor<T>,
) -> Result<(), InvariantError> {
    if !dst.shape().equivalent(src.shape()) {
        return Err(InvariantError::ShapeMismatch {
            a: dst.shape().clone(),
            b: src.shape().clone(),
        });
    }
    Ok(())
}

/// Writes every element of `src` into the corresponding position of
/// `dst`. Both operands are walked in the destination's ordering, each
/// unravelled through its own shape, so equivalent shapes of different
/// rank line up and operands of different orderings keep their logical
/// values instead of being transposed.
pub fn copy_into<T: TensorDType>(dst: &Tensor<T>, src: &Tensor<T>) -> Result<(), OperationError> {
    check_assignable(dst, src)?;
    let ordering = dst.ordering();
    for i in 0..src.numel() {
        let value = src.get(&to_multi_index(src.shape(), i, ordering)?)?;
        dst.put(&to_multi_index(dst.shape(), i, ordering)?, value)?;
    }
    Ok(())
}

/// Accumulates `src` into `dst` elementwise, under the same traversal
/// convention as [`copy_into`]. This is the in-place add primitive the
/// convolution adjoint relies on: overlapping windows must sum their
/// contributions, never overwrite them.
pub fn add_into<T: TensorDType>(dst: &Tensor<T>, src: &Tensor<T>) -> Result<(), OperationError> {
    check_assignable(dst, src)?;
    let ordering = dst.ordering();
    for i in 0..src.numel() {
        let dst_indices = to_multi_index(dst.shape(), i, ordering)?;
        let value = src.get(&to_multi_index(src.shape(), i, ordering)?)?;
        let sum = dst.get(&dst_indices)? + value;
        dst.put(&dst_indices, sum)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{shape, DimSpec, TensorOptions};

    #[test]
    fn copy_into_a_window() {
        let dst: Tensor<f32> = Tensor::zeros(shape![4], TensorOptions::row_major());
        let src = Tensor::from_vec(vec![1.0f32, 2.0], shape![2], TensorOptions::row_major()).unwrap();
        let window = dst.slice(&[DimSpec::interval(1, 1, 3)]).unwrap();
        copy_into(&window, &src).unwrap();
        assert_eq!(dst.to_vec(), vec![0.0, 1.0, 2.0, 0.0]);
    }

    #[test]
    fn add_into_accumulates() {
        let dst = Tensor::from_vec(vec![1.0f32, 1.0], shape![2], TensorOptions::row_major()).unwrap();
        let src = Tensor::from_vec(vec![2.0f32, 3.0], shape![2], TensorOptions::row_major()).unwrap();
        add_into(&dst, &src).unwrap();
        add_into(&dst, &src).unwrap();
        assert_eq!(dst.to_vec(), vec![5.0, 7.0]);
    }

    #[test]
    fn copy_preserves_logical_values_across_orderings() {
        // same logical matrix [[0, 1], [2, 3]], stored column-major
        let src = Tensor::from_vec(
            vec![0.0f32, 2.0, 1.0, 3.0],
            shape![2, 2],
            TensorOptions::column_major(),
        )
        .unwrap();
        let dst: Tensor<f32> = Tensor::zeros(shape![2, 2], TensorOptions::row_major());
        copy_into(&dst, &src).unwrap();
        assert_eq!(dst.to_vec(), vec![0.0, 1.0, 2.0, 3.0]);
        for i in 0..2 {
            for j in 0..2 {
                assert_eq!(dst.get(&[i, j]), src.get(&[i, j]));
            }
        }
    }

    #[test]
    fn add_preserves_logical_values_across_orderings() {
        let src = Tensor::from_vec(
            vec![0.0f32, 2.0, 1.0, 3.0],
            shape![2, 2],
            TensorOptions::column_major(),
        )
        .unwrap();
        let dst = Tensor::filled(shape![2, 2], 10.0f32, TensorOptions::row_major());
        add_into(&dst, &src).unwrap();
        assert_eq!(dst.to_vec(), vec![10.0, 11.0, 12.0, 13.0]);
    }

    #[test]
    fn shape_rules_gate_assignment() {
        let dst: Tensor<f32> = Tensor::zeros(shape![1, 3], TensorOptions::row_major());
        let src: Tensor<f32> = Tensor::zeros(shape![3], TensorOptions::row_major());
        // row vector encodings are equivalent
        assert!(copy_into(&dst, &src).is_ok());

        let col: Tensor<f32> = Tensor::zeros(shape![3, 1], TensorOptions::row_major());
        assert!(matches!(
            copy_into(&col, &src),
            Err(OperationError::InvariantError(
                InvariantError::ShapeMismatch { .. }
            ))
        ));
    }
}
