use crate::{copy_into, DimSpec, InvariantError, OperationError, RVec, Shape, Tensor, TensorDType};

/// Constant-mode padding: a fresh canonical tensor filled with `value`,
/// with `src` written into the interior window. `padding` gives the
/// (low, high) element counts per axis.
pub fn pad<T: TensorDType>(
    src: &Tensor<T>,
    padding: &[(usize, usize)],
    value: T,
) -> Result<Tensor<T>, OperationError> {
    if padding.len() != src.rank() {
        return Err(InvariantError::RankMismatch {
            accepted: src.rank()..=src.rank(),
            actual: padding.len(),
        }
        .into());
    }

    let padded_shape: Shape = src
        .shape()
        .iter()
        .zip(padding.iter())
        .map(|(&dim, &(low, high))| low + dim + high)
        .collect();
    let out = Tensor::filled(padded_shape, value, src.options());

    let interior: RVec<DimSpec> = src
        .shape()
        .iter()
        .zip(padding.iter())
        .map(|(&dim, &(low, _))| DimSpec::interval(low, 1, low + dim))
        .collect();
    let window = out.slice(&interior)?;
    copy_into(&window, src)?;
    Ok(out)
}
