use crate::{
    rvec, Enforcer, InvariantError, RVec, Shape, StorageView, Strides, Tensor, TensorDType,
};

/// Per-axis slicing specification.
///
/// `Interval` is a half-open `[start, end)` window visited with the given
/// step; `Index` selects a single position and collapses the axis out of
/// the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimSpec {
    Full,
    Index(usize),
    Interval {
        start: usize,
        step: usize,
        end: usize,
    },
}

impl DimSpec {
    pub fn interval(start: usize, step: usize, end: usize) -> Self {
        DimSpec::Interval { start, step, end }
    }
}

impl<T: TensorDType> Tensor<T> {
    /// Derives a sub-array view: new shape/strides/offset over the same
    /// buffer, no data copied. Writing through the result mutates the
    /// source's buffer.
    pub fn slice(&self, specs: &[DimSpec]) -> Result<Tensor<T>, InvariantError> {
        if specs.len() != self.rank() {
            return Err(InvariantError::RankMismatch {
                accepted: self.rank()..=self.rank(),
                actual: specs.len(),
            });
        }

        let mut shape: RVec<usize> = rvec![];
        let mut strides: RVec<isize> = rvec![];
        let mut offset = self.offset() as isize;

        for (axis, spec) in specs.iter().enumerate() {
            let dim = self.shape()[axis];
            let stride = self.strides()[axis];
            match *spec {
                DimSpec::Full => {
                    shape.push(dim);
                    strides.push(stride);
                }
                DimSpec::Index(index) => {
                    Enforcer::check_bounds(self.shape(), axis, index)?;
                    offset += index as isize * stride;
                }
                DimSpec::Interval { start, step, end } => {
                    Enforcer::check_positive("interval step", step)?;
                    if start >= end || end > dim {
                        return Err(InvariantError::InvalidArgument(format!(
                            "interval [{start}, {end}) with step {step} is invalid for axis {axis} of size {dim}"
                        )));
                    }
                    offset += start as isize * stride;
                    shape.push((end - start + step - 1) / step);
                    strides.push(stride * step as isize);
                }
            }
        }

        let view = StorageView::new(
            Shape::new(shape),
            Strides::new(strides),
            offset as usize,
            self.ordering(),
        );
        Ok(Tensor::from_parts(view, self.storage().clone()))
    }
}
