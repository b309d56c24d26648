use derive_new::new;

use crate::{
    linear_offset, plan_reshape, to_linear_index, to_multi_index, Device, Enforcer,
    InvariantError, Ordering, Shape, Storage, Strides, TensorDType, TensorOptions,
};

#[cfg(feature = "rand")]
use {rand::prelude::*, rand_distr::StandardNormal};

/// Layout metadata of a tensor: where its elements live relative to the
/// backing buffer. Never mutated in place: every derivation (slice,
/// reshape, collapse) builds a fresh one.
#[derive(new, Debug, Clone, PartialEq)]
pub struct StorageView {
    pub(crate) shape: Shape,
    pub(crate) strides: Strides,
    pub(crate) offset: usize,
    pub(crate) ordering: Ordering,
}

impl StorageView {
    pub fn is_contiguous(&self) -> bool {
        self.offset == 0 && self.strides == Strides::contiguous(&self.shape, self.ordering)
    }
}

/// A dense multi-dimensional array: a [`StorageView`] over a shared buffer.
///
/// `Clone` is shallow: clones and slices alias the same buffer, and
/// writing through any of them is visible to all. The buffer lives as
/// long as its longest-lived view. Overlapping mutation from multiple
/// threads is a data race the caller must exclude; this core provides
/// no locking beyond per-element access.
#[derive(Debug, Clone)]
pub struct Tensor<T: TensorDType> {
    view: StorageView,
    storage: Storage<T>,
}

impl<T: TensorDType> Tensor<T> {
    pub(crate) fn from_parts(view: StorageView, storage: Storage<T>) -> Self {
        Self { view, storage }
    }

    pub fn from_vec(
        data: Vec<T>,
        shape: Shape,
        options: TensorOptions,
    ) -> Result<Self, InvariantError> {
        if data.len() != shape.numel() {
            return Err(InvariantError::NumelMismatch {
                expected: shape.numel(),
                actual: data.len(),
            });
        }
        let storage = Storage::from_vec(data, &options.device);
        let strides = Strides::contiguous(&shape, options.ordering);
        let view = StorageView::new(shape, strides, 0, options.ordering);
        Ok(Self::from_parts(view, storage))
    }

    pub fn filled(shape: Shape, value: T, options: TensorOptions) -> Self {
        let storage = Storage::filled(shape.numel(), value, &options.device);
        let strides = Strides::contiguous(&shape, options.ordering);
        let view = StorageView::new(shape, strides, 0, options.ordering);
        Self::from_parts(view, storage)
    }

    pub fn zeros(shape: Shape, options: TensorOptions) -> Self {
        Self::filled(shape, T::zero(), options)
    }

    #[cfg(feature = "rand")]
    pub fn randn(shape: Shape, options: TensorOptions) -> Self
    where
        T: num_traits::Float,
    {
        let mut rng = rand::thread_rng();
        let data = (0..shape.numel())
            .map(|_| {
                let sample: f32 = StandardNormal.sample(&mut rng);
                T::from(sample).expect("failed to convert sample")
            })
            .collect::<Vec<_>>();
        Self::from_vec(data, shape, options).expect("element count matches by construction")
    }

    pub fn view(&self) -> &StorageView {
        &self.view
    }

    pub fn shape(&self) -> &Shape {
        &self.view.shape
    }

    pub fn strides(&self) -> &Strides {
        &self.view.strides
    }

    pub fn offset(&self) -> usize {
        self.view.offset
    }

    pub fn ordering(&self) -> Ordering {
        self.view.ordering
    }

    pub fn rank(&self) -> usize {
        self.view.shape.rank()
    }

    pub fn numel(&self) -> usize {
        self.view.shape.numel()
    }

    pub fn device(&self) -> Device {
        self.storage.device()
    }

    pub fn options(&self) -> TensorOptions {
        TensorOptions {
            ordering: self.ordering(),
            device: self.device(),
        }
    }

    pub(crate) fn storage(&self) -> &Storage<T> {
        &self.storage
    }

    pub fn is_contiguous(&self) -> bool {
        self.view.is_contiguous()
    }

    /// True when `other` aliases the same buffer.
    pub fn shares_storage(&self, other: &Self) -> bool {
        self.storage.ptr_eq(&other.storage)
    }

    fn buffer_offset(&self, indices: &[usize]) -> Result<usize, InvariantError> {
        Enforcer::check_index_arity(self.shape(), indices)?;
        for (axis, &index) in indices.iter().enumerate() {
            Enforcer::check_bounds(self.shape(), axis, index)?;
        }
        Ok(linear_offset(self.offset(), self.strides(), indices))
    }

    pub fn get(&self, indices: &[usize]) -> Result<T, InvariantError> {
        let offset = self.buffer_offset(indices)?;
        Ok(self.storage.read(offset))
    }

    /// Writes through the view into the shared buffer.
    pub fn put(&self, indices: &[usize], value: T) -> Result<(), InvariantError> {
        let offset = self.buffer_offset(indices)?;
        self.storage.write(offset, value);
        Ok(())
    }

    /// Element at logical linear position `linear`, traversed in this
    /// tensor's own ordering.
    pub fn get_linear(&self, linear: usize) -> Result<T, InvariantError> {
        let indices = to_multi_index(self.shape(), linear, self.ordering())?;
        self.get(&indices)
    }

    pub fn put_linear(&self, linear: usize, value: T) -> Result<(), InvariantError> {
        let indices = to_multi_index(self.shape(), linear, self.ordering())?;
        self.put(&indices, value)
    }

    /// Linear position of a multi-index under this tensor's ordering.
    pub fn ravel_index(&self, indices: &[usize]) -> Result<usize, InvariantError> {
        to_linear_index(self.shape(), indices, self.ordering())
    }

    /// Elements in logical order (this tensor's ordering), gathered
    /// through the view.
    pub fn to_vec(&self) -> Vec<T> {
        (0..self.numel())
            .map(|i| self.get_linear(i).expect("in-bounds by construction"))
            .collect()
    }

    /// Copies into a freshly allocated, exclusively owned buffer with the
    /// same layout metadata.
    pub fn deep_clone(&self) -> Self {
        Self::from_parts(self.view.clone(), self.storage.deep_clone())
    }

    /// Materializes a normalized copy: offset 0, canonical strides for
    /// this tensor's ordering, exclusively owned buffer.
    pub fn to_offset_zero_copy(&self) -> Self {
        let out = Self::zeros(self.shape().clone(), self.options());
        for i in 0..self.numel() {
            let value = self.get_linear(i).expect("in-bounds by construction");
            out.put_linear(i, value).expect("in-bounds by construction");
        }
        out
    }

    /// Reshapes to `new_shape`, preserving total element count.
    ///
    /// Returns a zero-copy view whenever the planner can express the new
    /// shape over the existing buffer; otherwise falls back to a
    /// normalized copy with canonical strides. Either way the result is
    /// value-identical in logical order.
    pub fn reshape(&self, new_shape: Shape) -> Result<Self, InvariantError> {
        Enforcer::check_numel_match(self.shape(), &new_shape)?;

        if let Some(strides) = plan_reshape(self.shape(), self.strides(), self.ordering(), &new_shape)
        {
            let view = StorageView::new(new_shape, strides, self.offset(), self.ordering());
            return Ok(Self::from_parts(view, self.storage.clone()));
        }

        log::debug!(
            "reshape {:?} -> {:?} not representable as a view, copying",
            self.shape(),
            new_shape
        );
        let base = self.to_offset_zero_copy();
        let strides = Strides::contiguous(&new_shape, self.ordering());
        let view = StorageView::new(new_shape, strides, 0, self.ordering());
        Ok(Self::from_parts(view, base.storage.clone()))
    }
}

impl<T: TensorDType + num_traits::Float> Tensor<T> {
    /// Elementwise closeness at every logical position. Both tensors are
    /// visited through the same multi-index, so operands of different
    /// orderings compare by logical value, not buffer position.
    pub fn all_close(&self, other: &Self, atol: f64, rtol: f64) -> anyhow::Result<()> {
        if self.shape() != other.shape() {
            anyhow::bail!("Shape mismatch {:?} != {:?}", self.shape(), other.shape())
        }
        for i in 0..self.numel() {
            let indices = to_multi_index(self.shape(), i, self.ordering())?;
            let a = self.get(&indices)?.to_f64().unwrap_or(f64::NAN);
            let b = other.get(&indices)?.to_f64().unwrap_or(f64::NAN);
            let abs_diff = (a - b).abs();
            let close = (a.is_nan() && b.is_nan()) || abs_diff <= atol + rtol * b.abs();
            if !close {
                anyhow::bail!("{} != {} at {:?} (|Δ|={})", a, b, indices, abs_diff);
            }
        }
        Ok(())
    }
}

/// Conversion helpers for the common case of building small fixtures.
impl<T: TensorDType> Tensor<T> {
    pub fn arange_like(shape: Shape, options: TensorOptions) -> Self
    where
        T: num_traits::NumCast,
    {
        let data = (0..shape.numel())
            .map(|i| T::from(i).expect("element count fits the dtype"))
            .collect::<Vec<_>>();
        Self::from_vec(data, shape, options).expect("element count matches by construction")
    }
}
