use bytemuck::NoUninit;
use half::{bf16, f16};
use num_traits::{Num, NumCast};

/// Element types a [`crate::Tensor`] may hold.
///
/// `Num` supplies `zero`/`one` and arithmetic, `NumCast` the lossy
/// conversions the test helpers need, `NoUninit` the raw-byte entry points.
pub trait TensorDType:
    Copy
    + PartialEq
    + std::fmt::Debug
    + std::fmt::Display
    + Num
    + NumCast
    + NoUninit
    + Send
    + Sync
    + 'static
{
}

macro_rules! impl_tensor_dtype {
    ($($t:ty),*) => {
        $(impl TensorDType for $t {})*
    };
}

impl_tensor_dtype!(f32, f64, f16, bf16, i32, u32);
