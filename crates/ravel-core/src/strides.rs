use crate::{rvec, RVec, Shape};

/// Canonical storage convention for freshly allocated arrays.
///
/// Row-major ("C") packs the last axis contiguously, column-major ("F")
/// the first. The ordering also decides which axis strides must be
/// contiguous for a zero-copy reshape to succeed.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
)]
pub enum Ordering {
    #[default]
    #[strum(serialize = "C")]
    RowMajor,
    #[strum(serialize = "F")]
    ColumnMajor,
}

impl Ordering {
    pub fn is_column_major(&self) -> bool {
        matches!(self, Ordering::ColumnMajor)
    }
}

/// Buffer-element step per axis. May be negative in principle (reversed
/// axes); everything in this crate produces non-negative strides.
#[derive(Clone, PartialEq, Eq, Default, Hash)]
pub struct Strides(RVec<isize>);

impl Strides {
    pub fn new(strides: RVec<isize>) -> Self {
        Self(strides)
    }

    pub fn to_vec(&self) -> Vec<isize> {
        self.0.to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = &isize> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical strides for a fresh allocation of `shape` under `ordering`.
    pub fn contiguous(shape: &Shape, ordering: Ordering) -> Self {
        match ordering {
            Ordering::RowMajor => Self::from(shape),
            Ordering::ColumnMajor => {
                let mut strides = rvec![];
                let mut stride = 1;
                for size in shape.inner().iter() {
                    strides.push(stride);
                    stride *= *size as isize;
                }
                Self(strides)
            }
        }
    }
}

impl std::fmt::Debug for Strides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut strides = format!("[{}", self.0.first().unwrap_or(&0));
        for stride in self.0.iter().skip(1) {
            strides.push_str(&format!("x{}", stride));
        }
        write!(f, "{}]", strides)
    }
}

impl std::ops::Index<usize> for Strides {
    type Output = isize;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl From<&Shape> for Strides {
    fn from(shape: &Shape) -> Self {
        let mut strides = rvec![];
        let mut stride = 1;
        for size in shape.inner().iter().rev() {
            strides.push(stride);
            stride *= *size as isize;
        }
        strides.reverse();
        Self(strides)
    }
}

impl From<Vec<isize>> for Strides {
    fn from(strides: Vec<isize>) -> Self {
        Self(strides.into())
    }
}
