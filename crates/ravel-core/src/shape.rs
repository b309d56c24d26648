use crate::RVec;

/// Ordered axis lengths of a dense array. Rank 0 denotes a scalar.
///
/// Carries the vector/matrix classification rules the rest of the crate
/// relies on: rank-1 vectors and rank-2 row/column vectors are different
/// memory encodings of the same logical object, and every shape comparison
/// must agree on how they relate.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape(RVec<usize>);

impl Shape {
    pub fn new(shape: RVec<usize>) -> Self {
        Self(shape)
    }

    pub fn inner(&self) -> &RVec<usize> {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&usize> {
        self.0.get(index)
    }

    pub fn numel(&self) -> usize {
        self.0.iter().product()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.0.to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = &usize> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rank(&self) -> usize {
        self.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.rank() == 0
    }

    /// Rank 1 or 2 with a single axis carrying every element.
    pub fn is_vector(&self) -> bool {
        match self.rank() {
            1 => true,
            2 => {
                let numel = self.numel();
                self.0[0] == numel || self.0[1] == numel
            }
            _ => false,
        }
    }

    pub fn is_matrix(&self) -> bool {
        self.rank() == 2 && !self.is_vector()
    }

    pub fn is_row_vector(&self) -> bool {
        self.rank() == 1 || (self.rank() == 2 && self.0[0] == 1)
    }

    pub fn is_column_vector(&self) -> bool {
        self.rank() == 2 && self.0[1] == 1
    }

    /// Drops all singleton axes. Column vectors are returned unchanged,
    /// preserving their 2-D "column" encoding.
    pub fn squeeze(&self) -> Shape {
        if self.is_column_vector() {
            return self.clone();
        }
        Shape(self.0.iter().copied().filter(|&d| d != 1).collect())
    }

    /// True iff one side is rank 0 and the other is `[1]`; both denote a scalar.
    pub fn scalar_equals(&self, other: &Shape) -> bool {
        match (self.rank(), other.rank()) {
            (0, 1) => other.0[0] == 1,
            (1, 0) => self.0[0] == 1,
            _ => false,
        }
    }

    /// Shape equivalence under vector/scalar rules.
    ///
    /// Column vectors compare by exact equality, row vectors after mutual
    /// squeeze, everything else after mutual squeeze accepting scalar
    /// equivalence. `[3, 1]` and `[1, 3]` are never equivalent even though
    /// they are squeeze-equal.
    pub fn equivalent(&self, other: &Shape) -> bool {
        if self.is_column_vector() && other.is_column_vector() {
            return self == other;
        }
        if self.is_row_vector() && other.is_row_vector() {
            return self.squeeze() == other.squeeze();
        }
        let (a, b) = (self.squeeze(), other.squeeze());
        a.scalar_equals(&b) || a == b
    }

    /// Equality with all singleton axes omitted.
    pub fn squeeze_equals(&self, other: &Shape) -> bool {
        let (a, b) = (self.squeeze(), other.squeeze());
        a.scalar_equals(&b) || a == b
    }
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut shape = format!("[{}", self.0.first().unwrap_or(&0));
        for dim in self.0.iter().skip(1) {
            shape.push_str(&format!("x{}", dim));
        }
        write!(f, "{}]", shape)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl std::ops::Index<usize> for Shape {
    type Output = usize;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl std::ops::IndexMut<usize> for Shape {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl From<Vec<usize>> for Shape {
    fn from(shape: Vec<usize>) -> Self {
        Self(shape.into())
    }
}

impl From<&[usize]> for Shape {
    fn from(slice: &[usize]) -> Self {
        Shape(slice.into())
    }
}

impl FromIterator<usize> for Shape {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Shape(iter.into_iter().collect())
    }
}

macro_rules! impl_try_into_for_shape {
    ($($N:expr),*) => {
        $(
            impl TryInto<[usize; $N]> for &Shape {
                type Error = anyhow::Error;

                fn try_into(self) -> Result<[usize; $N], Self::Error> {
                    if self.0.len() == $N {
                        let mut arr = [0; $N];
                        for (i, &item) in self.0.iter().enumerate().take($N) {
                            arr[i] = item;
                        }
                        Ok(arr)
                    } else {
                        Err(anyhow::anyhow!("Shape has length {} but expected {}", self.0.len(), $N))
                    }
                }
            }
        )*
    };
}

impl_try_into_for_shape!(0, 1, 2, 3, 4, 6);
