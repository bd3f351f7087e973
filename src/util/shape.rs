//! Row-major array shapes.
//!
//! A [`Shape`] holds the extent of each dimension of an array, slowest
//! varying first. Rank 0 is a scalar with exactly one element.

use smallvec::SmallVec;

/// Extents of a multi-dimensional array, slowest varying first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: SmallVec<[usize; 4]>,
}

impl Shape {
    /// Rank 0 shape.
    pub fn scalar() -> Self {
        Self { dims: SmallVec::new() }
    }

    pub fn from_slice(sizes: &[usize]) -> Self {
        Self {
            dims: SmallVec::from_slice(sizes),
        }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Extent of dimension `dim`, if present.
    pub fn size(&self, dim: usize) -> Option<usize> {
        self.dims.get(dim).copied()
    }

    pub fn sizes(&self) -> &[usize] {
        &self.dims
    }

    /// Total number of elements (1 for a scalar).
    pub fn num_points(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn push(&mut self, size: usize) {
        self.dims.push(size);
    }

    /// Element strides for row-major storage.
    pub fn strides(&self) -> SmallVec<[usize; 4]> {
        let mut strides: SmallVec<[usize; 4]> = SmallVec::from_elem(1, self.dims.len());
        for d in (0..self.dims.len().saturating_sub(1)).rev() {
            strides[d] = strides[d + 1] * self.dims[d + 1];
        }
        strides
    }

    /// Flat offset of a multi-index, or `None` if it lies outside.
    pub fn offset_of(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.dims.len() {
            return None;
        }
        let strides = self.strides();
        let mut off = 0;
        for ((&i, &n), &s) in index.iter().zip(&self.dims).zip(&strides) {
            if i >= n {
                return None;
            }
            off += i * s;
        }
        Some(off)
    }
}

impl From<usize> for Shape {
    fn from(size: usize) -> Self {
        Self::from_slice(&[size])
    }
}

impl From<Vec<usize>> for Shape {
    fn from(v: Vec<usize>) -> Self {
        Self {
            dims: SmallVec::from_vec(v),
        }
    }
}

impl From<&[usize]> for Shape {
    fn from(v: &[usize]) -> Self {
        Self::from_slice(v)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, s) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, " x ")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, "]")
    }
}
