//! Hyperslab geometry.
//!
//! A hyperslab selects, per dimension, `edge` elements starting at
//! `start` and stepping by `stride`. Everything here is pure arithmetic;
//! drivers that cannot stride natively use [`gather`] to cut the
//! selection out of a full row-major buffer.

use smallvec::SmallVec;

use crate::util::{Error, Result, Shape};

type Extents = SmallVec<[usize; 4]>;

/// A validated per-dimension start / stride / edge selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlabSpec {
    start: Extents,
    stride: Extents,
    edge: Extents,
    reduce_rank: bool,
}

fn checked(values: &[i64], what: &str, min: i64) -> Result<Extents> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if v < min {
                Err(Error::slab(format!("{what}[{i}] = {v}, must be >= {min}")))
            } else {
                Ok(v as usize)
            }
        })
        .collect()
}

impl SlabSpec {
    /// Validate and build a slab. Every array must have the same, non-zero
    /// length; `start >= 0`, `stride >= 1` and `edge >= 1` everywhere.
    pub fn new(start: &[i64], stride: &[i64], edge: &[i64]) -> Result<Self> {
        if start.is_empty() {
            return Err(Error::slab("empty start/stride/edge"));
        }
        if start.len() != stride.len() || stride.len() != edge.len() {
            return Err(Error::slab(format!(
                "length mismatch: start {}, stride {}, edge {}",
                start.len(),
                stride.len(),
                edge.len()
            )));
        }
        Ok(Self {
            start: checked(start, "start", 0)?,
            stride: checked(stride, "stride", 1)?,
            edge: checked(edge, "edge", 1)?,
            reduce_rank: false,
        })
    }

    /// Slab covering a whole array.
    pub fn full(shape: &Shape) -> Self {
        let rank = shape.rank();
        Self {
            start: SmallVec::from_elem(0, rank),
            stride: SmallVec::from_elem(1, rank),
            edge: SmallVec::from_slice(shape.sizes()),
            reduce_rank: false,
        }
    }

    /// Drop dimensions with `edge == 1` from the reported dimension list.
    pub fn with_reduce_rank(mut self, on: bool) -> Self {
        self.reduce_rank = on;
        self
    }

    /// The last `n` dimensions of this slab (`None` if `n` exceeds the rank).
    pub fn trailing(&self, n: usize) -> Option<Self> {
        let skip = self.rank().checked_sub(n)?;
        Some(Self {
            start: SmallVec::from_slice(&self.start[skip..]),
            stride: SmallVec::from_slice(&self.stride[skip..]),
            edge: SmallVec::from_slice(&self.edge[skip..]),
            reduce_rank: self.reduce_rank,
        })
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.edge.len()
    }

    pub fn start(&self) -> &[usize] {
        &self.start
    }

    pub fn stride(&self) -> &[usize] {
        &self.stride
    }

    pub fn edge(&self) -> &[usize] {
        &self.edge
    }

    #[inline]
    pub fn reduces_rank(&self) -> bool {
        self.reduce_rank
    }

    /// Number of elements the selection covers.
    pub fn element_count(&self) -> usize {
        element_count(&self.edge)
    }

    /// Check the selection fits inside `shape`.
    pub fn validate(&self, shape: &Shape) -> Result<()> {
        if self.rank() != shape.rank() {
            return Err(Error::slab(format!(
                "slab rank {} does not match object rank {}",
                self.rank(),
                shape.rank()
            )));
        }
        for (d, &size) in shape.sizes().iter().enumerate() {
            let last = last_index(self.start[d], self.stride[d], self.edge[d]).ok_or_else(|| {
                Error::slab(format!("dimension {d}: selection overflows the index range"))
            })?;
            if last >= size {
                return Err(Error::slab(format!(
                    "dimension {d}: last index {last} outside size {size}"
                )));
            }
        }
        Ok(())
    }

    /// Dimension indices the caller sees (all of them unless rank reduction is on).
    pub fn kept_dims(&self) -> Vec<usize> {
        if self.reduce_rank {
            reduce_rank(&self.edge)
        } else {
            (0..self.rank()).collect()
        }
    }
}

/// Product of all edges.
pub fn element_count(edge: &[usize]) -> usize {
    edge.iter().product()
}

/// `start, start + stride, .., start + (edge - 1) * stride`.
pub fn linear_indices(start: usize, stride: usize, edge: usize) -> impl Iterator<Item = usize> {
    (0..edge).map(move |i| start + i * stride)
}

/// `start + (edge - 1) * stride`, `None` for an empty edge or on overflow.
pub fn last_index(start: usize, stride: usize, edge: usize) -> Option<usize> {
    edge.checked_sub(1)?.checked_mul(stride)?.checked_add(start)
}

/// Indices of the dimensions that survive rank reduction (`edge != 1`).
pub fn reduce_rank(edge: &[usize]) -> Vec<usize> {
    edge.iter()
        .enumerate()
        .filter(|(_, e)| **e != 1)
        .map(|(d, _)| d)
        .collect()
}

/// Copy the selected elements out of a full row-major buffer.
///
/// `src` must hold exactly `shape.num_points() * elem_size` bytes; the
/// result is the selection in row-major order.
pub fn gather(
    shape: &Shape,
    elem_size: usize,
    src: &[u8],
    start: &[usize],
    stride: &[usize],
    edge: &[usize],
) -> Result<Vec<u8>> {
    let rank = shape.rank();
    if start.len() != rank || stride.len() != rank || edge.len() != rank {
        return Err(Error::slab(format!("selection rank does not match object rank {rank}")));
    }
    if src.len() != shape.num_points() * elem_size {
        return Err(Error::slab(format!(
            "buffer holds {} bytes, shape {} needs {}",
            src.len(),
            shape,
            shape.num_points() * elem_size
        )));
    }
    if rank == 0 {
        return Ok(src.to_vec());
    }
    // a whole-object read of an empty object selects nothing
    if edge == shape.sizes() && shape.num_points() == 0 {
        return Ok(Vec::new());
    }
    for d in 0..rank {
        let fits = stride[d] != 0
            && last_index(start[d], stride[d], edge[d]).is_some_and(|last| last < shape.sizes()[d]);
        if !fits {
            return Err(Error::slab(format!("dimension {d} selection outside {shape}")));
        }
    }

    let strides = shape.strides();
    let total = element_count(edge);
    let mut out = Vec::with_capacity(total * elem_size);
    let mut counter: SmallVec<[usize; 4]> = SmallVec::from_elem(0, rank);

    for _ in 0..total {
        let mut off = 0;
        for d in 0..rank {
            off += (start[d] + counter[d] * stride[d]) * strides[d];
        }
        out.extend_from_slice(&src[off * elem_size..(off + 1) * elem_size]);

        // odometer, fastest dimension last
        for d in (0..rank).rev() {
            counter[d] += 1;
            if counter[d] < edge[d] {
                break;
            }
            counter[d] = 0;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflowing_selection_rejected() {
        let huge = SlabSpec::new(&[0], &[i64::MAX], &[4]).unwrap();
        assert!(matches!(
            huge.validate(&Shape::from_slice(&[10])),
            Err(Error::InvalidSlab(_))
        ));
        let far = SlabSpec::new(&[i64::MAX], &[1], &[2]).unwrap();
        assert!(matches!(
            far.validate(&Shape::from_slice(&[10])),
            Err(Error::InvalidSlab(_))
        ));
        assert_eq!(last_index(3, 2, 4), Some(9));
        assert_eq!(last_index(0, 1, 0), None);
        assert_eq!(last_index(0, usize::MAX, 3), None);

        let shape = Shape::from_slice(&[10]);
        let src = vec![0u8; 10];
        assert!(matches!(
            gather(&shape, 1, &src, &[0], &[usize::MAX], &[4]),
            Err(Error::InvalidSlab(_))
        ));
    }

    #[test]
    fn test_gather_empty_object() {
        let shape = Shape::from_slice(&[0, 3]);
        assert_eq!(gather(&shape, 4, &[], &[0, 0], &[1, 1], &[0, 3]).unwrap(), Vec::<u8>::new());
        assert!(matches!(
            gather(&shape, 4, &[], &[0, 0], &[1, 1], &[1, 3]),
            Err(Error::InvalidSlab(_))
        ));
    }

    #[test]
    fn test_new_validates() {
        assert!(SlabSpec::new(&[0], &[1], &[3]).is_ok());
        assert!(matches!(SlabSpec::new(&[], &[], &[]), Err(Error::InvalidSlab(_))));
        assert!(matches!(SlabSpec::new(&[0, 0], &[1], &[3]), Err(Error::InvalidSlab(_))));
        assert!(matches!(SlabSpec::new(&[0], &[1, 1], &[3]), Err(Error::InvalidSlab(_))));
        assert!(matches!(SlabSpec::new(&[-1], &[1], &[3]), Err(Error::InvalidSlab(_))));
        assert!(matches!(SlabSpec::new(&[0], &[0], &[3]), Err(Error::InvalidSlab(_))));
        assert!(matches!(SlabSpec::new(&[0], &[1], &[0]), Err(Error::InvalidSlab(_))));
        assert!(matches!(SlabSpec::new(&[0], &[1], &[-2]), Err(Error::InvalidSlab(_))));
    }

    #[test]
    fn test_validate_against_shape() {
        let shape = Shape::from_slice(&[10]);
        assert!(SlabSpec::new(&[2], &[2], &[4]).unwrap().validate(&shape).is_ok());
        // last index 2 + 4*2 = 10 is outside
        assert!(SlabSpec::new(&[2], &[2], &[5]).unwrap().validate(&shape).is_err());
        assert!(SlabSpec::new(&[0, 0], &[1, 1], &[1, 1]).unwrap().validate(&shape).is_err());
    }

    #[test]
    fn test_trailing() {
        let s = SlabSpec::new(&[9, 1, 2], &[1, 2, 3], &[1, 4, 5]).unwrap();
        let t = s.trailing(2).unwrap();
        assert_eq!(t.start(), &[1, 2]);
        assert_eq!(t.stride(), &[2, 3]);
        assert_eq!(t.edge(), &[4, 5]);
        assert!(s.trailing(4).is_none());
    }

    #[test]
    fn test_geometry_helpers() {
        assert_eq!(element_count(&[2, 3, 4]), 24);
        assert_eq!(linear_indices(2, 2, 4).collect::<Vec<_>>(), vec![2, 4, 6, 8]);
        assert_eq!(linear_indices(5, 3, 1).collect::<Vec<_>>(), vec![5]);
        assert_eq!(reduce_rank(&[1, 5, 1, 2]), vec![1, 3]);

        let slab = SlabSpec::new(&[0, 0], &[1, 1], &[1, 4]).unwrap();
        assert_eq!(slab.kept_dims(), vec![0, 1]);
        assert_eq!(slab.with_reduce_rank(true).kept_dims(), vec![1]);
    }

    #[test]
    fn test_gather_1d() {
        let shape = Shape::from_slice(&[10]);
        let src: Vec<u8> = (0..10).collect();
        let out = gather(&shape, 1, &src, &[2], &[2], &[4]).unwrap();
        assert_eq!(out, vec![2, 4, 6, 8]);
    }

    #[test]
    fn test_gather_2d() {
        // 4 x 5, value = row * 10 + col
        let shape = Shape::from_slice(&[4, 5]);
        let src: Vec<u16> = (0..4).flat_map(|r| (0..5).map(move |c| r * 10 + c)).collect();
        let bytes: &[u8] = bytemuck::cast_slice(&src);
        let out = gather(&shape, 2, bytes, &[1, 0], &[2, 2], &[2, 3]).unwrap();
        let vals: Vec<u16> = bytemuck::pod_collect_to_vec(&out);
        assert_eq!(vals, vec![10, 12, 14, 30, 32, 34]);
    }

    #[test]
    fn test_gather_full_matches_source() {
        let shape = Shape::from_slice(&[2, 3, 2]);
        let src: Vec<u8> = (0..12).collect();
        let full = SlabSpec::full(&shape);
        let out = gather(&shape, 1, &src, full.start(), full.stride(), full.edge()).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn test_gather_rejects_outside() {
        let shape = Shape::from_slice(&[3]);
        assert!(gather(&shape, 1, &[0, 1, 2], &[1], &[2], &[2]).is_err());
        assert!(gather(&shape, 1, &[0, 1], &[0], &[1], &[1]).is_err());
    }
}
