//! Array stream: N-dimensional arrays with dimensions and attributes.

use std::sync::Arc;

use super::assemble::{self, kind_for};
use super::{ObjectStream, StreamCore};
use crate::core::slab::{element_count, last_index};
use crate::core::{ArrayRecord, Dimension, SlabSpec};
use crate::driver::{Driver, ObjectHandle, ObjectInfo, ObjectKind};
use crate::util::{Error, GenVec, NumberKind, Result, Shape};

/// Stream over the arrays of a file.
pub struct ArrayStream {
    core: StreamCore,
    slab: Option<SlabSpec>,
    meta: bool,
}

impl ArrayStream {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            core: StreamCore::new(driver, ObjectKind::Array),
            slab: None,
            meta: false,
        }
    }

    /// Create and open in one step.
    pub fn open_path(driver: Arc<dyn Driver>, path: &str) -> Result<Self> {
        let mut s = Self::new(driver);
        s.open(path)?;
        Ok(s)
    }

    /// Metadata-only mode: data and scales come back as empty typed vectors.
    pub fn set_meta(&mut self, on: bool) {
        self.meta = on;
    }

    pub fn is_meta(&self) -> bool {
        self.meta
    }

    /// Restrict reads to a hyperslab until replaced, unset or closed.
    ///
    /// Any rank is accepted here; the fit against each object is checked
    /// when it is read.
    pub fn set_slab(&mut self, slab: SlabSpec) -> Result<()> {
        self.slab = Some(slab);
        Ok(())
    }

    pub fn unset_slab(&mut self) {
        self.slab = None;
    }

    pub fn slab(&self) -> Option<&SlabSpec> {
        self.slab.as_ref()
    }

    fn read_dims(
        &self,
        object: ObjectHandle,
        info: &ObjectInfo,
        slab: Option<&SlabSpec>,
    ) -> Result<Vec<Dimension>> {
        let driver = self.core.driver();
        let mut dims = Vec::with_capacity(info.dims.len());

        for d in 0..info.dims.len() {
            let di = driver.dim_info(object, d)?;
            let mut count = di.count;
            if count == 0 {
                if d != 0 {
                    return Err(Error::read(
                        &info.name,
                        format!("dimension {d} is unlimited, only the first may be"),
                    ));
                }
                count = info.dims[0];
            }

            let scale = match di.type_code {
                0 => None,
                code => {
                    let kind = kind_for(code, &di.name)?;
                    if kind == NumberKind::Char8 {
                        None
                    } else if self.meta {
                        Some(GenVec::empty(kind))
                    } else {
                        let raw = driver.read_dim_scale(object, d)?;
                        let full = assemble::import(kind, &raw, count, &info.name)?;
                        Some(match slab {
                            Some(s) => {
                                let (start, stride, edge) = (s.start()[d], s.stride()[d], s.edge()[d]);
                                let last = last_index(start, stride, edge).ok_or_else(|| {
                                    Error::slab(format!("dimension {d}: selection overflows the index range"))
                                })?;
                                GenVec::from_raw(kind, Some(full.as_bytes()), start, last, stride)?
                            }
                            None => full,
                        })
                    }
                }
            };

            dims.push(Dimension {
                name: di.name,
                count: slab.map_or(count, |s| s.edge()[d]),
                label: di.label,
                unit: di.unit,
                format: di.format,
                scale,
            });
        }

        if let Some(s) = slab.filter(|s| s.reduces_rank()) {
            let kept = s.kept_dims();
            dims = dims
                .into_iter()
                .enumerate()
                .filter(|(i, _)| kept.contains(i))
                .map(|(_, d)| d)
                .collect();
        }
        Ok(dims)
    }
}

impl ObjectStream for ArrayStream {
    type Record = ArrayRecord;

    fn core(&self) -> &StreamCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StreamCore {
        &mut self.core
    }

    fn assemble(&mut self, object: ObjectHandle) -> Result<ArrayRecord> {
        let driver = self.core.driver();
        let info = driver.object_info(object)?;
        let kind = kind_for(info.type_code, &info.name)?;
        let shape = Shape::from_slice(&info.dims);

        // scalars ignore any slab
        let slab = if shape.is_scalar() {
            None
        } else {
            self.slab.as_ref()
        };
        if let Some(s) = slab {
            s.validate(&shape)?;
        }

        let dims = self.read_dims(object, &info, slab)?;
        let attrs = self.core.object_attrs(false)?;

        // empty objects (e.g. an unlimited dimension with no records yet) need no read
        let data = if self.meta || shape.num_points() == 0 {
            GenVec::empty(kind)
        } else {
            let full;
            let s = match slab {
                Some(s) => s,
                None => {
                    full = SlabSpec::full(&shape);
                    &full
                }
            };
            let count = if shape.is_scalar() { 1 } else { element_count(s.edge()) };
            let raw = driver.read_raw(object, s.start(), s.stride(), s.edge())?;
            assemble::import(kind, &raw, count, &info.name)?
        };

        tracing::debug!(
            target: "h4",
            name = %info.name,
            kind = %kind,
            elements = data.len(),
            slab = slab.is_some(),
            "array extracted"
        );
        Ok(ArrayRecord {
            name: info.name,
            reference: info.reference,
            dims,
            attrs,
            data,
        })
    }

    fn repositioned(&mut self) {
        if !self.core.is_open() {
            self.slab = None;
            self.meta = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MemArray, MemDim, MemDriver, MemFile};

    fn stream_over(file: MemFile) -> (Arc<MemDriver>, ArrayStream) {
        let driver = Arc::new(MemDriver::new().with_file("t.hdf", file));
        let s = ArrayStream::open_path(driver.clone(), "t.hdf").unwrap();
        (driver, s)
    }

    #[test]
    fn test_scalar_ignores_slab() {
        let mut f = MemFile::new();
        f.add_array(MemArray::scalar("answer", 42i32));
        let (_d, mut s) = stream_over(f);
        s.set_slab(SlabSpec::new(&[3], &[1], &[2]).unwrap()).unwrap();
        let rec = s.next_record().unwrap().unwrap();
        assert!(rec.dims.is_empty());
        assert_eq!(rec.data.export_as::<i32>().unwrap(), vec![42]);
    }

    #[test]
    fn test_slab_rank_mismatch() {
        let mut f = MemFile::new();
        f.add_array(MemArray::new("m", &[2, 2], &[1u8, 2, 3, 4]));
        let (_d, mut s) = stream_over(f);
        s.set_slab(SlabSpec::new(&[0], &[1], &[1]).unwrap()).unwrap();
        let mut rec = ArrayRecord::default();
        assert!(matches!(s.read(&mut rec), Err(Error::InvalidSlab(_))));
        assert_eq!(rec, ArrayRecord::default());
        assert_eq!(s.position(), crate::core::Position::At(0));
    }

    #[test]
    fn test_reduce_rank_and_scales() {
        let mut f = MemFile::new();
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        f.add_array(
            MemArray::new("grid", &[3, 4], &data)
                .with_dim(MemDim::named("y").with_scale(&[100i16, 200, 300]))
                .with_dim(MemDim::named("x").with_scale(&[0u8, 1, 2, 3]).with_unit("m")),
        );
        let (_d, mut s) = stream_over(f);
        s.set_slab(
            SlabSpec::new(&[1, 0], &[1, 2], &[1, 2])
                .unwrap()
                .with_reduce_rank(true),
        )
        .unwrap();
        let rec = s.next_record().unwrap().unwrap();
        assert_eq!(rec.dims.len(), 1);
        assert_eq!(rec.dims[0].name, "x");
        assert_eq!(rec.dims[0].count, 2);
        assert_eq!(rec.dims[0].unit, "m");
        let scale = rec.dims[0].scale.as_ref().unwrap();
        assert_eq!(scale.export_as::<u8>().unwrap(), vec![0, 2]);
        assert_eq!(rec.data.export_as::<f32>().unwrap(), vec![4.0, 6.0]);
        assert!(rec.is_consistent());
    }

    #[test]
    fn test_char_scale_skipped() {
        let mut f = MemFile::new();
        f.add_array(
            MemArray::new("s", &[3], &[1i32, 2, 3])
                .with_dim(MemDim::named("label").with_scale(&[crate::util::Char8::from(b'a'); 3])),
        );
        let (_d, mut s) = stream_over(f);
        let rec = s.next_record().unwrap().unwrap();
        assert_eq!(rec.dims[0].scale, None);
        assert!(!rec.has_scale());
    }

    #[test]
    fn test_unlimited_dimension() {
        let mut f = MemFile::new();
        f.add_array(
            MemArray::new("u", &[2, 2], &[1i16, 2, 3, 4])
                .with_dim(MemDim::named("time").unlimited()),
        );
        f.add_array(
            MemArray::new("bad", &[2, 2], &[1i16, 2, 3, 4])
                .with_dim(MemDim::named("a"))
                .with_dim(MemDim::named("b").unlimited()),
        );
        let (_d, mut s) = stream_over(f);
        let rec = s.next_record().unwrap().unwrap();
        assert_eq!(rec.dims[0].count, 2);
        assert!(matches!(s.next_record(), Err(Error::ReadError { .. })));
        assert_eq!(s.position(), crate::core::Position::At(1));
    }

    #[test]
    fn test_meta_mode() {
        let mut f = MemFile::new();
        f.add_array(
            MemArray::new("v", &[4], &[1.0f64, 2.0, 3.0, 4.0])
                .with_dim(MemDim::named("i").with_scale(&[1u16, 2, 3, 4])),
        );
        let (d, mut s) = stream_over(f);
        s.set_meta(true);
        d.fail_reads(true);
        let rec = s.next_record().unwrap().unwrap();
        assert_eq!(rec.data.kind(), Some(NumberKind::Float64));
        assert!(rec.data.is_empty());
        assert_eq!(rec.dims[0].count, 4);
        assert_eq!(rec.dims[0].scale.as_ref().and_then(GenVec::kind), Some(NumberKind::Uint16));
    }

    #[test]
    fn test_empty_arrays() {
        let mut f = MemFile::new();
        f.add_array(MemArray::new("none", &[0], &[] as &[f32]));
        f.add_array(
            MemArray::new("pending", &[0, 3], &[] as &[i32])
                .with_dim(MemDim::named("t").unlimited())
                .with_dim(MemDim::named("c").with_scale(&[1u8, 2, 3])),
        );
        let (d, mut s) = stream_over(f);
        d.fail_reads(true);

        let rec = s.next_record().unwrap().unwrap();
        assert_eq!(rec.data.kind(), Some(NumberKind::Float32));
        assert!(rec.data.is_empty());
        assert_eq!(rec.shape(), vec![0]);

        let rec = s.next_record().unwrap().unwrap();
        assert_eq!(rec.data.kind(), Some(NumberKind::Int32));
        assert!(rec.data.is_empty());
        assert_eq!(rec.shape(), vec![0, 3]);
        assert_eq!(rec.dims[0].name, "t");
        assert_eq!(
            rec.dims[1].scale.as_ref().unwrap().export_as::<u8>().unwrap(),
            vec![1, 2, 3]
        );
        assert!(s.eos());
    }
}
