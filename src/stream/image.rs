//! Image stream: general raster images with palettes.

use std::sync::Arc;

use super::assemble::{self, kind_for};
use super::{ObjectStream, StreamCore};
use crate::core::{ImageRecord, Palette, SlabSpec};
use crate::driver::{Driver, Interlace, ObjectHandle, ObjectInfo, ObjectKind};
use crate::util::{Error, GenVec, NumberKind, Result, Shape};

/// Stream over the raster images of a file.
pub struct ImageStream {
    core: StreamCore,
    /// Spatial `[y, x]` selection
    slab: Option<SlabSpec>,
    interlace: Option<Interlace>,
    meta: bool,
}

impl ImageStream {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            core: StreamCore::new(driver, ObjectKind::Image),
            slab: None,
            interlace: None,
            meta: false,
        }
    }

    /// Create and open in one step.
    pub fn open_path(driver: Arc<dyn Driver>, path: &str) -> Result<Self> {
        let mut s = Self::new(driver);
        s.open(path)?;
        Ok(s)
    }

    pub fn set_meta(&mut self, on: bool) {
        self.meta = on;
    }

    pub fn is_meta(&self) -> bool {
        self.meta
    }

    /// Restrict reads to a spatial selection.
    ///
    /// Accepts `[y, x]` or `[component, y, x]`; the component entry is
    /// ignored since every component is always read.
    pub fn set_slab(&mut self, slab: SlabSpec) -> Result<()> {
        let spatial = match slab.rank() {
            2 => slab,
            3 => slab.trailing(2).ok_or_else(|| Error::slab("image slab"))?,
            r => return Err(Error::slab(format!("image slab must have rank 2 or 3, got {r}"))),
        };
        self.slab = Some(spatial);
        Ok(())
    }

    pub fn unset_slab(&mut self) {
        self.slab = None;
    }

    pub fn slab(&self) -> Option<&SlabSpec> {
        self.slab.as_ref()
    }

    /// Pixel ordering of the next reads. Without one, each image comes back
    /// in its stored interlace.
    pub fn set_interlace(&mut self, interlace: Interlace) {
        self.interlace = Some(interlace);
    }

    pub fn interlace(&self) -> Option<Interlace> {
        self.interlace
    }

    fn read_palettes(&self, object: ObjectHandle, info: &ObjectInfo) -> Result<Vec<Palette>> {
        let driver = self.core.driver();
        (0..info.palette_count)
            .map(|i| {
                let pi = driver.palette_info(object, i)?;
                let kind = match kind_for(pi.type_code, &pi.name)? {
                    NumberKind::Uchar8 => NumberKind::Uint8,
                    k => k,
                };
                let table = if self.meta {
                    GenVec::empty(kind)
                } else {
                    let raw = driver.read_palette(object, i)?;
                    assemble::import(kind, &raw, pi.entries * pi.components, &info.name)?
                };
                Ok(Palette {
                    name: pi.name,
                    components: pi.components,
                    entries: pi.entries,
                    table,
                })
            })
            .collect()
    }
}

impl ObjectStream for ImageStream {
    type Record = ImageRecord;

    fn core(&self) -> &StreamCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StreamCore {
        &mut self.core
    }

    fn assemble(&mut self, object: ObjectHandle) -> Result<ImageRecord> {
        let driver = self.core.driver();
        let info = driver.object_info(object)?;
        let kind = kind_for(info.type_code, &info.name)?;
        if info.dims.len() != 2 {
            return Err(Error::read(&info.name, "image is not two-dimensional"));
        }
        let shape = Shape::from_slice(&info.dims);
        let full;
        let slab = match &self.slab {
            Some(s) => {
                s.validate(&shape)?;
                s
            }
            None => {
                full = SlabSpec::full(&shape);
                &full
            }
        };
        let interlace = self.interlace.unwrap_or(info.interlace);
        let dims = [slab.edge()[0], slab.edge()[1]];

        let palettes = self.read_palettes(object, &info)?;
        let attrs = self.core.object_attrs(true)?;

        let image = if self.meta {
            GenVec::empty(kind)
        } else {
            let raw = driver.read_image(object, slab.start(), slab.stride(), slab.edge(), interlace)?;
            assemble::import(kind, &raw, dims[0] * dims[1] * info.components, &info.name)?
        };

        tracing::debug!(
            target: "h4",
            name = %info.name,
            height = dims[0],
            width = dims[1],
            components = info.components,
            ?interlace,
            "image extracted"
        );
        Ok(ImageRecord {
            name: info.name,
            reference: info.reference,
            dims,
            components: info.components,
            interlace,
            attrs,
            palettes,
            image,
        })
    }

    fn repositioned(&mut self) {
        if !self.core.is_open() {
            self.slab = None;
            self.interlace = None;
            self.meta = false;
        }
    }
}
