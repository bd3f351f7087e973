//! # hdfstream
//!
//! Typed extraction of HDF4-style objects (arrays, tables, groups and
//! raster images) into a generic variable/attribute model.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (GenVec, number kinds, casting lattice, errors)
//! - [`core`] - File-independent pieces (hyperslabs, cursor, directory, records)
//! - [`driver`] - File access boundary plus in-memory and snapshot drivers
//! - [`stream`] - Positioned streams, one per object kind
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hdfstream::prelude::*;
//!
//! let driver = Arc::new(ArchiveDriver::new());
//! let mut arrays = ArrayStream::open_path(driver, "data.h4snap")?;
//! arrays.set_slab(SlabSpec::new(&[0, 0], &[2, 2], &[4, 4])?)?;
//!
//! for rec in arrays.records() {
//!     let rec = rec?;
//!     println!("{} {:?}", rec.name, rec.shape());
//! }
//! ```

pub mod core;
pub mod driver;
pub mod stream;
pub mod util;

// Re-export commonly used types
pub use util::{Error, GenVec, NumberKind, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        ArrayRecord, Attribute, Column, Dimension, Field, GroupEntry, GroupRecord, ImageRecord,
        Palette, Position, SlabSpec, TableRecord,
    };
    pub use crate::driver::{
        ArchiveDriver, Driver, Interlace, MemArray, MemAttr, MemDim, MemDriver, MemField,
        MemFile, MemGroup, MemImage, MemPalette, MemTable, ObjectKind, Ref, Tag,
    };
    pub use crate::stream::{ArrayStream, GroupStream, ImageStream, ObjectStream, TableStream};
    pub use crate::util::{Char8, Element, Error, GenVec, NumberKind, Result, Uchar8};
}
