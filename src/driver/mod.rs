//! File-driver boundary.
//!
//! A [`Driver`] is the only thing that knows how objects are stored. The
//! streams ask it to enumerate, describe and attach objects and to hand
//! back raw native-endian element buffers; everything above this layer
//! is format independent.
//!
//! Two drivers ship with the crate:
//! - [`MemDriver`] - in-memory files assembled with the `Mem*` builders
//! - [`ArchiveDriver`] - snapshot files on disk, served through a `MemDriver`

pub mod archive;
mod memory;

pub use archive::ArchiveDriver;
pub use memory::*;

use std::fmt;

use crate::util::Result;

/// Object reference number, unique within one file.
pub type Ref = i32;

/// Object tag number.
pub type Tag = i32;

/// Numeric data group (array) tag.
pub const TAG_NDG: Tag = 720;
/// Vdata header (table) tag.
pub const TAG_VH: Tag = 1962;
/// Vgroup (group) tag.
pub const TAG_VG: Tag = 1965;
/// Raster image group tag.
pub const TAG_RIG: Tag = 306;

/// The four object families a stream can iterate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Array,
    Table,
    Group,
    Image,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 4] = [Self::Array, Self::Table, Self::Group, Self::Image];

    pub const fn tag(self) -> Tag {
        match self {
            Self::Array => TAG_NDG,
            Self::Table => TAG_VH,
            Self::Group => TAG_VG,
            Self::Image => TAG_RIG,
        }
    }

    pub const fn from_tag(tag: Tag) -> Option<Self> {
        match tag {
            TAG_NDG => Some(Self::Array),
            TAG_VH => Some(Self::Table),
            TAG_VG => Some(Self::Group),
            TAG_RIG => Some(Self::Image),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Table => "table",
            Self::Group => "group",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle for an open file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FileHandle(pub u32);

/// Handle for an attached object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccessMode {
    #[default]
    Read,
    ReadWrite,
}

/// Image sample ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Interlace {
    /// `[y][x][component]`
    #[default]
    Pixel,
    /// `[y][component][x]`
    Line,
    /// `[component][y][x]`
    Component,
}

impl Interlace {
    pub const fn code(self) -> u8 {
        match self {
            Self::Pixel => 0,
            Self::Line => 1,
            Self::Component => 2,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Pixel),
            1 => Some(Self::Line),
            2 => Some(Self::Component),
            _ => None,
        }
    }
}

/// Name and class of an object, available without attaching it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectSummary {
    pub name: String,
    pub class: String,
    /// Array that stores a dimension scale
    pub coordinate: bool,
}

/// Metadata of an attached object.
///
/// Fields that do not apply to the object's kind stay at their defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectInfo {
    pub name: String,
    pub class: String,
    pub reference: Ref,
    /// Arrays: dimension sizes. Images: `[height, width]`.
    pub dims: Vec<usize>,
    /// Element type code (arrays, images)
    pub type_code: i32,
    pub attr_count: usize,
    /// Tables: number of fields
    pub field_count: usize,
    /// Tables: number of records
    pub records: usize,
    /// Tables: records are stored whole, so a row range can be read directly
    pub full_interlace: bool,
    /// Groups: number of entries
    pub entry_count: usize,
    /// Images: samples per pixel
    pub components: usize,
    /// Images: stored interlace
    pub interlace: Interlace,
    /// Images: number of palettes
    pub palette_count: usize,
}

/// One array dimension.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DimInfo {
    pub name: String,
    /// 0 marks an unlimited dimension
    pub count: usize,
    /// Scale element type code, 0 when no scale is stored
    pub type_code: i32,
    pub label: String,
    pub unit: String,
    pub format: String,
}

/// One table field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub type_code: i32,
    /// Components per record
    pub order: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttrInfo {
    pub name: String,
    pub type_code: i32,
    pub count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaletteInfo {
    pub name: String,
    pub type_code: i32,
    pub components: usize,
    pub entries: usize,
}

/// Owner of an attribute list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrTarget {
    /// File-level attributes of one interface
    File(FileHandle, ObjectKind),
    Object(ObjectHandle),
}

/// Access to a container file.
///
/// Raw buffers are native-endian element runs. Array and image selections
/// are row-major in `start` / `stride` / `edge` order.
pub trait Driver: Send + Sync {
    fn open_file(&self, path: &str, mode: AccessMode) -> Result<FileHandle>;

    fn close_file(&self, file: FileHandle);

    /// Every object of `kind` in file order, internal ones included.
    fn enumerate(&self, file: FileHandle, kind: ObjectKind) -> Result<Vec<Ref>>;

    /// Name and class of an object without attaching it.
    fn describe(&self, file: FileHandle, kind: ObjectKind, reference: Ref) -> Result<ObjectSummary>;

    fn attach(&self, file: FileHandle, kind: ObjectKind, reference: Ref) -> Result<ObjectHandle>;

    fn detach(&self, object: ObjectHandle);

    fn object_info(&self, object: ObjectHandle) -> Result<ObjectInfo>;

    /// Array hyperslab read.
    fn read_raw(
        &self,
        object: ObjectHandle,
        start: &[usize],
        stride: &[usize],
        edge: &[usize],
    ) -> Result<Vec<u8>>;

    fn dim_info(&self, object: ObjectHandle, index: usize) -> Result<DimInfo>;

    /// Full scale of dimension `index`.
    fn read_dim_scale(&self, object: ObjectHandle, index: usize) -> Result<Vec<u8>>;

    fn field_info(&self, object: ObjectHandle, index: usize) -> Result<FieldInfo>;

    /// `records` whole records of field `index`, starting at `first_record`.
    fn read_field(
        &self,
        object: ObjectHandle,
        index: usize,
        first_record: usize,
        records: usize,
    ) -> Result<Vec<u8>>;

    /// `(tag, ref)` of each group member.
    fn group_entries(&self, object: ObjectHandle) -> Result<Vec<(Tag, Ref)>>;

    /// Image selection over `[y, x]`, all components, in `interlace` order.
    fn read_image(
        &self,
        object: ObjectHandle,
        start: &[usize],
        stride: &[usize],
        edge: &[usize],
        interlace: Interlace,
    ) -> Result<Vec<u8>>;

    fn palette_info(&self, object: ObjectHandle, index: usize) -> Result<PaletteInfo>;

    fn read_palette(&self, object: ObjectHandle, index: usize) -> Result<Vec<u8>>;

    fn file_attr_count(&self, file: FileHandle, kind: ObjectKind) -> Result<usize>;

    fn attr_info(&self, target: AttrTarget, index: usize) -> Result<AttrInfo>;

    fn read_attr_raw(&self, target: AttrTarget, index: usize) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        for k in ObjectKind::ALL {
            assert_eq!(ObjectKind::from_tag(k.tag()), Some(k));
        }
        assert_eq!(ObjectKind::from_tag(1), None);
        assert_eq!(ObjectKind::Table.to_string(), "table");
    }

    #[test]
    fn test_interlace_codes() {
        for il in [Interlace::Pixel, Interlace::Line, Interlace::Component] {
            assert_eq!(Interlace::from_code(il.code()), Some(il));
        }
        assert_eq!(Interlace::from_code(7), None);
    }
}
