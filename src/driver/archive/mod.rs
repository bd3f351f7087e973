//! Snapshot-file driver.
//!
//! A snapshot is a small binary container holding one [`MemFile`]. The
//! [`ArchiveDriver`] loads a snapshot the first time its path is opened
//! and serves every later call from an inner [`MemDriver`].

mod format;
mod reader;
mod writer;

pub use format::{CURRENT_VERSION, SNAPSHOT_MAGIC};
pub use reader::{parse_snapshot, read_snapshot, read_snapshot_opts};
pub use writer::write_snapshot;

use super::*;
use crate::util::Error;

/// Driver over snapshot files on disk.
pub struct ArchiveDriver {
    inner: MemDriver,
    use_mmap: bool,
}

impl Default for ArchiveDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveDriver {
    pub fn new() -> Self {
        Self {
            inner: MemDriver::new(),
            use_mmap: cfg!(feature = "mmap"),
        }
    }

    /// Memory-map snapshots (only effective with the `mmap` feature).
    pub fn with_mmap(mut self, on: bool) -> Self {
        self.use_mmap = on;
        self
    }

    /// Driver holding the loaded files.
    pub fn inner(&self) -> &MemDriver {
        &self.inner
    }
}

impl Driver for ArchiveDriver {
    fn open_file(&self, path: &str, mode: AccessMode) -> Result<FileHandle> {
        if !self.inner.contains(path) {
            let file = read_snapshot_opts(path, self.use_mmap)
                .map_err(|e| Error::open(path, e.to_string()))?;
            self.inner.insert(path, file);
        }
        self.inner.open_file(path, mode)
    }

    fn close_file(&self, file: FileHandle) {
        self.inner.close_file(file)
    }

    fn enumerate(&self, file: FileHandle, kind: ObjectKind) -> Result<Vec<Ref>> {
        self.inner.enumerate(file, kind)
    }

    fn describe(&self, file: FileHandle, kind: ObjectKind, reference: Ref) -> Result<ObjectSummary> {
        self.inner.describe(file, kind, reference)
    }

    fn attach(&self, file: FileHandle, kind: ObjectKind, reference: Ref) -> Result<ObjectHandle> {
        self.inner.attach(file, kind, reference)
    }

    fn detach(&self, object: ObjectHandle) {
        self.inner.detach(object)
    }

    fn object_info(&self, object: ObjectHandle) -> Result<ObjectInfo> {
        self.inner.object_info(object)
    }

    fn read_raw(
        &self,
        object: ObjectHandle,
        start: &[usize],
        stride: &[usize],
        edge: &[usize],
    ) -> Result<Vec<u8>> {
        self.inner.read_raw(object, start, stride, edge)
    }

    fn dim_info(&self, object: ObjectHandle, index: usize) -> Result<DimInfo> {
        self.inner.dim_info(object, index)
    }

    fn read_dim_scale(&self, object: ObjectHandle, index: usize) -> Result<Vec<u8>> {
        self.inner.read_dim_scale(object, index)
    }

    fn field_info(&self, object: ObjectHandle, index: usize) -> Result<FieldInfo> {
        self.inner.field_info(object, index)
    }

    fn read_field(
        &self,
        object: ObjectHandle,
        index: usize,
        first_record: usize,
        records: usize,
    ) -> Result<Vec<u8>> {
        self.inner.read_field(object, index, first_record, records)
    }

    fn group_entries(&self, object: ObjectHandle) -> Result<Vec<(Tag, Ref)>> {
        self.inner.group_entries(object)
    }

    fn read_image(
        &self,
        object: ObjectHandle,
        start: &[usize],
        stride: &[usize],
        edge: &[usize],
        interlace: Interlace,
    ) -> Result<Vec<u8>> {
        self.inner.read_image(object, start, stride, edge, interlace)
    }

    fn palette_info(&self, object: ObjectHandle, index: usize) -> Result<PaletteInfo> {
        self.inner.palette_info(object, index)
    }

    fn read_palette(&self, object: ObjectHandle, index: usize) -> Result<Vec<u8>> {
        self.inner.read_palette(object, index)
    }

    fn file_attr_count(&self, file: FileHandle, kind: ObjectKind) -> Result<usize> {
        self.inner.file_attr_count(file, kind)
    }

    fn attr_info(&self, target: AttrTarget, index: usize) -> Result<AttrInfo> {
        self.inner.attr_info(target, index)
    }

    fn read_attr_raw(&self, target: AttrTarget, index: usize) -> Result<Vec<u8>> {
        self.inner.read_attr_raw(target, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::NumberKind;

    fn sample() -> MemFile {
        let mut f = MemFile::new();
        let a = f.add_array(
            MemArray::new("temp", &[2, 2], &[1.5f64, 2.5, 3.5, 4.5])
                .with_dim(MemDim::named("lat").with_scale(&[10i32, 20]).with_unit("deg"))
                .with_dim(MemDim::named("time").unlimited())
                .with_attr(MemAttr::text("long_name", "temperature")),
        );
        f.add_table(
            MemTable::new("obs")
                .with_class("Obs")
                .with_field(MemField::new("v", 2, &[1u16, 2, 3, 4]))
                .with_field(MemField::text("tag", 1, "ab"))
                .no_interlace(),
        );
        f.add_group(MemGroup::new("root").with_member(ObjectKind::Array, a));
        f.add_image(
            MemImage::new("img", 1, 2, 1, &[7u8, 8])
                .with_interlace(Interlace::Line)
                .with_palette(MemPalette::new("pal", 3, &[0u8, 1, 2])),
        );
        f.add_file_attr(ObjectKind::Array, MemAttr::new("history", &[1u32]));
        f
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.h4snap");
        let original = sample();
        write_snapshot(&path, &original).unwrap();

        for use_mmap in [true, false] {
            let loaded = read_snapshot_opts(&path, use_mmap).unwrap();
            assert_eq!(loaded, original);
        }
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = b"NOTSNAP\0\0\0\0\0\0\0".to_vec();
        assert!(matches!(parse_snapshot(&bytes), Err(Error::InvalidStructure(_))));
        bytes.truncate(3);
        assert!(matches!(parse_snapshot(&bytes), Err(Error::InvalidStructure(_))));
    }

    #[test]
    fn test_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.h4snap");
        write_snapshot(&path, &sample()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let cut = &bytes[..bytes.len() - 5];
        assert!(matches!(parse_snapshot(cut), Err(Error::InvalidStructure(_))));
    }

    #[test]
    fn test_driver_opens_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.h4snap");
        write_snapshot(&path, &sample()).unwrap();
        let path = path.to_string_lossy().into_owned();

        let d = ArchiveDriver::new().with_mmap(false);
        let fh = d.open_file(&path, AccessMode::Read).unwrap();
        let refs = d.enumerate(fh, ObjectKind::Array).unwrap();
        assert_eq!(refs.len(), 1);
        let oh = d.attach(fh, ObjectKind::Array, refs[0]).unwrap();
        let info = d.object_info(oh).unwrap();
        assert_eq!(info.name, "temp");
        assert_eq!(info.type_code, NumberKind::Float64.code());
        assert_eq!(d.dim_info(oh, 1).unwrap().count, 0);
        d.detach(oh);
        d.close_file(fh);

        let missing = dir.path().join("none.h4snap");
        assert!(matches!(
            d.open_file(&missing.to_string_lossy(), AccessMode::Read),
            Err(Error::OpenError { .. })
        ));
    }
}
