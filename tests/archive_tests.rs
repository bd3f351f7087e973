//! Integration tests for snapshot files read back through the streams.

mod common;

use std::sync::Arc;

use hdfstream::driver::archive::{read_snapshot, write_snapshot};
use hdfstream::prelude::*;

use common::{init_tracing, tables_with_reserved, three_arrays};
use tempfile::NamedTempFile;

fn fixture() -> MemFile {
    let mut f = three_arrays();
    let tables = tables_with_reserved();
    for t in &tables.tables {
        f.add_table(t.clone());
    }
    let lut: Vec<u8> = (0..6).collect();
    f.add_image(
        MemImage::new("img", 2, 2, 1, &[1i16, 2, 3, 4])
            .with_palette(MemPalette::new("lut", 3, &lut)),
    );
    f
}

#[test]
fn test_streams_over_snapshot() {
    init_tracing();
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path().to_str().expect("utf-8 temp path").to_string();
    write_snapshot(&path, &fixture()).expect("Failed to write snapshot");

    for use_mmap in [true, false] {
        let driver: Arc<dyn Driver> = Arc::new(ArchiveDriver::new().with_mmap(use_mmap));

        let mut arrays = ArrayStream::open_path(driver.clone(), &path).expect("open arrays");
        let recs = arrays.read_all().unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].dims[0].scale.as_ref().unwrap().export_as::<i16>().unwrap(), vec![10, 20]);
        assert_eq!(recs[2].data.export_as::<i8>().unwrap(), vec![3]);
        assert_eq!(arrays.rewind().and_then(|_| arrays.read_attrs()).unwrap().len(), 1);

        let mut tables = TableStream::open_path(driver.clone(), &path).expect("open tables");
        assert_eq!(tables.len(), 2);
        let obs = tables.next_record().unwrap().unwrap();
        assert_eq!(obs.class, "station");
        assert_eq!(obs.records, 5);

        let mut images = ImageStream::open_path(driver.clone(), &path).expect("open images");
        let img = images.next_record().unwrap().unwrap();
        assert_eq!(img.image.export_as::<i32>().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(img.palettes[0].entries, 2);
    }
}

#[test]
fn test_snapshot_preserves_file() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let original = fixture();
    write_snapshot(temp.path(), &original).unwrap();
    let loaded = read_snapshot(temp.path()).unwrap();
    assert_eq!(loaded.refs(ObjectKind::Array), original.refs(ObjectKind::Array));
    assert_eq!(loaded.refs(ObjectKind::Table), original.refs(ObjectKind::Table));
    assert_eq!(loaded.tables, original.tables);
    assert_eq!(loaded.images, original.images);
}

#[test]
fn test_missing_and_corrupt_files() {
    init_tracing();
    let driver: Arc<dyn Driver> = Arc::new(ArchiveDriver::new());
    let err = ArrayStream::open_path(driver.clone(), "/nonexistent/dir/none.h4snap").err();
    assert!(matches!(err, Some(Error::OpenError { .. })));

    let temp = NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), b"not a snapshot at all").unwrap();
    let path = temp.path().to_str().unwrap();
    let err = TableStream::open_path(driver, path).err();
    assert!(matches!(err, Some(Error::OpenError { .. })));
}
