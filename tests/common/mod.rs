//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use hdfstream::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const PATH: &str = "fixture.hdf";

/// Register `file` under [`PATH`] in a fresh in-memory driver.
pub fn driver_with(file: MemFile) -> Arc<MemDriver> {
    init_tracing();
    Arc::new(MemDriver::new().with_file(PATH, file))
}

/// Three small arrays of different kinds plus a reserved-looking table set.
pub fn three_arrays() -> MemFile {
    let mut f = MemFile::new();
    f.add_array(
        MemArray::new("temperature", &[2, 3], &[1.5f32, 2.5, 3.5, 4.5, 5.5, 6.5])
            .with_dim(MemDim::named("lat").with_scale(&[10i16, 20]))
            .with_dim(MemDim::named("lon").with_scale(&[0u8, 5, 10]).with_unit("deg"))
            .with_attr(MemAttr::text("units", "K")),
    );
    f.add_array(MemArray::new("counts", &[4], &[1u32, 2, 3, 4]));
    f.add_array(MemArray::scalar("version", 3i8));
    f.add_file_attr(ObjectKind::Array, MemAttr::text("history", "created"));
    f
}

/// Tables: one user table between two internal ones.
pub fn tables_with_reserved() -> MemFile {
    let mut f = MemFile::new();
    f.add_table(
        MemTable::new("RIATTR0.0N").with_field(MemField::new("v", 1, &[0u8])),
    );
    f.add_table(
        MemTable::new("obs")
            .with_class("station")
            .with_field(MemField::new("temp", 1, &[1.0f64, 2.0, 3.0, 4.0, 5.0]))
            .with_field(MemField::text("code", 3, "abcdefghijklmno")),
    );
    f.add_table(
        MemTable::new("dims")
            .with_class("DimVal0.0")
            .with_field(MemField::new("v", 1, &[0u8])),
    );
    f.add_table(
        MemTable::new("extra").with_field(MemField::new("n", 2, &[1i16, 2, 3, 4])),
    );
    f
}
