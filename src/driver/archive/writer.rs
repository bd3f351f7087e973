//! Snapshot writer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::format::*;
use crate::driver::{MemArray, MemAttr, MemFile, MemGroup, MemImage, MemTable};
use crate::util::{Error, Result};

/// Lengths and counts are stored as u32.
fn narrow_u32(v: usize) -> Result<u32> {
    u32::try_from(v).map_err(|_| Error::invalid(format!("length {v} does not fit in 32 bits")))
}

/// Sequential little-endian output.
struct OStream {
    writer: BufWriter<File>,
}

impl OStream {
    fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn u8(&mut self, v: u8) -> Result<()> {
        self.writer.write_u8(v)?;
        Ok(())
    }

    fn u32(&mut self, v: usize) -> Result<()> {
        self.writer.write_u32::<LittleEndian>(narrow_u32(v)?)?;
        Ok(())
    }

    fn u64(&mut self, v: usize) -> Result<()> {
        self.writer.write_u64::<LittleEndian>(v as u64)?;
        Ok(())
    }

    fn i32(&mut self, v: i32) -> Result<()> {
        self.writer.write_i32::<LittleEndian>(v)?;
        Ok(())
    }

    fn flag(&mut self, v: bool) -> Result<()> {
        self.u8(v as u8)
    }

    fn str(&mut self, s: &str) -> Result<()> {
        self.u32(s.len())?;
        self.writer.write_all(s.as_bytes())?;
        Ok(())
    }

    fn blob(&mut self, data: &[u8], type_code: i32) -> Result<()> {
        let mut le = data.to_vec();
        swap_le(&mut le, elem_size(type_code));
        self.u64(le.len())?;
        self.writer.write_all(&le)?;
        Ok(())
    }

    fn attrs(&mut self, attrs: &[MemAttr]) -> Result<()> {
        self.u32(attrs.len())?;
        for a in attrs {
            self.str(&a.name)?;
            self.i32(a.type_code)?;
            self.u64(a.count)?;
            self.blob(&a.data, a.type_code)?;
        }
        Ok(())
    }

    fn array(&mut self, a: &MemArray) -> Result<()> {
        self.i32(a.reference)?;
        self.str(&a.name)?;
        self.i32(a.type_code)?;
        self.u32(a.dims.len())?;
        for &d in &a.dims {
            self.u64(d)?;
        }
        self.blob(&a.data, a.type_code)?;
        self.flag(a.coordinate)?;
        self.u32(a.dimensions.len())?;
        for d in &a.dimensions {
            self.flag(d.name.is_some())?;
            self.str(d.name.as_deref().unwrap_or(""))?;
            self.str(&d.label)?;
            self.str(&d.unit)?;
            self.str(&d.format)?;
            self.flag(d.unlimited)?;
            match &d.scale {
                Some((code, data)) => {
                    self.flag(true)?;
                    self.i32(*code)?;
                    self.blob(data, *code)?;
                }
                None => self.flag(false)?,
            }
        }
        self.attrs(&a.attrs)
    }

    fn table(&mut self, t: &MemTable) -> Result<()> {
        self.i32(t.reference)?;
        self.str(&t.name)?;
        self.str(&t.class)?;
        self.flag(t.full_interlace)?;
        self.u32(t.fields.len())?;
        for f in &t.fields {
            self.str(&f.name)?;
            self.i32(f.type_code)?;
            self.u32(f.order)?;
            self.blob(&f.data, f.type_code)?;
        }
        self.attrs(&t.attrs)
    }

    fn group(&mut self, g: &MemGroup) -> Result<()> {
        self.i32(g.reference)?;
        self.str(&g.name)?;
        self.str(&g.class)?;
        self.u32(g.entries.len())?;
        for &(tag, r) in &g.entries {
            self.i32(tag)?;
            self.i32(r)?;
        }
        self.attrs(&g.attrs)
    }

    fn image(&mut self, i: &MemImage) -> Result<()> {
        self.i32(i.reference)?;
        self.str(&i.name)?;
        self.i32(i.type_code)?;
        self.u64(i.height)?;
        self.u64(i.width)?;
        self.u32(i.components)?;
        self.u8(i.interlace.code())?;
        self.blob(&i.data, i.type_code)?;
        self.u32(i.palettes.len())?;
        for p in &i.palettes {
            self.str(&p.name)?;
            self.i32(p.type_code)?;
            self.u32(p.components)?;
            self.blob(&p.data, p.type_code)?;
        }
        self.attrs(&i.attrs)
    }
}

/// Write `file` to `path` as a snapshot container.
pub fn write_snapshot(path: impl AsRef<Path>, file: &MemFile) -> Result<()> {
    let path = path.as_ref();
    let mut out = OStream::create(path)?;

    out.writer.write_all(SNAPSHOT_MAGIC)?;
    out.writer.write_u16::<LittleEndian>(CURRENT_VERSION)?;
    out.i32(file.next_ref)?;

    out.u32(file.file_attrs.len())?;
    for (kind, attrs) in &file.file_attrs {
        out.u8(kind_code(*kind))?;
        out.attrs(attrs)?;
    }

    out.u32(file.arrays.len())?;
    for a in &file.arrays {
        out.array(a)?;
    }
    out.u32(file.tables.len())?;
    for t in &file.tables {
        out.table(t)?;
    }
    out.u32(file.groups.len())?;
    for g in &file.groups {
        out.group(g)?;
    }
    out.u32(file.images.len())?;
    for i in &file.images {
        out.image(i)?;
    }

    out.writer.flush()?;
    tracing::debug!(target: "h4", path = %path.display(), "snapshot written");
    Ok(())
}
