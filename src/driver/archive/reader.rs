//! Snapshot reader.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;

use super::format::*;
use crate::driver::{
    Interlace, MemArray, MemAttr, MemDim, MemField, MemFile, MemGroup, MemImage, MemPalette,
    MemTable,
};
use crate::util::{Error, Result};

/// Bytes of a snapshot file.
enum Source {
    /// Memory-mapped file
    Mmap(Mmap),
    /// Whole file read into memory
    Buffer(Vec<u8>),
}

impl Source {
    fn open(path: &Path, use_mmap: bool) -> Result<Self> {
        let mut file = File::open(path)?;
        let size = file.metadata()?.len();
        if use_mmap && cfg!(feature = "mmap") && size > 0 {
            // Safety: mapped read-only; the snapshot is parsed into owned data before returning
            let mmap = unsafe { Mmap::map(&file) }?;
            return Ok(Self::Mmap(mmap));
        }
        let mut buf = Vec::with_capacity(size as usize);
        file.read_to_end(&mut buf)?;
        Ok(Self::Buffer(buf))
    }

    fn bytes(&self) -> &[u8] {
        match self {
            Self::Mmap(m) => &m[..],
            Self::Buffer(b) => b.as_slice(),
        }
    }
}

/// Sequential little-endian input over a byte slice.
struct IStream<'a> {
    cur: Cursor<&'a [u8]>,
}

fn truncated(e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::invalid("truncated snapshot")
    } else {
        Error::Io(e)
    }
}

impl<'a> IStream<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            cur: Cursor::new(data),
        }
    }

    fn remaining(&self) -> usize {
        let len = self.cur.get_ref().len() as u64;
        len.saturating_sub(self.cur.position()) as usize
    }

    fn u8(&mut self) -> Result<u8> {
        self.cur.read_u8().map_err(truncated)
    }

    fn u16(&mut self) -> Result<u16> {
        self.cur.read_u16::<LittleEndian>().map_err(truncated)
    }

    fn u32(&mut self) -> Result<usize> {
        Ok(self.cur.read_u32::<LittleEndian>().map_err(truncated)? as usize)
    }

    fn u64(&mut self) -> Result<usize> {
        Ok(self.cur.read_u64::<LittleEndian>().map_err(truncated)? as usize)
    }

    fn i32(&mut self) -> Result<i32> {
        self.cur.read_i32::<LittleEndian>().map_err(truncated)
    }

    fn flag(&mut self) -> Result<bool> {
        Ok(self.u8()? != 0)
    }

    fn take(&mut self, len: usize) -> Result<Vec<u8>> {
        if len > self.remaining() {
            return Err(Error::invalid(format!(
                "length {} exceeds the {} bytes left",
                len,
                self.remaining()
            )));
        }
        let mut buf = vec![0u8; len];
        self.cur.read_exact(&mut buf).map_err(truncated)?;
        Ok(buf)
    }

    /// Element count prefix, bounded by what is left in the buffer.
    fn count(&mut self) -> Result<usize> {
        let n = self.u32()?;
        if n > self.remaining() {
            return Err(Error::invalid(format!("count {} exceeds snapshot size", n)));
        }
        Ok(n)
    }

    fn str(&mut self) -> Result<String> {
        let len = self.u32()?;
        String::from_utf8(self.take(len)?).map_err(|_| Error::invalid("string is not UTF-8"))
    }

    fn blob(&mut self, type_code: i32) -> Result<Vec<u8>> {
        let len = self.u64()?;
        let mut data = self.take(len)?;
        swap_le(&mut data, elem_size(type_code));
        Ok(data)
    }

    fn attrs(&mut self) -> Result<Vec<MemAttr>> {
        let n = self.count()?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let name = self.str()?;
            let type_code = self.i32()?;
            let count = self.u64()?;
            let data = self.blob(type_code)?;
            out.push(MemAttr::raw(name, type_code, count, data));
        }
        Ok(out)
    }

    fn array(&mut self) -> Result<MemArray> {
        let reference = self.i32()?;
        let name = self.str()?;
        let type_code = self.i32()?;
        let rank = self.count()?;
        let dims = (0..rank).map(|_| self.u64()).collect::<Result<Vec<_>>>()?;
        let data = self.blob(type_code)?;
        let mut a = MemArray::raw(name, type_code, &dims, data);
        a.reference = reference;
        a.coordinate = self.flag()?;

        let ndims = self.count()?;
        for _ in 0..ndims {
            let has_name = self.flag()?;
            let dim_name = self.str()?;
            let mut d = MemDim {
                name: has_name.then_some(dim_name),
                label: self.str()?,
                unit: self.str()?,
                format: self.str()?,
                unlimited: self.flag()?,
                scale: None,
            };
            if self.flag()? {
                let code = self.i32()?;
                d.scale = Some((code, self.blob(code)?));
            }
            a.dimensions.push(d);
        }
        a.attrs = self.attrs()?;
        Ok(a)
    }

    fn table(&mut self) -> Result<MemTable> {
        let reference = self.i32()?;
        let mut t = MemTable::new(self.str()?).with_class(self.str()?);
        t.reference = reference;
        t.full_interlace = self.flag()?;
        let n = self.count()?;
        for _ in 0..n {
            let name = self.str()?;
            let type_code = self.i32()?;
            let order = self.u32()?;
            let data = self.blob(type_code)?;
            t.fields.push(MemField {
                name,
                type_code,
                order,
                data,
            });
        }
        t.attrs = self.attrs()?;
        Ok(t)
    }

    fn group(&mut self) -> Result<MemGroup> {
        let reference = self.i32()?;
        let mut g = MemGroup::new(self.str()?).with_class(self.str()?);
        g.reference = reference;
        let n = self.count()?;
        for _ in 0..n {
            let tag = self.i32()?;
            let r = self.i32()?;
            g.entries.push((tag, r));
        }
        g.attrs = self.attrs()?;
        Ok(g)
    }

    fn image(&mut self) -> Result<MemImage> {
        let reference = self.i32()?;
        let name = self.str()?;
        let type_code = self.i32()?;
        let height = self.u64()?;
        let width = self.u64()?;
        let components = self.u32()?;
        let il = self.u8()?;
        let interlace =
            Interlace::from_code(il).ok_or_else(|| Error::invalid(format!("interlace code {il}")))?;
        let data = self.blob(type_code)?;
        let mut palettes = Vec::new();
        let n = self.count()?;
        for _ in 0..n {
            let name = self.str()?;
            let type_code = self.i32()?;
            let components = self.u32()?;
            let data = self.blob(type_code)?;
            palettes.push(MemPalette {
                name,
                type_code,
                components,
                data,
            });
        }
        let attrs = self.attrs()?;
        Ok(MemImage {
            reference,
            name,
            type_code,
            height,
            width,
            components,
            data,
            interlace,
            palettes,
            attrs,
        })
    }
}

/// Parse a snapshot held in memory.
pub fn parse_snapshot(data: &[u8]) -> Result<MemFile> {
    if data.len() < HEADER_SIZE {
        return Err(Error::invalid("file too small for a snapshot header"));
    }
    if &data[..SNAPSHOT_MAGIC.len()] != SNAPSHOT_MAGIC {
        return Err(Error::invalid("bad snapshot magic"));
    }

    let mut s = IStream::new(&data[SNAPSHOT_MAGIC.len()..]);
    let version = s.u16()?;
    if version != CURRENT_VERSION {
        return Err(Error::invalid(format!("unsupported snapshot version {version}")));
    }
    let mut file = MemFile::new();
    file.next_ref = s.i32()?;

    let nkinds = s.count()?;
    for _ in 0..nkinds {
        let code = s.u8()?;
        let kind =
            kind_from_code(code).ok_or_else(|| Error::invalid(format!("object kind code {code}")))?;
        let attrs = s.attrs()?;
        file.file_attrs.insert(kind, attrs);
    }

    let n = s.count()?;
    for _ in 0..n {
        let a = s.array()?;
        file.arrays.push(a);
    }
    let n = s.count()?;
    for _ in 0..n {
        let t = s.table()?;
        file.tables.push(t);
    }
    let n = s.count()?;
    for _ in 0..n {
        let g = s.group()?;
        file.groups.push(g);
    }
    let n = s.count()?;
    for _ in 0..n {
        let i = s.image()?;
        file.images.push(i);
    }
    Ok(file)
}

/// Load a snapshot from disk, memory-mapped when the `mmap` feature is on.
pub fn read_snapshot(path: impl AsRef<Path>) -> Result<MemFile> {
    read_snapshot_opts(path, true)
}

/// Load a snapshot with optional memory mapping.
pub fn read_snapshot_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<MemFile> {
    let path = path.as_ref();
    let source = Source::open(path, use_mmap)?;
    let file = parse_snapshot(source.bytes())?;
    tracing::debug!(
        target: "h4",
        path = %path.display(),
        mmap = matches!(source, Source::Mmap(_)),
        arrays = file.arrays.len(),
        tables = file.tables.len(),
        groups = file.groups.len(),
        images = file.images.len(),
        "snapshot loaded"
    );
    Ok(file)
}
