//! In-memory driver.
//!
//! Files are assembled with the `Mem*` builders and registered under a
//! path with [`MemDriver::insert`]. Storage is row-major and unstrided;
//! hyperslab reads are cut out with [`slab::gather`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use super::*;
use crate::core::slab;
use crate::util::{Element, Error, NumberKind, Result, Shape};

fn to_bytes<T: Element>(values: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(values).to_vec()
}

// ============================================================================
// Builders
// ============================================================================

/// Attribute stored in a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemAttr {
    pub name: String,
    pub type_code: i32,
    pub count: usize,
    pub data: Vec<u8>,
}

impl MemAttr {
    pub fn new<T: Element>(name: impl Into<String>, values: &[T]) -> Self {
        Self {
            name: name.into(),
            type_code: T::KIND.code(),
            count: values.len(),
            data: to_bytes(values),
        }
    }

    /// char8 attribute.
    pub fn text(name: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            type_code: NumberKind::Char8.code(),
            count: text.len(),
            data: text.as_bytes().to_vec(),
        }
    }

    /// Attribute with an arbitrary type code.
    pub fn raw(name: impl Into<String>, type_code: i32, count: usize, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            type_code,
            count,
            data,
        }
    }
}

/// Per-dimension metadata of an array.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemDim {
    /// `None` reports the default `fakeDim<i>` name
    pub name: Option<String>,
    pub label: String,
    pub unit: String,
    pub format: String,
    /// Scale type code and data
    pub scale: Option<(i32, Vec<u8>)>,
    pub unlimited: bool,
}

impl MemDim {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_scale<T: Element>(mut self, values: &[T]) -> Self {
        self.scale = Some((T::KIND.code(), to_bytes(values)));
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn unlimited(mut self) -> Self {
        self.unlimited = true;
        self
    }
}

/// N-dimensional array, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct MemArray {
    pub reference: Ref,
    pub name: String,
    pub type_code: i32,
    pub dims: Vec<usize>,
    pub data: Vec<u8>,
    pub dimensions: Vec<MemDim>,
    pub attrs: Vec<MemAttr>,
    pub coordinate: bool,
}

impl MemArray {
    pub fn new<T: Element>(name: impl Into<String>, dims: &[usize], data: &[T]) -> Self {
        Self::raw(name, T::KIND.code(), dims, to_bytes(data))
    }

    /// Rank-0 array holding one value.
    pub fn scalar<T: Element>(name: impl Into<String>, value: T) -> Self {
        Self::new(name, &[], &[value])
    }

    pub fn raw(name: impl Into<String>, type_code: i32, dims: &[usize], data: Vec<u8>) -> Self {
        Self {
            reference: 0,
            name: name.into(),
            type_code,
            dims: dims.to_vec(),
            data,
            dimensions: Vec::new(),
            attrs: Vec::new(),
            coordinate: false,
        }
    }

    /// Metadata for the next dimension, in dimension order.
    pub fn with_dim(mut self, dim: MemDim) -> Self {
        self.dimensions.push(dim);
        self
    }

    pub fn with_attr(mut self, attr: MemAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Mark as a stored dimension scale.
    pub fn coordinate(mut self) -> Self {
        self.coordinate = true;
        self
    }

    fn shape(&self) -> Shape {
        Shape::from_slice(&self.dims)
    }

    fn elem_size(&self) -> usize {
        self.data.len() / self.shape().num_points().max(1)
    }
}

/// Table field, `order` components per record, records stored whole.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemField {
    pub name: String,
    pub type_code: i32,
    pub order: usize,
    pub data: Vec<u8>,
}

impl MemField {
    pub fn new<T: Element>(name: impl Into<String>, order: usize, data: &[T]) -> Self {
        Self {
            name: name.into(),
            type_code: T::KIND.code(),
            order,
            data: to_bytes(data),
        }
    }

    /// char8 field; `text` holds `order` characters per record.
    pub fn text(name: impl Into<String>, order: usize, text: &str) -> Self {
        Self {
            name: name.into(),
            type_code: NumberKind::Char8.code(),
            order,
            data: text.as_bytes().to_vec(),
        }
    }

    fn record_size(&self) -> usize {
        let elem = NumberKind::from_code(self.type_code).map_or(1, NumberKind::num_bytes);
        elem * self.order.max(1)
    }

    fn records(&self) -> usize {
        self.data.len() / self.record_size()
    }
}

/// Table of records.
#[derive(Clone, Debug, PartialEq)]
pub struct MemTable {
    pub reference: Ref,
    pub name: String,
    pub class: String,
    pub fields: Vec<MemField>,
    pub attrs: Vec<MemAttr>,
    pub full_interlace: bool,
}

impl MemTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            reference: 0,
            name: name.into(),
            class: String::new(),
            fields: Vec::new(),
            attrs: Vec::new(),
            full_interlace: true,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub fn with_field(mut self, field: MemField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_attr(mut self, attr: MemAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Store fields non-interlaced (no direct row-range reads).
    pub fn no_interlace(mut self) -> Self {
        self.full_interlace = false;
        self
    }

    pub fn records(&self) -> usize {
        self.fields.first().map_or(0, MemField::records)
    }
}

/// Group of `(tag, ref)` members.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemGroup {
    pub reference: Ref,
    pub name: String,
    pub class: String,
    pub entries: Vec<(Tag, Ref)>,
    pub attrs: Vec<MemAttr>,
}

impl MemGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub fn with_entry(mut self, tag: Tag, reference: Ref) -> Self {
        self.entries.push((tag, reference));
        self
    }

    pub fn with_member(self, kind: ObjectKind, reference: Ref) -> Self {
        self.with_entry(kind.tag(), reference)
    }

    pub fn with_attr(mut self, attr: MemAttr) -> Self {
        self.attrs.push(attr);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemPalette {
    pub name: String,
    pub type_code: i32,
    pub components: usize,
    pub data: Vec<u8>,
}

impl MemPalette {
    pub fn new<T: Element>(name: impl Into<String>, components: usize, data: &[T]) -> Self {
        Self {
            name: name.into(),
            type_code: T::KIND.code(),
            components,
            data: to_bytes(data),
        }
    }

    fn entries(&self) -> usize {
        let elem = NumberKind::from_code(self.type_code).map_or(1, NumberKind::num_bytes);
        self.data.len() / (elem * self.components.max(1))
    }
}

/// Raster image, stored pixel-interlaced `[y][x][component]`.
#[derive(Clone, Debug, PartialEq)]
pub struct MemImage {
    pub reference: Ref,
    pub name: String,
    pub type_code: i32,
    pub height: usize,
    pub width: usize,
    pub components: usize,
    pub data: Vec<u8>,
    /// Interlace reported as the stored one
    pub interlace: Interlace,
    pub palettes: Vec<MemPalette>,
    pub attrs: Vec<MemAttr>,
}

impl MemImage {
    pub fn new<T: Element>(
        name: impl Into<String>,
        height: usize,
        width: usize,
        components: usize,
        data: &[T],
    ) -> Self {
        Self {
            reference: 0,
            name: name.into(),
            type_code: T::KIND.code(),
            height,
            width,
            components,
            data: to_bytes(data),
            interlace: Interlace::Pixel,
            palettes: Vec::new(),
            attrs: Vec::new(),
        }
    }

    pub fn with_interlace(mut self, interlace: Interlace) -> Self {
        self.interlace = interlace;
        self
    }

    pub fn with_palette(mut self, palette: MemPalette) -> Self {
        self.palettes.push(palette);
        self
    }

    pub fn with_attr(mut self, attr: MemAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    fn elem_size(&self) -> usize {
        self.data.len() / (self.height * self.width * self.components).max(1)
    }
}

/// Contents of one file. Objects of each kind keep insertion order;
/// references come from one counter shared by all kinds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemFile {
    pub arrays: Vec<MemArray>,
    pub tables: Vec<MemTable>,
    pub groups: Vec<MemGroup>,
    pub images: Vec<MemImage>,
    pub file_attrs: BTreeMap<ObjectKind, Vec<MemAttr>>,
    pub next_ref: Ref,
}

impl MemFile {
    pub fn new() -> Self {
        Self {
            next_ref: 2,
            ..Default::default()
        }
    }

    fn alloc_ref(&mut self) -> Ref {
        let r = self.next_ref.max(1);
        self.next_ref = r + 1;
        r
    }

    pub fn add_array(&mut self, mut array: MemArray) -> Ref {
        let r = self.alloc_ref();
        array.reference = r;
        self.arrays.push(array);
        r
    }

    pub fn add_table(&mut self, mut table: MemTable) -> Ref {
        let r = self.alloc_ref();
        table.reference = r;
        self.tables.push(table);
        r
    }

    pub fn add_group(&mut self, mut group: MemGroup) -> Ref {
        let r = self.alloc_ref();
        group.reference = r;
        self.groups.push(group);
        r
    }

    pub fn add_image(&mut self, mut image: MemImage) -> Ref {
        let r = self.alloc_ref();
        image.reference = r;
        self.images.push(image);
        r
    }

    /// File-level attribute of one interface.
    pub fn add_file_attr(&mut self, kind: ObjectKind, attr: MemAttr) {
        self.file_attrs.entry(kind).or_default().push(attr);
    }

    pub fn array(&self, reference: Ref) -> Option<&MemArray> {
        self.arrays.iter().find(|a| a.reference == reference)
    }

    pub fn table(&self, reference: Ref) -> Option<&MemTable> {
        self.tables.iter().find(|t| t.reference == reference)
    }

    pub fn group(&self, reference: Ref) -> Option<&MemGroup> {
        self.groups.iter().find(|g| g.reference == reference)
    }

    pub fn image(&self, reference: Ref) -> Option<&MemImage> {
        self.images.iter().find(|i| i.reference == reference)
    }

    pub fn refs(&self, kind: ObjectKind) -> Vec<Ref> {
        match kind {
            ObjectKind::Array => self.arrays.iter().map(|o| o.reference).collect(),
            ObjectKind::Table => self.tables.iter().map(|o| o.reference).collect(),
            ObjectKind::Group => self.groups.iter().map(|o| o.reference).collect(),
            ObjectKind::Image => self.images.iter().map(|o| o.reference).collect(),
        }
    }

    fn summary(&self, kind: ObjectKind, reference: Ref) -> Option<ObjectSummary> {
        let (name, class, coordinate) = match kind {
            ObjectKind::Array => self
                .array(reference)
                .map(|a| (a.name.clone(), String::new(), a.coordinate))?,
            ObjectKind::Table => self
                .table(reference)
                .map(|t| (t.name.clone(), t.class.clone(), false))?,
            ObjectKind::Group => self
                .group(reference)
                .map(|g| (g.name.clone(), g.class.clone(), false))?,
            ObjectKind::Image => self
                .image(reference)
                .map(|i| (i.name.clone(), String::new(), false))?,
        };
        Some(ObjectSummary {
            name,
            class,
            coordinate,
        })
    }

    fn attrs(&self, kind: ObjectKind, reference: Ref) -> Option<&[MemAttr]> {
        match kind {
            ObjectKind::Array => self.array(reference).map(|o| o.attrs.as_slice()),
            ObjectKind::Table => self.table(reference).map(|o| o.attrs.as_slice()),
            ObjectKind::Group => self.group(reference).map(|o| o.attrs.as_slice()),
            ObjectKind::Image => self.image(reference).map(|o| o.attrs.as_slice()),
        }
    }
}

// ============================================================================
// Driver
// ============================================================================

#[derive(Clone)]
struct Attached {
    file: Arc<MemFile>,
    kind: ObjectKind,
    reference: Ref,
}

#[derive(Default)]
struct State {
    files: HashMap<String, Arc<MemFile>>,
    open: HashMap<u32, Arc<MemFile>>,
    attached: HashMap<u32, Attached>,
    next_handle: u32,
    fail_reads: bool,
}

impl State {
    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Driver over files held in memory.
#[derive(Default)]
pub struct MemDriver {
    state: RwLock<State>,
}

impl MemDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the file at `path`.
    pub fn insert(&self, path: impl Into<String>, file: MemFile) {
        self.state.write().files.insert(path.into(), Arc::new(file));
    }

    pub fn with_file(self, path: impl Into<String>, file: MemFile) -> Self {
        self.insert(path, file);
        self
    }

    pub fn contains(&self, path: &str) -> bool {
        self.state.read().files.contains_key(path)
    }

    /// Make every bulk data read fail with `ReadError`.
    pub fn fail_reads(&self, on: bool) {
        self.state.write().fail_reads = on;
    }

    /// Objects currently attached.
    pub fn attached_count(&self) -> usize {
        self.state.read().attached.len()
    }

    /// Files currently open.
    pub fn open_count(&self) -> usize {
        self.state.read().open.len()
    }

    fn file(&self, file: FileHandle) -> Result<Arc<MemFile>> {
        self.state
            .read()
            .open
            .get(&file.0)
            .cloned()
            .ok_or_else(|| Error::open(format!("file handle {}", file.0), "not open"))
    }

    fn attached(&self, object: ObjectHandle) -> Result<Attached> {
        self.state
            .read()
            .attached
            .get(&object.0)
            .cloned()
            .ok_or_else(|| Error::open(format!("object handle {}", object.0), "not attached"))
    }

    fn check_reads(&self, what: &str) -> Result<()> {
        if self.state.read().fail_reads {
            return Err(Error::read(what, "injected read failure"));
        }
        Ok(())
    }

    fn array(&self, object: ObjectHandle) -> Result<(Arc<MemFile>, usize)> {
        let a = self.attached(object)?;
        let idx = (a.kind == ObjectKind::Array)
            .then(|| a.file.arrays.iter().position(|o| o.reference == a.reference))
            .flatten()
            .ok_or_else(|| Error::read(format!("object handle {}", object.0), "not an array"))?;
        Ok((a.file, idx))
    }

    fn table(&self, object: ObjectHandle) -> Result<(Arc<MemFile>, usize)> {
        let a = self.attached(object)?;
        let idx = (a.kind == ObjectKind::Table)
            .then(|| a.file.tables.iter().position(|o| o.reference == a.reference))
            .flatten()
            .ok_or_else(|| Error::read(format!("object handle {}", object.0), "not a table"))?;
        Ok((a.file, idx))
    }

    fn image(&self, object: ObjectHandle) -> Result<(Arc<MemFile>, usize)> {
        let a = self.attached(object)?;
        let idx = (a.kind == ObjectKind::Image)
            .then(|| a.file.images.iter().position(|o| o.reference == a.reference))
            .flatten()
            .ok_or_else(|| Error::read(format!("object handle {}", object.0), "not an image"))?;
        Ok((a.file, idx))
    }

    fn attr(&self, target: AttrTarget, index: usize) -> Result<MemAttr> {
        let (attr, owner) = match target {
            AttrTarget::File(fh, kind) => {
                let file = self.file(fh)?;
                let attr = file.file_attrs.get(&kind).and_then(|l| l.get(index)).cloned();
                (attr, format!("{kind} file attributes"))
            }
            AttrTarget::Object(oh) => {
                let a = self.attached(oh)?;
                let attr = a
                    .file
                    .attrs(a.kind, a.reference)
                    .and_then(|l| l.get(index))
                    .cloned();
                (attr, format!("{} {}", a.kind, a.reference))
            }
        };
        attr.ok_or_else(|| Error::read(owner, format!("no attribute {index}")))
    }
}

/// Reorder a pixel-interlaced block into `interlace` order.
fn reorder(pixel: &[u8], rows: usize, cols: usize, comps: usize, size: usize, il: Interlace) -> Vec<u8> {
    if il == Interlace::Pixel || comps <= 1 {
        return pixel.to_vec();
    }
    let mut out = Vec::with_capacity(pixel.len());
    let mut push = |y: usize, x: usize, c: usize| {
        let at = ((y * cols + x) * comps + c) * size;
        out.extend_from_slice(&pixel[at..at + size]);
    };
    match il {
        Interlace::Line => {
            for y in 0..rows {
                for c in 0..comps {
                    for x in 0..cols {
                        push(y, x, c);
                    }
                }
            }
        }
        Interlace::Component => {
            for c in 0..comps {
                for y in 0..rows {
                    for x in 0..cols {
                        push(y, x, c);
                    }
                }
            }
        }
        Interlace::Pixel => {}
    }
    out
}

impl Driver for MemDriver {
    fn open_file(&self, path: &str, _mode: AccessMode) -> Result<FileHandle> {
        let mut state = self.state.write();
        let file = state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::open(path, "no such file"))?;
        let h = state.handle();
        state.open.insert(h, file);
        tracing::trace!(target: "h4", path, handle = h, "file opened");
        Ok(FileHandle(h))
    }

    fn close_file(&self, file: FileHandle) {
        self.state.write().open.remove(&file.0);
    }

    fn enumerate(&self, file: FileHandle, kind: ObjectKind) -> Result<Vec<Ref>> {
        Ok(self.file(file)?.refs(kind))
    }

    fn describe(&self, file: FileHandle, kind: ObjectKind, reference: Ref) -> Result<ObjectSummary> {
        self.file(file)?
            .summary(kind, reference)
            .ok_or_else(|| Error::open(format!("{kind} {reference}"), "no such object"))
    }

    fn attach(&self, file: FileHandle, kind: ObjectKind, reference: Ref) -> Result<ObjectHandle> {
        let f = self.file(file)?;
        if f.summary(kind, reference).is_none() {
            return Err(Error::open(format!("{kind} {reference}"), "no such object"));
        }
        let mut state = self.state.write();
        let h = state.handle();
        state.attached.insert(
            h,
            Attached {
                file: f,
                kind,
                reference,
            },
        );
        Ok(ObjectHandle(h))
    }

    fn detach(&self, object: ObjectHandle) {
        self.state.write().attached.remove(&object.0);
    }

    fn object_info(&self, object: ObjectHandle) -> Result<ObjectInfo> {
        let a = self.attached(object)?;
        let missing = || Error::open(format!("{} {}", a.kind, a.reference), "no such object");
        let info = match a.kind {
            ObjectKind::Array => {
                let o = a.file.array(a.reference).ok_or_else(missing)?;
                ObjectInfo {
                    name: o.name.clone(),
                    reference: o.reference,
                    dims: o.dims.clone(),
                    type_code: o.type_code,
                    attr_count: o.attrs.len(),
                    ..Default::default()
                }
            }
            ObjectKind::Table => {
                let o = a.file.table(a.reference).ok_or_else(missing)?;
                ObjectInfo {
                    name: o.name.clone(),
                    class: o.class.clone(),
                    reference: o.reference,
                    attr_count: o.attrs.len(),
                    field_count: o.fields.len(),
                    records: o.records(),
                    full_interlace: o.full_interlace,
                    ..Default::default()
                }
            }
            ObjectKind::Group => {
                let o = a.file.group(a.reference).ok_or_else(missing)?;
                ObjectInfo {
                    name: o.name.clone(),
                    class: o.class.clone(),
                    reference: o.reference,
                    attr_count: o.attrs.len(),
                    entry_count: o.entries.len(),
                    ..Default::default()
                }
            }
            ObjectKind::Image => {
                let o = a.file.image(a.reference).ok_or_else(missing)?;
                ObjectInfo {
                    name: o.name.clone(),
                    reference: o.reference,
                    dims: vec![o.height, o.width],
                    type_code: o.type_code,
                    attr_count: o.attrs.len(),
                    components: o.components,
                    interlace: o.interlace,
                    palette_count: o.palettes.len(),
                    ..Default::default()
                }
            }
        };
        Ok(info)
    }

    fn read_raw(
        &self,
        object: ObjectHandle,
        start: &[usize],
        stride: &[usize],
        edge: &[usize],
    ) -> Result<Vec<u8>> {
        let (file, idx) = self.array(object)?;
        let a = &file.arrays[idx];
        self.check_reads(&a.name)?;
        if a.dims.is_empty() {
            return Ok(a.data.clone());
        }
        slab::gather(&a.shape(), a.elem_size(), &a.data, start, stride, edge)
    }

    fn dim_info(&self, object: ObjectHandle, index: usize) -> Result<DimInfo> {
        let (file, idx) = self.array(object)?;
        let a = &file.arrays[idx];
        let size = *a
            .dims
            .get(index)
            .ok_or_else(|| Error::read(&a.name, format!("no dimension {index}")))?;
        let meta = a.dimensions.get(index).cloned().unwrap_or_default();
        Ok(DimInfo {
            name: meta.name.unwrap_or_else(|| format!("fakeDim{index}")),
            count: if meta.unlimited { 0 } else { size },
            type_code: meta.scale.as_ref().map_or(0, |(code, _)| *code),
            label: meta.label,
            unit: meta.unit,
            format: meta.format,
        })
    }

    fn read_dim_scale(&self, object: ObjectHandle, index: usize) -> Result<Vec<u8>> {
        let (file, idx) = self.array(object)?;
        let a = &file.arrays[idx];
        a.dimensions
            .get(index)
            .and_then(|d| d.scale.as_ref())
            .map(|(_, data)| data.clone())
            .ok_or_else(|| Error::read(&a.name, format!("dimension {index} has no scale")))
    }

    fn field_info(&self, object: ObjectHandle, index: usize) -> Result<FieldInfo> {
        let (file, idx) = self.table(object)?;
        let t = &file.tables[idx];
        let f = t
            .fields
            .get(index)
            .ok_or_else(|| Error::read(&t.name, format!("no field {index}")))?;
        Ok(FieldInfo {
            name: f.name.clone(),
            type_code: f.type_code,
            order: f.order,
        })
    }

    fn read_field(
        &self,
        object: ObjectHandle,
        index: usize,
        first_record: usize,
        records: usize,
    ) -> Result<Vec<u8>> {
        let (file, idx) = self.table(object)?;
        let t = &file.tables[idx];
        self.check_reads(&t.name)?;
        let f = t
            .fields
            .get(index)
            .ok_or_else(|| Error::read(&t.name, format!("no field {index}")))?;
        if first_record + records > f.records() {
            return Err(Error::read(
                &t.name,
                format!(
                    "records {}..{} outside {} records",
                    first_record,
                    first_record + records,
                    f.records()
                ),
            ));
        }
        let rs = f.record_size();
        Ok(f.data[first_record * rs..(first_record + records) * rs].to_vec())
    }

    fn group_entries(&self, object: ObjectHandle) -> Result<Vec<(Tag, Ref)>> {
        let a = self.attached(object)?;
        a.file
            .group(a.reference)
            .filter(|_| a.kind == ObjectKind::Group)
            .map(|g| g.entries.clone())
            .ok_or_else(|| Error::read(format!("object handle {}", object.0), "not a group"))
    }

    fn read_image(
        &self,
        object: ObjectHandle,
        start: &[usize],
        stride: &[usize],
        edge: &[usize],
        interlace: Interlace,
    ) -> Result<Vec<u8>> {
        let (file, idx) = self.image(object)?;
        let img = &file.images[idx];
        self.check_reads(&img.name)?;
        if start.len() != 2 || stride.len() != 2 || edge.len() != 2 {
            return Err(Error::slab("image selection must be [y, x]"));
        }
        let shape = Shape::from_slice(&[img.height, img.width, img.components]);
        let pixel = slab::gather(
            &shape,
            img.elem_size(),
            &img.data,
            &[start[0], start[1], 0],
            &[stride[0], stride[1], 1],
            &[edge[0], edge[1], img.components],
        )?;
        Ok(reorder(&pixel, edge[0], edge[1], img.components, img.elem_size(), interlace))
    }

    fn palette_info(&self, object: ObjectHandle, index: usize) -> Result<PaletteInfo> {
        let (file, idx) = self.image(object)?;
        let img = &file.images[idx];
        let p = img
            .palettes
            .get(index)
            .ok_or_else(|| Error::read(&img.name, format!("no palette {index}")))?;
        Ok(PaletteInfo {
            name: p.name.clone(),
            type_code: p.type_code,
            components: p.components,
            entries: p.entries(),
        })
    }

    fn read_palette(&self, object: ObjectHandle, index: usize) -> Result<Vec<u8>> {
        let (file, idx) = self.image(object)?;
        let img = &file.images[idx];
        img.palettes
            .get(index)
            .map(|p| p.data.clone())
            .ok_or_else(|| Error::read(&img.name, format!("no palette {index}")))
    }

    fn file_attr_count(&self, file: FileHandle, kind: ObjectKind) -> Result<usize> {
        Ok(self.file(file)?.file_attrs.get(&kind).map_or(0, Vec::len))
    }

    fn attr_info(&self, target: AttrTarget, index: usize) -> Result<AttrInfo> {
        let attr = self.attr(target, index)?;
        Ok(AttrInfo {
            name: attr.name,
            type_code: attr.type_code,
            count: attr.count,
        })
    }

    fn read_attr_raw(&self, target: AttrTarget, index: usize) -> Result<Vec<u8>> {
        Ok(self.attr(target, index)?.data)
    }
}
