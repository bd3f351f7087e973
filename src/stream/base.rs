//! Shared stream state: open file, directory, cursor and attached object.

use std::sync::Arc;

use crate::core::{Attribute, Cursor, Directory, Position};
use crate::driver::{AccessMode, AttrTarget, Driver, FileHandle, ObjectHandle, ObjectKind, Ref};
use crate::util::{Error, Result};

use super::assemble;

/// Positioning machinery common to every stream.
///
/// An object handle is held exactly while the cursor sits on a directory
/// entry. Repositioning attaches the new object before releasing the old
/// one, so a failed attach leaves the stream where it was.
pub struct StreamCore {
    driver: Arc<dyn Driver>,
    kind: ObjectKind,
    path: String,
    file: Option<FileHandle>,
    directory: Directory,
    cursor: Cursor,
    object: Option<ObjectHandle>,
    file_attrs: usize,
    object_attrs: usize,
}

impl StreamCore {
    pub fn new(driver: Arc<dyn Driver>, kind: ObjectKind) -> Self {
        Self {
            driver,
            kind,
            path: String::new(),
            file: None,
            directory: Directory::from_entries(kind, Vec::new()),
            cursor: Cursor::closed(),
            object: None,
            file_attrs: 0,
            object_attrs: 0,
        }
    }

    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    #[inline]
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Path of the open file (empty when closed).
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn file(&self) -> Result<FileHandle> {
        self.file.ok_or(Error::NotOpen)
    }

    /// Attached object, if positioned on one.
    pub fn object(&self) -> Option<ObjectHandle> {
        self.object
    }

    /// Name of the current directory entry, for error context.
    pub fn current_name(&self) -> String {
        self.cursor
            .index()
            .and_then(|i| self.directory.get(i))
            .map(|e| e.name.clone())
            .unwrap_or_default()
    }

    /// Open `path` and scan it. An already open file is closed first.
    pub fn open(&mut self, path: &str) -> Result<()> {
        if self.is_open() {
            self.close();
        }
        let file = self.driver.open_file(path, AccessMode::Read)?;
        let scanned = Directory::scan(self.driver.as_ref(), file, self.kind).and_then(|dir| {
            let attrs = self.driver.file_attr_count(file, self.kind)?;
            Ok((dir, attrs))
        });
        let (directory, file_attrs) = match scanned {
            Ok(v) => v,
            Err(e) => {
                self.driver.close_file(file);
                return Err(e);
            }
        };
        tracing::debug!(target: "h4", kind = %self.kind, path, objects = directory.len(), "stream opened");
        self.path = path.to_string();
        self.file = Some(file);
        self.cursor = Cursor::open(directory.len());
        self.directory = directory;
        self.file_attrs = file_attrs;
        self.object_attrs = 0;
        Ok(())
    }

    /// Release the attached object and the file. Safe to call when closed.
    pub fn close(&mut self) {
        self.release();
        if let Some(file) = self.file.take() {
            self.driver.close_file(file);
            tracing::debug!(target: "h4", kind = %self.kind, path = %self.path, "stream closed");
        }
        self.path.clear();
        self.directory = Directory::from_entries(self.kind, Vec::new());
        self.cursor.close();
        self.file_attrs = 0;
    }

    fn release(&mut self) {
        if let Some(h) = self.object.take() {
            self.driver.detach(h);
        }
        self.object_attrs = 0;
    }

    /// Attach directory entry `index` and commit the position.
    fn attach_at(&mut self, index: usize) -> Result<()> {
        let file = self.file()?;
        self.cursor.check(index)?;
        let reference = self.directory.reference(index).ok_or(Error::RangeError {
            index,
            count: self.directory.len(),
        })?;
        let handle = self.driver.attach(file, self.kind, reference)?;
        let info = match self.driver.object_info(handle) {
            Ok(info) => info,
            Err(e) => {
                self.driver.detach(handle);
                return Err(e);
            }
        };
        self.release();
        self.object = Some(handle);
        self.object_attrs = info.attr_count;
        self.cursor.place(index)?;
        tracing::trace!(target: "h4", kind = %self.kind, index, reference, "attached");
        Ok(())
    }

    pub fn seek(&mut self, index: usize) -> Result<()> {
        self.file()?;
        self.attach_at(index)
    }

    pub fn seek_name(&mut self, name: &str) -> Result<()> {
        self.file()?;
        let index = self.directory.position_of_name(name).ok_or_else(|| Error::NotFound {
            kind: self.kind,
            target: name.to_string(),
        })?;
        self.attach_at(index)
    }

    pub fn seek_ref(&mut self, reference: Ref) -> Result<()> {
        self.file()?;
        let index = self
            .directory
            .position_of_ref(reference)
            .ok_or_else(|| Error::NotFound {
                kind: self.kind,
                target: format!("ref {reference}"),
            })?;
        self.attach_at(index)
    }

    /// Advance one entry, or to EOS past the last one.
    pub fn seek_next(&mut self) -> Result<()> {
        self.file()?;
        match self.cursor.next_index() {
            Some(i) => self.attach_at(i),
            None => {
                self.release();
                self.cursor.place_eos();
                Ok(())
            }
        }
    }

    pub fn rewind(&mut self) -> Result<()> {
        self.file()?;
        self.release();
        self.cursor.rewind();
        Ok(())
    }

    pub fn bos(&self) -> bool {
        self.cursor.bos()
    }

    pub fn eos(&self) -> bool {
        self.cursor.eos()
    }

    pub fn eo_attr(&self) -> bool {
        self.cursor.eo_attr(self.file_attrs, self.object_attrs)
    }

    /// Drain the remaining attributes: file-level at BOS, else the
    /// attached object's. Nothing at EOS.
    pub fn read_attrs(&mut self, trim_nul: bool) -> Result<Vec<Attribute>> {
        let file = self.file()?;
        if self.eo_attr() {
            return Ok(Vec::new());
        }
        let (target, total) = if self.bos() {
            (AttrTarget::File(file, self.kind), self.file_attrs)
        } else {
            match self.object {
                Some(h) => (AttrTarget::Object(h), self.object_attrs),
                None => return Ok(Vec::new()),
            }
        };
        let attrs = assemble::read_attrs(
            self.driver.as_ref(),
            target,
            self.cursor.attr_index()..total,
            trim_nul,
        )?;
        self.cursor.take_attrs(total);
        Ok(attrs)
    }

    /// Every attribute of the attached object, cursor untouched.
    pub fn object_attrs(&self, trim_nul: bool) -> Result<Vec<Attribute>> {
        match self.object {
            Some(h) => assemble::read_attrs(
                self.driver.as_ref(),
                AttrTarget::Object(h),
                0..self.object_attrs,
                trim_nul,
            ),
            None => Ok(Vec::new()),
        }
    }
}

impl Drop for StreamCore {
    fn drop(&mut self) {
        self.close();
    }
}
