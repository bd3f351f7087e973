//! Positioned object streams.
//!
//! Each stream walks the visible objects of one kind in file order:
//!
//! ```text
//! Closed --open--> BOS --read/seek--> At(i) --read/seek_next--> .. --> EOS
//! ```
//!
//! [`ObjectStream::read`] extracts the current object into a record and
//! advances. At BOS it first moves to the first object; at EOS it does
//! nothing and reports `false`. A failed extraction leaves the position
//! untouched.

mod array;
pub mod assemble;
mod base;
mod group;
mod image;
mod table;

pub use array::ArrayStream;
pub use base::StreamCore;
pub use group::GroupStream;
pub use image::ImageStream;
pub use table::TableStream;

use crate::core::{Attribute, Position};
use crate::driver::{ObjectHandle, Ref};
use crate::util::{Error, Result};

/// Stream over one object kind.
pub trait ObjectStream {
    type Record: Default;

    fn core(&self) -> &StreamCore;

    fn core_mut(&mut self) -> &mut StreamCore;

    /// Build the record for the attached object.
    fn assemble(&mut self, object: ObjectHandle) -> Result<Self::Record>;

    /// Called after every change of position.
    fn repositioned(&mut self) {}

    /// Open a file; the stream starts at BOS.
    fn open(&mut self, path: &str) -> Result<()> {
        self.core_mut().open(path)?;
        self.repositioned();
        Ok(())
    }

    fn close(&mut self) {
        self.core_mut().close();
        self.repositioned();
    }

    fn is_open(&self) -> bool {
        self.core().is_open()
    }

    /// Number of visible objects.
    fn len(&self) -> usize {
        self.core().directory().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn position(&self) -> Position {
        self.core().position()
    }

    /// Position on visible object `index` (`RangeError` if out of range).
    fn seek(&mut self, index: usize) -> Result<()> {
        self.core_mut().seek(index)?;
        self.repositioned();
        Ok(())
    }

    /// Position on the first visible object named `name`.
    fn seek_name(&mut self, name: &str) -> Result<()> {
        self.core_mut().seek_name(name)?;
        self.repositioned();
        Ok(())
    }

    fn seek_ref(&mut self, reference: Ref) -> Result<()> {
        self.core_mut().seek_ref(reference)?;
        self.repositioned();
        Ok(())
    }

    fn seek_next(&mut self) -> Result<()> {
        self.core_mut().seek_next()?;
        self.repositioned();
        Ok(())
    }

    fn rewind(&mut self) -> Result<()> {
        self.core_mut().rewind()?;
        self.repositioned();
        Ok(())
    }

    fn bos(&self) -> bool {
        self.core().bos()
    }

    fn eos(&self) -> bool {
        self.core().eos()
    }

    fn eo_attr(&self) -> bool {
        self.core().eo_attr()
    }

    /// Drain the remaining attributes (file-level at BOS).
    fn read_attrs(&mut self) -> Result<Vec<Attribute>> {
        self.core_mut().read_attrs(false)
    }

    /// Extract the current object into `record` and advance.
    ///
    /// Returns `false` without touching `record` at EOS. On error the
    /// record is untouched and the stream stays on the object, except for
    /// `UnknownNumericType`, which skips it.
    fn read(&mut self, record: &mut Self::Record) -> Result<bool> {
        self.core().file()?;
        if self.bos() && !self.eos() {
            self.seek(0)?;
        }
        if self.eos() {
            return Ok(false);
        }
        let object = self.core().object().ok_or(Error::NotOpen)?;
        match self.assemble(object) {
            Ok(r) => *record = r,
            Err(e @ Error::UnknownNumericType { .. }) => {
                tracing::debug!(target: "h4", error = %e, "skipping object");
                self.seek_next()?;
                return Err(e);
            }
            Err(e) => return Err(e),
        }
        self.seek_next()?;
        Ok(true)
    }

    /// Next record, `None` at EOS.
    fn next_record(&mut self) -> Result<Option<Self::Record>> {
        let mut record = Self::Record::default();
        Ok(self.read(&mut record)?.then_some(record))
    }

    /// Every remaining record.
    fn read_all(&mut self) -> Result<Vec<Self::Record>> {
        let mut out = Vec::new();
        while let Some(r) = self.next_record()? {
            out.push(r);
        }
        Ok(out)
    }

    /// Iterator over the remaining records; stops after the first error.
    fn records(&mut self) -> Records<'_, Self>
    where
        Self: Sized,
    {
        Records {
            stream: self,
            done: false,
        }
    }
}

/// Iterator returned by [`ObjectStream::records`].
pub struct Records<'a, S: ObjectStream> {
    stream: &'a mut S,
    done: bool,
}

impl<S: ObjectStream> Iterator for Records<'_, S> {
    type Item = Result<S::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.stream.next_record() {
            Ok(Some(r)) => Some(Ok(r)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
