//! Stream position state machine.
//!
//! [`Cursor`] tracks where a stream is within its directory and how far
//! its attribute sub-cursor has drained. It never touches a driver; the
//! stream layer decides when to attach objects and commits the new
//! position only after the attach succeeded.

use crate::util::{Error, Result};

/// Coarse stream state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    Closed,
    /// Before the first object
    Bos,
    /// On a directory entry
    At(usize),
    /// Past the last object
    Eos,
}

/// Directory position plus attribute sub-cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
    open: bool,
    /// -1 is before-first
    index: i64,
    count: usize,
    attr_index: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::closed()
    }
}

impl Cursor {
    pub const fn closed() -> Self {
        Self {
            open: false,
            index: -1,
            count: 0,
            attr_index: 0,
        }
    }

    /// Fresh cursor at BOS over `count` directory entries.
    pub const fn open(count: usize) -> Self {
        Self {
            open: true,
            index: -1,
            count,
            attr_index: 0,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Number of directory entries.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn position(&self) -> Position {
        if !self.open {
            Position::Closed
        } else if self.index < 0 {
            Position::Bos
        } else if self.index as usize >= self.count {
            Position::Eos
        } else {
            Position::At(self.index as usize)
        }
    }

    /// Current directory index when positioned on an object.
    pub fn index(&self) -> Option<usize> {
        match self.position() {
            Position::At(i) => Some(i),
            _ => None,
        }
    }

    /// An empty directory is both at BOS and at EOS.
    pub fn bos(&self) -> bool {
        self.count == 0 || self.index == -1
    }

    pub fn eos(&self) -> bool {
        self.count == 0 || self.index >= self.count as i64
    }

    /// End of attributes. At BOS the file-level list is the relevant one,
    /// otherwise the attached object's list.
    pub fn eo_attr(&self, file_attrs: usize, object_attrs: usize) -> bool {
        if self.eos() && !self.bos() {
            return true;
        }
        let total = if self.bos() { file_attrs } else { object_attrs };
        self.attr_index >= total
    }

    #[inline]
    pub fn attr_index(&self) -> usize {
        self.attr_index
    }

    /// Drain the attribute cursor up to `total`, returning the indices
    /// still to be read.
    pub fn take_attrs(&mut self, total: usize) -> std::ops::Range<usize> {
        let from = self.attr_index.min(total);
        self.attr_index = self.attr_index.max(total);
        from..total
    }

    /// Back to BOS.
    pub fn rewind(&mut self) {
        self.index = -1;
        self.attr_index = 0;
    }

    /// Check `index` names a directory entry.
    pub fn check(&self, index: usize) -> Result<()> {
        if index >= self.count {
            return Err(Error::RangeError {
                index,
                count: self.count,
            });
        }
        Ok(())
    }

    /// Commit a position on entry `index`.
    pub fn place(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        self.index = index as i64;
        self.attr_index = 0;
        Ok(())
    }

    /// The entry a sequential advance would land on, `None` at the end.
    pub fn next_index(&self) -> Option<usize> {
        let next = (self.index + 1).max(0) as usize;
        (next < self.count).then_some(next)
    }

    /// Move past the last entry.
    pub fn place_eos(&mut self) {
        self.index = self.count as i64;
        self.attr_index = 0;
    }

    pub fn close(&mut self) {
        *self = Self::closed();
    }
}
