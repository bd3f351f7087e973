//! Group stream: groupings of other objects, reported as member references.

use std::sync::Arc;

use super::{ObjectStream, StreamCore};
use crate::core::{is_reserved, GroupEntry, GroupRecord};
use crate::driver::{Driver, ObjectHandle, ObjectKind};
use crate::util::Result;

/// Stream over the groups of a file.
///
/// Records list members only; member data is read through the stream of
/// the member's kind, e.g. `ArrayStream::seek_ref`.
pub struct GroupStream {
    core: StreamCore,
}

impl GroupStream {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            core: StreamCore::new(driver, ObjectKind::Group),
        }
    }

    /// Create and open in one step.
    pub fn open_path(driver: Arc<dyn Driver>, path: &str) -> Result<Self> {
        let mut s = Self::new(driver);
        s.open(path)?;
        Ok(s)
    }
}

impl ObjectStream for GroupStream {
    type Record = GroupRecord;

    fn core(&self) -> &StreamCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StreamCore {
        &mut self.core
    }

    fn assemble(&mut self, object: ObjectHandle) -> Result<GroupRecord> {
        let driver = self.core.driver();
        let file = self.core.file()?;
        let info = driver.object_info(object)?;

        let mut entries = Vec::new();
        for (tag, reference) in driver.group_entries(object)? {
            let kind = ObjectKind::from_tag(tag);
            let summary = kind.and_then(|k| driver.describe(file, k, reference).ok());
            // internal tables never show up as members
            if kind == Some(ObjectKind::Table)
                && summary
                    .as_ref()
                    .is_some_and(|s| is_reserved(ObjectKind::Table, &s.name, &s.class))
            {
                tracing::trace!(target: "h4", reference, "dropping reserved member");
                continue;
            }
            entries.push(GroupEntry {
                tag,
                reference,
                name: summary.map(|s| s.name).unwrap_or_default(),
            });
        }
        let attrs = self.core.object_attrs(false)?;

        tracing::debug!(target: "h4", name = %info.name, entries = entries.len(), "group extracted");
        Ok(GroupRecord {
            name: info.name,
            class: info.class,
            reference: info.reference,
            attrs,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MemArray, MemDriver, MemField, MemFile, MemGroup, MemTable, TAG_VH};

    #[test]
    fn test_members_and_reserved_tables() {
        let mut f = MemFile::new();
        let a = f.add_array(MemArray::new("temp", &[2], &[1i32, 2]));
        let t = f.add_table(MemTable::new("obs").with_field(MemField::new("v", 1, &[1u8])));
        let hidden = f.add_table(
            MemTable::new("attrs")
                .with_class("Attr0.0")
                .with_field(MemField::new("v", 1, &[1u8])),
        );
        f.add_group(
            MemGroup::new("g")
                .with_class("bundle")
                .with_member(ObjectKind::Array, a)
                .with_member(ObjectKind::Table, t)
                .with_entry(TAG_VH, hidden)
                .with_entry(1, 999),
        );
        let driver = Arc::new(MemDriver::new().with_file("g.hdf", f));
        let mut s = GroupStream::open_path(driver, "g.hdf").unwrap();
        let rec = s.next_record().unwrap().unwrap();
        assert_eq!(rec.class, "bundle");
        assert!(rec.is_valid());
        assert_eq!(rec.entries.len(), 3);
        assert_eq!(rec.entries[0].name, "temp");
        assert_eq!(rec.entries[1].name, "obs");
        assert_eq!(rec.entries[2].tag, 1);
        assert_eq!(rec.entries[2].name, "");
        assert_eq!(rec.members(ObjectKind::Table).count(), 1);
        assert!(s.eos());
    }
}
