//! Table stream: record-structured tables with named multi-component fields.

use std::sync::Arc;

use super::assemble::{kind_for, split_components};
use super::{ObjectStream, StreamCore};
use crate::core::{Field, TableRecord};
use crate::driver::{Driver, ObjectHandle, ObjectKind};
use crate::util::{GenVec, Result};

/// Stream over the tables of a file.
pub struct TableStream {
    core: StreamCore,
    /// Inclusive record range for the attached table
    range: Option<(usize, usize)>,
    meta: bool,
}

impl TableStream {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            core: StreamCore::new(driver, ObjectKind::Table),
            range: None,
            meta: false,
        }
    }

    /// Create and open in one step.
    pub fn open_path(driver: Arc<dyn Driver>, path: &str) -> Result<Self> {
        let mut s = Self::new(driver);
        s.open(path)?;
        Ok(s)
    }

    /// Metadata-only mode: fields come back with empty typed components.
    pub fn set_meta(&mut self, on: bool) {
        self.meta = on;
    }

    pub fn is_meta(&self) -> bool {
        self.meta
    }

    /// Limit the next read of the attached table to records `begin..=end`.
    ///
    /// Returns `false`, leaving full reads in place, when no table is
    /// attached, the table is not stored fully interlaced, or the range
    /// does not fit. Any change of position clears the range.
    pub fn set_record_range(&mut self, begin: i64, end: i64) -> bool {
        let Some(object) = self.core.object() else {
            return false;
        };
        let info = match self.core.driver().object_info(object) {
            Ok(info) => info,
            Err(e) => {
                tracing::debug!(target: "h4", error = %e, "record range rejected");
                return false;
            }
        };
        if !info.full_interlace || begin < 0 || end < begin || end as usize >= info.records {
            tracing::debug!(
                target: "h4",
                name = %info.name,
                begin,
                end,
                records = info.records,
                "record range rejected"
            );
            return false;
        }
        self.range = Some((begin as usize, end as usize));
        true
    }

    /// Current record range, if any.
    pub fn record_range(&self) -> Option<(usize, usize)> {
        self.range
    }
}

impl ObjectStream for TableStream {
    type Record = TableRecord;

    fn core(&self) -> &StreamCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StreamCore {
        &mut self.core
    }

    fn assemble(&mut self, object: ObjectHandle) -> Result<TableRecord> {
        let driver = self.core.driver();
        let info = driver.object_info(object)?;
        let (first, records) = match self.range {
            Some((begin, end)) => (begin, end - begin + 1),
            None => (0, info.records),
        };

        let mut fields = Vec::with_capacity(info.field_count);
        for i in 0..info.field_count {
            let fi = driver.field_info(object, i)?;
            let kind = kind_for(fi.type_code, &fi.name)?;
            let components = if self.meta {
                vec![GenVec::empty(kind); fi.order]
            } else {
                let raw = driver.read_field(object, i, first, records)?;
                split_components(kind, &raw, records, fi.order, &info.name)?
            };
            fields.push(Field {
                name: fi.name,
                components,
            });
        }
        let attrs = self.core.object_attrs(false)?;

        tracing::debug!(
            target: "h4",
            name = %info.name,
            fields = fields.len(),
            records,
            "table extracted"
        );
        Ok(TableRecord {
            name: info.name,
            class: info.class,
            reference: info.reference,
            attrs,
            fields,
            records: if self.meta { 0 } else { records },
        })
    }

    fn repositioned(&mut self) {
        self.range = None;
        if !self.core.is_open() {
            self.meta = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Column;
    use crate::driver::{MemDriver, MemField, MemFile, MemTable};
    use crate::util::NumberKind;

    fn stream_over(file: MemFile) -> (Arc<MemDriver>, TableStream) {
        let driver = Arc::new(MemDriver::new().with_file("t.hdf", file));
        let s = TableStream::open_path(driver.clone(), "t.hdf").unwrap();
        (driver, s)
    }

    fn points() -> MemTable {
        MemTable::new("points")
            .with_class("obs")
            .with_field(MemField::new("xy", 2, &[1.0f32, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0]))
            .with_field(MemField::new("id", 1, &[7u16, 8, 9, 10]))
    }

    #[test]
    fn test_fields_split_per_component() {
        let mut f = MemFile::new();
        f.add_table(points());
        let (_d, mut s) = stream_over(f);
        let rec = s.next_record().unwrap().unwrap();
        assert_eq!(rec.class, "obs");
        assert_eq!(rec.records, 4);
        assert!(rec.is_valid());
        let xy = rec.field("xy").unwrap();
        assert_eq!(xy.order(), 2);
        assert_eq!(xy.components[0].export_as::<f32>().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(xy.components[1].export_as::<f64>().unwrap(), vec![10.0, 20.0, 30.0, 40.0]);
        let cols = xy.columns();
        assert_eq!(cols[1].name(), "xy__1");
    }

    #[test]
    fn test_record_range() {
        let mut f = MemFile::new();
        f.add_table(points());
        f.add_table(points().no_interlace());
        let (_d, mut s) = stream_over(f);

        assert!(!s.set_record_range(1, 2), "nothing attached at BOS");
        s.seek(0).unwrap();
        assert!(!s.set_record_range(-1, 2));
        assert!(!s.set_record_range(2, 4));
        assert!(!s.set_record_range(2, 1));
        assert!(s.set_record_range(1, 2));

        let rec = s.next_record().unwrap().unwrap();
        assert_eq!(rec.records, 2);
        let id = rec.field("id").unwrap();
        assert_eq!(id.components[0].export_as::<u32>().unwrap(), vec![8, 9]);

        // advanced onto the second table, range gone
        assert_eq!(s.record_range(), None);
        assert!(!s.set_record_range(0, 1), "not fully interlaced");
        assert_eq!(s.next_record().unwrap().unwrap().records, 4);
    }

    #[test]
    fn test_char_field_collapses() {
        let mut f = MemFile::new();
        f.add_table(MemTable::new("codes").with_field(MemField::text("code", 2, "abcdef")));
        let (_d, mut s) = stream_over(f);
        let rec = s.next_record().unwrap().unwrap();
        let cols = rec.fields[0].columns();
        assert_eq!(cols.len(), 1);
        assert_eq!(
            cols[0],
            Column::Text {
                name: "code__0".into(),
                rows: vec!["ab".into(), "cd".into(), "ef".into()],
            }
        );
    }

    #[test]
    fn test_meta_mode() {
        let mut f = MemFile::new();
        f.add_table(points());
        let (d, mut s) = stream_over(f);
        s.set_meta(true);
        d.fail_reads(true);
        let rec = s.next_record().unwrap().unwrap();
        assert_eq!(rec.fields.len(), 2);
        assert_eq!(rec.fields[0].order(), 2);
        assert_eq!(rec.fields[0].kind(), Some(NumberKind::Float32));
        assert!(rec.fields[0].components.iter().all(GenVec::is_empty));
    }
}
