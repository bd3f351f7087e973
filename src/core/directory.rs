//! Object directory - the visible objects of one kind in an open file.
//!
//! The file format creates bookkeeping objects of its own (attribute
//! tables, dimension placeholders, chunk tables). They are recognised by
//! exact name or class match against constant per-kind tables and never
//! make it into a [`Directory`], so stream positions are contiguous over
//! user objects only.

use crate::driver::{Driver, FileHandle, ObjectKind, Ref};
use crate::util::Result;

/// Names and classes of internal objects of one kind.
#[derive(Clone, Copy, Debug)]
pub struct ReservedSet {
    pub names: &'static [&'static str],
    pub classes: &'static [&'static str],
}

impl ReservedSet {
    pub fn contains(&self, name: &str, class: &str) -> bool {
        self.names.contains(&name) || self.classes.contains(&class)
    }
}

pub const TABLE_RESERVED: ReservedSet = ReservedSet {
    names: &["RIATTR0.0N"],
    classes: &["Attr0.0", "RIATTR0.0C", "DimVal0.0", "DimVal0.1", "_HDF_CHK_TBL_0"],
};

pub const GROUP_RESERVED: ReservedSet = ReservedSet {
    names: &["RIATTR0.0N", "RIG0.0"],
    classes: &[
        "Attr0.0",
        "RIATTR0.0C",
        "DimVal0.0",
        "DimVal0.1",
        "CDF0.0",
        "Var0.0",
        "Dim0.0",
        "UDim0.0",
        "Data0.0",
        "RI0.0",
    ],
};

pub const NO_RESERVED: ReservedSet = ReservedSet {
    names: &[],
    classes: &[],
};

pub fn reserved_set(kind: ObjectKind) -> &'static ReservedSet {
    match kind {
        ObjectKind::Table => &TABLE_RESERVED,
        ObjectKind::Group => &GROUP_RESERVED,
        ObjectKind::Array | ObjectKind::Image => &NO_RESERVED,
    }
}

/// True when an object of `kind` with this name/class is format-internal.
pub fn is_reserved(kind: ObjectKind, name: &str, class: &str) -> bool {
    reserved_set(kind).contains(name, class)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    pub reference: Ref,
    pub name: String,
}

/// Ordered visible objects of one kind. Index `i` is stream position `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directory {
    kind: ObjectKind,
    entries: Vec<DirEntry>,
}

impl Directory {
    /// Enumerate `kind` objects in file order, dropping internal ones and
    /// (for arrays) coordinate variables.
    pub fn scan<D: Driver + ?Sized>(driver: &D, file: FileHandle, kind: ObjectKind) -> Result<Self> {
        let refs = driver.enumerate(file, kind)?;
        let mut entries = Vec::with_capacity(refs.len());
        for reference in refs {
            let summary = driver.describe(file, kind, reference)?;
            if is_reserved(kind, &summary.name, &summary.class) {
                tracing::trace!(target: "h4", %kind, reference, name = %summary.name, "skipping internal object");
                continue;
            }
            if kind == ObjectKind::Array && summary.coordinate {
                tracing::trace!(target: "h4", reference, name = %summary.name, "skipping coordinate variable");
                continue;
            }
            entries.push(DirEntry {
                reference,
                name: summary.name,
            });
        }
        tracing::debug!(target: "h4", %kind, count = entries.len(), "directory scanned");
        Ok(Self { kind, entries })
    }

    pub fn from_entries(kind: ObjectKind, entries: Vec<DirEntry>) -> Self {
        Self { kind, entries }
    }

    #[inline]
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DirEntry> {
        self.entries.get(index)
    }

    pub fn reference(&self, index: usize) -> Option<Ref> {
        self.entries.get(index).map(|e| e.reference)
    }

    pub fn position_of_ref(&self, reference: Ref) -> Option<usize> {
        self.entries.iter().position(|e| e.reference == reference)
    }

    /// First entry with this name.
    pub fn position_of_name(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DirEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_tables() {
        assert!(is_reserved(ObjectKind::Table, "RIATTR0.0N", ""));
        assert!(is_reserved(ObjectKind::Table, "x", "_HDF_CHK_TBL_0"));
        assert!(is_reserved(ObjectKind::Table, "x", "DimVal0.1"));
        assert!(!is_reserved(ObjectKind::Table, "x", "CDF0.0"));
        assert!(!is_reserved(ObjectKind::Table, "RIATTR0.0", ""));

        assert!(is_reserved(ObjectKind::Group, "RIG0.0", ""));
        assert!(is_reserved(ObjectKind::Group, "g", "Var0.0"));
        assert!(is_reserved(ObjectKind::Group, "g", "RI0.0"));
        assert!(!is_reserved(ObjectKind::Group, "g", "_HDF_CHK_TBL_0"));

        assert!(!is_reserved(ObjectKind::Array, "RIATTR0.0N", "Attr0.0"));
        assert!(!is_reserved(ObjectKind::Image, "RIG0.0", "RI0.0"));
    }

    #[test]
    fn test_lookup() {
        let dir = Directory::from_entries(
            ObjectKind::Table,
            vec![
                DirEntry { reference: 4, name: "a".into() },
                DirEntry { reference: 9, name: "b".into() },
                DirEntry { reference: 2, name: "a".into() },
            ],
        );
        assert_eq!(dir.len(), 3);
        assert_eq!(dir.position_of_ref(9), Some(1));
        assert_eq!(dir.position_of_ref(7), None);
        assert_eq!(dir.position_of_name("a"), Some(0));
        assert_eq!(dir.position_of_name("c"), None);
        assert_eq!(dir.reference(2), Some(2));
        assert_eq!(dir.reference(3), None);
    }
}
