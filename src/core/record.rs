//! Record types produced by the streams.
//!
//! Records are plain values: each read hands the caller a fresh copy and
//! the stream keeps nothing.

use crate::driver::{Interlace, ObjectKind, Ref, Tag};
use crate::util::{GenVec, NumberKind};

/// Named attribute value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub values: GenVec,
}

impl Attribute {
    pub fn new(name: impl Into<String>, values: GenVec) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// One dimension of an array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dimension {
    pub name: String,
    /// Extent as extracted (the slab edge when a slab is set)
    pub count: usize,
    pub label: String,
    pub unit: String,
    pub format: String,
    /// Dimension scale, `None` when the file stores none
    pub scale: Option<GenVec>,
}

/// An array with its dimensions and attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArrayRecord {
    pub name: String,
    pub reference: Ref,
    pub dims: Vec<Dimension>,
    pub attrs: Vec<Attribute>,
    pub data: GenVec,
}

impl ArrayRecord {
    /// Extents of the reported dimensions.
    pub fn shape(&self) -> Vec<usize> {
        self.dims.iter().map(|d| d.count).collect()
    }

    /// Any dimension carries a non-empty scale.
    pub fn has_scale(&self) -> bool {
        self.dims
            .iter()
            .any(|d| d.scale.as_ref().is_some_and(|s| !s.is_empty()))
    }

    /// Every non-empty scale matches its dimension's extent.
    pub fn is_consistent(&self) -> bool {
        self.dims.iter().all(|d| match &d.scale {
            Some(s) if !s.is_empty() => s.len() == d.count,
            _ => true,
        })
    }
}

/// One table field: a vector per component, each holding one value per record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Field {
    pub name: String,
    pub components: Vec<GenVec>,
}

/// A field as the downstream consumer sees it.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Numeric { name: String, values: GenVec },
    /// char8 components joined into one string per record
    Text { name: String, rows: Vec<String> },
}

impl Column {
    pub fn name(&self) -> &str {
        match self {
            Self::Numeric { name, .. } | Self::Text { name, .. } => name,
        }
    }
}

impl Field {
    /// Number of components per record.
    #[inline]
    pub fn order(&self) -> usize {
        self.components.len()
    }

    pub fn kind(&self) -> Option<NumberKind> {
        self.components.first().and_then(GenVec::kind)
    }

    /// Non-empty with every component of one kind.
    pub fn is_valid(&self) -> bool {
        match self.components.first() {
            Some(first) => self.components.iter().all(|c| c.kind() == first.kind()),
            None => false,
        }
    }

    /// Split into named sub-columns `name__j`. A char8 field collapses
    /// into a single text column `name__0` with one string per record.
    pub fn columns(&self) -> Vec<Column> {
        if self.kind() == Some(NumberKind::Char8) {
            let rows = self.components.iter().map(GenVec::len).max().unwrap_or(0);
            let text = (0..rows)
                .map(|r| {
                    self.components
                        .iter()
                        .filter_map(|c| c.as_bytes().get(r))
                        .map(|&b| b as char)
                        .collect()
                })
                .collect();
            return vec![Column::Text {
                name: format!("{}__0", self.name),
                rows: text,
            }];
        }
        self.components
            .iter()
            .enumerate()
            .map(|(j, values)| Column::Numeric {
                name: format!("{}__{}", self.name, j),
                values: values.clone(),
            })
            .collect()
    }
}

/// A table with its fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRecord {
    pub name: String,
    pub class: String,
    pub reference: Ref,
    pub attrs: Vec<Attribute>,
    pub fields: Vec<Field>,
    /// Records extracted per field
    pub records: usize,
}

impl TableRecord {
    pub fn is_valid(&self) -> bool {
        !self.fields.is_empty() && self.fields.iter().all(Field::is_valid)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One group member.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupEntry {
    pub tag: Tag,
    pub reference: Ref,
    /// Empty when the member could not be described
    pub name: String,
}

impl GroupEntry {
    /// Member kind, `None` for tags no stream handles.
    pub fn kind(&self) -> Option<ObjectKind> {
        ObjectKind::from_tag(self.tag)
    }
}

/// A group: member references only, never member data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupRecord {
    pub name: String,
    pub class: String,
    pub reference: Ref,
    pub attrs: Vec<Attribute>,
    pub entries: Vec<GroupEntry>,
}

impl GroupRecord {
    pub fn is_valid(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Members of one kind.
    pub fn members(&self, kind: ObjectKind) -> impl Iterator<Item = &GroupEntry> {
        self.entries.iter().filter(move |e| e.kind() == Some(kind))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Palette {
    pub name: String,
    pub components: usize,
    pub entries: usize,
    pub table: GenVec,
}

/// A raster image.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageRecord {
    pub name: String,
    pub reference: Ref,
    /// Extracted `[height, width]`
    pub dims: [usize; 2],
    pub components: usize,
    /// Ordering of `image`
    pub interlace: Interlace,
    pub attrs: Vec<Attribute>,
    pub palettes: Vec<Palette>,
    pub image: GenVec,
}

impl ImageRecord {
    /// Image data is either absent or exactly `height * width * components` long.
    pub fn is_valid(&self) -> bool {
        self.image.is_empty() || self.image.len() == self.dims[0] * self.dims[1] * self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dim(count: usize, scale: Option<GenVec>) -> Dimension {
        Dimension {
            name: "d".into(),
            count,
            scale,
            ..Default::default()
        }
    }

    #[test]
    fn test_array_scale_checks() {
        let mut rec = ArrayRecord {
            dims: vec![dim(3, None), dim(2, Some(GenVec::empty(NumberKind::Int32)))],
            ..Default::default()
        };
        assert!(!rec.has_scale());
        assert!(rec.is_consistent());

        rec.dims[0].scale = Some(GenVec::from_slice(&[1.0f32, 2.0, 3.0]));
        assert!(rec.has_scale());
        assert!(rec.is_consistent());
        assert_eq!(rec.shape(), vec![3, 2]);

        rec.dims[1].scale = Some(GenVec::from_slice(&[1i32]));
        assert!(!rec.is_consistent());
    }

    #[test]
    fn test_numeric_columns() {
        let f = Field {
            name: "pos".into(),
            components: vec![
                GenVec::from_slice(&[1.0f32, 2.0]),
                GenVec::from_slice(&[3.0f32, 4.0]),
            ],
        };
        assert!(f.is_valid());
        assert_eq!(f.order(), 2);
        let cols = f.columns();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0].name(), "pos__0");
        assert_eq!(cols[1].name(), "pos__1");
    }

    #[test]
    fn test_char_columns_collapse() {
        let f = Field {
            name: "code".into(),
            components: vec![
                GenVec::from_text("ad"),
                GenVec::from_text("be"),
                GenVec::from_text("cf"),
            ],
        };
        let cols = f.columns();
        assert_eq!(
            cols,
            vec![Column::Text {
                name: "code__0".into(),
                rows: vec!["abc".into(), "def".into()],
            }]
        );
    }

    #[test]
    fn test_field_validity() {
        assert!(!Field::default().is_valid());
        let mixed = Field {
            name: "m".into(),
            components: vec![GenVec::from_slice(&[1u8]), GenVec::from_slice(&[1i8])],
        };
        assert!(!mixed.is_valid());
        let table = TableRecord {
            fields: vec![mixed],
            ..Default::default()
        };
        assert!(!table.is_valid());
        assert!(!TableRecord::default().is_valid());
    }

    #[test]
    fn test_group_members() {
        let g = GroupRecord {
            entries: vec![
                GroupEntry { tag: 720, reference: 2, name: "a".into() },
                GroupEntry { tag: 1962, reference: 3, name: "t".into() },
                GroupEntry { tag: 1, reference: 4, name: String::new() },
            ],
            ..Default::default()
        };
        assert!(g.is_valid());
        assert_eq!(g.members(ObjectKind::Table).count(), 1);
        assert_eq!(g.entries[2].kind(), None);
        assert!(!GroupRecord::default().is_valid());
    }

    #[test]
    fn test_image_validity() {
        let mut img = ImageRecord {
            dims: [2, 3],
            components: 3,
            ..Default::default()
        };
        assert!(img.is_valid());
        img.image = GenVec::from_slice(&[0u8; 18]);
        assert!(img.is_valid());
        img.image = GenVec::from_slice(&[0u8; 17]);
        assert!(!img.is_valid());
    }
}
