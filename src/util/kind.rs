//! Number kinds - the element types a [`GenVec`](super::GenVec) can hold.

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Numeric / character kind of a vector element.
///
/// Discriminants are the HDF4 `DFNT_*` number type codes, so a kind
/// converts to and from the code a file driver reports without a lookup
/// table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum NumberKind {
    /// Unsigned 8-bit character
    Uchar8 = 3,
    /// Signed 8-bit character
    Char8 = 4,
    /// 32-bit IEEE float
    Float32 = 5,
    /// 64-bit IEEE float
    Float64 = 6,
    /// Signed 8-bit integer
    Int8 = 20,
    /// Unsigned 8-bit integer
    Uint8 = 21,
    /// Signed 16-bit integer
    Int16 = 22,
    /// Unsigned 16-bit integer
    Uint16 = 23,
    /// Signed 32-bit integer
    Int32 = 24,
    /// Unsigned 32-bit integer
    Uint32 = 25,
}

impl NumberKind {
    /// Every supported kind.
    pub const ALL: [NumberKind; 10] = [
        Self::Int8,
        Self::Uint8,
        Self::Char8,
        Self::Uchar8,
        Self::Int16,
        Self::Uint16,
        Self::Int32,
        Self::Uint32,
        Self::Float32,
        Self::Float64,
    ];

    /// Size in bytes of one element.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 | Self::Char8 | Self::Uchar8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    /// Short lowercase name.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Char8 => "char8",
            Self::Uchar8 => "uchar8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Format type code for this kind.
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Map a format type code to a kind.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            3 => Some(Self::Uchar8),
            4 => Some(Self::Char8),
            5 => Some(Self::Float32),
            6 => Some(Self::Float64),
            20 => Some(Self::Int8),
            21 => Some(Self::Uint8),
            22 => Some(Self::Int16),
            23 => Some(Self::Uint16),
            24 => Some(Self::Int32),
            25 => Some(Self::Uint32),
            _ => None,
        }
    }

    /// Parse a kind from its name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// True for the two 8-bit character kinds.
    #[inline]
    pub const fn is_char(self) -> bool {
        matches!(self, Self::Char8 | Self::Uchar8)
    }

    /// True for integer kinds (character kinds excluded).
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Uint8 | Self::Int16 | Self::Uint16 | Self::Int32 | Self::Uint32
        )
    }

    /// True for floating point kinds.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single element value widened to a common carrier type.
///
/// Casting goes through this carrier: every integer kind fits in `i64`
/// and every float kind in `f64`, so a lattice-approved cast never loses
/// information on the way through.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
}

// === Element trait for typed access ===

/// Trait for Rust types that can be stored in / exported from a `GenVec`.
pub trait Element: Pod + Zeroable + Copy + Default + PartialEq + fmt::Debug {
    /// The corresponding kind.
    const KIND: NumberKind;

    /// Size of this type in bytes.
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Widen into the carrier.
    fn to_scalar(self) -> Scalar;

    /// Narrow from the carrier (C-style cast semantics).
    fn from_scalar(value: Scalar) -> Self;
}

macro_rules! impl_element {
    ($t:ty, $kind:ident, int) => {
        impl Element for $t {
            const KIND: NumberKind = NumberKind::$kind;

            #[inline]
            fn to_scalar(self) -> Scalar {
                Scalar::Int(self as i64)
            }

            #[inline]
            fn from_scalar(value: Scalar) -> Self {
                match value {
                    Scalar::Int(v) => v as $t,
                    Scalar::Float(v) => v as $t,
                }
            }
        }
    };
    ($t:ty, $kind:ident, float) => {
        impl Element for $t {
            const KIND: NumberKind = NumberKind::$kind;

            #[inline]
            fn to_scalar(self) -> Scalar {
                Scalar::Float(self as f64)
            }

            #[inline]
            fn from_scalar(value: Scalar) -> Self {
                match value {
                    Scalar::Int(v) => v as $t,
                    Scalar::Float(v) => v as $t,
                }
            }
        }
    };
}

impl_element!(i8, Int8, int);
impl_element!(u8, Uint8, int);
impl_element!(i16, Int16, int);
impl_element!(u16, Uint16, int);
impl_element!(i32, Int32, int);
impl_element!(u32, Uint32, int);
impl_element!(f32, Float32, float);
impl_element!(f64, Float64, float);

/// Signed 8-bit character (like C `char8`).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Char8(pub i8);

/// Unsigned 8-bit character (like C `uchar8`).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Uchar8(pub u8);

impl Char8 {
    #[inline]
    pub const fn as_char(self) -> char {
        self.0 as u8 as char
    }
}

impl Uchar8 {
    #[inline]
    pub const fn as_char(self) -> char {
        self.0 as char
    }
}

impl From<u8> for Char8 {
    #[inline]
    fn from(b: u8) -> Self {
        Self(b as i8)
    }
}

impl From<u8> for Uchar8 {
    #[inline]
    fn from(b: u8) -> Self {
        Self(b)
    }
}

impl fmt::Debug for Char8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_char())
    }
}

impl fmt::Debug for Uchar8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_char())
    }
}

impl Element for Char8 {
    const KIND: NumberKind = NumberKind::Char8;

    #[inline]
    fn to_scalar(self) -> Scalar {
        Scalar::Int(self.0 as i64)
    }

    #[inline]
    fn from_scalar(value: Scalar) -> Self {
        Self(i8::from_scalar(value))
    }
}

impl Element for Uchar8 {
    const KIND: NumberKind = NumberKind::Uchar8;

    #[inline]
    fn to_scalar(self) -> Scalar {
        Scalar::Int(self.0 as i64)
    }

    #[inline]
    fn from_scalar(value: Scalar) -> Self {
        Self(u8::from_scalar(value))
    }
}
