//! Widening lattice - which kind-to-kind conversions are lossless.
//!
//! The table below is the single source of truth for every export and
//! element access on a [`GenVec`](super::GenVec). Each row names a target
//! kind and the source kinds that may be converted into it. A source not
//! listed for a target is rejected with `UnsupportedCast`; nothing is
//! ever narrowed or silently truncated.
//!
//! ```text
//! uint8/uchar8 -> uint16 -> uint32 ----+
//!      |            |                   |
//!      v            v                   v
//! int8/char8 -> int16 --> int32       float64 <- float32
//! ```
//!
//! Character kinds are interchangeable with their same-width integer
//! kinds, and every integer kind may widen into float64.

use super::NumberKind::{self, *};

/// Target kind and the source kinds it accepts (identity included).
pub const WIDENING_TABLE: &[(NumberKind, &[NumberKind])] = &[
    (Uchar8, &[Uchar8, Uint8]),
    (Char8, &[Char8, Int8]),
    (Uint8, &[Uint8, Uchar8, Char8]),
    (Int8, &[Int8, Char8]),
    (Uint16, &[Uint16, Uint8, Uchar8]),
    (Int16, &[Int16, Int8, Char8, Uint8, Uchar8]),
    (Uint32, &[Uint32, Uint16, Uint8, Uchar8]),
    (Int32, &[Int32, Int16, Uint16, Int8, Char8, Uint8, Uchar8]),
    (Float32, &[Float32]),
    (
        Float64,
        &[Float64, Float32, Int8, Uint8, Int16, Uint16, Int32, Uint32],
    ),
];

/// Source kinds accepted by `to`.
pub fn sources_for(to: NumberKind) -> &'static [NumberKind] {
    WIDENING_TABLE
        .iter()
        .find(|(target, _)| *target == to)
        .map(|(_, sources)| *sources)
        .unwrap_or(&[])
}

/// Check whether a vector of kind `from` may be exported as `to`.
#[inline]
pub fn can_cast(from: NumberKind, to: NumberKind) -> bool {
    sources_for(to).contains(&from)
}
