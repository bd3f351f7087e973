//! Snapshot container constants.
//!
//! ```text
//! +----------------------+
//! | Magic: "H4SNAP"      |  6 bytes
//! | Version              |  2 bytes (u16 LE)
//! | Next reference       |  4 bytes (i32 LE)
//! +----------------------+
//! | File attributes      |  per interface
//! | Arrays               |  u32 count + records
//! | Tables               |
//! | Groups               |
//! | Images               |
//! +----------------------+
//! ```
//!
//! Strings are a u32 length plus UTF-8 bytes. Element buffers are a u64
//! byte length plus little-endian elements.

use crate::driver::ObjectKind;
use crate::util::NumberKind;

/// Magic bytes at the start of a snapshot.
pub const SNAPSHOT_MAGIC: &[u8; 6] = b"H4SNAP";

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 12;

pub const CURRENT_VERSION: u16 = 1;

pub const fn kind_code(kind: ObjectKind) -> u8 {
    match kind {
        ObjectKind::Array => 0,
        ObjectKind::Table => 1,
        ObjectKind::Group => 2,
        ObjectKind::Image => 3,
    }
}

pub const fn kind_from_code(code: u8) -> Option<ObjectKind> {
    match code {
        0 => Some(ObjectKind::Array),
        1 => Some(ObjectKind::Table),
        2 => Some(ObjectKind::Group),
        3 => Some(ObjectKind::Image),
        _ => None,
    }
}

/// Element width for a type code (1 for unknown codes).
pub fn elem_size(type_code: i32) -> usize {
    NumberKind::from_code(type_code).map_or(1, NumberKind::num_bytes)
}

/// Convert between native and little-endian element order in place.
/// A no-op on little-endian hosts.
pub fn swap_le(data: &mut [u8], elem_size: usize) {
    if cfg!(target_endian = "big") && elem_size > 1 {
        for chunk in data.chunks_exact_mut(elem_size) {
            chunk.reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        for k in ObjectKind::ALL {
            assert_eq!(kind_from_code(kind_code(k)), Some(k));
        }
        assert_eq!(kind_from_code(9), None);
    }

    #[test]
    fn test_elem_size() {
        assert_eq!(elem_size(NumberKind::Float64.code()), 8);
        assert_eq!(elem_size(-3), 1);
    }
}
