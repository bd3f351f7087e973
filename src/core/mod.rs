//! Format-independent building blocks.
//!
//! - [`SlabSpec`] and the hyperslab geometry helpers
//! - [`Cursor`] - stream position state machine
//! - [`Directory`] - visible objects of one kind, internal ones filtered out
//! - Record types handed out by the streams

mod cursor;
mod directory;
mod record;
pub mod slab;

pub use cursor::{Cursor, Position};
pub use directory::{
    is_reserved, reserved_set, DirEntry, Directory, ReservedSet, GROUP_RESERVED, NO_RESERVED,
    TABLE_RESERVED,
};
pub use record::*;
pub use slab::SlabSpec;
