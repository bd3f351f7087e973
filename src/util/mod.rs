//! Foundation types for hdfstream.
//!
//! - [`NumberKind`] / [`Element`] - element kinds and their Rust types
//! - [`GenVec`] - single-kind vector with checked widening export
//! - [`cast`] - the widening lattice
//! - [`Shape`] - row-major array extents
//! - [`Error`] / [`Result`] - error handling

mod error;
mod genvec;
mod kind;
mod shape;
pub mod cast;

pub use error::*;
pub use genvec::*;
pub use kind::*;
pub use shape::*;
