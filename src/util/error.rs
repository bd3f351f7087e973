//! Error types for hdfstream.

use thiserror::Error;

use super::NumberKind;
use crate::driver::ObjectKind;

/// Main error type for stream and vector operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File or object could not be opened / attached
    #[error("Cannot open {target}: {reason}")]
    OpenError { target: String, reason: String },

    /// Unsupported number kind or type code
    #[error("Invalid number kind: {0}")]
    InvalidKind(String),

    /// Bad start/stop/stride triple for a vector operation
    #[error("Invalid range: start {start}, stop {stop}, stride {stride}")]
    InvalidRange { start: usize, stop: usize, stride: usize },

    /// A non-empty range was requested without source data
    #[error("Invalid array: a data range requires a source buffer")]
    InvalidArray,

    /// Hyperslab parameters are malformed or do not fit the object
    #[error("Invalid hyperslab: {0}")]
    InvalidSlab(String),

    /// Requested conversion is not a widening edge of the lattice
    #[error("Unsupported cast from {from} to {to}")]
    UnsupportedCast { from: NumberKind, to: NumberKind },

    /// Element index out of bounds
    #[error("Index {index} out of range (length: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Numeric seek target outside the directory
    #[error("Stream position {index} out of range (objects: {count})")]
    RangeError { index: usize, count: usize },

    /// Named or referenced object is absent (or reserved)
    #[error("{kind} not found: {target}")]
    NotFound { kind: ObjectKind, target: String },

    /// Driver-level failure during bulk extraction
    #[error("Read failed for {object}: {reason}")]
    ReadError { object: String, reason: String },

    /// Driver reported a type code with no matching kind
    #[error("Unknown numeric type code {code} in {object}")]
    UnknownNumericType { code: i32, object: String },

    /// Stream used without an open file
    #[error("Stream is not open")]
    NotOpen,

    /// Text could not be parsed as the requested kind
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Malformed snapshot container
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an open error for a file path or object.
    pub fn open(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OpenError {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create a read error for an object.
    pub fn read(object: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ReadError {
            object: object.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create an invalid slab error.
    pub fn slab(msg: impl Into<String>) -> Self {
        Self::InvalidSlab(msg.into())
    }
}

/// Result type alias for hdfstream operations.
pub type Result<T> = std::result::Result<T, Error>;
