//! GenVec - a run of elements of exactly one number kind.
//!
//! The vector owns a contiguous native-endian byte buffer holding
//! `len() * kind.num_bytes()` bytes. Typed access goes through
//! [`GenVec::export_as`] / [`GenVec::element_at`], which only succeed
//! along the widening edges in [`cast`](super::cast).

use std::fmt;

use super::cast::can_cast;
use super::{Char8, Element, Error, NumberKind, Result, Scalar, Uchar8};

/// Generic single-kind vector.
///
/// A default-constructed vector is untyped and empty. A typed empty
/// vector (see [`GenVec::empty`]) is what metadata-only reads produce:
/// it reports the element kind without carrying any data.
#[derive(Clone, Default, PartialEq)]
pub struct GenVec {
    kind: Option<NumberKind>,
    data: Vec<u8>,
}

#[inline]
fn read_elem<T: Element>(bytes: &[u8]) -> T {
    bytemuck::pod_read_unaligned(bytes)
}

/// Decode one element of `kind` into the carrier.
fn decode(kind: NumberKind, bytes: &[u8]) -> Scalar {
    match kind {
        NumberKind::Int8 => read_elem::<i8>(bytes).to_scalar(),
        NumberKind::Uint8 => read_elem::<u8>(bytes).to_scalar(),
        NumberKind::Char8 => read_elem::<Char8>(bytes).to_scalar(),
        NumberKind::Uchar8 => read_elem::<Uchar8>(bytes).to_scalar(),
        NumberKind::Int16 => read_elem::<i16>(bytes).to_scalar(),
        NumberKind::Uint16 => read_elem::<u16>(bytes).to_scalar(),
        NumberKind::Int32 => read_elem::<i32>(bytes).to_scalar(),
        NumberKind::Uint32 => read_elem::<u32>(bytes).to_scalar(),
        NumberKind::Float32 => read_elem::<f32>(bytes).to_scalar(),
        NumberKind::Float64 => read_elem::<f64>(bytes).to_scalar(),
    }
}

/// Format one element for display.
fn format_elem(kind: NumberKind, bytes: &[u8]) -> String {
    match kind {
        NumberKind::Int8 => read_elem::<i8>(bytes).to_string(),
        NumberKind::Uint8 => read_elem::<u8>(bytes).to_string(),
        NumberKind::Char8 | NumberKind::Uchar8 => (bytes[0] as char).to_string(),
        NumberKind::Int16 => read_elem::<i16>(bytes).to_string(),
        NumberKind::Uint16 => read_elem::<u16>(bytes).to_string(),
        NumberKind::Int32 => read_elem::<i32>(bytes).to_string(),
        NumberKind::Uint32 => read_elem::<u32>(bytes).to_string(),
        NumberKind::Float32 => read_elem::<f32>(bytes).to_string(),
        NumberKind::Float64 => read_elem::<f64>(bytes).to_string(),
    }
}

fn parse_elem<T>(kind: NumberKind, text: &str) -> Result<T>
where
    T: std::str::FromStr,
{
    text.trim()
        .parse::<T>()
        .map_err(|_| Error::InvalidValue(format!("'{}' is not a valid {}", text, kind)))
}

impl GenVec {
    /// Create an untyped, empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zero-length vector of the given kind.
    pub fn empty(kind: NumberKind) -> Self {
        Self {
            kind: Some(kind),
            data: Vec::new(),
        }
    }

    /// Build a vector from a raw element buffer, keeping every `stride`-th
    /// element from index `start` up to and including `stop`.
    ///
    /// Indices count elements, not bytes. Passing no source and an
    /// all-zero range yields a zero-length vector of `kind`.
    pub fn from_raw(
        kind: NumberKind,
        src: Option<&[u8]>,
        start: usize,
        stop: usize,
        stride: usize,
    ) -> Result<Self> {
        if src.is_none() && start == 0 && stop == 0 && stride == 0 {
            return Ok(Self::empty(kind));
        }
        if stride == 0 || stop < start {
            return Err(Error::InvalidRange { start, stop, stride });
        }
        let src = src.ok_or(Error::InvalidArray)?;

        let bad = || Error::InvalidRange { start, stop, stride };
        let size = kind.num_bytes();
        let count = ((stop - start) / stride).checked_add(1).ok_or_else(bad)?;
        let last = start + (count - 1) * stride;
        let end = last
            .checked_add(1)
            .and_then(|n| n.checked_mul(size))
            .ok_or_else(bad)?;
        if end > src.len() {
            return Err(bad());
        }

        let data = if stride == 1 {
            src[start * size..(start + count) * size].to_vec()
        } else {
            let mut data = Vec::with_capacity(count * size);
            for i in (start..=last).step_by(stride) {
                data.extend_from_slice(&src[i * size..(i + 1) * size]);
            }
            data
        };

        Ok(Self {
            kind: Some(kind),
            data,
        })
    }

    /// Same as [`GenVec::from_raw`] but takes a format type code.
    pub fn from_code(
        code: i32,
        src: Option<&[u8]>,
        start: usize,
        stop: usize,
        stride: usize,
    ) -> Result<Self> {
        let kind = NumberKind::from_code(code)
            .ok_or_else(|| Error::InvalidKind(format!("type code {}", code)))?;
        Self::from_raw(kind, src, start, stop, stride)
    }

    /// Wrap a whole native-endian buffer.
    pub fn from_bytes(kind: NumberKind, bytes: &[u8]) -> Result<Self> {
        let size = kind.num_bytes();
        if bytes.len() % size != 0 {
            return Err(Error::InvalidValue(format!(
                "{} bytes is not a whole number of {} elements",
                bytes.len(),
                kind
            )));
        }
        if bytes.is_empty() {
            return Ok(Self::empty(kind));
        }
        Self::from_raw(kind, Some(bytes), 0, bytes.len() / size - 1, 1)
    }

    /// Build a vector from typed values.
    pub fn from_slice<T: Element>(values: &[T]) -> Self {
        Self {
            kind: Some(T::KIND),
            data: bytemuck::cast_slice(values).to_vec(),
        }
    }

    /// Build a char8 vector from text bytes.
    pub fn from_text(text: &str) -> Self {
        Self {
            kind: Some(NumberKind::Char8),
            data: text.as_bytes().to_vec(),
        }
    }

    /// Parse decimal text into a vector of `kind`.
    ///
    /// Character kinds take the first non-blank character of each entry.
    pub fn parse_strings<S: AsRef<str>>(kind: NumberKind, values: &[S]) -> Result<Self> {
        let mut out = Self::empty(kind);
        for v in values {
            let text = v.as_ref();
            match kind {
                NumberKind::Int8 => out.push(parse_elem::<i8>(kind, text)?),
                NumberKind::Uint8 => out.push(parse_elem::<u8>(kind, text)?),
                NumberKind::Int16 => out.push(parse_elem::<i16>(kind, text)?),
                NumberKind::Uint16 => out.push(parse_elem::<u16>(kind, text)?),
                NumberKind::Int32 => out.push(parse_elem::<i32>(kind, text)?),
                NumberKind::Uint32 => out.push(parse_elem::<u32>(kind, text)?),
                NumberKind::Float32 => out.push(parse_elem::<f32>(kind, text)?),
                NumberKind::Float64 => out.push(parse_elem::<f64>(kind, text)?),
                NumberKind::Char8 | NumberKind::Uchar8 => {
                    let b = text.trim().bytes().next().ok_or_else(|| {
                        Error::InvalidValue(format!("empty {} value", kind))
                    })?;
                    out.data.push(b);
                }
            }
        }
        Ok(out)
    }

    fn push<T: Element>(&mut self, value: T) {
        self.data.extend_from_slice(bytemuck::bytes_of(&value));
    }

    /// Replace the contents with a fresh import; prior data is discarded.
    pub fn import(
        &mut self,
        kind: NumberKind,
        src: Option<&[u8]>,
        start: usize,
        stop: usize,
        stride: usize,
    ) -> Result<()> {
        *self = Self::from_raw(kind, src, start, stop, stride)?;
        Ok(())
    }

    /// Append `count` raw elements of `kind`.
    ///
    /// A non-empty vector only accepts elements of its own kind.
    pub fn append(&mut self, kind: NumberKind, data: &[u8], count: usize) -> Result<()> {
        if let Some(current) = self.kind {
            if current != kind && !self.is_empty() {
                return Err(Error::InvalidKind(format!(
                    "cannot append {} elements to a {} vector",
                    kind, current
                )));
            }
        }
        if count == 0 {
            self.kind = Some(kind);
            return Ok(());
        }
        if data.is_empty() {
            return Err(Error::InvalidArray);
        }
        let nbytes = count
            .checked_mul(kind.num_bytes())
            .filter(|&n| n <= data.len())
            .ok_or(Error::InvalidRange {
                start: 0,
                stop: count - 1,
                stride: 1,
            })?;
        self.data.extend_from_slice(&data[..nbytes]);
        self.kind = Some(kind);
        Ok(())
    }

    /// Append typed values.
    pub fn append_slice<T: Element>(&mut self, values: &[T]) -> Result<()> {
        self.append(T::KIND, bytemuck::cast_slice(values), values.len())
    }

    /// Element kind (`None` for an untyped empty vector).
    #[inline]
    pub fn kind(&self) -> Option<NumberKind> {
        self.kind
    }

    /// Format type code, 0 when untyped.
    #[inline]
    pub fn code(&self) -> i32 {
        self.kind.map_or(0, NumberKind::code)
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        match self.kind {
            Some(k) => self.data.len() / k.num_bytes(),
            None => 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw native-endian bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn check_cast(&self, to: NumberKind) -> Result<NumberKind> {
        match self.kind {
            Some(from) if can_cast(from, to) => Ok(from),
            Some(from) => Err(Error::UnsupportedCast { from, to }),
            None => Ok(to),
        }
    }

    /// Export every element converted to `U`.
    pub fn export_as<U: Element>(&self) -> Result<Vec<U>> {
        let from = self.check_cast(U::KIND)?;
        if self.is_empty() {
            return Ok(Vec::new());
        }
        if from == U::KIND {
            return Ok(bytemuck::pod_collect_to_vec(&self.data));
        }
        Ok(self
            .data
            .chunks_exact(from.num_bytes())
            .map(|b| U::from_scalar(decode(from, b)))
            .collect())
    }

    /// Element `index` converted to `U`.
    pub fn element_at<U: Element>(&self, index: usize) -> Result<U> {
        let from = self.check_cast(U::KIND)?;
        let len = self.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        let size = from.num_bytes();
        Ok(U::from_scalar(decode(
            from,
            &self.data[index * size..(index + 1) * size],
        )))
    }

    /// Contents of a character vector as one string (bytes map to chars 1:1).
    pub fn export_string(&self) -> Result<String> {
        match self.kind {
            Some(k) if k.is_char() => Ok(self.data.iter().map(|&b| b as char).collect()),
            Some(from) => Err(Error::UnsupportedCast {
                from,
                to: NumberKind::Char8,
            }),
            None => Ok(String::new()),
        }
    }

    /// Stringify the elements `start, start+stride, ..` up to `stop`.
    ///
    /// Numeric kinds produce one string per selected element. Character
    /// kinds produce a single string holding all the selected characters.
    pub fn to_strings(&self, start: usize, stop: usize, stride: usize) -> Result<Vec<String>> {
        let len = self.len();
        if stride == 0 || stop < start || stop >= len {
            return Err(Error::InvalidRange { start, stop, stride });
        }
        let Some(kind) = self.kind else {
            return Ok(Vec::new());
        };
        let size = kind.num_bytes();
        let selected = (start..=stop).step_by(stride);

        if kind.is_char() {
            let s: String = selected.map(|i| self.data[i] as char).collect();
            return Ok(vec![s]);
        }
        Ok(selected
            .map(|i| format_elem(kind, &self.data[i * size..(i + 1) * size]))
            .collect())
    }

    /// Stringify the whole vector (empty vectors give no strings).
    pub fn to_strings_all(&self) -> Vec<String> {
        if self.is_empty() {
            return Vec::new();
        }
        self.to_strings(0, self.len() - 1, 1).unwrap_or_default()
    }
}

impl fmt::Display for GenVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_strings_all().join(", "))
    }
}

impl fmt::Debug for GenVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(k) => write!(f, "GenVec<{}>[{}]", k, self.len()),
            None => write!(f, "GenVec<untyped>[]"),
        }
    }
}

impl<T: Element> From<&[T]> for GenVec {
    fn from(values: &[T]) -> Self {
        Self::from_slice(values)
    }
}

impl<T: Element> From<Vec<T>> for GenVec {
    fn from(values: Vec<T>) -> Self {
        Self::from_slice(&values)
    }
}
