//! Record assembly helpers: type-code mapping and raw-buffer import.

use std::ops::Range;

use crate::core::Attribute;
use crate::driver::{AttrTarget, Driver};
use crate::util::{Error, GenVec, NumberKind, Result};

/// Map a driver type code to a kind.
pub fn kind_for(code: i32, object: &str) -> Result<NumberKind> {
    NumberKind::from_code(code).ok_or_else(|| Error::UnknownNumericType {
        code,
        object: object.to_string(),
    })
}

/// Import exactly `count` elements from a driver buffer.
///
/// A buffer shorter than `count` elements is a failed read, never a
/// shorter vector.
pub fn import(kind: NumberKind, bytes: &[u8], count: usize, object: &str) -> Result<GenVec> {
    let need = count * kind.num_bytes();
    if bytes.len() < need {
        return Err(Error::read(
            object,
            format!("short read: {} of {} bytes", bytes.len(), need),
        ));
    }
    if count == 0 {
        return Ok(GenVec::empty(kind));
    }
    GenVec::from_raw(kind, Some(bytes), 0, count - 1, 1)
}

/// Split record-interlaced field data into one vector per component.
pub fn split_components(
    kind: NumberKind,
    bytes: &[u8],
    records: usize,
    order: usize,
    object: &str,
) -> Result<Vec<GenVec>> {
    let total = records * order;
    let need = total * kind.num_bytes();
    if bytes.len() < need {
        return Err(Error::read(
            object,
            format!("short read: {} of {} bytes", bytes.len(), need),
        ));
    }
    (0..order)
        .map(|j| {
            if records == 0 {
                Ok(GenVec::empty(kind))
            } else {
                GenVec::from_raw(kind, Some(bytes), j, total - 1, order)
            }
        })
        .collect()
}

/// Read one attribute. With `trim_nul`, char8 values stop at the first NUL.
pub fn read_attr(driver: &dyn Driver, target: AttrTarget, index: usize, trim_nul: bool) -> Result<Attribute> {
    let info = driver.attr_info(target, index)?;
    let kind = kind_for(info.type_code, &info.name)?;
    let raw = driver.read_attr_raw(target, index)?;
    let mut count = info.count;
    if trim_nul && kind == NumberKind::Char8 {
        if let Some(nul) = raw.iter().take(count).position(|&b| b == 0) {
            count = nul;
        }
    }
    let values = import(kind, &raw, count, &info.name)?;
    Ok(Attribute::new(info.name, values))
}

/// Read a run of attributes.
pub fn read_attrs(
    driver: &dyn Driver,
    target: AttrTarget,
    indices: Range<usize>,
    trim_nul: bool,
) -> Result<Vec<Attribute>> {
    indices
        .map(|i| read_attr(driver, target, i, trim_nul))
        .collect()
}
