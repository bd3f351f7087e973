//! Integration tests for the widening lattice through the public GenVec API.

use std::collections::BTreeSet;

use hdfstream::prelude::*;
use hdfstream::util::cast::{can_cast, WIDENING_TABLE};

const I8: [i8; 3] = [0, i8::MIN, i8::MAX];
const U8: [u8; 3] = [0, u8::MIN, u8::MAX];
const C8: [Char8; 3] = [Char8(0), Char8(i8::MIN), Char8(i8::MAX)];
const UC8: [Uchar8; 3] = [Uchar8(0), Uchar8(u8::MIN), Uchar8(u8::MAX)];
const I16: [i16; 3] = [0, i16::MIN, i16::MAX];
const U16: [u16; 3] = [0, u16::MIN, u16::MAX];
const I32: [i32; 3] = [0, i32::MIN, i32::MAX];
const U32: [u32; 3] = [0, u32::MIN, u32::MAX];
const F32: [f32; 3] = [0.0, f32::MIN, f32::MAX];
const F64: [f64; 3] = [0.0, f64::MIN, f64::MAX];

/// Export `values` as `B` and convert back; returns the edge exercised.
fn roundtrip<A: Element, B: Element>(values: &[A]) -> (NumberKind, NumberKind) {
    let g = GenVec::from_slice(values);
    let wide = g
        .export_as::<B>()
        .unwrap_or_else(|e| panic!("{} -> {}: {e}", A::KIND, B::KIND));
    let back: Vec<A> = wide.iter().map(|&w| A::from_scalar(w.to_scalar())).collect();
    assert_eq!(back, values, "{} -> {}", A::KIND, B::KIND);

    for (i, v) in values.iter().enumerate() {
        let one: B = g.element_at(i).unwrap();
        assert_eq!(A::from_scalar(one.to_scalar()), *v);
    }
    (A::KIND, B::KIND)
}

#[test]
fn test_every_edge_round_trips() {
    let covered: BTreeSet<(NumberKind, NumberKind)> = [
        roundtrip::<Uchar8, Uchar8>(&UC8),
        roundtrip::<u8, Uchar8>(&U8),
        roundtrip::<Char8, Char8>(&C8),
        roundtrip::<i8, Char8>(&I8),
        roundtrip::<u8, u8>(&U8),
        roundtrip::<Uchar8, u8>(&UC8),
        roundtrip::<Char8, u8>(&C8),
        roundtrip::<i8, i8>(&I8),
        roundtrip::<Char8, i8>(&C8),
        roundtrip::<u16, u16>(&U16),
        roundtrip::<u8, u16>(&U8),
        roundtrip::<Uchar8, u16>(&UC8),
        roundtrip::<i16, i16>(&I16),
        roundtrip::<i8, i16>(&I8),
        roundtrip::<Char8, i16>(&C8),
        roundtrip::<u8, i16>(&U8),
        roundtrip::<Uchar8, i16>(&UC8),
        roundtrip::<u32, u32>(&U32),
        roundtrip::<u16, u32>(&U16),
        roundtrip::<u8, u32>(&U8),
        roundtrip::<Uchar8, u32>(&UC8),
        roundtrip::<i32, i32>(&I32),
        roundtrip::<i16, i32>(&I16),
        roundtrip::<u16, i32>(&U16),
        roundtrip::<i8, i32>(&I8),
        roundtrip::<Char8, i32>(&C8),
        roundtrip::<u8, i32>(&U8),
        roundtrip::<Uchar8, i32>(&UC8),
        roundtrip::<f32, f32>(&F32),
        roundtrip::<f64, f64>(&F64),
        roundtrip::<f32, f64>(&F32),
        roundtrip::<i8, f64>(&I8),
        roundtrip::<u8, f64>(&U8),
        roundtrip::<i16, f64>(&I16),
        roundtrip::<u16, f64>(&U16),
        roundtrip::<i32, f64>(&I32),
        roundtrip::<u32, f64>(&U32),
    ]
    .into_iter()
    .collect();

    let table: BTreeSet<(NumberKind, NumberKind)> = WIDENING_TABLE
        .iter()
        .flat_map(|(to, sources)| sources.iter().map(move |from| (*from, *to)))
        .collect();
    assert_eq!(covered, table);
}

fn export_to(g: &GenVec, to: NumberKind) -> Result<usize> {
    Ok(match to {
        NumberKind::Int8 => g.export_as::<i8>()?.len(),
        NumberKind::Uint8 => g.export_as::<u8>()?.len(),
        NumberKind::Char8 => g.export_as::<Char8>()?.len(),
        NumberKind::Uchar8 => g.export_as::<Uchar8>()?.len(),
        NumberKind::Int16 => g.export_as::<i16>()?.len(),
        NumberKind::Uint16 => g.export_as::<u16>()?.len(),
        NumberKind::Int32 => g.export_as::<i32>()?.len(),
        NumberKind::Uint32 => g.export_as::<u32>()?.len(),
        NumberKind::Float32 => g.export_as::<f32>()?.len(),
        NumberKind::Float64 => g.export_as::<f64>()?.len(),
    })
}

#[test]
fn test_off_lattice_exports_rejected() {
    for from in NumberKind::ALL {
        let g = GenVec::from_bytes(from, &vec![0u8; from.num_bytes() * 2]).unwrap();
        for to in NumberKind::ALL {
            match export_to(&g, to) {
                Ok(n) => {
                    assert!(can_cast(from, to), "{from} -> {to} should fail");
                    assert_eq!(n, 2);
                }
                Err(Error::UnsupportedCast { from: f, to: t }) => {
                    assert!(!can_cast(from, to), "{from} -> {to} should pass");
                    assert_eq!((f, t), (from, to));
                }
                Err(e) => panic!("{from} -> {to}: unexpected {e}"),
            }
        }
    }
}

#[test]
fn test_named_rejections() {
    let doubles = GenVec::from_slice(&[1.0f64, 2.0]);
    assert!(matches!(
        doubles.export_as::<i32>(),
        Err(Error::UnsupportedCast { .. })
    ));
    let wide = GenVec::from_slice(&[70000u32]);
    assert!(matches!(
        wide.export_as::<i16>(),
        Err(Error::UnsupportedCast { .. })
    ));
    assert!(matches!(
        wide.element_at::<u32>(1),
        Err(Error::IndexOutOfRange { index: 1, len: 1 })
    ));
}

#[test]
fn test_text_conversions() {
    let v = GenVec::parse_strings(NumberKind::Int16, &["-3", "7", "12"]).unwrap();
    assert_eq!(v.to_strings(0, 2, 2).unwrap(), vec!["-3", "12"]);
    assert!(matches!(
        GenVec::parse_strings(NumberKind::Uint8, &["300"]),
        Err(Error::InvalidValue(_))
    ));

    let text = GenVec::from_text("hdf4");
    assert_eq!(text.to_strings(1, 3, 1).unwrap(), vec!["df4"]);
    assert_eq!(text.export_string().unwrap(), "hdf4");

    let floats = GenVec::from_slice(&[0.5f32, 2.0]);
    assert_eq!(floats.to_strings_all(), vec!["0.5", "2"]);
}
