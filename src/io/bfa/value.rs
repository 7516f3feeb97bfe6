//! Typed field codec: primitives, optional fields and path elements.
//!
//! Everything the container stores beyond raw sections goes through this
//! module: little-endian primitives, length-prefixed labels, one-byte
//! orientations, fixed-width positions, `TAG:TYPE:VALUE` optional fields
//! and the combined oriented-walk ("path elements") value.
//!
//! Integers pick their wire subtype from the value: negative values take
//! the smallest sufficient signed width (`c`, `s`, `i`), non-negative
//! values the smallest unsigned width (`C`, `S`, `I`). All subtypes decode
//! back to the same logical integer, so the subtype is a pure size
//! optimization.

use crate::error::{BfaError, Result};
use crate::formats::cigar::CigarOp;
use crate::formats::gfa::{NumericArray, Orientation, Tag, TagValue};
use std::io::Read;

/// Read exactly `buf.len()` bytes, mapping a short read to a format error.
pub(crate) fn read_exact(reader: &mut impl Read, buf: &mut [u8], context: &'static str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            BfaError::Truncated {
                expected: buf.len(),
                context,
            }
        } else {
            BfaError::Io(e)
        }
    })
}

pub(crate) fn read_u8(reader: &mut impl Read, context: &'static str) -> Result<u8> {
    let mut buf = [0u8; 1];
    read_exact(reader, &mut buf, context)?;
    Ok(buf[0])
}

pub(crate) fn read_u32(reader: &mut impl Read, context: &'static str) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf, context)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_i32(reader: &mut impl Read, context: &'static str) -> Result<i32> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf, context)?;
    Ok(i32::from_le_bytes(buf))
}

pub(crate) fn read_f64(reader: &mut impl Read, context: &'static str) -> Result<f64> {
    let mut buf = [0u8; 8];
    read_exact(reader, &mut buf, context)?;
    Ok(f64::from_le_bytes(buf))
}

/// The wire subtype for an integer: negative values use the smallest signed
/// width, non-negative values the smallest unsigned width.
///
/// # Errors
///
/// Values below `i32::MIN` or above `u32::MAX` have no subtype and are an
/// encode error.
pub fn integer_subtype(value: i64) -> Result<u8> {
    if value < 0 {
        if value >= i8::MIN as i64 {
            Ok(b'c')
        } else if value >= i16::MIN as i64 {
            Ok(b's')
        } else if value >= i32::MIN as i64 {
            Ok(b'i')
        } else {
            Err(BfaError::Encode {
                msg: format!("Integer {} below the representable range", value),
            })
        }
    } else if value <= u8::MAX as i64 {
        Ok(b'C')
    } else if value <= u16::MAX as i64 {
        Ok(b'S')
    } else if value <= u32::MAX as i64 {
        Ok(b'I')
    } else {
        Err(BfaError::Encode {
            msg: format!("Integer {} above the representable range", value),
        })
    }
}

fn encode_integer(buf: &mut Vec<u8>, value: i64) -> Result<u8> {
    let subtype = integer_subtype(value)?;
    match subtype {
        b'c' => buf.push(value as i8 as u8),
        b'C' => buf.push(value as u8),
        b's' => buf.extend_from_slice(&(value as i16).to_le_bytes()),
        b'S' => buf.extend_from_slice(&(value as u16).to_le_bytes()),
        b'i' => buf.extend_from_slice(&(value as i32).to_le_bytes()),
        _ => buf.extend_from_slice(&(value as u32).to_le_bytes()),
    }
    Ok(subtype)
}

fn decode_integer(reader: &mut impl Read, subtype: u8) -> Result<i64> {
    Ok(match subtype {
        b'c' => read_u8(reader, "integer value")? as i8 as i64,
        b'C' => read_u8(reader, "integer value")? as i64,
        b's' => {
            let mut buf = [0u8; 2];
            read_exact(reader, &mut buf, "integer value")?;
            i16::from_le_bytes(buf) as i64
        }
        b'S' => {
            let mut buf = [0u8; 2];
            read_exact(reader, &mut buf, "integer value")?;
            u16::from_le_bytes(buf) as i64
        }
        b'i' => read_i32(reader, "integer value")? as i64,
        b'I' => read_u32(reader, "integer value")? as i64,
        other => return Err(BfaError::UnknownFieldType { type_code: other }),
    })
}

/// Encode a label: `u32` byte length, then the bytes.
///
/// # Errors
///
/// Empty labels are invalid and an encode error.
pub fn encode_label(buf: &mut Vec<u8>, label: &str) -> Result<()> {
    if label.is_empty() {
        return Err(BfaError::Encode {
            msg: "Empty label".to_string(),
        });
    }
    buf.extend_from_slice(&(label.len() as u32).to_le_bytes());
    buf.extend_from_slice(label.as_bytes());
    Ok(())
}

/// Decode a label.
pub fn decode_label(reader: &mut impl Read) -> Result<String> {
    let len = read_u32(reader, "label length")? as usize;
    let mut bytes = vec![0u8; len];
    read_exact(reader, &mut bytes, "label")?;
    String::from_utf8(bytes).map_err(|e| BfaError::Encode {
        msg: format!("Label is not valid UTF-8: {}", e),
    })
}

/// Encode an orientation as its ASCII byte.
pub fn encode_orientation(buf: &mut Vec<u8>, orient: Orientation) {
    buf.push(orient.as_byte());
}

/// Decode an orientation byte.
pub fn decode_orientation(reader: &mut impl Read) -> Result<Orientation> {
    Orientation::from_byte(read_u8(reader, "orientation")?)
}

/// Encode a position as a fixed-width `u32`.
pub fn encode_position(buf: &mut Vec<u8>, pos: u32) {
    buf.extend_from_slice(&pos.to_le_bytes());
}

/// Decode a position.
pub fn decode_position(reader: &mut impl Read) -> Result<u32> {
    read_u32(reader, "position")
}

fn encode_numeric_array(buf: &mut Vec<u8>, array: &NumericArray) {
    buf.push(array.subtype_code());
    buf.extend_from_slice(&(array.len() as u32).to_le_bytes());
    match array {
        NumericArray::Int8(v) => {
            for &x in v {
                buf.push(x as u8);
            }
        }
        NumericArray::UInt8(v) => buf.extend_from_slice(v),
        NumericArray::Int16(v) => {
            for &x in v {
                buf.extend_from_slice(&x.to_le_bytes());
            }
        }
        NumericArray::UInt16(v) => {
            for &x in v {
                buf.extend_from_slice(&x.to_le_bytes());
            }
        }
        NumericArray::Int32(v) => {
            for &x in v {
                buf.extend_from_slice(&x.to_le_bytes());
            }
        }
        NumericArray::UInt32(v) => {
            for &x in v {
                buf.extend_from_slice(&x.to_le_bytes());
            }
        }
        NumericArray::Float(v) => {
            for &x in v {
                buf.extend_from_slice(&x.to_le_bytes());
            }
        }
    }
}

fn decode_numeric_array(reader: &mut impl Read) -> Result<NumericArray> {
    let subtype = read_u8(reader, "array subtype")?;
    let count = read_u32(reader, "array length")? as usize;
    Ok(match subtype {
        b'c' => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(read_u8(reader, "array element")? as i8);
            }
            NumericArray::Int8(v)
        }
        b'C' => {
            let mut v = vec![0u8; count];
            read_exact(reader, &mut v, "array element")?;
            NumericArray::UInt8(v)
        }
        b's' => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                let mut b = [0u8; 2];
                read_exact(reader, &mut b, "array element")?;
                v.push(i16::from_le_bytes(b));
            }
            NumericArray::Int16(v)
        }
        b'S' => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                let mut b = [0u8; 2];
                read_exact(reader, &mut b, "array element")?;
                v.push(u16::from_le_bytes(b));
            }
            NumericArray::UInt16(v)
        }
        b'i' => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(read_i32(reader, "array element")?);
            }
            NumericArray::Int32(v)
        }
        b'I' => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(read_u32(reader, "array element")?);
            }
            NumericArray::UInt32(v)
        }
        b'f' => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(read_f64(reader, "array element")?);
            }
            NumericArray::Float(v)
        }
        other => return Err(BfaError::UnknownFieldType { type_code: other }),
    })
}

fn encode_cstr(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
}

fn decode_cstr(reader: &mut impl Read) -> Result<String> {
    let mut bytes = Vec::new();
    loop {
        let b = read_u8(reader, "string value")?;
        if b == 0 {
            break;
        }
        bytes.push(b);
    }
    String::from_utf8(bytes).map_err(|e| BfaError::Encode {
        msg: format!("String value is not valid UTF-8: {}", e),
    })
}

/// Encode one optional field: 2-byte name, 1-byte type code, value.
///
/// Integers write their inferred subtype as the type code; on decode every
/// subtype comes back as a logical integer.
pub fn encode_tag(buf: &mut Vec<u8>, tag: &Tag) -> Result<()> {
    buf.extend_from_slice(&tag.name);
    match &tag.value {
        TagValue::Char(c) => {
            buf.push(b'A');
            buf.push(*c);
        }
        TagValue::Int(i) => {
            // Type code position is filled after inference.
            let code_at = buf.len();
            buf.push(0);
            let subtype = encode_integer(buf, *i)?;
            buf[code_at] = subtype;
        }
        TagValue::Float(x) => {
            buf.push(b'f');
            buf.extend_from_slice(&x.to_le_bytes());
        }
        TagValue::String(s) => {
            buf.push(b'Z');
            encode_cstr(buf, s);
        }
        TagValue::Json(s) => {
            buf.push(b'J');
            encode_cstr(buf, s);
        }
        TagValue::Hex(bytes) => {
            buf.push(b'H');
            buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            buf.extend_from_slice(bytes);
        }
        TagValue::Array(array) => {
            buf.push(b'B');
            encode_numeric_array(buf, array);
        }
    }
    Ok(())
}

/// Decode one optional field.
pub fn decode_tag(reader: &mut impl Read) -> Result<Tag> {
    let mut name = [0u8; 2];
    read_exact(reader, &mut name, "field name")?;
    let type_code = read_u8(reader, "field type")?;
    let value = match type_code {
        b'A' => TagValue::Char(read_u8(reader, "char value")?),
        b'c' | b'C' | b's' | b'S' | b'i' | b'I' => {
            TagValue::Int(decode_integer(reader, type_code)?)
        }
        b'f' => TagValue::Float(read_f64(reader, "float value")?),
        b'Z' => TagValue::String(decode_cstr(reader)?),
        b'J' => TagValue::Json(decode_cstr(reader)?),
        b'H' => {
            let count = read_u32(reader, "byte array length")? as usize;
            let mut bytes = vec![0u8; count];
            read_exact(reader, &mut bytes, "byte array")?;
            TagValue::Hex(bytes)
        }
        b'B' => TagValue::Array(decode_numeric_array(reader)?),
        other => return Err(BfaError::UnknownFieldType { type_code: other }),
    };
    Ok(Tag { name, value })
}

/// Encode an oriented walk with its per-step overlaps as one value:
/// `u32` element count, then per element a label, an orientation byte and
/// an overlap.
///
/// When every overlap is empty the per-element overlaps are written empty;
/// otherwise the two lists must pair up one-to-one.
///
/// # Errors
///
/// Mismatched list lengths (with at least one non-empty overlap) are a
/// consistency error.
pub fn encode_path_elements(
    buf: &mut Vec<u8>,
    segments: &[(String, Orientation)],
    overlaps: &[Vec<CigarOp>],
) -> Result<()> {
    let all_empty = overlaps.iter().all(|c| c.is_empty());
    if !all_empty && segments.len() != overlaps.len() {
        return Err(BfaError::Consistency {
            msg: format!(
                "Path elements: {} segments but {} overlaps",
                segments.len(),
                overlaps.len()
            ),
        });
    }
    buf.extend_from_slice(&(segments.len() as u32).to_le_bytes());
    for (i, (name, orient)) in segments.iter().enumerate() {
        encode_label(buf, name)?;
        encode_orientation(buf, *orient);
        if all_empty {
            super::cigar::encode(buf, &[])?;
        } else {
            super::cigar::encode(buf, &overlaps[i])?;
        }
    }
    Ok(())
}

/// Decode an oriented walk with its per-step overlaps.
pub fn decode_path_elements(
    reader: &mut impl Read,
) -> Result<(Vec<(String, Orientation)>, Vec<Vec<CigarOp>>)> {
    let count = read_u32(reader, "path element count")? as usize;
    let mut segments = Vec::with_capacity(count);
    let mut overlaps = Vec::with_capacity(count);
    for _ in 0..count {
        let name = decode_label(reader)?;
        let orient = decode_orientation(reader)?;
        segments.push((name, orient));
        overlaps.push(super::cigar::decode(reader)?);
    }
    Ok((segments, overlaps))
}
