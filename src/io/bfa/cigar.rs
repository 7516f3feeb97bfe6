//! Packed alignment-operator codec.
//!
//! Each operation packs into one `u32`: the run length in the high 28 bits,
//! the operation class (0-8) in the low 4. An overlap value is a `u32`
//! operation count followed by that many packed operations; the absent
//! marker `*` is count 0.

use crate::error::{BfaError, Result};
use crate::formats::cigar::CigarOp;
use std::io::Read;

/// Maximum representable run length (28 bits).
pub const MAX_OP_LENGTH: u32 = (1 << 28) - 1;

/// Pack one operation into `(length << 4) | op_code`.
///
/// # Errors
///
/// Run lengths above [`MAX_OP_LENGTH`] are an encode error.
pub fn pack_op(op: CigarOp) -> Result<u32> {
    let length = op.length();
    if length > MAX_OP_LENGTH {
        return Err(BfaError::Encode {
            msg: format!("CIGAR run length {} exceeds 28 bits", length),
        });
    }
    Ok((length << 4) | op.op_code())
}

/// Unpack one operation.
///
/// # Errors
///
/// Operation classes above 8 are a format error.
pub fn unpack_op(packed: u32) -> Result<CigarOp> {
    CigarOp::from_parts(packed & 0x0f, packed >> 4)
}

/// Encode an overlap value: `u32` count, then the packed operations.
pub fn encode(buf: &mut Vec<u8>, ops: &[CigarOp]) -> Result<()> {
    buf.extend_from_slice(&(ops.len() as u32).to_le_bytes());
    for &op in ops {
        buf.extend_from_slice(&pack_op(op)?.to_le_bytes());
    }
    Ok(())
}

/// Decode an overlap value. Count 0 decodes to an empty list (`*`).
pub fn decode<R: Read>(reader: &mut R) -> Result<Vec<CigarOp>> {
    let count = super::value::read_u32(reader, "CIGAR op count")? as usize;
    let mut ops = Vec::with_capacity(count);
    for _ in 0..count {
        let packed = super::value::read_u32(reader, "CIGAR op")?;
        ops.push(unpack_op(packed)?);
    }
    Ok(ops)
}
