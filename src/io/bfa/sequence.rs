//! 4-bit nucleotide sequence packing.
//!
//! Sequences use the 16-symbol alphabet `=ACMGRSVTWYHKDBN` (IUPAC ambiguity
//! codes), one symbol per nibble, two per byte with the first symbol in the
//! high nibble. Odd-length sequences pad the final low nibble with zero;
//! the declared character count disambiguates on decode. Unknown symbols
//! map to the fully ambiguous code `N`. Input is case-insensitive; output
//! is uppercase.

use crate::error::Result;
use std::io::Read;

/// The 16-symbol packing alphabet, index = 4-bit code.
pub const ALPHABET: &[u8; 16] = b"=ACMGRSVTWYHKDBN";

fn char_to_code(c: u8) -> u8 {
    let upper = c.to_ascii_uppercase();
    ALPHABET
        .iter()
        .position(|&a| a == upper)
        .unwrap_or(15) as u8
}

/// Pack a sequence into 4-bit codes, two per byte.
pub fn pack(sequence: &str) -> Vec<u8> {
    let bytes = sequence.as_bytes();
    let mut packed = Vec::with_capacity((bytes.len() + 1) / 2);
    for pair in bytes.chunks(2) {
        let high = char_to_code(pair[0]);
        let low = if pair.len() == 2 {
            char_to_code(pair[1])
        } else {
            0
        };
        packed.push((high << 4) | low);
    }
    packed
}

/// Unpack `count` characters from packed bytes.
///
/// Extra nibbles beyond `count` (the odd-length pad) are discarded.
pub fn unpack(packed: &[u8], count: usize) -> String {
    let mut out = String::with_capacity(count);
    for (i, &byte) in packed.iter().enumerate() {
        if 2 * i < count {
            out.push(ALPHABET[(byte >> 4) as usize] as char);
        }
        if 2 * i + 1 < count {
            out.push(ALPHABET[(byte & 0x0f) as usize] as char);
        }
    }
    out
}

/// Encode a sequence value: `u32` character count, then the packed bytes.
///
/// The absent marker `*` encodes as count 0 with no payload.
pub fn encode(buf: &mut Vec<u8>, sequence: &str) {
    if sequence == "*" {
        buf.extend_from_slice(&0u32.to_le_bytes());
        return;
    }
    buf.extend_from_slice(&(sequence.len() as u32).to_le_bytes());
    buf.extend_from_slice(&pack(sequence));
}

/// Decode a sequence value. Count 0 decodes to the absent marker `*`.
pub fn decode<R: Read>(reader: &mut R) -> Result<String> {
    let count = super::value::read_u32(reader, "sequence length")? as usize;
    if count == 0 {
        return Ok("*".to_string());
    }
    let mut packed = vec![0u8; (count + 1) / 2];
    super::value::read_exact(reader, &mut packed, "sequence")?;
    Ok(unpack(&packed, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_even_length() {
        // A=1, C=2, G=4, T=8
        assert_eq!(pack("ACGT"), vec![0x12, 0x48]);
    }

    #[test]
    fn test_pack_odd_length_pads_zero() {
        assert_eq!(pack("ACG"), vec![0x12, 0x40]);
    }

    #[test]
    fn test_unpack_truncates_to_count() {
        assert_eq!(unpack(&[0x12, 0x40], 3), "ACG");
        assert_eq!(unpack(&[0x12, 0x48], 4), "ACGT");
    }

    #[test]
    fn test_case_insensitive_uppercase_out() {
        let packed = pack("acgt");
        assert_eq!(unpack(&packed, 4), "ACGT");
    }

    #[test]
    fn test_unknown_symbol_becomes_n() {
        let packed = pack("AQ");
        assert_eq!(unpack(&packed, 2), "AN");
    }

    #[test]
    fn test_full_alphabet_round_trip() {
        let seq = "=ACMGRSVTWYHKDBN";
        assert_eq!(unpack(&pack(seq), seq.len()), seq);
    }

    #[test]
    fn test_encode_absent() {
        let mut buf = Vec::new();
        encode(&mut buf, "*");
        assert_eq!(buf, 0u32.to_le_bytes());
        let decoded = decode(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, "*");
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let mut buf = Vec::new();
        encode(&mut buf, "ACGTN");
        assert_eq!(buf.len(), 4 + 3);
        let decoded = decode(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, "ACGTN");
    }

    #[test]
    fn test_decode_truncated() {
        let mut buf = Vec::new();
        encode(&mut buf, "ACGTACGT");
        buf.truncate(6);
        assert!(matches!(
            decode(&mut buf.as_slice()),
            Err(crate::error::BfaError::Truncated { .. })
        ));
    }
}
