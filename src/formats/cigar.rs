//! CIGAR alignment operations for GFA overlaps.
//!
//! GFA links, containments and paths describe the overlap between two
//! segments as a CIGAR string: a run-length list of alignment operations
//! such as `4M2I3M`. An absent overlap is written as `*` in the text format
//! and is represented here as an empty operation list.
//!
//! # Operations
//!
//! - M: Match/mismatch (alignment match, can include mismatches)
//! - I: Insertion
//! - D: Deletion
//! - N: Skipped region
//! - S: Soft clipping
//! - H: Hard clipping
//! - P: Padding
//! - =: Sequence match
//! - X: Sequence mismatch

use crate::error::{BfaError, Result};
use std::fmt;

/// CIGAR operation types.
///
/// Each operation describes a type of alignment event and its run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    /// Match or mismatch (M)
    Match(u32),
    /// Insertion (I)
    Insertion(u32),
    /// Deletion (D)
    Deletion(u32),
    /// Skipped region (N)
    RefSkip(u32),
    /// Soft clipping (S)
    SoftClip(u32),
    /// Hard clipping (H)
    HardClip(u32),
    /// Padding (P)
    Padding(u32),
    /// Sequence match (=)
    SeqMatch(u32),
    /// Sequence mismatch (X)
    SeqMismatch(u32),
}

impl CigarOp {
    /// Get the operation run length.
    pub fn length(&self) -> u32 {
        match self {
            CigarOp::Match(len)
            | CigarOp::Insertion(len)
            | CigarOp::Deletion(len)
            | CigarOp::RefSkip(len)
            | CigarOp::SoftClip(len)
            | CigarOp::HardClip(len)
            | CigarOp::Padding(len)
            | CigarOp::SeqMatch(len)
            | CigarOp::SeqMismatch(len) => *len,
        }
    }

    /// Get the operation class as a character (for the text format).
    pub fn as_char(&self) -> char {
        match self {
            CigarOp::Match(_) => 'M',
            CigarOp::Insertion(_) => 'I',
            CigarOp::Deletion(_) => 'D',
            CigarOp::RefSkip(_) => 'N',
            CigarOp::SoftClip(_) => 'S',
            CigarOp::HardClip(_) => 'H',
            CigarOp::Padding(_) => 'P',
            CigarOp::SeqMatch(_) => '=',
            CigarOp::SeqMismatch(_) => 'X',
        }
    }

    /// Get the numeric operation class, 0-8.
    ///
    /// The table is fixed: M=0, I=1, D=2, N=3, S=4, H=5, P=6, ==7, X=8.
    pub fn op_code(&self) -> u32 {
        match self {
            CigarOp::Match(_) => 0,
            CigarOp::Insertion(_) => 1,
            CigarOp::Deletion(_) => 2,
            CigarOp::RefSkip(_) => 3,
            CigarOp::SoftClip(_) => 4,
            CigarOp::HardClip(_) => 5,
            CigarOp::Padding(_) => 6,
            CigarOp::SeqMatch(_) => 7,
            CigarOp::SeqMismatch(_) => 8,
        }
    }

    /// Build an operation from its numeric class and run length.
    ///
    /// # Errors
    ///
    /// Returns an error if `op_code` is not in 0-8.
    pub fn from_parts(op_code: u32, length: u32) -> Result<Self> {
        Ok(match op_code {
            0 => CigarOp::Match(length),
            1 => CigarOp::Insertion(length),
            2 => CigarOp::Deletion(length),
            3 => CigarOp::RefSkip(length),
            4 => CigarOp::SoftClip(length),
            5 => CigarOp::HardClip(length),
            6 => CigarOp::Padding(length),
            7 => CigarOp::SeqMatch(length),
            8 => CigarOp::SeqMismatch(length),
            other => {
                return Err(BfaError::UnknownFieldType {
                    type_code: other as u8,
                })
            }
        })
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.length(), self.as_char())
    }
}

/// Parse a CIGAR string from its text representation.
///
/// `*` (absent overlap) parses to an empty list.
///
/// # Examples
///
/// ```
/// use bfa::formats::cigar::{parse_cigar, CigarOp};
///
/// let ops = parse_cigar("4M2I").unwrap();
/// assert_eq!(ops, vec![CigarOp::Match(4), CigarOp::Insertion(2)]);
/// assert!(parse_cigar("*").unwrap().is_empty());
/// ```
pub fn parse_cigar(text: &str) -> Result<Vec<CigarOp>> {
    if text == "*" || text.is_empty() {
        return Ok(Vec::new());
    }

    let mut ops = Vec::new();
    let mut length: u32 = 0;
    let mut have_digits = false;

    for c in text.chars() {
        if let Some(d) = c.to_digit(10) {
            length = length
                .checked_mul(10)
                .and_then(|l| l.checked_add(d))
                .ok_or_else(|| BfaError::InvalidGfaFormat {
                    line: 0,
                    msg: format!("CIGAR run length overflow in {:?}", text),
                })?;
            have_digits = true;
        } else {
            if !have_digits {
                return Err(BfaError::InvalidGfaFormat {
                    line: 0,
                    msg: format!("CIGAR operation {:?} without run length in {:?}", c, text),
                });
            }
            let op = match c {
                'M' => CigarOp::Match(length),
                'I' => CigarOp::Insertion(length),
                'D' => CigarOp::Deletion(length),
                'N' => CigarOp::RefSkip(length),
                'S' => CigarOp::SoftClip(length),
                'H' => CigarOp::HardClip(length),
                'P' => CigarOp::Padding(length),
                '=' => CigarOp::SeqMatch(length),
                'X' => CigarOp::SeqMismatch(length),
                other => {
                    return Err(BfaError::InvalidGfaFormat {
                        line: 0,
                        msg: format!("Invalid CIGAR operation: {:?}", other),
                    })
                }
            };
            ops.push(op);
            length = 0;
            have_digits = false;
        }
    }

    if have_digits {
        return Err(BfaError::InvalidGfaFormat {
            line: 0,
            msg: format!("CIGAR ends with a dangling run length: {:?}", text),
        });
    }

    Ok(ops)
}

/// Format a CIGAR operation list as text.
///
/// An empty list formats as `*`.
pub fn cigar_to_string(ops: &[CigarOp]) -> String {
    if ops.is_empty() {
        return "*".to_string();
    }
    ops.iter().map(|op| op.to_string()).collect()
}

/// Reverse an overlap for traversal against its stored direction.
///
/// Reverses the operation order; operation classes are kept.
pub fn reverse_cigar(ops: &[CigarOp]) -> Vec<CigarOp> {
    ops.iter().rev().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let ops = parse_cigar("4M").unwrap();
        assert_eq!(ops, vec![CigarOp::Match(4)]);
    }

    #[test]
    fn test_parse_multi_op() {
        let ops = parse_cigar("12M3I4D1=2X").unwrap();
        assert_eq!(
            ops,
            vec![
                CigarOp::Match(12),
                CigarOp::Insertion(3),
                CigarOp::Deletion(4),
                CigarOp::SeqMatch(1),
                CigarOp::SeqMismatch(2),
            ]
        );
    }

    #[test]
    fn test_parse_absent() {
        assert!(parse_cigar("*").unwrap().is_empty());
        assert!(parse_cigar("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_cigar("M").is_err());
        assert!(parse_cigar("4Q").is_err());
        assert!(parse_cigar("4M3").is_err());
    }

    #[test]
    fn test_round_trip_text() {
        for text in ["4M", "10M5I2D", "3S7M1H", "*"] {
            let ops = parse_cigar(text).unwrap();
            assert_eq!(cigar_to_string(&ops), text);
        }
    }

    #[test]
    fn test_op_code_table() {
        let ops = parse_cigar("1M1I1D1N1S1H1P1=1X").unwrap();
        let codes: Vec<u32> = ops.iter().map(|op| op.op_code()).collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(CigarOp::from_parts(0, 5).unwrap(), CigarOp::Match(5));
        assert_eq!(CigarOp::from_parts(8, 1).unwrap(), CigarOp::SeqMismatch(1));
        assert!(CigarOp::from_parts(9, 1).is_err());
    }

    #[test]
    fn test_reverse() {
        let ops = parse_cigar("4M2I").unwrap();
        assert_eq!(
            reverse_cigar(&ops),
            vec![CigarOp::Insertion(2), CigarOp::Match(4)]
        );
    }
}
