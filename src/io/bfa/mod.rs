//! BFA binary container format.
//!
//! BFA is a compact binary encoding of an assembly graph. A file is the
//! 4-byte magic [`MAGIC`] followed by five sections in fixed order —
//! Headers, Segments, Links, Containments, Paths — each prefixed with a
//! `u32` element count. All integers are little-endian. The whole container
//! is optionally wrapped in a gzip stream; the reader detects this from the
//! leading bytes.
//!
//! Compactness comes from three encodings:
//! - nucleotide sequences are packed two characters per byte
//!   ([`sequence`]),
//! - alignment overlaps are packed one operation per `u32` ([`cigar`]),
//! - integer fields are stored in the smallest sufficient width
//!   ([`value`]).
//!
//! Links, containments and paths do not repeat segment names: they refer
//! back to earlier sections by signed 1-based position, the sign carrying
//! the orientation or traversal direction.

pub mod cigar;
pub mod reader;
pub mod sequence;
pub mod value;
pub mod writer;

pub use reader::{read_file, BfaReader};
pub use writer::{to_bytes, write_file, BfaWriter};

/// Magic string at the start of every BFA file.
pub const MAGIC: &[u8; 4] = b"BFA\x01";

/// Byte width of one numeric subtype.
///
/// `f` is an 8-byte double everywhere, including array elements.
pub fn numeric_width(type_code: u8) -> Option<usize> {
    match type_code {
        b'c' | b'C' => Some(1),
        b's' | b'S' => Some(2),
        b'i' | b'I' => Some(4),
        b'f' => Some(8),
        _ => None,
    }
}
