//! GFA (Graphical Fragment Assembly) text format.
//!
//! GFA is a tab-delimited text format for assembly graphs:
//! - **H**: Header
//! - **S**: Segment (node with sequence)
//! - **L**: Link (edge between two oriented segment ends)
//! - **C**: Containment (a segment contained within another at a position)
//! - **P**: Path (ordered walk through the graph)
//!
//! Records carry optional fields in `TAG:TYPE:VALUE` form. Unlike a plain
//! string map, this module parses them into a typed representation
//! ([`Tag`]/[`TagValue`]) so that values survive a binary round trip with
//! their exact type.
//!
//! # Examples
//!
//! ```
//! use bfa::formats::gfa::{GfaRecord, TagValue};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let record = GfaRecord::from_line("S\tctg1\tACGTACGT\tRC:i:42")?;
//!
//! if let GfaRecord::Segment(seg) = record {
//!     assert_eq!(seg.name, "ctg1");
//!     assert_eq!(seg.sequence, "ACGTACGT");
//!     assert_eq!(seg.tag("RC"), Some(&TagValue::Int(42)));
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{BfaError, Result};
use crate::formats::cigar::{cigar_to_string, parse_cigar, reverse_cigar, CigarOp};
use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::str::FromStr;

/// Segment/edge orientation.
///
/// - `+`: Forward orientation
/// - `-`: Reverse orientation (reverse complement)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Forward orientation (+)
    Forward,
    /// Reverse orientation (-)
    Reverse,
}

impl Orientation {
    /// The opposite orientation.
    pub fn flip(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reverse,
            Orientation::Reverse => Orientation::Forward,
        }
    }

    /// The ASCII byte used on the wire and in text: `+` or `-`.
    pub fn as_byte(self) -> u8 {
        match self {
            Orientation::Forward => b'+',
            Orientation::Reverse => b'-',
        }
    }

    /// Parse from the ASCII byte `+` or `-`.
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            b'+' => Ok(Orientation::Forward),
            b'-' => Ok(Orientation::Reverse),
            other => Err(BfaError::InvalidGfaFormat {
                line: 0,
                msg: format!("Invalid orientation byte: {:?}", other as char),
            }),
        }
    }
}

impl FromStr for Orientation {
    type Err = BfaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Orientation::Forward),
            "-" => Ok(Orientation::Reverse),
            _ => Err(BfaError::InvalidGfaFormat {
                line: 0,
                msg: format!("Invalid orientation: {} (expected '+' or '-')", s),
            }),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Orientation::Forward => write!(f, "+"),
            Orientation::Reverse => write!(f, "-"),
        }
    }
}

/// Homogeneous numeric array for `B`-typed optional fields.
///
/// The element subtype is explicit in both the text form (`B:c,1,2`) and the
/// binary form (a subtype byte before the element count). Float elements are
/// 8-byte doubles.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericArray {
    /// Signed 8-bit elements (subtype `c`)
    Int8(Vec<i8>),
    /// Unsigned 8-bit elements (subtype `C`)
    UInt8(Vec<u8>),
    /// Signed 16-bit elements (subtype `s`)
    Int16(Vec<i16>),
    /// Unsigned 16-bit elements (subtype `S`)
    UInt16(Vec<u16>),
    /// Signed 32-bit elements (subtype `i`)
    Int32(Vec<i32>),
    /// Unsigned 32-bit elements (subtype `I`)
    UInt32(Vec<u32>),
    /// Double-precision float elements (subtype `f`)
    Float(Vec<f64>),
}

impl NumericArray {
    /// The one-byte subtype code declaring the element type.
    pub fn subtype_code(&self) -> u8 {
        match self {
            NumericArray::Int8(_) => b'c',
            NumericArray::UInt8(_) => b'C',
            NumericArray::Int16(_) => b's',
            NumericArray::UInt16(_) => b'S',
            NumericArray::Int32(_) => b'i',
            NumericArray::UInt32(_) => b'I',
            NumericArray::Float(_) => b'f',
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            NumericArray::Int8(v) => v.len(),
            NumericArray::UInt8(v) => v.len(),
            NumericArray::Int16(v) => v.len(),
            NumericArray::UInt16(v) => v.len(),
            NumericArray::Int32(v) => v.len(),
            NumericArray::UInt32(v) => v.len(),
            NumericArray::Float(v) => v.len(),
        }
    }

    /// True if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn parse_text(text: &str) -> Result<Self> {
        let mut parts = text.split(',');
        let subtype = parts.next().unwrap_or("");
        if subtype.len() != 1 {
            return Err(BfaError::InvalidGfaFormat {
                line: 0,
                msg: format!("Invalid numeric array subtype: {:?}", subtype),
            });
        }

        fn collect<'a, T: FromStr>(parts: impl Iterator<Item = &'a str>) -> Result<Vec<T>> {
            parts
                .map(|p| {
                    p.parse::<T>().map_err(|_| BfaError::InvalidGfaFormat {
                        line: 0,
                        msg: format!("Invalid numeric array element: {:?}", p),
                    })
                })
                .collect()
        }

        Ok(match subtype.as_bytes()[0] {
            b'c' => NumericArray::Int8(collect(parts)?),
            b'C' => NumericArray::UInt8(collect(parts)?),
            b's' => NumericArray::Int16(collect(parts)?),
            b'S' => NumericArray::UInt16(collect(parts)?),
            b'i' => NumericArray::Int32(collect(parts)?),
            b'I' => NumericArray::UInt32(collect(parts)?),
            b'f' => NumericArray::Float(collect(parts)?),
            other => return Err(BfaError::UnknownFieldType { type_code: other }),
        })
    }
}

impl fmt::Display for NumericArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, v: &[T]) -> fmt::Result {
            for x in v {
                write!(f, ",{}", x)?;
            }
            Ok(())
        }
        write!(f, "{}", self.subtype_code() as char)?;
        match self {
            NumericArray::Int8(v) => join(f, v),
            NumericArray::UInt8(v) => join(f, v),
            NumericArray::Int16(v) => join(f, v),
            NumericArray::UInt16(v) => join(f, v),
            NumericArray::Int32(v) => join(f, v),
            NumericArray::UInt32(v) => join(f, v),
            NumericArray::Float(v) => join(f, v),
        }
    }
}

/// Typed value of an optional field.
///
/// The variant is the logical type; integer subtypes chosen on the wire all
/// decode back to [`TagValue::Int`].
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    /// Printable character (`A`)
    Char(u8),
    /// Integer (`i`, any wire subtype)
    Int(i64),
    /// Double-precision float (`f`)
    Float(f64),
    /// String (`Z`)
    String(String),
    /// JSON text (`J`), kept in its textual form
    Json(String),
    /// Byte array (`H`), hex-encoded in text
    Hex(Vec<u8>),
    /// Numeric array (`B`)
    Array(NumericArray),
}

impl TagValue {
    /// The logical one-byte type code: `A`, `i`, `f`, `Z`, `J`, `H` or `B`.
    pub fn type_code(&self) -> u8 {
        match self {
            TagValue::Char(_) => b'A',
            TagValue::Int(_) => b'i',
            TagValue::Float(_) => b'f',
            TagValue::String(_) => b'Z',
            TagValue::Json(_) => b'J',
            TagValue::Hex(_) => b'H',
            TagValue::Array(_) => b'B',
        }
    }

    fn parse_text(type_code: u8, text: &str) -> Result<Self> {
        Ok(match type_code {
            b'A' => {
                if text.len() != 1 {
                    return Err(BfaError::InvalidGfaFormat {
                        line: 0,
                        msg: format!("A-typed value must be one character: {:?}", text),
                    });
                }
                TagValue::Char(text.as_bytes()[0])
            }
            b'i' => TagValue::Int(text.parse().map_err(|_| BfaError::InvalidGfaFormat {
                line: 0,
                msg: format!("Invalid integer value: {:?}", text),
            })?),
            b'f' => TagValue::Float(text.parse().map_err(|_| BfaError::InvalidGfaFormat {
                line: 0,
                msg: format!("Invalid float value: {:?}", text),
            })?),
            b'Z' => TagValue::String(text.to_string()),
            b'J' => TagValue::Json(text.to_string()),
            b'H' => {
                if text.len() % 2 != 0 {
                    return Err(BfaError::InvalidGfaFormat {
                        line: 0,
                        msg: format!("Odd-length hex value: {:?}", text),
                    });
                }
                let mut bytes = Vec::with_capacity(text.len() / 2);
                for i in (0..text.len()).step_by(2) {
                    let byte = u8::from_str_radix(&text[i..i + 2], 16).map_err(|_| {
                        BfaError::InvalidGfaFormat {
                            line: 0,
                            msg: format!("Invalid hex value: {:?}", text),
                        }
                    })?;
                    bytes.push(byte);
                }
                TagValue::Hex(bytes)
            }
            b'B' => TagValue::Array(NumericArray::parse_text(text)?),
            other => return Err(BfaError::UnknownFieldType { type_code: other }),
        })
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Char(c) => write!(f, "A:{}", *c as char),
            TagValue::Int(i) => write!(f, "i:{}", i),
            TagValue::Float(x) => write!(f, "f:{}", x),
            TagValue::String(s) => write!(f, "Z:{}", s),
            TagValue::Json(s) => write!(f, "J:{}", s),
            TagValue::Hex(bytes) => {
                write!(f, "H:")?;
                for b in bytes {
                    write!(f, "{:02X}", b)?;
                }
                Ok(())
            }
            TagValue::Array(arr) => write!(f, "B:{}", arr),
        }
    }
}

/// A single optional field: two-character name plus typed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// Two-character tag name (e.g. "RC", "LN")
    pub name: [u8; 2],
    /// Typed value
    pub value: TagValue,
}

impl Tag {
    /// Build a tag from a two-character name and a value.
    pub fn new(name: [u8; 2], value: TagValue) -> Self {
        Tag { name, value }
    }

    /// Tag name as a string slice.
    pub fn name_str(&self) -> &str {
        std::str::from_utf8(&self.name).unwrap_or("??")
    }

    /// Parse one `TAG:TYPE:VALUE` text field.
    pub fn from_text(field: &str) -> Result<Self> {
        let mut parts = field.splitn(3, ':');
        let name = parts.next().unwrap_or("");
        let type_str = parts.next().unwrap_or("");
        let value_str = parts.next().unwrap_or("");

        if name.len() != 2 || type_str.len() != 1 {
            return Err(BfaError::InvalidGfaFormat {
                line: 0,
                msg: format!("Invalid optional field: {:?}", field),
            });
        }

        let name_bytes = name.as_bytes();
        Ok(Tag {
            name: [name_bytes[0], name_bytes[1]],
            value: TagValue::parse_text(type_str.as_bytes()[0], value_str)?,
        })
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name_str(), self.value)
    }
}

/// Look up the first tag with the given name.
pub fn find_tag<'a>(tags: &'a [Tag], name: &str) -> Option<&'a TagValue> {
    let name = name.as_bytes();
    if name.len() != 2 {
        return None;
    }
    tags.iter()
        .find(|t| t.name == [name[0], name[1]])
        .map(|t| &t.value)
}

fn parse_tags(fields: &[&str]) -> Result<Vec<Tag>> {
    fields.iter().map(|f| Tag::from_text(f)).collect()
}

fn tags_to_line(line: &mut String, tags: &[Tag]) {
    for tag in tags {
        line.push('\t');
        line.push_str(&tag.to_string());
    }
}

/// GFA Header record (H line).
///
/// Tags are kept in insertion order; a name may repeat, in which case all
/// values are retained.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GfaHeader {
    /// Header tags in insertion order (e.g. VN:Z:1.0)
    pub tags: Vec<Tag>,
}

impl GfaHeader {
    /// First value recorded for `name`, if any.
    pub fn tag(&self, name: &str) -> Option<&TagValue> {
        find_tag(&self.tags, name)
    }

    /// All values recorded for `name`, in insertion order.
    pub fn tag_values(&self, name: &str) -> Vec<&TagValue> {
        let name = name.as_bytes();
        if name.len() != 2 {
            return Vec::new();
        }
        self.tags
            .iter()
            .filter(|t| t.name == [name[0], name[1]])
            .map(|t| &t.value)
            .collect()
    }

    /// Parse from an `H` line.
    pub fn from_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields[0] != "H" {
            return Err(BfaError::InvalidGfaFormat {
                line: 0,
                msg: format!("Expected 'H', got {:?}", fields[0]),
            });
        }
        Ok(GfaHeader {
            tags: parse_tags(&fields[1..])?,
        })
    }

    /// Format as an `H` line.
    pub fn to_line(&self) -> String {
        let mut line = "H".to_string();
        tags_to_line(&mut line, &self.tags);
        line
    }
}

/// GFA Segment record (S line).
///
/// A node in the assembly graph with an associated sequence; `*` denotes an
/// absent sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct GfaSegment {
    /// Segment name
    pub name: String,
    /// Segment sequence, or `*` when absent
    pub sequence: String,
    /// Optional fields in insertion order
    pub tags: Vec<Tag>,
}

impl GfaSegment {
    /// First value of the optional field `name`, if present.
    pub fn tag(&self, name: &str) -> Option<&TagValue> {
        find_tag(&self.tags, name)
    }

    /// Sequence length in characters; for an absent sequence, the value of
    /// the `LN` tag if declared, otherwise 0.
    pub fn length(&self) -> usize {
        if self.sequence == "*" {
            match self.tag("LN") {
                Some(TagValue::Int(n)) if *n >= 0 => *n as usize,
                _ => 0,
            }
        } else {
            self.sequence.len()
        }
    }

    /// Parse from an `S` line.
    pub fn from_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 || fields[0] != "S" {
            return Err(BfaError::InvalidGfaFormat {
                line: 0,
                msg: format!("Invalid segment line: {:?}", line),
            });
        }
        Ok(GfaSegment {
            name: fields[1].to_string(),
            sequence: fields[2].to_string(),
            tags: parse_tags(&fields[3..])?,
        })
    }

    /// Format as an `S` line.
    pub fn to_line(&self) -> String {
        let mut line = format!("S\t{}\t{}", self.name, self.sequence);
        tags_to_line(&mut line, &self.tags);
        line
    }
}

/// GFA Link record (L line).
///
/// An edge between two oriented segment ends with an overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct GfaLink {
    /// Source segment name
    pub from_segment: String,
    /// Source segment orientation
    pub from_orient: Orientation,
    /// Target segment name
    pub to_segment: String,
    /// Target segment orientation
    pub to_orient: Orientation,
    /// Overlap between the segments; empty for `*`
    pub overlap: Vec<CigarOp>,
    /// Optional fields in insertion order
    pub tags: Vec<Tag>,
}

impl GfaLink {
    /// First value of the optional field `name`, if present.
    pub fn tag(&self, name: &str) -> Option<&TagValue> {
        find_tag(&self.tags, name)
    }

    /// The same edge traversed in the opposite direction: endpoints swapped,
    /// orientations flipped, overlap operation order reversed.
    pub fn reversed(&self) -> GfaLink {
        GfaLink {
            from_segment: self.to_segment.clone(),
            from_orient: self.to_orient.flip(),
            to_segment: self.from_segment.clone(),
            to_orient: self.from_orient.flip(),
            overlap: reverse_cigar(&self.overlap),
            tags: self.tags.clone(),
        }
    }

    /// Parse from an `L` line.
    pub fn from_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 6 || fields[0] != "L" {
            return Err(BfaError::InvalidGfaFormat {
                line: 0,
                msg: format!("Invalid link line: {:?}", line),
            });
        }
        Ok(GfaLink {
            from_segment: fields[1].to_string(),
            from_orient: fields[2].parse()?,
            to_segment: fields[3].to_string(),
            to_orient: fields[4].parse()?,
            overlap: parse_cigar(fields[5])?,
            tags: parse_tags(&fields[6..])?,
        })
    }

    /// Format as an `L` line.
    pub fn to_line(&self) -> String {
        let mut line = format!(
            "L\t{}\t{}\t{}\t{}\t{}",
            self.from_segment,
            self.from_orient,
            self.to_segment,
            self.to_orient,
            cigar_to_string(&self.overlap)
        );
        tags_to_line(&mut line, &self.tags);
        line
    }
}

/// GFA Containment record (C line).
///
/// Records that a segment is contained within another, starting at `pos`
/// on the containing segment.
#[derive(Debug, Clone, PartialEq)]
pub struct GfaContainment {
    /// Containing segment name
    pub from_segment: String,
    /// Containing segment orientation
    pub from_orient: Orientation,
    /// Contained segment name
    pub to_segment: String,
    /// Contained segment orientation
    pub to_orient: Orientation,
    /// 0-based start of the contained segment on the containing one
    pub pos: u32,
    /// Overlap; empty for `*`
    pub overlap: Vec<CigarOp>,
    /// Optional fields in insertion order
    pub tags: Vec<Tag>,
}

impl GfaContainment {
    /// First value of the optional field `name`, if present.
    pub fn tag(&self, name: &str) -> Option<&TagValue> {
        find_tag(&self.tags, name)
    }

    /// Parse from a `C` line.
    pub fn from_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 7 || fields[0] != "C" {
            return Err(BfaError::InvalidGfaFormat {
                line: 0,
                msg: format!("Invalid containment line: {:?}", line),
            });
        }
        let pos = fields[5].parse().map_err(|_| BfaError::InvalidGfaFormat {
            line: 0,
            msg: format!("Invalid containment position: {:?}", fields[5]),
        })?;
        Ok(GfaContainment {
            from_segment: fields[1].to_string(),
            from_orient: fields[2].parse()?,
            to_segment: fields[3].to_string(),
            to_orient: fields[4].parse()?,
            pos,
            overlap: parse_cigar(fields[6])?,
            tags: parse_tags(&fields[7..])?,
        })
    }

    /// Format as a `C` line.
    pub fn to_line(&self) -> String {
        let mut line = format!(
            "C\t{}\t{}\t{}\t{}\t{}\t{}",
            self.from_segment,
            self.from_orient,
            self.to_segment,
            self.to_orient,
            self.pos,
            cigar_to_string(&self.overlap)
        );
        tags_to_line(&mut line, &self.tags);
        line
    }
}

/// GFA Path record (P line).
///
/// An ordered traversal through the graph. A path is circular when it
/// carries one overlap per step *including* the wrap-around step, i.e. as
/// many overlaps as segments.
#[derive(Debug, Clone, PartialEq)]
pub struct GfaPath {
    /// Path name
    pub name: String,
    /// Ordered oriented segments
    pub segments: Vec<(String, Orientation)>,
    /// Per-step overlaps (one fewer than segments when linear, equal when
    /// circular); an empty inner list means `*`
    pub overlaps: Vec<Vec<CigarOp>>,
    /// True if the path wraps around to its first segment
    pub circular: bool,
    /// Optional fields in insertion order
    pub tags: Vec<Tag>,
}

impl GfaPath {
    /// First value of the optional field `name`, if present.
    pub fn tag(&self, name: &str) -> Option<&TagValue> {
        find_tag(&self.tags, name)
    }

    /// Parse from a `P` line.
    pub fn from_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 4 || fields[0] != "P" {
            return Err(BfaError::InvalidGfaFormat {
                line: 0,
                msg: format!("Invalid path line: {:?}", line),
            });
        }

        let mut segments = Vec::new();
        for part in fields[2].split(',') {
            let part = part.trim();
            if part.len() < 2 {
                return Err(BfaError::InvalidGfaFormat {
                    line: 0,
                    msg: format!("Invalid oriented segment: {:?}", part),
                });
            }
            let (name, orient) = part.split_at(part.len() - 1);
            segments.push((name.to_string(), orient.parse()?));
        }

        let overlaps: Vec<Vec<CigarOp>> = if fields[3] == "*" || fields[3].is_empty() {
            Vec::new()
        } else {
            fields[3]
                .split(',')
                .map(|s| parse_cigar(s.trim()))
                .collect::<Result<_>>()?
        };

        // One overlap per step including the wrap-around step means circular.
        let circular = !overlaps.is_empty() && overlaps.len() == segments.len();

        Ok(GfaPath {
            name: fields[1].to_string(),
            segments,
            overlaps,
            circular,
            tags: parse_tags(&fields[4..])?,
        })
    }

    /// Format as a `P` line.
    pub fn to_line(&self) -> String {
        let segments_str = self
            .segments
            .iter()
            .map(|(name, orient)| format!("{}{}", name, orient))
            .collect::<Vec<_>>()
            .join(",");
        let overlaps_str = if self.overlaps.is_empty() {
            "*".to_string()
        } else {
            self.overlaps
                .iter()
                .map(|c| cigar_to_string(c))
                .collect::<Vec<_>>()
                .join(",")
        };
        let mut line = format!("P\t{}\t{}\t{}", self.name, segments_str, overlaps_str);
        tags_to_line(&mut line, &self.tags);
        line
    }
}

/// Unified GFA record type.
#[derive(Debug, Clone, PartialEq)]
pub enum GfaRecord {
    /// Header record (H)
    Header(GfaHeader),
    /// Segment record (S)
    Segment(GfaSegment),
    /// Link record (L)
    Link(GfaLink),
    /// Containment record (C)
    Containment(GfaContainment),
    /// Path record (P)
    Path(GfaPath),
    /// Comment or unrecognized record, kept verbatim
    Comment(String),
}

impl GfaRecord {
    /// Parses a GFA record from a line, dispatching on the first character.
    pub fn from_line(line: &str) -> Result<Self> {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            return Ok(GfaRecord::Comment(line.to_string()));
        }
        match line.as_bytes()[0] {
            b'H' => Ok(GfaRecord::Header(GfaHeader::from_line(line)?)),
            b'S' => Ok(GfaRecord::Segment(GfaSegment::from_line(line)?)),
            b'L' => Ok(GfaRecord::Link(GfaLink::from_line(line)?)),
            b'C' => Ok(GfaRecord::Containment(GfaContainment::from_line(line)?)),
            b'P' => Ok(GfaRecord::Path(GfaPath::from_line(line)?)),
            _ => Ok(GfaRecord::Comment(line.to_string())),
        }
    }

    /// Converts the record back to a GFA line.
    pub fn to_line(&self) -> String {
        match self {
            GfaRecord::Header(h) => h.to_line(),
            GfaRecord::Segment(s) => s.to_line(),
            GfaRecord::Link(l) => l.to_line(),
            GfaRecord::Containment(c) => c.to_line(),
            GfaRecord::Path(p) => p.to_line(),
            GfaRecord::Comment(c) => c.clone(),
        }
    }
}

/// Streaming GFA parser.
///
/// Iterates records one line at a time with constant memory. Empty lines and
/// `#` comments are skipped.
pub struct GfaParser<R: Read> {
    reader: BufReader<R>,
    line_buf: String,
    line_number: usize,
}

impl<R: Read> GfaParser<R> {
    /// Creates a new GFA parser from a reader.
    pub fn new(reader: R) -> Self {
        GfaParser {
            reader: BufReader::new(reader),
            line_buf: String::new(),
            line_number: 0,
        }
    }

    /// Current 1-based line number.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: Read> Iterator for GfaParser<R> {
    type Item = Result<GfaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_buf.clear();
            match self.reader.read_line(&mut self.line_buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    let line = self.line_buf.trim_end();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    let line_number = self.line_number;
                    return Some(GfaRecord::from_line(line).map_err(|e| match e {
                        BfaError::InvalidGfaFormat { msg, .. } => BfaError::InvalidGfaFormat {
                            line: line_number,
                            msg,
                        },
                        other => other,
                    }));
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_parse() {
        assert_eq!("+".parse::<Orientation>().unwrap(), Orientation::Forward);
        assert_eq!("-".parse::<Orientation>().unwrap(), Orientation::Reverse);
        assert!("x".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_segment_basic() {
        let seg = GfaSegment::from_line("S\tctg1\tACGTACGT").unwrap();
        assert_eq!(seg.name, "ctg1");
        assert_eq!(seg.sequence, "ACGTACGT");
        assert_eq!(seg.length(), 8);
    }

    #[test]
    fn test_segment_typed_tags() {
        let seg = GfaSegment::from_line("S\tctg1\tACGT\tLN:i:4\tRC:i:10").unwrap();
        assert_eq!(seg.tag("LN"), Some(&TagValue::Int(4)));
        assert_eq!(seg.tag("RC"), Some(&TagValue::Int(10)));
    }

    #[test]
    fn test_segment_absent_sequence() {
        let seg = GfaSegment::from_line("S\tctg1\t*\tLN:i:100").unwrap();
        assert_eq!(seg.sequence, "*");
        assert_eq!(seg.length(), 100);
    }

    #[test]
    fn test_link_basic() {
        let link = GfaLink::from_line("L\tctg1\t+\tctg2\t-\t4M").unwrap();
        assert_eq!(link.from_segment, "ctg1");
        assert_eq!(link.from_orient, Orientation::Forward);
        assert_eq!(link.to_segment, "ctg2");
        assert_eq!(link.to_orient, Orientation::Reverse);
        assert_eq!(link.overlap, vec![CigarOp::Match(4)]);
    }

    #[test]
    fn test_link_reversed() {
        let link = GfaLink::from_line("L\tctg1\t+\tctg2\t-\t4M2I").unwrap();
        let rev = link.reversed();
        assert_eq!(rev.from_segment, "ctg2");
        assert_eq!(rev.from_orient, Orientation::Forward);
        assert_eq!(rev.to_segment, "ctg1");
        assert_eq!(rev.to_orient, Orientation::Reverse);
        assert_eq!(rev.overlap, vec![CigarOp::Insertion(2), CigarOp::Match(4)]);
    }

    #[test]
    fn test_containment() {
        let c = GfaContainment::from_line("C\tbig\t+\tsmall\t-\t120\t30M").unwrap();
        assert_eq!(c.from_segment, "big");
        assert_eq!(c.to_segment, "small");
        assert_eq!(c.pos, 120);
        assert_eq!(c.overlap, vec![CigarOp::Match(30)]);
    }

    #[test]
    fn test_path_linear() {
        let path = GfaPath::from_line("P\tp1\tctg1+,ctg2-,ctg3+\t4M,5M").unwrap();
        assert_eq!(path.name, "p1");
        assert_eq!(path.segments.len(), 3);
        assert_eq!(path.segments[1], ("ctg2".to_string(), Orientation::Reverse));
        assert_eq!(path.overlaps.len(), 2);
        assert!(!path.circular);
    }

    #[test]
    fn test_path_circular() {
        // As many overlaps as segments: the last one wraps around.
        let path = GfaPath::from_line("P\tp1\tctg1+,ctg2+\t4M,5M").unwrap();
        assert!(path.circular);
    }

    #[test]
    fn test_header_repeated_tags() {
        let header = GfaHeader::from_line("H\tVN:Z:1.0\tXX:i:1\tXX:i:2").unwrap();
        assert_eq!(header.tag("VN"), Some(&TagValue::String("1.0".to_string())));
        assert_eq!(
            header.tag_values("XX"),
            vec![&TagValue::Int(1), &TagValue::Int(2)]
        );
    }

    #[test]
    fn test_tag_types() {
        let tag = Tag::from_text("XA:A:x").unwrap();
        assert_eq!(tag.value, TagValue::Char(b'x'));
        let tag = Tag::from_text("XF:f:1.5").unwrap();
        assert_eq!(tag.value, TagValue::Float(1.5));
        let tag = Tag::from_text("XH:H:1AFF").unwrap();
        assert_eq!(tag.value, TagValue::Hex(vec![0x1a, 0xff]));
        let tag = Tag::from_text("XB:B:c,-1,2").unwrap();
        assert_eq!(tag.value, TagValue::Array(NumericArray::Int8(vec![-1, 2])));
        let tag = Tag::from_text("XJ:J:{\"a\":1}").unwrap();
        assert_eq!(tag.value, TagValue::Json("{\"a\":1}".to_string()));
    }

    #[test]
    fn test_tag_text_round_trip() {
        for text in [
            "XA:A:x",
            "XI:i:-42",
            "XZ:Z:hello world",
            "XH:H:00FF10",
            "XB:B:I,1,2,3",
            "XB:B:f,0.5,1.5",
        ] {
            let tag = Tag::from_text(text).unwrap();
            assert_eq!(tag.to_string(), text);
        }
    }

    #[test]
    fn test_record_dispatch() {
        let lines = [
            "H\tVN:Z:1.0",
            "S\tctg1\tACGT",
            "L\tctg1\t+\tctg2\t-\t4M",
            "C\tctg1\t+\tctg2\t-\t10\t4M",
            "P\tp1\tctg1+,ctg2-\t4M",
        ];
        for line in lines {
            let record = GfaRecord::from_line(line).unwrap();
            assert_eq!(record.to_line(), line);
        }
    }

    #[test]
    fn test_parser_skips_comments() {
        let data = "# comment\nH\tVN:Z:1.0\n\nS\tctg1\tACGT\n";
        let records: Vec<_> = GfaParser::new(data.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(matches!(records[0], GfaRecord::Header(_)));
        assert!(matches!(records[1], GfaRecord::Segment(_)));
    }
}
