//! Error types for the bfa crate.

use std::fmt;

/// Result type alias for bfa operations.
pub type Result<T> = std::result::Result<T, BfaError>;

/// Error types that can occur while encoding or decoding assembly graphs.
///
/// Every error is fatal for the operation that produced it: a failed encode
/// leaves an unusable output file, a failed decode returns no partial graph.
#[derive(Debug)]
pub enum BfaError {
    /// I/O error
    Io(std::io::Error),

    /// Magic string at the start of a binary file did not match
    InvalidMagic {
        /// The bytes actually found
        found: Vec<u8>,
    },

    /// Input ended before a complete value could be read
    Truncated {
        /// Number of bytes the value required
        expected: usize,
        /// What was being read when the input ran out
        context: &'static str,
    },

    /// Unknown field type code in a binary record
    UnknownFieldType {
        /// The offending type code byte
        type_code: u8,
    },

    /// A back-reference pointed outside the section it indexes into
    InvalidReference {
        /// Section the reference indexes into ("segment" or "link")
        kind: &'static str,
        /// The 1-based magnitude of the reference
        index: u32,
        /// Number of entries available in that section
        available: usize,
    },

    /// A value cannot be represented in its declared binary type
    Encode {
        /// Description of the unrepresentable value
        msg: String,
    },

    /// An internal pairing invariant was violated
    Consistency {
        /// Description of the violated expectation
        msg: String,
    },

    /// Invalid GFA text format
    InvalidGfaFormat {
        /// Line number where the error occurred (0 if unknown)
        line: usize,
        /// Error message
        msg: String,
    },

    /// A graph operation referenced an entity the graph does not contain
    Graph {
        /// Description of the missing or conflicting entity
        msg: String,
    },
}

impl fmt::Display for BfaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BfaError::Io(e) => write!(f, "I/O error: {}", e),
            BfaError::InvalidMagic { found } => {
                write!(f, "Magic string not recognized (found {:?})", found)
            }
            BfaError::Truncated { expected, context } => {
                write!(
                    f,
                    "Truncated input: needed {} more byte(s) reading {}",
                    expected, context
                )
            }
            BfaError::UnknownFieldType { type_code } => {
                write!(f, "Unknown field type code: 0x{:02x}", type_code)
            }
            BfaError::InvalidReference {
                kind,
                index,
                available,
            } => {
                write!(
                    f,
                    "Invalid {} reference: position {} of {} available",
                    kind, index, available
                )
            }
            BfaError::Encode { msg } => write!(f, "Encode error: {}", msg),
            BfaError::Consistency { msg } => write!(f, "Consistency error: {}", msg),
            BfaError::InvalidGfaFormat { line, msg } => {
                write!(f, "Invalid GFA format at line {}: {}", line, msg)
            }
            BfaError::Graph { msg } => write!(f, "Graph error: {}", msg),
        }
    }
}

impl std::error::Error for BfaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BfaError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BfaError {
    fn from(error: std::io::Error) -> Self {
        BfaError::Io(error)
    }
}
