//! # bfa
//!
//! Binary GFA: a compact binary container for assembly graphs.
//!
//! The crate reads and writes assembly graphs in two formats:
//!
//! - **GFA text** (`.gfa`): the tab-delimited Graphical Fragment Assembly
//!   format with typed optional fields.
//! - **BFA binary** (`.bfa`): the same data encoded compactly — 4-bit
//!   packed sequences, bit-packed alignment operations, smallest-width
//!   integers, and back-references instead of repeated names — optionally
//!   gzip-compressed.
//!
//! Both decode into the same in-memory model, [`AssemblyGraph`].
//!
//! ## Quick start
//!
//! ```no_run
//! use bfa::{read_graph_file, write_file};
//!
//! # fn main() -> bfa::Result<()> {
//! // Auto-detects BFA (raw or gzipped) vs GFA text.
//! let graph = read_graph_file("assembly.gfa")?;
//!
//! // Re-encode in the binary format, gzip-compressed.
//! write_file("assembly.bfa", &graph, true)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod formats;
pub mod graph;
pub mod io;

pub use error::{BfaError, Result};
pub use formats::gfa::{
    GfaContainment, GfaHeader, GfaLink, GfaParser, GfaPath, GfaRecord, GfaSegment, Orientation,
    Tag, TagValue,
};
pub use graph::AssemblyGraph;
pub use io::bfa::{read_file, write_file, BfaReader, BfaWriter};

use std::io::BufRead;
use std::path::Path;

/// Read an assembly graph from a file, detecting the format from its
/// content: BFA (raw or gzipped) by magic, anything else as GFA text.
pub fn read_graph_file<P: AsRef<Path>>(path: P) -> Result<AssemblyGraph> {
    let reader = io::compression::open_file(path.as_ref())?;
    let mut input = io::compression::maybe_decompress(reader)?;
    let head = input.fill_buf()?;
    if head.len() >= 4 && &head[0..4] == io::bfa::MAGIC {
        BfaReader::new(input)?.read_graph()
    } else {
        AssemblyGraph::from_gfa(input)
    }
}
