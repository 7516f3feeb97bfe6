//! BFA reader: section-by-section parsing and reference resolution.
//!
//! Sections are parsed strictly in file order; back-references resolve
//! against what earlier sections produced. Link and containment endpoints
//! resolve against the segment list, path link references against the link
//! list, both by signed 1-based position. A path's oriented segment walk is
//! reconstructed from its links: the from-endpoint of the first link, then
//! the to-endpoint of every link, dropping the final one when the path is
//! circular. A link traversed against its stored direction contributes its
//! endpoints swapped and its overlap operation order reversed.
//!
//! # Examples
//!
//! ```no_run
//! use bfa::io::bfa::read_file;
//!
//! # fn main() -> bfa::Result<()> {
//! let graph = read_file("graph.bfa")?;
//! for segment in graph.segments() {
//!     println!("{}: {} bp", segment.name, segment.length());
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{BfaError, Result};
use crate::formats::gfa::{
    GfaContainment, GfaLink, GfaPath, GfaSegment, Orientation, Tag,
};
use crate::graph::AssemblyGraph;
use crate::io::bfa::{cigar, sequence, value, MAGIC};
use crate::io::compression::{maybe_decompress, open_file};
use std::io::BufRead;
use std::path::Path;

/// Binary assembly graph reader.
///
/// Handles raw and gzipped input transparently; the magic is validated on
/// construction.
pub struct BfaReader {
    input: Box<dyn BufRead + Send>,
}

impl BfaReader {
    /// Wrap a buffered reader, decompressing if gzipped, and validate the
    /// magic.
    pub fn new<R: BufRead + Send + 'static>(reader: R) -> Result<Self> {
        let mut input = maybe_decompress(reader)?;
        let mut magic = [0u8; 4];
        value::read_exact(&mut input, &mut magic, "magic string")?;
        if &magic != MAGIC {
            return Err(BfaError::InvalidMagic {
                found: magic.to_vec(),
            });
        }
        Ok(BfaReader { input })
    }

    /// Open a BFA file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        BfaReader::new(open_file(path.as_ref())?)
    }

    /// Parse the whole document into an assembly graph.
    pub fn read_graph(&mut self) -> Result<AssemblyGraph> {
        let mut graph = AssemblyGraph::new();
        self.read_headers(&mut graph)?;
        self.read_segments(&mut graph)?;
        let links = self.read_links(&mut graph)?;
        self.read_containments(&mut graph)?;
        self.read_paths(&mut graph, &links)?;
        Ok(graph)
    }

    fn read_headers(&mut self, graph: &mut AssemblyGraph) -> Result<()> {
        let count = value::read_u32(&mut self.input, "header tag count")?;
        for _ in 0..count {
            let tag = value::decode_tag(&mut self.input)?;
            graph.header.tags.push(tag);
        }
        Ok(())
    }

    fn read_segments(&mut self, graph: &mut AssemblyGraph) -> Result<()> {
        let count = value::read_u32(&mut self.input, "segment count")?;
        for _ in 0..count {
            let name = value::decode_label(&mut self.input)?;
            let seq = sequence::decode(&mut self.input)?;
            let tags = self.read_tags()?;
            graph.add_segment(GfaSegment {
                name,
                sequence: seq,
                tags,
            })?;
        }
        Ok(())
    }

    /// Parse the link section. Returns the links in emission order for path
    /// reference resolution.
    fn read_links(&mut self, graph: &mut AssemblyGraph) -> Result<Vec<GfaLink>> {
        let count = value::read_u32(&mut self.input, "link count")?;
        let mut links = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (from_segment, from_orient) = self.read_endpoint(graph)?;
            let (to_segment, to_orient) = self.read_endpoint(graph)?;
            let overlap = cigar::decode(&mut self.input)?;
            let tags = self.read_tags()?;
            let link = GfaLink {
                from_segment,
                from_orient,
                to_segment,
                to_orient,
                overlap,
                tags,
            };
            links.push(link.clone());
            graph.add_link(link)?;
        }
        Ok(links)
    }

    fn read_containments(&mut self, graph: &mut AssemblyGraph) -> Result<()> {
        let count = value::read_u32(&mut self.input, "containment count")?;
        for _ in 0..count {
            let (from_segment, from_orient) = self.read_endpoint(graph)?;
            let (to_segment, to_orient) = self.read_endpoint(graph)?;
            let overlap = cigar::decode(&mut self.input)?;
            let pos = value::decode_position(&mut self.input)?;
            let tags = self.read_tags()?;
            graph.add_containment(GfaContainment {
                from_segment,
                from_orient,
                to_segment,
                to_orient,
                pos,
                overlap,
                tags,
            })?;
        }
        Ok(())
    }

    fn read_paths(&mut self, graph: &mut AssemblyGraph, links: &[GfaLink]) -> Result<()> {
        let count = value::read_u32(&mut self.input, "path count")?;
        for _ in 0..count {
            let name = value::decode_label(&mut self.input)?;
            let signed_count = value::read_i32(&mut self.input, "path link count")?;
            let circular = signed_count < 0;
            let n_links = signed_count.unsigned_abs() as usize;

            let mut segments = Vec::new();
            let mut overlaps = Vec::with_capacity(n_links);
            for i in 0..n_links {
                let reference = value::read_i32(&mut self.input, "path link reference")?;
                let link = resolve_link_ref(links, reference)?;
                if segments.is_empty() {
                    segments.push((link.from_segment.clone(), link.from_orient));
                }
                if !circular || i < n_links - 1 {
                    segments.push((link.to_segment.clone(), link.to_orient));
                }
                overlaps.push(link.overlap);
            }

            let tags = self.read_tags()?;
            graph.add_path(GfaPath {
                name,
                segments,
                overlaps,
                circular,
                tags,
            })?;
        }
        Ok(())
    }

    fn read_endpoint(&mut self, graph: &AssemblyGraph) -> Result<(String, Orientation)> {
        let reference = value::read_i32(&mut self.input, "segment reference")?;
        let index = reference.unsigned_abs();
        let available = graph.segments().len();
        if index == 0 || index as usize > available {
            return Err(BfaError::InvalidReference {
                kind: "segment",
                index,
                available,
            });
        }
        let orient = if reference > 0 {
            Orientation::Forward
        } else {
            Orientation::Reverse
        };
        Ok((graph.segments()[index as usize - 1].name.clone(), orient))
    }

    fn read_tags(&mut self) -> Result<Vec<Tag>> {
        let count = value::read_u32(&mut self.input, "optional field count")?;
        let mut tags = Vec::with_capacity(count as usize);
        for _ in 0..count {
            tags.push(value::decode_tag(&mut self.input)?);
        }
        Ok(tags)
    }
}

/// Resolve a signed 1-based link reference; negative means the link is
/// traversed against its stored direction.
fn resolve_link_ref(links: &[GfaLink], reference: i32) -> Result<GfaLink> {
    let index = reference.unsigned_abs();
    if index == 0 || index as usize > links.len() {
        return Err(BfaError::InvalidReference {
            kind: "link",
            index,
            available: links.len(),
        });
    }
    let link = &links[index as usize - 1];
    Ok(if reference > 0 {
        link.clone()
    } else {
        link.reversed()
    })
}

/// Read a BFA file (raw or gzipped) into an assembly graph.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<AssemblyGraph> {
    BfaReader::open(path)?.read_graph()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::gfa::GfaRecord;
    use crate::io::bfa::writer::to_bytes;
    use std::io::Cursor;

    fn graph_from(lines: &[&str]) -> AssemblyGraph {
        let mut graph = AssemblyGraph::new();
        for line in lines {
            graph
                .add_record(GfaRecord::from_line(line).unwrap())
                .unwrap();
        }
        graph
    }

    fn round_trip(graph: &AssemblyGraph) -> AssemblyGraph {
        let bytes = to_bytes(graph).unwrap();
        BfaReader::new(Cursor::new(bytes))
            .unwrap()
            .read_graph()
            .unwrap()
    }

    #[test]
    fn test_magic_mismatch() {
        let result = BfaReader::new(Cursor::new(b"GFA\x01rest".to_vec()));
        assert!(matches!(result, Err(BfaError::InvalidMagic { .. })));
    }

    #[test]
    fn test_magic_truncated() {
        let result = BfaReader::new(Cursor::new(b"BF".to_vec()));
        assert!(matches!(result, Err(BfaError::Truncated { .. })));
    }

    #[test]
    fn test_empty_graph() {
        let decoded = round_trip(&AssemblyGraph::new());
        assert!(decoded.segments().is_empty());
        assert!(decoded.links().is_empty());
        assert!(decoded.paths().is_empty());
    }

    #[test]
    fn test_segment_round_trip() {
        let graph = graph_from(&["S\tctg1\tACGTACG\tRC:i:200", "S\tctg2\t*"]);
        let decoded = round_trip(&graph);
        assert_eq!(decoded.segments(), graph.segments());
    }

    #[test]
    fn test_link_back_reference_orientation() {
        let graph = graph_from(&[
            "S\tctg1\tACGT",
            "S\tctg2\tTTGG",
            "L\tctg1\t-\tctg2\t+\t3M1I",
        ]);
        let decoded = round_trip(&graph);
        assert_eq!(decoded.links(), graph.links());
    }

    #[test]
    fn test_out_of_range_segment_reference() {
        let graph = graph_from(&["S\tctg1\tACGT", "S\tctg2\tTTGG", "L\tctg1\t+\tctg2\t+\t1M"]);
        let mut bytes = to_bytes(&graph).unwrap();
        // Patch the link's from-reference (first i32 after the link count)
        // to point past the segment section: magic(4)+hdr(4)+segcount(4)
        //   + 2 segments of 18 bytes + link count(4).
        let at = 4 + 4 + 4 + 2 * 18 + 4;
        bytes[at..at + 4].copy_from_slice(&99i32.to_le_bytes());
        let result = BfaReader::new(Cursor::new(bytes)).unwrap().read_graph();
        assert!(matches!(
            result,
            Err(BfaError::InvalidReference {
                kind: "segment",
                index: 99,
                ..
            })
        ));
    }

    #[test]
    fn test_truncated_after_segment_count() {
        let graph = graph_from(&["S\tctg1\tACGT"]);
        let mut bytes = to_bytes(&graph).unwrap();
        bytes.truncate(4 + 4 + 4 + 2);
        let result = BfaReader::new(Cursor::new(bytes)).unwrap().read_graph();
        assert!(matches!(result, Err(BfaError::Truncated { .. })));
    }

    #[test]
    fn test_path_walk_reconstruction() {
        let graph = graph_from(&[
            "S\tctg1\tACGTACGT",
            "S\tctg2\tTTGGTTGG",
            "S\tctg3\tAACCAACC",
            "L\tctg1\t+\tctg2\t-\t4M",
            "L\tctg2\t-\tctg3\t+\t2M1D",
            "P\tp1\tctg1+,ctg2-,ctg3+\t4M,2M1D",
        ]);
        let decoded = round_trip(&graph);
        assert_eq!(decoded.paths(), graph.paths());
    }

    #[test]
    fn test_circular_path_round_trip() {
        let graph = graph_from(&[
            "S\ta\tACGT",
            "S\tb\tCCCC",
            "S\tc\tGGGG",
            "L\ta\t+\tb\t+\t1M",
            "L\tb\t+\tc\t+\t1M",
            "L\tc\t+\ta\t+\t1M",
            "P\tcirc\ta+,b+,c+\t1M,1M,1M",
        ]);
        assert!(graph.paths()[0].circular);
        let decoded = round_trip(&graph);
        assert_eq!(decoded.paths(), graph.paths());
        // Three links, three walk entries, final endpoint omitted.
        assert_eq!(decoded.paths()[0].segments.len(), 3);
        assert_eq!(decoded.path_steps(0).len(), 3);
    }

    #[test]
    fn test_reverse_traversal_reverses_overlap() {
        // The path walks the stored link backwards, so its overlap comes
        // back with the operation order flipped.
        let graph = graph_from(&[
            "S\ta\tACGT",
            "S\tb\tCCCC",
            "L\ta\t+\tb\t+\t3M2I",
            "P\tp1\tb-,a-\t2I3M",
        ]);
        let decoded = round_trip(&graph);
        assert_eq!(decoded.paths(), graph.paths());
    }

    #[test]
    fn test_header_tags_accumulate() {
        let graph = graph_from(&["H\tVN:Z:1.0\tXX:i:1\tXX:i:2"]);
        let decoded = round_trip(&graph);
        assert_eq!(decoded.header, graph.header);
        assert_eq!(decoded.header.tag_values("XX").len(), 2);
    }
}
