//! BFA writer: section-by-section binary emission.
//!
//! The writer emits the magic, then the five sections in fixed order. Every
//! element (header tag, segment, link, containment, path) is staged in a
//! scratch buffer and flushed whole, so the output never contains a partial
//! element.
//!
//! Links are emitted grouped by their source segment in segment order,
//! forward-oriented links before reverse-oriented ones; path link
//! references index into this emission order. Containments are grouped by
//! their containing segment the same way.
//!
//! # Examples
//!
//! ```no_run
//! use bfa::graph::AssemblyGraph;
//! use bfa::io::bfa::write_file;
//!
//! # fn main() -> bfa::Result<()> {
//! let graph = AssemblyGraph::new();
//! write_file("out.bfa", &graph, true)?;
//! # Ok(())
//! # }
//! ```

use crate::error::{BfaError, Result};
use crate::formats::gfa::{GfaLink, Orientation};
use crate::graph::AssemblyGraph;
use crate::io::bfa::{cigar, sequence, value, MAGIC};
use crate::io::compression::{create_file_sink, OutputSink};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Binary assembly graph writer.
pub struct BfaWriter<W: Write> {
    sink: W,
    record: Vec<u8>,
}

impl BfaWriter<OutputSink<BufWriter<File>>> {
    /// Create a writer for a new file, optionally gzip-compressed, and
    /// write the magic.
    ///
    /// Call [`finish`](BfaWriter::finish) after writing the graph or the
    /// gzip trailer is lost.
    pub fn create<P: AsRef<Path>>(path: P, compressed: bool) -> Result<Self> {
        BfaWriter::new(create_file_sink(path.as_ref(), compressed)?)
    }

    /// Flush everything and finalize the compression stream.
    pub fn finish(self) -> Result<()> {
        self.sink.finish()
    }
}

impl<W: Write> BfaWriter<W> {
    /// Wrap a sink and write the magic.
    pub fn new(mut sink: W) -> Result<Self> {
        sink.write_all(MAGIC)?;
        Ok(BfaWriter {
            sink,
            record: Vec::new(),
        })
    }

    /// Write a whole graph: all five sections in order.
    pub fn write_graph(&mut self, graph: &AssemblyGraph) -> Result<()> {
        self.write_headers(graph)?;
        self.write_segments(graph)?;
        let link_positions = self.write_links(graph)?;
        self.write_containments(graph)?;
        self.write_paths(graph, &link_positions)
    }

    /// Consume the writer, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn flush_record(&mut self) -> Result<()> {
        self.sink.write_all(&self.record)?;
        self.record.clear();
        Ok(())
    }

    fn write_count(&mut self, count: usize) -> Result<()> {
        self.sink.write_all(&(count as u32).to_le_bytes())?;
        Ok(())
    }

    fn write_headers(&mut self, graph: &AssemblyGraph) -> Result<()> {
        // The header section is flushed as one unit.
        self.write_count(graph.header.tags.len())?;
        for tag in &graph.header.tags {
            value::encode_tag(&mut self.record, tag)?;
        }
        self.flush_record()
    }

    fn write_segments(&mut self, graph: &AssemblyGraph) -> Result<()> {
        self.write_count(graph.segments().len())?;
        for segment in graph.segments() {
            value::encode_label(&mut self.record, &segment.name)?;
            sequence::encode(&mut self.record, &segment.sequence);
            Self::encode_tags(&mut self.record, &segment.tags)?;
            self.flush_record()?;
        }
        Ok(())
    }

    /// Emit the link section. Returns, for each link by its graph index,
    /// its 0-based position in emission order.
    fn write_links(&mut self, graph: &AssemblyGraph) -> Result<Vec<usize>> {
        self.write_count(graph.links().len())?;
        let mut positions = vec![0usize; graph.links().len()];
        let mut emitted = 0usize;
        for segment in graph.segments() {
            for orient in [Orientation::Forward, Orientation::Reverse] {
                for (index, link) in graph.links_from(&segment.name) {
                    if link.from_orient != orient {
                        continue;
                    }
                    positions[index] = emitted;
                    emitted += 1;
                    self.encode_link(graph, link)?;
                    Self::encode_tags(&mut self.record, &link.tags)?;
                    self.flush_record()?;
                }
            }
        }
        Ok(positions)
    }

    fn write_containments(&mut self, graph: &AssemblyGraph) -> Result<()> {
        self.write_count(graph.containments().len())?;
        for segment in graph.segments() {
            for containment in graph.containments_from(&segment.name) {
                self.encode_endpoint(graph, &containment.from_segment, containment.from_orient)?;
                self.encode_endpoint(graph, &containment.to_segment, containment.to_orient)?;
                cigar::encode(&mut self.record, &containment.overlap)?;
                value::encode_position(&mut self.record, containment.pos);
                Self::encode_tags(&mut self.record, &containment.tags)?;
                self.flush_record()?;
            }
        }
        Ok(())
    }

    fn write_paths(&mut self, graph: &AssemblyGraph, link_positions: &[usize]) -> Result<()> {
        self.write_count(graph.paths().len())?;
        for (index, path) in graph.paths().iter().enumerate() {
            value::encode_label(&mut self.record, &path.name)?;
            let steps = graph.path_steps(index);
            let mut count = signed_count(steps.len())?;
            if path.circular {
                count = -count;
            }
            self.record.extend_from_slice(&count.to_le_bytes());
            for step in steps {
                let reference = signed_ref(link_positions[step.link], step.forward)?;
                self.record.extend_from_slice(&reference.to_le_bytes());
            }
            Self::encode_tags(&mut self.record, &path.tags)?;
            self.flush_record()?;
        }
        Ok(())
    }

    fn encode_link(&mut self, graph: &AssemblyGraph, link: &GfaLink) -> Result<()> {
        self.encode_endpoint(graph, &link.from_segment, link.from_orient)?;
        self.encode_endpoint(graph, &link.to_segment, link.to_orient)?;
        cigar::encode(&mut self.record, &link.overlap)
    }

    fn encode_endpoint(
        &mut self,
        graph: &AssemblyGraph,
        name: &str,
        orient: Orientation,
    ) -> Result<()> {
        let position = graph.segment_position(name).ok_or_else(|| BfaError::Graph {
            msg: format!("Unknown segment: {:?}", name),
        })?;
        let reference = signed_ref(position, orient == Orientation::Forward)?;
        self.record.extend_from_slice(&reference.to_le_bytes());
        Ok(())
    }

    fn encode_tags(buf: &mut Vec<u8>, tags: &[crate::formats::gfa::Tag]) -> Result<()> {
        buf.extend_from_slice(&(tags.len() as u32).to_le_bytes());
        for tag in tags {
            value::encode_tag(buf, tag)?;
        }
        Ok(())
    }
}

/// Signed 1-based reference: position + 1, negated for the reverse
/// direction.
fn signed_ref(position: usize, forward: bool) -> Result<i32> {
    let reference = i32::try_from(position + 1).map_err(|_| BfaError::Encode {
        msg: format!("Reference position {} exceeds 31 bits", position + 1),
    })?;
    Ok(if forward { reference } else { -reference })
}

fn signed_count(count: usize) -> Result<i32> {
    i32::try_from(count).map_err(|_| BfaError::Encode {
        msg: format!("Count {} exceeds 31 bits", count),
    })
}

/// Encode a graph into an in-memory byte buffer (no compression).
pub fn to_bytes(graph: &AssemblyGraph) -> Result<Vec<u8>> {
    let mut writer = BfaWriter::new(Vec::new())?;
    writer.write_graph(graph)?;
    Ok(writer.into_inner())
}

/// Write a graph to a BFA file, gzip-compressed when `compressed` is true.
pub fn write_file<P: AsRef<Path>>(path: P, graph: &AssemblyGraph, compressed: bool) -> Result<()> {
    let mut writer = BfaWriter::create(path, compressed)?;
    writer.write_graph(graph)?;
    writer.finish()
}
