//! In-memory assembly graph model.
//!
//! [`AssemblyGraph`] holds the records of one GFA document with the ordering
//! and lookup structure the binary codec needs: segments in insertion order
//! with a name index, links and containments in insertion order with a
//! by-source adjacency index, and paths resolved to their constituent links.
//!
//! Paths are resolved at insert time: each step of the oriented segment walk
//! must correspond to a link already in the graph, traversed either in its
//! stored direction or in reverse. A walk that crosses a pair of segments no
//! link connects is rejected.
//!
//! # Examples
//!
//! ```
//! use bfa::graph::AssemblyGraph;
//! use bfa::formats::gfa::GfaRecord;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut graph = AssemblyGraph::new();
//! graph.add_record(GfaRecord::from_line("S\tctg1\tACGT")?)?;
//! graph.add_record(GfaRecord::from_line("S\tctg2\tTTGG")?)?;
//! graph.add_record(GfaRecord::from_line("L\tctg1\t+\tctg2\t-\t2M")?)?;
//!
//! assert_eq!(graph.segments().len(), 2);
//! assert_eq!(graph.links_from("ctg1").count(), 1);
//! # Ok(())
//! # }
//! ```

use crate::error::{BfaError, Result};
use crate::formats::gfa::{
    GfaContainment, GfaHeader, GfaLink, GfaParser, GfaPath, GfaRecord, GfaSegment, Orientation,
};
use std::collections::HashMap;
use std::io::Read;

/// One step of a resolved path: which link is traversed, and whether in the
/// link's stored direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    /// Index into the graph's link list
    pub link: usize,
    /// True when the link is traversed in its stored direction
    pub forward: bool,
}

/// An assembly graph: header, segments, links, containments and paths.
///
/// Segments, links, containments and paths are all kept in insertion order.
/// Segment names are unique; path names are unique.
#[derive(Debug, Clone, Default)]
pub struct AssemblyGraph {
    /// Header tags of the document
    pub header: GfaHeader,
    segments: Vec<GfaSegment>,
    segment_index: HashMap<String, usize>,
    links: Vec<GfaLink>,
    containments: Vec<GfaContainment>,
    paths: Vec<GfaPath>,
    path_steps: Vec<Vec<PathStep>>,
    path_index: HashMap<String, usize>,
}

impl AssemblyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        AssemblyGraph::default()
    }

    /// Builds a graph from GFA text.
    ///
    /// Records must appear in dependency order: a link's segments and a
    /// path's links must precede their use.
    pub fn from_gfa<R: Read>(reader: R) -> Result<Self> {
        let mut graph = AssemblyGraph::new();
        for record in GfaParser::new(reader) {
            graph.add_record(record?)?;
        }
        Ok(graph)
    }

    /// Adds one GFA record. Comments are ignored.
    pub fn add_record(&mut self, record: GfaRecord) -> Result<()> {
        match record {
            GfaRecord::Header(header) => {
                self.header.tags.extend(header.tags);
                Ok(())
            }
            GfaRecord::Segment(segment) => self.add_segment(segment),
            GfaRecord::Link(link) => self.add_link(link),
            GfaRecord::Containment(containment) => self.add_containment(containment),
            GfaRecord::Path(path) => self.add_path(path),
            GfaRecord::Comment(_) => Ok(()),
        }
    }

    /// Adds a segment. Duplicate names are an error.
    pub fn add_segment(&mut self, segment: GfaSegment) -> Result<()> {
        if self.segment_index.contains_key(&segment.name) {
            return Err(BfaError::Graph {
                msg: format!("Duplicate segment name: {:?}", segment.name),
            });
        }
        self.segment_index
            .insert(segment.name.clone(), self.segments.len());
        self.segments.push(segment);
        Ok(())
    }

    /// Adds a link. Both endpoint segments must already exist.
    pub fn add_link(&mut self, link: GfaLink) -> Result<()> {
        self.require_segment(&link.from_segment)?;
        self.require_segment(&link.to_segment)?;
        self.links.push(link);
        Ok(())
    }

    /// Adds a containment. Both segments must already exist.
    pub fn add_containment(&mut self, containment: GfaContainment) -> Result<()> {
        self.require_segment(&containment.from_segment)?;
        self.require_segment(&containment.to_segment)?;
        self.containments.push(containment);
        Ok(())
    }

    /// Adds a path, resolving each step of its walk to a link already in the
    /// graph.
    ///
    /// A step from oriented segment `(a, oa)` to `(b, ob)` matches a link
    /// stored as `a oa -> b ob` (traversed forward) or one whose reverse
    /// reads that way (traversed backwards). Circular paths have one extra
    /// step from the last segment back to the first.
    ///
    /// # Errors
    ///
    /// Returns an error for duplicate path names, unknown segments, or a
    /// step no link covers.
    pub fn add_path(&mut self, path: GfaPath) -> Result<()> {
        if self.path_index.contains_key(&path.name) {
            return Err(BfaError::Graph {
                msg: format!("Duplicate path name: {:?}", path.name),
            });
        }
        for (name, _) in &path.segments {
            self.require_segment(name)?;
        }

        let mut steps = Vec::new();
        let step_count = if path.segments.len() < 2 {
            0
        } else if path.circular {
            path.segments.len()
        } else {
            path.segments.len() - 1
        };
        for i in 0..step_count {
            let from = &path.segments[i];
            let to = &path.segments[(i + 1) % path.segments.len()];
            let step = self.resolve_step(from, to).ok_or_else(|| BfaError::Graph {
                msg: format!(
                    "Path {:?}: no link connects {}{} to {}{}",
                    path.name, from.0, from.1, to.0, to.1
                ),
            })?;
            steps.push(step);
        }

        self.path_index.insert(path.name.clone(), self.paths.len());
        self.path_steps.push(steps);
        self.paths.push(path);
        Ok(())
    }

    fn resolve_step(
        &self,
        from: &(String, Orientation),
        to: &(String, Orientation),
    ) -> Option<PathStep> {
        for (i, link) in self.links.iter().enumerate() {
            if link.from_segment == from.0
                && link.from_orient == from.1
                && link.to_segment == to.0
                && link.to_orient == to.1
            {
                return Some(PathStep {
                    link: i,
                    forward: true,
                });
            }
            if link.to_segment == from.0
                && link.to_orient == from.1.flip()
                && link.from_segment == to.0
                && link.from_orient == to.1.flip()
            {
                return Some(PathStep {
                    link: i,
                    forward: false,
                });
            }
        }
        None
    }

    fn require_segment(&self, name: &str) -> Result<()> {
        if self.segment_index.contains_key(name) {
            Ok(())
        } else {
            Err(BfaError::Graph {
                msg: format!("Unknown segment: {:?}", name),
            })
        }
    }

    /// Segments in insertion order.
    pub fn segments(&self) -> &[GfaSegment] {
        &self.segments
    }

    /// 0-based position of a segment by name.
    pub fn segment_position(&self, name: &str) -> Option<usize> {
        self.segment_index.get(name).copied()
    }

    /// Segment by name.
    pub fn segment(&self, name: &str) -> Option<&GfaSegment> {
        self.segment_index.get(name).map(|&i| &self.segments[i])
    }

    /// Links in insertion order.
    pub fn links(&self) -> &[GfaLink] {
        &self.links
    }

    /// Links whose source endpoint is the named segment, with their indices,
    /// in insertion order.
    pub fn links_from<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (usize, &'a GfaLink)> + 'a {
        self.links
            .iter()
            .enumerate()
            .filter(move |(_, l)| l.from_segment == name)
    }

    /// Containments in insertion order.
    pub fn containments(&self) -> &[GfaContainment] {
        &self.containments
    }

    /// Containments whose containing segment is the named one, in insertion
    /// order.
    pub fn containments_from<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a GfaContainment> + 'a {
        self.containments
            .iter()
            .filter(move |c| c.from_segment == name)
    }

    /// Paths in insertion order.
    pub fn paths(&self) -> &[GfaPath] {
        &self.paths
    }

    /// Path by name.
    pub fn path(&self, name: &str) -> Option<&GfaPath> {
        self.path_index.get(name).map(|&i| &self.paths[i])
    }

    /// Resolved link steps of the path at `index`.
    pub fn path_steps(&self, index: usize) -> &[PathStep] {
        &self.path_steps[index]
    }

    /// All records in document order (header first, then segments, links,
    /// containments, paths).
    pub fn records(&self) -> impl Iterator<Item = GfaRecord> + '_ {
        let header = if self.header.tags.is_empty() {
            None
        } else {
            Some(GfaRecord::Header(self.header.clone()))
        };
        header
            .into_iter()
            .chain(self.segments.iter().cloned().map(GfaRecord::Segment))
            .chain(self.links.iter().cloned().map(GfaRecord::Link))
            .chain(self.containments.iter().cloned().map(GfaRecord::Containment))
            .chain(self.paths.iter().cloned().map(GfaRecord::Path))
    }

    /// Formats the whole graph as GFA text.
    pub fn to_gfa_string(&self) -> String {
        let mut out = String::new();
        for record in self.records() {
            out.push_str(&record.to_line());
            out.push('\n');
        }
        out
    }
}
