//! Integration tests for GFA format parsing.
//!
//! Tests GFA v1.0 parsing with real-world assembly graph scenarios.

use bfa::formats::cigar::{cigar_to_string, parse_cigar};
use bfa::formats::gfa::{
    GfaContainment, GfaLink, GfaPath, GfaRecord, GfaSegment, Orientation, Tag, TagValue,
};
use bfa::graph::AssemblyGraph;
use std::io::Cursor;

#[test]
fn test_gfa_segment_basic() {
    let line = "S\tcontig1\tACGTACGT";
    let seg = GfaSegment::from_line(line).unwrap();

    assert_eq!(seg.name, "contig1");
    assert_eq!(seg.sequence, "ACGTACGT");
    assert_eq!(seg.length(), 8);
}

#[test]
fn test_gfa_segment_with_tags() {
    let line = "S\tcontig1\tACGT\tLN:i:4\tRC:i:100\tFC:i:25";
    let seg = GfaSegment::from_line(line).unwrap();

    assert_eq!(seg.name, "contig1");
    assert_eq!(seg.sequence, "ACGT");
    assert_eq!(seg.tag("LN"), Some(&TagValue::Int(4)));
    assert_eq!(seg.tag("RC"), Some(&TagValue::Int(100)));
    assert_eq!(seg.tag("FC"), Some(&TagValue::Int(25)));
}

#[test]
fn test_gfa_segment_absent_sequence() {
    let line = "S\tcontig1\t*\tLN:i:1000";
    let seg = GfaSegment::from_line(line).unwrap();

    assert_eq!(seg.sequence, "*");
    assert_eq!(seg.length(), 1000); // From LN tag
}

#[test]
fn test_gfa_link_forward_forward() {
    let line = "L\tcontig1\t+\tcontig2\t+\t4M";
    let link = GfaLink::from_line(line).unwrap();

    assert_eq!(link.from_segment, "contig1");
    assert_eq!(link.from_orient, Orientation::Forward);
    assert_eq!(link.to_segment, "contig2");
    assert_eq!(link.to_orient, Orientation::Forward);
    assert_eq!(cigar_to_string(&link.overlap), "4M");
}

#[test]
fn test_gfa_link_reverse_orientations() {
    let line = "L\tcontig1\t-\tcontig2\t+\t3M";
    let link = GfaLink::from_line(line).unwrap();

    assert_eq!(link.from_orient, Orientation::Reverse);
    assert_eq!(link.to_orient, Orientation::Forward);
}

#[test]
fn test_gfa_link_no_overlap() {
    let line = "L\tcontig1\t+\tcontig2\t+\t*";
    let link = GfaLink::from_line(line).unwrap();

    assert!(link.overlap.is_empty());
    assert_eq!(cigar_to_string(&link.overlap), "*");
}

#[test]
fn test_gfa_containment() {
    let line = "C\tcontig1\t+\tread1\t-\t110\t50M\tNM:i:2";
    let containment = GfaContainment::from_line(line).unwrap();

    assert_eq!(containment.from_segment, "contig1");
    assert_eq!(containment.to_segment, "read1");
    assert_eq!(containment.pos, 110);
    assert_eq!(cigar_to_string(&containment.overlap), "50M");
    assert_eq!(containment.tag("NM"), Some(&TagValue::Int(2)));
}

#[test]
fn test_gfa_path_basic() {
    let line = "P\tpath1\tcontig1+,contig2-,contig3+\t4M,5M";
    let path = GfaPath::from_line(line).unwrap();

    assert_eq!(path.name, "path1");
    assert_eq!(path.segments.len(), 3);
    assert_eq!(
        path.segments[0],
        ("contig1".to_string(), Orientation::Forward)
    );
    assert_eq!(
        path.segments[1],
        ("contig2".to_string(), Orientation::Reverse)
    );
    assert_eq!(path.overlaps.len(), 2);
    assert!(!path.circular);
}

#[test]
fn test_gfa_path_no_overlaps() {
    let line = "P\tpath1\tcontig1+,contig2+\t*";
    let path = GfaPath::from_line(line).unwrap();

    assert!(path.overlaps.is_empty());
    assert!(!path.circular);
}

#[test]
fn test_gfa_header_version() {
    let line = "H\tVN:Z:1.0";
    let record = GfaRecord::from_line(line).unwrap();

    match record {
        GfaRecord::Header(header) => {
            assert_eq!(header.tag("VN"), Some(&TagValue::String("1.0".to_string())));
        }
        _ => panic!("Expected header record"),
    }
}

#[test]
fn test_gfa_typed_tag_variety() {
    let line = "S\ts1\tACGT\tXA:A:y\tXF:f:3.5\tXH:H:DEAD\tXB:B:S,1,65535\tXJ:J:[1,2]";
    let seg = GfaSegment::from_line(line).unwrap();

    assert_eq!(seg.tag("XA"), Some(&TagValue::Char(b'y')));
    assert_eq!(seg.tag("XF"), Some(&TagValue::Float(3.5)));
    assert_eq!(seg.tag("XH"), Some(&TagValue::Hex(vec![0xde, 0xad])));
    assert_eq!(seg.tag("XJ"), Some(&TagValue::Json("[1,2]".to_string())));
}

#[test]
fn test_gfa_invalid_lines_rejected() {
    assert!(GfaSegment::from_line("S\tonly_name").is_err());
    assert!(GfaLink::from_line("L\ta\t+\tb\t-").is_err());
    assert!(GfaLink::from_line("L\ta\t?\tb\t-\t4M").is_err());
    assert!(GfaSegment::from_line("S\ts1\tACGT\tbadtag").is_err());
}

#[test]
fn test_gfa_tag_text_round_trip() {
    let line = "S\ts1\tACGT\tXA:A:y\tXI:i:-5\tXZ:Z:note\tXB:B:c,-1,1";
    let seg = GfaSegment::from_line(line).unwrap();
    assert_eq!(seg.to_line(), line);
}

#[test]
fn test_full_document_into_graph() {
    let gfa = "\
H\tVN:Z:1.0
S\tcontig1\tACGTACGTAC\tRC:i:120
S\tcontig2\tTTGGCCAATT
S\tread1\tACGTA
L\tcontig1\t+\tcontig2\t+\t3M
C\tcontig1\t+\tread1\t+\t2\t5M
P\tscaffold1\tcontig1+,contig2+\t3M
";
    let graph = AssemblyGraph::from_gfa(Cursor::new(gfa)).unwrap();

    assert_eq!(graph.segments().len(), 3);
    assert_eq!(graph.links().len(), 1);
    assert_eq!(graph.containments().len(), 1);
    assert_eq!(graph.paths().len(), 1);
    assert_eq!(
        graph.header.tag("VN"),
        Some(&TagValue::String("1.0".to_string()))
    );
    assert_eq!(graph.path_steps(0).len(), 1);

    // And back out.
    assert_eq!(graph.to_gfa_string(), gfa);
}

#[test]
fn test_mixed_records_with_comments() {
    let gfa = "# assembly graph\nH\tVN:Z:1.0\nS\tc1\tACGT\n# trailing comment\n";
    let graph = AssemblyGraph::from_gfa(Cursor::new(gfa)).unwrap();
    assert_eq!(graph.segments().len(), 1);
}

#[test]
fn test_parse_error_carries_line_number() {
    let gfa = "H\tVN:Z:1.0\nS\tbroken\n";
    let err = AssemblyGraph::from_gfa(Cursor::new(gfa)).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("line 2"), "unexpected message: {}", msg);
}

#[test]
fn test_link_reversal_semantics() {
    let link = GfaLink::from_line("L\ta\t+\tb\t-\t5M2D").unwrap();
    let rev = link.reversed();

    assert_eq!(rev.from_segment, "b");
    assert_eq!(rev.from_orient, Orientation::Forward);
    assert_eq!(rev.to_segment, "a");
    assert_eq!(rev.to_orient, Orientation::Reverse);
    assert_eq!(rev.overlap, parse_cigar("2D5M").unwrap());
}

#[test]
fn test_tag_construction_api() {
    let tag = Tag::new(*b"RC", TagValue::Int(7));
    assert_eq!(tag.name_str(), "RC");
    assert_eq!(tag.to_string(), "RC:i:7");
}
