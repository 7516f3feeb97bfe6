//! Record models and text formats.

pub mod cigar;
pub mod gfa;

pub use cigar::CigarOp;
pub use gfa::{GfaContainment, GfaHeader, GfaLink, GfaPath, GfaRecord, GfaSegment, Orientation};
