//! Byte-level I/O: the binary codec and compression plumbing.

pub mod bfa;
pub mod compression;

pub use bfa::{BfaReader, BfaWriter};
