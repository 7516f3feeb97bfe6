//! File opening, gzip detection and the compressed output sink.
//!
//! Reads pick an I/O method by file size: files at or above
//! [`MMAP_THRESHOLD`] are memory-mapped (with sequential-access hints on
//! macOS), smaller files go through a plain `BufReader`. Gzip input is
//! detected from the two-byte magic without consuming it, so the same code
//! path handles raw and gzipped files.

use crate::error::Result;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Memory-mapped file threshold (50 MB).
///
/// Below this, mmap setup overhead outweighs the benefit; at or above it,
/// sequential mmap reads win.
pub const MMAP_THRESHOLD: u64 = 50 * 1024 * 1024; // 50 MB

/// Two-byte gzip stream magic.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open a local file with size-based I/O method selection.
///
/// Files at or above [`MMAP_THRESHOLD`] are memory-mapped; smaller files use
/// standard buffered I/O.
pub fn open_file(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let metadata = std::fs::metadata(path)?;
    if metadata.len() >= MMAP_THRESHOLD {
        open_mmap_file(path)
    } else {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Open file with memory mapping and sequential-access hints.
#[cfg(target_os = "macos")]
fn open_mmap_file(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    use libc::{madvise, MADV_SEQUENTIAL, MADV_WILLNEED};

    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };

    // Give the kernel sequential access hints for APFS prefetching
    unsafe {
        madvise(
            mmap.as_ptr() as *mut _,
            mmap.len(),
            MADV_SEQUENTIAL | MADV_WILLNEED,
        );
    }

    Ok(Box::new(io::Cursor::new(mmap)))
}

#[cfg(not(target_os = "macos"))]
fn open_mmap_file(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(Box::new(io::Cursor::new(mmap)))
}

/// Check whether the stream starts with the gzip magic, without consuming
/// any input.
pub fn is_gzip<R: BufRead>(reader: &mut R) -> Result<bool> {
    let buf = reader.fill_buf()?;
    Ok(buf.len() >= 2 && buf[0..2] == GZIP_MAGIC)
}

/// Wrap a buffered reader in gzip decoding when the stream is gzipped,
/// otherwise pass it through unchanged.
///
/// Uses `MultiGzDecoder` so concatenated gzip members decode as one stream.
pub fn maybe_decompress<R: BufRead + Send + 'static>(
    mut reader: R,
) -> Result<Box<dyn BufRead + Send>> {
    if is_gzip(&mut reader)? {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Output sink that optionally gzip-compresses what is written to it.
///
/// Dropping the sink without calling [`finish`](OutputSink::finish) can lose
/// the gzip trailer; callers must finish explicitly.
pub enum OutputSink<W: Write> {
    /// Uncompressed pass-through
    Plain(W),
    /// Gzip-compressed output
    Gzip(GzEncoder<W>),
}

impl<W: Write> OutputSink<W> {
    /// Wrap a writer, compressing when `compressed` is true.
    pub fn new(writer: W, compressed: bool) -> Self {
        if compressed {
            OutputSink::Gzip(GzEncoder::new(writer, Compression::default()))
        } else {
            OutputSink::Plain(writer)
        }
    }

    /// Flush all buffered data and write the gzip trailer if compressing.
    pub fn finish(self) -> Result<()> {
        match self {
            OutputSink::Plain(mut w) => w.flush()?,
            OutputSink::Gzip(encoder) => {
                let mut inner = encoder.finish()?;
                inner.flush()?;
            }
        }
        Ok(())
    }
}

impl<W: Write> Write for OutputSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputSink::Plain(w) => w.write(buf),
            OutputSink::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputSink::Plain(w) => w.flush(),
            OutputSink::Gzip(w) => w.flush(),
        }
    }
}

/// Create an output sink writing to a new file at `path`.
pub fn create_file_sink(path: &Path, compressed: bool) -> Result<OutputSink<BufWriter<File>>> {
    let file = File::create(path)?;
    Ok(OutputSink::new(BufWriter::new(file), compressed))
}
