//! Walks top-level chunks and classifies where legitimate content ends.
//!
//! The walk inspects only the outermost chunk sequence. When it cannot
//! consume the file exactly, the unparsed tail is either small enough to
//! be confidently reported as appended garbage or large enough that it is
//! more likely a container structure the walker does not model, in which
//! case the file is left alone.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::chunk::{self, ChunkRecord};
use crate::container::{self, ContainerFormat};
use crate::error::Result;

/// Trailing regions larger than this are assumed to be container
/// structure the walker does not model, not appended garbage.
pub const MAX_EXTRA_BYTES: u64 = 1000;

/// Preview window over the garbage region, in bytes.
const PREVIEW_LEN: u64 = 100;

/// Result of scanning a single file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Detected container format.
    #[serde(rename = "fileType")]
    pub format: ContainerFormat,
    /// Total file size in bytes.
    pub file_size: u64,
    /// Number of trailing garbage bytes. Zero when clean or false positive.
    pub extra_bytes: u64,
    /// True when no removable trailing garbage was found. A false
    /// positive also reports clean, since nothing will be removed.
    pub is_clean: bool,
    /// True when the unparsed tail is too large to classify as garbage.
    pub false_positive: bool,
    /// Top-level chunks parsed before the walk terminated.
    pub chunks: Vec<ChunkRecord>,
}

/// Scan a file, determining where its declared content ends.
pub fn scan<P: AsRef<Path>>(path: P) -> Result<ScanResult> {
    let path = path.as_ref();
    let format = container::detect_format(path)?;

    let file = File::open(path)?;
    let file_size = file.metadata()?.len();
    let mut reader = BufReader::new(file);

    debug!("Scanning {:?} as {} ({} bytes)", path, format, file_size);
    let result = scan_reader(&mut reader, format, file_size)?;

    if result.false_positive {
        warn!(
            "Unparsed tail of {:?} exceeds {} bytes, leaving it alone",
            path, MAX_EXTRA_BYTES
        );
    } else if !result.is_clean {
        debug!("{:?} has {} trailing garbage bytes", path, result.extra_bytes);
    }

    Ok(result)
}

/// Scan a reader of known size, starting from offset 0.
pub fn scan_reader<R: Read + Seek>(
    reader: &mut R,
    format: ContainerFormat,
    file_size: u64,
) -> Result<ScanResult> {
    let header_len = format.header_len();

    let mut result = ScanResult {
        format,
        file_size,
        extra_bytes: 0,
        is_clean: true,
        false_positive: false,
        chunks: Vec::new(),
    };

    let mut pos = 0u64;
    while pos < file_size {
        let remaining = file_size - pos;

        if remaining < header_len {
            result.extra_bytes = remaining;
            result.is_clean = false;
            break;
        }

        let (tag, length) = chunk::read_header(reader, format, pos)?;
        result.chunks.push(ChunkRecord {
            offset: pos,
            length,
            tag,
        });

        if length < header_len || length > remaining {
            // The declared length is self-contradictory or overruns the
            // file. A small tail is garbage; a large one is more likely a
            // structure this walker does not understand.
            if remaining > MAX_EXTRA_BYTES {
                result.false_positive = true;
            } else {
                result.extra_bytes = remaining;
                result.is_clean = false;
            }
            break;
        }

        // A zero-length chunk cannot advance the walk. Unreachable:
        // `length < header_len` above already catches zero, since
        // header_len is at least 8. Kept so the loop cannot spin even if
        // that check ever changes.
        if length == 0 {
            break;
        }

        pos += length;
    }

    Ok(result)
}

/// Render up to the first 100 bytes of the garbage region for display.
///
/// Printable ASCII is kept verbatim; every other byte is escaped as
/// `\xNN`. A tail longer than the preview window gets a `...` marker.
/// Returns `None` for clean or false-positive results.
pub fn trailer_preview<P: AsRef<Path>>(path: P, result: &ScanResult) -> Result<Option<String>> {
    if result.extra_bytes == 0 || result.false_positive {
        return Ok(None);
    }

    let len = result.extra_bytes.min(PREVIEW_LEN);
    let mut buf = vec![0u8; len as usize];

    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(result.file_size - result.extra_bytes))?;
    file.read_exact(&mut buf)?;

    let mut preview = String::with_capacity(buf.len());
    for byte in buf {
        if (0x20..=0x7E).contains(&byte) {
            preview.push(byte as char);
        } else {
            preview.push_str(&format!("\\x{:02x}", byte));
        }
    }
    if result.extra_bytes > PREVIEW_LEN {
        preview.push_str("...");
    }

    Ok(Some(preview))
}
