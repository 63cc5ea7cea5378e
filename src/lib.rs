//! Mediatrim: trailing-garbage detection and removal for media containers
//!
//! Some external processes append junk to the end of otherwise valid
//! video files (watermark stamps, tracking tags, padding artifacts). This
//! crate walks the top-level chunk sequence of a container file to find
//! the exact byte offset where the file's declared content ends, and can
//! truncate anything past it, optionally preserving the removed bytes in
//! a sidecar backup.
//!
//! # Modules
//!
//! - `container` - format detection from file signatures (MP4, MOV, WMV)
//! - `chunk` - top-level chunk header decoding per format
//! - `scan` - chunk walk and boundary classification
//! - `clean` - sidecar backup and truncation
//!
//! # Operation
//!
//! [`scan`] walks chunks from offset 0: each header declares how many
//! bytes its chunk occupies, so a well-formed file is consumed exactly.
//! When the walk stops short, the remaining tail is classified by size:
//! up to [`MAX_EXTRA_BYTES`] bytes are reported as removable garbage,
//! anything larger is assumed to be legitimate structure the walker does
//! not model and is reported as a false positive to be left alone. Only
//! the outermost chunk level is inspected; payloads are never decoded.
//!
//! [`clean`] re-scans, backs the tail up to a `<path>.txt` sidecar when
//! asked, and truncates the file. A failed backup aborts before anything
//! is modified.

pub mod chunk;
pub mod clean;
pub mod container;
pub mod error;
pub mod scan;

pub use chunk::{ChunkRecord, ChunkTag};
pub use clean::{clean, CleanResult, BACKUP_SUFFIX};
pub use container::{detect_format, is_media_file, ContainerFormat};
pub use error::{Error, Result};
pub use scan::{scan, trailer_preview, ScanResult, MAX_EXTRA_BYTES};
