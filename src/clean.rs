//! Removal of confirmed trailing garbage, with sidecar backup.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::scan::{self, ScanResult};

/// Suffix appended to the original path for the sidecar backup.
pub const BACKUP_SUFFIX: &str = ".txt";

/// Result of a removal attempt against a single file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanResult {
    /// The scan that drove the removal decision.
    #[serde(flatten)]
    pub scan: ScanResult,
    /// True when the file was actually truncated.
    pub cleaned: bool,
    /// Path of the sidecar backup, when one was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
}

/// Remove trailing garbage from a file.
///
/// The path is re-scanned first, so a stale earlier [`ScanResult`] can
/// never drive a truncation. When the scan finds nothing removable the
/// call is a no-op (`cleaned = false`).
///
/// With `backup` set, the garbage bytes are written verbatim to
/// `<path>.txt` before the file is touched; if that write fails the
/// original file is left intact. The sidecar overwrites any prior one at
/// the same path and contains the exact removed bytes, so appending it
/// back to the truncated file reproduces the original.
pub fn clean<P: AsRef<Path>>(path: P, backup: bool) -> Result<CleanResult> {
    let path = path.as_ref();
    let scan = scan::scan(path)?;

    if scan.extra_bytes == 0 || scan.false_positive {
        return Ok(CleanResult {
            scan,
            cleaned: false,
            backup_path: None,
        });
    }

    let new_size = scan.file_size - scan.extra_bytes;

    // Backup before truncation: never discard bytes that were not
    // durably written out when the caller asked for a backup.
    let backup_path = if backup {
        let mut trailer = vec![0u8; scan.extra_bytes as usize];
        {
            let mut file = File::open(path)?;
            file.seek(SeekFrom::Start(new_size))?;
            file.read_exact(&mut trailer)?;
        }

        let backup_path = sidecar_path(path);
        std::fs::write(&backup_path, &trailer)?;
        debug!(
            "Backed up {} trailing bytes of {:?} to {:?}",
            scan.extra_bytes, path, backup_path
        );
        Some(backup_path)
    } else {
        None
    };

    let file = OpenOptions::new().write(true).open(path)?;
    file.set_len(new_size)?;
    info!(
        "Truncated {:?} from {} to {} bytes",
        path, scan.file_size, new_size
    );

    Ok(CleanResult {
        scan,
        cleaned: true,
        backup_path,
    })
}

/// Sidecar path for a file: the original path with [`BACKUP_SUFFIX`]
/// appended.
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(BACKUP_SUFFIX);
    PathBuf::from(os)
}
