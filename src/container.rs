//! Container format detection from file signatures.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};

/// First four bytes of the ASF header object GUID.
const ASF_GUID_PREFIX: [u8; 4] = [0x30, 0x26, 0xB2, 0x75];

/// ISO-BMFF brands treated as plain MP4.
const MP4_BRANDS: [&[u8; 4]; 5] = [b"isom", b"iso2", b"mp41", b"mp42", b"M4V "];

/// QuickTime brand.
const MOV_BRAND: &[u8; 4] = b"qt  ";

/// File extensions the scanner knows how to walk.
const MEDIA_EXTENSIONS: &[&str] = &["mp4", "mov", "wmv"];

/// Supported container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    /// ISO-BMFF (.mp4, .m4v)
    Mp4,
    /// QuickTime (.mov)
    Mov,
    /// ASF (.wmv)
    Wmv,
}

impl ContainerFormat {
    /// Minimum number of bytes needed to attempt decoding a top-level
    /// chunk header in this format.
    pub fn header_len(&self) -> u64 {
        match self {
            ContainerFormat::Mp4 | ContainerFormat::Mov => 8,
            ContainerFormat::Wmv => 24,
        }
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerFormat::Mp4 => write!(f, "MP4"),
            ContainerFormat::Mov => write!(f, "MOV"),
            ContainerFormat::Wmv => write!(f, "WMV"),
        }
    }
}

/// Detect container format from file magic bytes.
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<ContainerFormat> {
    let mut file = File::open(path)?;
    detect_format_from_reader(&mut file)
}

/// Detect container format from a reader.
///
/// Reads the first 16 bytes. A file shorter than that simply matches no
/// signature and is reported as unsupported, not as an I/O error.
pub fn detect_format_from_reader<R: Read + Seek>(reader: &mut R) -> Result<ContainerFormat> {
    reader.rewind()?;

    let mut magic = [0u8; 16];
    let mut filled = 0;
    while filled < magic.len() {
        let n = reader.read(&mut magic[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    // ftyp box starts at offset 4, brand at offset 8
    if filled >= 12 && &magic[4..8] == b"ftyp" {
        let brand: [u8; 4] = [magic[8], magic[9], magic[10], magic[11]];
        if MP4_BRANDS.contains(&&brand) {
            return Ok(ContainerFormat::Mp4);
        }
        if &brand == MOV_BRAND {
            return Ok(ContainerFormat::Mov);
        }
        return Err(Error::unsupported(format!(
            "unrecognized ftyp brand: {}",
            String::from_utf8_lossy(&brand)
        )));
    }

    // The ASF GUID prefix alone is sufficient for WMV
    if filled >= 4 && magic[0..4] == ASF_GUID_PREFIX {
        return Ok(ContainerFormat::Wmv);
    }

    Err(Error::unsupported(
        "no recognized container signature in file prefix".to_string(),
    ))
}

/// Check if a path has one of the supported media file extensions.
///
/// Callers batching a directory can use this to skip files the scanner
/// would reject anyway without opening them.
pub fn is_media_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MEDIA_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prefix(bytes: &[u8]) -> Cursor<Vec<u8>> {
        let mut data = bytes.to_vec();
        data.resize(16, 0);
        Cursor::new(data)
    }

    #[test]
    fn detects_mp4_brands() {
        for brand in [b"isom", b"iso2", b"mp41", b"mp42", b"M4V "] {
            let mut data = vec![0x00, 0x00, 0x00, 0x14];
            data.extend_from_slice(b"ftyp");
            data.extend_from_slice(brand);
            let format = detect_format_from_reader(&mut prefix(&data)).unwrap();
            assert_eq!(format, ContainerFormat::Mp4, "brand {:?}", brand);
        }
    }

    #[test]
    fn detects_quicktime_brand() {
        let mut data = vec![0x00, 0x00, 0x00, 0x14];
        data.extend_from_slice(b"ftyp");
        data.extend_from_slice(b"qt  ");
        let format = detect_format_from_reader(&mut prefix(&data)).unwrap();
        assert_eq!(format, ContainerFormat::Mov);
    }

    #[test]
    fn detects_asf_guid_prefix_regardless_of_rest() {
        let data = [
            0x30, 0x26, 0xB2, 0x75, 0xAA, 0xBB, 0xCC, 0xDD, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66,
            0x77, 0x88,
        ];
        let format = detect_format_from_reader(&mut Cursor::new(data.to_vec())).unwrap();
        assert_eq!(format, ContainerFormat::Wmv);
    }

    #[test]
    fn rejects_unknown_ftyp_brand() {
        let mut data = vec![0x00, 0x00, 0x00, 0x14];
        data.extend_from_slice(b"ftyp");
        data.extend_from_slice(b"3gp4");
        let err = detect_format_from_reader(&mut prefix(&data)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_unrecognized_prefix() {
        let err = detect_format_from_reader(&mut prefix(b"RIFF....WAVE")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_short_file() {
        let err = detect_format_from_reader(&mut Cursor::new(vec![0x30, 0x26])).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn header_len_per_format() {
        assert_eq!(ContainerFormat::Mp4.header_len(), 8);
        assert_eq!(ContainerFormat::Mov.header_len(), 8);
        assert_eq!(ContainerFormat::Wmv.header_len(), 24);
    }

    #[test]
    fn media_file_extensions() {
        assert!(is_media_file(Path::new("clip.mp4")));
        assert!(is_media_file(Path::new("/some/dir/movie.MOV")));
        assert!(is_media_file(Path::new("old.wmv")));
        assert!(!is_media_file(Path::new("notes.txt")));
        assert!(!is_media_file(Path::new("noextension")));
    }
}
