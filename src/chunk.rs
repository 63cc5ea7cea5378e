//! Top-level chunk headers and records.

use std::io::{Read, Seek, SeekFrom};

use serde::{Serialize, Serializer};

use crate::container::ContainerFormat;
use crate::error::Result;

/// Type identifier of a top-level chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkTag {
    /// Four-character atom code (ISO-BMFF / QuickTime).
    Atom([u8; 4]),
    /// 16-byte object GUID (ASF).
    Guid([u8; 16]),
}

impl std::fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkTag::Atom(code) => {
                write!(f, "{}", std::str::from_utf8(code).unwrap_or("????"))
            }
            ChunkTag::Guid(guid) => {
                for byte in guid {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for ChunkTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A parsed top-level chunk.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkRecord {
    /// File offset of the chunk header.
    pub offset: u64,
    /// Declared length, including the chunk's own header bytes.
    pub length: u64,
    /// Chunk type identifier.
    #[serde(rename = "type")]
    pub tag: ChunkTag,
}

/// Decode one top-level chunk header at `pos`.
///
/// The caller guarantees at least [`ContainerFormat::header_len`] bytes
/// remain at `pos`. For MP4/MOV a declared length of exactly 1 is the
/// 64-bit extension sentinel: the true length is read from the 8 bytes
/// following the header (and counts those bytes itself).
pub fn read_header<R: Read + Seek>(
    reader: &mut R,
    format: ContainerFormat,
    pos: u64,
) -> Result<(ChunkTag, u64)> {
    reader.seek(SeekFrom::Start(pos))?;

    match format {
        ContainerFormat::Wmv => {
            let mut header = [0u8; 24];
            reader.read_exact(&mut header)?;

            let mut guid = [0u8; 16];
            guid.copy_from_slice(&header[0..16]);
            let length = u64::from_le_bytes([
                header[16], header[17], header[18], header[19], header[20], header[21],
                header[22], header[23],
            ]);

            Ok((ChunkTag::Guid(guid), length))
        }
        ContainerFormat::Mp4 | ContainerFormat::Mov => {
            let mut header = [0u8; 8];
            reader.read_exact(&mut header)?;

            let size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as u64;
            let tag = ChunkTag::Atom([header[4], header[5], header[6], header[7]]);

            let length = if size == 1 {
                // 64-bit extended size. The file can end inside the
                // extension; missing bytes decode as zero and the walker
                // rejects the resulting length.
                let mut ext = [0u8; 8];
                read_up_to(reader, &mut ext)?;
                u64::from_be_bytes(ext)
            } else {
                size
            };

            Ok((tag, length))
        }
    }
}

/// Fill as much of `buf` as the reader can provide, leaving the rest zeroed.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_mp4_header() {
        let mut data = vec![0x00, 0x00, 0x00, 0x20];
        data.extend_from_slice(b"moov");
        let (tag, length) =
            read_header(&mut Cursor::new(data), ContainerFormat::Mp4, 0).unwrap();
        assert_eq!(tag, ChunkTag::Atom(*b"moov"));
        assert_eq!(length, 32);
    }

    #[test]
    fn decodes_64_bit_extension_sentinel() {
        let mut data = vec![0x00, 0x00, 0x00, 0x01];
        data.extend_from_slice(b"mdat");
        data.extend_from_slice(&5000u64.to_be_bytes());
        let (tag, length) =
            read_header(&mut Cursor::new(data), ContainerFormat::Mp4, 0).unwrap();
        assert_eq!(tag, ChunkTag::Atom(*b"mdat"));
        assert_eq!(length, 5000);
    }

    #[test]
    fn truncated_extension_decodes_as_zero() {
        // File ends right after the 8-byte header that declared size 1
        let mut data = vec![0x00, 0x00, 0x00, 0x01];
        data.extend_from_slice(b"mdat");
        let (_, length) =
            read_header(&mut Cursor::new(data), ContainerFormat::Mp4, 0).unwrap();
        assert_eq!(length, 0);
    }

    #[test]
    fn decodes_wmv_header() {
        let guid = [
            0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62,
            0xCE, 0x6C,
        ];
        let mut data = guid.to_vec();
        data.extend_from_slice(&1024u64.to_le_bytes());
        let (tag, length) =
            read_header(&mut Cursor::new(data), ContainerFormat::Wmv, 0).unwrap();
        assert_eq!(tag, ChunkTag::Guid(guid));
        assert_eq!(length, 1024);
    }

    #[test]
    fn reads_at_offset() {
        let mut data = vec![0xFF; 16];
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x10]);
        data.extend_from_slice(b"free");
        let (tag, length) =
            read_header(&mut Cursor::new(data), ContainerFormat::Mov, 16).unwrap();
        assert_eq!(tag, ChunkTag::Atom(*b"free"));
        assert_eq!(length, 16);
    }

    #[test]
    fn tag_display() {
        assert_eq!(ChunkTag::Atom(*b"ftyp").to_string(), "ftyp");
        assert_eq!(
            ChunkTag::Guid([0x30, 0x26, 0xB2, 0x75, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0])
                .to_string(),
            "3026b275000000000000000000000000"
        );
        assert_eq!(ChunkTag::Atom([0xFF, 0xFE, 0x00, 0x01]).to_string(), "????");
    }
}
