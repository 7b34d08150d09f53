//! TIFF / BigTIFF file header parsing.
//!
//! ## Classic TIFF (8 bytes)
//! ```text
//! Bytes 0-1: Byte order (0x4949 = little-endian "II", 0x4D4D = big-endian "MM")
//! Bytes 2-3: Version (42 = 0x002A)
//! Bytes 4-7: Offset to first IFD (4 bytes)
//! ```
//!
//! ## BigTIFF (16 bytes)
//! ```text
//! Bytes 0-1: Byte order
//! Bytes 2-3: Version (43 = 0x002B)
//! Bytes 4-5: Offset byte size (must be 8)
//! Bytes 6-7: Reserved (must be 0)
//! Bytes 8-15: Offset to first IFD (8 bytes)
//! ```

use crate::error::TiffError;
use crate::io::ByteOrder;

const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;
const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;

const VERSION_TIFF: u16 = 42;
const VERSION_BIGTIFF: u16 = 43;

/// Size of a classic TIFF header in bytes.
pub const TIFF_HEADER_SIZE: usize = 8;
/// Size of a BigTIFF header in bytes.
pub const BIGTIFF_HEADER_SIZE: usize = 16;

/// Parsed TIFF/BigTIFF file header: byte order, format, and first IFD offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    pub byte_order: ByteOrder,
    pub is_bigtiff: bool,
    pub first_ifd_offset: u64,
}

impl TiffHeader {
    /// Parse the header from the first 8 (classic) or 16 (BigTIFF) bytes of a file.
    ///
    /// `bytes` must contain at least [`TIFF_HEADER_SIZE`] bytes; BigTIFF files
    /// additionally require [`BIGTIFF_HEADER_SIZE`] bytes.
    pub fn parse(bytes: &[u8], file_size: u64) -> Result<Self, TiffError> {
        if bytes.len() < TIFF_HEADER_SIZE {
            return Err(TiffError::Truncated {
                required: TIFF_HEADER_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        let magic = u16::from_le_bytes([bytes[0], bytes[1]]);
        let byte_order = match magic {
            BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(TiffError::InvalidMagic(magic)),
        };

        let version = byte_order.read_u16(&bytes[2..4]);

        match version {
            VERSION_TIFF => {
                let first_ifd_offset = byte_order.read_u32(&bytes[4..8]) as u64;
                if first_ifd_offset >= file_size {
                    return Err(TiffError::InvalidIfdOffset(first_ifd_offset));
                }
                Ok(TiffHeader {
                    byte_order,
                    is_bigtiff: false,
                    first_ifd_offset,
                })
            }
            VERSION_BIGTIFF => {
                if bytes.len() < BIGTIFF_HEADER_SIZE {
                    return Err(TiffError::Truncated {
                        required: BIGTIFF_HEADER_SIZE as u64,
                        actual: bytes.len() as u64,
                    });
                }

                let offset_size = byte_order.read_u16(&bytes[4..6]);
                if offset_size != 8 {
                    return Err(TiffError::InvalidBigTiffOffsetSize(offset_size));
                }
                let reserved = byte_order.read_u16(&bytes[6..8]);
                if reserved != 0 {
                    return Err(TiffError::InvalidBigTiffOffsetSize(offset_size));
                }

                let first_ifd_offset = byte_order.read_u64(&bytes[8..16]);
                if first_ifd_offset >= file_size {
                    return Err(TiffError::InvalidIfdOffset(first_ifd_offset));
                }

                Ok(TiffHeader {
                    byte_order,
                    is_bigtiff: true,
                    first_ifd_offset,
                })
            }
            _ => Err(TiffError::InvalidVersion(version)),
        }
    }

    /// Width, in bytes, of offsets and the inline-value threshold: 4 for
    /// classic TIFF, 8 for BigTIFF.
    #[inline]
    pub const fn offset_width(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            4
        }
    }

    /// Size of the entry-count field that precedes an IFD's tag array.
    #[inline]
    pub const fn ifd_count_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            2
        }
    }

    /// Size in bytes of one raw IFD entry: 12 for classic TIFF, 20 for BigTIFF.
    #[inline]
    pub const fn ifd_entry_size(&self) -> usize {
        if self.is_bigtiff {
            20
        } else {
            12
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_classic_little_endian() {
        let header = [0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
        let h = TiffHeader::parse(&header, 1000).unwrap();
        assert_eq!(h.byte_order, ByteOrder::LittleEndian);
        assert!(!h.is_bigtiff);
        assert_eq!(h.first_ifd_offset, 8);
        assert_eq!(h.offset_width(), 4);
        assert_eq!(h.ifd_entry_size(), 12);
    }

    #[test]
    fn parse_classic_big_endian() {
        let header = [0x4D, 0x4D, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08];
        let h = TiffHeader::parse(&header, 1000).unwrap();
        assert_eq!(h.byte_order, ByteOrder::BigEndian);
        assert_eq!(h.first_ifd_offset, 8);
    }

    #[test]
    fn parse_bigtiff_little_endian() {
        let header = [
            0x49, 0x49, 0x2B, 0x00, 0x08, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ];
        let h = TiffHeader::parse(&header, 1000).unwrap();
        assert!(h.is_bigtiff);
        assert_eq!(h.first_ifd_offset, 16);
        assert_eq!(h.offset_width(), 8);
        assert_eq!(h.ifd_entry_size(), 20);
    }

    #[test]
    fn rejects_bad_magic() {
        let header = [0x00, 0x00, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
        assert!(matches!(
            TiffHeader::parse(&header, 1000),
            Err(TiffError::InvalidMagic(0))
        ));
    }

    #[test]
    fn rejects_bad_version() {
        let header = [0x49, 0x49, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00];
        assert!(matches!(
            TiffHeader::parse(&header, 1000),
            Err(TiffError::InvalidVersion(0))
        ));
    }

    #[test]
    fn rejects_bad_bigtiff_offset_size() {
        let header = [
            0x49, 0x49, 0x2B, 0x00, 0x04, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ];
        assert!(matches!(
            TiffHeader::parse(&header, 1000),
            Err(TiffError::InvalidBigTiffOffsetSize(4))
        ));
    }

    #[test]
    fn rejects_truncated_header() {
        let header = [0x49, 0x49, 0x2A, 0x00];
        assert!(matches!(
            TiffHeader::parse(&header, 1000),
            Err(TiffError::Truncated {
                required: 8,
                actual: 4
            })
        ));
    }

    #[test]
    fn rejects_out_of_range_ifd_offset() {
        let header = [0x49, 0x49, 0x2A, 0x00, 0xE8, 0x03, 0x00, 0x00];
        assert!(matches!(
            TiffHeader::parse(&header, 500),
            Err(TiffError::InvalidIfdOffset(1000))
        ));
    }
}
