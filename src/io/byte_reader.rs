//! Positioned reads from a file handle, and endian-aware scalar decoding.
//!
//! TIFF parsing walks a chain of IFDs scattered throughout the file; every
//! read needs an explicit offset, and none of them should disturb whatever
//! position a concurrent caller thinks the file is at. [`FileReader`] wraps
//! `std::fs::File` and exposes only positioned reads, restoring the cursor
//! on exit exactly as the original C implementation did around
//! `fgetpos`/`fseeko64`/`fsetpos`.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;

use crate::error::IoError;

/// A source of positioned reads over a fixed-size byte resource.
///
/// Implementations must restore any internal cursor on return so that
/// callers can interleave reads freely without coordinating position state.
pub trait ByteReader {
    /// Read exactly `len` bytes starting at `offset`.
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError>;

    /// Total size of the resource in bytes.
    fn size(&self) -> u64;
}

/// Positioned reader over a local file.
///
/// Uses `Mutex<File>` rather than `FileExt::read_at` so this works
/// identically on platforms without a positioned-read syscall: every read
/// takes the lock, seeks, reads, and releases, restoring nothing because no
/// other reader can observe the cursor in between.
pub struct FileReader {
    file: std::sync::Mutex<File>,
    size: u64,
}

impl FileReader {
    /// Open a file and stat its size.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref).map_err(|source| IoError::Open {
            path: path_ref.display().to_string(),
            source,
        })?;
        let size = file
            .metadata()
            .map_err(|source| IoError::Open {
                path: path_ref.display().to_string(),
                source,
            })?
            .len();
        Ok(FileReader {
            file: std::sync::Mutex::new(file),
            size,
        })
    }
}

impl ByteReader for FileReader {
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        let available = self.size.saturating_sub(offset);
        if available < len as u64 {
            return Err(IoError::ShortRead {
                offset,
                wanted: len,
                got: available as usize,
            });
        }

        let mut file = self.file.lock().expect("file reader mutex poisoned");
        file.seek(SeekFrom::Start(offset))
            .map_err(|source| IoError::Read { offset, source })?;

        let mut buf = vec![0u8; len];
        let mut read_so_far = 0;
        while read_so_far < len {
            match file.read(&mut buf[read_so_far..]) {
                Ok(0) => break,
                Ok(n) => read_so_far += n,
                Err(source) => return Err(IoError::Read { offset, source }),
            }
        }
        if read_so_far != len {
            return Err(IoError::ShortRead {
                offset,
                wanted: len,
                got: read_so_far,
            });
        }
        Ok(Bytes::from(buf))
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// In-memory byte reader, used by tests and by the codec's round-trip checks.
pub struct SliceReader {
    data: Bytes,
}

impl SliceReader {
    pub fn new(data: impl Into<Bytes>) -> Self {
        SliceReader { data: data.into() }
    }
}

impl ByteReader for SliceReader {
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        let start = offset as usize;
        let end = start + len;
        if end > self.data.len() {
            return Err(IoError::ShortRead {
                offset,
                wanted: len,
                got: self.data.len().saturating_sub(start),
            });
        }
        Ok(self.data.slice(start..end))
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

// =============================================================================
// Endian helpers
// =============================================================================

/// Byte order (endianness) of a TIFF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        let arr = [bytes[0], bytes[1]];
        match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(arr),
            ByteOrder::BigEndian => u16::from_be_bytes(arr),
        }
    }

    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        let arr = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(arr),
            ByteOrder::BigEndian => u32::from_be_bytes(arr),
        }
    }

    #[inline]
    pub fn read_u64(self, bytes: &[u8]) -> u64 {
        let arr = [
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ];
        match self {
            ByteOrder::LittleEndian => u64::from_le_bytes(arr),
            ByteOrder::BigEndian => u64::from_be_bytes(arr),
        }
    }

    /// Swap a 16-bit value in place if this byte order is big-endian relative
    /// to host order. TIFF's "swap on read" semantics: host is always
    /// treated as little-endian for the purpose of the inline-tag swap rule
    /// in section 4.2 of the format spec.
    #[inline]
    pub fn is_big_endian(self) -> bool {
        matches!(self, ByteOrder::BigEndian)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_u16_round_trip() {
        assert_eq!(ByteOrder::LittleEndian.read_u16(&[0x01, 0x02]), 0x0201);
        assert_eq!(ByteOrder::BigEndian.read_u16(&[0x01, 0x02]), 0x0102);
    }

    #[test]
    fn read_u32_round_trip() {
        assert_eq!(
            ByteOrder::LittleEndian.read_u32(&[0x04, 0x03, 0x02, 0x01]),
            0x01020304
        );
        assert_eq!(
            ByteOrder::BigEndian.read_u32(&[0x01, 0x02, 0x03, 0x04]),
            0x01020304
        );
    }

    #[test]
    fn read_u64_round_trip() {
        let le = [0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01];
        assert_eq!(ByteOrder::LittleEndian.read_u64(&le), 0x0102030405060708);
        let be = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(ByteOrder::BigEndian.read_u64(&be), 0x0102030405060708);
    }

    #[test]
    fn slice_reader_restores_no_state_and_rejects_short_reads() {
        let reader = SliceReader::new(vec![1, 2, 3, 4, 5]);
        assert_eq!(&reader.read_exact_at(1, 3).unwrap()[..], &[2, 3, 4]);
        assert_eq!(&reader.read_exact_at(0, 2).unwrap()[..], &[1, 2]);
        assert!(reader.read_exact_at(3, 10).is_err());
    }

    #[test]
    fn file_reader_positioned_reads_interleave_correctly() {
        use std::io::Write;
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"0123456789").unwrap();
        let reader = FileReader::open(tmp.path()).unwrap();
        assert_eq!(reader.size(), 10);
        assert_eq!(&reader.read_exact_at(5, 3).unwrap()[..], b"567");
        assert_eq!(&reader.read_exact_at(0, 2).unwrap()[..], b"01");
    }

    #[test]
    fn file_reader_rejects_oversized_read_without_allocating() {
        use std::io::Write;
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"0123456789").unwrap();
        let reader = FileReader::open(tmp.path()).unwrap();

        // A malformed tag count claiming far more bytes than the file holds
        // must be rejected as a short read, not attempted as an allocation.
        let result = reader.read_exact_at(5, usize::MAX / 2);
        match result {
            Err(IoError::ShortRead { offset, wanted, got }) => {
                assert_eq!(offset, 5);
                assert_eq!(wanted, usize::MAX / 2);
                assert_eq!(got, 5);
            }
            other => panic!("expected ShortRead, got {other:?}"),
        }
    }
}
