use thiserror::Error;

/// I/O errors that can occur when reading from the underlying file.
#[derive(Debug, Error)]
pub enum IoError {
    /// The source file could not be opened or stat'd.
    #[error("failed to open file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A positioned read returned fewer bytes than requested.
    #[error("short read at offset {offset}: wanted {wanted} bytes, got {got}")]
    ShortRead {
        offset: u64,
        wanted: usize,
        got: usize,
    },

    /// The underlying read or seek syscall failed.
    #[error("read error at offset {offset}: {source}")]
    Read {
        offset: u64,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when parsing a TIFF or BigTIFF file.
#[derive(Debug, Error)]
pub enum TiffError {
    /// I/O error while reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// File ended before a structurally required read could complete.
    #[error("truncated file: need at least {required} bytes, got {actual}")]
    Truncated { required: u64, actual: u64 },

    /// Byte-order marker is neither "II" nor "MM".
    #[error("invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Version field is neither 42 (classic) nor 43 (BigTIFF).
    #[error("invalid TIFF version: expected 42 or 43, got {0}")]
    InvalidVersion(u16),

    /// BigTIFF offset-size field is not 8, or the reserved field is nonzero.
    #[error("invalid BigTIFF offset-size field: expected 8, got {0}")]
    InvalidBigTiffOffsetSize(u16),

    /// The first (or a chained) IFD offset points outside the file.
    #[error("invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// TileByteCounts arrived with a count that disagrees with TileOffsets.
    #[error(
        "inconsistent tile count for IFD {ifd_index}: TileOffsets has {offsets}, TileByteCounts has {byte_counts}"
    )]
    InconsistentTileCount {
        ifd_index: usize,
        offsets: u64,
        byte_counts: u64,
    },

    /// A tag's data type is not one of the recognized TIFF field types.
    #[error("unknown TIFF field type: {0}")]
    UnknownFieldType(u16),

    /// A tag carried a data type or count unsuitable for the value being read.
    #[error("invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },

    /// The next-IFD chain revisits an offset already parsed.
    #[error("cyclic IFD chain: offset {0} was already visited")]
    CyclicIfdChain(u64),

    /// `validate_strict` rejected an IFD whose tile geometry isn't 512x512.
    #[error(
        "IFD {ifd_index} has tile geometry {tile_width}x{tile_height}, strict mode requires 512x512"
    )]
    UnsupportedTileGeometry {
        ifd_index: usize,
        tile_width: u32,
        tile_height: u32,
    },
}

/// Errors that can occur when serializing or reconstructing the wire codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The buffer does not contain a `\r\n\r\n`-terminated HTTP envelope.
    #[error("missing end of HTTP header section")]
    MissingHttpHeaderTerminator,

    /// A short read while popping a block header or payload off the buffer.
    #[error("truncated block stream: wanted {wanted} bytes, {available} available")]
    Truncated { wanted: usize, available: usize },

    /// A block appeared out of the mandatory sequence (e.g. IFDS before HEADER_AND_META).
    #[error("unexpected block type {found} where {expected} was required")]
    UnexpectedBlockType { expected: &'static str, found: u32 },

    /// The IFDS block length does not equal `ifd_count * ifd_record_size`.
    #[error("IFDS block length {found} does not match expected {expected}")]
    BadIfdsBlockLength { expected: u64, found: u64 },

    /// A per-IFD block referenced an IFD index that does not exist.
    #[error("block references out-of-range IFD index {index} (ifd_count={ifd_count})")]
    IfdIndexOutOfRange { index: u32, ifd_count: u32 },

    /// The same field-carrying block type arrived twice for one IFD.
    #[error("duplicate {field} block for IFD {index}")]
    DuplicateField { field: &'static str, index: u32 },

    /// LZ4 decompression failed outright.
    #[error("LZ4 decompression failed: {0}")]
    Decompress(String),

    /// LZ4 decompression succeeded but produced the wrong number of bytes.
    #[error("LZ4 decompressed size mismatch: expected {expected}, got {actual}")]
    DecompressedSizeMismatch { expected: u64, actual: usize },
}
