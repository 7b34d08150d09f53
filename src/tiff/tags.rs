//! TIFF field-type and tag vocabulary.
//!
//! Unlike a WSI-only reader, this crate widens the field-type table to the
//! full TIFF 6.0 set (rationals, floats, signed variants, BigTIFF's IFD8) so
//! that any tag value encountered while walking an IFD can be sized and
//! byte-swapped, even tags this crate never stores into the [`Ifd`](super::ifd::Ifd) model.

/// TIFF field types, and the size in bytes of a single element of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FieldType {
    Uint8 = 1,
    Ascii = 2,
    Uint16 = 3,
    Uint32 = 4,
    Rational = 5,
    Int8 = 6,
    Undefined = 7,
    Int16 = 8,
    Int32 = 9,
    SRational = 10,
    Float = 11,
    Double = 12,
    Ifd = 13,
    Uint64 = 16,
    Int64 = 17,
    Ifd8 = 18,
}

impl FieldType {
    /// Size in bytes of one element of this type (§4.2 size table).
    ///
    /// RATIONAL and SRATIONAL are 8 bytes total but are swapped as two
    /// independent 4-byte components — see [`Self::is_two_component`].
    #[inline]
    pub const fn size_in_bytes(self) -> u64 {
        match self {
            FieldType::Uint8 | FieldType::Int8 | FieldType::Ascii | FieldType::Undefined => 1,
            FieldType::Uint16 | FieldType::Int16 => 2,
            FieldType::Uint32 | FieldType::Int32 | FieldType::Ifd | FieldType::Float => 4,
            FieldType::Rational
            | FieldType::SRational
            | FieldType::Double
            | FieldType::Uint64
            | FieldType::Int64
            | FieldType::Ifd8 => 8,
        }
    }

    /// RATIONAL/SRATIONAL values are two 32-bit components swapped
    /// independently, never as one 8-byte scalar.
    #[inline]
    pub const fn is_two_component(self) -> bool {
        matches!(self, FieldType::Rational | FieldType::SRational)
    }

    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::Uint8),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Uint16),
            4 => Some(FieldType::Uint32),
            5 => Some(FieldType::Rational),
            6 => Some(FieldType::Int8),
            7 => Some(FieldType::Undefined),
            8 => Some(FieldType::Int16),
            9 => Some(FieldType::Int32),
            10 => Some(FieldType::SRational),
            11 => Some(FieldType::Float),
            12 => Some(FieldType::Double),
            13 => Some(FieldType::Ifd),
            16 => Some(FieldType::Uint64),
            17 => Some(FieldType::Int64),
            18 => Some(FieldType::Ifd8),
            _ => None,
        }
    }
}

/// TIFF tag IDs recognized by the IFD parser (spec §4.4 dispatch table).
/// Tags not listed here are ignored, per TIFF convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TiffTag {
    NewSubfileType = 254,
    ImageWidth = 256,
    ImageLength = 257,
    BitsPerSample = 258,
    Compression = 259,
    PhotometricInterpretation = 262,
    ImageDescription = 270,
    TileWidth = 322,
    TileLength = 323,
    TileOffsets = 324,
    TileByteCounts = 325,
    JpegTables = 347,
    YCbCrSubSampling = 530,
    ReferenceBlackWhite = 532,
}

impl TiffTag {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            254 => Some(TiffTag::NewSubfileType),
            256 => Some(TiffTag::ImageWidth),
            257 => Some(TiffTag::ImageLength),
            258 => Some(TiffTag::BitsPerSample),
            259 => Some(TiffTag::Compression),
            262 => Some(TiffTag::PhotometricInterpretation),
            270 => Some(TiffTag::ImageDescription),
            322 => Some(TiffTag::TileWidth),
            323 => Some(TiffTag::TileLength),
            324 => Some(TiffTag::TileOffsets),
            325 => Some(TiffTag::TileByteCounts),
            347 => Some(TiffTag::JpegTables),
            530 => Some(TiffTag::YCbCrSubSampling),
            532 => Some(TiffTag::ReferenceBlackWhite),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

/// `NewSubfileType` bit flags (TIFF 6.0 §8).
pub const SUBFILETYPE_REDUCEDIMAGE: u32 = 1;

/// Default photometric interpretation (RGB) when the tag is absent, per
/// spec §3: "color space defaults to RGB when absent".
pub const DEFAULT_PHOTOMETRIC_RGB: u16 = 2;
