//! Typed block headers and the fixed-size records carried by
//! `HEADER_AND_META` and `IFDS` blocks.
//!
//! Every scalar in the wire stream is encoded host-native: the format is not
//! meant to cross machines with different endianness, only processes on the
//! same host (or identical architectures), so there is no swap-on-decode step
//! here the way there is for the TIFF file itself.

use crate::error::CodecError;
use crate::tiff::ifd::SubimageType;

/// On-wire block type discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum BlockType {
    HeaderAndMeta = 1,
    Ifds = 2,
    ImageDescription = 3,
    TileOffsets = 4,
    TileByteCounts = 5,
    JpegTables = 6,
    Lz4CompressedData = 7,
    Terminator = 0,
}

impl BlockType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(BlockType::Terminator),
            1 => Some(BlockType::HeaderAndMeta),
            2 => Some(BlockType::Ifds),
            3 => Some(BlockType::ImageDescription),
            4 => Some(BlockType::TileOffsets),
            5 => Some(BlockType::TileByteCounts),
            6 => Some(BlockType::JpegTables),
            7 => Some(BlockType::Lz4CompressedData),
            _ => None,
        }
    }
}

/// Size in bytes of one block header: `block_type:u32, index:u32, length:u64`.
pub const BLOCK_HEADER_SIZE: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct BlockHeader {
    pub block_type: u32,
    pub index: u32,
    pub length: u64,
}

impl BlockHeader {
    pub fn new(block_type: BlockType, index: u32, length: u64) -> Self {
        BlockHeader {
            block_type: block_type as u32,
            index,
            length,
        }
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.block_type.to_ne_bytes());
        out.extend_from_slice(&self.index.to_ne_bytes());
        out.extend_from_slice(&self.length.to_ne_bytes());
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < BLOCK_HEADER_SIZE {
            return Err(CodecError::Truncated {
                wanted: BLOCK_HEADER_SIZE,
                available: bytes.len(),
            });
        }
        let block_type = u32::from_ne_bytes(bytes[0..4].try_into().unwrap());
        let index = u32::from_ne_bytes(bytes[4..8].try_into().unwrap());
        let length = u64::from_ne_bytes(bytes[8..16].try_into().unwrap());
        Ok(BlockHeader {
            block_type,
            index,
            length,
        })
    }
}

/// Fixed-size HEADER_AND_META record (Image-level fields only).
pub struct HeaderAndMetaRecord {
    pub filesize: u64,
    pub ifd_count: u64,
    pub main_ifd_index: i64,
    pub macro_ifd_index: i64,
    pub label_ifd_index: i64,
    pub level_base_index: i64,
    pub level_count: u64,
    pub offset_width: u64,
    pub is_bigtiff: bool,
    pub is_big_endian: bool,
    pub mpp_x: f64,
    pub mpp_y: f64,
}

/// Sentinel stored for an absent index (`Option<usize>` has no wire null).
const NO_INDEX: i64 = -1;

pub const HEADER_AND_META_SIZE: usize = 8 * 8 + 1 + 1 + 6 + 8 + 8;

impl HeaderAndMetaRecord {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_AND_META_SIZE);
        out.extend_from_slice(&self.filesize.to_ne_bytes());
        out.extend_from_slice(&self.ifd_count.to_ne_bytes());
        out.extend_from_slice(&self.main_ifd_index.to_ne_bytes());
        out.extend_from_slice(&self.macro_ifd_index.to_ne_bytes());
        out.extend_from_slice(&self.label_ifd_index.to_ne_bytes());
        out.extend_from_slice(&self.level_base_index.to_ne_bytes());
        out.extend_from_slice(&self.level_count.to_ne_bytes());
        out.extend_from_slice(&self.offset_width.to_ne_bytes());
        out.push(self.is_bigtiff as u8);
        out.push(self.is_big_endian as u8);
        out.extend_from_slice(&[0u8; 6]);
        out.extend_from_slice(&self.mpp_x.to_ne_bytes());
        out.extend_from_slice(&self.mpp_y.to_ne_bytes());
        debug_assert_eq!(out.len(), HEADER_AND_META_SIZE);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < HEADER_AND_META_SIZE {
            return Err(CodecError::Truncated {
                wanted: HEADER_AND_META_SIZE,
                available: bytes.len(),
            });
        }
        let mut r = Reader::new(bytes);
        Ok(HeaderAndMetaRecord {
            filesize: r.u64(),
            ifd_count: r.u64(),
            main_ifd_index: r.i64(),
            macro_ifd_index: r.i64(),
            label_ifd_index: r.i64(),
            level_base_index: r.i64(),
            level_count: r.u64(),
            offset_width: r.u64(),
            is_bigtiff: r.u8() != 0,
            is_big_endian: {
                let v = r.u8();
                r.skip(6);
                v != 0
            },
            mpp_x: r.f64(),
            mpp_y: r.f64(),
        })
    }

    pub fn index_to_option(value: i64) -> Option<usize> {
        if value == NO_INDEX {
            None
        } else {
            Some(value as usize)
        }
    }

    pub fn option_to_index(value: Option<usize>) -> i64 {
        value.map(|v| v as i64).unwrap_or(NO_INDEX)
    }
}

/// Fixed-size per-IFD record carried in the IFDS block. Variable-length
/// fields (image description, tile vectors, JPEG tables) are carried in
/// their own per-IFD blocks instead.
pub struct IfdRecord {
    pub index: u64,
    pub subfiletype: u32,
    pub image_width: u32,
    pub image_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub width_in_tiles: u32,
    pub height_in_tiles: u32,
    pub tile_count: u64,
    pub compression: u16,
    pub color_space: u16,
    pub chroma_subsampling_horizontal: u16,
    pub chroma_subsampling_vertical: u16,
    pub subimage_type: u32,
    pub um_per_pixel_x: f64,
    pub um_per_pixel_y: f64,
    pub x_tile_side_in_um: f64,
    pub y_tile_side_in_um: f64,
    pub level_magnification: f64,
}

pub const IFD_RECORD_SIZE: usize =
    8 + 4 * 7 + 8 + 2 * 4 + 4 + 8 * 5;

impl IfdRecord {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(IFD_RECORD_SIZE);
        out.extend_from_slice(&self.index.to_ne_bytes());
        out.extend_from_slice(&self.subfiletype.to_ne_bytes());
        out.extend_from_slice(&self.image_width.to_ne_bytes());
        out.extend_from_slice(&self.image_height.to_ne_bytes());
        out.extend_from_slice(&self.tile_width.to_ne_bytes());
        out.extend_from_slice(&self.tile_height.to_ne_bytes());
        out.extend_from_slice(&self.width_in_tiles.to_ne_bytes());
        out.extend_from_slice(&self.height_in_tiles.to_ne_bytes());
        out.extend_from_slice(&self.tile_count.to_ne_bytes());
        out.extend_from_slice(&self.compression.to_ne_bytes());
        out.extend_from_slice(&self.color_space.to_ne_bytes());
        out.extend_from_slice(&self.chroma_subsampling_horizontal.to_ne_bytes());
        out.extend_from_slice(&self.chroma_subsampling_vertical.to_ne_bytes());
        out.extend_from_slice(&self.subimage_type.to_ne_bytes());
        out.extend_from_slice(&self.um_per_pixel_x.to_ne_bytes());
        out.extend_from_slice(&self.um_per_pixel_y.to_ne_bytes());
        out.extend_from_slice(&self.x_tile_side_in_um.to_ne_bytes());
        out.extend_from_slice(&self.y_tile_side_in_um.to_ne_bytes());
        out.extend_from_slice(&self.level_magnification.to_ne_bytes());
        debug_assert_eq!(out.len(), IFD_RECORD_SIZE);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < IFD_RECORD_SIZE {
            return Err(CodecError::Truncated {
                wanted: IFD_RECORD_SIZE,
                available: bytes.len(),
            });
        }
        let mut r = Reader::new(bytes);
        Ok(IfdRecord {
            index: r.u64(),
            subfiletype: r.u32(),
            image_width: r.u32(),
            image_height: r.u32(),
            tile_width: r.u32(),
            tile_height: r.u32(),
            width_in_tiles: r.u32(),
            height_in_tiles: r.u32(),
            tile_count: r.u64(),
            compression: r.u16(),
            color_space: r.u16(),
            chroma_subsampling_horizontal: r.u16(),
            chroma_subsampling_vertical: r.u16(),
            subimage_type: r.u32(),
            um_per_pixel_x: r.f64(),
            um_per_pixel_y: r.f64(),
            x_tile_side_in_um: r.f64(),
            y_tile_side_in_um: r.f64(),
            level_magnification: r.f64(),
        })
    }
}

pub fn subimage_type_to_wire(value: SubimageType) -> u32 {
    match value {
        SubimageType::Unknown => 0,
        SubimageType::Level => 1,
        SubimageType::Macro => 2,
        SubimageType::Label => 3,
    }
}

pub fn subimage_type_from_wire(value: u32) -> SubimageType {
    match value {
        1 => SubimageType::Level,
        2 => SubimageType::Macro,
        3 => SubimageType::Label,
        _ => SubimageType::Unknown,
    }
}

/// Small cursor over fixed-record bytes; every field width here is chosen
/// by the record layouts above, so this just walks forward.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> &'a [u8] {
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        slice
    }

    fn skip(&mut self, n: usize) {
        self.pos += n;
    }

    fn u8(&mut self) -> u8 {
        self.take(1)[0]
    }

    fn u16(&mut self) -> u16 {
        u16::from_ne_bytes(self.take(2).try_into().unwrap())
    }

    fn u32(&mut self) -> u32 {
        u32::from_ne_bytes(self.take(4).try_into().unwrap())
    }

    fn u64(&mut self) -> u64 {
        u64::from_ne_bytes(self.take(8).try_into().unwrap())
    }

    fn i64(&mut self) -> i64 {
        i64::from_ne_bytes(self.take(8).try_into().unwrap())
    }

    fn f64(&mut self) -> f64 {
        f64::from_ne_bytes(self.take(8).try_into().unwrap())
    }
}
