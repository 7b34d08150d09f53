//! Walks one Image File Directory: reads its tag array, dispatches each tag
//! to populate a per-IFD descriptor, and classifies the IFD's role within
//! the pyramid.

use crate::error::TiffError;
use crate::io::ByteReader;

use super::entry::Tag;
use super::header::TiffHeader;
use super::tags::{TiffTag, DEFAULT_PHOTOMETRIC_RGB, SUBFILETYPE_REDUCEDIMAGE};
use super::values;

/// Role of an IFD within a pyramidal whole-slide image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubimageType {
    #[default]
    Unknown,
    Level,
    Macro,
    Label,
}

/// Per-IFD descriptor: geometry, tile locations, and ancillary blobs.
#[derive(Debug, Clone, Default)]
pub struct Ifd {
    pub index: usize,
    pub subfiletype: u32,
    pub image_width: u32,
    pub image_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub width_in_tiles: u32,
    pub height_in_tiles: u32,
    pub tile_count: u64,
    pub tile_offsets: Vec<u64>,
    pub tile_byte_counts: Vec<u64>,
    pub compression: u16,
    pub color_space: u16,
    pub image_description: Option<Vec<u8>>,
    pub jpeg_tables: Option<Vec<u8>>,
    pub chroma_subsampling_horizontal: u16,
    pub chroma_subsampling_vertical: u16,
    pub reference_black_white: Vec<(u32, u32)>,
    pub subimage_type: SubimageType,
    pub um_per_pixel_x: f64,
    pub um_per_pixel_y: f64,
    pub x_tile_side_in_um: f64,
    pub y_tile_side_in_um: f64,
    /// Convenience read-out, not a TIFF tag: `2^level_ordinal` relative to
    /// level 0, set alongside `um_per_pixel_x/y` by `Image::apply_resolution`.
    pub level_magnification: f64,
}

impl Ifd {
    fn new(index: usize) -> Self {
        Ifd {
            index,
            color_space: DEFAULT_PHOTOMETRIC_RGB,
            // TIFF 6.0 default: 2x2 chroma subsampling when absent.
            chroma_subsampling_horizontal: 2,
            chroma_subsampling_vertical: 2,
            ..Default::default()
        }
    }

    fn classify(&self) -> SubimageType {
        let description = self
            .image_description
            .as_deref()
            .map(|bytes| bytes.split(|&b| b == 0).next().unwrap_or(&[]))
            .unwrap_or(&[]);

        let is_fallback_level = self.tile_width > 0
            && (self.index == 0 || self.subfiletype & SUBFILETYPE_REDUCEDIMAGE != 0);

        if description.starts_with(b"Macro") {
            SubimageType::Macro
        } else if description.starts_with(b"Label") {
            SubimageType::Label
        } else if description.starts_with(b"level") || is_fallback_level {
            SubimageType::Level
        } else {
            SubimageType::Unknown
        }
    }
}

#[inline]
fn ceil_div(a: u32, b: u32) -> u32 {
    if b == 0 { 0 } else { a.div_ceil(b) }
}

/// Parse one IFD starting at `ifd_start_offset`. Returns the populated IFD
/// and the absolute offset of the next IFD (0 if this is the last one).
pub fn parse(
    reader: &dyn ByteReader,
    header: &TiffHeader,
    ifd_start_offset: u64,
    index: usize,
) -> Result<(Ifd, u64), TiffError> {
    let count_size = header.ifd_count_size();
    let count_bytes = reader.read_exact_at(ifd_start_offset, count_size)?;
    let tag_count = if header.is_bigtiff {
        header.byte_order.read_u64(&count_bytes)
    } else {
        header.byte_order.read_u16(&count_bytes) as u64
    };

    let entry_size = header.ifd_entry_size();
    let entries_offset = ifd_start_offset + count_size as u64;
    let entries_bytes = reader.read_exact_at(entries_offset, tag_count as usize * entry_size)?;

    let mut ifd = Ifd::new(index);
    let mut tile_offsets_count: Option<u64> = None;
    let mut tile_byte_counts_count: Option<u64> = None;

    for i in 0..tag_count as usize {
        let raw = &entries_bytes[i * entry_size..(i + 1) * entry_size];
        let tag = Tag::decode(raw, header.byte_order, header.is_bigtiff);
        dispatch(
            reader,
            header,
            &tag,
            &mut ifd,
            &mut tile_offsets_count,
            &mut tile_byte_counts_count,
        )?;
    }

    if let (Some(offsets), Some(byte_counts)) = (tile_offsets_count, tile_byte_counts_count) {
        if offsets != byte_counts {
            return Err(TiffError::InconsistentTileCount {
                ifd_index: index,
                offsets,
                byte_counts,
            });
        }
    }

    if ifd.tile_width > 0 {
        ifd.width_in_tiles = ceil_div(ifd.image_width, ifd.tile_width);
        ifd.height_in_tiles = ceil_div(ifd.image_height, ifd.tile_height);
    }
    ifd.subimage_type = ifd.classify();

    let next_ifd_offset_pos = entries_offset + tag_count * entry_size as u64;
    let offset_width = header.offset_width();
    let next_bytes = reader.read_exact_at(next_ifd_offset_pos, offset_width)?;
    let next_ifd_offset = if header.is_bigtiff {
        header.byte_order.read_u64(&next_bytes)
    } else {
        header.byte_order.read_u32(&next_bytes) as u64
    };

    Ok((ifd, next_ifd_offset))
}

fn dispatch(
    reader: &dyn ByteReader,
    header: &TiffHeader,
    tag: &Tag,
    ifd: &mut Ifd,
    tile_offsets_count: &mut Option<u64>,
    tile_byte_counts_count: &mut Option<u64>,
) -> Result<(), TiffError> {
    let Some(known) = TiffTag::from_u16(tag.code) else {
        return Ok(());
    };

    match known {
        TiffTag::NewSubfileType => {
            ifd.subfiletype = values::load_integers(tag, reader, header.byte_order)?
                .first()
                .copied()
                .unwrap_or(0) as u32;
        }
        TiffTag::ImageWidth => {
            ifd.image_width = first_integer(tag, reader, header)? as u32;
        }
        TiffTag::ImageLength => {
            ifd.image_height = first_integer(tag, reader, header)? as u32;
        }
        TiffTag::BitsPerSample => {
            // Observed only; no stored state needed for the core model.
        }
        TiffTag::Compression => {
            ifd.compression = first_integer(tag, reader, header)? as u16;
        }
        TiffTag::PhotometricInterpretation => {
            ifd.color_space = first_integer(tag, reader, header)? as u16;
        }
        TiffTag::ImageDescription => {
            ifd.image_description = Some(values::load_ascii(tag, reader)?);
        }
        TiffTag::TileWidth => {
            ifd.tile_width = first_integer(tag, reader, header)? as u32;
        }
        TiffTag::TileLength => {
            ifd.tile_height = first_integer(tag, reader, header)? as u32;
        }
        TiffTag::TileOffsets => {
            *tile_offsets_count = Some(tag.data_count);
            ifd.tile_count = tag.data_count;
            ifd.tile_offsets = values::load_integers(tag, reader, header.byte_order)?;
        }
        TiffTag::TileByteCounts => {
            *tile_byte_counts_count = Some(tag.data_count);
            ifd.tile_byte_counts = values::load_integers(tag, reader, header.byte_order)?;
        }
        TiffTag::JpegTables => {
            ifd.jpeg_tables = Some(values::load_undefined(tag, reader)?);
        }
        TiffTag::YCbCrSubSampling => {
            let values = values::load_integers(tag, reader, header.byte_order)?;
            ifd.chroma_subsampling_horizontal = values.first().copied().unwrap_or(2) as u16;
            ifd.chroma_subsampling_vertical = values.get(1).copied().unwrap_or(2) as u16;
        }
        TiffTag::ReferenceBlackWhite => {
            ifd.reference_black_white = values::load_rationals(tag, reader, header.byte_order)?;
        }
    }
    Ok(())
}

fn first_integer(tag: &Tag, reader: &dyn ByteReader, header: &TiffHeader) -> Result<u64, TiffError> {
    Ok(values::load_integers(tag, reader, header.byte_order)?
        .first()
        .copied()
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{ByteOrder, SliceReader};

    fn classic_header() -> TiffHeader {
        TiffHeader {
            byte_order: ByteOrder::LittleEndian,
            is_bigtiff: false,
            first_ifd_offset: 8,
        }
    }

    fn write_entry(buf: &mut Vec<u8>, code: u16, data_type: u16, count: u32, value: u32) {
        buf.extend_from_slice(&code.to_le_bytes());
        buf.extend_from_slice(&data_type.to_le_bytes());
        buf.extend_from_slice(&count.to_le_bytes());
        buf.extend_from_slice(&value.to_le_bytes());
    }

    #[test]
    fn parses_minimal_level_ifd() {
        let ifd_offset = 8u64;
        let entry_count: u16 = 4;

        let mut entries = Vec::new();
        write_entry(&mut entries, 256, 4, 1, 512); // ImageWidth
        write_entry(&mut entries, 257, 4, 1, 512); // ImageLength
        write_entry(&mut entries, 322, 4, 1, 512); // TileWidth
        write_entry(&mut entries, 323, 4, 1, 512); // TileLength

        let mut data = vec![0u8; ifd_offset as usize];
        data.extend_from_slice(&entry_count.to_le_bytes());
        data.extend_from_slice(&entries);
        data.extend_from_slice(&0u32.to_le_bytes()); // next IFD offset = 0

        let reader = SliceReader::new(data);
        let header = classic_header();
        let (ifd, next) = parse(&reader, &header, ifd_offset, 0).unwrap();

        assert_eq!(ifd.image_width, 512);
        assert_eq!(ifd.image_height, 512);
        assert_eq!(ifd.tile_width, 512);
        assert_eq!(ifd.width_in_tiles, 1);
        assert_eq!(ifd.height_in_tiles, 1);
        assert_eq!(ifd.subimage_type, SubimageType::Level);
        assert_eq!(next, 0);
    }

    #[test]
    fn inconsistent_tile_counts_fail() {
        let ifd_offset = 8u64;
        let entry_count: u16 = 2;

        let mut entries = Vec::new();
        // TileOffsets: type UINT32, count 2 -> external (8 bytes payload, exceeds 4-byte inline)
        write_entry(&mut entries, 324, 4, 2, 100);
        // TileByteCounts: count 1
        write_entry(&mut entries, 325, 4, 1, 999);

        let mut data = vec![0u8; ifd_offset as usize];
        data.extend_from_slice(&entry_count.to_le_bytes());
        data.extend_from_slice(&entries);
        data.extend_from_slice(&0u32.to_le_bytes());
        data.resize(200, 0);

        let reader = SliceReader::new(data);
        let header = classic_header();
        let result = parse(&reader, &header, ifd_offset, 0);
        assert!(matches!(result, Err(TiffError::InconsistentTileCount { .. })));
    }
}
