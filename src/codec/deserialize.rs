//! Reconstructs an [`Image`] from a serialized block stream, without ever
//! touching the original TIFF file.

use crate::error::CodecError;
use crate::tiff::ifd::Ifd;
use crate::tiff::image::Image;

use super::block::{
    subimage_type_from_wire, BlockHeader, BlockType, HeaderAndMetaRecord, IfdRecord,
    BLOCK_HEADER_SIZE,
};
use super::http;

fn pop_block<'a>(data: &'a [u8], pos: &mut usize) -> Result<(BlockHeader, &'a [u8]), CodecError> {
    let header = BlockHeader::decode(
        data.get(*pos..*pos + BLOCK_HEADER_SIZE)
            .ok_or(CodecError::Truncated {
                wanted: BLOCK_HEADER_SIZE,
                available: data.len().saturating_sub(*pos),
            })?,
    )?;
    *pos += BLOCK_HEADER_SIZE;

    let length = header.length as usize;
    let payload = data
        .get(*pos..*pos + length)
        .ok_or(CodecError::Truncated {
            wanted: length,
            available: data.len().saturating_sub(*pos),
        })?;
    *pos += length;

    Ok((header, payload))
}

fn require_block_type(header: &BlockHeader, expected: BlockType, name: &'static str) -> Result<(), CodecError> {
    if header.block_type != expected as u32 {
        return Err(CodecError::UnexpectedBlockType {
            expected: name,
            found: header.block_type,
        });
    }
    Ok(())
}

/// Per-IFD duplicate-field guard, mirroring the four variable-length block
/// types a producer may send once each.
#[derive(Default, Clone)]
struct SeenFields {
    image_description: bool,
    tile_offsets: bool,
    tile_byte_counts: bool,
    jpeg_tables: bool,
}

pub fn deserialize(buf: &[u8]) -> Result<Image, CodecError> {
    let body_start = http::find_end_of_headers(buf).ok_or(CodecError::MissingHttpHeaderTerminator)?;

    let owned: Vec<u8>;
    let mut data: &[u8] = &buf[body_start..];
    let mut pos = 0usize;

    let (first_header, first_payload) = pop_block(data, &mut pos)?;

    let (meta_header, meta_payload) = if first_header.block_type == BlockType::Lz4CompressedData as u32 {
        let expected_size = first_header.index as usize;
        let decompressed = lz4_flex::block::decompress(first_payload, expected_size.max(1))
            .map_err(|e| CodecError::Decompress(e.to_string()))?;
        if decompressed.len() != expected_size {
            tracing::warn!(
                expected = expected_size,
                actual = decompressed.len(),
                "LZ4 decompressed size mismatch"
            );
        }
        owned = decompressed;
        data = &owned;
        pos = 0;
        pop_block(data, &mut pos)?
    } else {
        (first_header, first_payload)
    };

    require_block_type(&meta_header, BlockType::HeaderAndMeta, "HEADER_AND_META")?;
    let meta = HeaderAndMetaRecord::decode(meta_payload)?;

    let (ifds_header, ifds_payload) = pop_block(data, &mut pos)?;
    require_block_type(&ifds_header, BlockType::Ifds, "IFDS")?;

    // Derive the IFD count from the already bounds-checked block length
    // rather than trusting `meta.ifd_count` directly: a huge, attacker-chosen
    // `ifd_count` could overflow `ifd_count * IFD_RECORD_SIZE` (wrapping to
    // match a small real block length in a release build) and then drive an
    // unbounded `Vec::with_capacity`.
    let record_size = super::block::IFD_RECORD_SIZE as u64;
    if ifds_header.length % record_size != 0 || ifds_header.length / record_size != meta.ifd_count {
        return Err(CodecError::BadIfdsBlockLength {
            expected: meta.ifd_count.saturating_mul(record_size),
            found: ifds_header.length,
        });
    }
    let ifd_count = (ifds_header.length / record_size) as usize;

    let mut ifds = Vec::with_capacity(ifd_count);
    for i in 0..ifd_count {
        let start = i * super::block::IFD_RECORD_SIZE;
        let end = start + super::block::IFD_RECORD_SIZE;
        let record = IfdRecord::decode(&ifds_payload[start..end])?;
        ifds.push(record_to_ifd(record));
    }
    let mut seen = vec![SeenFields::default(); ifd_count];

    loop {
        let (header, payload) = pop_block(data, &mut pos)?;
        let Some(block_type) = BlockType::from_u32(header.block_type) else {
            return Err(CodecError::UnexpectedBlockType {
                expected: "a known block type",
                found: header.block_type,
            });
        };

        if block_type == BlockType::Terminator {
            break;
        }

        let index = header.index as usize;
        if index >= ifd_count {
            return Err(CodecError::IfdIndexOutOfRange {
                index: header.index,
                ifd_count: ifd_count as u32,
            });
        }

        match block_type {
            BlockType::ImageDescription => {
                if seen[index].image_description {
                    return Err(CodecError::DuplicateField {
                        field: "IMAGE_DESCRIPTION",
                        index: header.index,
                    });
                }
                seen[index].image_description = true;
                ifds[index].image_description = Some(payload.to_vec());
            }
            BlockType::TileOffsets => {
                if seen[index].tile_offsets {
                    return Err(CodecError::DuplicateField {
                        field: "TILE_OFFSETS",
                        index: header.index,
                    });
                }
                seen[index].tile_offsets = true;
                ifds[index].tile_offsets = payload
                    .chunks_exact(8)
                    .map(|c| u64::from_ne_bytes(c.try_into().unwrap()))
                    .collect();
            }
            BlockType::TileByteCounts => {
                if seen[index].tile_byte_counts {
                    return Err(CodecError::DuplicateField {
                        field: "TILE_BYTE_COUNTS",
                        index: header.index,
                    });
                }
                seen[index].tile_byte_counts = true;
                ifds[index].tile_byte_counts = payload
                    .chunks_exact(8)
                    .map(|c| u64::from_ne_bytes(c.try_into().unwrap()))
                    .collect();
            }
            BlockType::JpegTables => {
                if seen[index].jpeg_tables {
                    return Err(CodecError::DuplicateField {
                        field: "JPEG_TABLES",
                        index: header.index,
                    });
                }
                seen[index].jpeg_tables = true;
                ifds[index].jpeg_tables = Some(payload.to_vec());
            }
            BlockType::HeaderAndMeta | BlockType::Ifds | BlockType::Lz4CompressedData => {
                return Err(CodecError::UnexpectedBlockType {
                    expected: "a per-IFD block or TERMINATOR",
                    found: header.block_type,
                });
            }
            BlockType::Terminator => unreachable!(),
        }
    }

    Ok(Image {
        filesize: meta.filesize,
        is_bigtiff: meta.is_bigtiff,
        is_big_endian: meta.is_big_endian,
        offset_width: meta.offset_width as usize,
        ifds,
        main_ifd_index: HeaderAndMetaRecord::index_to_option(meta.main_ifd_index),
        macro_ifd_index: HeaderAndMetaRecord::index_to_option(meta.macro_ifd_index),
        label_ifd_index: HeaderAndMetaRecord::index_to_option(meta.label_ifd_index),
        level_base_index: HeaderAndMetaRecord::index_to_option(meta.level_base_index),
        level_count: meta.level_count as usize,
        mpp_x: meta.mpp_x,
        mpp_y: meta.mpp_y,
    })
}

fn record_to_ifd(record: IfdRecord) -> Ifd {
    Ifd {
        index: record.index as usize,
        subfiletype: record.subfiletype,
        image_width: record.image_width,
        image_height: record.image_height,
        tile_width: record.tile_width,
        tile_height: record.tile_height,
        width_in_tiles: record.width_in_tiles,
        height_in_tiles: record.height_in_tiles,
        tile_count: record.tile_count,
        tile_offsets: Vec::new(),
        tile_byte_counts: Vec::new(),
        compression: record.compression,
        color_space: record.color_space,
        image_description: None,
        jpeg_tables: None,
        chroma_subsampling_horizontal: record.chroma_subsampling_horizontal,
        chroma_subsampling_vertical: record.chroma_subsampling_vertical,
        reference_black_white: Vec::new(),
        subimage_type: subimage_type_from_wire(record.subimage_type),
        um_per_pixel_x: record.um_per_pixel_x,
        um_per_pixel_y: record.um_per_pixel_y,
        x_tile_side_in_um: record.x_tile_side_in_um,
        y_tile_side_in_um: record.y_tile_side_in_um,
        level_magnification: record.level_magnification,
    }
}
