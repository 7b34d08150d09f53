//! Serializes an [`Image`] descriptor into the framed block stream, wrapped
//! in its HTTP/1.1 envelope, with an optional outer LZ4 compression pass.

use crate::tiff::image::Image;

use super::block::{
    subimage_type_to_wire, BlockHeader, BlockType, HeaderAndMetaRecord, IfdRecord,
};
use super::http;

/// Serialize `image` into a self-contained, HTTP-wrapped block stream.
///
/// When `compress` is true, the assembled block stream is LZ4-compressed and
/// replaced by a single `LZ4_COMPRESSED_DATA` block if compression produced a
/// non-empty result; otherwise the uncompressed stream is kept as-is.
pub fn serialize(image: &Image, compress: bool) -> Vec<u8> {
    let body = build_block_stream(image);

    let body = if compress {
        compress_body(&body)
    } else {
        body
    };

    let mut out = http::build_header(body.len() as u64);
    out.extend_from_slice(&body);
    out
}

fn build_block_stream(image: &Image) -> Vec<u8> {
    let mut out = Vec::new();

    push_header_and_meta(&mut out, image);
    push_ifds(&mut out, image);

    for (i, ifd) in image.ifds.iter().enumerate() {
        let index = i as u32;

        if let Some(description) = &ifd.image_description {
            push_block(&mut out, BlockType::ImageDescription, index, description);
        }

        let tile_offsets: Vec<u8> = ifd
            .tile_offsets
            .iter()
            .flat_map(|v| v.to_ne_bytes())
            .collect();
        push_block(&mut out, BlockType::TileOffsets, index, &tile_offsets);

        let tile_byte_counts: Vec<u8> = ifd
            .tile_byte_counts
            .iter()
            .flat_map(|v| v.to_ne_bytes())
            .collect();
        push_block(&mut out, BlockType::TileByteCounts, index, &tile_byte_counts);

        if let Some(jpeg_tables) = &ifd.jpeg_tables {
            push_block(&mut out, BlockType::JpegTables, index, jpeg_tables);
        }
    }

    push_block(&mut out, BlockType::Terminator, 0, &[]);
    out
}

fn push_header_and_meta(out: &mut Vec<u8>, image: &Image) {
    let record = HeaderAndMetaRecord {
        filesize: image.filesize,
        ifd_count: image.ifds.len() as u64,
        main_ifd_index: HeaderAndMetaRecord::option_to_index(image.main_ifd_index),
        macro_ifd_index: HeaderAndMetaRecord::option_to_index(image.macro_ifd_index),
        label_ifd_index: HeaderAndMetaRecord::option_to_index(image.label_ifd_index),
        level_base_index: HeaderAndMetaRecord::option_to_index(image.level_base_index),
        level_count: image.level_count as u64,
        offset_width: image.offset_width as u64,
        is_bigtiff: image.is_bigtiff,
        is_big_endian: image.is_big_endian,
        mpp_x: image.mpp_x,
        mpp_y: image.mpp_y,
    };
    push_block(out, BlockType::HeaderAndMeta, 0, &record.encode());
}

fn push_ifds(out: &mut Vec<u8>, image: &Image) {
    let mut payload = Vec::new();
    for (i, ifd) in image.ifds.iter().enumerate() {
        let record = IfdRecord {
            index: i as u64,
            subfiletype: ifd.subfiletype,
            image_width: ifd.image_width,
            image_height: ifd.image_height,
            tile_width: ifd.tile_width,
            tile_height: ifd.tile_height,
            width_in_tiles: ifd.width_in_tiles,
            height_in_tiles: ifd.height_in_tiles,
            tile_count: ifd.tile_count,
            compression: ifd.compression,
            color_space: ifd.color_space,
            chroma_subsampling_horizontal: ifd.chroma_subsampling_horizontal,
            chroma_subsampling_vertical: ifd.chroma_subsampling_vertical,
            subimage_type: subimage_type_to_wire(ifd.subimage_type),
            um_per_pixel_x: ifd.um_per_pixel_x,
            um_per_pixel_y: ifd.um_per_pixel_y,
            x_tile_side_in_um: ifd.x_tile_side_in_um,
            y_tile_side_in_um: ifd.y_tile_side_in_um,
            level_magnification: ifd.level_magnification,
        };
        payload.extend_from_slice(&record.encode());
    }
    push_block(out, BlockType::Ifds, 0, &payload);
}

fn push_block(out: &mut Vec<u8>, block_type: BlockType, index: u32, payload: &[u8]) {
    BlockHeader::new(block_type, index, payload.len() as u64).encode(out);
    out.extend_from_slice(payload);
}

fn compress_body(body: &[u8]) -> Vec<u8> {
    let compressed = lz4_flex::block::compress(body);
    let mut out = Vec::new();
    BlockHeader::new(BlockType::Lz4CompressedData, body.len() as u32, compressed.len() as u64)
        .encode(&mut out);
    out.extend_from_slice(&compressed);
    out
}
