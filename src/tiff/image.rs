//! In-memory descriptor for a whole pyramidal TIFF/BigTIFF file: file-level
//! metadata plus the ordered sequence of IFD descriptors, with derived
//! geometry and cross-index fields populated after parsing.

use std::collections::HashSet;

use crate::error::TiffError;
use crate::io::ByteReader;

use super::header::{TiffHeader, BIGTIFF_HEADER_SIZE};
use super::ifd::{self, Ifd, SubimageType};

/// Fallback resolution when no vendor-specific metadata supplies one.
/// See the open question in the format notes on resolution placeholders.
const DEFAULT_MPP: f64 = 0.25;

/// Top-level descriptor for a parsed TIFF/BigTIFF file.
#[derive(Debug, Clone)]
pub struct Image {
    pub filesize: u64,
    pub is_bigtiff: bool,
    pub is_big_endian: bool,
    pub offset_width: usize,
    pub ifds: Vec<Ifd>,
    pub main_ifd_index: Option<usize>,
    pub macro_ifd_index: Option<usize>,
    pub label_ifd_index: Option<usize>,
    pub level_base_index: Option<usize>,
    pub level_count: usize,
    pub mpp_x: f64,
    pub mpp_y: f64,
}

impl Image {
    /// Parse a whole file: header, then the IFD chain to its 0 terminator.
    pub fn parse(reader: &dyn ByteReader) -> Result<Self, TiffError> {
        let filesize = reader.size();
        let header_len = (BIGTIFF_HEADER_SIZE as u64).min(filesize) as usize;
        let header_bytes = reader.read_exact_at(0, header_len)?;
        let header = TiffHeader::parse(&header_bytes, filesize)?;

        let mut image = Image {
            filesize,
            is_bigtiff: header.is_bigtiff,
            is_big_endian: header.byte_order.is_big_endian(),
            offset_width: header.offset_width(),
            ifds: Vec::new(),
            main_ifd_index: None,
            macro_ifd_index: None,
            label_ifd_index: None,
            level_base_index: None,
            level_count: 0,
            mpp_x: DEFAULT_MPP,
            mpp_y: DEFAULT_MPP,
        };

        let mut next_offset = header.first_ifd_offset;
        let mut index = 0usize;
        let mut visited_offsets = HashSet::new();
        while next_offset != 0 {
            if !visited_offsets.insert(next_offset) {
                return Err(TiffError::CyclicIfdChain(next_offset));
            }
            let (parsed_ifd, next) = ifd::parse(reader, &header, next_offset, index)?;
            match parsed_ifd.subimage_type {
                SubimageType::Macro => image.macro_ifd_index = Some(index),
                SubimageType::Label => image.label_ifd_index = Some(index),
                _ => {}
            }
            image.ifds.push(parsed_ifd);
            next_offset = next;
            index += 1;
        }

        image.finalize();
        Ok(image)
    }

    fn finalize(&mut self) {
        if !self.ifds.is_empty() {
            self.main_ifd_index = Some(0);
            self.level_base_index = Some(0);
        }
        self.level_count = self
            .ifds
            .iter()
            .filter(|ifd| ifd.subimage_type == SubimageType::Level)
            .count();

        self.apply_resolution();
    }

    fn apply_resolution(&mut self) {
        let mut level_ordinal = 0u32;
        for ifd in &mut self.ifds {
            if ifd.subimage_type != SubimageType::Level {
                continue;
            }
            let scale = 2f64.powi(level_ordinal as i32);
            ifd.um_per_pixel_x = self.mpp_x * scale;
            ifd.um_per_pixel_y = self.mpp_y * scale;
            ifd.x_tile_side_in_um = ifd.um_per_pixel_x * ifd.tile_width as f64;
            ifd.y_tile_side_in_um = ifd.um_per_pixel_y * ifd.tile_height as f64;
            ifd.level_magnification = scale;
            level_ordinal += 1;
        }
    }

    /// Override the level-0 resolution placeholder and recompute every
    /// level's derived micrometers-per-pixel and tile-side fields.
    ///
    /// Exists because the placeholder `0.25 * 2^level` fallback has no
    /// access to vendor-specific resolution metadata; a caller that can
    /// extract it (e.g. from `image_description`) applies it here.
    pub fn set_resolution(&mut self, mpp_x: f64, mpp_y: f64) {
        self.mpp_x = mpp_x;
        self.mpp_y = mpp_y;
        self.apply_resolution();
    }

    pub fn main_ifd(&self) -> Option<&Ifd> {
        self.main_ifd_index.and_then(|i| self.ifds.get(i))
    }

    pub fn macro_ifd(&self) -> Option<&Ifd> {
        self.macro_ifd_index.and_then(|i| self.ifds.get(i))
    }

    pub fn label_ifd(&self) -> Option<&Ifd> {
        self.label_ifd_index.and_then(|i| self.ifds.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SliceReader;

    fn write_entry(buf: &mut Vec<u8>, code: u16, data_type: u16, count: u32, value: u32) {
        buf.extend_from_slice(&code.to_le_bytes());
        buf.extend_from_slice(&data_type.to_le_bytes());
        buf.extend_from_slice(&count.to_le_bytes());
        buf.extend_from_slice(&value.to_le_bytes());
    }

    fn minimal_level_tiff() -> Vec<u8> {
        // Header: classic little-endian, first IFD at offset 8.
        let mut data = vec![0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];

        let mut entries = Vec::new();
        write_entry(&mut entries, 256, 4, 1, 512); // ImageWidth
        write_entry(&mut entries, 257, 4, 1, 512); // ImageLength
        write_entry(&mut entries, 322, 4, 1, 512); // TileWidth
        write_entry(&mut entries, 323, 4, 1, 512); // TileLength

        data.extend_from_slice(&4u16.to_le_bytes());
        data.extend_from_slice(&entries);
        data.extend_from_slice(&0u32.to_le_bytes()); // terminates chain
        data
    }

    #[test]
    fn parses_single_level_image_and_applies_mpp_fallback() {
        let reader = SliceReader::new(minimal_level_tiff());
        let image = Image::parse(&reader).unwrap();

        assert_eq!(image.ifds.len(), 1);
        assert_eq!(image.level_count, 1);
        assert_eq!(image.main_ifd_index, Some(0));
        assert_eq!(image.mpp_x, DEFAULT_MPP);

        let level0 = &image.ifds[0];
        assert_eq!(level0.um_per_pixel_x, 0.25);
        assert_eq!(level0.x_tile_side_in_um, 0.25 * 512.0);
        assert_eq!(level0.level_magnification, 1.0);
    }

    #[test]
    fn set_resolution_overrides_placeholder_and_recomputes() {
        let reader = SliceReader::new(minimal_level_tiff());
        let mut image = Image::parse(&reader).unwrap();
        image.set_resolution(0.5, 0.5);
        assert_eq!(image.ifds[0].um_per_pixel_x, 0.5);
        assert_eq!(image.ifds[0].x_tile_side_in_um, 0.5 * 512.0);
    }

    #[test]
    fn cyclic_ifd_chain_is_rejected_instead_of_looping_forever() {
        // Header: classic little-endian, first IFD at offset 8. The IFD's
        // next-offset field points back at offset 8 instead of 0.
        let mut data = vec![0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];

        let mut entries = Vec::new();
        write_entry(&mut entries, 256, 4, 1, 512);
        write_entry(&mut entries, 257, 4, 1, 512);

        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&entries);
        data.extend_from_slice(&8u32.to_le_bytes()); // points back at itself

        let reader = SliceReader::new(data);
        let result = Image::parse(&reader);
        assert!(matches!(result, Err(TiffError::CyclicIfdChain(8))));
    }
}
