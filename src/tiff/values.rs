//! Materializes a decoded [`Tag`]'s payload: ASCII strings, opaque blobs,
//! widened integer arrays, and rational pairs — inline or fetched from the
//! file at the tag's external offset.

use bytes::Bytes;

use crate::error::{IoError, TiffError};
use crate::io::{ByteOrder, ByteReader};

use super::entry::{Tag, TagValue};

fn payload_size(tag: &Tag) -> usize {
    let element_size = tag.data_type.map(|t| t.size_in_bytes()).unwrap_or(1);
    (element_size * tag.data_count) as usize
}

fn payload_bytes(tag: &Tag, reader: &dyn ByteReader) -> Result<Bytes, IoError> {
    match tag.value {
        TagValue::Inline { bytes, len } => Ok(Bytes::copy_from_slice(&bytes[..len])),
        TagValue::External(offset) => reader.read_exact_at(offset, payload_size(tag)),
    }
}

/// Return the NUL-terminated string payload of an ASCII tag.
///
/// The returned buffer always holds at least `data_count` bytes followed by
/// a trailing NUL, regardless of whether the source bytes already end in one.
pub fn load_ascii(tag: &Tag, reader: &dyn ByteReader) -> Result<Vec<u8>, TiffError> {
    let mut bytes = payload_bytes(tag, reader)?.to_vec();
    if bytes.last() != Some(&0) {
        bytes.push(0);
    }
    Ok(bytes)
}

/// Return the raw byte payload of an UNDEFINED tag (opaque blob, no text semantics).
pub fn load_undefined(tag: &Tag, reader: &dyn ByteReader) -> Result<Vec<u8>, TiffError> {
    Ok(payload_bytes(tag, reader)?.to_vec())
}

/// Widen an integer-typed tag's elements to `u64`, byte-swapping per element
/// when big-endian. Inline tags return their single widened value as a
/// one-element sequence (or more, if multiple small elements fit inline).
pub fn load_integers(tag: &Tag, reader: &dyn ByteReader, byte_order: ByteOrder) -> Result<Vec<u64>, TiffError> {
    let element_size = tag
        .data_type
        .map(|t| t.size_in_bytes())
        .ok_or(TiffError::UnknownFieldType(tag.raw_data_type))? as usize;
    if !matches!(element_size, 1 | 2 | 4 | 8) {
        return Err(TiffError::InvalidTagValue {
            tag: "integer-array",
            message: format!("unsupported element size {element_size}"),
        });
    }

    let bytes = payload_bytes(tag, reader)?;
    let count = tag.data_count as usize;

    let mut out = Vec::with_capacity(count);
    for chunk in bytes.chunks(element_size) {
        let value = match element_size {
            1 => chunk[0] as u64,
            2 => byte_order.read_u16(chunk) as u64,
            4 => byte_order.read_u32(chunk) as u64,
            8 => byte_order.read_u64(chunk),
            _ => unreachable!(),
        };
        out.push(value);
    }
    out.truncate(count);
    Ok(out)
}

/// Return the (numerator, denominator) pairs of a RATIONAL/SRATIONAL tag.
pub fn load_rationals(
    tag: &Tag,
    reader: &dyn ByteReader,
    byte_order: ByteOrder,
) -> Result<Vec<(u32, u32)>, TiffError> {
    let bytes = payload_bytes(tag, reader)?;
    let count = tag.data_count as usize;

    let mut out = Vec::with_capacity(count);
    for pair in bytes.chunks(8) {
        if pair.len() < 8 {
            break;
        }
        let num = byte_order.read_u32(&pair[0..4]);
        let den = byte_order.read_u32(&pair[4..8]);
        out.push((num, den));
    }
    out.truncate(count);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SliceReader;
    use crate::tiff::entry::TagValue;
    use crate::tiff::tags::FieldType;

    fn inline_tag(data_type: FieldType, data_count: u64, bytes: [u8; 8], len: usize) -> Tag {
        Tag {
            code: 0,
            data_type: Some(data_type),
            raw_data_type: data_type as u16,
            data_count,
            value: TagValue::Inline { bytes, len },
        }
    }

    #[test]
    fn load_ascii_appends_nul_when_missing() {
        let tag = inline_tag(FieldType::Ascii, 5, *b"hello\0\0\0", 5);
        let reader = SliceReader::new(vec![]);
        let result = load_ascii(&tag, &reader).unwrap();
        assert_eq!(result, b"hello\0");
    }

    #[test]
    fn load_ascii_external_reads_from_file() {
        let tag = Tag {
            code: 270,
            data_type: Some(FieldType::Ascii),
            raw_data_type: FieldType::Ascii as u16,
            data_count: 8,
            value: TagValue::External(2),
        };
        let reader = SliceReader::new(b"xxlevel 0\0".to_vec());
        let result = load_ascii(&tag, &reader).unwrap();
        assert_eq!(result, b"level 0\0");
    }

    #[test]
    fn load_integers_widens_u16_elements() {
        let mut bytes = [0u8; 8];
        bytes[0..2].copy_from_slice(&512u16.to_le_bytes());
        let tag = inline_tag(FieldType::Uint16, 1, bytes, 2);
        let reader = SliceReader::new(vec![]);
        let result = load_integers(&tag, &reader, ByteOrder::LittleEndian).unwrap();
        assert_eq!(result, vec![512]);
    }

    #[test]
    fn load_integers_swaps_each_inline_element_independently_big_endian() {
        // Two packed UINT16 elements, value 8 each, stored big-endian.
        let mut bytes = [0u8; 8];
        bytes[0..2].copy_from_slice(&8u16.to_be_bytes());
        bytes[2..4].copy_from_slice(&8u16.to_be_bytes());
        let tag = inline_tag(FieldType::Uint16, 2, bytes, 4);
        let reader = SliceReader::new(vec![]);
        let result = load_integers(&tag, &reader, ByteOrder::BigEndian).unwrap();
        assert_eq!(result, vec![8, 8]);
    }

    #[test]
    fn load_integers_external_u32_array() {
        let data: Vec<u8> = [10u32, 20, 30]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let tag = Tag {
            code: 324,
            data_type: Some(FieldType::Uint32),
            raw_data_type: FieldType::Uint32 as u16,
            data_count: 3,
            value: TagValue::External(0),
        };
        let reader = SliceReader::new(data);
        let result = load_integers(&tag, &reader, ByteOrder::LittleEndian).unwrap();
        assert_eq!(result, vec![10, 20, 30]);
    }

    #[test]
    fn load_rationals_reads_numerator_denominator_pairs() {
        let mut data = Vec::new();
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        let tag = Tag {
            code: 532,
            data_type: Some(FieldType::Rational),
            raw_data_type: FieldType::Rational as u16,
            data_count: 1,
            value: TagValue::External(0),
        };
        let reader = SliceReader::new(data);
        let result = load_rationals(&tag, &reader, ByteOrder::LittleEndian).unwrap();
        assert_eq!(result, vec![(100, 1)]);
    }
}
