//! Decodes one raw IFD entry into a normalized [`Tag`].

use crate::io::ByteOrder;

use super::tags::FieldType;

/// Either the tag's value lives inline in the directory entry, or the entry
/// carries a pointer to where the real payload lives in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// Raw bytes copied out of the entry, still in file byte order. Per-
    /// element swapping is applied by the `values` module when the payload
    /// is materialized, identically for inline and external values.
    /// `len` is the number of meaningful bytes (`data_type_size * data_count`).
    Inline { bytes: [u8; 8], len: usize },
    /// Absolute file offset where the payload is stored.
    External(u64),
}

/// A decoded IFD entry: tag code, type, count, and value/pointer.
///
/// `data_type` is `None` when the raw type code is not one of the recognized
/// TIFF field types — per the format's tolerant-parsing policy this is a
/// warning, not a parse failure, and the field is carried through unswapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub code: u16,
    pub data_type: Option<FieldType>,
    pub raw_data_type: u16,
    pub data_count: u64,
    pub value: TagValue,
}

impl Tag {
    /// Decode one raw directory entry.
    ///
    /// `raw` must be exactly 12 bytes (classic TIFF) or 20 bytes (BigTIFF):
    /// `code:u16, data_type:u16, data_count:u32|u64, value_or_offset:4|8 bytes`.
    /// `is_bigtiff` sets both the width of the count field and the
    /// inline-vs-external threshold (4 bytes classic, 8 bytes BigTIFF).
    pub fn decode(raw: &[u8], byte_order: ByteOrder, is_bigtiff: bool) -> Self {
        let code = byte_order.read_u16(&raw[0..2]);
        let raw_data_type = byte_order.read_u16(&raw[2..4]);
        let data_type = FieldType::from_u16(raw_data_type);
        if data_type.is_none() {
            tracing::warn!(tag_code = code, raw_data_type, "unknown TIFF field type");
        }

        let (data_count, value_slot) = if is_bigtiff {
            (byte_order.read_u64(&raw[4..12]), &raw[12..20])
        } else {
            (byte_order.read_u32(&raw[4..8]) as u64, &raw[8..12])
        };

        let offset_width: u64 = if is_bigtiff { 8 } else { 4 };
        // Unknown types are treated as opaque single bytes: no swap is ever
        // applied to them, and they still participate in the inline/external
        // size test using 1 byte per element.
        let element_size = data_type.map(FieldType::size_in_bytes).unwrap_or(1);
        let total_size = element_size.saturating_mul(data_count);

        let value = if total_size <= offset_width {
            let len = total_size as usize;
            let mut bytes = [0u8; 8];
            bytes[..value_slot.len()].copy_from_slice(value_slot);
            TagValue::Inline { bytes, len }
        } else {
            let offset = if is_bigtiff {
                byte_order.read_u64(value_slot)
            } else {
                byte_order.read_u32(value_slot) as u64
            };
            TagValue::External(offset)
        };

        Tag {
            code,
            data_type,
            raw_data_type,
            data_count,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_inline_short_value_little_endian() {
        // ImageWidth (256), type UINT16 (3), count 1, value 512 inline.
        let raw: [u8; 12] = [0x00, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00];
        let tag = Tag::decode(&raw, ByteOrder::LittleEndian, false);
        assert_eq!(tag.code, 256);
        assert_eq!(tag.data_type, Some(FieldType::Uint16));
        assert_eq!(tag.data_count, 1);
        match tag.value {
            TagValue::Inline { bytes, len } => {
                assert_eq!(len, 2);
                assert_eq!(u16::from_le_bytes([bytes[0], bytes[1]]), 512);
            }
            TagValue::External(_) => panic!("expected inline"),
        }
    }

    #[test]
    fn decodes_external_offset_when_payload_too_large() {
        // TileOffsets (324), type UINT32 (4), count 100 -> 400 bytes, too big to be inline.
        let raw: [u8; 12] = [
            0x44, 0x01, 0x04, 0x00, 0x64, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00,
        ];
        let tag = Tag::decode(&raw, ByteOrder::LittleEndian, false);
        assert_eq!(tag.code, 324);
        match tag.value {
            TagValue::External(offset) => assert_eq!(offset, 0x1000),
            TagValue::Inline { .. } => panic!("expected external"),
        }
    }

    #[test]
    fn big_endian_inline_value_is_stored_unswapped() {
        // BitsPerSample (258), type UINT16 (3), count 2, values [8, 8]; total
        // size 4 bytes exactly meets the classic-TIFF inline threshold. The
        // swap into host order is the `values` module's job, not decode's,
        // so the bytes here stay exactly as they appeared in the file.
        let raw: [u8; 12] = [
            0x01, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00, 0x02, 0x00, 0x08, 0x00, 0x08,
        ];
        let tag = Tag::decode(&raw, ByteOrder::BigEndian, false);
        assert_eq!(tag.data_count, 2);
        match tag.value {
            TagValue::Inline { bytes, len } => {
                assert_eq!(len, 4);
                assert_eq!(&bytes[..4], &raw[8..12]);
            }
            TagValue::External(_) => panic!("expected inline"),
        }
    }

    #[test]
    fn bigtiff_entry_uses_wide_count_and_offset() {
        let raw: [u8; 20] = [
            0x00, 0x01, 0x04, 0x00, // code=256, type=UINT32
            0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // count=1 (u64)
            0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // value 512 inline
        ];
        let tag = Tag::decode(&raw, ByteOrder::LittleEndian, true);
        assert_eq!(tag.data_count, 1);
        match tag.value {
            TagValue::Inline { bytes, len } => {
                assert_eq!(len, 4);
                assert_eq!(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), 512);
            }
            TagValue::External(_) => panic!("expected inline"),
        }
    }

    #[test]
    fn unknown_field_type_is_carried_through_unswapped() {
        let raw: [u8; 12] = [0x00, 0x01, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x01, 0x2A, 0x00, 0x00, 0x00];
        let tag = Tag::decode(&raw, ByteOrder::BigEndian, false);
        assert_eq!(tag.data_type, None);
        assert_eq!(tag.raw_data_type, 0xFF);
        match tag.value {
            TagValue::Inline { bytes, len } => {
                assert_eq!(len, 1);
                assert_eq!(bytes[0], 0x2A);
            }
            TagValue::External(_) => panic!("expected inline"),
        }
    }
}
