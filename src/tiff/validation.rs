//! Opt-in strict validation for callers that want the original C
//! implementation's fixed 512x512 tile-geometry assumption enforced.
//!
//! `Image::parse`/`Image::finalize` stay permissive (any tile size survives
//! parsing, per the Open Question resolution recorded in `DESIGN.md`); a
//! caller that specifically needs the narrower guarantee calls
//! [`validate_strict`] itself.

use crate::error::TiffError;

use super::image::Image;
use super::ifd::SubimageType;

/// The original source's `ASSERT(ifd->tile_width == 512)` for pyramid levels.
const REQUIRED_TILE_SIDE: u32 = 512;

/// Reject an `Image` unless every `Level` IFD uses the original hardcoded
/// 512x512 tile geometry. Non-level IFDs (macro, label) are unaffected.
pub fn validate_strict(image: &Image) -> Result<(), TiffError> {
    for ifd in &image.ifds {
        if ifd.subimage_type != SubimageType::Level {
            continue;
        }
        if ifd.tile_width != REQUIRED_TILE_SIDE || ifd.tile_height != REQUIRED_TILE_SIDE {
            return Err(TiffError::UnsupportedTileGeometry {
                ifd_index: ifd.index,
                tile_width: ifd.tile_width,
                tile_height: ifd.tile_height,
            });
        }
    }
    Ok(())
}
