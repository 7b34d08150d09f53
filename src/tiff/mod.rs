//! TIFF/BigTIFF parsing: header, tag decoding, field loading, IFD walking,
//! and the in-memory image descriptor.

pub mod entry;
pub mod header;
pub mod ifd;
pub mod image;
pub mod tags;
pub mod validation;
pub mod values;

pub use entry::{Tag, TagValue};
pub use header::TiffHeader;
pub use ifd::{Ifd, SubimageType};
pub use image::Image;
pub use tags::{FieldType, TiffTag};
pub use validation::validate_strict;
