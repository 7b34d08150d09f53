//! # wsi-tiff-codec
//!
//! A reader, in-memory descriptor, and wire-serialization codec for
//! pyramidal, tiled whole-slide images stored as TIFF or BigTIFF.
//!
//! Given a local file, [`tiff::Image::parse`] walks the header and every
//! Image File Directory, classifies pyramid levels plus macro/label
//! subimages, and produces a descriptor sufficient to locate any tile on
//! disk without decoding pixel data. [`codec::serialize`] and
//! [`codec::deserialize`] carry that descriptor — plus each IFD's ancillary
//! blobs — across a length-prefixed block stream wrapped in an HTTP/1.1
//! envelope, so a remote peer can reconstruct an identical descriptor
//! without ever touching the original TIFF.
//!
//! ## Architecture
//!
//! - [`io`] - positioned, synchronous reads and endian-aware scalar decoding
//! - [`tiff`] - header, tag, field, and IFD parsing; the `Image` descriptor
//! - [`codec`] - the framed block stream, HTTP envelope, and reconstructor
//! - [`config`] - CLI configuration for the `tiffcodec` binary
//!
//! ## Example
//!
//! ```rust,no_run
//! use wsi_tiff_codec::io::FileReader;
//! use wsi_tiff_codec::tiff::Image;
//! use wsi_tiff_codec::codec;
//!
//! let reader = FileReader::open("slide.tiff").expect("open");
//! let image = Image::parse(&reader).expect("parse");
//! println!("{} levels, {} IFDs", image.level_count, image.ifds.len());
//!
//! let wire = codec::serialize(&image, true);
//! let restored = codec::deserialize(&wire).expect("deserialize");
//! assert_eq!(restored.ifds.len(), image.ifds.len());
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod io;
pub mod tiff;

pub use config::Config;
pub use error::{CodecError, IoError, TiffError};
pub use tiff::Image;
