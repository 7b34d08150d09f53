//! Configuration for the `tiffcodec` command-line tool.
//!
//! The reader/codec core itself takes no environment variables or CLI flags
//! (see the external interfaces notes) — this module covers only the ambient
//! CLI surface layered on top of it.
//!
//! # Environment Variables
//!
//! - `TIFFCODEC_COMPRESS` - LZ4-compress the serialized stream (default: true)

use std::path::PathBuf;

use clap::Parser;

/// Default for whether serialization applies the outer LZ4 layer.
pub const DEFAULT_COMPRESS: bool = true;

/// Inspect a TIFF/BigTIFF whole-slide image and optionally round-trip it
/// through the wire codec.
#[derive(Parser, Debug, Clone)]
#[command(name = "tiffcodec")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Path to the TIFF or BigTIFF file to parse.
    pub path: PathBuf,

    /// LZ4-compress the serialized block stream.
    #[arg(long, default_value_t = DEFAULT_COMPRESS, env = "TIFFCODEC_COMPRESS")]
    pub compress: bool,

    /// Serialize the parsed image and write the wire-format buffer here.
    #[arg(long)]
    pub serialize_to: Option<PathBuf>,

    /// Enable verbose (debug level) logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !self.path.exists() {
            return Err(format!("input file not found: {}", self.path.display()));
        }
        Ok(())
    }
}
