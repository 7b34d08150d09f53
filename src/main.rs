//! `tiffcodec` - parse a TIFF/BigTIFF whole-slide image and optionally
//! round-trip its descriptor through the wire codec.

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wsi_tiff_codec::codec;
use wsi_tiff_codec::config::Config;
use wsi_tiff_codec::io::FileReader;
use wsi_tiff_codec::tiff::Image;

fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), String> {
    let reader = FileReader::open(&config.path).map_err(|e| e.to_string())?;
    let image = Image::parse(&reader).map_err(|e| e.to_string())?;

    print_summary(&image);

    if let Some(path) = &config.serialize_to {
        let wire = codec::serialize(&image, config.compress);
        info!(bytes = wire.len(), compress = config.compress, "serialized");
        fs::write(path, &wire).map_err(|e| format!("writing {}: {e}", path.display()))?;

        let restored = codec::deserialize(&wire).map_err(|e| e.to_string())?;
        if restored.ifds.len() != image.ifds.len() {
            return Err(format!(
                "round-trip mismatch: {} IFDs parsed, {} IFDs reconstructed",
                image.ifds.len(),
                restored.ifds.len()
            ));
        }
        info!("round-trip verified: {} IFDs reconstructed", restored.ifds.len());
    }

    Ok(())
}

fn print_summary(image: &Image) {
    info!(
        bigtiff = image.is_bigtiff,
        big_endian = image.is_big_endian,
        ifds = image.ifds.len(),
        levels = image.level_count,
        "parsed slide"
    );
    for ifd in &image.ifds {
        info!(
            index = ifd.index,
            kind = ?ifd.subimage_type,
            width = ifd.image_width,
            height = ifd.image_height,
            tiles = ifd.tile_count,
            "ifd"
        );
    }
    info!(mpp_x = image.mpp_x, mpp_y = image.mpp_y, "resolution");
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "wsi_tiff_codec=debug"
    } else {
        "wsi_tiff_codec=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
