//! Command line front end for the jpeg codec, built on top of [`jpeg_codec`]
//! and the [`jpeg_pnm`] collaborator for reading/writing raw samples.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jpeg_core::bit_depth::BitDepth;
use jpeg_core::colorspace::ColorSpace;
use jpeg_core::options::{DecoderOptions, EncoderOptions};
use jpeg_pnm::{DecodingResult, PnmDecoder, PnmEncoder};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "jpeg-bin", about = "Encode and decode baseline sequential jpeg images")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a jpeg file to a PGM/PPM file
    Decode {
        input: PathBuf,
        output: PathBuf,
    },
    /// Encode a PGM/PPM file to a jpeg file
    Encode {
        input: PathBuf,
        output: PathBuf,
        /// Quality, 1-100
        #[arg(short, long, default_value_t = 75)]
        quality: u8,
        /// Build image-specific Huffman tables instead of the default ones
        #[arg(long)]
        optimize_huffman: bool,
        /// Restart interval in MCUs, 0 disables restart markers
        #[arg(long, default_value_t = 0)]
        restart_interval: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    simple_logger::SimpleLogger::new().with_level(level).init().expect("logger can only be initialized once");

    let result = match cli.command {
        Command::Decode { input, output } => decode(&input, &output),
        Command::Encode {
            input,
            output,
            quality,
            optimize_huffman,
            restart_interval,
        } => encode(&input, &output, quality, optimize_huffman, restart_interval),
    };

    if let Err(message) = result {
        log::error!("{message}");
        std::process::exit(1);
    }
}

fn decode(input: &PathBuf, output: &PathBuf) -> Result<(), String> {
    let data = std::fs::read(input).map_err(|e| format!("failed to read {}: {e}", input.display()))?;

    let mut decoder = jpeg_codec::JpegDecoder::new_with_options(&data, DecoderOptions::new_safe());
    let info = decoder.decode_headers().map_err(|e| format!("{e:?}"))?;
    log::info!("decoding a {}x{} image with {} components", info.width, info.height, info.components);

    let pixels = decoder.decode().map_err(|e| format!("{e:?}"))?;
    let colorspace = if info.components == 1 { ColorSpace::Luma } else { ColorSpace::RGB };

    let options = EncoderOptions::new(info.width, info.height, colorspace, BitDepth::Eight);
    let encoder = PnmEncoder::new(&pixels, options);
    let bytes = encoder.encode().map_err(|e| format!("{e:?}"))?;

    std::fs::write(output, bytes).map_err(|e| format!("failed to write {}: {e}", output.display()))
}

fn encode(
    input: &PathBuf, output: &PathBuf, quality: u8, optimize_huffman: bool, restart_interval: u16,
) -> Result<(), String> {
    let data = std::fs::read(input).map_err(|e| format!("failed to read {}: {e}", input.display()))?;

    let mut decoder = PnmDecoder::new(&data);
    decoder.decode_headers().map_err(|e| format!("{e:?}"))?;
    let (width, height) = decoder.dimensions().expect("decode_headers succeeded");
    let colorspace = decoder.colorspace().expect("decode_headers succeeded");

    let pixels = match decoder.decode().map_err(|e| format!("{e:?}"))? {
        DecodingResult::U8(bytes) => bytes,
        DecodingResult::U16(_) => {
            return Err("the jpeg encoder only supports 8-bit input samples".into())
        }
    };

    let options = EncoderOptions::new(width, height, colorspace, BitDepth::Eight)
        .set_quality(quality)
        .set_optimize_huffman(optimize_huffman)
        .set_restart_interval(restart_interval);
    let jpeg_bytes = jpeg_codec::encoder::encode(&pixels, &options).map_err(|e| format!("{e:?}"))?;

    std::fs::write(output, jpeg_bytes).map_err(|e| format!("failed to write {}: {e}", output.display()))
}
