//! raw2dng - Write raw sensor frames as DNG files.
//!
//! This binary wires the command line to the conversion library.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raw2dng::{
    codec,
    config::{Cli, Command, ConvertConfig, InspectConfig},
    format::tiff::{tag_name, DngTag, Ifd, TiffFile},
    ByteOrder, CameraProfile, DngConverter, SampleBuffer,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Convert(config) => run_convert(config),
        Command::Inspect(config) => run_inspect(config),
    }
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose { "raw2dng=debug" } else { "raw2dng=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Convert Command
// =============================================================================

fn run_convert(config: ConvertConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match convert(&config) {
        Ok(path) => {
            info!("Wrote {}", path.display());
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Conversion failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// A decoded input frame before geometry is settled.
enum RawInput {
    U16(Vec<u16>),
    F32(Vec<f32>),
}

fn convert(config: &ConvertConfig) -> Result<PathBuf, String> {
    let profile = match &config.profile {
        Some(path) => CameraProfile::load(path).map_err(|e| e.to_string())?,
        None => CameraProfile::default(),
    };

    let (input, png_dims) = read_input(config)?;

    let width = config
        .width
        .or(png_dims.map(|(w, _)| w))
        .or(profile.width)
        .ok_or("Frame width is unknown; pass --width or set it in the profile")?;
    let height = config
        .height
        .or(png_dims.map(|(_, h)| h))
        .or(profile.height)
        .ok_or("Frame height is unknown; pass --height or set it in the profile")?;

    let frame = match input {
        RawInput::U16(samples) => {
            SampleBuffer::from_u16(height as usize, width as usize, samples)
        }
        RawInput::F32(samples) => {
            SampleBuffer::from_f32(height as usize, width as usize, samples)
        }
    }
    .map_err(|e| e.to_string())?;

    let byte_order = if config.big_endian {
        ByteOrder::BigEndian
    } else {
        ByteOrder::LittleEndian
    };

    let profile = profile.with_geometry(width, height, config.bits);
    let converter = DngConverter::from_model(&profile, &config.output_dir)
        .map_err(|e| e.to_string())?
        .with_byte_order(byte_order);
    debug!(?converter, "converter ready");

    converter
        .to_file(&frame, &config.output_name())
        .map_err(|e| e.to_string())
}

fn read_input(config: &ConvertConfig) -> Result<(RawInput, Option<(u32, u32)>), String> {
    if config.is_png() {
        let image = image::open(&config.input)
            .map_err(|e| format!("Failed to read {}: {}", config.input.display(), e))?
            .into_luma16();
        let dims = image.dimensions();
        debug!(width = dims.0, height = dims.1, "decoded PNG input");
        return Ok((RawInput::U16(image.into_raw()), Some(dims)));
    }

    let bytes = fs::read(&config.input)
        .map_err(|e| format!("Failed to read {}: {}", config.input.display(), e))?;

    let sample_size = if config.float { 4 } else { 2 };
    if bytes.len() % sample_size != 0 {
        return Err(format!(
            "Input is {} bytes, not a whole number of {}-byte samples",
            bytes.len(),
            sample_size
        ));
    }

    let input = if config.float {
        RawInput::F32(
            bytes
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        )
    } else {
        RawInput::U16(
            bytes
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect(),
        )
    };
    Ok((input, None))
}

// =============================================================================
// Inspect Command
// =============================================================================

fn run_inspect(config: InspectConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    match inspect(&config.file, config.json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {}: {}", config.file.display(), e);
            ExitCode::FAILURE
        }
    }
}

fn inspect(path: &Path, json: bool) -> Result<(), String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    let file = TiffFile::parse(&bytes).map_err(|e| e.to_string())?;

    if json {
        let report = serde_json::json!({
            "file": path.display().to_string(),
            "size": bytes.len(),
            "byte_order": file.header.byte_order,
            "first_ifd_offset": file.header.first_ifd_offset,
            "ifds": file.ifds.iter().map(|ifd| serde_json::json!({
                "offset": ifd.offset,
                "next_ifd_offset": ifd.next_ifd_offset,
                "entries": ifd.entries.iter().map(|entry| serde_json::json!({
                    "tag": entry.tag,
                    "name": tag_name(entry.tag),
                    "count": entry.count,
                    "offset": entry.value_offset,
                    "value": entry.value,
                })).collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
        });
        let text = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{}", text);
        return Ok(());
    }

    println!("{}", path.display());
    println!("═════════════════════════════════");
    println!("Size:       {} bytes", bytes.len());
    println!("Byte order: {:?}", file.header.byte_order);
    println!("First IFD:  {}", file.header.first_ifd_offset);

    for (index, ifd) in file.ifds.iter().enumerate() {
        println!();
        println!("IFD {} at offset {} ({} entries)", index, ifd.offset, ifd.entries.len());
        for entry in &ifd.entries {
            let location = match entry.value_offset {
                Some(offset) => format!("@{}", offset),
                None => "inline".to_string(),
            };
            println!(
                "  {:>5}  {:<26} {:>6}  {:<8} {}",
                entry.tag,
                tag_name(entry.tag),
                entry.count,
                location,
                entry.value
            );
        }
        if !ifd.is_sorted() {
            println!("  ! entries are not in ascending tag order");
        }
        print_strip_summary(ifd, &bytes);
    }

    Ok(())
}

/// Report strip sizes and, for packed depths, whether the strip decodes.
fn print_strip_summary(ifd: &Ifd, bytes: &[u8]) {
    let strips = match ifd.strips(bytes) {
        Ok(strips) => strips,
        Err(e) => {
            println!("  ! strips unreadable: {}", e);
            return;
        }
    };
    let total: usize = strips.iter().map(|s| s.len()).sum();
    println!("  strips: {} ({} bytes)", strips.len(), total);

    let geometry = (
        ifd.get_u32(DngTag::ImageWidth),
        ifd.get_u32(DngTag::ImageLength),
        ifd.get_u32(DngTag::BitsPerSample),
    );
    let (Some(width), Some(height), Some(bits)) = geometry else {
        return;
    };
    let bits = bits as u16;
    if !codec::PACKED_BIT_DEPTHS.contains(&bits) || strips.len() != 1 {
        return;
    }

    let samples_per_pixel = ifd.get_u32(DngTag::SamplesPerPixel).unwrap_or(1) as usize;
    let row_len = width as usize * samples_per_pixel;
    match codec::unpack(strips[0], row_len, height as usize, bits) {
        Ok(samples) => println!(
            "  {}-bit packed strip decodes to {} samples",
            bits,
            samples.len()
        ),
        Err(e) => println!("  ! {}-bit packed strip does not decode: {}", bits, e),
    }
}
