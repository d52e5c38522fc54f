//! Command-line configuration for raw2dng.
//!
//! Two subcommands are available:
//! - `convert` turns a raw sample dump or a 16-bit PNG into a DNG file
//! - `inspect` prints the header and directory entries of a DNG/TIFF file
//!
//! # Environment Variables
//!
//! Options of `convert` can also be set with the `RAW2DNG_` prefix:
//!
//! - `RAW2DNG_WIDTH` - Frame width in pixels
//! - `RAW2DNG_HEIGHT` - Frame height in pixels
//! - `RAW2DNG_BITS` - Bits per sample (8, 10, 12, 14, 16 or 32)
//! - `RAW2DNG_PROFILE` - Camera profile JSON file
//! - `RAW2DNG_OUTPUT_DIR` - Directory for written files (default: .)

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::codec::{F32_BIT_DEPTH, U16_BIT_DEPTHS};

// =============================================================================
// Default Values
// =============================================================================

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Default bits per sample.
pub const DEFAULT_BITS: u16 = 16;

// =============================================================================
// CLI Arguments
// =============================================================================

/// raw2dng - Write raw sensor frames as DNG files.
#[derive(Parser, Debug, Clone)]
#[command(name = "raw2dng")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert a raw frame into a DNG file
    Convert(ConvertConfig),

    /// Print the structure of a DNG/TIFF file
    Inspect(InspectConfig),
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Options for `raw2dng convert`.
#[derive(Args, Debug, Clone)]
pub struct ConvertConfig {
    /// Input frame: raw little-endian samples or a 16-bit grayscale PNG.
    pub input: PathBuf,

    // =========================================================================
    // Frame Geometry
    // =========================================================================
    /// Frame width in pixels.
    ///
    /// Optional when the profile or a PNG input provides it.
    #[arg(long, env = "RAW2DNG_WIDTH")]
    pub width: Option<u32>,

    /// Frame height in pixels.
    #[arg(long, env = "RAW2DNG_HEIGHT")]
    pub height: Option<u32>,

    /// Bits per sample written to the file.
    #[arg(long, default_value_t = DEFAULT_BITS, env = "RAW2DNG_BITS")]
    pub bits: u16,

    /// Treat raw input as little-endian f32 samples instead of u16.
    #[arg(long, default_value_t = false)]
    pub float: bool,

    // =========================================================================
    // Metadata
    // =========================================================================
    /// Camera profile JSON supplying make, model, CFA and colour metadata.
    #[arg(long, env = "RAW2DNG_PROFILE")]
    pub profile: Option<PathBuf>,

    // =========================================================================
    // Output
    // =========================================================================
    /// Directory the DNG file is written to.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR, env = "RAW2DNG_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Output file name; defaults to the input file stem.
    #[arg(long)]
    pub name: Option<String>,

    /// Write a big-endian (MM) container.
    #[arg(long, default_value_t = false)]
    pub big_endian: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl ConvertConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.float {
            if self.bits != F32_BIT_DEPTH {
                return Err(format!(
                    "Float input must be written with --bits {}, got {}",
                    F32_BIT_DEPTH, self.bits
                ));
            }
        } else if !U16_BIT_DEPTHS.contains(&self.bits) {
            return Err(format!(
                "bits must be one of {:?} for integer input, got {}",
                U16_BIT_DEPTHS, self.bits
            ));
        }

        if self.width == Some(0) || self.height == Some(0) {
            return Err("width and height must be greater than 0".to_string());
        }

        if self.float && self.is_png() {
            return Err("PNG input holds integer samples; drop --float".to_string());
        }

        if let Some(name) = &self.name {
            if name.is_empty() {
                return Err("Output name cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Whether the input is a PNG file, judged by extension.
    pub fn is_png(&self) -> bool {
        self.input
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
    }

    /// Output name: `--name`, or the input file stem.
    pub fn output_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| file_stem(&self.input))
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

/// Options for `raw2dng inspect`.
#[derive(Args, Debug, Clone)]
pub struct InspectConfig {
    /// DNG or TIFF file to inspect.
    pub file: PathBuf,

    /// Print JSON instead of a table.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
