//! Frame to DNG conversion.
//!
//! [`DngConverter`] holds metadata that was validated once at configuration
//! time. Each call to [`convert`](DngConverter::convert) then checks the
//! frame, applies the optional pixel filter, encodes the samples, and hands
//! one strip to the container writer.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::codec;
use crate::error::DngError;
use crate::format::tiff::{
    container_to_bytes, lint_tags, stream_container, validate_tags, ByteOrder, Container,
    Directory, DngTag, DngTags, ImageGeometry, ReservedTags, SampleFormat,
};

use super::frame::{ElementType, SampleBuffer};
use super::profile::CameraModel;

/// File extension appended to output names that lack it.
pub const DNG_EXTENSION: &str = "dng";

/// Suffix of the temporary file written before the final rename.
const PARTIAL_SUFFIX: &str = ".partial";

/// Pixel transform applied to u16 frames before encoding.
///
/// The result must keep the input's shape and stay u16.
pub type PixelFilter = Box<dyn Fn(&SampleBuffer) -> SampleBuffer + Send + Sync>;

/// Default Software tag value.
pub fn default_software() -> String {
    format!("raw2dng {}", env!("CARGO_PKG_VERSION"))
}

// =============================================================================
// Destinations
// =============================================================================

/// Where a converted file goes.
pub enum Destination<'a> {
    /// Return the bytes
    Buffer,

    /// Write `<output_dir>/<name>[.dng]`
    File(&'a str),

    /// Stream into an open writer
    Stream(&'a mut dyn Write),
}

/// What a conversion produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertOutput {
    /// The complete file
    Bytes(Bytes),

    /// Path of the written file
    Path(PathBuf),

    /// Number of bytes streamed
    Streamed(u64),
}

// =============================================================================
// DngConverter
// =============================================================================

/// Converts frames into DNG files using one configured tag set.
///
/// Configuration is validated eagerly: a converter that exists always has
/// width, length and bits per sample, and no caller tag collides with one
/// the encoder writes itself. Conversions only read the configuration, so a
/// converter can be shared across threads as long as nobody reconfigures it
/// concurrently.
pub struct DngConverter {
    tags: DngTags,
    geometry: ImageGeometry,
    output_dir: PathBuf,
    filter: Option<PixelFilter>,
    byte_order: ByteOrder,
    software: String,
}

impl fmt::Debug for DngConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DngConverter")
            .field("geometry", &self.geometry)
            .field("tags", &self.tags.names())
            .field("output_dir", &self.output_dir)
            .field("filter", &self.filter.is_some())
            .field("byte_order", &self.byte_order)
            .field("software", &self.software)
            .finish()
    }
}

impl DngConverter {
    /// Configure a converter from an explicit tag set.
    ///
    /// # Errors
    /// - `MissingRequiredTag` if width, length or bits per sample is absent
    /// - `ReservedTagConflict` if a tag is one the encoder writes itself
    pub fn new(tags: DngTags, output_dir: impl Into<PathBuf>) -> Result<Self, DngError> {
        let geometry = configure(&tags)?;
        Ok(Self {
            tags,
            geometry,
            output_dir: output_dir.into(),
            filter: None,
            byte_order: ByteOrder::default(),
            software: default_software(),
        })
    }

    /// Configure a converter from a camera model's tags.
    pub fn from_model(
        model: &impl CameraModel,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, DngError> {
        Self::new(model.tags()?, output_dir)
    }

    /// Install a pixel filter for u16 frames.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&SampleBuffer) -> SampleBuffer + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Override the Software tag.
    pub fn with_software(mut self, software: impl Into<String>) -> Self {
        self.software = software.into();
        self
    }

    /// Replace the tag set, validating it first.
    ///
    /// On error the previous configuration is kept.
    pub fn set_tags(&mut self, tags: DngTags) -> Result<(), DngError> {
        self.geometry = configure(&tags)?;
        self.tags = tags;
        Ok(())
    }

    pub fn set_output_dir(&mut self, output_dir: impl Into<PathBuf>) {
        self.output_dir = output_dir.into();
    }

    pub fn tags(&self) -> &DngTags {
        &self.tags
    }

    pub fn geometry(&self) -> ImageGeometry {
        self.geometry
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    // -------------------------------------------------------------------------
    // Conversion
    // -------------------------------------------------------------------------

    /// Convert `frame` and deliver it to `destination`.
    ///
    /// # Errors
    /// - `InvalidInputFormat` unless the frame holds u16 or f32 samples
    /// - `ShapeMismatch` if the frame's (height, width) differ from the tags
    /// - `FilterContractViolation` if the filter changes shape or element type
    /// - `UnsupportedBitDepth` if BitsPerSample does not suit the element type
    /// - `ReservedTagConflict` or `LayoutSizeMismatch` from the writer
    /// - `Io` if writing the destination fails
    pub fn convert(
        &self,
        frame: &SampleBuffer,
        destination: Destination<'_>,
    ) -> Result<ConvertOutput, DngError> {
        let container = self.build_container(frame)?;

        let output = match destination {
            Destination::Buffer => ConvertOutput::Bytes(container_to_bytes(&container)?),
            Destination::File(name) => ConvertOutput::Path(self.write_file(&container, name)?),
            Destination::Stream(writer) => {
                ConvertOutput::Streamed(stream_container(&container, writer)?)
            }
        };

        match &output {
            ConvertOutput::Bytes(bytes) => info!(bytes = bytes.len(), "converted frame to buffer"),
            ConvertOutput::Path(path) => info!(path = %path.display(), "wrote DNG file"),
            ConvertOutput::Streamed(bytes) => info!(bytes, "streamed DNG"),
        }
        Ok(output)
    }

    /// Convert into an in-memory file.
    pub fn to_bytes(&self, frame: &SampleBuffer) -> Result<Bytes, DngError> {
        let container = self.build_container(frame)?;
        container_to_bytes(&container)
    }

    /// Convert into `<output_dir>/<name>`, returning the written path.
    pub fn to_file(&self, frame: &SampleBuffer, name: &str) -> Result<PathBuf, DngError> {
        let container = self.build_container(frame)?;
        self.write_file(&container, name)
    }

    /// Convert straight into `writer`, returning the bytes written.
    pub fn to_writer<W: Write>(&self, frame: &SampleBuffer, writer: W) -> Result<u64, DngError> {
        let container = self.build_container(frame)?;
        stream_container(&container, writer)
    }

    /// Validate, filter and encode `frame` into a ready-to-write container.
    pub fn build_container(&self, frame: &SampleBuffer) -> Result<Container, DngError> {
        let element = frame.element_type();
        if !element.is_convertible() {
            return Err(DngError::InvalidInputFormat(element));
        }

        let expected = self.geometry.frame_dims();
        if frame.dims() != Some(expected) {
            return Err(DngError::ShapeMismatch {
                expected,
                actual: frame.shape().to_vec(),
            });
        }
        if frame.rank() > 2 {
            warn!(
                shape = ?frame.shape(),
                "frame has trailing axes; folding them into each row"
            );
        }

        let filtered = self.apply_filter(frame)?;
        let frame = filtered.as_ref().unwrap_or(frame);

        let bits = self.geometry.bits_per_sample;
        let (strip, sample_format) = match element {
            ElementType::U16 => {
                let samples = frame
                    .as_u16()
                    .ok_or(DngError::InvalidInputFormat(frame.element_type()))?;
                let strip = codec::encode_u16(samples, frame.row_len(), bits, self.byte_order)?;
                (strip, SampleFormat::Uint)
            }
            _ => {
                let samples = frame
                    .as_f32()
                    .ok_or(DngError::InvalidInputFormat(frame.element_type()))?;
                let strip = codec::encode_f32(samples, bits, self.byte_order)?;
                (strip, SampleFormat::FloatingPoint)
            }
        };

        let samples_per_pixel = self
            .tags
            .get_u32(DngTag::SamplesPerPixel)
            .unwrap_or(1)
            .clamp(1, u16::MAX as u32) as u16;
        let reserved = ReservedTags::for_main_image(sample_format, self.software.clone())
            .with_samples_per_pixel(samples_per_pixel);

        debug!(
            width = self.geometry.width,
            height = self.geometry.height,
            bits,
            element = %element,
            strip_len = strip.len(),
            "built main image strip"
        );

        let directory = Directory::compose(&self.tags, &reserved, vec![strip])?;
        Ok(Container::single(self.byte_order, directory))
    }

    /// Run the filter on u16 frames and check its contract.
    ///
    /// Returns `None` when no filter applies.
    fn apply_filter(&self, frame: &SampleBuffer) -> Result<Option<SampleBuffer>, DngError> {
        let Some(filter) = &self.filter else {
            return Ok(None);
        };
        if frame.element_type() != ElementType::U16 {
            debug!(element = %frame.element_type(), "pixel filter skipped for float frame");
            return Ok(None);
        }

        let output = filter(frame);
        if output.shape() != frame.shape() {
            return Err(DngError::FilterContractViolation(format!(
                "filter changed shape from {:?} to {:?}",
                frame.shape(),
                output.shape()
            )));
        }
        if output.element_type() != ElementType::U16 {
            return Err(DngError::FilterContractViolation(format!(
                "filter returned {} samples, expected u16",
                output.element_type()
            )));
        }
        Ok(Some(output))
    }

    // -------------------------------------------------------------------------
    // File output
    // -------------------------------------------------------------------------

    /// Resolve `name` under the output directory, adding `.dng` if needed.
    pub fn output_path(&self, name: &str) -> Result<PathBuf, DngError> {
        if name.is_empty() {
            return Err(DngError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "output file name is empty",
            )));
        }

        let has_extension = Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(DNG_EXTENSION));
        let file_name = if has_extension {
            name.to_string()
        } else {
            format!("{}.{}", name, DNG_EXTENSION)
        };
        Ok(self.output_dir.join(file_name))
    }

    /// Stream into a sibling partial file, then rename it into place.
    fn write_file(&self, container: &Container, name: &str) -> Result<PathBuf, DngError> {
        let path = self.output_path(name)?;
        let mut partial = path.clone().into_os_string();
        partial.push(PARTIAL_SUFFIX);
        let partial = PathBuf::from(partial);

        let result = File::create(&partial)
            .map_err(DngError::from)
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                let written = stream_container(container, &mut writer)?;
                writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
                Ok(written)
            })
            .and_then(|written| {
                fs::rename(&partial, &path)?;
                Ok(written)
            });

        match result {
            Ok(written) => {
                debug!(path = %path.display(), bytes = written, "renamed partial file");
                Ok(path)
            }
            Err(e) => {
                if partial.exists() {
                    if let Err(cleanup) = fs::remove_file(&partial) {
                        warn!(path = %partial.display(), error = %cleanup, "failed to remove partial file");
                    }
                }
                Err(e)
            }
        }
    }
}

fn configure(tags: &DngTags) -> Result<ImageGeometry, DngError> {
    let geometry = validate_tags(tags)?;
    for warning in lint_tags(tags, &geometry).warnings {
        warn!("{}", warning);
    }
    debug!(
        width = geometry.width,
        height = geometry.height,
        bits = geometry.bits_per_sample,
        tags = tags.len(),
        "configured converter"
    );
    Ok(geometry)
}

// =============================================================================
// Tests
// =============================================================================
