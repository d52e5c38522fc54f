//! Conversion of in-memory frames into DNG files.
//!
//! - [`frame`]: input frames and their element types
//! - [`profile`]: camera metadata sources
//! - [`converter`]: the configured converter and its output destinations

pub mod converter;
pub mod frame;
pub mod profile;

pub use converter::{default_software, ConvertOutput, Destination, DngConverter, PixelFilter};
pub use frame::{ElementType, SampleBuffer, SampleData};
pub use profile::{CameraModel, CameraProfile};
