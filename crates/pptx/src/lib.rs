//! PPTX (Office Open XML) writer backend.
//!
//! Serializes a planned deck into a .pptx file, which is a ZIP archive of
//! XML parts plus embedded media.

pub mod parts;
pub mod writer;

pub use writer::{MediaFormat, PptxWriter};
