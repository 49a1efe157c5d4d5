//! The `.sqd` data file: header layouts, frame reads, frame appends.

pub mod format;
pub mod reader;
pub mod writer;

pub use format::{BaseHeader, FrameHeader};
