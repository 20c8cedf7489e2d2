//! Channel layer: output buffering and prompt detection.

mod buffer;

pub use buffer::PatternBuffer;
