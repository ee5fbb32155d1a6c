//! Still-frame export and video assembly.

/// `ffmpeg`-based video encoding and audio muxing.
pub mod ffmpeg;
/// Frame file naming and the image directory.
pub mod frames;
