/// Frame, timing, canvas and color primitives.
pub mod core;
/// Error taxonomy shared by every module.
pub mod error;
