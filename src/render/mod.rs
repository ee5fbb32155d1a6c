//! Frame rendering.
//!
//! The sequencer hands a [`frame::FrameSpec`] to a [`frame::FrameRenderer`]; the CPU renderer
//! draws geometry with `vello_cpu` and text with `resvg`, then writes a PNG.

pub mod chart;
pub mod composite;
pub mod cpu;
pub mod frame;
pub mod text;
