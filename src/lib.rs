//! yoyplot renders an animated year-over-year line chart of daily temperatures.
//!
//! Each calendar year becomes a curve that is revealed left to right, then fades while the
//! following years are drawn on top. Every animation step is exported as a PNG still and the
//! stills are assembled into an MP4 with a music track.
//!
//! - Load a [`Dataset`] from CSV
//! - Add years to a [`Sequencer`] and [`Sequencer::run`] it with a [`FrameRenderer`]
//! - Encode the image directory with a [`VideoEncoder`]
#![forbid(unsafe_code)]

pub mod animation;
pub mod config;
pub mod data;
pub mod encode;
pub mod foundation;
pub mod render;

pub use crate::animation::curve::{
    Curve, CurveParams, CurvePhase, CurveState, CurveStyle, Trace, reveal_len,
};
pub use crate::animation::sequencer::{RunStats, Sequencer, SequencerOpts, SettledRefresh};
pub use crate::config::YoyConfig;
pub use crate::data::dataset::{DataOptions, Dataset};
pub use crate::data::series::{Series, day_of_year};
pub use crate::encode::ffmpeg::{EncodeOpts, EncodeOutput, VideoEncoder, is_ffmpeg_on_path};
pub use crate::encode::frames::{FrameCounter, FrameDir, frame_file_name};
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Rgba};
pub use crate::foundation::error::{YoyError, YoyResult};
pub use crate::render::chart::{ChartLayout, ChartStyle};
pub use crate::render::cpu::CpuChartRenderer;
pub use crate::render::frame::{FrameRGBA, FrameRenderer, FrameSpec, RecordingRenderer};
