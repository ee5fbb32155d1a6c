use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::animation::curve::Trace;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::YoyResult;

/// Everything needed to draw one frame.
#[derive(Clone, Debug)]
pub struct FrameSpec {
    pub index: FrameIndex,
    /// Date shown in the subtitle.
    pub date_label: Option<NaiveDate>,
    /// Traces in draw order: settled curves oldest first, the active curve last.
    pub traces: Vec<Trace>,
}

impl FrameSpec {
    /// The trace drawn on top, if any.
    pub fn active(&self) -> Option<&Trace> {
        self.traces.last()
    }
}

/// Rendered frame pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Draws a [`FrameSpec`] and writes it as a still image at `out_path`.
///
/// Calls arrive in strictly increasing [`FrameIndex`] order.
pub trait FrameRenderer {
    fn render_frame(&mut self, frame: &FrameSpec, out_path: &Path) -> YoyResult<()>;
}

/// Summary of one frame captured by [`RecordingRenderer`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedFrame {
    pub index: FrameIndex,
    pub path: PathBuf,
    pub date_label: Option<NaiveDate>,
    /// `(year, points drawn, alpha)` per trace in draw order.
    pub traces: Vec<(i32, usize, f64)>,
}

/// Renderer that records frame summaries without touching the filesystem.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    frames: Vec<RecordedFrame>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }
}

impl FrameRenderer for RecordingRenderer {
    fn render_frame(&mut self, frame: &FrameSpec, out_path: &Path) -> YoyResult<()> {
        self.frames.push(RecordedFrame {
            index: frame.index,
            path: out_path.to_path_buf(),
            date_label: frame.date_label,
            traces: frame
                .traces
                .iter()
                .map(|t| (t.year(), t.len(), t.alpha))
                .collect(),
        });
        Ok(())
    }
}
