//! Run configuration, loadable from JSON.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::animation::curve::CurveStyle;
use crate::animation::sequencer::{SequencerOpts, SettledRefresh};
use crate::data::dataset::DataOptions;
use crate::encode::ffmpeg::EncodeOpts;
use crate::encode::frames::FrameDir;
use crate::foundation::core::Fps;
use crate::foundation::error::{YoyError, YoyResult};
use crate::render::chart::ChartStyle;

/// Everything a batch run needs besides the input data.
///
/// Every field has a default, so a config file only lists what it changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct YoyConfig {
    pub fps: f64,
    pub dpi: u32,
    /// Animation length of each year's reveal.
    pub seconds_per_year: f64,
    /// Number of calendar years to animate; `None` covers the whole dataset.
    pub years: Option<u32>,
    pub image_dir: PathBuf,
    /// Delete frames left in `image_dir` by a previous run before rendering.
    pub clean_image_dir: bool,
    pub video_path: PathBuf,
    /// Music track muxed into `output_path`; `None` keeps only the silent video.
    pub audio_path: Option<PathBuf>,
    pub output_path: PathBuf,
    pub overwrite: bool,
    pub refresh: SettledRefresh,
    pub curve: CurveStyle,
    pub chart: ChartStyle,
    pub data: DataOptions,
}

impl Default for YoyConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            dpi: 50,
            seconds_per_year: 3.0,
            years: None,
            image_dir: PathBuf::from("images"),
            clean_image_dir: true,
            video_path: PathBuf::from("generated_video.mp4"),
            audio_path: Some(PathBuf::from("music.mp3")),
            output_path: PathBuf::from("generated_video_sound.mp4"),
            overwrite: true,
            refresh: SettledRefresh::default(),
            curve: CurveStyle::default(),
            chart: ChartStyle::default(),
            data: DataOptions::default(),
        }
    }
}

impl YoyConfig {
    pub fn from_json(json: &str) -> YoyResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| YoyError::validation(format!("invalid config: {e}")))
    }

    pub fn from_path(path: &Path) -> YoyResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn validate(&self) -> YoyResult<()> {
        Fps::from_f64(self.fps)?;
        if self.dpi == 0 {
            return Err(YoyError::validation("dpi must be > 0"));
        }
        if !(self.seconds_per_year.is_finite() && self.seconds_per_year > 0.0) {
            return Err(YoyError::validation(format!(
                "seconds_per_year must be > 0, got {}",
                self.seconds_per_year
            )));
        }
        if self.years == Some(0) {
            return Err(YoyError::validation("years must be >= 1 when set"));
        }
        self.curve.params(1).validate()?;
        self.chart.validate()?;
        Ok(())
    }

    pub fn fps(&self) -> YoyResult<Fps> {
        Fps::from_f64(self.fps)
    }

    pub fn sequencer_opts(&self) -> YoyResult<SequencerOpts> {
        Ok(SequencerOpts {
            fps: self.fps()?,
            style: self.curve,
            refresh: self.refresh,
        })
    }

    pub fn frame_dir(&self) -> FrameDir {
        FrameDir::new(&self.image_dir)
    }

    pub fn encode_opts(&self) -> YoyResult<EncodeOpts> {
        let [r, g, b, _] = self.chart.background.to_rgba8(1.0);
        Ok(EncodeOpts {
            video_path: self.video_path.clone(),
            output_path: self.output_path.clone(),
            audio_path: self.audio_path.clone(),
            fps: self.fps()?,
            overwrite: self.overwrite,
            bg_rgba: [r, g, b, 255],
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
