use std::sync::Arc;

use crate::animation::curve::{Curve, CurveStyle, Trace};
use crate::data::dataset::Dataset;
use crate::encode::ffmpeg::{EncodeOutput, VideoEncoder};
use crate::encode::frames::{FrameCounter, FrameDir};
use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::{YoyError, YoyResult};
use crate::render::frame::{FrameRenderer, FrameSpec};

/// Advances past the reveal that [`Sequencer::preview_frame`] will follow.
pub const PREVIEW_SETTLE_STEPS: u64 = 100_000;

/// How often settled curves are re-sampled while a newer curve animates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettledRefresh {
    /// Advance every settled curve once per emitted frame.
    #[default]
    PerFrame,
    /// Advance every settled curve once when a new curve starts and reuse that trace.
    PerCurve,
}

/// Sequencer settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequencerOpts {
    pub fps: Fps,
    pub style: CurveStyle,
    pub refresh: SettledRefresh,
}

impl SequencerOpts {
    pub fn new(fps: Fps) -> Self {
        Self {
            fps,
            style: CurveStyle::default(),
            refresh: SettledRefresh::default(),
        }
    }
}

/// Outcome of [`Sequencer::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub curves: usize,
    pub first_frame: Option<FrameIndex>,
    pub last_frame: Option<FrameIndex>,
}

/// Drives per-year curves through their animation and exports one still per frame.
#[derive(Debug)]
pub struct Sequencer {
    dataset: Dataset,
    opts: SequencerOpts,
    curves: Vec<Curve>,
    next_year: Option<i32>,
}

impl Sequencer {
    pub fn new(dataset: Dataset, opts: SequencerOpts) -> YoyResult<Self> {
        opts.style.params(1).validate()?;
        let next_year = dataset.first_year();
        Ok(Self {
            dataset,
            opts,
            curves: Vec::new(),
            next_year,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    /// Append curves for the next `n` calendar years, each animated over `seconds`.
    ///
    /// Years without data are consumed but get no curve. Returns the number of curves added.
    pub fn add_years(&mut self, n: u32, seconds: f64) -> YoyResult<usize> {
        let segments = self.segments_for(seconds)?;
        let Some(mut year) = self.next_year else {
            return Ok(0);
        };

        let mut added = 0;
        for _ in 0..n {
            match self.dataset.series(year) {
                Some(series) if !series.is_empty() => {
                    let params = self.opts.style.params(segments);
                    self.curves
                        .push(Curve::new(Arc::new(series.clone()), params)?);
                    tracing::debug!(year, segments, points = series.len(), "added curve");
                    added += 1;
                }
                _ => tracing::debug!(year, "no data for year, skipping"),
            }
            year += 1;
        }
        self.next_year = Some(year);
        Ok(added)
    }

    /// Append curves for every remaining year of the dataset.
    pub fn add_all_years(&mut self, seconds: f64) -> YoyResult<usize> {
        let remaining = match (self.next_year, self.dataset.last_year()) {
            (Some(next), Some(last)) if next <= last => (last - next + 1) as u32,
            _ => 0,
        };
        self.add_years(remaining, seconds)
    }

    /// A single frame showing `year` alone after `step` advances of its curve.
    ///
    /// Steps past the reveal keep decaying the curve, as they would under a newer year.
    pub fn preview_frame(&self, year: i32, step: u64, seconds: f64) -> YoyResult<FrameSpec> {
        if step == 0 {
            return Err(YoyError::validation("preview step must be >= 1"));
        }
        let segments = self.segments_for(seconds)?;
        let max_step = u64::from(segments) + PREVIEW_SETTLE_STEPS;
        if step > max_step {
            return Err(YoyError::validation(format!(
                "preview step must be <= {max_step} for {segments} segments, got {step}"
            )));
        }
        let series = self
            .dataset
            .series(year)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| YoyError::validation(format!("no data for year {year}")))?;

        let mut curve = Curve::new(Arc::new(series.clone()), self.opts.style.params(segments))?;
        let mut trace = curve.advance();
        for _ in 1..step {
            let before = *curve.state();
            trace = curve.advance();
            // A settled curve whose alpha stopped moving draws the same trace forever.
            if before.fully_revealed && trace.alpha == before.current_alpha {
                break;
            }
        }
        let date_label = trace
            .last_date()
            .or_else(|| series.dates().first().copied());
        Ok(FrameSpec {
            index: FrameIndex(step - 1),
            date_label,
            traces: vec![trace],
        })
    }

    fn segments_for(&self, seconds: f64) -> YoyResult<u32> {
        if !(seconds.is_finite() && seconds > 0.0) {
            return Err(YoyError::validation(format!(
                "seconds per year must be > 0, got {seconds}"
            )));
        }
        Ok(self.opts.fps.secs_to_steps(seconds))
    }

    /// Frames [`Sequencer::run`] will export with the current curves.
    pub fn planned_frames(&self) -> u64 {
        self.curves.iter().map(Curve::active_frames).sum()
    }

    /// Animate every curve in year order, exporting one still per frame into `frames`.
    #[tracing::instrument(skip_all, fields(curves = self.curves.len()))]
    pub fn run(
        &mut self,
        renderer: &mut dyn FrameRenderer,
        frames: &FrameDir,
        counter: &mut FrameCounter,
    ) -> YoyResult<RunStats> {
        let planned = self.planned_frames();
        tracing::info!(planned, start = counter.peek().0, "rendering frames");

        let mut stats = RunStats::default();
        for i in 0..self.curves.len() {
            let (older, rest) = self.curves.split_at_mut(i);
            let active = &mut rest[0];
            tracing::info!(
                year = active.year(),
                settled = older.len(),
                frames = active.active_frames(),
                "animating curve"
            );

            let per_curve: Option<Vec<Trace>> = match self.opts.refresh {
                SettledRefresh::PerCurve => Some(older.iter_mut().map(Curve::advance).collect()),
                SettledRefresh::PerFrame => None,
            };

            while !active.is_fully_revealed() {
                let top = active.advance();
                let date_label = top
                    .last_date()
                    .or_else(|| active.series().dates().first().copied());

                let mut traces = match &per_curve {
                    Some(cached) => cached.clone(),
                    None => older.iter_mut().map(Curve::advance).collect(),
                };
                traces.push(top);

                let index = counter.advance();
                let spec = FrameSpec {
                    index,
                    date_label,
                    traces,
                };
                let path = frames.path_for(index);
                renderer.render_frame(&spec, &path)?;
                tracing::debug!(
                    frame = index.0,
                    year = ?spec.active().map(Trace::year),
                    path = %path.display(),
                    "exported frame"
                );

                stats.frames += 1;
                stats.first_frame.get_or_insert(index);
                stats.last_frame = Some(index);
            }
            stats.curves += 1;
        }

        tracing::info!(frames = stats.frames, "frames rendered");
        Ok(stats)
    }

    /// Full batch job: render every frame, then encode the image directory.
    pub fn generate(
        &mut self,
        renderer: &mut dyn FrameRenderer,
        frames: &FrameDir,
        encoder: &VideoEncoder,
    ) -> YoyResult<(RunStats, EncodeOutput)> {
        let mut counter = FrameCounter::new();
        let stats = self.run(renderer, frames, &mut counter)?;
        let output = encoder.encode(frames)?;
        Ok((stats, output))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/sequencer.rs"]
mod tests;
