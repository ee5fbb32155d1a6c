use std::sync::Arc;

use chrono::NaiveDate;

use crate::data::series::{Series, day_of_year};
use crate::foundation::core::Rgba;
use crate::foundation::error::{YoyError, YoyResult};

/// Default alpha guard below which a settled curve stops decaying.
pub const DEFAULT_ALPHA_FLOOR: f64 = 0.15;
/// Default decay constant, in steps.
pub const DEFAULT_DECAY_RATE: f64 = 11.0;

/// Look and fade behaviour shared by every curve of a run.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CurveStyle {
    pub color: Rgba,
    pub base_alpha: f64,
    pub decay_rate: f64,
    pub alpha_floor: f64,
}

impl Default for CurveStyle {
    fn default() -> Self {
        Self {
            color: Rgba::RED,
            base_alpha: 1.0,
            decay_rate: DEFAULT_DECAY_RATE,
            alpha_floor: DEFAULT_ALPHA_FLOOR,
        }
    }
}

impl CurveStyle {
    pub fn params(&self, segments: u32) -> CurveParams {
        CurveParams {
            segments,
            color: self.color,
            base_alpha: self.base_alpha,
            decay_rate: self.decay_rate,
            alpha_floor: self.alpha_floor,
        }
    }
}

/// Per-curve animation parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CurveParams {
    /// Number of reveal steps needed to traverse the whole series (>= 1).
    pub segments: u32,
    pub color: Rgba,
    /// Alpha while revealing, in `(0, 1]`.
    pub base_alpha: f64,
    /// Exponential decay constant once settled (> 0).
    pub decay_rate: f64,
    /// Decay is only recomputed while the current alpha is above this value.
    ///
    /// The last recomputation may land below the floor; alpha is never clamped to it.
    pub alpha_floor: f64,
}

impl CurveParams {
    /// Parameters with the default color, alpha and decay for `segments` reveal steps.
    pub fn new(segments: u32) -> Self {
        CurveStyle::default().params(segments)
    }

    pub fn validate(&self) -> YoyResult<()> {
        if self.segments == 0 {
            return Err(YoyError::validation("curve segments must be >= 1"));
        }
        if !(self.base_alpha > 0.0 && self.base_alpha <= 1.0) {
            return Err(YoyError::validation(format!(
                "curve base alpha must be in (0, 1], got {}",
                self.base_alpha
            )));
        }
        if !(self.decay_rate.is_finite() && self.decay_rate > 0.0) {
            return Err(YoyError::validation(format!(
                "curve decay rate must be > 0, got {}",
                self.decay_rate
            )));
        }
        if !self.alpha_floor.is_finite() {
            return Err(YoyError::validation("curve alpha floor must be finite"));
        }
        // Re-check the range for colors built without `Rgba::new`.
        Rgba::new(self.color.r, self.color.g, self.color.b, self.color.a)?;
        Ok(())
    }
}

/// Animation phase of a curve. Transitions only from `Revealing` to `Settled`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurvePhase {
    Revealing,
    Settled,
}

/// Mutable animation state of a curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveState {
    /// Step counter, starts at 1 and grows by one per advance.
    pub reveal_step: u64,
    pub current_alpha: f64,
    pub fully_revealed: bool,
}

impl CurveState {
    pub fn initial(params: &CurveParams) -> Self {
        Self {
            reveal_step: 1,
            current_alpha: params.base_alpha,
            fully_revealed: false,
        }
    }

    /// Phase the *next* advance will run in.
    pub fn phase(&self, params: &CurveParams) -> CurvePhase {
        if self.reveal_step < u64::from(params.segments) {
            CurvePhase::Revealing
        } else {
            CurvePhase::Settled
        }
    }

    /// Pure transition: the state after one advance and the prefix length drawn by it.
    pub fn step(&self, params: &CurveParams, series_len: usize) -> (Self, usize) {
        let segments = u64::from(params.segments);
        match self.phase(params) {
            CurvePhase::Revealing => {
                let next = Self {
                    reveal_step: self.reveal_step + 1,
                    ..*self
                };
                (next, reveal_len(self.reveal_step, segments, series_len))
            }
            CurvePhase::Settled => {
                let mut alpha = self.current_alpha;
                if alpha > params.alpha_floor {
                    let elapsed = (self.reveal_step - segments) as f64;
                    alpha = params.base_alpha * (-elapsed / params.decay_rate).exp();
                }
                let next = Self {
                    reveal_step: self.reveal_step + 1,
                    current_alpha: alpha,
                    fully_revealed: true,
                };
                (next, series_len)
            }
        }
    }
}

/// Prefix length at `step` of `segments`, rounding half to even.
pub fn reveal_len(step: u64, segments: u64, len: usize) -> usize {
    let f = step as f64 / segments as f64;
    let n = (f * len as f64).round_ties_even();
    (n.max(0.0) as usize).min(len)
}

/// One render tuple: a prefix of a year's series with its color and alpha.
#[derive(Clone, Debug)]
pub struct Trace {
    series: Arc<Series>,
    len: usize,
    pub color: Rgba,
    pub alpha: f64,
}

impl Trace {
    pub fn year(&self) -> i32 {
        self.series.year()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn dates(&self) -> &[NaiveDate] {
        self.series.prefix(self.len).0
    }

    pub fn values(&self) -> &[f64] {
        self.series.prefix(self.len).1
    }

    /// Last date drawn, if any point is visible.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates().last().copied()
    }

    /// `(day_of_year, value)` pairs in draw order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let (x, y) = self.series.prefix(self.len);
        x.iter()
            .zip(y)
            .map(|(d, v)| (f64::from(day_of_year(*d)), *v))
    }
}

/// One year's series plus its reveal/decay animation state.
#[derive(Clone, Debug)]
pub struct Curve {
    series: Arc<Series>,
    params: CurveParams,
    state: CurveState,
}

impl Curve {
    pub fn new(series: impl Into<Arc<Series>>, params: CurveParams) -> YoyResult<Self> {
        params.validate()?;
        Ok(Self {
            series: series.into(),
            state: CurveState::initial(&params),
            params,
        })
    }

    /// Advance one step and return what to draw for it.
    pub fn advance(&mut self) -> Trace {
        let (next, len) = self.state.step(&self.params, self.series.len());
        self.state = next;
        Trace {
            series: Arc::clone(&self.series),
            len,
            color: self.params.color,
            alpha: next.current_alpha,
        }
    }

    pub fn year(&self) -> i32 {
        self.series.year()
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    pub fn state(&self) -> &CurveState {
        &self.state
    }

    pub fn phase(&self) -> CurvePhase {
        self.state.phase(&self.params)
    }

    pub fn is_fully_revealed(&self) -> bool {
        self.state.fully_revealed
    }

    /// Frames this curve emits while it is the active curve.
    pub fn active_frames(&self) -> u64 {
        if self.state.fully_revealed {
            return 0;
        }
        u64::from(self.params.segments)
            .saturating_sub(self.state.reveal_step)
            .saturating_add(1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/curve.rs"]
mod tests;
