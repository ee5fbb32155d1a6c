use crate::foundation::error::{YoyError, YoyResult};

/// Zero-based index of an exported frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Rational frames-per-second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator.
    pub num: u32,
    /// Denominator, always > 0.
    pub den: u32,
}

impl Fps {
    /// Build a rational fps, rejecting zero numerator or denominator.
    pub fn new(num: u32, den: u32) -> YoyResult<Self> {
        if den == 0 {
            return Err(YoyError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(YoyError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert a floating-point rate (e.g. `29.97`) to a rational with millisecond precision.
    pub fn from_f64(fps: f64) -> YoyResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(YoyError::validation(format!(
                "fps must be a finite positive number, got {fps}"
            )));
        }
        let num = (fps * 1000.0).round();
        if num < 1.0 || num > f64::from(u32::MAX) {
            return Err(YoyError::validation(format!("fps {fps} is out of range")));
        }
        let mut num = num as u32;
        let mut den = 1000u32;
        let g = gcd(num, den);
        num /= g;
        den /= g;
        Self::new(num, den)
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Number of animation steps needed to cover `secs` seconds, never less than one.
    pub fn secs_to_steps(self, secs: f64) -> u32 {
        let steps = (secs * self.as_f64()).round();
        if !steps.is_finite() || steps < 1.0 {
            return 1;
        }
        steps.min(f64::from(u32::MAX)) as u32
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

/// Pixel dimensions of a rendered frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Canvas for a figure of `width_in` x `height_in` inches at `dpi`.
    ///
    /// Both dimensions are rounded up to an even number so the frames stay encodable as yuv420p.
    pub fn from_inches(width_in: f64, height_in: f64, dpi: u32) -> YoyResult<Self> {
        if dpi == 0 {
            return Err(YoyError::validation("dpi must be non-zero"));
        }
        fn to_even_px(inches: f64, dpi: u32) -> YoyResult<u32> {
            if !inches.is_finite() || inches <= 0.0 {
                return Err(YoyError::validation("figure size must be positive"));
            }
            let px = (inches * f64::from(dpi)).round().max(2.0);
            if px > f64::from(u16::MAX) {
                return Err(YoyError::validation(format!(
                    "figure dimension {px}px exceeds {}",
                    u16::MAX
                )));
            }
            let px = px as u32;
            Ok(px + (px % 2))
        }
        Ok(Self {
            width: to_even_px(width_in, dpi)?,
            height: to_even_px(height_in, dpi)?,
        })
    }
}

/// Straight (non-premultiplied) RGBA color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Self = Self::new_const(1.0, 1.0, 1.0, 1.0);
    pub const RED: Self = Self::new_const(1.0, 0.0, 0.0, 1.0);

    /// Unchecked constructor for constants; components must already be in `[0, 1]`.
    pub const fn new_const(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color, rejecting components outside `[0, 1]`.
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> YoyResult<Self> {
        for (name, v) in [("r", r), ("g", g), ("b", b), ("a", a)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(YoyError::validation(format!(
                    "color component {name} must be in [0, 1], got {v}"
                )));
            }
        }
        Ok(Self { r, g, b, a })
    }

    /// Build a color from exactly four components.
    pub fn from_slice(components: &[f64]) -> YoyResult<Self> {
        let [r, g, b, a] = components else {
            return Err(YoyError::validation(format!(
                "color must have 4 components (rgba), got {}",
                components.len()
            )));
        };
        Self::new(*r, *g, *b, *a)
    }

    /// Straight RGBA8 with the color's own alpha scaled by `opacity`.
    pub fn to_rgba8(self, opacity: f64) -> [u8; 4] {
        fn q(v: f64) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [q(self.r), q(self.g), q(self.b), q(self.a * opacity)]
    }
}

impl TryFrom<Vec<f64>> for Rgba {
    type Error = YoyError;

    fn try_from(v: Vec<f64>) -> YoyResult<Self> {
        Self::from_slice(&v)
    }
}

impl From<Rgba> for Vec<f64> {
    fn from(c: Rgba) -> Self {
        vec![c.r, c.g, c.b, c.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
