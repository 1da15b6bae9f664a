//! Pitch curve for the ticking sound.
//!
//! The pitch stays neutral until the warn window is entered, then rises to
//! `max_pitch` at the moment the timer ends. The default ramp is a quintic
//! smootherstep, which has zero first and second derivative at both ends so
//! the pitch never jumps audibly.

use serde::{Deserialize, Serialize};

/// Clamp `x` into `[lo, hi]`.
///
/// Total for every input: NaN maps to `lo`, infinities to the nearest bound.
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    debug_assert!(lo <= hi);
    if x.is_nan() {
        return lo;
    }
    x.max(lo).min(hi)
}

pub fn clamp01(x: f64) -> f64 {
    clamp(x, 0.0, 1.0)
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// `6t^5 - 15t^4 + 10t^3`, for `t` in `[0, 1]`.
pub fn smootherstep(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchRamp {
    /// Neutral until the warn window, then an eased rise.
    #[default]
    Smootherstep,
    /// Straight line from `min_pitch` at start to `max_pitch` at the end,
    /// ignoring the warn window.
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchCurve {
    #[serde(default)]
    pub ramp: PitchRamp,
    #[serde(default = "default_min_pitch")]
    pub min_pitch: f64,
    #[serde(default = "default_max_pitch")]
    pub max_pitch: f64,
}

fn default_min_pitch() -> f64 {
    1.0
}
fn default_max_pitch() -> f64 {
    3.0
}

impl Default for PitchCurve {
    fn default() -> Self {
        Self {
            ramp: PitchRamp::default(),
            min_pitch: default_min_pitch(),
            max_pitch: default_max_pitch(),
        }
    }
}

impl PitchCurve {
    /// Elapsed fraction at which the ramp begins, for a run of
    /// `duration_secs` with a warn window of `warn_window_secs` remaining.
    pub fn onset_fraction(duration_secs: f64, warn_window_secs: f64) -> f64 {
        if duration_secs <= 0.0 {
            return 0.0;
        }
        clamp01((duration_secs - warn_window_secs) / duration_secs)
    }

    /// Pitch at `elapsed_fraction` given a precomputed onset.
    pub fn pitch_at(&self, elapsed_fraction: f64, onset_fraction: f64) -> f64 {
        match self.ramp {
            PitchRamp::Linear => lerp(self.min_pitch, self.max_pitch, clamp01(elapsed_fraction)),
            PitchRamp::Smootherstep => {
                if elapsed_fraction <= onset_fraction {
                    return self.min_pitch;
                }
                let span = 1.0 - onset_fraction;
                let t = if span <= 0.0 {
                    1.0
                } else {
                    clamp01((elapsed_fraction - onset_fraction) / span)
                };
                lerp(self.min_pitch, self.max_pitch, smootherstep(t))
            }
        }
    }

    /// Pitch with no ramp applied.
    pub fn neutral(&self) -> f64 {
        self.min_pitch
    }
}
