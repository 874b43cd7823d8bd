//! Spline-based tone curve evaluation and LUT baking.
//!
//! Implements Catmull-Rom spline interpolation through user-defined control
//! points. The master `rgb` curve is evaluated first; each channel curve is
//! then evaluated at the master curve's output.
//!
//! # Algorithm
//! For each segment between P1 and P2, with neighbors P0 and P3 (clamped to
//! the first / last point at the ends of the list):
//! ```text
//! q(t) = 0.5 × ((2×P1) + (-P0 + P2)×t + (2×P0 - 5×P1 + 4×P2 - P3)×t² + (-P0 + 3×P1 - 3×P2 + P3)×t³)
//! ```
//!
//! # Complexity
//! - Evaluate: O(log N) binary search + O(1) interpolation
//! - Bake: O(4 × 256 × log N)

use crate::state::tone_curve::{CurvePoint, ToneCurveState, is_identity_channel};

/// Number of LUT entries per channel.
pub const CURVE_LUT_SIZE: usize = 256;

/// Evaluates a Catmull-Rom spline through control points sorted by x.
///
/// # Performance
/// Borrows control points to avoid heap allocations in hot paths.
pub struct CurveEvaluator<'a> {
    pub control_points: &'a [CurvePoint],
}

impl CurveEvaluator<'_> {
    /// `true` when the points can be evaluated: at least two, all in [0, 1].
    pub fn is_well_formed(&self) -> bool {
        self.control_points.len() >= 2
            && self
                .control_points
                .iter()
                .all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y))
    }

    /// Evaluate the curve at `t`, clamped to [0, 1].
    ///
    /// Malformed curves and the exact identity pair evaluate as identity.
    /// Values outside the control point range take the nearest endpoint's y.
    pub fn evaluate(&self, t: f32) -> f32 {
        let pts = self.control_points;
        if !self.is_well_formed() || is_identity_channel(pts) {
            return t.clamp(0.0, 1.0);
        }

        let last = pts.len() - 1;
        if t <= pts[0].x {
            return pts[0].y;
        }
        if t >= pts[last].x {
            return pts[last].y;
        }

        // Binary search for the segment containing t
        let mut lo = 0;
        let mut hi = last;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if pts[mid].x <= t {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        let p0 = pts[lo.saturating_sub(1)];
        let p1 = pts[lo];
        let p2 = pts[hi];
        let p3 = pts[(hi + 1).min(last)];

        let span = p2.x - p1.x;
        let segment_t = if span.abs() < 1e-10 {
            0.0
        } else {
            (t - p1.x) / span
        };

        catmull_rom(p0.y, p1.y, p2.y, p3.y, segment_t).clamp(0.0, 1.0)
    }
}

/// Catmull-Rom cubic interpolation between P1 and P2.
fn catmull_rom(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

/// Dense 256-entry RGB table baked from a [`ToneCurveState`].
#[derive(Debug, Clone, PartialEq)]
pub struct CurveLut {
    pub entries: Box<[[f32; 3]; CURVE_LUT_SIZE]>,
}

impl CurveLut {
    /// Bake the master curve followed by each channel curve.
    pub fn build(curve: &ToneCurveState) -> Self {
        let master = CurveEvaluator {
            control_points: &curve.rgb,
        };
        let channels = [
            CurveEvaluator {
                control_points: &curve.red,
            },
            CurveEvaluator {
                control_points: &curve.green,
            },
            CurveEvaluator {
                control_points: &curve.blue,
            },
        ];

        let mut entries = Box::new([[0.0_f32; 3]; CURVE_LUT_SIZE]);
        for (i, entry) in entries.iter_mut().enumerate() {
            let t = i as f32 / (CURVE_LUT_SIZE - 1) as f32;
            let intermediate = master.evaluate(t);
            for (c, channel) in channels.iter().enumerate() {
                entry[c] = channel.evaluate(intermediate);
            }
        }
        Self { entries }
    }

    /// `None` for the identity curve, so the stage can be skipped entirely.
    pub fn for_state(curve: &ToneCurveState) -> Option<Self> {
        (!curve.is_identity()).then(|| Self::build(curve))
    }

    /// Linear lookup of one channel at `v`, addressing entries at `v × 255`.
    pub fn sample(&self, channel: usize, v: f32) -> f32 {
        let pos = v.clamp(0.0, 1.0) * (CURVE_LUT_SIZE - 1) as f32;
        let i0 = pos.floor() as usize;
        let i1 = (i0 + 1).min(CURVE_LUT_SIZE - 1);
        let frac = pos - i0 as f32;
        let a = self.entries[i0][channel];
        let b = self.entries[i1][channel];
        a + (b - a) * frac
    }

    /// Apply to a color, channel by channel.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        [
            self.sample(0, rgb[0]),
            self.sample(1, rgb[1]),
            self.sample(2, rgb[2]),
        ]
    }

    /// Entries padded to RGBA for upload as an `Rgba32Float` texture row.
    pub fn to_rgba(&self) -> Vec<[f32; 4]> {
        self.entries
            .iter()
            .map(|e| [e[0], e[1], e[2], 1.0])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tone_curve::{CurveChannel, identity_points};

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_catmull_rom_endpoints() {
        let v = catmull_rom(0.0, 0.25, 0.75, 1.0, 0.0);
        assert!((v - 0.25).abs() < EPSILON);
        let v = catmull_rom(0.0, 0.25, 0.75, 1.0, 1.0);
        assert!((v - 0.75).abs() < EPSILON);
    }

    #[test]
    fn test_curve_passes_through_control_points() {
        let points = [
            CurvePoint::new(0.0, 0.0),
            CurvePoint::new(0.5, 0.8),
            CurvePoint::new(1.0, 1.0),
        ];
        let eval = CurveEvaluator {
            control_points: &points,
        };
        assert_eq!(eval.evaluate(0.5), 0.8);
        assert_eq!(eval.evaluate(0.0), 0.0);
        assert_eq!(eval.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_identity_pair_is_linear() {
        let points = identity_points();
        let eval = CurveEvaluator {
            control_points: &points,
        };
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!((eval.evaluate(t) - t).abs() < EPSILON, "t={t}");
        }
    }

    #[test]
    fn test_two_point_curve_eases_between_endpoints() {
        // Clamped neighbors give zero end tangents.
        let points = [CurvePoint::new(0.0, 0.2), CurvePoint::new(1.0, 0.8)];
        let eval = CurveEvaluator {
            control_points: &points,
        };
        assert!((eval.evaluate(0.5) - 0.5).abs() < EPSILON);
        assert!(eval.evaluate(0.1) < 0.2 + 0.6 * 0.1);
    }

    #[test]
    fn test_malformed_curves_are_identity() {
        let single = [CurvePoint::new(0.5, 0.9)];
        let eval = CurveEvaluator {
            control_points: &single,
        };
        assert!((eval.evaluate(0.3) - 0.3).abs() < EPSILON);

        let out_of_range = [CurvePoint::new(0.0, -0.5), CurvePoint::new(1.0, 1.5)];
        let eval = CurveEvaluator {
            control_points: &out_of_range,
        };
        assert!((eval.evaluate(0.7) - 0.7).abs() < EPSILON);
    }

    #[test]
    fn test_identity_state_has_no_lut() {
        assert!(CurveLut::for_state(&ToneCurveState::default()).is_none());
    }

    #[test]
    fn test_channel_curve_applies_after_master() {
        let mut curve = ToneCurveState::default();
        curve.set_points(
            CurveChannel::Rgb,
            &[CurvePoint::new(0.0, 1.0), CurvePoint::new(1.0, 0.0)],
        );
        curve.set_points(
            CurveChannel::Red,
            &[
                CurvePoint::new(0.0, 0.0),
                CurvePoint::new(0.5, 0.3),
                CurvePoint::new(1.0, 1.0),
            ],
        );
        let master = CurveEvaluator {
            control_points: &curve.rgb,
        };
        let red = CurveEvaluator {
            control_points: &curve.red,
        };

        let lut = CurveLut::build(&curve);
        let t = 64.0 / 255.0;
        let out = lut.apply([t, t, t]);
        let expected_red = red.evaluate(master.evaluate(t));
        assert!((out[0] - expected_red).abs() < EPSILON, "red {}", out[0]);
        assert!((out[1] - master.evaluate(t)).abs() < EPSILON, "green {}", out[1]);
    }

    #[test]
    fn test_lut_output_is_clamped() {
        let mut curve = ToneCurveState::default();
        curve.set_points(
            CurveChannel::Rgb,
            &[
                CurvePoint::new(0.0, 0.0),
                CurvePoint::new(0.1, 1.0),
                CurvePoint::new(0.2, 0.0),
                CurvePoint::new(1.0, 1.0),
            ],
        );
        let lut = CurveLut::build(&curve);
        for entry in lut.entries.iter() {
            for &v in entry {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
