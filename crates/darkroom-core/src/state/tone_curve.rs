//! Tone curve control points.

use serde::{Deserialize, Serialize};

use super::clamp_value;

/// A control point in the unit square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
}

impl CurvePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The four editable curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveChannel {
    Rgb,
    Red,
    Green,
    Blue,
}

/// Master and per-channel tone curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneCurveState {
    pub rgb: Vec<CurvePoint>,
    pub red: Vec<CurvePoint>,
    pub green: Vec<CurvePoint>,
    pub blue: Vec<CurvePoint>,
}

/// The two-point straight line that leaves values unchanged.
pub fn identity_points() -> Vec<CurvePoint> {
    vec![CurvePoint::new(0.0, 0.0), CurvePoint::new(1.0, 1.0)]
}

/// `true` when `points` is exactly the identity pair.
pub fn is_identity_channel(points: &[CurvePoint]) -> bool {
    points == [CurvePoint::new(0.0, 0.0), CurvePoint::new(1.0, 1.0)]
}

/// Bring edited points into canonical form.
///
/// Clamps to [0, 1], sorts by x and pins the endpoints to x = 0 and x = 1.
/// Fewer than two points yields the identity line.
pub fn normalize_points(points: &[CurvePoint]) -> Vec<CurvePoint> {
    if points.len() < 2 {
        return identity_points();
    }
    let mut out: Vec<CurvePoint> = points
        .iter()
        .map(|p| CurvePoint::new(clamp_value(p.x, 0.0, 1.0), clamp_value(p.y, 0.0, 1.0)))
        .collect();
    out.sort_by(|a, b| a.x.total_cmp(&b.x));
    if let Some(first) = out.first_mut() {
        first.x = 0.0;
    }
    if let Some(last) = out.last_mut() {
        last.x = 1.0;
    }
    out
}

impl Default for ToneCurveState {
    fn default() -> Self {
        Self {
            rgb: identity_points(),
            red: identity_points(),
            green: identity_points(),
            blue: identity_points(),
        }
    }
}

impl ToneCurveState {
    pub fn channel(&self, channel: CurveChannel) -> &[CurvePoint] {
        match channel {
            CurveChannel::Rgb => &self.rgb,
            CurveChannel::Red => &self.red,
            CurveChannel::Green => &self.green,
            CurveChannel::Blue => &self.blue,
        }
    }

    /// Replace a channel's points, normalizing them first.
    pub fn set_points(&mut self, channel: CurveChannel, points: &[CurvePoint]) {
        let normalized = normalize_points(points);
        match channel {
            CurveChannel::Rgb => self.rgb = normalized,
            CurveChannel::Red => self.red = normalized,
            CurveChannel::Green => self.green = normalized,
            CurveChannel::Blue => self.blue = normalized,
        }
    }

    /// `true` when all four curves are exactly the identity pair.
    pub fn is_identity(&self) -> bool {
        is_identity_channel(&self.rgb)
            && is_identity_channel(&self.red)
            && is_identity_channel(&self.green)
            && is_identity_channel(&self.blue)
    }

    /// Sort each channel by x.
    ///
    /// Points are not clamped here: a channel with out-of-range points is
    /// evaluated as identity by the curve evaluator.
    pub fn clamp_ranges(&mut self) {
        for points in [
            &mut self.rgb,
            &mut self.red,
            &mut self.green,
            &mut self.blue,
        ] {
            points.sort_by(|a, b| a.x.total_cmp(&b.x));
        }
    }
}
