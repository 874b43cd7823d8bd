//! Color grading wheels: tint colors soft-light blended per luminance zone.

use palette::{FromColor, Hsl, Srgb};

use super::{luminance, mix, smoothstep};
use crate::state::color::{ColorGradingState, ColorWheel};

/// Fixed blend strength so a wheel never fully overrides the image.
pub const WHEEL_STRENGTH: f32 = 0.3;

/// RGB tint of one wheel, resolved once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelTint {
    pub rgb: [f32; 3],
    /// `false` for a wheel with zero saturation; the blend is skipped.
    pub active: bool,
}

impl WheelTint {
    /// Resolve the wheel's hue and saturation at 50% lightness.
    pub fn from_wheel(wheel: &ColorWheel) -> Self {
        if wheel.saturation <= 0.0 {
            return Self::default();
        }
        let rgb: Srgb = Srgb::from_color(Hsl::new_srgb(wheel.hue, wheel.saturation / 100.0, 0.5));
        Self {
            rgb: [rgb.red, rgb.green, rgb.blue],
            active: true,
        }
    }
}

/// All wheel tints plus the shadow / highlight balance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GradingTints {
    pub shadows: WheelTint,
    pub midtones: WheelTint,
    pub highlights: WheelTint,
    pub global: WheelTint,
    /// Balance in slider units, ±100.
    pub balance: f32,
}

impl GradingTints {
    pub fn from_state(state: &ColorGradingState) -> Self {
        Self {
            shadows: WheelTint::from_wheel(&state.shadows),
            midtones: WheelTint::from_wheel(&state.midtones),
            highlights: WheelTint::from_wheel(&state.highlights),
            global: WheelTint::from_wheel(&state.global),
            balance: state.balance,
        }
    }

    /// `true` when no wheel contributes.
    pub fn is_neutral(&self) -> bool {
        !(self.shadows.active || self.midtones.active || self.highlights.active || self.global.active)
    }
}

/// Soft-light blend of one channel.
pub fn soft_light(base: f32, blend: f32) -> f32 {
    if blend < 0.5 {
        2.0 * base * blend + base * base * (1.0 - 2.0 * blend)
    } else {
        base.max(0.0).sqrt() * (2.0 * blend - 1.0) + 2.0 * base * (1.0 - blend)
    }
}

fn soft_light_rgb(base: [f32; 3], blend: [f32; 3]) -> [f32; 3] {
    [
        soft_light(base[0], blend[0]),
        soft_light(base[1], blend[1]),
        soft_light(base[2], blend[2]),
    ]
}

/// Shadow, midtone and highlight weights for luminance `l`.
///
/// Positive balance shifts weight from the shadow wheel to the highlight
/// wheel; negative balance does the opposite.
pub fn zone_weights(l: f32, balance: f32) -> [f32; 3] {
    let shadow = 1.0 - smoothstep(0.0, 0.33, l);
    let highlight = smoothstep(0.66, 1.0, l);
    let mid = (1.0 - shadow - highlight).clamp(0.0, 1.0);
    let b = balance / 100.0;
    [shadow * (1.0 - b * 0.5), mid, highlight * (1.0 + b * 0.5)]
}

/// Blend each active wheel into its zone, then the global wheel everywhere.
pub fn apply_color_grading(rgb: [f32; 3], tints: &GradingTints) -> [f32; 3] {
    if tints.is_neutral() {
        return rgb;
    }
    let [shadow_w, mid_w, highlight_w] = zone_weights(luminance(rgb), tints.balance);
    let mut color = rgb;
    for (tint, weight) in [
        (tints.shadows, shadow_w),
        (tints.midtones, mid_w),
        (tints.highlights, highlight_w),
        (tints.global, 1.0),
    ] {
        if tint.active {
            color = mix(color, soft_light_rgb(color, tint.rgb), weight * WHEEL_STRENGTH);
        }
    }
    color
}
