//! HSL conversion and per-hue-band adjustment.

use super::smoothstep;

/// Convert RGB to HSL with hue, saturation and lightness all in 0..1.
pub fn rgb_to_hsl(rgb: [f32; 3]) -> [f32; 3] {
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) * 0.5;

    if max == min {
        return [0.0, 0.0, l];
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    [h / 6.0, s, l]
}

/// Convert HSL (all components in 0..1) back to RGB.
pub fn hsl_to_rgb(hsl: [f32; 3]) -> [f32; 3] {
    let [h, s, l] = hsl;
    if s == 0.0 {
        return [l, l, l];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    [
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// WGSL-style `fract`.
pub(crate) fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Blend the deltas of the two bands surrounding `hue` (0..1).
///
/// `bands` holds `[hue, saturation, luminance]` deltas in band order; the
/// position within a band is eased with a smoothstep.
pub fn band_adjustment(hue: f32, bands: &[[f32; 3]; 8]) -> [f32; 3] {
    let segment = fract(hue) * 8.0;
    let idx = (segment.floor() as usize).min(7);
    let t = smoothstep(0.0, 1.0, fract(segment));
    let current = bands[idx];
    let next = bands[(idx + 1) % 8];
    [
        current[0] + (next[0] - current[0]) * t,
        current[1] + (next[1] - current[1]) * t,
        current[2] + (next[2] - current[2]) * t,
    ]
}

/// Saturation below which a pixel is treated as neutral.
pub const HSL_MIN_SATURATION: f32 = 0.05;

/// Per-band hue shift, saturation scale and lightness offset.
pub fn apply_hsl_bands(rgb: [f32; 3], bands: &[[f32; 3]; 8]) -> [f32; 3] {
    let mut hsl = rgb_to_hsl(rgb);
    if hsl[1] <= HSL_MIN_SATURATION {
        return rgb;
    }
    let adj = band_adjustment(hsl[0], bands);
    hsl[0] = fract(hsl[0] + adj[0] / 360.0);
    hsl[1] = (hsl[1] * (1.0 + adj[1] / 100.0)).clamp(0.0, 1.0);
    hsl[2] = (hsl[2] + adj[2] / 100.0 * 0.5).clamp(0.0, 1.0);
    hsl_to_rgb(hsl)
}

/// Scale saturation by `1 + amount / 100`.
pub fn apply_saturation(rgb: [f32; 3], amount: f32) -> [f32; 3] {
    if amount == 0.0 {
        return rgb;
    }
    let mut hsl = rgb_to_hsl(rgb);
    hsl[1] = (hsl[1] * (1.0 + amount / 100.0)).clamp(0.0, 1.0);
    hsl_to_rgb(hsl)
}

/// Raise saturation most where it is currently lowest.
pub fn apply_vibrance(rgb: [f32; 3], amount: f32) -> [f32; 3] {
    if amount == 0.0 {
        return rgb;
    }
    let mut hsl = rgb_to_hsl(rgb);
    let boost = amount / 100.0 * (1.0 - hsl[1]);
    hsl[1] = (hsl[1] + boost * 0.5).clamp(0.0, 1.0);
    hsl_to_rgb(hsl)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn close(a: [f32; 3], b: [f32; 3], tol: f32) -> bool {
        (0..3).all(|i| (a[i] - b[i]).abs() < tol)
    }

    #[test]
    fn test_hsl_roundtrip_preserves_values() {
        let original = [0.8, 0.4, 0.2];
        let back = hsl_to_rgb(rgb_to_hsl(original));
        assert!(close(original, back, 1e-4), "{back:?}");
    }

    #[test]
    fn test_pure_colors_have_expected_hue() {
        assert!((rgb_to_hsl([1.0, 0.0, 0.0])[0]).abs() < EPSILON);
        assert!((rgb_to_hsl([0.0, 1.0, 0.0])[0] - 1.0 / 3.0).abs() < EPSILON);
        assert!((rgb_to_hsl([0.0, 0.0, 1.0])[0] - 2.0 / 3.0).abs() < EPSILON);
        // Hue wraps for magenta-ish reds.
        assert!(rgb_to_hsl([1.0, 0.0, 0.2])[0] > 0.9);
    }

    #[test]
    fn test_gray_has_zero_saturation() {
        let hsl = rgb_to_hsl([0.5, 0.5, 0.5]);
        assert_eq!(hsl[1], 0.0);
    }

    #[test]
    fn test_band_adjustment_at_band_start_is_exact() {
        let mut bands = [[0.0; 3]; 8];
        bands[3] = [10.0, 20.0, 30.0];
        // Green band starts at hue 3/8.
        let adj = band_adjustment(3.0 / 8.0, &bands);
        assert!(close(adj, [10.0, 20.0, 30.0], EPSILON), "{adj:?}");
    }

    #[test]
    fn test_magenta_blends_into_red() {
        let mut bands = [[0.0; 3]; 8];
        bands[0] = [0.0, 100.0, 0.0];
        let adj = band_adjustment(7.5 / 8.0, &bands);
        assert!((adj[1] - 50.0).abs() < EPSILON);
    }

    #[test]
    fn test_desaturated_pixels_are_untouched() {
        let bands = [[50.0, 50.0, 50.0]; 8];
        let gray = [0.4, 0.41, 0.4];
        assert_eq!(apply_hsl_bands(gray, &bands), gray);
    }

    #[test]
    fn test_saturation_minus_100_is_gray() {
        let out = apply_saturation([0.8, 0.3, 0.2], -100.0);
        assert!((out[0] - out[1]).abs() < EPSILON && (out[1] - out[2]).abs() < EPSILON);
    }

    #[test]
    fn test_vibrance_favors_low_saturation() {
        let muted = [0.5, 0.45, 0.4];
        let vivid = [0.9, 0.1, 0.1];
        let gain = |rgb: [f32; 3]| {
            rgb_to_hsl(apply_vibrance(rgb, 100.0))[1] - rgb_to_hsl(rgb)[1]
        };
        assert!(gain(muted) > gain(vivid));
    }
}
