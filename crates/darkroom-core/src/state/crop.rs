//! Crop rectangle, rotation and flips.

use serde::{Deserialize, Serialize};

use super::clamp_value;

/// Smallest crop side, as a fraction of the image.
const MIN_CROP_SIZE: f32 = 0.01;
/// Straighten range in degrees.
const MAX_ROTATION: f32 = 45.0;

/// Normalized crop rectangle plus orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CropState {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    pub aspect_ratio: Option<String>,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl Default for CropState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            rotation: 0.0,
            aspect_ratio: None,
            flip_horizontal: false,
            flip_vertical: false,
        }
    }
}

/// Parsed aspect ratio lock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AspectRatio {
    /// The source image's own ratio.
    Original,
    /// Width over height.
    Fixed(f32),
}

impl AspectRatio {
    /// Parse `"w:h"` or `"original"`. `"free"` and malformed input yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("original") {
            return Some(Self::Original);
        }
        let (w, h) = s.split_once(':')?;
        let w: f32 = w.trim().parse().ok()?;
        let h: f32 = h.trim().parse().ok()?;
        (w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()).then_some(Self::Fixed(w / h))
    }

    /// Pixel-space width / height for an image of the given size.
    pub fn ratio(self, image_width: u32, image_height: u32) -> f32 {
        match self {
            Self::Original => image_width as f32 / image_height.max(1) as f32,
            Self::Fixed(r) => r,
        }
    }
}

impl CropState {
    /// `true` when the crop leaves the image untouched.
    pub fn is_identity(&self) -> bool {
        self.x == 0.0
            && self.y == 0.0
            && self.width == 1.0
            && self.height == 1.0
            && self.rotation == 0.0
            && !self.flip_horizontal
            && !self.flip_vertical
    }

    /// Enforce `x + width <= 1`, `y + height <= 1` and the rotation range.
    pub fn clamp_ranges(&mut self) {
        self.width = clamp_value(self.width, MIN_CROP_SIZE, 1.0);
        self.height = clamp_value(self.height, MIN_CROP_SIZE, 1.0);
        self.x = clamp_value(self.x, 0.0, 1.0 - self.width);
        self.y = clamp_value(self.y, 0.0, 1.0 - self.height);
        self.rotation = clamp_value(self.rotation, -MAX_ROTATION, MAX_ROTATION);
    }

    /// Parsed aspect lock, if any.
    pub fn aspect(&self) -> Option<AspectRatio> {
        self.aspect_ratio.as_deref().and_then(AspectRatio::parse)
    }

    /// Fit the rect to the locked aspect ratio around its current center,
    /// shrinking the longer side and keeping the rect inside the image.
    pub fn lock_aspect(&mut self, image_width: u32, image_height: u32) {
        let Some(aspect) = self.aspect() else {
            return;
        };
        let image_aspect = image_width as f32 / image_height.max(1) as f32;
        let normalized = aspect.ratio(image_width, image_height) / image_aspect;
        if !normalized.is_finite() || normalized <= 0.0 {
            return;
        }

        let center_x = self.x + self.width / 2.0;
        let center_y = self.y + self.height / 2.0;
        let mut width = self.width;
        let mut height = self.height;
        if width / height > normalized {
            width = height * normalized;
        } else {
            height = width / normalized;
        }
        if width > 1.0 {
            width = 1.0;
            height = width / normalized;
        }
        if height > 1.0 {
            height = 1.0;
            width = height * normalized;
        }

        self.width = width;
        self.height = height;
        self.x = (center_x - width / 2.0).clamp(0.0, 1.0 - width);
        self.y = (center_y - height / 2.0).clamp(0.0, 1.0 - height);
    }
}
