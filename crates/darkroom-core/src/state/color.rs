//! Per-hue HSL adjustments and color grading wheels.

use serde::{Deserialize, Serialize};

use super::clamp_value;

/// One of the eight fixed hue bands, in hue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HueBand {
    Red,
    Orange,
    Yellow,
    Green,
    Aqua,
    Blue,
    Purple,
    Magenta,
}

impl HueBand {
    pub const ALL: [HueBand; 8] = [
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Aqua,
        Self::Blue,
        Self::Purple,
        Self::Magenta,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Aqua => "aqua",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Magenta => "magenta",
        }
    }
}

/// Hue / saturation / luminance deltas for one band, each ±100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HslValues {
    pub hue: f32,
    pub saturation: f32,
    pub luminance: f32,
}

impl HslValues {
    pub fn clamp_ranges(&mut self) {
        self.hue = clamp_value(self.hue, -100.0, 100.0);
        self.saturation = clamp_value(self.saturation, -100.0, 100.0);
        self.luminance = clamp_value(self.luminance, -100.0, 100.0);
    }

    pub fn is_neutral(&self) -> bool {
        self.hue == 0.0 && self.saturation == 0.0 && self.luminance == 0.0
    }
}

/// HSL deltas keyed by band name.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HslAdjustments {
    pub red: HslValues,
    pub orange: HslValues,
    pub yellow: HslValues,
    pub green: HslValues,
    pub aqua: HslValues,
    pub blue: HslValues,
    pub purple: HslValues,
    pub magenta: HslValues,
}

impl HslAdjustments {
    pub fn band(&self, band: HueBand) -> &HslValues {
        match band {
            HueBand::Red => &self.red,
            HueBand::Orange => &self.orange,
            HueBand::Yellow => &self.yellow,
            HueBand::Green => &self.green,
            HueBand::Aqua => &self.aqua,
            HueBand::Blue => &self.blue,
            HueBand::Purple => &self.purple,
            HueBand::Magenta => &self.magenta,
        }
    }

    pub fn band_mut(&mut self, band: HueBand) -> &mut HslValues {
        match band {
            HueBand::Red => &mut self.red,
            HueBand::Orange => &mut self.orange,
            HueBand::Yellow => &mut self.yellow,
            HueBand::Green => &mut self.green,
            HueBand::Aqua => &mut self.aqua,
            HueBand::Blue => &mut self.blue,
            HueBand::Purple => &mut self.purple,
            HueBand::Magenta => &mut self.magenta,
        }
    }

    /// Bands in hue order, as indexed by [`HueBand::index`].
    pub fn bands(&self) -> [HslValues; 8] {
        HueBand::ALL.map(|b| *self.band(b))
    }

    pub fn is_neutral(&self) -> bool {
        HueBand::ALL.iter().all(|&b| self.band(b).is_neutral())
    }

    pub fn clamp_ranges(&mut self) {
        for band in HueBand::ALL {
            self.band_mut(band).clamp_ranges();
        }
    }
}

/// A color wheel: tint hue in degrees, tint strength, luminance offset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorWheel {
    pub hue: f32,
    pub saturation: f32,
    pub luminance: f32,
}

impl ColorWheel {
    pub fn clamp_ranges(&mut self) {
        self.hue = clamp_value(self.hue, 0.0, 360.0);
        self.saturation = clamp_value(self.saturation, 0.0, 100.0);
        self.luminance = clamp_value(self.luminance, -100.0, 100.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelKind {
    Shadows,
    Midtones,
    Highlights,
    Global,
}

impl WheelKind {
    pub const ALL: [WheelKind; 4] = [
        Self::Shadows,
        Self::Midtones,
        Self::Highlights,
        Self::Global,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorGradingState {
    pub shadows: ColorWheel,
    pub midtones: ColorWheel,
    pub highlights: ColorWheel,
    pub global: ColorWheel,
    pub blending: f32,
    pub balance: f32,
}

impl Default for ColorGradingState {
    fn default() -> Self {
        Self {
            shadows: ColorWheel::default(),
            midtones: ColorWheel::default(),
            highlights: ColorWheel::default(),
            global: ColorWheel::default(),
            blending: 50.0,
            balance: 0.0,
        }
    }
}

impl ColorGradingState {
    pub fn wheel(&self, kind: WheelKind) -> &ColorWheel {
        match kind {
            WheelKind::Shadows => &self.shadows,
            WheelKind::Midtones => &self.midtones,
            WheelKind::Highlights => &self.highlights,
            WheelKind::Global => &self.global,
        }
    }

    pub fn wheel_mut(&mut self, kind: WheelKind) -> &mut ColorWheel {
        match kind {
            WheelKind::Shadows => &mut self.shadows,
            WheelKind::Midtones => &mut self.midtones,
            WheelKind::Highlights => &mut self.highlights,
            WheelKind::Global => &mut self.global,
        }
    }

    pub fn clamp_ranges(&mut self) {
        for kind in WheelKind::ALL {
            self.wheel_mut(kind).clamp_ranges();
        }
        self.blending = clamp_value(self.blending, 0.0, 100.0);
        self.balance = clamp_value(self.balance, -100.0, 100.0);
    }
}
