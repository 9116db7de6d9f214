use palette::{Hsl, IntoColor, LinSrgba, Mix, Srgb, Srgba};
use serde::Serialize;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Rgba – the color value handed to the presentation layer
// ---------------------------------------------------------------------------

/// An RGBA color: 8-bit channels plus a float opacity, matching the two
/// output forms charts consume (`rgba(...)` strings and hex codes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// CSS `rgba(r,g,b,a)` form, opacity to three decimals.
    pub fn css(&self) -> String {
        format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
    }

    /// `#RRGGBB` form; opacity is not representable here.
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    fn to_linear(self) -> LinSrgba {
        Srgba::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a,
        )
        .into_linear()
    }

    fn from_linear(lin: LinSrgba) -> Self {
        let srgb: Srgba = Srgba::from_linear(lin);
        Self {
            r: (srgb.red * 255.0).round() as u8,
            g: (srgb.green * 255.0).round() as u8,
            b: (srgb.blue * 255.0).round() as u8,
            a: srgb.alpha,
        }
    }

    fn with_opacity_floor(mut self, floor: f32) -> Self {
        self.a = self.a.max(floor);
        self
    }
}

// ---------------------------------------------------------------------------
// Rank-based gradient
// ---------------------------------------------------------------------------

/// Colors for a ranked bar chart: rank 1 gets `highlight`, the remaining
/// ranks fade linearly from `high` down to `low`.
#[derive(Debug, Clone)]
pub struct GradientSpec {
    pub highlight: Rgba,
    pub high: Rgba,
    pub low: Rgba,
    opacity_floor: f32,
}

impl GradientSpec {
    /// `opacity_floor` keeps low ranks visible and must lie in `[0, 1]`.
    pub fn new(highlight: Rgba, high: Rgba, low: Rgba, opacity_floor: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&opacity_floor) {
            return Err(Error::Value(format!(
                "opacity floor {opacity_floor} outside [0, 1]"
            )));
        }
        Ok(Self {
            highlight,
            high,
            low,
            opacity_floor,
        })
    }

    pub fn opacity_floor(&self) -> f32 {
        self.opacity_floor
    }
}

impl Default for GradientSpec {
    /// The ranked-bar convention: red winner, blue fading from 0.95 down to
    /// 0.20 opacity.
    fn default() -> Self {
        Self {
            highlight: Rgba::opaque(255, 0, 0),
            high: Rgba::new(0, 0, 255, 0.95),
            low: Rgba::new(0, 0, 255, 0.20),
            opacity_floor: 0.20,
        }
    }
}

/// One color per rank index; same length and order as the ranked items.
pub type ColorAssignment = Vec<Rgba>;

/// Assign colors to `n` ranked items.
///
/// Index 0 is always `highlight`. Index 1 is exactly `high` and index `n-1`
/// exactly `low`; indices in between interpolate linearly (in linear RGBA)
/// with `t = (i-1)/(n-2)`. For `n == 2` the single gradient index reduces to
/// `high` (the `t = 0` case). Opacity never drops below the configured floor.
pub fn colorize(n: usize, spec: &GradientSpec) -> ColorAssignment {
    let mut colors = Vec::with_capacity(n);
    if n == 0 {
        return colors;
    }
    colors.push(spec.highlight);

    let high = spec.high.to_linear();
    let low = spec.low.to_linear();
    for i in 1..n {
        let color = if i == 1 {
            spec.high
        } else if i == n - 1 {
            spec.low
        } else {
            let t = (i - 1) as f32 / (n - 2) as f32;
            Rgba::from_linear(high.mix(low, t))
        };
        colors.push(color.with_opacity_floor(spec.opacity_floor));
    }
    colors
}

// ---------------------------------------------------------------------------
// Distinct-hue palette (map markers, categorical legends)
// ---------------------------------------------------------------------------

/// `n` visually distinct opaque colors from evenly spaced hues.
pub fn distinct_palette(n: usize) -> Vec<Rgba> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Rgba::opaque(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}
