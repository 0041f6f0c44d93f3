// RGB colors and the prime-limit palette.
//
// Every matched interval is colored by its prime limit: octaves white, 3-limit
// green, 5-limit yellow, 7-limit coral, 11-limit purple, 13-limit blue.
// Anything above 13 collapses to a flat neutral gray. The heatmap fades
// from black toward these colors by harmonic strength.
//
// See also: `config.rs` which owns the palette as part of `EngineConfig`,
// `heatmap.rs` for the fades, `filters.rs` for the matching filter buckets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An 8-bit-per-channel color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation toward `to` by `t`, rounded per channel and
    /// clamped to [0, 255]. `t` outside [0, 1] extrapolates before clamping.
    pub fn lerp(self, to: Rgb, t: f64) -> Rgb {
        let channel = |a: u8, b: u8| -> u8 {
            let v = (a as f64 + (b as f64 - a as f64) * t).round();
            if v.is_nan() { a } else { v.clamp(0.0, 255.0) as u8 }
        };
        Rgb {
            r: channel(self.r, to.r),
            g: channel(self.g, to.g),
            b: channel(self.b, to.b),
        }
    }

    /// Mean of the three channels.
    pub fn brightness(self) -> f64 {
        (self.r as f64 + self.g as f64 + self.b as f64) / 3.0
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Prime limit → display color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LimitPalette {
    /// Explicit colors keyed by prime limit (1, 3, 5, 7, 11, 13).
    pub colors: BTreeMap<u64, Rgb>,
    /// Color for any limit above `complex_above`.
    pub complex: Rgb,
    /// Limits strictly above this collapse to `complex`.
    pub complex_above: u64,
    /// Color for a limit at or below `complex_above` that has no entry.
    pub fallback: Rgb,
    /// Legend swatch for the "above the table" bucket.
    pub legend_complex: Rgb,
}

impl LimitPalette {
    /// Color for a prime limit.
    pub fn color_for(&self, limit: u64) -> Rgb {
        if limit > self.complex_above {
            return self.complex;
        }
        self.colors.get(&limit).copied().unwrap_or(self.fallback)
    }

    /// Swatch for a legend/filter bucket (see `filters::limit_bucket`).
    pub fn legend_color(&self, bucket: u64) -> Rgb {
        if bucket > self.complex_above {
            return self.legend_complex;
        }
        self.colors.get(&bucket).copied().unwrap_or(self.legend_complex)
    }
}

impl Default for LimitPalette {
    fn default() -> Self {
        let colors = BTreeMap::from([
            (1, Rgb::new(255, 255, 255)),
            (3, Rgb::new(120, 220, 120)),
            (5, Rgb::new(255, 200, 90)),
            (7, Rgb::new(255, 120, 90)),
            (11, Rgb::new(180, 100, 255)),
            (13, Rgb::new(90, 150, 255)),
        ]);
        Self {
            colors,
            complex: Rgb::new(180, 180, 180),
            complex_above: 13,
            fallback: Rgb::new(150, 150, 150),
            legend_complex: Rgb::new(120, 120, 120),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints() {
        let c = Rgb::new(120, 220, 120);
        assert_eq!(Rgb::BLACK.lerp(c, 0.0), Rgb::BLACK);
        assert_eq!(Rgb::BLACK.lerp(c, 1.0), c);
        assert_eq!(Rgb::BLACK.lerp(c, 0.5), Rgb::new(60, 110, 60));
    }

    #[test]
    fn lerp_clamps_and_survives_nan() {
        assert_eq!(Rgb::BLACK.lerp(Rgb::WHITE, 2.0), Rgb::WHITE);
        assert_eq!(Rgb::WHITE.lerp(Rgb::BLACK, 2.0), Rgb::BLACK);
        assert_eq!(Rgb::BLACK.lerp(Rgb::WHITE, f64::NAN), Rgb::BLACK);
    }

    #[test]
    fn palette_lookup() {
        let palette = LimitPalette::default();
        assert_eq!(palette.color_for(3), Rgb::new(120, 220, 120));
        assert_eq!(palette.color_for(17), Rgb::new(180, 180, 180));
        assert_eq!(palette.color_for(31), Rgb::new(180, 180, 180));
        // 2/1 approximations have limit 2, which has no swatch.
        assert_eq!(palette.color_for(2), Rgb::new(150, 150, 150));
        assert_eq!(palette.legend_color(17), Rgb::new(120, 120, 120));
    }

    #[test]
    fn display_is_css_like() {
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "rgb(1,2,3)");
    }
}
