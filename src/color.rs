use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.6);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Categorical colours: score category → Color32
// ---------------------------------------------------------------------------

/// Maps the unique values of a text column to distinct colours.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl CategoryColors {
    /// Build the mapping from the sorted unique values.
    pub fn new<'a>(values: impl IntoIterator<Item = &'a String>) -> Self {
        let values: Vec<&String> = values.into_iter().collect();
        let palette = generate_palette(values.len());
        let mapping = values
            .into_iter()
            .zip(palette)
            .map(|(v, c)| (v.clone(), c))
            .collect();

        CategoryColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &str) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Continuous scales: value in [0, 1] → Color32
// ---------------------------------------------------------------------------

/// Piecewise-linear gradient, interpolated in linear RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    Viridis,
    Plasma,
    Greens,
    Oranges,
    /// Diverging red → white → blue, for correlations in [-1, 1].
    RdBu,
}

impl ColorScale {
    fn stops(self) -> &'static [(u8, u8, u8)] {
        match self {
            ColorScale::Viridis => &[
                (68, 1, 84),
                (59, 82, 139),
                (33, 145, 140),
                (94, 201, 98),
                (253, 231, 37),
            ],
            ColorScale::Plasma => &[
                (13, 8, 135),
                (126, 3, 168),
                (204, 71, 120),
                (248, 149, 64),
                (240, 249, 33),
            ],
            ColorScale::Greens => &[(199, 233, 192), (116, 196, 118), (0, 109, 44)],
            ColorScale::Oranges => &[(253, 208, 162), (253, 141, 60), (166, 54, 3)],
            ColorScale::RdBu => &[(178, 24, 43), (247, 247, 247), (33, 102, 172)],
        }
    }

    /// Colour at `t`, clamped to `[0, 1]`. NaN maps to the first stop.
    pub fn sample(self, t: f64) -> Color32 {
        let stops = self.stops();
        let t = (if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }) as f32;
        let scaled = t * (stops.len() - 1) as f32;
        let lo = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - lo as f32;

        let linear = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
            Srgb::<u8>::new(r, g, b).into_format::<f32>().into_linear()
        };
        let mixed = linear(stops[lo]).mix(linear(stops[lo + 1]), frac);
        to_color32(Srgb::from_linear(mixed))
    }

    /// Colour for `value` normalised into `[min, max]`.
    pub fn sample_range(self, value: f64, min: f64, max: f64) -> Color32 {
        let span = max - min;
        if span <= 0.0 {
            return self.sample(0.5);
        }
        self.sample((value - min) / span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[1]);
    }

    #[test]
    fn category_colors_fall_back_to_gray() {
        let values = vec!["High".to_string(), "Low".to_string()];
        let colors = CategoryColors::new(&values);
        assert_ne!(colors.color_for("High"), colors.color_for("Low"));
        assert_eq!(colors.color_for("Unknown"), Color32::GRAY);
    }

    #[test]
    fn scale_endpoints_match_stops() {
        assert_eq!(ColorScale::Viridis.sample(0.0), Color32::from_rgb(68, 1, 84));
        assert_eq!(ColorScale::Viridis.sample(1.0), Color32::from_rgb(253, 231, 37));
        assert_eq!(ColorScale::Viridis.sample(7.0), ColorScale::Viridis.sample(1.0));
        assert_eq!(ColorScale::RdBu.sample_range(0.0, -1.0, 1.0), Color32::from_rgb(247, 247, 247));
        assert_eq!(ColorScale::Greens.sample_range(3.0, 3.0, 3.0), ColorScale::Greens.sample(0.5));
    }
}
