use crate::MandalaConfiguration;

/// Colour used when a configuration carries an empty palette.
pub const FALLBACK_COLOR: &str = "#ffffff";

/// Quantize scale mapping a continuous domain onto a discrete colour palette.
///
/// The domain is split into `colors.len()` equal buckets; a value lands in
/// the bucket of the first threshold strictly greater than it. Values outside
/// the domain clamp to the first or last colour.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    thresholds: Vec<f64>,
    colors: Vec<String>,
}

impl ColorScale {
    pub fn quantize(domain: (f64, f64), colors: &[String]) -> Self {
        let (x0, x1) = domain;
        let n = colors.len().saturating_sub(1);
        let thresholds = (0..n)
            .map(|i| {
                let i = i as f64;
                let n = n as f64;
                ((i + 1.0) * x1 - (i - n) * x0) / (n + 1.0)
            })
            .collect();

        Self {
            thresholds,
            colors: colors.to_vec(),
        }
    }

    /// Palette for a mandala: layer indices `[0, layerCount)` over its colours.
    pub fn for_layers(config: &MandalaConfiguration) -> Self {
        Self::quantize((0.0, config.layer_count as f64), &config.colors)
    }

    pub fn color_at(&self, value: f64) -> &str {
        let index = self.thresholds.partition_point(|threshold| *threshold <= value);
        self.colors
            .get(index)
            .map(String::as_str)
            .unwrap_or(FALLBACK_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette(colors: &[&str]) -> Vec<String> {
        colors.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn splits_domain_into_even_buckets() {
        let scale = ColorScale::quantize((0.0, 6.0), &palette(&["#a", "#b", "#c"]));
        let picked: Vec<_> = (0..6).map(|i| scale.color_at(i as f64)).collect();
        assert_eq!(picked, ["#a", "#a", "#b", "#b", "#c", "#c"]);
    }

    #[test]
    fn more_colors_than_layers_skips_some() {
        let colors = palette(&["#1", "#2", "#3", "#4", "#5"]);
        let scale = ColorScale::quantize((0.0, 2.0), &colors);
        assert_eq!(scale.color_at(0.0), "#1");
        assert_eq!(scale.color_at(1.0), "#3");
    }

    #[test]
    fn clamps_outside_domain() {
        let scale = ColorScale::quantize((0.0, 4.0), &palette(&["#a", "#b"]));
        assert_eq!(scale.color_at(-3.0), "#a");
        assert_eq!(scale.color_at(42.0), "#b");
    }

    #[test]
    fn empty_palette_falls_back() {
        let scale = ColorScale::quantize((0.0, 4.0), &[]);
        assert_eq!(scale.color_at(1.0), FALLBACK_COLOR);
    }
}
