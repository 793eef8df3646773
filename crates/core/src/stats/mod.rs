use std::fmt;

use crate::{mapping::FALLBACK_COLOR, MandalaConfiguration, WeatherReading};

const BAR_CELLS: usize = 20;

/// Single horizontal bar of the stats panel.
#[derive(Debug, Clone, PartialEq)]
pub struct StatBar {
    pub label: &'static str,
    pub value: f64,
    pub max: f64,
    pub color: String,
}

impl StatBar {
    /// Filled share of the bar, clamped to `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.value / self.max).clamp(0.0, 1.0)
    }
}

/// Compact weather summary shown under the mandala.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherStats {
    pub location: String,
    pub description: String,
    pub condition: String,
    pub bars: Vec<StatBar>,
}

impl WeatherStats {
    pub fn new(weather: &WeatherReading, mandala: &MandalaConfiguration) -> Self {
        let readings = [
            ("Temp", weather.temperature, 50.0),
            ("Wind", weather.wind_speed, 100.0),
            ("Humidity", weather.humidity, 100.0),
        ];

        let bars = readings
            .into_iter()
            .enumerate()
            .map(|(index, (label, value, max))| StatBar {
                label,
                value,
                max,
                color: match mandala.colors.len() {
                    0 => FALLBACK_COLOR.to_string(),
                    len => mandala.colors[index % len].clone(),
                },
            })
            .collect();

        Self {
            location: weather.location_name.clone(),
            description: weather.description.clone(),
            condition: weather.condition.clone(),
            bars,
        }
    }
}

impl fmt::Display for WeatherStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.location, self.condition)?;
        writeln!(f, "  {}", self.description)?;
        for bar in &self.bars {
            let filled = (bar.fraction() * BAR_CELLS as f64).round() as usize;
            writeln!(
                f,
                "  {:<8} {}{} {:>6.1} {}",
                bar.label,
                "#".repeat(filled),
                ".".repeat(BAR_CELLS - filled),
                bar.value,
                bar.color
            )?;
        }
        Ok(())
    }
}
