use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{provider::ProviderError, ClimaMandalaError};

/// Snapshot of the weather at the user's position. Produced once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, 0-100.
    pub humidity: f64,
    /// km/h.
    pub wind_speed: f64,
    pub condition: String,
    pub location_name: String,
    pub description: String,
}

/// Primary outline used for every layer of the mandala.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Circle,
    Triangle,
    Petal,
    Square,
}

impl ShapeType {
    pub const ALL: [ShapeType; 4] = [
        ShapeType::Circle,
        ShapeType::Triangle,
        ShapeType::Petal,
        ShapeType::Square,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeType::Circle => "circle",
            ShapeType::Triangle => "triangle",
            ShapeType::Petal => "petal",
            ShapeType::Square => "square",
        }
    }
}

/// Parameter set driving the generated pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MandalaConfiguration {
    pub colors: Vec<String>,
    pub shape_type: ShapeType,
    #[serde(deserialize_with = "integral")]
    pub layer_count: u32,
    pub rotation_speed: f64,
    #[serde(deserialize_with = "integral")]
    pub complexity: u32,
    pub stroke_width: f64,
}

impl MandalaConfiguration {
    pub const LAYER_RANGE: (u32, u32) = (3, 12);
    pub const ROTATION_RANGE: (f64, f64) = (0.0, 10.0);
    pub const COMPLEXITY_RANGE: (u32, u32) = (1, 10);
    pub const STROKE_RANGE: (f64, f64) = (0.5, 5.0);

    /// Checks the expected ranges. The renderer itself accepts anything; this
    /// is applied where configurations enter the system.
    pub fn validate(&self) -> std::result::Result<(), ProviderError> {
        if self.colors.is_empty() {
            return Err(violation("mandalaConfig.colors must not be empty"));
        }
        if let Some(bad) = self.colors.iter().find(|color| !is_hex_color(color)) {
            return Err(violation(format!(
                "mandalaConfig.colors contains non-hex value `{bad}`"
            )));
        }

        let (min, max) = Self::LAYER_RANGE;
        if !(min..=max).contains(&self.layer_count) {
            return Err(violation(format!(
                "mandalaConfig.layerCount {} outside {min}-{max}",
                self.layer_count
            )));
        }

        let (min, max) = Self::COMPLEXITY_RANGE;
        if !(min..=max).contains(&self.complexity) {
            return Err(violation(format!(
                "mandalaConfig.complexity {} outside {min}-{max}",
                self.complexity
            )));
        }

        let (min, max) = Self::ROTATION_RANGE;
        if !(min..=max).contains(&self.rotation_speed) {
            return Err(violation(format!(
                "mandalaConfig.rotationSpeed {} outside {min}-{max}",
                self.rotation_speed
            )));
        }

        let (min, max) = Self::STROKE_RANGE;
        if !(min..=max).contains(&self.stroke_width) {
            return Err(violation(format!(
                "mandalaConfig.strokeWidth {} outside {min}-{max}",
                self.stroke_width
            )));
        }

        Ok(())
    }

    /// Parses a configuration from JSON without range validation.
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        serde_json::from_str(raw).map_err(ClimaMandalaError::from)
    }
}

/// Attribution returned by the grounded weather query. Display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionSource {
    pub title: String,
    pub uri: String,
}

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

fn violation(msg: impl Into<String>) -> ProviderError {
    ProviderError::SchemaViolation(msg.into())
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(digits) => {
            matches!(digits.len(), 3 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// Accepts `5` as well as `5.0`; JSON schema "NUMBER" fields often arrive as
/// floats.
fn integral<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        return Err(de::Error::custom(format!(
            "expected a non-negative integer, found {value}"
        )));
    }
    Ok(value as u32)
}
