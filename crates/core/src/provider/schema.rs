use serde::Deserialize;
use serde_json::{json, Value};

use super::{ProviderError, ProviderReport};
use crate::{AttributionSource, MandalaConfiguration, ShapeType, WeatherReading};

/// Shape of the structuring call's answer: exactly these two members.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StructuredReport {
    weather_data: WeatherReading,
    mandala_config: MandalaConfiguration,
}

/// `responseSchema` sent with the structuring request.
pub fn response_schema() -> Value {
    let shapes: Vec<&str> = ShapeType::ALL.iter().map(|shape| shape.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "weatherData": {
                "type": "OBJECT",
                "properties": {
                    "temperature": { "type": "NUMBER", "description": "Temperature in Celsius" },
                    "humidity": { "type": "NUMBER", "description": "Humidity percentage 0-100" },
                    "windSpeed": { "type": "NUMBER", "description": "Wind speed in km/h" },
                    "condition": { "type": "STRING", "description": "Short condition e.g., Sunny" },
                    "locationName": { "type": "STRING", "description": "Detected city or region name" },
                    "description": { "type": "STRING", "description": "A poetic one sentence summary of the mood" }
                },
                "required": ["temperature", "humidity", "windSpeed", "condition", "locationName", "description"]
            },
            "mandalaConfig": {
                "type": "OBJECT",
                "properties": {
                    "colors": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": "Array of 5 hex color codes matching the weather mood"
                    },
                    "shapeType": {
                        "type": "STRING",
                        "enum": shapes,
                        "description": "The primary shape used in the mandala"
                    },
                    "layerCount": { "type": "NUMBER", "description": "Integer 3-12" },
                    "rotationSpeed": { "type": "NUMBER", "description": "Float 0.0-10.0" },
                    "complexity": { "type": "NUMBER", "description": "Integer 1-10" },
                    "strokeWidth": { "type": "NUMBER", "description": "Float 0.5-5.0" }
                },
                "required": ["colors", "shapeType", "layerCount", "rotationSpeed", "complexity", "strokeWidth"]
            }
        },
        "required": ["weatherData", "mandalaConfig"]
    })
}

/// Parses the structuring call's JSON text. Any deviation from the schema,
/// including out-of-range mandala values, is a hard failure.
pub fn parse_report_json(
    raw: &str,
    sources: Vec<AttributionSource>,
) -> Result<ProviderReport, ProviderError> {
    let structured: StructuredReport = serde_json::from_str(raw.trim()).map_err(|err| {
        if err.is_data() {
            ProviderError::SchemaViolation(err.to_string())
        } else {
            ProviderError::Json(err)
        }
    })?;

    structured.mandala_config.validate()?;

    Ok(ProviderReport {
        weather: structured.weather_data,
        mandala: structured.mandala_config,
        sources,
    })
}
