//! Weather and mandala provider abstraction.
//!
//! The rest of the crate only sees [`WeatherMandalaProvider`]; the concrete
//! Gemini round trip lives in [`gemini`].

pub mod gemini;
pub mod schema;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{AttributionSource, MandalaConfiguration, Position, WeatherReading};

pub use gemini::GeminiProvider;

/// Everything a successful provider round trip yields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderReport {
    pub weather: WeatherReading,
    pub mandala: MandalaConfiguration,
    pub sources: Vec<AttributionSource>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no provider credential configured")]
    MissingCredential,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("provider returned no usable content")]
    EmptyResponse,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema violation: {0}")]
    SchemaViolation(String),
}

/// Narrow seam between the session and whatever produces weather and a
/// matching mandala for a position.
#[async_trait]
pub trait WeatherMandalaProvider: Send + Sync {
    async fn fetch_weather_and_mandala(
        &self,
        position: Position,
    ) -> Result<ProviderReport, ProviderError>;
}

