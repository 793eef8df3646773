//! Google Gemini implementation of [`WeatherMandalaProvider`].
//!
//! A session costs two sequential `generateContent` calls: a search-grounded
//! question about the current weather, then a schema-constrained call that
//! turns the free-text answer into `weatherData` + `mandalaConfig`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{schema, ProviderError, ProviderReport, WeatherMandalaProvider};
use crate::{config::ProviderConfig, AttributionSource, Position};

const DEFAULT_SOURCE_TITLE: &str = "Web source";
const DEFAULT_SOURCE_URI: &str = "#";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct WebChunk {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uri: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }

    fn sources(&self) -> Vec<AttributionSource> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.grounding_metadata.as_ref())
            .map(|metadata| {
                metadata
                    .grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.as_ref())
                    .map(|web| AttributionSource {
                        title: web
                            .title
                            .clone()
                            .filter(|title| !title.is_empty())
                            .unwrap_or_else(|| DEFAULT_SOURCE_TITLE.to_string()),
                        uri: web
                            .uri
                            .clone()
                            .filter(|uri| !uri.is_empty())
                            .unwrap_or_else(|| DEFAULT_SOURCE_URI.to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    config: ProviderConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        if config.api_key.is_empty() {
            return Err(ProviderError::MissingCredential);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate(
        &self,
        request: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let url = self.endpoint();
        debug!(%url, "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "generateContent answered");

        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Stage one: free-text weather report plus its grounding sources.
    async fn grounded_weather(
        &self,
        position: Position,
    ) -> Result<(String, Vec<AttributionSource>), ProviderError> {
        let prompt = weather_prompt(position);
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
            tools: Some(vec![Tool {
                google_search: GoogleSearch {},
            }]),
            generation_config: None,
        };

        let response = self.generate(&request).await?;
        let text = response.text().ok_or(ProviderError::EmptyResponse)?;
        Ok((text, response.sources()))
    }

    /// Stage two: schema-constrained structuring of the report.
    async fn structure(
        &self,
        report: &str,
        sources: Vec<AttributionSource>,
    ) -> Result<ProviderReport, ProviderError> {
        let prompt = structuring_prompt(report);
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
            tools: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema::response_schema(),
            }),
        };

        let response = self.generate(&request).await?;
        let raw = response.text().ok_or(ProviderError::EmptyResponse)?;
        schema::parse_report_json(&raw, sources)
    }
}

#[async_trait]
impl WeatherMandalaProvider for GeminiProvider {
    async fn fetch_weather_and_mandala(
        &self,
        position: Position,
    ) -> Result<ProviderReport, ProviderError> {
        info!(
            lat = position.latitude,
            lng = position.longitude,
            model = %self.config.model,
            "requesting weather and mandala"
        );

        let (report, sources) = self.grounded_weather(position).await?;
        debug!(sources = sources.len(), "grounded weather report received");

        let result = self.structure(&report, sources).await?;
        info!(
            location = %result.weather.location_name,
            shape = result.mandala.shape_type.as_str(),
            layers = result.mandala.layer_count,
            "mandala configuration ready"
        );
        Ok(result)
    }
}

pub(crate) fn weather_prompt(position: Position) -> String {
    format!(
        "What is the exact current weather at latitude {lat}, longitude {lng}? \
         Give me the temperature (C), humidity (%), wind speed (km/h) and a short \
         description of the conditions (e.g. Sunny, Rain). Also tell me the name \
         of the city or region.",
        lat = position.latitude,
        lng = position.longitude,
    )
}

pub(crate) fn structuring_prompt(report: &str) -> String {
    format!(
        "Analyze the following weather report and produce two JSON objects: one \
         with the numeric weather data and one with the artistic configuration \
         for a mandala that represents that weather.\n\n\
         Weather report: \"{report}\"\n\n\
         Mandala rules:\n\
         - If it is hot (>25C), use warm colors (reds, oranges). If it is cold, blues and cyans.\n\
         - If it is very windy, rotationSpeed must be high (max 10).\n\
         - If humidity is high, use a thicker strokeWidth and softer shapes (circle, petal).\n\
         - If the weather is chaotic (storm), use 'triangle' and high complexity.\n\
         - Return exactly 5 hex colors."
    )
}
