use crate::provider::ProviderError;

/// Result alias that carries the custom [`ClimaMandalaError`] type.
pub type Result<T> = std::result::Result<T, ClimaMandalaError>;

/// Text shown for every provider failure. The underlying diagnostic is logged
/// and then dropped.
pub const PROVIDER_FAILURE_MESSAGE: &str = "We couldn't analyze the weather right now.";

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum ClimaMandalaError {
    /// The device exposes no geolocation capability at all.
    #[error("Geolocation is not supported on this device.")]
    GeolocationUnsupported,
    /// The user refused the one-shot position request.
    #[error("Location permission denied. Enable it to continue.")]
    LocationDenied,
    /// The user refused access to the camera.
    #[error("Camera permission denied.")]
    CameraDenied,
    /// No camera exists or the stream could not be opened.
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),
    /// The weather/mandala provider failed (network, JSON or schema).
    #[error("provider failure: {0}")]
    Provider(#[from] ProviderError),
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl ClimaMandalaError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Short human readable text for the intro view. Provider failures are
    /// normalised to [`PROVIDER_FAILURE_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(_) => PROVIDER_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<&str> for ClimaMandalaError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for ClimaMandalaError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_failures_collapse_to_generic_text() {
        let err = ClimaMandalaError::from(ProviderError::SchemaViolation(
            "mandalaConfig.layerCount missing".into(),
        ));

        assert_eq!(err.user_message(), PROVIDER_FAILURE_MESSAGE);
        assert!(err.to_string().contains("layerCount"));
    }

    #[test]
    fn permission_errors_keep_their_text() {
        let err = ClimaMandalaError::LocationDenied;
        assert!(err.user_message().contains("permission denied"));
    }
}
