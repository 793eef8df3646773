//! Session state machine and the shell that owns it.
//!
//! The state is a plain value replaced wholesale on every transition and
//! published through a `watch` channel, so every other component works from
//! an immutable snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::{
    device::LocationSource,
    provider::{ProviderReport, WeatherMandalaProvider},
    AttributionSource, ClimaMandalaError, MandalaConfiguration, WeatherReading,
};

/// Attributions shown alongside the experience.
pub const MAX_ATTRIBUTIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Intro,
    Locating,
    Analyzing,
    Experience,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub step: Step,
    pub error: Option<String>,
    pub weather: Option<WeatherReading>,
    pub mandala: Option<MandalaConfiguration>,
    pub sources: Vec<AttributionSource>,
    pub loading: bool,
    /// Informational overlay, only meaningful during the experience.
    pub show_info: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::intro()
    }
}

impl SessionState {
    pub fn intro() -> Self {
        Self {
            step: Step::Intro,
            error: None,
            weather: None,
            mandala: None,
            sources: Vec::new(),
            loading: false,
            show_info: false,
        }
    }

    pub fn locating() -> Self {
        Self {
            step: Step::Locating,
            loading: true,
            ..Self::intro()
        }
    }

    pub fn analyzing() -> Self {
        Self {
            step: Step::Analyzing,
            loading: true,
            ..Self::intro()
        }
    }

    /// Weather and mandala only ever enter the state together, here.
    pub fn experience(report: ProviderReport) -> Self {
        Self {
            step: Step::Experience,
            weather: Some(report.weather),
            mandala: Some(report.mandala),
            sources: report.sources,
            ..Self::intro()
        }
    }

    /// Back to intro with `message` attached and no session data.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::intro()
        }
    }

    pub fn is_experience(&self) -> bool {
        self.step == Step::Experience && self.weather.is_some() && self.mandala.is_some()
    }

    pub fn attribution(&self) -> &[AttributionSource] {
        &self.sources[..self.sources.len().min(MAX_ATTRIBUTIONS)]
    }
}

/// Owns the [`SessionState`] and drives it through
/// intro → locating → analyzing → experience.
///
/// Each `start` or `reset` opens a new request generation. A provider answer
/// is only applied while its generation is still current, so a reset during
/// an in-flight call discards the late result.
pub struct Shell<L, P> {
    location: L,
    provider: P,
    state: watch::Sender<SessionState>,
    generation: AtomicU64,
}

impl<L, P> Shell<L, P>
where
    L: LocationSource,
    P: WeatherMandalaProvider,
{
    pub fn new(location: L, provider: P) -> Self {
        let (state, _) = watch::channel(SessionState::intro());
        Self {
            location,
            provider,
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Runs one full session attempt and returns the resulting snapshot.
    /// Failures are terminal for the attempt and land back in intro.
    pub async fn start(&self) -> SessionState {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(generation, "starting experience");
        self.apply(generation, SessionState::locating());

        if !self.location.is_supported() {
            return self.fail(generation, ClimaMandalaError::GeolocationUnsupported);
        }

        let position = match self.location.current_position().await {
            Ok(position) => position,
            Err(err) => return self.fail(generation, err),
        };

        if !self.apply(generation, SessionState::analyzing()) {
            return self.snapshot();
        }

        match self.provider.fetch_weather_and_mandala(position).await {
            Ok(report) => {
                self.apply(generation, SessionState::experience(report));
            }
            Err(err) => {
                error!(error = %err, "weather provider failed");
                return self.fail(generation, ClimaMandalaError::Provider(err));
            }
        }

        self.snapshot()
    }

    /// Any state → intro. Clears session data and invalidates in-flight work.
    pub fn reset(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(generation, "session reset");
        self.state.send_replace(SessionState::intro());
    }

    /// Flips the info overlay during the experience. Returns the new value.
    pub fn toggle_info(&self) -> bool {
        let mut shown = false;
        self.state.send_if_modified(|state| {
            if !state.is_experience() {
                return false;
            }
            *state = SessionState {
                show_info: !state.show_info,
                ..state.clone()
            };
            shown = state.show_info;
            true
        });
        shown
    }

    pub fn attribution(&self) -> Vec<AttributionSource> {
        self.state.borrow().attribution().to_vec()
    }

    fn fail(&self, generation: u64, err: ClimaMandalaError) -> SessionState {
        let message = err.user_message();
        info!(generation, %message, "session attempt failed");
        self.apply(generation, SessionState::failed(message));
        self.snapshot()
    }

    /// Replaces the state if `generation` is still current.
    fn apply(&self, generation: u64, next: SessionState) -> bool {
        let step = next.step;
        let applied = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = next;
            true
        });

        if applied {
            debug!(generation, ?step, "session transition");
        } else {
            debug!(generation, ?step, "discarding stale session transition");
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::{
        device::{FixedLocation, NoGeolocation},
        error::PROVIDER_FAILURE_MESSAGE,
        provider::{schema, ProviderError},
        Position, Result, ShapeType,
    };

    fn report(sources: usize) -> ProviderReport {
        ProviderReport {
            weather: WeatherReading {
                temperature: 12.0,
                humidity: 88.0,
                wind_speed: 40.0,
                condition: "Rain".into(),
                location_name: "Bergen".into(),
                description: "Silver rain over the harbour.".into(),
            },
            mandala: MandalaConfiguration {
                colors: vec!["#00bcd4".into(), "#3f51b5".into()],
                shape_type: ShapeType::Petal,
                layer_count: 6,
                rotation_speed: 8.0,
                complexity: 4,
                stroke_width: 3.0,
            },
            sources: (0..sources)
                .map(|i| AttributionSource {
                    title: format!("Source {i}"),
                    uri: format!("https://example.org/{i}"),
                })
                .collect(),
        }
    }

    struct ScriptedProvider {
        answer: Mutex<Option<std::result::Result<ProviderReport, ProviderError>>>,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedProvider {
        fn new(answer: std::result::Result<ProviderReport, ProviderError>) -> Self {
            Self {
                answer: Mutex::new(Some(answer)),
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }
    }

    #[async_trait]
    impl WeatherMandalaProvider for ScriptedProvider {
        async fn fetch_weather_and_mandala(
            &self,
            _position: Position,
        ) -> std::result::Result<ProviderReport, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let answer = self.answer.lock().unwrap().take();
            answer.unwrap_or(Err(ProviderError::EmptyResponse))
        }
    }

    struct DeniedLocation;

    #[async_trait]
    impl LocationSource for DeniedLocation {
        fn is_supported(&self) -> bool {
            true
        }

        async fn current_position(&self) -> Result<Position> {
            Err(ClimaMandalaError::LocationDenied)
        }
    }

    fn here() -> FixedLocation {
        FixedLocation(Position::new(60.39, 5.32))
    }

    #[test]
    fn constructors_keep_weather_and_mandala_paired() {
        for state in [
            SessionState::intro(),
            SessionState::locating(),
            SessionState::analyzing(),
            SessionState::failed("nope"),
        ] {
            assert!(state.weather.is_none() && state.mandala.is_none());
        }

        let state = SessionState::experience(report(0));
        assert!(state.weather.is_some() && state.mandala.is_some());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn successful_start_enters_experience() {
        let shell = Shell::new(here(), ScriptedProvider::new(Ok(report(3))));
        let state = shell.start().await;

        assert_eq!(state.step, Step::Experience);
        assert!(state.is_experience());
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(shell.attribution().len(), MAX_ATTRIBUTIONS);
    }

    #[tokio::test]
    async fn schema_violation_returns_to_intro_without_data() {
        let raw = r##"{
            "weatherData": {"temperature": 20, "humidity": 50, "windSpeed": 5,
                "condition": "Clear", "locationName": "Quito", "description": "Still air."},
            "mandalaConfig": {"colors": ["#fff"], "shapeType": "circle",
                "rotationSpeed": 1, "complexity": 2, "strokeWidth": 1}
        }"##;
        let answer = schema::parse_report_json(raw, Vec::new());
        assert!(answer.is_err());

        let shell = Shell::new(here(), ScriptedProvider::new(answer));
        let state = shell.start().await;

        assert_eq!(state.step, Step::Intro);
        assert_eq!(state.error.as_deref(), Some(PROVIDER_FAILURE_MESSAGE));
        assert!(state.weather.is_none());
        assert!(state.mandala.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn denied_location_skips_the_provider() {
        let shell = Shell::new(DeniedLocation, ScriptedProvider::new(Ok(report(0))));
        let state = shell.start().await;

        assert_eq!(state.step, Step::Intro);
        assert_eq!(
            state.error.as_deref(),
            Some(ClimaMandalaError::LocationDenied.user_message().as_str())
        );
        assert_eq!(shell.provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_geolocation_skips_the_provider() {
        let shell = Shell::new(NoGeolocation, ScriptedProvider::new(Ok(report(0))));
        let state = shell.start().await;

        assert_eq!(state.step, Step::Intro);
        assert!(state.error.unwrap().contains("not supported"));
        assert_eq!(shell.provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn next_start_clears_the_previous_error() {
        let provider = ScriptedProvider::new(Err(ProviderError::EmptyResponse));
        let shell = Shell::new(here(), provider);
        assert!(shell.start().await.error.is_some());

        *shell.provider.answer.lock().unwrap() = Some(Ok(report(1)));
        let state = shell.start().await;
        assert!(state.error.is_none());
        assert_eq!(state.step, Step::Experience);
    }

    #[tokio::test]
    async fn reset_and_info_toggle() {
        let shell = Shell::new(here(), ScriptedProvider::new(Ok(report(1))));
        assert!(!shell.toggle_info(), "toggle is inert outside the experience");

        shell.start().await;
        assert!(shell.toggle_info());
        assert!(shell.snapshot().show_info);
        assert!(!shell.toggle_info());

        shell.reset();
        let state = shell.snapshot();
        assert_eq!(state, SessionState::intro());
    }

    #[tokio::test]
    async fn reset_during_flight_discards_the_late_result() {
        let gate = Arc::new(Notify::new());
        let shell = Arc::new(Shell::new(
            here(),
            ScriptedProvider::new(Ok(report(1))).gated(gate.clone()),
        ));
        let mut states = shell.subscribe();

        let running = tokio::spawn({
            let shell = shell.clone();
            async move { shell.start().await }
        });

        states
            .wait_for(|state| state.step == Step::Analyzing)
            .await
            .unwrap();
        shell.reset();
        gate.notify_one();

        let final_state = running.await.unwrap();
        assert_eq!(final_state, SessionState::intro());
        assert_eq!(shell.snapshot(), SessionState::intro());
    }
}
