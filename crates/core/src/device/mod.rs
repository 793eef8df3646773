//! Seams for the device capabilities the experience depends on.
//!
//! Geolocation and camera capture are platform services; the core only sees
//! these traits. The bundled implementations cover headless use: a fixed
//! position, no geolocation at all, and no camera.

use async_trait::async_trait;

use crate::{config::CameraConfig, ClimaMandalaError, Position, Result};

/// Text shown in place of the camera layer when no stream is available.
pub const CAMERA_UNAVAILABLE_TITLE: &str = "Camera unavailable";
pub const CAMERA_UNAVAILABLE_HINT: &str =
    "The augmented reality view needs camera access. Please check your browser permissions.";

/// One-shot position provider.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Whether the platform offers geolocation at all.
    fn is_supported(&self) -> bool;

    /// Requests a single position fix. Denial surfaces as
    /// [`ClimaMandalaError::LocationDenied`].
    async fn current_position(&self) -> Result<Position>;
}

/// Always answers with the same coordinates.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Position);

#[async_trait]
impl LocationSource for FixedLocation {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Position> {
        Ok(self.0)
    }
}

/// Platform without geolocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl LocationSource for NoGeolocation {
    fn is_supported(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<Position> {
        Err(ClimaMandalaError::GeolocationUnsupported)
    }
}

/// Handle to an acquired video stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraStream {
    pub id: String,
    pub width: u32,
    pub height: u32,
}

#[async_trait]
pub trait CameraSurface: Send {
    /// Opens a stream honouring `constraints` as closely as possible.
    async fn acquire(&mut self, constraints: &CameraConfig) -> Result<CameraStream>;

    /// Stops every track of `stream`.
    fn release(&mut self, stream: CameraStream);
}

/// Device with no camera.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCamera;

#[async_trait]
impl CameraSurface for NoCamera {
    async fn acquire(&mut self, _constraints: &CameraConfig) -> Result<CameraStream> {
        Err(ClimaMandalaError::CameraUnavailable(
            "no video input device".to_string(),
        ))
    }

    fn release(&mut self, _stream: CameraStream) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraStatus {
    Idle,
    Live(CameraStream),
    Unavailable { title: String, hint: String },
}

/// Camera layer of the experience. Failures never propagate: they switch the
/// feed to [`CameraStatus::Unavailable`] and the rest keeps running.
#[derive(Debug)]
pub struct CameraFeed<S: CameraSurface> {
    surface: S,
    constraints: CameraConfig,
    status: CameraStatus,
}

impl<S: CameraSurface> CameraFeed<S> {
    pub fn new(surface: S, constraints: CameraConfig) -> Self {
        Self {
            surface,
            constraints,
            status: CameraStatus::Idle,
        }
    }

    pub async fn start(&mut self) -> &CameraStatus {
        if let CameraStatus::Live(_) = self.status {
            return &self.status;
        }

        self.status = match self.surface.acquire(&self.constraints).await {
            Ok(stream) => {
                tracing::info!(id = %stream.id, width = stream.width, height = stream.height, "camera stream live");
                CameraStatus::Live(stream)
            }
            Err(err) => {
                tracing::error!(error = %err, "error accessing camera");
                CameraStatus::Unavailable {
                    title: CAMERA_UNAVAILABLE_TITLE.to_string(),
                    hint: CAMERA_UNAVAILABLE_HINT.to_string(),
                }
            }
        };
        &self.status
    }

    pub fn status(&self) -> &CameraStatus {
        &self.status
    }

    pub fn is_live(&self) -> bool {
        matches!(self.status, CameraStatus::Live(_))
    }

    /// Releases the stream, if any. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let CameraStatus::Live(stream) = std::mem::replace(&mut self.status, CameraStatus::Idle) {
            tracing::debug!(id = %stream.id, "releasing camera stream");
            self.surface.release(stream);
        }
    }
}

impl<S: CameraSurface> Drop for CameraFeed<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;
    use crate::config::FacingMode;

    #[derive(Default)]
    struct FakeCamera {
        deny: bool,
        released: Arc<AtomicUsize>,
        last_constraints: Option<CameraConfig>,
    }

    #[async_trait]
    impl CameraSurface for FakeCamera {
        async fn acquire(&mut self, constraints: &CameraConfig) -> Result<CameraStream> {
            self.last_constraints = Some(constraints.clone());
            if self.deny {
                return Err(ClimaMandalaError::CameraDenied);
            }
            Ok(CameraStream {
                id: "rear-0".into(),
                width: constraints.ideal_width,
                height: constraints.ideal_height,
            })
        }

        fn release(&mut self, _stream: CameraStream) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn fixed_location_answers_its_position() {
        let source = FixedLocation(Position::new(1.5, 2.5));
        assert!(source.is_supported());
        assert_eq!(source.current_position().await.unwrap(), Position::new(1.5, 2.5));
    }

    #[tokio::test]
    async fn missing_geolocation_is_reported() {
        assert!(!NoGeolocation.is_supported());
        let err = NoGeolocation.current_position().await.unwrap_err();
        assert!(matches!(err, ClimaMandalaError::GeolocationUnsupported));
    }

    #[tokio::test]
    async fn feed_requests_rear_camera_and_releases_on_stop() {
        let released = Arc::new(AtomicUsize::new(0));
        let camera = FakeCamera {
            released: released.clone(),
            ..Default::default()
        };
        let mut feed = CameraFeed::new(camera, CameraConfig::default());

        assert!(matches!(feed.start().await, CameraStatus::Live(_)));
        let constraints = feed.surface.last_constraints.clone().unwrap();
        assert_eq!(constraints.facing_mode, FacingMode::Environment);
        assert_eq!((constraints.ideal_width, constraints.ideal_height), (1920, 1080));

        feed.stop();
        feed.stop();
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert_eq!(feed.status(), &CameraStatus::Idle);
    }

    #[tokio::test]
    async fn denial_shows_the_fixed_message() {
        let camera = FakeCamera {
            deny: true,
            ..Default::default()
        };
        let mut feed = CameraFeed::new(camera, CameraConfig::default());

        match feed.start().await {
            CameraStatus::Unavailable { title, hint } => {
                assert_eq!(title, CAMERA_UNAVAILABLE_TITLE);
                assert_eq!(hint, CAMERA_UNAVAILABLE_HINT);
            }
            other => panic!("unexpected status {other:?}"),
        }
        assert!(!feed.is_live());
    }

    #[tokio::test]
    async fn dropping_the_feed_releases_the_stream() {
        let released = Arc::new(AtomicUsize::new(0));
        {
            let mut feed = CameraFeed::new(
                FakeCamera {
                    released: released.clone(),
                    ..Default::default()
                },
                CameraConfig::default(),
            );
            feed.start().await;
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_camera_is_unavailable() {
        let mut feed = CameraFeed::new(NoCamera, CameraConfig::default());
        assert!(matches!(feed.start().await, CameraStatus::Unavailable { .. }));
    }
}
