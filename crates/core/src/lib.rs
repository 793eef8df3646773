//! Core library for ClimaMandala.
//!
//! A session reads the device position, asks a generative provider to
//! describe the local weather and to propose a mandala configuration for it,
//! then renders the mandala as an animated set of layered radial outlines.
//! Each module owns one piece of that flow: the data model, procedural
//! geometry and SVG output, the animation timeline, the provider seam and
//! its Gemini client, device seams, and the session shell.

pub mod config;
pub mod device;
pub mod error;
pub mod mapping;
pub mod model;
pub mod provider;
pub mod record;
pub mod render;
pub mod session;
pub mod stats;
pub mod timeline;

pub use config::{AppConfig, CameraConfig, ProviderConfig, RenderConfig};
pub use device::{
    CameraFeed, CameraStatus, CameraSurface, FixedLocation, LocationSource, NoCamera,
    NoGeolocation,
};
pub use error::{ClimaMandalaError, Result};
pub use mapping::ColorScale;
pub use model::{AttributionSource, MandalaConfiguration, Position, ShapeType, WeatherReading};
pub use provider::{GeminiProvider, ProviderError, ProviderReport, WeatherMandalaProvider};
pub use record::{Recorder, RecordingSettings};
pub use render::{MandalaRenderer, MandalaScene, Viewport};
pub use session::{SessionState, Shell, Step};
pub use stats::WeatherStats;
pub use timeline::{AnimationFrame, AnimationTimer, Animator, PlaybackClock};
