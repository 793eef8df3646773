use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    render::{svg::SvgDocument, MandalaScene},
    timeline::{Animator, PlaybackClock},
    Result,
};

/// Configuration options for the snapshot recorder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSettings {
    pub output_dir: PathBuf,
    pub fps: u32,
    pub frames: u32,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("frames"),
            fps: 30,
            frames: 1,
        }
    }
}

/// Writes the animation as a numbered series of SVG snapshots.
#[derive(Debug)]
pub struct Recorder {
    settings: RecordingSettings,
    background: Option<String>,
}

impl Recorder {
    pub fn new(settings: RecordingSettings) -> Self {
        Self {
            settings,
            background: None,
        }
    }

    /// Paints `color` behind every frame, standing in for the camera layer.
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background = Some(color.into());
        self
    }

    pub fn settings(&self) -> &RecordingSettings {
        &self.settings
    }

    /// Renders every frame and returns the written paths in order.
    pub fn capture(&self, scene: &MandalaScene, animator: &Animator) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.settings.output_dir)?;

        let step = std::time::Duration::from_secs_f64(1.0 / self.settings.fps.max(1) as f64);
        let mut clock = PlaybackClock::default();
        let mut written = Vec::with_capacity(self.settings.frames as usize);

        for index in 0..self.settings.frames {
            let frame = animator.frame(clock.elapsed_ms());
            let mut document = SvgDocument::new(scene, &frame);
            if let Some(background) = &self.background {
                document = document.with_background(background);
            }

            let path = frame_path(&self.settings.output_dir, index);
            std::fs::write(&path, document.to_string())?;
            written.push(path);
            clock.advance(step);
        }

        tracing::info!(
            frames = written.len(),
            dir = %self.settings.output_dir.display(),
            "recorded mandala frames"
        );
        Ok(written)
    }
}

fn frame_path(dir: &Path, index: u32) -> PathBuf {
    dir.join(format!("frame_{index:04}.svg"))
}
