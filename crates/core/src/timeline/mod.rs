use std::time::Duration;

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use crate::{render::STROKE_BOOST, MandalaConfiguration};

/// Degrees of rotation per millisecond per unit of rotation speed.
pub const ROTATION_RATE: f64 = 0.0005;
/// Phase advance of the stroke pulse per millisecond.
pub const PULSE_RATE: f64 = 0.003;
pub const PULSE_AMPLITUDE: f64 = 2.0;

/// Elapsed-time counter driving the animation.
#[derive(Debug, Default, Clone)]
pub struct PlaybackClock {
    elapsed: Duration,
}

impl PlaybackClock {
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    pub fn advance(&mut self, delta: Duration) {
        self.elapsed += delta;
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Animated properties at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationFrame {
    pub elapsed_ms: f64,
    /// Rotation of the whole group about the viewport centre, in degrees.
    pub rotation_deg: f64,
    /// Pulsed stroke width per layer, innermost first.
    pub stroke_widths: Vec<f64>,
}

/// Pure rotation and pulse functions for one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Animator {
    rotation_speed: f64,
    base_stroke_width: f64,
    layers: usize,
}

impl Animator {
    pub fn new(config: &MandalaConfiguration) -> Self {
        Self {
            rotation_speed: config.rotation_speed,
            base_stroke_width: config.stroke_width * STROKE_BOOST,
            layers: config.layer_count as usize,
        }
    }

    pub fn rotation(&self, elapsed_ms: f64) -> f64 {
        elapsed_ms * ROTATION_RATE * self.rotation_speed
    }

    /// Stroke width of the shape with stable index `index`.
    pub fn stroke_width(&self, elapsed_ms: f64, index: usize) -> f64 {
        self.base_stroke_width + (elapsed_ms * PULSE_RATE + index as f64).sin() * PULSE_AMPLITUDE
    }

    pub fn frame(&self, elapsed_ms: f64) -> AnimationFrame {
        AnimationFrame {
            elapsed_ms,
            rotation_deg: self.rotation(elapsed_ms),
            stroke_widths: (0..self.layers)
                .map(|index| self.stroke_width(elapsed_ms, index))
                .collect(),
        }
    }
}

/// Repeating frame task. Publishes a fresh [`AnimationFrame`] on every tick
/// until stopped; dropping the timer stops it as well.
#[derive(Debug)]
pub struct AnimationTimer {
    handle: JoinHandle<()>,
    frames: watch::Receiver<AnimationFrame>,
}

impl AnimationTimer {
    /// Spawns the timer on the current tokio runtime.
    pub fn start(animator: Animator, frame_rate: u32) -> Self {
        let period = Duration::from_secs_f64(1.0 / frame_rate.max(1) as f64);
        let (sender, frames) = watch::channel(animator.frame(0.0));

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                if sender.send(animator.frame(elapsed_ms)).is_err() {
                    tracing::debug!("all frame receivers dropped; animation exiting");
                    break;
                }
            }
        });

        Self { handle, frames }
    }

    pub fn frames(&self) -> watch::Receiver<AnimationFrame> {
        self.frames.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(&mut self) {
        self.handle.abort();
    }
}

impl Drop for AnimationTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
