//! Procedural mandala geometry and the renderer that owns it.

pub mod curve;
pub mod svg;

use std::f64::consts::TAU;

use tokio::sync::watch;

use crate::{
    mapping::ColorScale,
    timeline::{AnimationFrame, AnimationTimer, Animator},
    MandalaConfiguration, ShapeType,
};

pub use curve::{CurveKind, PathCommand, Point};

/// Share of the smaller viewport side used as the outer radius.
pub const MAX_RADIUS_FACTOR: f64 = 0.55;
pub const STROKE_BOOST: f64 = 2.5;
pub const STROKE_OPACITY: f64 = 1.0;
pub const FILL_OPACITY: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn max_radius(&self) -> f64 {
        self.width.min(self.height) * MAX_RADIUS_FACTOR
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Vertex in polar form. Angle zero points up and grows clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub angle: f64,
    pub radius: f64,
}

impl Vertex {
    pub fn to_point(self) -> Point {
        Point::new(
            self.radius * self.angle.sin(),
            -self.radius * self.angle.cos(),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyle {
    pub color: String,
    pub stroke_width: f64,
    pub stroke_opacity: f64,
    pub fill_opacity: f64,
}

/// One concentric closed outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub index: usize,
    pub radius: f64,
    pub vertices: Vec<Vertex>,
    pub curve: CurveKind,
    pub style: LayerStyle,
}

impl Layer {
    /// Outline relative to the mandala centre.
    pub fn path(&self) -> Vec<PathCommand> {
        let points: Vec<Point> = self.vertices.iter().map(|v| v.to_point()).collect();
        self.curve.trace(&points)
    }
}

/// Everything drawn for one configuration, innermost layer first.
#[derive(Debug, Clone, PartialEq)]
pub struct MandalaScene {
    pub viewport: Viewport,
    pub max_radius: f64,
    pub layers: Vec<Layer>,
}

/// Number of vertices on layer `index`.
pub fn point_count(index: u32, complexity: u32) -> u32 {
    let multiplier = if complexity > 5 { 2 } else { 1 };
    (index + 2) * multiplier + 4
}

/// Radial distance of a vertex at `angle` on a layer of radius `radius`.
pub fn vertex_radius(shape: ShapeType, radius: f64, angle: f64, complexity: u32) -> f64 {
    match shape {
        ShapeType::Circle => radius,
        _ => radius * (0.8 + 0.2 * (angle * complexity as f64).cos()),
    }
}

/// Builds the full scene. Configuration values are not range checked: a zero
/// layer count simply produces an empty scene.
pub fn generate(config: &MandalaConfiguration, viewport: Viewport) -> MandalaScene {
    let max_radius = viewport.max_radius();
    let layer_count = config.layer_count;
    let colors = ColorScale::for_layers(config);
    let curve = CurveKind::from(config.shape_type);
    let stroke_width = config.stroke_width * STROKE_BOOST;

    let layers = (0..layer_count)
        .map(|index| {
            let radius = (max_radius / layer_count as f64) * (index + 1) as f64;
            let points = point_count(index, config.complexity);
            let step = TAU / points as f64;
            let vertices = (0..points)
                .map(|k| {
                    let angle = k as f64 * step;
                    Vertex {
                        angle,
                        radius: vertex_radius(config.shape_type, radius, angle, config.complexity),
                    }
                })
                .collect();

            Layer {
                index: index as usize,
                radius,
                vertices,
                curve,
                style: LayerStyle {
                    color: colors.color_at(index as f64).to_string(),
                    stroke_width,
                    stroke_opacity: STROKE_OPACITY,
                    fill_opacity: FILL_OPACITY,
                },
            }
        })
        .collect();

    MandalaScene {
        viewport,
        max_radius,
        layers,
    }
}

/// Owns the drawn scene and its running animation. Mounting a new
/// configuration disposes both before anything is regenerated.
#[derive(Debug, Default)]
pub struct MandalaRenderer {
    scene: Option<MandalaScene>,
    animator: Option<Animator>,
    timer: Option<AnimationTimer>,
}

impl MandalaRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self, config: &MandalaConfiguration, viewport: Viewport) -> &MandalaScene {
        self.teardown();
        tracing::debug!(
            layers = config.layer_count,
            shape = config.shape_type.as_str(),
            width = viewport.width,
            height = viewport.height,
            "mounting mandala"
        );

        self.animator = Some(Animator::new(config));
        self.scene.insert(generate(config, viewport))
    }

    /// Starts the frame timer for the mounted scene. Must be called from
    /// within a tokio runtime. Returns `None` when nothing is mounted.
    pub fn animate(&mut self, frame_rate: u32) -> Option<watch::Receiver<AnimationFrame>> {
        let animator = self.animator.clone()?;
        if let Some(mut previous) = self.timer.take() {
            previous.stop();
        }

        let timer = AnimationTimer::start(animator, frame_rate);
        let frames = timer.frames();
        self.timer = Some(timer);
        Some(frames)
    }

    /// Mounts `config` and immediately starts animating it.
    pub fn present(
        &mut self,
        config: &MandalaConfiguration,
        viewport: Viewport,
        frame_rate: u32,
    ) -> Option<watch::Receiver<AnimationFrame>> {
        self.mount(config, viewport);
        self.animate(frame_rate)
    }

    pub fn scene(&self) -> Option<&MandalaScene> {
        self.scene.as_ref()
    }

    pub fn animator(&self) -> Option<&Animator> {
        self.animator.as_ref()
    }

    pub fn frame_at(&self, elapsed_ms: f64) -> Option<AnimationFrame> {
        self.animator.as_ref().map(|animator| animator.frame(elapsed_ms))
    }

    pub fn is_animating(&self) -> bool {
        self.timer.as_ref().is_some_and(AnimationTimer::is_running)
    }

    /// Stops the timer and drops the scene.
    pub fn teardown(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.stop();
            tracing::debug!("stopped mandala animation");
        }
        self.scene = None;
        self.animator = None;
    }
}
