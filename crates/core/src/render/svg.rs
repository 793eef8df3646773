use std::fmt::{self, Display, Write};

use super::{Layer, MandalaScene, PathCommand};
use crate::timeline::AnimationFrame;

/// Backdrop drawn behind the mandala when there is no camera layer.
pub const CAMERA_FALLBACK_BACKGROUND: &str = "#111827";

/// Serialises a scene at a given animation frame as a standalone SVG document.
#[derive(Debug, Clone, Copy)]
pub struct SvgDocument<'a> {
    scene: &'a MandalaScene,
    frame: &'a AnimationFrame,
    background: Option<&'a str>,
}

impl<'a> SvgDocument<'a> {
    pub fn new(scene: &'a MandalaScene, frame: &'a AnimationFrame) -> Self {
        Self {
            scene,
            frame,
            background: None,
        }
    }

    pub fn with_background(mut self, color: &'a str) -> Self {
        self.background = Some(color);
        self
    }
}

impl Display for SvgDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let viewport = self.scene.viewport;
        let center = viewport.center();

        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = viewport.width,
            h = viewport.height,
        )?;
        writeln!(
            f,
            r#"<defs><filter id="shadow"><feDropShadow dx="0" dy="0" stdDeviation="15" flood-color="rgb(0,0,0)" flood-opacity="0.8"/></filter></defs>"#
        )?;
        if let Some(background) = self.background {
            writeln!(f, r#"<rect width="100%" height="100%" fill="{background}"/>"#)?;
        }
        writeln!(
            f,
            r#"<g filter="url(#shadow)" transform="translate({:.3}, {:.3}) rotate({:.6})">"#,
            center.x, center.y, self.frame.rotation_deg
        )?;

        for layer in &self.scene.layers {
            let stroke_width = self
                .frame
                .stroke_widths
                .get(layer.index)
                .copied()
                .unwrap_or(layer.style.stroke_width);
            write_layer(f, layer, stroke_width)?;
        }

        writeln!(f, "</g>")?;
        writeln!(f, "</svg>")
    }
}

fn write_layer(f: &mut fmt::Formatter<'_>, layer: &Layer, stroke_width: f64) -> fmt::Result {
    let style = &layer.style;
    writeln!(
        f,
        r#"<g class="layer-{index}"><path d="{d}" fill="{color}" fill-opacity="{fill}" stroke="{color}" stroke-width="{width:.3}" stroke-opacity="{stroke}"/></g>"#,
        index = layer.index,
        d = path_data(&layer.path()),
        color = style.color,
        fill = style.fill_opacity,
        width = stroke_width,
        stroke = style.stroke_opacity,
    )
}

/// SVG path `d` attribute for a command list.
pub fn path_data(commands: &[PathCommand]) -> String {
    let mut d = String::new();
    for command in commands {
        if !d.is_empty() {
            d.push(' ');
        }
        // Writing into a String cannot fail.
        let _ = match command {
            PathCommand::MoveTo(p) => write!(d, "M{:.3},{:.3}", p.x, p.y),
            PathCommand::LineTo(p) => write!(d, "L{:.3},{:.3}", p.x, p.y),
            PathCommand::CubicTo { c1, c2, to } => write!(
                d,
                "C{:.3},{:.3},{:.3},{:.3},{:.3},{:.3}",
                c1.x, c1.y, c2.x, c2.y, to.x, to.y
            ),
            PathCommand::Close => write!(d, "Z"),
        };
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        render::{generate, Point, Viewport},
        timeline::Animator,
        MandalaConfiguration, ShapeType,
    };

    fn config() -> MandalaConfiguration {
        MandalaConfiguration {
            colors: vec!["#ff0000".into(), "#00ff00".into()],
            shape_type: ShapeType::Triangle,
            layer_count: 2,
            rotation_speed: 4.0,
            complexity: 3,
            stroke_width: 1.0,
        }
    }

    #[test]
    fn path_data_formats_every_command() {
        let d = path_data(&[
            PathCommand::MoveTo(Point::new(0.0, -1.0)),
            PathCommand::LineTo(Point::new(1.0, 0.5)),
            PathCommand::CubicTo {
                c1: Point::new(1.0, 1.0),
                c2: Point::new(0.5, 1.0),
                to: Point::new(0.0, 1.0),
            },
            PathCommand::Close,
        ]);
        assert_eq!(
            d,
            "M0.000,-1.000 L1.000,0.500 C1.000,1.000,0.500,1.000,0.000,1.000 Z"
        );
    }

    #[test]
    fn document_carries_rotation_and_layers() {
        let config = config();
        let scene = generate(&config, Viewport::new(400.0, 300.0));
        let frame = Animator::new(&config).frame(1000.0);
        let svg = SvgDocument::new(&scene, &frame).to_string();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("translate(200.000, 150.000) rotate(2.000000)"));
        assert!(svg.contains(r#"class="layer-0""#));
        assert!(svg.contains(r#"class="layer-1""#));
        assert!(svg.contains(r##"stroke="#00ff00""##));
        assert!(svg.contains(r#"fill-opacity="0.35""#));
        assert!(!svg.contains("<rect"));
    }

    #[test]
    fn fallback_background_is_optional() {
        let config = config();
        let scene = generate(&config, Viewport::new(400.0, 300.0));
        let frame = AnimationFrame::default();
        let svg = SvgDocument::new(&scene, &frame)
            .with_background(CAMERA_FALLBACK_BACKGROUND)
            .to_string();

        assert!(svg.contains(CAMERA_FALLBACK_BACKGROUND));
        // Without frame widths the static style is used.
        assert!(svg.contains(r#"stroke-width="2.500""#));
    }
}
