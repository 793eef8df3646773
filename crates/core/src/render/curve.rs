//! Turns a ring of vertices into a closed outline.
//!
//! Three interpolations are supported: a centripetal Catmull-Rom spline
//! (emitted as cubic Béziers), a stair-step path and a straight polygon.
//! They only decide how consecutive vertices are joined; vertex positions are
//! never moved.

use crate::ShapeType;

const EPSILON: f64 = 1e-12;
const CATMULL_ROM_ALPHA: f64 = 0.5;
const STEP_MIDPOINT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo { c1: Point, c2: Point, to: Point },
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    CatmullRomClosed,
    StepClosed,
    LinearClosed,
}

impl From<ShapeType> for CurveKind {
    fn from(shape: ShapeType) -> Self {
        match shape {
            ShapeType::Petal | ShapeType::Circle => CurveKind::CatmullRomClosed,
            ShapeType::Square => CurveKind::StepClosed,
            ShapeType::Triangle => CurveKind::LinearClosed,
        }
    }
}

impl CurveKind {
    pub fn trace(self, points: &[Point]) -> Vec<PathCommand> {
        match points.len() {
            0 => Vec::new(),
            1 => vec![PathCommand::MoveTo(points[0]), PathCommand::Close],
            2 => linear_closed(points),
            _ => match self {
                CurveKind::CatmullRomClosed => catmull_rom_closed(points),
                CurveKind::StepClosed => step_closed(points),
                CurveKind::LinearClosed => linear_closed(points),
            },
        }
    }
}

fn linear_closed(points: &[Point]) -> Vec<PathCommand> {
    let mut commands = Vec::with_capacity(points.len() + 1);
    commands.push(PathCommand::MoveTo(points[0]));
    commands.extend(points[1..].iter().copied().map(PathCommand::LineTo));
    commands.push(PathCommand::Close);
    commands
}

fn step_closed(points: &[Point]) -> Vec<PathCommand> {
    let mut commands = Vec::with_capacity(points.len() * 2 + 3);
    commands.push(PathCommand::MoveTo(points[0]));

    let mut previous = points[0];
    for &next in points[1..].iter().chain(std::iter::once(&points[0])) {
        let mid_x = previous.x * (1.0 - STEP_MIDPOINT) + next.x * STEP_MIDPOINT;
        commands.push(PathCommand::LineTo(Point::new(mid_x, previous.y)));
        commands.push(PathCommand::LineTo(Point::new(mid_x, next.y)));
        previous = next;
    }

    commands.push(PathCommand::LineTo(points[0]));
    commands.push(PathCommand::Close);
    commands
}

fn catmull_rom_closed(points: &[Point]) -> Vec<PathCommand> {
    let n = points.len();
    let mut commands = Vec::with_capacity(n + 2);
    commands.push(PathCommand::MoveTo(points[0]));

    for i in 0..n {
        let p0 = points[(i + n - 1) % n];
        let p1 = points[i];
        let p2 = points[(i + 1) % n];
        let p3 = points[(i + 2) % n];
        let (c1, c2) = catmull_rom_controls(p0, p1, p2, p3);
        commands.push(PathCommand::CubicTo { c1, c2, to: p2 });
    }

    commands.push(PathCommand::Close);
    commands
}

/// Bézier control points for the span p1 → p2 of a centripetal spline.
fn catmull_rom_controls(p0: Point, p1: Point, p2: Point, p3: Point) -> (Point, Point) {
    let l01_2a = p0.distance_sq(p1).powf(CATMULL_ROM_ALPHA);
    let l12_2a = p1.distance_sq(p2).powf(CATMULL_ROM_ALPHA);
    let l23_2a = p2.distance_sq(p3).powf(CATMULL_ROM_ALPHA);
    let l01_a = l01_2a.sqrt();
    let l12_a = l12_2a.sqrt();
    let l23_a = l23_2a.sqrt();

    let c1 = if l01_a > EPSILON {
        let a = 2.0 * l01_2a + 3.0 * l01_a * l12_a + l12_2a;
        let n = 3.0 * l01_a * (l01_a + l12_a);
        Point::new(
            (p1.x * a - p0.x * l12_2a + p2.x * l01_2a) / n,
            (p1.y * a - p0.y * l12_2a + p2.y * l01_2a) / n,
        )
    } else {
        p1
    };

    let c2 = if l23_a > EPSILON {
        let b = 2.0 * l23_2a + 3.0 * l23_a * l12_a + l12_2a;
        let m = 3.0 * l23_a * (l23_a + l12_a);
        Point::new(
            (p2.x * b + p1.x * l23_2a - p3.x * l12_2a) / m,
            (p2.y * b + p1.y * l23_2a - p3.y * l12_2a) / m,
        )
    } else {
        p2
    };

    (c1, c2)
}
