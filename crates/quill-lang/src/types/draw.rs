//! Shape geometry. Every polygon is expressed relative to the pen: (0, 0)
//! is the pen position and the canvas adds the offset when drawing.

use std::f64::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub fn new(x: i64, y: i64) -> Self { Self { x, y } }

    fn rounded(x: f64, y: f64) -> Self {
        Self { x: x.round() as i64, y: y.round() as i64 }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// `sides` vertices on a circle of `radius` centred on the pen. The first
/// vertex sits at `rotation` degrees (0 = pointing along +x).
pub fn regular_polygon(sides: u32, radius: f64, rotation: f64) -> Vec<Point> {
    let start = rotation.to_radians();
    (0..sides)
        .map(|k| {
            let t = start + TAU * k as f64 / sides as f64;
            Point::rounded(radius * t.cos(), radius * t.sin())
        })
        .collect()
}

/// Axis-aligned `width` × `height` box with a corner on the pen, rotated
/// about the pen by `rotation` degrees.
pub fn rectangle(width: f64, height: f64, rotation: f64) -> Vec<Point> {
    let (sin, cos) = rotation.to_radians().sin_cos();
    [(0.0, 0.0), (width, 0.0), (width, height), (0.0, height)]
        .into_iter()
        .map(|(x, y)| Point::rounded(x * cos - y * sin, x * sin + y * cos))
        .collect()
}

/// Box spanned by two opposite corners.
pub fn corners(a: Point, b: Point) -> Vec<Point> {
    vec![a, Point::new(b.x, a.y), b, Point::new(a.x, b.y)]
}

/// Isosceles triangle standing on its base; the apex points up (negative y).
pub fn triangle(base: f64, height: f64) -> Vec<Point> {
    vec![
        Point::ORIGIN,
        Point::rounded(base, 0.0),
        Point::rounded(base / 2.0, -height),
    ]
}

pub fn equilateral(size: f64) -> Vec<Point> {
    triangle(size, size * (PI / 3.0).sin())
}
