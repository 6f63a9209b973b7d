use crate::types::color::Color;
use crate::types::draw::Point;

/// The drawing surface verbs act on. Implemented by the embedding
/// application; the interpreter never draws pixels itself.
///
/// Polygon points are relative to the pen position.
pub trait Canvas {
    fn move_to(&mut self, x: i64, y: i64);
    fn line_to(&mut self, x: i64, y: i64);
    fn draw_polygon(&mut self, points: &[Point]);
    fn draw_circle(&mut self, radius: f64);
    fn draw_dot(&mut self);
    fn set_pen_color(&mut self, color: Color);
    fn set_pen_width(&mut self, width: f64);
    fn set_fill_color(&mut self, color: Color);
    fn set_fill(&mut self, enabled: bool);
    fn clear(&mut self);
}

impl<C: Canvas + ?Sized> Canvas for &mut C {
    fn move_to(&mut self, x: i64, y: i64)       { (**self).move_to(x, y) }
    fn line_to(&mut self, x: i64, y: i64)       { (**self).line_to(x, y) }
    fn draw_polygon(&mut self, points: &[Point]) { (**self).draw_polygon(points) }
    fn draw_circle(&mut self, radius: f64)      { (**self).draw_circle(radius) }
    fn draw_dot(&mut self)                      { (**self).draw_dot() }
    fn set_pen_color(&mut self, color: Color)   { (**self).set_pen_color(color) }
    fn set_pen_width(&mut self, width: f64)     { (**self).set_pen_width(width) }
    fn set_fill_color(&mut self, color: Color)  { (**self).set_fill_color(color) }
    fn set_fill(&mut self, enabled: bool)       { (**self).set_fill(enabled) }
    fn clear(&mut self)                         { (**self).clear() }
}

// ─── Recorder ─────────────────────────────────────────────────────────────────

/// One canvas operation, as seen by a `Recorder`.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasCall {
    MoveTo(i64, i64),
    LineTo(i64, i64),
    DrawPolygon(Vec<Point>),
    DrawCircle(f64),
    DrawDot,
    SetPenColor(Color),
    SetPenWidth(f64),
    SetFillColor(Color),
    SetFill(bool),
    Clear,
}

impl std::fmt::Display for CanvasCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MoveTo(x, y)     => write!(f, "move_to({x}, {y})"),
            Self::LineTo(x, y)     => write!(f, "line_to({x}, {y})"),
            Self::DrawPolygon(pts) => {
                let pts: Vec<String> = pts.iter().map(Point::to_string).collect();
                write!(f, "draw_polygon([{}])", pts.join(", "))
            }
            Self::DrawCircle(r)    => write!(f, "draw_circle({r})"),
            Self::DrawDot          => write!(f, "draw_dot()"),
            Self::SetPenColor(c)   => write!(f, "set_pen_color({c})"),
            Self::SetPenWidth(w)   => write!(f, "set_pen_width({w})"),
            Self::SetFillColor(c)  => write!(f, "set_fill_color({c})"),
            Self::SetFill(on)      => write!(f, "set_fill({on})"),
            Self::Clear            => write!(f, "clear()"),
        }
    }
}

/// Canvas that only remembers what it was asked to do. Used headless and in
/// tests.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Vec<CanvasCall>,
}

impl Recorder {
    pub fn new() -> Self { Self::default() }

    pub fn calls(&self) -> &[CanvasCall] { &self.calls }
}

impl Canvas for Recorder {
    fn move_to(&mut self, x: i64, y: i64)        { self.calls.push(CanvasCall::MoveTo(x, y)); }
    fn line_to(&mut self, x: i64, y: i64)        { self.calls.push(CanvasCall::LineTo(x, y)); }
    fn draw_polygon(&mut self, points: &[Point]) { self.calls.push(CanvasCall::DrawPolygon(points.to_vec())); }
    fn draw_circle(&mut self, radius: f64)       { self.calls.push(CanvasCall::DrawCircle(radius)); }
    fn draw_dot(&mut self)                       { self.calls.push(CanvasCall::DrawDot); }
    fn set_pen_color(&mut self, color: Color)    { self.calls.push(CanvasCall::SetPenColor(color)); }
    fn set_pen_width(&mut self, width: f64)      { self.calls.push(CanvasCall::SetPenWidth(width)); }
    fn set_fill_color(&mut self, color: Color)   { self.calls.push(CanvasCall::SetFillColor(color)); }
    fn set_fill(&mut self, enabled: bool)        { self.calls.push(CanvasCall::SetFill(enabled)); }
    fn clear(&mut self)                          { self.calls.push(CanvasCall::Clear); }
}
