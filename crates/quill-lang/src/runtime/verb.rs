//! Verbs: one parsed command each, holding parsed `Value`s.
//!
//! Leaf verbs perform exactly one canvas call or one storage mutation in
//! `execute`. Control verbs (`if`, `while`, `for`, `def`, `call`, `ret`,
//! `end`) carry their operands but are driven by the interpreter.

use crate::error::ErrorCode;
use crate::runtime::canvas::Canvas;
use crate::runtime::storage::{Storage, StorageError};
use crate::runtime::value::{Value, ValueError};
use crate::types::color::Color;
use crate::types::draw::{self, Point};

/// Most sides `rp` will draw.
pub const MAX_SIDES: i64 = 10_000;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VerbError {
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl VerbError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Value(e) => e.code(),
            Self::Storage(e) => e.code(),
        }
    }
}

/// Color given either as one literal/variable or as `r, g, b[, a]` channels.
#[derive(Debug, Clone)]
pub enum ColorArg {
    Single(Value),
    Channels(Vec<Value>),
}

/// Polygon forms. Sizes are doubles, explicit points are integers.
#[derive(Debug, Clone)]
pub enum Shape {
    Regular { sides: Value, radius: Value, rotation: Option<Value> },
    Square { size: Value, rotation: Option<Value> },
    Rect { width: Value, height: Value },
    Corners([Value; 4]),
    Triangle { base: Value, height: Option<Value> },
    /// Flat `x, y` pairs.
    Points(Vec<Value>),
}

#[derive(Debug, Clone)]
pub enum Verb {
    // Drawing
    MoveTo { x: Value, y: Value },
    LineTo { x: Value, y: Value },
    Polygon(Shape),
    Circle { radius: Value },
    Dot,
    Clear,
    ResetPen,

    // Pen & fill state
    /// Bool toggles fill, a color sets the fill color.
    Fill(Value),
    FillColor(ColorArg),
    PenColor(ColorArg),
    PenWidth(Value),

    // Variables
    Declare { name: String, value: Option<Value> },
    Assign { name: String, value: Value },

    // Control flow
    If { guard: Value },
    While { guard: Value },
    For { var: String, start: Value, end: Value, step: Option<Value> },
    Def { name: String },
    Call { name: String },
    Return,
    End,
}

impl Verb {
    pub fn opens_block(&self) -> bool {
        matches!(self, Verb::If { .. } | Verb::While { .. } | Verb::For { .. } | Verb::Def { .. })
    }

    pub fn execute(&self, canvas: &mut dyn Canvas, storage: &mut Storage) -> Result<(), VerbError> {
        match self {
            Verb::MoveTo { x, y } => canvas.move_to(int(x, storage)?, int(y, storage)?),
            Verb::LineTo { x, y } => canvas.line_to(int(x, storage)?, int(y, storage)?),
            Verb::Polygon(shape) => canvas.draw_polygon(&shape.points(storage)?),
            Verb::Circle { radius } => canvas.draw_circle(non_negative(radius, storage, "radius")?),
            Verb::Dot => canvas.draw_dot(),
            Verb::Clear => canvas.clear(),
            Verb::ResetPen => canvas.move_to(0, 0),

            Verb::Fill(v) => match fresh(v).resolve(storage)? {
                Value::Bool(on) => canvas.set_fill(on),
                other => canvas.set_fill_color(other.to_color(storage)?),
            },
            Verb::FillColor(c) => canvas.set_fill_color(c.resolve(storage)?),
            Verb::PenColor(c) => canvas.set_pen_color(c.resolve(storage)?),
            Verb::PenWidth(w) => canvas.set_pen_width(non_negative(w, storage, "pen width")?),

            Verb::Declare { name, value: Some(value) } | Verb::Assign { name, value } => {
                let resolved = fresh(value).resolve(storage)?;
                storage.set(name, resolved);
            }
            Verb::Declare { name, value: None } => {
                if !storage.contains(name) { storage.declare(name, None)?; }
            }

            // Driven by the interpreter.
            Verb::If { .. } | Verb::While { .. } | Verb::For { .. }
            | Verb::Def { .. } | Verb::Call { .. } | Verb::Return | Verb::End => {}
        }
        Ok(())
    }

    pub fn describe(&self) -> String {
        match self {
            Verb::MoveTo { x, y } => format!("Move the pen to ({}, {})", x.describe(), y.describe()),
            Verb::LineTo { x, y } => format!("Draw a line to ({}, {})", x.describe(), y.describe()),
            Verb::Polygon(shape) => shape.describe(),
            Verb::Circle { radius } => format!("Draw a circle of radius {}", radius.describe()),
            Verb::Dot => "Draw a dot".into(),
            Verb::Clear => "Clear the canvas".into(),
            Verb::ResetPen => "Move the pen back to the origin".into(),
            Verb::Fill(Value::Bool(true)) => "Enable fill".into(),
            Verb::Fill(Value::Bool(false)) => "Disable fill".into(),
            Verb::Fill(v) => format!("Set fill from {}", v.describe()),
            Verb::FillColor(c) => format!("Set the fill color to {}", c.describe()),
            Verb::PenColor(c) => format!("Set the pen color to {}", c.describe()),
            Verb::PenWidth(w) => format!("Set the pen width to {}", w.describe()),
            Verb::Declare { name, value: Some(v) } => format!("Declare {name} as {}", v.describe()),
            Verb::Declare { name, value: None } => format!("Declare {name}"),
            Verb::Assign { name, value } => format!("Set {name} to {}", value.describe()),
            Verb::If { guard } => format!("If {}", guard.describe()),
            Verb::While { guard } => format!("While {}", guard.describe()),
            Verb::For { var, start, end, step } => match step {
                Some(s) => format!("For {var} from {} to {} by {}", start.describe(), end.describe(), s.describe()),
                None => format!("For {var} from {} to {}", start.describe(), end.describe()),
            },
            Verb::Def { name } => format!("Define procedure {name}"),
            Verb::Call { name } => format!("Call procedure {name}"),
            Verb::Return => "Return from procedure".into(),
            Verb::End => "End of block".into(),
        }
    }
}

// ─── Shapes ───────────────────────────────────────────────────────────────────

impl Shape {
    pub fn points(&self, storage: &Storage) -> Result<Vec<Point>, ValueError> {
        let pts = match self {
            Shape::Regular { sides, radius, rotation } => {
                let n = int(sides, storage)?;
                if n < 3 {
                    return Err(ValueError::OutOfRange(format!("a polygon needs at least 3 sides, got {n}")));
                }
                if n > MAX_SIDES {
                    return Err(ValueError::OutOfRange(format!("a polygon has at most {MAX_SIDES} sides, got {n}")));
                }
                let n = u32::try_from(n).map_err(|_| ValueError::Overflow)?;
                draw::regular_polygon(n, non_negative(radius, storage, "radius")?, angle(rotation, storage)?)
            }
            Shape::Square { size, rotation } => {
                let s = non_negative(size, storage, "size")?;
                draw::rectangle(s, s, angle(rotation, storage)?)
            }
            Shape::Rect { width, height } => draw::rectangle(
                non_negative(width, storage, "width")?,
                non_negative(height, storage, "height")?,
                0.0,
            ),
            Shape::Corners([x1, y1, x2, y2]) => draw::corners(
                Point::new(int(x1, storage)?, int(y1, storage)?),
                Point::new(int(x2, storage)?, int(y2, storage)?),
            ),
            Shape::Triangle { base, height: None } => draw::equilateral(non_negative(base, storage, "size")?),
            Shape::Triangle { base, height: Some(height) } => draw::triangle(
                non_negative(base, storage, "base")?,
                non_negative(height, storage, "height")?,
            ),
            Shape::Points(coords) => coords
                .chunks(2)
                .map(|pair| Ok(Point::new(int(&pair[0], storage)?, int(&pair[1], storage)?)))
                .collect::<Result<Vec<Point>, ValueError>>()?,
        };
        Ok(pts)
    }

    fn describe(&self) -> String {
        match self {
            Shape::Regular { sides, radius, .. } =>
                format!("Draw a regular polygon with {} sides of radius {}", sides.describe(), radius.describe()),
            Shape::Square { size, .. } => format!("Draw a square of size {}", size.describe()),
            Shape::Rect { width, height } =>
                format!("Draw a rectangle {} by {}", width.describe(), height.describe()),
            Shape::Corners(c) => format!(
                "Draw a rectangle from ({}, {}) to ({}, {})",
                c[0].describe(), c[1].describe(), c[2].describe(), c[3].describe()
            ),
            Shape::Triangle { base, .. } => format!("Draw a triangle of base {}", base.describe()),
            Shape::Points(coords) => format!("Draw a polygon through {} points", coords.len() / 2),
        }
    }
}

impl ColorArg {
    fn resolve(&self, storage: &Storage) -> Result<Color, ValueError> {
        match self {
            ColorArg::Single(v) => fresh(v).to_color(storage),
            ColorArg::Channels(vs) => {
                let mut ch = [0u8, 0, 0, 255];
                for (slot, v) in ch.iter_mut().zip(vs) {
                    let n = int(v, storage)?;
                    *slot = u8::try_from(n).map_err(|_| {
                        ValueError::OutOfRange(format!("color channel must be 0-255, got {n}"))
                    })?;
                }
                Ok(Color::rgba(ch[0], ch[1], ch[2], ch[3]))
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            ColorArg::Single(v) => v.describe(),
            ColorArg::Channels(vs) => {
                let parts: Vec<String> = vs.iter().map(Value::describe).collect();
                format!("({})", parts.join(", "))
            }
        }
    }
}

// ─── Reading parameters ───────────────────────────────────────────────────────

/// A pending copy of a template value, so every execution evaluates anew.
fn fresh(v: &Value) -> Value { v.clone() }

fn int(v: &Value, storage: &Storage) -> Result<i64, ValueError> {
    fresh(v).to_int(storage)
}

fn non_negative(v: &Value, storage: &Storage, what: &str) -> Result<f64, ValueError> {
    let d = fresh(v).to_double(storage)?;
    if d < 0.0 {
        return Err(ValueError::OutOfRange(format!("{what} cannot be negative, got {d}")));
    }
    Ok(d)
}

fn angle(v: &Option<Value>, storage: &Storage) -> Result<f64, ValueError> {
    v.as_ref().map_or(Ok(0.0), |v| fresh(v).to_double(storage))
}
