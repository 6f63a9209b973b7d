//! Verb factory and parse driver.
//!
//! `parse_line` turns one normalized line into a `Verb`, checking arity
//! against the command table and the kind of every literal parameter.
//! `parse` folds the lines of a script through the chunk builder and stops
//! at the first error.

use crate::error::{Error, ErrorCode};
use crate::runtime::storage::{Storage, check_name};
use crate::runtime::value::{Kind, Value, ValueError, is_identifier};
use crate::runtime::verb::{ColorArg, Shape, Verb};
use crate::syntax::ast::Program;
use crate::syntax::builder::ChunkBuilder;
use crate::syntax::lexer::{self, Line, operator_tokens, split_command};
use crate::syntax::token::{Command, is_reserved};

/// A parse that stopped early. `partial` holds the top-level items and
/// procedures completed before the failing line.
#[derive(Debug)]
pub struct ParseFailure {
    pub error: Error,
    pub partial: Program,
}

#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn parse(source: &str, storage: &mut Storage) -> Result<Program, ParseFailure> {
    let lines = lexer::lines(source);
    let mut builder = ChunkBuilder::new();

    let folded = lines.iter().try_for_each(|line| {
        let verb = parse_line(line, storage).map_err(|e| e.with_context(&line.raw))?;
        tracing::trace!(line = line.number, depth = builder.depth(), "parsed `{}`", line.text);
        builder.push(verb, line.number).map_err(|e| e.with_context(&line.raw))
    });
    if let Err(error) = folded {
        return Err(ParseFailure { error, partial: builder.into_partial() });
    }

    let program = builder.finish().map_err(|(error, partial)| ParseFailure { error, partial })?;
    tracing::debug!(
        lines = lines.len(),
        items = program.len(),
        procedures = program.procedures.len(),
        "parsed program"
    );
    Ok(program)
}

pub fn parse_line(line: &Line, storage: &mut Storage) -> Result<Verb, Error> {
    let text = line.text.as_str();

    // `name = value`
    let head = operator_tokens(text);
    if head.len() >= 2 && head[1] == "=" && Command::lookup(&head[0]).is_none() {
        return parse_assign(&head, line.number, storage);
    }

    let (keyword, params) = split_command(text);
    let cmd = Command::lookup(keyword).ok_or_else(|| {
        Error::new(ErrorCode::P004, line.number, format!("unknown command `{keyword}`"))
    })?;

    if cmd == Command::Var {
        let rest = text[keyword.len()..].trim();
        return parse_declare(rest, line.number, storage);
    }

    VerbFactory { cmd, keyword, params, line: line.number, storage }.build()
}

// ─── Variables ────────────────────────────────────────────────────────────────

fn parse_declare(rest: &str, line: usize, storage: &mut Storage) -> Result<Verb, Error> {
    let tokens = operator_tokens(rest);
    let Some(name) = tokens.first() else {
        return Err(Error::new(ErrorCode::P005, line, "`var` needs a variable name"));
    };
    if storage.contains(name) {
        return Err(Error::new(ErrorCode::N001, line, format!("`{name}` has already been declared")));
    }
    check_name(name).map_err(|e| Error::from_storage(e, line))?;

    let value = match tokens.get(1).map(String::as_str) {
        None => None,
        Some("=") if tokens.len() > 2 => Some(
            Value::parse(&tokens[2..].join(" "), Some(&*storage))
                .map_err(|e| Error::from_value(e, line, None))?,
        ),
        Some("=") => return Err(Error::new(ErrorCode::P005, line, format!("`var {name} =` needs a value"))),
        Some(other) => return Err(Error::new(ErrorCode::P005, line,
            format!("expected `=` after `var {name}`, found `{other}`"))),
    };

    storage.declare(name, None).map_err(|e| Error::from_storage(e, line))?;
    Ok(Verb::Declare { name: name.clone(), value })
}

fn parse_assign(tokens: &[String], line: usize, storage: &mut Storage) -> Result<Verb, Error> {
    let name = &tokens[0];
    if !is_identifier(name) {
        return Err(Error::new(ErrorCode::P005, line, format!("cannot assign to `{name}`")));
    }
    if !storage.contains(name) {
        return Err(Error::from_value(ValueError::Undeclared(name.clone()), line, None));
    }
    if tokens.len() < 3 {
        return Err(Error::new(ErrorCode::P005, line, format!("`{name} =` needs a value")));
    }
    let value = Value::parse(&tokens[2..].join(" "), Some(&*storage))
        .map_err(|e| Error::from_value(e, line, None))?;
    Ok(Verb::Assign { name: name.clone(), value })
}

// ─── Commands ─────────────────────────────────────────────────────────────────

struct VerbFactory<'a> {
    cmd: Command,
    keyword: &'a str,
    params: Vec<String>,
    line: usize,
    storage: &'a mut Storage,
}

impl VerbFactory<'_> {
    fn build(mut self) -> Result<Verb, Error> {
        self.check_arity()?;
        let n = self.params.len();

        let verb = match self.cmd {
            Command::MoveTo => Verb::MoveTo { x: self.int(0)?, y: self.int(1)? },
            Command::LineTo => Verb::LineTo { x: self.int(0)?, y: self.int(1)? },
            Command::RegularPolygon => Verb::Polygon(Shape::Regular {
                sides: self.int(0)?,
                radius: self.double(1)?,
                rotation: self.optional(2, Kind::Double)?,
            }),
            Command::Square => Verb::Polygon(Shape::Square {
                size: self.double(0)?,
                rotation: self.optional(1, Kind::Double)?,
            }),
            Command::Quadrilateral => Verb::Polygon(Shape::Points(self.ints()?)),
            Command::Rectangle => match n {
                2 => Verb::Polygon(Shape::Rect { width: self.double(0)?, height: self.double(1)? }),
                4 => Verb::Polygon(Shape::Corners([self.int(0)?, self.int(1)?, self.int(2)?, self.int(3)?])),
                _ => Verb::Polygon(Shape::Points(self.ints()?)),
            },
            Command::Circle => Verb::Circle { radius: self.double(0)? },
            Command::Triangle => match n {
                1 => Verb::Polygon(Shape::Triangle { base: self.double(0)?, height: None }),
                2 => Verb::Polygon(Shape::Triangle { base: self.double(0)?, height: Some(self.double(1)?) }),
                _ => Verb::Polygon(Shape::Points(self.ints()?)),
            },
            Command::Dot => Verb::Dot,
            Command::Clear => Verb::Clear,
            Command::ResetPen => Verb::ResetPen,
            Command::FillOn => Verb::Fill(Value::Bool(true)),
            Command::FillOff => Verb::Fill(Value::Bool(false)),
            Command::Fill if n == 1 => {
                let v = self.value(0)?;
                match v.kind() {
                    None | Some(Kind::Bool) | Some(Kind::Color) => Verb::Fill(v),
                    Some(found) => return Err(self.mismatch(0, Kind::Color, found)),
                }
            }
            Command::Fill => Verb::FillColor(self.channels()?),
            Command::Pen if n == 1 => Verb::PenColor(ColorArg::Single(self.typed(0, Kind::Color)?)),
            Command::Pen => Verb::PenColor(self.channels()?),
            Command::PenWidth => Verb::PenWidth(self.double(0)?),
            Command::If => Verb::If { guard: self.typed(0, Kind::Bool)? },
            Command::While => Verb::While { guard: self.typed(0, Kind::Bool)? },
            Command::For => {
                let var = self.induction_variable()?;
                Verb::For {
                    var,
                    start: self.int(1)?,
                    end: self.int(2)?,
                    step: self.optional(3, Kind::Int)?,
                }
            }
            Command::Def => {
                let name = self.params[0].clone();
                check_name(&name).map_err(|e| Error::from_storage(e, self.line))?;
                Verb::Def { name }
            }
            Command::Call => Verb::Call { name: self.procedure_name(0)? },
            Command::Ret => Verb::Return,
            Command::End => Verb::End,
            Command::Var => return Err(Error::new(ErrorCode::P005, self.line, "misplaced declaration")),
        };
        Ok(verb)
    }

    fn check_arity(&self) -> Result<(), Error> {
        let Some(accepted) = self.cmd.arities() else { return Ok(()) };
        if accepted.contains(&self.params.len()) { return Ok(()); }
        let counts: Vec<String> = accepted.iter().map(usize::to_string).collect();
        let expected = match counts.as_slice() {
            [one] => one.clone(),
            [init @ .., last] => format!("{} or {last}", init.join(", ")),
            [] => "no".into(),
        };
        let mut message = format!("`{}` takes {expected} parameter(s), got {}", self.keyword, self.params.len());
        if let Some(merged) = self.params.iter().find(|p| subtracts_a_number(p)) {
            message.push_str(&format!(
                "; `{merged}` was read as one subtraction, separate a negative number with a comma"
            ));
        }
        Err(Error::new(ErrorCode::P003, self.line, message))
    }

    // ─── Parameters ───────────────────────────────────────────────────────────

    fn value(&self, idx: usize) -> Result<Value, Error> {
        Value::parse(&self.params[idx], Some(&*self.storage))
            .map_err(|e| Error::from_value(e, self.line, Some(idx + 1)))
    }

    /// Parse and, for literals, check the kind now. References and
    /// expressions are checked when they are read.
    fn typed(&self, idx: usize, expected: Kind) -> Result<Value, Error> {
        let v = self.value(idx)?;
        match v.kind() {
            Some(found) if !found.coerces_to(expected) => Err(self.mismatch(idx, expected, found)),
            _ => Ok(v),
        }
    }

    fn int(&self, idx: usize) -> Result<Value, Error> { self.typed(idx, Kind::Int) }

    fn double(&self, idx: usize) -> Result<Value, Error> { self.typed(idx, Kind::Double) }

    fn optional(&self, idx: usize, expected: Kind) -> Result<Option<Value>, Error> {
        if idx < self.params.len() { self.typed(idx, expected).map(Some) } else { Ok(None) }
    }

    fn ints(&self) -> Result<Vec<Value>, Error> {
        (0..self.params.len()).map(|i| self.int(i)).collect()
    }

    fn channels(&self) -> Result<ColorArg, Error> {
        Ok(ColorArg::Channels(self.ints()?))
    }

    fn mismatch(&self, idx: usize, expected: Kind, found: Kind) -> Error {
        Error::from_value(ValueError::TypeMismatch { expected, found }, self.line, Some(idx + 1))
    }

    fn induction_variable(&mut self) -> Result<String, Error> {
        let name = self.params[0].clone();
        if !self.storage.contains(&name) {
            self.storage.declare(&name, None).map_err(|e| Error::from_storage(e, self.line))?;
        }
        Ok(name)
    }

    fn procedure_name(&self, idx: usize) -> Result<String, Error> {
        let name = &self.params[idx];
        if !is_identifier(name) || is_reserved(name) {
            return Err(Error::new(ErrorCode::P005, self.line, format!("`{name}` is not a procedure name")));
        }
        Ok(name.clone())
    }
}

/// `a - 5`: what `move a -5` splits into without a comma.
fn subtracts_a_number(param: &str) -> bool {
    param.split_once(" - ").is_some_and(|(_, rhs)| rhs.starts_with(|c: char| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Line {
        lexer::lines(text).remove(0)
    }

    fn verb(text: &str) -> Verb {
        parse_line(&line(text), &mut Storage::new()).expect("parse failed")
    }

    fn err(text: &str) -> Error {
        parse_line(&line(text), &mut Storage::new()).expect_err("expected parse error")
    }

    #[test]
    fn move_with_spaces_or_commas() {
        assert!(matches!(verb("move 10 10"), Verb::MoveTo { x: Value::Int(10), y: Value::Int(10) }));
        assert!(matches!(verb("moveto 3, -4"), Verb::MoveTo { x: Value::Int(3), y: Value::Int(-4) }));
    }

    #[test]
    fn rectangle_forms() {
        assert!(matches!(verb("rectangle 10 20"), Verb::Polygon(Shape::Rect { .. })));
        assert!(matches!(verb("rectangle 0,0,10,20"), Verb::Polygon(Shape::Corners(_))));
        assert!(matches!(verb("rectangle 0 0 1 0 1 1 0 1"), Verb::Polygon(Shape::Points(p)) if p.len() == 8));
    }

    #[test]
    fn arity_error_names_the_command() {
        let e = err("rectangle 1 2 3");
        assert_eq!(e.code, ErrorCode::P003);
        assert!(e.message.contains("rectangle"), "{}", e.message);
        assert!(e.message.contains("2, 4 or 8"), "{}", e.message);
    }

    #[test]
    fn merged_negative_suggests_a_comma() {
        let e = err("move 10 -5");
        assert_eq!(e.code, ErrorCode::P003);
        assert!(e.message.contains("`10 - 5`"), "{}", e.message);
        assert!(e.message.contains("comma"), "{}", e.message);
        assert!(!err("move 10 + 5").message.contains("comma"));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(err("forward 10").code, ErrorCode::P004);
    }

    #[test]
    fn literal_kind_is_checked_with_position() {
        let e = err("circle red");
        assert_eq!(e.code, ErrorCode::E001);
        assert!(e.message.starts_with("parameter 1"), "{}", e.message);
    }

    #[test]
    fn malformed_number_names_parameter() {
        let e = err("move 10 1x");
        assert_eq!(e.code, ErrorCode::P002);
        assert!(e.message.starts_with("parameter 2"), "{}", e.message);
    }

    #[test]
    fn fill_takes_bool_or_color() {
        assert!(matches!(verb("fill on"), Verb::Fill(Value::Bool(true))));
        assert!(matches!(verb("fill #00ff00"), Verb::Fill(Value::Color(_))));
        assert!(matches!(verb("fill 1 2 3"), Verb::FillColor(ColorArg::Channels(c)) if c.len() == 3));
        assert_eq!(err("fill 2.5").code, ErrorCode::E001);
    }

    #[test]
    fn declaration_registers_name() {
        let mut storage = Storage::new();
        let v = parse_line(&line("var size = 4 * 5"), &mut storage).unwrap();
        assert!(matches!(v, Verb::Declare { ref name, value: Some(Value::Expression { .. }) } if name == "size"));
        assert!(storage.contains("size"));
        assert!(matches!(storage.get("size"), Ok(None)));

        let again = parse_line(&line("var size = 1"), &mut storage).unwrap_err();
        assert_eq!(again.code, ErrorCode::N001);
    }

    #[test]
    fn declaration_cannot_reference_itself() {
        let e = err("var x = x + 1");
        assert_eq!(e.code, ErrorCode::N003);
    }

    #[test]
    fn assignment_requires_declaration() {
        let mut storage = Storage::new();
        assert_eq!(parse_line(&line("x = 3"), &mut storage).unwrap_err().code, ErrorCode::N003);
        storage.declare("x", None).unwrap();
        assert!(matches!(parse_line(&line("x=3"), &mut storage), Ok(Verb::Assign { .. })));
    }

    #[test]
    fn for_declares_its_variable() {
        let mut storage = Storage::new();
        let v = parse_line(&line("for i 1 10 2"), &mut storage).unwrap();
        assert!(matches!(v, Verb::For { step: Some(Value::Int(2)), .. }));
        assert!(storage.contains("i"));
    }

    #[test]
    fn parse_stops_at_first_error() {
        let mut storage = Storage::new();
        let failure = parse("move 1 1\nvar a = 2\nbogus\ncircle 4", &mut storage).unwrap_err();
        assert_eq!(failure.error.code, ErrorCode::P004);
        assert_eq!(failure.error.line, 3);
        assert_eq!(failure.error.context, "bogus");
        assert_eq!(failure.partial.len(), 2);
    }
}
