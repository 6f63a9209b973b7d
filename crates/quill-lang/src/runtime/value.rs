//! Runtime values.
//!
//! Literals are plain data. `VariableRef`, `Expression` and `Comparison` are
//! read against a `Storage`; the two operator forms evaluate their operands
//! once, on first read, and keep the result in a `Thunk` for the lifetime of
//! that instance. Verbs keep their values as templates and clone them before
//! each execution so every run starts from a pending copy.

use std::cell::RefCell;

use crate::error::ErrorCode;
use crate::runtime::storage::Storage;
use crate::syntax::lexer::operator_tokens;
use crate::types::color::Color;

// ─── Kinds & operators ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind { Int, Double, Bool, Color }

impl Kind {
    /// Whether a value of this kind can be read as `target`.
    pub fn coerces_to(self, target: Kind) -> bool {
        match (self, target) {
            (a, b) if a == b => true,
            (Kind::Int, Kind::Double) | (Kind::Int, Kind::Bool) | (Kind::Double, Kind::Int) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Kind::Int    => "int",
            Kind::Double => "double",
            Kind::Bool   => "bool",
            Kind::Color  => "color",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp { Add, Sub, Mul, Div }

impl ArithOp {
    pub fn from_token(tok: &str) -> Option<Self> {
        match tok {
            "+" => Some(Self::Add),
            "-" => Some(Self::Sub),
            "*" => Some(Self::Mul),
            "/" => Some(Self::Div),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self { Self::Add => "+", Self::Sub => "-", Self::Mul => "*", Self::Div => "/" }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp { Gt, Lt, Eq, NotEq }

impl CmpOp {
    pub fn from_token(tok: &str) -> Option<Self> {
        match tok {
            ">"  => Some(Self::Gt),
            "<"  => Some(Self::Lt),
            "="  => Some(Self::Eq),
            "!=" => Some(Self::NotEq),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self { Self::Gt => ">", Self::Lt => "<", Self::Eq => "=", Self::NotEq => "!=" }
    }
}

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("`{0}` does not match any value type")]
    NoMatchingType(String),
    #[error("`{0}` is not a valid number")]
    NumberFormat(String),
    #[error("expected {expected}, got {found}")]
    TypeMismatch { expected: Kind, found: Kind },
    #[error("operands of `{op}` must share a type, got {lhs} and {rhs}")]
    OperandMismatch { op: &'static str, lhs: Kind, rhs: Kind },
    #[error("division by zero")]
    DivideByZero,
    #[error("operator `{op}` is not defined for {kind}")]
    InvalidOperator { op: &'static str, kind: Kind },
    #[error("undeclared variable `{0}`")]
    Undeclared(String),
    #[error("variable `{0}` has no value")]
    Uninitialised(String),
    #[error("arithmetic overflow")]
    Overflow,
    #[error("{0}")]
    OutOfRange(String),
}

impl ValueError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NoMatchingType(_)     => ErrorCode::P001,
            Self::NumberFormat(_)       => ErrorCode::P002,
            Self::Undeclared(_)         => ErrorCode::N003,
            Self::TypeMismatch { .. }
            | Self::OperandMismatch { .. } => ErrorCode::E001,
            Self::DivideByZero          => ErrorCode::E002,
            Self::InvalidOperator { .. } => ErrorCode::E003,
            Self::Uninitialised(_)      => ErrorCode::E004,
            Self::Overflow              => ErrorCode::E005,
            Self::OutOfRange(_)         => ErrorCode::E006,
        }
    }
}

// ─── Value ────────────────────────────────────────────────────────────────────

/// Evaluation state of an operator value. Moves from `Pending` to `Resolved`
/// at most once; a failed evaluation leaves it `Pending`.
#[derive(Debug, Clone)]
pub enum Thunk {
    Pending { lhs: Box<Value>, rhs: Box<Value> },
    Resolved(Box<Value>),
}

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Double(f64),
    Bool(bool),
    Color(Color),
    VariableRef(String),
    Expression { op: ArithOp, cell: RefCell<Thunk> },
    Comparison { op: CmpOp, cell: RefCell<Thunk> },
}

impl Value {
    pub fn expression(op: ArithOp, lhs: Value, rhs: Value) -> Self {
        Value::Expression { op, cell: RefCell::new(pending(lhs, rhs)) }
    }

    pub fn comparison(op: CmpOp, lhs: Value, rhs: Value) -> Self {
        Value::Comparison { op, cell: RefCell::new(pending(lhs, rhs)) }
    }

    /// Kind known without a storage: literals and already-evaluated operators.
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Value::Int(_)    => Some(Kind::Int),
            Value::Double(_) => Some(Kind::Double),
            Value::Bool(_)   => Some(Kind::Bool),
            Value::Color(_)  => Some(Kind::Color),
            Value::Comparison { .. } => Some(Kind::Bool),
            Value::VariableRef(_) => None,
            Value::Expression { cell, .. } => match &*cell.borrow() {
                Thunk::Resolved(v) => v.kind(),
                Thunk::Pending { .. } => None,
            },
        }
    }

    pub fn is_evaluated(&self) -> bool {
        match self {
            Value::Expression { cell, .. } | Value::Comparison { cell, .. } =>
                matches!(&*cell.borrow(), Thunk::Resolved(_)),
            _ => true,
        }
    }

    // ─── Parsing ──────────────────────────────────────────────────────────────

    /// Parse one parameter's text. Tries integer, decimal, color and boolean
    /// literals, then (with a storage) variable references and operator
    /// expressions. The first match wins.
    pub fn parse(text: &str, storage: Option<&Storage>) -> Result<Value, ValueError> {
        let text = text.trim();
        match numeric_shape(text) {
            Some(false) => return text.parse::<i64>()
                .map(Value::Int)
                .map_err(|_| ValueError::NumberFormat(text.to_string())),
            Some(true) => return text.parse::<f64>()
                .map(Value::Double)
                .map_err(|_| ValueError::NumberFormat(text.to_string())),
            None => {}
        }
        if let Some(c) = Color::parse(text) { return Ok(Value::Color(c)); }
        if let Some(b) = parse_bool(text) { return Ok(Value::Bool(b)); }

        if let Some(storage) = storage {
            let tokens = operator_tokens(text);
            if tokens.len() > 1 {
                return ExprParser::new(text, &tokens, storage).parse();
            }
            if is_identifier(text) {
                return if storage.contains(text) {
                    Ok(Value::VariableRef(text.to_string()))
                } else {
                    Err(ValueError::Undeclared(text.to_string()))
                };
            }
        }

        let starts_numeric = text.trim_start_matches('-').starts_with(|c: char| c.is_ascii_digit());
        if starts_numeric {
            Err(ValueError::NumberFormat(text.to_string()))
        } else {
            Err(ValueError::NoMatchingType(text.to_string()))
        }
    }

    // ─── Evaluation ───────────────────────────────────────────────────────────

    /// Reduce to a literal (`Int`, `Double`, `Bool` or `Color`).
    pub fn resolve(&self, storage: &Storage) -> Result<Value, ValueError> {
        match self {
            Value::Int(_) | Value::Double(_) | Value::Bool(_) | Value::Color(_) => Ok(self.clone()),
            Value::VariableRef(name) => match storage.get(name) {
                Ok(Some(v)) => v.resolve(storage),
                Ok(None) => Err(ValueError::Uninitialised(name.clone())),
                Err(_) => Err(ValueError::Undeclared(name.clone())),
            },
            Value::Expression { op, cell } => force(cell, storage, |l, r| arith(*op, l, r)),
            Value::Comparison { op, cell } => force(cell, storage, |l, r| compare(*op, l, r)),
        }
    }

    pub fn to_int(&self, storage: &Storage) -> Result<i64, ValueError> {
        match self.resolve(storage)? {
            Value::Int(i) => Ok(i),
            Value::Double(d) => {
                let t = d.trunc();
                if t >= i64::MIN as f64 && t <= i64::MAX as f64 { Ok(t as i64) }
                else { Err(ValueError::Overflow) }
            }
            other => Err(mismatch(Kind::Int, &other)),
        }
    }

    pub fn to_double(&self, storage: &Storage) -> Result<f64, ValueError> {
        match self.resolve(storage)? {
            Value::Int(i) => Ok(i as f64),
            Value::Double(d) => Ok(d),
            other => Err(mismatch(Kind::Double, &other)),
        }
    }

    pub fn to_bool(&self, storage: &Storage) -> Result<bool, ValueError> {
        match self.resolve(storage)? {
            Value::Bool(b) => Ok(b),
            Value::Int(i) => Ok(i != 0),
            other => Err(mismatch(Kind::Bool, &other)),
        }
    }

    pub fn to_color(&self, storage: &Storage) -> Result<Color, ValueError> {
        match self.resolve(storage)? {
            Value::Color(c) => Ok(c),
            other => Err(mismatch(Kind::Color, &other)),
        }
    }

    // ─── Description ──────────────────────────────────────────────────────────

    pub fn describe(&self) -> String {
        match self {
            Value::Int(i)    => i.to_string(),
            Value::Double(d) => d.to_string(),
            Value::Bool(b)   => b.to_string(),
            Value::Color(c)  => c.to_string(),
            Value::VariableRef(name) => name.clone(),
            Value::Expression { op, cell } => describe_thunk(op.symbol(), &cell.borrow()),
            Value::Comparison { op, cell } => describe_thunk(op.symbol(), &cell.borrow()),
        }
    }
}

impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Double(v) } }
impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<Color> for Value { fn from(v: Color) -> Self { Value::Color(v) } }

fn pending(lhs: Value, rhs: Value) -> Thunk {
    Thunk::Pending { lhs: Box::new(lhs), rhs: Box::new(rhs) }
}

fn force(
    cell: &RefCell<Thunk>,
    storage: &Storage,
    apply: impl FnOnce(Value, Value) -> Result<Value, ValueError>,
) -> Result<Value, ValueError> {
    let result = {
        let state = cell.borrow();
        match &*state {
            Thunk::Resolved(v) => return Ok((**v).clone()),
            Thunk::Pending { lhs, rhs } => apply(lhs.resolve(storage)?, rhs.resolve(storage)?)?,
        }
    };
    cell.replace(Thunk::Resolved(Box::new(result.clone())));
    Ok(result)
}

fn describe_thunk(symbol: &str, thunk: &Thunk) -> String {
    match thunk {
        Thunk::Pending { lhs, rhs } => format!("({} {symbol} {})", lhs.describe(), rhs.describe()),
        Thunk::Resolved(v) => v.describe(),
    }
}

fn mismatch(expected: Kind, found: &Value) -> ValueError {
    match found.kind() {
        Some(found) => ValueError::TypeMismatch { expected, found },
        None => ValueError::NoMatchingType(found.describe()),
    }
}

fn literal_kind(v: &Value) -> Kind {
    v.kind().unwrap_or(Kind::Int)
}

// ─── Operators ────────────────────────────────────────────────────────────────

fn arith(op: ArithOp, l: Value, r: Value) -> Result<Value, ValueError> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => {
            let out = match op {
                ArithOp::Add => a.checked_add(b),
                ArithOp::Sub => a.checked_sub(b),
                ArithOp::Mul => a.checked_mul(b),
                ArithOp::Div => {
                    if b == 0 { return Err(ValueError::DivideByZero); }
                    a.checked_div(b)
                }
            };
            out.map(Value::Int).ok_or(ValueError::Overflow)
        }
        (Value::Double(a), Value::Double(b)) => {
            let out = match op {
                ArithOp::Add => a + b,
                ArithOp::Sub => a - b,
                ArithOp::Mul => a * b,
                ArithOp::Div => {
                    if b == 0.0 { return Err(ValueError::DivideByZero); }
                    a / b
                }
            };
            if out.is_finite() { Ok(Value::Double(out)) } else { Err(ValueError::Overflow) }
        }
        (Value::Bool(a), Value::Bool(b)) => match op {
            ArithOp::Add => Ok(Value::Bool(a || b)),
            ArithOp::Sub => Ok(Value::Bool(a ^ b)),
            ArithOp::Mul => Ok(Value::Bool(a && b)),
            ArithOp::Div => Err(ValueError::InvalidOperator { op: op.symbol(), kind: Kind::Bool }),
        },
        (Value::Color(_), Value::Color(_)) =>
            Err(ValueError::InvalidOperator { op: op.symbol(), kind: Kind::Color }),
        (l, r) => Err(ValueError::OperandMismatch {
            op: op.symbol(), lhs: literal_kind(&l), rhs: literal_kind(&r),
        }),
    }
}

fn compare(op: CmpOp, l: Value, r: Value) -> Result<Value, ValueError> {
    use std::cmp::Ordering;

    let ordering = match (&l, &r) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
        (Value::Bool(a), Value::Bool(b)) => return equality(op, a == b, Kind::Bool),
        (Value::Color(a), Value::Color(b)) => return equality(op, a == b, Kind::Color),
        _ => return Err(ValueError::OperandMismatch {
            op: op.symbol(), lhs: literal_kind(&l), rhs: literal_kind(&r),
        }),
    };
    let result = match op {
        CmpOp::Gt    => ordering == Some(Ordering::Greater),
        CmpOp::Lt    => ordering == Some(Ordering::Less),
        CmpOp::Eq    => ordering == Some(Ordering::Equal),
        CmpOp::NotEq => ordering != Some(Ordering::Equal),
    };
    Ok(Value::Bool(result))
}

fn equality(op: CmpOp, equal: bool, kind: Kind) -> Result<Value, ValueError> {
    match op {
        CmpOp::Eq    => Ok(Value::Bool(equal)),
        CmpOp::NotEq => Ok(Value::Bool(!equal)),
        CmpOp::Gt | CmpOp::Lt => Err(ValueError::InvalidOperator { op: op.symbol(), kind }),
    }
}

// ─── Literal helpers ──────────────────────────────────────────────────────────

/// `Some(false)` for integer-shaped text, `Some(true)` for decimal-shaped
/// text, `None` otherwise. Only ASCII digits, one leading `-` and one `.`.
fn numeric_shape(text: &str) -> Option<bool> {
    let body = text.strip_prefix('-').unwrap_or(text);
    let mut digits = 0;
    let mut dots = 0;
    for b in body.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => dots += 1,
            _ => return None,
        }
    }
    match (digits, dots) {
        (0, _) => None,
        (_, 0) => Some(false),
        (_, 1) => Some(true),
        _ => None,
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" | "on" => Some(true),
        "false" | "off" => Some(false),
        _ => None,
    }
}

/// Shape of a variable or procedure name: `[a-z_][a-z0-9_]*`.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ─── Expression parser ────────────────────────────────────────────────────────

/// Precedence climbing over pre-split operator tokens:
///   comparison := sum [cmp sum]
///   sum        := product (('+' | '-') product)*
///   product    := operand (('*' | '/') operand)*
struct ExprParser<'a> {
    text: &'a str,
    tokens: &'a [String],
    pos: usize,
    storage: &'a Storage,
}

impl<'a> ExprParser<'a> {
    fn new(text: &'a str, tokens: &'a [String], storage: &'a Storage) -> Self {
        Self { text, tokens, pos: 0, storage }
    }

    fn parse(mut self) -> Result<Value, ValueError> {
        let lhs = self.sum()?;
        let value = match self.peek().and_then(CmpOp::from_token) {
            Some(op) => {
                self.pos += 1;
                let rhs = self.sum()?;
                Value::comparison(op, lhs, rhs)
            }
            None => lhs,
        };
        if self.pos != self.tokens.len() { return Err(self.malformed()); }
        Ok(value)
    }

    fn sum(&mut self) -> Result<Value, ValueError> {
        let mut lhs = self.product()?;
        while let Some(op) = self.peek().and_then(ArithOp::from_token) {
            if !matches!(op, ArithOp::Add | ArithOp::Sub) { break; }
            self.pos += 1;
            let rhs = self.product()?;
            lhs = Value::expression(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn product(&mut self) -> Result<Value, ValueError> {
        let mut lhs = self.operand()?;
        while let Some(op) = self.peek().and_then(ArithOp::from_token) {
            if !matches!(op, ArithOp::Mul | ArithOp::Div) { break; }
            self.pos += 1;
            let rhs = self.operand()?;
            lhs = Value::expression(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn operand(&mut self) -> Result<Value, ValueError> {
        let Some(tok) = self.peek() else { return Err(self.malformed()) };
        if ArithOp::from_token(tok).is_some() || CmpOp::from_token(tok).is_some() {
            return Err(self.malformed());
        }
        self.pos += 1;
        Value::parse(tok, Some(self.storage))
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn malformed(&self) -> ValueError {
        ValueError::NoMatchingType(self.text.to_string())
    }
}
