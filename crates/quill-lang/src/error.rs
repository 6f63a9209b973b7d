use crate::runtime::storage::StorageError;
use crate::runtime::value::ValueError;

/// Broad error family, one per phase that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Name,
    Structural,
    Evaluation,
    RuntimeCap,
}

/// Error codes prefixed by kind: P = parse, N = name, S = structural,
/// E = evaluation, R = runtime cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Parse
    P001, // no matching value type
    P002, // malformed number
    P003, // wrong parameter count
    P004, // unknown command
    P005, // malformed statement

    // Name
    N001, // duplicate variable
    N002, // invalid variable name
    N003, // undeclared variable
    N004, // duplicate procedure
    N005, // undefined procedure

    // Structural
    S001, // `end` without an open block
    S002, // block never closed
    S003, // `ret` outside a procedure

    // Evaluation
    E001, // type mismatch
    E002, // division by zero
    E003, // operator not applicable to type
    E004, // variable has no value yet
    E005, // integer overflow
    E006, // argument out of range

    // Runtime cap
    R001, // loop iteration limit
    R002, // call depth limit
}

impl ErrorCode {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::P001 | Self::P002 | Self::P003 | Self::P004 | Self::P005 => ErrorKind::Parse,
            Self::N001 | Self::N002 | Self::N003 | Self::N004 | Self::N005 => ErrorKind::Name,
            Self::S001 | Self::S002 | Self::S003 => ErrorKind::Structural,
            Self::E001 | Self::E002 | Self::E003 | Self::E004 | Self::E005 | Self::E006 => ErrorKind::Evaluation,
            Self::R001 | Self::R002 => ErrorKind::RuntimeCap,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P001 => "P001",
            Self::P002 => "P002",
            Self::P003 => "P003",
            Self::P004 => "P004",
            Self::P005 => "P005",
            Self::N001 => "N001",
            Self::N002 => "N002",
            Self::N003 => "N003",
            Self::N004 => "N004",
            Self::N005 => "N005",
            Self::S001 => "S001",
            Self::S002 => "S002",
            Self::S003 => "S003",
            Self::E001 => "E001",
            Self::E002 => "E002",
            Self::E003 => "E003",
            Self::E004 => "E004",
            Self::E005 => "E005",
            Self::E006 => "E006",
            Self::R001 => "R001",
            Self::R002 => "R002",
        }
    }

    /// Short human title, used as the diagnostic headline.
    pub fn title(&self) -> &'static str {
        match self {
            Self::P001 => "Unrecognised value",
            Self::P002 => "Malformed number",
            Self::P003 => "Wrong number of parameters",
            Self::P004 => "Unknown command",
            Self::P005 => "Malformed statement",
            Self::N001 => "Variable already declared",
            Self::N002 => "Invalid variable name",
            Self::N003 => "Undeclared variable",
            Self::N004 => "Procedure already defined",
            Self::N005 => "Undefined procedure",
            Self::S001 => "Unbalanced block",
            Self::S002 => "Unterminated block",
            Self::S003 => "Return outside procedure",
            Self::E001 => "Type mismatch",
            Self::E002 => "Division by zero",
            Self::E003 => "Invalid operator",
            Self::E004 => "Uninitialised variable",
            Self::E005 => "Integer overflow",
            Self::E006 => "Argument out of range",
            Self::R001 => "Iteration limit exceeded",
            Self::R002 => "Call depth exceeded",
        }
    }
}

// ─── Error ────────────────────────────────────────────────────────────────────

/// A failure attributed to one source line. `context` holds the raw text of
/// that line (parse errors) or the description of the failing verb (runtime).
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub code: ErrorCode,
    pub line: usize,
    pub context: String,
    pub message: String,
}

impl Error {
    pub fn new(code: ErrorCode, line: usize, message: impl Into<String>) -> Self {
        Self { code, line, context: String::new(), message: message.into() }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn kind(&self) -> ErrorKind { self.code.kind() }

    /// Wrap a value-model failure. `param` is the 1-based parameter position,
    /// when the value came from a command parameter.
    pub fn from_value(err: ValueError, line: usize, param: Option<usize>) -> Self {
        let message = match param {
            Some(n) => format!("parameter {n}: {err}"),
            None => err.to_string(),
        };
        Self::new(err.code(), line, message)
    }

    pub fn from_storage(err: StorageError, line: usize) -> Self {
        Self::new(err.code(), line, err.to_string())
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let severity = match self.kind() {
            ErrorKind::RuntimeCap => Severity::Fatal,
            _ => Severity::Error,
        };
        let long = if self.context.is_empty() {
            format!("line {}: {}", self.line, self.message)
        } else {
            format!("line {}: {}\n    {}", self.line, self.message, self.context)
        };
        Diagnostic {
            title: format!("{} [{}]", self.code.title(), self.code.as_str()),
            short: self.message.clone(),
            long,
            severity,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} — {}", self.code.as_str(), self.line, self.message)
    }
}

impl std::error::Error for Error {}

// ─── Diagnostics ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

/// Presentation-neutral error payload handed to a `Reporter`.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub title: String,
    pub short: String,
    pub long: String,
    pub severity: Severity,
}

/// Receives diagnostics from a session. The embedding application owns
/// presentation (dialog, status bar, stderr).
pub trait Reporter {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Reporter that keeps everything it receives.
#[derive(Debug, Default)]
pub struct Collected(pub Vec<Diagnostic>);

impl Reporter for Collected {
    fn report(&mut self, diagnostic: Diagnostic) { self.0.push(diagnostic); }
}

/// Lets the caller keep a handle on a reporter it gave to a session.
impl<R: Reporter> Reporter for std::rc::Rc<std::cell::RefCell<R>> {
    fn report(&mut self, diagnostic: Diagnostic) { self.borrow_mut().report(diagnostic); }
}
