pub mod error;
pub mod runtime;
pub mod syntax;
pub mod types;

pub use error::{Collected, Diagnostic, Error, ErrorCode, ErrorKind, Reporter, Severity};
pub use runtime::canvas::{Canvas, CanvasCall, Recorder};
pub use runtime::storage::Storage;
pub use runtime::value::{Kind, Value};
pub use runtime::verb::Verb;
pub use syntax::ast::Program;
pub use types::color::Color;
pub use types::draw::Point;

use runtime::interpreter::{Context, Interpreter};
use syntax::parser::{ParseFailure, parse};

// ─── Configuration ────────────────────────────────────────────────────────────

/// What happens to already-applied work when a script fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Leniency {
    /// Roll back: drop the program, reset storage, clear the canvas.
    #[default]
    Strict,
    /// Keep everything parsed or drawn before the failure.
    Pardon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub leniency: Leniency,
    /// Iterations one `while` may run before the script is stopped. `for`
    /// loops are bounded by their own range.
    pub max_loop_iterations: usize,
    /// Nested `call` depth before the script is stopped.
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { leniency: Leniency::Strict, max_loop_iterations: 10_000, max_call_depth: 256 }
    }
}

impl Config {
    pub fn with_leniency(mut self, leniency: Leniency) -> Self {
        self.leniency = leniency;
        self
    }

    pub fn with_max_loop_iterations(mut self, n: usize) -> Self {
        self.max_loop_iterations = n;
        self
    }

    pub fn with_max_call_depth(mut self, n: usize) -> Self {
        self.max_call_depth = n;
        self
    }
}

// ─── Public API ───────────────────────────────────────────────────────────────

/// Parse source text on a scratch storage. Useful for checking a script
/// without running it; use `Session` to execute.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compile(source: &str) -> Result<Program, Error> {
    parse(source, &mut Storage::new()).map_err(|failure| failure.error)
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// One user's interpreter: the canvas it draws on, the variable storage and
/// the currently loaded program.
///
/// Lifecycle:
///   1. `load(source)` parses into the session, replacing the program.
///   2. `execute()` runs the loaded program against the canvas.
///
/// `run(source)` does both.
pub struct Session<C: Canvas> {
    canvas: C,
    storage: Storage,
    program: Program,
    config: Config,
    reporter: Option<Box<dyn Reporter>>,
}

impl<C: Canvas> Session<C> {
    pub fn new(canvas: C) -> Self {
        Self {
            canvas,
            storage: Storage::new(),
            program: Program::default(),
            config: Config::default(),
            reporter: None,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Every failure is forwarded to `reporter` as a `Diagnostic`.
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    pub fn config(&self) -> &Config { &self.config }
    pub fn canvas(&self) -> &C { &self.canvas }
    pub fn canvas_mut(&mut self) -> &mut C { &mut self.canvas }
    pub fn storage(&self) -> &Storage { &self.storage }
    pub fn program(&self) -> &Program { &self.program }
    pub fn into_canvas(self) -> C { self.canvas }

    /// Forget the program and all variables, and clear the canvas.
    pub fn reset(&mut self) {
        self.program = Program::default();
        self.storage.reset();
        self.canvas.clear();
    }

    /// Parse `source` into this session, discarding the previous program and
    /// every variable. Returns the number of top-level items. On failure a
    /// strict session ends up empty; a pardoning one keeps the items
    /// completed before the failing line.
    pub fn load(&mut self, source: &str) -> Result<usize, Error> {
        self.storage.reset();
        match parse(source, &mut self.storage) {
            Ok(program) => {
                self.program = program;
                Ok(self.program.len())
            }
            Err(ParseFailure { error, partial }) => {
                match self.config.leniency {
                    Leniency::Strict => {
                        tracing::warn!(code = error.code.as_str(), line = error.line, "parse failed, rolling back");
                        self.program = Program::default();
                        self.storage.reset();
                    }
                    Leniency::Pardon => {
                        tracing::warn!(code = error.code.as_str(), line = error.line, kept = partial.len(),
                            "parse failed, keeping completed items");
                        self.program = partial;
                    }
                }
                self.report(&error);
                Err(error)
            }
        }
    }

    /// Run the loaded program. On failure a strict session clears the canvas
    /// and storage; a pardoning one keeps whatever was already applied.
    pub fn execute(&mut self) -> Result<(), Error> {
        let ctx = Context {
            canvas: &mut self.canvas,
            storage: &mut self.storage,
            procedures: &self.program.procedures,
            config: &self.config,
        };
        let result = Interpreter::new(ctx).run(&self.program.items);

        if let Err(error) = &result {
            match self.config.leniency {
                Leniency::Strict => {
                    tracing::warn!(code = error.code.as_str(), line = error.line, "run failed, rolling back");
                    self.canvas.clear();
                    self.storage.reset();
                }
                Leniency::Pardon => {
                    tracing::warn!(code = error.code.as_str(), line = error.line, "run failed, keeping effects");
                }
            }
            self.report(error);
        }
        result
    }

    /// Replace the program with `source` and run it. In pardon mode a parse
    /// failure still runs the items parsed before it, and the parse error is
    /// returned.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self, source: &str) -> Result<(), Error> {
        let loaded = self.load(source);
        tracing::debug!(
            items = self.program.len(),
            procedures = self.program.procedures.len(),
            ok = loaded.is_ok(),
            "session loaded"
        );
        match loaded {
            Ok(_) => self.execute(),
            Err(parse_error) if self.config.leniency == Leniency::Pardon => {
                self.execute()?;
                Err(parse_error)
            }
            Err(parse_error) => Err(parse_error),
        }
    }

    fn report(&mut self, error: &Error) {
        let Some(reporter) = self.reporter.as_mut() else { return };
        let mut diagnostic = error.to_diagnostic();
        if self.config.leniency == Leniency::Pardon && diagnostic.severity == Severity::Error {
            diagnostic.severity = Severity::Warning;
        }
        reporter.report(diagnostic);
    }
}
