//! Tree-walking interpreter. Runs a built `Program` against a `Canvas`.
//! Leaf verbs execute themselves; this module owns control flow, the loop
//! and call-depth caps, and conversion of verb failures into `Error`s.

use std::collections::HashMap;

use crate::Config;
use crate::error::{Error, ErrorCode};
use crate::runtime::canvas::Canvas;
use crate::runtime::storage::Storage;
use crate::runtime::value::{Value, ValueError};
use crate::runtime::verb::{Verb, VerbError};
use crate::syntax::ast::{Chunk, Node};

// ─── Context ──────────────────────────────────────────────────────────────────

/// Everything a run touches. Passed in explicitly; the interpreter keeps no
/// state of its own beyond the call depth.
pub struct Context<'a> {
    pub canvas: &'a mut dyn Canvas,
    pub storage: &'a mut Storage,
    pub procedures: &'a HashMap<String, Chunk>,
    pub config: &'a Config,
}

/// What a block asks of its caller once it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    /// `ret` was executed; unwind to the innermost call.
    Return,
}

// ─── Interpreter ──────────────────────────────────────────────────────────────

pub struct Interpreter<'a> {
    ctx: Context<'a>,
    depth: usize,
    executed: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(ctx: Context<'a>) -> Self {
        Self { ctx, depth: 0, executed: 0 }
    }

    /// Run top-level items in order, halting at the first failure.
    pub fn run(&mut self, items: &[Node]) -> Result<(), Error> {
        self.exec_block(items)?;
        tracing::debug!(verbs = self.executed, "run complete");
        Ok(())
    }

    fn exec_block(&mut self, nodes: &[Node]) -> Result<Flow, Error> {
        for node in nodes {
            if self.exec_node(node)? == Flow::Return {
                return Ok(Flow::Return);
            }
        }
        Ok(Flow::Next)
    }

    fn exec_node(&mut self, node: &Node) -> Result<Flow, Error> {
        match node {
            Node::Verb { verb, line } => self.exec_leaf(verb, *line),
            Node::Chunk(chunk) => self.exec_chunk(chunk),
        }
    }

    fn exec_leaf(&mut self, verb: &Verb, line: usize) -> Result<Flow, Error> {
        self.executed += 1;
        tracing::trace!(line, depth = self.depth, "{}", verb.describe());
        match verb {
            Verb::Return => Ok(Flow::Return),
            Verb::Call { name } => self.call(name, verb, line),
            _ => {
                verb.execute(&mut *self.ctx.canvas, &mut *self.ctx.storage)
                    .map_err(|e| verb_error(e, verb, line))?;
                Ok(Flow::Next)
            }
        }
    }

    fn exec_chunk(&mut self, chunk: &Chunk) -> Result<Flow, Error> {
        self.executed += 1;
        let header = &chunk.header;
        let line = chunk.line;
        tracing::trace!(line, depth = self.depth, "{}", header.describe());

        match header {
            Verb::If { guard } => {
                if self.guard(guard, header, line)? {
                    return self.exec_block(&chunk.body);
                }
                Ok(Flow::Next)
            }
            Verb::While { guard } => {
                let mut iterations = 0usize;
                while self.guard(guard, header, line)? {
                    iterations += 1;
                    self.check_iterations(iterations, header, line)?;
                    if self.exec_block(&chunk.body)? == Flow::Return {
                        return Ok(Flow::Return);
                    }
                }
                Ok(Flow::Next)
            }
            Verb::For { var, start, end, step } => {
                let (start, end, step) = self.for_bounds(start, end, step.as_ref())
                    .map_err(|e| value_error(e, header, line))?;
                let mut counter = start;
                while (step > 0 && counter <= end) || (step < 0 && counter >= end) {
                    self.ctx.storage.set(var, Value::Int(counter));
                    if self.exec_block(&chunk.body)? == Flow::Return {
                        return Ok(Flow::Return);
                    }
                    match counter.checked_add(step) {
                        Some(next) => counter = next,
                        None => break,
                    }
                }
                Ok(Flow::Next)
            }
            // Registered at parse time; reaching the definition runs nothing.
            Verb::Def { .. } => Ok(Flow::Next),
            other => self.exec_leaf(other, line),
        }
    }

    // ─── Control helpers ──────────────────────────────────────────────────────

    fn call(&mut self, name: &str, verb: &Verb, line: usize) -> Result<Flow, Error> {
        let procedures = self.ctx.procedures;
        let Some(procedure) = procedures.get(name) else {
            return Err(Error::new(ErrorCode::N005, line, format!("procedure `{name}` is not defined"))
                .with_context(verb.describe()));
        };
        if self.depth >= self.ctx.config.max_call_depth {
            return Err(Error::new(ErrorCode::R002, line, format!(
                "call depth exceeded {} while calling `{name}`", self.ctx.config.max_call_depth
            )).with_context(verb.describe()));
        }

        self.depth += 1;
        let result = self.exec_block(&procedure.body);
        self.depth -= 1;
        result?;
        Ok(Flow::Next)
    }

    /// Guards are templates: every check reads a fresh copy.
    fn guard(&self, guard: &Value, header: &Verb, line: usize) -> Result<bool, Error> {
        guard.clone().to_bool(&*self.ctx.storage).map_err(|e| value_error(e, header, line))
    }

    fn for_bounds(&self, start: &Value, end: &Value, step: Option<&Value>) -> Result<(i64, i64, i64), ValueError> {
        let storage: &Storage = &*self.ctx.storage;
        let start = start.clone().to_int(storage)?;
        let end = end.clone().to_int(storage)?;
        let step = match step {
            Some(s) => s.clone().to_int(storage)?,
            None => 1,
        };
        if step == 0 {
            return Err(ValueError::OutOfRange("`for` step cannot be zero".into()));
        }
        Ok((start, end, step))
    }

    fn check_iterations(&self, iterations: usize, header: &Verb, line: usize) -> Result<(), Error> {
        let cap = self.ctx.config.max_loop_iterations;
        if iterations > cap {
            tracing::warn!(line, cap, "loop iteration limit hit");
            return Err(Error::new(ErrorCode::R001, line, format!("loop exceeded {cap} iterations"))
                .with_context(header.describe()));
        }
        Ok(())
    }
}

fn verb_error(err: VerbError, verb: &Verb, line: usize) -> Error {
    Error::new(err.code(), line, err.to_string()).with_context(verb.describe())
}

fn value_error(err: ValueError, verb: &Verb, line: usize) -> Error {
    Error::from_value(err, line, None).with_context(verb.describe())
}
