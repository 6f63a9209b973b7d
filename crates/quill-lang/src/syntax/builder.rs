//! Chunk builder: nests the flat verb stream into blocks.
//!
//! An explicit stack holds the open blocks. Openers push a frame, `end`
//! pops it and attaches the finished chunk to the frame below (or to the
//! program once the stack is empty). Procedure definitions go to the
//! procedure table instead of the tree.

use crate::error::{Error, ErrorCode};
use crate::runtime::verb::Verb;
use crate::syntax::ast::{Chunk, Node, Program};

#[derive(Default)]
pub struct ChunkBuilder {
    open: Vec<Chunk>,
    program: Program,
}

impl ChunkBuilder {
    pub fn new() -> Self { Self::default() }

    /// Number of blocks currently open. 0 at root.
    pub fn depth(&self) -> usize { self.open.len() }

    pub fn push(&mut self, verb: Verb, line: usize) -> Result<(), Error> {
        match verb {
            Verb::End => {
                let chunk = self.open.pop().ok_or_else(|| {
                    Error::new(ErrorCode::S001, line, "`end` without an open block")
                })?;
                self.close(chunk);
            }
            Verb::Def { ref name } => {
                if self.defines(name) {
                    return Err(Error::new(ErrorCode::N004, line,
                        format!("procedure `{name}` is already defined")));
                }
                self.open.push(Chunk::new(verb, line));
            }
            Verb::Return if !self.inside_procedure() => {
                return Err(Error::new(ErrorCode::S003, line, "`ret` outside a procedure"));
            }
            v if v.opens_block() => self.open.push(Chunk::new(v, line)),
            v => self.attach(Node::Verb { verb: v, line }),
        }
        Ok(())
    }

    /// End of input. Fails if any block is still open, handing back the
    /// items completed before the outermost open block.
    pub fn finish(self) -> Result<Program, (Error, Program)> {
        match self.open.last() {
            Some(chunk) => {
                let error = Error::new(ErrorCode::S002, chunk.line, format!(
                    "block opened here is never closed ({} still open)", self.open.len()
                )).with_context(chunk.header.describe());
                Err((error, self.program))
            }
            None => Ok(self.program),
        }
    }

    /// Everything completed so far; open blocks are dropped.
    pub fn into_partial(self) -> Program { self.program }

    fn close(&mut self, chunk: Chunk) {
        if let Verb::Def { name } = &chunk.header {
            self.program.procedures.insert(name.clone(), chunk);
        } else {
            self.attach(Node::Chunk(chunk));
        }
    }

    fn attach(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(frame) => frame.body.push(node),
            None => self.program.items.push(node),
        }
    }

    fn defines(&self, name: &str) -> bool {
        self.program.procedures.contains_key(name)
            || self.open.iter().any(|c| matches!(&c.header, Verb::Def { name: n } if n == name))
    }

    fn inside_procedure(&self) -> bool {
        self.open.iter().any(|c| matches!(c.header, Verb::Def { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::value::Value;

    fn guard() -> Verb { Verb::If { guard: Value::Bool(true) } }

    #[test]
    fn nests_blocks() {
        let mut b = ChunkBuilder::new();
        b.push(guard(), 1).unwrap();
        b.push(Verb::While { guard: Value::Bool(false) }, 2).unwrap();
        assert_eq!(b.depth(), 2);
        b.push(Verb::Dot, 3).unwrap();
        b.push(Verb::End, 4).unwrap();
        b.push(Verb::Clear, 5).unwrap();
        b.push(Verb::End, 6).unwrap();
        let program = b.finish().unwrap();

        assert_eq!(program.len(), 1);
        let Node::Chunk(outer) = &program.items[0] else { panic!("expected chunk") };
        assert_eq!(outer.body.len(), 2);
        assert!(matches!(&outer.body[0], Node::Chunk(inner) if inner.body.len() == 1));
        assert!(matches!(&outer.body[1], Node::Verb { verb: Verb::Clear, line: 5 }));
    }

    #[test]
    fn unmatched_end() {
        let mut b = ChunkBuilder::new();
        let err = b.push(Verb::End, 7).unwrap_err();
        assert_eq!((err.code, err.line), (ErrorCode::S001, 7));
    }

    #[test]
    fn unterminated_block_points_at_opener() {
        let mut b = ChunkBuilder::new();
        b.push(Verb::Dot, 1).unwrap();
        b.push(guard(), 2).unwrap();
        b.push(Verb::Dot, 3).unwrap();
        let (err, completed) = b.finish().unwrap_err();
        assert_eq!((err.code, err.line), (ErrorCode::S002, 2));
        assert_eq!(completed.len(), 1);
        assert!(matches!(completed.items[0], Node::Verb { verb: Verb::Dot, line: 1 }));
    }

    #[test]
    fn procedures_leave_the_tree() {
        let mut b = ChunkBuilder::new();
        b.push(Verb::Def { name: "box".into() }, 1).unwrap();
        b.push(Verb::Dot, 2).unwrap();
        b.push(Verb::Return, 3).unwrap();
        b.push(Verb::End, 4).unwrap();
        let err = b.push(Verb::Def { name: "box".into() }, 5).unwrap_err();
        assert_eq!(err.code, ErrorCode::N004);

        let program = b.into_partial();
        assert!(program.items.is_empty());
        assert_eq!(program.procedure("box").map(|c| c.body.len()), Some(2));
    }

    #[test]
    fn return_needs_a_procedure() {
        let mut b = ChunkBuilder::new();
        b.push(guard(), 1).unwrap();
        let err = b.push(Verb::Return, 2).unwrap_err();
        assert_eq!(err.code, ErrorCode::S003);
    }
}
