use std::collections::HashMap;

use crate::runtime::verb::Verb;

/// One entry of a program body.
#[derive(Debug, Clone)]
pub enum Node {
    Verb { verb: Verb, line: usize },
    Chunk(Chunk),
}

impl Node {
    pub fn line(&self) -> usize {
        match self {
            Node::Verb { line, .. } => *line,
            Node::Chunk(c) => c.line,
        }
    }

    pub fn verb(&self) -> &Verb {
        match self {
            Node::Verb { verb, .. } => verb,
            Node::Chunk(c) => &c.header,
        }
    }
}

/// A block-opening verb plus the body it governs.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// `If`, `While`, `For` or `Def`.
    pub header: Verb,
    /// Line of the opening verb.
    pub line: usize,
    pub body: Vec<Node>,
}

impl Chunk {
    pub fn new(header: Verb, line: usize) -> Self {
        Self { header, line, body: Vec::new() }
    }
}

/// Result of one parse pass. Procedure bodies live in `procedures`, not in
/// `items`.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub items: Vec<Node>,
    pub procedures: HashMap<String, Chunk>,
}

impl Program {
    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() && self.procedures.is_empty() }

    pub fn procedure(&self, name: &str) -> Option<&Chunk> { self.procedures.get(name) }

    /// One description per top-level item, in document order.
    pub fn describe(&self) -> Vec<String> {
        self.items.iter().map(|n| n.verb().describe()).collect()
    }
}
