pub mod ast;
pub mod builder;
pub mod lexer;
pub mod parser;
pub mod token;
