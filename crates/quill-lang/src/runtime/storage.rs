use std::collections::HashMap;

use crate::error::ErrorCode;
use crate::runtime::value::{Value, is_identifier};
use crate::syntax::token::is_reserved;
use crate::types::color::Color;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("`{0}` has already been declared")]
    DuplicateName(String),
    #[error("`{name}` is not a valid variable name: {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("undeclared variable `{0}`")]
    Undeclared(String),
}

impl StorageError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateName(_)    => ErrorCode::N001,
            Self::InvalidName { .. }  => ErrorCode::N002,
            Self::Undeclared(_)       => ErrorCode::N003,
        }
    }
}

/// Flat variable namespace for one program. A slot may be declared before
/// it holds a value: the parser reserves names so later lines can refer to
/// them, execution fills them in.
#[derive(Debug, Clone, Default)]
pub struct Storage {
    slots: HashMap<String, Option<Value>>,
}

impl Storage {
    pub fn new() -> Self { Self::default() }

    pub fn declare(&mut self, name: &str, value: Option<Value>) -> Result<(), StorageError> {
        if self.slots.contains_key(name) {
            return Err(StorageError::DuplicateName(name.to_string()));
        }
        check_name(name)?;
        self.slots.insert(name.to_string(), value);
        Ok(())
    }

    /// Bind or overwrite, declared or not.
    pub fn set(&mut self, name: &str, value: Value) {
        self.slots.insert(name.to_string(), Some(value));
    }

    /// `Ok(None)` for a declared slot that has not been assigned yet.
    pub fn get(&self, name: &str) -> Result<Option<&Value>, StorageError> {
        self.slots.get(name)
            .map(Option::as_ref)
            .ok_or_else(|| StorageError::Undeclared(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool { self.slots.contains_key(name) }

    pub fn len(&self) -> usize { self.slots.len() }

    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn reset(&mut self) { self.slots.clear(); }
}

/// Reject names that would read back as something else: keywords, literals
/// (`on`, `red`, `deadbe`) and anything outside `[a-z_][a-z0-9_]*`.
pub fn check_name(name: &str) -> Result<(), StorageError> {
    let invalid = |reason| Err(StorageError::InvalidName { name: name.to_string(), reason });
    if name.is_empty() {
        return invalid("name is empty");
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return invalid("names cannot start with a digit");
    }
    if !is_identifier(name) {
        return invalid("only letters, digits and `_` are allowed");
    }
    if is_reserved(name) {
        return invalid("name is a reserved keyword");
    }
    if Color::parse(name).is_some() {
        return invalid("name reads as a color literal");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_then_get() {
        let mut s = Storage::new();
        s.declare("size", Some(Value::Int(4))).unwrap();
        assert!(matches!(s.get("size"), Ok(Some(Value::Int(4)))));
    }

    #[test]
    fn declared_without_value_reads_empty() {
        let mut s = Storage::new();
        s.declare("later", None).unwrap();
        assert!(matches!(s.get("later"), Ok(None)));
    }

    #[test]
    fn duplicate_is_rejected() {
        let mut s = Storage::new();
        s.declare("x", None).unwrap();
        assert_eq!(s.declare("x", None), Err(StorageError::DuplicateName("x".into())));
    }

    #[test]
    fn reserved_and_illegal_names() {
        let mut s = Storage::new();
        for name in ["if", "circle", "var", "end", "on", "x+y", "9lives", "a b", "red", "beaded", ""] {
            let err = s.declare(name, None).unwrap_err();
            assert_eq!(err.code(), ErrorCode::N002, "{name:?} should be rejected");
        }
        assert!(s.is_empty());
    }

    #[test]
    fn set_overwrites_and_reset_clears() {
        let mut s = Storage::new();
        s.declare("x", Some(Value::Int(1))).unwrap();
        s.set("x", Value::Int(2));
        s.set("fresh", Value::Bool(true));
        assert!(matches!(s.get("x"), Ok(Some(Value::Int(2)))));
        assert_eq!(s.len(), 2);
        s.reset();
        assert!(s.is_empty());
        assert_eq!(s.get("x").unwrap_err(), StorageError::Undeclared("x".into()));
    }
}
