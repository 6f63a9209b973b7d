//! Line normalizer and parameter tokenizer.
//!
//! The language is line oriented, so there is no token stream across lines:
//! `lines` produces normalized logical lines, `split_command` cuts one line
//! into a keyword and its parameters, and `operator_tokens` splits a
//! parameter around operator glyphs.

use crate::syntax::token::{OPERATOR_CHARS, is_operator};

/// One non-empty source line after comment stripping and case folding.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// 1-based line number in the original script.
    pub number: usize,
    /// Normalized text: comment removed, trimmed, lower case.
    pub text: String,
    /// Trimmed original text, for error context.
    pub raw: String,
}

pub fn lines(source: &str) -> Vec<Line> {
    let source = source.replace("\r\n", "\n");
    source.split('\n')
        .enumerate()
        .filter_map(|(i, raw)| {
            let code = raw.split_once('@').map_or(raw, |(code, _)| code).trim();
            if code.is_empty() { return None; }
            Some(Line { number: i + 1, text: code.to_lowercase(), raw: raw.trim().to_string() })
        })
        .collect()
}

/// Split around operator glyphs and whitespace.
///
/// `!` followed by `=` (or on its own) becomes `!=`; a `-` with no left
/// operand directly before a number becomes part of that number.
pub fn operator_tokens(text: &str) -> Vec<String> {
    let mut padded = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if OPERATOR_CHARS.contains(c) {
            padded.push(' ');
            padded.push(c);
            padded.push(' ');
        } else {
            padded.push(c);
        }
    }

    let mut out: Vec<String> = Vec::new();
    let mut raw = padded.split_whitespace().peekable();
    while let Some(tok) = raw.next() {
        if tok == "!" {
            if raw.peek() == Some(&"=") { raw.next(); }
            out.push("!=".to_string());
            continue;
        }
        let unary = tok == "-" && out.last().is_none_or(|prev| is_operator(prev));
        if unary {
            if let Some(next) = raw.peek().filter(|n| n.starts_with(|c: char| c.is_ascii_digit())) {
                out.push(format!("-{next}"));
                raw.next();
                continue;
            }
        }
        out.push(tok.to_string());
    }
    out
}

/// Cut a normalized line into its keyword and parameter texts.
///
/// Parameters are separated by commas or by whitespace between two
/// operands; an operand-operator-operand run stays together, so `10 10` is
/// two parameters and `x + 1, 10` is two as well.
pub fn split_command(text: &str) -> (&str, Vec<String>) {
    let (keyword, rest) = match text.split_once(char::is_whitespace) {
        Some((kw, rest)) => (kw, rest.trim()),
        None => (text, ""),
    };
    (keyword, split_params(rest))
}

pub fn split_params(rest: &str) -> Vec<String> {
    if rest.is_empty() { return Vec::new(); }

    let mut params = Vec::new();
    for segment in rest.split(',') {
        let tokens = operator_tokens(segment);
        if tokens.is_empty() {
            params.push(String::new());
            continue;
        }
        let mut current: Vec<String> = Vec::new();
        for tok in tokens {
            let starts_new = current.last().is_some_and(|prev| !is_operator(prev)) && !is_operator(&tok);
            if starts_new {
                params.push(current.join(" "));
                current.clear();
            }
            current.push(tok);
        }
        params.push(current.join(" "));
    }
    params
}
