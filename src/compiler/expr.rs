//! Restricted template expressions.
//!
//! `{{ ... }}` placeholders are limited to literals, dotted property paths,
//! zero-argument method calls and `!` negation. Anything else is rejected at
//! parse time rather than evaluated.

use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// `a.b.c`, with an optional leading `this.` stripped
    Path(Vec<String>),
    /// `name()`: a component method, evaluated only by the preview runtime
    Call(String),
    Not(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedExpr(pub String);

impl fmt::Display for UnsupportedExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported template expression: {}", self.0)
    }
}

impl std::error::Error for UnsupportedExpr {}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Parse the text inside a `{{ }}` placeholder
pub fn parse(source: &str) -> Result<Expr, UnsupportedExpr> {
    let text = source.trim();
    let unsupported = || UnsupportedExpr(text.to_string());
    if text.is_empty() {
        return Err(unsupported());
    }
    if let Some(rest) = text.strip_prefix('!') {
        return Ok(Expr::Not(Box::new(parse(rest)?)));
    }
    if let Some(s) = super::extract::unquote(text) {
        if !text.starts_with('`') {
            return Ok(Expr::Literal(Value::String(s)));
        }
    }
    match text {
        "true" => return Ok(Expr::Literal(Value::Bool(true))),
        "false" => return Ok(Expr::Literal(Value::Bool(false))),
        "null" | "undefined" => return Ok(Expr::Literal(Value::Null)),
        _ => {}
    }
    if let Ok(n) = text.parse::<f64>() {
        return serde_json::Number::from_f64(n)
            .map(|n| Expr::Literal(Value::Number(n)))
            .ok_or_else(unsupported);
    }
    let text = text.strip_prefix("this.").unwrap_or(text);
    if let Some(name) = text.strip_suffix("()") {
        let name = name.trim_end();
        if is_ident(name) {
            return Ok(Expr::Call(name.to_string()));
        }
        return Err(unsupported());
    }
    let segments: Vec<&str> = text.split('.').map(str::trim).collect();
    if segments.iter().all(|s| is_ident(s)) {
        return Ok(Expr::Path(segments.into_iter().map(str::to_string).collect()));
    }
    Err(unsupported())
}

/// Evaluate against a state object. Calls and missing paths yield `Null`.
pub fn evaluate(expr: &Expr, state: &Value) -> Value {
    match expr {
        Expr::Literal(v) => v.clone(),
        Expr::Path(segments) => {
            let mut current = state;
            for segment in segments {
                current = match (current, segment.as_str()) {
                    (Value::Object(map), key) => match map.get(key) {
                        Some(v) => v,
                        None => return Value::Null,
                    },
                    (Value::String(s), "length") => return Value::from(s.chars().count()),
                    (Value::Array(items), "length") => return Value::from(items.len()),
                    _ => return Value::Null,
                };
            }
            current.clone()
        }
        Expr::Call(_) => Value::Null,
        Expr::Not(inner) => Value::Bool(!truthy(&evaluate(inner, state))),
    }
}

/// JavaScript truthiness
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Interpolation text for a value, as the browser runtime would print it
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
