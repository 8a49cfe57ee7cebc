//! Pattern-based extraction of a component's template, styles, properties and
//! methods from source text.
//!
//! This is text matching, not parsing. Nested template literals, methods with
//! nested braces and multi-line initializers are not reliably handled.

use regex::Regex;
use std::sync::LazyLock;

static TEMPLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\btemplate\s*:\s*`([^`]*)`").expect("valid regex"));

static TEMPLATE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\btemplateUrl\s*:\s*['"]([^'"]+)['"]"#).expect("valid regex"));

static STYLES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\bstyles\s*:\s*\[\s*(?:`([^`]*)`|'([^']*)'|"([^"]*)")"#).expect("valid regex")
});

static STYLE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bstyleUrls?\s*:\s*\[?\s*['"]([^'"]+)['"]"#).expect("valid regex")
});

static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bexport\s+class\s+([A-Za-z_$][\w$]*)[^{]*\{").expect("valid regex"));

static PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(?:public|private|protected|readonly|static)\s+)*([A-Za-z_$][\w$]*)\s*[?!]?\s*(?::\s*[^=;(]+?)?\s*=\s*(.+?);?\s*$",
    )
    .expect("valid regex")
});

static METHOD_HEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*(?:(?:public|private|protected|async|static)\s+)*([A-Za-z_$][\w$]*)\s*\(([^)]*)\)\s*(?::\s*[^{;=]+)?\{",
    )
    .expect("valid regex")
});

const NOT_METHODS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "function", "return", "constructor",
];

/// Where the template comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Inline(String),
    /// Relative path from `templateUrl`
    Url(String),
}

/// Initial value of an extracted property
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Str(String),
    Number(f64),
    Bool(bool),
    Null,
    /// A JSON-compatible array or object literal
    Json(serde_json::Value),
    /// Anything else, kept as source text
    Expr(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub params: Vec<String>,
    pub body: String,
}

/// Everything the compiler pulls out of a component source file
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedComponent {
    pub class_name: Option<String>,
    pub template: Option<TemplateSource>,
    pub styles: Option<TemplateSource>,
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
    /// Methods found but not extracted (nested braces)
    pub skipped_methods: Vec<String>,
}

/// Run every extractor over `source`
pub fn extract_component(source: &str) -> ExtractedComponent {
    let class_name = CLASS_RE.captures(source).map(|c| c[1].to_string());
    let body = class_body(source).unwrap_or("");
    let (methods, skipped_methods) = extract_methods(body);
    ExtractedComponent {
        class_name,
        template: extract_template(source),
        styles: extract_styles(source),
        properties: extract_properties(body),
        methods,
        skipped_methods,
    }
}

pub fn extract_template(source: &str) -> Option<TemplateSource> {
    if let Some(caps) = TEMPLATE_RE.captures(source) {
        return Some(TemplateSource::Inline(caps[1].to_string()));
    }
    TEMPLATE_URL_RE
        .captures(source)
        .map(|caps| TemplateSource::Url(caps[1].to_string()))
}

/// First literal of the `styles` array, else the first `styleUrls` entry
pub fn extract_styles(source: &str) -> Option<TemplateSource> {
    if let Some(caps) = STYLES_RE.captures(source) {
        let text = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        return Some(TemplateSource::Inline(text));
    }
    STYLE_URL_RE
        .captures(source)
        .map(|caps| TemplateSource::Url(caps[1].to_string()))
}

/// Text between the exported class's opening brace and its matching close.
/// An unterminated class yields the rest of the source.
pub fn class_body(source: &str) -> Option<&str> {
    let m = CLASS_RE.find(source)?;
    let start = m.end();
    let mut depth = 1usize;
    for (offset, ch) in source[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&source[start..start + offset]);
                }
            }
            _ => {}
        }
    }
    Some(&source[start..])
}

/// Property initializers declared at the top level of the class body
pub fn extract_properties(body: &str) -> Vec<Property> {
    let mut properties = Vec::new();
    let mut depth = 0i32;
    for line in body.lines() {
        if depth == 0 {
            if let Some(caps) = PROPERTY_RE.captures(line) {
                let raw = caps[2].trim();
                // Arrow functions and other block-bodied initializers are not state.
                if !raw.contains("=>") && !raw.ends_with('{') {
                    properties.push(Property {
                        name: caps[1].to_string(),
                        value: classify_value(raw),
                    });
                }
            }
        }
        depth += line.matches('{').count() as i32;
        depth -= line.matches('}').count() as i32;
        depth = depth.max(0);
    }
    properties
}

/// Top-level methods whose body contains no nested braces. Returns the
/// extracted methods and the names of those skipped.
pub fn extract_methods(body: &str) -> (Vec<Method>, Vec<String>) {
    let mut methods = Vec::new();
    let mut skipped = Vec::new();
    for caps in METHOD_HEAD_RE.captures_iter(body) {
        let head = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        let name = caps[1].to_string();
        if NOT_METHODS.contains(&name.as_str()) {
            continue;
        }
        // Only members at the class's top level.
        let before = &body[..head.start];
        if before.matches('{').count() != before.matches('}').count() {
            continue;
        }
        let rest = &body[head.end..];
        let Some(close) = rest.find('}') else {
            skipped.push(name);
            continue;
        };
        let inner = &rest[..close];
        if inner.contains('{') {
            skipped.push(name);
            continue;
        }
        methods.push(Method {
            name,
            params: parse_params(&caps[2]),
            body: inner.trim().to_string(),
        });
    }
    (methods, skipped)
}

fn parse_params(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|p| {
            let name = p.split([':', '=']).next()?.trim().trim_end_matches('?');
            let name = name.trim_start_matches("...");
            if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            }
        })
        .collect()
}

/// Classify an initializer's source text
pub fn classify_value(raw: &str) -> PropertyValue {
    let raw = raw.trim();
    if let Some(s) = unquote(raw) {
        return PropertyValue::Str(s);
    }
    match raw {
        "true" => return PropertyValue::Bool(true),
        "false" => return PropertyValue::Bool(false),
        "null" | "undefined" => return PropertyValue::Null,
        _ => {}
    }
    if let Ok(n) = raw.parse::<f64>() {
        if n.is_finite() {
            return PropertyValue::Number(n);
        }
    }
    if raw.starts_with('[') || raw.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) {
            return PropertyValue::Json(value);
        }
    }
    PropertyValue::Expr(raw.to_string())
}

/// Strip matching quotes from a single-, double- or backtick-quoted literal
/// that contains no interpolation or inner quote of the same kind.
pub(crate) fn unquote(raw: &str) -> Option<String> {
    let mut chars = raw.chars();
    let open = chars.next()?;
    if !matches!(open, '\'' | '"' | '`') || raw.len() < 2 || !raw.ends_with(open) {
        return None;
    }
    let inner = &raw[1..raw.len() - 1];
    if inner.contains(open) || (open == '`' && inner.contains("${")) {
        return None;
    }
    Some(inner.to_string())
}
