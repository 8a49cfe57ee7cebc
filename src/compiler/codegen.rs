//! Preview document generation.
//!
//! The document embeds the styles, a seeded publish/subscribe state
//! container, the component's methods rewritten to go through that container,
//! and a render loop that fills `{{ }}` placeholders with the restricted
//! evaluator. The template itself is carried verbatim in an inert
//! `<template>` element that the runtime reads back. The initial state is also rendered here so the page has
//! content before its script runs.

use super::expr;
use super::extract::{Method, Property, PropertyValue};
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::LazyLock;

static MUSTACHE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{\s*(.*?)\s*\}\}").expect("valid regex"));

static EVENT_BINDING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\(([A-Za-z][\w.-]*)\)\s*=\s*"([^"]*)""#).expect("valid regex"));

static HANDLER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[A-Za-z_$][\w$]*\s*\(.*\)\s*;?\s*$").expect("valid regex"));

static INCREMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^this\.([A-Za-z_$][\w$]*)\s*(\+\+|--)$").expect("valid regex"));

static COMPOUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^this\.([A-Za-z_$][\w$]*)\s*([-+*/%])=\s*(.+)$").expect("valid regex")
});

static ASSIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^this\.([A-Za-z_$][\w$]*)\s*=\s*([^=].*)$").expect("valid regex")
});

static THIS_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bthis\.([A-Za-z_$][\w$]*)\s*\(").expect("valid regex"));

static THIS_READ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bthis\.([A-Za-z_$][\w$]*)").expect("valid regex"));

/// Inputs to document generation
#[derive(Debug, Clone)]
pub struct CodegenInput<'a> {
    pub class_name: &'a str,
    pub template: &'a str,
    pub styles: Option<&'a str>,
    pub properties: &'a [Property],
    pub methods: &'a [Method],
}

/// A generated preview document and the warnings raised while building it
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub html: String,
    pub warnings: Vec<String>,
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Keep embedded text from closing its enclosing `<script>` or `<style>`
fn guard_embedded(s: &str) -> String {
    s.replace("</", "<\\/")
}

/// Template source as written; only a literal `</template` is guarded
fn inert_template(s: &str) -> String {
    s.replace("</template", "<\\/template")
}

fn js_string(s: &str) -> String {
    guard_embedded(&Value::String(s.to_string()).to_string())
}

/// Literal-valued properties as the initial state object
pub fn seed_state(properties: &[Property]) -> Map<String, Value> {
    let mut state = Map::new();
    for property in properties {
        let value = match &property.value {
            PropertyValue::Str(s) => Value::String(s.clone()),
            PropertyValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            PropertyValue::Bool(b) => Value::Bool(*b),
            PropertyValue::Null => Value::Null,
            PropertyValue::Json(v) => v.clone(),
            PropertyValue::Expr(_) => continue,
        };
        state.insert(property.name.clone(), value);
    }
    state
}

/// Route `this.x` reads and `this.m(...)` calls through the state container
pub fn rewrite_reads(code: &str) -> String {
    let calls = THIS_CALL_RE.replace_all(code, "__methods.$1(");
    THIS_READ_RE
        .replace_all(&calls, "__state.get('$1')")
        .into_owned()
}

fn rewrite_statement(statement: &str) -> String {
    if let Some(caps) = INCREMENT_RE.captures(statement) {
        let op = if &caps[2] == "++" { "+" } else { "-" };
        return format!(
            "__state.set('{0}', __state.get('{0}') {1} 1)",
            &caps[1], op
        );
    }
    if let Some(caps) = COMPOUND_RE.captures(statement) {
        return format!(
            "__state.set('{0}', __state.get('{0}') {1} ({2}))",
            &caps[1],
            &caps[2],
            rewrite_reads(caps[3].trim())
        );
    }
    if let Some(caps) = ASSIGN_RE.captures(statement) {
        return format!(
            "__state.set('{}', {})",
            &caps[1],
            rewrite_reads(caps[2].trim())
        );
    }
    rewrite_reads(statement)
}

/// Rewrite a method body statement by statement. Statements are split on `;`,
/// so semicolons inside string literals break the rewrite.
pub fn rewrite_method_body(body: &str) -> String {
    body.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("{};", rewrite_statement(s)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turn `(event)="method(args)"` bindings into `data-pp-on-event` attributes.
/// Returns the rewritten template and the handlers that were left alone.
pub fn rewrite_event_bindings(template: &str) -> (String, Vec<String>) {
    let mut skipped = Vec::new();
    let rewritten = EVENT_BINDING_RE.replace_all(template, |caps: &Captures| {
        let handler = &caps[2];
        if HANDLER_RE.is_match(handler) {
            format!(
                "data-pp-on-{}=\"{}\"",
                caps[1].to_ascii_lowercase(),
                escape_html(handler.trim())
            )
        } else {
            skipped.push(handler.to_string());
            caps[0].to_string()
        }
    });
    (rewritten.into_owned(), skipped)
}

/// Fill `{{ }}` placeholders from `state`. Unsupported expressions render
/// empty and are reported in the returned warnings.
pub fn prerender(template: &str, state: &Value) -> (String, Vec<String>) {
    let mut warnings = Vec::new();
    let rendered = MUSTACHE_RE.replace_all(template, |caps: &Captures| match expr::parse(&caps[1]) {
        Ok(e) => escape_html(&expr::display(&expr::evaluate(&e, state))),
        Err(e) => {
            warnings.push(e.to_string());
            String::new()
        }
    });
    (rendered.into_owned(), warnings)
}

fn methods_js(methods: &[Method]) -> String {
    let mut out = String::new();
    for method in methods {
        out.push_str(&format!(
            "  __methods[{}] = function ({}) {{ {} }};\n",
            js_string(&method.name),
            method.params.join(", "),
            guard_embedded(&rewrite_method_body(&method.body))
        ));
    }
    out
}

fn expression_init_js(properties: &[Property]) -> String {
    let mut out = String::new();
    for property in properties {
        if let PropertyValue::Expr(source) = &property.value {
            out.push_str(&format!(
                "  try {{ __state.set({}, ({})); }} catch (e) {{ report(e); }}\n",
                js_string(&property.name),
                guard_embedded(&rewrite_reads(source))
            ));
        }
    }
    out
}

/// Build the standalone preview document
pub fn generate_document(input: &CodegenInput<'_>) -> GeneratedDocument {
    let mut warnings = Vec::new();
    let (template, skipped) = rewrite_event_bindings(input.template);
    for handler in skipped {
        warnings.push(format!("Event handler not wired: {}", handler));
    }

    let state = seed_state(input.properties);
    let state_value = Value::Object(state.clone());
    let (initial, render_warnings) = prerender(&template, &state_value);
    warnings.extend(render_warnings);

    let seed = serde_json::json!({ "properties": state });
    let mut html = String::new();
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>{} preview</title>\n",
        escape_html(input.class_name)
    ));
    html.push_str("<style>\n#pp-errors{color:#b00020;white-space:pre-wrap;}\n");
    if let Some(styles) = input.styles {
        html.push_str(&styles.replace("</style", "<\\/style"));
        html.push('\n');
    }
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str(&format!("<div id=\"pp-root\">{}</div>\n", initial));
    html.push_str("<pre id=\"pp-errors\" hidden></pre>\n");
    html.push_str(&format!(
        "<template id=\"pp-template\">{}</template>\n",
        inert_template(input.template)
    ));
    html.push_str(&format!(
        "<script type=\"application/json\" id=\"pp-state\">{}</script>\n",
        guard_embedded(&seed.to_string())
    ));
    html.push_str("<script>\n");
    html.push_str(RUNTIME_PRELUDE);
    html.push_str(&methods_js(input.methods));
    html.push_str(&expression_init_js(input.properties));
    html.push_str(RUNTIME_RENDER);
    html.push_str("</script>\n</body>\n</html>\n");

    GeneratedDocument { html, warnings }
}

const RUNTIME_PRELUDE: &str = r##"(function () {
  'use strict';
  var errorsEl = document.getElementById('pp-errors');
  function report(err) {
    errorsEl.hidden = false;
    errorsEl.textContent += String(err && err.message ? err.message : err) + '\n';
  }
  function readJson(id) {
    return JSON.parse(document.getElementById(id).textContent);
  }
  function createState(initial) {
    var values = Object.assign({}, initial);
    var listeners = [];
    return {
      get: function (key) { return values[key]; },
      set: function (key, value) {
        values[key] = value;
        listeners.forEach(function (fn) { fn(key, value); });
      },
      values: function () { return values; },
      subscribe: function (fn) { listeners.push(fn); }
    };
  }
  var template = document.getElementById('pp-template').innerHTML.replace(
    /\(([A-Za-z][\w.-]*)\)\s*=\s*"([^"]*)"/g,
    function (whole, name, handler) {
      if (!/^\s*[A-Za-z_$][\w$]*\s*\(.*\)\s*;?\s*$/.test(handler)) { return whole; }
      return 'data-pp-on-' + name.toLowerCase() + '="' + handler.trim() + '"';
    });
  var __state = createState(readJson('pp-state').properties);
  var __methods = {};
"##;

const RUNTIME_RENDER: &str = r##"  function isIdent(s) { return /^[A-Za-z_$][\w$]*$/.test(s); }
  function evaluate(text, event) {
    var expr = text.trim();
    if (expr.charAt(0) === '!') { return !evaluate(expr.slice(1), event); }
    var quoted = /^'([^']*)'$|^"([^"]*)"$/.exec(expr);
    if (quoted) { return quoted[1] !== undefined ? quoted[1] : quoted[2]; }
    if (expr === 'true') { return true; }
    if (expr === 'false') { return false; }
    if (expr === 'null' || expr === 'undefined') { return null; }
    if (expr === '$event') { return event; }
    if (expr !== '' && !isNaN(Number(expr))) { return Number(expr); }
    if (expr.indexOf('this.') === 0) { expr = expr.slice(5); }
    var call = /^([A-Za-z_$][\w$]*)\s*\(\s*\)$/.exec(expr);
    if (call) {
      var fn = __methods[call[1]];
      return typeof fn === 'function' ? fn() : undefined;
    }
    var parts = expr.split('.').map(function (p) { return p.trim(); });
    if (!parts.every(isIdent)) { return undefined; }
    var value = __state.values();
    for (var i = 0; i < parts.length; i++) {
      if (value === null || value === undefined) { return undefined; }
      value = value[parts[i]];
    }
    return value;
  }
  function display(value) {
    return value === null || value === undefined ? '' : String(value);
  }
  function escapeHtml(s) {
    return s.replace(/&/g, '&amp;').replace(/</g, '&lt;').replace(/>/g, '&gt;').replace(/"/g, '&quot;');
  }
  function splitArgs(raw) {
    return raw.trim() === '' ? [] : raw.split(',');
  }
  var root = document.getElementById('pp-root');
  function bind() {
    Array.prototype.forEach.call(root.querySelectorAll('*'), function (el) {
      Array.prototype.forEach.call(el.attributes, function (attr) {
        if (attr.name.indexOf('data-pp-on-') !== 0) { return; }
        var eventName = attr.name.slice('data-pp-on-'.length);
        var handler = /^\s*([A-Za-z_$][\w$]*)\s*\(([\s\S]*)\)\s*;?\s*$/.exec(attr.value);
        if (!handler) { return; }
        el.addEventListener(eventName, function (event) {
          var fn = __methods[handler[1]];
          if (typeof fn !== 'function') { report('Unknown method: ' + handler[1]); return; }
          try {
            fn.apply(null, splitArgs(handler[2]).map(function (a) { return evaluate(a, event); }));
          } catch (e) {
            report(e);
          }
        });
      });
    });
  }
  function render() {
    root.innerHTML = template.replace(/\{\{\s*([\s\S]*?)\s*\}\}/g, function (_, expr) {
      try { return escapeHtml(display(evaluate(expr))); } catch (e) { report(e); return ''; }
    });
    bind();
  }
  __state.subscribe(render);
  try { render(); } catch (e) { report(e); }
})();
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rewrite_method_body() {
        assert_eq!(
            rewrite_method_body("this.count++;"),
            "__state.set('count', __state.get('count') + 1);"
        );
        assert_eq!(
            rewrite_method_body("this.count += step"),
            "__state.set('count', __state.get('count') + (step));"
        );
        assert_eq!(
            rewrite_method_body("this.visible = !this.visible; this.log()"),
            "__state.set('visible', !__state.get('visible')); __methods.log();"
        );
        assert_eq!(
            rewrite_method_body("if (this.a == 1) x()"),
            "if (__state.get('a') == 1) x();"
        );
    }

    #[test]
    fn test_rewrite_event_bindings() {
        let (out, skipped) = rewrite_event_bindings(
            r#"<button (click)="increment(1)">+</button><input (input)="value = $event">"#,
        );
        assert!(out.contains(r#"data-pp-on-click="increment(1)""#));
        assert!(out.contains(r#"(input)="value = $event""#));
        assert_eq!(skipped, vec!["value = $event".to_string()]);
    }

    #[test]
    fn test_prerender_escapes_and_warns() {
        let state = json!({ "name": "<b>Ada</b>", "n": 4 });
        let (out, warnings) = prerender("<p>{{ name }} {{n}} {{ n * 2 }}</p>", &state);
        assert_eq!(out, "<p>&lt;b&gt;Ada&lt;/b&gt; 4 </p>");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_seed_state_skips_expressions() {
        let props = vec![
            Property { name: "a".into(), value: PropertyValue::Number(1.0) },
            Property { name: "b".into(), value: PropertyValue::Expr("make()".into()) },
        ];
        let state = seed_state(&props);
        assert_eq!(state.get("a"), Some(&json!(1.0)));
        assert!(state.get("b").is_none());
    }

    #[test]
    fn test_generate_document() {
        let props = vec![Property { name: "count".into(), value: PropertyValue::Number(0.0) }];
        let methods = vec![Method {
            name: "increment".into(),
            params: vec![],
            body: "this.count++;".into(),
        }];
        let doc = generate_document(&CodegenInput {
            class_name: "AppComponent",
            template: r#"<p>{{ count }}</p><button (click)="increment()">+</button>"#,
            styles: Some("p { color: red; }"),
            properties: &props,
            methods: &methods,
        });
        assert!(doc.warnings.is_empty(), "{:?}", doc.warnings);
        assert!(doc.html.contains("<div id=\"pp-root\"><p>0</p>"));
        assert!(doc.html.contains("p { color: red; }"));
        assert!(doc.html.contains("__methods[\"increment\"] = function () { __state.set('count', __state.get('count') + 1); };"));
        assert!(doc.html.contains("<title>AppComponent preview</title>"));
    }

    fn template_block(html: &str) -> &str {
        let block = html.split("<template id=\"pp-template\">").nth(1).unwrap();
        &block[..block.find("</template>").unwrap()]
    }

    #[test]
    fn test_template_embedded_verbatim() {
        let source = r#"<h1>{{ title }}</h1><button (click)="go()">Go</button>"#;
        let props = vec![Property { name: "title".into(), value: PropertyValue::Str("x".into()) }];
        let doc = generate_document(&CodegenInput {
            class_name: "A",
            template: source,
            styles: None,
            properties: &props,
            methods: &[],
        });
        assert_eq!(template_block(&doc.html), source);
        assert!(doc.html.contains("<div id=\"pp-root\"><h1>x</h1>"));
    }

    #[test]
    fn test_embedded_template_cannot_close_early() {
        let doc = generate_document(&CodegenInput {
            class_name: "A",
            template: "<p>x</p></template><script>alert(1)</script>",
            styles: None,
            properties: &[],
            methods: &[],
        });
        assert_eq!(
            template_block(&doc.html),
            "<p>x</p><\\/template><script>alert(1)</script>"
        );
    }
}
