//! Pseudo-compiler
//!
//! Turns the project's entry component file into a standalone preview
//! document by pattern matching over its text. Every failure is reported in
//! the returned [`CompileResult`]; nothing here returns `Err` or panics on bad
//! source.

pub mod codegen;
pub mod expr;
pub mod extract;
pub mod log_book;
pub mod validate;

use crate::tree::{FileNode, FileTree};
use chrono::{DateTime, Utc};
use extract::TemplateSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

fn default_entry_file() -> String {
    "src/app/app.component.ts".to_string()
}

fn default_component_marker() -> String {
    "@Component".to_string()
}

fn default_max_log_entries() -> usize {
    500
}

/// Compiler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Path of the entry component file in the project tree
    #[serde(default = "default_entry_file")]
    pub entry_file: String,

    /// Decorator text that must appear in the entry file
    #[serde(default = "default_component_marker")]
    pub component_marker: String,

    /// Oldest compile log entries are dropped beyond this count
    #[serde(default = "default_max_log_entries")]
    pub max_log_entries: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            entry_file: default_entry_file(),
            component_marker: default_component_marker(),
            max_log_entries: default_max_log_entries(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One timestamped compile diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    fn new(level: LogLevel, message: String) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.level {
            LogLevel::Info => "",
            LogLevel::Warn => "Warning: ",
            LogLevel::Error => "Error: ",
        };
        write!(
            f,
            "[{}] {}{}",
            self.timestamp.format("%H:%M:%S"),
            prefix,
            self.message
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CompileOutcome {
    Success { html: String },
    Failure { message: String },
}

/// Outcome of one compile attempt plus the diagnostics it produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileResult {
    pub outcome: CompileOutcome,
    pub logs: Vec<LogEntry>,
}

impl CompileResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CompileOutcome::Success { .. })
    }

    pub fn html(&self) -> Option<&str> {
        match &self.outcome {
            CompileOutcome::Success { html } => Some(html),
            CompileOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            CompileOutcome::Failure { message } => Some(message),
            CompileOutcome::Success { .. } => None,
        }
    }
}

/// Collects the entries of one attempt
struct Attempt {
    logs: Vec<LogEntry>,
}

impl Attempt {
    fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(target: "playpen::compiler", "{}", message);
        self.logs.push(LogEntry::new(LogLevel::Info, message));
    }

    fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(target: "playpen::compiler", "{}", message);
        self.logs.push(LogEntry::new(LogLevel::Warn, message));
    }

    fn fail(mut self, message: impl Into<String>) -> CompileResult {
        let message = message.into();
        warn!(target: "playpen::compiler", error = %message, "Compile failed");
        self.logs.push(LogEntry::new(LogLevel::Error, message.clone()));
        CompileResult {
            outcome: CompileOutcome::Failure { message },
            logs: self.logs,
        }
    }
}

/// Pseudo-compiler with an append-only log across attempts
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
    logs: Vec<LogEntry>,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            logs: Vec::new(),
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Every entry logged by every attempt so far, oldest first
    pub fn compile_logs(&self) -> &[LogEntry] {
        &self.logs
    }

    /// Seed the log with entries from an earlier session
    pub fn restore_logs(&mut self, entries: Vec<LogEntry>) {
        self.logs = entries;
        self.trim_logs();
    }

    fn trim_logs(&mut self) {
        let max = self.config.max_log_entries;
        if self.logs.len() > max {
            let excess = self.logs.len() - max;
            self.logs.drain(..excess);
        }
    }

    /// Compile the entry file of `tree`
    pub fn compile(&mut self, tree: &FileTree) -> CompileResult {
        let result = self.run(tree);
        self.logs.extend(result.logs.iter().cloned());
        self.trim_logs();
        if result.is_success() {
            info!(entry = %self.config.entry_file, "Compiled preview");
        }
        result
    }

    fn run(&self, tree: &FileTree) -> CompileResult {
        let mut attempt = Attempt { logs: Vec::new() };
        let entry_path = self.config.entry_file.trim_matches('/');
        attempt.info(format!("Compiling {}", entry_path));

        let entry = match tree
            .files()
            .into_iter()
            .find(|f| f.path == entry_path)
        {
            Some(entry) => entry,
            None => return attempt.fail(format!("Entry file '{}' not found", entry_path)),
        };
        let source = entry.text();
        if source.trim().is_empty() {
            return attempt.fail(format!("Entry file '{}' is empty", entry_path));
        }

        let component = extract::extract_component(source);
        let template = match component.template.as_ref() {
            Some(TemplateSource::Inline(text)) => text.clone(),
            Some(TemplateSource::Url(url)) => match resolve_relative(tree, entry, url) {
                Some(file) => {
                    attempt.info(format!("Template loaded from {}", file.path));
                    file.text().to_string()
                }
                None => {
                    return attempt.fail(format!(
                        "Template file '{}' referenced by {} not found",
                        url, entry_path
                    ))
                }
            },
            None => return attempt.fail(format!("No template found in {}", entry_path)),
        };
        let styles = match component.styles.as_ref() {
            Some(TemplateSource::Inline(text)) => Some(text.clone()),
            Some(TemplateSource::Url(url)) => match resolve_relative(tree, entry, url) {
                Some(file) => Some(file.text().to_string()),
                None => {
                    attempt.warn(format!("Stylesheet '{}' not found; continuing without styles", url));
                    None
                }
            },
            None => None,
        };

        let report = validate::check_source(source, &self.config.component_marker);
        if !report.is_valid() {
            return attempt.fail(report.errors.join("; "));
        }
        attempt.info(format!(
            "Sanity checks passed ({}/{})",
            report.passed_checks(),
            report.checks.len()
        ));

        for name in &component.skipped_methods {
            attempt.info(format!(
                "Method '{}' has a nested block and was not extracted",
                name
            ));
        }
        attempt.info(format!(
            "Extracted {} properties and {} methods",
            component.properties.len(),
            component.methods.len()
        ));

        let class_name = component.class_name.as_deref().unwrap_or("Component");
        let document = codegen::generate_document(&codegen::CodegenInput {
            class_name,
            template: &template,
            styles: styles.as_deref(),
            properties: &component.properties,
            methods: &component.methods,
        });
        for warning in document.warnings {
            attempt.warn(warning);
        }
        attempt.info(format!("Generated preview document ({} bytes)", document.html.len()));

        CompileResult {
            outcome: CompileOutcome::Success {
                html: document.html,
            },
            logs: attempt.logs,
        }
    }
}

/// Resolve `./x`, `../x` or `x` against the folder holding `from`
fn resolve_relative<'a>(tree: &'a FileTree, from: &FileNode, relative: &str) -> Option<&'a FileNode> {
    let mut segments: Vec<&str> = match from.path.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for part in relative.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            name => segments.push(name),
        }
    }
    tree.find_by_path(&segments.join("/"))
        .filter(|node| node.is_file())
}
