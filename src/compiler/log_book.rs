//! Compile log persisted between runs as JSON lines.

use super::LogEntry;
use crate::error::ApiError;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Entries stored at `path`, oldest first. A missing file is an empty log;
/// unreadable lines are skipped.
pub fn load(path: &Path) -> Result<Vec<LogEntry>, ApiError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut entries = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!(line = index + 1, error = %e, "Skipping unreadable compile log line"),
        }
    }
    Ok(entries)
}

/// Append `entries`, then drop the oldest lines so at most `max_entries`
/// remain on disk
pub fn append(path: &Path, entries: &[LogEntry], max_entries: usize) -> Result<(), ApiError> {
    if entries.is_empty() {
        return Ok(());
    }
    write_lines(path, entries)?;

    let stored = load(path)?;
    if stored.len() > max_entries {
        let excess = stored.len() - max_entries;
        debug!(dropped = excess, path = %path.display(), "Trimming compile log");
        replace(path, &stored[excess..])?;
    }
    Ok(())
}

/// Rewrite the log with exactly `entries`
pub fn replace(path: &Path, entries: &[LogEntry]) -> Result<(), ApiError> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    if entries.is_empty() {
        return Ok(());
    }
    write_lines(path, entries)
}

fn write_lines(path: &Path, entries: &[LogEntry]) -> Result<(), ApiError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for entry in entries {
        writeln!(file, "{}", serde_json::to_string(entry)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Compiler, CompilerConfig, LogLevel};
    use crate::tree::FileTree;
    use tempfile::TempDir;

    #[test]
    fn test_append_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs/compile.log");
        assert!(load(&path).unwrap().is_empty());

        let result = Compiler::default().compile(&FileTree::new());
        append(&path, &result.logs, 500).unwrap();
        append(&path, &result.logs, 500).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.len(), result.logs.len() * 2);
        assert_eq!(loaded.last().unwrap().level, LogLevel::Error);
    }

    #[test]
    fn test_bad_lines_skipped_and_replace() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("compile.log");
        let result = Compiler::default().compile(&FileTree::new());
        append(&path, &result.logs[..1], 500).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json").unwrap();

        assert_eq!(load(&path).unwrap().len(), 1);

        replace(&path, &[]).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_file_never_exceeds_cap() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("compile.log");
        let mut compiler = Compiler::new(CompilerConfig {
            max_log_entries: 2,
            ..CompilerConfig::default()
        });

        for _ in 0..50 {
            let result = compiler.compile(&FileTree::new());
            append(&path, &result.logs, compiler.config().max_log_entries).unwrap();
            let lines = fs::read_to_string(&path).unwrap().lines().count();
            assert!(lines <= 2, "{} lines on disk", lines);
        }

        let kept = load(&path).unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.last().unwrap().level, LogLevel::Error);
    }
}
