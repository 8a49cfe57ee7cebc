//! Opening preview documents outside the process.

use crate::error::ApiError;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, warn};

pub trait Launcher {
    fn open(&self, target: &Path) -> Result<(), ApiError>;
}

/// Spawns the configured command, or the platform opener when none is set
#[derive(Debug, Clone, Default)]
pub struct SystemLauncher {
    command: Option<String>,
}

impl SystemLauncher {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }

    /// Program and leading arguments; the target is appended after these
    pub fn command_line(&self) -> Vec<String> {
        if let Some(command) = &self.command {
            let parts: Vec<String> = command.split_whitespace().map(str::to_string).collect();
            if !parts.is_empty() {
                return parts;
            }
        }
        platform_opener()
    }
}

fn platform_opener() -> Vec<String> {
    let parts: &[&str] = if cfg!(target_os = "macos") {
        &["open"]
    } else if cfg!(target_os = "windows") {
        &["cmd", "/C", "start", ""]
    } else {
        &["xdg-open"]
    };
    parts.iter().map(|s| s.to_string()).collect()
}

impl Launcher for SystemLauncher {
    fn open(&self, target: &Path) -> Result<(), ApiError> {
        let command_line = self.command_line();
        let (program, args) = command_line
            .split_first()
            .ok_or_else(|| ApiError::PreviewError("Empty open command".to_string()))?;

        let mut child = Command::new(program)
            .args(args)
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ApiError::PreviewError(format!("Failed to run {}: {}", program, e)))?;
        debug!(program = %program, pid = child.id(), "Launched preview opener");

        // Openers may outlive the call; reap them off-thread
        let program = program.clone();
        thread::spawn(move || match child.wait() {
            Ok(status) => debug!(program = %program, %status, "Preview opener exited"),
            Err(e) => warn!(program = %program, error = %e, "Failed to wait for preview opener"),
        });
        Ok(())
    }
}
