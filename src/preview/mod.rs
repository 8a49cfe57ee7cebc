//! Preview renderer
//!
//! Holds exactly one of loading, error or content. Content is a generated
//! document written under a fresh uuid file name in the preview directory,
//! plus a stable `index.html` host page that frames it in a sandboxed
//! iframe. Replacing the content revokes (deletes) the previous document.

pub mod launcher;

pub use launcher::{Launcher, SystemLauncher};

use crate::compiler::codegen::escape_html;
use crate::compiler::{CompileResult, Compiler};
use crate::error::ApiError;
use crate::tree::FileTree;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const HOST_PAGE: &str = "index.html";

/// Scripts run; same-origin access, forms, popups and top navigation do not.
pub const IFRAME_SANDBOX: &str = "allow-scripts";

/// Preview configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Directory for generated documents; defaults to `<data dir>/preview`
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Command used to open a document, e.g. `firefox --new-tab`; the
    /// document path is appended. Defaults to the platform opener.
    #[serde(default)]
    pub open_command: Option<String>,
}

/// A written preview document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    pub id: Uuid,
    pub document: PathBuf,
    pub host_page: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    Loading,
    Error(String),
    Content(PreviewHandle),
}

impl PreviewState {
    pub fn handle(&self) -> Option<&PreviewHandle> {
        match self {
            PreviewState::Content(handle) => Some(handle),
            _ => None,
        }
    }
}

pub struct PreviewRenderer {
    output_dir: PathBuf,
    state: PreviewState,
    launcher: Box<dyn Launcher>,
}

impl std::fmt::Debug for PreviewRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewRenderer")
            .field("output_dir", &self.output_dir)
            .field("state", &self.state)
            .finish()
    }
}

impl PreviewRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, launcher: Box<dyn Launcher>) -> Self {
        Self {
            output_dir: output_dir.into(),
            state: PreviewState::Loading,
            launcher,
        }
    }

    /// Renderer writing to `output_dir` and opening with the configured command
    pub fn from_config(config: &PreviewConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self::new(
            output_dir,
            Box::new(SystemLauncher::new(config.open_command.clone())),
        )
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Compile `tree` and show the outcome
    pub fn refresh(
        &mut self,
        compiler: &mut Compiler,
        tree: &FileTree,
    ) -> Result<CompileResult, ApiError> {
        self.state = PreviewState::Loading;
        let result = compiler.compile(tree);
        self.apply(&result)?;
        Ok(result)
    }

    /// Show an existing compile result
    pub fn apply(&mut self, result: &CompileResult) -> Result<(), ApiError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            ApiError::PreviewError(format!(
                "Failed to create preview directory {}: {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let next = match (result.html(), result.error()) {
            (Some(html), _) => PreviewState::Content(self.write_document(html)?),
            (None, Some(message)) => {
                self.write_host_page(&error_page(message))?;
                PreviewState::Error(message.to_string())
            }
            (None, None) => PreviewState::Error(String::new()),
        };

        let keep = next.handle().map(|h| h.id);
        self.revoke_stale(keep);
        self.state = next;
        Ok(())
    }

    /// Open the current document with the launcher
    pub fn open_in_new_tab(&self) -> Result<PathBuf, ApiError> {
        match &self.state {
            PreviewState::Content(handle) => {
                self.launcher.open(&handle.document)?;
                info!(document = %handle.document.display(), "Opened preview");
                Ok(handle.document.clone())
            }
            PreviewState::Error(message) => Err(ApiError::PreviewError(format!(
                "No preview to open: {}",
                message
            ))),
            PreviewState::Loading => Err(ApiError::PreviewError(
                "No preview to open: still loading".to_string(),
            )),
        }
    }

    fn write_document(&self, html: &str) -> Result<PreviewHandle, ApiError> {
        let id = Uuid::new_v4();
        let document = self.output_dir.join(format!("{}.html", id));
        write_file(&document, html)?;
        let host_page = self.write_host_page(&host_page(&format!("{}.html", id)))?;
        debug!(document = %document.display(), "Wrote preview document");
        Ok(PreviewHandle {
            id,
            document,
            host_page,
        })
    }

    fn write_host_page(&self, html: &str) -> Result<PathBuf, ApiError> {
        let path = self.output_dir.join(HOST_PAGE);
        write_file(&path, html)?;
        Ok(path)
    }

    /// Delete every generated document except `keep`, including ones left by
    /// earlier runs.
    fn revoke_stale(&self, keep: Option<Uuid>) {
        let entries = match fs::read_dir(&self.output_dir) {
            Ok(entries) => entries,
            Err(_) => return,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| Uuid::parse_str(s).ok())
            else {
                continue;
            };
            if Some(id) == keep {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => debug!(document = %path.display(), "Revoked preview document"),
                Err(e) => warn!(document = %path.display(), error = %e, "Failed to revoke preview document"),
            }
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ApiError> {
    fs::write(path, contents).map_err(|e| {
        ApiError::PreviewError(format!("Failed to write {}: {}", path.display(), e))
    })
}

fn host_page(document: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Preview</title>\n\
<style>html,body{{margin:0;height:100%;}}iframe{{border:0;width:100%;height:100%;}}</style>\n\
</head>\n<body>\n<iframe src=\"{}\" sandbox=\"{}\" title=\"Preview\"></iframe>\n</body>\n</html>\n",
        escape_html(document),
        IFRAME_SANDBOX
    )
}

fn error_page(message: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Preview error</title>\n</head>\n\
<body>\n<pre style=\"color:#b00020;white-space:pre-wrap;\">{}</pre>\n</body>\n</html>\n",
        escape_html(message)
    )
}
