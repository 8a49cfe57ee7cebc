//! Editor bridge: applies edits made in the mirror directory to the store.

use super::events::{ChangeEvent, EventBatcher, WatchConfig};
use super::mirror::{mirror_tree, tree_path};
use crate::compiler::{log_book, Compiler};
use crate::error::ApiError;
use crate::preview::PreviewRenderer;
use crate::store::persistence::save_session;
use crate::store::ProjectStore;
use notify::{RecursiveMode, Watcher};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// What one batch of events did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Tree paths whose content was updated
    pub applied: Vec<String>,
    /// Events that were logged and dropped
    pub ignored: Vec<ChangeEvent>,
    /// Whether the recompile after applying succeeded
    pub compiled: Option<bool>,
}

enum FileChange {
    Applied(String),
    Unchanged,
    Unknown,
    Unreadable(std::io::Error),
}

pub struct EditorBridge {
    store: ProjectStore,
    compiler: Compiler,
    renderer: PreviewRenderer,
    config: WatchConfig,
    session_file: Option<PathBuf>,
    compile_log: Option<PathBuf>,
    running: Arc<AtomicBool>,
}

impl EditorBridge {
    pub fn new(
        store: ProjectStore,
        compiler: Compiler,
        renderer: PreviewRenderer,
        config: WatchConfig,
    ) -> Self {
        Self {
            store,
            compiler,
            renderer,
            config,
            session_file: None,
            compile_log: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Save the session here after every applied batch
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    /// Append compile diagnostics here after every recompile
    pub fn with_compile_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.compile_log = Some(path.into());
        self
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    pub fn renderer(&self) -> &PreviewRenderer {
        &self.renderer
    }

    pub fn mirror_dir(&self) -> &Path {
        &self.config.mirror_dir
    }

    /// Flag that ends the watch loop when cleared
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Mirror the tree and render the first preview
    pub fn prepare(&mut self) -> Result<usize, ApiError> {
        let written = mirror_tree(self.store.tree(), &self.config.mirror_dir)?;
        self.recompile()?;
        Ok(written)
    }

    /// Mirror, then watch until stopped or the watcher goes away
    pub fn start(&mut self) -> Result<(), ApiError> {
        self.running.store(true, Ordering::SeqCst);
        let written = self.prepare()?;
        info!(dir = %self.config.mirror_dir.display(), files = written, "Mirrored project for editing");

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            if let Err(e) = tx.send(res) {
                error!("Error sending watch event: {}", e);
            }
        })
        .map_err(|e| ApiError::WatchError(format!("Failed to create watcher: {}", e)))?;
        watcher
            .watch(&self.config.mirror_dir, RecursiveMode::Recursive)
            .map_err(|e| ApiError::WatchError(format!("Failed to watch directory: {}", e)))?;

        let mut batcher = EventBatcher::new(self.config.clone());
        let idle = Duration::from_millis(250);

        while self.running.load(Ordering::SeqCst) {
            let timeout = if batcher.is_empty() {
                idle
            } else {
                batcher.debounce()
            };
            let full = match rx.recv_timeout(timeout) {
                Ok(Ok(event)) => match ChangeEvent::from_notify(event) {
                    Some(change) => batcher.add_event(change),
                    None => false,
                },
                Ok(Err(e)) => {
                    warn!("Watch error: {}", e);
                    false
                }
                Err(mpsc::RecvTimeoutError::Timeout) => false,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    error!("Watcher channel disconnected");
                    break;
                }
            };

            if !batcher.is_empty() && (full || batcher.is_settled(Instant::now())) {
                let report = self.process_events(batcher.take_batch())?;
                debug!(?report, "Processed change batch");
            }
        }

        info!("Editor bridge stopped");
        Ok(())
    }

    /// Apply one batch of change events
    pub fn process_events(&mut self, events: Vec<ChangeEvent>) -> Result<BatchReport, ApiError> {
        let mut report = BatchReport::default();
        for event in events {
            // Atomic saves arrive as a rename onto the edited file
            let target = match &event {
                ChangeEvent::Created(path) | ChangeEvent::Modified(path) => path.clone(),
                ChangeEvent::Renamed { to, .. } => to.clone(),
                ChangeEvent::Removed(path) => {
                    info!(path = %path.display(), "Ignoring removal on disk");
                    report.ignored.push(event.clone());
                    continue;
                }
            };
            match self.apply_file(&target)? {
                FileChange::Applied(tree_path) => report.applied.push(tree_path),
                FileChange::Unchanged => {}
                FileChange::Unknown => {
                    if let ChangeEvent::Renamed { from, to } = &event {
                        info!(from = %from.display(), to = %to.display(), "Ignoring move on disk");
                    } else {
                        info!(path = %target.display(), "Ignoring file not in the project tree");
                    }
                    report.ignored.push(event);
                }
                FileChange::Unreadable(e) => {
                    warn!(path = %target.display(), error = %e, "Skipping unreadable file");
                    report.ignored.push(event);
                }
            }
        }

        if report.applied.is_empty() {
            return Ok(report);
        }

        info!(files = report.applied.len(), "Applied edits from disk");
        report.compiled = Some(self.recompile()?);
        if let Some(session_file) = &self.session_file {
            save_session(&self.store, session_file)?;
        }
        Ok(report)
    }

    fn apply_file(&mut self, path: &Path) -> Result<FileChange, ApiError> {
        let Some(tree_path) = tree_path(&self.config.mirror_dir, path) else {
            return Ok(FileChange::Unknown);
        };
        let Some((id, current)) = self
            .store
            .tree()
            .find_by_path(&tree_path)
            .filter(|node| node.is_file())
            .map(|node| (node.id, node.text().to_string()))
        else {
            return Ok(FileChange::Unknown);
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FileChange::Unchanged),
            Err(e) => return Ok(FileChange::Unreadable(e)),
        };
        if content == current {
            return Ok(FileChange::Unchanged);
        }

        self.store.update_file_content(id, &content)?;
        debug!(path = %tree_path, bytes = content.len(), "Updated file from disk");
        Ok(FileChange::Applied(tree_path))
    }

    fn recompile(&mut self) -> Result<bool, ApiError> {
        let result = self.renderer.refresh(&mut self.compiler, self.store.tree())?;
        if let Some(compile_log) = &self.compile_log {
            let max_entries = self.compiler.config().max_log_entries;
            log_book::append(compile_log, &result.logs, max_entries)?;
        }
        match result.error() {
            Some(message) => warn!(error = %message, "Preview not updated"),
            None => info!("Preview updated"),
        }
        Ok(result.is_success())
    }
}
