//! CLI Tooling
//!
//! Command-line interface over a workspace's project session. Every command
//! loads the session, applies one operation, and saves it back.

use crate::compiler::{log_book, Compiler};
use crate::config::{ConfigLoader, PlaypenConfig, WorkspacePaths};
use crate::editor::{EditorBridge, WatchConfig};
use crate::error::{ApiError, TreeError};
use crate::format::{
    format_compile_json, format_compile_text, format_files_json, format_files_text,
    format_logs_text, format_tabs_json, format_tabs_text, format_tree_text,
};
use crate::preview::{PreviewRenderer, PreviewState};
use crate::store::persistence::{load_session, save_session};
use crate::store::scaffold::starter_project;
use crate::store::ProjectStore;
use crate::types::NodeId;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// Playpen CLI - component playground with a virtual project tree
#[derive(Parser)]
#[command(name = "playpen")]
#[command(about = "Edit a virtual component project, compile it, and preview it in a sandbox")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the starter project
    Init {
        /// Replace an existing project
        #[arg(long)]
        force: bool,
    },
    /// Show the project tree
    Tree,
    /// List every file
    Files {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Create an empty file under a folder ("/" for the top level)
    NewFile {
        parent: String,
        name: String,
        /// Language tag; inferred from the extension when omitted
        #[arg(long)]
        language: Option<String>,
    },
    /// Create an empty folder under a folder ("/" for the top level)
    NewFolder { parent: String, name: String },
    /// Delete a file or folder and everything under it
    Rm {
        path: String,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
    /// Rename a file or folder in place
    Rename { path: String, name: String },
    /// Expand or collapse a folder
    Toggle { path: String },
    /// Open a file in a tab and make it active
    Open { path: String },
    /// Close a file's tab
    Close { path: String },
    /// Make an open tab active
    Activate { path: String },
    /// Show open tabs
    Tabs {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print a file's content
    Cat { path: String },
    /// Replace a file's content
    Write {
        path: String,
        /// Source file, or "-" for stdin
        #[arg(long)]
        from: PathBuf,
    },
    /// Export the project as JSON
    Export {
        /// Write to this file instead of printing
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace the project from exported JSON
    Import {
        file: PathBuf,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
    /// Compile the entry component
    Compile {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Compile and write the sandboxed preview
    Preview {
        /// Open the preview document afterwards
        #[arg(long)]
        open: bool,
    },
    /// Show compile logs from every run
    Logs {
        /// Clear the log instead of showing it
        #[arg(long)]
        clear: bool,
    },
    /// Mirror the project to a directory and apply edits made there
    Watch {
        /// Mirror directory (default: <data dir>/mirror)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Debounce window in milliseconds
        #[arg(long, default_value = "200")]
        debounce_ms: u64,
    },
}

/// CLI context for one workspace
pub struct CliContext {
    workspace_root: PathBuf,
    config: PlaypenConfig,
    paths: WorkspacePaths,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        let paths = config.workspace_paths(&workspace_root)?;
        Ok(Self {
            workspace_root,
            config,
            paths,
        })
    }

    pub fn config(&self) -> &PlaypenConfig {
        &self.config
    }

    pub fn paths(&self) -> &WorkspacePaths {
        &self.paths
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        info!(command = command_name(command), workspace = %self.workspace_root.display(), "Running command");
        match command {
            Commands::Init { force } => self.handle_init(*force),
            Commands::Tree => Ok(format_tree_text(&self.load_store()?)),
            Commands::Files { format } => {
                let store = self.load_store()?;
                let files = store.get_all_files();
                match parse_format(format)? {
                    OutputFormat::Text => Ok(format_files_text(&files)),
                    OutputFormat::Json => Ok(format_files_json(&files)?),
                }
            }
            Commands::NewFile {
                parent,
                name,
                language,
            } => self.handle_new(parent, name, Some(language.as_deref())),
            Commands::NewFolder { parent, name } => self.handle_new(parent, name, None),
            Commands::Rm { path, force } => self.handle_rm(path, *force),
            Commands::Rename { path, name } => self.mutate(|store| {
                let id = resolve(store, path)?;
                store.rename_node(id, name)?;
                let renamed = store.tree().get_or_error(id)?.path.clone();
                Ok(format!("Renamed {} -> {}", path, renamed))
            }),
            Commands::Toggle { path } => self.mutate(|store| {
                let id = resolve(store, path)?;
                store.toggle_folder(id)?;
                let node = store.tree().get_or_error(id)?;
                if node.is_file() {
                    return Ok(format!("{} is a file; nothing to toggle", node.path));
                }
                let state = if node.expanded { "Expanded" } else { "Collapsed" };
                Ok(format!("{} {}", state, node.path))
            }),
            Commands::Open { path } => self.mutate(|store| {
                let id = resolve(store, path)?;
                if !store.tree().get_or_error(id)?.is_file() {
                    return Err(TreeError::NotAFile(id).into());
                }
                store.select_file(id)?;
                Ok(format!("Opened {}", path))
            }),
            Commands::Close { path } => self.mutate(|store| {
                let id = resolve(store, path)?;
                if !store.close_tab(id) {
                    return Ok(format!("{} was not open", path));
                }
                match store.active_file() {
                    Some(active) => Ok(format!("Closed {}; active: {}", path, active.path)),
                    None => Ok(format!("Closed {}; no tabs open", path)),
                }
            }),
            Commands::Activate { path } => self.mutate(|store| {
                let id = resolve(store, path)?;
                store.set_active_tab(id)?;
                Ok(format!("Active: {}", path))
            }),
            Commands::Tabs { format } => {
                let store = self.load_store()?;
                match parse_format(format)? {
                    OutputFormat::Text => Ok(format_tabs_text(&store)),
                    OutputFormat::Json => Ok(format_tabs_json(&store)?),
                }
            }
            Commands::Cat { path } => {
                let store = self.load_store()?;
                let id = resolve(&store, path)?;
                let node = store.tree().get_or_error(id)?;
                if !node.is_file() {
                    return Err(TreeError::NotAFile(id).into());
                }
                Ok(node.text().to_string())
            }
            Commands::Write { path, from } => {
                let content = read_source(from)?;
                self.mutate(|store| {
                    let id = resolve(store, path)?;
                    store.update_file_content(id, &content)?;
                    Ok(format!("Wrote {} bytes to {}", content.len(), path))
                })
            }
            Commands::Export { output } => self.handle_export(output.as_deref()),
            Commands::Import { file, force } => self.handle_import(file, *force),
            Commands::Compile { format } => {
                let format = parse_format(format)?;
                let store = self.load_store()?;
                let result = Compiler::new(self.config.compiler.clone()).compile(store.tree());
                log_book::append(
                    &self.paths.compile_log,
                    &result.logs,
                    self.config.compiler.max_log_entries,
                )?;
                match format {
                    OutputFormat::Text => Ok(format_compile_text(&result)),
                    OutputFormat::Json => Ok(format_compile_json(&result)?),
                }
            }
            Commands::Preview { open } => self.handle_preview(*open),
            Commands::Logs { clear } => {
                if *clear {
                    log_book::replace(&self.paths.compile_log, &[])?;
                    return Ok("Cleared compile logs".to_string());
                }
                let mut compiler = Compiler::new(self.config.compiler.clone());
                compiler.restore_logs(log_book::load(&self.paths.compile_log)?);
                Ok(format_logs_text(compiler.compile_logs()))
            }
            Commands::Watch { dir, debounce_ms } => self.handle_watch(dir.as_deref(), *debounce_ms),
        }
    }

    fn load_store(&self) -> Result<ProjectStore, ApiError> {
        load_session(&self.paths.session_file)?
            .ok_or_else(|| ApiError::NotInitialized(self.paths.session_file.clone()))
    }

    /// Load, apply `op`, and save only when it succeeded
    fn mutate<F>(&self, op: F) -> Result<String, ApiError>
    where
        F: FnOnce(&mut ProjectStore) -> Result<String, ApiError>,
    {
        let mut store = self.load_store()?;
        let output = op(&mut store)?;
        save_session(&store, &self.paths.session_file)?;
        Ok(output)
    }

    fn renderer(&self) -> PreviewRenderer {
        PreviewRenderer::from_config(&self.config.preview, self.paths.preview_dir.clone())
    }

    fn handle_init(&self, force: bool) -> Result<String, ApiError> {
        if self.paths.session_file.exists() && !force {
            return Ok(format!(
                "Project already initialized at {} (use --force to replace it)",
                self.paths.session_file.display()
            ));
        }
        let store = ProjectStore::with_tree(starter_project());
        save_session(&store, &self.paths.session_file)?;
        info!(session = %self.paths.session_file.display(), "Initialized project");
        Ok(format!(
            "Initialized project with {} files\nSession: {}",
            store.get_all_files().len(),
            self.paths.session_file.display()
        ))
    }

    /// `language` is `Some` for files (holding the optional hint) and `None` for folders
    fn handle_new(
        &self,
        parent: &str,
        name: &str,
        language: Option<Option<&str>>,
    ) -> Result<String, ApiError> {
        self.mutate(|store| {
            let parent_id = if is_top_level(parent) {
                None
            } else {
                Some(resolve(store, parent)?)
            };
            let id = match (parent_id, language) {
                (Some(parent), Some(hint)) => store.create_file(parent, name, hint)?,
                (Some(parent), None) => store.create_folder(parent, name)?,
                (None, Some(hint)) => store.create_root_file(name, hint)?,
                (None, None) => store.create_root_folder(name)?,
            };
            let node = store.tree().get_or_error(id)?;
            Ok(format!("Created {} {} ({})", node.kind, node.path, node.id.short()))
        })
    }

    fn handle_rm(&self, path: &str, force: bool) -> Result<String, ApiError> {
        let mut store = self.load_store()?;
        let id = resolve(&store, path)?;
        let node = store.tree().get_or_error(id)?;
        let descendants = node.subtree_ids().len() - 1;

        if !force {
            use dialoguer::Confirm;
            let prompt = if descendants > 0 {
                format!("Delete '{}' and {} nested items?", path, descendants)
            } else {
                format!("Delete '{}'?", path)
            };
            let confirmed = Confirm::new()
                .with_prompt(prompt)
                .interact()
                .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)))?;
            if !confirmed {
                return Ok("Deletion cancelled".to_string());
            }
        }

        let removed = store.delete_node(id)?;
        save_session(&store, &self.paths.session_file)?;
        Ok(format!("Deleted {} {}", removed.kind, removed.path))
    }

    fn handle_export(&self, output: Option<&Path>) -> Result<String, ApiError> {
        let store = self.load_store()?;
        let json = store.export_project()?;
        match output {
            Some(path) => {
                std::fs::write(path, &json)?;
                Ok(format!(
                    "Exported {} nodes to {}",
                    store.tree().node_count(),
                    path.display()
                ))
            }
            None => Ok(json),
        }
    }

    fn handle_import(&self, file: &Path, force: bool) -> Result<String, ApiError> {
        let serialized = std::fs::read_to_string(file)?;
        let mut store = match load_session(&self.paths.session_file)? {
            Some(store) => {
                if !force {
                    use dialoguer::Confirm;
                    let confirmed = Confirm::new()
                        .with_prompt("Replace the current project and close all tabs?")
                        .interact()
                        .map_err(|e| {
                            ApiError::ConfigError(format!("Failed to get user input: {}", e))
                        })?;
                    if !confirmed {
                        return Ok("Import cancelled".to_string());
                    }
                }
                store
            }
            None => ProjectStore::new(),
        };
        store.import_project(&serialized)?;
        save_session(&store, &self.paths.session_file)?;
        Ok(format!(
            "Imported {} nodes from {}",
            store.tree().node_count(),
            file.display()
        ))
    }

    fn handle_preview(&self, open: bool) -> Result<String, ApiError> {
        let store = self.load_store()?;
        let mut compiler = Compiler::new(self.config.compiler.clone());
        let mut renderer = self.renderer();
        let result = renderer.refresh(&mut compiler, store.tree())?;
        log_book::append(
            &self.paths.compile_log,
            &result.logs,
            self.config.compiler.max_log_entries,
        )?;

        match renderer.state() {
            PreviewState::Content(handle) => {
                let mut out = format!(
                    "Preview: {}\nDocument: {}",
                    handle.host_page.display(),
                    handle.document.display()
                );
                if open {
                    renderer.open_in_new_tab()?;
                    out.push_str("\nOpened in browser");
                }
                Ok(out)
            }
            PreviewState::Error(message) => Ok(format!("Preview failed: {}", message)),
            PreviewState::Loading => Err(ApiError::PreviewError(
                "Preview did not finish rendering".to_string(),
            )),
        }
    }

    fn handle_watch(&self, dir: Option<&Path>, debounce_ms: u64) -> Result<String, ApiError> {
        let store = self.load_store()?;
        let mirror_dir = match dir {
            Some(dir) => self.workspace_root.join(dir),
            None => self.paths.data_dir.join("mirror"),
        };
        let config = WatchConfig {
            debounce_ms,
            ..WatchConfig::new(mirror_dir.clone())
        };
        let mut bridge = EditorBridge::new(
            store,
            Compiler::new(self.config.compiler.clone()),
            self.renderer(),
            config,
        )
        .with_session_file(self.paths.session_file.clone())
        .with_compile_log(self.paths.compile_log.clone());

        println!(
            "Editing in {}\nPreview: {}\nPress Ctrl-C to stop.",
            mirror_dir.display(),
            self.paths.preview_dir.join(crate::preview::HOST_PAGE).display()
        );
        bridge.start()?;
        Ok("Watch stopped".to_string())
    }
}

enum OutputFormat {
    Text,
    Json,
}

fn parse_format(format: &str) -> Result<OutputFormat, ApiError> {
    match format {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => Err(ApiError::ConfigError(format!(
            "Invalid format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

fn is_top_level(parent: &str) -> bool {
    matches!(parent.trim(), "" | "/" | ".")
}

/// Node at a slash-separated project path
fn resolve(store: &ProjectStore, path: &str) -> Result<NodeId, ApiError> {
    Ok(store.tree().find_by_path_or_error(path.trim_matches('/'))?.id)
}

fn read_source(from: &Path) -> Result<String, ApiError> {
    if from == Path::new("-") {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }
    Ok(std::fs::read_to_string(from)?)
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Init { .. } => "init",
        Commands::Tree => "tree",
        Commands::Files { .. } => "files",
        Commands::NewFile { .. } => "new-file",
        Commands::NewFolder { .. } => "new-folder",
        Commands::Rm { .. } => "rm",
        Commands::Rename { .. } => "rename",
        Commands::Toggle { .. } => "toggle",
        Commands::Open { .. } => "open",
        Commands::Close { .. } => "close",
        Commands::Activate { .. } => "activate",
        Commands::Tabs { .. } => "tabs",
        Commands::Cat { .. } => "cat",
        Commands::Write { .. } => "write",
        Commands::Export { .. } => "export",
        Commands::Import { .. } => "import",
        Commands::Compile { .. } => "compile",
        Commands::Preview { .. } => "preview",
        Commands::Logs { .. } => "logs",
        Commands::Watch { .. } => "watch",
    }
}
