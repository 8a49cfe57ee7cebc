//! Change events from the mirror directory, batching and debouncing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Watch loop configuration
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Directory the project tree is mirrored into
    pub mirror_dir: PathBuf,
    /// Quiet period after the last event before a batch is applied
    pub debounce_ms: u64,
    /// Apply immediately once this many paths are pending
    pub max_batch_size: usize,
    /// Path fragments and `*.ext` suffixes to ignore
    pub ignore_patterns: Vec<String>,
}

impl WatchConfig {
    pub fn new(mirror_dir: impl Into<PathBuf>) -> Self {
        Self {
            mirror_dir: mirror_dir.into(),
            ..Self::default()
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            mirror_dir: PathBuf::from("."),
            debounce_ms: 200,
            max_batch_size: 100,
            ignore_patterns: vec![
                "/.git/".to_string(),
                "/node_modules/".to_string(),
                ".DS_Store".to_string(),
                "*.swp".to_string(),
                "*.swx".to_string(),
                "*.tmp".to_string(),
                "*~".to_string(),
            ],
        }
    }
}

/// Filesystem change event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Removed(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
}

impl ChangeEvent {
    /// The path the event leaves behind
    pub fn path(&self) -> &Path {
        match self {
            ChangeEvent::Created(p) | ChangeEvent::Modified(p) | ChangeEvent::Removed(p) => p,
            ChangeEvent::Renamed { to, .. } => to,
        }
    }

    /// Map a raw notify event
    pub fn from_notify(event: notify::Event) -> Option<Self> {
        use notify::event::ModifyKind;
        use notify::EventKind;

        let mut paths = event.paths.into_iter();
        match event.kind {
            EventKind::Create(_) => paths.next().map(ChangeEvent::Created),
            EventKind::Modify(ModifyKind::Name(_)) => match (paths.next(), paths.next()) {
                (Some(from), Some(to)) => Some(ChangeEvent::Renamed { from, to }),
                (Some(path), None) => Some(ChangeEvent::Modified(path)),
                _ => None,
            },
            EventKind::Modify(_) => paths.next().map(ChangeEvent::Modified),
            EventKind::Remove(_) => paths.next().map(ChangeEvent::Removed),
            _ => None,
        }
    }
}

/// Groups events per path; the latest event for a path wins
pub(crate) struct EventBatcher {
    config: WatchConfig,
    pending: BTreeMap<PathBuf, ChangeEvent>,
    last_event: Option<Instant>,
}

impl EventBatcher {
    pub(crate) fn new(config: WatchConfig) -> Self {
        Self {
            config,
            pending: BTreeMap::new(),
            last_event: None,
        }
    }

    /// Queue an event. Returns true when the batch is full.
    pub(crate) fn add_event(&mut self, event: ChangeEvent) -> bool {
        if self.should_ignore(event.path()) {
            return false;
        }
        let path = event.path().to_path_buf();
        let merged = match (self.pending.remove(&path), event) {
            // A file written in place by an editor that saves via create.
            (Some(ChangeEvent::Modified(_)), ChangeEvent::Created(p)) => ChangeEvent::Modified(p),
            (_, event) => event,
        };
        self.pending.insert(path, merged);
        self.last_event = Some(Instant::now());
        self.pending.len() >= self.config.max_batch_size
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// True once the debounce window has passed since the last event
    pub(crate) fn is_settled(&self, now: Instant) -> bool {
        match self.last_event {
            Some(last) => now.duration_since(last) >= self.debounce(),
            None => false,
        }
    }

    pub(crate) fn debounce(&self) -> Duration {
        Duration::from_millis(self.config.debounce_ms)
    }

    /// Pending events ordered by path
    pub(crate) fn take_batch(&mut self) -> Vec<ChangeEvent> {
        self.last_event = None;
        std::mem::take(&mut self.pending).into_values().collect()
    }

    fn should_ignore(&self, path: &Path) -> bool {
        let path = path.to_string_lossy().replace('\\', "/");
        self.config
            .ignore_patterns
            .iter()
            .any(|pattern| matches_pattern(&path, pattern))
    }
}

fn matches_pattern(path: &str, pattern: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix('*') {
        return path.ends_with(suffix);
    }
    path.contains(pattern)
}
