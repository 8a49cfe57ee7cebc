use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with XDG data and config homes pointed into `temp`. Serialized
/// because the environment is process-wide.
pub fn with_xdg_env<F: FnOnce()>(temp: &TempDir, f: F) {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let data = temp.path().join("xdg-data");
    let config = temp.path().join("xdg-config");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::create_dir_all(&config).unwrap();

    let saved: Vec<(&str, Option<String>)> = ["XDG_DATA_HOME", "XDG_CONFIG_HOME"]
        .iter()
        .map(|k| (*k, std::env::var(k).ok()))
        .collect();
    std::env::set_var("XDG_DATA_HOME", &data);
    std::env::set_var("XDG_CONFIG_HOME", &config);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    for (key, value) in saved {
        match value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
    }
    if let Err(panic) = result {
        std::panic::resume_unwind(panic);
    }
}

/// Fresh workspace directory inside `temp`
pub fn workspace(temp: &TempDir) -> PathBuf {
    let root = temp.path().join("workspace");
    std::fs::create_dir_all(&root).unwrap();
    root
}
