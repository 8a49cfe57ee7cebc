use std::fs;

use playpen::error::ApiError;
use playpen::tooling::cli::{CliContext, Commands};
use tempfile::TempDir;

use crate::support::{with_xdg_env, workspace};

fn init(cli: &CliContext) {
    cli.execute(&Commands::Init { force: false }).unwrap();
}

fn json(output: &str) -> serde_json::Value {
    serde_json::from_str(output).unwrap()
}

#[test]
fn commands_before_init_report_missing_session() {
    let temp = TempDir::new().unwrap();
    with_xdg_env(&temp, || {
        let cli = CliContext::new(workspace(&temp), None).unwrap();
        let err = cli.execute(&Commands::Tree).unwrap_err();
        assert!(matches!(err, ApiError::NotInitialized(_)));
    });
}

#[test]
fn init_is_idempotent_without_force() {
    let temp = TempDir::new().unwrap();
    with_xdg_env(&temp, || {
        let cli = CliContext::new(workspace(&temp), None).unwrap();
        init(&cli);
        assert!(cli.paths().session_file.starts_with(temp.path().join("xdg-data")));

        cli.execute(&Commands::Write {
            path: "src/main.ts".to_string(),
            from: write_temp(&temp, "keep.ts", "// kept"),
        })
        .unwrap();
        let output = cli.execute(&Commands::Init { force: false }).unwrap();
        assert!(output.contains("already initialized"));
        let content = cli
            .execute(&Commands::Cat {
                path: "src/main.ts".to_string(),
            })
            .unwrap();
        assert_eq!(content, "// kept");

        cli.execute(&Commands::Init { force: true }).unwrap();
        let content = cli
            .execute(&Commands::Cat {
                path: "src/main.ts".to_string(),
            })
            .unwrap();
        assert!(content.contains("bootstrapApplication"));
    });
}

#[test]
fn files_json_contract_has_required_fields() {
    let temp = TempDir::new().unwrap();
    with_xdg_env(&temp, || {
        let cli = CliContext::new(workspace(&temp), None).unwrap();
        init(&cli);
        let parsed = json(
            &cli.execute(&Commands::Files {
                format: "json".to_string(),
            })
            .unwrap(),
        );
        assert_eq!(parsed["total"].as_u64(), Some(5));
        let entry = parsed["files"]
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["path"] == "src/app/app.component.ts")
            .expect("entry file listed");
        assert_eq!(entry["language"], "typescript");
        assert!(entry["id"].as_str().is_some());

        let err = cli
            .execute(&Commands::Files {
                format: "yaml".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::ConfigError(_)));
    });
}

#[test]
fn tabs_follow_open_close_and_delete() {
    let temp = TempDir::new().unwrap();
    with_xdg_env(&temp, || {
        let cli = CliContext::new(workspace(&temp), None).unwrap();
        init(&cli);
        cli.execute(&Commands::NewFolder {
            parent: "src".to_string(),
            name: "lib".to_string(),
        })
        .unwrap();
        let created = cli
            .execute(&Commands::NewFile {
                parent: "src/lib".to_string(),
                name: "util.ts".to_string(),
                language: None,
            })
            .unwrap();
        assert!(created.contains("src/lib/util.ts"));

        for path in ["src/main.ts", "src/lib/util.ts"] {
            cli.execute(&Commands::Open {
                path: path.to_string(),
            })
            .unwrap();
        }
        let tabs = json(
            &cli.execute(&Commands::Tabs {
                format: "json".to_string(),
            })
            .unwrap(),
        );
        assert_eq!(tabs["tabs"].as_array().unwrap().len(), 2);
        assert_eq!(tabs["active"], "src/lib/util.ts");

        cli.execute(&Commands::Activate {
            path: "src/main.ts".to_string(),
        })
        .unwrap();
        cli.execute(&Commands::Rm {
            path: "src/lib".to_string(),
            force: true,
        })
        .unwrap();

        let tabs = json(
            &cli.execute(&Commands::Tabs {
                format: "json".to_string(),
            })
            .unwrap(),
        );
        assert_eq!(tabs["tabs"].as_array().unwrap().len(), 1);
        assert_eq!(tabs["active"], "src/main.ts");

        let output = cli
            .execute(&Commands::Close {
                path: "src/main.ts".to_string(),
            })
            .unwrap();
        assert!(output.contains("no tabs open"));

        let err = cli
            .execute(&Commands::Activate {
                path: "src/main.ts".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::TreeError(_)));
    });
}

#[test]
fn rename_moves_descendant_paths() {
    let temp = TempDir::new().unwrap();
    with_xdg_env(&temp, || {
        let cli = CliContext::new(workspace(&temp), None).unwrap();
        init(&cli);
        let output = cli
            .execute(&Commands::Rename {
                path: "src/app".to_string(),
                name: "shell".to_string(),
            })
            .unwrap();
        assert!(output.ends_with("src/shell"));

        let content = cli
            .execute(&Commands::Cat {
                path: "src/shell/app.component.ts".to_string(),
            })
            .unwrap();
        assert!(content.contains("@Component"));
        assert!(cli
            .execute(&Commands::Cat {
                path: "src/app/app.component.ts".to_string(),
            })
            .is_err());
    });
}

#[test]
fn export_import_round_trip_and_invalid_import_keeps_project() {
    let temp = TempDir::new().unwrap();
    with_xdg_env(&temp, || {
        let cli = CliContext::new(workspace(&temp), None).unwrap();
        init(&cli);
        let export_path = temp.path().join("project.json");
        cli.execute(&Commands::Export {
            output: Some(export_path.clone()),
        })
        .unwrap();
        let exported = fs::read_to_string(&export_path).unwrap();

        cli.execute(&Commands::Open {
            path: "src/main.ts".to_string(),
        })
        .unwrap();
        cli.execute(&Commands::Import {
            file: export_path,
            force: true,
        })
        .unwrap();

        let again = cli.execute(&Commands::Export { output: None }).unwrap();
        assert_eq!(json(&again), json(&exported));
        let tabs = cli
            .execute(&Commands::Tabs {
                format: "text".to_string(),
            })
            .unwrap();
        assert_eq!(tabs, "No open tabs.\n");

        let bad = write_temp(&temp, "bad.json", "{ not json");
        let err = cli
            .execute(&Commands::Import {
                file: bad,
                force: true,
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::ImportError(_)));
        let after = cli.execute(&Commands::Export { output: None }).unwrap();
        assert_eq!(json(&after), json(&exported));
    });
}

#[test]
fn compile_failure_is_logged_across_runs() {
    let temp = TempDir::new().unwrap();
    with_xdg_env(&temp, || {
        let cli = CliContext::new(workspace(&temp), None).unwrap();
        init(&cli);

        let ok = json(
            &cli.execute(&Commands::Compile {
                format: "json".to_string(),
            })
            .unwrap(),
        );
        assert_eq!(ok["success"], true);

        let broken = write_temp(
            &temp,
            "broken.ts",
            "@Component({ template: `<p>x</p>` })\nexport class AppComponent {",
        );
        cli.execute(&Commands::Write {
            path: "src/app/app.component.ts".to_string(),
            from: broken,
        })
        .unwrap();
        let failed = json(
            &cli.execute(&Commands::Compile {
                format: "json".to_string(),
            })
            .unwrap(),
        );
        assert_eq!(failed["success"], false);
        assert!(failed["error"]
            .as_str()
            .unwrap()
            .contains("Mismatched braces"));

        let logs = cli.execute(&Commands::Logs { clear: false }).unwrap();
        assert!(logs.contains("Compiled successfully") || logs.contains("Generated preview document"));
        assert!(logs.contains("Error: Mismatched braces"));

        cli.execute(&Commands::Logs { clear: true }).unwrap();
        let logs = cli.execute(&Commands::Logs { clear: false }).unwrap();
        assert_eq!(logs, "No compile logs.\n");
    });
}

#[test]
fn preview_writes_sandboxed_host_page() {
    let temp = TempDir::new().unwrap();
    with_xdg_env(&temp, || {
        let cli = CliContext::new(workspace(&temp), None).unwrap();
        init(&cli);
        let output = cli.execute(&Commands::Preview { open: false }).unwrap();
        assert!(output.starts_with("Preview: "));

        let host = cli.paths().preview_dir.join("index.html");
        let page = fs::read_to_string(host).unwrap();
        assert!(page.contains("sandbox=\"allow-scripts\""));

        cli.execute(&Commands::Preview { open: false }).unwrap();
        let documents = fs::read_dir(&cli.paths().preview_dir)
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name() != "index.html")
            .count();
        assert_eq!(documents, 1);
    });
}

#[test]
fn workspace_config_changes_entry_file() {
    let temp = TempDir::new().unwrap();
    with_xdg_env(&temp, || {
        let root = workspace(&temp);
        fs::write(
            root.join("playpen.toml"),
            "[compiler]\nentry_file = \"src/root.component.ts\"\n",
        )
        .unwrap();
        let cli = CliContext::new(root, None).unwrap();
        assert_eq!(cli.config().compiler.entry_file, "src/root.component.ts");
        init(&cli);

        let output = cli
            .execute(&Commands::Compile {
                format: "json".to_string(),
            })
            .unwrap();
        assert!(json(&output)["error"]
            .as_str()
            .unwrap()
            .contains("src/root.component.ts"));
    });
}

fn write_temp(temp: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = temp.path().join(name);
    fs::write(&path, content).unwrap();
    path
}
