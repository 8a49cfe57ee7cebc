use clap::Parser;
use playpen::tooling::cli::{Cli, Commands};

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["playpen", "init"],
        vec!["playpen", "init", "--force"],
        vec!["playpen", "tree"],
        vec!["playpen", "files", "--format", "json"],
        vec!["playpen", "new-file", "src/app", "widget.ts"],
        vec!["playpen", "new-file", "/", "README.md", "--language", "markdown"],
        vec!["playpen", "new-folder", "src", "lib"],
        vec!["playpen", "rm", "src/main.ts", "--force"],
        vec!["playpen", "rename", "src/main.ts", "boot.ts"],
        vec!["playpen", "toggle", "src"],
        vec!["playpen", "open", "src/main.ts"],
        vec!["playpen", "close", "src/main.ts"],
        vec!["playpen", "activate", "src/main.ts"],
        vec!["playpen", "tabs", "--format", "json"],
        vec!["playpen", "cat", "src/main.ts"],
        vec!["playpen", "write", "src/main.ts", "--from", "-"],
        vec!["playpen", "export", "--output", "project.json"],
        vec!["playpen", "import", "project.json", "--force"],
        vec!["playpen", "compile", "--format", "json"],
        vec!["playpen", "preview", "--open"],
        vec!["playpen", "logs", "--clear"],
        vec!["playpen", "watch", "--dir", "mirror", "--debounce-ms", "50"],
        vec!["playpen", "--workspace", "/tmp/ws", "--log-level", "debug", "tree"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_missing_arguments() {
    assert!(Cli::try_parse_from(["playpen", "new-file", "src"]).is_err());
    assert!(Cli::try_parse_from(["playpen", "write", "src/main.ts"]).is_err());
    assert!(Cli::try_parse_from(["playpen"]).is_err());
}

#[test]
fn parse_watch_defaults() {
    let cli = Cli::try_parse_from(["playpen", "watch"]).unwrap();
    match cli.command {
        Commands::Watch { dir, debounce_ms } => {
            assert!(dir.is_none());
            assert_eq!(debounce_ms, 200);
        }
        _ => panic!("expected watch"),
    }
}
