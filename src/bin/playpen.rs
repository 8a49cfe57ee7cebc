//! Playpen CLI Binary

use clap::Parser;
use playpen::logging::init_logging;
use playpen::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    let context = match CliContext::new(cli.workspace.clone(), cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error initializing workspace: {}", e);
            process::exit(1);
        }
    };

    // CLI flags outrank the environment, which outranks the config file.
    let overrides = [
        ("PLAYPEN_LOG", &cli.log_level),
        ("PLAYPEN_LOG_FORMAT", &cli.log_format),
        ("PLAYPEN_LOG_OUTPUT", &cli.log_output),
    ];
    for (var, value) in overrides {
        if let Some(value) = value {
            std::env::set_var(var, value);
        }
    }
    if let Some(file) = &cli.log_file {
        std::env::set_var("PLAYPEN_LOG_FILE", file);
    }

    let logging = context.config().logging.clone();
    if let Err(e) = init_logging(Some(&logging)) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
