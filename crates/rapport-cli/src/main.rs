//! Rapport CLI - Command-line interface for the Rapport relationship engine.

use clap::Parser;
use rapport_cli::commands;
use rapport_cli::config::OutputFormat;
use rapport_cli::{Cli, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    let color_requested = !cli.no_color;

    if let Err(e) = run(cli) {
        let formatter = Formatter::new(OutputFormat::Table, color_requested);
        eprintln!("{}", formatter.error(&e.to_string()));
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> rapport_cli::Result<()> {
    // An explicit config file must exist; the default one is created on first run
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_init()?,
    };

    if let Some(db) = cli.db {
        config.store.path = db;
    }
    config.store.validate()?;

    init_tracing(&config.settings.log_level);

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    commands::execute(cli.command, &config, &formatter)
}

/// Install the log subscriber; logs go to stderr, command output to stdout
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
