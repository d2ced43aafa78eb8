//! flowport - workspace data export/import companion CLI.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use flowport as app;

use app::catalog::{self, Brand};
use app::client::{AdminApi, AdminClient};
use app::config::{AppConfig, ConfigLoadResult};
use app::dialog::ProfileMenu;
use app::export::{ArtifactSaver, DialogSaver, DirectorySaver, ExportOutcome};
use app::import::{ImportOutcome, SessionHooks};
use app::notify::LogSink;

/// Workspace data export/import companion for a remote automation server.
#[derive(Parser)]
#[command(name = "flowport", version)]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Override the configured brand (suite or builder)
    #[arg(long)]
    brand: Option<Brand>,

    /// Log to a daily-rolling file in this directory instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export selected data categories to a JSON artifact
    Export {
        /// Comma-separated category labels; defaults to every category
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,

        /// Write into this directory instead of prompting for a location
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Import a previously exported JSON artifact
    Import {
        /// Artifact file to import
        file: PathBuf,
    },
    /// Show the remote server version
    Version,
    /// List exportable categories for the active brand
    Categories,
}

/// Session side effects for a headless run: log-only.
#[derive(Default)]
struct CliHooks;

impl SessionHooks for CliHooks {
    fn clear_dirty(&mut self) {
        tracing::debug!("cleared unsaved-changes indicator");
    }

    fn request_reload(&mut self) {
        tracing::info!("workspace reload requested");
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    let _log_guard = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "flowport.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(env_filter).init();
            None
        }
    };

    tracing::info!("flowport starting...");

    // Determine config path based on mode
    let config_path = if cli.dev {
        tracing::info!("Dev mode: loading config from current directory");
        PathBuf::from("config.toml")
    } else {
        AppConfig::default_path()
    };

    let config = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => {
            tracing::info!("Config loaded from {:?}", config_path);
            config
        }
        ConfigLoadResult::Missing => {
            tracing::warn!("No config at {:?}, using defaults", config_path);
            AppConfig::default()
        }
        ConfigLoadResult::Invalid(e) => bail!("invalid config {config_path:?}: {e}"),
    };

    let brand = cli.brand.unwrap_or(config.branding.brand);

    match cli.command {
        Command::Export { categories, output } => run_export(&config, brand, &categories, output),
        Command::Import { file } => run_import(&config, brand, &file),
        Command::Version => run_version(&config, brand),
        Command::Categories => {
            for label in catalog::labels_for(brand) {
                println!("{label}");
            }
            Ok(())
        }
    }
}

/// Build the runtime, client, and menu shared by every remote command.
fn bootstrap(
    config: &AppConfig,
    brand: Brand,
) -> anyhow::Result<(tokio::runtime::Runtime, ProfileMenu)> {
    let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    let token = (!config.server.token.is_empty()).then(|| config.server.token.clone());
    let api: Arc<dyn AdminApi> =
        Arc::new(AdminClient::new(&config.server.url, config.server.timeout_secs, token));
    let menu = ProfileMenu::new(rt.handle().clone(), api, brand);
    Ok((rt, menu))
}

fn run_export(
    config: &AppConfig,
    brand: Brand,
    categories: &[String],
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (_rt, mut menu) = bootstrap(config, brand)?;
    let mut sink = LogSink::new();
    let mut hooks = CliHooks;

    // --output wins, then the configured directory, then the native prompt.
    let output_dir = output.or_else(|| {
        (!config.export.prompt_for_path && !config.export.output_dir.is_empty())
            .then(|| PathBuf::from(&config.export.output_dir))
    });
    let saver: Box<dyn ArtifactSaver> = match output_dir {
        Some(dir) => Box::new(DirectorySaver::new(dir)),
        None => Box::new(DialogSaver),
    };

    let dialog = menu.open_export();
    if !categories.is_empty() {
        for requested in categories {
            if catalog::key_for_label(requested, brand).is_none() {
                tracing::warn!("unknown category label: {requested}");
            }
        }
        // Narrow the all-selected default down to the requested labels.
        for label in catalog::labels_for(brand) {
            if !categories.iter().any(|c| c == label) {
                dialog.toggle(label);
            }
        }
    }
    if !dialog.can_export() {
        bail!("no categories selected for export");
    }
    menu.start_export();

    let outcome = loop {
        let events = menu.poll(saver.as_ref(), &mut sink, &mut hooks);
        if let Some(outcome) = events.export {
            break outcome;
        }
        std::thread::sleep(Duration::from_millis(50));
    };

    match outcome {
        ExportOutcome::Saved(path) => {
            println!("Exported to {}", path.display());
            Ok(())
        }
        ExportOutcome::SaveCancelled => {
            println!("Export cancelled");
            Ok(())
        }
        ExportOutcome::Failed(message) => bail!(message),
    }
}

fn run_import(config: &AppConfig, brand: Brand, file: &std::path::Path) -> anyhow::Result<()> {
    let (_rt, mut menu) = bootstrap(config, brand)?;
    let mut sink = LogSink::new();
    let mut hooks = CliHooks;
    let saver = DialogSaver;

    let outcome = match menu.open_import(file, &mut sink) {
        Some(outcome) => outcome,
        None => loop {
            let events = menu.poll(&saver, &mut sink, &mut hooks);
            if let Some(outcome) = events.import {
                break outcome;
            }
            std::thread::sleep(Duration::from_millis(50));
        },
    };

    match outcome {
        ImportOutcome::Imported => {
            println!("Import All successful");
            Ok(())
        }
        ImportOutcome::Failed(message) => bail!(message),
    }
}

fn run_version(config: &AppConfig, brand: Brand) -> anyhow::Result<()> {
    let (_rt, mut menu) = bootstrap(config, brand)?;
    let mut sink = LogSink::new();
    let mut hooks = CliHooks;
    let saver = DialogSaver;

    menu.open_about();
    while menu.is_busy() {
        menu.poll(&saver, &mut sink, &mut hooks);
        std::thread::sleep(Duration::from_millis(50));
    }

    match menu.about_dialog().and_then(|about| about.version()) {
        Some(version) => {
            println!("Server version: {version}");
            Ok(())
        }
        None => bail!("failed to fetch server version"),
    }
}
